//! # roomwatchd: room occupancy and lighting daemon
//!
//! Composition root that wires the simulated host to a room controller.
//!
//! ## Responsibilities
//! - Load configuration (config file, env vars)
//! - Initialise logging
//! - Build the virtual host for the configured home location and seed the
//!   room's entities
//! - Construct the `RoomController` and register its subscriptions and jobs
//! - Feed state changes and due jobs to the controller until Ctrl-C
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no decision logic belongs here.

mod config;

use anyhow::Context;
use roomwatch_adapter_virtual::VirtualHost;
use roomwatch_app::room_controller::RoomController;
use tokio::sync::broadcast::error::RecvError;

use crate::config::{Config, ScriptStep};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;

    // ── Structured logging ──────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&config.logging.filter))
        .init();

    // ── Simulated host ──────────────────────────────────────────────
    let room = config.room();
    let simulation = &config.simulation;
    let mut builder = VirtualHost::builder(simulation.home()?)
        .timer_duration(simulation.timer_duration());
    for (id, state) in simulation.initial_states(&room) {
        builder = builder.entity(id, state);
    }
    let host = builder.build();

    // ── Controller ──────────────────────────────────────────────────
    let controller = RoomController::new(host.clone(), room)?;
    let mut events = host.events();
    controller
        .initialize(&host)
        .context("registering subscriptions and jobs")?;

    tracing::info!(
        room = %controller.config().name,
        subscriptions = controller.subscriptions().len(),
        jobs = host.scheduled().len(),
        "roomwatchd running"
    );

    spawn_script(host.clone(), simulation.script.clone());

    let mut tick = tokio::time::interval(simulation.tick());
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            received = events.recv() => match received {
                Ok(change) => {
                    controller.dispatch(&change).await;
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "controller fell behind, state changes dropped");
                }
                Err(RecvError::Closed) => break,
            },
            _ = tick.tick() => {
                for job in host.due_jobs() {
                    controller.run_job(job).await;
                }
            }
            _ = &mut shutdown => {
                tracing::info!("shutdown requested");
                break;
            }
        }
    }

    Ok(())
}

/// Replay scripted state changes relative to startup.
fn spawn_script(host: VirtualHost, mut script: Vec<ScriptStep>) {
    if script.is_empty() {
        return;
    }
    script.sort_by_key(|step| step.after_secs);
    tokio::spawn(async move {
        let start = tokio::time::Instant::now();
        for step in script {
            tokio::time::sleep_until(start + std::time::Duration::from_secs(step.after_secs))
                .await;
            let change = host.set_state(&step.entity_id, step.state.as_str());
            tracing::info!(%change, "scripted state change");
        }
    });
}
