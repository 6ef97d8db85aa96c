//! In-process state-change bus backed by a tokio broadcast channel.

use tokio::sync::broadcast;

use roomwatch_domain::event::StateChange;

/// In-process bus using a tokio [`broadcast`] channel.
///
/// Emitting succeeds even when there are no active subscribers
/// (the change is simply dropped).
pub struct InProcessEventBus {
    sender: broadcast::Sender<StateChange>,
}

impl InProcessEventBus {
    /// Create a new bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to changes on this bus.
    ///
    /// Returns a receiver that will get all changes published *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.sender.subscribe()
    }

    /// Send without awaiting. Returns how many receivers got the change.
    pub fn emit(&self, change: StateChange) -> usize {
        // send only fails when nobody listens
        self.sender.send(change).unwrap_or(0)
    }
}
