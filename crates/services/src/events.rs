use tokio::sync::broadcast;

/// Payload-free notification that a progress write succeeded.
///
/// Subscribers react by re-running their own fetch; late or coalesced
/// deliveries are harmless.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressChanged;

/// Explicit publish/subscribe bus for progress changes.
///
/// Passed by reference to the components that need it instead of acting as
/// an ambient broadcast. Publishing with no live subscribers is a no-op.
#[derive(Clone)]
pub struct ProgressEvents {
    sender: broadcast::Sender<ProgressChanged>,
}

impl ProgressEvents {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(16);
        Self { sender }
    }

    /// Registers a new subscriber; only events published after this call are
    /// delivered.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressChanged> {
        self.sender.subscribe()
    }

    /// Publishes one event. Closed or lagging receivers are ignored.
    pub fn notify(&self) {
        let _ = self.sender.send(ProgressChanged);
    }
}

impl Default for ProgressEvents {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_see_events_published_after_subscribing() {
        let events = ProgressEvents::new();
        let mut rx = events.subscribe();

        events.notify();
        assert_eq!(rx.recv().await.unwrap(), ProgressChanged);
    }

    #[tokio::test]
    async fn notify_without_subscribers_is_a_no_op() {
        let events = ProgressEvents::new();
        events.notify();

        // A late subscriber does not observe the earlier event.
        let mut rx = events.subscribe();
        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Empty)
        ));
    }
}
