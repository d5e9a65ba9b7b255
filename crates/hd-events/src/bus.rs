use crate::types::EventRecord;
use tokio::sync::broadcast;

/// Fan-out of committed lifecycle events to live subscribers.
///
/// Lagging receivers lose the oldest records; publishers never block.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventRecord>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.sender.subscribe()
    }

    pub fn publish(
        &self,
        event: EventRecord,
    ) -> Result<(), broadcast::error::SendError<EventRecord>> {
        self.sender.send(event).map(|_| ())
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
