//! Outbound event channel toward the application layer

use tokio::sync::broadcast;
use tracing::trace;

use crate::events::{DelegateEvent, EmittedEvent};

// ----------------------------------------------------------------------------
// Event Bridge
// ----------------------------------------------------------------------------

/// Broadcast bridge delivering named events to application subscribers.
///
/// Handles are cheap to clone and senders may run on any task, so delegate
/// pumps never synchronize with listeners. Emission is fire-and-forget:
/// nothing flows back through the bridge, events are not buffered or
/// replayed across subscriptions, and an event emitted while no subscriber
/// is registered is dropped.
///
/// A subscriber that falls behind the channel capacity loses the oldest
/// events (the receiver sees a lag error, not a torn payload); the delegate
/// side is never blocked or torn down by a slow or missing listener.
#[derive(Debug, Clone)]
pub struct EventBridge {
    sender: broadcast::Sender<EmittedEvent>,
}

impl EventBridge {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a listener. The receiver observes events emitted after this
    /// call; there is no replay.
    pub fn subscribe(&self) -> broadcast::Receiver<EmittedEvent> {
        self.sender.subscribe()
    }

    /// Forward one delegate callback as exactly one named event.
    pub fn forward(&self, event: DelegateEvent) {
        self.emit(event.into_emitted());
    }

    /// Dispatch an already-built event.
    pub fn emit(&self, event: EmittedEvent) {
        trace!(event = event.name, "emitting");
        if self.sender.send(event).is_err() {
            // No subscriber registered; the event is dropped by contract.
            trace!("no subscribers, event dropped");
        }
    }

    /// Number of currently registered listeners
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

// ----------------------------------------------------------------------------
// Delegate Pump
// ----------------------------------------------------------------------------

/// Drain a delegate stream into the bridge until the stack closes it.
///
/// Runs on its own task, off the stack's callback chain: the stack hands an
/// event over and returns immediately, so a slow listener can never wedge a
/// delegate callback. One received event produces one forwarded event.
pub async fn pump_delegate_events(
    mut delegate: tokio::sync::mpsc::UnboundedReceiver<DelegateEvent>,
    bridge: EventBridge,
) {
    while let Some(event) = delegate.recv().await {
        bridge.forward(event);
    }
    trace!("delegate stream closed");
}
