//! Update notifications
//!
//! Hosts that inject the generated style sheet into pages need to know when
//! it may have changed. The engine owns a [`FilterNotifier`] and emits an
//! event after every successful mutation.

use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender};
use log::debug;

use crate::types::ElemHideException;

/// Event delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElemHideEvent {
    /// Filters or exceptions changed; injected style sheets must be refreshed
    Updated,
    ExceptionAdded(Arc<ElemHideException>),
    ExceptionRemoved(Arc<ElemHideException>),
}

/// Events buffered per subscriber before it is dropped.
pub const SUBSCRIBER_QUEUE_CAPACITY: usize = 1024;

/// Fan-out of events to any number of channel subscribers.
#[derive(Debug)]
pub struct FilterNotifier {
    subscribers: Vec<Sender<ElemHideEvent>>,
    queue_capacity: usize,
}

impl Default for FilterNotifier {
    fn default() -> Self {
        Self::with_queue_capacity(SUBSCRIBER_QUEUE_CAPACITY)
    }
}

impl FilterNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_queue_capacity(queue_capacity: usize) -> Self {
        Self {
            subscribers: Vec::new(),
            queue_capacity: queue_capacity.max(1),
        }
    }

    /// Register a new subscriber.
    ///
    /// Each subscriber has a bounded queue. A subscriber that lets it fill
    /// up is dropped: its receiver yields the queued events and then
    /// reports disconnection. Subscribe again to resume.
    pub fn subscribe(&mut self) -> Receiver<ElemHideEvent> {
        let (tx, rx) = bounded(self.queue_capacity);
        self.subscribers.push(tx);
        rx
    }

    /// Send an event to every live subscriber. Disconnected and full
    /// subscribers are dropped.
    pub fn emit(&mut self, event: ElemHideEvent) {
        if self.subscribers.is_empty() {
            return;
        }

        let before = self.subscribers.len();
        self.subscribers.retain(|tx| tx.try_send(event.clone()).is_ok());

        let dropped = before - self.subscribers.len();
        if dropped > 0 {
            debug!("elemhide: dropped {} subscribers", dropped);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_reaches_all_subscribers() {
        let mut notifier = FilterNotifier::new();
        let a = notifier.subscribe();
        let b = notifier.subscribe();

        notifier.emit(ElemHideEvent::Updated);

        assert_eq!(a.try_recv(), Ok(ElemHideEvent::Updated));
        assert_eq!(b.try_recv(), Ok(ElemHideEvent::Updated));
        assert!(a.try_recv().is_err());
    }

    #[test]
    fn test_disconnected_subscribers_are_pruned() {
        let mut notifier = FilterNotifier::new();
        let kept = notifier.subscribe();
        drop(notifier.subscribe());

        notifier.emit(ElemHideEvent::Updated);

        assert_eq!(notifier.subscriber_count(), 1);
        assert_eq!(kept.try_recv(), Ok(ElemHideEvent::Updated));
    }

    #[test]
    fn test_undrained_subscriber_is_dropped() {
        let mut notifier = FilterNotifier::with_queue_capacity(2);
        let stalled = notifier.subscribe();
        let active = notifier.subscribe();

        for _ in 0..3 {
            notifier.emit(ElemHideEvent::Updated);
            assert_eq!(active.try_recv(), Ok(ElemHideEvent::Updated));
        }

        assert_eq!(notifier.subscriber_count(), 1);
        assert_eq!(stalled.len(), 2);
        assert_eq!(stalled.try_recv(), Ok(ElemHideEvent::Updated));
        assert_eq!(stalled.try_recv(), Ok(ElemHideEvent::Updated));
        assert_eq!(stalled.try_recv(), Err(crossbeam_channel::TryRecvError::Disconnected));
    }
}
