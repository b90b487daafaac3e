//! Post-resize feedback events.
//!
//! After a resize settles the engine schedules one `FeedbackEvent` for
//! external learning/telemetry. Delivery is one-shot and fire-and-forget:
//! nothing is retried, and an event that comes due with nobody listening
//! is dropped.

use crate::recommend::ResizeContext;
use crate::strategy::Strategy;
use cr_core::ObjectPlacement;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackEvent {
    pub action_id: String,
    /// Strategy that produced the final layout.
    pub strategy: Strategy,
    pub confidence: f32,
    pub reasoning: String,
    pub context: ResizeContext,
    /// Object placements before the resize.
    pub original_positions: Vec<ObjectPlacement>,
}

/// One-shot timer collaborator.
pub trait FeedbackScheduler {
    fn schedule(&mut self, delay: Duration, event: FeedbackEvent);
}

/// Discards every event.
#[derive(Debug, Default)]
pub struct NoFeedback;

impl FeedbackScheduler for NoFeedback {
    fn schedule(&mut self, _delay: Duration, _event: FeedbackEvent) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&FeedbackEvent)>;

/// In-process timer queue, driven by the host calling `advance`.
///
/// Dropping the queue drops everything still pending.
#[derive(Default)]
pub struct DeferredFeedback {
    pending: Vec<(Duration, FeedbackEvent)>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl DeferredFeedback {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&FeedbackEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Let `elapsed` pass; deliver every event that came due, oldest first.
    /// Returns the number of events that came due.
    pub fn advance(&mut self, elapsed: Duration) -> usize {
        let mut due = Vec::new();
        let mut waiting = Vec::with_capacity(self.pending.len());
        for (remaining, event) in self.pending.drain(..) {
            match remaining.checked_sub(elapsed) {
                Some(left) if !left.is_zero() => waiting.push((left, event)),
                _ => due.push(event),
            }
        }
        self.pending = waiting;

        if !due.is_empty() && self.listeners.is_empty() {
            log::debug!("feedback: dropping {} event(s), no listeners", due.len());
        }
        for event in &due {
            for (_, listener) in &mut self.listeners {
                listener(event);
            }
        }
        due.len()
    }
}

impl FeedbackScheduler for DeferredFeedback {
    fn schedule(&mut self, delay: Duration, event: FeedbackEvent) {
        log::trace!("feedback: {} due in {delay:?}", event.action_id);
        self.pending.push((delay, event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cr_core::Viewport;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn event(id: &str) -> FeedbackEvent {
        FeedbackEvent {
            action_id: id.to_string(),
            strategy: Strategy::IntelligentScaling,
            confidence: 0.9,
            reasoning: "test".into(),
            context: ResizeContext::new(Viewport::default(), Viewport::new(400.0, 300.0), []),
            original_positions: Vec::new(),
        }
    }

    #[test]
    fn delivers_after_delay() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut queue = DeferredFeedback::new();
        let sink = Rc::clone(&seen);
        queue.subscribe(move |e| sink.borrow_mut().push(e.action_id.clone()));

        queue.schedule(Duration::from_millis(1000), event("resize_1"));
        assert_eq!(queue.advance(Duration::from_millis(400)), 0);
        assert!(seen.borrow().is_empty());

        assert_eq!(queue.advance(Duration::from_millis(600)), 1);
        assert_eq!(*seen.borrow(), vec!["resize_1".to_string()]);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn due_without_listeners_is_dropped() {
        let mut queue = DeferredFeedback::new();
        queue.schedule(Duration::from_millis(10), event("lost"));
        assert_eq!(queue.advance(Duration::from_secs(1)), 1);
        assert_eq!(queue.pending(), 0);

        // A late subscriber never sees it.
        let seen = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&seen);
        queue.subscribe(move |_| *sink.borrow_mut() += 1);
        queue.advance(Duration::from_secs(1));
        assert_eq!(*seen.borrow(), 0);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let seen = Rc::new(RefCell::new(0));
        let mut queue = DeferredFeedback::new();
        let sink = Rc::clone(&seen);
        let id = queue.subscribe(move |_| *sink.borrow_mut() += 1);
        assert!(queue.unsubscribe(id));
        assert!(!queue.unsubscribe(id));

        queue.schedule(Duration::ZERO, event("x"));
        queue.advance(Duration::ZERO);
        assert_eq!(*seen.borrow(), 0);
    }
}
