//! Time-ordered event queue.

use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Offset applied to an event whose timestamp is already taken.
pub const TIE_BREAK_JITTER: f64 = 0.01;

/// Total-ordered key over simulated time.
#[derive(Debug, Clone, Copy)]
struct TimeKey(f64);

impl PartialEq for TimeKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for TimeKey {}

impl PartialOrd for TimeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// An event popped from the queue, with the time it was filed under.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledEvent<E> {
    pub time: f64,
    pub event: E,
}

/// A queue of pending events ordered by simulated time.
///
/// Every stored timestamp is unique. When `schedule` is asked for a time that
/// is already occupied, the new event is pushed forward by
/// [`TIE_BREAK_JITTER`] until it lands on a free timestamp, so the event
/// inserted later always runs later. Colliding events therefore carry a small
/// timestamp skew.
#[derive(Debug)]
pub struct EventQueue<E> {
    events: BTreeMap<TimeKey, E>,
}

impl<E> EventQueue<E> {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            events: BTreeMap::new(),
        }
    }

    /// Schedule `event` at `time`. Returns the time actually used.
    ///
    /// `time` must be finite.
    pub fn schedule(&mut self, time: f64, event: E) -> f64 {
        debug_assert!(time.is_finite(), "event scheduled at non-finite time {time}");
        let mut key = TimeKey(time);
        while self.events.contains_key(&key) {
            key = TimeKey(key.0 + TIE_BREAK_JITTER);
        }
        self.events.insert(key, event);
        key.0
    }

    /// Remove and return the earliest event.
    pub fn pop(&mut self) -> Option<ScheduledEvent<E>> {
        self.events
            .pop_first()
            .map(|(key, event)| ScheduledEvent { time: key.0, event })
    }

    /// Remove and return the earliest event matching `pred`, wherever it sits
    /// in the queue.
    pub fn pop_where(&mut self, mut pred: impl FnMut(&E) -> bool) -> Option<ScheduledEvent<E>> {
        let key = self.events.iter().find(|(_, event)| pred(event)).map(|(key, _)| *key)?;
        self.events.remove(&key).map(|event| ScheduledEvent { time: key.0, event })
    }

    /// Time of the earliest event, if any.
    pub fn peek_time(&self) -> Option<f64> {
        self.events.keys().next().map(|key| key.0)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_in_time_order() {
        let mut queue = EventQueue::new();
        queue.schedule(5.0, "c");
        queue.schedule(1.0, "a");
        queue.schedule(3.0, "b");

        let order: Vec<_> = std::iter::from_fn(|| queue.pop()).map(|e| e.event).collect();
        assert_eq!(order, vec!["a", "b", "c"]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_equal_times_are_jittered_in_insertion_order() {
        let mut queue = EventQueue::new();
        let t1 = queue.schedule(10.0, "first");
        let t2 = queue.schedule(10.0, "second");
        let t3 = queue.schedule(10.0, "third");

        assert_eq!(t1, 10.0);
        assert!((t2 - 10.01).abs() < 1e-9);
        assert!((t3 - 10.02).abs() < 1e-9);

        assert_eq!(queue.pop().unwrap().event, "first");
        assert_eq!(queue.pop().unwrap().event, "second");
        assert_eq!(queue.pop().unwrap().event, "third");
    }

    #[test]
    fn test_payloads_need_no_ordering() {
        // Closures implement neither Ord nor PartialEq.
        let mut queue: EventQueue<Box<dyn Fn() -> u32>> = EventQueue::new();
        queue.schedule(2.0, Box::new(|| 2));
        queue.schedule(2.0, Box::new(|| 3));

        assert_eq!(queue.len(), 2);
        assert_eq!((queue.pop().unwrap().event)(), 2);
        assert_eq!((queue.pop().unwrap().event)(), 3);
    }

    #[test]
    fn test_pop_where_skips_non_matching() {
        let mut queue = EventQueue::new();
        queue.schedule(1.0, 'a');
        queue.schedule(2.0, 'b');
        queue.schedule(3.0, 'b');

        let popped = queue.pop_where(|e| *e == 'b').unwrap();
        assert_eq!(popped, ScheduledEvent { time: 2.0, event: 'b' });
        assert_eq!(queue.pop_where(|e| *e == 'c'), None);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.peek_time(), Some(1.0));
    }

    #[test]
    fn test_peek_time() {
        let mut queue = EventQueue::new();
        assert_eq!(queue.peek_time(), None);
        queue.schedule(7.5, ());
        queue.schedule(2.5, ());
        assert_eq!(queue.peek_time(), Some(2.5));
    }
}
