/**
 * Event History Buffer
 *
 * Bounded, in-memory record of recent domain events so a reconnecting client
 * can ask for everything after a timestamp it last saw.
 *
 * - timestamps never decrease: each append is stamped `max(now, last)`
 * - FIFO eviction once `capacity` is exceeded
 * - `since(t)` is a lazy, restartable view; it never mutates the buffer
 *
 * The buffer is single-process and not durable. A client whose last seen
 * timestamp predates the oldest retained event gets the survivors only.
 */

use std::collections::{vec_deque, VecDeque};

use crate::shared::{event::now_millis, DomainEvent, EventType};

pub const DEFAULT_CAPACITY: usize = 500;

#[derive(Debug, Clone)]
pub struct EventHistory {
    events: VecDeque<DomainEvent>,
    capacity: usize,
    last_timestamp: i64,
}

impl Default for EventHistory {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl EventHistory {
    /// Create an empty buffer; a zero capacity is raised to one
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: VecDeque::with_capacity(capacity.min(DEFAULT_CAPACITY) + 1),
            capacity,
            last_timestamp: i64::MIN,
        }
    }

    /// Record an event stamped with the current wall clock
    pub fn append(&mut self, event_type: EventType, payload: serde_json::Value) -> DomainEvent {
        self.append_at(event_type, payload, now_millis())
    }

    /// Record an event observed at `now_ms`
    ///
    /// A clock that went backwards is clamped to the last recorded timestamp.
    pub fn append_at(
        &mut self,
        event_type: EventType,
        payload: serde_json::Value,
        now_ms: i64,
    ) -> DomainEvent {
        let timestamp = now_ms.max(self.last_timestamp);
        self.last_timestamp = timestamp;

        let event = DomainEvent::new(event_type, payload, timestamp);
        self.events.push_back(event.clone());
        while self.events.len() > self.capacity {
            self.events.pop_front();
        }
        event
    }

    /// Retained events with `timestamp > t`, ascending
    pub fn since(&self, t: i64) -> Since<'_> {
        // Timestamps are sorted, so the start index is a binary search away.
        let start = self.events.partition_point(|e| e.timestamp <= t);
        Since {
            inner: self.events.range(start..),
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn oldest_timestamp(&self) -> Option<i64> {
        self.events.front().map(|e| e.timestamp)
    }
}

/// Iterator returned by `EventHistory::since`
#[derive(Debug, Clone)]
pub struct Since<'a> {
    inner: vec_deque::Iter<'a, DomainEvent>,
}

impl<'a> Iterator for Since<'a> {
    type Item = &'a DomainEvent;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Since<'_> {}
