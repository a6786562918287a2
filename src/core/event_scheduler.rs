use super::types::{ProcessId, SimTime};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// A pending resumption of one process at an absolute time
#[derive(Debug, Clone, Copy)]
pub struct ScheduledWakeup {
    pub time: SimTime,
    pub process_id: ProcessId,
    pub sequence_num: u64,
}

impl PartialEq for ScheduledWakeup {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ScheduledWakeup {}

impl PartialOrd for ScheduledWakeup {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledWakeup {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap (BinaryHeap is max-heap by default)
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.process_id.cmp(&self.process_id))
            .then_with(|| other.sequence_num.cmp(&self.sequence_num))
    }
}

/// Priority queue of wake-ups ordered by time, then process registration order
pub struct EventScheduler {
    event_queue: BinaryHeap<ScheduledWakeup>,
    sequence_counter: u64,
}

impl EventScheduler {
    /// Create a new EventScheduler
    pub fn new() -> Self {
        Self {
            event_queue: BinaryHeap::new(),
            sequence_counter: 0,
        }
    }

    /// Schedule a process to resume at the given absolute time
    pub fn schedule(&mut self, process_id: ProcessId, time: SimTime) {
        assert!(time.is_finite(), "wake-up time for {} is not finite", process_id);

        self.event_queue.push(ScheduledWakeup {
            time,
            process_id,
            sequence_num: self.sequence_counter,
        });
        self.sequence_counter += 1;
    }

    /// Remove and return the earliest wake-up
    pub fn pop_next(&mut self) -> Option<ScheduledWakeup> {
        self.event_queue.pop()
    }

    /// Get the time of the earliest wake-up without removing it
    pub fn peek_next_time(&self) -> Option<SimTime> {
        self.event_queue.peek().map(|wakeup| wakeup.time)
    }

    /// Check if there are any wake-ups remaining in the queue
    pub fn has_events(&self) -> bool {
        !self.event_queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.event_queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.event_queue.is_empty()
    }
}

impl Default for EventScheduler {
    fn default() -> Self {
        Self::new()
    }
}
