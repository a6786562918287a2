//! Logical processes driven by the simulation engine.
//!
//! A process is an explicit state machine. Each call to [`Process::resume`]
//! runs it up to its next suspension point and reports how it wants to be
//! woken: after a delay, or when a store or resource it queued on hands it
//! what it asked for.

use super::types::{ProcessId, SimTime};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

/// How a process yields control back to the engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Suspend {
    /// Resume after the given delay
    Timeout(SimTime),
    /// Sleep until a store or resource wakes this process
    Passivate,
    /// The process is done and will never run again
    Finish,
}

/// A suspendable logical process over shared run state `W`
pub trait Process<W> {
    /// Short name used in log lines
    fn name(&self) -> &str;

    /// Run until the next suspension point
    fn resume(&mut self, ctx: &mut ProcessContext<'_, W>) -> Suspend;
}

/// View of the engine handed to a process while it runs
pub struct ProcessContext<'a, W> {
    pid: ProcessId,
    now: SimTime,
    world: &'a mut W,
    spawned: &'a mut Vec<Box<dyn Process<W>>>,
}

impl<'a, W> ProcessContext<'a, W> {
    pub(crate) fn new(
        pid: ProcessId,
        now: SimTime,
        world: &'a mut W,
        spawned: &'a mut Vec<Box<dyn Process<W>>>,
    ) -> Self {
        Self {
            pid,
            now,
            world,
            spawned,
        }
    }

    /// Id of the running process
    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    /// Current simulation time
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Run-scoped shared state
    pub fn world(&mut self) -> &mut W {
        self.world
    }

    /// Start a new process; it first runs at the current time
    pub fn spawn(&mut self, process: Box<dyn Process<W>>) {
        self.spawned.push(process);
    }
}

/// Queue of processes to reschedule at the current instant.
///
/// Stores and resources hold a clone and push the id of every waiter they
/// satisfy; the engine drains it after each resumption.
#[derive(Clone, Default)]
pub struct Waker {
    queue: Rc<RefCell<VecDeque<ProcessId>>>,
}

impl Waker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wake(&self, pid: ProcessId) {
        self.queue.borrow_mut().push_back(pid);
    }

    pub(crate) fn drain(&self) -> Vec<ProcessId> {
        self.queue.borrow_mut().drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waker_drains_in_wake_order() {
        let waker = Waker::new();
        let clone = waker.clone();
        waker.wake(ProcessId(4));
        clone.wake(ProcessId(1));

        assert_eq!(waker.drain(), vec![ProcessId(4), ProcessId(1)]);
        assert!(waker.drain().is_empty());
    }
}
