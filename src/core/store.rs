//! Capacity-bounded FIFO buffer shared between processes.
//!
//! `get` and `put` are the blocking forms: when they cannot complete they
//! queue the caller and the caller should return [`Suspend::Passivate`].
//! Items and free slots are then handed over directly in FIFO order, so a
//! woken getter always finds its item waiting and a woken putter knows its
//! item went in. The `try_*`, `take*` and `peek*` forms never queue anyone.
//!
//! [`Suspend::Passivate`]: super::process::Suspend::Passivate

use super::process::Waker;
use super::types::ProcessId;
use log::debug;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

/// Outcome of a blocking put
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutStatus {
    /// The item is in the buffer
    Stored,
    /// The buffer is full; the item waits and the caller is woken once it is admitted
    Blocked,
}

struct StoreInner<T> {
    capacity: usize,
    items: VecDeque<T>,
    get_waiters: VecDeque<ProcessId>,
    delivered: HashMap<ProcessId, T>,
    put_queue: VecDeque<(ProcessId, T)>,
}

/// Handle to a bounded FIFO buffer. Clones share the same buffer.
pub struct Store<T> {
    name: Rc<str>,
    inner: Rc<RefCell<StoreInner<T>>>,
    waker: Waker,
}

impl<T> Clone for Store<T> {
    fn clone(&self) -> Self {
        Self {
            name: Rc::clone(&self.name),
            inner: Rc::clone(&self.inner),
            waker: self.waker.clone(),
        }
    }
}

impl<T> Store<T> {
    pub fn new(name: &str, capacity: usize, waker: Waker) -> Self {
        assert!(capacity > 0, "store '{}' needs a positive capacity", name);
        Self {
            name: Rc::from(name),
            inner: Rc::new(RefCell::new(StoreInner {
                capacity,
                items: VecDeque::new(),
                get_waiters: VecDeque::new(),
                delivered: HashMap::new(),
                put_queue: VecDeque::new(),
            })),
            waker,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capacity(&self) -> usize {
        self.inner.borrow().capacity
    }

    /// Number of items currently held
    pub fn len(&self) -> usize {
        self.inner.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        let inner = self.inner.borrow();
        inner.items.len() >= inner.capacity
    }

    /// Blocking put. Appends when there is room, otherwise queues the item
    /// behind earlier blocked puts and registers `pid` to be woken.
    pub fn put(&self, pid: ProcessId, item: T) -> PutStatus {
        let mut inner = self.inner.borrow_mut();
        if inner.items.len() < inner.capacity && inner.put_queue.is_empty() {
            inner.items.push_back(item);
            Self::settle(&mut inner, &self.waker);
            PutStatus::Stored
        } else {
            debug!("[Store:{}] Full ({}), put from {} blocked", self.name, inner.capacity, pid);
            inner.put_queue.push_back((pid, item));
            PutStatus::Blocked
        }
    }

    /// Blocking get. Returns the head item, or an item already handed to
    /// `pid` while it slept; otherwise registers `pid` as a waiter.
    pub fn get(&self, pid: ProcessId) -> Option<T> {
        let mut inner = self.inner.borrow_mut();
        if let Some(item) = inner.delivered.remove(&pid) {
            return Some(item);
        }
        match inner.items.pop_front() {
            Some(item) => {
                Self::settle(&mut inner, &self.waker);
                Some(item)
            }
            None => {
                if !inner.get_waiters.contains(&pid) {
                    inner.get_waiters.push_back(pid);
                }
                None
            }
        }
    }

    /// Non-blocking get of the head item
    pub fn try_get(&self) -> Option<T> {
        let mut inner = self.inner.borrow_mut();
        let item = inner.items.pop_front();
        if item.is_some() {
            Self::settle(&mut inner, &self.waker);
        }
        item
    }

    /// Remove exactly `count` head items, or nothing if fewer are present
    pub fn take(&self, count: usize) -> Option<Vec<T>> {
        let mut inner = self.inner.borrow_mut();
        if inner.items.len() < count {
            return None;
        }
        let batch: Vec<T> = inner.items.drain(..count).collect();
        Self::settle(&mut inner, &self.waker);
        Some(batch)
    }

    /// Remove the first `count` items matching `predicate`, or nothing if
    /// fewer match. Remaining items keep their relative order.
    pub fn take_where<F>(&self, count: usize, predicate: F) -> Option<Vec<T>>
    where
        F: Fn(&T) -> bool,
    {
        let mut inner = self.inner.borrow_mut();
        if inner.items.iter().filter(|item| predicate(item)).count() < count {
            return None;
        }

        let mut batch = Vec::with_capacity(count);
        let mut kept = VecDeque::with_capacity(inner.items.len());
        for item in inner.items.drain(..) {
            if batch.len() < count && predicate(&item) {
                batch.push(item);
            } else {
                kept.push_back(item);
            }
        }
        inner.items = kept;
        Self::settle(&mut inner, &self.waker);
        Some(batch)
    }

    /// Count items matching `predicate` without removing anything
    pub fn count_where<F>(&self, predicate: F) -> usize
    where
        F: Fn(&T) -> bool,
    {
        self.inner.borrow().items.iter().filter(|item| predicate(item)).count()
    }

    /// Fold over the current contents in FIFO order without copying them
    pub fn fold<B, F>(&self, init: B, f: F) -> B
    where
        F: FnMut(B, &T) -> B,
    {
        self.inner.borrow().items.iter().fold(init, f)
    }

    /// Snapshot of the current contents in FIFO order
    pub fn peek_all(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.inner.borrow().items.iter().cloned().collect()
    }

    /// Hand items to waiting getters and admit blocked puts while possible
    fn settle(inner: &mut StoreInner<T>, waker: &Waker) {
        loop {
            if !inner.get_waiters.is_empty() && !inner.items.is_empty() {
                if let (Some(pid), Some(item)) = (inner.get_waiters.pop_front(), inner.items.pop_front()) {
                    inner.delivered.insert(pid, item);
                    waker.wake(pid);
                }
                continue;
            }
            if inner.items.len() < inner.capacity {
                if let Some((pid, item)) = inner.put_queue.pop_front() {
                    inner.items.push_back(item);
                    waker.wake(pid);
                    continue;
                }
            }
            break;
        }
    }
}

/// Items waiting to be put into their destination stores, one at a time.
///
/// Stations fill an outbox when a job finishes and flush it; a flush stops
/// at the first put that blocks and continues on the next call.
pub struct Outbox<T> {
    pending: VecDeque<(Store<T>, T)>,
}

/// Result of flushing an [`Outbox`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flush {
    Done,
    Blocked,
}

impl<T> Outbox<T> {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
        }
    }

    pub fn push(&mut self, store: &Store<T>, item: T) {
        self.pending.push_back((store.clone(), item));
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Put pending items in order until one blocks
    pub fn flush(&mut self, pid: ProcessId) -> Flush {
        while let Some((store, item)) = self.pending.pop_front() {
            if store.put(pid, item) == PutStatus::Blocked {
                return Flush::Blocked;
            }
        }
        Flush::Done
    }
}

impl<T> Default for Outbox<T> {
    fn default() -> Self {
        Self::new()
    }
}
