//! Capacity-limited mutual-exclusion resource with a FIFO wait list.
//!
//! Units are held through [`ResourceGuard`]; dropping the guard releases the
//! unit on every exit path, including a process being abandoned when the run
//! stops. A released unit passes straight to the longest-waiting requester.

use super::process::Waker;
use super::types::ProcessId;
use log::debug;
use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;

struct ResourceInner {
    capacity: usize,
    in_use: usize,
    queue: VecDeque<ProcessId>,
    granted: HashSet<ProcessId>,
}

/// Handle to a shared resource. Clones share the same units.
#[derive(Clone)]
pub struct Resource {
    name: Rc<str>,
    inner: Rc<RefCell<ResourceInner>>,
    waker: Waker,
}

impl Resource {
    pub fn new(name: &str, capacity: usize, waker: Waker) -> Self {
        assert!(capacity > 0, "resource '{}' needs a positive capacity", name);
        Self {
            name: Rc::from(name),
            inner: Rc::new(RefCell::new(ResourceInner {
                capacity,
                in_use: 0,
                queue: VecDeque::new(),
                granted: HashSet::new(),
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

    /// Units currently held, including ones granted to processes not yet resumed
    pub fn in_use(&self) -> usize {
        self.inner.borrow().in_use
    }

    /// Number of processes waiting for a unit
    pub fn queue_len(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    /// Acquire a unit for `pid`. On `None` the caller is queued and is woken
    /// once a unit has been granted to it; calling `request` again then
    /// returns the guard.
    pub fn request(&self, pid: ProcessId) -> Option<ResourceGuard> {
        let mut inner = self.inner.borrow_mut();
        if inner.granted.remove(&pid) {
            return Some(self.guard(pid));
        }
        if inner.in_use < inner.capacity && inner.queue.is_empty() {
            inner.in_use += 1;
            return Some(self.guard(pid));
        }
        if !inner.queue.contains(&pid) {
            debug!("[Resource:{}] {} queued ({} waiting)", self.name, pid, inner.queue.len() + 1);
            inner.queue.push_back(pid);
        }
        None
    }

    fn guard(&self, holder: ProcessId) -> ResourceGuard {
        ResourceGuard {
            resource: self.clone(),
            holder,
        }
    }

    fn release(&self) {
        let mut inner = self.inner.borrow_mut();
        match inner.queue.pop_front() {
            Some(next) => {
                inner.granted.insert(next);
                self.waker.wake(next);
            }
            None => inner.in_use -= 1,
        }
    }
}

/// A held unit of a [`Resource`]; released when dropped
pub struct ResourceGuard {
    resource: Resource,
    holder: ProcessId,
}

impl ResourceGuard {
    pub fn holder(&self) -> ProcessId {
        self.holder
    }

    pub fn resource_name(&self) -> &str {
        self.resource.name()
    }

    /// Release the unit explicitly
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for ResourceGuard {
    fn drop(&mut self) {
        self.resource.release();
    }
}

/// Independent capacity-1 resources, one per interchangeable station
#[derive(Clone)]
pub struct ResourcePool {
    units: Vec<Resource>,
}

impl ResourcePool {
    pub fn new(name: &str, size: usize, waker: Waker) -> Self {
        let units = (0..size)
            .map(|i| Resource::new(&format!("{}_{}", name, i), 1, waker.clone()))
            .collect();
        Self { units }
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn unit(&self, index: usize) -> Option<&Resource> {
        self.units.get(index)
    }

    pub fn units(&self) -> &[Resource] {
        &self.units
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_bounds_concurrent_holders() {
        let waker = Waker::new();
        let resource = Resource::new("press", 2, waker);

        let first = resource.request(ProcessId(0));
        let second = resource.request(ProcessId(1));
        assert!(first.is_some() && second.is_some());
        assert!(resource.request(ProcessId(2)).is_none());
        assert_eq!(resource.in_use(), 2);
        assert_eq!(resource.queue_len(), 1);
    }

    #[test]
    fn test_release_hands_unit_to_longest_waiter() {
        let waker = Waker::new();
        let resource = Resource::new("press", 1, waker.clone());

        let held = resource.request(ProcessId(0)).unwrap();
        assert!(resource.request(ProcessId(1)).is_none());
        assert!(resource.request(ProcessId(2)).is_none());

        held.release();
        assert_eq!(waker.drain(), vec![ProcessId(1)]);
        assert_eq!(resource.in_use(), 1);

        // A newcomer cannot jump the queue while a grant is outstanding
        assert!(resource.request(ProcessId(3)).is_none());
        let granted = resource.request(ProcessId(1));
        assert!(granted.is_some());
        assert_eq!(granted.as_ref().map(|g| g.holder()), Some(ProcessId(1)));

        drop(granted);
        assert_eq!(waker.drain(), vec![ProcessId(2)]);
    }

    #[test]
    fn test_drop_releases_unit() {
        let waker = Waker::new();
        let resource = Resource::new("press", 1, waker);
        {
            let _guard = resource.request(ProcessId(0)).unwrap();
            assert_eq!(resource.in_use(), 1);
        }
        assert_eq!(resource.in_use(), 0);
        assert!(resource.request(ProcessId(1)).is_some());
    }

    #[test]
    fn test_pool_units_are_independent() {
        let waker = Waker::new();
        let pool = ResourcePool::new("repair", 3, waker);
        assert_eq!(pool.len(), 3);

        let guards: Vec<_> = pool
            .units()
            .iter()
            .enumerate()
            .map(|(i, unit)| unit.request(ProcessId(i)))
            .collect();
        assert!(guards.iter().all(|g| g.is_some()));
        assert_eq!(pool.unit(1).map(|u| u.name().to_string()), Some("repair_1".to_string()));
        assert!(pool.unit(3).is_none());
    }
}
