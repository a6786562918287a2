use super::event_scheduler::EventScheduler;
use super::process::{Process, ProcessContext, Suspend, Waker};
use super::resource::{Resource, ResourcePool};
use super::store::Store;
use super::types::{ProcessId, SimTime};
use log::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcessStatus {
    Scheduled,
    Passive,
    Finished,
}

struct ProcessSlot<W> {
    process: Option<Box<dyn Process<W>>>,
    status: ProcessStatus,
}

/// Single-timeline discrete-event engine over shared run state `W`.
///
/// Processes are resumed earliest wake-up first; wake-ups due at the same
/// instant run in process registration order.
pub struct SimulationEngine<W> {
    world: W,
    processes: Vec<ProcessSlot<W>>,
    scheduler: EventScheduler,
    waker: Waker,
    current_time: SimTime,
    steps: u64,
}

impl<W> SimulationEngine<W> {
    /// Create a new SimulationEngine owning the shared run state
    pub fn new(world: W) -> Self {
        Self {
            world,
            processes: Vec::new(),
            scheduler: EventScheduler::new(),
            waker: Waker::new(),
            current_time: 0.0,
            steps: 0,
        }
    }

    /// Create a bounded buffer wired to this engine's waker
    pub fn create_store<T>(&self, name: &str, capacity: usize) -> Store<T> {
        Store::new(name, capacity, self.waker.clone())
    }

    /// Create a capacity-N resource wired to this engine's waker
    pub fn create_resource(&self, name: &str, capacity: usize) -> Resource {
        Resource::new(name, capacity, self.waker.clone())
    }

    /// Create a pool of independent capacity-1 resources
    pub fn create_resource_pool(&self, name: &str, size: usize) -> ResourcePool {
        ResourcePool::new(name, size, self.waker.clone())
    }

    /// Register a process; it first runs at the current time
    pub fn register_process(&mut self, process: Box<dyn Process<W>>) -> ProcessId {
        let pid = ProcessId(self.processes.len());
        debug!("Registered process {} ({})", pid, process.name());
        self.processes.push(ProcessSlot {
            process: Some(process),
            status: ProcessStatus::Scheduled,
        });
        self.scheduler.schedule(pid, self.current_time);
        pid
    }

    /// Run until the clock reaches `until`. Wake-ups due at or after
    /// `until` are left pending and every process stays where it is.
    pub fn run(&mut self, until: SimTime) -> SimTime {
        info!("Running simulation from t={} until t={}", self.current_time, until);

        while let Some(next_time) = self.scheduler.peek_next_time() {
            if next_time >= until {
                break;
            }
            self.step();
        }
        if until > self.current_time {
            self.current_time = until;
        }

        info!(
            "Simulation stopped at t={} after {} resumptions ({} processes)",
            self.current_time,
            self.steps,
            self.processes.len()
        );
        self.current_time
    }

    /// Resume the process with the earliest wake-up. Returns false when
    /// nothing is scheduled.
    pub fn step(&mut self) -> bool {
        let wakeup = match self.scheduler.pop_next() {
            Some(wakeup) => wakeup,
            None => return false,
        };
        assert!(
            wakeup.time >= self.current_time,
            "clock would move backwards from {} to {}",
            self.current_time,
            wakeup.time
        );
        self.current_time = wakeup.time;
        self.steps += 1;

        let pid = wakeup.process_id;
        let mut spawned = Vec::new();
        let slot = &mut self.processes[pid.0];
        let suspend = match slot.process.as_mut() {
            Some(process) => {
                let mut ctx = ProcessContext::new(pid, self.current_time, &mut self.world, &mut spawned);
                process.resume(&mut ctx)
            }
            None => Suspend::Finish,
        };

        match suspend {
            Suspend::Timeout(delay) => {
                assert!(
                    delay >= 0.0 && delay.is_finite(),
                    "process {} asked for invalid timeout {}",
                    pid,
                    delay
                );
                slot.status = ProcessStatus::Scheduled;
                self.scheduler.schedule(pid, self.current_time + delay);
            }
            Suspend::Passivate => slot.status = ProcessStatus::Passive,
            Suspend::Finish => {
                slot.status = ProcessStatus::Finished;
                // Dropping the process releases any guards it still holds
                slot.process = None;
            }
        }

        for process in spawned {
            self.register_process(process);
        }
        self.dispatch_wakeups();
        true
    }

    fn dispatch_wakeups(&mut self) {
        for pid in self.waker.drain() {
            let slot = &mut self.processes[pid.0];
            if slot.status == ProcessStatus::Passive {
                slot.status = ProcessStatus::Scheduled;
                self.scheduler.schedule(pid, self.current_time);
            }
        }
    }

    /// Get current simulation time
    pub fn current_time(&self) -> SimTime {
        self.current_time
    }

    /// Number of resumptions executed so far
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn process_count(&self) -> usize {
        self.processes.len()
    }

    /// Check if there are pending wake-ups in the scheduler
    pub fn has_pending_events(&self) -> bool {
        self.scheduler.has_events()
    }

    pub fn world(&self) -> &W {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut W {
        &mut self.world
    }

    /// Stop the run and return the shared state. Processes are dropped,
    /// which releases any resource units they held.
    pub fn into_world(self) -> W {
        self.world
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resource::ResourceGuard;

    type Trace = Vec<(SimTime, String)>;

    /// Ticks forever at a fixed period, logging its name
    struct Ticker {
        name: String,
        period: SimTime,
    }

    impl Process<Trace> for Ticker {
        fn name(&self) -> &str {
            &self.name
        }

        fn resume(&mut self, ctx: &mut ProcessContext<'_, Trace>) -> Suspend {
            let now = ctx.now();
            ctx.world().push((now, self.name.clone()));
            Suspend::Timeout(self.period)
        }
    }

    #[test]
    fn test_horizon_is_the_only_stop_condition() {
        let mut engine = SimulationEngine::new(Trace::new());
        engine.register_process(Box::new(Ticker { name: "a".into(), period: 1.0 }));

        let end = engine.run(5.0);
        assert_eq!(end, 5.0);
        let times: Vec<SimTime> = engine.world().iter().map(|(t, _)| *t).collect();
        assert_eq!(times, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert!(engine.has_pending_events());
    }

    #[test]
    fn test_same_instant_runs_in_registration_order() {
        let mut engine = SimulationEngine::new(Trace::new());
        engine.register_process(Box::new(Ticker { name: "slow".into(), period: 2.0 }));
        engine.register_process(Box::new(Ticker { name: "fast".into(), period: 1.0 }));

        engine.run(3.0);
        let names: Vec<&str> = engine.world().iter().map(|(_, n)| n.as_str()).collect();
        assert_eq!(names, vec!["slow", "fast", "fast", "slow", "fast"]);
    }

    struct Producer {
        store: Store<u32>,
        next: u32,
        blocked: bool,
    }

    impl Process<Trace> for Producer {
        fn name(&self) -> &str {
            "producer"
        }

        fn resume(&mut self, ctx: &mut ProcessContext<'_, Trace>) -> Suspend {
            let now = ctx.now();
            if self.blocked {
                ctx.world().push((now, format!("admitted {}", self.next - 1)));
                self.blocked = false;
            }
            if self.next == 3 {
                return Suspend::Finish;
            }
            let item = self.next;
            self.next += 1;
            match self.store.put(ctx.pid(), item) {
                crate::core::store::PutStatus::Stored => Suspend::Timeout(0.0),
                crate::core::store::PutStatus::Blocked => {
                    self.blocked = true;
                    Suspend::Passivate
                }
            }
        }
    }

    struct Consumer {
        store: Store<u32>,
        period: SimTime,
    }

    impl Process<Trace> for Consumer {
        fn name(&self) -> &str {
            "consumer"
        }

        fn resume(&mut self, ctx: &mut ProcessContext<'_, Trace>) -> Suspend {
            match self.store.get(ctx.pid()) {
                Some(item) => {
                    let now = ctx.now();
                    ctx.world().push((now, format!("got {}", item)));
                    Suspend::Timeout(self.period)
                }
                None => Suspend::Passivate,
            }
        }
    }

    #[test]
    fn test_blocking_put_and_get_hand_off() {
        let mut engine = SimulationEngine::new(Trace::new());
        let store = engine.create_store::<u32>("line", 1);
        // Consumer registered first, so it waits on an empty store at t=0
        engine.register_process(Box::new(Consumer { store: store.clone(), period: 5.0 }));
        engine.register_process(Box::new(Producer { store: store.clone(), next: 0, blocked: false }));

        engine.run(20.0);
        let events: Vec<(SimTime, &str)> = engine.world().iter().map(|(t, e)| (*t, e.as_str())).collect();
        assert_eq!(
            events,
            vec![
                (0.0, "got 0"),
                (5.0, "got 1"),
                (5.0, "admitted 2"),
                (10.0, "got 2"),
            ]
        );
        assert!(store.is_empty());
    }

    struct Worker {
        name: String,
        resource: Resource,
        guard: Option<ResourceGuard>,
        duration: SimTime,
    }

    impl Process<Trace> for Worker {
        fn name(&self) -> &str {
            &self.name
        }

        fn resume(&mut self, ctx: &mut ProcessContext<'_, Trace>) -> Suspend {
            let now = ctx.now();
            if self.guard.take().is_some() {
                ctx.world().push((now, format!("{} done", self.name)));
                return Suspend::Finish;
            }
            match self.resource.request(ctx.pid()) {
                Some(guard) => {
                    ctx.world().push((now, format!("{} start", self.name)));
                    self.guard = Some(guard);
                    Suspend::Timeout(self.duration)
                }
                None => Suspend::Passivate,
            }
        }
    }

    #[test]
    fn test_resource_serves_waiters_fifo() {
        let mut engine = SimulationEngine::new(Trace::new());
        let machine = engine.create_resource("machine", 1);
        for name in ["w0", "w1", "w2"] {
            engine.register_process(Box::new(Worker {
                name: name.into(),
                resource: machine.clone(),
                guard: None,
                duration: 2.0,
            }));
        }

        engine.run(100.0);
        let events: Vec<(SimTime, &str)> = engine.world().iter().map(|(t, e)| (*t, e.as_str())).collect();
        assert_eq!(
            events,
            vec![
                (0.0, "w0 start"),
                (2.0, "w0 done"),
                (2.0, "w1 start"),
                (4.0, "w1 done"),
                (4.0, "w2 start"),
                (6.0, "w2 done"),
            ]
        );
        assert_eq!(machine.in_use(), 0);
    }

    struct Spawner;

    impl Process<Trace> for Spawner {
        fn name(&self) -> &str {
            "spawner"
        }

        fn resume(&mut self, ctx: &mut ProcessContext<'_, Trace>) -> Suspend {
            ctx.spawn(Box::new(Ticker { name: "child".into(), period: 10.0 }));
            Suspend::Finish
        }
    }

    #[test]
    fn test_spawned_process_starts_now() {
        let mut engine = SimulationEngine::new(Trace::new());
        engine.register_process(Box::new(Spawner));
        engine.run(15.0);

        assert_eq!(engine.process_count(), 2);
        let times: Vec<SimTime> = engine.world().iter().map(|(t, _)| *t).collect();
        assert_eq!(times, vec![0.0, 10.0]);
    }
}
