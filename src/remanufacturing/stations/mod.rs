//! Process stations of the line.
//!
//! Resource-gated stations share one driver, [`StationWorker`]: acquire a
//! unit of the station's resource, ask the station logic to start a job from
//! its input buffers, hold the unit for the job's duration, route the output
//! and release. When the logic finds too little input the unit is released
//! before backing off, so an idle worker never blocks a busy one.

pub mod arrival;
pub mod assembly;
pub mod cleaning_inspection;
pub mod component_cleaning;
pub mod component_inspection;
pub mod demand;
pub mod disassembly;
pub mod monitor;
pub mod product_inspection;
pub mod repair;
pub mod replenishment;

use super::config::PerType;
use super::entities::ComponentType;
use super::state::LineState;
use crate::core::process::{Process, ProcessContext, Suspend};
use crate::core::resource::{Resource, ResourceGuard};
use crate::core::store::{Flush, Outbox};
use crate::core::types::SimTime;
use log::debug;

/// Back-off used by stations whose input is short
pub const DEFAULT_BACKOFF: SimTime = 1.0;

/// A job taken from the input buffers, and how long it occupies the station
pub struct Started<J> {
    pub job: J,
    pub duration: SimTime,
}

/// Business rules of one station
pub trait StationLogic {
    type Job;
    type Output;

    /// Take input for one job. `None` when there is not enough input.
    fn start(&mut self, ctx: &mut ProcessContext<'_, LineState>) -> Option<Started<Self::Job>>;

    /// Finish a job and queue its output for routing
    fn complete(
        &mut self,
        job: Self::Job,
        ctx: &mut ProcessContext<'_, LineState>,
        outbox: &mut Outbox<Self::Output>,
    );

    fn backoff(&self) -> SimTime {
        DEFAULT_BACKOFF
    }
}

enum WorkerState<J> {
    Idle,
    Processing { job: J, duration: SimTime },
    Routing,
}

/// One worker of a station, contending for the station's resource
pub struct StationWorker<L: StationLogic> {
    name: String,
    logic: L,
    resource: Resource,
    guard: Option<ResourceGuard>,
    state: WorkerState<L::Job>,
    outbox: Outbox<L::Output>,
}

impl<L: StationLogic> StationWorker<L> {
    pub fn new(name: impl Into<String>, logic: L, resource: Resource) -> Self {
        Self {
            name: name.into(),
            logic,
            resource,
            guard: None,
            state: WorkerState::Idle,
            outbox: Outbox::new(),
        }
    }
}

impl<L: StationLogic> Process<LineState> for StationWorker<L> {
    fn name(&self) -> &str {
        &self.name
    }

    fn resume(&mut self, ctx: &mut ProcessContext<'_, LineState>) -> Suspend {
        loop {
            match std::mem::replace(&mut self.state, WorkerState::Idle) {
                WorkerState::Idle => {
                    if self.guard.is_none() {
                        match self.resource.request(ctx.pid()) {
                            Some(guard) => self.guard = Some(guard),
                            None => return Suspend::Passivate,
                        }
                    }
                    match self.logic.start(ctx) {
                        Some(Started { job, duration }) => {
                            debug!("[Station:{}] t={} job started for {}", self.name, ctx.now(), duration);
                            self.state = WorkerState::Processing { job, duration };
                            return Suspend::Timeout(duration);
                        }
                        None => {
                            self.guard = None;
                            return Suspend::Timeout(self.logic.backoff());
                        }
                    }
                }
                WorkerState::Processing { job, duration } => {
                    ctx.world().kpi.add_busy_time(duration);
                    self.logic.complete(job, ctx, &mut self.outbox);
                    self.state = WorkerState::Routing;
                }
                WorkerState::Routing => match self.outbox.flush(ctx.pid()) {
                    Flush::Blocked => {
                        debug!("[Station:{}] t={} output blocked", self.name, ctx.now());
                        self.state = WorkerState::Routing;
                        return Suspend::Passivate;
                    }
                    Flush::Done => self.guard = None,
                },
            }
        }
    }
}

/// Entry of a per-type table. Tables are validated against the bill of
/// materials before a run, so a miss is a defect.
pub(crate) fn for_type<T>(table: &PerType<T>, component_type: ComponentType) -> &T {
    table
        .get(&component_type)
        .unwrap_or_else(|| panic!("no table entry for {}", component_type))
}

/// Longest of the per-item times; a batch moves at its slowest member's pace
pub(crate) fn slowest<I: IntoIterator<Item = SimTime>>(times: I) -> SimTime {
    times.into_iter().fold(0.0, f64::max)
}
