use super::{slowest, StationLogic, Started};
use crate::core::process::ProcessContext;
use crate::core::store::{Outbox, Store};
use crate::core::types::SimTime;
use crate::remanufacturing::buffers::LineBuffers;
use crate::remanufacturing::config::LineParameters;
use crate::remanufacturing::entities::Core;
use crate::remanufacturing::quality::{classify, Grade, GradeTable, Thresholds};
use crate::remanufacturing::state::{LineState, Stream};
use log::debug;

/// Grades incoming cores in batches and screens out Low ones
pub struct CleaningInspection {
    arrival: Store<Core>,
    cleaned: Store<Core>,
    discarded: Store<Core>,
    batch_size: usize,
    thresholds: Thresholds,
    process_times: GradeTable<SimTime>,
    discard_low: bool,
}

impl CleaningInspection {
    pub fn new(params: &LineParameters, buffers: &LineBuffers) -> Self {
        let station = &params.cleaning_and_inspection;
        Self {
            arrival: buffers.arrival.clone(),
            cleaned: buffers.cleaned.clone(),
            discarded: buffers.discarded_cores.clone(),
            batch_size: station.batch_size,
            thresholds: station.quality.thresholds(),
            process_times: station.process_times.clone(),
            discard_low: params.options.discard_low_cores,
        }
    }
}

impl StationLogic for CleaningInspection {
    type Job = Vec<Core>;
    type Output = Core;

    fn start(&mut self, ctx: &mut ProcessContext<'_, LineState>) -> Option<Started<Vec<Core>>> {
        let mut batch = self.arrival.take(self.batch_size)?;
        let streams = &mut ctx.world().streams;
        for core in &mut batch {
            core.general_condition = Some(classify(&self.thresholds, streams.stream(Stream::CleaningAndInspection)));
        }
        let duration = slowest(batch.iter().map(|core| *self.process_times.get(core.condition())));
        Some(Started { job: batch, duration })
    }

    fn complete(&mut self, job: Vec<Core>, ctx: &mut ProcessContext<'_, LineState>, outbox: &mut Outbox<Core>) {
        for core in job {
            if core.condition() == Grade::Low && self.discard_low {
                debug!("[Station:cleaning_and_inspection] t={} core {} discarded", ctx.now(), core.id);
                outbox.push(&self.discarded, core);
            } else {
                outbox.push(&self.cleaned, core);
            }
        }
    }
}
