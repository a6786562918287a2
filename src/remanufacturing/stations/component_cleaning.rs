use super::{for_type, slowest, StationLogic, Started};
use crate::core::process::ProcessContext;
use crate::core::store::{Outbox, Store};
use crate::core::types::SimTime;
use crate::remanufacturing::buffers::LineBuffers;
use crate::remanufacturing::config::{LineParameters, PerType};
use crate::remanufacturing::entities::Component;
use crate::remanufacturing::quality::{classify, GradeTable, Thresholds};
use crate::remanufacturing::state::{LineState, Stream};

/// Cleans components and assigns their general condition
pub struct ComponentCleaning {
    components: Store<Component>,
    cleaned: Store<Component>,
    batch_size: usize,
    thresholds: PerType<Thresholds>,
    process_times: PerType<GradeTable<SimTime>>,
}

impl ComponentCleaning {
    pub fn new(params: &LineParameters, buffers: &LineBuffers) -> Self {
        let station = &params.component_cleaning;
        Self {
            components: buffers.components.clone(),
            cleaned: buffers.cleaned_components.clone(),
            batch_size: station.batch_size,
            thresholds: station.quality.iter().map(|(t, shares)| (*t, shares.thresholds())).collect(),
            process_times: station.process_times.clone(),
        }
    }
}

impl StationLogic for ComponentCleaning {
    type Job = Vec<Component>;
    type Output = Component;

    fn start(&mut self, ctx: &mut ProcessContext<'_, LineState>) -> Option<Started<Vec<Component>>> {
        let mut batch = self.components.take(self.batch_size)?;
        let streams = &mut ctx.world().streams;
        for component in &mut batch {
            let thresholds = for_type(&self.thresholds, component.component_type);
            component.general_condition = Some(classify(thresholds, streams.stream(Stream::ComponentCleaning)));
        }
        let duration = slowest(
            batch
                .iter()
                .map(|c| *for_type(&self.process_times, c.component_type).get(c.condition())),
        );
        Some(Started { job: batch, duration })
    }

    fn complete(&mut self, job: Vec<Component>, _ctx: &mut ProcessContext<'_, LineState>, outbox: &mut Outbox<Component>) {
        for component in job {
            outbox.push(&self.cleaned, component);
        }
    }
}
