use super::component_inspection::resolve_condition_tables;
use super::{for_type, StationLogic, Started};
use crate::core::process::ProcessContext;
use crate::core::store::{Outbox, Store};
use crate::core::types::SimTime;
use crate::remanufacturing::buffers::LineBuffers;
use crate::remanufacturing::config::{LineParameters, PerType};
use crate::remanufacturing::entities::Component;
use crate::remanufacturing::quality::{classify, Grade, GradeTable, Thresholds};
use crate::remanufacturing::state::{LineState, Stream};
use log::debug;

/// One repair station. Components cycle back to the to-be-repaired buffer
/// until they grade High or run out of attempts.
pub struct ComponentRepair {
    to_repair: Store<Component>,
    good: Store<Component>,
    discarded: Store<Component>,
    easiness: PerType<Thresholds>,
    quality: PerType<GradeTable<Thresholds>>,
    process_times: PerType<GradeTable<SimTime>>,
    max_attempts: u32,
}

impl ComponentRepair {
    pub fn new(params: &LineParameters, buffers: &LineBuffers) -> Self {
        let station = &params.component_repair;
        Self {
            to_repair: buffers.to_be_repaired_components.clone(),
            good: buffers.good_quality_components.clone(),
            discarded: buffers.discarded_components.clone(),
            easiness: station.easiness.iter().map(|(t, shares)| (*t, shares.thresholds())).collect(),
            quality: resolve_condition_tables(&station.quality),
            process_times: station.process_times.clone(),
            max_attempts: station.max_repair_attempts,
        }
    }
}

impl StationLogic for ComponentRepair {
    /// The component and how easy it turned out to repair
    type Job = (Component, Grade);
    type Output = Component;

    fn start(&mut self, ctx: &mut ProcessContext<'_, LineState>) -> Option<Started<(Component, Grade)>> {
        let mut component = self.to_repair.try_get()?;
        component.repair_attempts += 1;

        let world = ctx.world();
        world.kpi.flow.repair_attempts += 1;
        let easiness = classify(
            for_type(&self.easiness, component.component_type),
            world.streams.stream(Stream::ComponentRepair),
        );
        let duration = *for_type(&self.process_times, component.component_type).get(easiness);
        Some(Started {
            job: (component, easiness),
            duration,
        })
    }

    /// A retried component goes back to the input buffer while the unit is
    /// still held, so that put blocks if the buffer is full.
    fn complete(
        &mut self,
        (component, easiness): (Component, Grade),
        ctx: &mut ProcessContext<'_, LineState>,
        outbox: &mut Outbox<Component>,
    ) {
        let now = ctx.now();
        let table = for_type(&self.quality, component.component_type);
        let quality = classify(table.get(easiness), ctx.world().streams.stream(Stream::ComponentRepair));

        let target = if quality == Grade::High {
            &self.good
        } else if quality == Grade::Low || component.repair_attempts >= self.max_attempts {
            &self.discarded
        } else {
            &self.to_repair
        };
        debug!(
            "[Station:component_repair] t={} {} attempt {} graded {} -> {}",
            now,
            component.id,
            component.repair_attempts,
            quality,
            target.name()
        );
        outbox.push(target, component);
    }
}
