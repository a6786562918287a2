use super::{for_type, slowest, StationLogic, Started};
use crate::core::process::ProcessContext;
use crate::core::store::{Outbox, Store};
use crate::core::types::SimTime;
use crate::remanufacturing::buffers::LineBuffers;
use crate::remanufacturing::config::{LineParameters, PerType};
use crate::remanufacturing::entities::{Component, ComponentType};
use crate::remanufacturing::quality::{classify, Grade, GradeShares, GradeTable, Thresholds};
use crate::remanufacturing::state::{LineState, Stream};
use log::debug;

/// Inspects same-type batches of cleaned components and routes them to
/// good-quality, repair or scrap
pub struct ComponentInspection {
    cleaned: Store<Component>,
    good: Store<Component>,
    to_repair: Store<Component>,
    discarded: Store<Component>,
    batch_sizes: PerType<usize>,
    thresholds: PerType<GradeTable<Thresholds>>,
    process_times: PerType<GradeTable<SimTime>>,
}

impl ComponentInspection {
    pub fn new(params: &LineParameters, buffers: &LineBuffers) -> Self {
        let station = &params.component_inspection;
        Self {
            cleaned: buffers.cleaned_components.clone(),
            good: buffers.good_quality_components.clone(),
            to_repair: buffers.to_be_repaired_components.clone(),
            discarded: buffers.discarded_components.clone(),
            batch_sizes: station.batch_size.clone(),
            thresholds: resolve_condition_tables(&station.quality),
            process_times: station.process_times.clone(),
        }
    }

    /// First type, in order of first appearance in the buffer, whose count
    /// reaches its batch size
    fn ready_type(&self) -> Option<(ComponentType, usize)> {
        let counts = self.cleaned.fold(Vec::<(ComponentType, usize)>::new(), |mut seen, component| {
            match seen.iter_mut().find(|(t, _)| *t == component.component_type) {
                Some((_, count)) => *count += 1,
                None => seen.push((component.component_type, 1)),
            }
            seen
        });
        counts.into_iter().find_map(|(component_type, count)| {
            let batch = *for_type(&self.batch_sizes, component_type);
            (count >= batch).then_some((component_type, batch))
        })
    }
}

pub(crate) fn resolve_condition_tables(
    table: &PerType<GradeTable<GradeShares>>,
) -> PerType<GradeTable<Thresholds>> {
    table
        .iter()
        .map(|(t, shares)| {
            (
                *t,
                GradeTable::new(shares.low.thresholds(), shares.medium.thresholds(), shares.high.thresholds()),
            )
        })
        .collect()
}

impl StationLogic for ComponentInspection {
    type Job = Vec<Component>;
    type Output = Component;

    fn start(&mut self, _ctx: &mut ProcessContext<'_, LineState>) -> Option<Started<Vec<Component>>> {
        let (selected, batch_size) = self.ready_type()?;
        let batch = self.cleaned.take_where(batch_size, |c| c.is(selected))?;
        let times = for_type(&self.process_times, selected);
        let duration = slowest(batch.iter().map(|c| *times.get(c.condition())));
        Some(Started { job: batch, duration })
    }

    fn complete(&mut self, job: Vec<Component>, ctx: &mut ProcessContext<'_, LineState>, outbox: &mut Outbox<Component>) {
        let now = ctx.now();
        let streams = &mut ctx.world().streams;
        for component in job {
            let table = for_type(&self.thresholds, component.component_type);
            let grade = classify(table.get(component.condition()), streams.stream(Stream::ComponentInspection));
            debug!(
                "[Station:component_inspection] t={} {} {} graded {}",
                now, component.component_type, component.id, grade
            );
            let target = match grade {
                Grade::High => &self.good,
                Grade::Medium => &self.to_repair,
                Grade::Low => &self.discarded,
            };
            outbox.push(target, component);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::simulation_engine::SimulationEngine;
    use crate::core::types::ProcessId;
    use uuid::Uuid;

    fn cleaned(component_type: ComponentType) -> Component {
        let mut component = Component::new(component_type);
        component.general_condition = Some(Grade::High);
        component
    }

    fn ids(components: &[Component]) -> Vec<Uuid> {
        components.iter().map(|c| c.id).collect()
    }

    fn station_with(batch_a: usize, arriving: Vec<Component>) -> (ComponentInspection, LineBuffers, LineState) {
        let mut params = LineParameters::default();
        params.component_inspection.batch_size.insert(ComponentType::A, batch_a);
        let engine = SimulationEngine::new(());
        let buffers = LineBuffers::new(&engine, &params).unwrap();
        for component in arriving {
            buffers.cleaned_components.put(ProcessId(0), component);
        }
        (ComponentInspection::new(&params, &buffers), buffers, LineState::new(3))
    }

    #[test]
    fn test_first_type_to_fill_its_batch_is_taken() {
        let arriving = vec![
            cleaned(ComponentType::A),
            cleaned(ComponentType::B),
            cleaned(ComponentType::A),
            cleaned(ComponentType::C),
        ];
        let expected_batch = vec![arriving[0].id, arriving[2].id];
        let expected_rest = vec![arriving[1].id, arriving[3].id];
        let (mut station, buffers, mut state) = station_with(2, arriving);

        assert_eq!(station.ready_type(), Some((ComponentType::A, 2)));
        let mut spawned = Vec::new();
        let mut ctx = ProcessContext::new(ProcessId(0), 0.0, &mut state, &mut spawned);
        let started = station.start(&mut ctx).unwrap();

        assert_eq!(ids(&started.job), expected_batch);
        // High-condition A takes 17 minutes
        assert_eq!(started.duration, 17.0);
        assert_eq!(ids(&buffers.cleaned_components.peek_all()), expected_rest);
    }

    #[test]
    fn test_short_type_is_skipped_for_a_later_full_one() {
        let arriving = vec![
            cleaned(ComponentType::A),
            cleaned(ComponentType::C),
            cleaned(ComponentType::B),
        ];
        let taken = arriving[1].id;
        let expected_rest = vec![arriving[0].id, arriving[2].id];
        let (mut station, buffers, mut state) = station_with(2, arriving);

        // A appears first but only once; C is the first type with a full batch
        assert_eq!(station.ready_type(), Some((ComponentType::C, 1)));
        let mut spawned = Vec::new();
        let mut ctx = ProcessContext::new(ProcessId(0), 0.0, &mut state, &mut spawned);
        let started = station.start(&mut ctx).unwrap();

        assert_eq!(ids(&started.job), vec![taken]);
        assert_eq!(ids(&buffers.cleaned_components.peek_all()), expected_rest);
    }

    #[test]
    fn test_nothing_starts_without_a_full_batch() {
        let (mut station, buffers, mut state) = station_with(2, vec![cleaned(ComponentType::A)]);
        let mut spawned = Vec::new();
        let mut ctx = ProcessContext::new(ProcessId(0), 0.0, &mut state, &mut spawned);

        assert!(station.start(&mut ctx).is_none());
        assert_eq!(buffers.cleaned_components.len(), 1);
    }
}
