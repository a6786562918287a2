use super::{slowest, StationLogic, Started};
use crate::core::process::ProcessContext;
use crate::core::store::{Outbox, Store};
use crate::core::types::SimTime;
use crate::remanufacturing::buffers::LineBuffers;
use crate::remanufacturing::config::LineParameters;
use crate::remanufacturing::entities::{Component, ComponentType, Core};
use crate::remanufacturing::quality::GradeTable;
use crate::remanufacturing::state::LineState;
use log::debug;

/// Explodes cleaned cores into components per the bill of materials
pub struct Disassembly {
    cleaned: Store<Core>,
    components: Store<Component>,
    batch_size: usize,
    process_times: GradeTable<SimTime>,
    bill_of_materials: Vec<(ComponentType, u32)>,
}

impl Disassembly {
    pub fn new(params: &LineParameters, buffers: &LineBuffers) -> Self {
        Self {
            cleaned: buffers.cleaned.clone(),
            components: buffers.components.clone(),
            batch_size: params.disassembly.batch_size,
            process_times: params.disassembly.process_times.clone(),
            bill_of_materials: params.bill_of_materials.iter().map(|(t, q)| (*t, *q)).collect(),
        }
    }
}

impl StationLogic for Disassembly {
    type Job = Vec<Core>;
    type Output = Component;

    fn start(&mut self, _ctx: &mut ProcessContext<'_, LineState>) -> Option<Started<Vec<Core>>> {
        let batch = self.cleaned.take(self.batch_size)?;
        let duration = slowest(batch.iter().map(|core| *self.process_times.get(core.condition())));
        Some(Started { job: batch, duration })
    }

    fn complete(&mut self, job: Vec<Core>, ctx: &mut ProcessContext<'_, LineState>, outbox: &mut Outbox<Component>) {
        let mut created = 0;
        for core in &job {
            for (component_type, quantity) in &self.bill_of_materials {
                for _ in 0..*quantity {
                    outbox.push(&self.components, Component::new(*component_type));
                    created += 1;
                }
            }
            debug!("[Station:disassembly] t={} core {} disassembled", ctx.now(), core.id);
        }

        let flow = &mut ctx.world().kpi.flow;
        flow.cores_disassembled += job.len() as u64;
        flow.components_created += created;
    }
}
