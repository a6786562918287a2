use crate::core::process::{Process, ProcessContext, Suspend};
use crate::core::types::SimTime;
use crate::remanufacturing::buffers::{BufferKind, LineBuffers};
use crate::remanufacturing::kpi::MonitoringRecord;
use crate::remanufacturing::state::LineState;

/// Snapshots every buffer once per tick
pub struct Monitor {
    buffers: LineBuffers,
    interval: SimTime,
    per_type_breakdown: bool,
}

impl Monitor {
    pub fn new(buffers: LineBuffers, interval: SimTime, per_type_breakdown: bool) -> Self {
        Self {
            buffers,
            interval,
            per_type_breakdown,
        }
    }
}

impl Process<LineState> for Monitor {
    fn name(&self) -> &str {
        "monitor"
    }

    fn resume(&mut self, ctx: &mut ProcessContext<'_, LineState>) -> Suspend {
        let time = ctx.now();
        let world = ctx.world();

        let mut good_quality_by_type = None;
        let mut discarded_by_type = None;
        for kind in BufferKind::COMPONENT_BUFFERS {
            if let Some(counts) = self.buffers.composition(kind) {
                world.monitoring.record_composition(kind, &counts);
                if self.per_type_breakdown {
                    match kind {
                        BufferKind::GoodQualityComponents => good_quality_by_type = Some(counts),
                        BufferKind::DiscardedComponents => discarded_by_type = Some(counts),
                        _ => {}
                    }
                }
            }
        }

        let record = MonitoringRecord {
            time,
            levels: self.buffers.levels(),
            fulfilled_requests: world.kpi.fulfilled_requests,
            delayed_requests: world.kpi.delayed_requests,
            products_shipped: world.kpi.flow.products_shipped,
            good_quality_by_type,
            discarded_by_type,
        };
        world.monitoring.append(record);
        Suspend::Timeout(self.interval)
    }
}
