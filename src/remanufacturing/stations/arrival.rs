use crate::core::process::{Process, ProcessContext, Suspend};
use crate::core::store::{Flush, Outbox, Store};
use crate::core::types::SimTime;
use crate::remanufacturing::config::{ArrivalParameters, LineParameters};
use crate::remanufacturing::entities::Core;
use crate::remanufacturing::state::{LineState, Stream};
use log::debug;

enum Phase {
    Waiting,
    Arrived { batch: u32 },
    Delivering,
}

/// Delivers batches of returned cores into the arrival buffer, forever
pub struct CoresArrival {
    arrival: Store<Core>,
    params: ArrivalParameters,
    variability: bool,
    phase: Phase,
    outbox: Outbox<Core>,
}

impl CoresArrival {
    pub fn new(params: &LineParameters, arrival: Store<Core>) -> Self {
        Self {
            arrival,
            params: params.cores_arrival.clone(),
            variability: params.options.arrival_variability,
            phase: Phase::Waiting,
            outbox: Outbox::new(),
        }
    }

    fn next_arrival(&self, ctx: &mut ProcessContext<'_, LineState>) -> (SimTime, u32) {
        let params = &self.params;
        if self.variability {
            let streams = &mut ctx.world().streams;
            let interval = streams.uniform(
                Stream::CoresArrival,
                params.interval * (1.0 - params.variability),
                params.interval * (1.0 + params.variability),
            );
            let batch = streams.int_inclusive(Stream::CoresArrival, params.batch_size_min, params.batch_size_max);
            (interval, batch)
        } else {
            (params.interval, midpoint(params.batch_size_min, params.batch_size_max))
        }
    }
}

/// Batch size used without variability; `low <= high` after validation
fn midpoint(low: u32, high: u32) -> u32 {
    low + (high - low) / 2
}

impl Process<LineState> for CoresArrival {
    fn name(&self) -> &str {
        "cores_arrival"
    }

    fn resume(&mut self, ctx: &mut ProcessContext<'_, LineState>) -> Suspend {
        loop {
            match std::mem::replace(&mut self.phase, Phase::Waiting) {
                Phase::Waiting => {
                    let (interval, batch) = self.next_arrival(ctx);
                    self.phase = Phase::Arrived { batch };
                    return Suspend::Timeout(interval);
                }
                Phase::Arrived { batch } => {
                    for _ in 0..batch {
                        self.outbox.push(&self.arrival, Core::new());
                    }
                    let kpi = &mut ctx.world().kpi;
                    kpi.cores_purchased += u64::from(batch);
                    kpi.flow.cores_received += u64::from(batch);
                    debug!("[Arrival] t={} {} cores received", ctx.now(), batch);
                    self.phase = Phase::Delivering;
                }
                Phase::Delivering => {
                    if self.outbox.flush(ctx.pid()) == Flush::Blocked {
                        self.phase = Phase::Delivering;
                        return Suspend::Passivate;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_batch_is_the_rounded_down_midpoint() {
        assert_eq!(midpoint(6, 6), 6);
        assert_eq!(midpoint(5, 8), 6);
        assert_eq!(midpoint(0, 1), 0);
        // No overflow at the top of the range
        assert_eq!(midpoint(u32::MAX - 1, u32::MAX), u32::MAX - 1);
        assert_eq!(midpoint(u32::MAX, u32::MAX), u32::MAX);
    }
}
