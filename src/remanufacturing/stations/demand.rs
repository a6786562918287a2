use crate::core::process::{Process, ProcessContext, Suspend};
use crate::core::store::Store;
use crate::core::types::SimTime;
use crate::remanufacturing::config::{DemandParameters, LineParameters};
use crate::remanufacturing::entities::Product;
use crate::remanufacturing::state::{LineState, Stream};
use log::debug;

/// Polling period while a backordered request waits for stock
const BACKORDER_POLL: SimTime = 1.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    WarmUp,
    Waiting,
    Arrived { quantity: u32 },
    Backordered { quantity: u32 },
}

/// Customer demand against the inspected finished-products buffer.
///
/// A request that cannot be served from stock is backordered as a whole and
/// no new request arrives until it has shipped.
pub struct DemandArrival {
    shippable: Store<Product>,
    params: DemandParameters,
    variability: bool,
    warmup_period: SimTime,
    unit_price: f64,
    phase: Phase,
}

impl DemandArrival {
    pub fn new(params: &LineParameters, shippable: Store<Product>) -> Self {
        Self {
            shippable,
            params: params.demand.clone(),
            variability: params.options.demand_variability,
            warmup_period: params.options.warmup_period,
            unit_price: params.costs.unit_price,
            phase: Phase::WarmUp,
        }
    }

    fn next_request(&self, ctx: &mut ProcessContext<'_, LineState>) -> (SimTime, u32) {
        let params = &self.params;
        if self.variability {
            let streams = &mut ctx.world().streams;
            let interval = streams.uniform(
                Stream::DemandArrival,
                params.interval * (1.0 - params.variability),
                params.interval * (1.0 + params.variability),
            );
            let quantity = streams.int_inclusive(Stream::DemandArrival, params.quantity_min, params.quantity_max);
            (interval, quantity)
        } else {
            (params.interval, params.quantity_min)
        }
    }

    fn ship(&self, quantity: u32, ctx: &mut ProcessContext<'_, LineState>) -> bool {
        match self.shippable.take(quantity as usize) {
            Some(products) => {
                ctx.world().kpi.flow.products_shipped += products.len() as u64;
                true
            }
            None => false,
        }
    }
}

impl Process<LineState> for DemandArrival {
    fn name(&self) -> &str {
        "demand_arrival"
    }

    fn resume(&mut self, ctx: &mut ProcessContext<'_, LineState>) -> Suspend {
        loop {
            match self.phase {
                Phase::WarmUp => {
                    self.phase = Phase::Waiting;
                    if ctx.now() < self.warmup_period {
                        return Suspend::Timeout(self.warmup_period - ctx.now());
                    }
                }
                Phase::Waiting => {
                    let (interval, quantity) = self.next_request(ctx);
                    self.phase = Phase::Arrived { quantity };
                    return Suspend::Timeout(interval);
                }
                Phase::Arrived { quantity } => {
                    let now = ctx.now();
                    ctx.world().kpi.record_request(quantity);
                    if self.ship(quantity, ctx) {
                        ctx.world().kpi.record_fulfilled(quantity, self.unit_price);
                        debug!("[Demand] t={} {} units shipped", now, quantity);
                        self.phase = Phase::Waiting;
                    } else {
                        ctx.world().kpi.record_delayed(quantity, now);
                        debug!("[Demand] t={} insufficient stock, {} units delayed", now, quantity);
                        self.phase = Phase::Backordered { quantity };
                        return Suspend::Timeout(BACKORDER_POLL);
                    }
                }
                Phase::Backordered { quantity } => {
                    if !self.ship(quantity, ctx) {
                        return Suspend::Timeout(BACKORDER_POLL);
                    }
                    let now = ctx.now();
                    let delay = ctx.world().kpi.clear_backlog(quantity, now);
                    debug!("[Demand] t={} late shipment of {} units, {} minutes of delay", now, quantity, delay);
                    self.phase = Phase::Waiting;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::simulation_engine::SimulationEngine;
    use crate::core::store::PutStatus;
    use std::collections::VecDeque;

    /// Puts finished products into the shippable buffer at fixed times
    struct Restock {
        shippable: Store<Product>,
        deliveries: VecDeque<(SimTime, u32)>,
        due: Option<u32>,
    }

    impl Process<LineState> for Restock {
        fn name(&self) -> &str {
            "restock"
        }

        fn resume(&mut self, ctx: &mut ProcessContext<'_, LineState>) -> Suspend {
            if let Some(count) = self.due.take() {
                for _ in 0..count {
                    assert_eq!(self.shippable.put(ctx.pid(), Product::new()), PutStatus::Stored);
                }
            }
            match self.deliveries.pop_front() {
                Some((at, count)) => {
                    self.due = Some(count);
                    Suspend::Timeout(at - ctx.now())
                }
                None => Suspend::Finish,
            }
        }
    }

    fn demand_every_100(quantity: u32) -> LineParameters {
        let mut params = LineParameters::default()
            .with_warmup_period(0.0)
            .with_demand_variability(false)
            .with_demand_quantity(quantity, quantity);
        params.demand.interval = 100.0;
        params
    }

    fn engine_with_restock(params: &LineParameters, deliveries: Vec<(SimTime, u32)>) -> (SimulationEngine<LineState>, Store<Product>) {
        let mut engine = SimulationEngine::new(LineState::new(3));
        let shippable = engine.create_store::<Product>("inspected_finished_products_buffer", 500);
        engine.register_process(Box::new(DemandArrival::new(params, shippable.clone())));
        engine.register_process(Box::new(Restock {
            shippable: shippable.clone(),
            deliveries: deliveries.into(),
            due: None,
        }));
        (engine, shippable)
    }

    #[test]
    fn test_on_time_request_ships_immediately() {
        let params = demand_every_100(3);
        let (mut engine, shippable) = engine_with_restock(&params, vec![(50.0, 5)]);

        engine.run(101.0);
        let kpi = &engine.world().kpi;
        assert_eq!(kpi.total_requests, 3);
        assert_eq!(kpi.fulfilled_requests, 3);
        assert_eq!(kpi.delayed_requests, 0);
        assert_eq!(kpi.income, 3.0 * params.costs.unit_price);
        assert_eq!(shippable.len(), 2);
    }

    #[test]
    fn test_backordered_units_clear_in_arrival_order() {
        let params = demand_every_100(3);
        // Requests at 100 and, after the first ships at 150, at 250
        let (mut engine, shippable) = engine_with_restock(&params, vec![(149.5, 3), (300.5, 3)]);

        engine.run(149.0);
        {
            let kpi = &engine.world().kpi;
            assert_eq!(kpi.delayed_requests, 3);
            assert_eq!(kpi.backlog_len(), 3);
            assert_eq!(kpi.cumulative_delay_time, 0.0);
        }

        // The next backorder poll after the restock is at t=150
        engine.run(151.0);
        {
            let kpi = &engine.world().kpi;
            assert_eq!(kpi.backlog_len(), 0);
            assert_eq!(kpi.cumulative_delay_time, 3.0 * 50.0);
            assert_eq!(kpi.mean_delay_time(), 50.0);
            assert_eq!(kpi.flow.products_shipped, 3);
        }
        assert!(shippable.is_empty());

        // Second request at 250 waits until the poll at 301
        engine.run(400.0);
        let kpi = &engine.world().kpi;
        assert_eq!(kpi.total_requests, 6);
        assert_eq!(kpi.delayed_requests, 6);
        assert_eq!(kpi.fulfilled_requests, 0);
        assert_eq!(kpi.income, 0.0);
        assert_eq!(kpi.cumulative_delay_time, 3.0 * 50.0 + 3.0 * 51.0);
        assert_eq!(kpi.mean_delay_time(), 50.5);
        assert_eq!(kpi.flow.products_shipped, 6);
    }
}
