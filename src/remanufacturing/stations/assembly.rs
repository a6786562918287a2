use super::replenishment::Replenishment;
use super::{StationLogic, Started};
use crate::core::process::ProcessContext;
use crate::core::store::{Outbox, Store};
use crate::core::types::SimTime;
use crate::remanufacturing::buffers::LineBuffers;
use crate::remanufacturing::config::{LineParameters, ReplenishmentParameters};
use crate::remanufacturing::entities::{Component, ComponentType, Product};
use crate::remanufacturing::state::LineState;
use log::debug;

/// Builds one product from a full bill of materials of good components
pub struct Assembly {
    good: Store<Component>,
    finished: Store<Product>,
    bill_of_materials: Vec<(ComponentType, usize)>,
    process_time: SimTime,
    retry_interval: SimTime,
    warmup_period: SimTime,
    replenishment: ReplenishmentParameters,
}

impl Assembly {
    pub fn new(params: &LineParameters, buffers: &LineBuffers) -> Self {
        Self {
            good: buffers.good_quality_components.clone(),
            finished: buffers.finished_products.clone(),
            bill_of_materials: params
                .bill_of_materials
                .iter()
                .map(|(t, q)| (*t, *q as usize))
                .collect(),
            process_time: params.assembly.process_time,
            retry_interval: params.assembly.retry_interval,
            warmup_period: params.options.warmup_period,
            replenishment: params.replenishment.clone(),
        }
    }

    fn level(&self, component_type: ComponentType) -> usize {
        self.good.count_where(|c| c.is(component_type))
    }

    /// Spawn a replenishment task when a type has fallen below its threshold,
    /// outside warm-up and past the request cooldown
    fn request_replenishment(&self, ctx: &mut ProcessContext<'_, LineState>) {
        if !self.replenishment.enabled {
            return;
        }
        let now = ctx.now();
        let since_last = now - ctx.world().last_replenishment_request;
        if now <= self.warmup_period || since_last <= self.replenishment.interval {
            return;
        }

        let short = self.bill_of_materials.iter().map(|(t, _)| *t).find(|t| {
            let threshold = self.replenishment.thresholds.get(t).copied().unwrap_or(0);
            self.level(*t) < threshold
        });
        if let Some(component_type) = short {
            debug!(
                "[Station:assembly] t={} {} below threshold, requesting replenishment",
                now, component_type
            );
            ctx.world().last_replenishment_request = now;
            let plan = self
                .bill_of_materials
                .iter()
                .map(|(t, _)| {
                    (
                        *t,
                        self.replenishment.thresholds.get(t).copied().unwrap_or(0),
                        self.replenishment.batch.get(t).copied().unwrap_or(0),
                    )
                })
                .collect();
            ctx.spawn(Box::new(Replenishment::new(
                self.good.clone(),
                plan,
                self.replenishment.lead_time,
            )));
        }
    }
}

impl StationLogic for Assembly {
    /// Number of components consumed
    type Job = usize;
    type Output = Product;

    fn start(&mut self, ctx: &mut ProcessContext<'_, LineState>) -> Option<Started<usize>> {
        if !self.bill_of_materials.iter().all(|(t, q)| self.level(*t) >= *q) {
            return None;
        }

        let mut consumed = 0;
        for (component_type, quantity) in &self.bill_of_materials {
            let component_type = *component_type;
            let parts = self
                .good
                .take_where(*quantity, |c| c.is(component_type))
                .unwrap_or_default();
            consumed += parts.len();
        }
        ctx.world().kpi.flow.components_consumed += consumed as u64;

        self.request_replenishment(ctx);
        Some(Started {
            job: consumed,
            duration: self.process_time,
        })
    }

    fn complete(&mut self, consumed: usize, ctx: &mut ProcessContext<'_, LineState>, outbox: &mut Outbox<Product>) {
        let product = Product::new();
        debug!(
            "[Station:assembly] t={} product {} assembled from {} components",
            ctx.now(),
            product.id,
            consumed
        );
        ctx.world().kpi.flow.products_assembled += 1;
        outbox.push(&self.finished, product);
    }

    fn backoff(&self) -> SimTime {
        self.retry_interval
    }
}
