use super::{StationLogic, Started};
use crate::core::process::ProcessContext;
use crate::core::store::{Outbox, Store};
use crate::core::types::SimTime;
use crate::remanufacturing::buffers::LineBuffers;
use crate::remanufacturing::config::LineParameters;
use crate::remanufacturing::entities::Product;
use crate::remanufacturing::quality::{classify, Grade, Thresholds};
use crate::remanufacturing::state::{LineState, Stream};
use log::debug;

/// Final check: only High products become shippable
pub struct ProductInspection {
    finished: Store<Product>,
    inspected: Store<Product>,
    discarded: Store<Product>,
    thresholds: Thresholds,
    process_time: SimTime,
}

impl ProductInspection {
    pub fn new(params: &LineParameters, buffers: &LineBuffers) -> Self {
        let station = &params.finished_product_inspection;
        Self {
            finished: buffers.finished_products.clone(),
            inspected: buffers.inspected_finished_products.clone(),
            discarded: buffers.discarded_products.clone(),
            thresholds: station.quality.thresholds(),
            process_time: station.process_time,
        }
    }
}

impl StationLogic for ProductInspection {
    type Job = (Product, Grade);
    type Output = Product;

    fn start(&mut self, ctx: &mut ProcessContext<'_, LineState>) -> Option<Started<(Product, Grade)>> {
        let product = self.finished.try_get()?;
        let grade = classify(
            &self.thresholds,
            ctx.world().streams.stream(Stream::FinishedProductInspection),
        );
        Some(Started {
            job: (product, grade),
            duration: self.process_time,
        })
    }

    fn complete(
        &mut self,
        (product, grade): (Product, Grade),
        ctx: &mut ProcessContext<'_, LineState>,
        outbox: &mut Outbox<Product>,
    ) {
        match grade {
            Grade::High => outbox.push(&self.inspected, product),
            Grade::Medium | Grade::Low => {
                debug!("[Station:finished_product_inspection] t={} product {} discarded ({})", ctx.now(), product.id, grade);
                outbox.push(&self.discarded, product);
            }
        }
    }
}
