use crate::core::process::{Process, ProcessContext, Suspend};
use crate::core::store::{Flush, Outbox, Store};
use crate::core::types::SimTime;
use crate::remanufacturing::entities::{Component, ComponentType};
use crate::remanufacturing::state::LineState;
use log::debug;

/// One replenishment request. Walks the component types in order; each type
/// still below its threshold gets a purchased batch after the lead time.
pub struct Replenishment {
    good: Store<Component>,
    /// (type, threshold, batch)
    plan: Vec<(ComponentType, usize, u32)>,
    next: usize,
    lead_time: SimTime,
    arriving: Option<(ComponentType, u32)>,
    outbox: Outbox<Component>,
}

impl Replenishment {
    pub fn new(good: Store<Component>, plan: Vec<(ComponentType, usize, u32)>, lead_time: SimTime) -> Self {
        Self {
            good,
            plan,
            next: 0,
            lead_time,
            arriving: None,
            outbox: Outbox::new(),
        }
    }
}

impl Process<LineState> for Replenishment {
    fn name(&self) -> &str {
        "replenishment"
    }

    fn resume(&mut self, ctx: &mut ProcessContext<'_, LineState>) -> Suspend {
        if let Some((component_type, batch)) = self.arriving.take() {
            for _ in 0..batch {
                self.outbox.push(&self.good, Component::purchased(component_type));
            }
            let kpi = &mut ctx.world().kpi;
            kpi.components_purchased += u64::from(batch);
            kpi.flow.components_replenished += u64::from(batch);
            debug!("[Replenishment] t={} {} units of {} delivered", ctx.now(), batch, component_type);
        }
        if self.outbox.flush(ctx.pid()) == Flush::Blocked {
            return Suspend::Passivate;
        }

        while let Some((component_type, threshold, batch)) = self.plan.get(self.next).copied() {
            self.next += 1;
            if self.good.count_where(|c| c.is(component_type)) < threshold {
                self.arriving = Some((component_type, batch));
                return Suspend::Timeout(self.lead_time);
            }
        }
        Suspend::Finish
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::simulation_engine::SimulationEngine;
    use crate::core::types::ProcessId;

    fn types(store: &Store<Component>) -> Vec<ComponentType> {
        store.peek_all().iter().map(|c| c.component_type).collect()
    }

    #[test]
    fn test_short_types_arrive_one_lead_time_apart() {
        let mut engine = SimulationEngine::new(LineState::new(3));
        let good = engine.create_store::<Component>("good_quality_components_buffer", 500);
        // C is already at its threshold and is skipped
        good.put(ProcessId(0), Component::purchased(ComponentType::C));

        let plan = vec![
            (ComponentType::A, 2, 1),
            (ComponentType::B, 3, 3),
            (ComponentType::C, 1, 1),
        ];
        engine.register_process(Box::new(Replenishment::new(good.clone(), plan, 30.0)));

        engine.run(30.0);
        assert_eq!(types(&good), vec![ComponentType::C]);

        engine.run(30.5);
        assert_eq!(types(&good), vec![ComponentType::C, ComponentType::A]);

        engine.run(60.0);
        assert_eq!(good.len(), 2);

        engine.run(60.5);
        assert_eq!(
            types(&good),
            vec![
                ComponentType::C,
                ComponentType::A,
                ComponentType::B,
                ComponentType::B,
                ComponentType::B
            ]
        );
        assert!(good.peek_all().iter().all(|c| c.repair_attempts == 0));

        let kpi = &engine.world().kpi;
        assert_eq!(kpi.components_purchased, 4);
        assert_eq!(kpi.flow.components_replenished, 4);
        // Finished after the last type; nothing left on the calendar
        assert!(!engine.has_pending_events());
    }

    #[test]
    fn test_zero_lead_time_delivers_at_request_time() {
        let mut engine = SimulationEngine::new(LineState::new(3));
        let good = engine.create_store::<Component>("good_quality_components_buffer", 500);
        let plan = vec![(ComponentType::A, 2, 1), (ComponentType::B, 3, 3)];
        engine.register_process(Box::new(Replenishment::new(good.clone(), plan, 0.0)));

        engine.run(0.5);
        assert_eq!(
            types(&good),
            vec![ComponentType::A, ComponentType::B, ComponentType::B, ComponentType::B]
        );
    }
}
