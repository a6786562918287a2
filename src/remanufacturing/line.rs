use super::buffers::LineBuffers;
use super::config::LineParameters;
use super::results::{self, SimulationReport};
use super::state::LineState;
use super::stations::arrival::CoresArrival;
use super::stations::assembly::Assembly;
use super::stations::cleaning_inspection::CleaningInspection;
use super::stations::component_cleaning::ComponentCleaning;
use super::stations::component_inspection::ComponentInspection;
use super::stations::demand::DemandArrival;
use super::stations::disassembly::Disassembly;
use super::stations::monitor::Monitor;
use super::stations::product_inspection::ProductInspection;
use super::stations::repair::ComponentRepair;
use super::stations::{StationLogic, StationWorker};
use crate::core::resource::Resource;
use crate::core::simulation_engine::SimulationEngine;
use crate::core::types::SimTime;
use crate::error::{ConfigError, Result};
use log::info;

/// A wired remanufacturing line ready to run
pub struct RemanufacturingLine {
    engine: SimulationEngine<LineState>,
    buffers: LineBuffers,
    params: LineParameters,
}

impl RemanufacturingLine {
    /// Validate `params` and register every process. Same-instant events
    /// run in registration order: demand, arrival, the stations in flow
    /// order, then the monitor.
    pub fn build(params: &LineParameters) -> Result<Self> {
        params.validate()?;

        let mut engine = SimulationEngine::new(LineState::new(params.options.random_seed));
        let buffers = LineBuffers::new(&engine, params)?;

        engine.register_process(Box::new(DemandArrival::new(
            params,
            buffers.inspected_finished_products.clone(),
        )));
        engine.register_process(Box::new(CoresArrival::new(params, buffers.arrival.clone())));

        let cleaning = &params.cleaning_and_inspection;
        add_station(&mut engine, "cleaning_and_inspection", cleaning.capacity, || {
            CleaningInspection::new(params, &buffers)
        });
        add_station(&mut engine, "disassembly", params.disassembly.capacity, || {
            Disassembly::new(params, &buffers)
        });
        add_station(&mut engine, "component_cleaning", params.component_cleaning.capacity, || {
            ComponentCleaning::new(params, &buffers)
        });
        add_station(&mut engine, "component_inspection", params.component_inspection.capacity, || {
            ComponentInspection::new(params, &buffers)
        });

        let repair_pool = engine.create_resource_pool("component_repair", params.component_repair.capacity);
        for unit in repair_pool.units() {
            engine.register_process(Box::new(StationWorker::new(
                unit.name(),
                ComponentRepair::new(params, &buffers),
                unit.clone(),
            )));
        }

        add_station(&mut engine, "assembly", params.assembly.capacity, || {
            Assembly::new(params, &buffers)
        });
        add_station(
            &mut engine,
            "finished_product_inspection",
            params.finished_product_inspection.capacity,
            || ProductInspection::new(params, &buffers),
        );

        engine.register_process(Box::new(Monitor::new(
            buffers.clone(),
            params.options.monitoring_interval,
            params.options.per_type_breakdown,
        )));

        Ok(Self {
            engine,
            buffers,
            params: params.clone(),
        })
    }

    pub fn buffers(&self) -> &LineBuffers {
        &self.buffers
    }

    pub fn state(&self) -> &LineState {
        self.engine.world()
    }

    pub fn now(&self) -> SimTime {
        self.engine.current_time()
    }

    /// Advance the clock to `until`; the line can be advanced again later
    pub fn advance(&mut self, until: SimTime) {
        self.engine.run(until);
    }

    /// Stop the line where it stands and compile the report
    pub fn into_report(self) -> SimulationReport {
        let horizon = self.engine.current_time();
        let final_levels = self.buffers.levels();
        let state = self.engine.into_world();
        results::compile(horizon, &self.params, state, final_levels)
    }

    pub fn run(mut self, horizon: SimTime) -> Result<SimulationReport> {
        if !(horizon.is_finite() && horizon > 0.0) {
            return Err(ConfigError::invalid("horizon", "must be greater than 0"));
        }
        info!(
            "Starting remanufacturing run: horizon={} seed={}",
            horizon, self.params.options.random_seed
        );
        self.advance(horizon);
        let report = self.into_report();
        info!(
            "Run {} finished: {} requested, {} fulfilled, {} delayed",
            report.run_id,
            report.results.total_requests,
            report.results.fulfilled_requests,
            report.results.delayed_requests
        );
        Ok(report)
    }
}

/// Register `capacity` workers contending for one capacity-N resource
fn add_station<L, F>(engine: &mut SimulationEngine<LineState>, name: &str, capacity: usize, logic: F)
where
    L: StationLogic + 'static,
    F: Fn() -> L,
{
    let resource: Resource = engine.create_resource(name, capacity);
    for i in 0..capacity {
        engine.register_process(Box::new(StationWorker::new(
            format!("{}_{}", name, i),
            logic(),
            resource.clone(),
        )));
    }
}

/// Run the line once from an empty state until `horizon`
pub fn run_simulation(horizon: SimTime, params: &LineParameters) -> Result<SimulationReport> {
    RemanufacturingLine::build(params)?.run(horizon)
}
