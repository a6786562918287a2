use super::buffers::BufferKind;
use super::entities::ComponentType;
use super::quality::{GradeShares, GradeTable};
use crate::core::types::SimTime;
use crate::error::{ConfigError, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Eight weeks in minutes
pub const DEFAULT_HORIZON: SimTime = 80640.0;

/// Sections every parameter document must carry
const REQUIRED_SECTIONS: [&str; 14] = [
    "options",
    "demand",
    "cores_arrival",
    "cleaning_and_inspection",
    "bill_of_materials",
    "disassembly",
    "component_cleaning",
    "component_inspection",
    "component_repair",
    "assembly",
    "finished_product_inspection",
    "replenishment",
    "buffer_capacities",
    "costs",
];

pub type PerType<T> = BTreeMap<ComponentType, T>;

fn per_type<T>(a: T, b: T, c: T) -> PerType<T> {
    ComponentType::ALL.into_iter().zip([a, b, c]).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOptions {
    pub warmup_period: SimTime,
    pub monitoring_interval: SimTime,
    /// Route Low-grade cores to the discarded-cores sink at cleaning & inspection
    pub discard_low_cores: bool,
    pub arrival_variability: bool,
    pub demand_variability: bool,
    /// Record good/discarded component composition in every monitoring row
    pub per_type_breakdown: bool,
    pub random_seed: u64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            warmup_period: 2520.0,
            monitoring_interval: 1.0,
            discard_low_cores: true,
            arrival_variability: false,
            demand_variability: false,
            per_type_breakdown: true,
            random_seed: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandParameters {
    pub interval: SimTime,
    /// Interval spread as a fraction, drawn in `interval * (1 ± variability)`
    pub variability: f64,
    pub quantity_min: u32,
    pub quantity_max: u32,
}

impl Default for DemandParameters {
    fn default() -> Self {
        Self {
            interval: 5760.0,
            variability: 0.1,
            quantity_min: 18,
            quantity_max: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArrivalParameters {
    pub interval: SimTime,
    pub variability: f64,
    pub batch_size_min: u32,
    pub batch_size_max: u32,
}

impl Default for ArrivalParameters {
    fn default() -> Self {
        Self {
            interval: 1440.0,
            variability: 0.0,
            batch_size_min: 6,
            batch_size_max: 6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningInspectionParameters {
    pub batch_size: usize,
    pub capacity: usize,
    pub quality: GradeShares,
    pub process_times: GradeTable<SimTime>,
}

impl Default for CleaningInspectionParameters {
    fn default() -> Self {
        Self {
            batch_size: 1,
            capacity: 1,
            quality: GradeShares::new(40.0, 20.0, 40.0),
            process_times: GradeTable::new(30.0, 24.0, 20.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisassemblyParameters {
    pub batch_size: usize,
    pub capacity: usize,
    pub process_times: GradeTable<SimTime>,
}

impl Default for DisassemblyParameters {
    fn default() -> Self {
        Self {
            batch_size: 1,
            capacity: 1,
            process_times: GradeTable::new(450.0, 375.0, 300.0),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentCleaningParameters {
    pub batch_size: usize,
    pub capacity: usize,
    pub quality: PerType<GradeShares>,
    pub process_times: PerType<GradeTable<SimTime>>,
}

impl Default for ComponentCleaningParameters {
    fn default() -> Self {
        let shares = GradeShares::new(23.0, 24.0, 53.0);
        Self {
            batch_size: 1,
            capacity: 2,
            quality: per_type(shares, shares, shares),
            process_times: per_type(
                GradeTable::new(33.0, 30.0, 27.0),
                GradeTable::new(35.0, 25.0, 15.0),
                GradeTable::new(57.0, 45.0, 33.0),
            ),
        }
    }
}

/// Outcome shares keyed by the component's incoming condition
pub type ConditionShares = GradeTable<GradeShares>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentInspectionParameters {
    pub batch_size: PerType<usize>,
    pub capacity: usize,
    pub quality: PerType<ConditionShares>,
    pub process_times: PerType<GradeTable<SimTime>>,
}

impl Default for ComponentInspectionParameters {
    fn default() -> Self {
        Self {
            batch_size: per_type(1, 1, 1),
            capacity: 1,
            quality: per_type(
                GradeTable::new(
                    GradeShares::new(80.0, 10.0, 10.0),
                    GradeShares::new(40.0, 20.0, 40.0),
                    GradeShares::new(10.0, 20.0, 70.0),
                ),
                GradeTable::new(
                    GradeShares::new(80.0, 15.0, 5.0),
                    GradeShares::new(35.0, 30.0, 35.0),
                    GradeShares::new(5.0, 20.0, 75.0),
                ),
                GradeTable::new(
                    GradeShares::new(90.0, 5.0, 5.0),
                    GradeShares::new(40.0, 15.0, 45.0),
                    GradeShares::new(20.0, 10.0, 70.0),
                ),
            ),
            process_times: per_type(
                GradeTable::new(23.0, 20.0, 17.0),
                GradeTable::new(21.0, 20.0, 19.0),
                GradeTable::new(10.0, 8.0, 7.0),
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentRepairParameters {
    /// Number of independent repair stations
    pub capacity: usize,
    /// Repair difficulty shares; `High` means easy to repair
    pub easiness: PerType<GradeShares>,
    /// Post-repair quality shares keyed by easiness
    pub quality: PerType<ConditionShares>,
    /// Repair times keyed by easiness
    pub process_times: PerType<GradeTable<SimTime>>,
    pub max_repair_attempts: u32,
}

impl Default for ComponentRepairParameters {
    fn default() -> Self {
        let quality = GradeTable::new(
            GradeShares::new(80.0, 10.0, 10.0),
            GradeShares::new(40.0, 20.0, 40.0),
            GradeShares::new(10.0, 20.0, 70.0),
        );
        Self {
            capacity: 1,
            easiness: per_type(
                GradeShares::new(20.0, 60.0, 20.0),
                GradeShares::new(15.0, 60.0, 25.0),
                GradeShares::new(30.0, 40.0, 30.0),
            ),
            quality: per_type(quality.clone(), quality.clone(), quality),
            process_times: per_type(
                GradeTable::new(1200.0, 1000.0, 760.0),
                GradeTable::new(1300.0, 1050.0, 900.0),
                GradeTable::new(1600.0, 1200.0, 960.0),
            ),
            max_repair_attempts: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssemblyParameters {
    pub capacity: usize,
    pub process_time: SimTime,
    /// Back-off when the good-quality buffer cannot cover the bill of materials
    pub retry_interval: SimTime,
}

impl Default for AssemblyParameters {
    fn default() -> Self {
        Self {
            capacity: 1,
            process_time: 210.0,
            retry_interval: 10.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductInspectionParameters {
    pub capacity: usize,
    pub quality: GradeShares,
    pub process_time: SimTime,
}

impl Default for ProductInspectionParameters {
    fn default() -> Self {
        Self {
            capacity: 1,
            quality: GradeShares::new(0.5, 1.0, 98.5),
            process_time: 30.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplenishmentParameters {
    pub enabled: bool,
    /// A type is replenished while its good-quality level is below this
    pub thresholds: PerType<usize>,
    pub batch: PerType<u32>,
    /// Minimum time between two replenishment requests
    pub interval: SimTime,
    /// Delay between a request and the purchased units arriving
    pub lead_time: SimTime,
}

impl Default for ReplenishmentParameters {
    fn default() -> Self {
        Self {
            enabled: true,
            thresholds: per_type(2, 3, 1),
            batch: per_type(1, 3, 1),
            interval: 0.0,
            lead_time: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostParameters {
    pub component_acquisition: f64,
    pub core_acquisition: f64,
    pub delay_penalty: f64,
    pub hourly_operating_cost: f64,
    pub unit_price: f64,
}

impl Default for CostParameters {
    fn default() -> Self {
        Self {
            component_acquisition: 4.0,
            core_acquisition: 30.0,
            delay_penalty: 100.0,
            hourly_operating_cost: 50.0,
            unit_price: 6000.0,
        }
    }
}

/// Fully resolved parameters of one line run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineParameters {
    pub options: RunOptions,
    pub demand: DemandParameters,
    pub cores_arrival: ArrivalParameters,
    pub cleaning_and_inspection: CleaningInspectionParameters,
    /// Components per core and per product
    pub bill_of_materials: PerType<u32>,
    pub disassembly: DisassemblyParameters,
    pub component_cleaning: ComponentCleaningParameters,
    pub component_inspection: ComponentInspectionParameters,
    pub component_repair: ComponentRepairParameters,
    pub assembly: AssemblyParameters,
    pub finished_product_inspection: ProductInspectionParameters,
    pub replenishment: ReplenishmentParameters,
    pub buffer_capacities: BTreeMap<BufferKind, usize>,
    pub costs: CostParameters,
}

impl Default for LineParameters {
    fn default() -> Self {
        Self {
            options: RunOptions::default(),
            demand: DemandParameters::default(),
            cores_arrival: ArrivalParameters::default(),
            cleaning_and_inspection: CleaningInspectionParameters::default(),
            bill_of_materials: per_type(2, 3, 1),
            disassembly: DisassemblyParameters::default(),
            component_cleaning: ComponentCleaningParameters::default(),
            component_inspection: ComponentInspectionParameters::default(),
            component_repair: ComponentRepairParameters::default(),
            assembly: AssemblyParameters::default(),
            finished_product_inspection: ProductInspectionParameters::default(),
            replenishment: ReplenishmentParameters::default(),
            buffer_capacities: BufferKind::ALL.into_iter().map(|kind| (kind, 500)).collect(),
            costs: CostParameters::default(),
        }
    }
}

impl LineParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON parameter document and validate it. Every key is required.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let document: serde_json::Value = serde_json::from_str(json)?;
        for section in REQUIRED_SECTIONS {
            if document.get(section).is_none() {
                warn!("Parameter document lacks section '{}'", section);
                return Err(ConfigError::MissingParameter(section.to_string()));
            }
        }
        let params: LineParameters = serde_json::from_value(document)?;
        params.validate()?;
        Ok(params)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.options.random_seed = seed;
        self
    }

    pub fn with_warmup_period(mut self, warmup: SimTime) -> Self {
        self.options.warmup_period = warmup;
        self
    }

    pub fn with_monitoring_interval(mut self, interval: SimTime) -> Self {
        self.options.monitoring_interval = interval;
        self
    }

    pub fn with_discard_low_cores(mut self, enabled: bool) -> Self {
        self.options.discard_low_cores = enabled;
        self
    }

    pub fn with_arrival_variability(mut self, enabled: bool) -> Self {
        self.options.arrival_variability = enabled;
        self
    }

    pub fn with_demand_variability(mut self, enabled: bool) -> Self {
        self.options.demand_variability = enabled;
        self
    }

    pub fn with_per_type_breakdown(mut self, enabled: bool) -> Self {
        self.options.per_type_breakdown = enabled;
        self
    }

    pub fn with_core_batch(mut self, min: u32, max: u32) -> Self {
        self.cores_arrival.batch_size_min = min;
        self.cores_arrival.batch_size_max = max;
        self
    }

    pub fn with_demand_quantity(mut self, min: u32, max: u32) -> Self {
        self.demand.quantity_min = min;
        self.demand.quantity_max = max;
        self
    }

    pub fn with_cleaning_inspection_quality(mut self, shares: GradeShares) -> Self {
        self.cleaning_and_inspection.quality = shares;
        self
    }

    pub fn with_repair_stations(mut self, stations: usize) -> Self {
        self.component_repair.capacity = stations;
        self
    }

    pub fn with_max_repair_attempts(mut self, attempts: u32) -> Self {
        self.component_repair.max_repair_attempts = attempts;
        self
    }

    pub fn with_replenishment(mut self, enabled: bool) -> Self {
        self.replenishment.enabled = enabled;
        self
    }

    pub fn with_buffer_capacities(mut self, capacity: usize) -> Self {
        for kind in BufferKind::ALL {
            self.buffer_capacities.insert(kind, capacity);
        }
        self
    }

    pub fn buffer_capacity(&self, kind: BufferKind) -> Result<usize> {
        self.buffer_capacities
            .get(&kind)
            .copied()
            .ok_or_else(|| ConfigError::MissingParameter(format!("buffer_capacities.{}", kind.name())))
    }

    /// Component types the line actually builds, in bill-of-materials order
    pub fn component_types(&self) -> impl Iterator<Item = ComponentType> + '_ {
        self.bill_of_materials.keys().copied()
    }

    pub fn validate(&self) -> Result<()> {
        self.check().map_err(|err| {
            warn!("Rejected line parameters: {}", err);
            err
        })
    }

    fn check(&self) -> Result<()> {
        let options = &self.options;
        non_negative("options.warmup_period", options.warmup_period)?;
        positive("options.monitoring_interval", options.monitoring_interval)?;

        positive("demand.interval", self.demand.interval)?;
        variability("demand.variability", self.demand.variability)?;
        if self.demand.quantity_min == 0 {
            return Err(ConfigError::invalid("demand.quantity_min", "must be at least 1"));
        }
        if self.demand.quantity_min > self.demand.quantity_max {
            return Err(ConfigError::invalid("demand.quantity_min", "exceeds quantity_max"));
        }

        positive("cores_arrival.interval", self.cores_arrival.interval)?;
        variability("cores_arrival.variability", self.cores_arrival.variability)?;
        if self.cores_arrival.batch_size_min > self.cores_arrival.batch_size_max {
            return Err(ConfigError::invalid("cores_arrival.batch_size_min", "exceeds batch_size_max"));
        }

        for kind in BufferKind::ALL {
            if self.buffer_capacity(kind)? == 0 {
                return Err(ConfigError::invalid(
                    format!("buffer_capacities.{}", kind.name()),
                    "must be greater than 0",
                ));
            }
        }

        if self.bill_of_materials.values().all(|qty| *qty == 0) {
            return Err(ConfigError::invalid("bill_of_materials", "needs at least one component"));
        }

        let cleaning = &self.cleaning_and_inspection;
        capacity("cleaning_and_inspection.capacity", cleaning.capacity)?;
        self.batch_fits("cleaning_and_inspection.batch_size", cleaning.batch_size, BufferKind::Arrival)?;
        cleaning.quality.validate("cleaning_and_inspection.quality")?;
        times("cleaning_and_inspection.process_times", &cleaning.process_times)?;

        let disassembly = &self.disassembly;
        capacity("disassembly.capacity", disassembly.capacity)?;
        self.batch_fits("disassembly.batch_size", disassembly.batch_size, BufferKind::Cleaned)?;
        times("disassembly.process_times", &disassembly.process_times)?;

        let component_cleaning = &self.component_cleaning;
        capacity("component_cleaning.capacity", component_cleaning.capacity)?;
        self.batch_fits(
            "component_cleaning.batch_size",
            component_cleaning.batch_size,
            BufferKind::Components,
        )?;

        let inspection = &self.component_inspection;
        capacity("component_inspection.capacity", inspection.capacity)?;

        let repair = &self.component_repair;
        capacity("component_repair.capacity", repair.capacity)?;
        if repair.max_repair_attempts == 0 {
            return Err(ConfigError::invalid("component_repair.max_repair_attempts", "must be at least 1"));
        }
        // Repair re-queues into its own input while holding its unit
        if self.buffer_capacity(BufferKind::ToBeRepairedComponents)? <= repair.capacity {
            return Err(ConfigError::invalid(
                "buffer_capacities.to_be_repaired_components_buffer",
                format!("must exceed the {} repair stations", repair.capacity),
            ));
        }

        for component_type in self.component_types() {
            let name = |table: &str| format!("{}.{}", table, component_type);

            lookup(&component_cleaning.quality, component_type, "component_cleaning.quality")?
                .validate(&name("component_cleaning.quality"))?;
            times(
                &name("component_cleaning.process_times"),
                lookup(&component_cleaning.process_times, component_type, "component_cleaning.process_times")?,
            )?;

            let batch = *lookup(&inspection.batch_size, component_type, "component_inspection.batch_size")?;
            self.batch_fits(&name("component_inspection.batch_size"), batch, BufferKind::CleanedComponents)?;
            condition_shares(
                &name("component_inspection.quality"),
                lookup(&inspection.quality, component_type, "component_inspection.quality")?,
            )?;
            times(
                &name("component_inspection.process_times"),
                lookup(&inspection.process_times, component_type, "component_inspection.process_times")?,
            )?;

            lookup(&repair.easiness, component_type, "component_repair.easiness")?
                .validate(&name("component_repair.easiness"))?;
            condition_shares(
                &name("component_repair.quality"),
                lookup(&repair.quality, component_type, "component_repair.quality")?,
            )?;
            times(
                &name("component_repair.process_times"),
                lookup(&repair.process_times, component_type, "component_repair.process_times")?,
            )?;

            lookup(&self.replenishment.thresholds, component_type, "replenishment.thresholds")?;
            lookup(&self.replenishment.batch, component_type, "replenishment.batch")?;
        }

        capacity("assembly.capacity", self.assembly.capacity)?;
        non_negative("assembly.process_time", self.assembly.process_time)?;
        positive("assembly.retry_interval", self.assembly.retry_interval)?;

        let product_inspection = &self.finished_product_inspection;
        capacity("finished_product_inspection.capacity", product_inspection.capacity)?;
        product_inspection.quality.validate("finished_product_inspection.quality")?;
        non_negative("finished_product_inspection.process_time", product_inspection.process_time)?;

        non_negative("replenishment.interval", self.replenishment.interval)?;
        non_negative("replenishment.lead_time", self.replenishment.lead_time)?;

        let costs = &self.costs;
        non_negative("costs.component_acquisition", costs.component_acquisition)?;
        non_negative("costs.core_acquisition", costs.core_acquisition)?;
        non_negative("costs.delay_penalty", costs.delay_penalty)?;
        non_negative("costs.hourly_operating_cost", costs.hourly_operating_cost)?;
        non_negative("costs.unit_price", costs.unit_price)?;

        Ok(())
    }

    fn batch_fits(&self, name: &str, batch: usize, input: BufferKind) -> Result<()> {
        if batch == 0 {
            return Err(ConfigError::invalid(name, "batch size must be at least 1"));
        }
        if batch > self.buffer_capacity(input)? {
            return Err(ConfigError::invalid(
                name,
                format!("batch of {} exceeds the capacity of {}", batch, input.name()),
            ));
        }
        Ok(())
    }
}

fn lookup<'a, T>(table: &'a PerType<T>, component_type: ComponentType, name: &str) -> Result<&'a T> {
    table
        .get(&component_type)
        .ok_or_else(|| ConfigError::MissingParameter(format!("{}.{}", name, component_type)))
}

fn positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(name, "must be greater than 0"))
    }
}

fn non_negative(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(name, "must be a finite value of at least 0"))
    }
}

fn variability(name: &str, value: f64) -> Result<()> {
    if (0.0..1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid(name, "must lie in [0, 1)"))
    }
}

fn capacity(name: &str, value: usize) -> Result<()> {
    if value == 0 {
        return Err(ConfigError::invalid(name, "must be greater than 0"));
    }
    Ok(())
}

fn times(name: &str, table: &GradeTable<SimTime>) -> Result<()> {
    for value in table.values() {
        non_negative(name, *value)?;
    }
    Ok(())
}

fn condition_shares(name: &str, table: &ConditionShares) -> Result<()> {
    table.low.validate(&format!("{}.low", name))?;
    table.medium.validate(&format!("{}.medium", name))?;
    table.high.validate(&format!("{}.high", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remanufacturing::quality::Grade;

    #[test]
    fn test_default_parameters_are_valid() {
        let params = LineParameters::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.options.warmup_period, 2520.0);
        assert_eq!(params.cores_arrival.interval, 1440.0);
        assert_eq!(params.bill_of_materials[&ComponentType::B], 3);
        assert_eq!(params.buffer_capacity(BufferKind::DiscardedProducts).unwrap(), 500);
        assert_eq!(params.component_cleaning.capacity, 2);
        assert_eq!(*params.component_repair.process_times[&ComponentType::C].get(Grade::High), 960.0);
    }

    #[test]
    fn test_builder_pattern() {
        let params = LineParameters::new()
            .with_random_seed(11)
            .with_warmup_period(0.0)
            .with_core_batch(4, 8)
            .with_repair_stations(3)
            .with_buffer_capacities(20);

        assert_eq!(params.options.random_seed, 11);
        assert_eq!(params.options.warmup_period, 0.0);
        assert_eq!(params.cores_arrival.batch_size_min, 4);
        assert_eq!(params.cores_arrival.batch_size_max, 8);
        assert_eq!(params.component_repair.capacity, 3);
        assert!(params.buffer_capacities.values().all(|c| *c == 20));
    }

    #[test]
    fn test_repair_buffer_must_exceed_repair_stations() {
        let mut params = LineParameters::default().with_repair_stations(3);
        params.buffer_capacities.insert(BufferKind::ToBeRepairedComponents, 3);
        match params.validate() {
            Err(ConfigError::InvalidParameter { name, .. }) => {
                assert_eq!(name, "buffer_capacities.to_be_repaired_components_buffer")
            }
            other => panic!("unexpected {:?}", other),
        }

        params.buffer_capacities.insert(BufferKind::ToBeRepairedComponents, 4);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_shares_not_summing_to_100_are_rejected() {
        let params = LineParameters::new().with_cleaning_inspection_quality(GradeShares::new(50.0, 30.0, 30.0));
        match params.validate() {
            Err(ConfigError::InvalidShares { table, total }) => {
                assert_eq!(table, "cleaning_and_inspection.quality");
                assert_eq!(total, 110.0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_nested_shares_name_their_table() {
        let mut params = LineParameters::default();
        if let Some(table) = params.component_repair.quality.get_mut(&ComponentType::B) {
            table.medium = GradeShares::new(10.0, 10.0, 10.0);
        }
        match params.validate() {
            Err(ConfigError::InvalidShares { table, .. }) => {
                assert_eq!(table, "component_repair.quality.Component_B.medium")
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_missing_type_entry_is_rejected() {
        let mut params = LineParameters::default();
        params.component_inspection.process_times.remove(&ComponentType::C);
        match params.validate() {
            Err(ConfigError::MissingParameter(name)) => {
                assert_eq!(name, "component_inspection.process_times.Component_C")
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_type_outside_bill_of_materials_needs_no_tables() {
        let mut params = LineParameters::default();
        params.bill_of_materials.remove(&ComponentType::C);
        params.component_repair.easiness.remove(&ComponentType::C);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_invalid_scalars_are_rejected() {
        let cases = vec![
            LineParameters::new().with_monitoring_interval(0.0),
            LineParameters::new().with_core_batch(7, 6),
            LineParameters::new().with_demand_quantity(0, 3),
            LineParameters::new().with_max_repair_attempts(0),
            LineParameters::new().with_repair_stations(0),
            LineParameters::new().with_buffer_capacities(0),
        ];
        for params in cases {
            assert!(matches!(params.validate(), Err(ConfigError::InvalidParameter { .. })));
        }

        let mut params = LineParameters::default();
        params.disassembly.batch_size = 501;
        assert!(matches!(params.validate(), Err(ConfigError::InvalidParameter { .. })));
    }

    #[test]
    fn test_json_round_trip() {
        let json = LineParameters::default().to_json_string().unwrap();
        let parsed = LineParameters::from_json_str(&json).unwrap();
        assert_eq!(parsed.demand.quantity_max, 20);
        assert_eq!(parsed.replenishment.batch[&ComponentType::B], 3);
    }

    #[test]
    fn test_json_missing_section_is_reported() {
        let mut document: serde_json::Value =
            serde_json::from_str(&LineParameters::default().to_json_string().unwrap()).unwrap();
        document.as_object_mut().unwrap().remove("disassembly");

        match LineParameters::from_json_str(&document.to_string()) {
            Err(ConfigError::MissingParameter(section)) => assert_eq!(section, "disassembly"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_json_missing_nested_key_is_not_defaulted() {
        let mut document: serde_json::Value =
            serde_json::from_str(&LineParameters::default().to_json_string().unwrap()).unwrap();
        document["assembly"].as_object_mut().unwrap().remove("process_time");

        assert!(matches!(
            LineParameters::from_json_str(&document.to_string()),
            Err(ConfigError::Parse(_))
        ));
    }
}
