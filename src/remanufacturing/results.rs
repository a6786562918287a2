//! Post-run reduction of counters and monitoring data into one report.

use super::buffers::BufferKind;
use super::config::LineParameters;
use super::entities::ComponentType;
use super::kpi::{FlowCounters, MonitoringRecord, OccupancyStats};
use super::state::LineState;
use crate::core::types::SimTime;
use crate::error::Result;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Headline KPIs of a run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationResults {
    pub total_requests: u64,
    pub fulfilled_requests: u64,
    pub delayed_requests: u64,
    pub mean_delay_time: SimTime,
    pub mean_lead_time: SimTime,
    pub total_cost: f64,
    pub total_income: f64,
}

impl fmt::Display for SimulationResults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  Total requests:     {}", self.total_requests)?;
        writeln!(f, "  Fulfilled requests: {}", self.fulfilled_requests)?;
        writeln!(f, "  Delayed requests:   {}", self.delayed_requests)?;
        writeln!(f, "  Mean delay time:    {:.2}", self.mean_delay_time)?;
        writeln!(f, "  Mean lead time:     {:.2}", self.mean_lead_time)?;
        writeln!(f, "  Total cost:         {:.2}", self.total_cost)?;
        write!(f, "  Total income:       {:.2}", self.total_income)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostBreakdown {
    pub delay_penalties: f64,
    pub operating: f64,
    pub cores: f64,
    pub components: f64,
}

impl CostBreakdown {
    pub fn total(&self) -> f64 {
        self.delay_penalties + self.operating + self.cores + self.components
    }
}

/// Occupancy of one buffer, overall (`component_type` is `None`) or for one type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BufferSummary {
    pub buffer: BufferKind,
    pub component_type: Option<ComponentType>,
    pub mean_count: f64,
    pub min_count: usize,
    pub max_count: usize,
}

impl BufferSummary {
    fn from_stats(buffer: BufferKind, component_type: Option<ComponentType>, stats: &OccupancyStats) -> Self {
        Self {
            buffer,
            component_type,
            mean_count: stats.mean(),
            min_count: stats.min_level(),
            max_count: stats.max,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulationReport {
    pub run_id: Uuid,
    pub horizon: SimTime,
    pub random_seed: u64,
    pub results: SimulationResults,
    pub costs: CostBreakdown,
    pub busy_hours: f64,
    pub cores_purchased: u64,
    pub components_purchased: u64,
    pub flow: FlowCounters,
    /// Buffer levels when the clock stopped
    pub final_levels: BTreeMap<BufferKind, usize>,
    pub buffer_summary_total: Vec<BufferSummary>,
    pub buffer_summary_by_type: Vec<BufferSummary>,
    pub monitoring: Vec<MonitoringRecord>,
}

impl SimulationReport {
    pub fn summary_for(&self, buffer: BufferKind) -> Option<&BufferSummary> {
        self.buffer_summary_total.iter().find(|s| s.buffer == buffer)
    }

    pub fn final_level(&self, buffer: BufferKind) -> usize {
        self.final_levels.get(&buffer).copied().unwrap_or(0)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

pub fn compile(
    horizon: SimTime,
    params: &LineParameters,
    state: LineState,
    final_levels: BTreeMap<BufferKind, usize>,
) -> SimulationReport {
    let kpi = &state.kpi;
    let costs = &params.costs;

    let breakdown = CostBreakdown {
        delay_penalties: kpi.delayed_requests as f64 * costs.delay_penalty,
        operating: kpi.busy_hours() * costs.hourly_operating_cost,
        cores: kpi.cores_purchased as f64 * costs.core_acquisition,
        components: kpi.components_purchased as f64 * costs.component_acquisition,
    };

    let mean_lead_time = if kpi.total_requests == 0 {
        0.0
    } else {
        horizon / kpi.total_requests as f64
    };

    let results = SimulationResults {
        total_requests: kpi.total_requests,
        fulfilled_requests: kpi.fulfilled_requests,
        delayed_requests: kpi.delayed_requests,
        mean_delay_time: kpi.mean_delay_time(),
        mean_lead_time,
        total_cost: breakdown.total(),
        total_income: kpi.income,
    };

    let buffer_summary_total = state
        .monitoring
        .totals()
        .iter()
        .map(|(kind, stats)| BufferSummary::from_stats(*kind, None, stats))
        .collect();
    let buffer_summary_by_type = state
        .monitoring
        .by_type()
        .iter()
        .flat_map(|(kind, per_type)| {
            per_type
                .iter()
                .map(move |(component_type, stats)| BufferSummary::from_stats(*kind, Some(*component_type), stats))
        })
        .collect();

    SimulationReport {
        run_id: Uuid::new_v4(),
        horizon,
        random_seed: params.options.random_seed,
        results,
        costs: breakdown,
        busy_hours: kpi.busy_hours(),
        cores_purchased: kpi.cores_purchased,
        components_purchased: kpi.components_purchased,
        flow: kpi.flow.clone(),
        final_levels,
        buffer_summary_total,
        buffer_summary_by_type,
        monitoring: state.monitoring.into_records(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_costs_and_means() {
        let params = LineParameters::default();
        let mut state = LineState::new(3);
        state.kpi.record_request(20);
        state.kpi.record_fulfilled(18, params.costs.unit_price);
        state.kpi.record_delayed(2, 100.0);
        state.kpi.clear_backlog(2, 130.0);
        state.kpi.add_busy_time(120.0);
        state.kpi.cores_purchased = 6;
        state.kpi.components_purchased = 3;

        let report = compile(1000.0, &params, state, BTreeMap::new());
        let results = &report.results;
        assert_eq!(results.total_requests, 20);
        assert_eq!(results.mean_delay_time, 30.0);
        assert_eq!(results.mean_lead_time, 50.0);
        assert_eq!(results.total_income, 108000.0);
        // 2 * 100 + 2h * 50 + 6 * 30 + 3 * 4
        assert_eq!(results.total_cost, 492.0);
        assert_eq!(report.costs.components, 12.0);
    }

    #[test]
    fn test_no_requests_means_zero_lead_time() {
        let report = compile(500.0, &LineParameters::default(), LineState::new(1), BTreeMap::new());
        assert_eq!(report.results.mean_lead_time, 0.0);
        assert_eq!(report.results.mean_delay_time, 0.0);
        assert!(report.buffer_summary_total.is_empty());
        assert!(report.to_json().is_ok());
    }
}
