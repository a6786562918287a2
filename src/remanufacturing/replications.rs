//! Independent replications of a line run, one per base seed.

use super::config::LineParameters;
use super::line::run_simulation;
use super::results::SimulationReport;
use crate::core::types::SimTime;
use crate::error::Result;
use log::info;
use rayon::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Spread {
    pub mean: f64,
    pub min: f64,
    pub max: f64,
}

impl Spread {
    fn of<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let mut count = 0usize;
        let mut sum = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for value in values {
            count += 1;
            sum += value;
            min = min.min(value);
            max = max.max(value);
        }
        if count == 0 {
            return Self {
                mean: 0.0,
                min: 0.0,
                max: 0.0,
            };
        }
        Self {
            mean: sum / count as f64,
            min,
            max,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplicationSummary {
    pub replications: usize,
    pub total_cost: Spread,
    pub total_income: Spread,
    pub fulfilled_requests: Spread,
    pub delayed_requests: Spread,
    pub mean_delay_time: Spread,
}

impl ReplicationSummary {
    pub fn from_reports(reports: &[SimulationReport]) -> Self {
        let field = |f: fn(&SimulationReport) -> f64| Spread::of(reports.iter().map(f));
        Self {
            replications: reports.len(),
            total_cost: field(|r| r.results.total_cost),
            total_income: field(|r| r.results.total_income),
            fulfilled_requests: field(|r| r.results.fulfilled_requests as f64),
            delayed_requests: field(|r| r.results.delayed_requests as f64),
            mean_delay_time: field(|r| r.results.mean_delay_time),
        }
    }
}

/// Run one replication per seed in parallel. Reports come back in seed order.
pub fn run_replications(
    horizon: SimTime,
    params: &LineParameters,
    seeds: &[u64],
) -> Result<(Vec<SimulationReport>, ReplicationSummary)> {
    params.validate()?;
    info!("Running {} replications over horizon {}", seeds.len(), horizon);

    let reports = seeds
        .par_iter()
        .map(|seed| run_simulation(horizon, &params.clone().with_random_seed(*seed)))
        .collect::<Result<Vec<_>>>()?;
    let summary = ReplicationSummary::from_reports(&reports);
    Ok((reports, summary))
}
