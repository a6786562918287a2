//! Run-scoped KPI counters and the monitoring time series.

use super::buffers::BufferKind;
use super::entities::ComponentType;
use crate::core::types::SimTime;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

/// Material movements through the line, used for conservation checks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowCounters {
    pub cores_received: u64,
    pub cores_disassembled: u64,
    pub components_created: u64,
    pub components_replenished: u64,
    pub components_consumed: u64,
    pub repair_attempts: u64,
    pub products_assembled: u64,
    pub products_shipped: u64,
}

#[derive(Debug, Clone, Default)]
pub struct KpiState {
    pub total_requests: u64,
    pub fulfilled_requests: u64,
    pub delayed_requests: u64,
    pub cumulative_delay_time: SimTime,
    /// Station busy time in minutes
    pub busy_time: SimTime,
    pub cores_purchased: u64,
    pub components_purchased: u64,
    pub income: f64,
    pub flow: FlowCounters,
    backlog: VecDeque<SimTime>,
}

impl KpiState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_request(&mut self, quantity: u32) {
        self.total_requests += u64::from(quantity);
    }

    /// An on-time shipment; income tracks fulfilled units only
    pub fn record_fulfilled(&mut self, quantity: u32, unit_price: f64) {
        self.fulfilled_requests += u64::from(quantity);
        self.income = self.fulfilled_requests as f64 * unit_price;
    }

    /// Backorder `quantity` units, one backlog entry per unit
    pub fn record_delayed(&mut self, quantity: u32, now: SimTime) {
        self.delayed_requests += u64::from(quantity);
        self.backlog.extend(std::iter::repeat(now).take(quantity as usize));
    }

    /// Ship `quantity` backordered units at `now`, oldest first. Returns the
    /// delay added to the cumulative total.
    pub fn clear_backlog(&mut self, quantity: u32, now: SimTime) -> SimTime {
        let mut delay = 0.0;
        for _ in 0..quantity {
            match self.backlog.pop_front() {
                Some(since) => delay += now - since,
                None => break,
            }
        }
        self.cumulative_delay_time += delay;
        delay
    }

    pub fn backlog_len(&self) -> usize {
        self.backlog.len()
    }

    pub fn add_busy_time(&mut self, minutes: SimTime) {
        self.busy_time += minutes;
    }

    pub fn busy_hours(&self) -> f64 {
        self.busy_time / 60.0
    }

    pub fn mean_delay_time(&self) -> SimTime {
        if self.delayed_requests == 0 {
            0.0
        } else {
            self.cumulative_delay_time / self.delayed_requests as f64
        }
    }
}

/// Running mean/min/max of a sampled level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OccupancyStats {
    pub samples: u64,
    pub sum: u64,
    pub min: usize,
    pub max: usize,
}

impl Default for OccupancyStats {
    fn default() -> Self {
        Self {
            samples: 0,
            sum: 0,
            min: usize::MAX,
            max: 0,
        }
    }
}

impl OccupancyStats {
    pub fn record(&mut self, level: usize) {
        self.samples += 1;
        self.sum += level as u64;
        self.min = self.min.min(level);
        self.max = self.max.max(level);
    }

    pub fn mean(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.sum as f64 / self.samples as f64
        }
    }

    /// Smallest sampled level, 0 before the first sample
    pub fn min_level(&self) -> usize {
        if self.samples == 0 {
            0
        } else {
            self.min
        }
    }
}

/// One monitoring tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringRecord {
    pub time: SimTime,
    pub levels: BTreeMap<BufferKind, usize>,
    pub fulfilled_requests: u64,
    pub delayed_requests: u64,
    pub products_shipped: u64,
    pub good_quality_by_type: Option<BTreeMap<ComponentType, usize>>,
    pub discarded_by_type: Option<BTreeMap<ComponentType, usize>>,
}

impl MonitoringRecord {
    pub fn level(&self, kind: BufferKind) -> usize {
        self.levels.get(&kind).copied().unwrap_or(0)
    }

    /// Units that have left the line for good: every sink plus shipments
    pub fn terminal_units(&self) -> u64 {
        BufferKind::SINKS.iter().map(|kind| self.level(*kind) as u64).sum::<u64>() + self.products_shipped
    }
}

/// Append-only time series plus per-buffer occupancy statistics
#[derive(Debug, Clone, Default)]
pub struct MonitoringLog {
    records: Vec<MonitoringRecord>,
    totals: BTreeMap<BufferKind, OccupancyStats>,
    by_type: BTreeMap<BufferKind, BTreeMap<ComponentType, OccupancyStats>>,
}

impl MonitoringLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, record: MonitoringRecord) {
        for (kind, level) in &record.levels {
            self.totals.entry(*kind).or_default().record(*level);
        }
        self.records.push(record);
    }

    /// Sample the per-type composition of one component buffer
    pub fn record_composition(&mut self, kind: BufferKind, counts: &BTreeMap<ComponentType, usize>) {
        let stats = self.by_type.entry(kind).or_default();
        for (component_type, count) in counts {
            stats.entry(*component_type).or_default().record(*count);
        }
    }

    pub fn records(&self) -> &[MonitoringRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn totals(&self) -> &BTreeMap<BufferKind, OccupancyStats> {
        &self.totals
    }

    pub fn by_type(&self) -> &BTreeMap<BufferKind, BTreeMap<ComponentType, OccupancyStats>> {
        &self.by_type
    }

    pub fn into_records(self) -> Vec<MonitoringRecord> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backlog_is_cleared_oldest_first() {
        let mut kpi = KpiState::new();
        kpi.record_request(3);
        kpi.record_delayed(3, 100.0);
        kpi.record_request(2);
        kpi.record_delayed(2, 150.0);
        assert_eq!(kpi.backlog_len(), 5);

        // Three units shipped at 200 clear the three oldest entries
        assert_eq!(kpi.clear_backlog(3, 200.0), 300.0);
        assert_eq!(kpi.backlog_len(), 2);
        assert_eq!(kpi.clear_backlog(2, 160.0), 20.0);

        assert_eq!(kpi.cumulative_delay_time, 320.0);
        assert_eq!(kpi.delayed_requests, 5);
        assert_eq!(kpi.mean_delay_time(), 64.0);
        assert_eq!(kpi.fulfilled_requests, 0);
    }

    #[test]
    fn test_income_tracks_fulfilled_units() {
        let mut kpi = KpiState::new();
        kpi.record_fulfilled(18, 6000.0);
        kpi.record_fulfilled(2, 6000.0);
        assert_eq!(kpi.fulfilled_requests, 20);
        assert_eq!(kpi.income, 120000.0);
    }

    #[test]
    fn test_busy_hours() {
        let mut kpi = KpiState::new();
        kpi.add_busy_time(90.0);
        kpi.add_busy_time(30.0);
        assert_eq!(kpi.busy_hours(), 2.0);
        assert_eq!(KpiState::new().mean_delay_time(), 0.0);
    }

    #[test]
    fn test_occupancy_stats() {
        let mut stats = OccupancyStats::default();
        assert_eq!(stats.min_level(), 0);
        for level in [4, 0, 2] {
            stats.record(level);
        }
        assert_eq!(stats.mean(), 2.0);
        assert_eq!(stats.min_level(), 0);
        assert_eq!(stats.max, 4);
    }

    #[test]
    fn test_monitoring_log_accumulates_statistics() {
        let mut log = MonitoringLog::new();
        for (time, level) in [(0.0, 1), (1.0, 3)] {
            let levels = BufferKind::ALL.into_iter().map(|kind| (kind, level)).collect();
            log.append(MonitoringRecord {
                time,
                levels,
                fulfilled_requests: 0,
                delayed_requests: 0,
                products_shipped: 1,
                good_quality_by_type: None,
                discarded_by_type: None,
            });
        }
        assert_eq!(log.len(), 2);
        assert_eq!(log.totals()[&BufferKind::Arrival].mean(), 2.0);
        assert_eq!(log.records()[1].terminal_units(), 10);
    }
}
