use super::kpi::{KpiState, MonitoringLog};
use crate::core::random::{RandomStreams, StreamKey};
use crate::core::types::SimTime;

/// One independent random stream per stochastic decision point
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stream {
    CleaningAndInspection,
    ComponentCleaning,
    ComponentInspection,
    ComponentRepair,
    FinishedProductInspection,
    DemandArrival,
    CoresArrival,
}

impl StreamKey for Stream {
    fn seed_offset(&self) -> u64 {
        match self {
            Stream::CleaningAndInspection => 0,
            Stream::ComponentCleaning => 1,
            Stream::ComponentInspection => 2,
            Stream::ComponentRepair => 3,
            Stream::FinishedProductInspection => 4,
            Stream::DemandArrival => 5,
            Stream::CoresArrival => 6,
        }
    }
}

/// State shared by every process of a line run
#[derive(Debug, Clone)]
pub struct LineState {
    pub streams: RandomStreams<Stream>,
    pub kpi: KpiState,
    pub monitoring: MonitoringLog,
    /// Time of the last replenishment request, 0 before the first
    pub last_replenishment_request: SimTime,
}

impl LineState {
    pub fn new(seed: u64) -> Self {
        Self {
            streams: RandomStreams::new(seed),
            kpi: KpiState::new(),
            monitoring: MonitoringLog::new(),
            last_replenishment_request: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_offsets_are_distinct() {
        let streams = [
            Stream::CleaningAndInspection,
            Stream::ComponentCleaning,
            Stream::ComponentInspection,
            Stream::ComponentRepair,
            Stream::FinishedProductInspection,
            Stream::DemandArrival,
            Stream::CoresArrival,
        ];
        let mut offsets: Vec<u64> = streams.iter().map(|s| s.seed_offset()).collect();
        offsets.dedup();
        assert_eq!(offsets, vec![0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_new_state_is_zeroed() {
        let state = LineState::new(3);
        assert_eq!(state.streams.base_seed(), 3);
        assert_eq!(state.kpi.total_requests, 0);
        assert!(state.monitoring.is_empty());
    }
}
