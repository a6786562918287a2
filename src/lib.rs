pub mod core;
pub mod error;
pub mod remanufacturing;

// Re-export commonly used types
pub use crate::core::process::{Process, ProcessContext, Suspend};
pub use crate::core::simulation_engine::SimulationEngine;
pub use crate::core::types::{ProcessId, SimTime};
pub use crate::error::{ConfigError, Result};
pub use crate::remanufacturing::config::LineParameters;
pub use crate::remanufacturing::line::run_simulation;
pub use crate::remanufacturing::replications::run_replications;
pub use crate::remanufacturing::results::{SimulationReport, SimulationResults};
