//! The remanufacturing line: cores in, graded and repaired components
//! through the middle, inspected products out against customer demand.

pub mod buffers;
pub mod config;
pub mod entities;
pub mod kpi;
pub mod line;
pub mod quality;
pub mod replications;
pub mod results;
pub mod state;
pub mod stations;
