pub mod event_scheduler;
pub mod process;
pub mod random;
pub mod resource;
pub mod simulation_engine;
pub mod store;
pub mod types;
