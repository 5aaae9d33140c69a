// src/config/mod.rs

pub mod parameters;
pub mod scenario;

pub use parameters::{ChainParameters, IntegratorParameters, OutputParameters};
pub use scenario::SimulationConfig;
