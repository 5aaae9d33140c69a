// src/config/scenario.rs

use serde::Deserialize;

use crate::config::parameters::{ChainParameters, IntegratorParameters, OutputParameters};
use crate::math::MathError;

/// シミュレーション設定ファイル全体
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(default)]
pub struct SimulationConfig {
    pub chain: ChainParameters,
    pub integrator: IntegratorParameters,
    pub output: OutputParameters,
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), MathError> {
        self.chain.validate()?;
        self.integrator.validate()
    }
}
