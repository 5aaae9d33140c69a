// src/simulation/load_parameters.rs

use std::error::Error;
use std::fs::File;
use std::path::Path;

use serde_yaml::from_reader;
use tracing::debug;

use crate::config::SimulationConfig;

/// シミュレーション設定の読み込みと検証
pub fn load_simulation_config<P: AsRef<Path>>(path: P) -> Result<SimulationConfig, Box<dyn Error>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let config: SimulationConfig = from_reader(file)?;
    config.validate()?;
    debug!(path = %path.display(), ?config, "設定を読み込みました");
    Ok(config)
}
