// src/main.rs

use std::env;
use std::error::Error;
use std::io::Write;

use tracing::info;
use tracing_subscriber::EnvFilter;

use chainsim::simulation::csv::{create_csv_row, setup_csv_output};
use chainsim::simulation::framework::initialize_simulation;
use chainsim::simulation::load_parameters::load_simulation_config;

const DEFAULT_CONFIG: &str = "config/simulation.yaml";

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 設定の読み込み（第 1 引数で上書き可能）
    let config_path = env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let config = load_simulation_config(&config_path)?;

    // シミュレーションの実行
    let mut simulation = initialize_simulation(&config)?;
    let report = simulation.run()?;

    // CSV出力
    if config.output.enabled {
        let mut writer = setup_csv_output(&config.output.path, config.chain.links)?;
        for sample in &report.samples {
            writer.write_all(create_csv_row(sample).as_bytes())?;
        }
        writer.flush()?;
        info!(
            path = %config.output.path.display(),
            samples = report.samples.len(),
            "観測量を書き出しました"
        );
    }

    Ok(())
}
