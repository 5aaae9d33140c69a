// src/simulation/mod.rs

pub mod load_parameters;
pub mod csv;
pub mod framework;

use nalgebra::DVector;

/// ある時刻の観測量（座標・速度は支点 (0, 0) を先頭に含む）
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub iteration: usize,
    pub time: f64,
    pub x: DVector<f64>,
    pub z: DVector<f64>,
    pub dx: DVector<f64>,
    pub dz: DVector<f64>,
    pub energy: f64,
}

/// シミュレーション全体の集計
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub steps: usize,
    pub rejected_steps: usize,
    pub final_time: f64,
    pub initial_energy: f64,
    pub final_energy: f64,
    pub energy_drift: f64, // 全エネルギーの相対変化
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub samples: Vec<Sample>,
    pub summary: RunSummary,
}
