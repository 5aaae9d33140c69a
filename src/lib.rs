// src/lib.rs

//! 剛体リンクでつながれた平面多重振り子（N 振り子）のシミュレーション
//!
//! - `models`: 振り子の運動方程式と観測量
//! - `math`: 埋め込み型 Runge-Kutta 積分器、三重対角ソルバ
//! - `simulation`: 設定の読み込み、サンプリング、CSV 出力
//! - `config`: 設定ファイルの構造体

pub mod config;
pub mod math;
pub mod models;
pub mod simulation;

pub use math::{AdaptiveIntegrator, Derivative, MathError, TableauVariant};
pub use models::{ChainModel, ChainState};
