// src/simulation/framework.rs

use nalgebra::DVector;
use tracing::{debug, info, warn};

use crate::config::{IntegratorParameters, SimulationConfig};
use crate::math::{AdaptiveIntegrator, MathError};
use crate::models::ChainModel;
use crate::simulation::{RunReport, RunSummary, Sample};

// 残り時間がこの割合（総時間比）以下なら終了とみなす
const TIME_EPSILON: f64 = 1e-9;

/// 振り子モデルと積分器をまとめた 1 回分のシミュレーション
#[derive(Debug)]
pub struct Simulation {
    integrator: AdaptiveIntegrator<ChainModel>,
    params: IntegratorParameters,
    rejected_steps: usize,
}

/// 設定からシミュレーションを初期化する
pub fn initialize_simulation(config: &SimulationConfig) -> Result<Simulation, MathError> {
    config.validate()?;

    let chain = ChainModel::new(config.chain.links)?;
    let state = chain.initial_hanging_state(config.chain.offset, config.chain.bias);
    let integrator = AdaptiveIntegrator::new(chain, state, config.integrator.variant);

    Ok(Simulation {
        integrator,
        params: config.integrator.clone(),
        rejected_steps: 0,
    })
}

impl Simulation {
    pub fn integrator(&self) -> &AdaptiveIntegrator<ChainModel> {
        &self.integrator
    }

    pub fn chain(&self) -> &ChainModel {
        self.integrator.derivative()
    }

    pub fn rejected_steps(&self) -> usize {
        self.rejected_steps
    }

    /// 現在の状態から観測量を取り出す
    pub fn sample(&self) -> Result<Sample, MathError> {
        let chain = self.chain();
        let (theta, omega) = chain.split_state(self.integrator.state())?;
        let (x, z) = chain.cartesian_coordinates(theta, true)?;
        let (dx, dz) = chain.velocities(theta, omega, true)?;
        let energy = chain.total_energy(theta, omega)?;

        Ok(Sample {
            iteration: self.integrator.iteration_count(),
            time: self.integrator.elapsed_time(),
            x,
            z,
            dx,
            dz,
            energy,
        })
    }

    /// 1 ステップ進める
    ///
    /// 許容誤差が設定されている場合は、誤差推定値が許容誤差を超える限り
    /// 刻み幅を半分にしてやり直す（下限 `min_dt`）。
    ///
    /// # 戻り値
    /// - 実際に採用した刻み幅
    pub fn advance(&mut self, dt: f64) -> Result<f64, MathError> {
        let Some(tolerance) = self.params.tolerance else {
            self.integrator.step(dt, self.params.measure_error)?;
            return Ok(dt);
        };

        let min_dt = self.params.min_dt.min(dt);
        let mut trial = dt;
        loop {
            let snapshot = self.integrator.snapshot();
            self.integrator.step(trial, true)?;

            let error = self.integrator.error();
            if error <= tolerance {
                return Ok(trial);
            }
            if trial <= min_dt {
                warn!(
                    error,
                    tolerance,
                    dt = trial,
                    "最小刻み幅でも許容誤差を満たしません"
                );
                return Ok(trial);
            }

            self.integrator.restore(snapshot)?;
            self.rejected_steps += 1;
            debug!(error, tolerance, dt = trial, "ステップを棄却しました");
            trial = (trial * 0.5).max(min_dt);
        }
    }

    /// 総シミュレーション時間まで積分し、`sample_every` ステップごとに観測量を記録する
    pub fn run(&mut self) -> Result<RunReport, MathError> {
        let total_time = self.params.total_time;
        let sample_every = self.params.sample_every;
        // 経過時間の丸め誤差はステップ数とともに総時間に比例して増える
        let end_tolerance = TIME_EPSILON * total_time.max(self.params.dt);

        let first = self.sample()?;
        let initial_energy = first.energy;
        let mut samples = vec![first];

        info!(
            links = self.chain().links(),
            variant = ?self.integrator.variant(),
            dt = self.params.dt,
            total_time,
            initial_energy,
            "シミュレーションを開始します"
        );

        loop {
            let remaining = total_time - self.integrator.elapsed_time();
            if remaining <= end_tolerance {
                break;
            }
            self.advance(self.params.dt.min(remaining))?;

            if self.integrator.iteration_count() % sample_every == 0 {
                let sample = self.sample()?;
                debug!(
                    iteration = sample.iteration,
                    time = sample.time,
                    energy = sample.energy,
                    error = self.integrator.error(),
                    "観測量を記録しました"
                );
                samples.push(sample);
            }
        }

        let final_energy = self.current_energy()?;
        let summary = RunSummary {
            steps: self.integrator.iteration_count(),
            rejected_steps: self.rejected_steps,
            final_time: self.integrator.elapsed_time(),
            initial_energy,
            final_energy,
            energy_drift: relative_drift(initial_energy, final_energy),
        };

        info!(
            steps = summary.steps,
            rejected_steps = summary.rejected_steps,
            final_time = summary.final_time,
            energy_drift = summary.energy_drift,
            "シミュレーションが終了しました"
        );

        Ok(RunReport { samples, summary })
    }

    fn current_energy(&self) -> Result<f64, MathError> {
        let chain = self.chain();
        let (theta, omega) = chain.split_state(self.integrator.state())?;
        chain.total_energy(theta, omega)
    }

    /// 現在の状態ベクトル
    pub fn state(&self) -> &DVector<f64> {
        self.integrator.state()
    }
}

/// エネルギーの相対変化（初期値が 0 のときは絶対変化）
pub fn relative_drift(initial: f64, current: f64) -> f64 {
    let change = (current - initial).abs();
    if initial == 0.0 {
        change
    } else {
        change / initial.abs()
    }
}
