// src/math/integrator.rs

use nalgebra::{DMatrix, DVector};

use crate::math::error::{check_len, MathError};
use crate::math::tableau::TableauVariant;

/// 誤差推定の初期値（一度も測定していない状態）
pub const INITIAL_ERROR: f64 = 1e-16;

/// 状態ベクトルからその時間微分を返す関数
///
/// 入力と同じ長さ・同じ並びのベクトルを返すこと。内部の作業領域を
/// 書き換えてもよいが、呼び出し側の状態には影響を与えてはならない。
pub trait Derivative {
    fn evaluate(&mut self, state: &DVector<f64>) -> Result<DVector<f64>, MathError>;
}

impl<F> Derivative for F
where
    F: FnMut(&DVector<f64>) -> Result<DVector<f64>, MathError>,
{
    fn evaluate(&mut self, state: &DVector<f64>) -> Result<DVector<f64>, MathError> {
        self(state)
    }
}

/// ステップ前の状態の写し（ステップのやり直しに使う）
#[derive(Debug, Clone, PartialEq)]
pub struct IntegratorSnapshot {
    pub state: DVector<f64>,
    pub error: f64,
    pub iteration: usize,
    pub elapsed_time: f64,
}

/// 埋め込み型 Runge-Kutta 法による時間積分器
///
/// 状態ベクトルは生成後この積分器が専有し、`step` のたびに書き換える。
/// 1 回の `step` は固定の dt で 1 ステップだけ進め、dt の調整は行わない。
/// 誤差推定値 `error` を見て刻み幅を変えるのは呼び出し側の責務。
#[derive(Debug)]
pub struct AdaptiveIntegrator<F> {
    derivative: F,
    variant: TableauVariant,
    state: DVector<f64>,
    error: f64,
    iteration: usize,
    elapsed_time: f64,
    // 列 i が段 i の微分値（状態長 × 段数）
    stages: DMatrix<f64>,
    stage_input: DVector<f64>,
}

impl<F: Derivative> AdaptiveIntegrator<F> {
    /// 積分器を生成する
    ///
    /// # 引数
    /// - `derivative`: 微分関数
    /// - `initial_state`: 初期状態（以後この積分器が所有する）
    /// - `variant`: 使用するブッチャー表
    pub fn new(derivative: F, initial_state: DVector<f64>, variant: TableauVariant) -> Self {
        let len = initial_state.len();
        Self {
            derivative,
            variant,
            state: initial_state,
            error: INITIAL_ERROR,
            iteration: 0,
            elapsed_time: 0.0,
            stages: DMatrix::zeros(len, variant.stages()),
            stage_input: DVector::zeros(len),
        }
    }

    /// 時間刻み dt で 1 ステップ進める
    ///
    /// # 引数
    /// - `dt`: 時間刻み
    /// - `measure_error`: 局所誤差を推定するかどうか
    ///
    /// # 戻り値
    /// - 失敗した場合、状態・カウンタ・経過時間は変更されない
    pub fn step(&mut self, dt: f64, measure_error: bool) -> Result<(), MathError> {
        if !dt.is_finite() {
            return Err(MathError::InvalidConfiguration(format!(
                "時間刻みが有限値ではありません: {dt}"
            )));
        }

        let tableau = self.variant.scaled(dt);
        let len = self.state.len();

        let k0 = self.derivative.evaluate(&self.state)?;
        check_len(len, k0.len())?;
        self.stages.set_column(0, &k0);

        for i in 1..self.variant.stages() {
            self.stage_input.copy_from(&self.state);
            for j in 0..i {
                let coefficient = tableau.a[(i - 1, j)];
                if coefficient != 0.0 {
                    self.stage_input.axpy(coefficient, &self.stages.column(j), 1.0);
                }
            }
            let k = self.derivative.evaluate(&self.stage_input)?;
            check_len(len, k.len())?;
            self.stages.set_column(i, &k);
        }

        let next = &self.state + &self.stages * &tableau.b_high;
        if next.iter().any(|v| !v.is_finite()) {
            return Err(MathError::NumericalInstability(format!(
                "ステップ {} で状態が非有限値になりました",
                self.iteration + 1
            )));
        }

        let error = if measure_error {
            let estimate = (&self.stages * &tableau.b_error).amax();
            if !estimate.is_finite() {
                return Err(MathError::NumericalInstability(format!(
                    "ステップ {} で誤差推定値が非有限値になりました",
                    self.iteration + 1
                )));
            }
            estimate
        } else {
            self.error
        };

        self.state = next;
        self.error = error;
        self.iteration += 1;
        self.elapsed_time += dt;
        Ok(())
    }

    /// 現在の状態の写しを取る
    pub fn snapshot(&self) -> IntegratorSnapshot {
        IntegratorSnapshot {
            state: self.state.clone(),
            error: self.error,
            iteration: self.iteration,
            elapsed_time: self.elapsed_time,
        }
    }

    /// 写しから状態を戻す
    pub fn restore(&mut self, snapshot: IntegratorSnapshot) -> Result<(), MathError> {
        check_len(self.state.len(), snapshot.state.len())?;
        self.state = snapshot.state;
        self.error = snapshot.error;
        self.iteration = snapshot.iteration;
        self.elapsed_time = snapshot.elapsed_time;
        Ok(())
    }

    pub fn state(&self) -> &DVector<f64> {
        &self.state
    }

    pub fn error(&self) -> f64 {
        self.error
    }

    pub fn iteration_count(&self) -> usize {
        self.iteration
    }

    pub fn elapsed_time(&self) -> f64 {
        self.elapsed_time
    }

    pub fn variant(&self) -> TableauVariant {
        self.variant
    }

    pub fn derivative(&self) -> &F {
        &self.derivative
    }
}
