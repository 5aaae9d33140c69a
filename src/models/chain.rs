// src/models/chain.rs

use std::f64::consts::PI;

use nalgebra::DVector;

use crate::math::error::{check_len, MathError};
use crate::math::{Derivative, TridiagonalBands};

/// 一般化座標 [θ_0..θ_{n-1}, ω_0..ω_{n-1}]（長さ 2n）
pub type ChainState = DVector<f64>;

/// n 個の質点を剛体リンクでつないだ平面多重振り子
///
/// 質量・リンク長・重力加速度はすべて 1 に無次元化している。
/// θ_i はリンク i の鉛直下向きからの角度で、リンク 0 が支点側。
/// 微分計算のたびに作業領域を入力状態から完全に計算し直すので、
/// 直前の呼び出しと無関係な状態を渡してもよい。
#[derive(Debug, Clone)]
pub struct ChainModel {
    n: usize,
    // 隣接リンクの角度差 θ_{i+1} - θ_i と sin, -cos
    dif: DVector<f64>,
    sin: DVector<f64>,
    cos: DVector<f64>,
    tension: DVector<f64>,
    alpha: DVector<f64>,
    // 張力に対する 2 階差分作用素（主対角 {1, 2, ..., 2}）
    bands: TridiagonalBands,
}

impl ChainModel {
    /// n リンクの振り子を生成する
    ///
    /// # 引数
    /// - `n`: リンク（質点）の数。1 以上
    pub fn new(n: usize) -> Result<Self, MathError> {
        if n < 1 {
            return Err(MathError::InvalidConfiguration(format!(
                "リンク数は 1 以上が必要です: {n}"
            )));
        }

        let mut diagonal = vec![2.0; n];
        diagonal[0] = 1.0;

        Ok(Self {
            n,
            dif: DVector::zeros(n - 1),
            sin: DVector::zeros(n - 1),
            cos: DVector::zeros(n - 1),
            tension: DVector::zeros(n),
            alpha: DVector::zeros(n),
            bands: TridiagonalBands::with_diagonal(&diagonal)?,
        })
    }

    pub fn links(&self) -> usize {
        self.n
    }

    /// 直前の微分計算で求めたリンク張力
    pub fn tension(&self) -> &DVector<f64> {
        &self.tension
    }

    /// 直前の微分計算で求めた角加速度
    pub fn acceleration(&self) -> &DVector<f64> {
        &self.alpha
    }

    /// 状態ベクトルを (θ, ω) に分ける
    pub fn split_state<'a>(
        &self,
        state: &'a ChainState,
    ) -> Result<(&'a [f64], &'a [f64]), MathError> {
        check_len(2 * self.n, state.len())?;
        Ok(state.as_slice().split_at(self.n))
    }

    /// 状態の時間微分 [ω, α] を計算する
    ///
    /// 張力の三重対角系 L·T = ω² (+ cos θ_0) を解き、
    /// 張力から角加速度を求める。
    pub fn derivative(&mut self, state: &ChainState) -> Result<ChainState, MathError> {
        let n = self.n;
        let (theta, omega) = self.split_state(state)?;

        for i in 0..n - 1 {
            self.dif[i] = theta[i + 1] - theta[i];
            self.sin[i] = self.dif[i].sin();
            self.cos[i] = -self.dif[i].cos();
        }

        for (t, w) in self.tension.iter_mut().zip(omega) {
            *t = w * w;
        }
        self.tension[0] += theta[0].cos();

        self.bands.set_symmetric_coupling(self.cos.as_slice())?;
        self.bands.solve_in_place(&mut self.tension)?;
        if self.tension.iter().any(|t| !t.is_finite()) {
            return Err(MathError::NumericalInstability(
                "張力の解に非有限値が含まれています".to_string(),
            ));
        }

        for i in 0..n - 1 {
            self.alpha[i] = self.sin[i] * self.tension[i + 1];
        }
        self.alpha[n - 1] = 0.0;
        for i in 1..n {
            self.alpha[i] -= self.sin[i - 1] * self.tension[i - 1];
        }
        self.alpha[0] -= theta[0].sin();

        Ok(DVector::from_iterator(
            2 * n,
            omega.iter().chain(self.alpha.iter()).copied(),
        ))
    }

    /// 各質点の直交座標 (x, z)
    ///
    /// # 引数
    /// - `theta`: リンク角度
    /// - `include_origin`: 先頭に支点 (0, 0) を加えるかどうか
    ///
    /// # 戻り値
    /// - 長さ n（支点込みなら n+1）の x, z
    pub fn cartesian_coordinates(
        &self,
        theta: &[f64],
        include_origin: bool,
    ) -> Result<(DVector<f64>, DVector<f64>), MathError> {
        check_len(self.n, theta.len())?;
        let x = cumulative(theta.iter().map(|t| t.sin()), include_origin);
        let z = cumulative(theta.iter().map(|t| -t.cos()), include_origin);
        Ok((x, z))
    }

    /// 各質点の速度 (dx, dz)
    ///
    /// # 引数
    /// - `theta`: リンク角度
    /// - `omega`: リンク角速度
    /// - `include_origin`: 先頭に支点 (0, 0) を加えるかどうか
    pub fn velocities(
        &self,
        theta: &[f64],
        omega: &[f64],
        include_origin: bool,
    ) -> Result<(DVector<f64>, DVector<f64>), MathError> {
        check_len(self.n, theta.len())?;
        check_len(self.n, omega.len())?;
        let dx = cumulative(
            theta.iter().zip(omega).map(|(t, w)| w * t.cos()),
            include_origin,
        );
        let dz = cumulative(
            theta.iter().zip(omega).map(|(t, w)| w * t.sin()),
            include_origin,
        );
        Ok((dx, dz))
    }

    /// 質点ごとの力学的エネルギー（運動 + 位置）
    pub fn energy_per_mass(
        &self,
        theta: &[f64],
        omega: &[f64],
    ) -> Result<DVector<f64>, MathError> {
        let (_, z) = self.cartesian_coordinates(theta, false)?;
        let (dx, dz) = self.velocities(theta, omega, false)?;
        Ok(DVector::from_iterator(
            self.n,
            (0..self.n).map(|i| 0.5 * (dx[i] * dx[i] + dz[i] * dz[i]) + z[i]),
        ))
    }

    /// 系全体の力学的エネルギー
    pub fn total_energy(&self, theta: &[f64], omega: &[f64]) -> Result<f64, MathError> {
        Ok(self.energy_per_mass(theta, omega)?.sum())
    }

    /// 水平距離 a, 鉛直オフセット b で吊るした静止状態を作る
    ///
    /// θ_i = π - atan2(a, -b + i/(n-1))、ω = 0。
    pub fn initial_hanging_state(&self, a: f64, b: f64) -> ChainState {
        let n = self.n;
        let mut state = DVector::zeros(2 * n);
        for i in 0..n {
            let fraction = if n > 1 {
                i as f64 / (n - 1) as f64
            } else {
                0.0
            };
            state[i] = PI - a.atan2(-b + fraction);
        }
        state
    }
}

impl Derivative for ChainModel {
    fn evaluate(&mut self, state: &DVector<f64>) -> Result<DVector<f64>, MathError> {
        self.derivative(state)
    }
}

fn cumulative<I: Iterator<Item = f64>>(terms: I, include_origin: bool) -> DVector<f64> {
    let mut values = Vec::new();
    if include_origin {
        values.push(0.0);
    }
    let mut sum = 0.0;
    for term in terms {
        sum += term;
        values.push(sum);
    }
    DVector::from_vec(values)
}
