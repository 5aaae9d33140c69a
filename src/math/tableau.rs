// src/math/tableau.rs

use nalgebra::{DMatrix, DVector};
use serde::Deserialize;

/// 埋め込み型 Runge-Kutta 法のブッチャー表の種類
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableauVariant {
    /// Runge-Kutta-Fehlberg 4(5)（6段）
    #[default]
    Fehlberg45,
    /// Dormand-Prince 5(4)（7段）
    DormandPrince54,
}

/// 時間刻み dt を掛け込んだブッチャー表
///
/// - `a`: (段数-1)×(段数-1) の下三角行列。行 i-1 が段 i の結合係数
/// - `b_high`: 状態更新に使う高次の重み
/// - `b_error`: 低次の重みと高次の重みの差（誤差推定用）
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledTableau {
    pub a: DMatrix<f64>,
    pub b_high: DVector<f64>,
    pub b_error: DVector<f64>,
}

const FEHLBERG_A: &[&[f64]] = &[
    &[1.0 / 4.0],
    &[3.0 / 32.0, 9.0 / 32.0],
    &[1932.0 / 2197.0, -7200.0 / 2197.0, 7296.0 / 2197.0],
    &[439.0 / 216.0, -8.0, 3680.0 / 513.0, -845.0 / 4104.0],
    &[-8.0 / 27.0, 2.0, -3544.0 / 2565.0, 1859.0 / 4104.0, -11.0 / 40.0],
];
const FEHLBERG_B5: &[f64] = &[
    16.0 / 135.0,
    0.0,
    6656.0 / 12825.0,
    28561.0 / 56430.0,
    -9.0 / 50.0,
    2.0 / 55.0,
];
const FEHLBERG_B4: &[f64] = &[
    25.0 / 216.0,
    0.0,
    1408.0 / 2565.0,
    2197.0 / 4104.0,
    -1.0 / 5.0,
    0.0,
];

const DORMAND_PRINCE_A: &[&[f64]] = &[
    &[1.0 / 5.0],
    &[3.0 / 40.0, 9.0 / 40.0],
    &[44.0 / 45.0, -56.0 / 15.0, 32.0 / 9.0],
    &[19372.0 / 6561.0, -25360.0 / 2187.0, 64448.0 / 6561.0, -212.0 / 729.0],
    &[
        9017.0 / 3168.0,
        -355.0 / 33.0,
        46732.0 / 5247.0,
        49.0 / 176.0,
        -5103.0 / 18656.0,
    ],
    &[
        35.0 / 384.0,
        0.0,
        500.0 / 1113.0,
        125.0 / 192.0,
        -2187.0 / 6784.0,
        11.0 / 84.0,
    ],
];
const DORMAND_PRINCE_B5: &[f64] = &[
    35.0 / 384.0,
    0.0,
    500.0 / 1113.0,
    125.0 / 192.0,
    -2187.0 / 6784.0,
    11.0 / 84.0,
    0.0,
];
const DORMAND_PRINCE_B4: &[f64] = &[
    5179.0 / 57600.0,
    0.0,
    7571.0 / 16695.0,
    393.0 / 640.0,
    -92097.0 / 339200.0,
    187.0 / 2100.0,
    1.0 / 40.0,
];

impl TableauVariant {
    /// 段数
    pub fn stages(self) -> usize {
        match self {
            TableauVariant::Fehlberg45 => FEHLBERG_B5.len(),
            TableauVariant::DormandPrince54 => DORMAND_PRINCE_B5.len(),
        }
    }

    /// （状態更新に使う次数, 誤差推定に使う次数）
    pub fn order_pair(self) -> (u8, u8) {
        (5, 4)
    }

    fn raw(self) -> (&'static [&'static [f64]], &'static [f64], &'static [f64]) {
        match self {
            TableauVariant::Fehlberg45 => (FEHLBERG_A, FEHLBERG_B5, FEHLBERG_B4),
            TableauVariant::DormandPrince54 => {
                (DORMAND_PRINCE_A, DORMAND_PRINCE_B5, DORMAND_PRINCE_B4)
            }
        }
    }

    /// 時間刻み dt で重み付けしたブッチャー表を返す純粋関数
    ///
    /// # 引数
    /// - `dt`: 時間刻み
    ///
    /// # 戻り値
    /// - a, b_high, b_low - b_high をすべて dt 倍した表
    pub fn scaled(self, dt: f64) -> ScaledTableau {
        let (a_rows, b_high, b_low) = self.raw();
        let s = self.stages();

        let mut a = DMatrix::zeros(s - 1, s - 1);
        for (i, row) in a_rows.iter().enumerate() {
            for (j, &value) in row.iter().enumerate() {
                a[(i, j)] = value * dt;
            }
        }

        let b_error = DVector::from_iterator(
            s,
            b_low.iter().zip(b_high.iter()).map(|(low, high)| (low - high) * dt),
        );
        let b_high = DVector::from_iterator(s, b_high.iter().map(|b| b * dt));

        ScaledTableau { a, b_high, b_error }
    }
}
