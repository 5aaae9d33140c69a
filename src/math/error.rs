// src/math/error.rs

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("設定値が不正です: {0}")]
    InvalidConfiguration(String),

    #[error("ベクトル長が一致しません（期待値 {expected}, 実際 {actual}）")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("数値的に不安定です: {0}")]
    NumericalInstability(String),

    #[error("データが不足しています（窓幅 {window}, 要素数 {len}）")]
    InsufficientData { window: usize, len: usize },
}

/// 長さ検査の共通処理
pub fn check_len(expected: usize, actual: usize) -> Result<(), MathError> {
    if expected == actual {
        Ok(())
    } else {
        Err(MathError::DimensionMismatch { expected, actual })
    }
}
