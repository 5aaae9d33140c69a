// src/math/statistics.rs

use crate::math::error::MathError;

/// 末尾 `window` 個の要素の移動平均
///
/// # 引数
/// - `window`: 窓幅
/// - `values`: 時系列
///
/// # 戻り値
/// - 末尾 `window` 個の平均値
/// - 要素数が窓幅に満たない場合は `InsufficientData`
pub fn moving_average(window: usize, values: &[f64]) -> Result<f64, MathError> {
    if window == 0 {
        return Err(MathError::InvalidConfiguration(
            "移動平均の窓幅は 1 以上が必要です".to_string(),
        ));
    }
    if values.len() < window {
        return Err(MathError::InsufficientData {
            window,
            len: values.len(),
        });
    }
    let tail = &values[values.len() - window..];
    Ok(tail.iter().sum::<f64>() / window as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moving_average_trailing_window() {
        let result = moving_average(3, &[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(result, 4.0);
    }

    #[test]
    fn test_moving_average_full_window() {
        let result = moving_average(4, &[1.0, 2.0, 3.0, 6.0]).unwrap();
        assert_eq!(result, 3.0);
    }

    #[test]
    fn test_moving_average_insufficient_data() {
        let result = moving_average(10, &[1.0, 2.0, 3.0]);
        assert_eq!(result, Err(MathError::InsufficientData { window: 10, len: 3 }));
    }

    #[test]
    fn test_moving_average_zero_window() {
        assert!(matches!(
            moving_average(0, &[1.0]),
            Err(MathError::InvalidConfiguration(_))
        ));
    }
}
