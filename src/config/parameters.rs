// src/config/parameters.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::math::{MathError, TableauVariant};

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ChainParameters {
    pub links: usize, // リンク（質点）数
    pub offset: f64,  // 初期形状の水平距離 a
    pub bias: f64,    // 初期形状の鉛直オフセット b
}

impl Default for ChainParameters {
    fn default() -> Self {
        Self {
            links: 10,
            offset: 1.0,
            bias: 0.5,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct IntegratorParameters {
    pub variant: TableauVariant,  // ブッチャー表
    pub dt: f64,                  // 時間刻み
    pub total_time: f64,          // 総シミュレーション時間
    pub sample_every: usize,      // 何ステップごとに観測量を記録するか
    pub measure_error: bool,      // 局所誤差を推定するか
    pub tolerance: Option<f64>,   // 指定時のみ刻み幅を制御する
    pub min_dt: f64,              // 刻み幅制御の下限
}

impl Default for IntegratorParameters {
    fn default() -> Self {
        Self {
            variant: TableauVariant::Fehlberg45,
            dt: 0.01,
            total_time: 100.0,
            sample_every: 100,
            measure_error: true,
            tolerance: None,
            min_dt: 1e-6,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct OutputParameters {
    pub enabled: bool,  // CSV 出力の有無
    pub path: PathBuf,  // 出力先
}

impl Default for OutputParameters {
    fn default() -> Self {
        Self {
            enabled: false,
            path: PathBuf::from("output/chain_samples.csv"),
        }
    }
}

impl ChainParameters {
    pub fn validate(&self) -> Result<(), MathError> {
        if self.links < 1 {
            return invalid(format!("links は 1 以上が必要です: {}", self.links));
        }
        if !self.offset.is_finite() || !self.bias.is_finite() {
            return invalid("offset と bias は有限値が必要です".to_string());
        }
        Ok(())
    }
}

impl IntegratorParameters {
    pub fn validate(&self) -> Result<(), MathError> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return invalid(format!("dt は正の有限値が必要です: {}", self.dt));
        }
        if !(self.total_time.is_finite() && self.total_time >= 0.0) {
            return invalid(format!(
                "total_time は 0 以上の有限値が必要です: {}",
                self.total_time
            ));
        }
        if self.sample_every < 1 {
            return invalid("sample_every は 1 以上が必要です".to_string());
        }
        if let Some(tolerance) = self.tolerance {
            if !(tolerance.is_finite() && tolerance > 0.0) {
                return invalid(format!("tolerance は正の有限値が必要です: {tolerance}"));
            }
            if !(self.min_dt > 0.0 && self.min_dt <= self.dt) {
                return invalid(format!(
                    "min_dt は 0 < min_dt <= dt を満たす必要があります: {}",
                    self.min_dt
                ));
            }
        }
        Ok(())
    }
}

fn invalid(message: String) -> Result<(), MathError> {
    Err(MathError::InvalidConfiguration(message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_follow_reference_run() {
        let params = IntegratorParameters::default();
        assert_eq!(params.dt, 0.01);
        assert_eq!(params.total_time, 100.0);
        assert_eq!(params.sample_every, 100);
        assert!(params.tolerance.is_none());
        assert!(params.validate().is_ok());
        assert!(ChainParameters::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_chain_parameters() {
        let params = ChainParameters {
            links: 0,
            ..ChainParameters::default()
        };
        assert!(matches!(
            params.validate(),
            Err(MathError::InvalidConfiguration(_))
        ));

        let params = ChainParameters {
            offset: f64::NAN,
            ..ChainParameters::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_invalid_integrator_parameters() {
        let base = IntegratorParameters::default();
        assert!(IntegratorParameters { dt: 0.0, ..base.clone() }.validate().is_err());
        assert!(IntegratorParameters { total_time: -1.0, ..base.clone() }.validate().is_err());
        assert!(IntegratorParameters { sample_every: 0, ..base.clone() }.validate().is_err());
        assert!(IntegratorParameters {
            tolerance: Some(-1e-6),
            ..base.clone()
        }
        .validate()
        .is_err());
        assert!(IntegratorParameters {
            tolerance: Some(1e-8),
            min_dt: 1.0,
            ..base.clone()
        }
        .validate()
        .is_err());
        assert!(IntegratorParameters { tolerance: Some(1e-8), ..base }.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let params: IntegratorParameters =
            serde_yaml::from_str("dt: 0.005\nvariant: dormand_prince54\n").unwrap();
        assert_eq!(params.dt, 0.005);
        assert_eq!(params.variant, TableauVariant::DormandPrince54);
        assert_eq!(params.sample_every, 100);
    }
}
