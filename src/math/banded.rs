// src/math/banded.rs

use nalgebra::{DMatrix, DVector};

use crate::math::error::{check_len, MathError};

const SUPER: usize = 0;
const DIAG: usize = 1;
const SUB: usize = 2;

/// 三重対角行列の帯行列格納（3×n）
///
/// 行 0 が上側副対角（列 j に a[j-1, j]）、行 1 が主対角、
/// 行 2 が下側副対角（列 j に a[j+1, j]）。使わない隅の要素は 0 のまま。
#[derive(Debug, Clone, PartialEq)]
pub struct TridiagonalBands {
    bands: DMatrix<f64>,
    // 前進消去の作業領域
    sweep: DVector<f64>,
}

impl TridiagonalBands {
    /// 主対角を指定して生成する（副対角は 0）
    pub fn with_diagonal(diagonal: &[f64]) -> Result<Self, MathError> {
        let n = diagonal.len();
        if n == 0 {
            return Err(MathError::InvalidConfiguration(
                "帯行列の次数は 1 以上が必要です".to_string(),
            ));
        }
        let mut bands = DMatrix::zeros(3, n);
        for (j, &d) in diagonal.iter().enumerate() {
            bands[(DIAG, j)] = d;
        }
        Ok(Self {
            bands,
            sweep: DVector::zeros(n),
        })
    }

    pub fn order(&self) -> usize {
        self.bands.ncols()
    }

    pub fn diagonal(&self, i: usize) -> f64 {
        self.bands[(DIAG, i)]
    }

    /// a[i, i+1]
    pub fn upper(&self, i: usize) -> f64 {
        self.bands[(SUPER, i + 1)]
    }

    /// a[i+1, i]
    pub fn lower(&self, i: usize) -> f64 {
        self.bands[(SUB, i)]
    }

    /// 対称な結合係数 a[i, i+1] = a[i+1, i] = coupling[i] を設定する
    ///
    /// # 引数
    /// - `coupling`: 長さ n-1 の副対角要素
    pub fn set_symmetric_coupling(&mut self, coupling: &[f64]) -> Result<(), MathError> {
        let n = self.order();
        check_len(n - 1, coupling.len())?;
        for (i, &c) in coupling.iter().enumerate() {
            self.bands[(SUPER, i + 1)] = c;
            self.bands[(SUB, i)] = c;
        }
        Ok(())
    }

    /// 連立一次方程式 A x = rhs を O(n) で解き、rhs を解で上書きする
    ///
    /// ピボット選択なしの Thomas 法。ピボットが 0 または非有限値の場合は
    /// `NumericalInstability` を返し、その時点の rhs の内容は保証しない。
    pub fn solve_in_place(&mut self, rhs: &mut DVector<f64>) -> Result<(), MathError> {
        let n = self.order();
        check_len(n, rhs.len())?;

        let mut pivot = self.bands[(DIAG, 0)];
        check_pivot(pivot, 0)?;
        self.sweep[0] = if n > 1 { self.upper(0) / pivot } else { 0.0 };
        rhs[0] /= pivot;

        for i in 1..n {
            let lower = self.lower(i - 1);
            pivot = self.bands[(DIAG, i)] - lower * self.sweep[i - 1];
            check_pivot(pivot, i)?;
            self.sweep[i] = if i + 1 < n { self.upper(i) / pivot } else { 0.0 };
            rhs[i] = (rhs[i] - lower * rhs[i - 1]) / pivot;
        }

        for i in (0..n - 1).rev() {
            rhs[i] -= self.sweep[i] * rhs[i + 1];
        }
        Ok(())
    }
}

fn check_pivot(pivot: f64, row: usize) -> Result<(), MathError> {
    if pivot == 0.0 || !pivot.is_finite() {
        return Err(MathError::NumericalInstability(format!(
            "帯行列の {row} 行目のピボットが {pivot} です"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn dense(bands: &TridiagonalBands) -> DMatrix<f64> {
        let n = bands.order();
        let mut a = DMatrix::zeros(n, n);
        for i in 0..n {
            a[(i, i)] = bands.diagonal(i);
            if i + 1 < n {
                a[(i, i + 1)] = bands.upper(i);
                a[(i + 1, i)] = bands.lower(i);
            }
        }
        a
    }

    #[test]
    fn test_solve_single_element() {
        let mut bands = TridiagonalBands::with_diagonal(&[4.0]).unwrap();
        let mut rhs = DVector::from_vec(vec![2.0]);
        bands.solve_in_place(&mut rhs).unwrap();
        assert_relative_eq!(rhs[0], 0.5);
    }

    #[test]
    fn test_solve_matches_dense_product() {
        let mut bands = TridiagonalBands::with_diagonal(&[1.0, 2.0, 2.0, 2.0, 2.0]).unwrap();
        bands
            .set_symmetric_coupling(&[-0.3, -0.9, 0.4, -1.0])
            .unwrap();
        let b = DVector::from_vec(vec![1.0, -2.0, 0.5, 3.0, 0.25]);
        let mut x = b.clone();
        bands.solve_in_place(&mut x).unwrap();

        let residual = dense(&bands) * &x - &b;
        assert!(residual.amax() < 1e-12);
    }

    #[test]
    fn test_straight_chain_stencil_is_solvable() {
        // 全リンクが一直線のとき結合係数は -1
        let mut bands = TridiagonalBands::with_diagonal(&[1.0, 2.0, 2.0]).unwrap();
        bands.set_symmetric_coupling(&[-1.0, -1.0]).unwrap();
        let mut x = DVector::from_vec(vec![1.0, 0.0, 0.0]);
        bands.solve_in_place(&mut x).unwrap();
        // [1 -1 0; -1 2 -1; 0 -1 2] x = e0 の解は (3, 2, 1)
        assert_relative_eq!(x[0], 3.0, epsilon = 1e-12);
        assert_relative_eq!(x[1], 2.0, epsilon = 1e-12);
        assert_relative_eq!(x[2], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_singular_pivot() {
        let mut bands = TridiagonalBands::with_diagonal(&[1.0, 1.0]).unwrap();
        bands.set_symmetric_coupling(&[1.0]).unwrap();
        let mut rhs = DVector::from_vec(vec![1.0, 1.0]);
        let result = bands.solve_in_place(&mut rhs);
        assert!(matches!(result, Err(MathError::NumericalInstability(_))));
    }

    #[test]
    fn test_dimension_checks() {
        assert!(TridiagonalBands::with_diagonal(&[]).is_err());

        let mut bands = TridiagonalBands::with_diagonal(&[1.0, 2.0]).unwrap();
        assert_eq!(
            bands.set_symmetric_coupling(&[0.1, 0.2]),
            Err(MathError::DimensionMismatch { expected: 1, actual: 2 })
        );
        let mut rhs = DVector::from_vec(vec![1.0]);
        assert!(matches!(
            bands.solve_in_place(&mut rhs),
            Err(MathError::DimensionMismatch { .. })
        ));
    }
}
