//! Ordinary least squares via singular value decomposition
//!
//! The solver returns the minimum-norm solution, so collinear or constant
//! columns (for example a one-hot group that is always set) produce a
//! well-defined fit instead of a singular-matrix failure.

use crate::{MathError, Result};
use nalgebra::{DMatrix, DVector};

/// Row-major design matrix for a linear model
#[derive(Debug, Clone, PartialEq)]
pub struct DesignMatrix {
    rows: usize,
    columns: usize,
    values: Vec<f64>,
}

impl DesignMatrix {
    /// Build a design matrix from feature rows of equal width
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let columns = match rows.first() {
            Some(row) if !row.is_empty() => row.len(),
            _ => {
                return Err(MathError::InsufficientData(
                    "Design matrix needs at least one row and one column".to_string(),
                ))
            }
        };

        if let Some((index, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != columns) {
            return Err(MathError::InvalidInput(format!(
                "Row {} has {} columns, expected {}",
                index,
                row.len(),
                columns
            )));
        }

        let values: Vec<f64> = rows.iter().flatten().copied().collect();
        if values.iter().any(|v| !v.is_finite()) {
            return Err(MathError::InvalidInput(
                "Design matrix contains non-finite values".to_string(),
            ));
        }

        Ok(Self {
            rows: rows.len(),
            columns,
            values,
        })
    }

    /// Number of observations
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of features, including any intercept column
    pub fn columns(&self) -> usize {
        self.columns
    }

    fn to_matrix(&self) -> DMatrix<f64> {
        DMatrix::from_row_slice(self.rows, self.columns, &self.values)
    }
}

/// Coefficients of a least-squares fit plus its numerical rank
#[derive(Debug, Clone, PartialEq)]
pub struct LeastSquaresFit {
    coefficients: Vec<f64>,
    rank: usize,
}

impl LeastSquaresFit {
    /// Solve `design · β ≈ targets` in the least-squares sense.
    ///
    /// Singular values below `max(σ) · max(rows, columns) · ε` are treated as
    /// zero, which yields the pseudo-inverse (minimum-norm) solution.
    pub fn solve(design: &DesignMatrix, targets: &[f64]) -> Result<Self> {
        if targets.len() != design.rows() {
            return Err(MathError::InvalidInput(format!(
                "Target length ({}) doesn't match design rows ({})",
                targets.len(),
                design.rows()
            )));
        }
        if targets.iter().any(|v| !v.is_finite()) {
            return Err(MathError::InvalidInput(
                "Targets contain non-finite values".to_string(),
            ));
        }

        let svd = design.to_matrix().svd(true, true);
        let largest = svd.singular_values.max();
        let tolerance =
            largest * design.rows().max(design.columns()) as f64 * f64::EPSILON;

        let rank = svd.rank(tolerance);
        let b = DVector::from_column_slice(targets);
        let solution = svd
            .solve(&b, tolerance)
            .map_err(|e| MathError::CalculationError(e.to_string()))?;

        Ok(Self {
            coefficients: solution.iter().copied().collect(),
            rank,
        })
    }

    /// Fitted coefficients, one per design column
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Numerical rank of the design matrix
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// True when the design matrix had dependent columns
    pub fn is_rank_deficient(&self) -> bool {
        self.rank < self.coefficients.len()
    }

    /// Evaluate the fitted linear combination for one feature row
    pub fn predict(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.coefficients.len() {
            return Err(MathError::InvalidInput(format!(
                "Feature length ({}) doesn't match coefficient count ({})",
                features.len(),
                self.coefficients.len()
            )));
        }

        Ok(features
            .iter()
            .zip(&self.coefficients)
            .map(|(x, beta)| x * beta)
            .sum())
    }

    /// Coefficient of determination over the rows the model was fitted on
    pub fn r_squared(&self, design: &DesignMatrix, targets: &[f64]) -> Result<f64> {
        if targets.len() != design.rows() || targets.is_empty() {
            return Err(MathError::InvalidInput(
                "Targets must match the design rows and be non-empty".to_string(),
            ));
        }

        let y_mean = targets.iter().sum::<f64>() / targets.len() as f64;
        let mut ss_total = 0.0;
        let mut ss_residual = 0.0;

        for (row, &y) in design.values.chunks(design.columns).zip(targets) {
            let y_pred = self.predict(row)?;
            ss_total += (y - y_mean).powi(2);
            ss_residual += (y - y_pred).powi(2);
        }

        if ss_total.abs() < 1e-10 {
            return Err(MathError::CalculationError(
                "Cannot calculate R-squared: total sum of squares is too small".to_string(),
            ));
        }

        Ok(1.0 - (ss_residual / ss_total))
    }
}
