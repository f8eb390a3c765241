//! Exact-pass-through quadratic B-spline interpolation.
//!
//! The knot vector places one interior knot at each midpoint between
//! consecutive samples, omitting the first and last midpoints, with both ends
//! clamped. That leaves exactly one coefficient per sample, so the collocation
//! system is square and the curve hits every sample.

use crate::error::{ReportError, Result};

const DEGREE: usize = 2;

/// A degree-2 B-spline through a fixed set of samples.
#[derive(Debug, Clone)]
pub struct QuadraticSpline {
    knots: Vec<f64>,
    coefficients: Vec<f64>,
}

impl QuadraticSpline {
    /// Build the spline passing through every `(xs[i], ys[i])`.
    ///
    /// `xs` must be strictly increasing and hold at least three samples.
    pub fn interpolate(xs: &[f64], ys: &[f64]) -> Result<Self> {
        if xs.len() != ys.len() {
            return Err(ReportError::Interpolation(format!(
                "{} x values but {} y values",
                xs.len(),
                ys.len()
            )));
        }
        let n = xs.len();
        if n < DEGREE + 1 {
            return Err(ReportError::Interpolation(format!(
                "need at least {} samples, got {n}",
                DEGREE + 1
            )));
        }
        if xs.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ReportError::Interpolation(
                "x values must be strictly increasing".to_string(),
            ));
        }

        let knots = build_knots(xs);

        let mut matrix = vec![vec![0.0; n]; n];
        for (row, &x) in matrix.iter_mut().zip(xs) {
            let span = find_span(&knots, n, x);
            for (r, b) in basis_funs(&knots, span, x).iter().enumerate() {
                row[span - DEGREE + r] = *b;
            }
        }

        let coefficients = solve(matrix, ys.to_vec())?;
        Ok(Self {
            knots,
            coefficients,
        })
    }

    /// Evaluate the spline at `x`. Values outside the sample range are
    /// extrapolated from the boundary pieces.
    pub fn evaluate(&self, x: f64) -> f64 {
        let n = self.coefficients.len();
        let span = find_span(&self.knots, n, x);
        basis_funs(&self.knots, span, x)
            .iter()
            .enumerate()
            .map(|(r, b)| b * self.coefficients[span - DEGREE + r])
            .sum()
    }
}

fn build_knots(xs: &[f64]) -> Vec<f64> {
    let first = xs[0];
    let last = xs[xs.len() - 1];
    let midpoints: Vec<f64> = xs.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect();

    let mut knots = Vec::with_capacity(xs.len() + DEGREE + 1);
    knots.extend(std::iter::repeat(first).take(DEGREE + 1));
    knots.extend_from_slice(&midpoints[1..midpoints.len() - 1]);
    knots.extend(std::iter::repeat(last).take(DEGREE + 1));
    knots
}

/// Index `l` of the knot interval `[t_l, t_{l+1})` containing `x`, clamped to
/// the valid range `[DEGREE, n - 1]`.
fn find_span(knots: &[f64], n: usize, x: f64) -> usize {
    (DEGREE..n)
        .rev()
        .find(|&l| knots[l] <= x)
        .unwrap_or(DEGREE)
}

/// The `DEGREE + 1` basis functions that are non-zero on `span`, evaluated
/// at `x` (Cox–de Boor recursion).
fn basis_funs(knots: &[f64], span: usize, x: f64) -> [f64; DEGREE + 1] {
    let mut values = [0.0; DEGREE + 1];
    let mut left = [0.0; DEGREE + 1];
    let mut right = [0.0; DEGREE + 1];
    values[0] = 1.0;

    for j in 1..=DEGREE {
        left[j] = x - knots[span + 1 - j];
        right[j] = knots[span + j] - x;
        let mut saved = 0.0;
        for r in 0..j {
            let temp = values[r] / (right[r + 1] + left[j - r]);
            values[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        values[j] = saved;
    }
    values
}

/// Solve `matrix * x = rhs` by Gaussian elimination with partial pivoting.
fn solve(mut matrix: Vec<Vec<f64>>, mut rhs: Vec<f64>) -> Result<Vec<f64>> {
    let n = rhs.len();

    for col in 0..n {
        let pivot = (col..n)
            .max_by(|&a, &b| matrix[a][col].abs().total_cmp(&matrix[b][col].abs()))
            .unwrap_or(col);
        if matrix[pivot][col].abs() < f64::EPSILON {
            return Err(ReportError::Interpolation(
                "collocation matrix is singular".to_string(),
            ));
        }
        matrix.swap(col, pivot);
        rhs.swap(col, pivot);

        for row in col + 1..n {
            let factor = matrix[row][col] / matrix[col][col];
            if factor == 0.0 {
                continue;
            }
            for k in col..n {
                matrix[row][k] -= factor * matrix[col][k];
            }
            rhs[row] -= factor * rhs[col];
        }
    }

    let mut solution = vec![0.0; n];
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| matrix[row][k] * solution[k]).sum();
        solution[row] = (rhs[row] - tail) / matrix[row][row];
    }
    Ok(solution)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passes_through_every_sample() {
        let xs = [0.0, 1.0, 2.5, 4.0, 4.5, 7.0, 10.0];
        let ys = [3.0, -1.0, 4.0, 1.0, 5.0, 9.0, 2.0];
        let spline = QuadraticSpline::interpolate(&xs, &ys).unwrap();
        for (x, y) in xs.iter().zip(ys.iter()) {
            assert!(
                (spline.evaluate(*x) - y).abs() < 1e-9,
                "spline({x}) = {} expected {y}",
                spline.evaluate(*x)
            );
        }
    }

    #[test]
    fn test_reproduces_quadratic_exactly() {
        let xs = [0.0, 1.0, 2.5, 4.0, 6.0];
        let ys: Vec<f64> = xs.iter().map(|x| x * x - 2.0 * x + 1.0).collect();
        let spline = QuadraticSpline::interpolate(&xs, &ys).unwrap();
        for x in [0.3, 1.7, 3.3, 5.9] {
            let expected = x * x - 2.0 * x + 1.0;
            assert!((spline.evaluate(x) - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_three_points_is_single_parabola() {
        // Through (0,0), (1,1), (2,4): y = x^2.
        let spline = QuadraticSpline::interpolate(&[0.0, 1.0, 2.0], &[0.0, 1.0, 4.0]).unwrap();
        assert!((spline.evaluate(1.5) - 2.25).abs() < 1e-12);
    }

    #[test]
    fn test_knot_layout() {
        let knots = build_knots(&[0.0, 2.0, 4.0, 6.0, 8.0]);
        // Midpoints 1,3,5,7 with the first and last dropped.
        assert_eq!(knots, vec![0.0, 0.0, 0.0, 3.0, 5.0, 8.0, 8.0, 8.0]);
    }

    #[test]
    fn test_rejects_too_few_points() {
        let err = QuadraticSpline::interpolate(&[0.0, 1.0], &[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, ReportError::Interpolation(_)));
    }

    #[test]
    fn test_rejects_duplicate_x() {
        let err = QuadraticSpline::interpolate(&[0.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).unwrap_err();
        assert!(matches!(err, ReportError::Interpolation(_)));
    }

    #[test]
    fn test_rejects_length_mismatch() {
        assert!(QuadraticSpline::interpolate(&[0.0, 1.0, 2.0], &[1.0, 2.0]).is_err());
    }
}
