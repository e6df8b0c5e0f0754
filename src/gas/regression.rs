use crate::gas::error::CorrelationError;
use crate::gas::reading::ConsumptionInterval;
use serde::{Deserialize, Serialize};

/// Least-squares line `energy = slope * temperature + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination, `1 - SSR / SST`.
    pub r_squared: f64,
    pub samples: usize,
}

impl LinearFit {
    /// Fits `(x, y)` points by solving the normal equations.
    pub fn fit(points: &[(f64, f64)]) -> Result<Self, CorrelationError> {
        let n = points.len();
        if n < 2 {
            return Err(CorrelationError::TooFewIntervals { found: n });
        }
        let (mut sx, mut sy, mut sxx, mut sxy) = (0.0, 0.0, 0.0, 0.0);
        for &(x, y) in points {
            sx += x;
            sy += y;
            sxx += x * x;
            sxy += x * y;
        }
        let count = n as f64;
        let determinant = sxx * count - sx * sx;
        if determinant.abs() <= f64::EPSILON * sxx.abs().max(1.0) {
            return Err(CorrelationError::DegenerateFit);
        }
        let slope = (sxy * count - sx * sy) / determinant;
        let intercept = (sxx * sy - sx * sxy) / determinant;

        let y_mean = sy / count;
        let (mut ssr, mut sst) = (0.0, 0.0);
        for &(x, y) in points {
            ssr += (y - (slope * x + intercept)).powi(2);
            sst += (y - y_mean).powi(2);
        }
        // Constant y is fitted exactly by a flat line.
        let r_squared = if sst == 0.0 { 1.0 } else { 1.0 - ssr / sst };

        Ok(Self {
            slope,
            intercept,
            r_squared,
            samples: n,
        })
    }

    /// Fits daily heating energy against mean outdoor temperature.
    pub fn from_intervals(intervals: &[ConsumptionInterval]) -> Result<Self, CorrelationError> {
        let points: Vec<(f64, f64)> = intervals
            .iter()
            .map(|i| (i.mean_temperature, i.energy_kwh_per_day))
            .collect();
        Self::fit(&points)
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovers_an_exact_line() -> Result<(), CorrelationError> {
        let points: Vec<_> = (-5..=15).map(|t| (t as f64, 60.0 - 3.0 * t as f64)).collect();
        let fit = LinearFit::fit(&points)?;
        assert!((fit.slope + 3.0).abs() < 1e-9);
        assert!((fit.intercept - 60.0).abs() < 1e-9);
        assert!((fit.r_squared - 1.0).abs() < 1e-12);
        assert!((fit.predict(20.0)).abs() < 1e-9);
        assert_eq!(fit.samples, 21);
        Ok(())
    }

    #[test]
    fn noisy_points_have_r_squared_below_one() -> Result<(), CorrelationError> {
        let points = [(0.0, 1.0), (1.0, 0.0), (2.0, 3.0), (3.0, 2.0)];
        let fit = LinearFit::fit(&points)?;
        assert!((fit.slope - 0.6).abs() < 1e-12);
        assert!((fit.intercept - 0.6).abs() < 1e-12);
        assert!(fit.r_squared > 0.0 && fit.r_squared < 1.0);
        Ok(())
    }

    #[test]
    fn rejects_too_few_or_degenerate_points() {
        assert_eq!(
            LinearFit::fit(&[(1.0, 2.0)]),
            Err(CorrelationError::TooFewIntervals { found: 1 })
        );
        assert_eq!(
            LinearFit::fit(&[(4.0, 2.0), (4.0, 5.0), (4.0, 1.0)]),
            Err(CorrelationError::DegenerateFit)
        );
    }
}
