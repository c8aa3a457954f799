//! Goodness of fit for a Crow-AMSAA model
//!
//! Chi-square limits come from `statrs`; Cramer-von Mises critical values are
//! interpolated from the MIL-HDBK-189 table.

use serde::{Deserialize, Serialize};

use super::crow_amsaa::GrowthFit;
use crate::stats::chi_square_quantile;

/// Significance levels of the table columns
const CVM_SIGNIFICANCE: [f64; 5] = [0.20, 0.15, 0.10, 0.05, 0.01];

/// `(degrees of freedom, critical values by significance)`
const CVM_TABLE: [(f64, [f64; 5]); 22] = [
    (2.0, [0.138, 0.149, 0.162, 0.175, 0.186]),
    (3.0, [0.121, 0.135, 0.154, 0.184, 0.23]),
    (4.0, [0.121, 0.134, 0.155, 0.191, 0.28]),
    (5.0, [0.121, 0.137, 0.160, 0.199, 0.30]),
    (6.0, [0.123, 0.139, 0.162, 0.204, 0.31]),
    (7.0, [0.124, 0.140, 0.165, 0.208, 0.32]),
    (8.0, [0.124, 0.141, 0.165, 0.210, 0.32]),
    (9.0, [0.125, 0.142, 0.167, 0.212, 0.32]),
    (10.0, [0.125, 0.142, 0.167, 0.212, 0.32]),
    (11.0, [0.126, 0.143, 0.169, 0.214, 0.32]),
    (12.0, [0.126, 0.144, 0.169, 0.214, 0.32]),
    (13.0, [0.126, 0.144, 0.169, 0.214, 0.33]),
    (14.0, [0.126, 0.144, 0.169, 0.214, 0.33]),
    (15.0, [0.126, 0.144, 0.169, 0.215, 0.33]),
    (16.0, [0.127, 0.145, 0.171, 0.216, 0.33]),
    (17.0, [0.127, 0.145, 0.171, 0.217, 0.33]),
    (18.0, [0.127, 0.146, 0.171, 0.217, 0.33]),
    (19.0, [0.127, 0.146, 0.171, 0.217, 0.33]),
    (20.0, [0.128, 0.146, 0.172, 0.217, 0.33]),
    (30.0, [0.128, 0.146, 0.172, 0.218, 0.33]),
    (60.0, [0.128, 0.147, 0.173, 0.220, 0.33]),
    (100.0, [0.129, 0.147, 0.173, 0.220, 0.34]),
];

#[inline]
fn lerp(x: f64, x0: f64, x1: f64, y0: f64, y1: f64) -> f64 {
    if x1 == x0 {
        y0
    } else {
        y0 + (y1 - y0) * (x - x0) / (x1 - x0)
    }
}

fn row_at(df: f64) -> [f64; 5] {
    let df = df.clamp(CVM_TABLE[0].0, CVM_TABLE[CVM_TABLE.len() - 1].0);
    let upper = CVM_TABLE
        .iter()
        .position(|(d, _)| *d >= df)
        .unwrap_or(CVM_TABLE.len() - 1);
    if upper == 0 {
        return CVM_TABLE[0].1;
    }
    let (d0, r0) = CVM_TABLE[upper - 1];
    let (d1, r1) = CVM_TABLE[upper];
    std::array::from_fn(|k| lerp(df, d0, d1, r0[k], r1[k]))
}

/// Cramer-von Mises critical value for `df` failures at `significance`
///
/// Interpolates linearly in the degrees of freedom, then in the significance
/// level. Both are clamped to the table (df 2 to 100, significance 0.01 to 0.20).
pub fn cramer_von_mises_critical_value(df: usize, significance: f64) -> f64 {
    let row = row_at(df as f64);
    let alpha = significance.clamp(0.01, 0.20);
    // columns run from 0.20 down to 0.01
    let upper = CVM_SIGNIFICANCE
        .iter()
        .position(|a| *a <= alpha)
        .unwrap_or(CVM_SIGNIFICANCE.len() - 1);
    if upper == 0 {
        return row[0];
    }
    lerp(
        alpha,
        CVM_SIGNIFICANCE[upper - 1],
        CVM_SIGNIFICANCE[upper],
        row[upper - 1],
        row[upper],
    )
}

/// Chi-square test of the power-law model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChiSquareTest {
    pub statistic: f64,
    pub degrees_of_freedom: f64,
    /// Lower critical value, `0` for the one-sided grouped test
    pub lower_critical: f64,
    pub upper_critical: f64,
    pub reject: bool,
}

/// Cramer-von Mises test of the power-law model on individual failure times
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CramerVonMisesTest {
    pub statistic: f64,
    pub critical_value: f64,
    pub reject: bool,
}

/// Model tests at significance `1 − confidence`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GrowthGoodnessOfFit {
    pub significance: f64,
    pub chi_square: ChiSquareTest,
    /// `None` for grouped data or fewer than two failures
    pub cramer_von_mises: Option<CramerVonMisesTest>,
}

impl GrowthFit {
    /// Tests on the final row
    ///
    /// Individual data use a two-sided chi-square on `2N/β` with `2N` degrees of
    /// freedom when time-truncated and `2(N − 1)` when failure-truncated. Grouped
    /// data reject when `Σ(f − θ)²/θ` exceeds the upper quantile with one fewer
    /// degree of freedom than groups.
    pub fn goodness_of_fit(&self) -> Option<GrowthGoodnessOfFit> {
        let last = self.final_row()?;
        let significance = 1.0 - self.confidence;
        let n = last.n_failures as f64;

        let chi_square = if self.grouped {
            let df = self.rows.len() as f64 - 1.0;
            let upper_critical = chi_square_quantile(1.0 - significance, df);
            ChiSquareTest {
                statistic: last.chi_square,
                degrees_of_freedom: df,
                lower_critical: 0.0,
                upper_critical,
                reject: last.chi_square > upper_critical,
            }
        } else {
            let df = if self.termination.is_time_truncated() {
                2.0 * n
            } else {
                2.0 * (n - 1.0)
            };
            let lower_critical = chi_square_quantile(0.5 * significance, df);
            let upper_critical = chi_square_quantile(1.0 - 0.5 * significance, df);
            ChiSquareTest {
                statistic: last.chi_square,
                degrees_of_freedom: df,
                lower_critical,
                upper_critical,
                reject: last.chi_square < lower_critical || last.chi_square > upper_critical,
            }
        };

        let cramer_von_mises = (!self.grouped && last.cramer_von_mises.is_finite()).then(|| {
            let m = if self.termination.is_time_truncated() {
                last.n_failures
            } else {
                last.n_failures.saturating_sub(1)
            };
            let critical_value = cramer_von_mises_critical_value(m as usize, significance);
            CramerVonMisesTest {
                statistic: last.cramer_von_mises,
                critical_value,
                reject: last.cramer_von_mises > critical_value,
            }
        });

        Some(GrowthGoodnessOfFit {
            significance,
            chi_square,
            cramer_von_mises,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::growth::{crow_amsaa, GrowthOptions, GrowthSeries};
    use approx::assert_relative_eq;

    #[test]
    fn table_values_are_returned_at_grid_points() {
        assert_relative_eq!(cramer_von_mises_critical_value(10, 0.05), 0.212, epsilon = 1e-12);
        assert_relative_eq!(cramer_von_mises_critical_value(2, 0.20), 0.138, epsilon = 1e-12);
        assert_relative_eq!(cramer_von_mises_critical_value(100, 0.01), 0.34, epsilon = 1e-12);
    }

    #[test]
    fn interpolates_between_rows_and_columns() {
        // df 25 sits halfway between 20 and 30
        assert_relative_eq!(cramer_von_mises_critical_value(25, 0.05), 0.2175, epsilon = 1e-12);
        // significance 0.075 sits halfway between 0.10 and 0.05
        assert_relative_eq!(cramer_von_mises_critical_value(10, 0.075), 0.1895, epsilon = 1e-12);
    }

    #[test]
    fn out_of_range_inputs_clamp() {
        assert_relative_eq!(cramer_von_mises_critical_value(1, 0.5), 0.138, epsilon = 1e-12);
        assert_relative_eq!(cramer_von_mises_critical_value(500, 0.001), 0.34, epsilon = 1e-12);
    }

    #[test]
    fn individual_fit_has_two_sided_chi_square() {
        let series = GrowthSeries::from_failure_times(vec![
            2.6, 16.5, 17.0, 21.4, 29.1, 33.3, 56.5, 63.1, 70.6, 73.0, 77.7, 93.9, 95.5,
        ])
        .unwrap();
        let fit = crow_amsaa(&series, &GrowthOptions::default().with_confidence(0.9)).unwrap();
        let gof = fit.goodness_of_fit().unwrap();
        assert_relative_eq!(gof.significance, 0.1, epsilon = 1e-12);
        let chi = gof.chi_square;
        assert!(chi.lower_critical > 0.0 && chi.lower_critical < chi.upper_critical);
        assert!(gof.cramer_von_mises.is_some());
    }

    #[test]
    fn grouped_fit_has_no_cramer_von_mises() {
        let series = GrowthSeries::new(vec![50.0, 100.0, 150.0, 200.0], vec![8, 6, 5, 4]).unwrap();
        let fit = crow_amsaa(&series, &GrowthOptions::grouped_data()).unwrap();
        let gof = fit.goodness_of_fit().unwrap();
        assert_eq!(gof.chi_square.degrees_of_freedom, 3.0);
        assert_eq!(gof.chi_square.lower_critical, 0.0);
        assert!(gof.cramer_von_mises.is_none());
    }
}
