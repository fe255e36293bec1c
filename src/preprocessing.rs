//! Feature-building utilities shared by the reader and the scorer.
//!
//! Provides `PlanEncoder`, a one-hot encoder whose categorical level set is
//! fixed when fitted so the indicator column schema cannot drift between
//! fitting and scoring, a per-column `Scaler` for mean/std standardization,
//! and the design-matrix assembly helper.

use anyhow::Result;
use ndarray::{concatenate, Array1, Array2, Axis};

/// One-hot encoder for the data-plan-size column.
///
/// Levels are recorded in first-observed order at fit time. `transform`
/// emits one indicator column per recorded level, exactly one 1 per row,
/// and refuses tokens outside the recorded set.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanEncoder {
    levels: Vec<String>,
}

impl PlanEncoder {
    /// Record the distinct levels of `tokens` in first-observed order.
    pub fn fit(tokens: &[String]) -> PlanEncoder {
        let mut levels: Vec<String> = Vec::new();
        for token in tokens {
            if !levels.iter().any(|l| l == token) {
                levels.push(token.clone());
            }
        }
        PlanEncoder { levels }
    }

    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    /// Indicator column names, e.g. `data_plan_size=2G`.
    pub fn feature_names(&self, column: &str) -> Vec<String> {
        self.levels
            .iter()
            .map(|level| format!("{}={}", column, level))
            .collect()
    }

    /// Expand `tokens` into a 0/1 indicator matrix with one column per
    /// fitted level, preserving row order.
    ///
    /// Errors on any token that was not seen at fit time; a silently grown
    /// or reshuffled column set would misalign the model input.
    pub fn transform(&self, tokens: &[String]) -> Result<Array2<f64>> {
        let mut data = vec![0.0; tokens.len() * self.levels.len()];
        for (row, token) in tokens.iter().enumerate() {
            let col = self
                .levels
                .iter()
                .position(|l| l == token)
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "Unseen categorical level '{}' at row {}; fitted levels are {:?}",
                        token,
                        row + 1,
                        self.levels
                    )
                })?;
            data[row * self.levels.len() + col] = 1.0;
        }
        Ok(Array2::from_shape_vec((tokens.len(), self.levels.len()), data)?)
    }
}

/// Simple standard scaler (per-column mean/std).
#[derive(Clone, Debug)]
pub struct Scaler {
    pub mean: Array1<f64>,
    pub std: Array1<f64>,
}

impl Scaler {
    /// Minimum stddev to avoid division by zero when transforming.
    const MIN_STD: f64 = 1e-9;
}

/// Fit a `Scaler` from an `Array2<f64>` where rows are samples and
/// columns are features.
pub fn fit_scaler(x: &Array2<f64>) -> Scaler {
    assert!(
        x.nrows() > 0 && x.ncols() > 0,
        "fit_scaler requires non-empty matrix"
    );

    let mean = x.mean_axis(Axis(0)).expect("non-empty matrix");
    let std = x
        .std_axis(Axis(0), 0.0)
        .mapv(|v| v.max(Scaler::MIN_STD));

    Scaler { mean, std }
}

/// Transform all rows using the provided `Scaler` and return a new matrix.
pub fn transform_all(x: &Array2<f64>, sc: &Scaler) -> Array2<f64> {
    (x - &sc.mean) / &sc.std
}

/// Concatenate the indicator block and the numeric block into the design
/// matrix, indicators first, preserving row order.
pub fn assemble_design_matrix(
    indicators: &Array2<f64>,
    numeric: &Array2<f64>,
) -> Result<Array2<f64>> {
    if indicators.nrows() != numeric.nrows() {
        anyhow::bail!(
            "Indicator block has {} rows but numeric block has {}",
            indicators.nrows(),
            numeric.nrows()
        );
    }
    Ok(concatenate![Axis(1), indicators.view(), numeric.view()])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_encoder_levels_first_observed_order() {
        let encoder = PlanEncoder::fit(&tokens(&["0", "2G", "0", "1G", "2G"]));
        assert_eq!(encoder.levels(), &["0", "2G", "1G"]);
        assert_eq!(
            encoder.feature_names("data_plan_size"),
            vec!["data_plan_size=0", "data_plan_size=2G", "data_plan_size=1G"]
        );
    }

    #[test]
    fn test_indicators_sum_to_one_per_row() {
        let input = tokens(&["0", "2G", "0", "1G", "3G", "2G"]);
        let encoder = PlanEncoder::fit(&input);
        let indicators = encoder.transform(&input).unwrap();

        assert_eq!(indicators.nrows(), input.len());
        assert_eq!(indicators.ncols(), encoder.levels().len());
        for row in indicators.rows() {
            assert_eq!(row.sum(), 1.0);
            assert!(row.iter().all(|&v| v == 0.0 || v == 1.0));
        }
    }

    #[test]
    fn test_unseen_level_is_an_error() {
        let encoder = PlanEncoder::fit(&tokens(&["0", "1G"]));
        let err = encoder.transform(&tokens(&["0", "4G"])).unwrap_err();
        assert!(err.to_string().contains("Unseen categorical level '4G'"));
    }

    #[test]
    fn test_transform_is_deterministic_across_calls() {
        let input = tokens(&["1G", "0", "1G"]);
        let encoder = PlanEncoder::fit(&input);
        let a = encoder.transform(&input).unwrap();
        let b = encoder.transform(&input).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_scaler_round_trip() {
        let x = Array2::from_shape_vec((3, 2), vec![1.0, 10.0, 2.0, 20.0, 3.0, 30.0]).unwrap();
        let sc = fit_scaler(&x);
        let z = transform_all(&x, &sc);

        for col in 0..2 {
            let mean: f64 = z.column(col).mean().unwrap();
            assert!(mean.abs() < 1e-12);
        }
    }

    #[test]
    fn test_scaler_constant_column_does_not_divide_by_zero() {
        let x = Array2::from_shape_vec((3, 1), vec![5.0, 5.0, 5.0]).unwrap();
        let sc = fit_scaler(&x);
        let z = transform_all(&x, &sc);
        assert!(z.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_assemble_design_matrix_column_order() {
        let indicators = Array2::from_shape_vec((2, 2), vec![1.0, 0.0, 0.0, 1.0]).unwrap();
        let numeric = Array2::from_shape_vec((2, 1), vec![7.0, 8.0]).unwrap();
        let x = assemble_design_matrix(&indicators, &numeric).unwrap();

        assert_eq!(x.shape(), &[2, 3]);
        assert_eq!(x[(0, 0)], 1.0);
        assert_eq!(x[(0, 2)], 7.0);
        assert_eq!(x[(1, 2)], 8.0);
    }

    #[test]
    fn test_assemble_design_matrix_row_mismatch() {
        let indicators = Array2::zeros((2, 2));
        let numeric = Array2::zeros((3, 1));
        assert!(assemble_design_matrix(&indicators, &numeric).is_err());
    }
}
