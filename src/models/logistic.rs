use anyhow::Result;
use ndarray::{Array1, Array2};

use crate::config::{ModelConfig, ModelType};
use crate::models::classifier_trait::ClassifierModel;

/// Logistic regression fitted by batch gradient descent on the binary
/// cross-entropy loss.
pub struct LogisticClassifier {
    weights: Option<Array1<f64>>,
    intercept: f64,
    params: ModelConfig,
}

impl LogisticClassifier {
    pub fn new(params: ModelConfig) -> Self {
        LogisticClassifier {
            weights: None,
            intercept: 0.0,
            params,
        }
    }

    /// Fitted coefficients, one per design-matrix column.
    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.weights.as_ref()
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Both class probabilities per row, columns `[retained, churned]`.
    /// Each row sums to 1 by construction.
    pub fn predict_proba_pairs(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        let churn = self.predict_proba(x)?;
        let mut pairs = Array2::zeros((churn.len(), 2));
        for (i, &p) in churn.iter().enumerate() {
            pairs[(i, 0)] = 1.0 - p;
            pairs[(i, 1)] = p;
        }
        Ok(pairs)
    }

    fn sigmoid(z: f64) -> f64 {
        1.0 / (1.0 + (-z).exp())
    }

    fn linear_term(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let weights = self
            .weights
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Model has not been fitted"))?;
        if x.ncols() != weights.len() {
            anyhow::bail!(
                "Design matrix has {} columns but the model was fitted on {}",
                x.ncols(),
                weights.len()
            );
        }
        Ok(x.dot(weights) + self.intercept)
    }
}

impl ClassifierModel for LogisticClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &[i32]) -> Result<()> {
        let n_samples = x.nrows();
        let n_features = x.ncols();

        if y.len() != n_samples {
            anyhow::bail!(
                "Label count {} does not match {} samples",
                y.len(),
                n_samples
            );
        }
        if n_samples == 0 {
            anyhow::bail!("Cannot fit with zero samples");
        }
        for &label in y {
            if label != 0 && label != 1 {
                anyhow::bail!("Labels must be 0 or 1, found {}", label);
            }
        }

        let (max_iter, tolerance) = match self.params.model_type {
            ModelType::Logistic {
                max_iter,
                tolerance,
            } => (max_iter, tolerance),
        };

        let y_float: Array1<f64> = y.iter().map(|&v| v as f64).collect();
        let n = n_samples as f64;

        let mut weights = Array1::<f64>::zeros(n_features);
        let mut intercept = 0.0;

        for iteration in 0..max_iter {
            let z = x.dot(&weights) + intercept;
            let probs = z.mapv(Self::sigmoid);
            let residual = &probs - &y_float;

            let weight_grad = x.t().dot(&residual) / n;
            let intercept_grad = residual.sum() / n;

            weights = weights - &weight_grad * self.params.learning_rate;
            intercept -= self.params.learning_rate * intercept_grad;

            let grad_norm = weight_grad
                .iter()
                .chain(std::iter::once(&intercept_grad))
                .map(|g| g * g)
                .sum::<f64>()
                .sqrt();
            if grad_norm < tolerance {
                log::debug!(
                    "Gradient descent converged after {} iterations (|grad| = {:e})",
                    iteration + 1,
                    grad_norm
                );
                break;
            }
        }

        self.weights = Some(weights);
        self.intercept = intercept;
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        Ok(self.linear_term(x)?.mapv(Self::sigmoid))
    }

    fn name(&self) -> &str {
        "logistic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable_data() -> (Array2<f64>, Vec<i32>) {
        // churners cluster around (1, 0), retained around (0, 1)
        let x = Array2::from_shape_vec(
            (6, 2),
            vec![
                1.0, 0.0, //
                0.0, 1.0, //
                1.1, 0.1, //
                0.1, 0.9, //
                0.9, 0.0, //
                0.0, 1.2,
            ],
        )
        .unwrap();
        let y = vec![1, 0, 1, 0, 1, 0];
        (x, y)
    }

    fn fitted_model() -> (LogisticClassifier, Array2<f64>, Vec<i32>) {
        let (x, y) = separable_data();
        let mut model = LogisticClassifier::new(ModelConfig::new(
            0.5,
            ModelType::Logistic {
                max_iter: 5000,
                tolerance: 1e-8,
            },
        ));
        model.fit(&x, &y).unwrap();
        (model, x, y)
    }

    #[test]
    fn test_fit_separates_classes() {
        let (model, x, y) = fitted_model();
        let probs = model.predict_proba(&x).unwrap();

        assert_eq!(probs.len(), x.nrows());
        for (prob, &label) in probs.iter().zip(y.iter()) {
            assert!(*prob >= 0.0 && *prob <= 1.0);
            if label == 1 {
                assert!(*prob > 0.5, "churner scored {}", prob);
            } else {
                assert!(*prob < 0.5, "retained customer scored {}", prob);
            }
        }
    }

    #[test]
    fn test_class_probabilities_sum_to_one() {
        let (model, x, _) = fitted_model();
        let pairs = model.predict_proba_pairs(&x).unwrap();

        for row in pairs.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_predict_before_fit_is_an_error() {
        let model = LogisticClassifier::new(ModelConfig::default());
        let x = Array2::zeros((2, 2));
        assert!(model.predict_proba(&x).is_err());
    }

    #[test]
    fn test_column_count_mismatch_is_an_error() {
        let (model, _, _) = fitted_model();
        let wide = Array2::zeros((2, 5));
        assert!(model.predict_proba(&wide).is_err());
    }

    #[test]
    fn test_fit_rejects_bad_labels() {
        let (x, _) = separable_data();
        let mut model = LogisticClassifier::new(ModelConfig::default());
        let y = vec![1, 0, 2, 0, 1, 0];
        assert!(model.fit(&x, &y).is_err());
    }
}
