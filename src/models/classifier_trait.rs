use anyhow::Result;
use ndarray::{Array1, Array2};

/// A small trait abstraction for the churn estimator. The scorer and the
/// evaluator only see this contract, so a different fitting backend can be
/// dropped in without touching feature building or evaluation.
pub trait ClassifierModel {
    /// Fit the model. `y` uses the crate convention (1 churned, 0 retained).
    fn fit(&mut self, x: &Array2<f64>, y: &[i32]) -> Result<()>;

    /// Predict the positive-class (churn) probability for each row, in [0, 1].
    /// Errors when the model is unfitted or the column count differs from
    /// the matrix the model was fitted on.
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Optional human readable name for the model
    fn name(&self) -> &str {
        "classifier"
    }
}
