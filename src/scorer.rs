//! Fit/score orchestration for the churn model.
use anyhow::Result;
use ndarray::Array1;

use crate::config::ModelConfig;
use crate::data_handling::Dataset;
use crate::models::{factory, ClassifierModel};
use crate::preprocessing::{fit_scaler, transform_all, Scaler};

/// Fit-time state: the scaler and the column schema it belongs to.
struct FittedState {
    scaler: Scaler,
    schema: Vec<String>,
}

/// Owns the boxed estimator plus the fit-time schema and scaling, so a
/// dataset scored later is guaranteed to line up column-for-column with the
/// matrix the model was fitted on.
pub struct ChurnScorer {
    model: Box<dyn ClassifierModel>,
    fitted: Option<FittedState>,
}

impl ChurnScorer {
    pub fn new(config: ModelConfig) -> Self {
        ChurnScorer {
            model: factory::build_model(config),
            fitted: None,
        }
    }

    /// Fit the model on the dataset's design matrix and labels.
    ///
    /// Standardization is fit here and replayed on every later `score`
    /// call; the column names are captured as the scoring schema.
    pub fn fit(&mut self, dataset: &Dataset) -> Result<()> {
        if dataset.n_customers() == 0 {
            anyhow::bail!("Cannot fit on a dataset with no customers");
        }

        dataset.log_input_data_summary();

        let scaler = fit_scaler(&dataset.x);
        let x = transform_all(&dataset.x, &scaler);
        let y = dataset.y.to_vec();

        log::info!(
            "Fitting {} model on {} customers",
            self.model.name(),
            dataset.n_customers()
        );
        self.model.fit(&x, &y)?;

        self.fitted = Some(FittedState {
            scaler,
            schema: dataset.metadata.feature_names.clone(),
        });
        Ok(())
    }

    /// Score every row of `dataset`, returning one churn probability per
    /// customer in row order. Pure with respect to the fitted state.
    pub fn score(&self, dataset: &Dataset) -> Result<Array1<f64>> {
        let fitted = self
            .fitted
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("Scorer has not been fitted"))?;
        if dataset.metadata.feature_names != fitted.schema {
            anyhow::bail!(
                "Design matrix schema {:?} does not match fitted schema {:?}",
                dataset.metadata.feature_names,
                fitted.schema
            );
        }

        let x = transform_all(&dataset.x, &fitted.scaler);
        let scores = self.model.predict_proba(&x)?;

        debug_assert_eq!(scores.len(), dataset.n_customers());
        Ok(scores)
    }

    /// Fit on the dataset and score the same matrix, the one-shot pipeline
    /// the crate exists for.
    pub fn fit_and_score(&mut self, dataset: &Dataset) -> Result<Array1<f64>> {
        self.fit(dataset)?;
        self.score(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_handling::CustomerMetadata;
    use ndarray::Array2;

    fn toy_dataset() -> Dataset {
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
        let y = Array1::from_vec(vec![1, 0, 1, 0, 1, 0]);
        let ids = (0..6).map(|i| format!("555-000{}", i)).collect();
        let metadata = CustomerMetadata {
            customer_id: ids,
            feature_names: vec!["day_mins".to_string(), "custserv_calls".to_string()],
        };
        Dataset::new(x, y, metadata).unwrap()
    }

    #[test]
    fn test_fit_and_score_alignment() {
        let dataset = toy_dataset();
        let mut scorer = ChurnScorer::new(ModelConfig::default());
        let scores = scorer.fit_and_score(&dataset).unwrap();

        assert_eq!(scores.len(), dataset.n_customers());
        assert!(scores.iter().all(|p| (0.0..=1.0).contains(p)));
    }

    #[test]
    fn test_score_is_pure() {
        let dataset = toy_dataset();
        let mut scorer = ChurnScorer::new(ModelConfig::default());
        scorer.fit(&dataset).unwrap();

        let a = scorer.score(&dataset).unwrap();
        let b = scorer.score(&dataset).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_score_before_fit_is_an_error() {
        let dataset = toy_dataset();
        let scorer = ChurnScorer::new(ModelConfig::default());
        assert!(scorer.score(&dataset).is_err());
    }

    #[test]
    fn test_fit_on_header_only_csv_is_an_error_not_a_panic() {
        use crate::io::churn_csv::{build_dataset, read_churn_csv_from_reader, ChurnReaderConfig};

        let header_only = "\
customer_id,account_length,intl_plan,data_plan,data_plan_size,day_mins,day_calls,custserv_calls,churn
";
        let config = ChurnReaderConfig::default();
        let data = read_churn_csv_from_reader(header_only.as_bytes(), &config).unwrap();
        let (dataset, _) = build_dataset(data, &config).unwrap();
        assert_eq!(dataset.n_customers(), 0);

        let mut scorer = ChurnScorer::new(ModelConfig::default());
        let err = scorer.fit(&dataset).unwrap_err();
        assert!(err.to_string().contains("no customers"));
    }

    #[test]
    fn test_schema_mismatch_is_an_error() {
        let dataset = toy_dataset();
        let mut scorer = ChurnScorer::new(ModelConfig::default());
        scorer.fit(&dataset).unwrap();

        let mut renamed = dataset.clone();
        renamed.metadata.feature_names[1] = "night_mins".to_string();
        let err = scorer.score(&renamed).unwrap_err();
        assert!(err.to_string().contains("does not match fitted schema"));
    }
}
