use crate::config::ModelConfig;
use crate::models::classifier_trait::ClassifierModel;

/// Build a boxed classifier model from a `ModelConfig`.
/// Currently this is a thin factory implemented as a single function.
pub fn build_model(params: ModelConfig) -> Box<dyn ClassifierModel> {
    match params.model_type {
        crate::config::ModelType::Logistic { .. } => {
            Box::new(crate::models::logistic::LogisticClassifier::new(params))
        }
    }
}
