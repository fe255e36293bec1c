use churn_scorer::config::{ModelConfig, ModelType};
use churn_scorer::models::factory;
use ndarray::Array2;

#[test]
fn test_factory_builds_and_predicts() {
    // tiny dataset
    let x = Array2::from_shape_vec(
        (6, 2),
        vec![
            1.0, 0.0, // churned
            0.0, 1.0, // retained
            1.0, 0.1, // churned
            0.0, 0.9, // retained
            1.1, 0.0, // churned
            0.0, 1.2, // retained
        ],
    )
    .expect("failed to create feature matrix");

    let y = vec![1i32, 0, 1, 0, 1, 0];

    let params = ModelConfig {
        learning_rate: 0.5,
        model_type: ModelType::Logistic {
            max_iter: 2000,
            tolerance: 1e-8,
        },
    };

    let mut model = factory::build_model(params);
    model.fit(&x, &y).expect("fit succeeds");
    let probs = model.predict_proba(&x).expect("predict succeeds");
    assert_eq!(probs.len(), x.nrows());
    assert!(probs.iter().all(|p| (0.0..=1.0).contains(p)));
}
