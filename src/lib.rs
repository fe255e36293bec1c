//! churn-scorer: logistic-regression churn scoring for customer usage data.
//!
//! This crate loads a churn CSV into row-aligned arrays, expands the
//! data-plan-size categorical column into one-hot indicators, fits a
//! logistic regression behind a small model trait, scores every customer
//! with a churn probability, and evaluates the scores against true labels
//! with 2x2 contingency tables and true/false positive rates at arbitrary
//! probability cutoffs. Plot and report helpers render probability
//! histograms and ROC sweeps to a standalone HTML page.
//!
//! The design favors small, testable modules: the estimator is hidden
//! behind `models::ClassifierModel` so a different fitter can be swapped in
//! without touching the feature building or evaluation code.
pub mod config;
pub mod data_handling;
pub mod error;
pub mod io;
pub mod models;
pub mod preprocessing;
pub mod report;
pub mod scorer;
pub mod stats;
