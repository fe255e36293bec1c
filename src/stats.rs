//! Cutoff-based evaluation of churn scores.
//!
//! A score is classified predicted-positive iff it is strictly greater than
//! the cutoff. The contingency table is a pure, single-pass aggregation over
//! the (score, label) pair, so many cutoffs can be evaluated from one score
//! vector without recomputation.

use itertools_num::linspace;
use ndarray::Array1;

use crate::error::EvalError;

/// 2x2 cross-tabulation of predicted vs. actual churn at one cutoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContingencyTable {
    /// predicted negative, actual negative
    pub true_negatives: usize,
    /// predicted positive, actual negative
    pub false_positives: usize,
    /// predicted negative, actual positive
    pub false_negatives: usize,
    /// predicted positive, actual positive
    pub true_positives: usize,
}

impl ContingencyTable {
    pub fn total(&self) -> usize {
        self.true_negatives + self.false_positives + self.false_negatives + self.true_positives
    }

    pub fn actual_positives(&self) -> usize {
        self.true_positives + self.false_negatives
    }

    pub fn actual_negatives(&self) -> usize {
        self.true_negatives + self.false_positives
    }

    pub fn predicted_positives(&self) -> usize {
        self.true_positives + self.false_positives
    }

    pub fn predicted_negatives(&self) -> usize {
        self.true_negatives + self.false_negatives
    }

    /// Counts as `[predicted][actual]`, negative class first on both axes.
    pub fn counts(&self) -> [[usize; 2]; 2] {
        [
            [self.true_negatives, self.false_negatives],
            [self.false_positives, self.true_positives],
        ]
    }

    /// Fraction of actual positives predicted positive.
    pub fn true_positive_rate(&self) -> Result<f64, EvalError> {
        let actual_positives = self.actual_positives();
        if actual_positives == 0 {
            return Err(EvalError::NoActualPositives);
        }
        Ok(self.true_positives as f64 / actual_positives as f64)
    }

    /// Fraction of actual negatives predicted positive.
    pub fn false_positive_rate(&self) -> Result<f64, EvalError> {
        let actual_negatives = self.actual_negatives();
        if actual_negatives == 0 {
            return Err(EvalError::NoActualNegatives);
        }
        Ok(self.false_positives as f64 / actual_negatives as f64)
    }
}

/// Tabulate scores against labels at `cutoff` (predicted positive iff
/// score > cutoff).
///
/// # Arguments
///
/// * `scores` - Churn probabilities, one per customer.
/// * `labels` - True outcomes, 1 = churned, 0 = retained.
/// * `cutoff` - Probability threshold in [0, 1].
///
/// # Returns
///
/// The 2x2 table; its cells always sum to `scores.len()`.
pub fn contingency_table(
    scores: &Array1<f64>,
    labels: &Array1<i32>,
    cutoff: f64,
) -> Result<ContingencyTable, EvalError> {
    if scores.len() != labels.len() {
        return Err(EvalError::LengthMismatch);
    }

    let non_finite = scores.iter().filter(|v| !v.is_finite()).count();
    if non_finite > 0 {
        return Err(EvalError::NonFiniteScore(non_finite));
    }

    let mut table = ContingencyTable {
        true_negatives: 0,
        false_positives: 0,
        false_negatives: 0,
        true_positives: 0,
    };

    for (&score, &label) in scores.iter().zip(labels.iter()) {
        let predicted_positive = score > cutoff;
        match (predicted_positive, label) {
            (false, 0) => table.true_negatives += 1,
            (true, 0) => table.false_positives += 1,
            (false, 1) => table.false_negatives += 1,
            (true, 1) => table.true_positives += 1,
            (_, other) => return Err(EvalError::InvalidLabel(other)),
        }
    }

    Ok(table)
}

/// Table plus derived rates at one cutoff. Display rounds the rates to
/// three decimals.
#[derive(Debug, Clone, Copy)]
pub struct CutoffSummary {
    pub cutoff: f64,
    pub table: ContingencyTable,
    pub true_positive_rate: f64,
    pub false_positive_rate: f64,
}

impl std::fmt::Display for CutoffSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "cutoff {:.3}: TPR {:.3}, FPR {:.3} (TP {}, FP {}, FN {}, TN {})",
            self.cutoff,
            self.true_positive_rate,
            self.false_positive_rate,
            self.table.true_positives,
            self.table.false_positives,
            self.table.false_negatives,
            self.table.true_negatives
        )
    }
}

/// Evaluate one cutoff, returning the table together with both rates.
pub fn evaluate_at(
    scores: &Array1<f64>,
    labels: &Array1<i32>,
    cutoff: f64,
) -> Result<CutoffSummary, EvalError> {
    let table = contingency_table(scores, labels, cutoff)?;
    Ok(CutoffSummary {
        cutoff,
        table,
        true_positive_rate: table.true_positive_rate()?,
        false_positive_rate: table.false_positive_rate()?,
    })
}

/// One point of a cutoff sweep.
#[derive(Debug, Clone, Copy)]
pub struct RocPoint {
    pub cutoff: f64,
    pub false_positive_rate: f64,
    pub true_positive_rate: f64,
}

/// Sweep `n_cutoffs` evenly spaced cutoffs over [0, 1] and collect the
/// (FPR, TPR) operating points, reusing the same score vector throughout.
/// At least 2 cutoffs are required; linspace over fewer points has no
/// finite step.
pub fn roc_points(
    scores: &Array1<f64>,
    labels: &Array1<i32>,
    n_cutoffs: usize,
) -> Result<Vec<RocPoint>, EvalError> {
    if n_cutoffs < 2 {
        return Err(EvalError::SweepTooSmall(n_cutoffs));
    }

    let mut points = Vec::with_capacity(n_cutoffs);
    for cutoff in linspace(0.0f64, 1.0, n_cutoffs) {
        let summary = evaluate_at(scores, labels, cutoff)?;
        points.push(RocPoint {
            cutoff,
            false_positive_rate: summary.false_positive_rate,
            true_positive_rate: summary.true_positive_rate,
        });
    }
    Ok(points)
}
