//! Data structures for loaded churn datasets.
//!
//! This module defines `CustomerMetadata` and `Dataset` and contains the
//! row-aligned filtering and holdout-split helpers used by the scorer and
//! the integration tests.
use anyhow::Result;
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::thread_rng;

/// Per-row identifiers and the design-matrix column names.
#[derive(Debug, Clone)]
pub struct CustomerMetadata {
    /// Customer id, `DDD-DDDD` formatted in the source data
    pub customer_id: Vec<String>,
    /// Design-matrix column names (indicator columns first)
    pub feature_names: Vec<String>,
}

impl CustomerMetadata {
    pub fn filter_by_indices(&self, indices: &[usize]) -> CustomerMetadata {
        CustomerMetadata {
            customer_id: indices
                .iter()
                .map(|&i| self.customer_id[i].clone())
                .collect(),
            feature_names: self.feature_names.clone(),
        }
    }
}

/// A design matrix with labels and row identity, immutable once built.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Design matrix, one row per customer in source order
    pub x: Array2<f64>,
    /// Churn labels, 1 = churned, 0 = retained
    pub y: Array1<i32>,
    pub metadata: CustomerMetadata,
}

impl Dataset {
    pub fn new(x: Array2<f64>, y: Array1<i32>, metadata: CustomerMetadata) -> Result<Self> {
        if y.len() != x.nrows() {
            anyhow::bail!(
                "Label vector length {} does not match {} rows",
                y.len(),
                x.nrows()
            );
        }
        if metadata.customer_id.len() != x.nrows() {
            anyhow::bail!(
                "Customer id count {} does not match {} rows",
                metadata.customer_id.len(),
                x.nrows()
            );
        }
        if metadata.feature_names.len() != x.ncols() {
            anyhow::bail!(
                "Feature name count {} does not match {} columns",
                metadata.feature_names.len(),
                x.ncols()
            );
        }
        Ok(Dataset { x, y, metadata })
    }

    pub fn n_customers(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    pub fn churned_count(&self) -> usize {
        self.y.iter().filter(|&&v| v == 1).count()
    }

    pub fn retained_count(&self) -> usize {
        self.y.iter().filter(|&&v| v == 0).count()
    }

    pub fn log_input_data_summary(&self) {
        log::info!(
            "Input data: {} churned and {} retained customers, {} feature columns",
            self.churned_count(),
            self.retained_count(),
            self.x.ncols()
        );
    }

    /// Filter the dataset by applying a boolean mask to all row-aligned fields.
    ///
    /// # Arguments
    ///
    /// * `mask` - A boolean mask of the same length as the number of rows in `x`
    ///
    /// # Returns
    ///
    /// A new `Dataset` with only rows where `mask[i] == true`
    pub fn filter(&self, mask: &Array1<bool>) -> Dataset {
        let selected_indices: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &m)| if m { Some(i) } else { None })
            .collect();

        Dataset {
            x: self.x.select(Axis(0), &selected_indices),
            y: self.y.select(Axis(0), &selected_indices),
            metadata: self.metadata.filter_by_indices(&selected_indices),
        }
    }

    /// Randomly split into (train, holdout) datasets.
    ///
    /// `train_fraction` rows (rounded down) land in the first dataset. Not
    /// part of the scoring pipeline itself, which fits and scores the same
    /// matrix, but useful when eyeballing generalization.
    pub fn split_for_holdout(&self, train_fraction: f64) -> (Dataset, Dataset) {
        let n_samples = self.x.nrows();
        let mut indices: Vec<usize> = (0..n_samples).collect();
        indices.shuffle(&mut thread_rng());

        let n_train = (n_samples as f64 * train_fraction) as usize;
        let mut mask = Array1::from_elem(n_samples, false);
        for &idx in indices.iter().take(n_train) {
            mask[idx] = true;
        }

        let holdout_mask = mask.mapv(|m| !m);
        (self.filter(&mask), self.filter(&holdout_mask))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_dataset() -> Dataset {
        let x = Array2::from_shape_vec((4, 2), vec![1.0, 0.0, 0.0, 1.0, 1.0, 1.0, 0.0, 0.0])
            .unwrap();
        let y = Array1::from_vec(vec![1, 0, 1, 0]);
        let metadata = CustomerMetadata {
            customer_id: vec![
                "382-4657".to_string(),
                "371-7191".to_string(),
                "358-1921".to_string(),
                "375-9999".to_string(),
            ],
            feature_names: vec!["a".to_string(), "b".to_string()],
        };
        Dataset::new(x, y, metadata).unwrap()
    }

    #[test]
    fn test_filter_keeps_row_identity() {
        let dataset = toy_dataset();
        let mask = Array1::from_vec(vec![true, false, true, false]);
        let filtered = dataset.filter(&mask);

        assert_eq!(filtered.n_customers(), 2);
        assert_eq!(filtered.metadata.customer_id, vec!["382-4657", "358-1921"]);
        assert_eq!(filtered.y.to_vec(), vec![1, 1]);
        assert_eq!(filtered.x[(1, 0)], 1.0);
        assert_eq!(filtered.x[(1, 1)], 1.0);
    }

    #[test]
    fn test_counts() {
        let dataset = toy_dataset();
        assert_eq!(dataset.churned_count(), 2);
        assert_eq!(dataset.retained_count(), 2);
    }

    #[test]
    fn test_split_covers_all_rows() {
        let dataset = toy_dataset();
        let (train, holdout) = dataset.split_for_holdout(0.5);
        assert_eq!(train.n_customers() + holdout.n_customers(), 4);
        assert_eq!(train.n_customers(), 2);
    }

    #[test]
    fn test_new_rejects_misaligned_labels() {
        let x = Array2::zeros((3, 1));
        let y = Array1::from_vec(vec![0, 1]);
        let metadata = CustomerMetadata {
            customer_id: vec!["a".into(), "b".into(), "c".into()],
            feature_names: vec!["f".into()],
        };
        assert!(Dataset::new(x, y, metadata).is_err());
    }
}
