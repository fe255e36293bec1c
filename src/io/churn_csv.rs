//! Churn CSV reader.
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use csv::StringRecord;
use ndarray::{Array1, Array2};

use crate::data_handling::{CustomerMetadata, Dataset};
use crate::preprocessing::{assemble_design_matrix, PlanEncoder};

/// Parsed churn data ready for feature building.
///
/// The numeric block and the plan-size tokens are kept separate so the
/// one-hot expansion happens in `preprocessing` with an explicit encoder.
#[derive(Debug)]
pub struct ChurnData {
    pub numeric: Array2<f64>,
    pub numeric_names: Vec<String>,
    pub plan_size: Vec<String>,
    pub y: Array1<i32>,
    pub customer_id: Vec<String>,
}

/// Configuration for reading churn CSV files.
#[derive(Debug, Clone)]
pub struct ChurnReaderConfig {
    /// Column name holding the customer id.
    pub id_column: String,
    /// Column name holding the churn label (binary).
    pub label_column: String,
    /// Column name holding the data-plan-size token.
    pub plan_size_column: String,
    /// Optional list of numeric feature columns to load (in order).
    /// When `None`, all remaining columns are treated as features.
    pub feature_columns: Option<Vec<String>>,
    /// Columns to ignore when auto-selecting features.
    pub ignore_columns: Vec<String>,
}

impl Default for ChurnReaderConfig {
    fn default() -> Self {
        Self {
            id_column: "customer_id".to_string(),
            label_column: "churn".to_string(),
            plan_size_column: "data_plan_size".to_string(),
            feature_columns: None,
            // data_plan duplicates plan_size != "0", so it is dropped by default
            ignore_columns: vec!["data_plan".to_string()],
        }
    }
}

/// Read a churn CSV file into row-aligned arrays.
pub fn read_churn_csv<P: AsRef<Path>>(path: P) -> Result<ChurnData> {
    read_churn_csv_with_config(path, &ChurnReaderConfig::default())
}

/// Read a churn CSV file using a custom configuration.
pub fn read_churn_csv_with_config<P: AsRef<Path>>(
    path: P,
    config: &ChurnReaderConfig,
) -> Result<ChurnData> {
    let reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(&path)
        .with_context(|| format!("Failed to open churn file: {}", path.as_ref().display()))?;
    read_churn_records(reader, config)
}

/// Read churn rows from any `Read` source (used by the tests to parse
/// in-memory CSV).
pub fn read_churn_csv_from_reader<R: Read>(
    source: R,
    config: &ChurnReaderConfig,
) -> Result<ChurnData> {
    let reader = csv::ReaderBuilder::new().has_headers(true).from_reader(source);
    read_churn_records(reader, config)
}

fn read_churn_records<R: Read>(
    mut reader: csv::Reader<R>,
    config: &ChurnReaderConfig,
) -> Result<ChurnData> {
    let headers = reader
        .headers()
        .context("Failed to read churn header row")?
        .clone();

    let id_idx = find_column(&headers, &config.id_column)
        .ok_or_else(|| anyhow!("Missing id column '{}'", config.id_column))?;
    let label_idx = find_column(&headers, &config.label_column)
        .ok_or_else(|| anyhow!("Missing label column '{}'", config.label_column))?;
    let plan_idx = find_column(&headers, &config.plan_size_column)
        .ok_or_else(|| anyhow!("Missing plan-size column '{}'", config.plan_size_column))?;

    let feature_indices = resolve_feature_indices(&headers, config, id_idx, label_idx, plan_idx)?;
    if feature_indices.is_empty() {
        return Err(anyhow!("No feature columns detected in churn header"));
    }

    let mut features = Vec::new();
    let mut labels = Vec::new();
    let mut plan_size = Vec::new();
    let mut customer_id = Vec::new();

    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;

        let id = record
            .get(id_idx)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| anyhow!("Missing customer id at row {}", row_idx + 1))?;
        customer_id.push(id.to_string());

        let label_raw = record
            .get(label_idx)
            .ok_or_else(|| anyhow!("Missing label value at row {}", row_idx + 1))?;
        let label = parse_binary(label_raw)
            .with_context(|| format!("Invalid churn label at row {}", row_idx + 1))?;
        labels.push(label);

        let plan = record
            .get(plan_idx)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| anyhow!("Missing plan-size value at row {}", row_idx + 1))?;
        plan_size.push(plan.to_string());

        for &idx in &feature_indices {
            let value = record
                .get(idx)
                .ok_or_else(|| anyhow!("Missing feature value at row {}", row_idx + 1))?;
            let parsed = parse_numeric(value).with_context(|| {
                format!(
                    "Invalid feature '{}' at row {}",
                    headers.get(idx).unwrap_or(""),
                    row_idx + 1
                )
            })?;
            features.push(parsed);
        }
    }

    let n_samples = labels.len();
    let n_features = feature_indices.len();
    let numeric = Array2::from_shape_vec((n_samples, n_features), features)
        .context("Failed to build numeric feature block")?;
    let y = Array1::from_vec(labels);

    let numeric_names = feature_indices
        .iter()
        .map(|&idx| headers.get(idx).unwrap_or("").to_string())
        .collect();

    Ok(ChurnData {
        numeric,
        numeric_names,
        plan_size,
        y,
        customer_id,
    })
}

/// Convenience helper: read the file, fit the plan-size encoder on its
/// tokens, and assemble the full design matrix.
///
/// The returned encoder carries the fitted level set, to be reused
/// unchanged when building a matrix for any further data.
pub fn read_churn_dataset<P: AsRef<Path>>(path: P) -> Result<(Dataset, PlanEncoder)> {
    read_churn_dataset_with_config(path, &ChurnReaderConfig::default())
}

/// As `read_churn_dataset`, with a custom reader configuration.
pub fn read_churn_dataset_with_config<P: AsRef<Path>>(
    path: P,
    config: &ChurnReaderConfig,
) -> Result<(Dataset, PlanEncoder)> {
    let data = read_churn_csv_with_config(path, config)?;
    build_dataset(data, config)
}

/// Assemble a `Dataset` from parsed churn data, fitting the encoder on the
/// observed plan-size tokens.
pub fn build_dataset(data: ChurnData, config: &ChurnReaderConfig) -> Result<(Dataset, PlanEncoder)> {
    let encoder = PlanEncoder::fit(&data.plan_size);
    let dataset = build_dataset_with_encoder(data, config, &encoder)?;
    Ok((dataset, encoder))
}

/// Assemble a `Dataset` using an already-fitted encoder; errors on plan-size
/// tokens outside the encoder's level set.
pub fn build_dataset_with_encoder(
    data: ChurnData,
    config: &ChurnReaderConfig,
    encoder: &PlanEncoder,
) -> Result<Dataset> {
    let indicators = encoder.transform(&data.plan_size)?;
    let x = assemble_design_matrix(&indicators, &data.numeric)?;

    let mut feature_names = encoder.feature_names(&config.plan_size_column);
    feature_names.extend(data.numeric_names);

    Dataset::new(
        x,
        data.y,
        CustomerMetadata {
            customer_id: data.customer_id,
            feature_names,
        },
    )
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.eq_ignore_ascii_case(name))
}

fn resolve_feature_indices(
    headers: &StringRecord,
    config: &ChurnReaderConfig,
    id_idx: usize,
    label_idx: usize,
    plan_idx: usize,
) -> Result<Vec<usize>> {
    if let Some(names) = &config.feature_columns {
        let mut indices = Vec::with_capacity(names.len());
        for name in names {
            let idx = find_column(headers, name)
                .ok_or_else(|| anyhow!("Missing feature column '{}'", name))?;
            indices.push(idx);
        }
        return Ok(indices);
    }

    let mut ignore = HashSet::new();
    for name in &config.ignore_columns {
        ignore.insert(name.to_ascii_lowercase());
    }

    let mut indices = Vec::new();
    for (idx, header) in headers.iter().enumerate() {
        if idx == id_idx || idx == label_idx || idx == plan_idx {
            continue;
        }
        if ignore.contains(&header.to_ascii_lowercase()) {
            continue;
        }
        indices.push(idx);
    }

    Ok(indices)
}

/// Parse a binary field as 0/1, accepting yes/no and true/false spellings.
fn parse_binary(value: &str) -> Result<i32> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "yes" | "true" => Ok(1),
        "0" | "no" | "false" => Ok(0),
        other => Err(anyhow!("Expected a binary value, got '{}'", other)),
    }
}

/// Parse a feature field as f64, falling back to the binary spellings used
/// by the plan flags.
fn parse_numeric(value: &str) -> Result<f64> {
    let trimmed = value.trim();
    if let Ok(parsed) = trimmed.parse::<f64>() {
        if !parsed.is_finite() {
            return Err(anyhow!("Non-finite value '{}'", trimmed));
        }
        return Ok(parsed);
    }
    parse_binary(trimmed).map(f64::from)
}
