use crate::error::{DataError, DataResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// One row of the tabular dataset. Identity is the row position only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub features: Vec<f64>,
    pub target: f64,
}

/// A labelled tabular dataset held fully in memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub feature_names: Vec<String>,
    pub target_name: String,
    pub records: Vec<Record>,
}

impl Dataset {
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn feature_count(&self) -> usize {
        self.feature_names.len()
    }

    /// Checks that every record carries exactly one value per feature column.
    pub fn validate(&self) -> DataResult<()> {
        if self.feature_names.is_empty() {
            return Err(DataError::Shape("dataset has no feature columns".to_string()));
        }
        for (idx, record) in self.records.iter().enumerate() {
            if record.features.len() != self.feature_count() {
                return Err(DataError::Shape(format!(
                    "record[{idx}] has {} features, expected {}",
                    record.features.len(),
                    self.feature_count()
                )));
            }
        }
        Ok(())
    }
}

/// Where the dataset is fetched from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DatasetSource {
    /// A headered CSV file on the local filesystem.
    Path { path: PathBuf },
    /// A headered CSV document published over HTTP(S).
    Url { url: String },
}

impl DatasetSource {
    /// Interprets `http://` and `https://` values as URLs and anything else as a path.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.starts_with("http://") || value.starts_with("https://") {
            Self::Url { url: value.to_string() }
        } else {
            Self::Path { path: PathBuf::from(value) }
        }
    }
}

impl std::fmt::Display for DatasetSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Path { path } => write!(f, "{}", path.display()),
            Self::Url { url } => f.write_str(url),
        }
    }
}

/// Fetches the dataset into memory and splits off `target_column` as the label.
pub async fn load_dataset(source: &DatasetSource, target_column: &str) -> DataResult<Dataset> {
    let text = match source {
        DatasetSource::Path { path } => tokio::fs::read_to_string(path).await?,
        DatasetSource::Url { url } => download_text(url).await?,
    };

    let dataset = parse_dataset(&text, target_column)?;
    info!(
        source = %source,
        rows = dataset.len(),
        features = dataset.feature_count(),
        target = %dataset.target_name,
        "Loaded dataset"
    );
    Ok(dataset)
}

async fn download_text(url: &str) -> DataResult<String> {
    debug!(url = %url, "Downloading dataset");

    let download_err = |message: String| DataError::Download { url: url.to_string(), message };

    let response = reqwest::get(url).await.map_err(|e| download_err(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(download_err(format!("HTTP {status}")));
    }
    response.text().await.map_err(|e| download_err(e.to_string()))
}

/// Parses a headered CSV document. Every column except `target_column` becomes a
/// feature, in header order.
pub fn parse_dataset(text: &str, target_column: &str) -> DataResult<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let target_idx = headers.iter().position(|h| h == target_column).ok_or_else(|| {
        DataError::Shape(format!(
            "target column '{target_column}' not found in header [{}]",
            headers.join(", ")
        ))
    })?;

    let feature_names: Vec<String> = headers
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != target_idx)
        .map(|(_, name)| name.clone())
        .collect();

    let mut records = Vec::new();
    for (row_idx, row) in reader.records().enumerate() {
        let row = row?;
        // Header occupies line 1.
        let line = row_idx + 2;
        if row.len() != headers.len() {
            return Err(DataError::Shape(format!(
                "line {line} has {} fields, header has {}",
                row.len(),
                headers.len()
            )));
        }

        let mut features = Vec::with_capacity(feature_names.len());
        let mut target = 0.0;
        for (col_idx, field) in row.iter().enumerate() {
            let value: f64 = field.parse().map_err(|e: std::num::ParseFloatError| DataError::Parse {
                what: format!("column '{}'", headers[col_idx]),
                line,
                message: e.to_string(),
            })?;
            if col_idx == target_idx {
                target = value;
            } else {
                features.push(value);
            }
        }
        records.push(Record { features, target });
    }

    let dataset = Dataset { feature_names, target_name: target_column.to_string(), records };
    dataset.validate()?;
    Ok(dataset)
}
