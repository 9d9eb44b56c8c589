//! Pipeline configuration loading and merging.
//!
//! Configuration precedence:
//! 1. Environment variables (`BOOSTLINE_*`)
//! 2. Local config file (./boostline.toml)
//! 3. Global config file (~/.boostline/config.toml)
//! 4. Defaults
//!
//! `--config <path>` replaces steps 2 and 3 with a single explicit file.

use anyhow::{bail, Context, Result};
use boostline_data::{DatasetSource, SplitOptions};
use boostline_jobs::{builtin_image_uri, S3Uri, TrainingSettings, TransformSettings};
use boostline_platform::{
    HttpJobService, HttpObjectStore, JobService, LocalObjectStore, ObjectStore, WaitOptions,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

const TRAINING_ALGORITHM: &str = "xgboost";
const TRAINING_IMAGE_TAG: &str = "1";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub dataset: DatasetConfig,
    pub platform: PlatformConfig,
    pub training: TrainingSettings,
    pub transform: TransformSettings,
    pub polling: PollingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Local path or http(s) URL of a headered CSV file.
    pub source: Option<String>,
    pub target_column: String,
    pub data_dir: PathBuf,
    pub test_fraction: f64,
    pub validation_fraction: f64,
    pub seed: Option<u64>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        let split = SplitOptions::default();
        Self {
            source: None,
            target_column: "MEDV".to_string(),
            data_dir: PathBuf::from("data").join("boston"),
            test_fraction: split.test_fraction,
            validation_fraction: split.validation_fraction,
            seed: None,
        }
    }
}

impl DatasetConfig {
    pub fn source(&self) -> Result<DatasetSource> {
        match self.source.as_deref() {
            Some(value) if !value.trim().is_empty() => Ok(DatasetSource::parse(value.trim())),
            _ => bail!("No dataset source configured. Set [dataset] source or pass --source."),
        }
    }

    pub fn split_options(&self) -> SplitOptions {
        SplitOptions {
            test_fraction: self.test_fraction,
            validation_fraction: self.validation_fraction,
            seed: self.seed,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub region: String,
    /// Job API base URL; defaults to the regional endpoint.
    pub endpoint: Option<String>,
    /// Object storage base URL; defaults to the regional endpoint.
    pub storage_endpoint: Option<String>,
    pub api_token: Option<String>,
    pub role_arn: Option<String>,
    pub bucket: Option<String>,
    pub prefix: String,
    /// Serve object storage from this directory instead of over HTTP.
    pub local_store_root: Option<PathBuf>,
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            endpoint: None,
            storage_endpoint: None,
            api_token: None,
            role_arn: None,
            bucket: None,
            prefix: "boston-xgboost-LL".to_string(),
            local_store_root: None,
        }
    }
}

impl PlatformConfig {
    pub fn role_arn(&self) -> Result<&str> {
        self.role_arn
            .as_deref()
            .filter(|r| !r.is_empty())
            .context("No execution role configured. Set [platform] role_arn or BOOSTLINE_ROLE_ARN.")
    }

    pub fn bucket(&self) -> Result<&str> {
        self.bucket
            .as_deref()
            .filter(|b| !b.is_empty())
            .context("No bucket configured. Set [platform] bucket or BOOSTLINE_BUCKET.")
    }

    /// `s3://<bucket>/<prefix>`, the root of everything a run uploads or produces.
    pub fn upload_prefix(&self) -> Result<S3Uri> {
        Ok(S3Uri::new(self.bucket()?, self.prefix.trim_matches('/'))?)
    }

    pub fn job_service(&self) -> Box<dyn JobService> {
        match &self.endpoint {
            Some(endpoint) => Box::new(HttpJobService::new(endpoint.clone(), self.api_token.clone())),
            None => Box::new(HttpJobService::for_region(&self.region, self.api_token.clone())),
        }
    }

    pub fn object_store(&self) -> Box<dyn ObjectStore> {
        if let Some(root) = &self.local_store_root {
            debug!(root = %root.display(), "Using local object store");
            return Box::new(LocalObjectStore::new(root.clone()));
        }
        match &self.storage_endpoint {
            Some(endpoint) => Box::new(HttpObjectStore::new(endpoint.clone(), self.api_token.clone())),
            None => Box::new(HttpObjectStore::for_region(&self.region, self.api_token.clone())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    pub initial_interval_secs: u64,
    pub max_interval_secs: u64,
    pub max_wait_secs: Option<u64>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { initial_interval_secs: 5, max_interval_secs: 60, max_wait_secs: None }
    }
}

impl PollingConfig {
    pub fn wait_options(&self) -> WaitOptions {
        WaitOptions {
            initial_interval: Duration::from_secs(self.initial_interval_secs),
            max_interval: Duration::from_secs(self.max_interval_secs.max(self.initial_interval_secs)),
            max_wait: self.max_wait_secs.map(Duration::from_secs),
        }
    }
}

impl PipelineConfig {
    /// Loads `explicit` if given, otherwise discovers the global and local
    /// files, then applies environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut merged = toml::Table::new();
        match explicit {
            Some(path) => {
                let table = read_table(path)?
                    .with_context(|| format!("Configuration file not found: {}", path.display()))?;
                merge_tables(&mut merged, table);
            }
            None => {
                for path in [Self::default_global_path(), Self::default_local_path()].into_iter().flatten() {
                    if let Some(table) = read_table(&path)? {
                        debug!(path = %path.display(), "Loaded configuration file");
                        merge_tables(&mut merged, table);
                    }
                }
            }
        }

        let mut config: Self = toml::Value::Table(merged)
            .try_into()
            .context("Invalid pipeline configuration")?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn default_global_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".boostline").join("config.toml"))
    }

    pub fn default_local_path() -> Option<PathBuf> {
        Some(PathBuf::from("boostline.toml"))
    }

    /// Empty variables are treated as unset.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        if let Some(v) = get("BOOSTLINE_ENDPOINT") {
            self.platform.endpoint = Some(v);
        }
        if let Some(v) = get("BOOSTLINE_STORAGE_ENDPOINT") {
            self.platform.storage_endpoint = Some(v);
        }
        if let Some(v) = get("BOOSTLINE_API_TOKEN") {
            self.platform.api_token = Some(v);
        }
        if let Some(v) = get("BOOSTLINE_ROLE_ARN") {
            self.platform.role_arn = Some(v);
        }
        if let Some(v) = get("BOOSTLINE_BUCKET") {
            self.platform.bucket = Some(v);
        }
    }

    /// The configured image, or the built-in algorithm image for the region.
    pub fn training_image(&self) -> Result<String> {
        if let Some(image) = self.training.training_image.as_deref().filter(|i| !i.is_empty()) {
            return Ok(image.to_string());
        }
        Ok(builtin_image_uri(TRAINING_ALGORITHM, &self.platform.region, TRAINING_IMAGE_TAG)?)
    }
}

fn read_table(path: &Path) -> Result<Option<toml::Table>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
    };
    let table = content
        .parse::<toml::Table>()
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(Some(table))
}

/// Recursively overlays `other` onto `base`; scalar values in `other` win.
fn merge_tables(base: &mut toml::Table, other: toml::Table) {
    for (key, value) in other {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
