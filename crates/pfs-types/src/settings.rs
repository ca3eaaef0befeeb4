//! Experiment configuration: data locations, label and train/test split.
//!
//! Constructed once at process start and passed by reference to whatever
//! needs it (data loader, splitter, trainer).

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::PfsResult;
use crate::{config_error, validation_error};

pub const ENV_DATA_DIR: &str = "PFS_DATA_DIR";
pub const ENV_LABEL: &str = "PFS_LABEL";
pub const ENV_TEST_SIZE: &str = "PFS_TEST_SIZE";

/// Input and output tables of the data loader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPaths {
    pub data_dir: PathBuf,
    /// Household income survey table.
    pub household_income: PathBuf,
    /// Satellite feature table.
    pub satellite: PathBuf,
    /// Joined table written by the loader.
    pub joined: PathBuf,
}

impl DataPaths {
    /// Standard file names under `data_dir`.
    pub fn under(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            household_income: data_dir.join("bisp_hh_income.csv"),
            satellite: data_dir.join("bisp_satellite_data.csv"),
            joined: data_dir.join("bisp_sat_inc_data.csv"),
            data_dir,
        }
    }
}

impl Default for DataPaths {
    fn default() -> Self {
        Self::under(
            Path::new("..")
                .join("..")
                .join("..")
                .join("Data")
                .join("FinalData")
                .join("BISP"),
        )
    }
}

/// Static settings of one experiment run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub paths: DataPaths,
    /// Label column, also the join key checked by the loader.
    pub label: String,
    /// Fraction of records held out for testing, strictly between 0 and 1.
    pub test_size: f64,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            paths: DataPaths::default(),
            label: "hhinc_2011".to_string(),
            test_size: 0.3,
        }
    }
}

impl ExperimentConfig {
    /// Defaults overridden by `PFS_DATA_DIR`, `PFS_LABEL` and `PFS_TEST_SIZE`.
    pub fn from_env() -> PfsResult<Self> {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Load from a JSON file; missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> PfsResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        tracing::info!("Loaded experiment config from {}", path.display());
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a key lookup (normally the process environment).
    pub fn with_overrides<F>(mut self, lookup: F) -> PfsResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            self.paths = DataPaths::under(dir);
        }
        if let Some(label) = lookup(ENV_LABEL) {
            self.label = label;
        }
        if let Some(raw) = lookup(ENV_TEST_SIZE) {
            self.test_size = raw
                .trim()
                .parse()
                .map_err(|e| config_error!("{ENV_TEST_SIZE}={raw} is not a number: {e}"))?;
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> PfsResult<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(validation_error!(
                "test_size must lie strictly between 0 and 1, got {}",
                self.test_size
            ));
        }
        if self.label.trim().is_empty() {
            return Err(validation_error!("label must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PfsError;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_pipeline_layout() {
        let config = ExperimentConfig::default();
        assert_eq!(config.label, "hhinc_2011");
        assert_eq!(config.test_size, 0.3);
        assert!(config.paths.data_dir.ends_with("Data/FinalData/BISP"));
        assert!(config.paths.household_income.ends_with("bisp_hh_income.csv"));
        assert!(config.paths.satellite.ends_with("bisp_satellite_data.csv"));
        assert!(config.paths.joined.ends_with("bisp_sat_inc_data.csv"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn overrides_apply() {
        let config = ExperimentConfig::default()
            .with_overrides(lookup(&[
                (ENV_DATA_DIR, "/srv/bisp"),
                (ENV_TEST_SIZE, "0.25"),
            ]))
            .unwrap();
        assert_eq!(config.paths.satellite, PathBuf::from("/srv/bisp/bisp_satellite_data.csv"));
        assert_eq!(config.test_size, 0.25);
        assert_eq!(config.label, "hhinc_2011");
    }

    #[test]
    fn test_size_out_of_range_is_rejected() {
        for raw in ["0", "1", "1.5", "-0.1"] {
            let result = ExperimentConfig::default().with_overrides(lookup(&[(ENV_TEST_SIZE, raw)]));
            assert!(matches!(result, Err(PfsError::Validation(_))), "{raw} accepted");
        }
    }

    #[test]
    fn unparsable_test_size_is_a_config_error() {
        let result = ExperimentConfig::default().with_overrides(lookup(&[(ENV_TEST_SIZE, "thirty")]));
        assert!(matches!(result, Err(PfsError::Config(_))));
    }

    #[test]
    fn empty_label_is_rejected() {
        let result = ExperimentConfig::default().with_overrides(lookup(&[(ENV_LABEL, " ")]));
        assert!(result.is_err());
    }

    #[test]
    fn json_file_with_partial_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"test_size": 0.2, "label": "hhinc_2013"}}"#).unwrap();

        let config = ExperimentConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.test_size, 0.2);
        assert_eq!(config.label, "hhinc_2013");
        assert_eq!(config.paths, DataPaths::default());
    }

    #[test]
    fn json_file_errors_propagate() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            ExperimentConfig::from_json_file(file.path()),
            Err(PfsError::Serialization(_))
        ));

        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ExperimentConfig::from_json_file(dir.path().join("missing.json")),
            Err(PfsError::Io(_))
        ));
    }
}
