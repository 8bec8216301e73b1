//! Run configuration and dataset label resolution
//!
//! A run is described by one immutable [`RunConfig`], built once by the entry
//! point and passed down into the pipeline. It replaces any notion of a
//! process-wide label registry: labels are only meaningful inside the
//! `RunConfig` that declared them.
//!
//! # Settings Sources Priority
//!
//! 1. Command-line arguments
//! 2. Environment variables (`NTCIR_DENSITY_CONFIG`, `NTCIR_DENSITY_WORKERS`)
//! 3. TOML configuration file
//! 4. Built-in defaults

use crate::{Error, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::warn;

/// Environment variable naming the TOML configuration file
pub const CONFIG_ENV_VAR: &str = "NTCIR_DENSITY_CONFIG";

/// Environment variable overriding the worker count
pub const WORKERS_ENV_VAR: &str = "NTCIR_DENSITY_WORKERS";

/// Default location of the persisted estimator bundle
pub const DEFAULT_OUTPUT_FILE: &str = "estimators.json";

/// Default number of position resolution workers
pub const DEFAULT_NUM_WORKERS: usize = 1;

/// A dataset root, labelled with a unique single character
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    pub label: char,
    pub root: PathBuf,
}

impl Dataset {
    pub fn new(label: char, root: impl Into<PathBuf>) -> Self {
        Self {
            label,
            root: root.into(),
        }
    }

    /// Last path component of the root, used in log lines
    pub fn name(&self) -> String {
        self.root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.root.display().to_string())
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.label, self.root.display())
    }
}

/// Parses `L=/some/path`
impl FromStr for Dataset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (label, path) = split_labelled(s, '=')?;
        Ok(Dataset::new(label, path))
    }
}

/// A relevance judgement file, attached to the dataset with the same label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JudgementSource {
    pub label: char,
    pub path: PathBuf,
}

impl JudgementSource {
    pub fn new(label: char, path: impl Into<PathBuf>) -> Self {
        Self {
            label,
            path: path.into(),
        }
    }
}

impl fmt::Display for JudgementSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.label, self.path.display())
    }
}

/// Parses `L:/some/path/judgement.dat`
impl FromStr for JudgementSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (label, path) = split_labelled(s, ':')?;
        Ok(JudgementSource::new(label, path))
    }
}

fn split_labelled(s: &str, separator: char) -> Result<(char, PathBuf)> {
    let (label, path) = s.split_once(separator).ok_or_else(|| {
        Error::InvalidInput(format!(
            "expected LABEL{}PATH, got {:?}",
            separator, s
        ))
    })?;
    let label = parse_label(label)?;
    if path.is_empty() {
        return Err(Error::InvalidInput(format!("empty path in {:?}", s)));
    }
    Ok((label, PathBuf::from(path)))
}

fn parse_label(label: &str) -> Result<char> {
    let mut chars = label.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(Error::InvalidInput(format!(
            "dataset label must be a single character, got {:?}",
            label
        ))),
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level for the terminal (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Debug log file path (optional, terminal only if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Judgement entry as written in the TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct TomlJudgement {
    pub label: String,
    pub path: PathBuf,
}

/// Configuration loaded from a TOML file
///
/// ```toml
/// output_file = "estimators.json"
/// num_workers = 8
///
/// [datasets]
/// A = "/data/ntcir-10"
/// B = "/data/ntcir-12"
///
/// [[judgements]]
/// label = "A"
/// path = "/data/ntcir-10/judgements.dat"
///
/// [logging]
/// level = "info"
/// file = "ntcir-density.log"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub datasets: BTreeMap<String, PathBuf>,

    #[serde(default)]
    pub judgements: Vec<TomlJudgement>,

    #[serde(default)]
    pub output_file: Option<PathBuf>,

    #[serde(default)]
    pub num_workers: Option<usize>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TomlConfig {
    /// Load and parse a TOML configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        toml::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse TOML {}: {}", path.display(), e))
        })
    }
}

/// Command-line overrides, all optional
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub datasets: Vec<Dataset>,
    pub judgements: Vec<JudgementSource>,
    pub output_file: Option<PathBuf>,
    pub num_workers: Option<usize>,
    pub log_file: Option<PathBuf>,
}

/// Immutable configuration of one estimation run
#[derive(Debug, Clone)]
pub struct RunConfig {
    datasets: Vec<Dataset>,
    judgements: Vec<JudgementSource>,
    config_file: Option<PathBuf>,
    pub output_file: PathBuf,
    pub num_workers: usize,
    pub logging: LoggingConfig,
}

impl RunConfig {
    /// Build a run configuration, checking label consistency
    ///
    /// Dataset labels must be unique; every judgement label must name a
    /// declared dataset; `num_workers` must be positive.
    pub fn new(
        datasets: Vec<Dataset>,
        judgements: Vec<JudgementSource>,
        output_file: PathBuf,
        num_workers: usize,
        logging: LoggingConfig,
    ) -> Result<Self> {
        if datasets.is_empty() {
            return Err(Error::Config("at least one dataset is required".to_string()));
        }

        let mut labels = HashSet::new();
        for dataset in &datasets {
            if !labels.insert(dataset.label) {
                return Err(Error::Config(format!(
                    "duplicate dataset label '{}'",
                    dataset.label
                )));
            }
        }

        for judgement in &judgements {
            if !labels.contains(&judgement.label) {
                return Err(Error::Config(format!(
                    "judgement {} refers to undeclared dataset label '{}'",
                    judgement.path.display(),
                    judgement.label
                )));
            }
        }

        if num_workers == 0 {
            return Err(Error::Config("num_workers must be at least 1".to_string()));
        }

        Ok(Self {
            datasets,
            judgements,
            config_file: None,
            output_file,
            num_workers,
            logging,
        })
    }

    /// Merge command-line overrides, environment and TOML file into a config
    ///
    /// Runs before logging is set up, so it does not log. The TOML file that
    /// was read, if any, is reported by `config_file`.
    pub fn resolve(overrides: ConfigOverrides) -> Result<Self> {
        let config_file = resolve_config_path(overrides.config_path.as_deref());
        let toml_config = match &config_file {
            Some(path) => TomlConfig::load(path)?,
            None => TomlConfig::default(),
        };

        let datasets = if overrides.datasets.is_empty() {
            toml_config
                .datasets
                .iter()
                .map(|(label, root)| -> Result<Dataset> {
                    Ok(Dataset::new(parse_label(label)?, root.clone()))
                })
                .collect::<Result<Vec<_>>>()?
        } else {
            overrides.datasets
        };

        let judgements = if overrides.judgements.is_empty() {
            toml_config
                .judgements
                .iter()
                .map(|j| -> Result<JudgementSource> {
                    Ok(JudgementSource::new(parse_label(&j.label)?, j.path.clone()))
                })
                .collect::<Result<Vec<_>>>()?
        } else {
            overrides.judgements
        };

        let output_file = overrides
            .output_file
            .or(toml_config.output_file)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILE));

        let num_workers = match overrides.num_workers {
            Some(n) => n,
            None => match std::env::var(WORKERS_ENV_VAR) {
                Ok(value) => value.trim().parse().map_err(|e| {
                    Error::Config(format!("{}={:?} is not a count: {}", WORKERS_ENV_VAR, value, e))
                })?,
                Err(_) => toml_config.num_workers.unwrap_or(DEFAULT_NUM_WORKERS),
            },
        };

        let mut logging = toml_config.logging;
        if overrides.log_file.is_some() {
            logging.file = overrides.log_file;
        }

        let mut config = Self::new(datasets, judgements, output_file, num_workers, logging)?;
        config.config_file = config_file;
        Ok(config)
    }

    /// TOML file the configuration was read from
    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_deref()
    }

    pub fn datasets(&self) -> &[Dataset] {
        &self.datasets
    }

    pub fn judgements(&self) -> &[JudgementSource] {
        &self.judgements
    }

    /// Look up a dataset by label
    pub fn dataset(&self, label: char) -> Option<&Dataset> {
        self.datasets.iter().find(|d| d.label == label)
    }

    /// Check every input and output path before any processing starts
    pub fn validate_paths(&self) -> Result<()> {
        for dataset in &self.datasets {
            if !dataset.root.is_dir() {
                return Err(Error::Config(format!(
                    "dataset {} is not an existing directory",
                    dataset
                )));
            }
        }

        for judgement in &self.judgements {
            if !judgement.path.is_file() {
                return Err(Error::Config(format!(
                    "judgement file {} does not exist or is not a file",
                    judgement
                )));
            }
        }

        let parent = match self.output_file.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        if !parent.is_dir() {
            return Err(Error::Config(format!(
                "output directory {} does not exist",
                parent.display()
            )));
        }

        if self.output_file.exists() {
            if !self.output_file.is_file() {
                return Err(Error::Config(format!(
                    "output path {} exists and is not a file",
                    self.output_file.display()
                )));
            }
            warn!("{} exists and will be overwritten", self.output_file.display());
        }

        Ok(())
    }
}

/// Pick the TOML file to read: explicit path, then env var, then the
/// per-user default if it exists
fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }

    default_config_path().filter(|p| p.is_file())
}

/// `<config_dir>/ntcir-density/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ntcir-density").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dataset_argument() {
        let dataset: Dataset = "A=/data/ntcir".parse().unwrap();
        assert_eq!(dataset.label, 'A');
        assert_eq!(dataset.root, PathBuf::from("/data/ntcir"));
    }

    #[test]
    fn test_dataset_path_may_contain_separator() {
        let dataset: Dataset = "B=/data/a=b".parse().unwrap();
        assert_eq!(dataset.root, PathBuf::from("/data/a=b"));
    }

    #[test]
    fn test_parse_judgement_argument() {
        let judgement: JudgementSource = "A:/data/judgements.dat".parse().unwrap();
        assert_eq!(judgement.label, 'A');
        assert_eq!(judgement.path, PathBuf::from("/data/judgements.dat"));
    }

    #[test]
    fn test_multi_character_label_rejected() {
        assert!("AB=/data".parse::<Dataset>().is_err());
        assert!("=/data".parse::<Dataset>().is_err());
        assert!("/data".parse::<Dataset>().is_err());
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        let result = RunConfig::new(
            vec![Dataset::new('A', "/a"), Dataset::new('A', "/b")],
            vec![],
            PathBuf::from(DEFAULT_OUTPUT_FILE),
            1,
            LoggingConfig::default(),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_judgement_for_unknown_label_rejected() {
        let result = RunConfig::new(
            vec![Dataset::new('A', "/a")],
            vec![JudgementSource::new('B', "/b.dat")],
            PathBuf::from(DEFAULT_OUTPUT_FILE),
            1,
            LoggingConfig::default(),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let result = RunConfig::new(
            vec![Dataset::new('A', "/a")],
            vec![],
            PathBuf::from(DEFAULT_OUTPUT_FILE),
            0,
            LoggingConfig::default(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_default_log_level() {
        assert_eq!(LoggingConfig::default().level, "info");
    }
}
