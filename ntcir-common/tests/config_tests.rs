//! Configuration resolution and validation tests
//!
//! Tests that manipulate NTCIR_DENSITY_* environment variables are marked
//! with #[serial] so they never run concurrently.

use ntcir_common::config::{
    ConfigOverrides, LoggingConfig, TomlConfig, CONFIG_ENV_VAR, DEFAULT_NUM_WORKERS,
    WORKERS_ENV_VAR,
};
use ntcir_common::{Dataset, Error, JudgementSource, RunConfig};
use serial_test::serial;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_toml(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("config.toml");
    fs::write(&path, body).unwrap();
    path
}

fn clear_env() {
    env::remove_var(CONFIG_ENV_VAR);
    env::remove_var(WORKERS_ENV_VAR);
}

#[test]
fn test_toml_config_parses_all_sections() {
    let temp = TempDir::new().unwrap();
    let path = write_toml(
        temp.path(),
        r#"
output_file = "/tmp/out.json"
num_workers = 8

[datasets]
A = "/data/ntcir-10"
B = "/data/ntcir-12"

[[judgements]]
label = "A"
path = "/data/ntcir-10/judgements.dat"

[logging]
level = "debug"
file = "run.log"
"#,
    );

    let config = TomlConfig::load(&path).unwrap();
    assert_eq!(config.datasets.len(), 2);
    assert_eq!(config.datasets["B"], PathBuf::from("/data/ntcir-12"));
    assert_eq!(config.judgements[0].label, "A");
    assert_eq!(config.num_workers, Some(8));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.file, Some(PathBuf::from("run.log")));
}

#[test]
fn test_toml_config_defaults() {
    let temp = TempDir::new().unwrap();
    let path = write_toml(temp.path(), "");

    let config = TomlConfig::load(&path).unwrap();
    assert!(config.datasets.is_empty());
    assert!(config.output_file.is_none());
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_invalid_toml_is_config_error() {
    let temp = TempDir::new().unwrap();
    let path = write_toml(temp.path(), "num_workers = \"many\"");
    assert!(matches!(TomlConfig::load(&path), Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_cli_overrides_toml() {
    clear_env();
    let temp = TempDir::new().unwrap();
    let path = write_toml(
        temp.path(),
        r#"
num_workers = 8
output_file = "from-toml.json"

[datasets]
A = "/data/toml"
"#,
    );

    let config = RunConfig::resolve(ConfigOverrides {
        config_path: Some(path),
        datasets: vec![Dataset::new('Z', "/data/cli")],
        num_workers: Some(2),
        ..Default::default()
    })
    .unwrap();

    assert_eq!(config.datasets(), &[Dataset::new('Z', "/data/cli")]);
    assert_eq!(config.num_workers, 2);
    assert_eq!(config.output_file, PathBuf::from("from-toml.json"));
}

#[test]
#[serial]
fn test_env_config_path_and_workers() {
    clear_env();
    let temp = TempDir::new().unwrap();
    let path = write_toml(
        temp.path(),
        r#"
num_workers = 8

[datasets]
A = "/data/toml"

[[judgements]]
label = "A"
path = "/data/toml/qrels.dat"
"#,
    );
    env::set_var(CONFIG_ENV_VAR, &path);
    env::set_var(WORKERS_ENV_VAR, "3");

    let config = RunConfig::resolve(ConfigOverrides::default()).unwrap();
    clear_env();

    assert_eq!(config.datasets(), &[Dataset::new('A', "/data/toml")]);
    assert_eq!(
        config.judgements(),
        &[JudgementSource::new('A', "/data/toml/qrels.dat")]
    );
    assert_eq!(config.num_workers, 3);
    assert_eq!(config.config_file(), Some(path.as_path()));
}

#[test]
#[serial]
fn test_invalid_workers_env_rejected() {
    clear_env();
    env::set_var(WORKERS_ENV_VAR, "lots");

    let result = RunConfig::resolve(ConfigOverrides {
        datasets: vec![Dataset::new('A', "/data")],
        ..Default::default()
    });
    clear_env();

    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_defaults_without_toml() {
    clear_env();
    let temp = TempDir::new().unwrap();
    let empty = write_toml(temp.path(), "");

    let config = RunConfig::resolve(ConfigOverrides {
        config_path: Some(empty.clone()),
        datasets: vec![Dataset::new('A', "/data")],
        ..Default::default()
    })
    .unwrap();

    assert_eq!(config.num_workers, DEFAULT_NUM_WORKERS);
    assert_eq!(config.output_file, PathBuf::from("estimators.json"));
    assert!(config.logging.file.is_none());
    assert_eq!(config.config_file(), Some(empty.as_path()));
}

#[test]
fn test_config_built_directly_has_no_config_file() {
    let config = RunConfig::new(
        vec![Dataset::new('A', "/data")],
        Vec::new(),
        PathBuf::from("out.json"),
        1,
        LoggingConfig::default(),
    )
    .unwrap();
    assert!(config.config_file().is_none());
}

#[test]
#[serial]
fn test_no_datasets_anywhere_rejected() {
    clear_env();
    let temp = TempDir::new().unwrap();
    let empty = write_toml(temp.path(), "");

    let result = RunConfig::resolve(ConfigOverrides {
        config_path: Some(empty),
        ..Default::default()
    });
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_validate_paths_accepts_existing_inputs() {
    let temp = TempDir::new().unwrap();
    let dataset = temp.path().join("dataset");
    fs::create_dir(&dataset).unwrap();
    let qrels = temp.path().join("qrels.dat");
    fs::write(&qrels, "").unwrap();

    let config = RunConfig::new(
        vec![Dataset::new('A', &dataset)],
        vec![JudgementSource::new('A', &qrels)],
        temp.path().join("estimators.json"),
        1,
        LoggingConfig::default(),
    )
    .unwrap();

    assert!(config.validate_paths().is_ok());
}

#[test]
fn test_validate_paths_rejects_missing_judgement_file() {
    let temp = TempDir::new().unwrap();

    let config = RunConfig::new(
        vec![Dataset::new('A', temp.path())],
        vec![JudgementSource::new('A', temp.path().join("missing.dat"))],
        temp.path().join("estimators.json"),
        1,
        LoggingConfig::default(),
    )
    .unwrap();

    match config.validate_paths() {
        Err(Error::Config(msg)) => assert!(msg.contains("missing.dat")),
        other => panic!("expected Config error, got {other:?}"),
    }
}

#[test]
fn test_validate_paths_rejects_missing_output_directory() {
    let temp = TempDir::new().unwrap();

    let config = RunConfig::new(
        vec![Dataset::new('A', temp.path())],
        vec![],
        temp.path().join("no/such/dir/estimators.json"),
        1,
        LoggingConfig::default(),
    )
    .unwrap();

    assert!(matches!(config.validate_paths(), Err(Error::Config(_))));
}

#[test]
fn test_validate_paths_rejects_directory_as_output() {
    let temp = TempDir::new().unwrap();
    let output = temp.path().join("estimators.json");
    fs::create_dir(&output).unwrap();

    let config = RunConfig::new(
        vec![Dataset::new('A', temp.path())],
        vec![],
        output,
        1,
        LoggingConfig::default(),
    )
    .unwrap();

    assert!(matches!(config.validate_paths(), Err(Error::Config(_))));
}

#[test]
fn test_dataset_lookup_by_label() {
    let config = RunConfig::new(
        vec![Dataset::new('A', "/a"), Dataset::new('B', "/b")],
        vec![],
        PathBuf::from("estimators.json"),
        1,
        LoggingConfig::default(),
    )
    .unwrap();

    assert_eq!(config.dataset('B').unwrap().root, PathBuf::from("/b"));
    assert!(config.dataset('C').is_none());
}
