//! Tests for layered configuration loading.

use std::path::PathBuf;
use std::sync::Mutex;

use cell_packer::config::{CliOverrides, PackerConfig, ENV_VARS};
use cell_packer::errors::ConfigError;

/// Global mutex to serialize tests that modify environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn tempdir() -> tempfile::TempDir {
    tempfile::TempDir::new().unwrap()
}

/// Clear all PACKER_ env vars to prevent cross-test contamination.
fn clear_packer_env_vars() {
    for key in ENV_VARS {
        std::env::remove_var(key);
    }
}

#[test]
fn test_layer_resolution() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_packer_env_vars();

    let dir = tempdir();
    std::fs::write(
        dir.path().join("cell-packer.toml"),
        r#"
csv_file = "cells.csv"
series_count = 10
max_cell_difference_mah = 80
max_pack_difference_mah = 1500
"#,
    )
    .unwrap();

    // Env overrides file, CLI overrides env.
    std::env::set_var("PACKER_SERIES_COUNT", "12");
    std::env::set_var("PACKER_MAX_CELL_DIFFERENCE_MAH", "60");
    let cli = CliOverrides {
        series_count: Some(14),
        ..Default::default()
    };

    let config = PackerConfig::load(dir.path(), Some(&cli)).unwrap();
    clear_packer_env_vars();

    assert_eq!(config.series_count, Some(14));
    assert_eq!(config.max_cell_difference_mah, Some(60));
    assert_eq!(config.max_pack_difference_mah, Some(1500));
    assert_eq!(config.csv_file, Some(PathBuf::from("cells.csv")));

    let resolved = config.resolve().unwrap();
    assert_eq!(resolved.params.series_count, 14);
    assert_eq!(resolved.params.max_pack_differential, 60);
    assert_eq!(resolved.params.max_difference_between_packs, 1500);
}

#[test]
fn test_defaults_without_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_packer_env_vars();

    let dir = tempdir();
    let config = PackerConfig::load(dir.path(), None).unwrap();
    assert_eq!(config, PackerConfig::default());
    assert!(matches!(
        config.resolve(),
        Err(ConfigError::Missing { field: "csv_file" })
    ));
}

#[test]
fn test_explicit_config_must_exist() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_packer_env_vars();

    let dir = tempdir();
    let cli = CliOverrides {
        config_file: Some(dir.path().join("missing.toml")),
        ..Default::default()
    };
    assert!(matches!(
        PackerConfig::load(dir.path(), Some(&cli)),
        Err(ConfigError::FileNotFound { .. })
    ));
}

#[test]
fn test_unreadable_config_keeps_io_error() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_packer_env_vars();

    // A directory exists but cannot be read as a file.
    let dir = tempdir();
    let cli = CliOverrides {
        config_file: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    let err = PackerConfig::load(dir.path(), Some(&cli)).unwrap_err();
    match &err {
        ConfigError::Io { source, .. } => {
            assert_ne!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected an I/O error, got {other:?}"),
    }
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn test_explicit_config_replaces_project_file() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_packer_env_vars();

    let dir = tempdir();
    std::fs::write(dir.path().join("cell-packer.toml"), "series_count = 3\n").unwrap();
    let explicit = dir.path().join("other.toml");
    std::fs::write(&explicit, "max_retries = 25\n").unwrap();

    let cli = CliOverrides {
        config_file: Some(explicit),
        ..Default::default()
    };
    let config = PackerConfig::load(dir.path(), Some(&cli)).unwrap();
    assert_eq!(config.series_count, None);
    assert_eq!(config.max_retries, Some(25));
}

#[test]
fn test_invalid_toml_is_reported() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_packer_env_vars();

    let dir = tempdir();
    std::fs::write(dir.path().join("cell-packer.toml"), "series_count = [").unwrap();
    assert!(matches!(
        PackerConfig::load(dir.path(), None),
        Err(ConfigError::ParseError { .. })
    ));
}

#[test]
fn test_unparsable_env_is_ignored() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_packer_env_vars();

    let dir = tempdir();
    std::env::set_var("PACKER_SERIES_COUNT", "fourteen");
    std::env::set_var("PACKER_VERBOSE", "true");
    let config = PackerConfig::load(dir.path(), None).unwrap();
    clear_packer_env_vars();

    assert_eq!(config.series_count, None);
    assert_eq!(config.verbose, Some(true));
}
