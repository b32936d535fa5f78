use std::error::Error;
use std::io::Write;
use std::path::PathBuf;

use tempfile::{tempdir, NamedTempFile};

use deltascan::config::{load_and_validate, load_from_path, OutputDirs};
use deltascan::errors::DeltascanError;
use deltascan::types::{ComparisonMode, HashAlgorithm};

type TestResult = Result<(), Box<dyn Error>>;

#[test]
fn loads_json_config() -> TestResult {
    let mut file = NamedTempFile::new()?;
    write!(
        file,
        r#"{{
            "file_extensions": [".TXT", "pdf"],
            "scan_paths": ["/data/a", "/data/b"],
            "output_dir": ["/out"],
            "history_store_path": "/state/history.json",
            "calculate_md5_hash": true
        }}"#
    )?;

    let cfg = load_and_validate(file.path())?;
    assert_eq!(cfg.file_extensions(), ["txt", "pdf"]);
    assert_eq!(
        cfg.scan_paths(),
        [PathBuf::from("/data/a"), PathBuf::from("/data/b")]
    );
    assert_eq!(cfg.output_dirs(), [PathBuf::from("/out")]);
    assert_eq!(cfg.mode(), ComparisonMode::Hash);
    assert_eq!(cfg.hash_algorithm(), HashAlgorithm::Md5);
    assert_eq!(cfg.concurrency(), 16);
    Ok(())
}

#[test]
fn output_dir_accepts_a_single_string() -> TestResult {
    let mut file = NamedTempFile::new()?;
    write!(
        file,
        r#"{{"scan_paths": ["/d"], "output_dir": "/out", "history_store_path": "h.json"}}"#
    )?;

    let raw = load_from_path(file.path())?;
    assert_eq!(raw.output_dir, OutputDirs::One(PathBuf::from("/out")));
    assert!(!raw.calculate_md5_hash);
    Ok(())
}

#[test]
fn loads_toml_config() -> TestResult {
    let dir = tempdir()?;
    let path = dir.path().join("deltascan.toml");
    std::fs::write(
        &path,
        r#"
file_extensions = ["md"]
scan_paths = ["notes"]
history_store_path = "history.json"
calculate_md5_hash = true
hash_algorithm = "blake3"
concurrency = 2
"#,
    )?;

    let cfg = load_and_validate(&path)?;
    assert_eq!(cfg.hash_algorithm(), HashAlgorithm::Blake3);
    assert_eq!(cfg.concurrency(), 2);
    assert!(!cfg.copy_enabled());
    Ok(())
}

#[test]
fn unparseable_config_is_a_config_error() -> TestResult {
    let mut file = NamedTempFile::new()?;
    write!(file, "{{ not json")?;

    match load_and_validate(file.path()) {
        Err(DeltascanError::ConfigError(msg)) => assert!(msg.contains("cannot parse")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
    Ok(())
}

#[test]
fn missing_config_is_a_config_error() {
    let result = load_and_validate("/definitely/not/here.json");
    assert!(matches!(result, Err(DeltascanError::ConfigError(_))));
}

#[test]
fn missing_history_path_is_rejected() -> TestResult {
    let mut file = NamedTempFile::new()?;
    write!(file, r#"{{"scan_paths": ["/d"]}}"#)?;

    assert!(matches!(
        load_and_validate(file.path()),
        Err(DeltascanError::ConfigError(_))
    ));
    Ok(())
}
