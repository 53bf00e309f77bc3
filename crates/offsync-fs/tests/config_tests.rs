//! Tests for ConfigStore

use std::collections::BTreeMap;

use offsync_fs::{ConfigStore, Error, NormalizedPath};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde::{Deserialize, Serialize};
use tempfile::TempDir;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Sample {
    program: String,
    options: Vec<String>,
    #[serde(default)]
    extra: BTreeMap<String, String>,
}

fn sample() -> Sample {
    Sample {
        program: "rsync".into(),
        options: vec!["-a".into(), "--protect-args".into()],
        extra: BTreeMap::new(),
    }
}

#[rstest]
#[case("config.toml")]
#[case("config.json")]
#[case("config.yaml")]
#[case("config.yml")]
fn save_and_load_by_extension(#[case] file_name: &str) {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join(file_name));
    let store = ConfigStore::new();

    store.save(&path, &sample()).unwrap();
    let loaded: Sample = store.load(&path).unwrap();

    assert_eq!(loaded, sample());
}

#[test]
fn unsupported_extension_is_rejected() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("config.ini"));

    let result = ConfigStore::new().save(&path, &sample());
    assert!(matches!(result, Err(Error::UnsupportedFormat { extension }) if extension == "ini"));
}

#[test]
fn parse_error_names_format() {
    let temp = TempDir::new().unwrap();
    let native = temp.path().join("config.toml");
    std::fs::write(&native, "program = [unterminated").unwrap();

    let result: Result<Sample, _> = ConfigStore::new().load(&NormalizedPath::new(&native));
    match result {
        Err(Error::ConfigParse { format, .. }) => assert_eq!(format, "TOML"),
        other => panic!("expected ConfigParse, got {:?}", other),
    }
}

#[test]
fn load_optional_absent_file() {
    let temp = TempDir::new().unwrap();
    let path = NormalizedPath::new(temp.path().join("config.toml"));

    let loaded: Option<Sample> = ConfigStore::new().load_optional(&path).unwrap();
    assert!(loaded.is_none());
}
