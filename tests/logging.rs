use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
    thread::sleep,
    time::Duration,
};

use serial_test::serial;
use tempfile::tempdir;

#[test]
#[serial]
fn writes_log_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("casecon.log");

    casecon::logging::init(true, Some(path.clone()));
    tracing::info!("shortcut engine started");

    sleep(Duration::from_millis(100));

    assert!(path.exists(), "log file was not created");
    let contents = fs::read_to_string(path).unwrap();
    assert!(contents.contains("shortcut engine started"));
}

#[test]
#[serial]
fn init_without_file_creates_no_log() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("casecon.log");

    casecon::logging::init(false, None);
    tracing::info!("test");

    sleep(Duration::from_millis(100));

    assert!(!path.exists(), "log file should not be created");
}

#[test]
fn bare_log_file_name_goes_to_working_dir() {
    let (dir, name) = casecon::logging::log_file_parts(Path::new("casecon.log")).unwrap();
    assert_eq!(dir, PathBuf::from("."));
    assert_eq!(name, OsString::from("casecon.log"));
}

#[test]
fn nested_log_file_keeps_its_directory() {
    let (dir, name) =
        casecon::logging::log_file_parts(Path::new("logs/today/casecon.log")).unwrap();
    assert_eq!(dir, PathBuf::from("logs/today"));
    assert_eq!(name, OsString::from("casecon.log"));
}

#[test]
fn log_path_without_file_name_is_ignored() {
    assert!(casecon::logging::log_file_parts(Path::new("")).is_none());
    assert!(casecon::logging::log_file_parts(Path::new("logs/..")).is_none());
}
