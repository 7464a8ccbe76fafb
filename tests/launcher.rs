use parking_lot::Mutex;
use std::env;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tunekit_core::launcher::launch;

// The working directory is process-wide.
static CWD_LOCK: Mutex<()> = Mutex::new(());

fn settings_dir() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("test").join("resources");
    fs::create_dir_all(&nested).unwrap();
    fs::write(nested.join("settings.json"), r#"{ "base": { "path": "model" } }"#).unwrap();
    (dir, nested.join("settings.json"))
}

fn cwd() -> PathBuf {
    env::current_dir().unwrap().canonicalize().unwrap()
}

#[test]
fn test_passes_file_name() {
    let _lock = CWD_LOCK.lock();
    let (_dir, settings) = settings_dir();

    let seen = launch(&settings, |name| name.to_path_buf()).unwrap();
    assert_eq!(seen, PathBuf::from("settings.json"));
}

#[test]
fn test_directory_change_and_restore() {
    let _lock = CWD_LOCK.lock();
    let (_dir, settings) = settings_dir();
    let original = cwd();

    let inside = launch(&settings, |name| {
        assert!(name.is_file());
        cwd()
    })
    .unwrap();

    assert_eq!(inside, settings.parent().unwrap().canonicalize().unwrap());
    assert_eq!(cwd(), original);
}

#[test]
fn test_restore_on_error() {
    let _lock = CWD_LOCK.lock();
    let (_dir, settings) = settings_dir();
    let original = cwd();

    let result: Result<(), String> = launch(&settings, |_| Err("exception".to_string())).unwrap();
    assert!(result.is_err());
    assert_eq!(cwd(), original);
}

#[test]
fn test_restore_on_panic() {
    let _lock = CWD_LOCK.lock();
    let (_dir, settings) = settings_dir();
    let original = cwd();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        launch(&settings, |_| panic!("exception")).unwrap();
    }));
    assert!(outcome.is_err());
    assert_eq!(cwd(), original);
}

#[test]
fn test_bare_file_name_keeps_directory() {
    let _lock = CWD_LOCK.lock();
    let original = cwd();

    let inside = launch("settings.json", |name| {
        assert_eq!(name, Path::new("settings.json"));
        cwd()
    })
    .unwrap();
    assert_eq!(inside, original);
}

#[test]
fn test_missing_directory_fails_before_call() {
    let _lock = CWD_LOCK.lock();
    let original = cwd();

    let mut called = false;
    let result = launch("/definitely/not/here/settings.json", |_| called = true);
    assert!(result.is_err());
    assert!(!called);
    assert_eq!(cwd(), original);
}

#[test]
fn test_rejects_path_without_file_name() {
    let _lock = CWD_LOCK.lock();
    assert!(launch("..", |_| ()).is_err());
}
