use std::fs;

use serial_test::serial;
use tempfile::tempdir;

#[test]
#[serial]
fn writes_log_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("log.txt");

    let subscriber = ink_overlay::logging::subscriber(false, Some(path.as_path()));
    tracing::subscriber::with_default(subscriber, || {
        tracing::info!("overlay test line");
    });

    assert!(path.exists(), "log file was not created");
    let contents = fs::read_to_string(path).unwrap();
    assert!(contents.contains("overlay test line"));
}

#[test]
#[serial]
fn debug_events_are_filtered_without_debug_logging() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("log.txt");

    let subscriber = ink_overlay::logging::subscriber(false, Some(path.as_path()));
    tracing::subscriber::with_default(subscriber, || {
        tracing::debug!("hidden detail");
        tracing::info!("visible line");
    });

    let contents = fs::read_to_string(path).unwrap();
    assert!(contents.contains("visible line"));
    assert!(!contents.contains("hidden detail"));
}

#[test]
#[serial]
fn unopenable_log_file_falls_back_to_stderr() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "not a directory").unwrap();
    let path = blocker.join("log.txt");

    let subscriber = ink_overlay::logging::subscriber(false, Some(path.as_path()));
    let logged = tracing::subscriber::with_default(subscriber, || {
        tracing::info!("still logging");
        true
    });

    assert!(logged);
    assert!(!path.exists());
    assert!(blocker.is_file());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
#[serial]
fn missing_log_directory_is_created() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("logs").join("overlay.log");

    let subscriber = ink_overlay::logging::subscriber(false, Some(path.as_path()));
    tracing::subscriber::with_default(subscriber, || {
        tracing::warn!("nested line");
    });

    let contents = fs::read_to_string(path).unwrap();
    assert!(contents.contains("nested line"));
}

#[test]
#[serial]
fn second_init_reports_existing_subscriber() {
    let _ = ink_overlay::logging::init(false, None);
    assert!(!ink_overlay::logging::init(true, None));
}
