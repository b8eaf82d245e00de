use calimport::import::{ImportRequest, Importer};
use calimport::model::OwnerId;
use calimport::storage::{DATA_DIR_ENV, LocalStorage};
use std::env;

// Kept alone in this binary: it mutates the process environment.
#[test]
fn data_dir_env_var_isolates_storage() {
    let isolated = tempfile::tempdir().unwrap();
    let configured = tempfile::tempdir().unwrap();

    unsafe { env::remove_var(DATA_DIR_ENV) };
    assert_eq!(
        LocalStorage::default_dir(Some(configured.path())).as_deref(),
        Some(configured.path())
    );

    unsafe { env::set_var(DATA_DIR_ENV, isolated.path()) };
    let dir = LocalStorage::default_dir(Some(configured.path())).unwrap();
    assert_eq!(dir.as_path(), isolated.path());

    let storage = LocalStorage::new(dir);
    let ics = "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//calimport//tests//EN\r\n\
BEGIN:VEVENT\r\nUID:iso-1\r\nDTSTART:20240101T100000\r\nDTEND:20240101T110000\r\n\
SUMMARY:Isolated\r\nEND:VEVENT\r\nEND:VCALENDAR\r\n";
    Importer::new()
        .run_locked(
            &storage,
            &ImportRequest::new("iso.ics", ics, OwnerId::new("alice")),
        )
        .unwrap();

    assert!(isolated.path().join("events.json").exists());
    assert!(!configured.path().join("events.json").exists());

    unsafe { env::remove_var(DATA_DIR_ENV) };
}
