use calimport::error::ImportError;
use calimport::import::{DateRange, ImportRequest, Importer};
use calimport::markup::MarkupConverter;
use calimport::model::{DATETIME_FORMAT, OwnerId, StoredEvent};
use calimport::store::{EventStore, MemoryStore};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use std::collections::HashSet;

struct Vevent<'a> {
    uid: Option<&'a str>,
    start: &'a str,
    end: &'a str,
    summary: &'a str,
    description: Option<&'a str>,
}

fn vevent<'a>(uid: &'a str, start: &'a str, end: &'a str, summary: &'a str) -> Vevent<'a> {
    Vevent {
        uid: Some(uid),
        start,
        end,
        summary,
        description: None,
    }
}

fn calendar(events: &[Vevent]) -> String {
    let mut ics = String::from("BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//calimport//tests//EN\r\n");
    for e in events {
        ics.push_str("BEGIN:VEVENT\r\n");
        if let Some(uid) = e.uid {
            ics.push_str(&format!("UID:{}\r\n", uid));
        }
        ics.push_str("DTSTAMP:20240101T000000Z\r\n");
        ics.push_str(&format!("DTSTART:{}\r\n", e.start));
        ics.push_str(&format!("DTEND:{}\r\n", e.end));
        ics.push_str(&format!("SUMMARY:{}\r\n", e.summary));
        if let Some(desc) = e.description {
            ics.push_str(&format!("DESCRIPTION:{}\r\n", desc));
        }
        ics.push_str("END:VEVENT\r\n");
    }
    ics.push_str("END:VCALENDAR\r\n");
    ics
}

fn meeting(summary: &str) -> String {
    calendar(&[Vevent {
        description: Some(r"Notes\nAddress: 123 Main St"),
        ..vevent("abc123", "20240101T100000", "20240101T110000", summary)
    }])
}

fn january() -> DateRange {
    DateRange::between(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
    )
}

fn request(ics: &str, owner: &str) -> ImportRequest {
    ImportRequest::new("calendar.ics", ics.as_bytes(), OwnerId::new(owner)).with_range(january())
}

fn sorted(store: &MemoryStore) -> Vec<StoredEvent> {
    let mut events = store.all().unwrap();
    events.sort_by(|a, b| a.event_identifier.cmp(&b.event_identifier));
    events
}

#[test]
fn first_import_creates_the_event() {
    let mut store = MemoryStore::new();
    let report = Importer::new()
        .run(&request(&meeting("Meeting"), "alice"), &mut store)
        .unwrap();

    assert_eq!(report.created, 1);
    let events = store.events();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.name, "Meeting");
    assert_eq!(event.location.as_deref(), Some("123 Main St"));
    assert_eq!(
        event.start.format(DATETIME_FORMAT).to_string(),
        "2024-01-01 10:00:00"
    );
    assert_eq!(
        event.stop.format(DATETIME_FORMAT).to_string(),
        "2024-01-01 11:00:00"
    );
    assert_eq!(event.event_identifier.as_deref(), Some("abc123"));
    assert!(event.is_owned_by(&OwnerId::new("alice")));
}

#[test]
fn changed_summary_writes_only_the_name() {
    let mut store = MemoryStore::new();
    let importer = Importer::new();
    importer
        .run(&request(&meeting("Meeting"), "alice"), &mut store)
        .unwrap();
    let before = store.events()[0].clone();

    let report = importer
        .run(&request(&meeting("Meeting (moved)"), "alice"), &mut store)
        .unwrap();

    assert_eq!(report.updated, 1);
    assert_eq!(store.write_count(), 1);
    let after = &store.events()[0];
    assert_eq!(after.name, "Meeting (moved)");
    assert_eq!(after.id, before.id);
    assert_eq!(after.start, before.start);
    assert_eq!(after.stop, before.stop);
    assert_eq!(after.location, before.location);
}

#[test]
fn empty_import_prunes_and_deletes_sole_owner_event() {
    let mut store = MemoryStore::new();
    let importer = Importer::new();
    importer
        .run(&request(&meeting("Meeting"), "alice"), &mut store)
        .unwrap();

    let report = importer
        .run(&request(&calendar(&[]), "alice"), &mut store)
        .unwrap();

    assert_eq!(report.pruned, 1);
    assert_eq!(report.deleted, 1);
    assert!(store.events().is_empty());
}

#[test]
fn importing_twice_is_idempotent() {
    let ics = calendar(&[
        vevent("a", "20240105T090000", "20240105T100000", "A"),
        vevent("b", "20240106T090000", "20240106T100000", "B"),
    ]);
    let mut store = MemoryStore::new();
    let importer = Importer::new();

    importer.run(&request(&ics, "alice"), &mut store).unwrap();
    let first = sorted(&store);
    let report = importer.run(&request(&ics, "alice"), &mut store).unwrap();

    assert_eq!(report.unchanged, 2);
    assert_eq!(report.created + report.updated + report.pruned, 0);
    assert_eq!(store.write_count(), 0);
    assert_eq!(sorted(&store), first);
}

#[test]
fn identifiers_stay_unique_across_imports_and_duplicates() {
    let ics = calendar(&[
        vevent("dup", "20240105T090000", "20240105T100000", "First"),
        vevent("dup", "20240105T090000", "20240105T100000", "Second"),
    ]);
    let mut store = MemoryStore::new();
    let importer = Importer::new();
    importer.run(&request(&ics, "alice"), &mut store).unwrap();
    importer.run(&request(&ics, "bob"), &mut store).unwrap();

    let uids: Vec<_> = store
        .events()
        .iter()
        .filter_map(|e| e.event_identifier.clone())
        .collect();
    let unique: HashSet<_> = uids.iter().collect();
    assert_eq!(uids.len(), unique.len());
    assert_eq!(store.events()[0].name, "Second");
}

#[test]
fn events_straddling_the_window_are_not_imported() {
    let ics = calendar(&[
        vevent("inside", "20240131T220000", "20240131T230000", "Inside"),
        vevent("late", "20240131T230000", "20240201T010000", "Crosses end"),
        vevent("early", "20231231T230000", "20240101T010000", "Crosses start"),
    ]);
    let mut store = MemoryStore::new();
    let report = Importer::new()
        .run(&request(&ics, "alice"), &mut store)
        .unwrap();

    assert_eq!(report.created, 1);
    assert_eq!(report.filtered_out, 2);
    assert_eq!(store.events()[0].event_identifier.as_deref(), Some("inside"));
}

#[test]
fn without_a_range_everything_is_imported() {
    let ics = calendar(&[
        vevent("old", "19990101T100000", "19990101T110000", "Old"),
        vevent("new", "20300101T100000", "20300101T110000", "New"),
    ]);
    let mut store = MemoryStore::new();
    let req = ImportRequest::new("calendar.ics", ics, OwnerId::new("alice"));
    let report = Importer::new().run(&req, &mut store).unwrap();
    assert_eq!(report.created, 2);
}

#[test]
fn pruning_keeps_other_owners() {
    let ics = meeting("Meeting");
    let mut store = MemoryStore::new();
    let importer = Importer::new();
    importer.run(&request(&ics, "alice"), &mut store).unwrap();
    importer.run(&request(&ics, "bob"), &mut store).unwrap();
    assert_eq!(store.events()[0].partner_ids.len(), 2);

    let report = importer
        .run(&request(&calendar(&[]), "alice"), &mut store)
        .unwrap();

    assert_eq!(report.pruned, 1);
    assert_eq!(report.deleted, 0);
    let event = &store.events()[0];
    assert!(!event.is_owned_by(&OwnerId::new("alice")));
    assert!(event.is_owned_by(&OwnerId::new("bob")));
}

#[test]
fn keep_old_skips_pruning() {
    let mut store = MemoryStore::new();
    let importer = Importer::new();
    importer
        .run(&request(&meeting("Meeting"), "alice"), &mut store)
        .unwrap();

    let report = importer
        .run(&request(&calendar(&[]), "alice").remove_old(false), &mut store)
        .unwrap();

    assert_eq!(report.pruned, 0);
    assert_eq!(store.events().len(), 1);
}

#[test]
fn pruning_ignores_events_outside_the_window() {
    let ics = calendar(&[vevent("march", "20240305T090000", "20240305T100000", "March")]);
    let mut store = MemoryStore::new();
    let importer = Importer::new();
    importer
        .run(
            &ImportRequest::new("calendar.ics", ics.as_bytes(), OwnerId::new("alice")),
            &mut store,
        )
        .unwrap();

    let report = importer
        .run(&request(&calendar(&[]), "alice"), &mut store)
        .unwrap();

    assert_eq!(report.pruned, 0);
    assert_eq!(store.events().len(), 1);
}

#[test]
fn event_without_uid_is_skipped_and_the_run_continues() {
    let ics = calendar(&[
        Vevent {
            uid: None,
            ..vevent("", "20240105T090000", "20240105T100000", "No UID")
        },
        vevent("ok", "20240106T090000", "20240106T100000", "Fine"),
    ]);
    let mut store = MemoryStore::new();
    let report = Importer::new()
        .run(&request(&ics, "alice"), &mut store)
        .unwrap();

    assert_eq!(report.skipped, 1);
    assert_eq!(report.created, 1);
    assert_eq!(store.events().len(), 1);
}

#[test]
fn wrong_extension_blocks_the_whole_import() {
    let mut store = MemoryStore::new();
    let req = ImportRequest::new(
        "calendar.csv",
        meeting("Meeting").into_bytes(),
        OwnerId::new("alice"),
    );
    let err = Importer::new().run(&req, &mut store).unwrap_err();

    assert!(matches!(err, ImportError::UnsupportedFormat(_)));
    assert!(err.to_string().contains("Only ics files are supported"));
    assert!(store.events().is_empty());
}

#[test]
fn escaped_backslash_in_summary_is_decoded_once() {
    let ics = calendar(&[vevent(
        "path",
        "20240105T090000",
        "20240105T100000",
        r"Path C:\\new",
    )]);
    let mut store = MemoryStore::new();
    Importer::new()
        .run(&request(&ics, "alice"), &mut store)
        .unwrap();

    assert_eq!(store.events()[0].name, r"Path C:\new");
}

#[test]
fn text_that_is_not_a_calendar_is_a_decode_error() {
    let mut store = MemoryStore::new();
    let importer = Importer::new();
    importer
        .run(&request(&meeting("Meeting"), "alice"), &mut store)
        .unwrap();
    let before = store.events().to_vec();

    let err = importer
        .run(&request("hello world", "alice"), &mut store)
        .unwrap_err();

    assert!(matches!(err, ImportError::Decode(_)));
    assert_eq!(store.events(), before.as_slice());
}

#[test]
fn leading_byte_order_mark_is_ignored() {
    let ics = format!("\u{feff}{}", meeting("Meeting"));
    let mut store = MemoryStore::new();
    let report = Importer::new()
        .run(&request(&ics, "alice"), &mut store)
        .unwrap();

    assert_eq!(report.created, 1);
    assert_eq!(store.events()[0].name, "Meeting");
}

struct Shouting;

impl MarkupConverter for Shouting {
    fn to_safe_markup(&self, plain: &str) -> String {
        format!("<pre>{}</pre>", plain.to_uppercase())
    }
}

#[test]
fn custom_converter_renders_descriptions() {
    let mut store = MemoryStore::new();
    Importer::with_converter(Shouting)
        .run(&request(&meeting("Meeting"), "alice"), &mut store)
        .unwrap();

    let event = &store.events()[0];
    assert_eq!(
        event.description.as_deref(),
        Some("<pre>NOTES\nADDRESS: 123 MAIN ST</pre>")
    );
    // Location comes from the plain text, not the markup.
    assert_eq!(event.location.as_deref(), Some("123 Main St"));
}
