/// Backup and restore flows: exporting the whole store, importing it back,
/// and the failure modes that must leave the store untouched.
use chrono::{NaiveDate, NaiveDateTime};
use std::io::Write;

use life_dashboard::*;

fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

fn populated_dashboard() -> Dashboard<MemoryStore, FixedClock> {
    let dashboard = Dashboard::with_clock(MemoryStore::new(), FixedClock::new(at(2024, 1, 3)));
    dashboard
        .set_profile(&Profile {
            name: "Ada".to_string(),
            avatar: "owl".to_string(),
        })
        .unwrap();
    dashboard.set_today_mood(4).unwrap();
    dashboard.add_study_hours(2.5).unwrap();
    dashboard.add_habit("Stretch".to_string()).unwrap();
    dashboard
        .add_budget_item("Salary".to_string(), 3000.0, BudgetKind::Income)
        .unwrap();
    dashboard
}

#[test]
fn test_export_import_inverse_preserves_decoded_values() {
    let dashboard = populated_dashboard();

    let before = dashboard.export();
    dashboard.import(&before).unwrap();
    let after = dashboard.export();

    assert_eq!(before, after);
    // Typed reads still work after the round trip
    assert_eq!(dashboard.profile().name, "Ada");
    assert_eq!(dashboard.study_hours().unwrap().total(), 2.5);
    assert_eq!(dashboard.today_mood().unwrap(), Some(4));
}

#[test]
fn test_import_replaces_rather_than_merges() {
    let dashboard = populated_dashboard();

    let mut doc = dashboard.export();
    doc.entries.remove(keys::PROFILE);
    dashboard.import(&doc).unwrap();

    // The dropped key is gone; everything else survived
    assert_eq!(dashboard.store().get(keys::PROFILE), None);
    assert_eq!(dashboard.study_hours().unwrap().total(), 2.5);
}

#[test]
fn test_import_file_round_trip() {
    let dashboard = populated_dashboard();
    let doc = dashboard.export();

    let mut file = tempfile::NamedTempFile::new().expect("failed to create temp file");
    file.write_all(doc.to_json_string().as_bytes()).unwrap();

    let restored = Dashboard::with_clock(MemoryStore::new(), FixedClock::new(at(2024, 1, 3)));
    restored.import_file(file.path()).unwrap();

    assert_eq!(restored.export(), doc);
    assert_eq!(restored.profile().name, "Ada");
}

#[test]
fn test_malformed_file_aborts_before_clearing() {
    let dashboard = populated_dashboard();
    let before = dashboard.export();

    let mut file = tempfile::NamedTempFile::new().expect("failed to create temp file");
    file.write_all(b"[1, 2, 3]").unwrap();

    let result = dashboard.import_file(file.path());
    assert!(matches!(
        result,
        Err(DashboardError::Import(ImportError::MalformedDocument(_)))
    ));
    assert_eq!(dashboard.export(), before);
}

#[test]
fn test_unreadable_file_aborts_before_clearing() {
    let dashboard = populated_dashboard();
    let before = dashboard.export();

    let result = dashboard.import_file(std::path::Path::new("/nonexistent/backup.json"));
    assert!(matches!(
        result,
        Err(DashboardError::Import(ImportError::FileRead(_)))
    ));
    assert_eq!(dashboard.export(), before);
}

#[test]
fn test_raw_legacy_values_survive_backup() {
    let dashboard = Dashboard::with_clock(MemoryStore::new(), FixedClock::new(at(2024, 1, 3)));
    // A value written by an old version that never JSON-encoded it
    dashboard.store().set("legacyNote", "just some text").unwrap();

    let doc = dashboard.export();
    dashboard.import(&doc).unwrap();

    assert_eq!(
        dashboard.store().get("legacyNote"),
        Some("just some text".to_string())
    );
}

#[test]
fn test_suggested_backup_filename_embeds_export_date() {
    let dashboard = Dashboard::with_clock(MemoryStore::new(), FixedClock::new(at(2024, 1, 3)));
    assert_eq!(
        dashboard.suggested_backup_filename(),
        "life-dashboard-backup-2024-01-03.json"
    );
}

#[test]
fn test_rollover_applies_after_importing_an_old_backup() {
    // Backup taken in one week, restored in the next: stale accumulators
    // reset on first read, lists and scalars stay.
    let old = populated_dashboard();
    let doc = old.export();

    let restored = Dashboard::with_clock(MemoryStore::new(), FixedClock::new(at(2024, 1, 10)));
    restored.import(&doc).unwrap();

    assert_eq!(restored.profile().name, "Ada");
    assert_eq!(restored.habits().len(), 1);
    let week = restored.mood_week().unwrap();
    assert_eq!(week.week_start, "2024-01-08");
    assert!(week.daily_moods.is_empty());
}
