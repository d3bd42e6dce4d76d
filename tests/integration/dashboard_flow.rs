/// End-to-end flows through the Dashboard facade: per-domain records,
/// rollover behavior across simulated day/week boundaries, and the
/// background recheck.
use chrono::{NaiveDate, NaiveDateTime};
use std::sync::Arc;
use std::time::Duration;

use life_dashboard::*;

fn at(y: i32, m: u32, d: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

fn dashboard_at(now: NaiveDateTime) -> (Dashboard<MemoryStore, FixedClock>, FixedClock) {
    let clock = FixedClock::new(now);
    let dashboard = Dashboard::with_clock(MemoryStore::new(), clock.clone());
    (dashboard, clock)
}

#[test]
fn test_mood_week_resets_at_week_boundary() {
    // Wednesday of the week starting 2024-01-01
    let (dashboard, clock) = dashboard_at(at(2024, 1, 3, 10));

    let week = dashboard.set_today_mood(4).unwrap();
    assert_eq!(week.week_start, "2024-01-01");
    assert_eq!(week.mood_for("2024-01-03"), Some(4));

    // The following week: payload empty, marker advanced
    clock.set(at(2024, 1, 9, 10));
    let week = dashboard.mood_week().unwrap();
    assert_eq!(week.week_start, "2024-01-08");
    assert!(week.daily_moods.is_empty());
}

#[test]
fn test_rollover_check_is_idempotent() {
    let (dashboard, _clock) = dashboard_at(at(2024, 1, 3, 10));

    dashboard.set_today_mood(5).unwrap();
    let raw_after_write = dashboard.store().get(keys::MOOD_WEEK);

    // Repeated checks within the same week change nothing
    dashboard.mood_week().unwrap();
    dashboard.mood_week().unwrap();
    assert_eq!(dashboard.store().get(keys::MOOD_WEEK), raw_after_write);
}

#[test]
fn test_week_hours_accumulate_then_reset() {
    let (dashboard, clock) = dashboard_at(at(2024, 1, 1, 9)); // Monday

    dashboard.add_study_hours(2.0).unwrap();
    clock.set(at(2024, 1, 3, 9)); // Wednesday, same week
    let week = dashboard.add_study_hours(1.5).unwrap();

    assert_eq!(week.week_start, "2024-01-01");
    assert_eq!(week.hours[0], 2.0);
    assert_eq!(week.hours[2], 1.5);
    assert_eq!(week.total(), 3.5);

    // Next week: all slots zeroed
    clock.set(at(2024, 1, 8, 9));
    let week = dashboard.study_hours().unwrap();
    assert_eq!(week.week_start, "2024-01-08");
    assert_eq!(week.total(), 0.0);
}

#[test]
fn test_study_and_exercise_are_independent_records() {
    let (dashboard, _clock) = dashboard_at(at(2024, 1, 1, 9));

    dashboard.add_study_hours(2.0).unwrap();
    dashboard.add_exercise_minutes(30.0).unwrap();

    assert_eq!(dashboard.study_hours().unwrap().total(), 2.0);
    assert_eq!(dashboard.exercise_minutes().unwrap().total(), 30.0);
}

#[test]
fn test_habit_completion_resets_weekly_but_list_survives() {
    let (dashboard, clock) = dashboard_at(at(2024, 1, 3, 10));

    let habit = dashboard.add_habit("Stretch".to_string()).unwrap();
    dashboard.set_habit_done(&habit.id, true).unwrap();
    assert!(dashboard.habit_done_today(&habit.id).unwrap());

    clock.set(at(2024, 1, 8, 10));
    // Completions reset with the week; the habit list is user-driven only
    assert!(!dashboard.habit_done_today(&habit.id).unwrap());
    assert_eq!(dashboard.habits().len(), 1);
}

#[test]
fn test_quote_index_is_stable_per_day_and_advances() {
    let (dashboard, clock) = dashboard_at(at(2024, 1, 3, 8));

    let morning = dashboard.quote_index(366).unwrap();
    clock.set(at(2024, 1, 3, 22));
    assert_eq!(dashboard.quote_index(366).unwrap(), morning);

    clock.set(at(2024, 1, 4, 8));
    assert_ne!(dashboard.quote_index(366).unwrap(), morning);
}

#[test]
fn test_list_entities_add_remove_toggle() {
    let (dashboard, _clock) = dashboard_at(at(2024, 1, 3, 10));

    let goal = dashboard
        .add_goal("Run a 10k".to_string(), Some("2024-06-01".to_string()))
        .unwrap();
    let task = dashboard.add_task("File taxes".to_string()).unwrap();
    dashboard
        .add_budget_item("Salary".to_string(), 3000.0, BudgetKind::Income)
        .unwrap();
    let rent = dashboard
        .add_budget_item("Rent".to_string(), 1200.0, BudgetKind::Expense)
        .unwrap();

    assert!(dashboard.set_goal_done(&goal.id, true).unwrap());
    assert!(dashboard.goals()[0].done);

    assert!(dashboard.set_task_done(&task.id, true).unwrap());
    assert!(dashboard.remove_task(&task.id).unwrap());
    assert!(dashboard.tasks().is_empty());
    // Removing again reports nothing removed
    assert!(!dashboard.remove_task(&task.id).unwrap());

    assert_eq!(dashboard.budget_balance(), 1800.0);
    assert!(dashboard.remove_budget_item(&rent.id).unwrap());
    assert_eq!(dashboard.budget_balance(), 3000.0);
}

#[test]
fn test_achievement_never_auto_resets() {
    let (dashboard, clock) = dashboard_at(at(2024, 1, 3, 10));

    assert_eq!(dashboard.last_achievement(), None);
    let achievement = Achievement {
        title: "First week logged".to_string(),
        date: "2024-01-03".to_string(),
    };
    dashboard.set_last_achievement(&achievement).unwrap();

    clock.set(at(2024, 3, 1, 10));
    assert_eq!(dashboard.last_achievement(), Some(achievement));
}

#[test]
fn test_quota_error_leaves_previous_record_intact() {
    let clock = FixedClock::new(at(2024, 1, 1, 9));
    let store = MemoryStore::with_capacity(256);
    let dashboard = Dashboard::with_clock(store, clock);

    dashboard.add_study_hours(1.0).unwrap();
    let before = dashboard.store().get(keys::STUDY_HOURS);

    // Exhaust most of the remaining quota with an unrelated key
    let filler = "x".repeat(150);
    dashboard.store().set("filler", &filler).unwrap();

    let result = dashboard.set_profile(&Profile {
        name: "a rather long display name".to_string(),
        avatar: "owl".to_string(),
    });
    assert!(matches!(
        result,
        Err(DashboardError::Store(StoreError::QuotaExceeded { .. }))
    ));
    assert_eq!(dashboard.store().get(keys::STUDY_HOURS), before);
}

#[test]
fn test_background_recheck_rolls_over_long_lived_session() {
    let clock = FixedClock::new(at(2024, 1, 3, 10));
    let dashboard = Arc::new(Dashboard::with_clock(MemoryStore::new(), clock.clone()));

    dashboard.set_today_mood(3).unwrap();

    let for_watcher = Arc::clone(&dashboard);
    let _watcher = RolloverWatcher::spawn(Duration::from_millis(10), move || {
        let _ = for_watcher.recheck_rollovers();
    });

    // Cross the week boundary without reloading anything ourselves
    clock.set(at(2024, 1, 8, 1));

    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    loop {
        let raw = dashboard.store().get(keys::MOOD_WEEK).unwrap_or_default();
        if raw.contains("2024-01-08") {
            break;
        }
        assert!(
            std::time::Instant::now() < deadline,
            "watcher never rolled the record over"
        );
        std::thread::sleep(Duration::from_millis(10));
    }

    let week = dashboard.mood_week().unwrap();
    assert_eq!(week.week_start, "2024-01-08");
    assert!(week.daily_moods.is_empty());
}

#[test]
fn test_durable_store_keeps_records_across_reopen() {
    let temp_file = tempfile::NamedTempFile::new().expect("failed to create temp file");
    let clock = FixedClock::new(at(2024, 1, 3, 10));

    {
        let store = SqliteStore::new(temp_file.path().to_path_buf()).unwrap();
        let dashboard = Dashboard::with_clock(store, clock.clone());
        dashboard.add_study_hours(4.0).unwrap();
        dashboard.set_today_mood(5).unwrap();
    }

    let store = SqliteStore::new(temp_file.path().to_path_buf()).unwrap();
    let dashboard = Dashboard::with_clock(store, clock);
    assert_eq!(dashboard.study_hours().unwrap().total(), 4.0);
    assert_eq!(dashboard.today_mood().unwrap(), Some(5));
}

#[test]
fn test_change_notifications_are_best_effort() {
    let (dashboard, _clock) = dashboard_at(at(2024, 1, 3, 10));

    let rx = dashboard.changes().expect("memory store supports changes");
    dashboard.set_today_mood(2).unwrap();

    let event = rx.recv_timeout(Duration::from_secs(1)).unwrap();
    assert_eq!(event.key.as_deref(), Some(keys::MOOD_WEEK));
}
