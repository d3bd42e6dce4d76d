/// Persistence and weekly-cycle state management core for a personal
/// life-tracking dashboard
///
/// Everything the dashboard remembers lives in one string-keyed local store.
/// This crate provides the store adapter, the typed record codec over it,
/// the calendar utilities defining the Monday-first week, the period
/// rollover policy that resets per-day and per-week accumulators, and the
/// snapshot export/import used for backup and restore. The `Dashboard`
/// facade composes them into per-domain operations.

pub mod calendar;
pub mod codec;
pub mod records;
pub mod rollover;
pub mod snapshot;
pub mod store;

// Re-export the types callers touch directly
pub use calendar::{Clock, FixedClock, SystemClock};
pub use codec::DecodeError;
pub use records::{
    keys, Achievement, BudgetItem, BudgetKind, Goal, HabitDef, HabitWeek, MoodWeek, Profile,
    QuotePick, RecordError, TaskItem, WeekHours,
};
pub use rollover::{Period, Periodic, RolloverWatcher};
pub use snapshot::{ImportError, Snapshot};
pub use store::{KeyValueStore, MemoryStore, SqliteStore, StoreError, StoreEvent};

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::mpsc;
use thiserror::Error;

use calendar::{day_key, weekday_index};

/// Errors surfaced by dashboard operations
#[derive(Error, Debug)]
pub enum DashboardError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("record error: {0}")]
    Record(#[from] RecordError),

    #[error("import error: {0}")]
    Import(#[from] ImportError),
}

/// The dashboard over one store and one clock
///
/// Each domain operation loads its record through the codec, applies the
/// rollover policy before first use, and writes back through the codec on
/// every mutation. Export and import operate on the store directly,
/// bypassing per-domain logic.
pub struct Dashboard<S: KeyValueStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
}

impl<S: KeyValueStore> Dashboard<S> {
    /// Create a dashboard over `store` using the local wall clock
    pub fn new(store: S) -> Self {
        Self {
            store,
            clock: SystemClock,
        }
    }
}

impl<S: KeyValueStore, C: Clock> Dashboard<S, C> {
    /// Create a dashboard with an explicit clock (tests drive boundaries
    /// through this)
    pub fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    /// Direct access to the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Best-effort change notifications, if the store supports them
    pub fn changes(&self) -> Option<mpsc::Receiver<StoreEvent>> {
        self.store.subscribe()
    }

    // Profile

    pub fn profile(&self) -> Profile {
        codec::load(&self.store, keys::PROFILE, Profile::default())
    }

    pub fn set_profile(&self, profile: &Profile) -> Result<(), DashboardError> {
        codec::save(&self.store, keys::PROFILE, profile)?;
        Ok(())
    }

    // Weekly hour accumulators

    /// Study hours for the current week, rolled over if the week changed
    pub fn study_hours(&self) -> Result<WeekHours, DashboardError> {
        Ok(rollover::load_current(&self.store, keys::STUDY_HOURS, &self.clock)?)
    }

    /// Add study hours to today's slot
    pub fn add_study_hours(&self, hours: f64) -> Result<WeekHours, DashboardError> {
        self.add_week_hours(keys::STUDY_HOURS, hours)
    }

    /// Exercise minutes for the current week, rolled over if the week changed
    pub fn exercise_minutes(&self) -> Result<WeekHours, DashboardError> {
        Ok(rollover::load_current(&self.store, keys::EXERCISE_MINUTES, &self.clock)?)
    }

    /// Add exercise minutes to today's slot
    pub fn add_exercise_minutes(&self, minutes: f64) -> Result<WeekHours, DashboardError> {
        self.add_week_hours(keys::EXERCISE_MINUTES, minutes)
    }

    fn add_week_hours(&self, key: &str, amount: f64) -> Result<WeekHours, DashboardError> {
        let mut week: WeekHours = rollover::load_current(&self.store, key, &self.clock)?;
        let today = weekday_index(self.clock.now().date());
        week.add(today, amount)?;
        codec::save(&self.store, key, &week)?;
        Ok(week)
    }

    // Mood

    /// Mood map for the current week, rolled over if the week changed
    pub fn mood_week(&self) -> Result<MoodWeek, DashboardError> {
        Ok(rollover::load_current(&self.store, keys::MOOD_WEEK, &self.clock)?)
    }

    /// Record today's mood score (1-5)
    pub fn set_today_mood(&self, score: u8) -> Result<MoodWeek, DashboardError> {
        let mut week: MoodWeek = rollover::load_current(&self.store, keys::MOOD_WEEK, &self.clock)?;
        week.set_mood(day_key(self.clock.now().date()), score)?;
        codec::save(&self.store, keys::MOOD_WEEK, &week)?;
        Ok(week)
    }

    /// Today's mood score, if recorded
    pub fn today_mood(&self) -> Result<Option<u8>, DashboardError> {
        let week = self.mood_week()?;
        Ok(week.mood_for(&day_key(self.clock.now().date())))
    }

    // Habit completions

    /// Habit completion map for the current week
    pub fn habit_week(&self) -> Result<HabitWeek, DashboardError> {
        Ok(rollover::load_current(&self.store, keys::HABIT_WEEK, &self.clock)?)
    }

    /// Mark a habit done (or not) for today
    pub fn set_habit_done(&self, habit_id: &uuid::Uuid, done: bool) -> Result<(), DashboardError> {
        let mut week: HabitWeek =
            rollover::load_current(&self.store, keys::HABIT_WEEK, &self.clock)?;
        week.set_done(&day_key(self.clock.now().date()), habit_id, done);
        codec::save(&self.store, keys::HABIT_WEEK, &week)?;
        Ok(())
    }

    /// Whether a habit is done today
    pub fn habit_done_today(&self, habit_id: &uuid::Uuid) -> Result<bool, DashboardError> {
        let week = self.habit_week()?;
        Ok(week.is_done(&day_key(self.clock.now().date()), habit_id))
    }

    // List entities: user-driven add/remove, never auto-reset

    pub fn habits(&self) -> Vec<HabitDef> {
        self.load_list(keys::HABITS)
    }

    pub fn add_habit(&self, name: String) -> Result<HabitDef, DashboardError> {
        let habit = HabitDef::new(name)?;
        self.push_to_list(keys::HABITS, habit.clone())?;
        Ok(habit)
    }

    pub fn remove_habit(&self, id: &uuid::Uuid) -> Result<bool, DashboardError> {
        self.remove_from_list::<HabitDef>(keys::HABITS, |h| &h.id == id)
    }

    pub fn goals(&self) -> Vec<Goal> {
        self.load_list(keys::GOALS)
    }

    pub fn add_goal(
        &self,
        title: String,
        target_date: Option<String>,
    ) -> Result<Goal, DashboardError> {
        let goal = Goal::new(title, target_date)?;
        self.push_to_list(keys::GOALS, goal.clone())?;
        Ok(goal)
    }

    pub fn remove_goal(&self, id: &uuid::Uuid) -> Result<bool, DashboardError> {
        self.remove_from_list::<Goal>(keys::GOALS, |g| &g.id == id)
    }

    pub fn set_goal_done(&self, id: &uuid::Uuid, done: bool) -> Result<bool, DashboardError> {
        self.update_in_list::<Goal>(keys::GOALS, |g| {
            if &g.id == id {
                g.done = done;
                true
            } else {
                false
            }
        })
    }

    pub fn tasks(&self) -> Vec<TaskItem> {
        self.load_list(keys::TASKS)
    }

    pub fn add_task(&self, title: String) -> Result<TaskItem, DashboardError> {
        let task = TaskItem::new(title)?;
        self.push_to_list(keys::TASKS, task.clone())?;
        Ok(task)
    }

    pub fn remove_task(&self, id: &uuid::Uuid) -> Result<bool, DashboardError> {
        self.remove_from_list::<TaskItem>(keys::TASKS, |t| &t.id == id)
    }

    pub fn set_task_done(&self, id: &uuid::Uuid, done: bool) -> Result<bool, DashboardError> {
        self.update_in_list::<TaskItem>(keys::TASKS, |t| {
            if &t.id == id {
                t.done = done;
                true
            } else {
                false
            }
        })
    }

    pub fn budget_items(&self) -> Vec<BudgetItem> {
        self.load_list(keys::BUDGET_ITEMS)
    }

    pub fn add_budget_item(
        &self,
        label: String,
        amount: f64,
        kind: BudgetKind,
    ) -> Result<BudgetItem, DashboardError> {
        let item = BudgetItem::new(label, amount, kind)?;
        self.push_to_list(keys::BUDGET_ITEMS, item.clone())?;
        Ok(item)
    }

    pub fn remove_budget_item(&self, id: &uuid::Uuid) -> Result<bool, DashboardError> {
        self.remove_from_list::<BudgetItem>(keys::BUDGET_ITEMS, |b| &b.id == id)
    }

    /// Income minus expenses across all budget items
    pub fn budget_balance(&self) -> f64 {
        self.budget_items()
            .iter()
            .map(|item| match item.kind {
                BudgetKind::Income => item.amount,
                BudgetKind::Expense => -item.amount,
            })
            .sum()
    }

    // Achievement and daily quote

    pub fn last_achievement(&self) -> Option<Achievement> {
        codec::load(&self.store, keys::LAST_ACHIEVEMENT, None)
    }

    pub fn set_last_achievement(&self, achievement: &Achievement) -> Result<(), DashboardError> {
        codec::save(&self.store, keys::LAST_ACHIEVEMENT, &Some(achievement.clone()))?;
        Ok(())
    }

    /// Index of today's quote within a pool of `pool_size` quotes
    ///
    /// Stable for the rest of the day, advances after midnight.
    pub fn quote_index(&self, pool_size: u32) -> Result<u32, DashboardError> {
        let mut pick: QuotePick =
            rollover::load_current(&self.store, keys::QUOTE_OF_DAY, &self.clock)?;
        let index = QuotePick::pick(self.clock.now().date(), pool_size);
        if pick.index != index {
            pick.index = index;
            codec::save(&self.store, keys::QUOTE_OF_DAY, &pick)?;
        }
        Ok(pick.index)
    }

    // Rollover recheck and backup

    /// Run the rollover check over every periodic record
    ///
    /// Called on a fixed interval by `RolloverWatcher` so accumulators in a
    /// long-lived session reset promptly after a boundary passes.
    pub fn recheck_rollovers(&self) -> Result<(), DashboardError> {
        let _: WeekHours = rollover::load_current(&self.store, keys::STUDY_HOURS, &self.clock)?;
        let _: WeekHours =
            rollover::load_current(&self.store, keys::EXERCISE_MINUTES, &self.clock)?;
        let _: MoodWeek = rollover::load_current(&self.store, keys::MOOD_WEEK, &self.clock)?;
        let _: HabitWeek = rollover::load_current(&self.store, keys::HABIT_WEEK, &self.clock)?;
        let _: QuotePick = rollover::load_current(&self.store, keys::QUOTE_OF_DAY, &self.clock)?;
        Ok(())
    }

    /// Export the entire store as a snapshot
    pub fn export(&self) -> Snapshot {
        snapshot::export_snapshot(&self.store)
    }

    /// Suggested filename for an export taken now
    pub fn suggested_backup_filename(&self) -> String {
        snapshot::suggested_filename(self.clock.now())
    }

    /// Replace the entire store's contents from a snapshot
    pub fn import(&self, doc: &Snapshot) -> Result<(), DashboardError> {
        snapshot::import_snapshot(&self.store, doc)?;
        Ok(())
    }

    /// Read a snapshot file and replace the store's contents with it
    pub fn import_file(&self, path: &std::path::Path) -> Result<(), DashboardError> {
        let doc = snapshot::read_snapshot_file(path)?;
        self.import(&doc)
    }

    // List helpers

    fn load_list<T: DeserializeOwned>(&self, key: &str) -> Vec<T> {
        codec::load(&self.store, key, Vec::new())
    }

    fn push_to_list<T: Serialize + DeserializeOwned>(
        &self,
        key: &str,
        item: T,
    ) -> Result<(), DashboardError> {
        let mut list: Vec<T> = self.load_list(key);
        list.push(item);
        codec::save(&self.store, key, &list)?;
        Ok(())
    }

    fn remove_from_list<T: Serialize + DeserializeOwned>(
        &self,
        key: &str,
        matches: impl Fn(&T) -> bool,
    ) -> Result<bool, DashboardError> {
        let mut list: Vec<T> = self.load_list(key);
        let before = list.len();
        list.retain(|item| !matches(item));
        let removed = list.len() != before;
        if removed {
            codec::save(&self.store, key, &list)?;
        }
        Ok(removed)
    }

    fn update_in_list<T: Serialize + DeserializeOwned>(
        &self,
        key: &str,
        mut apply: impl FnMut(&mut T) -> bool,
    ) -> Result<bool, DashboardError> {
        let mut list: Vec<T> = self.load_list(key);
        let mut changed = false;
        for item in &mut list {
            changed |= apply(item);
        }
        if changed {
            codec::save(&self.store, key, &list)?;
        }
        Ok(changed)
    }
}
