/// Typed record kinds for each life-tracking domain
///
/// One struct per persisted entry, each with a fixed store key. The serde
/// field names pin the persisted layout (`weekStartDate`, `dailyMoods`, ...)
/// so stored documents and snapshots keep a stable shape. Weekly and daily
/// accumulators implement `Periodic` and carry their marker inline.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::rollover::{Period, Periodic};

/// Store keys, one per persisted record
pub mod keys {
    pub const PROFILE: &str = "profile";
    pub const STUDY_HOURS: &str = "studyHours";
    pub const EXERCISE_MINUTES: &str = "exerciseMinutes";
    pub const MOOD_WEEK: &str = "moodWeek";
    pub const HABIT_WEEK: &str = "habitWeek";
    pub const HABITS: &str = "habits";
    pub const GOALS: &str = "goals";
    pub const TASKS: &str = "tasks";
    pub const BUDGET_ITEMS: &str = "budgetItems";
    pub const LAST_ACHIEVEMENT: &str = "lastAchievement";
    pub const QUOTE_OF_DAY: &str = "quoteOfDay";
}

/// Errors from record-level validation
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("invalid mood score: {0}")]
    InvalidScore(String),

    #[error("invalid amount: {0}")]
    InvalidAmount(String),

    #[error("invalid weekday index: {0}")]
    InvalidWeekday(u32),
}

fn validate_name(name: &str) -> Result<(), RecordError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(RecordError::InvalidName("name cannot be empty".to_string()));
    }
    if trimmed.len() > 100 {
        return Err(RecordError::InvalidName(
            "name cannot be longer than 100 characters".to_string(),
        ));
    }
    Ok(())
}

/// Simple scalar profile data; never auto-reset
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub avatar: String,
}

/// Seven-slot weekly accumulator (study hours, exercise minutes)
///
/// Slot 0 is Monday. The marker is the start-of-week date of the week the
/// slots belong to.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct WeekHours {
    #[serde(rename = "weekStartDate")]
    pub week_start: String,
    pub hours: [f64; 7],
}

impl WeekHours {
    /// Add `amount` to the slot for `weekday` (Monday = 0)
    pub fn add(&mut self, weekday: u32, amount: f64) -> Result<(), RecordError> {
        if weekday > 6 {
            return Err(RecordError::InvalidWeekday(weekday));
        }
        if !amount.is_finite() || amount < 0.0 {
            return Err(RecordError::InvalidAmount(format!(
                "amount must be a non-negative number, got {}",
                amount
            )));
        }
        self.hours[weekday as usize] += amount;
        Ok(())
    }

    /// Sum over all seven slots
    pub fn total(&self) -> f64 {
        self.hours.iter().sum()
    }
}

impl Periodic for WeekHours {
    const PERIOD: Period = Period::Week;

    fn marker(&self) -> &str {
        &self.week_start
    }

    fn reset(&mut self, marker: String) {
        self.week_start = marker;
        self.hours = [0.0; 7];
    }
}

/// Mood scores for the current week, keyed by day
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MoodWeek {
    #[serde(rename = "weekStartDate")]
    pub week_start: String,
    #[serde(rename = "dailyMoods")]
    pub daily_moods: BTreeMap<String, u8>,
}

impl MoodWeek {
    /// Record a 1-5 mood score for the day keyed by `day`
    pub fn set_mood(&mut self, day: String, score: u8) -> Result<(), RecordError> {
        if !(1..=5).contains(&score) {
            return Err(RecordError::InvalidScore(format!(
                "score must be 1-5, got {}",
                score
            )));
        }
        self.daily_moods.insert(day, score);
        Ok(())
    }

    pub fn mood_for(&self, day: &str) -> Option<u8> {
        self.daily_moods.get(day).copied()
    }
}

impl Periodic for MoodWeek {
    const PERIOD: Period = Period::Week;

    fn marker(&self) -> &str {
        &self.week_start
    }

    fn reset(&mut self, marker: String) {
        self.week_start = marker;
        self.daily_moods = BTreeMap::new();
    }
}

/// Per-day habit completion flags for the current week
///
/// Completion keys pair a day with the habit's identifier so one map covers
/// every habit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HabitWeek {
    #[serde(rename = "weekStartDate")]
    pub week_start: String,
    pub completions: BTreeMap<String, bool>,
}

impl HabitWeek {
    /// Map key for one habit on one day
    pub fn completion_key(day: &str, habit_id: &Uuid) -> String {
        format!("{}:{}", day, habit_id)
    }

    pub fn set_done(&mut self, day: &str, habit_id: &Uuid, done: bool) {
        self.completions
            .insert(Self::completion_key(day, habit_id), done);
    }

    pub fn is_done(&self, day: &str, habit_id: &Uuid) -> bool {
        self.completions
            .get(&Self::completion_key(day, habit_id))
            .copied()
            .unwrap_or(false)
    }
}

impl Periodic for HabitWeek {
    const PERIOD: Period = Period::Week;

    fn marker(&self) -> &str {
        &self.week_start
    }

    fn reset(&mut self, marker: String) {
        self.week_start = marker;
        self.completions = BTreeMap::new();
    }
}

/// A habit the user tracks; list entity, user-driven add/remove
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitDef {
    pub id: Uuid,
    pub name: String,
}

impl HabitDef {
    pub fn new(name: String) -> Result<Self, RecordError> {
        validate_name(&name)?;
        Ok(Self {
            id: Uuid::new_v4(),
            name,
        })
    }
}

/// A longer-term goal; list entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: Uuid,
    pub title: String,
    #[serde(rename = "targetDate")]
    pub target_date: Option<String>,
    pub done: bool,
}

impl Goal {
    pub fn new(title: String, target_date: Option<String>) -> Result<Self, RecordError> {
        validate_name(&title)?;
        Ok(Self {
            id: Uuid::new_v4(),
            title,
            target_date,
            done: false,
        })
    }
}

/// A one-off task; list entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskItem {
    pub id: Uuid,
    pub title: String,
    pub done: bool,
}

impl TaskItem {
    pub fn new(title: String) -> Result<Self, RecordError> {
        validate_name(&title)?;
        Ok(Self {
            id: Uuid::new_v4(),
            title,
            done: false,
        })
    }
}

/// Whether a budget item adds to or draws from the budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetKind {
    Income,
    Expense,
}

/// A budget line item; list entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetItem {
    pub id: Uuid,
    pub label: String,
    pub amount: f64,
    pub kind: BudgetKind,
}

impl BudgetItem {
    pub fn new(label: String, amount: f64, kind: BudgetKind) -> Result<Self, RecordError> {
        validate_name(&label)?;
        if !amount.is_finite() || amount < 0.0 {
            return Err(RecordError::InvalidAmount(format!(
                "amount must be a non-negative number, got {}",
                amount
            )));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            label,
            amount,
            kind,
        })
    }
}

/// The most recently unlocked achievement, if any; never auto-reset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub title: String,
    pub date: String,
}

/// Which quote is shown today; resets daily
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QuotePick {
    pub date: String,
    pub index: u32,
}

impl QuotePick {
    /// Deterministic pick for a date: stable all day, changes at midnight
    pub fn pick(date: NaiveDate, pool_size: u32) -> u32 {
        if pool_size == 0 {
            return 0;
        }
        date.ordinal() % pool_size
    }
}

impl Periodic for QuotePick {
    const PERIOD: Period = Period::Day;

    fn marker(&self) -> &str {
        &self.date
    }

    fn reset(&mut self, marker: String) {
        self.date = marker;
        self.index = 0;
    }
}
