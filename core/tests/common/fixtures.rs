// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Test data factories for integration tests.
//!
//! This module provides helper functions to create test data including
//! configurations, drafts, and schedulers pinned to a fixed "today".

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveTime};
use gridcal_core::{Config, EventDraft, Recurrence, Scheduler, TimeFormat, WeekStart};

/// The "today" every fixture scheduler is pinned to.
#[allow(dead_code)]
pub const TODAY: (i32, u32, u32) = (2024, 6, 10);

/// Shorthand for a calendar date.
///
/// # Panics
///
/// Panics if the date does not exist.
#[must_use]
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

/// Shorthand for a time of day.
///
/// # Panics
///
/// Panics if the time does not exist.
#[must_use]
pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).expect("valid test time")
}

/// Creates a test configuration rooted at `storage_dir`.
///
/// # Example
///
/// ```ignore
/// let config = test_config(&temp_dirs.storage_dir);
/// ```
#[must_use]
pub fn test_config(storage_dir: &Path) -> Config {
    Config {
        storage_dir: Some(storage_dir.to_path_buf()),
        ..Default::default()
    }
}

/// Creates a draft with the form defaults (09:00, other, no recurrence).
///
/// The date defaults to [`TODAY`].
#[must_use]
pub fn test_event_draft(title: &str) -> EventDraft {
    let (y, m, d) = TODAY;
    EventDraft::new(title, date(y, m, d))
}

/// Creates a draft at the given date and time.
#[allow(dead_code)]
#[must_use]
pub fn timed_draft(title: &str, day: NaiveDate, at: NaiveTime) -> EventDraft {
    let mut draft = EventDraft::new(title, day);
    draft.time = Some(at);
    draft
}

/// Creates a repeating draft at the given date and time.
#[allow(dead_code)]
#[must_use]
pub fn recurring_draft(
    title: &str,
    day: NaiveDate,
    at: NaiveTime,
    recurrence: Recurrence,
) -> EventDraft {
    let mut draft = timed_draft(title, day, at);
    draft.recurrence = recurrence;
    draft
}

/// Opens a file-backed scheduler over `config`, pinned to [`TODAY`].
///
/// # Panics
///
/// Panics if the scheduler cannot be opened.
#[allow(dead_code)]
#[must_use]
pub fn open_scheduler(config: Config) -> Scheduler {
    let (y, m, d) = TODAY;
    Scheduler::open(config)
        .expect("scheduler should open")
        .with_today(date(y, m, d))
}

/// Builder for creating test configurations with guaranteed temporary directories.
///
/// This builder ensures that `storage_dir` is always provided, preventing tests
/// from accidentally writing into the user's real state directory.
///
/// # Example
///
/// ```ignore
/// let temp_dirs = setup_temp_dirs().unwrap();
/// let config = TestConfigBuilder::new()
///     .with_storage_dir(&temp_dirs.storage_dir)
///     .with_week_start(WeekStart::Monday)
///     .build();
/// ```
#[must_use]
#[allow(dead_code)]
pub struct TestConfigBuilder {
    storage_dir: Option<PathBuf>,
    storage_key: Option<String>,
    week_start: WeekStart,
    time_format: TimeFormat,
}

#[allow(dead_code)]
impl TestConfigBuilder {
    /// Creates a new builder with default values.
    pub fn new() -> Self {
        Self {
            storage_dir: None,
            storage_key: None,
            week_start: WeekStart::Sunday,
            time_format: TimeFormat::TwelveHour,
        }
    }

    /// Sets the storage directory.
    pub fn with_storage_dir(mut self, path: &Path) -> Self {
        self.storage_dir = Some(path.to_path_buf());
        self
    }

    /// Sets the storage slot name.
    pub fn with_storage_key(mut self, key: &str) -> Self {
        self.storage_key = Some(key.to_string());
        self
    }

    /// Sets the first day of the week.
    pub fn with_week_start(mut self, week_start: WeekStart) -> Self {
        self.week_start = week_start;
        self
    }

    /// Sets the clock for times of day.
    pub fn with_time_format(mut self, time_format: TimeFormat) -> Self {
        self.time_format = time_format;
        self
    }

    /// Builds the configuration.
    ///
    /// # Panics
    ///
    /// Panics if no storage directory was set.
    pub fn build(self) -> Config {
        let defaults = Config::default();
        Config {
            storage_dir: Some(
                self.storage_dir
                    .expect("storage_dir must be set to keep tests out of the real state dir"),
            ),
            storage_key: self.storage_key.unwrap_or(defaults.storage_key),
            week_start: self.week_start,
            time_format: self.time_format,
        }
    }
}
