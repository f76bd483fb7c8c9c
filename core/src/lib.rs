// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Core of a month-grid personal calendar: events with optional recurrence,
//! conflict checks on exact time slots, and a persisted collection shared by
//! every consumer of the same storage medium.

mod config;
mod conflict;
mod datetime;
mod error;
mod event;
mod history;
mod recurrence;
mod scheduler;
mod storage;
mod store;

pub use crate::config::{APP_NAME, CONFIG_ENV, Config};
pub use crate::conflict::{conflict_message, find_conflicts};
pub use crate::datetime::{
    DEFAULT_DATE_FORMAT, MONTH_TITLE_FORMAT, SHORT_DATE_FORMAT, TimeFormat, WeekStart,
    combine_date_and_time, day_name, format_date, format_time, generate_calendar_grid,
    is_current_month, is_same_day, is_today, month_title, month_window, parse_time,
};
pub use crate::error::{CalendarError, CalendarResult};
pub use crate::event::{
    Category, CustomUnit, Event, EventDraft, EventInstance, EventPatch, MAX_DESCRIPTION_LEN,
    MAX_TITLE_LEN, Recurrence, TimeSlot, ValidationError,
};
pub use crate::history::{MAX_SEARCH_HISTORY, SEARCH_HISTORY_KEY, SearchHistory};
pub use crate::recurrence::{MAX_ITERATIONS, Step, expand, instances_in_window};
pub use crate::scheduler::{CategoryFilter, Outcome, Rejection, Scheduler, Statistics};
pub use crate::storage::{
    ChangeFeed, FileStorage, Listener, ListenerId, MemoryStorage, Storage, StorageChange,
};
pub use crate::store::{DEFAULT_STORAGE_KEY, EventStore};
