// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{Local, Months, NaiveDate, NaiveTime};
use serde::Serialize;

use crate::config::Config;
use crate::conflict::{conflict_message, find_conflicts};
use crate::datetime::{
    SHORT_DATE_FORMAT, TimeFormat, WeekStart, format_date, generate_calendar_grid, is_same_day,
    month_title, month_window,
};
use crate::error::{CalendarError, CalendarResult};
use crate::event::{Category, Event, EventDraft, EventInstance, EventPatch, ValidationError};
use crate::history::{SEARCH_HISTORY_KEY, SearchHistory};
use crate::recurrence::instances_in_window;
use crate::storage::{FileStorage, Storage};
use crate::store::EventStore;

const MOVE_CONFLICT_MESSAGE: &str = "Cannot move event: conflict with existing event(s)";

/// The result of a scheduling mutation that reached a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The change was persisted.
    Committed {
        /// The created, updated or moved event, if the operation has one.
        event: Option<Event>,

        /// A confirmation for display, if the operation has one.
        message: Option<String>,
    },

    /// The change was refused and nothing was written.
    Rejected(Rejection),
}

impl Outcome {
    fn committed(event: Event) -> Self {
        Outcome::Committed {
            event: Some(event),
            message: None,
        }
    }

    /// Whether the change was persisted.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Committed { .. })
    }

    /// The affected event of a committed change.
    pub fn event(&self) -> Option<&Event> {
        match self {
            Outcome::Committed { event, .. } => event.as_ref(),
            Outcome::Rejected(_) => None,
        }
    }

    /// The refusal, if the change was rejected.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Outcome::Committed { .. } => None,
            Outcome::Rejected(r) => Some(r),
        }
    }

    /// Events that blocked the change; empty unless it was a conflict.
    pub fn conflicts(&self) -> &[Event] {
        match self {
            Outcome::Rejected(Rejection::Conflict { conflicts, .. }) => conflicts,
            _ => &[],
        }
    }

    /// The confirmation or refusal message, if there is one.
    pub fn message(&self) -> Option<String> {
        match self {
            Outcome::Committed { message, .. } => message.clone(),
            Outcome::Rejected(r) => Some(r.message()),
        }
    }
}

/// Why a scheduling mutation was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// The event failed validation.
    Invalid(ValidationError),

    /// The event's slot is taken.
    Conflict {
        /// The events already occupying the slot.
        conflicts: Vec<Event>,

        /// Human-readable summary.
        message: String,
    },

    /// No event has the given id.
    NotFound {
        /// The id that was looked up.
        id: String,
    },

    /// The change could not be encoded for storage.
    Internal {
        /// Description of the failure.
        message: String,
    },
}

impl Rejection {
    /// Human-readable description of the refusal.
    pub fn message(&self) -> String {
        match self {
            Rejection::Invalid(e) => e.to_string(),
            Rejection::Conflict { message, .. } => message.clone(),
            Rejection::NotFound { .. } => "Event not found".to_string(),
            Rejection::Internal { message } => message.clone(),
        }
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// The category filter applied to the month view.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CategoryFilter {
    /// Every category.
    #[default]
    All,

    /// A single category.
    Only(Category),
}

impl CategoryFilter {
    const ALL: &str = "all";

    /// Whether an event of `category` passes the filter.
    pub fn matches(self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => c == category,
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str(Self::ALL),
            CategoryFilter::Only(c) => write!(f, "{c}"),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            Self::ALL => Ok(CategoryFilter::All),
            _ => value.parse().map(CategoryFilter::Only),
        }
    }
}

impl From<Category> for CategoryFilter {
    fn from(category: Category) -> Self {
        CategoryFilter::Only(category)
    }
}

/// Counts over the stored events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    /// Number of stored events.
    pub total: usize,

    /// Number of occurrences in the current month, ignoring filters.
    pub this_month: usize,

    /// Number of stored events with a recurrence rule.
    pub recurring: usize,

    /// Number of stored events per category; absent categories are omitted.
    pub by_category: BTreeMap<Category, usize>,
}

/// The calendar's scheduling entry point.
///
/// Holds the view state of one consumer (today, the reference month and the
/// filters) on top of an [`EventStore`].
#[derive(Debug)]
pub struct Scheduler {
    store: EventStore,
    history: Option<SearchHistory>,
    week_start: WeekStart,
    time_format: TimeFormat,
    today: NaiveDate,
    current_date: NaiveDate,
    search_term: String,
    selected_category: CategoryFilter,
}

impl Scheduler {
    /// Builds a scheduler over `store`, looking at the current month.
    pub fn new(store: EventStore, week_start: WeekStart) -> Self {
        let today = Local::now().date_naive();
        Self {
            store,
            history: None,
            week_start,
            time_format: TimeFormat::default(),
            today,
            current_date: today,
            search_term: String::new(),
            selected_category: CategoryFilter::All,
        }
    }

    /// Opens the file-backed store and search history described by `config`.
    #[tracing::instrument]
    pub fn open(mut config: Config) -> CalendarResult<Self> {
        config.normalize()?;
        let dir = config
            .storage_dir
            .as_ref()
            .ok_or_else(|| CalendarError::Config("No storage directory configured".into()))?;

        let storage: Arc<dyn Storage> = Arc::new(FileStorage::open(dir)?);
        let store = EventStore::open(Arc::clone(&storage), &config.storage_key)?;
        let history = SearchHistory::open(storage, SEARCH_HISTORY_KEY)?;
        Ok(Self::new(store, config.week_start)
            .with_time_format(config.time_format)
            .with_search_history(history))
    }

    /// Remembers submitted search terms in `history`.
    pub fn with_search_history(mut self, history: SearchHistory) -> Self {
        self.history = Some(history);
        self
    }

    /// Displays times of day on the `time_format` clock.
    pub fn with_time_format(mut self, time_format: TimeFormat) -> Self {
        self.time_format = time_format;
        self
    }

    /// Pins "today" and moves the view to it.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self.current_date = today;
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &EventStore {
        &self.store
    }

    /// The configured first day of the week.
    pub fn week_start(&self) -> WeekStart {
        self.week_start
    }

    /// The configured clock for times of day.
    pub fn time_format(&self) -> TimeFormat {
        self.time_format
    }

    /// Formats `time` on the configured clock.
    pub fn format_time(&self, time: NaiveTime) -> String {
        self.time_format.format(time)
    }

    /// Today's date as seen by this scheduler.
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Re-reads today's date from the local clock.
    pub fn refresh_today(&mut self) {
        self.today = Local::now().date_naive();
    }

    /// Validates, checks for conflicts and persists a new event.
    #[tracing::instrument(skip_all, fields(title = %draft.title, date = %draft.date))]
    pub fn add_event(&self, draft: EventDraft) -> CalendarResult<Outcome> {
        if let Err(e) = draft.validate() {
            tracing::warn!(err = %e, "rejected invalid event");
            return Ok(Outcome::Rejected(Rejection::Invalid(e)));
        }

        let conflicts = find_conflicts(&draft, &self.store.read_all());
        if !conflicts.is_empty() {
            tracing::warn!(count = conflicts.len(), "rejected conflicting event");
            let message = conflict_message(conflicts.len());
            return Ok(Outcome::Rejected(Rejection::Conflict { conflicts, message }));
        }

        settle(self.store.create(draft).map(Outcome::committed))
    }

    /// Merges `patch` into the event with `id` after validating and checking
    /// the merged result for conflicts.
    #[tracing::instrument(skip(self, patch))]
    pub fn update_event(&self, id: &str, patch: EventPatch) -> CalendarResult<Outcome> {
        self.patch_event(id, &patch, conflict_message)
    }

    /// Removes the event with `id`, including every occurrence of a series.
    #[tracing::instrument(skip(self))]
    pub fn delete_event(&self, id: &str) -> CalendarResult<Outcome> {
        let outcome = self.store.delete(id).map(|deleted| {
            if deleted {
                Outcome::Committed {
                    event: None,
                    message: None,
                }
            } else {
                tracing::warn!("no event to delete");
                not_found(id)
            }
        });
        settle(outcome)
    }

    /// Moves the event with `id` to `new_date`. A recurring event's whole
    /// series shifts with its anchor.
    #[tracing::instrument(skip(self))]
    pub fn move_event(&self, id: &str, new_date: NaiveDate) -> CalendarResult<Outcome> {
        let outcome = self.patch_event(id, &EventPatch::move_to(new_date), |_| {
            MOVE_CONFLICT_MESSAGE.to_string()
        })?;
        Ok(match outcome {
            Outcome::Committed { event, .. } => Outcome::Committed {
                event,
                message: Some(format!(
                    "Event moved to {}",
                    format_date(new_date, SHORT_DATE_FORMAT)
                )),
            },
            rejected => rejected,
        })
    }

    /// Removes every stored event.
    #[tracing::instrument(skip(self))]
    pub fn clear_all_events(&self) -> CalendarResult<Outcome> {
        let outcome = self.store.clear().map(|()| Outcome::Committed {
            event: None,
            message: None,
        });
        settle(outcome)
    }

    fn patch_event(
        &self,
        id: &str,
        patch: &EventPatch,
        conflict: impl FnOnce(usize) -> String,
    ) -> CalendarResult<Outcome> {
        let existing = self.store.read_all();
        let Some(mut merged) = existing.iter().find(|e| e.id == id).cloned() else {
            tracing::warn!("no event to update");
            return Ok(not_found(id));
        };
        patch.apply_to(&mut merged);

        if let Err(e) = merged.validate() {
            tracing::warn!(err = %e, "rejected invalid update");
            return Ok(Outcome::Rejected(Rejection::Invalid(e)));
        }

        let conflicts = find_conflicts(&merged, &existing);
        if !conflicts.is_empty() {
            tracing::warn!(count = conflicts.len(), "rejected conflicting update");
            let message = conflict(conflicts.len());
            return Ok(Outcome::Rejected(Rejection::Conflict { conflicts, message }));
        }

        let outcome = self.store.update(id, patch).map(|updated| match updated {
            Some(event) => Outcome::committed(event),
            None => not_found(id),
        });
        settle(outcome)
    }

    /// Every stored event, in insertion order.
    pub fn all_events(&self) -> Vec<Event> {
        self.store.read_all()
    }

    /// Occurrences in the current month that pass the search and category filters.
    pub fn events(&self) -> Vec<EventInstance> {
        let (start, end) = month_window(self.current_date);
        let needle = self.search_term.to_lowercase();
        instances_in_window(&self.store.read_all(), start, end)
            .into_iter()
            .filter(|i| needle.is_empty() || i.event.matches_search(&needle))
            .filter(|i| self.selected_category.matches(i.event.category))
            .collect()
    }

    /// Filtered occurrences on `date`, ordered by time of day. Occurrences
    /// without a time sort as midnight; ties keep their stored order.
    pub fn get_events_for_day(&self, date: NaiveDate) -> Vec<EventInstance> {
        let mut day: Vec<_> = self
            .events()
            .into_iter()
            .filter(|i| is_same_day(&i.date(), &date))
            .collect();
        day.sort_by_key(|i| i.time().unwrap_or_default());
        day
    }

    /// Whether any filtered occurrence falls on `date`.
    pub fn has_events_on_date(&self, date: NaiveDate) -> bool {
        !self.get_events_for_day(date).is_empty()
    }

    /// Counts over the stored events and the current month.
    pub fn statistics(&self) -> Statistics {
        let events = self.store.read_all();
        let (start, end) = month_window(self.current_date);

        let mut by_category = BTreeMap::new();
        for e in &events {
            *by_category.entry(e.category).or_insert(0) += 1;
        }

        Statistics {
            total: events.len(),
            this_month: instances_in_window(&events, start, end).len(),
            recurring: events.iter().filter(|e| e.is_recurring()).count(),
            by_category,
        }
    }

    /// "All" followed by each category in use, in first-seen order.
    pub fn categories(&self) -> Vec<CategoryFilter> {
        let mut categories = vec![CategoryFilter::All];
        for e in self.store.read_all() {
            let c = CategoryFilter::Only(e.category);
            if !categories.contains(&c) {
                categories.push(c);
            }
        }
        categories
    }

    /// The grid of whole weeks covering the current month.
    pub fn calendar_grid(&self) -> Vec<NaiveDate> {
        generate_calendar_grid(self.current_date, self.week_start)
    }

    /// The header for the current month, e.g. "June 2024".
    pub fn month_title(&self) -> String {
        month_title(self.current_date)
    }

    /// The reference date of the month view.
    pub fn current_date(&self) -> NaiveDate {
        self.current_date
    }

    /// Shows the next month. The day of month is clamped to the new month's length.
    pub fn go_to_next_month(&mut self) {
        if let Some(d) = self.current_date.checked_add_months(Months::new(1)) {
            self.current_date = d;
        }
    }

    /// Shows the previous month. The day of month is clamped to the new month's length.
    pub fn go_to_prev_month(&mut self) {
        if let Some(d) = self.current_date.checked_sub_months(Months::new(1)) {
            self.current_date = d;
        }
    }

    /// Shows today's month.
    pub fn go_to_today(&mut self) {
        self.current_date = self.today;
    }

    /// Shows the month of `date`.
    pub fn go_to_date(&mut self, date: NaiveDate) {
        self.current_date = date;
    }

    /// The active search term.
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// The active category filter.
    pub fn selected_category(&self) -> CategoryFilter {
        self.selected_category
    }

    /// Sets the case-insensitive search over title and description.
    pub fn handle_search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// Sets the category filter.
    pub fn handle_category_filter(&mut self, filter: impl Into<CategoryFilter>) {
        self.selected_category = filter.into();
    }

    /// Resets the search and category filters.
    pub fn clear_filters(&mut self) {
        self.search_term.clear();
        self.selected_category = CategoryFilter::All;
    }

    /// Recently submitted search terms, newest first. Empty without a history.
    pub fn search_history(&self) -> Vec<String> {
        self.history
            .as_ref()
            .map(SearchHistory::terms)
            .unwrap_or_default()
    }

    /// Records the active search term in the history. Blank terms are skipped.
    pub fn remember_search(&self) -> CalendarResult<()> {
        match &self.history {
            Some(history) => history.add(&self.search_term),
            None => Ok(()),
        }
    }

    /// Forgets every remembered search term.
    pub fn clear_search_history(&self) -> CalendarResult<()> {
        match &self.history {
            Some(history) => history.clear(),
            None => Ok(()),
        }
    }
}

fn not_found(id: &str) -> Outcome {
    Outcome::Rejected(Rejection::NotFound { id: id.to_string() })
}

/// Lets storage failures through and turns every other failure into a rejection.
fn settle(result: CalendarResult<Outcome>) -> CalendarResult<Outcome> {
    match result {
        Ok(outcome) => Ok(outcome),
        Err(e @ CalendarError::Storage(_)) => {
            tracing::error!(err = %e, "storage unavailable");
            Err(e)
        }
        Err(e) => {
            tracing::error!(err = %e, "mutation failed");
            Ok(Outcome::Rejected(Rejection::Internal {
                message: e.to_string(),
            }))
        }
    }
}
