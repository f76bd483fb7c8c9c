// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Expansion of recurring events into concrete occurrence dates.

use chrono::{Days, Months, NaiveDate};

use crate::event::{CustomUnit, Event, EventInstance, Recurrence};

/// Upper bound on expansion steps per event, counted from the anchor date.
///
/// Hitting the cap ends expansion silently.
pub const MAX_ITERATIONS: u32 = 365;

/// The distance between two consecutive occurrences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A fixed number of days.
    Days(u32),

    /// A number of calendar months, clamped to the month's last day.
    Months(u32),
}

impl Step {
    /// The step of `event`'s rule, or `None` when the event does not repeat
    /// (including a custom rule without a valid interval and unit).
    pub fn of(event: &Event) -> Option<Self> {
        match event.recurrence {
            Recurrence::None => None,
            Recurrence::Daily => Some(Step::Days(1)),
            Recurrence::Weekly => Some(Step::Days(7)),
            Recurrence::Monthly => Some(Step::Months(1)),
            Recurrence::Yearly => Some(Step::Months(12)),
            Recurrence::Custom => {
                let interval = event.custom_interval.filter(|n| *n >= 1)?;
                match event.custom_unit? {
                    CustomUnit::Days => Some(Step::Days(interval)),
                    CustomUnit::Weeks => interval.checked_mul(7).map(Step::Days),
                    CustomUnit::Months => Some(Step::Months(interval)),
                }
            }
        }
    }

    /// The occurrence following `cursor`. Month steps clamp to the last day
    /// of a shorter month, and later steps continue from the clamped date.
    pub fn advance(self, cursor: NaiveDate) -> Option<NaiveDate> {
        match self {
            Step::Days(d) => cursor.checked_add_days(Days::new(u64::from(d))),
            Step::Months(m) => cursor.checked_add_months(Months::new(m)),
        }
    }
}

/// Occurrence dates of `event` within `[window_start, window_end]`, in
/// chronological order.
///
/// A non-repeating event yields its anchor date if it lies in the window.
pub fn expand(event: &Event, window_start: NaiveDate, window_end: NaiveDate) -> Vec<NaiveDate> {
    let anchor = event.date;
    let Some(step) = Step::of(event) else {
        return if (window_start..=window_end).contains(&anchor) {
            vec![anchor]
        } else {
            Vec::new()
        };
    };

    let mut dates = Vec::new();
    let mut cursor = anchor;
    for n in 0..MAX_ITERATIONS {
        if cursor > window_end {
            break;
        }
        if cursor >= window_start {
            dates.push(cursor);
        }
        match step.advance(cursor) {
            Some(next) => cursor = next,
            None => {
                tracing::debug!(id = %event.id, n, "recurrence left the representable date range");
                break;
            }
        }
    }
    dates
}

/// Projects stored events onto the window as occurrences.
///
/// Repeating events go through [`expand`]; one-off events pass through when
/// their anchor lies in the window.
pub fn instances_in_window(
    events: &[Event],
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> Vec<EventInstance> {
    let mut instances = Vec::new();
    for event in events {
        if event.is_recurring() {
            instances.extend(
                expand(event, window_start, window_end)
                    .into_iter()
                    .map(|date| EventInstance::occurrence(event, date)),
            );
        } else if (window_start..=window_end).contains(&event.date) {
            instances.push(EventInstance::single(event.clone()));
        }
    }
    instances
}
