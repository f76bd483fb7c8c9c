// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

/// The first day of a displayed week.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum WeekStart {
    /// Weeks run Sunday through Saturday.
    #[default]
    Sunday,

    /// Weeks run Monday through Sunday.
    Monday,
}

impl WeekStart {
    /// The weekday a week begins on.
    pub fn weekday(self) -> Weekday {
        match self {
            WeekStart::Sunday => Weekday::Sun,
            WeekStart::Monday => Weekday::Mon,
        }
    }

    /// Number of days between the start of the week and `date`, in `0..7`.
    pub(crate) fn offset_of(self, date: NaiveDate) -> u32 {
        let start = self.weekday().num_days_from_monday();
        (date.weekday().num_days_from_monday() + 7 - start) % 7
    }

    /// The first day of the week containing `date`.
    pub fn start_of_week(self, date: NaiveDate) -> NaiveDate {
        date.checked_sub_days(Days::new(self.offset_of(date).into()))
            .unwrap_or(NaiveDate::MIN)
    }

    /// The last day of the week containing `date`.
    pub fn end_of_week(self, date: NaiveDate) -> NaiveDate {
        date.checked_add_days(Days::new((6 - self.offset_of(date)).into()))
            .unwrap_or(NaiveDate::MAX)
    }
}

/// The first and last day of the month containing `date`.
pub fn month_window(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = date.with_day(1).unwrap_or(date);
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .unwrap_or(NaiveDate::MAX);
    (first, last)
}

/// Generates every date shown on the month grid for `reference`'s month.
///
/// The grid starts on the first day of the week containing the 1st of the
/// month and ends on the last day of the week containing the month's last
/// day, so it always spans whole weeks (28 to 42 dates).
pub fn generate_calendar_grid(reference: NaiveDate, week_start: WeekStart) -> Vec<NaiveDate> {
    let (month_start, month_end) = month_window(reference);
    let grid_start = week_start.start_of_week(month_start);
    let grid_end = week_start.end_of_week(month_end);

    grid_start
        .iter_days()
        .take_while(|d| *d <= grid_end)
        .collect()
}

/// Whether `date` falls in the same month and year as `reference`.
pub fn is_current_month(date: &impl Datelike, reference: &impl Datelike) -> bool {
    date.year() == reference.year() && date.month() == reference.month()
}

/// Whether `date` is `today`, comparing calendar components only.
pub fn is_today(date: &impl Datelike, today: NaiveDate) -> bool {
    is_same_day(date, &today)
}

/// Whether two values fall on the same calendar day, ignoring time of day.
pub fn is_same_day(a: &impl Datelike, b: &impl Datelike) -> bool {
    a.year() == b.year() && a.ordinal() == b.ordinal()
}
