// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt::Write;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::datetime::WeekStart;

/// NOTE: Used for the persisted snapshot, so it should be stable across different runs.
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
pub(crate) const STABLE_FORMAT_TIME: &str = "%H:%M";

/// Month header, e.g. "June 2024".
pub const MONTH_TITLE_FORMAT: &str = "%B %Y";

/// Compact human date, e.g. "Jun 15, 2024".
pub const SHORT_DATE_FORMAT: &str = "%b %-d, %Y";

const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Formats `date` with a strftime-style `pattern`.
///
/// An unsupported pattern yields an empty string rather than panicking.
pub fn format_date(date: NaiveDate, pattern: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", date.format(pattern)).is_err() {
        tracing::warn!(pattern, "unsupported date format pattern");
        out.clear();
    }
    out
}

/// How times of day are displayed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum TimeFormat {
    /// "9:05 AM"
    #[default]
    #[serde(rename = "12h")]
    #[cfg_attr(feature = "clap", value(name = "12h"))]
    TwelveHour,

    /// "09:05"
    #[serde(rename = "24h")]
    #[cfg_attr(feature = "clap", value(name = "24h"))]
    TwentyFourHour,
}

impl TimeFormat {
    /// Formats `time` on this clock.
    pub fn format(self, time: NaiveTime) -> String {
        let pattern = match self {
            TimeFormat::TwelveHour => "%-I:%M %p",
            TimeFormat::TwentyFourHour => STABLE_FORMAT_TIME,
        };
        time.format(pattern).to_string()
    }
}

/// Formats a time of day for display on a 12-hour clock, e.g. "9:05 AM".
pub fn format_time(time: NaiveTime) -> String {
    TimeFormat::TwelveHour.format(time)
}

/// Parses an "HH:MM" time of day.
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), STABLE_FORMAT_TIME).ok()
}

/// The month header for `date`, e.g. "June 2024".
pub fn month_title(date: NaiveDate) -> String {
    format_date(date, MONTH_TITLE_FORMAT)
}

/// Short weekday name for the `index`-th column of a grid starting on `week_start`.
pub fn day_name(index: usize, week_start: WeekStart) -> &'static str {
    let shift = match week_start {
        WeekStart::Sunday => 0,
        WeekStart::Monday => 1,
    };
    DAY_NAMES[(index + shift) % DAY_NAMES.len()]
}

/// Joins a calendar date and a time of day; a missing time means midnight.
pub fn combine_date_and_time(date: NaiveDate, time: Option<NaiveTime>) -> NaiveDateTime {
    date.and_time(time.unwrap_or_default())
}

/// Serde adapter storing an optional time of day as "HH:MM".
pub(crate) mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de};

    use super::{STABLE_FORMAT_TIME, parse_time};

    pub fn serialize<S>(time: &Option<NaiveTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match time {
            Some(t) => serializer.serialize_str(&t.format(STABLE_FORMAT_TIME).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) if !s.trim().is_empty() => parse_time(&s)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid time of day: {s}"))),
            _ => Ok(None),
        }
    }
}
