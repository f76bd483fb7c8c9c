// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

mod format;
mod grid;

pub use format::{
    DEFAULT_DATE_FORMAT, MONTH_TITLE_FORMAT, SHORT_DATE_FORMAT, TimeFormat, combine_date_and_time,
    day_name, format_date, format_time, month_title, parse_time,
};
pub use grid::{
    WeekStart, generate_calendar_grid, is_current_month, is_same_day, is_today, month_window,
};
pub(crate) use format::hhmm;
