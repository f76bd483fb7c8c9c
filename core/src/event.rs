// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::datetime::hhmm;

/// Maximum number of characters in an event title.
pub const MAX_TITLE_LEN: usize = 100;

/// Maximum number of characters in an event description.
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Anything that occupies a (date, time) slot on the calendar.
pub trait TimeSlot {
    /// Identifier of the persisted event behind this slot, if it has one yet.
    fn slot_id(&self) -> Option<&str>;

    /// The calendar date of the slot.
    fn slot_date(&self) -> NaiveDate;

    /// The time of day of the slot, if set.
    fn slot_time(&self) -> Option<NaiveTime>;
}

/// A persisted, user-authored event definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Unique identifier, assigned by the store at creation.
    pub id: String,

    /// Title of the event.
    pub title: String,

    /// Anchor date: the only date of a one-off event, the first occurrence of a recurring one.
    pub date: NaiveDate,

    /// Time of day on a 24-hour clock.
    #[serde(default, with = "hhmm")]
    pub time: Option<NaiveTime>,

    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,

    /// Category label.
    #[serde(default)]
    pub category: Category,

    /// Recurrence kind.
    #[serde(default)]
    pub recurrence: Recurrence,

    /// Step count for [`Recurrence::Custom`], ignored otherwise.
    #[serde(default)]
    pub custom_interval: Option<u32>,

    /// Step unit for [`Recurrence::Custom`], ignored otherwise.
    #[serde(default)]
    pub custom_unit: Option<CustomUnit>,

    /// When the store created the event.
    pub created_at: DateTime<Utc>,

    /// When the store last modified the event.
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Whether the event repeats.
    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_recurring()
    }

    /// Checks the user-authored fields of the event.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(Fields {
            title: &self.title,
            time: self.time,
            description: self.description.as_deref(),
            recurrence: self.recurrence,
            custom_interval: self.custom_interval,
            custom_unit: self.custom_unit,
        })
    }

    /// Case-insensitive substring match against the title or description.
    /// The needle must already be lowercase.
    pub(crate) fn matches_search(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle))
    }
}

impl TimeSlot for Event {
    fn slot_id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn slot_date(&self) -> NaiveDate {
        self.date
    }

    fn slot_time(&self) -> Option<NaiveTime> {
        self.time
    }
}

/// Draft for an event, used for creating new events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    /// The title of the event.
    pub title: String,

    /// The anchor date.
    pub date: NaiveDate,

    /// The time of day. Required by validation.
    pub time: Option<NaiveTime>,

    /// The description of the event, if available.
    pub description: Option<String>,

    /// The category of the event.
    pub category: Category,

    /// The recurrence kind.
    pub recurrence: Recurrence,

    /// Step count for custom recurrence.
    pub custom_interval: Option<u32>,

    /// Step unit for custom recurrence.
    pub custom_unit: Option<CustomUnit>,
}

impl EventDraft {
    /// Creates a draft with the default form values: 09:00, category other, no recurrence.
    pub fn new(title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            date,
            time: NaiveTime::from_hms_opt(9, 0, 0),
            description: None,
            category: Category::default(),
            recurrence: Recurrence::default(),
            custom_interval: Some(1),
            custom_unit: Some(CustomUnit::default()),
        }
    }

    /// Checks the draft before it reaches the store.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(Fields {
            title: &self.title,
            time: self.time,
            description: self.description.as_deref(),
            recurrence: self.recurrence,
            custom_interval: self.custom_interval,
            custom_unit: self.custom_unit,
        })
    }

    /// Converts the draft into a stored event.
    pub(crate) fn into_event(self, id: String, now: DateTime<Utc>) -> Event {
        Event {
            id,
            title: self.title,
            date: self.date,
            time: self.time,
            description: self.description,
            category: self.category,
            recurrence: self.recurrence,
            custom_interval: self.custom_interval,
            custom_unit: self.custom_unit,
            created_at: now,
            updated_at: now,
        }
    }
}

impl TimeSlot for EventDraft {
    fn slot_id(&self) -> Option<&str> {
        None
    }

    fn slot_date(&self) -> NaiveDate {
        self.date
    }

    fn slot_time(&self) -> Option<NaiveTime> {
        self.time
    }
}

/// Patch for an event, allowing partial updates.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EventPatch {
    /// The title of the event, if changed.
    pub title: Option<String>,

    /// The anchor date, if changed.
    pub date: Option<NaiveDate>,

    /// The time of day, if changed.
    pub time: Option<Option<NaiveTime>>,

    /// The description, if changed.
    pub description: Option<Option<String>>,

    /// The category, if changed.
    pub category: Option<Category>,

    /// The recurrence kind, if changed.
    pub recurrence: Option<Recurrence>,

    /// The custom step count, if changed.
    pub custom_interval: Option<Option<u32>>,

    /// The custom step unit, if changed.
    pub custom_unit: Option<Option<CustomUnit>>,
}

impl EventPatch {
    /// A patch that only moves the anchor date.
    pub fn move_to(date: NaiveDate) -> Self {
        Self {
            date: Some(date),
            ..Default::default()
        }
    }

    /// Is this patch empty, meaning no fields are set
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.date.is_none()
            && self.time.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.recurrence.is_none()
            && self.custom_interval.is_none()
            && self.custom_unit.is_none()
    }

    /// Applies the patch to an event, modifying it in place. Timestamps are untouched.
    pub(crate) fn apply_to<'a>(&self, e: &'a mut Event) -> &'a mut Event {
        if let Some(title) = &self.title {
            e.title.clone_from(title);
        }
        if let Some(date) = self.date {
            e.date = date;
        }
        if let Some(time) = self.time {
            e.time = time;
        }
        if let Some(description) = &self.description {
            e.description.clone_from(description);
        }
        if let Some(category) = self.category {
            e.category = category;
        }
        if let Some(recurrence) = self.recurrence {
            e.recurrence = recurrence;
        }
        if let Some(interval) = self.custom_interval {
            e.custom_interval = interval;
        }
        if let Some(unit) = self.custom_unit {
            e.custom_unit = unit;
        }
        e
    }
}

/// A concrete occurrence of an [`Event`] on one date.
///
/// Instances are derived per query and never persisted; edits always target
/// the source event through [`EventInstance::source_id`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInstance {
    /// The source event with `date` replaced by the occurrence date.
    #[serde(flatten)]
    pub event: Event,

    /// Whether the occurrence was produced by a recurrence rule.
    pub is_recurring: bool,

    /// The source event id, set for recurring occurrences.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_id: Option<String>,
}

impl EventInstance {
    /// An occurrence of a one-off event on its anchor date.
    pub fn single(event: Event) -> Self {
        Self {
            event,
            is_recurring: false,
            original_id: None,
        }
    }

    /// An occurrence of a recurring event on `date`.
    pub fn occurrence(source: &Event, date: NaiveDate) -> Self {
        let mut event = source.clone();
        event.date = date;
        Self {
            event,
            is_recurring: true,
            original_id: Some(source.id.clone()),
        }
    }

    /// Identifier of the persisted event this occurrence came from.
    pub fn source_id(&self) -> &str {
        self.original_id.as_deref().unwrap_or(&self.event.id)
    }

    /// The occurrence date.
    pub fn date(&self) -> NaiveDate {
        self.event.date
    }

    /// The occurrence time of day.
    pub fn time(&self) -> Option<NaiveTime> {
        self.event.time
    }
}

impl TimeSlot for EventInstance {
    fn slot_id(&self) -> Option<&str> {
        Some(self.source_id())
    }

    fn slot_date(&self) -> NaiveDate {
        self.event.date
    }

    fn slot_time(&self) -> Option<NaiveTime> {
        self.event.time
    }
}

/// Why a draft or patched event was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// The title is empty or whitespace.
    EmptyTitle,

    /// The title is longer than [`MAX_TITLE_LEN`] characters.
    TitleTooLong,

    /// The description is longer than [`MAX_DESCRIPTION_LEN`] characters.
    DescriptionTooLong,

    /// No time of day was given.
    MissingTime,

    /// Custom recurrence without an interval of at least 1.
    InvalidCustomInterval,

    /// Custom recurrence without a unit.
    MissingCustomUnit,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "Title is required"),
            Self::TitleTooLong => write!(f, "Title must be at most {MAX_TITLE_LEN} characters"),
            Self::DescriptionTooLong => {
                write!(f, "Description must be at most {MAX_DESCRIPTION_LEN} characters")
            }
            Self::MissingTime => write!(f, "Time is required"),
            Self::InvalidCustomInterval => write!(f, "Interval must be at least 1"),
            Self::MissingCustomUnit => write!(f, "Unit is required for custom recurrence"),
        }
    }
}

impl std::error::Error for ValidationError {}

struct Fields<'a> {
    title: &'a str,
    time: Option<NaiveTime>,
    description: Option<&'a str>,
    recurrence: Recurrence,
    custom_interval: Option<u32>,
    custom_unit: Option<CustomUnit>,
}

fn validate_fields(fields: Fields<'_>) -> Result<(), ValidationError> {
    if fields.title.trim().is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    if fields.title.chars().count() > MAX_TITLE_LEN {
        return Err(ValidationError::TitleTooLong);
    }
    if fields
        .description
        .is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LEN)
    {
        return Err(ValidationError::DescriptionTooLong);
    }
    if fields.time.is_none() {
        return Err(ValidationError::MissingTime);
    }
    if fields.recurrence == Recurrence::Custom {
        if !fields.custom_interval.is_some_and(|n| n >= 1) {
            return Err(ValidationError::InvalidCustomInterval);
        }
        if fields.custom_unit.is_none() {
            return Err(ValidationError::MissingCustomUnit);
        }
    }
    Ok(())
}

/// The category of an event.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Category {
    /// Work.
    Work,

    /// Personal.
    Personal,

    /// Meeting.
    Meeting,

    /// Deadline.
    Deadline,

    /// Anything else.
    #[default]
    Other,
}

const CATEGORY_WORK: &str = "work";
const CATEGORY_PERSONAL: &str = "personal";
const CATEGORY_MEETING: &str = "meeting";
const CATEGORY_DEADLINE: &str = "deadline";
const CATEGORY_OTHER: &str = "other";

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 5] = [
        Category::Work,
        Category::Personal,
        Category::Meeting,
        Category::Deadline,
        Category::Other,
    ];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Work => "Work",
            Category::Personal => "Personal",
            Category::Meeting => "Meeting",
            Category::Deadline => "Deadline",
            Category::Other => "Other",
        }
    }
}

impl AsRef<str> for Category {
    fn as_ref(&self) -> &str {
        match self {
            Category::Work => CATEGORY_WORK,
            Category::Personal => CATEGORY_PERSONAL,
            Category::Meeting => CATEGORY_MEETING,
            Category::Deadline => CATEGORY_DEADLINE,
            Category::Other => CATEGORY_OTHER,
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl FromStr for Category {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            CATEGORY_WORK => Ok(Category::Work),
            CATEGORY_PERSONAL => Ok(Category::Personal),
            CATEGORY_MEETING => Ok(Category::Meeting),
            CATEGORY_DEADLINE => Ok(Category::Deadline),
            CATEGORY_OTHER => Ok(Category::Other),
            _ => Err(()),
        }
    }
}

/// How an event repeats.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum Recurrence {
    /// The event happens once.
    #[default]
    None,

    /// Every day.
    Daily,

    /// Every week.
    Weekly,

    /// Every month, on the anchor's day of month.
    Monthly,

    /// Every year.
    Yearly,

    /// Every `custom_interval` `custom_unit`s.
    Custom,
}

const RECURRENCE_NONE: &str = "none";
const RECURRENCE_DAILY: &str = "daily";
const RECURRENCE_WEEKLY: &str = "weekly";
const RECURRENCE_MONTHLY: &str = "monthly";
const RECURRENCE_YEARLY: &str = "yearly";
const RECURRENCE_CUSTOM: &str = "custom";

impl Recurrence {
    /// Whether this kind produces more than the anchor occurrence.
    pub fn is_recurring(&self) -> bool {
        *self != Recurrence::None
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Recurrence::None => "No recurrence",
            Recurrence::Daily => "Daily",
            Recurrence::Weekly => "Weekly",
            Recurrence::Monthly => "Monthly",
            Recurrence::Yearly => "Yearly",
            Recurrence::Custom => "Custom",
        }
    }
}

impl AsRef<str> for Recurrence {
    fn as_ref(&self) -> &str {
        match self {
            Recurrence::None => RECURRENCE_NONE,
            Recurrence::Daily => RECURRENCE_DAILY,
            Recurrence::Weekly => RECURRENCE_WEEKLY,
            Recurrence::Monthly => RECURRENCE_MONTHLY,
            Recurrence::Yearly => RECURRENCE_YEARLY,
            Recurrence::Custom => RECURRENCE_CUSTOM,
        }
    }
}

impl Display for Recurrence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}

impl FromStr for Recurrence {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            RECURRENCE_NONE => Ok(Recurrence::None),
            RECURRENCE_DAILY => Ok(Recurrence::Daily),
            RECURRENCE_WEEKLY => Ok(Recurrence::Weekly),
            RECURRENCE_MONTHLY => Ok(Recurrence::Monthly),
            RECURRENCE_YEARLY => Ok(Recurrence::Yearly),
            RECURRENCE_CUSTOM => Ok(Recurrence::Custom),
            _ => Err(()),
        }
    }
}

/// Unit of a custom recurrence step.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum CustomUnit {
    /// Days.
    #[default]
    Days,

    /// Weeks.
    Weeks,

    /// Months.
    Months,
}

impl CustomUnit {
    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            CustomUnit::Days => "Days",
            CustomUnit::Weeks => "Weeks",
            CustomUnit::Months => "Months",
        }
    }
}

impl AsRef<str> for CustomUnit {
    fn as_ref(&self) -> &str {
        match self {
            CustomUnit::Days => "days",
            CustomUnit::Weeks => "weeks",
            CustomUnit::Months => "months",
        }
    }
}

impl Display for CustomUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}
