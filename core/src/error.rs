// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

/// Errors raised by the calendar core.
///
/// Expected scheduling outcomes (conflicts, unknown ids, invalid drafts) are
/// not errors; see [`crate::Outcome`].
#[non_exhaustive]
#[derive(Debug)]
pub enum CalendarError {
    /// The persistent medium could not be read or written.
    Storage(String),

    /// A snapshot could not be encoded.
    Serialization(String),

    /// Configuration error.
    Config(String),

    /// No unused event id could be generated.
    IdGeneration(String),
}

impl fmt::Display for CalendarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "Storage error: {e}"),
            Self::Serialization(e) => write!(f, "Serialization error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::IdGeneration(e) => write!(f, "Id generation error: {e}"),
        }
    }
}

impl std::error::Error for CalendarError {}

impl From<std::io::Error> for CalendarError {
    fn from(e: std::io::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for CalendarError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for CalendarError {
    fn from(e: toml::de::Error) -> Self {
        Self::Config(e.to_string())
    }
}

/// Result type alias for calendar operations.
pub type CalendarResult<T> = Result<T, CalendarError>;
