// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Custom assertion helpers for integration tests.
//!
//! This module provides specialized assertion functions for validating
//! events, scheduling outcomes, and file system state.

use std::path::Path;

use gridcal_core::{Event, EventDraft, Outcome, Rejection};

/// Asserts that a stored event carries every user field of `draft`.
///
/// # Panics
///
/// Panics if any field doesn't match the expected value.
pub fn assert_event_matches_draft(event: &Event, draft: &EventDraft) {
    assert_eq!(event.title, draft.title, "Title mismatch");
    assert_eq!(event.date, draft.date, "Date mismatch");
    assert_eq!(event.time, draft.time, "Time mismatch");
    assert_eq!(event.description, draft.description, "Description mismatch");
    assert_eq!(event.category, draft.category, "Category mismatch");
    assert_eq!(event.recurrence, draft.recurrence, "Recurrence mismatch");
    assert_eq!(
        event.custom_interval, draft.custom_interval,
        "Custom interval mismatch"
    );
    assert_eq!(event.custom_unit, draft.custom_unit, "Custom unit mismatch");
}

/// Asserts that `outcome` committed and returns the affected event.
///
/// # Panics
///
/// Panics if the outcome was rejected or carries no event.
#[allow(dead_code)]
pub fn assert_committed(outcome: &Outcome) -> Event {
    match outcome {
        Outcome::Committed {
            event: Some(event), ..
        } => event.clone(),
        other => panic!("Expected a committed event, got {other:?}"),
    }
}

/// Asserts that `outcome` is a conflict against exactly `ids`.
///
/// # Panics
///
/// Panics if the outcome is not a conflict or the conflicting ids differ.
#[allow(dead_code)]
pub fn assert_conflict_with(outcome: &Outcome, ids: &[&str]) {
    match outcome {
        Outcome::Rejected(Rejection::Conflict { conflicts, .. }) => {
            let actual: Vec<&str> = conflicts.iter().map(|e| e.id.as_str()).collect();
            assert_eq!(actual, ids, "Conflicting ids mismatch");
        }
        other => panic!("Expected a conflict, got {other:?}"),
    }
}

/// Asserts that a file exists at the given path.
///
/// # Panics
///
/// Panics if the file doesn't exist.
pub fn assert_file_exists<P: AsRef<Path>>(path: P) {
    let path = path.as_ref();
    assert!(path.exists(), "File does not exist: {}", path.display());
}

/// Asserts that a file does NOT exist at the given path.
///
/// # Panics
///
/// Panics if the file exists.
#[allow(dead_code)]
pub fn assert_file_not_exists<P: AsRef<Path>>(path: P) {
    let path = path.as_ref();
    assert!(!path.exists(), "File should not exist: {}", path.display());
}

/// Asserts that a collection has the expected length.
///
/// # Panics
///
/// Panics if the length doesn't match.
#[allow(dead_code)]
pub fn assert_len<T>(collection: &[T], expected_len: usize) {
    assert_eq!(
        collection.len(),
        expected_len,
        "Expected {} items, got {}",
        expected_len,
        collection.len()
    );
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, NaiveDate, Utc};
    use gridcal_core::{Category, Recurrence};

    use super::*;

    fn sample_event(title: &str) -> Event {
        let epoch: DateTime<Utc> = DateTime::from_timestamp(0, 0).unwrap();
        let draft = EventDraft::new(title, NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
        Event {
            id: "evt-1".to_string(),
            title: draft.title,
            date: draft.date,
            time: draft.time,
            description: draft.description,
            category: draft.category,
            recurrence: draft.recurrence,
            custom_interval: draft.custom_interval,
            custom_unit: draft.custom_unit,
            created_at: epoch,
            updated_at: epoch,
        }
    }

    #[test]
    fn test_assert_event_matches_draft() {
        let draft = EventDraft::new("Meeting", NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
        assert_event_matches_draft(&sample_event("Meeting"), &draft);
    }

    #[test]
    #[should_panic(expected = "Category mismatch")]
    fn test_assert_event_matches_draft_panics_on_mismatch() {
        let mut draft = EventDraft::new("Meeting", NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
        draft.category = Category::Work;
        assert_event_matches_draft(&sample_event("Meeting"), &draft);
    }

    #[test]
    fn test_assert_committed_returns_event() {
        let outcome = Outcome::Committed {
            event: Some(sample_event("Meeting")),
            message: None,
        };
        assert_eq!(assert_committed(&outcome).title, "Meeting");
    }

    #[test]
    #[should_panic(expected = "Expected a committed event")]
    fn test_assert_committed_panics_on_rejection() {
        let outcome = Outcome::Rejected(Rejection::NotFound {
            id: "x".to_string(),
        });
        assert_committed(&outcome);
    }

    #[test]
    fn test_assert_conflict_with() {
        let mut existing = sample_event("Standup");
        existing.recurrence = Recurrence::Daily;
        let outcome = Outcome::Rejected(Rejection::Conflict {
            conflicts: vec![existing],
            message: "Conflict detected with 1 existing event(s)".to_string(),
        });
        assert_conflict_with(&outcome, &["evt-1"]);
    }

    #[test]
    fn test_assert_file_exists_with_existing_file() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        assert_file_exists(temp.path());
    }

    #[test]
    #[should_panic(expected = "File does not exist")]
    fn test_assert_file_exists_panics_on_missing_file() {
        assert_file_exists("/nonexistent/path/that/does/not/exist.txt");
    }

    #[test]
    #[should_panic(expected = "File should not exist")]
    fn test_assert_file_not_exists_panics_on_existing_file() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        assert_file_not_exists(temp.path());
    }

    #[test]
    #[should_panic(expected = "Expected 10 items, got 5")]
    fn test_assert_len_panics_on_mismatch() {
        let items = vec![1, 2, 3, 4, 5];
        assert_len(&items, 10);
    }
}
