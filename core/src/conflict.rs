// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use crate::event::{Event, TimeSlot};

/// Existing events that occupy exactly the same (date, time) slot as `candidate`.
///
/// The event sharing `candidate`'s id is skipped so an update can be checked
/// against the collection it already belongs to. Times are compared for
/// equality only; events have no duration, so overlap is never considered.
/// Recurring events are compared at their anchor slot.
pub fn find_conflicts(candidate: &impl TimeSlot, existing: &[Event]) -> Vec<Event> {
    let id = candidate.slot_id();
    let date = candidate.slot_date();
    let time = candidate.slot_time();

    existing
        .iter()
        .filter(|e| id != Some(e.id.as_str()))
        .filter(|e| e.date == date && e.time == time)
        .cloned()
        .collect()
}

/// Human-readable summary of a conflict set.
pub fn conflict_message(count: usize) -> String {
    format!("Conflict detected with {count} existing event(s)")
}
