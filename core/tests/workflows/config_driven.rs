// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Configuration-driven behavior workflow tests.
//!
//! These tests validate how configuration affects the scheduler, including
//! the storage slot, the first day of the week, and config file loading.

use gridcal_core::{
    CalendarError, Config, SEARCH_HISTORY_KEY, Scheduler, TimeFormat, WeekStart, day_name,
};

use crate::common::{
    TestConfigBuilder, assert_file_exists, assert_file_not_exists, date, open_scheduler,
    setup_temp_dirs, test_event_draft, time,
};

#[test]
fn config_storage_key_selects_slot() {
    // Arrange
    let temp_dirs = setup_temp_dirs().unwrap();
    let config = TestConfigBuilder::new()
        .with_storage_dir(&temp_dirs.storage_dir)
        .with_storage_key("team-events")
        .build();
    let scheduler = open_scheduler(config);

    // Act
    scheduler.add_event(test_event_draft("Retro")).unwrap();

    // Assert
    assert_file_exists(temp_dirs.slot_path("team-events"));
    assert_file_not_exists(temp_dirs.slot_path("calendar-events"));

    // Assert - a scheduler on the default slot sees nothing
    let other = open_scheduler(
        TestConfigBuilder::new()
            .with_storage_dir(&temp_dirs.storage_dir)
            .build(),
    );
    assert!(other.all_events().is_empty());
}

#[test]
fn config_week_start_shapes_grid() {
    // Arrange
    let temp_dirs = setup_temp_dirs().unwrap();
    let config = TestConfigBuilder::new()
        .with_storage_dir(&temp_dirs.storage_dir)
        .with_week_start(WeekStart::Monday)
        .build();

    // Act
    let scheduler = open_scheduler(config);
    let grid = scheduler.calendar_grid();

    // Assert
    assert_eq!(scheduler.week_start(), WeekStart::Monday);
    assert_eq!(grid.len(), 35);
    assert_eq!(grid[0], date(2024, 5, 27));
    assert_eq!(grid[34], date(2024, 6, 30));
    assert_eq!(day_name(0, scheduler.week_start()), "Mon");
}

#[test]
fn config_file_drives_scheduler() {
    // Arrange
    let temp_dirs = setup_temp_dirs().unwrap();
    let content = format!(
        "storage_dir = {:?}\nstorage_key = \"from-file\"\nweek_start = \"monday\"\n",
        temp_dirs.storage_dir.display().to_string()
    );
    let path = temp_dirs.write_config(&content).unwrap();

    // Act
    let config = Config::load(Some(path)).unwrap();
    let scheduler = open_scheduler(config);
    scheduler.add_event(test_event_draft("Configured")).unwrap();

    // Assert
    assert_eq!(scheduler.week_start(), WeekStart::Monday);
    assert_file_exists(temp_dirs.slot_path("from-file"));
}

#[test]
fn config_missing_storage_dir_is_created() {
    // Arrange
    let temp_dirs = setup_temp_dirs().unwrap();
    let nested = temp_dirs.storage_dir.join("deep").join("er");
    let config = TestConfigBuilder::new().with_storage_dir(&nested).build();

    // Act
    let scheduler = open_scheduler(config);
    scheduler.add_event(test_event_draft("Nested")).unwrap();

    // Assert
    assert_file_exists(nested.join("calendar-events.json"));
}

#[test]
fn config_invalid_values_fail_to_open() {
    // Arrange
    let temp_dirs = setup_temp_dirs().unwrap();
    let blank_key = TestConfigBuilder::new()
        .with_storage_dir(&temp_dirs.storage_dir)
        .with_storage_key("")
        .build();
    let bad_key = TestConfigBuilder::new()
        .with_storage_dir(&temp_dirs.storage_dir)
        .with_storage_key("../escape")
        .build();

    // Act & Assert
    assert!(matches!(
        Scheduler::open(blank_key),
        Err(CalendarError::Config(_))
    ));
    assert!(matches!(
        Scheduler::open(bad_key),
        Err(CalendarError::Storage(_))
    ));
}

#[test]
fn config_malformed_file_is_config_error() {
    // Arrange
    let temp_dirs = setup_temp_dirs().unwrap();
    let path = temp_dirs.write_config("week_start = 7").unwrap();

    // Act
    let result = Config::load(Some(path));

    // Assert
    assert!(matches!(result, Err(CalendarError::Config(_))));
}

#[test]
fn config_open_tolerates_undecodable_snapshot() {
    // Arrange
    let temp_dirs = setup_temp_dirs().unwrap();
    std::fs::write(
        temp_dirs.slot_path("calendar-events"),
        [0xff, 0xfe, b'[', b']'],
    )
    .unwrap();

    // Act
    let scheduler = Scheduler::open(
        TestConfigBuilder::new()
            .with_storage_dir(&temp_dirs.storage_dir)
            .build(),
    )
    .unwrap();

    // Assert - empty, and the next write replaces the bad bytes
    assert!(scheduler.all_events().is_empty());
    scheduler.add_event(test_event_draft("Fresh")).unwrap();
    let raw = std::fs::read_to_string(temp_dirs.slot_path("calendar-events")).unwrap();
    assert!(raw.contains("Fresh"));
}

#[test]
fn config_search_history_persists_next_to_events() {
    // Arrange
    let temp_dirs = setup_temp_dirs().unwrap();
    let config = TestConfigBuilder::new()
        .with_storage_dir(&temp_dirs.storage_dir)
        .build();

    // Act
    {
        let mut scheduler = open_scheduler(config.clone());
        scheduler.handle_search("standup");
        scheduler.remember_search().unwrap();
        scheduler.handle_search("retro");
        scheduler.remember_search().unwrap();
    }

    // Assert
    assert_file_exists(temp_dirs.slot_path(SEARCH_HISTORY_KEY));
    let reopened = open_scheduler(config);
    assert_eq!(reopened.search_history(), vec!["retro", "standup"]);
}

#[test]
fn config_time_format_drives_display() {
    // Arrange
    let temp_dirs = setup_temp_dirs().unwrap();
    let content = format!(
        "storage_dir = {:?}\ntime_format = \"24h\"\n",
        temp_dirs.storage_dir.display().to_string()
    );
    let path = temp_dirs.write_config(&content).unwrap();

    // Act
    let scheduler = open_scheduler(Config::load(Some(path)).unwrap());

    // Assert
    assert_eq!(scheduler.time_format(), TimeFormat::TwentyFourHour);
    assert_eq!(scheduler.format_time(time(9, 5)), "09:05");
}
