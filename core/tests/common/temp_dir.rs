// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Temporary directory management for integration tests.
//!
//! This module provides utilities for creating and managing temporary
//! directories with automatic cleanup on drop.

use std::path::PathBuf;

/// Temporary directories used for testing.
///
/// Automatically cleans up all created directories when dropped.
#[derive(Debug)]
pub struct TempDirs {
    /// Directory backing the file storage.
    pub storage_dir: PathBuf,
    /// Directory for config files.
    pub config_dir: PathBuf,
}

impl TempDirs {
    /// Creates new temporary directories for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let base = tempfile::tempdir()?.keep();

        let storage_dir = base.join("storage");
        let config_dir = base.join("config");

        std::fs::create_dir_all(&storage_dir)?;
        std::fs::create_dir_all(&config_dir)?;

        Ok(Self {
            storage_dir,
            config_dir,
        })
    }

    /// Gets the base temporary directory.
    #[must_use]
    pub fn base(&self) -> PathBuf {
        // storage_dir and config_dir share the same parent (base)
        self.storage_dir
            .parent()
            .expect("temp directories should have a parent")
            .to_path_buf()
    }

    /// Writes a config file into the config directory.
    ///
    /// # Errors
    ///
    /// Returns an error if file writing fails.
    #[allow(dead_code)]
    pub fn write_config(&self, content: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let path = self.config_dir.join("config.toml");
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Path of the file backing a storage slot.
    #[allow(dead_code)]
    #[must_use]
    pub fn slot_path(&self, key: &str) -> PathBuf {
        self.storage_dir.join(format!("{key}.json"))
    }
}

/// Sets up temporary directories for integration tests.
///
/// This is a convenience wrapper around [`TempDirs::new`].
///
/// # Errors
///
/// Returns an error if directory creation fails.
pub fn setup_temp_dirs() -> Result<TempDirs, Box<dyn std::error::Error>> {
    TempDirs::new()
}

impl Drop for TempDirs {
    fn drop(&mut self) {
        let base = self.base();
        if let Err(e) = std::fs::remove_dir_all(&base) {
            tracing::warn!(path = %base.display(), err = %e, "failed to clean up temp directory");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_dirs_creates_directories() {
        let dirs = TempDirs::new().unwrap();

        assert!(dirs.storage_dir.is_dir());
        assert!(dirs.config_dir.is_dir());
    }

    #[test]
    fn temp_dirs_share_parent() {
        let dirs = TempDirs::new().unwrap();
        assert_eq!(dirs.storage_dir.parent(), dirs.config_dir.parent());
    }

    #[test]
    fn temp_dirs_write_config() {
        let dirs = TempDirs::new().unwrap();
        let path = dirs.write_config("week_start = \"monday\"").unwrap();

        assert!(path.starts_with(&dirs.config_dir));
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "week_start = \"monday\""
        );
    }

    #[test]
    fn temp_dirs_cleanup_on_drop() {
        let base = {
            let dirs = TempDirs::new().unwrap();
            let base = dirs.base();
            assert!(base.exists());
            base
        };
        assert!(!base.exists());
    }
}
