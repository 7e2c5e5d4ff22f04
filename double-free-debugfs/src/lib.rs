// Copyright 2025 The Fuchsia Authors. All rights reserved.
// Use of this source code is governed by a BSD-style license that can be
// found in the LICENSE file.

//! Debug filesystem scaffold for the SLUB double free detector.
//!
//! Module init creates a single `hwslub_double_free/` directory under the
//! caller's debug root, and exit removes it along with everything nested
//! inside. Detectors publish read-only show files into the directory via
//! entries minted with [`debug_entry!`]; this crate installs none of its own.

#![warn(missing_docs)]

use thiserror::Error;

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Directory created under the debug root.
pub const DIR_NAME: &str = "hwslub_double_free";

/// Error creating or populating the debug directory.
#[derive(Debug, Error)]
pub enum DebugfsError {
    /// The directory or a file inside it could not be created.
    #[error("failed to create debug entry {path:?}")]
    CreateFailed {
        /// Path that failed to materialize.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: io::Error,
    },
}

/// Render handler for one show file.
pub type ShowFn = fn(&mut dyn fmt::Write) -> fmt::Result;

/// A named show file, paired with the handler that renders its contents.
///
/// Mint these with [`debug_entry!`] so the file name and handler stay
/// together at the definition site.
#[derive(Clone, Copy)]
pub struct DebugEntry {
    name: &'static str,
    show: ShowFn,
}

impl DebugEntry {
    /// Pairs `name` with its render handler.
    pub const fn new(name: &'static str, show: ShowFn) -> Self {
        Self { name, show }
    }

    /// File name of the entry.
    pub fn name(&self) -> &'static str {
        self.name
    }

    fn render(&self) -> Result<String, fmt::Error> {
        let mut out = String::new();
        (self.show)(&mut out)?;
        Ok(out)
    }
}

impl fmt::Debug for DebugEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugEntry").field("name", &self.name).finish()
    }
}

/// Mints a [`DebugEntry`] from a show handler.
///
/// The entry's file name is the first identifier; the handler receives a
/// [`core::fmt::Write`] sink and renders the full file contents.
#[macro_export]
macro_rules! debug_entry {
    ($name:ident, $show:path) => {
        $crate::DebugEntry::new(stringify!($name), $show)
    };
}

/// Handle to the created `hwslub_double_free/` directory.
#[derive(Debug)]
pub struct DoubleFreeDebugfs {
    root: PathBuf,
}

impl DoubleFreeDebugfs {
    /// Creates `hwslub_double_free/` under `debug_root`.
    ///
    /// Failure here is what the loader sees as the module failing to come
    /// up; nothing is left behind on error.
    pub fn init(debug_root: &Path) -> Result<Self, DebugfsError> {
        let root = debug_root.join(DIR_NAME);
        fs::create_dir_all(&root)
            .map_err(|source| DebugfsError::CreateFailed { path: root.clone(), source })?;
        log::debug!("created debug directory {root:?}");
        Ok(Self { root })
    }

    /// Path of the created directory.
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Renders `entry` into a file inside the directory, replacing any
    /// previous contents, and returns its path.
    pub fn install(&self, entry: DebugEntry) -> Result<PathBuf, DebugfsError> {
        let path = self.root.join(entry.name());
        let contents = entry.render().map_err(|_| DebugfsError::CreateFailed {
            path: path.clone(),
            source: io::Error::other("show handler failed"),
        })?;
        fs::write(&path, contents)
            .map_err(|source| DebugfsError::CreateFailed { path: path.clone(), source })?;
        Ok(path)
    }

    /// Removes the directory and everything nested under it.
    pub fn exit(self) {
        if let Err(e) = fs::remove_dir_all(&self.root) {
            log::warn!("failed to remove debug directory {:?}: {e}", self.root);
        }
    }
}
