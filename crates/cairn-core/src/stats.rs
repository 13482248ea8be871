//! Per-unit source statistics.
//!
//! The analyzer itself performs no I/O; line counts arrive as a [`UnitStats`]
//! value gathered here. Each unit is counted on its own rayon task and the
//! results are merged only after every task finishes, so callers never see a
//! partially-filled map.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::unit::{Unit, UnitRegistry};

/// Line counts keyed by unit name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnitStats {
    lines: BTreeMap<String, usize>,
}

impl UnitStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the line count for `unit`, replacing any previous value.
    pub fn insert(&mut self, unit: impl Into<String>, lines: usize) {
        self.lines.insert(unit.into(), lines);
    }

    #[must_use]
    pub fn lines(&self, unit: &str) -> Option<usize> {
        self.lines.get(unit).copied()
    }

    /// Sum of all recorded line counts, or `None` when nothing was recorded.
    #[must_use]
    pub fn total_lines(&self) -> Option<usize> {
        if self.lines.is_empty() {
            None
        } else {
            Some(self.lines.values().sum())
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.lines.iter().map(|(name, lines)| (name.as_str(), *lines))
    }
}

impl FromIterator<(String, usize)> for UnitStats {
    fn from_iter<I: IntoIterator<Item = (String, usize)>>(iter: I) -> Self {
        Self {
            lines: iter.into_iter().collect(),
        }
    }
}

/// Count source lines for every unit in `registry`.
///
/// Source paths are resolved against `root`. Directories are walked
/// recursively without following symlinks inside them; paths that cannot be
/// read are skipped. A unit whose sources
/// are all unreadable (or that declares none) is omitted from the result.
#[must_use]
#[instrument(skip(registry), fields(units = registry.len()))]
pub fn collect_line_counts(root: &Path, registry: &UnitRegistry) -> UnitStats {
    let lines: BTreeMap<String, usize> = registry
        .units()
        .par_iter()
        .filter_map(|unit| count_unit(root, unit).map(|lines| (unit.name.clone(), lines)))
        .collect();
    let stats = UnitStats { lines };

    debug!(counted = stats.len(), "collected unit line counts");
    stats
}

fn count_unit(root: &Path, unit: &Unit) -> Option<usize> {
    let mut total = None;
    for source in &unit.sources {
        let path = root.join(source);
        match count_path(&path) {
            Ok(lines) => *total.get_or_insert(0) += lines,
            Err(err) => {
                debug!(unit = %unit.name, path = %path.display(), error = %err, "skipping unreadable source");
            }
        }
    }
    total
}

/// Count lines under `path`, a file or a directory.
///
/// Fails only when `path` itself cannot be read; unreadable entries below it
/// are skipped.
fn count_path(path: &Path) -> io::Result<usize> {
    let mut total = 0;
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => return Err(err.into()),
            Err(err) => {
                debug!(path = %path.display(), error = %err, "skipping unreadable entry");
                continue;
            }
        };

        // A declared source may itself be a symlink to a file.
        let is_file = if entry.depth() == 0 {
            entry.path().is_file()
        } else {
            entry.file_type().is_file()
        };
        if !is_file {
            continue;
        }

        match fs::read(entry.path()) {
            Ok(bytes) => total += count_lines(&bytes),
            Err(err) if entry.depth() == 0 => return Err(err),
            Err(err) => {
                debug!(path = %entry.path().display(), error = %err, "skipping unreadable entry");
            }
        }
    }
    Ok(total)
}

/// Number of lines in `bytes`; a trailing line without `\n` still counts.
fn count_lines(bytes: &[u8]) -> usize {
    let newlines = bytes.iter().filter(|&&b| b == b'\n').count();
    match bytes.last() {
        Some(&last) if last != b'\n' => newlines + 1,
        _ => newlines,
    }
}
