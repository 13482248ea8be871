//! Canister units and the validated unit registry.
//!
//! # Overview
//!
//! A [`UnitDecl`] is one canister as declared by the project manifest: a
//! name, a [`UnitKind`], the names of the units it depends on, and the
//! source locations the manifest points at. Declarations are raw input; they
//! may repeat dependency names or reference units that do not exist.
//!
//! [`UnitRegistry::from_decls`] validates a declaration list into an
//! immutable, insertion-ordered registry. Only structural problems abort
//! construction ([`MalformedInput`]): empty names, duplicate names, and empty
//! dependency entries. Dependencies naming unknown units are *not* rejected
//! here; the graph builder reports them so analysis can continue.
//!
//! ## Ordering
//!
//! Registry order is declaration order. Everything downstream (vertex
//! indices, error ordering, cycle traversal) derives its determinism from it.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ---------------------------------------------------------------------------
// UnitKind
// ---------------------------------------------------------------------------

/// Category of a canister. Informational only; it never changes graph
/// semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    /// Typed-language canister compiled from Motoko sources.
    Motoko,
    /// Native-language canister built from a Rust package.
    Rust,
    /// Static-assets canister.
    Assets,
    /// Canister produced by a custom build script.
    Custom,
}

impl UnitKind {
    /// Every kind, in display order.
    pub const ALL: [Self; 4] = [Self::Motoko, Self::Rust, Self::Assets, Self::Custom];

    /// Manifest spelling of the kind (the `type` field in `dfx.json`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Motoko => "motoko",
            Self::Rust => "rust",
            Self::Assets => "assets",
            Self::Custom => "custom",
        }
    }

    /// Short human description used in pretty output.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Motoko => "typed-language canister",
            Self::Rust => "native-language canister",
            Self::Assets => "static-assets canister",
            Self::Custom => "custom build-script canister",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Error returned when parsing an unknown kind string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown unit kind '{0}' (expected one of: motoko, rust, assets, custom)")]
pub struct UnknownKind(pub String);

impl FromStr for UnitKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "motoko" => Ok(Self::Motoko),
            "rust" => Ok(Self::Rust),
            "assets" => Ok(Self::Assets),
            "custom" => Ok(Self::Custom),
            _ => Err(UnknownKind(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// MalformedInput
// ---------------------------------------------------------------------------

/// Structural problems that make a declaration list impossible to analyze.
///
/// Unlike undefined dependencies or cycles, these abort analysis: there is
/// no coherent registry to build a graph from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedInput {
    /// A declaration has an empty (or whitespace-only) name.
    #[error("unit at position {index} has an empty name")]
    EmptyName { index: usize },

    /// Two declarations share the same name.
    #[error("unit '{name}' is declared more than once")]
    DuplicateName { name: String },

    /// A dependency entry is the empty string.
    #[error("unit '{unit}' declares an empty dependency name")]
    EmptyDependency { unit: String },
}

// ---------------------------------------------------------------------------
// UnitDecl
// ---------------------------------------------------------------------------

/// A unit exactly as the manifest declares it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitDecl {
    pub name: String,
    pub kind: UnitKind,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub sources: Vec<PathBuf>,
}

impl UnitDecl {
    /// Declare a unit with no dependencies and no sources.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: UnitKind) -> Self {
        Self {
            name: name.into(),
            kind,
            depends_on: Vec::new(),
            sources: Vec::new(),
        }
    }

    /// Replace the dependency list.
    #[must_use]
    pub fn depends_on<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.depends_on = deps.into_iter().map(Into::into).collect();
        self
    }

    /// Append a source location.
    #[must_use]
    pub fn with_source(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(path.into());
        self
    }
}

// ---------------------------------------------------------------------------
// Unit
// ---------------------------------------------------------------------------

/// A validated unit. Dependency names are unique, in first-declared order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub name: String,
    pub kind: UnitKind,
    pub depends_on: Vec<String>,
    pub sources: Vec<PathBuf>,
}

// ---------------------------------------------------------------------------
// UnitRegistry
// ---------------------------------------------------------------------------

/// Immutable, insertion-ordered mapping from unit name to [`Unit`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitRegistry {
    units: Vec<Unit>,
    positions: HashMap<String, usize>,
}

impl UnitRegistry {
    /// Validate `decls` into a registry.
    ///
    /// Names are trimmed. Duplicate dependency names are collapsed, keeping
    /// the first occurrence.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedInput`] for the first empty name, duplicate name,
    /// or empty dependency entry encountered in declaration order.
    pub fn from_decls<I>(decls: I) -> Result<Self, MalformedInput>
    where
        I: IntoIterator<Item = UnitDecl>,
    {
        let mut units = Vec::new();
        let mut positions = HashMap::new();

        for (index, decl) in decls.into_iter().enumerate() {
            let name = decl.name.trim().to_string();
            if name.is_empty() {
                return Err(MalformedInput::EmptyName { index });
            }
            if positions.contains_key(&name) {
                return Err(MalformedInput::DuplicateName { name });
            }

            let mut seen: HashSet<String> = HashSet::with_capacity(decl.depends_on.len());
            let mut depends_on = Vec::with_capacity(decl.depends_on.len());
            for dep in decl.depends_on {
                let dep = dep.trim().to_string();
                if dep.is_empty() {
                    return Err(MalformedInput::EmptyDependency { unit: name });
                }
                if seen.insert(dep.clone()) {
                    depends_on.push(dep);
                }
            }

            positions.insert(name.clone(), units.len());
            units.push(Unit {
                name,
                kind: decl.kind,
                depends_on,
                sources: decl.sources,
            });
        }

        Ok(Self { units, positions })
    }

    /// Number of units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns `true` when no units are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Unit> {
        self.positions.get(name).map(|&pos| &self.units[pos])
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// Units in declaration order.
    #[must_use]
    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Unit> {
        self.units.iter()
    }

    /// Number of units per kind. Kinds with no units are omitted.
    #[must_use]
    pub fn kind_counts(&self) -> BTreeMap<UnitKind, usize> {
        let mut counts = BTreeMap::new();
        for unit in &self.units {
            *counts.entry(unit.kind).or_insert(0) += 1;
        }
        counts
    }
}

impl<'a> IntoIterator for &'a UnitRegistry {
    type Item = &'a Unit;
    type IntoIter = std::slice::Iter<'a, Unit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
