//! Project manifest loading (`dfx.json`).
//!
//! Turns the `canisters` table of a `dfx.json`-style manifest into an ordered
//! list of [`UnitDecl`]s. Key order in the JSON object is declaration order;
//! `serde_json` is built with `preserve_order` so the order survives parsing.
//!
//! ```json
//! {
//!   "canisters": {
//!     "ledger":   { "type": "rust", "candid": "src/ledger/ledger.did", "package": "ledger" },
//!     "backend":  { "type": "motoko", "main": "src/backend/main.mo", "dependencies": ["ledger"] },
//!     "frontend": { "type": "assets", "source": ["src/frontend/dist"], "dependencies": ["backend"] }
//!   }
//! }
//! ```
//!
//! Only the fields that matter to dependency analysis are read; everything
//! else in the manifest is ignored.

use std::io;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::error::ErrorCode;
use crate::unit::{UnitDecl, UnitKind};

/// Errors raised while loading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid manifest JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("manifest has no `canisters` object")]
    MissingCanisters,

    #[error("canister '{name}' must be a JSON object")]
    NotAnObject { name: String },

    #[error("canister '{name}' is missing required field `type`")]
    MissingKind { name: String },

    #[error("canister '{name}' has unknown type '{kind}'")]
    UnknownKind { name: String, kind: String },

    #[error("canister '{name}' has an invalid `{field}` field (expected {expected})")]
    InvalidField {
        name: String,
        field: &'static str,
        expected: &'static str,
    },
}

impl ManifestError {
    /// Stable error code for CLI rendering.
    #[must_use]
    pub fn error_code(&self) -> ErrorCode {
        match self {
            Self::Io { source, .. } if matches!(source.kind(), io::ErrorKind::NotFound) => {
                ErrorCode::ManifestNotFound
            }
            Self::Io { .. } => ErrorCode::InternalUnexpected,
            Self::Json(_) => ErrorCode::ManifestParseError,
            Self::MissingCanisters
            | Self::NotAnObject { .. }
            | Self::MissingKind { .. }
            | Self::UnknownKind { .. }
            | Self::InvalidField { .. } => ErrorCode::MalformedInput,
        }
    }
}

/// Read and parse the manifest at `path`.
///
/// # Errors
///
/// Returns [`ManifestError::Io`] when the file cannot be read, and any error
/// [`parse_manifest`] reports.
#[instrument]
pub fn load_manifest(path: &Path) -> Result<Vec<UnitDecl>, ManifestError> {
    let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_manifest(&content)
}

/// Parse manifest text into unit declarations, in declaration order.
///
/// # Errors
///
/// Returns a [`ManifestError`] when the JSON is invalid, the `canisters`
/// object is missing, or a canister entry lacks a known `type` or carries
/// malformed `dependencies`/`source` fields.
pub fn parse_manifest(content: &str) -> Result<Vec<UnitDecl>, ManifestError> {
    let root: Value = serde_json::from_str(content)?;
    let canisters = root
        .get("canisters")
        .and_then(Value::as_object)
        .ok_or(ManifestError::MissingCanisters)?;

    let mut decls = Vec::with_capacity(canisters.len());
    for (name, entry) in canisters {
        let entry = entry.as_object().ok_or_else(|| ManifestError::NotAnObject {
            name: name.clone(),
        })?;
        decls.push(parse_canister(name, entry)?);
    }

    debug!(units = decls.len(), "parsed manifest");
    Ok(decls)
}

fn parse_canister(name: &str, entry: &Map<String, Value>) -> Result<UnitDecl, ManifestError> {
    let kind = match entry.get("type") {
        None | Some(Value::Null) => {
            return Err(ManifestError::MissingKind {
                name: name.to_string(),
            });
        }
        Some(Value::String(raw)) => {
            raw.parse::<UnitKind>()
                .map_err(|_| ManifestError::UnknownKind {
                    name: name.to_string(),
                    kind: raw.clone(),
                })?
        }
        Some(_) => {
            return Err(ManifestError::InvalidField {
                name: name.to_string(),
                field: "type",
                expected: "a string",
            });
        }
    };

    let depends_on = string_list(name, entry, "dependencies")?;

    let mut sources: Vec<PathBuf> = Vec::new();
    for field in ["main", "candid"] {
        match entry.get(field) {
            None | Some(Value::Null) => {}
            Some(Value::String(path)) => sources.push(PathBuf::from(path)),
            Some(_) => {
                return Err(ManifestError::InvalidField {
                    name: name.to_string(),
                    field,
                    expected: "a path string",
                });
            }
        }
    }
    sources.extend(string_list(name, entry, "source")?.into_iter().map(PathBuf::from));

    Ok(UnitDecl {
        name: name.to_string(),
        kind,
        depends_on,
        sources,
    })
}

fn string_list(
    name: &str,
    entry: &Map<String, Value>,
    field: &'static str,
) -> Result<Vec<String>, ManifestError> {
    let invalid = || ManifestError::InvalidField {
        name: name.to_string(),
        field,
        expected: "an array of strings",
    };

    match entry.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
            .collect(),
        Some(_) => Err(invalid()),
    }
}
