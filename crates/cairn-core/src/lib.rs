#![forbid(unsafe_code)]
//! cairn-core library.
//!
//! Shared building blocks for the cairn analyzer: the canister unit model,
//! the manifest loader that turns `dfx.json` into unit declarations, project
//! and user configuration, per-unit source statistics, and the stable error
//! codes surfaced by the CLI.
//!
//! # Conventions
//!
//! - **Errors**: library failures are `thiserror` enums; glue code uses
//!   `anyhow::Result`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod error;
pub mod manifest;
pub mod stats;
pub mod unit;

pub use error::ErrorCode;
pub use manifest::{ManifestError, load_manifest, parse_manifest};
pub use stats::{UnitStats, collect_line_counts};
pub use unit::{MalformedInput, Unit, UnitDecl, UnitKind, UnitRegistry};
