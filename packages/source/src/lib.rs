#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Accident table I/O and dataset definitions.
//!
//! Reads and writes delimited accident tables, parses the individual cell
//! values the pipeline depends on, and resolves [`DatasetDefinition`]s
//! from the embedded registry or from user-supplied TOML files.
//!
//! [`DatasetDefinition`]: accident_map_source_models::DatasetDefinition

pub mod parsing;
pub mod progress;
pub mod registry;
pub mod table;

use std::path::PathBuf;

/// Errors that can occur during data source operations.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// An input file does not exist.
    #[error("Input file not found: {}", path.display())]
    MissingInput {
        /// Path that was expected to exist.
        path: PathBuf,
    },

    /// I/O error (file read/write).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing or writing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A dataset definition could not be parsed.
    #[error("Dataset definition error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The dataset definition names an encoding `encoding_rs` does not know.
    #[error("Unknown text encoding '{label}'")]
    UnknownEncoding {
        /// Encoding label from the definition.
        label: String,
    },

    /// The table has no header row.
    #[error("Malformed table {}: {message}", path.display())]
    Malformed {
        /// Table that failed to parse.
        path: PathBuf,
        /// Description of what went wrong.
        message: String,
    },

    /// No dataset with the requested id is registered.
    #[error("Unknown dataset '{id}'")]
    UnknownDataset {
        /// Requested dataset id.
        id: String,
    },
}
