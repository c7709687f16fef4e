//! Dataset registry: definitions embedded from `packages/source/datasets/`.
//!
//! Each `.toml` file is baked into the binary at compile time via
//! [`include_str!`]. A definition can also be read from any path at run
//! time with [`load_dataset_file`].

use std::path::Path;

use accident_map_source_models::DatasetDefinition;

use crate::SourceError;

/// TOML definitions embedded at compile time.
const DATASET_TOMLS: &[(&str, &str)] = &[(
    "ms_acidentes",
    include_str!("../datasets/ms_acidentes.toml"),
)];

/// Number of registered datasets.
#[cfg(test)]
const EXPECTED_DATASET_COUNT: usize = 1;

/// Id of the dataset used when none is requested.
pub const DEFAULT_DATASET_ID: &str = "ms_acidentes";

/// Environment variable naming the dataset id to use.
pub const DATASET_ENV_VAR: &str = "ACCIDENT_MAP_DATASET";

/// Parses a dataset definition from TOML text.
///
/// # Errors
///
/// Returns the `toml` deserialization error if the text does not match the
/// [`DatasetDefinition`] schema.
pub fn parse_dataset_toml(toml_str: &str) -> Result<DatasetDefinition, toml::de::Error> {
    toml::de::from_str(toml_str)
}

/// Returns all embedded dataset definitions.
///
/// # Panics
///
/// Panics if an embedded TOML file is malformed. These are compile-time
/// constants, so a failure is a development error caught by the tests
/// below.
#[must_use]
pub fn all_datasets() -> Vec<DatasetDefinition> {
    DATASET_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            parse_dataset_toml(toml_str)
                .unwrap_or_else(|e| panic!("Failed to parse dataset '{name}': {e}"))
        })
        .collect()
}

/// Finds an embedded dataset definition by id.
///
/// # Errors
///
/// Returns [`SourceError::UnknownDataset`] if no definition has that id.
pub fn find_dataset(id: &str) -> Result<DatasetDefinition, SourceError> {
    all_datasets()
        .into_iter()
        .find(|d| d.id() == id)
        .ok_or_else(|| SourceError::UnknownDataset { id: id.to_string() })
}

/// Reads a dataset definition from a TOML file.
///
/// # Errors
///
/// Returns [`SourceError::MissingInput`] if the file does not exist, or a
/// parse error if it is not a valid definition.
pub fn load_dataset_file(path: &Path) -> Result<DatasetDefinition, SourceError> {
    if !path.is_file() {
        return Err(SourceError::MissingInput {
            path: path.to_path_buf(),
        });
    }
    let text = std::fs::read_to_string(path)?;
    Ok(parse_dataset_toml(&text)?)
}

/// Resolves the dataset a command should operate on.
///
/// An explicit config file wins, then an explicit id, then the
/// [`DATASET_ENV_VAR`] environment variable, then [`DEFAULT_DATASET_ID`].
///
/// # Errors
///
/// Returns [`SourceError`] if the config file cannot be read or the id is
/// not registered.
pub fn resolve_dataset(
    config: Option<&Path>,
    id: Option<&str>,
) -> Result<DatasetDefinition, SourceError> {
    if let Some(path) = config {
        log::debug!("Loading dataset definition from {}", path.display());
        return load_dataset_file(path);
    }

    let from_env = std::env::var(DATASET_ENV_VAR).ok();
    let id = id
        .or(from_env.as_deref())
        .unwrap_or(DEFAULT_DATASET_ID);
    find_dataset(id)
}
