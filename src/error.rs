//! Error taxonomy for the listing pipeline.
//!
//! Only [`InsightsError`] ever leaves the library. A cell that cannot be read
//! as a number surfaces as [`MalformedValue`] inside the normalizer and is
//! recovered as a missing cell by the loader. An empty filter result is not an
//! error at all (see [`crate::filter::FilterOutcome`]).

use std::{io, path::PathBuf};

use thiserror::Error;

pub type Result<T> = std::result::Result<T, InsightsError>;

#[derive(Debug, Error)]
pub enum InsightsError {
    #[error("listing source {path:?} is unavailable")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("listing source {path:?} has no '{column}' column")]
    MissingColumn { path: PathBuf, column: String },
    #[error("failed to read CSV data from {path:?}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("row {row} of {path:?} is not valid {encoding}")]
    Decode {
        path: PathBuf,
        row: usize,
        encoding: &'static str,
    },
    #[error("price range minimum {min} exceeds maximum {max}")]
    InvalidPriceRange { min: i64, max: i64 },
    #[error("configuration file {path:?} could not be read")]
    ConfigUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("configuration file {path:?} is not valid")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl InsightsError {
    pub(crate) fn unavailable(path: impl Into<PathBuf>, source: io::Error) -> Self {
        InsightsError::SourceUnavailable {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        InsightsError::Csv {
            path: path.into(),
            source,
        }
    }
}

/// A cell that could not be coerced to its declared type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("'{raw}' cannot be read as a number")]
pub struct MalformedValue {
    pub raw: String,
}
