//! Settings resolution.
//!
//! Values come from three layers, highest precedence first: command-line
//! flags, an optional YAML configuration file, and (for the source path only)
//! the `LISTING_INSIGHTS_SOURCE` environment variable.
//!
//! ```yaml
//! source: data/listings.csv
//! delimiter: ","
//! encoding: utf-8
//! fingerprint: content
//! currency_symbol: Rp
//! ```

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    cache::FingerprintMode,
    cli::{SourceArgs, parse_delimiter},
    error::InsightsError,
    io_utils,
    loader::LoadOptions,
};

pub const SOURCE_ENV: &str = "LISTING_INSIGHTS_SOURCE";
pub const DEFAULT_CURRENCY_SYMBOL: &str = "Rp";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InsightsConfig {
    pub source: Option<PathBuf>,
    pub delimiter: Option<String>,
    pub encoding: Option<String>,
    pub fingerprint: Option<FingerprintMode>,
    pub currency_symbol: Option<String>,
}

impl InsightsConfig {
    /// Reads a YAML configuration file. A relative `source` is taken relative
    /// to the file's directory.
    pub fn load(path: &Path) -> crate::error::Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| InsightsError::ConfigUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: InsightsConfig =
            serde_yaml::from_str(&raw).map_err(|source| InsightsError::Config {
                path: path.to_path_buf(),
                source,
            })?;
        if let (Some(source), Some(dir)) = (config.source.as_ref(), path.parent())
            && source.is_relative()
        {
            config.source = Some(dir.join(source));
        }
        Ok(config)
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub load: LoadOptions,
    pub currency_symbol: String,
}

impl Settings {
    pub fn from_args(args: &SourceArgs) -> Result<Self> {
        let config = match &args.config {
            Some(path) => Some(
                InsightsConfig::load(path)
                    .with_context(|| format!("Loading configuration from {path:?}"))?,
            ),
            None => None,
        };
        let env_source = env::var_os(SOURCE_ENV).map(PathBuf::from);
        Self::resolve(args, config.unwrap_or_default(), env_source)
    }

    pub fn resolve(
        args: &SourceArgs,
        config: InsightsConfig,
        env_source: Option<PathBuf>,
    ) -> Result<Self> {
        let source = args
            .input
            .clone()
            .or(config.source)
            .or(env_source)
            .ok_or_else(|| {
                anyhow!("No listing source given. Pass --input, set 'source' in --config, or set {SOURCE_ENV}")
            })?;

        let delimiter = match (args.delimiter, config.delimiter.as_deref()) {
            (Some(delimiter), _) => Some(delimiter),
            (None, Some(raw)) => Some(
                parse_delimiter(raw)
                    .map_err(|err| anyhow!("Invalid delimiter '{raw}' in configuration: {err}"))?,
            ),
            (None, None) => None,
        };
        let encoding = io_utils::resolve_encoding(
            args.input_encoding
                .as_deref()
                .or(config.encoding.as_deref()),
        )?;
        let fingerprint = args
            .fingerprint
            .or(config.fingerprint)
            .unwrap_or_default();

        debug!(
            "Resolved source {:?} (encoding {}, fingerprint {:?})",
            source,
            encoding.name(),
            fingerprint
        );
        Ok(Self {
            load: LoadOptions::new(source)
                .with_delimiter(delimiter)
                .with_encoding(encoding)
                .with_fingerprint(fingerprint),
            currency_symbol: config
                .currency_symbol
                .unwrap_or_else(|| DEFAULT_CURRENCY_SYMBOL.to_string()),
        })
    }
}
