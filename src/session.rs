//! Command plumbing shared by every subcommand: resolving settings, loading
//! the dataset through the cache, and turning filter flags into criteria.

use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;

use crate::{
    cache::DatasetCache,
    cli::{FilterArgs, SourceArgs},
    config::Settings,
    dataset::Dataset,
    filter::{FilterCriteria, PriceBounds, PriceRange, room_type_options},
    normalize,
};

pub const NO_MATCHES_MESSAGE: &str = "No listings match the current filters";

pub struct Session {
    settings: Settings,
    cache: DatasetCache,
}

impl Session {
    pub fn open(args: &SourceArgs) -> Result<Self> {
        Ok(Self {
            settings: Settings::from_args(args)?,
            cache: DatasetCache::new(),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn dataset(&mut self) -> Result<Arc<Dataset>> {
        let options = &self.settings.load;
        self.cache
            .get_or_load(options)
            .with_context(|| format!("Loading listings from {:?}", options.source))
    }
}

/// Builds filter criteria from flags. Unset flags fall back to the
/// dataset's defaults: every room type and the rounded price bounds.
pub fn criteria(args: &FilterArgs, dataset: &Dataset) -> Result<FilterCriteria> {
    let room_types = if args.room_types.is_empty() {
        room_type_options(dataset)
    } else {
        args.room_types
            .iter()
            .map(|raw| normalize::room_type_clean(raw.trim()))
            .collect()
    };

    let bounds = PriceBounds::from_dataset(dataset);
    let min = args
        .min_price
        .or(args.min_price_k.map(|k| k.saturating_mul(1000)))
        .unwrap_or(bounds.min);
    let max = args
        .max_price
        .or(args.max_price_k.map(|k| k.saturating_mul(1000)))
        .unwrap_or(bounds.max);
    let price_range = PriceRange::new(min, max).context("Invalid price filter")?;

    info!(
        "Filtering {} room type(s), nightly rate {}..={}, hosts: {:?}",
        room_types.len(),
        min,
        max,
        args.host_status
    );
    Ok(FilterCriteria::new(room_types, price_range, args.host_status))
}
