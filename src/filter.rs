//! Filter engine.
//!
//! A filter pass never copies or mutates the cleaned [`Dataset`]. It yields a
//! [`FilteredView`]: the ordered positions of the rows that passed plus any
//! columns derived for this view only.

use std::collections::BTreeSet;

use clap::ValueEnum;
use itertools::Itertools;

use crate::{
    columns::{NIGHTLY_RATE, ROOM_TYPE_CLEAN, SUPERHOST},
    data::Value,
    dataset::{Dataset, Row},
    error::{InsightsError, Result},
    schema::{ColumnMeta, ColumnType},
};

/// Granularity of the default price bounds.
pub const PRICE_BOUND_STEP: i64 = 100_000;
/// Price slider step, in thousands.
pub const PRICE_SLIDER_STEP_THOUSANDS: i64 = 50;

/// Inclusive nightly-rate range in currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
    min: i64,
    max: i64,
}

impl PriceRange {
    pub fn new(min: i64, max: i64) -> Result<Self> {
        if min > max {
            return Err(InsightsError::InvalidPriceRange { min, max });
        }
        Ok(Self { min, max })
    }

    pub fn from_thousands(min_k: i64, max_k: i64) -> Result<Self> {
        Self::new(min_k.saturating_mul(1000), max_k.saturating_mul(1000))
    }

    pub fn min(&self) -> i64 {
        self.min
    }

    pub fn max(&self) -> i64 {
        self.max
    }

    pub fn contains(&self, price: f64) -> bool {
        price >= self.min as f64 && price <= self.max as f64
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum HostStatusFilter {
    #[default]
    All,
    #[value(name = "superhost")]
    SuperhostOnly,
    #[value(name = "regular")]
    RegularOnly,
}

impl HostStatusFilter {
    /// A listing without a superhost flag counts as a regular host.
    pub fn admits(self, superhost: Option<bool>) -> bool {
        let superhost = superhost.unwrap_or(false);
        match self {
            HostStatusFilter::All => true,
            HostStatusFilter::SuperhostOnly => superhost,
            HostStatusFilter::RegularOnly => !superhost,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub room_types: BTreeSet<String>,
    pub price_range: PriceRange,
    pub host_status: HostStatusFilter,
}

impl FilterCriteria {
    pub fn new(
        room_types: impl IntoIterator<Item = String>,
        price_range: PriceRange,
        host_status: HostStatusFilter,
    ) -> Self {
        Self {
            room_types: room_types.into_iter().collect(),
            price_range,
            host_status,
        }
    }

    /// The unfiltered starting state: every room type, the default price
    /// bounds, every host.
    pub fn defaults_for(dataset: &Dataset) -> Self {
        Self::new(
            room_type_options(dataset),
            PriceBounds::from_dataset(dataset).range(),
            HostStatusFilter::All,
        )
    }
}

/// Default price bounds: the observed nightly-rate range widened outward to
/// multiples of [`PRICE_BOUND_STEP`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceBounds {
    pub min: i64,
    pub max: i64,
}

impl PriceBounds {
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let Some(index) = dataset.column_index(NIGHTLY_RATE) else {
            return Self { min: 0, max: 0 };
        };
        let (lo, hi) = dataset
            .column_values(index)
            .filter_map(|cell| cell.and_then(Value::as_f64))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if lo > hi {
            return Self { min: 0, max: 0 };
        }
        let step = PRICE_BOUND_STEP as f64;
        Self {
            min: ((lo / step).floor() * step) as i64,
            max: ((hi / step).ceil() * step) as i64,
        }
    }

    pub fn range(&self) -> PriceRange {
        PriceRange {
            min: self.min,
            max: self.max,
        }
    }

    pub fn min_thousands(&self) -> i64 {
        self.min / 1000
    }

    pub fn max_thousands(&self) -> i64 {
        self.max / 1000
    }
}

/// Sorted distinct `room_type_clean` values.
pub fn room_type_options(dataset: &Dataset) -> Vec<String> {
    let Some(index) = dataset.column_index(ROOM_TYPE_CLEAN) else {
        return Vec::new();
    };
    dataset
        .column_values(index)
        .flatten()
        .map(Value::as_display)
        .sorted()
        .dedup()
        .collect()
}

#[derive(Debug)]
pub enum FilterOutcome<'a> {
    Rows(FilteredView<'a>),
    NoMatches,
}

impl<'a> FilterOutcome<'a> {
    pub fn is_empty(&self) -> bool {
        matches!(self, FilterOutcome::NoMatches)
    }

    pub fn len(&self) -> usize {
        match self {
            FilterOutcome::Rows(view) => view.len(),
            FilterOutcome::NoMatches => 0,
        }
    }

    pub fn into_view(self) -> Option<FilteredView<'a>> {
        match self {
            FilterOutcome::Rows(view) => Some(view),
            FilterOutcome::NoMatches => None,
        }
    }
}

#[derive(Debug, Clone)]
struct ViewColumn {
    meta: ColumnMeta,
    values: Vec<Option<Value>>,
}

#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
    local: Vec<ViewColumn>,
}

pub fn filter<'a>(dataset: &'a Dataset, criteria: &FilterCriteria) -> FilterOutcome<'a> {
    FilteredView::all(dataset).refine(criteria)
}

impl<'a> FilteredView<'a> {
    /// A view over every row of the dataset.
    pub fn all(dataset: &'a Dataset) -> Self {
        Self {
            dataset,
            indices: (0..dataset.len()).collect(),
            local: Vec::new(),
        }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    /// Dataset row positions in view order.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &'a Row> + '_ {
        let rows = self.dataset.rows();
        self.indices.iter().map(move |&idx| &rows[idx])
    }

    /// Dataset columns followed by view-local ones.
    pub fn columns(&self) -> Vec<ColumnMeta> {
        self.dataset
            .columns()
            .iter()
            .filter(|c| !self.local.iter().any(|l| l.meta.name == c.name))
            .chain(self.local.iter().map(|l| &l.meta))
            .cloned()
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.local.iter().any(|l| l.meta.name == name) || self.dataset.column_index(name).is_some()
    }

    /// Cells of `name` in view order. View-local columns shadow dataset
    /// columns of the same name.
    pub fn column_values(&self, name: &str) -> Option<Vec<Option<&Value>>> {
        if let Some(local) = self.local.iter().find(|l| l.meta.name == name) {
            return Some(local.values.iter().map(Option::as_ref).collect());
        }
        let index = self.dataset.column_index(name)?;
        Some(
            self.indices
                .iter()
                .map(|&row| self.dataset.cell(row, index))
                .collect(),
        )
    }

    /// Attaches a column that exists only in this view. `values` is aligned
    /// with view order; a short vector is padded with missing cells.
    pub fn with_column(
        mut self,
        name: &str,
        datatype: ColumnType,
        mut values: Vec<Option<Value>>,
    ) -> Self {
        values.resize(self.indices.len(), None);
        self.local.retain(|l| l.meta.name != name);
        self.local.push(ViewColumn {
            meta: ColumnMeta::new(name, datatype),
            values,
        });
        self
    }

    /// Like [`FilteredView::with_column`], computing each cell from its
    /// dataset row.
    pub fn derive_column<F>(self, name: &str, datatype: ColumnType, mut f: F) -> Self
    where
        F: FnMut(&Row) -> Option<Value>,
    {
        let values: Vec<Option<Value>> = self.rows().map(&mut f).collect();
        self.with_column(name, datatype, values)
    }

    /// Applies `criteria` to the rows of this view. View-local columns follow
    /// the surviving rows.
    pub fn refine(&self, criteria: &FilterCriteria) -> FilterOutcome<'a> {
        let predicate = RowPredicate::new(self.dataset, criteria);
        let kept = self
            .indices
            .iter()
            .enumerate()
            .filter(|&(_, &row)| predicate.matches(&self.dataset.rows()[row]))
            .map(|(pos, _)| pos)
            .collect::<Vec<_>>();
        if kept.is_empty() {
            return FilterOutcome::NoMatches;
        }
        let local = self
            .local
            .iter()
            .map(|column| ViewColumn {
                meta: column.meta.clone(),
                values: kept.iter().map(|&pos| column.values[pos].clone()).collect(),
            })
            .collect();
        FilterOutcome::Rows(FilteredView {
            dataset: self.dataset,
            indices: kept.iter().map(|&pos| self.indices[pos]).collect(),
            local,
        })
    }
}

struct RowPredicate<'c> {
    room_type: Option<usize>,
    rate: Option<usize>,
    superhost: Option<usize>,
    criteria: &'c FilterCriteria,
}

impl<'c> RowPredicate<'c> {
    fn new(dataset: &Dataset, criteria: &'c FilterCriteria) -> Self {
        Self {
            room_type: dataset.column_index(ROOM_TYPE_CLEAN),
            rate: dataset.column_index(NIGHTLY_RATE),
            superhost: dataset.column_index(SUPERHOST),
            criteria,
        }
    }

    fn matches(&self, row: &Row) -> bool {
        let cell = |index: Option<usize>| index.and_then(|idx| row[idx].as_ref());

        let room_ok = cell(self.room_type)
            .and_then(Value::as_str)
            .is_some_and(|room| self.criteria.room_types.contains(room));
        if !room_ok {
            return false;
        }
        let price_ok = cell(self.rate)
            .and_then(Value::as_f64)
            .is_some_and(|price| self.criteria.price_range.contains(price));
        if !price_ok {
            return false;
        }
        self.criteria
            .host_status
            .admits(cell(self.superhost).and_then(Value::as_bool))
    }
}
