//! Aggregation layer: pure reductions over a [`FilteredView`].

use std::collections::BTreeMap;

use itertools::Itertools;
use serde::Serialize;

use crate::{
    columns::{
        BEDROOMS, GUESTS, HOST_NAME, HOST_STATUS, LATITUDE, LISTING_NAME, LONGITUDE,
        NIGHTLY_RATE, NUM_REVIEWS, OCCUPANCY_PERCENTAGE, PRICE_PER_GUEST, RATING_OVERALL,
        ROOM_TYPE_CLEAN, SUPERHOST,
    },
    data::Value,
    filter::FilteredView,
    schema::ColumnType,
};

pub const SUPERHOST_LABEL: &str = "Superhost";
pub const REGULAR_HOST_LABEL: &str = "Regular Host";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean_price: Option<f64>,
    pub mean_occupancy: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    pub group: String,
    pub mean: Option<f64>,
    /// Rows in the group, including rows whose value is missing.
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueShare {
    pub value: String,
    pub count: usize,
    pub fraction: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapCenter {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapMarker {
    pub latitude: f64,
    pub longitude: f64,
    pub room_type_clean: Option<String>,
    pub price_per_guest: f64,
    pub occupancy_percentage: f64,
    pub listing_name: Option<String>,
    pub num_reviews: Option<f64>,
    pub host_name: Option<String>,
    pub superhost: bool,
    pub guests: Option<f64>,
    pub bedrooms: Option<f64>,
    pub nightly_rate: Option<f64>,
    pub rating_overall: Option<f64>,
}

pub fn host_status_label(superhost: bool) -> &'static str {
    if superhost {
        SUPERHOST_LABEL
    } else {
        REGULAR_HOST_LABEL
    }
}

/// Adds the view-local `host_status` label column.
pub fn with_host_status(view: FilteredView<'_>) -> FilteredView<'_> {
    let labels = flags(&view, SUPERHOST)
        .into_iter()
        .map(|flag| Some(Value::String(host_status_label(flag).to_string())))
        .collect();
    view.with_column(HOST_STATUS, ColumnType::String, labels)
}

pub fn summary(view: &FilteredView<'_>) -> Summary {
    Summary {
        count: view.len(),
        mean_price: mean(numbers(view, NIGHTLY_RATE).into_iter().flatten()),
        mean_occupancy: mean(numbers(view, OCCUPANCY_PERCENTAGE).into_iter().flatten()),
    }
}

/// Mean of `value_column` per present value of `group_column`, ordered by
/// group. Rows without a group are skipped; missing values are skipped within
/// their group.
pub fn group_mean(view: &FilteredView<'_>, group_column: &str, value_column: &str) -> Vec<GroupMean> {
    let Some(groups) = view.column_values(group_column) else {
        return Vec::new();
    };
    let values = numbers(view, value_column);

    let mut buckets: BTreeMap<&Value, (usize, Vec<f64>)> = BTreeMap::new();
    for (group, value) in groups.into_iter().zip(values) {
        let Some(group) = group else {
            continue;
        };
        let bucket = buckets.entry(group).or_default();
        bucket.0 += 1;
        bucket.1.extend(value);
    }
    buckets
        .into_iter()
        .map(|(group, (count, values))| GroupMean {
            group: group.as_display(),
            mean: mean(values),
            count,
        })
        .collect()
}

/// Distribution of the non-missing values of `column`, most frequent first.
pub fn value_counts_with_percentage(view: &FilteredView<'_>, column: &str) -> Vec<ValueShare> {
    let Some(cells) = view.column_values(column) else {
        return Vec::new();
    };
    let counts = cells.into_iter().flatten().map(Value::as_display).counts();
    let total = counts.values().sum::<usize>();
    counts
        .into_iter()
        .map(|(value, count)| ValueShare {
            value,
            count,
            fraction: count as f64 / total as f64,
        })
        .sorted_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)))
        .collect()
}

pub fn map_center(view: &FilteredView<'_>) -> Option<MapCenter> {
    Some(MapCenter {
        latitude: mean(numbers(view, LATITUDE).into_iter().flatten())?,
        longitude: mean(numbers(view, LONGITUDE).into_iter().flatten())?,
    })
}

pub fn markers(view: &FilteredView<'_>) -> Vec<MapMarker> {
    let latitude = numbers(view, LATITUDE);
    let longitude = numbers(view, LONGITUDE);
    let room_type = texts(view, ROOM_TYPE_CLEAN);
    let price_per_guest = numbers(view, PRICE_PER_GUEST);
    let occupancy = numbers(view, OCCUPANCY_PERCENTAGE);
    let listing_name = texts(view, LISTING_NAME);
    let num_reviews = numbers(view, NUM_REVIEWS);
    let host_name = texts(view, HOST_NAME);
    let superhost = flags(view, SUPERHOST);
    let guests = numbers(view, GUESTS);
    let bedrooms = numbers(view, BEDROOMS);
    let nightly_rate = numbers(view, NIGHTLY_RATE);
    let rating = numbers(view, RATING_OVERALL);

    (0..view.len())
        .filter_map(|i| {
            Some(MapMarker {
                latitude: latitude[i]?,
                longitude: longitude[i]?,
                room_type_clean: room_type[i].clone(),
                price_per_guest: price_per_guest[i].unwrap_or(0.0),
                occupancy_percentage: occupancy[i].unwrap_or(0.0),
                listing_name: listing_name[i].clone(),
                num_reviews: num_reviews[i],
                host_name: host_name[i].clone(),
                superhost: superhost[i],
                guests: guests[i],
                bedrooms: bedrooms[i],
                nightly_rate: nightly_rate[i],
                rating_overall: rating[i],
            })
        })
        .collect()
}

pub fn mean<I>(values: I) -> Option<f64>
where
    I: IntoIterator<Item = f64>,
{
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

/// Numeric cells of `column` in view order; an absent column reads as all
/// missing.
fn numbers(view: &FilteredView<'_>, column: &str) -> Vec<Option<f64>> {
    match view.column_values(column) {
        Some(cells) => cells
            .into_iter()
            .map(|cell| cell.and_then(Value::as_f64))
            .collect(),
        None => vec![None; view.len()],
    }
}

fn texts(view: &FilteredView<'_>, column: &str) -> Vec<Option<String>> {
    match view.column_values(column) {
        Some(cells) => cells
            .into_iter()
            .map(|cell| cell.map(Value::as_display))
            .collect(),
        None => vec![None; view.len()],
    }
}

fn flags(view: &FilteredView<'_>, column: &str) -> Vec<bool> {
    match view.column_values(column) {
        Some(cells) => cells
            .into_iter()
            .map(|cell| cell.and_then(Value::as_bool).unwrap_or(false))
            .collect(),
        None => vec![false; view.len()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        columns::FORCED_TEXT_COLUMNS, dataset::Dataset, dataset::Frame, loader,
        policy::MissingValuePolicy,
    };
    use std::path::Path;

    fn dataset() -> Dataset {
        let headers = [
            "listing_id",
            "latitude",
            "longitude",
            "room_type",
            "ttm_avg_rate_native",
            "ttm_revenue_native",
            "ttm_occupancy",
            "superhost",
            "guests",
        ];
        let rows: &[&[&str]] = &[
            &["A1", "-8.0", "115.0", "private_room", "100", "1000", "0.5", "true", "2"],
            &["A2", "-9.0", "116.0", "entire_home", "300", "", "0.25", "false", "3"],
            &["A3", "-10.0", "117.0", "entire_home", "500", "3000", "", "false", "5"],
            &["A4", "-11.0", "118.0", "", "200", "2000", "1.0", "true", "0"],
        ];
        let frame = Frame::from_records(
            headers.iter().map(|h| h.to_string()).collect(),
            rows.iter()
                .map(|r| r.iter().map(|c| c.to_string()).collect())
                .collect(),
            FORCED_TEXT_COLUMNS,
        );
        loader::clean(frame, Path::new("memory.csv"), &MissingValuePolicy::default())
            .expect("clean")
    }

    #[test]
    fn summary_reports_count_and_means() {
        let dataset = dataset();
        let s = summary(&FilteredView::all(&dataset));
        assert_eq!(s.count, 4);
        assert_eq!(s.mean_price, Some(275.0));
        assert_eq!(s.mean_occupancy, Some(43.75));
    }

    #[test]
    fn group_mean_orders_groups_and_skips_missing_keys() {
        let dataset = dataset();
        let groups = group_mean(&FilteredView::all(&dataset), ROOM_TYPE_CLEAN, NIGHTLY_RATE);
        assert_eq!(
            groups,
            vec![
                GroupMean {
                    group: "Entire Home".into(),
                    mean: Some(400.0),
                    count: 2
                },
                GroupMean {
                    group: "Private Room".into(),
                    mean: Some(100.0),
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn value_counts_rank_by_count_then_value() {
        let dataset = dataset();
        let shares = value_counts_with_percentage(&FilteredView::all(&dataset), ROOM_TYPE_CLEAN);
        assert_eq!(shares.len(), 2);
        assert_eq!(shares[0].value, "Entire Home");
        assert!((shares[0].fraction - 2.0 / 3.0).abs() < 1e-12);
        let total: f64 = shares.iter().map(|s| s.fraction).sum();
        assert!((total - 1.0).abs() < 1e-12);
    }

    #[test]
    fn host_status_column_labels_rows() {
        let dataset = dataset();
        let view = with_host_status(FilteredView::all(&dataset));
        let revenue = group_mean(&view, HOST_STATUS, "ttm_revenue_native");
        assert_eq!(revenue[0].group, REGULAR_HOST_LABEL);
        assert_eq!(revenue[0].mean, Some(1500.0));
        assert_eq!(revenue[1].group, SUPERHOST_LABEL);
        assert_eq!(revenue[1].mean, Some(1500.0));
        assert!(dataset.column_index(HOST_STATUS).is_none());
    }

    #[test]
    fn map_center_and_markers_cover_the_view() {
        let dataset = dataset();
        let view = FilteredView::all(&dataset);
        let center = map_center(&view).expect("center");
        assert_eq!(center.latitude, -9.5);
        let markers = markers(&view);
        assert_eq!(markers.len(), 4);
        assert_eq!(markers[0].price_per_guest, 50.0);
        assert_eq!(markers[3].price_per_guest, 0.0);
        assert!(markers[3].superhost);
        assert_eq!(markers[3].room_type_clean, None);
    }

    #[test]
    fn mean_of_nothing_is_none() {
        assert_eq!(mean(Vec::new()), None);
    }
}
