mod common;

use std::collections::BTreeSet;

use common::{SAMPLE_LISTINGS, TestWorkspace, fixture_path};
use listing_insights::{
    data::Value,
    dataset::Dataset,
    error::InsightsError,
    loader::{self, LoadOptions},
    schema::ColumnType,
};

fn sample() -> Dataset {
    loader::load(&LoadOptions::new(fixture_path(SAMPLE_LISTINGS))).expect("load sample")
}

fn cells(dataset: &Dataset, column: &str) -> Vec<Option<Value>> {
    let index = dataset.column_index(column).expect("column present");
    dataset.column_values(index).map(|v| v.cloned()).collect()
}

fn numbers(dataset: &Dataset, column: &str) -> Vec<Option<f64>> {
    cells(dataset, column)
        .into_iter()
        .map(|v| v.and_then(|v| v.as_f64()))
        .collect()
}

fn id_position(dataset: &Dataset, id: &str) -> usize {
    cells(dataset, "listing_id")
        .iter()
        .position(|v| v.as_ref().and_then(Value::as_str) == Some(id))
        .expect("id present")
}

#[test]
fn load_report_accounts_for_every_dropped_row() {
    let dataset = sample();
    let report = dataset.report();
    assert_eq!(report.rows_read, 10);
    assert_eq!(report.duplicates_removed, 1);
    assert_eq!(report.missing_critical_removed, 1);
    assert_eq!(report.negative_values_removed, 1);
    assert_eq!(report.malformed_cells, 1);
    assert_eq!(report.rows_retained, 7);
    assert_eq!(dataset.len(), 7);
    assert_eq!(report.filled_cells.get("bedrooms"), Some(&1));
    assert_eq!(report.filled_cells.get("superhost"), Some(&1));
}

#[test]
fn retained_rows_have_identity_and_coordinates() {
    let dataset = sample();
    for column in ["listing_id", "latitude", "longitude"] {
        assert!(cells(&dataset, column).iter().all(Option::is_some), "{column}");
    }
}

#[test]
fn listing_ids_are_unique_and_first_occurrence_wins() {
    let dataset = sample();
    let ids = cells(&dataset, "listing_id");
    let distinct = ids.iter().collect::<BTreeSet<_>>();
    assert_eq!(distinct.len(), ids.len());

    let first = id_position(&dataset, "1001");
    assert_eq!(
        dataset.cell(first, dataset.column_index("listing_name").unwrap()),
        Some(&Value::String("Villa Sunset & Pool".into()))
    );
}

#[test]
fn non_negative_columns_hold_no_negative_values() {
    let dataset = sample();
    for column in ["guests", "bedrooms", "beds", "baths", "num_reviews", "cleaning_fee", "min_nights"] {
        assert!(
            numbers(&dataset, column).into_iter().flatten().all(|v| v >= 0.0),
            "{column}"
        );
    }
}

#[test]
fn price_per_guest_is_guarded() {
    let dataset = sample();
    let ppg = numbers(&dataset, "price_per_guest");
    assert!(ppg.iter().all(|v| v.is_some_and(|v| v >= 0.0)));
    assert_eq!(ppg[id_position(&dataset, "1006")], Some(0.0));
    assert_eq!(ppg[id_position(&dataset, "1001")], Some(375_000.0));
}

#[test]
fn occupancy_percentage_scales_the_fraction() {
    let dataset = sample();
    let occupancy = numbers(&dataset, "occupancy_percentage");
    let at = |id: &str| occupancy[id_position(&dataset, id)].expect("present");
    assert!((at("1002") - 45.0).abs() < 1e-9);
    assert_eq!(at("1006"), 0.0);
}

#[test]
fn imputation_and_normalization_apply() {
    let dataset = sample();
    let hotel = id_position(&dataset, "1004");
    let bunk = id_position(&dataset, "1007");
    assert_eq!(cells(&dataset, "bedrooms")[hotel], Some(Value::Integer(1)));
    assert_eq!(cells(&dataset, "superhost")[bunk], Some(Value::Boolean(false)));
    assert_eq!(cells(&dataset, "num_reviews")[bunk], Some(Value::Integer(0)));
    assert_eq!(cells(&dataset, "rating_overall")[bunk], Some(Value::Float(0.0)));
    assert_eq!(
        cells(&dataset, "room_type_clean")[bunk],
        Some(Value::String("Shared Room".into()))
    );
    assert_eq!(
        cells(&dataset, "listing_type")[id_position(&dataset, "1001")],
        Some(Value::String("Entire villa".into()))
    );
    assert_eq!(
        cells(&dataset, "listing_name")[id_position(&dataset, "1002")],
        Some(Value::String("Cozy garden room".into()))
    );
    assert_eq!(
        cells(&dataset, "min_nights")[id_position(&dataset, "1008")],
        None
    );
}

#[test]
fn derived_columns_are_typed() {
    let dataset = sample();
    let ty = |name: &str| {
        dataset.columns()[dataset.column_index(name).expect("column")].datatype
    };
    assert_eq!(ty("listing_id"), ColumnType::String);
    assert_eq!(ty("price_per_guest"), ColumnType::Float);
    assert_eq!(ty("superhost"), ColumnType::Boolean);
    assert_eq!(ty("room_type_clean"), ColumnType::String);
}

#[test]
fn derived_columns_exist_without_their_inputs() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("bare.csv", "listing_id,latitude,longitude\nA1,1.0,2.0\n");
    let dataset = loader::load(&LoadOptions::new(&path)).expect("load");
    assert_eq!(numbers(&dataset, "price_per_guest"), vec![Some(0.0)]);
    assert_eq!(numbers(&dataset, "occupancy_percentage"), vec![Some(0.0)]);
    assert_eq!(cells(&dataset, "room_type_clean"), vec![None]);
}

#[test]
fn tab_separated_sources_are_detected_by_extension() {
    let workspace = TestWorkspace::new();
    let path = workspace.write(
        "listings.tsv",
        "listing_id\tlatitude\tlongitude\tguests\nA1\t1.0\t2.0\t2\n",
    );
    let dataset = loader::load(&LoadOptions::new(&path)).expect("load");
    assert_eq!(dataset.len(), 1);
}

#[test]
fn unavailable_source_is_fatal() {
    let err = loader::load(&LoadOptions::new("/no/such/listings.csv"))
        .err()
        .expect("missing source");
    assert!(matches!(err, InsightsError::SourceUnavailable { .. }));
}

#[test]
fn missing_coordinate_header_is_reported() {
    let workspace = TestWorkspace::new();
    let path = workspace.write("no_lat.csv", "listing_id,longitude\nA1,2.0\n");
    let err = loader::load(&LoadOptions::new(&path))
        .err()
        .expect("missing header");
    assert!(err.to_string().contains("latitude"));
}

#[test]
fn latin1_sources_decode_with_explicit_encoding() {
    let workspace = TestWorkspace::new();
    let path = workspace.path().join("latin1.csv");
    let mut bytes = b"listing_id,latitude,longitude,host_name\nA1,1.0,2.0,Jos".to_vec();
    bytes.push(0xe9);
    bytes.push(b'\n');
    std::fs::write(&path, bytes).expect("write");

    let utf8 = loader::load(&LoadOptions::new(&path));
    assert!(matches!(utf8, Err(InsightsError::Decode { row: 2, .. })));

    let encoding = listing_insights::io_utils::resolve_encoding(Some("latin1")).expect("encoding");
    let dataset = loader::load(&LoadOptions::new(&path).with_encoding(encoding)).expect("load");
    assert_eq!(
        cells(&dataset, "host_name"),
        vec![Some(Value::String("José".into()))]
    );
}
