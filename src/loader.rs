//! Dataset loader.
//!
//! Reads the listing source once and runs the cleaning pipeline over it. The
//! steps are strictly ordered, each one seeing the output of the previous:
//!
//! 1. read the CSV (unreadable source → [`InsightsError::SourceUnavailable`])
//! 2. normalize free-text columns
//! 3. apply the [`MissingValuePolicy`]
//! 4. coerce declared numeric columns (unparseable cells become missing)
//! 5. keep `listing_id` as trimmed text
//! 6. drop duplicate ids, first occurrence wins
//! 7. derive `price_per_guest`
//! 8. derive `occupancy_percentage`
//! 9. derive `room_type_clean`, trim `listing_type`
//! 10. drop rows missing an id or a coordinate
//! 11. drop rows with a negative value in a non-negative column
//! 12. freeze the frame into a [`Dataset`]

use std::{
    collections::{BTreeMap, HashSet},
    path::{Path, PathBuf},
};

use encoding_rs::{Encoding, UTF_8};
use log::{debug, info};
use serde::Serialize;

use crate::{
    cache::FingerprintMode,
    columns::{
        CRITICAL_COLUMNS, FORCED_TEXT_COLUMNS, GUESTS, LISTING_ID, LISTING_TYPE, NIGHTLY_RATE,
        NON_NEGATIVE_COLUMNS, NUMERIC_COLUMNS, OCCUPANCY, OCCUPANCY_PERCENTAGE, PRICE_PER_GUEST,
        ROOM_TYPE, ROOM_TYPE_CLEAN, TEXT_COLUMNS,
    },
    data::Value,
    dataset::{Dataset, Frame, Row},
    error::{InsightsError, Result},
    io_utils,
    normalize::{self, guarded_ratio},
    policy::MissingValuePolicy,
    schema::ColumnType,
};

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub source: PathBuf,
    pub delimiter: Option<u8>,
    pub encoding: &'static Encoding,
    pub fingerprint: FingerprintMode,
}

impl LoadOptions {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            delimiter: None,
            encoding: UTF_8,
            fingerprint: FingerprintMode::default(),
        }
    }

    pub fn with_delimiter(mut self, delimiter: Option<u8>) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_fingerprint(mut self, fingerprint: FingerprintMode) -> Self {
        self.fingerprint = fingerprint;
        self
    }
}

/// What the cleaning pipeline did to the source rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub rows_read: usize,
    pub duplicates_removed: usize,
    pub missing_critical_removed: usize,
    pub negative_values_removed: usize,
    pub malformed_cells: usize,
    pub filled_cells: BTreeMap<String, usize>,
    pub rows_retained: usize,
}

pub fn load(options: &LoadOptions) -> Result<Dataset> {
    let frame = read_frame(options)?;
    clean(frame, &options.source, &MissingValuePolicy::default())
}

pub fn read_frame(options: &LoadOptions) -> Result<Frame> {
    let path = options.source.as_path();
    let delimiter = io_utils::resolve_input_delimiter(path, options.delimiter);
    info!(
        "Reading listings from {:?} (delimiter '{}', encoding {})",
        path,
        crate::printable_delimiter(delimiter),
        options.encoding.name()
    );
    let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)?;
    let headers = io_utils::reader_headers(&mut reader, path, options.encoding)?;

    let mut records = Vec::new();
    for (row_idx, record) in reader.byte_records().enumerate() {
        let record = record.map_err(|source| InsightsError::csv(path, source))?;
        let decoded = io_utils::decode_record(&record, options.encoding).ok_or_else(|| {
            InsightsError::Decode {
                path: path.to_path_buf(),
                row: row_idx + 2,
                encoding: options.encoding.name(),
            }
        })?;
        records.push(decoded);
    }
    Ok(Frame::from_records(headers, records, FORCED_TEXT_COLUMNS))
}

/// Runs steps 2-12 over an already-read frame.
pub fn clean(mut frame: Frame, source: &Path, policy: &MissingValuePolicy) -> Result<Dataset> {
    for column in CRITICAL_COLUMNS {
        if frame.column_index(column).is_none() {
            return Err(InsightsError::MissingColumn {
                path: source.to_path_buf(),
                column: column.to_string(),
            });
        }
    }

    let mut report = LoadReport {
        rows_read: frame.len(),
        ..LoadReport::default()
    };

    normalize_text_columns(&mut frame);
    report.filled_cells = policy.apply(&mut frame);
    report.malformed_cells = coerce_numeric_columns(&mut frame);
    normalize_listing_ids(&mut frame);

    report.duplicates_removed = drop_duplicate_ids(&mut frame);
    if report.duplicates_removed > 0 {
        info!(
            "Removed {} duplicate listing(s) by {}",
            report.duplicates_removed, LISTING_ID
        );
    }

    derive_price_per_guest(&mut frame);
    derive_occupancy_percentage(&mut frame);
    derive_room_type_clean(&mut frame);

    report.missing_critical_removed = drop_missing_critical(&mut frame);
    report.negative_values_removed = drop_negative_values(&mut frame);
    report.rows_retained = frame.len();

    info!(
        "Loaded {} listing(s) from {} row(s) ({} without id or coordinates, {} with negative values, {} malformed cell(s))",
        report.rows_retained,
        report.rows_read,
        report.missing_critical_removed,
        report.negative_values_removed,
        report.malformed_cells
    );
    Ok(Dataset::new(frame, source.to_path_buf(), report))
}

fn normalize_text_columns(frame: &mut Frame) {
    for column in TEXT_COLUMNS {
        if let Some(index) = frame.column_index(column) {
            frame.map_column(index, |cell| {
                let text = cell.map(|value| value.as_display());
                normalize::clean_text(text.as_deref()).map(Value::String)
            });
        }
    }
}

fn coerce_numeric_columns(frame: &mut Frame) -> usize {
    let mut malformed = 0usize;
    for column in NUMERIC_COLUMNS {
        let Some(index) = frame.column_index(column) else {
            continue;
        };
        let mut all_integer = true;
        frame.map_column(index, |cell| match normalize::coerce_numeric(cell) {
            Ok(value) => {
                if matches!(value, Some(Value::Float(_))) {
                    all_integer = false;
                }
                value
            }
            Err(err) => {
                debug!("Column '{column}': {err}; treating as missing");
                malformed += 1;
                None
            }
        });
        let datatype = if all_integer {
            ColumnType::Integer
        } else {
            ColumnType::Float
        };
        frame.set_column_type(index, datatype);
    }
    malformed
}

fn normalize_listing_ids(frame: &mut Frame) {
    if let Some(index) = frame.column_index(LISTING_ID) {
        frame.map_column(index, |cell| {
            cell.map(|value| Value::String(value.as_display().trim().to_string()))
        });
        frame.set_column_type(index, ColumnType::String);
    }
}

fn drop_duplicate_ids(frame: &mut Frame) -> usize {
    let Some(index) = frame.column_index(LISTING_ID) else {
        return 0;
    };
    let mut seen = HashSet::new();
    frame.retain_rows(|row| match row[index].as_ref() {
        Some(id) => seen.insert(id.as_display()),
        None => true,
    })
}

fn numeric_column(frame: &Frame, name: &str) -> Vec<Option<f64>> {
    match frame.column_index(name) {
        Some(index) => frame
            .column_values(index)
            .map(|cell| cell.and_then(Value::as_f64))
            .collect(),
        None => vec![None; frame.len()],
    }
}

fn derive_price_per_guest(frame: &mut Frame) {
    let rates = numeric_column(frame, NIGHTLY_RATE);
    let guests = numeric_column(frame, GUESTS);
    let values = rates
        .into_iter()
        .zip(guests)
        .map(|(rate, guests)| Some(Value::Float(guarded_ratio(rate, guests))))
        .collect();
    frame.put_column(PRICE_PER_GUEST, ColumnType::Float, values);
}

fn derive_occupancy_percentage(frame: &mut Frame) {
    let values = numeric_column(frame, OCCUPANCY)
        .into_iter()
        .map(|fraction| Some(Value::Float(normalize::occupancy_percentage(fraction))))
        .collect();
    frame.put_column(OCCUPANCY_PERCENTAGE, ColumnType::Float, values);
}

fn derive_room_type_clean(frame: &mut Frame) {
    let values = match frame.column_index(ROOM_TYPE) {
        Some(index) => frame
            .column_values(index)
            .map(|cell| cell.map(|raw| Value::String(normalize::room_type_clean(&raw.as_display()))))
            .collect(),
        None => vec![None; frame.len()],
    };
    frame.put_column(ROOM_TYPE_CLEAN, ColumnType::String, values);

    if let Some(index) = frame.column_index(LISTING_TYPE) {
        frame.map_column(index, |cell| match cell {
            Some(Value::String(text)) => normalize::trim_text(Some(&text)).map(Value::String),
            other => other,
        });
    }
}

fn drop_missing_critical(frame: &mut Frame) -> usize {
    let indices = CRITICAL_COLUMNS
        .iter()
        .filter_map(|name| frame.column_index(name))
        .collect::<Vec<_>>();
    frame.retain_rows(|row| indices.iter().all(|&index| row[index].is_some()))
}

fn drop_negative_values(frame: &mut Frame) -> usize {
    let indices = NON_NEGATIVE_COLUMNS
        .iter()
        .filter_map(|name| frame.column_index(name))
        .filter(|&index| frame.column_type(index).is_numeric())
        .collect::<Vec<_>>();
    frame.retain_rows(|row| indices.iter().all(|&index| !is_negative(row, index)))
}

fn is_negative(row: &Row, index: usize) -> bool {
    row[index]
        .as_ref()
        .and_then(Value::as_f64)
        .is_some_and(|value| value < 0.0)
}
