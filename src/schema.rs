//! Column types and type inference for listing sources.
//!
//! Every present cell of a column is examined (there is no sampling, the
//! whole file is held in memory anyway). A column is `Integer` when every
//! present cell parses as `i64`, otherwise `Boolean` when every present cell
//! is a boolean token, `Float` when every present cell parses as a finite
//! `f64`, and `String` otherwise. Columns named in `forced_text` are always
//! `String`.

use std::fmt;

use crate::data::{is_missing_token, parse_bool_token, parse_finite_f64};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    String,
    Integer,
    Float,
    Boolean,
}

impl ColumnType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnType::String => "string",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMeta {
    pub name: String,
    pub datatype: ColumnType,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, datatype: ColumnType) -> Self {
        Self {
            name: name.into(),
            datatype,
        }
    }
}

#[derive(Debug, Clone)]
struct TypeCandidate {
    possible_boolean: bool,
    possible_integer: bool,
    possible_float: bool,
    observed: usize,
}

impl TypeCandidate {
    fn new() -> Self {
        Self {
            possible_boolean: true,
            possible_integer: true,
            possible_float: true,
            observed: 0,
        }
    }

    fn observe(&mut self, raw: &str) {
        if is_missing_token(raw) {
            return;
        }
        self.observed += 1;
        if self.possible_boolean && parse_bool_token(raw).is_none() {
            self.possible_boolean = false;
        }
        if self.possible_integer && raw.trim().parse::<i64>().is_err() {
            self.possible_integer = false;
        }
        if self.possible_float && parse_finite_f64(raw).is_none() {
            self.possible_float = false;
        }
    }

    fn decide(&self) -> ColumnType {
        if self.observed == 0 {
            // An all-missing column reads as numeric.
            ColumnType::Float
        } else if self.possible_integer {
            // 0/1 columns are integers, not flags.
            ColumnType::Integer
        } else if self.possible_boolean {
            ColumnType::Boolean
        } else if self.possible_float {
            ColumnType::Float
        } else {
            ColumnType::String
        }
    }
}

pub fn infer_columns(
    headers: &[String],
    records: &[Vec<String>],
    forced_text: &[&str],
) -> Vec<ColumnMeta> {
    let mut candidates = vec![TypeCandidate::new(); headers.len()];
    for record in records {
        for (idx, raw) in record.iter().enumerate().take(headers.len()) {
            candidates[idx].observe(raw);
        }
    }
    headers
        .iter()
        .zip(candidates)
        .map(|(name, candidate)| {
            let datatype = if forced_text.contains(&name.as_str()) {
                ColumnType::String
            } else {
                candidate.decide()
            };
            ColumnMeta::new(name.clone(), datatype)
        })
        .collect()
}
