use std::{cmp::Ordering, fmt};

use crate::schema::ColumnType;

#[derive(Debug, Clone)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl Value {
    pub fn as_display(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => {
                if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
            Value::Boolean(b) => b.to_string(),
        }
    }

    /// Numeric view of the cell. Text and booleans are not numbers here; use
    /// [`crate::normalize::coerce_numeric`] for forgiving conversion.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::String(_) | Value::Boolean(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Builds a numeric cell that fits a column of type `ty`, keeping integer
    /// columns integral when the value allows it.
    pub fn number_for(ty: &ColumnType, value: f64) -> Value {
        if matches!(ty, ColumnType::Integer) && value.fract() == 0.0 {
            Value::Integer(value as i64)
        } else {
            Value::Float(value)
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Boolean(_) => 0,
            Value::Integer(_) | Value::Float(_) => 1,
            Value::String(_) => 2,
        }
    }

    fn variant(&self) -> u8 {
        match self {
            Value::Boolean(_) => 0,
            Value::Integer(_) => 1,
            Value::Float(_) => 2,
            Value::String(_) => 3,
        }
    }
}

/// Equality is defined by [`Ord`]: cells are equal only when they share a
/// variant and compare equal within it, floats by `total_cmp`.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Integer(a), Value::Integer(b)) => a.cmp(b),
            (Value::Float(a), Value::Float(b)) => a.total_cmp(b),
            (Value::Boolean(a), Value::Boolean(b)) => a.cmp(b),
            (left, right) => match (left.as_f64(), right.as_f64()) {
                (Some(a), Some(b)) => a
                    .total_cmp(&b)
                    .then_with(|| left.variant().cmp(&right.variant())),
                _ => left.rank().cmp(&right.rank()),
            },
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

/// Tokens the reader treats as "no value", compared case-insensitively after
/// trimming.
const MISSING_TOKENS: &[&str] = &[
    "", "na", "n/a", "nan", "-nan", "null", "none", "<na>", "#n/a", "#na", "nil",
];

pub fn is_missing_token(raw: &str) -> bool {
    let lowered = raw.trim().to_ascii_lowercase();
    MISSING_TOKENS.contains(&lowered.as_str())
}

pub fn parse_bool_token(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Some(true),
        "false" | "f" | "no" | "n" | "0" => Some(false),
        _ => None,
    }
}

/// Parses a finite number; `NaN` and infinities read as missing.
pub fn parse_finite_f64(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parses a raw cell according to its inferred column type. Cells that do not
/// fit the type are kept as text so nothing is lost before coercion.
pub fn parse_cell(raw: &str, ty: &ColumnType) -> Option<Value> {
    if is_missing_token(raw) {
        return None;
    }
    let parsed = match ty {
        ColumnType::String => None,
        ColumnType::Integer => raw.trim().parse::<i64>().ok().map(Value::Integer),
        ColumnType::Float => parse_finite_f64(raw).map(Value::Float),
        ColumnType::Boolean => parse_bool_token(raw).map(Value::Boolean),
    };
    Some(parsed.unwrap_or_else(|| Value::String(raw.to_string())))
}
