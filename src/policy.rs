//! Missing-value policy.
//!
//! The policy is an ordered table of [`ImputationRule`]s. Every column is
//! assigned to the first rule whose selector matches it, once, before any
//! filling happens; later rules never revisit a column an earlier rule
//! claimed. Rules run in table order, so a median computed for one capacity
//! column only ever sees that column's own present values.

use std::collections::BTreeMap;

use log::debug;

use crate::{
    columns::{CAPACITY_COLUMNS, FLAG_COLUMNS},
    data::Value,
    dataset::Frame,
    normalize::{coerce_bool, numeric_value},
    schema::{ColumnMeta, ColumnType},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnSelector {
    /// Exact column names.
    Named(&'static [&'static str]),
    /// Column name contains any needle, compared case-insensitively.
    NameContains {
        needles: &'static [&'static str],
        numeric_only: bool,
    },
}

impl ColumnSelector {
    pub fn matches(&self, column: &ColumnMeta) -> bool {
        match self {
            ColumnSelector::Named(names) => names.contains(&column.name.as_str()),
            ColumnSelector::NameContains {
                needles,
                numeric_only,
            } => {
                if *numeric_only && !column.datatype.is_numeric() {
                    return false;
                }
                let lowered = column.name.to_ascii_lowercase();
                needles.iter().any(|needle| lowered.contains(needle))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillStrategy {
    /// Median of the column's present numeric values.
    Median,
    Zero,
    /// Fill with `false`, then coerce every cell to a boolean.
    FalseFlag,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImputationRule {
    pub label: &'static str,
    pub selector: ColumnSelector,
    pub strategy: FillStrategy,
}

/// One column claimed by one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFill {
    pub column_index: usize,
    pub column: String,
    pub rule_index: usize,
}

/// Number of cells filled, per column name.
pub type FillReport = BTreeMap<String, usize>;

#[derive(Debug, Clone)]
pub struct MissingValuePolicy {
    rules: Vec<ImputationRule>,
}

impl Default for MissingValuePolicy {
    fn default() -> Self {
        Self::new(vec![
            ImputationRule {
                label: "capacity",
                selector: ColumnSelector::Named(CAPACITY_COLUMNS),
                strategy: FillStrategy::Median,
            },
            ImputationRule {
                label: "ratings and reviews",
                selector: ColumnSelector::NameContains {
                    needles: &["rating", "num_reviews"],
                    numeric_only: false,
                },
                strategy: FillStrategy::Zero,
            },
            ImputationRule {
                label: "revenue and rates",
                selector: ColumnSelector::NameContains {
                    needles: &["revenue", "rate", "revpar"],
                    numeric_only: true,
                },
                strategy: FillStrategy::Zero,
            },
            ImputationRule {
                label: "host flags",
                selector: ColumnSelector::Named(FLAG_COLUMNS),
                strategy: FillStrategy::FalseFlag,
            },
        ])
    }
}

impl MissingValuePolicy {
    pub fn new(rules: Vec<ImputationRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[ImputationRule] {
        &self.rules
    }

    /// Assigns each column to the first matching rule. The result is ordered
    /// by rule, then by column position.
    pub fn plan(&self, columns: &[ColumnMeta]) -> Vec<PlannedFill> {
        let mut plan = columns
            .iter()
            .enumerate()
            .filter_map(|(column_index, column)| {
                let rule_index = self
                    .rules
                    .iter()
                    .position(|rule| rule.selector.matches(column))?;
                Some(PlannedFill {
                    column_index,
                    column: column.name.clone(),
                    rule_index,
                })
            })
            .collect::<Vec<_>>();
        plan.sort_by_key(|fill| (fill.rule_index, fill.column_index));
        plan
    }

    pub fn apply(&self, frame: &mut Frame) -> FillReport {
        let plan = self.plan(frame.columns());
        let mut report = FillReport::new();
        for fill in plan {
            let rule = &self.rules[fill.rule_index];
            let filled = apply_strategy(frame, fill.column_index, rule.strategy);
            debug!(
                "Rule '{}' filled {} cell(s) in column '{}'",
                rule.label, filled, fill.column
            );
            report.insert(fill.column, filled);
        }
        report
    }
}

fn apply_strategy(frame: &mut Frame, index: usize, strategy: FillStrategy) -> usize {
    let datatype = frame.column_type(index);
    let fill = match strategy {
        FillStrategy::Median => {
            let present = frame
                .column_values(index)
                .flatten()
                .filter_map(numeric_value)
                .collect::<Vec<_>>();
            match median(present) {
                Some(m) => {
                    let value = Value::number_for(&datatype, m);
                    if matches!(value, Value::Float(_)) && datatype == ColumnType::Integer {
                        frame.set_column_type(index, ColumnType::Float);
                    }
                    value
                }
                None => return 0,
            }
        }
        FillStrategy::Zero => Value::number_for(&datatype, 0.0),
        FillStrategy::FalseFlag => Value::Boolean(false),
    };

    let mut filled = 0usize;
    let coerce = strategy == FillStrategy::FalseFlag;
    frame.map_column(index, |cell| match cell {
        None => {
            filled += 1;
            Some(fill.clone())
        }
        Some(value) if coerce => Some(Value::Boolean(coerce_bool(&value))),
        Some(value) => Some(value),
    });
    if coerce {
        frame.set_column_type(index, ColumnType::Boolean);
    }
    filled
}

pub fn median(mut values: Vec<f64>) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
