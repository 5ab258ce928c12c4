//! Required-field checks, numeric-format checks and error aggregation.
//!
//! Required-ness comes from the schema and is only evaluated on demand
//! (advance or submit). Numeric format is checked on every write to a decimal
//! field and remembered in [`NumericErrors`] until the field is corrected.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::survey::path::{AssetField, DebtField, FieldKey, FieldPath};
use crate::survey::record::AnswerRecord;
use crate::survey::schema::{self, ColumnSpec, FieldKind, SectionId};

pub const NUMERIC_MESSAGE: &str = "请输入有效的数字";

static DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^-?[0-9]*\.?[0-9]*$").expect("decimal pattern compiles"));

/// Accepts an optional leading minus, ASCII digits and at most one dot.
/// The empty string is valid.
pub fn is_valid_decimal(value: &str) -> bool {
    value.is_empty() || DECIMAL.is_match(value)
}

/// Outstanding numeric-format errors keyed by field path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NumericErrors {
    entries: BTreeMap<FieldPath, &'static str>,
}

impl NumericErrors {
    /// Re-checks `value` for `path`, recording or clearing the error.
    /// Returns the message when the value is malformed.
    pub fn check(&mut self, path: FieldPath, value: &str) -> Option<&'static str> {
        if is_valid_decimal(value) {
            self.entries.remove(&path);
            None
        } else {
            self.entries.insert(path, NUMERIC_MESSAGE);
            Some(NUMERIC_MESSAGE)
        }
    }

    pub fn get(&self, path: &FieldPath) -> Option<&'static str> {
        self.entries.get(path).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Paths in questionnaire order.
    pub fn paths(&self) -> impl Iterator<Item = &FieldPath> + '_ {
        self.entries.keys()
    }

    /// Keeps row-scoped errors attached to their rows after `removed` is
    /// taken out of `list`: the removed row's errors are dropped and later
    /// rows move up by one.
    pub fn shift_rows(&mut self, list: FieldKey, removed: usize) {
        let entries = std::mem::take(&mut self.entries);
        for (path, message) in entries {
            if path.anchor() != list {
                self.entries.insert(path, message);
                continue;
            }
            let shifted = match path {
                FieldPath::Debt { row, .. } | FieldPath::Asset { row, .. } if row == removed => {
                    continue
                }
                FieldPath::Debt { row, field } if row > removed => FieldPath::Debt {
                    row: row - 1,
                    field,
                },
                FieldPath::Asset { row, field } if row > removed => FieldPath::Asset {
                    row: row - 1,
                    field,
                },
                other => other,
            };
            self.entries.insert(shifted, message);
        }
    }
}

/// One missing required answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldFailure {
    pub path: FieldPath,
    /// Question tag, e.g. `问题6`.
    pub tag: &'static str,
    pub detail: String,
}

impl FieldFailure {
    pub fn section(&self) -> SectionId {
        schema::section_of(&self.path)
    }

    pub fn message(&self) -> String {
        format!("{}：{}", self.tag, self.detail)
    }
}

/// Every missing required answer, in questionnaire order.
pub fn validate_all(record: &AnswerRecord) -> Vec<FieldFailure> {
    let mut failures = Vec::new();
    for spec in schema::fields() {
        match spec.key {
            FieldKey::DebtItems => {
                for row in 0..record.debt_items.len() {
                    let cells = schema::debt_columns().iter().zip(DebtField::ALL);
                    for (column, field) in cells {
                        let path = FieldPath::Debt { row, field: *field };
                        push_missing_cell(&mut failures, record, spec.tag, column, path, row);
                    }
                }
            }
            FieldKey::AssetItems => {
                for row in 0..record.asset_items.len() {
                    let cells = schema::asset_columns().iter().zip(AssetField::ALL);
                    for (column, field) in cells {
                        let path = FieldPath::Asset { row, field: *field };
                        push_missing_cell(&mut failures, record, spec.tag, column, path, row);
                    }
                }
            }
            key => {
                let Some(message) = spec.required else {
                    continue;
                };
                let path = FieldPath::Scalar(key);
                if is_blank(record, &path) {
                    failures.push(FieldFailure {
                        path,
                        tag: spec.tag,
                        detail: message.to_string(),
                    });
                }
            }
        }
    }
    failures
}

fn push_missing_cell(
    failures: &mut Vec<FieldFailure>,
    record: &AnswerRecord,
    tag: &'static str,
    column: &ColumnSpec,
    path: FieldPath,
    row: usize,
) {
    let Some((noun, verb)) = column.missing else {
        return;
    };
    if is_blank(record, &path) {
        failures.push(FieldFailure {
            path,
            tag,
            detail: format!("第{}项{}未{}", row + 1, noun, verb),
        });
    }
}

fn is_blank(record: &AnswerRecord, path: &FieldPath) -> bool {
    record
        .get(path)
        .map_or(true, |value| value.trim().is_empty())
}

/// User-facing line for a numeric-format error.
pub fn numeric_message(path: &FieldPath) -> String {
    let subject = match path {
        FieldPath::Scalar(key) => schema::field(*key).label.to_string(),
        FieldPath::Debt { row, field } => row_subject(schema::debt_column(*field), *row),
        FieldPath::Asset { row, field } => row_subject(schema::asset_column(*field), *row),
    };
    format!("{}：{}", subject, NUMERIC_MESSAGE)
}

fn row_subject(column: &ColumnSpec, row: usize) -> String {
    let noun = column.missing.map_or(column.label, |(noun, _)| noun);
    format!("第{}项{}", row + 1, noun)
}

/// Schema failures first, then numeric-format errors, each in questionnaire
/// order.
pub fn collect_messages(failures: &[FieldFailure], numeric: &NumericErrors) -> Vec<String> {
    failures
        .iter()
        .map(FieldFailure::message)
        .chain(numeric.paths().map(numeric_message))
        .collect()
}

/// Lowest section index owning a failing path; `0` when nothing fails.
pub fn first_failing_section(failures: &[FieldFailure], numeric: &NumericErrors) -> usize {
    failures
        .iter()
        .map(|failure| failure.path)
        .chain(numeric.paths().copied())
        .map(|path| schema::section_of(&path).index())
        .min()
        .unwrap_or(0)
}

/// Aggregated messages shown when a submission is held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub messages: Vec<String>,
    pub first_section: usize,
}

impl ErrorReport {
    /// Checks the whole record; `None` when it is complete and well formed.
    pub fn for_record(record: &AnswerRecord, numeric: &NumericErrors) -> Option<Self> {
        let failures = validate_all(record);
        Self::from_parts(&failures, numeric)
    }

    /// Checks only the paths owned by `section`.
    pub fn for_section(
        record: &AnswerRecord,
        numeric: &NumericErrors,
        section: SectionId,
    ) -> Option<Self> {
        let failures: Vec<FieldFailure> = validate_all(record)
            .into_iter()
            .filter(|failure| failure.section() == section)
            .collect();
        let mut scoped = numeric.clone();
        scoped
            .entries
            .retain(|path, _| schema::section_of(path) == section);
        Self::from_parts(&failures, &scoped)
    }

    fn from_parts(failures: &[FieldFailure], numeric: &NumericErrors) -> Option<Self> {
        if failures.is_empty() && numeric.is_empty() {
            return None;
        }
        Some(Self {
            messages: collect_messages(failures, numeric),
            first_section: first_failing_section(failures, numeric),
        })
    }
}

/// Returned when the advance gate refuses to leave a section.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} answer(s) need attention before continuing", .report.messages.len())]
pub struct ValidationFailure {
    pub report: ErrorReport,
}

pub(crate) fn is_decimal_path(path: &FieldPath) -> bool {
    schema::kind_of(path) == FieldKind::Decimal
}
