//! The questionnaire state machine.
//!
//! [`SurveySession`] is the only place where answers change. It owns the
//! record, the outstanding numeric-format errors, the section pointer and the
//! submission phase, and routes every write through the validation layer.

use serde::{Deserialize, Serialize};

use crate::errors::{Result, SurveyError};
use crate::survey::items::RowId;
use crate::survey::path::{AssetField, DebtField, FieldKey, FieldPath};
use crate::survey::record::{AnswerRecord, FinalizedRecord};
use crate::survey::schema::{SectionId, SECTION_COUNT};
use crate::survey::validation::{self, ErrorReport, NumericErrors, ValidationFailure};

/// Validation applied when moving to the next section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceGate {
    /// Never blocks; everything is checked at submission.
    #[default]
    Deferred,
    /// Blocks on any failure anywhere in the record.
    WholeForm,
    /// Blocks on failures owned by the section being left.
    CurrentSection,
}

impl AdvanceGate {
    pub const ALL: &'static [AdvanceGate] = &[
        AdvanceGate::Deferred,
        AdvanceGate::WholeForm,
        AdvanceGate::CurrentSection,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AdvanceGate::Deferred => "deferred",
            AdvanceGate::WholeForm => "whole_form",
            AdvanceGate::CurrentSection => "current_section",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let wanted = raw.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL.iter().copied().find(|gate| gate.as_str() == wanted)
    }
}

/// What happens to a malformed value typed into a decimal field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericInputPolicy {
    /// Keep the previous value.
    #[default]
    Reject,
    /// Store the value anyway; the error still blocks submission.
    Store,
}

impl NumericInputPolicy {
    pub const ALL: &'static [NumericInputPolicy] =
        &[NumericInputPolicy::Reject, NumericInputPolicy::Store];

    pub fn as_str(self) -> &'static str {
        match self {
            NumericInputPolicy::Reject => "reject",
            NumericInputPolicy::Store => "store",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let wanted = raw.trim().to_ascii_lowercase();
        Self::ALL.iter().copied().find(|policy| policy.as_str() == wanted)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionOptions {
    pub advance_gate: AdvanceGate,
    pub numeric_policy: NumericInputPolicy,
}

/// Display collaborator notified after every section change.
pub trait Viewport {
    fn scroll_to_top(&mut self);
}

/// Viewport that ignores notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopViewport;

impl Viewport for NoopViewport {
    fn scroll_to_top(&mut self) {}
}

/// Result of a single field write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Applied,
    /// Malformed decimal left out of the record.
    Dropped(String),
    /// Malformed decimal stored and flagged.
    Flagged(String),
}

impl FieldUpdate {
    pub fn message(&self) -> Option<&str> {
        match self {
            FieldUpdate::Applied => None,
            FieldUpdate::Dropped(message) | FieldUpdate::Flagged(message) => Some(message),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Accepted(FinalizedRecord),
    /// Outstanding failures; resolve with [`SurveySession::return_to_edit`]
    /// or [`SurveySession::ignore_and_submit`].
    Held(ErrorReport),
}

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Editing,
    ReviewPending(ErrorReport),
    Submitted(FinalizedRecord),
}

pub struct SurveySession {
    record: AnswerRecord,
    numeric: NumericErrors,
    section: usize,
    options: SessionOptions,
    phase: Phase,
    viewport: Box<dyn Viewport>,
}

impl Default for SurveySession {
    fn default() -> Self {
        Self::new(SessionOptions::default())
    }
}

impl SurveySession {
    pub fn new(options: SessionOptions) -> Self {
        Self::with_viewport(options, Box::new(NoopViewport))
    }

    pub fn with_viewport(options: SessionOptions, viewport: Box<dyn Viewport>) -> Self {
        Self {
            record: AnswerRecord::default(),
            numeric: NumericErrors::default(),
            section: 0,
            options,
            phase: Phase::Editing,
            viewport,
        }
    }

    /// Resumes editing an existing record, re-checking its decimal fields.
    pub fn from_record(record: AnswerRecord, options: SessionOptions) -> Self {
        let mut session = Self::new(options);
        session.numeric = numeric_errors_of(&record);
        session.record = record;
        session
    }

    pub fn record(&self) -> &AnswerRecord {
        &self.record
    }

    pub fn numeric_errors(&self) -> &NumericErrors {
        &self.numeric
    }

    pub fn options(&self) -> SessionOptions {
        self.options
    }

    pub fn is_editing(&self) -> bool {
        self.phase == Phase::Editing
    }

    pub fn pending_review(&self) -> Option<&ErrorReport> {
        match &self.phase {
            Phase::ReviewPending(report) => Some(report),
            _ => None,
        }
    }

    pub fn finalized(&self) -> Option<&FinalizedRecord> {
        match &self.phase {
            Phase::Submitted(record) => Some(record),
            _ => None,
        }
    }

    // Navigation

    pub fn current_section(&self) -> usize {
        self.section
    }

    pub fn current_section_id(&self) -> SectionId {
        SectionId::from_index(self.section).unwrap_or(SectionId::BasicInfo)
    }

    pub fn section_count(&self) -> usize {
        SECTION_COUNT
    }

    pub fn is_last_section(&self) -> bool {
        self.section + 1 == SECTION_COUNT
    }

    pub fn progress_fraction(&self) -> f64 {
        (self.section + 1) as f64 / SECTION_COUNT as f64
    }

    /// Moves to the next section if the configured gate allows it.
    ///
    /// At the last section this succeeds without moving.
    pub fn advance(&mut self) -> std::result::Result<(), ValidationFailure> {
        if self.is_last_section() {
            return Ok(());
        }
        let blocked = match self.options.advance_gate {
            AdvanceGate::Deferred => None,
            AdvanceGate::WholeForm => ErrorReport::for_record(&self.record, &self.numeric),
            AdvanceGate::CurrentSection => ErrorReport::for_section(
                &self.record,
                &self.numeric,
                self.current_section_id(),
            ),
        };
        if let Some(report) = blocked {
            tracing::warn!(
                section = self.section,
                failures = report.messages.len(),
                "advance blocked"
            );
            return Err(ValidationFailure { report });
        }
        self.move_to(self.section + 1);
        Ok(())
    }

    /// Moves to the previous section; never validates.
    pub fn retreat(&mut self) {
        if self.section > 0 {
            self.move_to(self.section - 1);
        }
    }

    pub fn goto(&mut self, index: usize) -> Result<()> {
        if index >= SECTION_COUNT {
            return Err(SurveyError::SectionOutOfRange {
                index,
                count: SECTION_COUNT,
            });
        }
        self.move_to(index);
        Ok(())
    }

    fn move_to(&mut self, index: usize) {
        tracing::debug!(from = self.section, to = index, "section changed");
        self.section = index;
        self.viewport.scroll_to_top();
    }

    // Answers

    /// Current value at a dot-and-index path; `None` for invalid paths.
    pub fn get(&self, path: &str) -> Option<String> {
        let path: FieldPath = path.parse().ok()?;
        self.record.get(&path)
    }

    pub fn set(&mut self, path: &str, value: &str) -> Result<FieldUpdate> {
        let path: FieldPath = path.parse()?;
        self.set_path(path, value)
    }

    /// Writes `value` at `path`, re-checking numeric format for decimal
    /// fields and applying the configured [`NumericInputPolicy`].
    pub fn set_path(&mut self, path: FieldPath, value: &str) -> Result<FieldUpdate> {
        self.ensure_editing()?;
        if !validation::is_decimal_path(&path) {
            self.record.write(&path, value)?;
            tracing::debug!(path = %path, "field updated");
            return Ok(FieldUpdate::Applied);
        }

        if self.record.get(&path).is_none() {
            return Err(SurveyError::UnknownPath(path.to_string()));
        }
        if self.numeric.check(path, value).is_none() {
            self.record.write(&path, value)?;
            tracing::debug!(path = %path, "field updated");
            return Ok(FieldUpdate::Applied);
        }

        let message = validation::numeric_message(&path);
        match self.options.numeric_policy {
            NumericInputPolicy::Reject => {
                tracing::debug!(path = %path, "malformed number dropped");
                Ok(FieldUpdate::Dropped(message))
            }
            NumericInputPolicy::Store => {
                self.record.write(&path, value)?;
                tracing::debug!(path = %path, "malformed number stored");
                Ok(FieldUpdate::Flagged(message))
            }
        }
    }

    pub fn add_debt_item(&mut self) -> Result<RowId> {
        self.ensure_editing()?;
        let id = self.record.debt_items.add();
        tracing::debug!(row = %id, rows = self.record.debt_items.len(), "debt row added");
        Ok(id)
    }

    /// Removes the debt row at `index`; `false` when the list would become
    /// empty or the index is out of range.
    pub fn remove_debt_item(&mut self, index: usize) -> Result<bool> {
        self.ensure_editing()?;
        let removed = self.record.debt_items.remove(index);
        if removed {
            self.numeric.shift_rows(FieldKey::DebtItems, index);
            tracing::debug!(index, rows = self.record.debt_items.len(), "debt row removed");
        }
        Ok(removed)
    }

    pub fn add_asset_item(&mut self) -> Result<RowId> {
        self.ensure_editing()?;
        let id = self.record.asset_items.add();
        tracing::debug!(row = %id, rows = self.record.asset_items.len(), "asset row added");
        Ok(id)
    }

    pub fn remove_asset_item(&mut self, index: usize) -> Result<bool> {
        self.ensure_editing()?;
        let removed = self.record.asset_items.remove(index);
        if removed {
            self.numeric.shift_rows(FieldKey::AssetItems, index);
            tracing::debug!(index, rows = self.record.asset_items.len(), "asset row removed");
        }
        Ok(removed)
    }

    fn ensure_editing(&self) -> Result<()> {
        match self.phase {
            Phase::Editing => Ok(()),
            Phase::ReviewPending(_) => Err(SurveyError::Locked("a submission awaits review")),
            Phase::Submitted(_) => Err(SurveyError::Locked("the record is submitted")),
        }
    }

    // Submission

    /// Validates the whole record and either freezes it or holds it for
    /// review.
    pub fn submit(&mut self) -> Result<SubmitOutcome> {
        self.ensure_editing()?;
        match ErrorReport::for_record(&self.record, &self.numeric) {
            Some(report) => {
                tracing::warn!(
                    failures = report.messages.len(),
                    first_section = report.first_section,
                    "submission held"
                );
                self.phase = Phase::ReviewPending(report.clone());
                Ok(SubmitOutcome::Held(report))
            }
            None => Ok(SubmitOutcome::Accepted(self.finalize(false))),
        }
    }

    /// Dismisses a held submission and jumps to the first failing section.
    pub fn return_to_edit(&mut self) -> Result<usize> {
        let Phase::ReviewPending(report) = &self.phase else {
            return Err(SurveyError::NoPendingReview);
        };
        let target = report.first_section;
        self.phase = Phase::Editing;
        self.move_to(target);
        Ok(target)
    }

    /// Freezes a held submission as-is, marking it as submitted with
    /// outstanding errors.
    pub fn ignore_and_submit(&mut self) -> Result<FinalizedRecord> {
        if self.pending_review().is_none() {
            return Err(SurveyError::NoPendingReview);
        }
        Ok(self.finalize(true))
    }

    /// Re-opens a submitted record at the first section.
    pub fn edit(&mut self) -> Result<()> {
        if self.finalized().is_none() {
            return Err(SurveyError::NotSubmitted);
        }
        self.phase = Phase::Editing;
        self.move_to(0);
        Ok(())
    }

    fn finalize(&mut self, ignored_errors: bool) -> FinalizedRecord {
        let finalized = FinalizedRecord::new(self.record.snapshot(), ignored_errors);
        tracing::info!(
            id = %finalized.id,
            ignored_errors,
            "questionnaire submitted"
        );
        self.phase = Phase::Submitted(finalized.clone());
        finalized
    }
}

fn numeric_errors_of(record: &AnswerRecord) -> NumericErrors {
    let mut errors = NumericErrors::default();
    let scalars = FieldKey::ALL
        .iter()
        .filter(|key| !key.is_list())
        .map(|key| FieldPath::Scalar(*key));
    let debts = (0..record.debt_items.len()).map(|row| FieldPath::Debt {
        row,
        field: DebtField::Amount,
    });
    let assets = (0..record.asset_items.len()).map(|row| FieldPath::Asset {
        row,
        field: AssetField::Amount,
    });
    for path in scalars.chain(debts).chain(assets) {
        if !validation::is_decimal_path(&path) {
            continue;
        }
        if let Some(value) = record.get(&path) {
            errors.check(path, &value);
        }
    }
    errors
}
