//! Section-by-section questionnaire wizard.
//!
//! [`SurveyRunner`] walks a [`SurveySession`] through its sections, asking a
//! [`SurveyInteraction`] for every answer and navigation decision. The
//! interaction decides how things are asked (dialoguer menus, a line script,
//! a test double); the runner owns the flow.

use crate::cli::{io, output};
use crate::errors::{CliError, SurveyError};
use crate::survey::path::{AssetField, DebtField, FieldKey, FieldPath};
use crate::survey::record::FinalizedRecord;
use crate::survey::schema::{self, ColumnSpec, FieldKind, FieldSpec, SectionId};
use crate::survey::session::{FieldUpdate, SubmitOutcome, SurveySession};
use crate::survey::submission::SubmissionSink;
use crate::survey::summary::SummaryView;
use crate::survey::validation::{self, ErrorReport};

/// High-level lifecycle states emitted by the runner.
#[derive(Debug, Clone, PartialEq)]
pub enum FormResult<T> {
    Completed(T),
    Cancelled,
}

/// Describes how a single field prompt can be answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResponse {
    /// A concrete value; `""` clears the field.
    Value(String),
    /// Keep the current value.
    Keep,
    /// Return to the previous field.
    Back,
    Cancel,
}

/// Commands accepted while a repeating list is shown. Row numbers are
/// zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemAction {
    Add,
    Remove(usize),
    Edit(usize),
    Done,
    Back,
    Cancel,
}

/// Commands accepted at the end of a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionAction {
    Next,
    Previous,
    /// Zero-based section index.
    Goto(usize),
    /// Answer the current section again.
    Revise,
    Submit,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorDialogChoice {
    ReturnToEdit,
    IgnoreAndSubmit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryAction {
    Edit,
    Finish,
}

/// Everything an interaction needs to ask for one answer.
#[derive(Debug, Clone)]
pub struct PromptContext {
    pub path: FieldPath,
    pub prompt: String,
    pub kind: FieldKind,
    pub current: String,
    /// Outstanding numeric-format message for this field.
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ItemListContext {
    pub list: FieldKey,
    pub prompt: &'static str,
    /// One line per row.
    pub rows: Vec<String>,
}

#[derive(Debug, Clone, Copy)]
pub struct SectionContext {
    pub section: SectionId,
    pub index: usize,
    pub count: usize,
    pub progress: f64,
}

impl SectionContext {
    pub fn is_last(&self) -> bool {
        self.index + 1 == self.count
    }
}

pub trait SurveyInteraction {
    fn prompt_field(&mut self, context: &PromptContext) -> PromptResponse;

    fn item_action(&mut self, context: &ItemListContext) -> ItemAction;

    fn section_action(&mut self, context: &SectionContext) -> SectionAction;

    fn resolve_errors(&mut self, report: &ErrorReport) -> ErrorDialogChoice;

    fn summary_action(&mut self, view: &SummaryView) -> SummaryAction;
}

enum Step {
    Next,
    Back,
    Cancel,
}

/// Drives a [`SurveySession`] with a [`SurveyInteraction`].
pub struct SurveyRunner<'a, S: SubmissionSink> {
    sink: &'a mut S,
}

impl<'a, S: SubmissionSink> SurveyRunner<'a, S> {
    pub fn new(sink: &'a mut S) -> Self {
        Self { sink }
    }

    pub fn run<I: SurveyInteraction>(
        &mut self,
        session: &mut SurveySession,
        interaction: &mut I,
    ) -> Result<FormResult<FinalizedRecord>, CliError> {
        'sections: loop {
            let section = session.current_section_id();
            output::section_banner(
                &section.heading(),
                section.index(),
                session.section_count(),
            );

            match fill_section(session, interaction, section)? {
                Step::Next => {}
                Step::Back => {
                    session.retreat();
                    continue 'sections;
                }
                Step::Cancel => return Ok(FormResult::Cancelled),
            }

            loop {
                let context = SectionContext {
                    section,
                    index: session.current_section(),
                    count: session.section_count(),
                    progress: session.progress_fraction(),
                };
                match interaction.section_action(&context) {
                    SectionAction::Next if context.is_last() => {
                        io::print_info("已是最后一部分，请提交问卷。");
                    }
                    SectionAction::Next => match session.advance() {
                        Ok(()) => continue 'sections,
                        Err(failure) => io::print_report(&failure.report),
                    },
                    SectionAction::Previous if context.index == 0 => {
                        io::print_info("已是第一部分。");
                    }
                    SectionAction::Previous => {
                        session.retreat();
                        continue 'sections;
                    }
                    SectionAction::Goto(index) => match session.goto(index) {
                        Ok(()) => continue 'sections,
                        Err(err) => io::print_warning(err),
                    },
                    SectionAction::Revise => continue 'sections,
                    SectionAction::Submit => {
                        let finalized = match session.submit()? {
                            SubmitOutcome::Accepted(finalized) => finalized,
                            SubmitOutcome::Held(report) => {
                                io::print_report(&report);
                                match interaction.resolve_errors(&report) {
                                    ErrorDialogChoice::ReturnToEdit => {
                                        session.return_to_edit()?;
                                        continue 'sections;
                                    }
                                    ErrorDialogChoice::IgnoreAndSubmit => {
                                        session.ignore_and_submit()?
                                    }
                                }
                            }
                        };
                        self.sink.submit(&finalized)?;
                        io::print_success(format!("问卷已提交（编号 {}）", finalized.id));

                        let view = SummaryView::render_finalized(&finalized);
                        io::print_summary(&view);
                        match interaction.summary_action(&view) {
                            SummaryAction::Finish => return Ok(FormResult::Completed(finalized)),
                            SummaryAction::Edit => {
                                session.edit()?;
                                continue 'sections;
                            }
                        }
                    }
                    SectionAction::Cancel => return Ok(FormResult::Cancelled),
                }
            }
        }
    }
}

fn fill_section<I: SurveyInteraction>(
    session: &mut SurveySession,
    interaction: &mut I,
    section: SectionId,
) -> Result<Step, CliError> {
    let specs: Vec<&FieldSpec> = schema::fields_in(section).collect();
    let mut visited: Vec<usize> = Vec::new();
    let mut index = 0;

    while index < specs.len() {
        let spec = specs[index];
        // Visibility is re-read on every step: an earlier answer may have
        // switched a follow-up question on or off.
        if !spec.is_visible(session.record()) {
            index += 1;
            continue;
        }
        let step = match spec.key {
            FieldKey::DebtItems | FieldKey::AssetItems => {
                edit_list(session, interaction, spec)?
            }
            key => {
                let path = FieldPath::Scalar(key);
                prompt_cell(session, interaction, path, spec.prompt.to_string(), spec.kind)?
            }
        };
        match step {
            Step::Next => {
                visited.push(index);
                index += 1;
            }
            Step::Back => match visited.pop() {
                Some(previous) => index = previous,
                None if section.index() == 0 => index = 0,
                None => return Ok(Step::Back),
            },
            Step::Cancel => return Ok(Step::Cancel),
        }
    }
    Ok(Step::Next)
}

fn prompt_cell<I: SurveyInteraction>(
    session: &mut SurveySession,
    interaction: &mut I,
    path: FieldPath,
    prompt: String,
    kind: FieldKind,
) -> Result<Step, CliError> {
    loop {
        let context = PromptContext {
            path,
            prompt: prompt.clone(),
            kind,
            current: session.record().get(&path).unwrap_or_default(),
            error: session
                .numeric_errors()
                .get(&path)
                .map(|_| validation::numeric_message(&path)),
        };
        let value = match interaction.prompt_field(&context) {
            PromptResponse::Keep => return Ok(Step::Next),
            PromptResponse::Back => return Ok(Step::Back),
            PromptResponse::Cancel => return Ok(Step::Cancel),
            PromptResponse::Value(value) => value,
        };
        match session.set_path(path, value.trim()) {
            Ok(FieldUpdate::Applied) => return Ok(Step::Next),
            Ok(FieldUpdate::Flagged(message)) => {
                io::print_warning(message);
                return Ok(Step::Next);
            }
            Ok(FieldUpdate::Dropped(message)) => io::print_warning(message),
            Err(err @ (SurveyError::InvalidChoice { .. } | SurveyError::InvalidDate { .. })) => {
                io::print_warning(err)
            }
            Err(err) => return Err(err.into()),
        }
    }
}

fn edit_list<I: SurveyInteraction>(
    session: &mut SurveySession,
    interaction: &mut I,
    spec: &FieldSpec,
) -> Result<Step, CliError> {
    loop {
        let context = ItemListContext {
            list: spec.key,
            prompt: spec.prompt,
            rows: row_lines(session, spec.key),
        };
        match interaction.item_action(&context) {
            ItemAction::Add => {
                let row = match spec.key {
                    FieldKey::DebtItems => {
                        session.add_debt_item()?;
                        session.record().debt_items.len() - 1
                    }
                    _ => {
                        session.add_asset_item()?;
                        session.record().asset_items.len() - 1
                    }
                };
                if let Step::Cancel = fill_row(session, interaction, spec.key, row)? {
                    return Ok(Step::Cancel);
                }
            }
            ItemAction::Edit(row) if row < list_len(session, spec.key) => {
                if let Step::Cancel = fill_row(session, interaction, spec.key, row)? {
                    return Ok(Step::Cancel);
                }
            }
            ItemAction::Edit(row) | ItemAction::Remove(row)
                if row >= list_len(session, spec.key) =>
            {
                io::print_warning(format!("第{}项不存在", row + 1));
            }
            ItemAction::Remove(row) => {
                let removed = match spec.key {
                    FieldKey::DebtItems => session.remove_debt_item(row)?,
                    _ => session.remove_asset_item(row)?,
                };
                if !removed {
                    io::print_warning("至少需要保留一项");
                }
            }
            ItemAction::Edit(_) => {}
            ItemAction::Done => return Ok(Step::Next),
            ItemAction::Back => return Ok(Step::Back),
            ItemAction::Cancel => return Ok(Step::Cancel),
        }
    }
}

fn list_len(session: &SurveySession, list: FieldKey) -> usize {
    match list {
        FieldKey::DebtItems => session.record().debt_items.len(),
        _ => session.record().asset_items.len(),
    }
}

/// Prompts every visible column of one row. `:back` on the first column
/// returns to the list commands.
fn fill_row<I: SurveyInteraction>(
    session: &mut SurveySession,
    interaction: &mut I,
    list: FieldKey,
    row: usize,
) -> Result<Step, CliError> {
    let cells: Vec<(FieldPath, &ColumnSpec)> = match list {
        FieldKey::DebtItems => DebtField::ALL
            .iter()
            .map(|&field| (FieldPath::Debt { row, field }, schema::debt_column(field)))
            .collect(),
        _ => AssetField::ALL
            .iter()
            .map(|&field| (FieldPath::Asset { row, field }, schema::asset_column(field)))
            .collect(),
    };

    let mut visited: Vec<usize> = Vec::new();
    let mut index = 0;
    while index < cells.len() {
        let (path, column) = cells[index];
        if !schema::is_visible(session.record(), &path) {
            index += 1;
            continue;
        }
        let prompt = format!("第{}项 {}", row + 1, column.label);
        match prompt_cell(session, interaction, path, prompt, column.kind)? {
            Step::Next => {
                visited.push(index);
                index += 1;
            }
            Step::Back => match visited.pop() {
                Some(previous) => index = previous,
                None => return Ok(Step::Back),
            },
            Step::Cancel => return Ok(Step::Cancel),
        }
    }
    Ok(Step::Next)
}

fn row_lines(session: &SurveySession, list: FieldKey) -> Vec<String> {
    let record = session.record();
    let blank = |value: String| {
        if value.is_empty() {
            "未填写".to_string()
        } else {
            value
        }
    };
    match list {
        FieldKey::DebtItems => (0..record.debt_items.len())
            .map(|row| {
                let cell = |field| {
                    blank(record.get(&FieldPath::Debt { row, field }).unwrap_or_default())
                };
                format!(
                    "第{}项：{} / {}万元 / 计息：{}",
                    row + 1,
                    cell(DebtField::Category),
                    cell(DebtField::Amount),
                    cell(DebtField::HasInterest)
                )
            })
            .collect(),
        _ => (0..record.asset_items.len())
            .map(|row| {
                let cell = |field| {
                    blank(record.get(&FieldPath::Asset { row, field }).unwrap_or_default())
                };
                format!(
                    "第{}项：{} / 数量：{} / {}万元",
                    row + 1,
                    cell(AssetField::Category),
                    cell(AssetField::Quantity),
                    cell(AssetField::Amount)
                )
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::survey::session::{AdvanceGate, NumericInputPolicy, SessionOptions};
    use crate::survey::submission::MemorySink;

    /// Answers prompts from queues; an exhausted queue keeps or finishes.
    #[derive(Default)]
    struct MockInteraction {
        values: VecDeque<(&'static str, PromptResponse)>,
        items: VecDeque<ItemAction>,
        sections: VecDeque<SectionAction>,
        dialogs: VecDeque<ErrorDialogChoice>,
        summaries: VecDeque<SummaryAction>,
        reports: Vec<ErrorReport>,
        asked: Vec<String>,
    }

    impl MockInteraction {
        fn answer(mut self, path: &'static str, value: &str) -> Self {
            self.values
                .push_back((path, PromptResponse::Value(value.to_string())));
            self
        }

        fn respond(mut self, path: &'static str, response: PromptResponse) -> Self {
            self.values.push_back((path, response));
            self
        }
    }

    impl SurveyInteraction for MockInteraction {
        fn prompt_field(&mut self, context: &PromptContext) -> PromptResponse {
            let path = context.path.to_string();
            self.asked.push(path.clone());
            match self.values.front() {
                Some((expected, _)) if *expected == path => {
                    self.values.pop_front().map(|(_, response)| response).unwrap()
                }
                _ => PromptResponse::Keep,
            }
        }

        fn item_action(&mut self, _context: &ItemListContext) -> ItemAction {
            self.items.pop_front().unwrap_or(ItemAction::Done)
        }

        fn section_action(&mut self, _context: &SectionContext) -> SectionAction {
            self.sections.pop_front().unwrap_or(SectionAction::Cancel)
        }

        fn resolve_errors(&mut self, report: &ErrorReport) -> ErrorDialogChoice {
            self.reports.push(report.clone());
            self.dialogs
                .pop_front()
                .unwrap_or(ErrorDialogChoice::IgnoreAndSubmit)
        }

        fn summary_action(&mut self, _view: &SummaryView) -> SummaryAction {
            self.summaries.pop_front().unwrap_or(SummaryAction::Finish)
        }
    }

    fn fill_basic(mock: MockInteraction) -> MockInteraction {
        mock.answer("role", "法人")
            .answer("contact", "13800000000")
            .answer("region", "上海市")
            .answer("companyName", "测试有限公司")
    }

    #[test]
    fn cancel_at_first_prompt_cancels_the_run() {
        let mut session = SurveySession::default();
        let mut mock = MockInteraction::default().respond("role", PromptResponse::Cancel);
        let mut sink = MemorySink::default();
        let result = SurveyRunner::new(&mut sink).run(&mut session, &mut mock).unwrap();
        assert_eq!(result, FormResult::Cancelled);
        assert!(sink.records().is_empty());
    }

    #[test]
    fn hidden_follow_ups_are_not_asked() {
        let mut session = SurveySession::default();
        let mut mock = MockInteraction {
            sections: VecDeque::from([SectionAction::Next, SectionAction::Cancel]),
            ..MockInteraction::default()
        }
        .answer("inExecution", "是");
        let mut sink = MemorySink::default();
        SurveyRunner::new(&mut sink).run(&mut session, &mut mock).unwrap();

        assert!(mock.asked.contains(&"executionDetails".to_string()));
        assert!(!mock.asked.contains(&"personalDebtAmount".to_string()));
        assert!(!mock.asked.contains(&"debtItems.0.interestType".to_string()));
    }

    #[test]
    fn malformed_number_is_asked_again_under_reject_policy() {
        let mut session = SurveySession::default();
        session.goto(1).unwrap();
        let mut mock = MockInteraction {
            sections: VecDeque::from([SectionAction::Cancel]),
            ..MockInteraction::default()
        }
        .answer("totalDebt", "12.5.3")
        .answer("totalDebt", "12.5");
        let mut sink = MemorySink::default();
        SurveyRunner::new(&mut sink).run(&mut session, &mut mock).unwrap();

        assert_eq!(session.get("totalDebt").as_deref(), Some("12.5"));
        assert!(session.numeric_errors().is_empty());
        let asked = mock.asked.iter().filter(|path| *path == "totalDebt").count();
        assert_eq!(asked, 2);
    }

    #[test]
    fn store_policy_moves_on_with_flagged_value() {
        let mut session = SurveySession::new(SessionOptions {
            advance_gate: AdvanceGate::Deferred,
            numeric_policy: NumericInputPolicy::Store,
        });
        session.goto(1).unwrap();
        let mut mock = MockInteraction {
            sections: VecDeque::from([SectionAction::Cancel]),
            ..MockInteraction::default()
        }
        .answer("totalDebt", "abc");
        let mut sink = MemorySink::default();
        SurveyRunner::new(&mut sink).run(&mut session, &mut mock).unwrap();

        assert_eq!(session.get("totalDebt").as_deref(), Some("abc"));
        assert_eq!(session.numeric_errors().len(), 1);
    }

    #[test]
    fn held_submission_returns_to_first_failing_section() {
        let mut session = SurveySession::default();
        let mut mock = fill_basic(MockInteraction {
            sections: VecDeque::from([SectionAction::Submit, SectionAction::Cancel]),
            dialogs: VecDeque::from([ErrorDialogChoice::ReturnToEdit]),
            ..MockInteraction::default()
        });
        let mut sink = MemorySink::default();
        let result = SurveyRunner::new(&mut sink).run(&mut session, &mut mock).unwrap();

        assert_eq!(result, FormResult::Cancelled);
        assert_eq!(mock.reports.len(), 1);
        assert_eq!(mock.reports[0].first_section, 1);
        assert_eq!(session.current_section(), 1);
        assert!(session.is_editing());
    }

    #[test]
    fn ignored_errors_reach_the_sink_and_summary_edit_reopens() {
        let mut session = SurveySession::default();
        let mut mock = MockInteraction {
            sections: VecDeque::from([SectionAction::Submit, SectionAction::Submit]),
            summaries: VecDeque::from([SummaryAction::Edit, SummaryAction::Finish]),
            ..MockInteraction::default()
        };
        let mut sink = MemorySink::default();
        let result = SurveyRunner::new(&mut sink).run(&mut session, &mut mock).unwrap();

        let FormResult::Completed(finalized) = result else {
            panic!("expected a completed run");
        };
        assert!(finalized.ignored_errors);
        assert_eq!(sink.records().len(), 2);
        assert_eq!(mock.reports.len(), 2);
    }

    #[test]
    fn list_commands_add_fill_and_remove_rows() {
        let mut session = SurveySession::default();
        session.goto(2).unwrap();
        let mut mock = MockInteraction {
            items: VecDeque::from([
                ItemAction::Add,
                ItemAction::Remove(0),
                ItemAction::Remove(0),
                ItemAction::Edit(4),
                ItemAction::Done,
            ]),
            sections: VecDeque::from([SectionAction::Cancel]),
            ..MockInteraction::default()
        }
        .answer("assetItems.1.type", "土地")
        .answer("assetItems.1.quantity", "2")
        .answer("assetItems.1.amount", "300");
        let mut sink = MemorySink::default();
        SurveyRunner::new(&mut sink).run(&mut session, &mut mock).unwrap();

        let assets = &session.record().asset_items;
        assert_eq!(assets.len(), 1);
        assert_eq!(assets.get(0).map(|item| item.amount.as_str()), Some("300"));
    }
}
