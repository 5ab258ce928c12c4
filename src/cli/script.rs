//! Line-driven interaction used when `TRIAGE_SURVEY_CLI_SCRIPT` is set.
//!
//! Every prompt consumes one line of input. End of input cancels the run
//! (or finishes it when the summary is already on screen).

use std::io::BufRead;

use crate::cli::interaction::interpret_buffer;
use crate::cli::{io, output};
use crate::cli::wizard::{
    ErrorDialogChoice, ItemAction, ItemListContext, PromptContext, PromptResponse,
    SectionAction, SectionContext, SummaryAction, SurveyInteraction,
};
use crate::survey::schema::FieldKind;
use crate::survey::summary::SummaryView;
use crate::survey::validation::ErrorReport;

pub struct ScriptedInteraction<R: BufRead> {
    input: R,
}

impl<R: BufRead> ScriptedInteraction<R> {
    pub fn new(input: R) -> Self {
        Self { input }
    }

    fn next_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }

    /// Reads lines until `parse` accepts one; `None` at end of input.
    fn read_command<T>(
        &mut self,
        mut parse: impl FnMut(&str) -> Result<T, String>,
    ) -> Option<T> {
        loop {
            let line = self.next_line()?;
            match parse(line.trim()) {
                Ok(value) => return Some(value),
                Err(message) => io::print_warning(message),
            }
        }
    }
}

/// Resolves a choice by exact label or 1-based index; on failure returns the
/// closest label, if any is reasonably close.
pub fn resolve_choice(options: &[&str], raw: &str) -> Result<String, Option<String>> {
    let wanted = raw.trim();
    if let Some(label) = options.iter().find(|label| **label == wanted) {
        return Ok(label.to_string());
    }
    if let Ok(index) = wanted.parse::<usize>() {
        if (1..=options.len()).contains(&index) {
            return Ok(options[index - 1].to_string());
        }
    }
    let suggestion = options
        .iter()
        .map(|label| (strsim::levenshtein(label, wanted), *label))
        .filter(|(distance, label)| {
            *distance <= label.chars().count() / 2 && *distance < wanted.chars().count()
        })
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, label)| label.to_string());
    Err(suggestion)
}

fn row_number(raw: Option<&str>) -> Result<usize, String> {
    raw.and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value >= 1)
        .map(|value| value - 1)
        .ok_or_else(|| "请输入从 1 开始的序号".to_string())
}

fn parse_item_action(line: &str) -> Result<ItemAction, String> {
    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or_default().to_ascii_lowercase();
    match command.as_str() {
        "add" => Ok(ItemAction::Add),
        "remove" => row_number(parts.next()).map(ItemAction::Remove),
        "edit" => row_number(parts.next()).map(ItemAction::Edit),
        "done" | "" => Ok(ItemAction::Done),
        ":back" | "back" => Ok(ItemAction::Back),
        ":cancel" | "cancel" => Ok(ItemAction::Cancel),
        other => Err(format!(
            "未知命令 `{}`，可用：add / remove N / edit N / done",
            other
        )),
    }
}

fn parse_section_action(line: &str) -> Result<SectionAction, String> {
    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or_default().to_ascii_lowercase();
    match command.as_str() {
        "next" | "" => Ok(SectionAction::Next),
        "prev" | "back" => Ok(SectionAction::Previous),
        "goto" => row_number(parts.next()).map(SectionAction::Goto),
        "edit" => Ok(SectionAction::Revise),
        "submit" => Ok(SectionAction::Submit),
        "cancel" | ":cancel" => Ok(SectionAction::Cancel),
        other => Err(format!(
            "未知命令 `{}`，可用：next / prev / goto N / edit / submit / cancel",
            other
        )),
    }
}

impl<R: BufRead> SurveyInteraction for ScriptedInteraction<R> {
    fn prompt_field(&mut self, context: &PromptContext) -> PromptResponse {
        output::prompt(&context.prompt);
        if let Some(error) = &context.error {
            io::print_warning(error);
        }
        loop {
            let Some(line) = self.next_line() else {
                return PromptResponse::Cancel;
            };
            let FieldKind::Choice(options) = context.kind else {
                return interpret_buffer(&line);
            };
            let value = match interpret_buffer(&line) {
                PromptResponse::Value(value) if !value.is_empty() => value,
                other => return other,
            };
            match resolve_choice(options, &value) {
                Ok(label) => return PromptResponse::Value(label),
                Err(Some(suggestion)) => io::print_warning(format!(
                    "无效选项「{}」，您是否想选择「{}」？",
                    value, suggestion
                )),
                Err(None) => io::print_warning(format!(
                    "无效选项「{}」，可选：{}",
                    value,
                    options.join(" / ")
                )),
            }
        }
    }

    fn item_action(&mut self, context: &ItemListContext) -> ItemAction {
        output::prompt(context.prompt);
        for row in &context.rows {
            output::plain(format!("  {}", row));
        }
        self.read_command(parse_item_action)
            .unwrap_or(ItemAction::Cancel)
    }

    fn section_action(&mut self, context: &SectionContext) -> SectionAction {
        output::prompt(format!(
            "{} 完成（next / prev / goto N / edit / submit / cancel）",
            context.section.heading()
        ));
        self.read_command(parse_section_action)
            .unwrap_or(SectionAction::Cancel)
    }

    fn resolve_errors(&mut self, _report: &ErrorReport) -> ErrorDialogChoice {
        output::prompt("问卷还有未完成的内容（edit 返回修改 / ignore 忽略并提交）");
        self.read_command(|line| match line.to_ascii_lowercase().as_str() {
            "edit" => Ok(ErrorDialogChoice::ReturnToEdit),
            "ignore" => Ok(ErrorDialogChoice::IgnoreAndSubmit),
            other => Err(format!("未知命令 `{}`，可用：edit / ignore", other)),
        })
        .unwrap_or(ErrorDialogChoice::ReturnToEdit)
    }

    fn summary_action(&mut self, _view: &SummaryView) -> SummaryAction {
        output::prompt("确认填写结果（finish 完成 / edit 返回编辑）");
        self.read_command(|line| match line.to_ascii_lowercase().as_str() {
            "finish" | "" => Ok(SummaryAction::Finish),
            "edit" => Ok(SummaryAction::Edit),
            other => Err(format!("未知命令 `{}`，可用：finish / edit", other)),
        })
        .unwrap_or(SummaryAction::Finish)
    }
}
