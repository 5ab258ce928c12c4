//! Terminal interaction built on dialoguer menus and prompts.

use std::io::{self as stdio, Write};

use crossterm::{
    cursor,
    terminal::{self, ClearType},
    ExecutableCommand,
};
use dialoguer::{theme::ColorfulTheme, Input, Select};

use crate::cli::io;
use crate::cli::wizard::{
    ErrorDialogChoice, ItemAction, ItemListContext, PromptContext, PromptResponse,
    SectionAction, SectionContext, SummaryAction, SurveyInteraction,
};
use crate::survey::schema::{FieldKind, SectionId};
use crate::survey::session::Viewport;
use crate::survey::summary::SummaryView;
use crate::survey::validation::ErrorReport;

const BACK_LABEL: &str = "← 返回上一题";
const CLEAR_LABEL: &str = "（清除选择）";

/// Clears the terminal whenever the session changes section.
#[derive(Debug, Default)]
pub struct TerminalViewport;

impl Viewport for TerminalViewport {
    fn scroll_to_top(&mut self) {
        let mut stdout = stdio::stdout();
        let _ = stdout.execute(terminal::Clear(ClearType::All));
        let _ = stdout.execute(cursor::MoveTo(0, 0));
        let _ = stdout.flush();
    }
}

pub struct DialoguerInteraction {
    theme: ColorfulTheme,
}

impl Default for DialoguerInteraction {
    fn default() -> Self {
        Self::new()
    }
}

impl DialoguerInteraction {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }

    fn select(&self, prompt: &str, items: &[String], default: usize) -> Option<usize> {
        Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(default.min(items.len().saturating_sub(1)))
            .interact_opt()
            .ok()
            .flatten()
    }

    fn prompt_choice(&self, context: &PromptContext, options: &[&str]) -> PromptResponse {
        let mut items: Vec<String> = options.iter().map(|label| label.to_string()).collect();
        items.push(CLEAR_LABEL.to_string());
        items.push(BACK_LABEL.to_string());
        let default = options
            .iter()
            .position(|label| *label == context.current)
            .unwrap_or(0);

        match self.select(&context.prompt, &items, default) {
            Some(index) if index < options.len() => {
                if options[index] == context.current {
                    PromptResponse::Keep
                } else {
                    PromptResponse::Value(options[index].to_string())
                }
            }
            Some(index) if index == options.len() => PromptResponse::Value(String::new()),
            Some(_) => PromptResponse::Back,
            None => PromptResponse::Cancel,
        }
    }

    fn prompt_text(&self, context: &PromptContext) -> PromptResponse {
        if let Some(error) = &context.error {
            io::print_warning(error);
        }
        let mut prompt = context.prompt.clone();
        if !context.current.is_empty() {
            prompt.push_str(&format!("（当前：{}）", context.current));
        }
        if matches!(context.kind, FieldKind::Date) {
            prompt.push_str(" [YYYY-MM-DD]");
        }
        match Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
        {
            Ok(buffer) => interpret_buffer(&buffer),
            Err(_) => PromptResponse::Cancel,
        }
    }
}

/// Maps typed text onto a prompt response: an empty line keeps the current
/// value, `:clear` empties it, `:back` and `:cancel` navigate.
pub fn interpret_buffer(buffer: &str) -> PromptResponse {
    let trimmed = buffer.trim();
    if trimmed.is_empty() {
        return PromptResponse::Keep;
    }
    match trimmed.to_ascii_lowercase().as_str() {
        ":cancel" => PromptResponse::Cancel,
        ":back" => PromptResponse::Back,
        ":clear" => PromptResponse::Value(String::new()),
        _ => PromptResponse::Value(trimmed.to_string()),
    }
}

impl SurveyInteraction for DialoguerInteraction {
    fn prompt_field(&mut self, context: &PromptContext) -> PromptResponse {
        match context.kind {
            FieldKind::Choice(options) => self.prompt_choice(context, options),
            _ => self.prompt_text(context),
        }
    }

    fn item_action(&mut self, context: &ItemListContext) -> ItemAction {
        io::print_info(context.prompt);
        for row in &context.rows {
            io::print_info(row);
        }
        let count = context.rows.len();
        let mut items = vec!["完成".to_string(), "添加一项".to_string()];
        items.extend((1..=count).map(|n| format!("编辑第{}项", n)));
        items.extend((1..=count).map(|n| format!("删除第{}项", n)));
        items.push(BACK_LABEL.to_string());

        match self.select("请选择操作", &items, 0) {
            Some(0) => ItemAction::Done,
            Some(1) => ItemAction::Add,
            Some(index) if index < 2 + count => ItemAction::Edit(index - 2),
            Some(index) if index < 2 + 2 * count => ItemAction::Remove(index - 2 - count),
            Some(_) => ItemAction::Back,
            None => ItemAction::Cancel,
        }
    }

    fn section_action(&mut self, context: &SectionContext) -> SectionAction {
        io::print_info(format!(
            "进度：{:.0}%（{}）",
            context.progress * 100.0,
            context.section.heading()
        ));
        let mut actions = Vec::new();
        if !context.is_last() {
            actions.push(("下一部分", SectionAction::Next));
        }
        if context.index > 0 {
            actions.push(("上一部分", SectionAction::Previous));
        }
        actions.push(("跳转到其他部分", SectionAction::Goto(context.index)));
        actions.push(("重新填写本部分", SectionAction::Revise));
        actions.push(("提交问卷", SectionAction::Submit));
        actions.push(("退出", SectionAction::Cancel));

        let labels: Vec<String> = actions.iter().map(|(label, _)| label.to_string()).collect();
        let Some(index) = self.select("请选择下一步", &labels, 0) else {
            return SectionAction::Cancel;
        };
        match actions[index].1 {
            SectionAction::Goto(current) => {
                let headings: Vec<String> =
                    SectionId::ALL.iter().map(|section| section.heading()).collect();
                match self.select("跳转到", &headings, current) {
                    Some(target) => SectionAction::Goto(target),
                    None => SectionAction::Revise,
                }
            }
            action => action,
        }
    }

    fn resolve_errors(&mut self, _report: &ErrorReport) -> ErrorDialogChoice {
        let items = vec!["返回修改".to_string(), "忽略并提交".to_string()];
        match self.select("问卷还有未完成的内容", &items, 0) {
            Some(1) => ErrorDialogChoice::IgnoreAndSubmit,
            _ => ErrorDialogChoice::ReturnToEdit,
        }
    }

    fn summary_action(&mut self, _view: &SummaryView) -> SummaryAction {
        let items = vec!["完成".to_string(), "返回编辑".to_string()];
        match self.select("请确认填写结果", &items, 0) {
            Some(1) => SummaryAction::Edit,
            _ => SummaryAction::Finish,
        }
    }
}
