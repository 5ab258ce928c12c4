use colored::Colorize;
use std::fmt;
use std::sync::{OnceLock, RwLock};

/// Kinds of line the questionnaire front end prints.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    /// Validation problems and rejected input.
    Warning,
    /// A question or command prompt.
    Prompt,
    /// Section banner with its progress bar.
    Section,
    Separator,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputPreferences {
    pub color_enabled: bool,
    /// Hides informational lines and separators.
    pub quiet_mode: bool,
}

impl Default for OutputPreferences {
    fn default() -> Self {
        Self {
            color_enabled: true,
            quiet_mode: false,
        }
    }
}

static PREFERENCES: OnceLock<RwLock<OutputPreferences>> = OnceLock::new();

fn store() -> &'static RwLock<OutputPreferences> {
    PREFERENCES.get_or_init(|| RwLock::new(OutputPreferences::default()))
}

pub fn set_preferences(prefs: OutputPreferences) {
    if let Ok(mut guard) = store().write() {
        *guard = prefs;
    }
}

fn preferences() -> OutputPreferences {
    store().read().map(|guard| *guard).unwrap_or_default()
}

fn hidden(kind: MessageKind, prefs: &OutputPreferences) -> bool {
    prefs.quiet_mode && matches!(kind, MessageKind::Info | MessageKind::Separator)
}

fn marker(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Info => "[i]",
        MessageKind::Success => "[✓]",
        MessageKind::Warning => "[!]",
        MessageKind::Prompt => ">",
        MessageKind::Section | MessageKind::Separator => "",
    }
}

/// `■■□□□□` style bar for `done` of `total` sections.
pub fn progress_bar(done: usize, total: usize) -> String {
    let done = done.min(total);
    format!("{}{}", "■".repeat(done), "□".repeat(total - done))
}

pub(crate) fn apply_style(
    kind: MessageKind,
    message: impl fmt::Display,
    prefs: &OutputPreferences,
) -> String {
    let text = message.to_string();
    let line = match kind {
        MessageKind::Section => format!("== {} ==", text.trim()),
        MessageKind::Separator => "-".repeat(40),
        _ => format!("{} {}", marker(kind), text),
    };
    if !prefs.color_enabled {
        return line;
    }
    match kind {
        MessageKind::Success => line.bright_green().to_string(),
        MessageKind::Warning => line.bright_yellow().to_string(),
        MessageKind::Prompt => line.bright_cyan().to_string(),
        MessageKind::Section => line.bold().to_string(),
        MessageKind::Info | MessageKind::Separator => line,
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let prefs = preferences();
    if hidden(kind, &prefs) {
        return;
    }
    let line = apply_style(kind, message, &prefs);
    match kind {
        MessageKind::Section | MessageKind::Separator => println!("\n{}", line),
        _ => println!("{}", line),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn prompt(message: impl fmt::Display) {
    print(MessageKind::Prompt, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

/// Section banner: heading, position and progress bar.
pub fn section_banner(heading: &str, index: usize, count: usize) {
    section(format!(
        "{} ({}/{}) {}",
        heading,
        index + 1,
        count,
        progress_bar(index + 1, count)
    ));
}

pub fn separator() {
    print(MessageKind::Separator, "");
}

/// Prints `text` as is.
pub fn plain(text: impl fmt::Display) {
    println!("{}", text);
}
