use std::fmt;

use crate::cli::output::{self, OutputPreferences};
use crate::config::Config;
use crate::survey::summary::SummaryView;
use crate::survey::validation::ErrorReport;
use crate::survey::SectionId;

/// Print an informational message via the standard CLI output helpers.
pub fn print_info(message: impl fmt::Display) {
    output::info(message);
}

/// Print a warning message via the standard CLI output helpers.
pub fn print_warning(message: impl fmt::Display) {
    output::warning(message);
}

/// Print a success message via the standard CLI output helpers.
pub fn print_success(message: impl fmt::Display) {
    output::success(message);
}

/// Applies the output-related preferences of `config`.
pub fn apply_config(config: &Config) {
    output::set_preferences(OutputPreferences {
        color_enabled: config.ui_color_enabled,
        quiet_mode: config.quiet_mode,
    });
}

/// Prints every aggregated message followed by the section to revisit.
pub fn print_report(report: &ErrorReport) {
    for message in &report.messages {
        print_warning(message);
    }
    if let Some(section) = SectionId::from_index(report.first_section) {
        print_info(format!("请先修改：{}", section.heading()));
    }
}

pub fn print_summary(view: &SummaryView) {
    output::separator();
    output::plain(view.to_text().trim_end());
    output::separator();
}
