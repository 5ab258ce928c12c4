use std::{
    env, fs,
    io::{self as stdio},
    path::Path,
};

use crate::cli::interaction::{DialoguerInteraction, TerminalViewport};
use crate::cli::io;
use crate::cli::output;
use crate::cli::script::ScriptedInteraction;
use crate::cli::wizard::{FormResult, SurveyRunner};
use crate::config::{ConfigManager, CONFIG_KEYS};
use crate::errors::CliError;
use crate::survey::path::FieldKey;
use crate::survey::record::{AnswerRecord, FinalizedRecord};
use crate::survey::schema::{self, ColumnSpec, FieldKind, RowVisibility, SectionId, Visibility};
use crate::survey::session::SurveySession;
use crate::survey::submission::LogSink;
use crate::survey::summary::SummaryView;
use crate::survey::validation::ErrorReport;
use crate::utils::build_info;

pub const SCRIPT_ENV: &str = "TRIAGE_SURVEY_CLI_SCRIPT";

const USAGE: &str = "Usage: triage_survey_cli [command]\n\
Commands:\n  \
run                       fill in the questionnaire (default)\n  \
schema                    list sections, questions and options\n  \
validate <record.json>    report missing or malformed answers\n  \
summary <record.json>     print the summary of a record\n  \
config show               print preferences\n  \
config set <key> <value>  update a preference\n  \
version                   print build information";

pub fn run_cli() -> Result<(), CliError> {
    let args: Vec<String> = env::args().skip(1).collect();
    let rest: Vec<&str> = args.iter().skip(1).map(String::as_str).collect();

    match args.first().map(String::as_str) {
        None | Some("run") => run_session(),
        Some("schema") => {
            print_schema();
            Ok(())
        }
        Some("validate") => validate_file(required_path(&rest)?),
        Some("summary") => summarize_file(required_path(&rest)?),
        Some("config") => config_command(&rest),
        Some("version") => {
            output::plain(build_info::current().describe());
            Ok(())
        }
        Some("help" | "--help" | "-h") => {
            output::plain(USAGE);
            Ok(())
        }
        Some(other) => {
            output::plain(USAGE);
            Err(CliError::Input(format!("unknown command `{}`", other)))
        }
    }
}

fn required_path<'a>(rest: &[&'a str]) -> Result<&'a Path, CliError> {
    rest.first()
        .map(|raw| Path::new(*raw))
        .ok_or_else(|| CliError::Input("missing record file path".into()))
}

fn run_session() -> Result<(), CliError> {
    let manager = ConfigManager::new()?;
    let config = manager.load()?;
    io::apply_config(&config);
    let options = config.session_options();
    tracing::debug!(
        gate = options.advance_gate.as_str(),
        policy = options.numeric_policy.as_str(),
        "starting questionnaire"
    );

    let mut sink = LogSink;
    let result = if env::var_os(SCRIPT_ENV).is_some() {
        let mut session = SurveySession::new(options);
        let stdin = stdio::stdin();
        let mut interaction = ScriptedInteraction::new(stdin.lock());
        SurveyRunner::new(&mut sink).run(&mut session, &mut interaction)?
    } else {
        let mut session = SurveySession::with_viewport(options, Box::new(TerminalViewport));
        let mut interaction = DialoguerInteraction::new();
        SurveyRunner::new(&mut sink).run(&mut session, &mut interaction)?
    };

    match result {
        FormResult::Completed(finalized) => {
            io::print_success(format!("感谢填写！提交编号：{}", finalized.id));
        }
        FormResult::Cancelled => io::print_info("已退出问卷，未提交。"),
    }
    Ok(())
}

/// A record file holds either a finalized submission or bare answers.
enum RecordFile {
    Finalized(FinalizedRecord),
    Answers(AnswerRecord),
}

impl RecordFile {
    fn load(path: &Path) -> Result<Self, CliError> {
        let data = fs::read_to_string(path)?;
        if let Ok(finalized) = serde_json::from_str::<FinalizedRecord>(&data) {
            return Ok(RecordFile::Finalized(finalized));
        }
        Ok(RecordFile::Answers(serde_json::from_str(&data)?))
    }

    fn answers(self) -> AnswerRecord {
        match self {
            RecordFile::Finalized(finalized) => finalized.answers,
            RecordFile::Answers(answers) => answers,
        }
    }
}

fn validate_file(path: &Path) -> Result<(), CliError> {
    let answers = RecordFile::load(path)?.answers();
    let session = SurveySession::from_record(answers, Default::default());
    match ErrorReport::for_record(session.record(), session.numeric_errors()) {
        None => {
            io::print_success("问卷内容完整");
            Ok(())
        }
        Some(report) => {
            io::print_report(&report);
            Err(CliError::Command(format!(
                "{} issue(s) found",
                report.messages.len()
            )))
        }
    }
}

fn summarize_file(path: &Path) -> Result<(), CliError> {
    let view = match RecordFile::load(path)? {
        RecordFile::Finalized(finalized) => SummaryView::render_finalized(&finalized),
        RecordFile::Answers(answers) => SummaryView::render(&answers),
    };
    output::plain(view.to_text().trim_end());
    Ok(())
}

fn config_command(rest: &[&str]) -> Result<(), CliError> {
    let manager = ConfigManager::new()?;
    match rest {
        [] | ["show"] => {
            let config = manager.load()?;
            for (key, value) in config.entries() {
                output::plain(format!("{} = {}", key, value));
            }
            output::plain(format!("# {}", manager.path().display()));
            Ok(())
        }
        ["set", key, value] => {
            let mut config = manager.load()?;
            config.set_value(key, value)?;
            manager.save(&config)?;
            io::print_success(format!("{} = {}", key, value));
            Ok(())
        }
        _ => Err(CliError::Input(format!(
            "usage: config show | config set <key> <value> (keys: {})",
            CONFIG_KEYS.join(", ")
        ))),
    }
}

fn print_schema() {
    for section in SectionId::ALL {
        output::section(section.heading());
        for spec in schema::fields_in(*section) {
            let marker = if spec.required.is_some() { "*" } else { " " };
            output::plain(format!("{} {}  [{}]", marker, spec.prompt, spec.key.as_str()));
            if let Visibility::When(trigger, label) = spec.visibility {
                output::plain(format!(
                    "    显示条件：{}为「{}」",
                    schema::field(trigger).label,
                    label
                ));
            }
            describe_kind(spec.kind);
            match spec.kind {
                FieldKind::Rows if spec.key == FieldKey::DebtItems => {
                    describe_columns(schema::debt_columns())
                }
                FieldKind::Rows => describe_columns(schema::asset_columns()),
                _ => {}
            }
        }
    }
}

fn describe_columns(columns: &[ColumnSpec]) {
    for column in columns {
        let marker = if column.missing.is_some() { "*" } else { " " };
        output::plain(format!("    {} {}  [{}]", marker, column.label, column.name));
        if let RowVisibility::When(trigger, label) = column.visibility {
            output::plain(format!("        显示条件：{}为「{}」", trigger, label));
        }
        if let FieldKind::Choice(options) = column.kind {
            output::plain(format!("        选项：{}", options.join(" / ")));
        }
    }
}

fn describe_kind(kind: FieldKind) {
    match kind {
        FieldKind::Choice(options) => {
            output::plain(format!("    选项：{}", options.join(" / ")));
        }
        FieldKind::Decimal => output::plain("    数字"),
        FieldKind::Date => output::plain("    日期 YYYY-MM-DD"),
        FieldKind::Text | FieldKind::Rows => {}
    }
}
