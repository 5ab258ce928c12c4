mod common;

use std::{
    fs,
    path::{Path, PathBuf},
};

use assert_cmd::Command;
use common::{complete_script, completed_session, temp_home};
use predicates::str::contains;
use triage_survey::{
    config::ConfigManager,
    survey::{AdvanceGate, AnswerRecord, SessionOptions},
};

const BIN: &str = "triage_survey_cli";

fn cli(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin(BIN).unwrap();
    cmd.env("TRIAGE_SURVEY_HOME", home).env("NO_COLOR", "1");
    cmd
}

fn script(lines: &[&str]) -> String {
    let mut input = lines.join("\n");
    input.push('\n');
    input
}

fn write_record(home: &Path, name: &str, record: &AnswerRecord) -> PathBuf {
    let path = home.join(name);
    fs::write(&path, serde_json::to_string_pretty(record).unwrap()).unwrap();
    path
}

#[test]
fn script_mode_submits_complete_questionnaire() {
    let home = temp_home();
    let mut lines = complete_script();
    lines.extend(["submit", "finish"]);

    cli(&home)
        .env("TRIAGE_SURVEY_CLI_SCRIPT", "1")
        .write_stdin(script(&lines))
        .assert()
        .success()
        .stdout(contains("问卷已提交"))
        .stdout(contains(
            "1. 银行抵押贷款: 50万元, 计息: 是, 计息类别: 等额本息, 抵押物: 企业资产",
        ))
        .stdout(contains("感谢填写！"));
}

#[test]
fn script_mode_returns_to_debts_when_total_debt_is_missing() {
    let home = temp_home();
    let mut lines = complete_script();
    // Leave the total debt prompt blank.
    lines[5] = "";
    lines.extend(["submit", "edit", "100", "done", "", "", "", "submit", "finish"]);

    cli(&home)
        .env("TRIAGE_SURVEY_CLI_SCRIPT", "1")
        .write_stdin(script(&lines))
        .assert()
        .success()
        .stdout(contains("问题5：请填写债务总额"))
        .stdout(contains("请先修改：2. 债务情况"))
        .stdout(contains("债务总额：100万元"))
        .stdout(contains("感谢填写！"));
}

#[test]
fn script_mode_can_ignore_outstanding_errors() {
    let home = temp_home();
    let mut lines = complete_script();
    lines[5] = "";
    lines.extend(["submit", "ignore", "finish"]);

    cli(&home)
        .env("TRIAGE_SURVEY_CLI_SCRIPT", "1")
        .write_stdin(script(&lines))
        .assert()
        .success()
        .stdout(contains("（含未修正的校验问题）"));
}

#[test]
fn script_mode_reasks_malformed_numbers() {
    let home = temp_home();
    let mut lines = complete_script();
    lines.insert(5, "12.5.3");

    cli(&home)
        .env("TRIAGE_SURVEY_CLI_SCRIPT", "1")
        .write_stdin(script(&lines))
        .assert()
        .success()
        .stdout(contains("债务总额：请输入有效的数字"))
        .stdout(contains("已退出问卷，未提交。"));
}

#[test]
fn end_of_input_cancels_without_submitting() {
    let home = temp_home();
    cli(&home)
        .env("TRIAGE_SURVEY_CLI_SCRIPT", "1")
        .write_stdin("法人\n")
        .assert()
        .success()
        .stdout(contains("已退出问卷，未提交。"));
}

#[test]
fn schema_lists_questions_and_conditions() {
    let home = temp_home();
    cli(&home)
        .arg("schema")
        .assert()
        .success()
        .stdout(contains("问题5：请问贵企业名下的债务总额是多少？（单位：万元）"))
        .stdout(contains("[personalDebtAmount]"))
        .stdout(contains("显示条件：债务性质为「有连带个人债务」"));
}

#[test]
fn validate_reports_missing_answers() {
    let home = temp_home();
    let path = write_record(&home, "partial.json", &AnswerRecord::default());

    cli(&home)
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stdout(contains("问题1：请选择您的角色"))
        .stderr(contains("issue(s) found"));

    let complete = completed_session(SessionOptions::default());
    let path = write_record(&home, "complete.json", complete.record());
    cli(&home)
        .arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(contains("问卷内容完整"));
}

#[test]
fn summary_renders_record_file() {
    let home = temp_home();
    let complete = completed_session(SessionOptions::default());
    let path = write_record(&home, "complete.json", complete.record());

    cli(&home)
        .arg("summary")
        .arg(&path)
        .assert()
        .success()
        .stdout(contains("问卷填写结果"))
        .stdout(contains("公司名称：测试公司"))
        .stdout(contains("主要资产情况：1. 土地: 1个, 200万元"));
}

#[test]
fn config_set_persists_between_runs() {
    let home = temp_home();
    cli(&home)
        .args(["config", "set", "advance_gate", "whole_form"])
        .assert()
        .success();
    let saved = ConfigManager::with_base_dir(home.clone())
        .unwrap()
        .load()
        .unwrap();
    assert_eq!(saved.session_options().advance_gate, AdvanceGate::WholeForm);

    cli(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(contains("advance_gate = whole_form"))
        .stdout(contains("numeric_input_policy = reject"));

    cli(&home)
        .args(["config", "set", "colour", "on"])
        .assert()
        .failure()
        .stderr(contains("Unknown configuration key `colour`"));
}

#[test]
fn unknown_commands_fail_with_usage() {
    let home = temp_home();
    cli(&home)
        .arg("frobnicate")
        .assert()
        .failure()
        .stdout(contains("Usage: triage_survey_cli"));
    cli(&home)
        .arg("version")
        .assert()
        .success()
        .stdout(contains("triage_survey"));
}
