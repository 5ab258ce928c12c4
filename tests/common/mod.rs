#![allow(dead_code)]

use std::{path::PathBuf, sync::Mutex};

use once_cell::sync::Lazy;
use tempfile::TempDir;
use triage_survey::survey::{FieldUpdate, SessionOptions, SurveySession};

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Creates a unique directory that outlives the calling test.
pub fn temp_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Answers of a fully completed questionnaire, keyed by path.
pub const COMPLETE_ANSWERS: &[(&str, &str)] = &[
    ("role", "法人"),
    ("contact", "13800000000"),
    ("region", "北京市"),
    ("companyName", "测试公司"),
    ("totalDebt", "100"),
    ("debtItems.0.type", "银行抵押贷款"),
    ("debtItems.0.amount", "50"),
    ("debtItems.0.hasInterest", "是"),
    ("debtItems.0.interestType", "等额本息"),
    ("debtItems.0.mortgageAssetType", "企业资产"),
    ("totalAsset", "200"),
    ("assetItems.0.type", "土地"),
    ("assetItems.0.quantity", "1"),
    ("assetItems.0.amount", "200"),
    ("continueBusiness", "是"),
    ("problemsToSolve", "融资"),
    ("capitalPaid", "未完成实缴"),
    ("stillOperating", "是"),
    ("employeeCount", "10"),
    ("otherBusiness", "否"),
];

/// Writes every pair, asserting each write is accepted.
pub fn fill(session: &mut SurveySession, answers: &[(&str, &str)]) {
    for (path, value) in answers {
        let update = session
            .set(path, value)
            .unwrap_or_else(|err| panic!("set {path}: {err}"));
        assert_eq!(update, FieldUpdate::Applied, "set {path}");
    }
}

pub fn completed_session(options: SessionOptions) -> SurveySession {
    let mut session = SurveySession::new(options);
    fill(&mut session, COMPLETE_ANSWERS);
    session
}

/// Script lines that walk every section with [`COMPLETE_ANSWERS`], ending
/// at the last section's command prompt.
pub fn complete_script() -> Vec<&'static str> {
    vec![
        // 1. basic information
        "法人",
        "13800000000",
        "北京市",
        "测试公司",
        "next",
        // 2. debts
        "100",
        "edit 1",
        "银行抵押贷款",
        "50",
        "是",
        "等额本息",
        "企业资产",
        "done",
        "",
        "",
        "",
        "next",
        // 3. assets
        "200",
        "edit 1",
        "土地",
        "1",
        "200",
        "done",
        "next",
        // 4. demands
        "",
        "融资",
        "next",
        // 5. liquidation
        "",
        "",
        "",
        "next",
        // 6. payment ability
        "",
        "10",
        "",
    ]
}
