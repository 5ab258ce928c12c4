mod common;

use common::fill;
use triage_survey::survey::{ErrorReport, SurveySession};

#[test]
fn lists_never_drop_below_one_row() {
    let mut session = SurveySession::default();
    fill(&mut session, &[("debtItems.0.type", "职工债务"), ("debtItems.0.amount", "3")]);
    let before = session.record().debt_items.clone();

    assert!(!session.remove_debt_item(0).unwrap());
    assert!(!session.remove_asset_item(0).unwrap());
    assert_eq!(session.record().debt_items, before);
    assert_eq!(session.record().asset_items.len(), 1);
}

#[test]
fn add_then_remove_last_restores_content() {
    let mut session = SurveySession::default();
    fill(&mut session, &[("assetItems.0.type", "房产/厂房"), ("assetItems.0.quantity", "2")]);
    let before: Vec<_> = session.record().asset_items.iter().cloned().collect();

    session.add_asset_item().unwrap();
    assert_eq!(session.record().asset_items.len(), 2);
    assert!(session.remove_asset_item(1).unwrap());

    let after: Vec<_> = session.record().asset_items.iter().cloned().collect();
    assert_eq!(after, before);
}

#[test]
fn row_ids_survive_removal_of_earlier_rows() {
    let mut session = SurveySession::default();
    let second = session.add_debt_item().unwrap();
    let third = session.add_debt_item().unwrap();
    fill(&mut session, &[("debtItems.2.amount", "8")]);

    assert!(session.remove_debt_item(0).unwrap());
    let list = &session.record().debt_items;
    assert_eq!(list.ids().collect::<Vec<_>>(), vec![second, third]);
    assert_eq!(list.position(third), Some(1));
    assert_eq!(session.get("debtItems.1.amount").as_deref(), Some("8"));

    // Ids are never handed out twice.
    let fourth = session.add_debt_item().unwrap();
    assert!(fourth > third);
}

#[test]
fn row_messages_follow_their_position() {
    let mut session = SurveySession::default();
    session.add_debt_item().unwrap();
    fill(
        &mut session,
        &[
            ("debtItems.0.type", "税务债务"),
            ("debtItems.0.amount", "4"),
            ("debtItems.1.amount", "6"),
        ],
    );
    session.set("debtItems.0.amount", "4..").unwrap();

    let report = ErrorReport::for_record(session.record(), session.numeric_errors()).unwrap();
    assert!(report
        .messages
        .contains(&"问题6：第2项债务类别未选择".to_string()));
    assert!(report
        .messages
        .contains(&"第1项债务金额：请输入有效的数字".to_string()));

    assert!(session.remove_debt_item(0).unwrap());
    let report = ErrorReport::for_record(session.record(), session.numeric_errors()).unwrap();
    assert!(report
        .messages
        .contains(&"问题6：第1项债务类别未选择".to_string()));
    assert!(!report.messages.iter().any(|message| message.contains("第2项")));
    assert!(!report.messages.iter().any(|message| message.contains("请输入有效的数字")));
}

#[test]
fn hidden_row_columns_are_not_required() {
    let mut session = SurveySession::default();
    fill(
        &mut session,
        &[
            ("debtItems.0.type", "民间借贷"),
            ("debtItems.0.amount", "20"),
            ("debtItems.0.hasInterest", "否"),
        ],
    );
    let report = ErrorReport::for_record(session.record(), session.numeric_errors()).unwrap();
    assert!(!report
        .messages
        .iter()
        .any(|message| message.starts_with("问题6：")));
}
