//! Read-only projection of a record into labelled sections.

use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::survey::options::{DebtCategory, YesNo};
use crate::survey::path::{FieldKey, FieldPath};
use crate::survey::record::{AnswerRecord, AssetItem, DebtItem, FinalizedRecord};
use crate::survey::schema::{self, SectionId};

pub const SUMMARY_TITLE: &str = "问卷填写结果";
const NONE_LISTED: &str = "无";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub label: &'static str,
    /// May span several lines for repeating lists.
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummarySection {
    pub title: String,
    pub rows: Vec<SummaryRow>,
}

/// Submission metadata shown above a finalized summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionStamp {
    pub id: Uuid,
    pub submitted_at: DateTime<Utc>,
    pub ignored_errors: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryView {
    pub sections: Vec<SummarySection>,
    pub stamp: Option<SubmissionStamp>,
}

impl SummaryView {
    /// Builds the view of `record`. Conditional answers appear only while
    /// their trigger holds.
    pub fn render(record: &AnswerRecord) -> Self {
        let sections = SectionId::ALL
            .iter()
            .map(|section| SummarySection {
                title: section.heading(),
                rows: schema::fields_in(*section)
                    .filter(|spec| spec.is_visible(record))
                    .map(|spec| SummaryRow {
                        label: spec.label,
                        value: field_value(record, spec.key),
                    })
                    .collect(),
            })
            .collect();
        Self {
            sections,
            stamp: None,
        }
    }

    pub fn render_finalized(finalized: &FinalizedRecord) -> Self {
        let mut view = Self::render(&finalized.answers);
        view.stamp = Some(SubmissionStamp {
            id: finalized.id,
            submitted_at: finalized.submitted_at,
            ignored_errors: finalized.ignored_errors,
        });
        view
    }

    pub fn ignored_errors(&self) -> bool {
        self.stamp.as_ref().is_some_and(|stamp| stamp.ignored_errors)
    }

    /// Value shown for `label`, searching every section.
    pub fn value_of(&self, label: &str) -> Option<&str> {
        self.sections
            .iter()
            .flat_map(|section| section.rows.iter())
            .find(|row| row.label == label)
            .map(|row| row.value.as_str())
    }

    /// Plain-text rendering, one answer per line.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", SUMMARY_TITLE);
        if let Some(stamp) = &self.stamp {
            let _ = writeln!(
                out,
                "提交编号：{}  提交时间：{}",
                stamp.id,
                stamp.submitted_at.format("%Y-%m-%d %H:%M:%S UTC")
            );
            if stamp.ignored_errors {
                let _ = writeln!(out, "（含未修正的校验问题）");
            }
        }
        for section in &self.sections {
            let _ = writeln!(out);
            let _ = writeln!(out, "{}", section.title);
            for row in &section.rows {
                if row.value.contains('\n') {
                    let _ = writeln!(out, "  {}：", row.label);
                    for line in row.value.lines() {
                        let _ = writeln!(out, "    {}", line);
                    }
                } else {
                    let _ = writeln!(out, "  {}：{}", row.label, row.value);
                }
            }
        }
        out
    }
}

fn field_value(record: &AnswerRecord, key: FieldKey) -> String {
    match key {
        FieldKey::DebtItems => debt_lines(record.debt_items.iter()),
        FieldKey::AssetItems => asset_lines(record.asset_items.iter()),
        _ => {
            let value = record.get(&FieldPath::Scalar(key)).unwrap_or_default();
            match schema::field(key).unit {
                Some(unit) if !value.is_empty() => format!("{}{}", value, unit),
                _ => value,
            }
        }
    }
}

/// Debt rows as numbered lines. Rows without a category or amount are
/// skipped but keep their position number.
pub fn debt_lines<'a>(items: impl IntoIterator<Item = &'a DebtItem>) -> String {
    numbered_lines(items, |item| {
        let category = item.category?;
        if item.amount.is_empty() {
            return None;
        }
        let has_interest = item.has_interest.unwrap_or(YesNo::No);
        let mut line = format!(
            "{}: {}万元, 计息: {}",
            category, item.amount, has_interest
        );
        if let (YesNo::Yes, Some(kind)) = (has_interest, item.interest_type) {
            let _ = write!(line, ", 计息类别: {}", kind);
        }
        if let (DebtCategory::BankMortgageLoan, Some(collateral)) =
            (category, item.mortgage_asset_type)
        {
            let _ = write!(line, ", 抵押物: {}", collateral);
        }
        if let (DebtCategory::PrivateLending, Some(source)) = (category, item.loan_source) {
            let _ = write!(line, ", 来源: {}", source);
        }
        Some(line)
    })
}

/// Asset rows as numbered lines, with the same skipping rule as debts.
pub fn asset_lines<'a>(items: impl IntoIterator<Item = &'a AssetItem>) -> String {
    numbered_lines(items, |item| {
        let category = item.category?;
        if item.amount.is_empty() {
            return None;
        }
        Some(format!(
            "{}: {}个, {}万元",
            category, item.quantity, item.amount
        ))
    })
}

fn numbered_lines<T>(
    items: impl IntoIterator<Item = T>,
    line: impl Fn(T) -> Option<String>,
) -> String {
    let mut seen = false;
    let mut lines = Vec::new();
    for (index, item) in items.into_iter().enumerate() {
        seen = true;
        if let Some(text) = line(item) {
            lines.push(format!("{}. {}", index + 1, text));
        }
    }
    if !seen {
        return NONE_LISTED.to_string();
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::survey::options::{InterestType, LoanSource, MortgageAssetType};

    fn debt(category: DebtCategory, amount: &str) -> DebtItem {
        DebtItem {
            category: Some(category),
            amount: amount.into(),
            ..DebtItem::default()
        }
    }

    #[test]
    fn debt_line_includes_only_relevant_details() {
        let mortgage = DebtItem {
            has_interest: Some(YesNo::Yes),
            interest_type: Some(InterestType::EqualInstallments),
            mortgage_asset_type: Some(MortgageAssetType::CompanyAsset),
            loan_source: Some(LoanSource::Usury),
            ..debt(DebtCategory::BankMortgageLoan, "50")
        };
        assert_eq!(
            debt_lines([&mortgage]),
            "1. 银行抵押贷款: 50万元, 计息: 是, 计息类别: 等额本息, 抵押物: 企业资产"
        );

        let private = DebtItem {
            interest_type: Some(InterestType::InterestFirst),
            loan_source: Some(LoanSource::Individual),
            ..debt(DebtCategory::PrivateLending, "8")
        };
        assert_eq!(debt_lines([&private]), "1. 民间借贷: 8万元, 计息: 否, 来源: 个人");
    }

    #[test]
    fn incomplete_rows_are_skipped_but_keep_numbering() {
        let rows = [
            debt(DebtCategory::TaxDebt, ""),
            DebtItem::default(),
            debt(DebtCategory::EmployeeDebt, "3"),
        ];
        assert_eq!(debt_lines(rows.iter()), "3. 职工债务: 3万元, 计息: 否");
        assert_eq!(debt_lines(rows[..2].iter()), "");
        assert_eq!(debt_lines(std::iter::empty()), "无");
        assert_eq!(asset_lines(std::iter::empty()), "无");
    }

    #[test]
    fn asset_line_format() {
        let asset = AssetItem {
            category: Some(crate::survey::options::AssetCategory::Land),
            quantity: "2".into(),
            amount: "300".into(),
        };
        assert_eq!(asset_lines([&asset]), "1. 土地: 2个, 300万元");
    }

    #[test]
    fn render_hides_inactive_conditional_answers() {
        let mut record = AnswerRecord::default();
        record.total_debt = "100".into();
        record.execution_details = "厂房已查封".into();
        record.employee_count = "15".into();

        let view = SummaryView::render(&record);
        assert_eq!(view.sections.len(), 6);
        assert_eq!(view.sections[5].title, "6. 支付能力");
        assert_eq!(view.value_of("债务总额"), Some("100万元"));
        assert_eq!(view.value_of("资产总额"), Some(""));
        assert_eq!(view.value_of("查封、拍卖情况"), None);
        assert_eq!(view.value_of("员工数量"), Some("15"));
        assert_eq!(view.value_of("停止经营时间"), None);
        assert_eq!(view.value_of("实缴金额"), None);
        assert_eq!(view.value_of("注册资本"), Some(""));
    }

    #[test]
    fn finalized_text_mentions_ignored_errors() {
        let finalized = FinalizedRecord::new(AnswerRecord::default(), true);
        let view = SummaryView::render_finalized(&finalized);
        assert!(view.ignored_errors());
        let text = view.to_text();
        assert!(text.starts_with(SUMMARY_TITLE));
        assert!(text.contains("（含未修正的校验问题）"));
        assert!(text.contains("\n1. 基本信息\n"));
        assert!(text.contains("  企业是否还在经营：是\n"));
    }
}
