use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{Result, SurveyError};
use crate::survey::items::ItemList;
use crate::survey::options::{
    blank_option, AssetCategory, CapitalPaid, DebtCategory, InterestType, LoanSource,
    MortgageAssetType, PersonalDebt, Region, Role, YesNo,
};
use crate::survey::path::{AssetField, DebtField, FieldKey, FieldPath};

/// One row of the debt table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtItem {
    #[serde(rename = "type", default, with = "blank_option")]
    pub category: Option<DebtCategory>,
    #[serde(default)]
    pub amount: String,
    #[serde(default, with = "blank_option")]
    pub has_interest: Option<YesNo>,
    #[serde(default, with = "blank_option")]
    pub interest_type: Option<InterestType>,
    #[serde(default, with = "blank_option")]
    pub mortgage_asset_type: Option<MortgageAssetType>,
    #[serde(default, with = "blank_option")]
    pub loan_source: Option<LoanSource>,
}

impl Default for DebtItem {
    fn default() -> Self {
        Self {
            category: None,
            amount: String::new(),
            has_interest: Some(YesNo::No),
            interest_type: None,
            mortgage_asset_type: None,
            loan_source: None,
        }
    }
}

/// One row of the asset table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetItem {
    #[serde(rename = "type", default, with = "blank_option")]
    pub category: Option<AssetCategory>,
    /// Free text: respondents may write a count or a description.
    #[serde(default)]
    pub quantity: String,
    #[serde(default)]
    pub amount: String,
}

/// The full set of answers collected by one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnswerRecord {
    #[serde(with = "blank_option")]
    pub role: Option<Role>,
    pub contact: String,
    #[serde(with = "blank_option")]
    pub region: Option<Region>,
    pub company_name: String,

    pub total_debt: String,
    pub debt_items: ItemList<DebtItem>,
    pub lawsuit_debts: String,
    #[serde(with = "blank_option")]
    pub in_execution: Option<YesNo>,
    pub execution_details: String,
    #[serde(with = "blank_option")]
    pub personal_debt: Option<PersonalDebt>,
    pub personal_debt_amount: String,

    pub total_asset: String,
    pub asset_items: ItemList<AssetItem>,

    #[serde(with = "blank_option")]
    pub continue_business: Option<YesNo>,
    pub problems_to_solve: String,

    #[serde(with = "blank_option")]
    pub capital_paid: Option<CapitalPaid>,
    pub registered_capital: String,
    pub paid_capital: String,
    pub registration_date: String,

    #[serde(with = "blank_option")]
    pub still_operating: Option<YesNo>,
    pub employee_count: String,
    pub stop_operating_time: String,
    #[serde(with = "blank_option")]
    pub other_business: Option<YesNo>,
    pub other_business_content: String,
}

impl Default for AnswerRecord {
    fn default() -> Self {
        Self {
            role: None,
            contact: String::new(),
            region: None,
            company_name: String::new(),
            total_debt: String::new(),
            debt_items: ItemList::default(),
            lawsuit_debts: String::new(),
            in_execution: Some(YesNo::No),
            execution_details: String::new(),
            personal_debt: Some(PersonalDebt::CorporateOnly),
            personal_debt_amount: String::new(),
            total_asset: String::new(),
            asset_items: ItemList::default(),
            continue_business: Some(YesNo::Yes),
            problems_to_solve: String::new(),
            capital_paid: Some(CapitalPaid::Unpaid),
            registered_capital: String::new(),
            paid_capital: String::new(),
            registration_date: String::new(),
            still_operating: Some(YesNo::Yes),
            employee_count: String::new(),
            stop_operating_time: String::new(),
            other_business: Some(YesNo::No),
            other_business_content: String::new(),
        }
    }
}

impl AnswerRecord {
    /// Current value at `path` as displayed to the respondent.
    ///
    /// Unselected options read as `""`; list keys and rows that do not exist
    /// yield `None`.
    pub fn get(&self, path: &FieldPath) -> Option<String> {
        match path {
            FieldPath::Scalar(key) => self.scalar(*key),
            FieldPath::Debt { row, field } => {
                let item = self.debt_items.get(*row)?;
                Some(match field {
                    DebtField::Category => label(item.category),
                    DebtField::Amount => item.amount.clone(),
                    DebtField::HasInterest => label(item.has_interest),
                    DebtField::InterestType => label(item.interest_type),
                    DebtField::MortgageAssetType => label(item.mortgage_asset_type),
                    DebtField::LoanSource => label(item.loan_source),
                })
            }
            FieldPath::Asset { row, field } => {
                let item = self.asset_items.get(*row)?;
                Some(match field {
                    AssetField::Category => label(item.category),
                    AssetField::Quantity => item.quantity.clone(),
                    AssetField::Amount => item.amount.clone(),
                })
            }
        }
    }

    fn scalar(&self, key: FieldKey) -> Option<String> {
        let value = match key {
            FieldKey::Role => label(self.role),
            FieldKey::Contact => self.contact.clone(),
            FieldKey::Region => label(self.region),
            FieldKey::CompanyName => self.company_name.clone(),
            FieldKey::TotalDebt => self.total_debt.clone(),
            FieldKey::LawsuitDebts => self.lawsuit_debts.clone(),
            FieldKey::InExecution => label(self.in_execution),
            FieldKey::ExecutionDetails => self.execution_details.clone(),
            FieldKey::PersonalDebt => label(self.personal_debt),
            FieldKey::PersonalDebtAmount => self.personal_debt_amount.clone(),
            FieldKey::TotalAsset => self.total_asset.clone(),
            FieldKey::ContinueBusiness => label(self.continue_business),
            FieldKey::ProblemsToSolve => self.problems_to_solve.clone(),
            FieldKey::CapitalPaid => label(self.capital_paid),
            FieldKey::RegisteredCapital => self.registered_capital.clone(),
            FieldKey::PaidCapital => self.paid_capital.clone(),
            FieldKey::RegistrationDate => self.registration_date.clone(),
            FieldKey::StillOperating => label(self.still_operating),
            FieldKey::EmployeeCount => self.employee_count.clone(),
            FieldKey::StopOperatingTime => self.stop_operating_time.clone(),
            FieldKey::OtherBusiness => label(self.other_business),
            FieldKey::OtherBusinessContent => self.other_business_content.clone(),
            FieldKey::DebtItems | FieldKey::AssetItems => return None,
        };
        Some(value)
    }

    /// Stores `value` at `path`.
    ///
    /// Options must match a label exactly (`""` clears the selection) and
    /// dates must be `YYYY-MM-DD` and not in the future. Numeric format is
    /// not checked here; see [`crate::survey::session::SurveySession::set`].
    pub fn write(&mut self, path: &FieldPath, value: &str) -> Result<()> {
        let unknown = || SurveyError::UnknownPath(path.to_string());
        match path {
            FieldPath::Scalar(key) => self.write_scalar(*key, value, path),
            FieldPath::Debt { row, field } => {
                let item = self.debt_items.get_mut(*row).ok_or_else(unknown)?;
                match field {
                    DebtField::Category => {
                        item.category = choice(path, value, DebtCategory::from_label)?
                    }
                    DebtField::Amount => item.amount = value.to_string(),
                    DebtField::HasInterest => {
                        item.has_interest = choice(path, value, YesNo::from_label)?
                    }
                    DebtField::InterestType => {
                        item.interest_type = choice(path, value, InterestType::from_label)?
                    }
                    DebtField::MortgageAssetType => {
                        item.mortgage_asset_type =
                            choice(path, value, MortgageAssetType::from_label)?
                    }
                    DebtField::LoanSource => {
                        item.loan_source = choice(path, value, LoanSource::from_label)?
                    }
                }
                Ok(())
            }
            FieldPath::Asset { row, field } => {
                let item = self.asset_items.get_mut(*row).ok_or_else(unknown)?;
                match field {
                    AssetField::Category => {
                        item.category = choice(path, value, AssetCategory::from_label)?
                    }
                    AssetField::Quantity => item.quantity = value.to_string(),
                    AssetField::Amount => item.amount = value.to_string(),
                }
                Ok(())
            }
        }
    }

    fn write_scalar(&mut self, key: FieldKey, value: &str, path: &FieldPath) -> Result<()> {
        let text = value.to_string();
        match key {
            FieldKey::Role => self.role = choice(path, value, Role::from_label)?,
            FieldKey::Contact => self.contact = text,
            FieldKey::Region => self.region = choice(path, value, Region::from_label)?,
            FieldKey::CompanyName => self.company_name = text,
            FieldKey::TotalDebt => self.total_debt = text,
            FieldKey::LawsuitDebts => self.lawsuit_debts = text,
            FieldKey::InExecution => self.in_execution = choice(path, value, YesNo::from_label)?,
            FieldKey::ExecutionDetails => self.execution_details = text,
            FieldKey::PersonalDebt => {
                self.personal_debt = choice(path, value, PersonalDebt::from_label)?
            }
            FieldKey::PersonalDebtAmount => self.personal_debt_amount = text,
            FieldKey::TotalAsset => self.total_asset = text,
            FieldKey::ContinueBusiness => {
                self.continue_business = choice(path, value, YesNo::from_label)?
            }
            FieldKey::ProblemsToSolve => self.problems_to_solve = text,
            FieldKey::CapitalPaid => {
                self.capital_paid = choice(path, value, CapitalPaid::from_label)?
            }
            FieldKey::RegisteredCapital => self.registered_capital = text,
            FieldKey::PaidCapital => self.paid_capital = text,
            FieldKey::RegistrationDate => self.registration_date = date(path, value)?,
            FieldKey::StillOperating => {
                self.still_operating = choice(path, value, YesNo::from_label)?
            }
            FieldKey::EmployeeCount => self.employee_count = text,
            FieldKey::StopOperatingTime => self.stop_operating_time = text,
            FieldKey::OtherBusiness => {
                self.other_business = choice(path, value, YesNo::from_label)?
            }
            FieldKey::OtherBusinessContent => self.other_business_content = text,
            FieldKey::DebtItems | FieldKey::AssetItems => {
                return Err(SurveyError::UnknownPath(path.to_string()))
            }
        }
        Ok(())
    }

    /// Independent copy of the current answers.
    pub fn snapshot(&self) -> AnswerRecord {
        self.clone()
    }
}

fn label<T: Copy + std::fmt::Display>(value: Option<T>) -> String {
    value.map(|option| option.to_string()).unwrap_or_default()
}

fn choice<T>(path: &FieldPath, raw: &str, lookup: fn(&str) -> Option<T>) -> Result<Option<T>> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    lookup(raw).map(Some).ok_or_else(|| SurveyError::InvalidChoice {
        field: path.to_string(),
        value: raw.trim().to_string(),
    })
}

fn date(path: &FieldPath, raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    let invalid = |reason: String| SurveyError::InvalidDate {
        field: path.to_string(),
        reason,
    };
    let parsed = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map_err(|_| invalid("use YYYY-MM-DD format".into()))?;
    let today = Local::now().date_naive();
    if parsed > today {
        return Err(invalid(format!(
            "date cannot be after {}",
            today.format("%Y-%m-%d")
        )));
    }
    Ok(parsed.format("%Y-%m-%d").to_string())
}

/// A record frozen at submission time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizedRecord {
    pub id: Uuid,
    pub submitted_at: DateTime<Utc>,
    #[serde(rename = "_ignoredErrors")]
    pub ignored_errors: bool,
    pub answers: AnswerRecord,
}

impl FinalizedRecord {
    pub fn new(answers: AnswerRecord, ignored_errors: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            submitted_at: Utc::now(),
            ignored_errors,
            answers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(raw: &str) -> FieldPath {
        raw.parse().unwrap()
    }

    #[test]
    fn defaults_seed_one_row_per_list() {
        let record = AnswerRecord::default();
        assert_eq!(record.debt_items.len(), 1);
        assert_eq!(record.asset_items.len(), 1);
        assert_eq!(record.get(&path("debtItems.0.hasInterest")).as_deref(), Some("否"));
        assert_eq!(record.get(&path("inExecution")).as_deref(), Some("否"));
        assert_eq!(record.get(&path("role")).as_deref(), Some(""));
    }

    #[test]
    fn write_accepts_labels_and_clears_on_blank() {
        let mut record = AnswerRecord::default();
        record.write(&path("region"), "北京市").unwrap();
        assert_eq!(record.region, Some(Region::Beijing));
        record.write(&path("region"), "").unwrap();
        assert_eq!(record.region, None);
    }

    #[test]
    fn write_rejects_unknown_options_and_rows() {
        let mut record = AnswerRecord::default();
        assert!(matches!(
            record.write(&path("role"), "经理"),
            Err(SurveyError::InvalidChoice { .. })
        ));
        assert!(matches!(
            record.write(&path("debtItems.3.amount"), "5"),
            Err(SurveyError::UnknownPath(_))
        ));
        assert_eq!(record.get(&path("assetItems.4.amount")), None);
    }

    #[test]
    fn registration_date_must_be_past_iso_date() {
        let mut record = AnswerRecord::default();
        record.write(&path("registrationDate"), "2015-03-09").unwrap();
        assert_eq!(record.registration_date, "2015-03-09");
        assert!(record.write(&path("registrationDate"), "09/03/2015").is_err());
        assert!(record.write(&path("registrationDate"), "2999-01-01").is_err());
        assert_eq!(record.registration_date, "2015-03-09");
    }

    #[test]
    fn serializes_with_camel_case_field_names() {
        let mut record = AnswerRecord::default();
        record.write(&path("debtItems.0.type"), "民间借贷").unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["debtItems"][0]["type"], "民间借贷");
        assert_eq!(json["debtItems"][0]["loanSource"], "");
        assert_eq!(json["capitalPaid"], "未完成实缴");
        assert_eq!(json["role"], "");
    }

    #[test]
    fn deserializes_blank_and_missing_values() {
        let record: AnswerRecord = serde_json::from_str(
            r#"{ "role": "", "region": null, "debtItems": [], "totalDebt": "12" }"#,
        )
        .unwrap();
        assert_eq!(record.role, None);
        assert_eq!(record.region, None);
        assert_eq!(record.total_debt, "12");
        assert_eq!(record.debt_items.len(), 1);
        assert_eq!(record.still_operating, Some(YesNo::Yes));
    }

    #[test]
    fn finalized_record_carries_ignored_marker() {
        let finalized = FinalizedRecord::new(AnswerRecord::default(), true);
        let json = serde_json::to_value(&finalized).unwrap();
        assert_eq!(json["_ignoredErrors"], true);
    }
}
