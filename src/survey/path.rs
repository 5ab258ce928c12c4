//! Dot-and-index field addressing (`totalDebt`, `debtItems.2.amount`).

use std::fmt;
use std::str::FromStr;

use crate::errors::SurveyError;

/// Top-level answer keys in questionnaire order.
///
/// `DebtItems` and `AssetItems` name the repeating lists themselves; their
/// cells are addressed through [`FieldPath::Debt`] and [`FieldPath::Asset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    Role,
    Contact,
    Region,
    CompanyName,
    TotalDebt,
    DebtItems,
    LawsuitDebts,
    InExecution,
    ExecutionDetails,
    PersonalDebt,
    PersonalDebtAmount,
    TotalAsset,
    AssetItems,
    ContinueBusiness,
    ProblemsToSolve,
    CapitalPaid,
    RegisteredCapital,
    PaidCapital,
    RegistrationDate,
    StillOperating,
    EmployeeCount,
    StopOperatingTime,
    OtherBusiness,
    OtherBusinessContent,
}

impl FieldKey {
    pub const ALL: &'static [FieldKey] = &[
        FieldKey::Role,
        FieldKey::Contact,
        FieldKey::Region,
        FieldKey::CompanyName,
        FieldKey::TotalDebt,
        FieldKey::DebtItems,
        FieldKey::LawsuitDebts,
        FieldKey::InExecution,
        FieldKey::ExecutionDetails,
        FieldKey::PersonalDebt,
        FieldKey::PersonalDebtAmount,
        FieldKey::TotalAsset,
        FieldKey::AssetItems,
        FieldKey::ContinueBusiness,
        FieldKey::ProblemsToSolve,
        FieldKey::CapitalPaid,
        FieldKey::RegisteredCapital,
        FieldKey::PaidCapital,
        FieldKey::RegistrationDate,
        FieldKey::StillOperating,
        FieldKey::EmployeeCount,
        FieldKey::StopOperatingTime,
        FieldKey::OtherBusiness,
        FieldKey::OtherBusinessContent,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKey::Role => "role",
            FieldKey::Contact => "contact",
            FieldKey::Region => "region",
            FieldKey::CompanyName => "companyName",
            FieldKey::TotalDebt => "totalDebt",
            FieldKey::DebtItems => "debtItems",
            FieldKey::LawsuitDebts => "lawsuitDebts",
            FieldKey::InExecution => "inExecution",
            FieldKey::ExecutionDetails => "executionDetails",
            FieldKey::PersonalDebt => "personalDebt",
            FieldKey::PersonalDebtAmount => "personalDebtAmount",
            FieldKey::TotalAsset => "totalAsset",
            FieldKey::AssetItems => "assetItems",
            FieldKey::ContinueBusiness => "continueBusiness",
            FieldKey::ProblemsToSolve => "problemsToSolve",
            FieldKey::CapitalPaid => "capitalPaid",
            FieldKey::RegisteredCapital => "registeredCapital",
            FieldKey::PaidCapital => "paidCapital",
            FieldKey::RegistrationDate => "registrationDate",
            FieldKey::StillOperating => "stillOperating",
            FieldKey::EmployeeCount => "employeeCount",
            FieldKey::StopOperatingTime => "stopOperatingTime",
            FieldKey::OtherBusiness => "otherBusiness",
            FieldKey::OtherBusinessContent => "otherBusinessContent",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|key| key.as_str() == name)
    }

    pub fn is_list(self) -> bool {
        matches!(self, FieldKey::DebtItems | FieldKey::AssetItems)
    }
}

/// Columns of a debt row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DebtField {
    Category,
    Amount,
    HasInterest,
    InterestType,
    MortgageAssetType,
    LoanSource,
}

impl DebtField {
    pub const ALL: &'static [DebtField] = &[
        DebtField::Category,
        DebtField::Amount,
        DebtField::HasInterest,
        DebtField::InterestType,
        DebtField::MortgageAssetType,
        DebtField::LoanSource,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DebtField::Category => "type",
            DebtField::Amount => "amount",
            DebtField::HasInterest => "hasInterest",
            DebtField::InterestType => "interestType",
            DebtField::MortgageAssetType => "mortgageAssetType",
            DebtField::LoanSource => "loanSource",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.as_str() == name)
    }
}

/// Columns of an asset row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssetField {
    Category,
    Quantity,
    Amount,
}

impl AssetField {
    pub const ALL: &'static [AssetField] =
        &[AssetField::Category, AssetField::Quantity, AssetField::Amount];

    pub fn as_str(self) -> &'static str {
        match self {
            AssetField::Category => "type",
            AssetField::Quantity => "quantity",
            AssetField::Amount => "amount",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|field| field.as_str() == name)
    }
}

/// Address of a single answer cell.
///
/// Ordering follows questionnaire order: list cells sort at the position of
/// their list, then by row, then by column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldPath {
    Scalar(FieldKey),
    Debt { row: usize, field: DebtField },
    Asset { row: usize, field: AssetField },
}

impl FieldPath {
    /// Top-level key that owns this path.
    pub fn anchor(&self) -> FieldKey {
        match self {
            FieldPath::Scalar(key) => *key,
            FieldPath::Debt { .. } => FieldKey::DebtItems,
            FieldPath::Asset { .. } => FieldKey::AssetItems,
        }
    }

    fn sort_key(&self) -> (FieldKey, usize, usize) {
        match self {
            FieldPath::Scalar(key) => (*key, 0, 0),
            FieldPath::Debt { row, field } => (FieldKey::DebtItems, *row, *field as usize),
            FieldPath::Asset { row, field } => (FieldKey::AssetItems, *row, *field as usize),
        }
    }
}

impl PartialOrd for FieldPath {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FieldPath {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl From<FieldKey> for FieldPath {
    fn from(key: FieldKey) -> Self {
        FieldPath::Scalar(key)
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldPath::Scalar(key) => f.write_str(key.as_str()),
            FieldPath::Debt { row, field } => write!(f, "debtItems.{}.{}", row, field.as_str()),
            FieldPath::Asset { row, field } => {
                write!(f, "assetItems.{}.{}", row, field.as_str())
            }
        }
    }
}

impl FromStr for FieldPath {
    type Err = SurveyError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let unknown = || SurveyError::UnknownPath(raw.to_string());
        let mut segments = raw.trim().split('.');
        let head = segments.next().ok_or_else(unknown)?;
        let key = FieldKey::from_name(head).ok_or_else(unknown)?;

        if !key.is_list() {
            return match segments.next() {
                None => Ok(FieldPath::Scalar(key)),
                Some(_) => Err(unknown()),
            };
        }

        let row = segments
            .next()
            .and_then(|segment| segment.parse::<usize>().ok())
            .ok_or_else(unknown)?;
        let column = segments.next().ok_or_else(unknown)?;
        if segments.next().is_some() {
            return Err(unknown());
        }

        match key {
            FieldKey::DebtItems => DebtField::from_name(column)
                .map(|field| FieldPath::Debt { row, field })
                .ok_or_else(unknown),
            _ => AssetField::from_name(column)
                .map(|field| FieldPath::Asset { row, field })
                .ok_or_else(unknown),
        }
    }
}
