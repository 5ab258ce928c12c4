//! Declarative description of every question in the questionnaire.
//!
//! Sections, prompts, option sets, required messages and visibility rules
//! are data. The session, validation layer, summary renderer and CLI all read
//! them from here so that input-time and display-time behaviour agree.

use crate::survey::options::{
    AssetCategory, CapitalPaid, DebtCategory, InterestType, LoanSource, MortgageAssetType,
    PersonalDebt, Region, Role, YesNo,
};
use crate::survey::path::{AssetField, DebtField, FieldKey, FieldPath};
use crate::survey::record::AnswerRecord;

/// Questionnaire pages in presentation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SectionId {
    BasicInfo,
    Debts,
    Assets,
    Demands,
    Liquidation,
    PaymentAbility,
}

impl SectionId {
    pub const ALL: &'static [SectionId] = &[
        SectionId::BasicInfo,
        SectionId::Debts,
        SectionId::Assets,
        SectionId::Demands,
        SectionId::Liquidation,
        SectionId::PaymentAbility,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn title(self) -> &'static str {
        match self {
            SectionId::BasicInfo => "基本信息",
            SectionId::Debts => "债务情况",
            SectionId::Assets => "资产情况",
            SectionId::Demands => "客户诉求",
            SectionId::Liquidation => "清算与实缴情况",
            SectionId::PaymentAbility => "支付能力",
        }
    }

    /// Numbered heading, e.g. `2. 债务情况`.
    pub fn heading(self) -> String {
        format!("{}. {}", self.index() + 1, self.title())
    }
}

pub const SECTION_COUNT: usize = 6;

/// Input kind of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Decimal string subject to the numeric-format check.
    Decimal,
    /// `YYYY-MM-DD`, not after today.
    Date,
    Choice(&'static [&'static str]),
    /// A repeating list of rows.
    Rows,
}

/// Condition under which a dependent field is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Always,
    /// Shown while the named field currently holds the given label.
    When(FieldKey, &'static str),
}

impl Visibility {
    pub fn holds(&self, record: &AnswerRecord) -> bool {
        match self {
            Visibility::Always => true,
            Visibility::When(key, expected) => {
                record.get(&FieldPath::Scalar(*key)).as_deref() == Some(*expected)
            }
        }
    }
}

/// One top-level question.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub key: FieldKey,
    pub section: SectionId,
    /// Question tag used in error messages (`问题5`); dependent follow-ups
    /// inherit the tag of the question they belong to.
    pub tag: &'static str,
    pub prompt: &'static str,
    /// Short label used in the summary and numeric-format messages.
    pub label: &'static str,
    pub kind: FieldKind,
    /// Message reported when the answer is missing; `None` for optional and
    /// conditional fields.
    pub required: Option<&'static str>,
    pub visibility: Visibility,
    /// Unit appended to non-empty values in the summary.
    pub unit: Option<&'static str>,
}

impl FieldSpec {
    const fn new(
        key: FieldKey,
        section: SectionId,
        tag: &'static str,
        prompt: &'static str,
        label: &'static str,
        kind: FieldKind,
    ) -> Self {
        Self {
            key,
            section,
            tag,
            prompt,
            label,
            kind,
            required: None,
            visibility: Visibility::Always,
            unit: None,
        }
    }

    const fn required(mut self, message: &'static str) -> Self {
        self.required = Some(message);
        self
    }

    const fn shown_when(mut self, key: FieldKey, label: &'static str) -> Self {
        self.visibility = Visibility::When(key, label);
        self
    }

    const fn in_wan_yuan(mut self) -> Self {
        self.unit = Some(WAN_YUAN);
        self
    }

    pub fn is_visible(&self, record: &AnswerRecord) -> bool {
        self.visibility.holds(record)
    }
}

pub const WAN_YUAN: &str = "万元";

/// Condition on another column of the same row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowVisibility {
    Always,
    When(&'static str, &'static str),
}

/// One column of a repeating row.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    /// Noun and verb of the missing-value message: `第1项{noun}未{verb}`.
    pub missing: Option<(&'static str, &'static str)>,
    pub visibility: RowVisibility,
}

impl ColumnSpec {
    const fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            missing: None,
            visibility: RowVisibility::Always,
        }
    }

    const fn required(mut self, noun: &'static str, verb: &'static str) -> Self {
        self.missing = Some((noun, verb));
        self
    }

    const fn shown_when(mut self, column: &'static str, label: &'static str) -> Self {
        self.visibility = RowVisibility::When(column, label);
        self
    }
}

const SELECTED: &str = "选择";
const FILLED: &str = "填写";

static FIELDS: [FieldSpec; 24] = [
    FieldSpec::new(
        FieldKey::Role,
        SectionId::BasicInfo,
        "问题1",
        "问题1：请问您是公司的法人、股东还是实际控制人？",
        "您的角色",
        FieldKind::Choice(Role::LABELS),
    )
    .required("请选择您的角色"),
    FieldSpec::new(
        FieldKey::Contact,
        SectionId::BasicInfo,
        "问题2",
        "问题2：请提供您的联系方式（手机/邮箱）",
        "联系方式",
        FieldKind::Text,
    )
    .required("请提供联系方式"),
    FieldSpec::new(
        FieldKey::Region,
        SectionId::BasicInfo,
        "问题3",
        "问题3：所在地区",
        "所在地区",
        FieldKind::Choice(Region::LABELS),
    )
    .required("请选择所在地区"),
    FieldSpec::new(
        FieldKey::CompanyName,
        SectionId::BasicInfo,
        "问题4",
        "问题4：请提供您的公司名称",
        "公司名称",
        FieldKind::Text,
    )
    .required("请提供公司名称"),
    FieldSpec::new(
        FieldKey::TotalDebt,
        SectionId::Debts,
        "问题5",
        "问题5：请问贵企业名下的债务总额是多少？（单位：万元）",
        "债务总额",
        FieldKind::Decimal,
    )
    .required("请填写债务总额")
    .in_wan_yuan(),
    FieldSpec::new(
        FieldKey::DebtItems,
        SectionId::Debts,
        "问题6",
        "问题6：请列出贵企业的主要债务情况，包括债务类别、具体金额、是否计息等。",
        "主要债务情况",
        FieldKind::Rows,
    ),
    FieldSpec::new(
        FieldKey::LawsuitDebts,
        SectionId::Debts,
        "问题7",
        "问题7：目前这些债务中，是否有被起诉的？如有，请列出。",
        "被起诉债务",
        FieldKind::Text,
    ),
    FieldSpec::new(
        FieldKey::InExecution,
        SectionId::Debts,
        "问题8",
        "问题8：是否有债务已进入执行阶段？",
        "债务是否进入执行阶段",
        FieldKind::Choice(YesNo::LABELS),
    )
    .required("请选择是否有债务已进入执行阶段"),
    FieldSpec::new(
        FieldKey::ExecutionDetails,
        SectionId::Debts,
        "问题8",
        "请说明查封、拍卖情况",
        "查封、拍卖情况",
        FieldKind::Text,
    )
    .shown_when(FieldKey::InExecution, "是"),
    FieldSpec::new(
        FieldKey::PersonalDebt,
        SectionId::Debts,
        "问题9",
        "问题9：债务是否全部为企业债务？有无连带到您个人？",
        "债务性质",
        FieldKind::Choice(PersonalDebt::LABELS),
    )
    .required("请选择债务是否全部为企业债务"),
    FieldSpec::new(
        FieldKey::PersonalDebtAmount,
        SectionId::Debts,
        "问题9",
        "连带个人债务金额（万元）",
        "连带个人债务金额",
        FieldKind::Decimal,
    )
    .shown_when(FieldKey::PersonalDebt, "有连带个人债务")
    .in_wan_yuan(),
    FieldSpec::new(
        FieldKey::TotalAsset,
        SectionId::Assets,
        "问题10",
        "问题10：请问贵企业名下的资产总额是多少？（单位：万元）",
        "资产总额",
        FieldKind::Decimal,
    )
    .required("请填写资产总额")
    .in_wan_yuan(),
    FieldSpec::new(
        FieldKey::AssetItems,
        SectionId::Assets,
        "问题11",
        "问题11：请列出贵企业的主要资产情况，包括资产类别、数量、金额等。",
        "主要资产情况",
        FieldKind::Rows,
    ),
    FieldSpec::new(
        FieldKey::ContinueBusiness,
        SectionId::Demands,
        "问题12",
        "问题12：您目前是否还想继续经营企业？",
        "是否继续经营企业",
        FieldKind::Choice(YesNo::LABELS),
    )
    .required("请选择是否继续经营企业"),
    FieldSpec::new(
        FieldKey::ProblemsToSolve,
        SectionId::Demands,
        "问题13",
        "问题13：请说明您主要想要解决的问题是什么？",
        "想要解决的问题",
        FieldKind::Text,
    )
    .shown_when(FieldKey::ContinueBusiness, "是"),
    FieldSpec::new(
        FieldKey::CapitalPaid,
        SectionId::Liquidation,
        "问题14",
        "问题14：请问贵公司的注册资本是否已完成实缴？（重整无需实缴完成）",
        "注册资本是否已完成实缴",
        FieldKind::Choice(CapitalPaid::LABELS),
    )
    .required("请选择是否已完成实缴"),
    FieldSpec::new(
        FieldKey::RegisteredCapital,
        SectionId::Liquidation,
        "问题14",
        "注册资本（万元）",
        "注册资本",
        FieldKind::Decimal,
    )
    .in_wan_yuan(),
    FieldSpec::new(
        FieldKey::PaidCapital,
        SectionId::Liquidation,
        "问题14",
        "实缴金额（万元）",
        "实缴金额",
        FieldKind::Decimal,
    )
    .shown_when(FieldKey::CapitalPaid, "已完成实缴（包括部分完成）")
    .in_wan_yuan(),
    FieldSpec::new(
        FieldKey::RegistrationDate,
        SectionId::Liquidation,
        "问题14",
        "注册时间（YYYY-MM-DD）",
        "注册时间",
        FieldKind::Date,
    ),
    FieldSpec::new(
        FieldKey::StillOperating,
        SectionId::PaymentAbility,
        "问题15",
        "问题15：目前企业是否还在经营？",
        "企业是否还在经营",
        FieldKind::Choice(YesNo::LABELS),
    )
    .required("请选择企业是否还在经营"),
    FieldSpec::new(
        FieldKey::EmployeeCount,
        SectionId::PaymentAbility,
        "问题16",
        "问题16：请说明目前在经营的企业还有多少员工。",
        "员工数量",
        FieldKind::Decimal,
    )
    .shown_when(FieldKey::StillOperating, "是"),
    FieldSpec::new(
        FieldKey::StopOperatingTime,
        SectionId::PaymentAbility,
        "问题17",
        "问题17：请说明企业停止经营多久了。（例如：6个月、2年）",
        "停止经营时间",
        FieldKind::Text,
    )
    .shown_when(FieldKey::StillOperating, "否"),
    FieldSpec::new(
        FieldKey::OtherBusiness,
        SectionId::PaymentAbility,
        "问题18",
        "问题18：贵企业是否还有其他业务在经营？",
        "是否有其他业务在经营",
        FieldKind::Choice(YesNo::LABELS),
    )
    .required("请选择是否有其他业务在经营"),
    FieldSpec::new(
        FieldKey::OtherBusinessContent,
        SectionId::PaymentAbility,
        "问题18",
        "请说明经营的是什么",
        "其他业务内容",
        FieldKind::Text,
    )
    .shown_when(FieldKey::OtherBusiness, "是"),
];

static DEBT_COLUMNS: [ColumnSpec; 6] = [
    ColumnSpec::new("type", "债务类别", FieldKind::Choice(DebtCategory::LABELS))
        .required("债务类别", SELECTED),
    ColumnSpec::new("amount", "具体金额（万元）", FieldKind::Decimal)
        .required("债务金额", FILLED),
    ColumnSpec::new("hasInterest", "是否计息", FieldKind::Choice(YesNo::LABELS))
        .required("是否计息", SELECTED),
    ColumnSpec::new(
        "interestType",
        "计息类别",
        FieldKind::Choice(InterestType::LABELS),
    )
    .shown_when("hasInterest", "是"),
    ColumnSpec::new(
        "mortgageAssetType",
        "抵押物类型",
        FieldKind::Choice(MortgageAssetType::LABELS),
    )
    .shown_when("type", "银行抵押贷款"),
    ColumnSpec::new("loanSource", "借贷来源", FieldKind::Choice(LoanSource::LABELS))
        .shown_when("type", "民间借贷"),
];

static ASSET_COLUMNS: [ColumnSpec; 3] = [
    ColumnSpec::new("type", "资产类别", FieldKind::Choice(AssetCategory::LABELS))
        .required("资产类别", SELECTED),
    ColumnSpec::new("quantity", "数量（可填写数字或文字）", FieldKind::Text)
        .required("资产数量", FILLED),
    ColumnSpec::new("amount", "金额（万元）", FieldKind::Decimal).required("资产金额", FILLED),
];

/// Every question in presentation order.
pub fn fields() -> &'static [FieldSpec] {
    &FIELDS
}

pub fn fields_in(section: SectionId) -> impl Iterator<Item = &'static FieldSpec> {
    FIELDS.iter().filter(move |spec| spec.section == section)
}

pub fn field(key: FieldKey) -> &'static FieldSpec {
    // FIELDS is declared in FieldKey order.
    &FIELDS[key as usize]
}

pub fn debt_column(field: DebtField) -> &'static ColumnSpec {
    &DEBT_COLUMNS[field as usize]
}

pub fn asset_column(field: AssetField) -> &'static ColumnSpec {
    &ASSET_COLUMNS[field as usize]
}

pub fn debt_columns() -> &'static [ColumnSpec] {
    &DEBT_COLUMNS
}

pub fn asset_columns() -> &'static [ColumnSpec] {
    &ASSET_COLUMNS
}

/// Section that owns the cell at `path`.
pub fn section_of(path: &FieldPath) -> SectionId {
    field(path.anchor()).section
}

/// Input kind of the cell at `path`.
pub fn kind_of(path: &FieldPath) -> FieldKind {
    match path {
        FieldPath::Scalar(key) => field(*key).kind,
        FieldPath::Debt { field, .. } => debt_column(*field).kind,
        FieldPath::Asset { field, .. } => asset_column(*field).kind,
    }
}

/// Whether the cell at `path` is currently shown to the respondent.
pub fn is_visible(record: &AnswerRecord, path: &FieldPath) -> bool {
    match path {
        FieldPath::Scalar(key) => field(*key).is_visible(record),
        FieldPath::Debt { row, field } => {
            row_condition_holds(record, debt_column(*field).visibility, |column| {
                DebtField::from_name(column).map(|field| FieldPath::Debt { row: *row, field })
            })
        }
        FieldPath::Asset { row, field } => {
            row_condition_holds(record, asset_column(*field).visibility, |column| {
                AssetField::from_name(column).map(|field| FieldPath::Asset { row: *row, field })
            })
        }
    }
}

fn row_condition_holds(
    record: &AnswerRecord,
    visibility: RowVisibility,
    sibling: impl Fn(&str) -> Option<FieldPath>,
) -> bool {
    match visibility {
        RowVisibility::Always => true,
        RowVisibility::When(column, expected) => sibling(column)
            .and_then(|path| record.get(&path))
            .is_some_and(|value| value == expected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_are_declared_in_key_order() {
        assert_eq!(fields().len(), FieldKey::ALL.len());
        for (spec, key) in fields().iter().zip(FieldKey::ALL) {
            assert_eq!(spec.key, *key);
        }
        for (column, field) in debt_columns().iter().zip(DebtField::ALL) {
            assert_eq!(column.name, field.as_str());
        }
        for (column, field) in asset_columns().iter().zip(AssetField::ALL) {
            assert_eq!(column.name, field.as_str());
        }
    }

    #[test]
    fn sections_are_contiguous_and_ordered() {
        let order: Vec<usize> = fields().iter().map(|spec| spec.section.index()).collect();
        assert!(order.windows(2).all(|pair| pair[0] <= pair[1]));
        assert_eq!(SectionId::ALL.len(), SECTION_COUNT);
        assert_eq!(section_of(&"debtItems.4.amount".parse().unwrap()), SectionId::Debts);
        assert_eq!(SectionId::Debts.heading(), "2. 债务情况");
    }

    #[test]
    fn conditional_fields_are_never_required() {
        for spec in fields() {
            if spec.visibility != Visibility::Always {
                assert!(spec.required.is_none(), "{:?} is conditional", spec.key);
            }
        }
    }

    #[test]
    fn visibility_tracks_trigger_answers() {
        let mut record = AnswerRecord::default();
        let details: FieldPath = "executionDetails".parse().unwrap();
        let employees: FieldPath = "employeeCount".parse().unwrap();
        let mortgage: FieldPath = "debtItems.0.mortgageAssetType".parse().unwrap();
        assert!(!is_visible(&record, &details));
        assert!(is_visible(&record, &employees));
        assert!(!is_visible(&record, &mortgage));

        record.write(&"inExecution".parse().unwrap(), "是").unwrap();
        record.write(&"debtItems.0.type".parse().unwrap(), "银行抵押贷款").unwrap();
        assert!(is_visible(&record, &details));
        assert!(is_visible(&record, &mortgage));
    }
}
