//! Fixed option sets offered by choice questions.
//!
//! Every option serializes as its Chinese label so that stored records keep
//! the same shape as the answers shown to respondents.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! option_set {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];
            pub const LABELS: &'static [&'static str] = &[$($label),+];

            pub fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }

            /// Resolves an exact (whitespace-trimmed) label.
            pub fn from_label(raw: &str) -> Option<Self> {
                let wanted = raw.trim();
                Self::ALL.iter().copied().find(|option| option.label() == wanted)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

option_set! {
    /// Respondent's relationship to the company.
    Role {
        LegalRepresentative => "法人",
        Shareholder => "股东",
        Controller => "实际控制人",
    }
}

option_set! {
    /// Province-level administrative regions.
    Region {
        Beijing => "北京市",
        Tianjin => "天津市",
        Shanghai => "上海市",
        Chongqing => "重庆市",
        Hebei => "河北省",
        Shanxi => "山西省",
        Liaoning => "辽宁省",
        Jilin => "吉林省",
        Heilongjiang => "黑龙江省",
        Jiangsu => "江苏省",
        Zhejiang => "浙江省",
        Anhui => "安徽省",
        Fujian => "福建省",
        Jiangxi => "江西省",
        Shandong => "山东省",
        Henan => "河南省",
        Hubei => "湖北省",
        Hunan => "湖南省",
        Guangdong => "广东省",
        Hainan => "海南省",
        Sichuan => "四川省",
        Guizhou => "贵州省",
        Yunnan => "云南省",
        Shaanxi => "陕西省",
        Gansu => "甘肃省",
        Qinghai => "青海省",
        Taiwan => "台湾省",
        InnerMongolia => "内蒙古自治区",
        Guangxi => "广西壮族自治区",
        Tibet => "西藏自治区",
        Ningxia => "宁夏回族自治区",
        Xinjiang => "新疆维吾尔自治区",
        HongKong => "香港特别行政区",
        Macau => "澳门特别行政区",
    }
}

option_set! {
    DebtCategory {
        BankMortgageLoan => "银行抵押贷款",
        BankCreditLoan => "银行信用贷款",
        EmployeeDebt => "职工债务",
        TaxDebt => "税务债务",
        SupplierPayables => "上下游供应商货款",
        PrivateLending => "民间借贷",
        Other => "其他",
    }
}

option_set! {
    AssetCategory {
        Land => "土地",
        RealEstate => "房产/厂房",
        Movables => "动产（车辆/设备）",
        Receivables => "应收账款（债权）",
        Intangibles => "无形资产（知识产权/商标/专利）",
        Other => "其他",
    }
}

option_set! {
    /// Repayment scheme of an interest-bearing debt.
    InterestType {
        EqualInstallments => "等额本息",
        EqualPrincipalAndInterest => "等本等息",
        EqualPrincipal => "等额本金",
        InterestFirst => "先息后本",
    }
}

option_set! {
    MortgageAssetType {
        Unsecured => "无抵押",
        PersonalAsset => "个人资产",
        CompanyAsset => "企业资产",
    }
}

option_set! {
    LoanSource {
        Individual => "个人",
        Usury => "高利贷",
        MicroLoan => "小额贷",
    }
}

option_set! {
    YesNo {
        Yes => "是",
        No => "否",
    }
}

option_set! {
    /// Whether company debt extends to the respondent personally.
    PersonalDebt {
        CorporateOnly => "全部为企业债务",
        JointPersonal => "有连带个人债务",
    }
}

option_set! {
    CapitalPaid {
        Paid => "已完成实缴（包括部分完成）",
        Unpaid => "未完成实缴",
    }
}

/// Serde adapter storing an unselected option as `""`.
///
/// Accepts `""`, `null` or a valid label when reading.
pub(crate) mod blank_option {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(inner) => inner.serialize(serializer),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(serde_json::Value::String(text)) if text.trim().is_empty() => Ok(None),
            Some(value) => T::deserialize(value)
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}
