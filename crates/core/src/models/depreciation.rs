use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::lenient;

/// Depreciation method selector forwarded to the server. The client never
/// computes depreciation itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DepreciationMethod {
    #[default]
    StraightLine,
    DecliningBalance,
    UnitsOfProduction,
    #[serde(other)]
    Unknown,
}

impl DepreciationMethod {
    /// Value used in query strings (`?method=straight-line`).
    pub fn as_param(&self) -> &'static str {
        match self {
            DepreciationMethod::StraightLine => "straight-line",
            DepreciationMethod::DecliningBalance => "declining-balance",
            DepreciationMethod::UnitsOfProduction => "units-of-production",
            DepreciationMethod::Unknown => "unknown",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DepreciationMethod::StraightLine => "Straight-line",
            DepreciationMethod::DecliningBalance => "Declining balance",
            DepreciationMethod::UnitsOfProduction => "Units of production",
            DepreciationMethod::Unknown => "Unknown",
        }
    }
}

impl std::fmt::Display for DepreciationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One monthly depreciation entry for a piece of equipment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentDepreciation {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub equipment_id: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub depreciation_amount: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub current_value: f64,
    /// `YYYY-MM-DD`
    #[serde(default, deserialize_with = "lenient::string")]
    pub depreciation_date: String,
    #[serde(default)]
    pub method: DepreciationMethod,
}

/// Body of `POST equipment-depreciation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDepreciation {
    pub equipment_id: String,
    pub depreciation_amount: f64,
    pub current_value: f64,
    pub depreciation_date: String,
    pub method: DepreciationMethod,
}

/// A row of the depreciation or current-value report. The server decides the
/// columns, so the row is kept as an open JSON object.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportRow(pub Map<String, Value>);

impl ReportRow {
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    /// Column rendered as text; strings are shown without quotes, missing columns as `-`.
    pub fn text(&self, column: &str) -> String {
        match self.0.get(column) {
            None | Some(Value::Null) => "-".to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        match self.0.get(column)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// Optional filters of the depreciation report. Unset filters are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DepreciationReportQuery {
    pub target_month: Option<String>,
    pub department_id: Option<String>,
    pub equipment_type_id: Option<String>,
}

/// Optional filters of the current-value report. Unset filters are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrentValueReportQuery {
    pub equipment_code: Option<String>,
    pub equipment_name: Option<String>,
    pub equipment_type_id: Option<String>,
}

/// Month label (`YYYY-MM`) used by the process/cancel endpoints.
pub fn month_label(date: NaiveDate) -> String {
    format!("{:04}-{:02}", date.year(), date.month())
}

/// Parse a `YYYY-MM` label into the first day of that month.
pub fn parse_month_label(label: &str) -> Option<NaiveDate> {
    let (year, month) = label.trim().split_once('-')?;
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
}
