use serde::{Deserialize, Serialize};

use super::lenient;

/// Category of a capital investment against a piece of equipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvestmentType {
    #[default]
    Purchase,
    Upgrade,
    Maintenance,
    /// Anything the server sends that we don't recognise.
    #[serde(other)]
    Other,
}

impl InvestmentType {
    pub fn label(&self) -> &'static str {
        match self {
            InvestmentType::Purchase => "Purchase",
            InvestmentType::Upgrade => "Upgrade",
            InvestmentType::Maintenance => "Maintenance",
            InvestmentType::Other => "Other",
        }
    }
}

impl std::fmt::Display for InvestmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// An investment record as edited in the investment form.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquipmentInvestment {
    #[serde(default, deserialize_with = "lenient::string")]
    pub id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub equipment_id: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub investment_value: f64,
    /// Never more than `investment_value`.
    #[serde(default, deserialize_with = "lenient::number")]
    pub investment_remain_value: f64,
    /// `YYYY-MM`
    #[serde(default, deserialize_with = "lenient::string")]
    pub investment_month: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub investment_description: String,
    #[serde(default, rename = "type")]
    pub investment_type: InvestmentType,
}

/// A row of `additional-investment/list`. Carries the equipment name joined in
/// by the server.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentRow {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub equipment_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub equipment_name: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub investment_value: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub investment_remain_value: f64,
    #[serde(default, deserialize_with = "lenient::string")]
    pub investment_month: String,
    #[serde(default, deserialize_with = "lenient::opt_integer")]
    pub investment_months: Option<i64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub investment_description: String,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub investment_date: Option<String>,
    #[serde(default, rename = "type")]
    pub investment_type: InvestmentType,
}

impl InvestmentRow {
    /// The editable record behind this row. `None` for rows without an id.
    pub fn to_investment(&self) -> Option<EquipmentInvestment> {
        let id = self.id.clone()?;
        Some(EquipmentInvestment {
            id,
            equipment_id: self.equipment_id.clone(),
            investment_value: self.investment_value,
            investment_remain_value: self.investment_remain_value,
            investment_month: self.investment_month.clone(),
            investment_description: self.investment_description.clone(),
            investment_type: self.investment_type,
        })
    }
}

/// Body of `additional-investment/add`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentAddDto {
    pub equipment_id: String,
    pub investment_value: f64,
    pub investment_remain_value: f64,
    pub investment_month: String,
    pub investment_description: String,
}

/// Body of `additional-investment/edit`. The equipment reference can't change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentEditDto {
    pub id: String,
    pub investment_month: String,
    pub investment_value: f64,
    pub investment_remain_value: f64,
    pub investment_description: String,
}

impl From<&EquipmentInvestment> for InvestmentAddDto {
    fn from(inv: &EquipmentInvestment) -> Self {
        Self {
            equipment_id: inv.equipment_id.clone(),
            investment_value: inv.investment_value,
            investment_remain_value: inv.investment_remain_value,
            investment_month: inv.investment_month.clone(),
            investment_description: inv.investment_description.clone(),
        }
    }
}

impl InvestmentEditDto {
    pub fn new(id: impl Into<String>, inv: &EquipmentInvestment) -> Self {
        Self {
            id: id.into(),
            investment_month: inv.investment_month.clone(),
            investment_value: inv.investment_value,
            investment_remain_value: inv.investment_remain_value,
            investment_description: inv.investment_description.clone(),
        }
    }
}

/// Rows the investment table shows: records without an id are hidden.
pub fn displayable_rows(rows: &[InvestmentRow]) -> Vec<&InvestmentRow> {
    rows.iter().filter(|r| r.id.is_some()).collect()
}
