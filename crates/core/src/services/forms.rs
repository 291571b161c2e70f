//! Drafts behind the create/edit forms.

use chrono::Utc;

use crate::models::depreciation::{DepreciationMethod, EquipmentDepreciation, NewDepreciation};
use crate::models::dimension::{DimensionAddDto, DimensionEditDto, ManageDimension};
use crate::models::equipment::Equipment;
use crate::models::investment::{
    EquipmentInvestment, InvestmentAddDto, InvestmentEditDto, InvestmentRow, InvestmentType,
};
use crate::models::lenient::parse_amount;

use super::form_state::{FieldErrors, FormDraft};

// NaN and infinities fail both checks.
fn is_positive(amount: f64) -> bool {
    amount.is_finite() && amount > 0.0
}

fn is_non_negative(amount: f64) -> bool {
    amount.is_finite() && amount >= 0.0
}

// ── Investment ──────────────────────────────────────────────────────

pub const MSG_EQUIPMENT_REQUIRED: &str = "Please select a piece of equipment";
pub const MSG_INVESTMENT_VALUE_POSITIVE: &str = "Investment value must be greater than 0";
pub const MSG_REMAIN_NEGATIVE: &str = "Remaining value cannot be negative";
pub const MSG_REMAIN_EXCEEDS_VALUE: &str = "Remaining value exceeds investment value";
pub const MSG_DESCRIPTION_REQUIRED: &str = "Please enter a description";

/// Investment form draft.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InvestmentDraft {
    pub equipment_id: String,
    /// Shown in the read-only equipment box; not sent.
    pub equipment_name: String,
    pub investment_value: f64,
    pub investment_remain_value: f64,
    pub investment_month: String,
    pub investment_description: String,
    pub investment_type: InvestmentType,
}

impl InvestmentDraft {
    pub fn from_investment(inv: &EquipmentInvestment) -> Self {
        Self {
            equipment_id: inv.equipment_id.clone(),
            equipment_name: String::new(),
            investment_value: inv.investment_value,
            investment_remain_value: inv.investment_remain_value,
            investment_month: inv.investment_month.clone(),
            investment_description: inv.investment_description.clone(),
            investment_type: inv.investment_type,
        }
    }

    /// Draft for editing a list row; the row already knows the equipment name.
    pub fn from_row(row: &InvestmentRow) -> Self {
        Self {
            equipment_id: row.equipment_id.clone(),
            equipment_name: row.equipment_name.clone(),
            investment_value: row.investment_value,
            investment_remain_value: row.investment_remain_value,
            investment_month: row.investment_month.clone(),
            investment_description: row.investment_description.clone(),
            investment_type: row.investment_type,
        }
    }

    /// Picked from the equipment popup. The remaining value is left alone.
    pub fn select_equipment(&mut self, equipment: &Equipment) {
        self.equipment_id = equipment.equip_id.clone();
        self.equipment_name = equipment.equip_name.clone();
    }

    /// Fill in the equipment name from a loaded list when the draft lacks one.
    pub fn resolve_equipment_name(&mut self, equipment: &[Equipment]) {
        if !self.equipment_name.is_empty() || self.equipment_id.is_empty() {
            return;
        }
        if let Some(found) = equipment.iter().find(|e| e.equip_id == self.equipment_id) {
            self.equipment_name = found.equip_name.clone();
        }
    }

    pub fn to_investment(&self, id: impl Into<String>) -> EquipmentInvestment {
        EquipmentInvestment {
            id: id.into(),
            equipment_id: self.equipment_id.clone(),
            investment_value: self.investment_value,
            investment_remain_value: self.investment_remain_value,
            investment_month: self.investment_month.clone(),
            investment_description: self.investment_description.clone(),
            investment_type: self.investment_type,
        }
    }

    pub fn to_add_dto(&self) -> InvestmentAddDto {
        InvestmentAddDto::from(&self.to_investment(""))
    }

    pub fn to_edit_dto(&self, id: &str) -> InvestmentEditDto {
        InvestmentEditDto::new(id, &self.to_investment(id))
    }
}

impl FormDraft for InvestmentDraft {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.equipment_id.trim().is_empty() {
            errors.insert("equipmentId", MSG_EQUIPMENT_REQUIRED);
        }
        if !is_positive(self.investment_value) {
            errors.insert("investmentValue", MSG_INVESTMENT_VALUE_POSITIVE);
        }
        if !is_non_negative(self.investment_remain_value) {
            errors.insert("investmentRemainValue", MSG_REMAIN_NEGATIVE);
        } else if self.investment_remain_value > self.investment_value {
            errors.insert("investmentRemainValue", MSG_REMAIN_EXCEEDS_VALUE);
        }
        if self.investment_description.trim().is_empty() {
            errors.insert("investmentDescription", MSG_DESCRIPTION_REQUIRED);
        }
        errors
    }

    fn set_field(&mut self, field: &str, raw: &str) -> bool {
        match field {
            "equipmentId" => self.equipment_id = raw.to_string(),
            "investmentValue" | "amount" => self.investment_value = parse_amount(raw),
            "investmentRemainValue" => self.investment_remain_value = parse_amount(raw),
            "investmentMonth" => self.investment_month = raw.to_string(),
            "investmentDescription" => self.investment_description = raw.to_string(),
            "type" => {
                self.investment_type = serde_json::from_value(serde_json::Value::from(raw))
                    .unwrap_or(InvestmentType::Other)
            }
            _ => return false,
        }
        true
    }
}

// ── Depreciation ────────────────────────────────────────────────────

pub const MSG_DEPRECIATION_AMOUNT_POSITIVE: &str = "Depreciation amount must be greater than 0";
pub const MSG_CURRENT_VALUE_NEGATIVE: &str = "Current value cannot be negative";

/// Manual depreciation entry draft.
#[derive(Debug, Clone, PartialEq)]
pub struct DepreciationDraft {
    pub equipment_id: String,
    pub depreciation_amount: f64,
    pub current_value: f64,
    /// `YYYY-MM-DD`, today by default.
    pub depreciation_date: String,
    pub method: DepreciationMethod,
}

impl Default for DepreciationDraft {
    fn default() -> Self {
        Self {
            equipment_id: String::new(),
            depreciation_amount: 0.0,
            current_value: 0.0,
            depreciation_date: Utc::now().date_naive().format("%Y-%m-%d").to_string(),
            method: DepreciationMethod::StraightLine,
        }
    }
}

impl DepreciationDraft {
    pub fn from_record(record: &EquipmentDepreciation) -> Self {
        Self {
            equipment_id: record.equipment_id.clone(),
            depreciation_amount: record.depreciation_amount,
            current_value: record.current_value,
            depreciation_date: record.depreciation_date.clone(),
            method: record.method,
        }
    }

    pub fn to_new_depreciation(&self) -> NewDepreciation {
        NewDepreciation {
            equipment_id: self.equipment_id.clone(),
            depreciation_amount: self.depreciation_amount,
            current_value: self.current_value,
            depreciation_date: self.depreciation_date.clone(),
            method: self.method,
        }
    }
}

impl FormDraft for DepreciationDraft {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.equipment_id.trim().is_empty() {
            errors.insert("equipmentId", MSG_EQUIPMENT_REQUIRED);
        }
        if !is_positive(self.depreciation_amount) {
            errors.insert("depreciationAmount", MSG_DEPRECIATION_AMOUNT_POSITIVE);
        }
        if !is_non_negative(self.current_value) {
            errors.insert("currentValue", MSG_CURRENT_VALUE_NEGATIVE);
        }
        errors
    }

    fn set_field(&mut self, field: &str, raw: &str) -> bool {
        match field {
            "equipmentId" => self.equipment_id = raw.to_string(),
            "depreciationAmount" => self.depreciation_amount = parse_amount(raw),
            "currentValue" => self.current_value = parse_amount(raw),
            "depreciationDate" => self.depreciation_date = raw.to_string(),
            "method" => {
                self.method = serde_json::from_value(serde_json::Value::from(raw))
                    .unwrap_or(DepreciationMethod::Unknown)
            }
            _ => return false,
        }
        true
    }
}

// ── Dimension ───────────────────────────────────────────────────────

pub const MSG_GROUP_REQUIRED: &str = "Please select a dimension group";
pub const MSG_NAME_REQUIRED: &str = "Please enter a dimension name";
pub const MSG_AREA_NEGATIVE: &str = "Area cannot be negative";
pub const MSG_ORDER_NEGATIVE: &str = "Order number cannot be negative";

/// Dimension form draft.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DimensionDraft {
    pub dimension_group_id: String,
    pub md_name: String,
    pub area: Option<f64>,
    /// `None` makes a root dimension.
    pub parent_id: Option<String>,
    pub order_no: Option<i64>,
}

impl DimensionDraft {
    pub fn from_dimension(dimension: &ManageDimension) -> Self {
        Self {
            dimension_group_id: dimension.dimension_group_id.clone(),
            md_name: dimension.md_name.clone(),
            area: dimension.area,
            parent_id: dimension.parent_id.clone(),
            order_no: dimension.order_no,
        }
    }

    pub fn to_add_dto(&self) -> DimensionAddDto {
        DimensionAddDto {
            dimension_group_id: self.dimension_group_id.clone(),
            md_name: self.md_name.trim().to_string(),
            area: self.area,
            parent_id: self.parent_id.clone(),
            order_no: self.order_no,
        }
    }

    pub fn to_edit_dto(&self, md_id: &str) -> DimensionEditDto {
        DimensionEditDto::new(md_id, self.to_add_dto())
    }
}

impl FormDraft for DimensionDraft {
    fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        if self.dimension_group_id.trim().is_empty() {
            errors.insert("dimensionGroupId", MSG_GROUP_REQUIRED);
        }
        if self.md_name.trim().is_empty() {
            errors.insert("mdName", MSG_NAME_REQUIRED);
        }
        if self.area.is_some_and(|a| !is_non_negative(a)) {
            errors.insert("area", MSG_AREA_NEGATIVE);
        }
        if self.order_no.is_some_and(|o| o < 0) {
            errors.insert("orderNo", MSG_ORDER_NEGATIVE);
        }
        errors
    }

    fn set_field(&mut self, field: &str, raw: &str) -> bool {
        let raw_trimmed = raw.trim();
        match field {
            "dimensionGroupId" => {
                // Parents belong to a group; a new group invalidates the choice.
                if self.dimension_group_id != raw {
                    self.parent_id = None;
                }
                self.dimension_group_id = raw.to_string();
            }
            "mdName" => self.md_name = raw.to_string(),
            "area" => self.area = raw_trimmed.parse().ok().filter(|a: &f64| a.is_finite()),
            "parentId" => {
                self.parent_id = Some(raw_trimmed.to_string()).filter(|p| !p.is_empty())
            }
            "orderNo" => self.order_no = raw_trimmed.parse().ok(),
            _ => return false,
        }
        true
    }
}
