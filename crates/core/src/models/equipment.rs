use serde::{Deserialize, Serialize};

use super::lenient;

/// Lifecycle state of a piece of equipment, shown as text in lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EquipmentStatus {
    Active,
    Inactive,
    Maintenance,
}

impl EquipmentStatus {
    /// Map the server's status code. Only `"1"` means in service; unknown codes
    /// read as inactive.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "1" | "active" => EquipmentStatus::Active,
            "maintenance" => EquipmentStatus::Maintenance,
            _ => EquipmentStatus::Inactive,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EquipmentStatus::Active => "Active",
            EquipmentStatus::Inactive => "Inactive",
            EquipmentStatus::Maintenance => "Under maintenance",
        }
    }
}

impl std::fmt::Display for EquipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// An equipment asset as returned by `machine/equipment/tree/list`.
///
/// Field names follow the server payload. `current_value` is filled by
/// [`Equipment::normalize`] when the server does not send one.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equipment {
    #[serde(default, deserialize_with = "lenient::string")]
    pub equip_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub equip_no: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub equip_name: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub parent_equip_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub unit_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub manufacturer: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub equip_type_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub equip_type_name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub equip_status: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub equip_model: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub purchase_date: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub investment_money: Option<f64>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub dept_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub tenant_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub depreciation_method: String,
    #[serde(default, deserialize_with = "lenient::number")]
    pub origin_value_of_assets: f64,
    #[serde(default, deserialize_with = "lenient::number")]
    pub expected_residual_value: f64,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub total_depreciation_months: i64,
    #[serde(default, deserialize_with = "lenient::integer")]
    pub depreciated_months: i64,
    #[serde(default, deserialize_with = "lenient::boolean")]
    pub online_flag: bool,
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub current_value: Option<f64>,
}

impl Equipment {
    /// Fill derived fields. Idempotent.
    pub fn normalize(mut self) -> Self {
        if self.current_value.is_none() {
            self.current_value = Some(self.derived_current_value());
        }
        self
    }

    /// Original value minus investment money; missing investment counts as zero.
    pub fn derived_current_value(&self) -> f64 {
        self.origin_value_of_assets - self.investment_money.unwrap_or(0.0)
    }

    pub fn current_value(&self) -> f64 {
        self.current_value
            .unwrap_or_else(|| self.derived_current_value())
    }

    pub fn status(&self) -> EquipmentStatus {
        EquipmentStatus::from_code(&self.equip_status)
    }

    pub fn id(&self) -> &str {
        &self.equip_id
    }

    pub fn name(&self) -> &str {
        &self.equip_name
    }

    pub fn type_name(&self) -> &str {
        &self.equip_type_name
    }

    /// Months left before the asset is fully depreciated (never negative).
    pub fn remaining_depreciation_months(&self) -> i64 {
        (self.total_depreciation_months - self.depreciated_months).max(0)
    }

    /// Case-insensitive match of `term` against name, type name and equipment number.
    /// An empty term matches everything.
    pub fn matches_search(&self, term: &str) -> bool {
        let needle = term.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [&self.equip_name, &self.equip_type_name, &self.equip_no]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }
}
