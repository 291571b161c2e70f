use serde_json::Value;

use crate::errors::CoreError;
use crate::models::depreciation::{
    CurrentValueReportQuery, DepreciationMethod, DepreciationReportQuery, EquipmentDepreciation,
    NewDepreciation, ReportRow,
};

use super::client::ApiClient;
use super::envelope::{data_text, unwrap_data_or_body, unwrap_data_or_default};

const BASE: &str = "machine/equipment/depreciation";

/// Depreciation processing and reporting endpoints. All amounts are computed
/// server-side.
pub struct DepreciationApi<'a> {
    client: &'a ApiClient,
}

impl<'a> DepreciationApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Last month (`YYYY-MM`) depreciated for the equipment; `None` if never.
    pub async fn latest_depreciated_month(&self, equipment_id: &str) -> Result<Option<String>, CoreError> {
        let url = self
            .client
            .endpoint(&format!("{BASE}/latestDepreciatedMonth/{equipment_id}"), &[])?;
        let resp = self.client.get(&url).await?;
        let month = data_text(&resp);
        Ok(if month.is_empty() { None } else { Some(month) })
    }

    /// Run depreciation for every asset up to `target_month`. Returns the server's message.
    pub async fn process(&self, target_month: &str) -> Result<String, CoreError> {
        let url = self
            .client
            .endpoint(&format!("{BASE}/process"), &[("targetMonth", Some(target_month))])?;
        let resp = self.client.post(&url, None).await?;
        Ok(data_text(&resp))
    }

    /// Roll back the depreciation run of `target_month`. Returns the server's message.
    pub async fn cancel(&self, target_month: &str) -> Result<String, CoreError> {
        let url = self
            .client
            .endpoint(&format!("{BASE}/cancel"), &[("targetMonth", Some(target_month))])?;
        let resp = self.client.post(&url, None).await?;
        Ok(data_text(&resp))
    }

    pub async fn report(&self, query: &DepreciationReportQuery) -> Result<Vec<ReportRow>, CoreError> {
        let url = self.client.endpoint(
            &format!("{BASE}/report"),
            &[
                ("targetMonth", non_empty(&query.target_month)),
                ("departmentId", non_empty(&query.department_id)),
                ("equipmentTypeId", non_empty(&query.equipment_type_id)),
            ],
        )?;
        let resp = self.client.get(&url).await?;
        unwrap_data_or_default(resp)
    }

    pub async fn current_value_report(
        &self,
        query: &CurrentValueReportQuery,
    ) -> Result<Vec<ReportRow>, CoreError> {
        let url = self.client.endpoint(
            &format!("{BASE}/report/currentValue"),
            &[
                ("equipmentCode", non_empty(&query.equipment_code)),
                ("equipmentName", non_empty(&query.equipment_name)),
                ("equipmentTypeId", non_empty(&query.equipment_type_id)),
            ],
        )?;
        let resp = self.client.get(&url).await?;
        unwrap_data_or_default(resp)
    }

    /// Current book value of one asset, in whatever shape the server reports it.
    pub async fn current_value(&self, equipment_id: &str) -> Result<Value, CoreError> {
        let url = self
            .client
            .endpoint(&format!("{BASE}/currentValue/{equipment_id}"), &[])?;
        let resp = self.client.get(&url).await?;
        Ok(resp.get("data").cloned().unwrap_or(Value::Null))
    }

    // ── Per-record endpoints ────────────────────────────────────────

    pub async fn by_equipment(&self, equipment_id: &str) -> Result<Vec<EquipmentDepreciation>, CoreError> {
        let url = self
            .client
            .endpoint(&format!("equipment/{equipment_id}/depreciation"), &[])?;
        let resp = self.client.get(&url).await?;
        if resp.is_null() {
            return Ok(Vec::new());
        }
        unwrap_data_or_body(resp)
    }

    pub async fn create(&self, record: &NewDepreciation) -> Result<EquipmentDepreciation, CoreError> {
        let url = self.client.endpoint("equipment-depreciation", &[])?;
        let body = serde_json::to_value(record)
            .map_err(|e| CoreError::Serialization(e.to_string()))?;
        let resp = self.client.post(&url, Some(&body)).await?;
        unwrap_data_or_body(resp)
    }

    /// Ask the server for the depreciation schedule under `method`.
    pub async fn calculate(
        &self,
        equipment_id: &str,
        method: DepreciationMethod,
    ) -> Result<Vec<EquipmentDepreciation>, CoreError> {
        let url = self.client.endpoint(
            &format!("equipment-depreciation/calculate/{equipment_id}"),
            &[("method", Some(method.as_param()))],
        )?;
        let resp = self.client.get(&url).await?;
        if resp.is_null() {
            return Ok(Vec::new());
        }
        unwrap_data_or_body(resp)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}
