use crate::errors::CoreError;
use crate::models::equipment::Equipment;
use crate::models::pagination::Page;

use super::client::ApiClient;
use super::envelope::{unwrap_data_or_body, unwrap_page, RecordShape};

/// Equipment inventory endpoints.
pub struct EquipmentApi<'a> {
    client: &'a ApiClient,
}

impl<'a> EquipmentApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// One page of the equipment tree listing, flattened to rows.
    ///
    /// Records come wrapped as `{data: {...}}`; each is lifted and normalized
    /// so `current_value` is always set.
    pub async fn list(&self, page_no: u32, page_size: u32) -> Result<Page<Equipment>, CoreError> {
        let page_no_text = page_no.to_string();
        let page_size_text = page_size.to_string();
        let url = self.client.endpoint(
            "machine/equipment/tree/list",
            &[
                ("pageNo", Some(page_no_text.as_str())),
                ("pageSize", Some(page_size_text.as_str())),
            ],
        )?;
        let resp = self
            .client
            .post(&url, Some(&serde_json::json!({})))
            .await?;

        let mut page: Page<Equipment> = unwrap_page(&resp, RecordShape::Nested, page_no, page_size);
        page.data = page.data.into_iter().map(Equipment::normalize).collect();
        Ok(page)
    }

    pub async fn get(&self, equip_id: &str) -> Result<Equipment, CoreError> {
        let url = self.client.endpoint(&format!("equipment/{equip_id}"), &[])?;
        let resp = self.client.get(&url).await?;
        Ok(unwrap_data_or_body::<Equipment>(resp)?.normalize())
    }

    pub async fn create(&self, equipment: &Equipment) -> Result<Equipment, CoreError> {
        let url = self.client.endpoint("equipment", &[])?;
        let body = serde_json::to_value(equipment)
            .map_err(|e| CoreError::Serialization(e.to_string()))?;
        let resp = self.client.post(&url, Some(&body)).await?;
        Ok(unwrap_data_or_body::<Equipment>(resp)?.normalize())
    }

    pub async fn update(&self, equip_id: &str, equipment: &Equipment) -> Result<Equipment, CoreError> {
        let url = self.client.endpoint(&format!("equipment/{equip_id}"), &[])?;
        let body = serde_json::to_value(equipment)
            .map_err(|e| CoreError::Serialization(e.to_string()))?;
        let resp = self.client.put(&url, &body).await?;
        Ok(unwrap_data_or_body::<Equipment>(resp)?.normalize())
    }
}
