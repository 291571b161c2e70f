use serde_json::Value;

use crate::errors::CoreError;
use crate::models::investment::{
    EquipmentInvestment, InvestmentAddDto, InvestmentEditDto, InvestmentRow,
};
use crate::models::pagination::Page;

use super::client::ApiClient;
use super::envelope::{unwrap_data_or_body, unwrap_page, RecordShape};

const BASE: &str = "machine/equipment/additional-investment";

/// Additional-investment endpoints.
pub struct InvestmentApi<'a> {
    client: &'a ApiClient,
}

impl<'a> InvestmentApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, page_no: u32, page_size: u32) -> Result<Page<InvestmentRow>, CoreError> {
        let page_no_text = page_no.to_string();
        let page_size_text = page_size.to_string();
        let url = self.client.endpoint(
            &format!("{BASE}/list"),
            &[
                ("pageNo", Some(page_no_text.as_str())),
                ("pageSize", Some(page_size_text.as_str())),
            ],
        )?;
        let resp = self
            .client
            .post(&url, Some(&serde_json::json!({})))
            .await?;
        Ok(unwrap_page(&resp, RecordShape::Flat, page_no, page_size))
    }

    /// Returns whatever the server echoes back (usually the stored record or its id).
    pub async fn add(&self, dto: &InvestmentAddDto) -> Result<Value, CoreError> {
        let url = self.client.endpoint(&format!("{BASE}/add"), &[])?;
        let body = to_body(dto)?;
        self.client.post(&url, Some(&body)).await
    }

    pub async fn edit(&self, dto: &InvestmentEditDto) -> Result<Value, CoreError> {
        let url = self.client.endpoint(&format!("{BASE}/edit"), &[])?;
        let body = to_body(dto)?;
        self.client.put(&url, &body).await
    }

    pub async fn remove(&self, id: &str) -> Result<(), CoreError> {
        let url = self.client.endpoint(&format!("{BASE}/remove/{id}"), &[])?;
        self.client.delete(&url).await?;
        Ok(())
    }

    /// All investments recorded against one piece of equipment.
    pub async fn by_equipment(&self, equipment_id: &str) -> Result<Vec<EquipmentInvestment>, CoreError> {
        let url = self
            .client
            .endpoint(&format!("equipment/{equipment_id}/investments"), &[])?;
        let resp = self.client.get(&url).await?;
        if resp.is_null() {
            return Ok(Vec::new());
        }
        unwrap_data_or_body(resp)
    }
}

fn to_body<T: serde::Serialize>(dto: &T) -> Result<Value, CoreError> {
    serde_json::to_value(dto).map_err(|e| CoreError::Serialization(e.to_string()))
}
