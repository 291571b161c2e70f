use crate::errors::CoreError;
use crate::models::dimension::{
    DimensionAddDto, DimensionEditDto, DimensionGroups, ManageDimension, RawDimensionNode,
};

use super::client::ApiClient;
use super::envelope::{data_text, unwrap_data, unwrap_data_or_default};

const BASE: &str = "energy/iot/manage/dimension";

/// Management-dimension endpoints.
pub struct DimensionApi<'a> {
    client: &'a ApiClient,
}

impl<'a> DimensionApi<'a> {
    pub fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    /// Returns the server's reply (the new dimension's id).
    pub async fn add(&self, dto: &DimensionAddDto) -> Result<String, CoreError> {
        let url = self.client.endpoint(&format!("{BASE}/add"), &[])?;
        let body = serde_json::to_value(dto)
            .map_err(|e| CoreError::Serialization(e.to_string()))?;
        let resp = self.client.post(&url, Some(&body)).await?;
        Ok(data_text(&resp))
    }

    pub async fn edit(&self, dto: &DimensionEditDto) -> Result<String, CoreError> {
        let url = self.client.endpoint(&format!("{BASE}/edit"), &[])?;
        let body = serde_json::to_value(dto)
            .map_err(|e| CoreError::Serialization(e.to_string()))?;
        let resp = self.client.put(&url, &body).await?;
        Ok(data_text(&resp))
    }

    pub async fn remove(&self, md_id: &str) -> Result<String, CoreError> {
        let url = self.client.endpoint(&format!("{BASE}/remove/{md_id}"), &[])?;
        let resp = self.client.delete(&url).await?;
        Ok(data_text(&resp))
    }

    /// Whole hierarchy, unfiltered.
    pub async fn tree_list(&self) -> Result<Vec<RawDimensionNode>, CoreError> {
        let url = self.client.endpoint(&format!("{BASE}/treeList"), &[])?;
        let resp = self.client.get(&url).await?;
        unwrap_data_or_default(resp)
    }

    /// Hierarchy as the server arranges it per dimension group.
    pub async fn tree_list_by_group(&self) -> Result<Vec<RawDimensionNode>, CoreError> {
        let url = self.client.endpoint(&format!("{BASE}/treeListByGroup"), &[])?;
        let resp = self.client.get(&url).await?;
        unwrap_data_or_default(resp)
    }

    pub async fn detail(&self, md_id: &str) -> Result<ManageDimension, CoreError> {
        let url = self
            .client
            .endpoint(&format!("{BASE}/edit/detail/{md_id}"), &[])?;
        let resp = self.client.get(&url).await?;
        unwrap_data(resp)
    }

    pub async fn groups(&self) -> Result<DimensionGroups, CoreError> {
        let url = self.client.endpoint(&format!("{BASE}/dimensionGroups"), &[])?;
        let resp = self.client.get(&url).await?;
        unwrap_data_or_default(resp)
    }
}
