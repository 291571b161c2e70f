use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

use super::lenient;

/// Dimension group id → display name, in server order.
pub type DimensionGroups = IndexMap<String, String>;

/// A management dimension (site, building, floor, line ...) as the server
/// describes it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManageDimension {
    #[serde(default, deserialize_with = "lenient::string")]
    pub md_id: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub md_name: String,
    #[serde(default, deserialize_with = "lenient::string")]
    pub dimension_group_id: String,
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub dimension_group_name: Option<String>,
    /// Floor area in square metres.
    #[serde(default, deserialize_with = "lenient::opt_number")]
    pub area: Option<f64>,
    /// `None` for a root dimension.
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub parent_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::opt_integer")]
    pub order_no: Option<i64>,
}

/// Body of `manage/dimension/add`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionAddDto {
    pub dimension_group_id: String,
    pub md_name: String,
    pub area: Option<f64>,
    pub parent_id: Option<String>,
    pub order_no: Option<i64>,
}

/// Body of `manage/dimension/edit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionEditDto {
    pub md_id: String,
    pub dimension_group_id: String,
    pub md_name: String,
    pub area: Option<f64>,
    pub parent_id: Option<String>,
    pub order_no: Option<i64>,
}

impl DimensionEditDto {
    pub fn new(md_id: impl Into<String>, add: DimensionAddDto) -> Self {
        Self {
            md_id: md_id.into(),
            dimension_group_id: add.dimension_group_id,
            md_name: add.md_name,
            area: add.area,
            parent_id: add.parent_id,
            order_no: add.order_no,
        }
    }
}

/// One node of `treeList` / `treeListByGroup`: the payload wrapped in `data`,
/// children beside it.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawDimensionNode {
    #[serde(default)]
    pub data: Option<ManageDimension>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub children: Vec<RawDimensionNode>,
}

impl RawDimensionNode {
    pub fn new(data: ManageDimension, children: Vec<RawDimensionNode>) -> Self {
        Self {
            data: Some(data),
            children,
        }
    }

    /// Group of this node's own payload, if it has one.
    pub fn group_id(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.dimension_group_id.as_str())
    }
}

fn null_as_empty<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<RawDimensionNode>, D::Error> {
    Ok(Option::<Vec<RawDimensionNode>>::deserialize(d)?.unwrap_or_default())
}
