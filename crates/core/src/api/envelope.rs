//! Unwrapping of the backend's response envelopes.
//!
//! Single objects arrive as `{"data": X}`; pages as
//! `{"data": {"records": [...], "total", "size", "current", "pages"}}`.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use crate::errors::CoreError;
use crate::models::pagination::{Page, Pagination};

/// Where a list record keeps its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordShape {
    /// Fields sit directly on the record.
    Flat,
    /// Fields are wrapped in the record's own `data` object (tree listings).
    Nested,
}

/// Flatten a paginated envelope into rows plus pagination.
///
/// A response without the envelope (or without a `records` array) is an empty
/// page echoing the requested page and size. Records that don't decode are
/// skipped.
pub fn unwrap_page<T: DeserializeOwned>(
    response: &Value,
    shape: RecordShape,
    page_no: u32,
    page_size: u32,
) -> Page<T> {
    let Some(envelope) = response.get("data").filter(|d| d.is_object()) else {
        return Page::empty(page_no, page_size);
    };
    let Some(records) = envelope.get("records").and_then(Value::as_array) else {
        return Page::empty(page_no, page_size);
    };

    let data = records
        .iter()
        .enumerate()
        .filter_map(|(idx, record)| {
            let fields = match shape {
                RecordShape::Flat => record,
                RecordShape::Nested => record.get("data")?,
            };
            match T::deserialize(fields) {
                Ok(row) => Some(row),
                Err(e) => {
                    warn!("Skipping unreadable list record #{idx}: {e}");
                    None
                }
            }
        })
        .collect();

    let pagination = Pagination::deserialize(envelope)
        .unwrap_or_else(|_| Pagination::empty(page_no, page_size));

    Page { data, pagination }
}

/// Decode the `data` member of a response.
pub fn unwrap_data<T: DeserializeOwned>(response: Value) -> Result<T, CoreError> {
    let data = match response {
        Value::Object(mut map) => map.remove("data").unwrap_or(Value::Null),
        _ => Value::Null,
    };
    serde_json::from_value(data)
        .map_err(|e| CoreError::Deserialization(format!("Unexpected response data: {e}")))
}

/// Decode the `data` member, treating a missing or `null` member as `T::default()`.
pub fn unwrap_data_or_default<T: DeserializeOwned + Default>(
    response: Value,
) -> Result<T, CoreError> {
    match response.get("data") {
        None | Some(Value::Null) => Ok(T::default()),
        Some(_) => unwrap_data(response),
    }
}

/// Decode `data` when present, otherwise the whole body. Older endpoints answer
/// without the envelope.
pub fn unwrap_data_or_body<T: DeserializeOwned>(response: Value) -> Result<T, CoreError> {
    let payload = match response {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    };
    serde_json::from_value(payload)
        .map_err(|e| CoreError::Deserialization(format!("Unexpected response body: {e}")))
}

/// The `data` member rendered as text: strings verbatim, `null`/missing as
/// empty, anything else as JSON.
pub fn data_text(response: &Value) -> String {
    match response.get("data") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
