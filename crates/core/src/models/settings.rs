use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::errors::CoreError;

/// Storage key of the persisted auth token.
pub const TOKEN_STORAGE_KEY: &str = "tenant_token";

pub const ENV_BASE_URL: &str = "EQUIPMENT_LEDGER_BASE_URL";
pub const ENV_TOKEN: &str = "EQUIPMENT_LEDGER_TOKEN";
pub const ENV_TOKEN_FILE: &str = "EQUIPMENT_LEDGER_TOKEN_FILE";

/// Client configuration. Every field has a default, so a partial JSON file is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleSettings {
    /// API root, including the `/api` prefix. Defaults to the local dev proxy.
    pub base_url: String,

    /// Token sent in the `token` header before anything is persisted.
    pub initial_token: Option<String>,

    /// Where the token is persisted between runs.
    pub token_file: PathBuf,

    /// Key of the token inside the token file.
    pub token_key: String,

    pub request_timeout_secs: u64,

    pub equipment_page_size: u32,

    pub investment_page_size: u32,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3001/api".to_string(),
            initial_token: None,
            token_file: PathBuf::from(".equipment-ledger/storage.json"),
            token_key: TOKEN_STORAGE_KEY.to_string(),
            request_timeout_secs: 30,
            equipment_page_size: super::pagination::EQUIPMENT_PAGE_SIZE,
            investment_page_size: super::pagination::INVESTMENT_PAGE_SIZE,
        }
    }
}

impl ConsoleSettings {
    /// Read settings from a JSON file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            CoreError::Config(format!("Failed to read {}: {e}", path.display()))
        })?;
        let settings: Self = serde_json::from_str(&text).map_err(|e| {
            CoreError::Config(format!("Invalid settings in {}: {e}", path.display()))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Apply `EQUIPMENT_LEDGER_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.is_empty()) {
            self.base_url = url;
        }
        if let Some(token) = lookup(ENV_TOKEN).filter(|v| !v.is_empty()) {
            self.initial_token = Some(token);
        }
        if let Some(file) = lookup(ENV_TOKEN_FILE).filter(|v| !v.is_empty()) {
            self.token_file = PathBuf::from(file);
        }
        self
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.base_url.trim().is_empty() {
            return Err(CoreError::Config("base_url must not be empty".into()));
        }
        if self.token_key.trim().is_empty() {
            return Err(CoreError::Config("token_key must not be empty".into()));
        }
        if self.equipment_page_size == 0 || self.investment_page_size == 0 {
            return Err(CoreError::Config("page sizes must be positive".into()));
        }
        Ok(())
    }
}
