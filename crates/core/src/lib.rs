pub mod api;
pub mod auth;
pub mod errors;
pub mod models;
pub mod services;
pub mod transport;

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::info;

use api::client::ApiClient;
use auth::session::AuthSession;
use auth::token_store::{FileTokenStore, TokenStore};
use errors::CoreError;
use models::depreciation::EquipmentDepreciation;
use models::equipment::Equipment;
use models::investment::InvestmentRow;
use models::settings::ConsoleSettings;
use services::dimension_tree::DimensionTree;
use services::expand_state::ExpandState;
use services::form_state::{FormState, SubmitOutcome};
use services::forms::{DepreciationDraft, DimensionDraft, InvestmentDraft};
use services::keyed_lookup::KeyedLookup;
use services::list_view::{EquipmentPages, InvestmentPages, PagedList};
use transport::reqwest_transport::ReqwestTransport;
use transport::traits::HttpTransport;

/// Main entry point of the equipment ledger client.
///
/// Owns the API client (and through it the auth session) plus the per-row
/// lookups shared by the views. View state (lists, trees, forms) is created
/// through it but owned by the caller.
#[must_use]
pub struct EquipmentConsole {
    settings: ConsoleSettings,
    client: ApiClient,
    current_values: KeyedLookup<Value>,
}

impl std::fmt::Debug for EquipmentConsole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EquipmentConsole")
            .field("base_url", &self.client.base_url())
            .field("has_token", &self.client.session().has_token())
            .field("cached_current_values", &self.current_values.len())
            .finish()
    }
}

impl EquipmentConsole {
    /// Wire a console from explicit parts. Used by tests and embedders that
    /// bring their own transport or token storage.
    pub fn new(
        settings: ConsoleSettings,
        transport: Arc<dyn HttpTransport>,
        store: Box<dyn TokenStore>,
    ) -> Result<Self, CoreError> {
        settings.validate()?;
        let session = match settings.initial_token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => AuthSession::with_token(store, settings.token_key.clone(), token),
            None => AuthSession::new(store, settings.token_key.clone()),
        };
        let client = ApiClient::new(settings.base_url.clone(), Arc::new(session), transport);
        Ok(Self {
            settings,
            client,
            current_values: KeyedLookup::new(),
        })
    }

    /// Console talking HTTP through reqwest, persisting the token to
    /// `settings.token_file`.
    pub fn connect(settings: ConsoleSettings) -> Result<Self, CoreError> {
        let transport = ReqwestTransport::with_timeout(Duration::from_secs(
            settings.request_timeout_secs,
        ));
        let store = FileTokenStore::new(settings.token_file.clone());
        info!(base_url = %settings.base_url, "connecting equipment console");
        Self::new(settings, Arc::new(transport), Box::new(store))
    }

    #[must_use]
    pub fn settings(&self) -> &ConsoleSettings {
        &self.settings
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.client
    }

    #[must_use]
    pub fn session(&self) -> &Arc<AuthSession> {
        self.client.session()
    }

    // ── Lists ───────────────────────────────────────────────────────

    pub fn equipment_list(&self) -> PagedList<Equipment> {
        PagedList::new(self.settings.equipment_page_size)
    }

    pub fn equipment_pages(&self) -> EquipmentPages {
        EquipmentPages::new(self.client.clone())
    }

    pub fn investment_list(&self) -> PagedList<InvestmentRow> {
        PagedList::new(self.settings.investment_page_size)
    }

    pub fn investment_pages(&self) -> InvestmentPages {
        InvestmentPages::new(self.client.clone())
    }

    // ── Dimension tree ──────────────────────────────────────────────

    /// Fetch the hierarchy and build the tree, scoped to `group` when given.
    /// The returned expand state has the roots and their children open.
    pub async fn load_dimension_tree(
        &self,
        group: Option<&str>,
    ) -> Result<(DimensionTree, ExpandState), CoreError> {
        let raw = self.client.dimensions().tree_list_by_group().await?;
        let tree = DimensionTree::build(&raw, group);
        let expanded = ExpandState::seeded(&tree);
        info!(
            nodes = tree.len(),
            roots = tree.root_count(),
            group = group.unwrap_or(""),
            "dimension tree loaded"
        );
        Ok((tree, expanded))
    }

    /// Refetch after an edit. Keys that still exist stay expanded.
    pub async fn reload_dimension_tree(
        &self,
        group: Option<&str>,
        expanded: &mut ExpandState,
    ) -> Result<DimensionTree, CoreError> {
        let raw = self.client.dimensions().tree_list_by_group().await?;
        let tree = DimensionTree::build(&raw, group);
        expanded.retain_known(&tree);
        Ok(tree)
    }

    // ── Per-row lookups ─────────────────────────────────────────────

    /// Current value of one piece of equipment, fetched at most once at a time.
    pub async fn current_value(&self, equipment_id: &str) -> Result<Value, CoreError> {
        let client = self.client.clone();
        let id = equipment_id.to_string();
        self.current_values
            .get_or_fetch(equipment_id, move || async move {
                client.depreciation().current_value(&id).await
            })
            .await
    }

    /// Forget a looked-up current value (after depreciation changes it).
    pub fn invalidate_current_value(&self, equipment_id: &str) {
        self.current_values.invalidate(equipment_id);
    }

    // ── Form submission ─────────────────────────────────────────────

    /// Add or edit an investment, depending on how the form was opened.
    pub async fn save_investment(
        &self,
        form: &mut FormState<InvestmentDraft>,
    ) -> SubmitOutcome<Value> {
        let editing = form.editing_id().map(str::to_string);
        let client = self.client.clone();
        form.submit(|draft| async move {
            match editing {
                Some(id) => client.investments().edit(&draft.to_edit_dto(&id)).await,
                None => client.investments().add(&draft.to_add_dto()).await,
            }
        })
        .await
    }

    /// Add or edit a dimension. Returns the server's reply text.
    pub async fn save_dimension(&self, form: &mut FormState<DimensionDraft>) -> SubmitOutcome<String> {
        let editing = form.editing_id().map(str::to_string);
        let client = self.client.clone();
        form.submit(|draft| async move {
            match editing {
                Some(md_id) => client.dimensions().edit(&draft.to_edit_dto(&md_id)).await,
                None => client.dimensions().add(&draft.to_add_dto()).await,
            }
        })
        .await
    }

    /// Record a manual depreciation entry.
    pub async fn save_depreciation(
        &self,
        form: &mut FormState<DepreciationDraft>,
    ) -> SubmitOutcome<EquipmentDepreciation> {
        let client = self.client.clone();
        let outcome = form
            .submit(|draft| async move {
                client
                    .depreciation()
                    .create(&draft.to_new_depreciation())
                    .await
            })
            .await;
        if let SubmitOutcome::Saved(record) = &outcome {
            self.current_values.invalidate(&record.equipment_id);
        }
        outcome
    }
}
