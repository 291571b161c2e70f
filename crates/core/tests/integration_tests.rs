// ═══════════════════════════════════════════════════════════════════
// Integration Tests — EquipmentConsole end to end over a routed transport
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use equipment_ledger_core::auth::token_store::MemoryTokenStore;
use equipment_ledger_core::errors::CoreError;
use equipment_ledger_core::models::settings::{ConsoleSettings, TOKEN_STORAGE_KEY};
use equipment_ledger_core::services::form_state::{FormState, SubmitOutcome};
use equipment_ledger_core::services::forms::{DepreciationDraft, DimensionDraft, InvestmentDraft};
use equipment_ledger_core::transport::traits::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport,
};
use equipment_ledger_core::EquipmentConsole;

// ═══════════════════════════════════════════════════════════════════
// Test Helpers — Routed Transport
// ═══════════════════════════════════════════════════════════════════

/// Fake backend: replies by `"METHOD path"` (query stripped), 404 otherwise.
#[derive(Default)]
struct FakeBackend {
    routes: Mutex<HashMap<String, HttpResponse>>,
    log: Mutex<Vec<HttpRequest>>,
}

impl FakeBackend {
    fn route(self: &Arc<Self>, method: &str, path: &str, status: u16, body: Value) -> Arc<Self> {
        self.routes.lock().unwrap().insert(
            format!("{method} /api/{path}"),
            HttpResponse::new(status, body.to_string()),
        );
        self.clone()
    }

    fn log(&self) -> Vec<HttpRequest> {
        self.log.lock().unwrap().clone()
    }

    fn count(&self, method: HttpMethod, path_suffix: &str) -> usize {
        self.log()
            .iter()
            .filter(|r| r.method == method && strip(&r.url).ends_with(path_suffix))
            .count()
    }
}

fn strip(url: &str) -> &str {
    let no_query = url.split('?').next().unwrap_or(url);
    no_query.trim_start_matches("http://backend.test")
}

#[async_trait]
impl HttpTransport for FakeBackend {
    fn name(&self) -> &str {
        "fake-backend"
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, CoreError> {
        let key = format!("{} {}", request.method, strip(&request.url));
        self.log.lock().unwrap().push(request);
        Ok(self
            .routes
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| HttpResponse::new(404, json!({"message": "no route"}).to_string())))
    }
}

fn settings() -> ConsoleSettings {
    ConsoleSettings {
        base_url: "http://backend.test/api/".into(),
        initial_token: Some("boot-token".into()),
        ..Default::default()
    }
}

fn console(backend: &Arc<FakeBackend>) -> EquipmentConsole {
    EquipmentConsole::new(settings(), backend.clone(), Box::new(MemoryTokenStore::new())).unwrap()
}

fn tree_payload() -> Value {
    json!({"data": [
        {"data": {"mdId": "site", "mdName": "Site", "dimensionGroupId": "g-site"},
         "children": [
            {"data": {"mdId": "b1", "mdName": "Building 1", "dimensionGroupId": "g-building", "parentId": "site"},
             "children": [
                {"data": {"mdId": "f1", "mdName": "Floor 1", "dimensionGroupId": "g-floor", "parentId": "b1"},
                 "children": []}
             ]}
         ]}
    ]})
}

fn valid_investment() -> InvestmentDraft {
    InvestmentDraft {
        equipment_id: "E1".into(),
        investment_value: 1000.0,
        investment_remain_value: 250.0,
        investment_month: "2024-05".into(),
        investment_description: "Spindle upgrade".into(),
        ..Default::default()
    }
}

// ═══════════════════════════════════════════════════════════════════
// Construction
// ═══════════════════════════════════════════════════════════════════

mod construction {
    use super::*;

    #[test]
    fn invalid_settings_are_rejected() {
        let backend = Arc::new(FakeBackend::default());
        let bad = ConsoleSettings {
            base_url: "  ".into(),
            ..Default::default()
        };
        let err = EquipmentConsole::new(bad, backend, Box::new(MemoryTokenStore::new())).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
    }

    #[tokio::test]
    async fn initial_token_is_sent() {
        let backend = Arc::new(FakeBackend::default()).route(
            "GET",
            "energy/iot/manage/dimension/dimensionGroups",
            200,
            json!({"data": {}}),
        );
        let store = MemoryTokenStore::new();
        let console = EquipmentConsole::new(settings(), backend.clone(), Box::new(store)).unwrap();

        console.api().dimensions().groups().await.unwrap();
        assert_eq!(backend.log()[0].header("token"), Some("boot-token"));
        assert_eq!(console.api().base_url(), "http://backend.test/api");
    }

    #[tokio::test]
    async fn stored_token_used_without_initial_token() {
        let backend = Arc::new(FakeBackend::default()).route(
            "GET",
            "energy/iot/manage/dimension/dimensionGroups",
            200,
            json!({"data": {}}),
        );
        let settings = ConsoleSettings {
            initial_token: None,
            ..settings()
        };
        let store = MemoryTokenStore::with_entry(TOKEN_STORAGE_KEY, "stored");
        let console = EquipmentConsole::new(settings, backend.clone(), Box::new(store)).unwrap();

        console.api().dimensions().groups().await.unwrap();
        assert_eq!(backend.log()[0].header("token"), Some("stored"));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Lists and tree
// ═══════════════════════════════════════════════════════════════════

mod views {
    use super::*;

    #[tokio::test]
    async fn equipment_list_round_trip() {
        let backend = Arc::new(FakeBackend::default()).route(
            "POST",
            "machine/equipment/tree/list",
            200,
            json!({"data": {
                "records": [{"data": {"equipId": "E1", "equipName": "Press", "equipStatus": "1",
                                      "originValueOfAssets": 100, "investmentMoney": 40}}],
                "total": 1, "size": 15, "current": 1, "pages": 1
            }}),
        );
        let console = console(&backend);
        let mut list = console.equipment_list();
        list.refresh(&console.equipment_pages()).await.unwrap();

        assert_eq!(list.rows()[0].current_value, Some(60.0));
        assert_eq!(list.display_range(), "1 - 1 of 1");
        assert_eq!(list.search("press").len(), 1);
    }

    #[tokio::test]
    async fn investment_list_hides_idless_rows() {
        let backend = Arc::new(FakeBackend::default()).route(
            "POST",
            "machine/equipment/additional-investment/list",
            200,
            json!({"data": {
                "records": [{"id": "I1", "equipmentId": "E1"}, {"equipmentId": "E2"}],
                "total": 2, "size": 15, "current": 1, "pages": 1
            }}),
        );
        let console = console(&backend);
        let mut list = console.investment_list();
        list.refresh(&console.investment_pages()).await.unwrap();
        assert_eq!(list.rows().len(), 2);
        assert_eq!(list.displayable().len(), 1);
    }

    #[tokio::test]
    async fn failed_list_fetch_shows_error() {
        let backend = Arc::new(FakeBackend::default());
        let console = console(&backend);
        let mut list = console.equipment_list();
        let err = list.refresh(&console.equipment_pages()).await.unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(list.error(), Some("no route"));
    }

    #[tokio::test]
    async fn dimension_tree_loads_with_seeded_expansion() {
        let backend = Arc::new(FakeBackend::default()).route(
            "GET",
            "energy/iot/manage/dimension/treeListByGroup",
            200,
            tree_payload(),
        );
        let console = console(&backend);
        let (tree, expanded) = console.load_dimension_tree(None).await.unwrap();
        assert_eq!(tree.len(), 3);
        assert!(expanded.is_expanded("site"));
        assert!(expanded.is_expanded("b1"));
        assert!(!expanded.is_expanded("f1"));
        assert_eq!(tree.visible_rows(&expanded).len(), 3);
        assert_eq!(backend.count(HttpMethod::Get, "/dimension/treeListByGroup"), 1);
        assert_eq!(backend.count(HttpMethod::Get, "/dimension/treeList"), 0);
    }

    #[tokio::test]
    async fn dimension_tree_filtered_by_group() {
        let backend = Arc::new(FakeBackend::default()).route(
            "GET",
            "energy/iot/manage/dimension/treeListByGroup",
            200,
            tree_payload(),
        );
        let console = console(&backend);
        let (tree, _) = console.load_dimension_tree(Some("g-floor")).await.unwrap();
        // Root survives through its floor; the building in between does not match.
        assert_eq!(tree.len(), 1);
        assert!(tree.contains("site"));
    }

    #[tokio::test]
    async fn reload_drops_vanished_keys() {
        let backend = Arc::new(FakeBackend::default()).route(
            "GET",
            "energy/iot/manage/dimension/treeListByGroup",
            200,
            tree_payload(),
        );
        let console = console(&backend);
        let (_, mut expanded) = console.load_dimension_tree(None).await.unwrap();
        expanded.expand("ghost");
        let tree = console
            .reload_dimension_tree(Some("g-building"), &mut expanded)
            .await
            .unwrap();
        assert_eq!(tree.len(), 2);
        assert!(expanded.is_expanded("site"));
        assert!(expanded.is_expanded("b1"));
        assert!(!expanded.is_expanded("ghost"));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Forms
// ═══════════════════════════════════════════════════════════════════

mod forms {
    use super::*;

    #[tokio::test]
    async fn create_investment_posts_add() {
        let backend = Arc::new(FakeBackend::default()).route(
            "POST",
            "machine/equipment/additional-investment/add",
            200,
            json!({"data": "I-new"}),
        );
        let console = console(&backend);
        let mut form = FormState::new();
        form.open_create();
        form.update("equipmentId", |d: &mut InvestmentDraft| *d = valid_investment());

        let outcome = console.save_investment(&mut form).await;
        assert!(outcome.is_saved());
        assert!(!form.is_open());
        assert_eq!(backend.count(HttpMethod::Post, "/additional-investment/add"), 1);
    }

    #[tokio::test]
    async fn edit_investment_puts_edit_with_id() {
        let backend = Arc::new(FakeBackend::default()).route(
            "PUT",
            "machine/equipment/additional-investment/edit",
            200,
            json!({"data": true}),
        );
        let console = console(&backend);
        let mut form = FormState::new();
        form.open_edit("I7", valid_investment());

        assert!(console.save_investment(&mut form).await.is_saved());
        let sent = backend.log();
        let body: Value = serde_json::from_str(sent[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["id"], "I7");
        assert_eq!(body["investmentRemainValue"], 250.0);
    }

    #[tokio::test]
    async fn invalid_investment_sends_nothing() {
        let backend = Arc::new(FakeBackend::default());
        let console = console(&backend);
        let mut form: FormState<InvestmentDraft> = FormState::new();
        form.open_create();

        assert_eq!(console.save_investment(&mut form).await, SubmitOutcome::Invalid);
        assert!(backend.log().is_empty());
        assert!(form.is_open());
    }

    #[tokio::test]
    async fn rejected_investment_keeps_form_open() {
        let backend = Arc::new(FakeBackend::default()).route(
            "POST",
            "machine/equipment/additional-investment/add",
            400,
            json!({"message": "Equipment is retired"}),
        );
        let console = console(&backend);
        let mut form = FormState::new();
        form.open_create();
        form.update("equipmentId", |d: &mut InvestmentDraft| *d = valid_investment());

        let outcome = console.save_investment(&mut form).await;
        assert!(matches!(outcome, SubmitOutcome::Failed(CoreError::Api { status: 400, .. })));
        assert!(form.is_open());
        assert_eq!(form.submit_error(), Some("Equipment is retired"));
    }

    #[tokio::test]
    async fn dimension_add_and_edit() {
        let backend = Arc::new(FakeBackend::default())
            .route("POST", "energy/iot/manage/dimension/add", 200, json!({"data": "md-1"}))
            .route("PUT", "energy/iot/manage/dimension/edit", 200, json!({"data": "ok"}));
        let console = console(&backend);

        let mut form: FormState<DimensionDraft> = FormState::new();
        form.open_create();
        form.change("dimensionGroupId", "g-floor");
        form.change("mdName", "Floor 2");
        form.change("parentId", "b1");
        assert_eq!(console.save_dimension(&mut form).await, SubmitOutcome::Saved("md-1".into()));

        form.open_edit("md-1", DimensionDraft {
            dimension_group_id: "g-floor".into(),
            md_name: "Floor 2b".into(),
            ..Default::default()
        });
        assert_eq!(console.save_dimension(&mut form).await, SubmitOutcome::Saved("ok".into()));

        let sent = backend.log();
        let add: Value = serde_json::from_str(sent[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(add["parentId"], "b1");
        let edit: Value = serde_json::from_str(sent[1].body.as_deref().unwrap()).unwrap();
        assert_eq!(edit["mdId"], "md-1");
        assert_eq!(edit["mdName"], "Floor 2b");
    }

    #[tokio::test]
    async fn depreciation_save_invalidates_current_value() {
        let backend = Arc::new(FakeBackend::default())
            .route(
                "GET",
                "machine/equipment/depreciation/currentValue/E1",
                200,
                json!({"data": {"currentValue": 900}}),
            )
            .route(
                "POST",
                "equipment-depreciation",
                200,
                json!({"data": {"id": "D1", "equipmentId": "E1", "depreciationAmount": 100,
                                "currentValue": 800, "depreciationDate": "2024-05-31",
                                "method": "straight-line"}}),
            );
        let console = console(&backend);

        let first = console.current_value("E1").await.unwrap();
        let second = console.current_value("E1").await.unwrap();
        assert_eq!(first, json!({"currentValue": 900}));
        assert_eq!(second, first);
        assert_eq!(backend.count(HttpMethod::Get, "/currentValue/E1"), 1);

        let mut form: FormState<DepreciationDraft> = FormState::new();
        form.open_create();
        form.change("equipmentId", "E1");
        form.change("depreciationAmount", "100");
        form.change("currentValue", "800");
        let SubmitOutcome::Saved(record) = console.save_depreciation(&mut form).await else {
            panic!("expected the depreciation entry to save");
        };
        assert_eq!(record.id, "D1");

        console.current_value("E1").await.unwrap();
        assert_eq!(backend.count(HttpMethod::Get, "/currentValue/E1"), 2);
    }
}
