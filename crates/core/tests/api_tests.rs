// ═══════════════════════════════════════════════════════════════════
// API Tests — request building, auth header, envelopes, error mapping
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use equipment_ledger_core::api::client::ApiClient;
use equipment_ledger_core::auth::session::AuthSession;
use equipment_ledger_core::auth::token_store::MemoryTokenStore;
use equipment_ledger_core::errors::{CoreError, DEFAULT_API_ERROR_MESSAGE};
use equipment_ledger_core::models::depreciation::{
    CurrentValueReportQuery, DepreciationMethod, DepreciationReportQuery,
};
use equipment_ledger_core::models::dimension::DimensionAddDto;
use equipment_ledger_core::models::equipment::EquipmentStatus;
use equipment_ledger_core::models::investment::{InvestmentAddDto, InvestmentEditDto};
use equipment_ledger_core::models::pagination::Pagination;
use equipment_ledger_core::models::settings::TOKEN_STORAGE_KEY;
use equipment_ledger_core::transport::traits::{
    HttpMethod, HttpRequest, HttpResponse, HttpTransport,
};

// ═══════════════════════════════════════════════════════════════════
// Test Helpers — Scripted Transport
// ═══════════════════════════════════════════════════════════════════

/// Answers requests from a script and records what was sent.
struct ScriptedTransport {
    replies: Mutex<VecDeque<Result<HttpResponse, CoreError>>>,
    sent: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    fn new(replies: Vec<Result<HttpResponse, CoreError>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into()),
            sent: Mutex::new(Vec::new()),
        })
    }

    fn ok(body: serde_json::Value) -> Result<HttpResponse, CoreError> {
        Ok(HttpResponse::new(200, body.to_string()))
    }

    fn sent(&self) -> Vec<HttpRequest> {
        self.sent.lock().unwrap().clone()
    }

    fn last(&self) -> HttpRequest {
        self.sent().last().cloned().expect("no request was sent")
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, CoreError> {
        self.sent.lock().unwrap().push(request);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(HttpResponse::new(200, "")))
    }
}

const BASE: &str = "http://localhost:3001/api";

fn client_with_token(
    token: Option<&str>,
    replies: Vec<Result<HttpResponse, CoreError>>,
) -> (ApiClient, Arc<ScriptedTransport>) {
    let transport = ScriptedTransport::new(replies);
    let store = match token {
        Some(t) => MemoryTokenStore::with_entry(TOKEN_STORAGE_KEY, t),
        None => MemoryTokenStore::new(),
    };
    let session = AuthSession::new(Box::new(store), TOKEN_STORAGE_KEY);
    let client = ApiClient::new(BASE, Arc::new(session), transport.clone());
    (client, transport)
}

fn client(replies: Vec<Result<HttpResponse, CoreError>>) -> (ApiClient, Arc<ScriptedTransport>) {
    client_with_token(Some("tok-123"), replies)
}

// ═══════════════════════════════════════════════════════════════════
// Request building
// ═══════════════════════════════════════════════════════════════════

mod request_building {
    use super::*;

    #[tokio::test]
    async fn every_request_carries_content_type_and_token() {
        let (client, transport) = client(vec![ScriptedTransport::ok(json!({"data": "ok"}))]);
        client.dimensions().remove("md-1").await.unwrap();

        let req = transport.last();
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        assert_eq!(req.header("token"), Some("tok-123"));
        assert_eq!(req.header("Authorization"), None);
    }

    #[tokio::test]
    async fn no_token_means_no_token_header() {
        let (client, transport) = client_with_token(None, vec![]);
        client.dimensions().groups().await.unwrap();
        assert_eq!(transport.last().header("token"), None);
    }

    #[tokio::test]
    async fn token_set_after_construction_is_used() {
        let (client, transport) = client_with_token(None, vec![]);
        client.session().set_token("fresh").unwrap();
        client.dimensions().groups().await.unwrap();
        assert_eq!(transport.last().header("token"), Some("fresh"));
    }

    #[test]
    fn endpoint_trims_slashes_and_encodes_query() {
        let (client, _) = client_with_token(None, vec![]);
        let url = client
            .endpoint("/machine/x", &[("name", Some("pump #2")), ("skip", None)])
            .unwrap();
        assert_eq!(url, "http://localhost:3001/api/machine/x?name=pump+%232");
    }

    #[test]
    fn endpoint_rejects_unparsable_base() {
        let transport = ScriptedTransport::new(vec![]);
        let session = AuthSession::new(Box::new(MemoryTokenStore::new()), TOKEN_STORAGE_KEY);
        let client = ApiClient::new("not a url", Arc::new(session), transport);
        assert!(matches!(
            client.endpoint("x", &[]),
            Err(CoreError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn equipment_list_posts_empty_body_with_paging_query() {
        let (client, transport) = client(vec![]);
        client.equipment().list(2, 15).await.unwrap();

        let req = transport.last();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(
            req.url,
            "http://localhost:3001/api/machine/equipment/tree/list?pageNo=2&pageSize=15"
        );
        assert_eq!(req.body.as_deref(), Some("{}"));
    }

    #[tokio::test]
    async fn investment_add_and_edit_use_post_and_put() {
        let (client, transport) = client(vec![]);
        let add = InvestmentAddDto {
            equipment_id: "E1".into(),
            investment_value: 1000.0,
            investment_remain_value: 400.0,
            investment_month: "2024-05".into(),
            investment_description: "Overhaul".into(),
        };
        client.investments().add(&add).await.unwrap();
        let edit = InvestmentEditDto {
            id: "I1".into(),
            investment_month: "2024-06".into(),
            investment_value: 1000.0,
            investment_remain_value: 300.0,
            investment_description: "Overhaul".into(),
        };
        client.investments().edit(&edit).await.unwrap();

        let sent = transport.sent();
        assert_eq!(sent[0].method, HttpMethod::Post);
        assert!(sent[0].url.ends_with("/machine/equipment/additional-investment/add"));
        let body: serde_json::Value = serde_json::from_str(sent[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["equipmentId"], "E1");
        assert_eq!(body["investmentRemainValue"], 400.0);

        assert_eq!(sent[1].method, HttpMethod::Put);
        assert!(sent[1].url.ends_with("/machine/equipment/additional-investment/edit"));
        let body: serde_json::Value = serde_json::from_str(sent[1].body.as_deref().unwrap()).unwrap();
        assert_eq!(body["id"], "I1");
        assert!(body.get("equipmentId").is_none());
    }

    #[tokio::test]
    async fn report_omits_unset_and_empty_filters() {
        let (client, transport) = client(vec![]);
        let query = DepreciationReportQuery {
            target_month: Some("2024-05".into()),
            department_id: Some(String::new()),
            equipment_type_id: None,
        };
        client.depreciation().report(&query).await.unwrap();
        assert_eq!(
            transport.last().url,
            "http://localhost:3001/api/machine/equipment/depreciation/report?targetMonth=2024-05"
        );

        client
            .depreciation()
            .current_value_report(&CurrentValueReportQuery::default())
            .await
            .unwrap();
        assert_eq!(
            transport.last().url,
            "http://localhost:3001/api/machine/equipment/depreciation/report/currentValue"
        );
    }

    #[tokio::test]
    async fn process_and_cancel_pass_target_month() {
        let (client, transport) = client(vec![
            ScriptedTransport::ok(json!({"data": "processed"})),
            ScriptedTransport::ok(json!({"data": "cancelled"})),
        ]);
        assert_eq!(client.depreciation().process("2024-05").await.unwrap(), "processed");
        assert!(transport.last().url.ends_with("/process?targetMonth=2024-05"));
        assert_eq!(client.depreciation().cancel("2024-05").await.unwrap(), "cancelled");
        assert!(transport.last().url.ends_with("/cancel?targetMonth=2024-05"));
    }

    #[tokio::test]
    async fn calculate_sends_method_param() {
        let (client, transport) = client(vec![]);
        let rows = client
            .depreciation()
            .calculate("E1", DepreciationMethod::DecliningBalance)
            .await
            .unwrap();
        assert!(rows.is_empty());
        assert!(transport
            .last()
            .url
            .ends_with("/equipment-depreciation/calculate/E1?method=declining-balance"));
    }

    #[tokio::test]
    async fn dimension_add_serializes_absent_parent_as_null() {
        let (client, transport) = client(vec![ScriptedTransport::ok(json!({"data": "md-9"}))]);
        let dto = DimensionAddDto {
            dimension_group_id: "g1".into(),
            md_name: "Hall".into(),
            area: Some(120.0),
            parent_id: None,
            order_no: Some(1),
        };
        assert_eq!(client.dimensions().add(&dto).await.unwrap(), "md-9");

        let body: serde_json::Value =
            serde_json::from_str(transport.last().body.as_deref().unwrap()).unwrap();
        assert_eq!(body["mdName"], "Hall");
        assert!(body["parentId"].is_null());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Error mapping
// ═══════════════════════════════════════════════════════════════════

mod error_mapping {
    use super::*;

    #[tokio::test]
    async fn non_2xx_uses_server_message_and_status() {
        let (client, _) = client(vec![Ok(HttpResponse::new(
            400,
            json!({"message": "Equipment not found"}).to_string(),
        ))]);
        let err = client.equipment().get("E404").await.unwrap_err();
        assert_eq!(
            err,
            CoreError::Api {
                message: "Equipment not found".into(),
                status: 400
            }
        );
        assert_eq!(err.status(), Some(400));
    }

    #[tokio::test]
    async fn non_2xx_without_message_uses_default() {
        let (client, _) = client(vec![Ok(HttpResponse::new(500, "<html>oops</html>"))]);
        let err = client.dimensions().groups().await.unwrap_err();
        assert_eq!(
            err,
            CoreError::Api {
                message: DEFAULT_API_ERROR_MESSAGE.into(),
                status: 500
            }
        );
    }

    #[tokio::test]
    async fn empty_message_falls_back_to_default() {
        let (client, _) = client(vec![Ok(HttpResponse::new(
            401,
            json!({"message": ""}).to_string(),
        ))]);
        let err = client.dimensions().tree_list().await.unwrap_err();
        assert_eq!(err.user_message(), DEFAULT_API_ERROR_MESSAGE);
        assert_eq!(err.status(), Some(401));
    }

    #[tokio::test]
    async fn network_failure_propagates_unchanged() {
        let (client, _) = client(vec![Err(CoreError::Network("connection refused".into()))]);
        let err = client.equipment().list(1, 15).await.unwrap_err();
        assert_eq!(err, CoreError::Network("connection refused".into()));
        assert_eq!(err.status(), None);
    }

    #[tokio::test]
    async fn invalid_json_on_success_is_deserialization_error() {
        let (client, _) = client(vec![Ok(HttpResponse::new(200, "not json"))]);
        let err = client.dimensions().groups().await.unwrap_err();
        assert!(matches!(err, CoreError::Deserialization(_)));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Envelopes
// ═══════════════════════════════════════════════════════════════════

mod envelopes {
    use super::*;

    #[tokio::test]
    async fn equipment_records_are_lifted_and_normalized() {
        let body = json!({
            "data": {
                "records": [
                    {"data": {
                        "equipId": 7,
                        "equipNo": "EQ-007",
                        "equipName": "Compressor",
                        "equipStatus": "1",
                        "originValueOfAssets": "10000",
                        "investmentMoney": 2500
                    }},
                    {"data": {
                        "equipId": "8",
                        "equipName": "Pump",
                        "equipStatus": "0",
                        "originValueOfAssets": 800,
                        "investmentMoney": null
                    }}
                ],
                "total": 32, "size": 15, "current": 2, "pages": 3
            }
        });
        let (client, _) = client(vec![ScriptedTransport::ok(body)]);
        let page = client.equipment().list(2, 15).await.unwrap();

        assert_eq!(page.data.len(), 2);
        let compressor = &page.data[0];
        assert_eq!(compressor.equip_id, "7");
        assert_eq!(compressor.current_value, Some(7500.0));
        assert_eq!(compressor.status(), EquipmentStatus::Active);
        let pump = &page.data[1];
        assert_eq!(pump.current_value(), 800.0);
        assert_eq!(pump.status(), EquipmentStatus::Inactive);

        assert_eq!(
            page.pagination,
            Pagination {
                total: 32,
                size: 15,
                current: 2,
                pages: 3
            }
        );
        assert_eq!(page.pagination.display_range(), "16 - 30 of 32");
    }

    #[tokio::test]
    async fn missing_envelope_is_an_empty_page_echoing_the_request() {
        let (client, _) = client(vec![ScriptedTransport::ok(json!({"code": 200}))]);
        let page = client.equipment().list(3, 15).await.unwrap();
        assert!(page.is_empty());
        assert_eq!(page.pagination, Pagination::empty(3, 15));
        assert_eq!(page.pagination.display_range(), "0 - 0 of 0");
    }

    #[tokio::test]
    async fn investment_records_are_flat_and_keep_idless_rows() {
        let body = json!({
            "data": {
                "records": [
                    {"id": "I1", "equipmentId": "E1", "equipmentName": "Lathe",
                     "investmentValue": 500, "investmentRemainValue": "200"},
                    {"id": null, "equipmentId": "E2", "investmentValue": 10}
                ],
                "total": 2, "size": 15, "current": 1, "pages": 1
            }
        });
        let (client, _) = client(vec![ScriptedTransport::ok(body)]);
        let page = client.investments().list(1, 15).await.unwrap();
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.data[0].investment_remain_value, 200.0);
        assert_eq!(page.data[1].id, None);
    }

    #[tokio::test]
    async fn legacy_endpoint_accepts_bare_body() {
        let (client, _) = client(vec![ScriptedTransport::ok(json!({
            "equipId": "E1",
            "equipName": "Mill",
            "originValueOfAssets": 100
        }))]);
        let equipment = client.equipment().get("E1").await.unwrap();
        assert_eq!(equipment.equip_name, "Mill");
        assert_eq!(equipment.current_value, Some(100.0));
    }

    #[tokio::test]
    async fn null_tree_data_is_empty() {
        let (client, _) = client(vec![ScriptedTransport::ok(json!({"data": null}))]);
        assert!(client.dimensions().tree_list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn dimension_groups_keep_server_order() {
        let (client, _) = client(vec![ScriptedTransport::ok(json!({
            "data": {"z-site": "Sites", "a-floor": "Floors"}
        }))]);
        let groups = client.dimensions().groups().await.unwrap();
        let ids: Vec<&str> = groups.keys().map(String::as_str).collect();
        assert_eq!(ids, ["z-site", "a-floor"]);
    }

    #[tokio::test]
    async fn latest_month_empty_is_none() {
        let (client, _) = client(vec![
            ScriptedTransport::ok(json!({"data": null})),
            ScriptedTransport::ok(json!({"data": "2024-04"})),
        ]);
        assert_eq!(client.depreciation().latest_depreciated_month("E1").await.unwrap(), None);
        assert_eq!(
            client.depreciation().latest_depreciated_month("E1").await.unwrap(),
            Some("2024-04".into())
        );
    }
}
