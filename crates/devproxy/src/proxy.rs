//! `/api` forwarding and the CORS layer around it.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::{
    ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN,
    ACCESS_CONTROL_REQUEST_HEADERS, CONNECTION, CONTENT_LENGTH, HOST, TRANSFER_ENCODING,
};
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::Router;
use tracing::{info, warn};

pub const DEFAULT_LISTEN: &str = "127.0.0.1:3001";
pub const DEFAULT_UPSTREAM: &str = "https://www.inco-plat.com:9990";

/// Request bodies larger than this are rejected before forwarding.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

const UPSTREAM_TIMEOUT_SECS: u64 = 60;

const ALLOWED_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
const DEFAULT_ALLOWED_HEADERS: &str = "content-type, token";

#[derive(Clone)]
pub struct ProxyState {
    upstream: Arc<str>,
    client: reqwest::Client,
}

impl ProxyState {
    /// State forwarding to `upstream` (scheme, host and port only). Upstream
    /// certificates are not verified; the upstream dev host is self-signed.
    pub fn new(upstream: &str) -> Self {
        let client = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .timeout(Duration::from_secs(UPSTREAM_TIMEOUT_SECS))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            upstream: Arc::from(upstream.trim_end_matches('/')),
            client,
        }
    }

    pub fn upstream(&self) -> &str {
        &self.upstream
    }
}

pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route("/api", any(forward))
        .route("/api/*rest", any(forward))
        .layer(middleware::from_fn(cors))
        .with_state(state)
}

/// Upstream URL for an incoming request: same path and query, new origin.
pub fn upstream_url(upstream: &str, uri: &Uri) -> String {
    let path = uri.path_and_query().map(|p| p.as_str()).unwrap_or("/");
    format!("{}{}", upstream.trim_end_matches('/'), path)
}

async fn forward(State(state): State<ProxyState>, req: Request) -> Response {
    let (parts, body) = req.into_parts();
    let target = upstream_url(&state.upstream, &parts.uri);

    let body = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(url = %target, "rejecting request body: {e}");
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };

    let headers = upstream_headers(parts.headers);

    info!(method = %parts.method, url = %target, "proxying");

    let result = state
        .client
        .request(parts.method.clone(), &target)
        .headers(headers)
        .body(body)
        .send()
        .await;

    let upstream = match result {
        Ok(resp) => resp,
        Err(e) => return bad_gateway(&target, e),
    };

    let status = upstream.status();
    info!(status = status.as_u16(), url = %target, "upstream responded");

    let mut headers = upstream.headers().clone();
    headers.remove(TRANSFER_ENCODING);
    headers.remove(CONNECTION);
    headers.remove(CONTENT_LENGTH);

    match upstream.bytes().await {
        Ok(bytes) => {
            let mut resp = Response::new(Body::from(bytes));
            *resp.status_mut() = status;
            resp.headers_mut().extend(headers);
            resp
        }
        Err(e) => bad_gateway(&target, e),
    }
}

fn bad_gateway(target: &str, e: reqwest::Error) -> Response {
    let e = e.without_url();
    warn!(url = %target, "upstream request failed: {e}");
    (StatusCode::BAD_GATEWAY, format!("Proxy error: {e}")).into_response()
}

/// Permissive CORS. Preflights are answered here and never reach the upstream.
async fn cors(req: Request, next: Next) -> Response {
    let requested_headers = req.headers().get(ACCESS_CONTROL_REQUEST_HEADERS).cloned();

    let mut resp = if req.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };

    let headers = resp.headers_mut();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOWED_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        requested_headers.unwrap_or_else(|| HeaderValue::from_static(DEFAULT_ALLOWED_HEADERS)),
    );
    resp
}

/// Request headers to send upstream. The body is already buffered, so the
/// framing headers are recomputed by the client.
fn upstream_headers(mut headers: HeaderMap) -> HeaderMap {
    for name in [HOST, CONNECTION, CONTENT_LENGTH, TRANSFER_ENCODING] {
        headers.remove(name);
    }
    headers
}
