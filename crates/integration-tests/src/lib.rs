//! Test support for end-to-end storefront tests.
//!
//! [`FakeBackend`] is an in-process stand-in for the hosted backend. It
//! speaks just enough of the PostgREST table API (`eq` filters, `order`,
//! `limit`, single-object reads) and the GoTrue auth API (sign up, password
//! and refresh-token grants, logout, user) for the storefront to run against
//! it, and records every request so tests can assert on what was called.
//!
//! [`Storefront`] runs the real router on an ephemeral port and drives it with
//! a cookie-keeping client that does not follow redirects.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, Query, RawQuery, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get, post};
use axum::{Json, Router};
use chrono::Utc;
use secrecy::SecretString;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use url::Url;
use uuid::Uuid;

use bottleshop_storefront::config::{BackendConfig, StorefrontConfig};
use bottleshop_storefront::state::AppState;

const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";
const TOKEN_LIFETIME_SECS: i64 = 3600;

/// A request the fake backend received.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: String,
}

#[derive(Debug, Clone)]
struct FakeUser {
    id: Uuid,
    email: String,
    password: String,
}

#[derive(Debug, Default)]
struct BackendState {
    tables: HashMap<String, Vec<Value>>,
    users: Vec<FakeUser>,
    access_tokens: HashMap<String, Uuid>,
    refresh_tokens: HashMap<String, Uuid>,
    requests: Vec<RecordedRequest>,
}

type Shared = Arc<Mutex<BackendState>>;

/// In-memory backend serving the table and auth APIs over HTTP.
#[derive(Clone)]
pub struct FakeBackend {
    url: Url,
    state: Shared,
}

impl FakeBackend {
    /// Start the fake on an ephemeral local port.
    pub async fn start() -> Self {
        let state: Shared = Arc::default();
        let app = Router::new()
            .route("/rest/v1/{table}", any(table))
            .route("/auth/v1/signup", post(sign_up))
            .route("/auth/v1/token", post(token))
            .route("/auth/v1/logout", post(logout))
            .route("/auth/v1/user", get(user))
            .route("/auth/v1/health", get(|| async { Json(json!({ "name": "GoTrue" })) }))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind fake backend");
        let addr = listener.local_addr().expect("Fake backend has no address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Fake backend stopped");
        });

        let url = Url::parse(&format!("http://{addr}/")).expect("Invalid fake backend URL");
        Self { url, state }
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    fn lock(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().expect("Fake backend state poisoned")
    }

    /// Add a product, and an inventory row when `stock` is given. Returns the
    /// product id.
    pub fn add_product(&self, name: &str, category: &str, price: &str, stock: Option<u32>) -> String {
        let id = Uuid::new_v4().to_string();
        let mut state = self.lock();
        state.tables.entry("products".to_string()).or_default().push(json!({
            "id": id,
            "name": name,
            "brand": "Test Distillery",
            "category": category,
            "category_id": null,
            "volume": 750,
            "alcohol_content": "40.0",
            "price": price,
            "image": null,
            "description": format!("{name} for testing."),
            "created_at": Utc::now().to_rfc3339(),
        }));
        if let Some(quantity) = stock {
            state.tables.entry("inventory".to_string()).or_default().push(json!({
                "id": Uuid::new_v4().to_string(),
                "product_id": id,
                "quantity": quantity,
                "low_stock_threshold": 10,
                "created_at": Utc::now().to_rfc3339(),
                "updated_at": Utc::now().to_rfc3339(),
            }));
        }
        id
    }

    /// Register a confirmed user with a profile row. Returns the user id.
    pub fn add_user(&self, email: &str, password: &str, is_admin: bool) -> String {
        let mut state = self.lock();
        create_user(&mut state, email, password, is_admin).to_string()
    }

    /// A snapshot of every row in `table`.
    #[must_use]
    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.lock().tables.get(table).cloned().unwrap_or_default()
    }

    /// Every request received so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    /// Whether any request was made under `path_prefix`.
    #[must_use]
    pub fn was_requested(&self, path_prefix: &str) -> bool {
        self.lock()
            .requests
            .iter()
            .any(|r| r.path.starts_with(path_prefix))
    }

    /// Forget the request log.
    pub fn clear_requests(&self) {
        self.lock().requests.clear();
    }
}

fn create_user(state: &mut BackendState, email: &str, password: &str, is_admin: bool) -> Uuid {
    let id = Uuid::new_v4();
    state.users.push(FakeUser {
        id,
        email: email.to_string(),
        password: password.to_string(),
    });
    state.tables.entry("profiles".to_string()).or_default().push(json!({
        "id": id.to_string(),
        "username": null,
        "avatar_url": null,
        "is_admin": is_admin,
        "preferred_theme": null,
        "created_at": Utc::now().to_rfc3339(),
        "updated_at": null,
    }));
    id
}

fn issue_session(state: &mut BackendState, user: &FakeUser) -> Value {
    let access_token = format!("access-{}", Uuid::new_v4());
    let refresh_token = format!("refresh-{}", Uuid::new_v4());
    state.access_tokens.insert(access_token.clone(), user.id);
    state.refresh_tokens.insert(refresh_token.clone(), user.id);
    json!({
        "access_token": access_token,
        "token_type": "bearer",
        "expires_in": TOKEN_LIFETIME_SECS,
        "expires_at": Utc::now().timestamp() + TOKEN_LIFETIME_SECS,
        "refresh_token": refresh_token,
        "user": { "id": user.id.to_string(), "email": user.email },
    })
}

fn record(state: &mut BackendState, method: &Method, path: &str, query: Option<&str>) {
    state.requests.push(RecordedRequest {
        method: method.clone(),
        path: path.to_string(),
        query: query.unwrap_or_default().to_string(),
    });
}

fn error(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn no_rows() -> Response {
    error(
        StatusCode::NOT_ACCEPTABLE,
        json!({
            "code": "PGRST116",
            "message": "JSON object requested, multiple (or no) rows returned",
            "details": "The result contains 0 rows",
            "hint": null,
        }),
    )
}

// =============================================================================
// Table API
// =============================================================================

/// Parsed PostgREST query string.
#[derive(Default)]
struct TableQuery {
    filters: Vec<(String, String)>,
    order: Vec<(String, bool)>,
    limit: Option<usize>,
}

impl TableQuery {
    fn parse(raw: Option<&str>) -> Self {
        let mut query = Self::default();
        for (key, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            match key.as_ref() {
                "select" => {}
                "order" => {
                    for term in value.split(',') {
                        let (column, direction) = term.split_once('.').unwrap_or((term, "asc"));
                        query.order.push((column.to_string(), direction != "desc"));
                    }
                }
                "limit" => query.limit = value.parse().ok(),
                column => {
                    if let Some(expected) = value.strip_prefix("eq.") {
                        query.filters.push((column.to_string(), expected.to_string()));
                    }
                }
            }
        }
        query
    }

    fn matches(&self, row: &Value) -> bool {
        self.filters
            .iter()
            .all(|(column, expected)| cell_text(row.get(column)) == *expected)
    }
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "null".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn wants_object(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains(SINGLE_OBJECT))
}

fn respond_rows(status: StatusCode, rows: Vec<Value>, single: bool) -> Response {
    if !single {
        return (status, Json(Value::Array(rows))).into_response();
    }
    match <[Value; 1]>::try_from(rows) {
        Ok([row]) => (status, Json(row)).into_response(),
        Err(_) => no_rows(),
    }
}

async fn table(
    State(state): State<Shared>,
    method: Method,
    Path(name): Path<String>,
    RawQuery(raw): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let mut state = state.lock().expect("Fake backend state poisoned");
    record(&mut state, &method, &format!("/rest/v1/{name}"), raw.as_deref());

    let query = TableQuery::parse(raw.as_deref());
    let single = wants_object(&headers);
    let rows = state.tables.entry(name).or_default();

    match method {
        Method::GET => {
            let mut matched: Vec<Value> = rows.iter().filter(|r| query.matches(r)).cloned().collect();
            for (column, ascending) in query.order.iter().rev() {
                matched.sort_by(|a, b| {
                    let ordering = cell_text(a.get(column)).cmp(&cell_text(b.get(column)));
                    if *ascending { ordering } else { ordering.reverse() }
                });
            }
            if let Some(limit) = query.limit {
                matched.truncate(limit);
            }
            respond_rows(StatusCode::OK, matched, single)
        }
        Method::POST => {
            let Ok(Value::Object(mut row)) = serde_json::from_slice::<Value>(&body) else {
                return error(StatusCode::BAD_REQUEST, json!({ "message": "expected a JSON object" }));
            };
            row.entry("id").or_insert_with(|| json!(Uuid::new_v4().to_string()));
            row.entry("created_at").or_insert_with(|| json!(Utc::now().to_rfc3339()));
            let row = Value::Object(row);
            rows.push(row.clone());
            respond_rows(StatusCode::CREATED, vec![row], single)
        }
        Method::PATCH => {
            let Ok(Value::Object(changes)) = serde_json::from_slice::<Value>(&body) else {
                return error(StatusCode::BAD_REQUEST, json!({ "message": "expected a JSON object" }));
            };
            let mut updated = Vec::new();
            for row in rows.iter_mut().filter(|r| query.matches(r)) {
                if let Value::Object(fields) = row {
                    fields.extend(changes.clone());
                }
                updated.push(row.clone());
            }
            respond_rows(StatusCode::OK, updated, single)
        }
        Method::DELETE => {
            rows.retain(|r| !query.matches(r));
            StatusCode::NO_CONTENT.into_response()
        }
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

// =============================================================================
// Auth API
// =============================================================================

#[derive(Deserialize)]
struct Credentials {
    email: String,
    password: String,
}

#[derive(Deserialize)]
struct RefreshGrant {
    refresh_token: String,
}

#[derive(Deserialize)]
struct GrantQuery {
    grant_type: String,
}

async fn sign_up(State(state): State<Shared>, Json(credentials): Json<Credentials>) -> Response {
    let mut state = state.lock().expect("Fake backend state poisoned");
    record(&mut state, &Method::POST, "/auth/v1/signup", None);

    if state.users.iter().any(|u| u.email == credentials.email) {
        return error(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!({ "code": 422, "error_code": "user_already_exists", "msg": "User already registered" }),
        );
    }
    let id = create_user(&mut state, &credentials.email, &credentials.password, false);
    let user = FakeUser {
        id,
        email: credentials.email,
        password: credentials.password,
    };
    Json(issue_session(&mut state, &user)).into_response()
}

async fn token(
    State(state): State<Shared>,
    Query(grant): Query<GrantQuery>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().expect("Fake backend state poisoned");
    let query = format!("grant_type={}", grant.grant_type);
    record(&mut state, &Method::POST, "/auth/v1/token", Some(&query));

    let user = match grant.grant_type.as_str() {
        "password" => serde_json::from_value::<Credentials>(body).ok().and_then(|c| {
            state
                .users
                .iter()
                .find(|u| u.email == c.email && u.password == c.password)
                .cloned()
        }),
        "refresh_token" => serde_json::from_value::<RefreshGrant>(body)
            .ok()
            .and_then(|g| state.refresh_tokens.remove(&g.refresh_token))
            .and_then(|id| state.users.iter().find(|u| u.id == id).cloned()),
        _ => None,
    };

    match user {
        Some(user) => Json(issue_session(&mut state, &user)).into_response(),
        None => error(
            StatusCode::BAD_REQUEST,
            json!({ "error": "invalid_grant", "error_description": "Invalid login credentials" }),
        ),
    }
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

async fn logout(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = state.lock().expect("Fake backend state poisoned");
    record(&mut state, &Method::POST, "/auth/v1/logout", None);

    match bearer(&headers).and_then(|t| state.access_tokens.remove(t)) {
        Some(id) => {
            state.refresh_tokens.retain(|_, owner| *owner != id);
            StatusCode::NO_CONTENT.into_response()
        }
        None => error(
            StatusCode::UNAUTHORIZED,
            json!({ "code": 401, "error_code": "bad_jwt", "msg": "invalid JWT" }),
        ),
    }
}

async fn user(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = state.lock().expect("Fake backend state poisoned");
    record(&mut state, &Method::GET, "/auth/v1/user", None);

    let user = bearer(&headers)
        .and_then(|t| state.access_tokens.get(t))
        .and_then(|id| state.users.iter().find(|u| u.id == *id));
    match user {
        Some(user) => Json(json!({ "id": user.id.to_string(), "email": user.email })).into_response(),
        None => error(
            StatusCode::UNAUTHORIZED,
            json!({ "code": 401, "error_code": "bad_jwt", "msg": "invalid JWT" }),
        ),
    }
}

// =============================================================================
// Storefront under test
// =============================================================================

/// A running storefront and a browser-like client for it.
pub struct Storefront {
    base: String,
    client: reqwest::Client,
}

impl Storefront {
    /// Serve the storefront against `backend_url` on an ephemeral port.
    pub async fn spawn(backend_url: &Url) -> Self {
        let config = StorefrontConfig {
            host: [127, 0, 0, 1].into(),
            port: 0,
            base_url: "http://127.0.0.1".to_string(),
            backend: BackendConfig {
                url: backend_url.clone(),
                api_key: SecretString::from("anon-key-for-integration-tests"),
            },
            catalog_ttl: Duration::from_secs(60),
            rate_limit: false,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        };
        let app = bottleshop_storefront::build_router(AppState::new(config));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind storefront");
        let addr = listener.local_addr().expect("Storefront has no address");
        tokio::spawn(async move {
            axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
                .await
                .expect("Storefront stopped");
        });

        Self {
            base: format!("http://{addr}"),
            client: browser(),
        }
    }

    /// A second visitor of the same storefront, with its own cookies.
    #[must_use]
    pub fn new_visitor(&self) -> Self {
        Self {
            base: self.base.clone(),
            client: browser(),
        }
    }

    /// Start a fake backend and a storefront wired to it.
    pub async fn with_backend() -> (Self, FakeBackend) {
        let backend = FakeBackend::start().await;
        let storefront = Self::spawn(backend.url()).await;
        (storefront, backend)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{path}", self.base))
            .send()
            .await
            .expect("GET request failed")
    }

    /// GET and return the status and body.
    pub async fn page(&self, path: &str) -> (reqwest::StatusCode, String) {
        let response = self.get(path).await;
        let status = response.status();
        let body = response.text().await.expect("Failed to read body");
        (status, body)
    }

    /// POST an urlencoded form.
    pub async fn post_form(&self, path: &str, fields: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(format!("{}{path}", self.base))
            .form(fields)
            .send()
            .await
            .expect("POST request failed")
    }

    /// Sign in through the login form and assert it succeeded.
    pub async fn sign_in(&self, email: &str, password: &str) {
        let response = self
            .post_form("/auth/login", &[("email", email), ("password", password)])
            .await;
        assert_eq!(location(&response), Some("/".to_string()), "sign in failed for {email}");
    }
}

/// A client that keeps cookies and reports redirects instead of following them.
fn browser() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to build HTTP client")
}

/// The `Location` header of a redirect.
#[must_use]
pub fn location(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
