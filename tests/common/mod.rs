//! In-process mock of the admin REST API plus shared test helpers.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use jsonwebtoken::{EncodingKey, Header};
use serde_json::{json, Value};
use uuid::Uuid;

use admin_console::config::{AuthHeaderPolicy, Config};
use admin_console::db::MemoryTokenStore;
use admin_console::guard::{Navigator, Route};
use admin_console::AppState;

pub const ADMIN_MOBILE: &str = "01700000001";
pub const CLERK_MOBILE: &str = "01700000002";
pub const OUTSIDER_MOBILE: &str = "01700000003";
pub const PASSWORD: &str = "secret1";
pub const OTP: &str = "4321";

#[derive(Default)]
pub struct MockData {
    /// mobile -> (password, user json)
    pub accounts: HashMap<String, (String, Value)>,
    pub roles: Vec<Value>,
    pub tasks: Vec<Value>,
    /// Authorization header of every request, in arrival order.
    pub auth_headers: Vec<Option<String>>,
    pub requests: Vec<String>,
}

pub type Shared = Arc<Mutex<MockData>>;

pub struct MockApi {
    pub base_url: String,
    pub data: Shared,
}

impl MockApi {
    pub fn request_count(&self) -> usize {
        self.data.lock().unwrap().requests.len()
    }

    pub fn requests(&self) -> Vec<String> {
        self.data.lock().unwrap().requests.clone()
    }

    pub fn last_auth_header(&self) -> Option<Option<String>> {
        self.data.lock().unwrap().auth_headers.last().cloned()
    }
}

fn profile(name: &str, grant: &str) -> Value {
    json!({ "id": Uuid::new_v4(), "name": name, "hasPermission": grant })
}

fn account(mobile: &str, name: &str, role: &str, profile: Option<Value>) -> Value {
    let mut user = json!({
        "id": Uuid::new_v4(),
        "name": name,
        "mobile": mobile,
        "isVerified": true,
        "role": role,
    });
    if let Some(profile) = profile {
        user["accessController"] = profile;
    }
    user
}

fn access_token(user_id: &str) -> String {
    let exp = chrono::Utc::now().timestamp() + 3600;
    jsonwebtoken::encode(
        &Header::default(),
        &json!({ "sub": user_id, "exp": exp }),
        &EncodingKey::from_secret(b"mock-server-secret"),
    )
    .expect("encode mock token")
}

fn reject(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "statusCode": status.as_u16(), "message": message }))).into_response()
}

fn record(data: &Shared, headers: &HeaderMap, label: &str) {
    let mut data = data.lock().unwrap();
    let auth = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    data.auth_headers.push(auth);
    data.requests.push(label.to_string());
}

async fn login(
    State(data): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(&data, &headers, "POST /users/login");
    let mobile = body["mobile"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    let data = data.lock().unwrap();
    match data.accounts.get(mobile) {
        Some((stored, user)) if stored == password => {
            let token = access_token(user["id"].as_str().unwrap_or_default());
            Json(json!({ "accessToken": token, "user": user })).into_response()
        }
        _ => reject(StatusCode::UNAUTHORIZED, "Invalid credentials"),
    }
}

async fn register(
    State(data): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(&data, &headers, "POST /users");
    let mobile = body["mobile"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default().to_string();

    let mut data = data.lock().unwrap();
    if data.accounts.contains_key(&mobile) {
        return reject(StatusCode::CONFLICT, "User already exists");
    }

    let mut user = account(&mobile, body["name"].as_str().unwrap_or_default(), "user", None);
    user["isVerified"] = json!(false);
    let id = user["id"].clone();
    data.accounts.insert(mobile, (password, user));

    (StatusCode::CREATED, Json(json!({ "user": { "id": id }, "otpSend": true }))).into_response()
}

async fn verify(
    State(data): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(&data, &headers, "POST /users/verify");
    if body["otp"].as_str() != Some(OTP) {
        return reject(StatusCode::BAD_REQUEST, "Invalid otp");
    }

    let mut data = data.lock().unwrap();
    let user_id = body["userId"].as_str().unwrap_or_default();
    let Some((_, user)) = data
        .accounts
        .values_mut()
        .find(|(_, user)| user["id"].as_str() == Some(user_id))
    else {
        return reject(StatusCode::NOT_FOUND, "User not found");
    };
    user["isVerified"] = json!(true);
    let token = access_token(user_id);
    Json(json!({ "accessToken": token, "user": user.clone() })).into_response()
}

async fn list_roles(State(data): State<Shared>, headers: HeaderMap) -> Response {
    record(&data, &headers, "GET /roles");
    Json(Value::Array(data.lock().unwrap().roles.clone())).into_response()
}

async fn create_role(
    State(data): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(&data, &headers, "POST /roles");
    let mut data = data.lock().unwrap();
    let name = body["name"].as_str().unwrap_or_default();
    if data.roles.iter().any(|role| role["name"].as_str() == Some(name)) {
        return reject(StatusCode::CONFLICT, "Role already exists");
    }
    let role = profile(name, body["hasPermission"].as_str().unwrap_or_default());
    data.roles.push(role.clone());
    (StatusCode::CREATED, Json(role)).into_response()
}

async fn list_users(State(data): State<Shared>, headers: HeaderMap) -> Response {
    record(&data, &headers, "GET /users");
    let data = data.lock().unwrap();
    let users: Vec<Value> = data.accounts.values().map(|(_, user)| user.clone()).collect();
    Json(Value::Array(users)).into_response()
}

fn role_by_id(data: &MockData, role_id: &str) -> Option<Value> {
    data.roles
        .iter()
        .find(|role| role["id"].as_str() == Some(role_id))
        .cloned()
}

async fn create_user(
    State(data): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(&data, &headers, "POST /users/new");
    let mut data = data.lock().unwrap();
    let Some(role) = role_by_id(&data, body["roleId"].as_str().unwrap_or_default()) else {
        return reject(StatusCode::BAD_REQUEST, "Role not found");
    };
    let mobile = body["mobile"].as_str().unwrap_or_default().to_string();
    let user = account(&mobile, body["name"].as_str().unwrap_or_default(), "user", Some(role));
    let password = body["password"].as_str().unwrap_or_default().to_string();
    data.accounts.insert(mobile, (password, user.clone()));
    (StatusCode::CREATED, Json(user)).into_response()
}

async fn update_user(
    State(data): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    record(&data, &headers, "PATCH /users/:id");
    let mut data = data.lock().unwrap();
    let role = role_by_id(&data, body["roleId"].as_str().unwrap_or_default());
    let Some((_, user)) = data
        .accounts
        .values_mut()
        .find(|(_, user)| user["id"].as_str() == Some(id.as_str()))
    else {
        return reject(StatusCode::NOT_FOUND, "User not found");
    };
    if let Some(mobile) = body["mobile"].as_str() {
        user["mobile"] = json!(mobile);
    }
    if let Some(name) = body["name"].as_str() {
        user["name"] = json!(name);
    }
    if let Some(role) = role {
        user["accessController"] = role;
    }
    Json(user.clone()).into_response()
}

async fn list_tasks(State(data): State<Shared>, headers: HeaderMap) -> Response {
    record(&data, &headers, "GET /tasks");
    Json(Value::Array(data.lock().unwrap().tasks.clone())).into_response()
}

async fn create_task(
    State(data): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    record(&data, &headers, "POST /tasks");
    let task = json!({
        "id": Uuid::new_v4(),
        "name": body["name"],
        "createdAt": chrono::Utc::now(),
    });
    data.lock().unwrap().tasks.push(task.clone());
    (StatusCode::CREATED, Json(task)).into_response()
}

/// Starts the mock API on an ephemeral port with three seeded accounts:
/// an admin, a clerk holding `task.view,task.create`, and an outsider
/// holding only an identifier the dashboard does not know.
pub async fn spawn_mock_api() -> Result<MockApi> {
    let mut seed = MockData::default();
    let clerk_profile = profile("Clerk", "task.view,task.create");
    seed.roles.push(clerk_profile.clone());
    seed.tasks.push(json!({ "id": Uuid::new_v4(), "name": "Seeded task" }));
    for (mobile, name, role, profile) in [
        (ADMIN_MOBILE, "Admin", "admin", None),
        (CLERK_MOBILE, "Clerk", "user", Some(clerk_profile)),
        (OUTSIDER_MOBILE, "Outsider", "user", Some(profile("Reports", "reports.view"))),
    ] {
        seed.accounts.insert(
            mobile.to_string(),
            (PASSWORD.to_string(), account(mobile, name, role, profile)),
        );
    }

    let data: Shared = Arc::new(Mutex::new(seed));
    let router = Router::new()
        .route("/users/login", post(login))
        .route("/users", post(register).get(list_users))
        .route("/users/verify", post(verify))
        .route("/users/new", post(create_user))
        .route("/users/:id", patch(update_user))
        .route("/roles", get(list_roles).post(create_role))
        .route("/tasks", get(list_tasks).post(create_task))
        .with_state(data.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, router).await;
    });

    Ok(MockApi {
        base_url: format!("http://{addr}"),
        data,
    })
}

#[derive(Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }
}

pub fn test_config(api: &MockApi) -> Config {
    Config::new(api.base_url.clone())
        .with_forced_logout_delay(Duration::from_millis(50))
        .with_auth_header_policy(AuthHeaderPolicy::OmitWhenMissing)
}

/// App state over a memory token store, wired to the mock API.
pub fn memory_app(config: Config) -> Result<(AppState, Arc<RecordingNavigator>)> {
    let navigator = Arc::new(RecordingNavigator::default());
    let state = AppState::new(config, Arc::new(MemoryTokenStore::new()), navigator.clone())?;
    Ok((state, navigator))
}
