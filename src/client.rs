//! Remote client for the admin REST API.
//!
//! Every request passes through one hook that attaches the bearer token from
//! the token store. There is no response hook: each call maps a non-2xx
//! reply to [`AppError::Api`] carrying the server's `message`.

use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::config::{AuthHeaderPolicy, Config};
use crate::db::TokenStore;
use crate::errors::{AppError, AppResult};
use crate::models::rbac::{AccessProfile, RoleCreateRequest};
use crate::models::task::{Task, TaskCreateRequest};
use crate::models::user::{
    AuthResponse, CreateUserRequest, LoginRequest, RegisterRequest, RegisterResponse,
    UpdateUserRequest, User, VerifyOtpRequest,
};
use crate::session::AUTH_TOKEN_KEY;

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    policy: AuthHeaderPolicy,
}

impl ApiClient {
    pub fn new(config: &Config, tokens: Arc<dyn TokenStore>) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            tokens,
            policy: config.auth_header_policy,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Request hook: attach `Authorization: Bearer <token>`.
    async fn authorize(&self, request: RequestBuilder) -> AppResult<RequestBuilder> {
        let token = self.tokens.get(AUTH_TOKEN_KEY).await?;
        Ok(match (token, self.policy) {
            (Some(token), _) => request.bearer_auth(token),
            (None, AuthHeaderPolicy::Always) => request.header(AUTHORIZATION, "Bearer null"),
            (None, AuthHeaderPolicy::OmitWhenMissing) => request,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let request = self.http.request(Method::GET, self.url(path));
        self.execute(Method::GET, path, request).await
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> AppResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.http.request(method.clone(), self.url(path)).json(body);
        self.execute(method, path, request).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        request: RequestBuilder,
    ) -> AppResult<T> {
        let request = self.authorize(request).await?;
        let response = request.send().await.map_err(|err| {
            tracing::warn!(%method, path, error = %err, "request failed");
            AppError::Network(err)
        })?;

        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            let message = error_message(status, &bytes);
            tracing::warn!(%method, path, status = status.as_u16(), %message, "request rejected");
            return Err(AppError::api(status, message));
        }

        tracing::debug!(%method, path, status = status.as_u16(), "request succeeded");
        decode_body(&bytes)
    }

    // -------------------------------------------------------------------------
    // Auth
    // -------------------------------------------------------------------------

    pub async fn login(&self, request: &LoginRequest) -> AppResult<AuthResponse> {
        self.send_json(Method::POST, "/users/login", request).await
    }

    pub async fn register(&self, request: &RegisterRequest) -> AppResult<RegisterResponse> {
        self.send_json(Method::POST, "/users", request).await
    }

    pub async fn verify_otp(&self, request: &VerifyOtpRequest) -> AppResult<AuthResponse> {
        self.send_json(Method::POST, "/users/verify", request).await
    }

    // -------------------------------------------------------------------------
    // Roles
    // -------------------------------------------------------------------------

    pub async fn list_roles(&self) -> AppResult<Vec<AccessProfile>> {
        self.get("/roles").await
    }

    pub async fn create_role(&self, request: &RoleCreateRequest) -> AppResult<AccessProfile> {
        self.send_json(Method::POST, "/roles", request).await
    }

    // -------------------------------------------------------------------------
    // Users
    // -------------------------------------------------------------------------

    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.get("/users").await
    }

    pub async fn create_user(&self, request: &CreateUserRequest) -> AppResult<User> {
        self.send_json(Method::POST, "/users/new", request).await
    }

    pub async fn update_user(&self, id: Uuid, request: &UpdateUserRequest) -> AppResult<User> {
        self.send_json(Method::PATCH, &format!("/users/{id}"), request).await
    }

    // -------------------------------------------------------------------------
    // Tasks
    // -------------------------------------------------------------------------

    pub async fn list_tasks(&self) -> AppResult<Vec<Task>> {
        self.get("/tasks").await
    }

    pub async fn create_task(&self, request: &TaskCreateRequest) -> AppResult<Task> {
        self.send_json(Method::POST, "/tasks", request).await
    }
}

fn decode_body<T: DeserializeOwned>(bytes: &[u8]) -> AppResult<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|err| AppError::decode(format!("{} at `{}`", err.inner(), err.path())))
}

/// Human-readable text of a rejected call.
///
/// Prefers the body's `message` field (a string, or a list of strings
/// joined with `, `), then the raw body, then the status reason.
fn error_message(status: StatusCode, bytes: &[u8]) -> String {
    if let Ok(body) = serde_json::from_slice::<Value>(bytes) {
        match body.get("message") {
            Some(Value::String(message)) => return message.clone(),
            Some(Value::Array(items)) => {
                let joined = items
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                if !joined.is_empty() {
                    return joined;
                }
            }
            _ => {}
        }
    }

    let text = String::from_utf8_lossy(bytes).trim().to_string();
    if !text.is_empty() && text.len() <= 200 {
        return text;
    }

    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("request failed with status {}", status.as_u16()))
}
