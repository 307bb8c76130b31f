use std::time::Duration;

use crate::errors::AppError;

const DEFAULT_SESSION_DB: &str = "sqlite://admin-console.db?mode=rwc";
const DEFAULT_LOGOUT_DELAY_MS: u64 = 1000;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// What the remote client sends when no token is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthHeaderPolicy {
    /// Send no `Authorization` header at all.
    #[default]
    OmitWhenMissing,
    /// Always send one, `Bearer null` when there is no token.
    Always,
}

impl AuthHeaderPolicy {
    pub fn parse(value: &str) -> Result<Self, AppError> {
        match value.trim().to_lowercase().as_str() {
            "" | "omit" => Ok(AuthHeaderPolicy::OmitWhenMissing),
            "always" => Ok(AuthHeaderPolicy::Always),
            other => Err(AppError::configuration(format!(
                "AUTH_HEADER_POLICY must be `omit` or `always`, got `{other}`"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub session_db: String,
    pub forced_logout_delay: Duration,
    pub auth_header_policy: AuthHeaderPolicy,
    pub request_timeout: Duration,
}

impl Config {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            session_db: DEFAULT_SESSION_DB.to_string(),
            forced_logout_delay: Duration::from_millis(DEFAULT_LOGOUT_DELAY_MS),
            auth_header_policy: AuthHeaderPolicy::default(),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }

    pub fn from_env() -> Result<Self, AppError> {
        let api_url = std::env::var("API_URL")
            .map_err(|_| AppError::configuration("API_URL not set"))?;
        let session_db =
            std::env::var("SESSION_DB").unwrap_or_else(|_| DEFAULT_SESSION_DB.to_string());
        let delay_ms = std::env::var("FORCED_LOGOUT_DELAY_MS")
            .map(|val| val.parse::<u64>())
            .unwrap_or(Ok(DEFAULT_LOGOUT_DELAY_MS))
            .map_err(|_| {
                AppError::configuration("FORCED_LOGOUT_DELAY_MS must be a valid integer")
            })?;
        let timeout_secs = std::env::var("REQUEST_TIMEOUT_SECS")
            .map(|val| val.parse::<u64>())
            .unwrap_or(Ok(DEFAULT_REQUEST_TIMEOUT_SECS))
            .map_err(|_| AppError::configuration("REQUEST_TIMEOUT_SECS must be a valid integer"))?;
        let auth_header_policy =
            AuthHeaderPolicy::parse(&std::env::var("AUTH_HEADER_POLICY").unwrap_or_default())?;

        Ok(Self {
            api_url,
            session_db,
            forced_logout_delay: Duration::from_millis(delay_ms),
            auth_header_policy,
            request_timeout: Duration::from_secs(timeout_secs),
        })
    }

    pub fn with_session_db(mut self, session_db: impl Into<String>) -> Self {
        self.session_db = session_db.into();
        self
    }

    pub fn with_forced_logout_delay(mut self, delay: Duration) -> Self {
        self.forced_logout_delay = delay;
        self
    }

    pub fn with_auth_header_policy(mut self, policy: AuthHeaderPolicy) -> Self {
        self.auth_header_policy = policy;
        self
    }
}
