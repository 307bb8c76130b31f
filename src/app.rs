use std::sync::Arc;

use crate::authz::{DefaultPolicyEvaluator, PolicyEvaluator};
use crate::cache::EntityCache;
use crate::client::ApiClient;
use crate::config::Config;
use crate::db::{SqliteTokenStore, TokenStore};
use crate::errors::AppResult;
use crate::guard::{Navigator, RouteGuard};
use crate::session::SessionStore;

/// Everything a view needs, passed in explicitly.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub session: SessionStore,
    pub client: ApiClient,
    pub cache: EntityCache,
    pub evaluator: Arc<dyn PolicyEvaluator>,
    pub navigator: Arc<dyn Navigator>,
}

impl AppState {
    pub fn new(
        config: Config,
        store: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> AppResult<Self> {
        let client = ApiClient::new(&config, Arc::clone(&store))?;
        let session = SessionStore::new(store);

        Ok(Self {
            config: Arc::new(config),
            session,
            client,
            cache: EntityCache::new(),
            evaluator: Arc::new(DefaultPolicyEvaluator::new()),
            navigator,
        })
    }

    /// Guard for the dashboard region, using the configured logout delay.
    pub fn route_guard(&self) -> RouteGuard {
        RouteGuard::new(
            self.session.clone(),
            Arc::clone(&self.evaluator),
            Arc::clone(&self.navigator),
            self.config.forced_logout_delay,
        )
    }
}

/// Opens the persistent token store and restores any saved session.
pub async fn create_app(config: Config, navigator: Arc<dyn Navigator>) -> AppResult<AppState> {
    let store = SqliteTokenStore::connect(&config.session_db).await?;
    let state = AppState::new(config, Arc::new(store), navigator)?;
    state.session.restore().await?;
    Ok(state)
}
