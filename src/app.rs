//! Application context: one token store, one HTTP client per identity domain,
//! and the two session managers built on them.

use std::sync::Arc;

use tracing::info;

use crate::api::ApiClient;
use crate::catalog::{self, Recipe, RecipeQuery};
use crate::config::ClientConfig;
use crate::error::{AppError, AppResult};
use crate::identity::{AdminSessionManager, Domain, FileTokenStore, Session, TokenStore, UserSessionManager};

pub struct RecipeBox {
    config: ClientConfig,
    users: Arc<UserSessionManager>,
    admin: Arc<AdminSessionManager>,
}

impl RecipeBox {
    /// Tokens persist in `<state_dir>/tokens.json`.
    pub fn open(config: ClientConfig) -> AppResult<Self> {
        let store: Arc<dyn TokenStore> = Arc::new(FileTokenStore::new(config.token_file()));
        Self::with_store(config, store)
    }

    pub fn with_store(config: ClientConfig, store: Arc<dyn TokenStore>) -> AppResult<Self> {
        // Separate clients: the user and admin bearers never share a slot.
        let user_client = ApiClient::from_config(&config, Domain::User).map_err(AppError::from)?;
        let admin_client = ApiClient::from_config(&config, Domain::Admin).map_err(AppError::from)?;
        let users = Arc::new(UserSessionManager::new(user_client, store.clone()));
        let admin = Arc::new(AdminSessionManager::new(admin_client, store));
        Ok(Self { config, users, admin })
    }

    /// Startup: rehydrate the user session. Admin state is checked lazily by
    /// admin views through `AdminSessionManager::initialize`.
    pub async fn start(&self) -> Session {
        info!(
            target: "recipebox",
            "recipebox starting: api={}, state_dir={}",
            self.config.api_base, self.config.state_dir.display()
        );
        self.users.initialize().await
    }

    pub fn config(&self) -> &ClientConfig { &self.config }
    pub fn users(&self) -> &Arc<UserSessionManager> { &self.users }
    pub fn admin(&self) -> &Arc<AdminSessionManager> { &self.admin }

    /// Shutdown: responses still in flight on either manager are dropped.
    pub fn close(&self) {
        self.users.close();
        self.admin.close();
    }

    /// Public recipe search; no authorization required.
    pub async fn search_recipes(&self, query: &RecipeQuery) -> AppResult<Vec<Recipe>> {
        catalog::search(self.users.client(), query).await
    }
}
