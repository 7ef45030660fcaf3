use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{info, warn};

use super::domain::{BearerToken, Domain};
use super::session::AdminSession;
use super::token_store::TokenStore;
use crate::api::{self, ApiClient, ApiError};
use crate::catalog::{self, Recipe, RecipeDraft};
use crate::error::{AppError, AppResult};

pub const MIN_ADMIN_PASSWORD_LEN: usize = 4;

/// Owns the admin identity lifecycle: `Anonymous` <-> `Authenticated`.
///
/// A persisted admin token is trusted on `initialize()` without asking the
/// server. The first admin call the dashboard makes is what verifies it: if the
/// server answers 401/403 the session is demoted, the token discarded, and the
/// caller gets `AppError::Auth`.
pub struct AdminSessionManager {
    client: ApiClient,
    store: Arc<dyn TokenStore>,
    state: watch::Sender<AdminSession>,
    in_flight: tokio::sync::Mutex<()>,
    epoch: Mutex<u64>,
    closed: AtomicBool,
}

impl AdminSessionManager {
    pub fn new(client: ApiClient, store: Arc<dyn TokenStore>) -> Self {
        let (state, _) = watch::channel(AdminSession::Anonymous);
        Self {
            client,
            store,
            state,
            in_flight: tokio::sync::Mutex::new(()),
            epoch: Mutex::new(0),
            closed: AtomicBool::new(false),
        }
    }

    pub fn session(&self) -> AdminSession { *self.state.borrow() }

    pub fn subscribe(&self) -> watch::Receiver<AdminSession> { self.state.subscribe() }

    pub fn client(&self) -> &ApiClient { &self.client }

    pub fn is_busy(&self) -> bool { self.in_flight.try_lock().is_err() }

    /// Synchronous check against the token store. `Anonymous` means the view
    /// should send the operator to the admin login.
    pub fn initialize(&self) -> AdminSession {
        let mut epoch = self.epoch.lock();
        let token = match self.store.get(Domain::Admin) {
            Ok(t) => t.filter(|t| !t.is_empty()),
            Err(e) => {
                warn!(target: "recipebox::admin", "token store unreadable, admin anonymous: {}", e);
                None
            }
        };
        let next = match token {
            Some(t) => {
                self.client.authorizer().set_bearer(t);
                AdminSession::Authenticated
            }
            None => {
                self.client.authorizer().clear_bearer();
                AdminSession::Anonymous
            }
        };
        *epoch += 1;
        self.state.send_replace(next);
        next
    }

    /// Gate for admin-only views.
    pub fn require_authenticated(&self) -> AppResult<()> {
        if self.session().is_authenticated() {
            Ok(())
        } else {
            Err(AppError::auth("admin_login_required", "Admin login required"))
        }
    }

    pub async fn login(&self, password: &str) -> AppResult<()> {
        if password.is_empty() {
            return Err(AppError::validation("missing_password", "Admin password is required"));
        }
        let _guard = self.in_flight.try_lock().map_err(|_| AppError::busy())?;
        let started = self.current_epoch();
        let resp = api::auth::admin_login(&self.client, password)
            .await
            .map_err(|e| {
                info!(target: "recipebox::admin", "admin login rejected: {}", e);
                AppError::from_credential_exchange(e, "admin_login_failed", "Login failed")
            })?;
        self.establish(started, BearerToken::new(resp.token))
    }

    /// One-time bootstrap of the admin account.
    ///
    /// Validation happens locally before any request. This manager does not
    /// know whether an admin already exists: the backend is required to reject
    /// `/api/admin/setup` once one has been created, and that rejection is
    /// surfaced like any other failed credential exchange.
    pub async fn setup(&self, username: &str, password: &str, confirm_password: &str) -> AppResult<()> {
        validate_setup(username, password, confirm_password)?;
        let _guard = self.in_flight.try_lock().map_err(|_| AppError::busy())?;
        let started = self.current_epoch();
        let resp = api::auth::admin_setup(&self.client, username.trim(), password)
            .await
            .map_err(|e| {
                info!(target: "recipebox::admin", "admin setup rejected: {}", e);
                AppError::from_credential_exchange(e, "admin_setup_failed", "Setup failed")
            })?;
        self.establish(started, BearerToken::new(resp.token))?;
        info!(target: "recipebox::admin", "Admin account created successfully!");
        Ok(())
    }

    /// Local only. Always succeeds.
    pub fn logout(&self) {
        let mut epoch = self.epoch.lock();
        *epoch += 1;
        self.discard_credentials();
        self.state.send_replace(AdminSession::Anonymous);
        info!(target: "recipebox::admin", "admin logged out");
    }

    /// Detach the admin view: pending login, setup or recipe calls resolve
    /// without touching the session or the token store.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        *self.epoch.lock() += 1;
    }

    pub async fn list_recipes(&self) -> AppResult<Vec<Recipe>> {
        self.require_authenticated()?;
        self.verified(catalog::admin::list(&self.client)).await
    }

    pub async fn create_recipe(&self, draft: &RecipeDraft) -> AppResult<()> {
        draft.validate()?;
        self.require_authenticated()?;
        self.verified(catalog::admin::create(&self.client, draft)).await
    }

    pub async fn update_recipe(&self, id: &str, draft: &RecipeDraft) -> AppResult<()> {
        draft.validate()?;
        self.require_authenticated()?;
        self.verified(catalog::admin::update(&self.client, id, draft)).await
    }

    pub async fn delete_recipe(&self, id: &str) -> AppResult<()> {
        self.require_authenticated()?;
        self.verified(catalog::admin::delete(&self.client, id)).await
    }

    /// Run an authorized admin call; a 401/403 demotes the session.
    async fn verified<T>(&self, call: impl Future<Output = Result<T, ApiError>>) -> AppResult<T> {
        let started = self.current_epoch();
        match call.await {
            Ok(v) => Ok(v),
            Err(e) if e.is_unauthorized() => {
                self.demote(started);
                Err(AppError::auth("admin_session_rejected", "Admin session is no longer valid. Please log in again."))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn demote(&self, started: u64) {
        let mut epoch = self.epoch.lock();
        if *epoch != started || self.closed.load(Ordering::SeqCst) {
            // Session already changed (logout, fresh login or teardown); that token is not ours to drop.
            return;
        }
        *epoch += 1;
        self.discard_credentials();
        self.state.send_replace(AdminSession::Anonymous);
        warn!(target: "recipebox::admin", "admin token rejected by server; demoted to anonymous");
    }

    fn establish(&self, started: u64, token: BearerToken) -> AppResult<()> {
        let mut epoch = self.epoch.lock();
        if *epoch != started || self.closed.load(Ordering::SeqCst) {
            return Err(AppError::superseded());
        }
        self.store.set(Domain::Admin, &token)?;
        self.client.authorizer().set_bearer(token);
        *epoch += 1;
        self.state.send_replace(AdminSession::Authenticated);
        info!(target: "recipebox::admin", "admin authenticated");
        Ok(())
    }

    fn discard_credentials(&self) {
        if let Err(e) = self.store.clear(Domain::Admin) {
            warn!(target: "recipebox::admin", "failed to clear persisted admin token: {}", e);
        }
        self.client.authorizer().clear_bearer();
    }

    fn current_epoch(&self) -> u64 { *self.epoch.lock() }
}

// Order: mismatch, then length, then username.
fn validate_setup(username: &str, password: &str, confirm_password: &str) -> AppResult<()> {
    if password != confirm_password {
        return Err(AppError::validation("password_mismatch", "Passwords do not match"));
    }
    if password.chars().count() < MIN_ADMIN_PASSWORD_LEN {
        return Err(AppError::validation("password_too_short", "Password must be at least 4 characters"));
    }
    if username.trim().is_empty() {
        return Err(AppError::validation("missing_username", "Admin username is required"));
    }
    Ok(())
}
