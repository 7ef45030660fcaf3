use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::domain::{BearerToken, Domain};
use super::principal::Identity;
use super::session::Session;
use super::token_store::TokenStore;
use crate::api::{self, ApiClient, AuthResponse};
use crate::catalog::Favorites;
use crate::error::{AppError, AppResult};

/// Owns the regular-user identity lifecycle.
///
/// Starts in `Loading`; `initialize()` resolves it to `Anonymous` or
/// `Authenticated`. Afterwards the session cycles between those two through
/// `login`, `register` and `logout`.
///
/// Suspending operations (`initialize`, `login`, `register`) are serialized by
/// an in-flight guard. A second `login`/`register` while one is pending fails
/// with `AppError::Busy` and changes nothing. Results that resolve after a
/// `logout()` or `close()` are discarded.
pub struct UserSessionManager {
    client: ApiClient,
    store: Arc<dyn TokenStore>,
    state: watch::Sender<Session>,
    in_flight: tokio::sync::Mutex<()>,
    // Bumped by every committed transition, by logout and by close.
    epoch: Mutex<u64>,
    initialized: AtomicBool,
    closed: AtomicBool,
}

impl UserSessionManager {
    pub fn new(client: ApiClient, store: Arc<dyn TokenStore>) -> Self {
        let (state, _) = watch::channel(Session::Loading);
        Self {
            client,
            store,
            state,
            in_flight: tokio::sync::Mutex::new(()),
            epoch: Mutex::new(0),
            initialized: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    pub fn session(&self) -> Session { self.state.borrow().clone() }

    pub fn identity(&self) -> Option<Identity> { self.state.borrow().identity().cloned() }

    pub fn subscribe(&self) -> watch::Receiver<Session> { self.state.subscribe() }

    /// User-domain HTTP client; carries the user bearer once authenticated.
    pub fn client(&self) -> &ApiClient { &self.client }

    /// Favorites of the signed-in user.
    pub fn favorites(&self) -> Favorites<'_> { Favorites::new(self) }

    /// True while a login, register or initialize is pending.
    pub fn is_busy(&self) -> bool { self.in_flight.try_lock().is_err() }

    /// Startup rehydration. Runs once per manager; later calls return the
    /// current session untouched.
    ///
    /// Any failure (store read, network, 401, malformed profile) clears the
    /// persisted token and resolves to `Anonymous`; it is never reported as an
    /// error.
    pub async fn initialize(&self) -> Session {
        if self.initialized.swap(true, Ordering::SeqCst) {
            warn!(target: "recipebox::session", "initialize called more than once; ignoring");
            return self.session();
        }
        let _guard = self.in_flight.lock().await;
        if self.session() != Session::Loading {
            // A login or register finished while we were queued.
            return self.session();
        }
        let started = self.current_epoch();

        let token = match self.store.get(Domain::User) {
            Ok(Some(t)) if !t.is_empty() => t,
            Ok(_) => {
                let _ = self.commit(started, || {
                    self.state.send_replace(Session::Anonymous);
                    Ok(())
                });
                debug!(target: "recipebox::session", "no persisted user token; anonymous");
                return self.session();
            }
            Err(e) => {
                warn!(target: "recipebox::session", "token store unreadable, starting anonymous: {}", e);
                let _ = self.commit(started, || {
                    self.state.send_replace(Session::Anonymous);
                    Ok(())
                });
                return self.session();
            }
        };

        self.client.authorizer().set_bearer(token);
        let outcome = api::auth::profile(&self.client).await;

        let committed = match outcome {
            Ok(identity) => self.commit(started, || {
                info!(target: "recipebox::session", user_id = %identity.id, "session restored");
                self.state.send_replace(Session::Authenticated(identity));
                Ok(())
            }),
            Err(e) => {
                let reason = AppError::session_invalid("profile_fetch_failed".to_string(), e.to_string());
                self.commit(started, || {
                    warn!(target: "recipebox::session", "discarding persisted token: {}", reason);
                    self.discard_credentials();
                    self.state.send_replace(Session::Anonymous);
                    Ok(())
                })
            }
        };
        if committed.is_err() {
            debug!(target: "recipebox::session", "profile response arrived after a newer transition; discarded");
        }
        self.session()
    }

    pub async fn login(&self, email: &str, password: &str) -> AppResult<Identity> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AppError::validation("missing_credentials", "Email and password are required"));
        }
        let _guard = self.in_flight.try_lock().map_err(|_| AppError::busy())?;
        let started = self.current_epoch();

        let resp = api::auth::login(&self.client, email, password)
            .await
            .map_err(|e| {
                info!(target: "recipebox::session", "login rejected: {}", e);
                AppError::from_credential_exchange(e, "login_failed", "Login failed")
            })?;
        self.establish(started, resp)
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> AppResult<Identity> {
        let (name, email) = (name.trim(), email.trim());
        if name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AppError::validation("missing_fields", "Name, email and password are required"));
        }
        let _guard = self.in_flight.try_lock().map_err(|_| AppError::busy())?;
        let started = self.current_epoch();

        let resp = api::auth::register(&self.client, name, email, password)
            .await
            .map_err(|e| {
                info!(target: "recipebox::session", "registration rejected: {}", e);
                AppError::from_credential_exchange(e, "registration_failed", "Registration failed")
            })?;
        self.establish(started, resp)
    }

    /// Local only: clears the persisted token, the authorizer and the identity.
    /// Always succeeds and is idempotent.
    pub fn logout(&self) {
        let mut epoch = self.epoch.lock();
        *epoch += 1;
        self.discard_credentials();
        self.state.send_replace(Session::Anonymous);
        info!(target: "recipebox::session", "logged out");
    }

    /// Detach the consumer: anything still in flight resolves without
    /// touching state.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        *self.epoch.lock() += 1;
    }

    fn establish(&self, started: u64, resp: AuthResponse) -> AppResult<Identity> {
        let AuthResponse { token, identity } = resp;
        let token = BearerToken::new(token);
        self.commit(started, || {
            self.store.set(Domain::User, &token)?;
            self.client.authorizer().set_bearer(token);
            info!(target: "recipebox::session", user_id = %identity.id, "authenticated");
            self.state.send_replace(Session::Authenticated(identity.clone()));
            Ok(identity)
        })
    }

    fn discard_credentials(&self) {
        if let Err(e) = self.store.clear(Domain::User) {
            warn!(target: "recipebox::session", "failed to clear persisted user token: {}", e);
        }
        self.client.authorizer().clear_bearer();
    }

    fn current_epoch(&self) -> u64 { *self.epoch.lock() }

    /// Apply `f` only if no other transition happened since `started`.
    fn commit<T>(&self, started: u64, f: impl FnOnce() -> AppResult<T>) -> AppResult<T> {
        let mut epoch = self.epoch.lock();
        if *epoch != started || self.closed.load(Ordering::SeqCst) {
            return Err(AppError::superseded());
        }
        let out = f()?;
        *epoch += 1;
        Ok(out)
    }
}
