//! In-process fake of the recipebox backend for integration tests.
//! Binds 127.0.0.1:0, counts hits per route, and can delay the login, profile
//! and admin login/setup responses to exercise in-flight and stale-response handling.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::task::JoinHandle;

use recipebox::api::ApiClient;
use recipebox::identity::{AdminSessionManager, Domain, TokenStore, UserSessionManager};

#[derive(Clone)]
pub struct UserRec {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Default)]
pub struct FakeState {
    users: Mutex<Vec<UserRec>>,
    // token -> email
    user_tokens: Mutex<HashMap<String, String>>,
    admin: Mutex<Option<(String, String)>>,
    admin_tokens: Mutex<Vec<String>>,
    favorites: Mutex<HashMap<String, Vec<String>>>,
    recipes: Mutex<Vec<Value>>,
    hits: Mutex<HashMap<&'static str, usize>>,
    // Authorization header values received, per route, in arrival order.
    bearers: Mutex<HashMap<&'static str, Vec<Option<String>>>>,
    delay_ms: AtomicU64,
    next_id: AtomicU64,
}

impl FakeState {
    fn hit(&self, route: &'static str) {
        *self.hits.lock().entry(route).or_insert(0) += 1;
    }

    pub fn hits(&self, route: &'static str) -> usize {
        self.hits.lock().get(route).copied().unwrap_or(0)
    }

    /// Bearer tokens presented on `route`, in arrival order.
    pub fn bearers_seen(&self, route: &'static str) -> Vec<Option<String>> {
        self.bearers.lock().get(route).cloned().unwrap_or_default()
    }

    fn record_bearer(&self, route: &'static str, headers: &HeaderMap) {
        self.bearers.lock().entry(route).or_default().push(bearer(headers));
    }

    pub fn total_hits(&self) -> usize { self.hits.lock().values().sum() }

    pub fn set_delay(&self, d: Duration) { self.delay_ms.store(d.as_millis() as u64, Ordering::SeqCst); }

    async fn maybe_delay(&self) {
        let ms = self.delay_ms.load(Ordering::SeqCst);
        if ms > 0 { tokio::time::sleep(Duration::from_millis(ms)).await; }
    }

    fn next(&self) -> u64 { self.next_id.fetch_add(1, Ordering::SeqCst) + 1 }

    pub fn seed_user(&self, id: &str, name: &str, email: &str, password: &str) {
        self.users.lock().push(UserRec { id: id.into(), name: name.into(), email: email.into(), password: password.into() });
    }

    pub fn seed_admin(&self, username: &str, password: &str) {
        *self.admin.lock() = Some((username.into(), password.into()));
    }

    pub fn seed_recipe(&self, id: &str, title: &str, ingredients: &[&str], cooking_time: u32) {
        self.recipes.lock().push(json!({
            "_id": id, "title": title, "ingredients": ingredients,
            "instructions": "Cook it.", "cookingTime": cooking_time, "servings": 2
        }));
    }

    pub fn recipe_titles(&self) -> Vec<String> {
        self.recipes.lock().iter().filter_map(|r| r["title"].as_str().map(str::to_string)).collect()
    }

    fn issue_user_token(&self, email: &str) -> String {
        let t = format!("user-tok-{}", self.next());
        self.user_tokens.lock().insert(t.clone(), email.to_string());
        t
    }

    fn issue_admin_token(&self) -> String {
        let t = format!("admin-tok-{}", self.next());
        self.admin_tokens.lock().push(t.clone());
        t
    }

    /// Forget every issued admin token, as a backend restart with a new secret would.
    pub fn revoke_admin_tokens(&self) { self.admin_tokens.lock().clear(); }

    fn user_for(&self, headers: &HeaderMap) -> Option<UserRec> {
        let token = bearer(headers)?;
        let email = self.user_tokens.lock().get(&token).cloned()?;
        self.users.lock().iter().find(|u| u.email == email).cloned()
    }

    fn is_admin(&self, headers: &HeaderMap) -> bool {
        bearer(headers).map(|t| self.admin_tokens.lock().contains(&t)).unwrap_or(false)
    }
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

fn fail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

fn user_json(u: &UserRec) -> Value {
    json!({ "id": u.id, "name": u.name, "email": u.email })
}

#[derive(Deserialize)]
struct LoginBody { email: String, password: String }

#[derive(Deserialize)]
struct RegisterBody { name: String, email: String, password: String }

#[derive(Deserialize)]
struct AdminLoginBody { password: String }

#[derive(Deserialize)]
struct AdminSetupBody { username: String, password: String }

async fn login(State(st): State<Arc<FakeState>>, Json(b): Json<LoginBody>) -> Response {
    st.hit("login");
    st.maybe_delay().await;
    let found = st.users.lock().iter().find(|u| u.email == b.email && u.password == b.password).cloned();
    match found {
        Some(u) => {
            let mut body = user_json(&u);
            body["token"] = json!(st.issue_user_token(&u.email));
            Json(body).into_response()
        }
        None => fail(StatusCode::BAD_REQUEST, "Invalid credentials"),
    }
}

async fn register(State(st): State<Arc<FakeState>>, Json(b): Json<RegisterBody>) -> Response {
    st.hit("register");
    if st.users.lock().iter().any(|u| u.email == b.email) {
        return fail(StatusCode::BAD_REQUEST, "User already exists");
    }
    let u = UserRec { id: st.next().to_string(), name: b.name, email: b.email, password: b.password };
    st.users.lock().push(u.clone());
    let mut body = user_json(&u);
    body["token"] = json!(st.issue_user_token(&u.email));
    (StatusCode::CREATED, Json(body)).into_response()
}

async fn profile(State(st): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    st.hit("profile");
    st.record_bearer("profile", &headers);
    st.maybe_delay().await;
    match st.user_for(&headers) {
        Some(u) => Json(user_json(&u)).into_response(),
        None => fail(StatusCode::UNAUTHORIZED, "Not authorized, token failed"),
    }
}

async fn admin_login(State(st): State<Arc<FakeState>>, Json(b): Json<AdminLoginBody>) -> Response {
    st.hit("admin_login");
    st.maybe_delay().await;
    let ok = st.admin.lock().as_ref().map(|(_, pw)| *pw == b.password).unwrap_or(false);
    if !ok {
        return fail(StatusCode::UNAUTHORIZED, "Invalid admin password");
    }
    Json(json!({ "token": st.issue_admin_token() })).into_response()
}

async fn admin_setup(State(st): State<Arc<FakeState>>, Json(b): Json<AdminSetupBody>) -> Response {
    st.hit("admin_setup");
    st.maybe_delay().await;
    {
        let mut admin = st.admin.lock();
        if admin.is_some() {
            return fail(StatusCode::BAD_REQUEST, "Admin already exists");
        }
        *admin = Some((b.username, b.password));
    }
    Json(json!({ "token": st.issue_admin_token() })).into_response()
}

fn recipe_from_draft(id: String, draft: &Value) -> Value {
    let ingredients: Vec<String> = draft["ingredients"]
        .as_str()
        .unwrap_or("")
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    json!({
        "_id": id,
        "title": draft["title"],
        "ingredients": ingredients,
        "instructions": draft["instructions"],
        "cookingTime": draft["cookingTime"],
        "servings": draft["servings"],
    })
}

async fn admin_list(State(st): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    st.hit("admin_recipes");
    if !st.is_admin(&headers) { return fail(StatusCode::UNAUTHORIZED, "Not authorized as admin"); }
    Json(Value::Array(st.recipes.lock().clone())).into_response()
}

async fn admin_create(State(st): State<Arc<FakeState>>, headers: HeaderMap, Json(draft): Json<Value>) -> Response {
    st.hit("admin_recipes");
    if !st.is_admin(&headers) { return fail(StatusCode::UNAUTHORIZED, "Not authorized as admin"); }
    let recipe = recipe_from_draft(format!("r{}", st.next()), &draft);
    st.recipes.lock().push(recipe.clone());
    (StatusCode::CREATED, Json(recipe)).into_response()
}

async fn admin_update(State(st): State<Arc<FakeState>>, headers: HeaderMap, Path(id): Path<String>, Json(draft): Json<Value>) -> Response {
    st.hit("admin_recipes");
    if !st.is_admin(&headers) { return fail(StatusCode::UNAUTHORIZED, "Not authorized as admin"); }
    let mut recipes = st.recipes.lock();
    match recipes.iter_mut().find(|r| r["_id"] == id.as_str()) {
        Some(r) => {
            *r = recipe_from_draft(id, &draft);
            Json(r.clone()).into_response()
        }
        None => fail(StatusCode::NOT_FOUND, "Recipe not found"),
    }
}

async fn admin_delete(State(st): State<Arc<FakeState>>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    st.hit("admin_recipes");
    if !st.is_admin(&headers) { return fail(StatusCode::UNAUTHORIZED, "Not authorized as admin"); }
    let mut recipes = st.recipes.lock();
    let before = recipes.len();
    recipes.retain(|r| r["_id"] != id.as_str());
    if recipes.len() == before {
        return fail(StatusCode::NOT_FOUND, "Recipe not found");
    }
    Json(json!({ "message": "Recipe removed" })).into_response()
}

async fn search(State(st): State<Arc<FakeState>>, Query(q): Query<HashMap<String, String>>) -> Response {
    st.hit("recipes");
    let wanted: Vec<String> = q
        .get("ingredients")
        .or_else(|| q.get("ingredient"))
        .map(|s| s.split(',').map(|p| p.trim().to_lowercase()).collect())
        .unwrap_or_default();
    // quick: <= 15, medium: 16..=60, long: > 60
    let band = q.get("cookingTime").cloned();
    let out: Vec<Value> = st
        .recipes
        .lock()
        .iter()
        .filter(|r| {
            let ings: Vec<String> = r["ingredients"]
                .as_array()
                .map(|a| a.iter().filter_map(|v| v.as_str()).map(str::to_lowercase).collect())
                .unwrap_or_default();
            wanted.iter().all(|w| ings.iter().any(|i| i.contains(w.as_str())))
        })
        .filter(|r| {
            let t = r["cookingTime"].as_u64().unwrap_or(0);
            match band.as_deref() {
                Some("quick") => t <= 15,
                Some("medium") => t > 15 && t <= 60,
                Some("long") => t > 60,
                _ => true,
            }
        })
        .cloned()
        .collect();
    Json(Value::Array(out)).into_response()
}

async fn favorites_list(State(st): State<Arc<FakeState>>, headers: HeaderMap) -> Response {
    st.hit("favorites");
    let Some(u) = st.user_for(&headers) else { return fail(StatusCode::UNAUTHORIZED, "Not authorized"); };
    let ids = st.favorites.lock().get(&u.email).cloned().unwrap_or_default();
    let recipes: Vec<Value> = st.recipes.lock().iter().filter(|r| ids.iter().any(|id| r["_id"] == id.as_str())).cloned().collect();
    Json(Value::Array(recipes)).into_response()
}

async fn favorites_add(State(st): State<Arc<FakeState>>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    st.hit("favorites");
    let Some(u) = st.user_for(&headers) else { return fail(StatusCode::UNAUTHORIZED, "Not authorized"); };
    let mut favs = st.favorites.lock();
    let list = favs.entry(u.email).or_default();
    if !list.contains(&id) { list.push(id); }
    Json(json!({ "message": "Added to favorites" })).into_response()
}

async fn favorites_remove(State(st): State<Arc<FakeState>>, headers: HeaderMap, Path(id): Path<String>) -> Response {
    st.hit("favorites");
    let Some(u) = st.user_for(&headers) else { return fail(StatusCode::UNAUTHORIZED, "Not authorized"); };
    if let Some(list) = st.favorites.lock().get_mut(&u.email) { list.retain(|f| *f != id); }
    Json(json!({ "message": "Removed from favorites" })).into_response()
}

pub struct FakeBackend {
    pub base: String,
    pub state: Arc<FakeState>,
    handle: JoinHandle<()>,
}

impl Drop for FakeBackend {
    fn drop(&mut self) { self.handle.abort(); }
}

impl FakeBackend {
    pub async fn start() -> Self {
        let state = Arc::new(FakeState::default());
        let app = Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/auth/register", post(register))
            .route("/api/auth/profile", get(profile))
            .route("/api/admin/login", post(admin_login))
            .route("/api/admin/setup", post(admin_setup))
            .route("/api/admin/recipes", get(admin_list).post(admin_create))
            .route("/api/admin/recipes/{id}", put(admin_update).delete(admin_delete))
            .route("/api/recipes", get(search))
            .route("/api/favorites", get(favorites_list))
            .route("/api/favorites/{id}", post(favorites_add).delete(favorites_remove))
            .with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind 127.0.0.1:0");
        let addr = listener.local_addr().expect("local addr");
        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("fake backend error: {e:?}");
            }
        });
        Self { base: format!("http://{}", addr), state, handle }
    }

    pub fn client(&self, domain: Domain) -> ApiClient {
        ApiClient::new(self.base.parse().expect("base url"), domain, Duration::from_secs(5)).expect("client")
    }

    pub fn user_manager(&self, store: Arc<dyn TokenStore>) -> UserSessionManager {
        UserSessionManager::new(self.client(Domain::User), store)
    }

    pub fn admin_manager(&self, store: Arc<dyn TokenStore>) -> AdminSessionManager {
        AdminSessionManager::new(self.client(Domain::Admin), store)
    }
}

/// Base URL of a port nothing listens on.
pub fn dead_base() -> String {
    let l = std::net::TcpListener::bind(("127.0.0.1", 0)).expect("bind 127.0.0.1:0");
    let port = l.local_addr().unwrap().port();
    drop(l);
    format!("http://127.0.0.1:{}", port)
}
