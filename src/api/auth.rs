//! Authentication endpoints. Each call is one request; nothing here retries.

use super::client::{ApiClient, ApiError};
use super::dto::{AdminLoginRequest, AdminSetupRequest, AuthResponse, LoginRequest, RegisterRequest, TokenResponse};
use crate::identity::Identity;

pub const LOGIN_PATH: &str = "/api/auth/login";
pub const REGISTER_PATH: &str = "/api/auth/register";
pub const PROFILE_PATH: &str = "/api/auth/profile";
pub const ADMIN_LOGIN_PATH: &str = "/api/admin/login";
pub const ADMIN_SETUP_PATH: &str = "/api/admin/setup";

pub async fn login(client: &ApiClient, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
    let resp: AuthResponse = client.post_json(LOGIN_PATH, &LoginRequest { email, password }).await?;
    require_token(&resp.token)?;
    Ok(resp)
}

pub async fn register(client: &ApiClient, name: &str, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
    let resp: AuthResponse = client.post_json(REGISTER_PATH, &RegisterRequest { name, email, password }).await?;
    require_token(&resp.token)?;
    Ok(resp)
}

pub async fn profile(client: &ApiClient) -> Result<Identity, ApiError> {
    client.get_json(PROFILE_PATH, &[]).await
}

pub async fn admin_login(client: &ApiClient, password: &str) -> Result<TokenResponse, ApiError> {
    let resp: TokenResponse = client.post_json(ADMIN_LOGIN_PATH, &AdminLoginRequest { password }).await?;
    require_token(&resp.token)?;
    Ok(resp)
}

pub async fn admin_setup(client: &ApiClient, username: &str, password: &str) -> Result<TokenResponse, ApiError> {
    let resp: TokenResponse = client.post_json(ADMIN_SETUP_PATH, &AdminSetupRequest { username, password }).await?;
    require_token(&resp.token)?;
    Ok(resp)
}

fn require_token(token: &str) -> Result<(), ApiError> {
    if token.trim().is_empty() {
        return Err(ApiError::Decode("response carried an empty token".into()));
    }
    Ok(())
}
