use serde::{Deserialize, Deserializer, Serialize};

use crate::identity::Identity;

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct AdminLoginRequest<'a> {
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct AdminSetupRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// `{ token, id, name, email }` from login and register.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(flatten)]
    pub identity: Identity,
}

/// `{ token }` from the admin endpoints.
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Ids arrive as strings from some backends and as numbers from others.
pub fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(d)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("expected string or number id, got {}", other))),
    }
}
