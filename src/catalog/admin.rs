//! Admin recipe endpoints. Callers go through `AdminSessionManager`, which
//! owns the admin client and handles token rejection.

use reqwest::Method;

use crate::api::{ApiClient, ApiError};

use super::{Recipe, RecipeDraft};

pub const ADMIN_RECIPES_PATH: &str = "/api/admin/recipes";

fn item_path(id: &str) -> String {
    format!("{}/{}", ADMIN_RECIPES_PATH, urlencoding::encode(id))
}

pub async fn list(client: &ApiClient) -> Result<Vec<Recipe>, ApiError> {
    client.get_json(ADMIN_RECIPES_PATH, &[]).await
}

pub async fn create(client: &ApiClient, draft: &RecipeDraft) -> Result<(), ApiError> {
    client.send_json(Method::POST, ADMIN_RECIPES_PATH, draft).await
}

pub async fn update(client: &ApiClient, id: &str, draft: &RecipeDraft) -> Result<(), ApiError> {
    client.send_json(Method::PUT, &item_path(id), draft).await
}

pub async fn delete(client: &ApiClient, id: &str) -> Result<(), ApiError> {
    client.delete(&item_path(id)).await
}
