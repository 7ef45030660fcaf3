use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::identity::UserSessionManager;

use super::Recipe;

pub const FAVORITES_PATH: &str = "/api/favorites";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteChange {
    Added,
    Removed,
}

/// Favorites of the signed-in user. Every call needs an authenticated user
/// session and goes out on the user client.
pub struct Favorites<'a> {
    users: &'a UserSessionManager,
}

impl<'a> Favorites<'a> {
    pub fn new(users: &'a UserSessionManager) -> Self { Self { users } }

    fn ensure_signed_in(&self) -> AppResult<()> {
        if self.users.session().is_authenticated() {
            Ok(())
        } else {
            Err(AppError::auth("login_required", "Please login or sign up to add recipes to favorites!"))
        }
    }

    pub async fn list(&self) -> AppResult<Vec<Recipe>> {
        self.ensure_signed_in()?;
        Ok(self.users.client().get_json(FAVORITES_PATH, &[]).await?)
    }

    pub async fn add(&self, recipe_id: &str) -> AppResult<()> {
        self.ensure_signed_in()?;
        let path = format!("{}/{}", FAVORITES_PATH, urlencoding::encode(recipe_id));
        Ok(self.users.client().post_empty(&path).await?)
    }

    pub async fn remove(&self, recipe_id: &str) -> AppResult<()> {
        self.ensure_signed_in()?;
        let path = format!("{}/{}", FAVORITES_PATH, urlencoding::encode(recipe_id));
        Ok(self.users.client().delete(&path).await?)
    }

    /// Flip membership of `recipe_id` in `current` (the ids already known to be
    /// favorites) and mirror the change on the server. `current` is only
    /// updated after the server accepted the change.
    pub async fn toggle(&self, recipe_id: &str, current: &mut Vec<String>) -> AppResult<FavoriteChange> {
        if let Some(pos) = current.iter().position(|id| id == recipe_id) {
            self.remove(recipe_id).await?;
            current.remove(pos);
            debug!(target: "recipebox::favorites", recipe_id, "removed from favorites");
            Ok(FavoriteChange::Removed)
        } else {
            self.add(recipe_id).await?;
            current.push(recipe_id.to_string());
            debug!(target: "recipebox::favorites", recipe_id, "added to favorites");
            Ok(FavoriteChange::Added)
        }
    }
}
