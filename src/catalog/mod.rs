//! Recipe catalog, favorites and admin recipe management. These are thin
//! wrappers over the backend; the sessions decide which client (and so which
//! bearer) they go out with.

mod recipes;
mod favorites;
pub mod admin;

pub use recipes::{CookingTime, RecipeQuery, search};
pub use favorites::{Favorites, FavoriteChange};

use serde::{Deserialize, Serialize};

use crate::api::string_or_number;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    #[serde(rename = "_id", alias = "id", deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub cooking_time: Option<u32>,
    #[serde(default)]
    pub servings: Option<u32>,
}

/// Admin recipe form. Ingredients travel as one comma-separated string.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDraft {
    pub title: String,
    pub ingredients: String,
    pub instructions: String,
    pub cooking_time: u32,
    pub servings: u32,
}

impl RecipeDraft {
    /// Pre-fill the edit form from an existing recipe.
    pub fn from_recipe(recipe: &Recipe) -> Self {
        Self {
            title: recipe.title.clone(),
            ingredients: recipe.ingredients.join(", "),
            instructions: recipe.instructions.clone(),
            cooking_time: recipe.cooking_time.unwrap_or_default(),
            servings: recipe.servings.unwrap_or_default(),
        }
    }

    pub fn ingredient_list(&self) -> Vec<String> {
        self.ingredients
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::validation("missing_title", "Recipe title is required"));
        }
        if self.ingredient_list().is_empty() {
            return Err(AppError::validation("missing_ingredients", "At least one ingredient is required"));
        }
        if self.instructions.trim().is_empty() {
            return Err(AppError::validation("missing_instructions", "Instructions are required"));
        }
        Ok(())
    }
}
