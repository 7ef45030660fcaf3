use std::fmt;
use std::str::FromStr;

use crate::api::ApiClient;
use crate::error::{AppError, AppResult};

use super::Recipe;

pub const RECIPES_PATH: &str = "/api/recipes";

/// Cooking-time filter bands understood by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookingTime {
    /// 15 minutes or less.
    Quick,
    /// Between 15 and 60 minutes.
    Medium,
    /// Over 60 minutes.
    Long,
}

impl CookingTime {
    pub fn as_str(self) -> &'static str {
        match self {
            CookingTime::Quick => "quick",
            CookingTime::Medium => "medium",
            CookingTime::Long => "long",
        }
    }
}

impl fmt::Display for CookingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for CookingTime {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quick" => Ok(CookingTime::Quick),
            "medium" => Ok(CookingTime::Medium),
            "long" => Ok(CookingTime::Long),
            other => Err(AppError::validation(
                "invalid_cooking_time".to_string(),
                format!("unknown cooking time '{}'; expected quick, medium or long", other),
            )),
        }
    }
}

/// Public recipe search. A comma in the search text means "all of these
/// ingredients"; otherwise it is a single ingredient match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeQuery {
    pub search: Option<String>,
    pub cooking_time: Option<CookingTime>,
}

impl RecipeQuery {
    pub fn new() -> Self { Self::default() }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn cooking_time(mut self, band: CookingTime) -> Self {
        self.cooking_time = Some(band);
        self
    }

    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(text) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let key = if text.contains(',') { "ingredients" } else { "ingredient" };
            params.push((key, text.to_string()));
        }
        if let Some(band) = self.cooking_time {
            params.push(("cookingTime", band.as_str().to_string()));
        }
        params
    }
}

pub async fn search(client: &ApiClient, query: &RecipeQuery) -> AppResult<Vec<Recipe>> {
    let params = query.to_params();
    Ok(client.get_json(RECIPES_PATH, &params).await?)
}
