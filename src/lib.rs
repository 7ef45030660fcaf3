pub mod error;
pub mod config;
pub mod api;
pub mod identity;
pub mod catalog;
pub mod app;
pub mod cli;

pub use app::RecipeBox;
pub use config::ClientConfig;
pub use error::{AppError, AppResult};
