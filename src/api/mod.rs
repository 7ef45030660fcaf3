//! HTTP plumbing for the recipebox REST backend: one `ApiClient` per identity
//! domain, the error type for raw transport results, and the wire shapes of
//! the authentication endpoints.

mod client;
mod dto;
pub mod auth;

pub use client::{ApiClient, ApiError};
pub use dto::{AuthResponse, TokenResponse, string_or_number};
