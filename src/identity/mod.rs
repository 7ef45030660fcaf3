//! Identity and session management for the two independent identity domains
//! (regular user and admin). Keep the public surface thin and split the
//! implementation across sub-modules.

mod domain;
mod principal;
mod session;
mod token_store;
mod authorizer;
mod user;
mod admin;

pub use domain::{Domain, BearerToken};
pub use principal::Identity;
pub use session::{Session, SessionStatus, AdminSession};
pub use token_store::{TokenStore, MemoryTokenStore, FileTokenStore};
pub use authorizer::RequestAuthorizer;
pub use user::UserSessionManager;
pub use admin::AdminSessionManager;
