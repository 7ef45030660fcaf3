use std::sync::Arc;

use parking_lot::RwLock;

use super::domain::BearerToken;

/// Authorization slot of one HTTP client. Each domain's client owns its own
/// authorizer, so installing a user bearer never replaces the admin one.
///
/// Requests snapshot the value when they are dispatched; changing it only
/// affects requests issued afterwards.
#[derive(Debug, Clone, Default)]
pub struct RequestAuthorizer {
    slot: Arc<RwLock<Option<BearerToken>>>,
}

impl RequestAuthorizer {
    pub fn new() -> Self { Self::default() }

    pub fn set_bearer(&self, token: BearerToken) {
        *self.slot.write() = Some(token);
    }

    pub fn clear_bearer(&self) {
        self.slot.write().take();
    }

    /// Current `Authorization` header value, if any.
    pub fn header(&self) -> Option<String> {
        self.slot.read().as_ref().map(BearerToken::header_value)
    }

    pub fn is_set(&self) -> bool { self.slot.read().is_some() }
}
