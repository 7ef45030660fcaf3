use std::fmt;

use super::principal::Identity;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Anonymous,
    Loading,
    Authenticated,
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionStatus::Anonymous => "anonymous",
            SessionStatus::Loading => "loading",
            SessionStatus::Authenticated => "authenticated",
        })
    }
}

/// Regular-user session. The identity lives inside the `Authenticated`
/// variant, so it is present exactly when the status is authenticated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Anonymous,
    Loading,
    Authenticated(Identity),
}

impl Session {
    pub fn status(&self) -> SessionStatus {
        match self {
            Session::Anonymous => SessionStatus::Anonymous,
            Session::Loading => SessionStatus::Loading,
            Session::Authenticated(_) => SessionStatus::Authenticated,
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Session::Authenticated(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool { matches!(self, Session::Authenticated(_)) }
}

/// Admin session: a capability flag, no profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminSession {
    Anonymous,
    Authenticated,
}

impl AdminSession {
    pub fn is_authenticated(self) -> bool { matches!(self, AdminSession::Authenticated) }
}

impl fmt::Display for AdminSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AdminSession::Anonymous => "anonymous",
            AdminSession::Authenticated => "authenticated",
        })
    }
}
