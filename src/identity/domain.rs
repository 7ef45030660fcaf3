use std::fmt;

/// One of the two independent identity contexts. Each has its own token slot,
/// its own session state and its own HTTP client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    User,
    Admin,
}

impl Domain {
    /// Persisted key for this domain's bearer token. The keys are distinct so
    /// neither domain can overwrite the other.
    pub fn storage_key(self) -> &'static str {
        match self {
            Domain::User => "token",
            Domain::Admin => "adminToken",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Domain::User => "user",
            Domain::Admin => "admin",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Opaque bearer credential. Never decoded; only persisted and forwarded.
#[derive(Clone, PartialEq, Eq)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(raw: impl Into<String>) -> Self { Self(raw.into()) }

    pub fn as_str(&self) -> &str { &self.0 }

    pub fn is_empty(&self) -> bool { self.0.trim().is_empty() }

    /// Value for the `Authorization` header.
    pub fn header_value(&self) -> String { format!("Bearer {}", self.0) }
}

// Tokens end up in tracing output through Debug; keep them out of logs.
impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BearerToken(<{} bytes>)", self.0.len())
    }
}
