use serde::{Deserialize, Serialize};

/// Profile of an authenticated regular user as returned by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    #[serde(alias = "_id", deserialize_with = "crate::api::string_or_number")]
    pub id: String,
    pub name: String,
    pub email: String,
}
