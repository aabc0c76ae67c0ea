//! Repository references

use serde::{Deserialize, Serialize};

/// A repository known by its slug and platform id
///
/// The platform calls the slug `name`; the id is what group mutations take.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryRef {
    /// Platform-assigned identifier
    pub id: u64,

    /// Repository slug within the organization
    #[serde(rename = "name")]
    pub slug: String,
}

impl RepositoryRef {
    pub fn new(id: u64, slug: impl Into<String>) -> Self {
        Self {
            id,
            slug: slug.into(),
        }
    }
}
