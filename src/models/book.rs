//! Book model for the digital library. Books are independent of batches.

use serde::{Deserialize, Serialize};

use crate::store::Document;

/// A library entry pointing at externally hosted reading material.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub author: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub url: String,
    pub category: String,
    #[serde(default)]
    pub created_at: String,
}

impl Document for Book {
    const COLLECTION: &'static str = "books";

    fn id(&self) -> &str {
        &self.id
    }
}
