//! Batch model: a named course grouping folders of content and associated live classes.

use serde::{Deserialize, Serialize};

use super::LiveClass;
use crate::store::Document;

/// Playback variant for a content item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentPlayer {
    Internal,
    Edumaster2,
}

/// Kind of a content item inside a folder.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Video,
    Pdf,
    Document,
}

/// A single piece of study material. Belongs to exactly one folder and one batch;
/// the store does not enforce the parent references (schemaless by design).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ContentKind,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub folder_id: String,
    pub batch_id: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_type: Option<ContentPlayer>,
}

/// A folder of content, recursively containing sub-folders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub batch_id: String,
    #[serde(default)]
    pub sub_folders: Vec<Folder>,
    #[serde(default)]
    pub content: Vec<Content>,
    #[serde(default)]
    pub created_at: String,
}

/// Internal streaming configuration for a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hls_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_key: Option<String>,
}

/// Archive-sync metadata for batches mirrored to the Internet Archive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveSync {
    pub identifier: String,
    pub url: String,
    pub last_sync: String,
    pub auto_update: bool,
}

/// A named course/program grouping folders of content and associated live classes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub folders: Vec<Folder>,
    #[serde(default)]
    pub live_classes: Vec<LiveClass>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streaming_config: Option<StreamingConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internet_archive: Option<ArchiveSync>,
}

impl Document for Batch {
    const COLLECTION: &'static str = "batches";

    fn id(&self) -> &str {
        &self.id
    }
}
