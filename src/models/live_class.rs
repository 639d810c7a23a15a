//! Live class model: a scheduled or ongoing broadcast session tied to a batch.

use serde::{Deserialize, Serialize};

use crate::store::Document;

/// Where a live stream is played: the built-in player or an external meeting link.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PlayerMode {
    #[default]
    Internal,
    External,
}

/// A scheduled or ongoing broadcast session belonging to one batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveClass {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub batch_id: String,
    pub scheduled_at: String,
    pub end_time: String,
    #[serde(default)]
    pub is_live: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_url: Option<String>,
    #[serde(default)]
    pub player_type: PlayerMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_meeting_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_to_be_added: Option<bool>,
    #[serde(default)]
    pub created_at: String,
}

impl Document for LiveClass {
    const COLLECTION: &'static str = "liveClasses";

    fn id(&self) -> &str {
        &self.id
    }
}
