//! Go-live session model: a flag record indicating a batch is broadcasting right now.

use serde::{Deserialize, Serialize};

use super::PlayerMode;
use crate::store::Document;

/// A lightweight "is this batch currently broadcasting" record with optional
/// stream info. Its creation stamp is `startTime` rather than `createdAt`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoLiveSession {
    #[serde(default)]
    pub id: String,
    pub title: String,
    pub batch_id: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub start_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player_type: Option<PlayerMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_meeting_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

impl Document for GoLiveSession {
    const COLLECTION: &'static str = "goLiveSessions";
    const TIMESTAMP_FIELD: &'static str = "startTime";

    fn id(&self) -> &str {
        &self.id
    }
}
