//! Fixed external portal endpoints.
//!
//! The batches and live-classes screens embed these origins full-page; no
//! data crosses the embed boundary, the URLs are build-time constants.

use serde::Serialize;

use super::{success, ApiResult};
use crate::config::{BATCHES_PORTAL_URL, LIVE_CLASSES_PORTAL_URL};

/// An embeddable external screen.
#[derive(Debug, Serialize)]
pub struct Portal {
    pub name: &'static str,
    pub url: &'static str,
}

/// GET /api/portals - The fixed embed targets.
pub async fn list_portals() -> ApiResult<Vec<Portal>> {
    success(vec![
        Portal {
            name: "batches",
            url: BATCHES_PORTAL_URL,
        },
        Portal {
            name: "liveClasses",
            url: LIVE_CLASSES_PORTAL_URL,
        },
    ])
}
