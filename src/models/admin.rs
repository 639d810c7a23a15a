//! Admin credential and one-time-code records for the role-gated admin flow.

use serde::{Deserialize, Serialize};

use crate::store::Document;

/// Admin role. Batch admins are additionally scoped to a single batch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AdminRole {
    Master,
    Batch,
    Book,
}

/// A stored admin credential record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    #[serde(default)]
    pub id: String,
    pub username: String,
    pub password: String,
    pub role: AdminRole,
    pub name: String,
    pub email: String,
    /// Set for batch admins only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

impl Document for AdminUser {
    const COLLECTION: &'static str = "adminUsers";

    fn id(&self) -> &str {
        &self.id
    }
}

/// An admin user as returned by the login endpoint. The stored password never
/// leaves the auth layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminProfile {
    pub id: String,
    pub username: String,
    pub role: AdminRole,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    pub created_at: String,
}

impl From<AdminUser> for AdminProfile {
    fn from(user: AdminUser) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
            name: user.name,
            email: user.email,
            batch_id: user.batch_id,
            created_at: user.created_at,
        }
    }
}

/// A one-time authorization code gating privileged admin actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasterCode {
    #[serde(default)]
    pub id: String,
    pub code: String,
    pub purpose: String,
    pub description: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: String,
}

impl Document for MasterCode {
    const COLLECTION: &'static str = "masterCodes";

    fn id(&self) -> &str {
        &self.id
    }
}
