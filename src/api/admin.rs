//! Admin API endpoints: credential records, master codes, login, and
//! code verification.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{success, ApiResult};
use crate::auth;
use crate::errors::AppError;
use crate::models::{AdminProfile, AdminRole, AdminUser, MasterCode};
use crate::store::Updated;
use crate::AppState;

/// POST /api/admin/login body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub role: AdminRole,
    #[serde(default)]
    pub batch_id: Option<String>,
}

/// POST /api/admin/codes/verify body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyCodeRequest {
    pub code: String,
    pub purpose: String,
}

/// POST /api/admin/codes/verify response.
#[derive(Debug, Serialize)]
pub struct VerifyCodeResponse {
    pub valid: bool,
}

/// POST /api/admin/login - Authenticate an admin. The stored password is
/// never echoed back.
pub async fn admin_login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<AdminProfile> {
    let user = auth::authenticate(
        &state.store,
        &request.username,
        &request.password,
        request.role,
        request.batch_id.as_deref(),
    )
    .await?;

    match user {
        Some(user) => success(AdminProfile::from(user)),
        None => Err(AppError::Unauthorized("Invalid credentials".to_string())),
    }
}

/// POST /api/admin/codes/verify - Check a master code for a given purpose.
pub async fn verify_master_code(
    State(state): State<AppState>,
    Json(request): Json<VerifyCodeRequest>,
) -> ApiResult<VerifyCodeResponse> {
    let valid = auth::verify_master_code(&state.store, &request.code, &request.purpose).await?;
    success(VerifyCodeResponse { valid })
}

/// GET /api/admin/users - List all admin users.
pub async fn list_admin_users(State(state): State<AppState>) -> ApiResult<Vec<AdminUser>> {
    let users = state.store.admin_users.list().await?;
    success(users)
}

/// POST /api/admin/users - Create a new admin user.
pub async fn create_admin_user(
    State(state): State<AppState>,
    Json(request): Json<AdminUser>,
) -> ApiResult<AdminUser> {
    if request.username.trim().is_empty() {
        return Err(AppError::Validation("Username is required".to_string()));
    }
    if request.password.trim().is_empty() {
        return Err(AppError::Validation("Password is required".to_string()));
    }

    let user = state.store.admin_users.add(request).await?;
    success(user)
}

/// PUT /api/admin/users/:id - Apply a partial update to an admin user.
pub async fn update_admin_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> ApiResult<Updated<AdminUser>> {
    let updated = state.store.admin_users.update(&id, patch).await?;
    success(updated)
}

/// DELETE /api/admin/users/:id - Delete an admin user, returning its prior state.
pub async fn delete_admin_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<AdminUser> {
    match state.store.admin_users.delete(&id).await? {
        Some(user) => success(user),
        None => Err(AppError::NotFound(format!("Admin user {} not found", id))),
    }
}

/// GET /api/admin/codes - List all master codes.
pub async fn list_master_codes(State(state): State<AppState>) -> ApiResult<Vec<MasterCode>> {
    let codes = state.store.master_codes.list().await?;
    success(codes)
}

/// POST /api/admin/codes - Create a new master code.
pub async fn create_master_code(
    State(state): State<AppState>,
    Json(request): Json<MasterCode>,
) -> ApiResult<MasterCode> {
    if request.code.trim().is_empty() {
        return Err(AppError::Validation("Code is required".to_string()));
    }
    if request.purpose.trim().is_empty() {
        return Err(AppError::Validation("Purpose is required".to_string()));
    }

    let code = state.store.master_codes.add(request).await?;
    success(code)
}

/// PUT /api/admin/codes/:id - Apply a partial update to a master code.
pub async fn update_master_code(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<Value>,
) -> ApiResult<Updated<MasterCode>> {
    let updated = state.store.master_codes.update(&id, patch).await?;
    success(updated)
}

/// DELETE /api/admin/codes/:id - Delete a master code, returning its prior state.
pub async fn delete_master_code(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<MasterCode> {
    match state.store.master_codes.delete(&id).await? {
        Some(code) => success(code),
        None => Err(AppError::NotFound(format!("Master code {} not found", id))),
    }
}
