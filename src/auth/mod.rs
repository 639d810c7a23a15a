//! Role-gated admin authentication.
//!
//! Credentials are matched against stored admin records; the secret
//! comparisons run in constant time to mitigate timing attacks.

use subtle::ConstantTimeEq;

use crate::errors::AppError;
use crate::models::{AdminRole, AdminUser};
use crate::store::Store;

/// Authenticate an admin by username, password, and role. Batch admins must
/// additionally present the batch id their record is scoped to. Returns
/// `None` when no record matches.
pub async fn authenticate(
    store: &Store,
    username: &str,
    password: &str,
    role: AdminRole,
    batch_id: Option<&str>,
) -> Result<Option<AdminUser>, AppError> {
    let users = store.admin_users.list().await?;

    let user = users.into_iter().find(|user| {
        if user.username != username || user.role != role {
            return false;
        }
        if role == AdminRole::Batch && user.batch_id.as_deref() != batch_id {
            return false;
        }
        constant_time_compare(&user.password, password)
    });

    if user.is_none() {
        tracing::info!(username, "Admin authentication failed");
    }

    Ok(user)
}

/// Verify a master code by value and purpose. Inactive codes never match.
pub async fn verify_master_code(
    store: &Store,
    code: &str,
    purpose: &str,
) -> Result<bool, AppError> {
    let codes = store.master_codes.list().await?;

    Ok(codes.iter().any(|candidate| {
        candidate.is_active
            && candidate.purpose == purpose
            && constant_time_compare(&candidate.code, code)
    }))
}

/// Perform constant-time string comparison.
fn constant_time_compare(a: &str, b: &str) -> bool {
    let a_bytes = a.as_bytes();
    let b_bytes = b.as_bytes();

    a_bytes.ct_eq(b_bytes).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_time_compare_equal() {
        assert!(constant_time_compare("admin123", "admin123"));
    }

    #[test]
    fn test_constant_time_compare_not_equal() {
        assert!(!constant_time_compare("admin123", "admin124"));
    }

    #[test]
    fn test_constant_time_compare_different_lengths() {
        assert!(!constant_time_compare("short", "much-longer-secret"));
    }

    #[test]
    fn test_constant_time_compare_empty() {
        assert!(constant_time_compare("", ""));
        assert!(!constant_time_compare("", "not-empty"));
    }
}
