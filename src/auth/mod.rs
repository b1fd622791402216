use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::HierarchyError;

/// Authenticated user context. Assembled from verified token claims by the
/// authentication layer in front of this crate; the engine only consumes it
/// for role and company-membership checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub role: UserRole,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Member,
}

pub fn check_user_is_admin(user: &AuthUser) -> Result<(), HierarchyError> {
    if user.role != UserRole::Admin {
        return Err(HierarchyError::forbidden("Allowed only for admin"));
    }
    Ok(())
}

pub fn check_company_is_yours(user: &AuthUser, company_id: Uuid) -> Result<(), HierarchyError> {
    if user.company_id != company_id {
        return Err(HierarchyError::forbidden("Allowed only for your company"));
    }
    Ok(())
}
