//! Operator identity forwarded by the upstream gateway
//!
//! The gateway authenticates the caller and forwards `x-user-id` and
//! `x-user-role`. Handlers that take an [`AdminUser`] reject everyone else.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::api::response::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

const ADMIN_ROLE: &str = "admin";
const MAX_USER_ID_LEN: usize = 128;

/// Caller holding the admin role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminUser {
    pub user_id: String,
}

fn header<'a>(parts: &'a Parts, name: &str) -> Option<&'a str> {
    parts.headers.get(name).and_then(|v| v.to_str().ok())
}

fn valid_user_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_USER_ID_LEN
        && id.chars().all(|c| c.is_ascii_graphic())
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_id = header(parts, USER_ID_HEADER)
            .map(str::trim)
            .filter(|id| valid_user_id(id))
            .ok_or_else(|| AppError::Unauthorized("Authentication required".to_string()))?;

        let is_admin = header(parts, USER_ROLE_HEADER)
            .is_some_and(|role| role.trim().eq_ignore_ascii_case(ADMIN_ROLE));
        if !is_admin {
            tracing::debug!(user_id = %user_id, "Rejected non-admin caller");
            return Err(AppError::Forbidden("Admin role required".to_string()));
        }

        Ok(AdminUser {
            user_id: user_id.to_string(),
        })
    }
}
