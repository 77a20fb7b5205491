//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! match. Ownership of individual records is checked separately by the
//! scheduling layer.

use assist_core::error::CoreError;
use assist_core::roles::{ROLE_ADMIN, ROLE_CLIENT, ROLE_PROFESSIONAL};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AppError;
use crate::state::AppState;
use super::auth::AuthUser;

/// Requires the `professional` or `admin` role. Rejects with 403 otherwise.
///
/// ```ignore
/// async fn calendar(RequireProfessional(user): RequireProfessional) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireProfessional(pub AuthUser);

impl FromRequestParts<AppState> for RequireProfessional {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_PROFESSIONAL && user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Professional role required".into(),
            )));
        }
        Ok(RequireProfessional(user))
    }
}

/// Requires the `client` or `admin` role. Rejects with 403 otherwise.
pub struct RequireClient(pub AuthUser);

impl FromRequestParts<AppState> for RequireClient {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if user.role != ROLE_CLIENT && user.role != ROLE_ADMIN {
            return Err(AppError::Core(CoreError::Forbidden(
                "Client role required".into(),
            )));
        }
        Ok(RequireClient(user))
    }
}
