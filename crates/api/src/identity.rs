//! Caller identity extractor.
//!
//! Authentication terminates at an upstream gateway; requests reach this
//! service with `x-user-id` and `x-user-role` headers already verified.
//! The extractor only parses them.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use aegle_core::notify::{Recipient, RecipientKind};

use crate::error::AppError;
use crate::state::AppState;

/// The verified caller of a request.
///
/// Use as an extractor parameter in any handler that needs to know who
/// is calling:
///
/// ```ignore
/// async fn my_handler(identity: Identity) -> AppResult<Json<()>> {
///     tracing::info!(user_id = %identity.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    /// The caller's id in the table named by `role`.
    pub user_id: Uuid,
    /// Whether the caller is a patient or a doctor.
    pub role: RecipientKind,
}

impl Identity {
    /// The caller as a notification recipient.
    pub fn recipient(&self) -> Recipient {
        Recipient {
            id: self.user_id,
            kind: self.role,
        }
    }

    /// Error unless the caller is a doctor.
    pub fn require_doctor(&self) -> Result<(), AppError> {
        match self.role {
            RecipientKind::Doctor => Ok(()),
            RecipientKind::Patient => Err(AppError::Forbidden(
                "This operation requires a doctor role".into(),
            )),
        }
    }
}

impl FromRequestParts<AppState> for Identity {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing x-user-id header".into()))?
            .parse::<Uuid>()
            .map_err(|_| AppError::Unauthorized("x-user-id must be a UUID".into()))?;

        let role = parts
            .headers
            .get("x-user-role")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("Missing x-user-role header".into()))?
            .parse::<RecipientKind>()
            .map_err(|_| {
                AppError::Unauthorized("x-user-role must be 'patient' or 'doctor'".into())
            })?;

        Ok(Identity { user_id, role })
    }
}
