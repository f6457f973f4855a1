use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};
use uuid::Uuid;

use crate::entities::role::RoleName;
use crate::error::{AppError, AppResult};
use crate::utils::jwt::{verify_token, Claims};
use crate::AppState;

/// Required-role set declared per route. Any one matching role grants access.
#[derive(Debug, Clone, Copy)]
pub struct RequiredRoles(pub &'static [RoleName]);

pub const READERS: RequiredRoles =
    RequiredRoles(&[RoleName::Admin, RoleName::Agent, RoleName::Viewer]);
pub const WRITERS: RequiredRoles = RequiredRoles(&[RoleName::Admin, RoleName::Agent]);
pub const ADMINS: RequiredRoles = RequiredRoles(&[RoleName::Admin]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDenied {
    Unauthenticated,
    InsufficientRole,
}

impl From<AccessDenied> for AppError {
    fn from(denied: AccessDenied) -> Self {
        match denied {
            AccessDenied::Unauthenticated => {
                AppError::Unauthorized("No authentication found".to_string())
            }
            AccessDenied::InsufficientRole => {
                AppError::Forbidden("Insufficient role for this operation".to_string())
            }
        }
    }
}

/// Allow iff the caller is authenticated and holds at least one required role.
pub fn authorize(claims: Option<&Claims>, required: &[RoleName]) -> Result<(), AccessDenied> {
    let claims = claims.ok_or(AccessDenied::Unauthenticated)?;

    if required.iter().any(|role| claims.has_role(role.as_str())) {
        Ok(())
    } else {
        Err(AccessDenied::InsufficientRole)
    }
}

/// Marker placed on responses so outer layers can log who made the request.
#[derive(Debug, Clone, Copy)]
pub struct AuthenticatedUser(pub Uuid);

/// Extract and validate JWT token from Authorization header
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let auth = request
        .headers()
        .typed_get::<Authorization<Bearer>>()
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    let claims = verify_token(auth.token(), &state.config.jwt_secret)?;
    let user_id = claims.sub;
    request.extensions_mut().insert(claims);

    let mut response = next.run(request).await;
    response.extensions_mut().insert(AuthenticatedUser(user_id));
    Ok(response)
}

/// Enforce the route's required roles against the claims set by `auth_middleware`
pub async fn require_roles(
    State(required): State<RequiredRoles>,
    request: Request,
    next: Next,
) -> AppResult<Response> {
    if let Err(denied) = authorize(request.extensions().get::<Claims>(), required.0) {
        tracing::debug!(
            uri = %request.uri(),
            required = ?required.0,
            reason = ?denied,
            "Access denied"
        );
        return Err(denied.into());
    }

    Ok(next.run(request).await)
}
