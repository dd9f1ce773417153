//! Role-based authorization guard, layered after `auth_middleware`.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::backend::error::BackendError;
use crate::shared::{Identity, Role};

/// Check an identity against a set of allowed roles
///
/// `Unauthenticated` when no identity is attached, `Forbidden` when its role
/// is not in `allowed`.
pub fn authorize(identity: Option<&Identity>, allowed: &[Role]) -> Result<(), BackendError> {
    let identity =
        identity.ok_or_else(|| BackendError::unauthenticated("Authentication required"))?;

    if !allowed.contains(&identity.role) {
        tracing::debug!(
            "[Auth] User {} with role {} denied (allowed: {:?})",
            identity.user_id,
            identity.role,
            allowed
        );
        return Err(BackendError::forbidden(
            "Insufficient permissions for this operation",
        ));
    }
    Ok(())
}

/// Roles accepted by a `require_roles` layer
#[derive(Clone, Debug)]
pub struct AllowedRoles(Arc<[Role]>);

impl AllowedRoles {
    pub fn new(roles: &[Role]) -> Self {
        Self(roles.into())
    }

    pub fn only(role: Role) -> Self {
        Self::new(&[role])
    }

    pub fn roles(&self) -> &[Role] {
        &self.0
    }
}

/// Middleware form of `authorize`
///
/// ```rust,ignore
/// router.route_layer(axum::middleware::from_fn_with_state(
///     AllowedRoles::only(Role::Admin),
///     require_roles,
/// ))
/// ```
pub async fn require_roles(
    State(allowed): State<AllowedRoles>,
    request: Request,
    next: Next,
) -> Result<Response, BackendError> {
    authorize(request.extensions().get::<Identity>(), allowed.roles())?;
    Ok(next.run(request).await)
}
