//! The authenticated principal, as established by the auth middleware.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::Error;

/// The user a request acts as.
///
/// The authentication middleware (out of scope here) validates the auth
/// cookie and inserts this as a request extension; handlers extract it and
/// reject with 401 when it is absent.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    /// Username.
    pub username: String,
    /// Tenant the user belongs to; all reads are scoped to it.
    pub tenant_name: String,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or(Error::Unauthorized)
    }
}
