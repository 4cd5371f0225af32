use makechange_auth::{OidcClaims, Role, SessionUser};

/// Authenticated caller for a request.
///
/// Inserted by the auth middleware; present on every protected route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    user: SessionUser,
    token_roles: Vec<Role>,
}

impl SessionContext {
    pub fn from_claims(claims: &OidcClaims) -> Self {
        Self {
            user: SessionUser::from_claims(claims),
            token_roles: claims.roles.clone(),
        }
    }

    pub fn user(&self) -> &SessionUser {
        &self.user
    }

    /// Roles carried by the session identity.
    pub fn session_roles(&self) -> &[Role] {
        &self.user.roles
    }

    /// Roles exactly as they appeared in the bearer token.
    pub fn token_roles(&self) -> &[Role] {
        &self.token_roles
    }
}
