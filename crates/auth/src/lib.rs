//! `makechange-auth`: authentication/authorization boundary.
//!
//! This crate is decoupled from HTTP and storage: it validates tokens, models
//! the caller, and defines how policy decisions are requested.

pub mod authorize;
pub mod claims;
pub mod jwt;
pub mod permissions;
pub mod policy;
pub mod principal;
pub mod roles;
pub mod static_policy;

pub use authorize::{authorize, enroll, DEFAULT_TENANT};
pub use claims::{validate_claims, OidcClaims, TokenValidationError};
pub use jwt::{Hs256JwtValidator, JwtValidator};
pub use permissions::Permission;
pub use policy::{PolicyCheck, PolicyDecisionPoint, PolicyError, RoleGrant, UserSync};
pub use principal::SessionUser;
pub use roles::Role;
pub use static_policy::StaticPolicy;
