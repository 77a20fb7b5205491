//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`rbac::RequireProfessional`] -- Requires the `professional` or `admin` role.
//! - [`rbac::RequireClient`] -- Requires the `client` or `admin` role.

pub mod auth;
pub mod rbac;
