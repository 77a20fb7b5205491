//! Well-known role name constants.
//!
//! These must match the `role` values issued in access tokens by the
//! authentication service.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_PROFESSIONAL: &str = "professional";
pub const ROLE_CLIENT: &str = "client";
