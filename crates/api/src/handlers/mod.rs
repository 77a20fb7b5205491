//! Request handlers for the `/calendar` resource tree.
//!
//! Handlers extract and authorize, then delegate to [`crate::scheduling`]
//! or directly to the `assist_db` repositories for plain CRUD. Every
//! successful body is wrapped in [`crate::response::DataResponse`].

pub mod availability;
pub mod google;
pub mod interventions;
pub mod settings;
