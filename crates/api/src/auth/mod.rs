//! Authentication primitives.
//!
//! - [`jwt`] -- validation (and, for tooling and tests, generation) of the
//!   HS256 bearer tokens issued by the marketplace identity service.

pub mod jwt;
