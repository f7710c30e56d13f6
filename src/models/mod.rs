//! Data models for the bucket gateway.
//!
//! Everything here is request-scoped: built for one incoming request and
//! dropped once the page model has been returned.

pub mod bucket;
pub mod params;
pub mod table;
