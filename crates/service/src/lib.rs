//! Service layer for resident records.
//! - Validates submissions and resolves the profile photo before anything is persisted.
//! - Talks to storage and the media host only through the `ResidentRepository`
//!   and `MediaHost` traits, so handlers and tests can swap implementations.

pub mod errors;
pub mod media;
pub mod residents;
