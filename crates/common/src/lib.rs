//! Shared building blocks for the resident store crates.

pub mod types;
pub mod utils;
