//! Persistence rows and connection bootstrap for the document store.

pub mod errors;
pub mod db;
pub mod resident;
