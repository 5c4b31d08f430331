//! Residents: domain types, storage trait and the create/list service.

pub mod domain;
pub mod repository;
pub mod service;

pub use domain::{NewResident, Resident, ResidentInput, ValidatedInput};
pub use service::ResidentService;
