//! Domain layer for the quorum backend.
//!
//! Contains the typed models for every persistent entity and provider
//! result, the shared error type, and the ports (traits) the adapters
//! implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
