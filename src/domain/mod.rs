//! Domain layer for sqlchat
//!
//! Core models (descriptors, providers, memory, query results), the error
//! taxonomy and the ports adapters implement.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult};
