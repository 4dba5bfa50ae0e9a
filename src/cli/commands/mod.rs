//! CLI command implementations.

pub mod ask;
pub mod prep;
pub mod serve;
