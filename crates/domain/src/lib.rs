//! Domain layer for Skywatch
//!
//! Contains the weather readings, daily summaries, breach rules and the
//! pure aggregation logic. This layer performs no I/O.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
