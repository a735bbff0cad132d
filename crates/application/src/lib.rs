//! Application layer - Use cases and orchestration
//!
//! Defines the ports the engine talks through (reading and summary stores,
//! weather provider, alert sink) and the services that drive them: the
//! daily aggregator, the breach detector and the polling-cycle monitor.

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
