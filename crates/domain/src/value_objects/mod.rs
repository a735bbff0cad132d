//! Value Objects - Immutable, identity-less domain primitives

mod geo_location;
mod reading_id;
mod thresholds;

pub use geo_location::GeoLocation;
pub use reading_id::ReadingId;
pub use thresholds::{DEFAULT_THRESHOLD_CONDITION, DEFAULT_THRESHOLD_TEMP, Thresholds};
