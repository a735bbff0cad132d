//! Domain entities - Objects with identity and lifecycle

mod breach;
mod daily_summary;
mod reading;

pub use breach::{BreachAlert, BreachAssessment};
pub use daily_summary::{DailySummary, MS_TO_KMH, day_bounds};
pub use reading::Reading;
