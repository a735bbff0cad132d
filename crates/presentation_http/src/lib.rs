//! Skywatch HTTP presentation layer
//!
//! Weather lookups, stored readings and summaries, monitor status, and the
//! background polling task.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod tasks;

pub use error::{ApiError, ErrorResponse};
pub use routes::create_router;
pub use state::AppState;
pub use tasks::spawn_weather_polling_task;
