//! Background tasks for the HTTP presentation layer

mod weather_polling;

pub use weather_polling::spawn_weather_polling_task;
