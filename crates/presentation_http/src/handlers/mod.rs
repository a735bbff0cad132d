//! HTTP request handlers

pub mod health;
pub mod monitor;
pub mod weather;
