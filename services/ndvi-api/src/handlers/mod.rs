//! HTTP request handlers.

pub mod health;
pub mod landcover;
pub mod ndvi;
