//! HTTP route handlers.

pub mod attendance;
pub mod auth;
pub mod classes;
pub mod faces;
pub mod health;
pub mod marks;
pub mod users;
