//! Application services used by the route handlers.

pub mod auth;
pub mod face_encoder;

pub use auth::{AuthError, AuthService};
pub use face_encoder::RemoteFaceEncoder;
