//! Shared utilities for the Attendify backend.
//!
//! This crate provides functionality used across the other crates:
//! - Password hashing with Argon2id
//! - RS256 access tokens
//! - Boundary validators for coordinates and face descriptors

pub mod jwt;
pub mod password;
pub mod validation;
