//! # Hourglass Common Library
//!
//! Shared code for the Hourglass study tracker including:
//! - Database initialization, migrations and models
//! - Configuration loading and root folder resolution
//! - Password hashing
//! - Error types
//! - Timestamp utilities

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod time;

pub use error::{Error, Result};
