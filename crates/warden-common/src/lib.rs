//! # Warden Common
//!
//! Shared types and utilities used across Warden components.
//!
//! ## Modules
//! - `types` - Core data structures (Constraints, Response)
//! - `codec` - Siteverify reply parsing and JSON round-tripping
//! - `error` - Common error types
//! - `constants` - Endpoints, form fields, and error codes

pub mod codec;
pub mod constants;
pub mod error;
pub mod types;

pub use error::WardenError;
pub use types::*;
