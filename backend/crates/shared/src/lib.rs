//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of vocabulary shared by the
//! session crates and the janitor binary:
//! - Common error classification and the unified [`error::app_error::AppError`]
//! - Typed UUID identifiers for users, sessions and issued tokens
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all crates.

pub mod error {
    pub mod app_error;
    pub mod kind;
}
pub mod id;
