//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations for the session crates:
//! - Cryptographic utilities (SHA-256, secure random bytes, log-safe fingerprints)
//! - Client identification (User-Agent device classification)
//! - Password hashing capability (Argon2id)

pub mod client;
pub mod crypto;
pub mod password;
