//! Infrastructure Layer
//!
//! Store adapters: PostgreSQL for production, in-memory for single-node
//! use and tests.

pub mod audit;
pub mod memory;
pub mod postgres;

pub use audit::{NoopAuditSink, TracingAuditSink};
pub use memory::{MemoryAuditSink, MemorySessionStore, MemoryTokenIndex, MemoryUserDirectory};
pub use postgres::{PgSessionStore, PgTokenIndex, PgUserDirectory};
