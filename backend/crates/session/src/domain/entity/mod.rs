//! Entity Module

pub mod audit_event;
pub mod session;
pub mod user;
