//! Data Transfer Objects
//!
//! Request and response payloads exchanged between the orchestrator API
//! and its clients (CLI, scripts).

pub mod dependency;
pub mod deploy;
pub mod response;
pub mod stack;
