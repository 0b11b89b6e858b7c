//! Core domain types
//!
//! Stacks and their dependency edges are persisted by the orchestrator.
//! Trees and status values are derived on demand and never stored.

pub mod stack;
pub mod status;
pub mod tree;
