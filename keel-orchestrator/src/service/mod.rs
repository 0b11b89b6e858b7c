//! Service Module
//!
//! Business logic layer for the orchestrator.
//! - [`graph`]: dependency/dependent trees and edge validation
//! - [`orchestrator`]: cascading deploy, teardown, and live status
//! - [`stack`], [`dependency`]: CRUD with validation

pub mod dependency;
pub mod error;
pub mod graph;
pub mod orchestrator;
pub mod stack;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export for convenience
pub use dependency as dependency_service;
pub use error::{Result, StackError};
pub use orchestrator as orchestrator_service;
pub use stack as stack_service;

use std::future::Future;
use std::pin::Pin;

/// Boxed future used by the recursive graph walks
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;
