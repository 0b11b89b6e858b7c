//! Keel Compose
//!
//! The manifest runner: materializes a stack's compose manifest into running
//! containers, tears it down again, and reports live container status.
//!
//! - [`ManifestRunner`]: the contract the orchestrator drives
//! - [`DockerComposeRunner`]: implementation backed by the `docker compose` CLI
//! - [`manifest`]: validation and normalization of manifest text

pub mod compose;
pub mod error;
pub mod manifest;
pub mod runner;
pub mod status;

pub use compose::{ComposeCommand, DockerComposeRunner};
pub use error::{Result, RunnerError};
pub use manifest::{MANAGED_LABEL, Manifest};
pub use runner::{ManifestRunner, ServiceProcess};
