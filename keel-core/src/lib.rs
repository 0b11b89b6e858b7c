//! Keel Core
//!
//! Core types for the Keel stack orchestrator.
//!
//! This crate contains:
//! - Domain types: stacks, dependency edges, derived trees and live status
//! - DTOs: request/response payloads shared by the server, client and CLI

pub mod domain;
pub mod dto;
