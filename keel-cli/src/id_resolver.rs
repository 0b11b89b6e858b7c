//! ID resolver module
//!
//! Resolves UUID prefixes to full UUIDs by listing the resource, so users
//! can type short, unambiguous prefixes instead of full ids.

use anyhow::{Context, Result, anyhow};
use keel_client::OrchestratorClient;
use uuid::Uuid;

use crate::types::IdOrPrefix;

/// Resolve a stack ID or prefix to a full UUID
pub async fn resolve_stack_id(client: &OrchestratorClient, id_or_prefix: &str) -> Result<Uuid> {
    let id_or_prefix = IdOrPrefix::parse(id_or_prefix);
    if let Some(uuid) = id_or_prefix.as_uuid() {
        return Ok(uuid);
    }

    let stacks = client
        .list_stacks()
        .await
        .context("Failed to fetch stacks for ID resolution")?;

    match_prefix(stacks.iter().map(|s| s.id), &id_or_prefix.to_string(), "stack")
}

/// Resolve a stack dependency ID or prefix to a full UUID
pub async fn resolve_dependency_id(
    client: &OrchestratorClient,
    id_or_prefix: &str,
) -> Result<Uuid> {
    let id_or_prefix = IdOrPrefix::parse(id_or_prefix);
    if let Some(uuid) = id_or_prefix.as_uuid() {
        return Ok(uuid);
    }

    let edges = client
        .list_dependencies(None, None)
        .await
        .context("Failed to fetch stack dependencies for ID resolution")?;

    match_prefix(
        edges.iter().map(|e| e.id),
        &id_or_prefix.to_string(),
        "stack dependency",
    )
}

/// Pick the single id starting with `prefix`
///
/// # Errors
/// No id matches, or more than one does.
fn match_prefix(ids: impl Iterator<Item = Uuid>, prefix: &str, kind: &str) -> Result<Uuid> {
    if prefix.is_empty() {
        return Err(anyhow!("Empty {} ID", kind));
    }

    let matches: Vec<Uuid> = ids.filter(|id| id.to_string().starts_with(prefix)).collect();

    match matches.as_slice() {
        [] => Err(anyhow!("No {} found with ID starting with '{}'", kind, prefix)),
        [id] => Ok(*id),
        _ => {
            let ids: Vec<String> = matches.iter().map(Uuid::to_string).collect();
            Err(anyhow!(
                "Ambiguous prefix '{}' matches multiple {}s: {}",
                prefix,
                kind,
                ids.join(", ")
            ))
        }
    }
}
