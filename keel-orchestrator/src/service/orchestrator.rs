//! Orchestrator
//!
//! Cascading deploy and teardown across the dependency graph, plus live
//! status. Nothing here is persisted: every state question goes to the
//! manifest runner.
//!
//! Deploy order for a target stack:
//! 1. Bring up any dependency that is not deployed (dependencies first)
//! 2. Tear down every direct dependent (each cascades to its own dependents)
//! 3. Bring up the target and check that all services are green
//! 4. Redeploy the direct dependents, if asked
//!
//! A failure in 3 or 4 tears the target down again before the error is
//! returned.

use std::collections::{BTreeMap, BTreeSet};

use keel_compose::{RunnerError, ServiceProcess, manifest};
use keel_core::domain::stack::Stack;
use keel_core::domain::status::{ServiceState, StackStatus};
use keel_core::dto::deploy::{DeployOutcome, RunOutput, TeardownOutcome};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::BoxFuture;
use super::error::{Result, StackError};
use super::graph;
use crate::repository::DependencyFilter;
use crate::state::AppState;

/// Compose project a stack runs as, unless its manifest names one
pub fn project_name(stack_id: Uuid) -> String {
    format!("keel-{}", stack_id)
}

// =============================================================================
// Deploy
// =============================================================================

/// Deploy a stack, cascading through its dependents.
///
/// # Arguments
/// * `redeploy_dependents` - Bring the torn down dependents back up afterwards
///
/// # Errors
/// - `StackNotFound` if the stack does not exist
/// - `DeployFailed` if the runner failed or a service is not healthy; the
///   target has been torn down again by then
pub fn deploy_stack(
    state: &AppState,
    stack_id: Uuid,
    redeploy_dependents: bool,
) -> BoxFuture<'_, Result<DeployOutcome>> {
    Box::pin(async move {
        let stack = load_stack(state, stack_id).await?;
        let dependents = graph::compute_dependent_tree(state.store.as_ref(), stack_id).await?;

        info!(
            "Deploying stack {} ({}), {} dependent(s) in closure",
            stack.name,
            stack.id,
            dependents.all_dependents.len()
        );

        ensure_dependencies_up(state, stack_id).await?;

        for dependent_id in dependents.direct_ids() {
            let outcome = teardown_stack(state, dependent_id).await?;
            if let Some((failed_id, reason)) = outcome.first_failure() {
                warn!(
                    "Teardown of dependent {} before deploying {} failed: {}",
                    failed_id, stack_id, reason
                );
            }
        }

        let deployed = async {
            let result = bring_up_checked(state, &stack).await?;

            if redeploy_dependents {
                for dependent_id in dependents.direct_ids() {
                    info!("Redeploying dependent {} of {}", dependent_id, stack_id);
                    deploy_stack(state, dependent_id, true).await?;
                }
            }

            Ok::<_, StackError>(result)
        }
        .await;

        match deployed {
            Ok(result) => {
                info!("Stack {} deployed", stack_id);
                Ok(DeployOutcome { stack, result })
            }
            Err(e) => {
                error!("Deploy of stack {} failed: {}", stack_id, e);
                compensate(state, stack_id).await;
                Err(e)
            }
        }
    })
}

/// Bring up every dependency of `stack_id` that is not deployed yet,
/// deepest first. Deployed dependencies are left alone.
fn ensure_dependencies_up(state: &AppState, stack_id: Uuid) -> BoxFuture<'_, Result<()>> {
    Box::pin(async move {
        let edges = state
            .store
            .list_dependencies(DependencyFilter::dependencies_of(stack_id))
            .await?;

        for edge in edges {
            let dependency = load_stack(state, edge.depends_on_stack_id).await?;

            let status = stack_status(state, &dependency)
                .await
                .map_err(|e| match e {
                    StackError::Runner(err) => StackError::DeployFailed {
                        stack_id: dependency.id,
                        reason: err.to_string(),
                    },
                    other => other,
                })?;
            if status.deployed {
                debug!("Dependency {} of {} already deployed", dependency.id, stack_id);
                continue;
            }

            ensure_dependencies_up(state, dependency.id).await?;

            info!(
                "Bringing up dependency {} ({}) of {}",
                dependency.name, dependency.id, stack_id
            );
            if let Err(e) = bring_up_checked(state, &dependency).await {
                error!("Dependency {} failed to come up: {}", dependency.id, e);
                if let Err(down) = tear_down(state, &dependency).await {
                    warn!("Cleanup of dependency {} failed: {}", dependency.id, down);
                }
                return Err(e);
            }
        }

        Ok(())
    })
}

/// Bring a single stack up and require every service to be green
async fn bring_up_checked(state: &AppState, stack: &Stack) -> Result<RunOutput> {
    let deploy_failed = |e: RunnerError| StackError::DeployFailed {
        stack_id: stack.id,
        reason: e.to_string(),
    };

    let code = normalized_code(stack).map_err(deploy_failed)?;
    let cwd = stack.cwd.as_deref();

    let result = state
        .runner
        .bring_up(&code, cwd)
        .await
        .map_err(deploy_failed)?;

    let status = query_status(state, &code, cwd).await.map_err(deploy_failed)?;
    if status.is_degraded() {
        let unhealthy: Vec<&str> = status
            .services
            .values()
            .filter(|s| !s.is_green())
            .map(|s| s.service.as_str())
            .collect();
        return Err(StackError::DeployFailed {
            stack_id: stack.id,
            reason: format!("services not healthy: {}", unhealthy.join(", ")),
        });
    }

    Ok(result)
}

/// Best-effort teardown of a stack whose deploy failed
async fn compensate(state: &AppState, stack_id: Uuid) {
    info!("Compensating: tearing down stack {}", stack_id);

    match teardown_stack(state, stack_id).await {
        Ok(outcome) => {
            if let Some((failed_id, reason)) = outcome.first_failure() {
                warn!("Compensating teardown of {} failed: {}", failed_id, reason);
            }
        }
        Err(e) => warn!("Compensating teardown of {} failed: {}", stack_id, e),
    }
}

// =============================================================================
// Teardown
// =============================================================================

/// Tear down a stack after tearing down everything that depends on it.
///
/// Runner failures are recorded in the outcome, not returned, so that a
/// cascade keeps going. Use [`surface_failure`] when the teardown is the
/// operation the caller asked for.
///
/// # Errors
/// `StackNotFound` if the stack does not exist, or a store error.
pub fn teardown_stack(state: &AppState, stack_id: Uuid) -> BoxFuture<'_, Result<TeardownOutcome>> {
    Box::pin(async move {
        let stack = load_stack(state, stack_id).await?;
        let tree = graph::compute_dependent_tree(state.store.as_ref(), stack_id).await?;

        let mut dependents = Vec::new();
        for dependent_id in tree.direct_ids() {
            dependents.push(teardown_stack(state, dependent_id).await?);
        }

        info!("Tearing down stack {} ({})", stack.name, stack.id);

        let (result, error) = match tear_down(state, &stack).await {
            Ok(result) => (Some(result), None),
            Err(e) => {
                error!("Teardown of stack {} failed: {}", stack.id, e);
                (None, Some(e.to_string()))
            }
        };

        Ok(TeardownOutcome {
            stack,
            result,
            error,
            dependents,
        })
    })
}

/// Turn the first failure recorded in a teardown outcome into an error
pub fn surface_failure(outcome: TeardownOutcome) -> Result<TeardownOutcome> {
    match outcome.first_failure() {
        Some((stack_id, reason)) => Err(StackError::TeardownFailed {
            stack_id,
            reason: reason.to_string(),
        }),
        None => Ok(outcome),
    }
}

/// Tear down every stack, one cascade per stack not already covered.
///
/// Failures are collected, never raised. Stacks deleted mid-sweep are skipped.
pub async fn teardown_all_stacks(state: &AppState) -> Result<Vec<TeardownOutcome>> {
    let stacks = state.store.list_stacks().await?;
    info!("Tearing down all {} stack(s)", stacks.len());

    let mut covered = BTreeSet::new();
    let mut outcomes = Vec::new();

    for stack in stacks {
        if covered.contains(&stack.id) {
            continue;
        }

        match teardown_stack(state, stack.id).await {
            Ok(outcome) => {
                collect_ids(&outcome, &mut covered);
                outcomes.push(outcome);
            }
            Err(e) if e.is_not_found() => {
                debug!("Stack {} vanished during sweep", stack.id);
            }
            Err(e) => return Err(e),
        }
    }

    let failed = outcomes.iter().filter(|o| !o.succeeded()).count();
    if failed > 0 {
        warn!("{} teardown(s) reported failures", failed);
    }

    Ok(outcomes)
}

fn collect_ids(outcome: &TeardownOutcome, ids: &mut BTreeSet<Uuid>) {
    ids.insert(outcome.stack.id);
    for dependent in &outcome.dependents {
        collect_ids(dependent, ids);
    }
}

async fn tear_down(state: &AppState, stack: &Stack) -> std::result::Result<RunOutput, RunnerError> {
    let code = normalized_code(stack)?;
    state.runner.tear_down(&code, stack.cwd.as_deref()).await
}

// =============================================================================
// Status
// =============================================================================

/// Live status of a stack
pub async fn get_stack_status(state: &AppState, stack_id: Uuid) -> Result<StackStatus> {
    let stack = load_stack(state, stack_id).await?;
    stack_status(state, &stack).await
}

async fn stack_status(state: &AppState, stack: &Stack) -> Result<StackStatus> {
    let code = normalized_code(stack)?;
    Ok(query_status(state, &code, stack.cwd.as_deref()).await?)
}

/// Query the runner, retrying once without the working directory when the
/// first answer is empty
async fn query_status(
    state: &AppState,
    code: &str,
    cwd: Option<&str>,
) -> std::result::Result<StackStatus, RunnerError> {
    let mut processes = state.runner.query_status(code, cwd).await?;

    if processes.is_empty() && cwd.is_some() {
        debug!("Empty status with working directory, retrying without it");
        processes = state.runner.query_status(code, None).await?;
    }

    Ok(status_from_processes(processes))
}

fn status_from_processes(processes: Vec<ServiceProcess>) -> StackStatus {
    let services: BTreeMap<String, ServiceState> = processes
        .into_iter()
        .map(|process| {
            let key = [&process.container_id, &process.container_name]
                .into_iter()
                .find(|k| !k.is_empty())
                .unwrap_or(&process.service_name)
                .clone();
            (key, ServiceState::from(process))
        })
        .collect();

    StackStatus::from_services(services)
}

// =============================================================================
// Helpers
// =============================================================================

async fn load_stack(state: &AppState, stack_id: Uuid) -> Result<Stack> {
    state
        .store
        .find_stack(stack_id)
        .await?
        .ok_or(StackError::StackNotFound(stack_id))
}

fn normalized_code(stack: &Stack) -> std::result::Result<String, RunnerError> {
    manifest::normalize(&stack.code, &project_name(stack.id))
}
