//! Test doubles for service tests

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use keel_compose::{Manifest, ManifestRunner, RunnerError, ServiceProcess};
use keel_core::domain::stack::{Stack, StackDependency};
use keel_core::dto::deploy::RunOutput;
use keel_core::dto::dependency::CreateStackDependency;
use keel_core::dto::stack::CreateStack;
use uuid::Uuid;

use super::orchestrator::project_name;
use crate::repository::{InMemoryStackStore, StackStore};
use crate::state::AppState;

pub const SAMPLE_MANIFEST: &str = "services:\n  web:\n    image: nginx:alpine\n";

/// One bring-up or tear-down, by compose project name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunnerCall {
    Up(String),
    Down(String),
}

#[derive(Debug, Default)]
struct FakeState {
    running: HashSet<String>,
    unhealthy: HashSet<String>,
    fail_up: HashSet<String>,
    fail_down: HashSet<String>,
    fail_status: HashSet<String>,
    empty_status_with_cwd: bool,
    calls: Vec<RunnerCall>,
}

/// In-memory manifest runner keyed by the manifest's project name
#[derive(Debug, Default)]
pub struct FakeRunner {
    state: Mutex<FakeState>,
}

impl FakeRunner {
    pub fn is_running(&self, stack_id: Uuid) -> bool {
        self.state
            .lock()
            .unwrap()
            .running
            .contains(&project_name(stack_id))
    }

    /// Services of this stack come up exited with a non-zero code
    pub fn mark_unhealthy(&self, stack_id: Uuid) {
        self.state
            .lock()
            .unwrap()
            .unhealthy
            .insert(project_name(stack_id));
    }

    pub fn fail_bring_up(&self, stack_id: Uuid) {
        self.state
            .lock()
            .unwrap()
            .fail_up
            .insert(project_name(stack_id));
    }

    pub fn fail_tear_down(&self, stack_id: Uuid) {
        self.state
            .lock()
            .unwrap()
            .fail_down
            .insert(project_name(stack_id));
    }

    /// Status queries for this stack return an unparsable answer
    pub fn fail_status(&self, stack_id: Uuid) {
        self.state
            .lock()
            .unwrap()
            .fail_status
            .insert(project_name(stack_id));
    }

    /// Pretend the runtime returns nothing when a working directory is passed
    pub fn empty_status_with_cwd(&self) {
        self.state.lock().unwrap().empty_status_with_cwd = true;
    }

    pub fn set_running(&self, stack_id: Uuid) {
        self.state
            .lock()
            .unwrap()
            .running
            .insert(project_name(stack_id));
    }

    pub fn calls(&self) -> Vec<RunnerCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    fn project(code: &str) -> Result<(String, Vec<String>), RunnerError> {
        let manifest = Manifest::parse(code)?;
        let project = manifest
            .project_name()
            .ok_or_else(|| RunnerError::invalid_manifest("manifest was not normalized"))?
            .to_string();
        Ok((project, manifest.service_names()))
    }

    fn output(verb: &str, project: &str) -> RunOutput {
        RunOutput {
            command: format!("fake compose {} {}", verb, project),
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    fn failure(verb: &str, project: &str) -> RunnerError {
        RunnerError::CommandFailed {
            command: format!("fake compose {} {}", verb, project),
            exit_code: 1,
            stderr: "simulated failure".to_string(),
        }
    }
}

#[async_trait]
impl ManifestRunner for FakeRunner {
    async fn validate_manifest(&self, code: &str, _cwd: Option<&str>) -> keel_compose::Result<Manifest> {
        Manifest::parse(code)
    }

    async fn bring_up(&self, code: &str, _cwd: Option<&str>) -> keel_compose::Result<RunOutput> {
        let (project, _) = Self::project(code)?;
        let mut state = self.state.lock().unwrap();
        state.calls.push(RunnerCall::Up(project.clone()));

        if state.fail_up.contains(&project) {
            return Err(Self::failure("up", &project));
        }

        state.running.insert(project.clone());
        Ok(Self::output("up", &project))
    }

    async fn tear_down(&self, code: &str, _cwd: Option<&str>) -> keel_compose::Result<RunOutput> {
        let (project, _) = Self::project(code)?;
        let mut state = self.state.lock().unwrap();
        state.calls.push(RunnerCall::Down(project.clone()));

        if state.fail_down.contains(&project) {
            return Err(Self::failure("down", &project));
        }

        state.running.remove(&project);
        Ok(Self::output("down", &project))
    }

    async fn query_status(
        &self,
        code: &str,
        cwd: Option<&str>,
    ) -> keel_compose::Result<Vec<ServiceProcess>> {
        let (project, services) = Self::project(code)?;
        let state = self.state.lock().unwrap();

        if state.fail_status.contains(&project) {
            return Err(RunnerError::StatusParse {
                reason: "unexpected ps output".to_string(),
            });
        }

        if !state.running.contains(&project) || (cwd.is_some() && state.empty_status_with_cwd) {
            return Ok(Vec::new());
        }

        let healthy = !state.unhealthy.contains(&project);
        Ok(services
            .into_iter()
            .map(|service| ServiceProcess {
                container_id: format!("{}-{}-id", project, service),
                container_name: format!("{}-{}-1", project, service),
                running_state: if healthy { "running" } else { "exited" }.to_string(),
                exit_code: if healthy { 0 } else { 1 },
                status_text: if healthy { "Up" } else { "Exited (1)" }.to_string(),
                service_name: service,
            })
            .collect())
    }
}

/// Fresh in-memory state wired to a fake runner
pub fn test_state() -> (AppState, Arc<FakeRunner>) {
    let runner = Arc::new(FakeRunner::default());
    let state = AppState::new(Arc::new(InMemoryStackStore::new()), runner.clone());
    (state, runner)
}

pub fn create_req(name: &str) -> CreateStack {
    CreateStack {
        name: name.to_string(),
        code: SAMPLE_MANIFEST.to_string(),
        cwd: None,
        notes: String::new(),
    }
}

pub async fn create_stack_in(store: &dyn StackStore, name: &str) -> Stack {
    store.create_stack(create_req(name)).await.unwrap()
}

/// Store `stack_id -> depends_on_stack_id` without validation
pub async fn link_in(
    store: &dyn StackStore,
    stack_id: Uuid,
    depends_on_stack_id: Uuid,
) -> StackDependency {
    store
        .create_dependency(CreateStackDependency {
            stack_id,
            depends_on_stack_id,
            notes: String::new(),
        })
        .await
        .unwrap()
}
