//! In-memory stack store
//!
//! Process-local backend behind `DATABASE_URL=memory`. Also the store every
//! service test runs against. Enforces the same constraints as the
//! PostgreSQL schema: edge endpoints must exist, an ordered pair appears at
//! most once, and deleting a stack removes its edges.

use async_trait::async_trait;
use keel_core::domain::stack::{Stack, StackDependency};
use keel_core::dto::dependency::CreateStackDependency;
use keel_core::dto::stack::CreateStack;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{DependencyFilter, Result, StackStore, StoreError};

#[derive(Debug, Default)]
pub struct InMemoryStackStore {
    inner: RwLock<Inner>,
}

/// Rows kept in insertion order, which is also creation order
#[derive(Debug, Default)]
struct Inner {
    stacks: Vec<Stack>,
    dependencies: Vec<StackDependency>,
}

impl Inner {
    fn has_stack(&self, id: Uuid) -> bool {
        self.stacks.iter().any(|s| s.id == id)
    }

    fn check_edge(&self, edge: &StackDependency) -> Result<()> {
        for id in [edge.stack_id, edge.depends_on_stack_id] {
            if !self.has_stack(id) {
                return Err(StoreError::MissingStack(id));
            }
        }

        let duplicate = self.dependencies.iter().any(|d| {
            d.id != edge.id
                && d.stack_id == edge.stack_id
                && d.depends_on_stack_id == edge.depends_on_stack_id
        });
        if duplicate {
            return Err(StoreError::DuplicateDependency {
                stack_id: edge.stack_id,
                depends_on_stack_id: edge.depends_on_stack_id,
            });
        }

        Ok(())
    }
}

impl InMemoryStackStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StackStore for InMemoryStackStore {
    async fn find_stack(&self, id: Uuid) -> Result<Option<Stack>> {
        let inner = self.inner.read().await;
        Ok(inner.stacks.iter().find(|s| s.id == id).cloned())
    }

    async fn create_stack(&self, req: CreateStack) -> Result<Stack> {
        let now = chrono::Utc::now();
        let stack = Stack {
            id: Uuid::new_v4(),
            name: req.name,
            code: req.code,
            cwd: req.cwd,
            notes: req.notes,
            created_at: now,
            updated_at: now,
        };

        self.inner.write().await.stacks.push(stack.clone());
        Ok(stack)
    }

    async fn update_stack(&self, stack: &Stack) -> Result<Stack> {
        let mut inner = self.inner.write().await;
        let slot = inner
            .stacks
            .iter_mut()
            .find(|s| s.id == stack.id)
            .ok_or(StoreError::StackNotFound(stack.id))?;

        *slot = Stack {
            created_at: slot.created_at,
            updated_at: chrono::Utc::now(),
            ..stack.clone()
        };
        Ok(slot.clone())
    }

    async fn delete_stack(&self, id: Uuid) -> Result<()> {
        let mut inner = self.inner.write().await;
        if !inner.has_stack(id) {
            return Err(StoreError::StackNotFound(id));
        }

        inner.stacks.retain(|s| s.id != id);
        inner.dependencies.retain(|d| !d.touches(id));
        Ok(())
    }

    async fn list_stacks(&self) -> Result<Vec<Stack>> {
        Ok(self.inner.read().await.stacks.clone())
    }

    async fn find_dependency(&self, id: Uuid) -> Result<Option<StackDependency>> {
        let inner = self.inner.read().await;
        Ok(inner.dependencies.iter().find(|d| d.id == id).cloned())
    }

    async fn create_dependency(&self, req: CreateStackDependency) -> Result<StackDependency> {
        let edge = StackDependency {
            id: Uuid::new_v4(),
            stack_id: req.stack_id,
            depends_on_stack_id: req.depends_on_stack_id,
            notes: req.notes,
            created_at: chrono::Utc::now(),
        };

        let mut inner = self.inner.write().await;
        inner.check_edge(&edge)?;
        inner.dependencies.push(edge.clone());
        Ok(edge)
    }

    async fn update_dependency(&self, edge: &StackDependency) -> Result<StackDependency> {
        let mut inner = self.inner.write().await;
        inner.check_edge(edge)?;

        let slot = inner
            .dependencies
            .iter_mut()
            .find(|d| d.id == edge.id)
            .ok_or(StoreError::DependencyNotFound(edge.id))?;

        *slot = StackDependency {
            created_at: slot.created_at,
            ..edge.clone()
        };
        Ok(slot.clone())
    }

    async fn delete_dependency(&self, id: Uuid) -> Result<()> {
        let mut inner = self.inner.write().await;
        let before = inner.dependencies.len();
        inner.dependencies.retain(|d| d.id != id);

        if inner.dependencies.len() == before {
            return Err(StoreError::DependencyNotFound(id));
        }
        Ok(())
    }

    async fn list_dependencies(&self, filter: DependencyFilter) -> Result<Vec<StackDependency>> {
        let inner = self.inner.read().await;
        Ok(inner
            .dependencies
            .iter()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect())
    }
}
