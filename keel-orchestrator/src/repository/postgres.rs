//! PostgreSQL stack store
//!
//! Thin adapter from [`StackStore`] onto the sqlx query functions in
//! [`super::stack`] and [`super::dependency`].

use async_trait::async_trait;
use keel_core::domain::stack::{Stack, StackDependency};
use keel_core::dto::dependency::CreateStackDependency;
use keel_core::dto::stack::CreateStack;
use sqlx::PgPool;
use sqlx::error::ErrorKind;
use uuid::Uuid;

use super::{DependencyFilter, Result, StackStore, StoreError, dependency, stack};

#[derive(Debug, Clone)]
pub struct PgStackStore {
    pool: PgPool,
}

impl PgStackStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StackStore for PgStackStore {
    async fn find_stack(&self, id: Uuid) -> Result<Option<Stack>> {
        Ok(stack::find_by_id(&self.pool, id).await?)
    }

    async fn create_stack(&self, req: CreateStack) -> Result<Stack> {
        Ok(stack::create(&self.pool, req).await?)
    }

    async fn update_stack(&self, s: &Stack) -> Result<Stack> {
        stack::update(&self.pool, s)
            .await?
            .ok_or(StoreError::StackNotFound(s.id))
    }

    async fn delete_stack(&self, id: Uuid) -> Result<()> {
        if stack::delete(&self.pool, id).await? {
            Ok(())
        } else {
            Err(StoreError::StackNotFound(id))
        }
    }

    async fn list_stacks(&self) -> Result<Vec<Stack>> {
        Ok(stack::list_all(&self.pool).await?)
    }

    async fn find_dependency(&self, id: Uuid) -> Result<Option<StackDependency>> {
        Ok(dependency::find_by_id(&self.pool, id).await?)
    }

    async fn create_dependency(&self, req: CreateStackDependency) -> Result<StackDependency> {
        let (stack_id, depends_on_stack_id) = (req.stack_id, req.depends_on_stack_id);

        dependency::create(&self.pool, req)
            .await
            .map_err(|e| classify(e, stack_id, depends_on_stack_id))
    }

    async fn update_dependency(&self, edge: &StackDependency) -> Result<StackDependency> {
        let updated = dependency::update(&self.pool, edge)
            .await
            .map_err(|e| classify(e, edge.stack_id, edge.depends_on_stack_id))?;

        if updated {
            Ok(edge.clone())
        } else {
            Err(StoreError::DependencyNotFound(edge.id))
        }
    }

    async fn delete_dependency(&self, id: Uuid) -> Result<()> {
        if dependency::delete(&self.pool, id).await? {
            Ok(())
        } else {
            Err(StoreError::DependencyNotFound(id))
        }
    }

    async fn list_dependencies(&self, filter: DependencyFilter) -> Result<Vec<StackDependency>> {
        Ok(dependency::list_where(&self.pool, filter).await?)
    }
}

/// Map constraint violations on `stack_dependencies` to store errors
///
/// A foreign key violation does not say which endpoint is missing, so the
/// dependent side is reported unless the constraint name points at the other.
fn classify(err: sqlx::Error, stack_id: Uuid, depends_on_stack_id: Uuid) -> StoreError {
    let sqlx::Error::Database(db) = &err else {
        return StoreError::Database(err);
    };

    match db.kind() {
        ErrorKind::ForeignKeyViolation => {
            let missing = match db.constraint() {
                Some(name) if name.contains("depends_on") => depends_on_stack_id,
                _ => stack_id,
            };
            StoreError::MissingStack(missing)
        }
        ErrorKind::UniqueViolation => StoreError::DuplicateDependency {
            stack_id,
            depends_on_stack_id,
        },
        _ => StoreError::Database(err),
    }
}
