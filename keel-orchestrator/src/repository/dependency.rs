//! Stack Dependency Repository
//!
//! Handles all database operations related to dependency edges.

use keel_core::domain::stack::StackDependency;
use keel_core::dto::dependency::CreateStackDependency;
use sqlx::PgPool;
use uuid::Uuid;

use super::DependencyFilter;

/// Create a new edge in the database
pub async fn create(
    pool: &PgPool,
    req: CreateStackDependency,
) -> Result<StackDependency, sqlx::Error> {
    let edge = StackDependency {
        id: Uuid::new_v4(),
        stack_id: req.stack_id,
        depends_on_stack_id: req.depends_on_stack_id,
        notes: req.notes,
        created_at: chrono::Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO stack_dependencies (id, stack_id, depends_on_stack_id, notes, created_at)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(edge.id)
    .bind(edge.stack_id)
    .bind(edge.depends_on_stack_id)
    .bind(&edge.notes)
    .bind(edge.created_at)
    .execute(pool)
    .await?;

    Ok(edge)
}

/// Find an edge by ID
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<StackDependency>, sqlx::Error> {
    let row = sqlx::query_as::<_, StackDependencyRow>(
        r#"
        SELECT id, stack_id, depends_on_stack_id, notes, created_at
        FROM stack_dependencies
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// List edges matching the filter, oldest first
pub async fn list_where(
    pool: &PgPool,
    filter: DependencyFilter,
) -> Result<Vec<StackDependency>, sqlx::Error> {
    let rows = sqlx::query_as::<_, StackDependencyRow>(
        r#"
        SELECT id, stack_id, depends_on_stack_id, notes, created_at
        FROM stack_dependencies
        WHERE ($1::uuid IS NULL OR stack_id = $1)
          AND ($2::uuid IS NULL OR depends_on_stack_id = $2)
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .bind(filter.stack_id)
    .bind(filter.depends_on_stack_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Update an edge's endpoints and notes
pub async fn update(pool: &PgPool, edge: &StackDependency) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE stack_dependencies
        SET stack_id = $1, depends_on_stack_id = $2, notes = $3
        WHERE id = $4
        "#,
    )
    .bind(edge.stack_id)
    .bind(edge.depends_on_stack_id)
    .bind(&edge.notes)
    .bind(edge.id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete an edge by ID
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM stack_dependencies WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct StackDependencyRow {
    id: Uuid,
    stack_id: Uuid,
    depends_on_stack_id: Uuid,
    notes: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<StackDependencyRow> for StackDependency {
    fn from(row: StackDependencyRow) -> Self {
        StackDependency {
            id: row.id,
            stack_id: row.stack_id,
            depends_on_stack_id: row.depends_on_stack_id,
            notes: row.notes,
            created_at: row.created_at,
        }
    }
}
