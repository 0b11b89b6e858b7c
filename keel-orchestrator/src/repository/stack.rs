//! Stack Repository
//!
//! Handles all database operations related to stacks.

use keel_core::domain::stack::Stack;
use keel_core::dto::stack::CreateStack;
use sqlx::PgPool;
use uuid::Uuid;

/// Create a new stack in the database
pub async fn create(pool: &PgPool, req: CreateStack) -> Result<Stack, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = chrono::Utc::now();

    let stack = Stack {
        id,
        name: req.name,
        code: req.code,
        cwd: req.cwd,
        notes: req.notes,
        created_at: now,
        updated_at: now,
    };

    sqlx::query(
        r#"
        INSERT INTO stacks (id, name, code, cwd, notes, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(stack.id)
    .bind(&stack.name)
    .bind(&stack.code)
    .bind(&stack.cwd)
    .bind(&stack.notes)
    .bind(stack.created_at)
    .bind(stack.updated_at)
    .execute(pool)
    .await?;

    Ok(stack)
}

/// Find a stack by ID
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Stack>, sqlx::Error> {
    let row = sqlx::query_as::<_, StackRow>(
        r#"
        SELECT id, name, code, cwd, notes, created_at, updated_at
        FROM stacks
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// List all stacks, oldest first
pub async fn list_all(pool: &PgPool) -> Result<Vec<Stack>, sqlx::Error> {
    let rows = sqlx::query_as::<_, StackRow>(
        r#"
        SELECT id, name, code, cwd, notes, created_at, updated_at
        FROM stacks
        ORDER BY created_at ASC, id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Update a stack, returning the stored row
pub async fn update(pool: &PgPool, stack: &Stack) -> Result<Option<Stack>, sqlx::Error> {
    let row = sqlx::query_as::<_, StackRow>(
        r#"
        UPDATE stacks
        SET name = $1, code = $2, cwd = $3, notes = $4, updated_at = $5
        WHERE id = $6
        RETURNING id, name, code, cwd, notes, created_at, updated_at
        "#,
    )
    .bind(&stack.name)
    .bind(&stack.code)
    .bind(&stack.cwd)
    .bind(&stack.notes)
    .bind(chrono::Utc::now())
    .bind(stack.id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// Delete a stack by ID; edges go with it via ON DELETE CASCADE
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM stacks WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct StackRow {
    id: Uuid,
    name: String,
    code: String,
    cwd: Option<String>,
    notes: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<StackRow> for Stack {
    fn from(row: StackRow) -> Self {
        Stack {
            id: row.id,
            name: row.name,
            code: row.code,
            cwd: row.cwd,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
