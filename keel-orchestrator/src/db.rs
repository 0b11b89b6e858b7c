use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    // Create stacks table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS stacks (
            id UUID PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            code TEXT NOT NULL,
            cwd TEXT,
            notes TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create dependency edges table; one row per ordered pair, never a loop
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS stack_dependencies (
            id UUID PRIMARY KEY,
            stack_id UUID NOT NULL REFERENCES stacks(id) ON DELETE CASCADE,
            depends_on_stack_id UUID NOT NULL REFERENCES stacks(id) ON DELETE CASCADE,
            notes TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMPTZ NOT NULL,
            CHECK (stack_id <> depends_on_stack_id),
            UNIQUE (stack_id, depends_on_stack_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_stacks_created_at ON stacks(created_at)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_stack_dependencies_stack_id ON stack_dependencies(stack_id)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_stack_dependencies_depends_on ON stack_dependencies(depends_on_stack_id)",
    )
    .execute(pool)
    .await?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}
