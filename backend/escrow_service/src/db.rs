//! Database layer: migrations, the command log and event queries.

use ops_escrow::{Address, Command, RegistryConfig};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::{debug, info};

use crate::errors::Result;
use crate::events::{CommandRecord, EventRecord, NewEvent};

/// Establish a SQLite connection pool and run pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };
    let url = if url.contains(":memory:") || url.contains("mode=") {
        url
    } else if url.contains('?') {
        format!("{url}&mode=rwc")
    } else {
        // Create the file if it doesn't exist yet.
        format!("{url}?mode=rwc")
    };

    // Every connection to an in-memory database sees its own empty schema.
    let max_connections = if url.contains(":memory:") { 1 } else { 5 };

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect(&url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied successfully");
    Ok(pool)
}

// ─────────────────────────────────────────────────────────
// Registry config
// ─────────────────────────────────────────────────────────

/// Read back the registry config the log was recorded under, if any.
pub async fn load_registry_config(pool: &SqlitePool) -> Result<Option<RegistryConfig>> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT payload FROM registry_config WHERE id = 1")
            .fetch_optional(pool)
            .await?;
    match row {
        Some((payload,)) => Ok(Some(serde_json::from_str(&payload)?)),
        None => Ok(None),
    }
}

/// Record the registry config. Keeps the first stored config.
pub async fn save_registry_config(pool: &SqlitePool, config: &RegistryConfig) -> Result<()> {
    sqlx::query(
        "INSERT OR IGNORE INTO registry_config (id, payload, created_at) VALUES (1, ?1, ?2)",
    )
    .bind(serde_json::to_string(config)?)
    .bind(chrono::Utc::now().timestamp())
    .execute(pool)
    .await?;
    Ok(())
}

// ─────────────────────────────────────────────────────────
// Command log
// ─────────────────────────────────────────────────────────

/// Append a command and the events it emitted in one transaction.
/// Returns the command's sequence number.
pub async fn append_command(
    pool: &SqlitePool,
    caller: &Address,
    command: &Command,
    events: &[NewEvent],
) -> Result<i64> {
    let payload = serde_json::to_string(command)?;
    let now = chrono::Utc::now().timestamp();

    let mut tx = pool.begin().await?;

    let seq = sqlx::query(
        r#"
        INSERT INTO commands (caller, name, payload, created_at)
        VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(caller.as_str())
    .bind(command.name())
    .bind(&payload)
    .bind(now)
    .execute(&mut *tx)
    .await?
    .last_insert_rowid();

    for ev in events {
        sqlx::query(
            r#"
            INSERT INTO events
                (command_seq, event_type, project_id, actor, amount, payload, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(seq)
        .bind(&ev.event_type)
        .bind(&ev.project_id)
        .bind(&ev.actor)
        .bind(&ev.amount)
        .bind(&ev.payload)
        .bind(now)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;
    debug!(seq, command = command.name(), events = events.len(), "command logged");
    Ok(seq)
}

/// Fetch the whole command log in sequence order.
pub async fn load_commands(pool: &SqlitePool) -> Result<Vec<CommandRecord>> {
    let rows = sqlx::query_as::<_, CommandRecord>(
        r#"
        SELECT seq, caller, name, payload, created_at
        FROM   commands
        ORDER  BY seq ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

// ─────────────────────────────────────────────────────────
// Event reads
// ─────────────────────────────────────────────────────────

/// Fetch all events for a given project, in emission order.
pub async fn get_events_for_project(
    pool: &SqlitePool,
    project_id: &str,
) -> Result<Vec<EventRecord>> {
    let rows = sqlx::query_as::<_, EventRecord>(
        r#"
        SELECT id, command_seq, event_type, project_id, actor, amount, payload, created_at
        FROM   events
        WHERE  project_id = ?1
        ORDER  BY id ASC
        "#,
    )
    .bind(project_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Fetch all events, in emission order.
pub async fn get_all_events(pool: &SqlitePool) -> Result<Vec<EventRecord>> {
    let rows = sqlx::query_as::<_, EventRecord>(
        r#"
        SELECT id, command_seq, event_type, project_id, actor, amount, payload, created_at
        FROM   events
        ORDER  BY id ASC
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}
