//! Database schema definitions

use rusqlite::{Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::StorageError;

/// Current schema version for migrations
pub const SCHEMA_VERSION: i32 = 1;

/// Initialize the database schema
pub fn init_schema(conn: &Connection) -> Result<(), StorageError> {
    let current_version = get_schema_version(conn)?;

    if current_version == 0 {
        info!("Creating new database schema v{}", SCHEMA_VERSION);
        create_tables(conn)?;
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if current_version < SCHEMA_VERSION {
        info!("Migrating schema from v{} to v{}", current_version, SCHEMA_VERSION);
        migrate_schema(conn, current_version)?;
    } else {
        info!("Database schema is up to date (v{})", current_version);
        // Tables are created with IF NOT EXISTS, so this repairs a partial schema
        create_tables(conn)?;
    }

    Ok(())
}

/// Get current schema version (0 if not initialized)
fn get_schema_version(conn: &Connection) -> Result<i32, StorageError> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)",
        [],
    )?;

    let version: Option<i32> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| row.get(0))
        .optional()?;

    Ok(version.unwrap_or(0))
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<(), StorageError> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?)", [version])?;
    Ok(())
}

fn create_tables(conn: &Connection) -> Result<(), StorageError> {
    conn.execute_batch(LOCKS_SCHEMA)
        .map_err(|e| StorageError::Internal(format!("Failed to create lock tables: {}", e)))?;

    conn.execute_batch(INDEXES_SCHEMA)
        .map_err(|e| StorageError::Internal(format!("Failed to create indexes: {}", e)))?;

    Ok(())
}

fn migrate_schema(conn: &Connection, from_version: i32) -> Result<(), StorageError> {
    // No earlier versions were released; bring any older layout up to date
    debug!("Applying migrations from v{}", from_version);
    create_tables(conn)?;

    set_schema_version(conn, SCHEMA_VERSION)?;
    Ok(())
}

const LOCKS_SCHEMA: &str = r#"
-- Known players. notify is a per-player preference and survives re-insertion.
CREATE TABLE IF NOT EXISTS player (
    uuid CHAR(36) PRIMARY KEY NOT NULL,
    name TEXT,
    notify TINYINT NOT NULL DEFAULT 0
);

-- Locked cells. The key is always a canonical location.
-- owner references player.uuid; not enforced here.
CREATE TABLE IF NOT EXISTS protected (
    x INTEGER NOT NULL,
    y INTEGER NOT NULL,
    z INTEGER NOT NULL,
    world TEXT NOT NULL,
    material TEXT NOT NULL,
    owner CHAR(36),
    PRIMARY KEY (x, y, z, world)
);

-- Access groups: one row per (owner, group, member)
CREATE TABLE IF NOT EXISTS access_group (
    owner CHAR(36) NOT NULL,
    name TEXT NOT NULL,
    member CHAR(36) NOT NULL,
    PRIMARY KEY (owner, name, member)
);
"#;

const INDEXES_SCHEMA: &str = r#"
CREATE INDEX IF NOT EXISTS idx_player_name ON player(name COLLATE NOCASE);
CREATE INDEX IF NOT EXISTS idx_protected_owner ON protected(owner);
CREATE INDEX IF NOT EXISTS idx_access_group_member ON access_group(member);
"#;
