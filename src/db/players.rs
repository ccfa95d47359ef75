//! Player registry

use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::error::StorageError;

/// A player as reported by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerIdentity {
    pub id: Uuid,
    /// Current display name; may change between sessions
    pub name: String,
}

impl PlayerIdentity {
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Player row from database
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerRow {
    pub id: Uuid,
    pub name: Option<String>,
    pub notify: bool,
}

impl PlayerRow {
    fn from_row(row: &Row) -> Result<Self, rusqlite::Error> {
        Ok(Self {
            id: uuid_column(row, 0)?,
            name: row.get(1)?,
            notify: row.get(2)?,
        })
    }
}

/// Read a CHAR(36) uuid column
pub(crate) fn uuid_column(row: &Row, idx: usize) -> Result<Uuid, rusqlite::Error> {
    let text: String = row.get(idx)?;
    Uuid::parse_str(&text)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Insert a player or refresh their display name.
///
/// An existing notify flag is left as it is.
pub fn upsert(conn: &Connection, player: &PlayerIdentity) -> Result<(), StorageError> {
    conn.execute(
        r#"
        INSERT INTO player (uuid, name) VALUES (?1, ?2)
        ON CONFLICT(uuid) DO UPDATE SET name = excluded.name
        "#,
        params![player.id.to_string(), player.name],
    )?;

    debug!(player = %player.id, name = %player.name, "Upserted player");
    Ok(())
}

/// Get player by ID
pub fn get_player(conn: &Connection, id: &Uuid) -> Result<Option<PlayerRow>, StorageError> {
    let row = conn
        .query_row(
            "SELECT uuid, name, notify FROM player WHERE uuid = ?",
            params![id.to_string()],
            |row| PlayerRow::from_row(row),
        )
        .optional()?;

    Ok(row)
}

/// Current display name for a player id
pub fn display_name(conn: &Connection, id: &Uuid) -> Result<Option<String>, StorageError> {
    Ok(get_player(conn, id)?.and_then(|p| p.name))
}

/// Find a player id by display name, ignoring case.
///
/// Names are not unique over time; if two rows carry the same name the
/// lowest id wins.
pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<Uuid>, StorageError> {
    let id = conn
        .query_row(
            "SELECT uuid FROM player WHERE name = ?1 COLLATE NOCASE ORDER BY uuid LIMIT 1",
            params![name],
            |row| uuid_column(row, 0),
        )
        .optional()?;

    Ok(id)
}

pub fn get_notify(conn: &Connection, id: &Uuid) -> Result<Option<bool>, StorageError> {
    Ok(get_player(conn, id)?.map(|p| p.notify))
}

/// Set the notify flag. Returns false if the player is not known.
pub fn set_notify(conn: &Connection, id: &Uuid, notify: bool) -> Result<bool, StorageError> {
    let changes = conn.execute(
        "UPDATE player SET notify = ?1 WHERE uuid = ?2",
        params![notify, id.to_string()],
    )?;

    Ok(changes > 0)
}
