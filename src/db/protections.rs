//! Protection rows keyed by canonical location
//!
//! Functions here take an already-canonical [`Location`]; resolving a block
//! to its canonical cell is the caller's job (see `LockService`).

use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::error::StorageError;
use crate::location::{BlockPos, Location};

/// Protection row, joined with the owner's current display name
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProtectionRow {
    pub location: Location,
    pub material: String,
    pub owner: Option<Uuid>,
    pub owner_name: Option<String>,
}

impl ProtectionRow {
    fn from_row(row: &Row) -> Result<Self, rusqlite::Error> {
        let owner: Option<String> = row.get("owner")?;
        let owner = owner
            .map(|text| Uuid::parse_str(&text))
            .transpose()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, Type::Text, Box::new(e)))?;

        Ok(Self {
            location: Location::new(
                row.get::<_, String>("world")?,
                BlockPos::new(row.get("x")?, row.get("y")?, row.get("z")?),
            ),
            material: row.get("material")?,
            owner,
            owner_name: row.get("owner_name")?,
        })
    }
}

/// Get the protection row at a canonical location
pub fn get_at(conn: &Connection, location: &Location) -> Result<Option<ProtectionRow>, StorageError> {
    let row = conn
        .query_row(
            r#"
            SELECT protected.x AS x, protected.y AS y, protected.z AS z,
                   protected.world AS world, protected.material AS material,
                   protected.owner AS owner, player.name AS owner_name
            FROM protected
            LEFT JOIN player ON protected.owner = player.uuid
            WHERE x = ?1 AND y = ?2 AND z = ?3 AND world = ?4
            "#,
            params![location.pos.x, location.pos.y, location.pos.z, location.world],
            |row| ProtectionRow::from_row(row),
        )
        .optional()?;

    Ok(row)
}

/// Insert or replace the protection at a canonical location
pub fn upsert(
    conn: &Connection,
    location: &Location,
    material: &str,
    owner: &Uuid,
) -> Result<(), StorageError> {
    conn.execute(
        r#"
        REPLACE INTO protected (x, y, z, world, material, owner)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
        params![
            location.pos.x,
            location.pos.y,
            location.pos.z,
            location.world,
            material,
            owner.to_string(),
        ],
    )?;

    debug!(%location, material, owner = %owner, "Locked");
    Ok(())
}

/// Delete the protection at a canonical location. Returns true if one existed.
pub fn delete_at(conn: &Connection, location: &Location) -> Result<bool, StorageError> {
    let changes = conn.execute(
        "DELETE FROM protected WHERE x = ?1 AND y = ?2 AND z = ?3 AND world = ?4",
        params![location.pos.x, location.pos.y, location.pos.z, location.world],
    )?;

    debug!(%location, removed = changes > 0, "Unlocked");
    Ok(changes > 0)
}

/// Number of cells locked by `owner`
pub fn count_for_owner(conn: &Connection, owner: &Uuid) -> Result<u64, StorageError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM protected WHERE owner = ?",
        params![owner.to_string()],
        |row| row.get(0),
    )?;

    Ok(count as u64)
}
