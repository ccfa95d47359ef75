//! Access groups: named sets of players, scoped to an owner
//!
//! A group exists as long as it has at least one member row. Group names
//! and member names match case-insensitively; the first spelling used for a
//! group is the one kept.

use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;
use uuid::Uuid;

use crate::db::players;
use crate::error::StorageError;

/// Stored spelling of `group` for `owner`, if the group exists
fn existing_group_name(
    conn: &Connection,
    owner: &Uuid,
    group: &str,
) -> Result<Option<String>, StorageError> {
    let name = conn
        .query_row(
            "SELECT name FROM access_group WHERE owner = ?1 AND name = ?2 COLLATE NOCASE LIMIT 1",
            params![owner.to_string(), group],
            |row| row.get(0),
        )
        .optional()?;

    Ok(name)
}

fn resolve_member(conn: &Connection, member_name: &str) -> Result<Uuid, StorageError> {
    players::find_by_name(conn, member_name)?
        .ok_or_else(|| StorageError::UnknownPlayer(member_name.to_string()))
}

/// Add a known player to `group`, creating the group if needed.
///
/// Fails with [`StorageError::UnknownPlayer`] without writing anything if no
/// player has that name. Returns the member's id.
pub fn add_member(
    conn: &mut Connection,
    owner: &Uuid,
    group: &str,
    member_name: &str,
) -> Result<Uuid, StorageError> {
    let tx = conn.transaction()?;

    let member = resolve_member(&tx, member_name)?;
    let group = existing_group_name(&tx, owner, group)?.unwrap_or_else(|| group.to_string());

    tx.execute(
        "INSERT OR REPLACE INTO access_group (owner, name, member) VALUES (?1, ?2, ?3)",
        params![owner.to_string(), group, member.to_string()],
    )?;

    tx.commit()?;

    debug!(owner = %owner, group = %group, member = %member, "Added group member");
    Ok(member)
}

/// Remove a known player from `group`. Returns true if they were a member.
pub fn remove_member(
    conn: &mut Connection,
    owner: &Uuid,
    group: &str,
    member_name: &str,
) -> Result<bool, StorageError> {
    let tx = conn.transaction()?;

    let member = resolve_member(&tx, member_name)?;

    let changes = tx.execute(
        "DELETE FROM access_group WHERE owner = ?1 AND name = ?2 COLLATE NOCASE AND member = ?3",
        params![owner.to_string(), group, member.to_string()],
    )?;

    tx.commit()?;

    debug!(owner = %owner, group, member = %member, removed = changes > 0, "Removed group member");
    Ok(changes > 0)
}

/// Rename every row of `old_name` to `new_name`.
///
/// Renaming onto another existing group merges the two. Fails with
/// [`StorageError::GroupNotFound`] if `old_name` has no members. Returns the
/// number of membership rows moved.
pub fn rename_group(
    conn: &mut Connection,
    owner: &Uuid,
    old_name: &str,
    new_name: &str,
) -> Result<u64, StorageError> {
    let tx = conn.transaction()?;

    // Merging into another group keeps that group's spelling; a pure case
    // change takes the new spelling.
    let target = if old_name.eq_ignore_ascii_case(new_name) {
        new_name.to_string()
    } else {
        existing_group_name(&tx, owner, new_name)?.unwrap_or_else(|| new_name.to_string())
    };

    let changes = tx.execute(
        "UPDATE OR REPLACE access_group SET name = ?1 WHERE owner = ?2 AND name = ?3 COLLATE NOCASE",
        params![target, owner.to_string(), old_name],
    )?;

    if changes == 0 {
        return Err(StorageError::GroupNotFound(old_name.to_string()));
    }

    tx.commit()?;

    debug!(owner = %owner, from = old_name, to = %target, rows = changes, "Renamed group");
    Ok(changes as u64)
}

/// Display names of the members of `group`, ordered by name.
///
/// Members with no known display name are left out.
pub fn list_members(conn: &Connection, owner: &Uuid, group: &str) -> Result<Vec<String>, StorageError> {
    let mut stmt = conn.prepare(
        r#"
        SELECT player.name
        FROM access_group
        INNER JOIN player ON access_group.member = player.uuid
        WHERE access_group.owner = ?1
          AND access_group.name = ?2 COLLATE NOCASE
          AND player.name IS NOT NULL
        ORDER BY player.name COLLATE NOCASE
        "#,
    )?;

    let names = stmt
        .query_map(params![owner.to_string(), group], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;

    Ok(names)
}

/// Distinct group names owned by `owner`, ordered
pub fn list_group_names(conn: &Connection, owner: &Uuid) -> Result<Vec<String>, StorageError> {
    let mut stmt = conn.prepare(
        "SELECT name FROM access_group WHERE owner = ? GROUP BY name ORDER BY name COLLATE NOCASE",
    )?;

    let names = stmt
        .query_map(params![owner.to_string()], |row| row.get(0))?
        .collect::<Result<Vec<String>, _>>()?;

    Ok(names)
}

/// Whether `member` belongs to `owner`'s `group`
pub fn is_member(
    conn: &Connection,
    owner: &Uuid,
    group: &str,
    member: &Uuid,
) -> Result<bool, StorageError> {
    let found = conn
        .query_row(
            "SELECT 1 FROM access_group WHERE owner = ?1 AND name = ?2 COLLATE NOCASE AND member = ?3",
            params![owner.to_string(), group, member.to_string()],
            |_| Ok(()),
        )
        .optional()?;

    Ok(found.is_some())
}
