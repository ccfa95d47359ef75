//! Lock service - protections, players and access groups
//!
//! Wraps the repositories with canonical-location resolution and the
//! protectable-material check. Every method returns a `Result`; callers that
//! want the old absorb-and-log behavior opt in with
//! [`Lenient::or_log`](crate::error::Lenient::or_log).

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::Config;
use crate::db::players::PlayerIdentity;
use crate::db::{access_groups, players, protections, DbStats, LockDb};
use crate::error::StorageError;
use crate::location::{canonical_location, BlockRef};
use crate::materials::{MaterialCatalog, ProtectableMaterials};

/// Protection state of a block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Protection {
    /// The block's material, or `None` if that material cannot be locked
    pub material: Option<String>,
    pub locked: bool,
    pub owner: Option<Uuid>,
    pub owner_name: Option<String>,
}

/// Lock service
pub struct LockService {
    db: Arc<LockDb>,
    protectables: ProtectableMaterials,
}

impl LockService {
    pub fn new(db: Arc<LockDb>, protectables: ProtectableMaterials) -> Self {
        Self { db, protectables }
    }

    /// Open the store described by `config` and load the protectable set.
    ///
    /// Schema failures are returned; the host should not start without a
    /// complete schema.
    pub fn initialize(config: &Config, catalog: &dyn MaterialCatalog) -> Result<Self, StorageError> {
        let db = LockDb::open_with_config(config)?;
        let protectables = ProtectableMaterials::from_config(&config.protectables, catalog);
        let db_path = config.database_path();
        info!(
            db = %db_path.display(),
            protectables = protectables.len(),
            "Lock service ready"
        );
        Ok(Self::new(Arc::new(db), protectables))
    }

    pub fn db(&self) -> &Arc<LockDb> {
        &self.db
    }

    pub fn protectables(&self) -> &ProtectableMaterials {
        &self.protectables
    }

    // =========================================================================
    // Protections
    // =========================================================================

    /// Protection state of `block`.
    ///
    /// A stored row only counts if the block's current material is
    /// protectable and matches the material that was locked.
    pub fn get_protection(&self, block: &dyn BlockRef) -> Result<Protection, StorageError> {
        let material = block.material();
        if !self.protectables.contains(material) {
            return Ok(Protection::default());
        }

        let location = canonical_location(block);
        let row = self.db.with_conn(|conn| protections::get_at(conn, &location))?;

        let protection = match row {
            Some(row) if row.material.eq_ignore_ascii_case(material) && row.owner.is_some() => {
                Protection {
                    material: Some(material.to_string()),
                    locked: true,
                    owner: row.owner,
                    owner_name: row.owner_name,
                }
            }
            _ => Protection {
                material: Some(material.to_string()),
                ..Protection::default()
            },
        };

        Ok(protection)
    }

    /// Lock `block` for `player`, replacing any previous owner.
    ///
    /// Whether `player` may take over an existing lock is the caller's decision.
    pub fn lock_block(&self, block: &dyn BlockRef, player: &PlayerIdentity) -> Result<(), StorageError> {
        let location = canonical_location(block);
        self.db
            .with_conn(|conn| protections::upsert(conn, &location, block.material(), &player.id))
    }

    /// Remove any lock on `block`. Returns true if there was one.
    pub fn unlock_block(&self, block: &dyn BlockRef) -> Result<bool, StorageError> {
        let location = canonical_location(block);
        self.db.with_conn(|conn| protections::delete_at(conn, &location))
    }

    /// Owner of the lock covering `block`, if its locked material is protectable
    pub fn get_owner(&self, block: &dyn BlockRef) -> Result<Option<Uuid>, StorageError> {
        let location = canonical_location(block);
        let row = self.db.with_conn(|conn| protections::get_at(conn, &location))?;

        Ok(row
            .filter(|row| self.protectables.contains(&row.material))
            .and_then(|row| row.owner))
    }

    /// Number of cells `owner` has locked
    pub fn count_locks(&self, owner: &Uuid) -> Result<u64, StorageError> {
        self.db.with_conn(|conn| protections::count_for_owner(conn, owner))
    }

    // =========================================================================
    // Players
    // =========================================================================

    /// Record a player sighting (typically on join)
    pub fn upsert_player(&self, player: &PlayerIdentity) -> Result<(), StorageError> {
        self.db.with_conn(|conn| players::upsert(conn, player))
    }

    pub fn display_name(&self, id: &Uuid) -> Result<Option<String>, StorageError> {
        self.db.with_conn(|conn| players::display_name(conn, id))
    }

    pub fn get_notify(&self, id: &Uuid) -> Result<Option<bool>, StorageError> {
        self.db.with_conn(|conn| players::get_notify(conn, id))
    }

    /// Returns false if the player is not known
    pub fn set_notify(&self, id: &Uuid, notify: bool) -> Result<bool, StorageError> {
        self.db.with_conn(|conn| players::set_notify(conn, id, notify))
    }

    // =========================================================================
    // Access groups
    // =========================================================================

    pub fn add_member(&self, owner: &Uuid, group: &str, member_name: &str) -> Result<Uuid, StorageError> {
        self.db
            .with_conn_mut(|conn| access_groups::add_member(conn, owner, group, member_name))
    }

    pub fn remove_member(&self, owner: &Uuid, group: &str, member_name: &str) -> Result<bool, StorageError> {
        self.db
            .with_conn_mut(|conn| access_groups::remove_member(conn, owner, group, member_name))
    }

    pub fn rename_group(&self, owner: &Uuid, old_name: &str, new_name: &str) -> Result<u64, StorageError> {
        self.db
            .with_conn_mut(|conn| access_groups::rename_group(conn, owner, old_name, new_name))
    }

    pub fn list_members(&self, owner: &Uuid, group: &str) -> Result<Vec<String>, StorageError> {
        self.db.with_conn(|conn| access_groups::list_members(conn, owner, group))
    }

    pub fn list_group_names(&self, owner: &Uuid) -> Result<Vec<String>, StorageError> {
        self.db.with_conn(|conn| access_groups::list_group_names(conn, owner))
    }

    pub fn is_member(&self, owner: &Uuid, group: &str, member: &Uuid) -> Result<bool, StorageError> {
        self.db
            .with_conn(|conn| access_groups::is_member(conn, owner, group, member))
    }

    pub fn stats(&self) -> Result<DbStats, StorageError> {
        self.db.stats()
    }

    /// Close the store. Fails if another handle to it is still alive.
    pub fn shutdown(self) -> Result<(), StorageError> {
        debug!("Shutting down lock service");
        let db = Arc::try_unwrap(self.db).map_err(|_| {
            StorageError::Internal("Store still in use at shutdown".to_string())
        })?;
        db.close()
    }
}
