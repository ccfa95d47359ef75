//! Sticky Locks - block ownership store for multiplayer world servers
//!
//! Records which player owns which lockable structure (chests, doors,
//! furnaces), keeps a registry of known players, and manages per-owner named
//! access groups.
//!
//! ## Architecture
//!
//! - **location**: resolves a block to its canonical cell, so both halves of a
//!   double chest or a two-cell door key the same protection
//! - **materials**: the set of lockable materials, rebuilt from config on startup
//! - **db**: SQLite tables for players, protections and access groups
//! - **services**: [`LockService`], the entry point the game server calls
//!
//! ## Errors
//!
//! Every operation returns `Result<_, StorageError>`. Domain faults
//! (`UnknownPlayer`, `GroupNotFound`) carry a message for the player. To treat
//! store faults as "not locked" / "empty", opt in with [`Lenient::or_log`]:
//!
//! ```no_run
//! use sticky_locks::{BlockPos, BlockSnapshot, Config, Lenient, LockService, StaticCatalog};
//!
//! let service = LockService::initialize(&Config::default(), &StaticCatalog::with_defaults())?;
//! let chest = BlockSnapshot::new("world", BlockPos::new(0, 64, 0), "CHEST");
//! let protection = service.get_protection(&chest).or_log("Failed to read protection");
//! println!("locked: {}", protection.locked);
//! # Ok::<(), sticky_locks::StorageError>(())
//! ```
//!
//! ## Threading
//!
//! All calls are synchronous. One SQLite connection serves the process,
//! guarded by a mutex.

pub mod config;
pub mod db;
pub mod error;
pub mod location;
pub mod materials;
pub mod services;

// Re-exports
pub use config::Config;
pub use db::players::PlayerIdentity;
pub use db::{DbStats, LockDb};
pub use error::{Lenient, StorageError};
pub use location::{canonical_location, BlockFace, BlockPos, BlockRef, BlockSnapshot, Location, StructureKind};
pub use materials::{MaterialCatalog, MaterialInfo, ProtectableMaterials, StaticCatalog};
pub use services::{LockService, Protection};
