//! Service layer - business logic over the repositories
//!
//! Services own the store handle and the session's protectable-material set,
//! and are what the game server calls for every player action.

pub mod lock_service;

pub use lock_service::{LockService, Protection};
