//! Material catalog and the protectable-material set
//!
//! The set of lockable materials is derived from configuration on every
//! startup and kept in memory. Configuration is authoritative, so nothing
//! about it is persisted.

use std::collections::{BTreeMap, HashMap};

use tracing::{info, warn};

/// A structure type as known to the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialInfo {
    /// Canonical name, e.g. `CHEST`
    pub name: String,
    /// Whether it can exist as a placed block (as opposed to an item only)
    pub placeable: bool,
}

/// The engine's catalog of known materials
pub trait MaterialCatalog {
    fn lookup(&self, name: &str) -> Option<MaterialInfo>;
}

/// Catalog backed by a fixed list
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    entries: HashMap<String, MaterialInfo>,
}

/// Blocks a server would typically allow locking
const DEFAULT_BLOCKS: &[&str] = &[
    "CHEST",
    "TRAPPED_CHEST",
    "WOODEN_DOOR",
    "IRON_DOOR",
    "TRAP_DOOR",
    "FENCE_GATE",
    "FURNACE",
    "DISPENSER",
    "DROPPER",
    "HOPPER",
    "BREWING_STAND",
    "JUKEBOX",
    "BEACON",
    "ANVIL",
];

const DEFAULT_ITEMS: &[&str] = &["STICK", "DIAMOND", "WOOD_DOOR", "IRON_DOOR_ITEM"];

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog of common lockable blocks plus a few item-only materials
    pub fn with_defaults() -> Self {
        let mut catalog = Self::new();
        for name in DEFAULT_BLOCKS {
            catalog = catalog.with_block(*name);
        }
        for name in DEFAULT_ITEMS {
            catalog = catalog.with_item(*name);
        }
        catalog
    }

    pub fn with_block(self, name: impl Into<String>) -> Self {
        self.insert(name.into(), true)
    }

    pub fn with_item(self, name: impl Into<String>) -> Self {
        self.insert(name.into(), false)
    }

    fn insert(mut self, name: String, placeable: bool) -> Self {
        self.entries
            .insert(name.clone(), MaterialInfo { name, placeable });
        self
    }
}

impl MaterialCatalog for StaticCatalog {
    fn lookup(&self, name: &str) -> Option<MaterialInfo> {
        self.entries.get(name).cloned()
    }
}

/// Materials enabled for locking in this session.
///
/// Membership is case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct ProtectableMaterials {
    // uppercase key -> canonical name
    names: BTreeMap<String, String>,
}

impl ProtectableMaterials {
    /// Build the set from configured names, keeping only placeable materials
    /// the catalog knows. Rejected names are logged and skipped.
    pub fn from_config<S: AsRef<str>>(configured: &[S], catalog: &dyn MaterialCatalog) -> Self {
        let mut set = Self::default();

        for entry in configured {
            let entry = entry.as_ref();
            match catalog.lookup(entry) {
                Some(info) if info.placeable => set.insert(info.name),
                Some(_) => warn!("Configured item {} is not a block type, skipping", entry),
                None => warn!("Configured item {} is not a known material, skipping", entry),
            }
        }

        info!(count = set.len(), "Loaded protectable materials");
        set
    }

    pub fn insert(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.names.insert(name.to_ascii_uppercase(), name);
    }

    pub fn contains(&self, material: &str) -> bool {
        self.names.contains_key(&material.to_ascii_uppercase())
    }

    /// Canonical names, sorted
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
