//! Block references and canonical locations
//!
//! Some structures occupy two cells but are owned as one: a double chest and
//! a two-cell door. Ownership is keyed by a single *canonical* location so that
//! either cell resolves to the same protection row.
//!
//! The game engine is not linked here. Callers describe a block through
//! [`BlockRef`]; [`BlockSnapshot`] is a plain-data implementation.

use serde::{Deserialize, Serialize};

/// Integer cell coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockPos {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Position of the adjacent cell on `face`. Wraps at the `i32` edges.
    pub fn relative(&self, face: BlockFace) -> Self {
        let (dx, dy, dz) = face.offset();
        Self::new(
            self.x.wrapping_add(dx),
            self.y.wrapping_add(dy),
            self.z.wrapping_add(dz),
        )
    }

    /// Position of the adjacent cell on `face`, or `None` past the `i32` edges
    pub fn checked_relative(&self, face: BlockFace) -> Option<Self> {
        let (dx, dy, dz) = face.offset();
        Some(Self::new(
            self.x.checked_add(dx)?,
            self.y.checked_add(dy)?,
            self.z.checked_add(dz)?,
        ))
    }
}

impl std::fmt::Display for BlockPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// A cell in a named world
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub world: String,
    pub pos: BlockPos,
}

impl Location {
    pub fn new(world: impl Into<String>, pos: BlockPos) -> Self {
        Self {
            world: world.into(),
            pos,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.world, self.pos)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockFace {
    Up,
    Down,
    North,
    South,
    East,
    West,
}

impl BlockFace {
    /// Unit offset; north is -z, east is +x
    pub fn offset(&self) -> (i32, i32, i32) {
        match self {
            Self::Up => (0, 1, 0),
            Self::Down => (0, -1, 0),
            Self::North => (0, 0, -1),
            Self::South => (0, 0, 1),
            Self::East => (1, 0, 0),
            Self::West => (-1, 0, 0),
        }
    }
}

/// What the engine knows about the shape of a structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StructureKind {
    /// An inventory block. `anchor` is the location the engine reports for
    /// a double container's combined inventory; `None` for a single one.
    Container { anchor: Option<BlockPos> },
    /// A door, which may span this cell and the one below
    Door,
    Other,
}

/// A block as seen by the engine
pub trait BlockRef {
    /// Material name, e.g. `CHEST`
    fn material(&self) -> &str;

    fn world(&self) -> &str;

    fn position(&self) -> BlockPos;

    fn structure(&self) -> StructureKind;

    /// Material of the adjacent cell, if it is loaded
    fn neighbor_material(&self, face: BlockFace) -> Option<String>;

    /// Raw location of this cell
    fn location(&self) -> Location {
        Location::new(self.world(), self.position())
    }
}

/// Compute the location that keys ownership of `block`.
///
/// - double container: the anchor of its combined inventory, else its own cell
/// - door with the same door material directly below: the lower cell
/// - anything else: its own cell
pub fn canonical_location(block: &dyn BlockRef) -> Location {
    let pos = block.position();

    let canonical = match block.structure() {
        StructureKind::Container { anchor } => anchor.unwrap_or(pos),
        StructureKind::Door => {
            let below = block.neighbor_material(BlockFace::Down);
            if below.as_deref() == Some(block.material()) {
                pos.checked_relative(BlockFace::Down).unwrap_or(pos)
            } else {
                pos
            }
        }
        StructureKind::Other => pos,
    };

    Location::new(block.world(), canonical)
}

/// Plain-data block reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockSnapshot {
    pub world: String,
    pub pos: BlockPos,
    pub material: String,
    pub structure: StructureKind,
    #[serde(default)]
    pub neighbors: Vec<(BlockFace, String)>,
}

impl BlockSnapshot {
    pub fn new(world: impl Into<String>, pos: BlockPos, material: impl Into<String>) -> Self {
        Self {
            world: world.into(),
            pos,
            material: material.into(),
            structure: StructureKind::Other,
            neighbors: Vec::new(),
        }
    }

    pub fn with_structure(mut self, structure: StructureKind) -> Self {
        self.structure = structure;
        self
    }

    pub fn with_neighbor(mut self, face: BlockFace, material: impl Into<String>) -> Self {
        self.neighbors.retain(|(f, _)| *f != face);
        self.neighbors.push((face, material.into()));
        self
    }
}

impl BlockRef for BlockSnapshot {
    fn material(&self) -> &str {
        &self.material
    }

    fn world(&self) -> &str {
        &self.world
    }

    fn position(&self) -> BlockPos {
        self.pos
    }

    fn structure(&self) -> StructureKind {
        self.structure
    }

    fn neighbor_material(&self, face: BlockFace) -> Option<String> {
        self.neighbors
            .iter()
            .find(|(f, _)| *f == face)
            .map(|(_, m)| m.clone())
    }
}
