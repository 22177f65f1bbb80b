//! Sparse tile counts carried by the player

use std::collections::BTreeMap;

use super::tile::TileType;

/// Tile type -> count. Only positive counts are stored, so two inventories
/// holding the same stock always compare equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    counts: BTreeMap<TileType, u32>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starting kit for a fresh world
    pub fn starter() -> Self {
        let mut inv = Self::new();
        inv.set(TileType::Dirt, 18);
        inv.set(TileType::Wood, 24);
        inv.set(TileType::Brick, 10);
        inv
    }

    pub fn count(&self, tile: TileType) -> u32 {
        self.counts.get(&tile).copied().unwrap_or(0)
    }

    pub fn set(&mut self, tile: TileType, count: u32) {
        if count == 0 {
            self.counts.remove(&tile);
        } else {
            self.counts.insert(tile, count);
        }
    }

    /// Add one collected tile. A full stack stays full.
    pub fn add(&mut self, tile: TileType) {
        let n = self.counts.entry(tile).or_insert(0);
        *n = n.saturating_add(1);
    }

    /// Take one tile; false (and no change) when none are held
    pub fn take(&mut self, tile: TileType) -> bool {
        match self.counts.get(&tile).copied() {
            Some(n) if n > 0 => {
                self.set(tile, n - 1);
                true
            }
            _ => false,
        }
    }

    /// Held entries in tile id order
    pub fn iter(&self) -> impl Iterator<Item = (TileType, u32)> + '_ {
        self.counts.iter().map(|(&t, &n)| (t, n))
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}
