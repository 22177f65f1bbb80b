//! Tile types and their static definitions

use serde::{Deserialize, Serialize};

/// Static per-tile properties
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileDef {
    /// Asset id the renderer maps to a sprite
    pub display_id: &'static str,
    pub name: &'static str,
    pub solid: bool,
    /// Time to dig out; 0 for tiles that can't be mined
    pub break_ms: u32,
}

/// Tile types. The discriminant is the byte stored in the grid and in saves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum TileType {
    #[default]
    Air = 0,
    GrassBlock = 1,
    Dirt = 2,
    Stone = 3,
    Sand = 4,
    Water = 5,
    Lava = 6,
    Wood = 7,
    Brick = 8,
    Ice = 9,
}

impl TileType {
    pub const ALL: [TileType; 10] = [
        TileType::Air,
        TileType::GrassBlock,
        TileType::Dirt,
        TileType::Stone,
        TileType::Sand,
        TileType::Water,
        TileType::Lava,
        TileType::Wood,
        TileType::Brick,
        TileType::Ice,
    ];

    pub const fn def(self) -> TileDef {
        match self {
            TileType::Air => TileDef { display_id: "air", name: "Air", solid: false, break_ms: 0 },
            TileType::GrassBlock => TileDef {
                display_id: "tile_grass_block_16",
                name: "Grass",
                solid: true,
                break_ms: 320,
            },
            TileType::Dirt => TileDef { display_id: "tile_dirt_16", name: "Dirt", solid: true, break_ms: 260 },
            TileType::Stone => TileDef { display_id: "tile_stone_16", name: "Stone", solid: true, break_ms: 620 },
            TileType::Sand => TileDef { display_id: "tile_sand_16", name: "Sand", solid: true, break_ms: 210 },
            TileType::Water => TileDef { display_id: "tile_water_16", name: "Water", solid: false, break_ms: 0 },
            TileType::Lava => TileDef { display_id: "tile_lava_16", name: "Lava", solid: false, break_ms: 0 },
            TileType::Wood => TileDef {
                display_id: "tile_wood_plank_16",
                name: "Wood",
                solid: true,
                break_ms: 360,
            },
            TileType::Brick => TileDef {
                display_id: "tile_brick_red_16",
                name: "Brick",
                solid: true,
                break_ms: 520,
            },
            TileType::Ice => TileDef { display_id: "tile_ice_16", name: "Ice", solid: true, break_ms: 380 },
        }
    }

    #[inline]
    pub const fn is_solid(self) -> bool {
        self.def().solid
    }

    #[inline]
    pub const fn break_ms(self) -> u32 {
        self.def().break_ms
    }

    /// Liquids and air can't be dug
    #[inline]
    pub const fn is_minable(self) -> bool {
        !matches!(self, TileType::Air | TileType::Water | TileType::Lava) && self.is_solid()
    }

    #[inline]
    pub const fn id(self) -> u8 {
        self as u8
    }

    /// Decode a stored byte; `None` for unknown ids
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(TileType::Air),
            1 => Some(TileType::GrassBlock),
            2 => Some(TileType::Dirt),
            3 => Some(TileType::Stone),
            4 => Some(TileType::Sand),
            5 => Some(TileType::Water),
            6 => Some(TileType::Lava),
            7 => Some(TileType::Wood),
            8 => Some(TileType::Brick),
            9 => Some(TileType::Ice),
            _ => None,
        }
    }
}

/// Placeable tiles in hotbar order
pub const HOTBAR: [TileType; 5] = [
    TileType::Dirt,
    TileType::Stone,
    TileType::Sand,
    TileType::Wood,
    TileType::Brick,
];

/// Tile for a hotbar slot; out-of-range slots fall back to the first entry
pub fn hotbar_tile(slot: usize) -> TileType {
    HOTBAR.get(slot).copied().unwrap_or(HOTBAR[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_round_trip() {
        for t in TileType::ALL {
            assert_eq!(TileType::from_id(t.id()), Some(t));
        }
        assert_eq!(TileType::from_id(10), None);
        assert_eq!(TileType::from_id(255), None);
    }

    #[test]
    fn test_non_solid_tiles_have_no_break_time() {
        for t in TileType::ALL {
            if !t.is_solid() {
                assert_eq!(t.break_ms(), 0, "{t:?}");
                assert!(!t.is_minable());
            }
        }
        assert_eq!(TileType::Stone.break_ms(), 620);
    }

    #[test]
    fn test_hotbar_fallback() {
        assert_eq!(hotbar_tile(1), TileType::Stone);
        assert_eq!(hotbar_tile(99), TileType::Dirt);
    }
}
