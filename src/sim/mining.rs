//! Mining and block placement
//!
//! Digging a tile is a timed session: it runs while the pointer stays on the
//! same tile, that tile is unchanged and still within reach, and completes
//! once the accumulated time reaches the tile's break duration.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::collision::{Body, aabb_overlap, tile_rect};
use super::grid::TileGrid;
use super::inventory::Inventory;
use super::tile::TileType;
use crate::consts::TILE_SIZE;
use crate::tile_center;

/// Is the center of tile (tx, ty) within `reach_tiles` of `from`?
pub fn can_reach(from: DVec2, tx: i32, ty: i32, reach_tiles: f64) -> bool {
    let d = DVec2::new(tile_center(tx), tile_center(ty)) - from;
    let reach = reach_tiles * TILE_SIZE;
    d.length_squared() <= reach * reach
}

/// What a mining tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MiningOutcome {
    /// No session running
    Idle,
    /// Session dropped (target moved, tile changed, or out of reach)
    Cancelled,
    /// Still digging; `pulses` feedback pulses were crossed this tick
    Digging { pulses: u32 },
    /// Tile removed and added to the inventory
    Broken { tile: TileType, tx: i32, ty: i32 },
}

/// Excavation of a single tile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MiningSession {
    pub active: bool,
    pub tx: i32,
    pub ty: i32,
    pub tile: TileType,
    pub elapsed_ms: f64,
    pub required_ms: f64,
}

impl MiningSession {
    /// Begin digging (tx, ty). Returns false, leaving the session untouched,
    /// if the tile can't be mined or is out of reach.
    pub fn start(&mut self, grid: &TileGrid, tx: i32, ty: i32, player: DVec2, reach_tiles: f64) -> bool {
        let tile = grid.get(tx, ty);
        if !tile.is_minable() || !grid.in_bounds(tx, ty) {
            return false;
        }
        if !can_reach(player, tx, ty, reach_tiles) {
            return false;
        }
        *self = Self {
            active: true,
            tx,
            ty,
            tile,
            elapsed_ms: 0.0,
            required_ms: f64::from(tile.break_ms()),
        };
        true
    }

    /// Drop the session
    pub fn cancel(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub fn targets(&self, tx: i32, ty: i32) -> bool {
        self.active && self.tx == tx && self.ty == ty
    }

    /// Completion fraction in [0, 1] for progress overlays
    pub fn progress(&self) -> f64 {
        if !self.active {
            return 0.0;
        }
        (self.elapsed_ms / self.required_ms.max(1.0)).clamp(0.0, 1.0)
    }

    /// Advance by `dt_ms`. `pointer` is the tile currently under the pointer.
    #[allow(clippy::too_many_arguments)]
    pub fn tick(
        &mut self,
        dt_ms: f64,
        pointer: (i32, i32),
        grid: &mut TileGrid,
        inventory: &mut Inventory,
        player: DVec2,
        reach_tiles: f64,
        pulse_ms: f64,
    ) -> MiningOutcome {
        if !self.active {
            return MiningOutcome::Idle;
        }

        let still_valid = pointer == (self.tx, self.ty)
            && grid.get(self.tx, self.ty) == self.tile
            && can_reach(player, self.tx, self.ty, reach_tiles);
        if !still_valid {
            self.cancel();
            return MiningOutcome::Cancelled;
        }

        let before = self.elapsed_ms;
        self.elapsed_ms += dt_ms;

        if self.elapsed_ms >= self.required_ms {
            let (tile, tx, ty) = (self.tile, self.tx, self.ty);
            grid.set(tx, ty, TileType::Air);
            inventory.add(tile);
            self.cancel();
            return MiningOutcome::Broken { tile, tx, ty };
        }

        let pulses = if pulse_ms > 0.0 {
            ((self.elapsed_ms / pulse_ms).floor() - (before / pulse_ms).floor()) as u32
        } else {
            0
        };
        MiningOutcome::Digging { pulses }
    }
}

/// Place one `tile` from the inventory at (tx, ty).
///
/// Fails without changing anything if none are held, the target is out of
/// reach or not Air, or the tile would overlap the player.
pub fn try_place(
    grid: &mut TileGrid,
    inventory: &mut Inventory,
    player: &Body,
    tx: i32,
    ty: i32,
    tile: TileType,
    reach_tiles: f64,
) -> bool {
    if tile == TileType::Air || inventory.count(tile) == 0 {
        return false;
    }
    if !can_reach(player.pos, tx, ty, reach_tiles) {
        return false;
    }
    if !grid.in_bounds(tx, ty) || grid.get(tx, ty) != TileType::Air {
        return false;
    }
    let (b_min, b_max) = tile_rect(tx, ty);
    if aabb_overlap(player.min(), player.max(), b_min, b_max) {
        return false;
    }

    inventory.take(tile);
    grid.set(tx, ty, tile);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const REACH: f64 = 4.0;
    const PULSE: f64 = 140.0;

    /// Player standing in open air at tile (5, 5)
    fn setup() -> (TileGrid, Inventory, Body) {
        let grid = TileGrid::new(16, 16);
        let player = Body::new(
            DVec2::new(tile_center(5), tile_center(5)),
            DVec2::new(12.0, 14.0),
        );
        (grid, Inventory::new(), player)
    }

    #[test]
    fn test_reach_boundary() {
        let p = DVec2::new(tile_center(5), tile_center(5));
        assert!(can_reach(p, 9, 5, REACH));
        assert!(!can_reach(p, 10, 5, REACH));
        assert!(!can_reach(p, 9, 6, REACH));
    }

    #[test]
    fn test_start_rejects_unminable() {
        let (mut grid, _, player) = setup();
        let mut session = MiningSession::default();
        assert!(!session.start(&grid, 6, 5, player.pos, REACH));
        grid.set(6, 5, TileType::Water);
        assert!(!session.start(&grid, 6, 5, player.pos, REACH));
        grid.set(6, 5, TileType::Lava);
        assert!(!session.start(&grid, 6, 5, player.pos, REACH));
        grid.set(12, 5, TileType::Stone);
        assert!(!session.start(&grid, 12, 5, player.pos, REACH));
        assert!(!session.active);
    }

    #[test]
    fn test_stone_breaks_after_620ms() {
        let (mut grid, mut inv, player) = setup();
        grid.set(7, 5, TileType::Stone);
        let mut session = MiningSession::default();
        assert!(session.start(&grid, 7, 5, player.pos, REACH));
        assert_eq!(session.required_ms, 620.0);

        let mut outcome = MiningOutcome::Idle;
        for _ in 0..31 {
            outcome = session.tick(20.0, (7, 5), &mut grid, &mut inv, player.pos, REACH, PULSE);
        }
        assert_eq!(
            outcome,
            MiningOutcome::Broken { tile: TileType::Stone, tx: 7, ty: 5 }
        );
        assert_eq!(grid.get(7, 5), TileType::Air);
        assert_eq!(inv.count(TileType::Stone), 1);

        // Extra ticks after completion change nothing
        for _ in 0..50 {
            let o = session.tick(20.0, (7, 5), &mut grid, &mut inv, player.pos, REACH, PULSE);
            assert_eq!(o, MiningOutcome::Idle);
        }
        assert_eq!(inv.count(TileType::Stone), 1);
    }

    #[test]
    fn test_not_done_one_tick_early() {
        let (mut grid, mut inv, player) = setup();
        grid.set(7, 5, TileType::Stone);
        let mut session = MiningSession::default();
        session.start(&grid, 7, 5, player.pos, REACH);
        session.tick(619.0, (7, 5), &mut grid, &mut inv, player.pos, REACH, PULSE);
        assert!(session.active);
        assert_eq!(grid.get(7, 5), TileType::Stone);
        assert!((session.progress() - 619.0 / 620.0).abs() < 1e-9);
    }

    #[test]
    fn test_pointer_move_cancels() {
        let (mut grid, mut inv, player) = setup();
        grid.set(7, 5, TileType::Dirt);
        let mut session = MiningSession::default();
        session.start(&grid, 7, 5, player.pos, REACH);
        let o = session.tick(16.0, (7, 6), &mut grid, &mut inv, player.pos, REACH, PULSE);
        assert_eq!(o, MiningOutcome::Cancelled);
        assert!(!session.active);
        assert_eq!(grid.get(7, 5), TileType::Dirt);
    }

    #[test]
    fn test_tile_swap_cancels() {
        let (mut grid, mut inv, player) = setup();
        grid.set(7, 5, TileType::Dirt);
        let mut session = MiningSession::default();
        session.start(&grid, 7, 5, player.pos, REACH);
        grid.set(7, 5, TileType::Brick);
        let o = session.tick(16.0, (7, 5), &mut grid, &mut inv, player.pos, REACH, PULSE);
        assert_eq!(o, MiningOutcome::Cancelled);
        assert_eq!(inv.count(TileType::Dirt), 0);
    }

    #[test]
    fn test_walking_away_cancels() {
        let (mut grid, mut inv, player) = setup();
        grid.set(8, 5, TileType::Dirt);
        let mut session = MiningSession::default();
        session.start(&grid, 8, 5, player.pos, REACH);
        let away = player.pos - DVec2::new(3.0 * TILE_SIZE, 0.0);
        let o = session.tick(16.0, (8, 5), &mut grid, &mut inv, away, REACH, PULSE);
        assert_eq!(o, MiningOutcome::Cancelled);
    }

    #[test]
    fn test_pulses_every_140ms() {
        let (mut grid, mut inv, player) = setup();
        grid.set(7, 5, TileType::Stone);
        let mut session = MiningSession::default();
        session.start(&grid, 7, 5, player.pos, REACH);
        let mut total = 0;
        for _ in 0..30 {
            if let MiningOutcome::Digging { pulses } =
                session.tick(20.0, (7, 5), &mut grid, &mut inv, player.pos, REACH, PULSE)
            {
                total += pulses;
            }
        }
        // 600ms elapsed: pulses at 140, 280, 420, 560
        assert_eq!(total, 4);
    }

    #[test]
    fn test_place_needs_stock() {
        let (mut grid, mut inv, player) = setup();
        let before = grid.clone();
        assert!(!try_place(&mut grid, &mut inv, &player, 7, 5, TileType::Dirt, REACH));
        assert_eq!(grid, before);
        assert_eq!(inv.count(TileType::Dirt), 0);
    }

    #[test]
    fn test_place_rejects_player_overlap() {
        let (mut grid, mut inv, player) = setup();
        inv.set(TileType::Dirt, 3);
        assert!(!try_place(&mut grid, &mut inv, &player, 5, 5, TileType::Dirt, REACH));
        assert_eq!(inv.count(TileType::Dirt), 3);
        assert_eq!(grid.get(5, 5), TileType::Air);
    }

    #[test]
    fn test_place_rejects_occupied_and_far() {
        let (mut grid, mut inv, player) = setup();
        inv.set(TileType::Dirt, 3);
        grid.set(7, 5, TileType::Stone);
        assert!(!try_place(&mut grid, &mut inv, &player, 7, 5, TileType::Dirt, REACH));
        assert!(!try_place(&mut grid, &mut inv, &player, 12, 5, TileType::Dirt, REACH));
        assert_eq!(inv.count(TileType::Dirt), 3);
    }

    #[test]
    fn test_place_success() {
        let (mut grid, mut inv, player) = setup();
        inv.set(TileType::Brick, 2);
        assert!(try_place(&mut grid, &mut inv, &player, 7, 6, TileType::Brick, REACH));
        assert_eq!(grid.get(7, 6), TileType::Brick);
        assert_eq!(inv.count(TileType::Brick), 1);
    }
}
