//! Body-vs-tile collision detection and response
//!
//! Bodies are axis-aligned boxes centered on `pos`. Movement is integrated
//! one axis at a time (move X, resolve X, move Y, resolve Y) so a body
//! sliding along a floor can't clip into the corner of the next tile.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::grid::TileGrid;
use super::tile::TileType;
use crate::consts::TILE_SIZE;
use crate::world_to_tile;

/// Extra clearance added to every push-out so the box ends strictly outside
const SKIN: f64 = 0.01;
/// Shrinks the far edge when mapping a box to tile indices, so a box whose
/// edge sits exactly on a tile boundary doesn't claim the next tile
const EDGE_EPS: f64 = 0.001;

/// Collision axis
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

/// A physical body (player or monster)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Body {
    /// Center, world pixels (y grows downward)
    pub pos: DVec2,
    /// px/s
    pub vel: DVec2,
    /// Full width/height of the box
    pub size: DVec2,
    #[serde(default)]
    pub on_ground: bool,
}

impl Body {
    pub fn new(pos: DVec2, size: DVec2) -> Self {
        Self {
            pos,
            vel: DVec2::ZERO,
            size,
            on_ground: false,
        }
    }

    #[inline]
    pub fn half(&self) -> DVec2 {
        self.size * 0.5
    }

    #[inline]
    pub fn min(&self) -> DVec2 {
        self.pos - self.half()
    }

    #[inline]
    pub fn max(&self) -> DVec2 {
        self.pos + self.half()
    }

    /// Does this body's box intersect another's?
    pub fn overlaps(&self, other: &Body) -> bool {
        aabb_overlap(self.min(), self.max(), other.min(), other.max())
    }
}

/// Gravity parameters for one kind of body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gravity {
    pub accel: f64,
    pub water_accel: f64,
    /// vy clamp while the feet are in water: [-water_max_rise, water_max_sink]
    pub water_max_rise: f64,
    pub water_max_sink: f64,
}

/// Strict box intersection (touching edges don't count)
#[inline]
pub fn aabb_overlap(a_min: DVec2, a_max: DVec2, b_min: DVec2, b_max: DVec2) -> bool {
    a_min.x < b_max.x && a_max.x > b_min.x && a_min.y < b_max.y && a_max.y > b_min.y
}

/// World-pixel rectangle of a tile
#[inline]
pub fn tile_rect(tx: i32, ty: i32) -> (DVec2, DVec2) {
    let min = DVec2::new(tx as f64 * TILE_SIZE, ty as f64 * TILE_SIZE);
    (min, min + DVec2::splat(TILE_SIZE))
}

/// Inclusive tile index range covered by a box
#[inline]
fn tile_span(min: DVec2, max: DVec2) -> (i32, i32, i32, i32) {
    (
        world_to_tile(min.x),
        world_to_tile(min.y),
        world_to_tile(max.x - EDGE_EPS),
        world_to_tile(max.y - EDGE_EPS),
    )
}

/// Does a box centered at `pos` with `size` overlap any solid tile?
pub fn overlaps_solid(grid: &TileGrid, pos: DVec2, size: DVec2) -> bool {
    let min = pos - size * 0.5;
    let max = pos + size * 0.5;
    let (tx0, ty0, tx1, ty1) = tile_span(min, max);
    for ty in ty0..=ty1 {
        for tx in tx0..=tx1 {
            if grid.is_solid(tx, ty) {
                return true;
            }
        }
    }
    false
}

/// Tile at a world pixel position
#[inline]
pub fn tile_at_px(grid: &TileGrid, p: DVec2) -> TileType {
    grid.get(world_to_tile(p.x), world_to_tile(p.y))
}

/// Tile just under the body's feet (2px below the box)
pub fn feet_tile(grid: &TileGrid, body: &Body) -> TileType {
    tile_at_px(grid, DVec2::new(body.pos.x, body.pos.y + body.half().y + 2.0))
}

/// Push the body out of every solid tile it overlaps along one axis.
///
/// Each overlapping solid tile pushes the box out by the smaller of the two
/// penetration depths on that axis. On Y, landing on a tile (pushed up while
/// falling) sets `on_ground` and stops the fall; bumping a ceiling (pushed
/// down while rising) stops the rise.
///
/// If the box is still embedded afterwards (it started inside terrain, or
/// was squeezed between tiles), the pushes are discarded and it escapes to
/// the nearest clear position on this axis instead.
pub fn resolve_axis(grid: &TileGrid, body: &mut Body, axis: Axis) {
    let (start_pos, start_vel, start_ground) = (body.pos, body.vel, body.on_ground);
    let (tx0, ty0, tx1, ty1) = tile_span(body.min(), body.max());

    for ty in ty0..=ty1 {
        for tx in tx0..=tx1 {
            if !grid.is_solid(tx, ty) {
                continue;
            }
            let (b_min, b_max) = tile_rect(tx, ty);
            let (p_min, p_max) = (body.min(), body.max());
            if !aabb_overlap(p_min, p_max, b_min, b_max) {
                continue;
            }

            match axis {
                Axis::X => {
                    let push_right = b_max.x - p_min.x;
                    let push_left = p_max.x - b_min.x;
                    if push_right < push_left {
                        body.pos.x += push_right + SKIN;
                    } else {
                        body.pos.x -= push_left + SKIN;
                    }
                }
                Axis::Y => {
                    let push_down = b_max.y - p_min.y;
                    let push_up = p_max.y - b_min.y;
                    if push_down < push_up {
                        body.pos.y += push_down + SKIN;
                        land_or_bump(body, false);
                    } else {
                        body.pos.y -= push_up + SKIN;
                        land_or_bump(body, true);
                    }
                }
            }
        }
    }

    if overlaps_solid(grid, body.pos, body.size) {
        // Per-tile pushes made things no better; search from where we began
        body.pos = start_pos;
        body.vel = start_vel;
        body.on_ground = start_ground;
        escape_axis(grid, body, axis);
    }
}

/// Velocity bookkeeping after a vertical push
#[inline]
fn land_or_bump(body: &mut Body, pushed_up: bool) {
    if pushed_up {
        if body.vel.y > 0.0 {
            body.vel.y = 0.0;
            body.on_ground = true;
        }
    } else if body.vel.y < 0.0 {
        body.vel.y = 0.0;
    }
}

/// Move the body to the closest clear spot along `axis`, staying inside the
/// world. Candidates are the tile-aligned positions where one edge of the box
/// sits just outside a tile boundary. Leaves the body untouched when the
/// whole line is blocked.
fn escape_axis(grid: &TileGrid, body: &mut Body, axis: Axis) {
    let (center, half, limit) = match axis {
        Axis::X => (body.pos.x, body.half().x, grid.width() as f64 * TILE_SIZE),
        Axis::Y => (body.pos.y, body.half().y, grid.height() as f64 * TILE_SIZE),
    };
    let tiles = (limit / TILE_SIZE) as i32;
    let with = |c: f64| match axis {
        Axis::X => DVec2::new(c, body.pos.y),
        Axis::Y => DVec2::new(body.pos.x, c),
    };
    let clear = |c: f64| c - half >= 0.0 && c + half <= limit && !overlaps_solid(grid, with(c), body.size);

    // Toward negative: far edge just before boundary `t`
    let toward_neg = (0..=tiles)
        .rev()
        .map(|t| t as f64 * TILE_SIZE - half - SKIN)
        .filter(|&c| c < center)
        .find(|&c| clear(c));
    // Toward positive: near edge just after boundary `t`
    let toward_pos = (0..=tiles)
        .map(|t| t as f64 * TILE_SIZE + half + SKIN)
        .filter(|&c| c > center)
        .find(|&c| clear(c));

    let target = match (toward_neg, toward_pos) {
        (Some(n), Some(p)) => Some(if center - n <= p - center { n } else { p }),
        (n, p) => n.or(p),
    };
    let Some(target) = target else {
        log::debug!("body at {:?} fully enclosed on {:?} axis", body.pos, axis);
        return;
    };

    match axis {
        Axis::X => body.pos.x = target,
        Axis::Y => {
            let pushed_up = target < body.pos.y;
            body.pos.y = target;
            land_or_bump(body, pushed_up);
        }
    }
}

/// Apply one tick of gravity, with the lighter water variant when the feet
/// are submerged. Returns whether the body is in water.
pub fn apply_gravity(grid: &TileGrid, body: &mut Body, gravity: &Gravity, dt_s: f64) -> bool {
    let in_water = feet_tile(grid, body) == TileType::Water;
    let accel = if in_water { gravity.water_accel } else { gravity.accel };
    body.vel.y += accel * dt_s;
    if in_water {
        body.vel.y = body.vel.y.clamp(-gravity.water_max_rise, gravity.water_max_sink);
    }
    in_water
}

/// Integrate velocity with axis-separated collision. Clears `on_ground`;
/// the Y pass sets it again if the body lands.
pub fn move_and_collide(grid: &TileGrid, body: &mut Body, dt_s: f64) {
    body.on_ground = false;

    body.pos.x += body.vel.x * dt_s;
    resolve_axis(grid, body, Axis::X);

    body.pos.y += body.vel.y * dt_s;
    resolve_axis(grid, body, Axis::Y);
}

/// Keep the body center at least one tile inside the world.
/// Returns true if the horizontal position had to be corrected.
pub fn clamp_to_world(grid: &TileGrid, body: &mut Body) -> bool {
    let max_x = grid.width() as f64 * TILE_SIZE - TILE_SIZE;
    let max_y = grid.height() as f64 * TILE_SIZE - TILE_SIZE;
    let before_x = body.pos.x;
    body.pos.x = body.pos.x.clamp(TILE_SIZE, max_x);
    body.pos.y = body.pos.y.clamp(TILE_SIZE, max_y);
    (body.pos.x - before_x).abs() > 0.01
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn floor_grid() -> TileGrid {
        // 16x16 world with solid ground from row 10 down
        let mut grid = TileGrid::new(16, 16);
        for y in 10..16 {
            for x in 0..16 {
                grid.set(x, y, TileType::Stone);
            }
        }
        grid
    }

    fn player_at(x: f64, y: f64) -> Body {
        Body::new(DVec2::new(x, y), DVec2::new(12.0, 14.0))
    }

    #[test]
    fn test_landing_sets_on_ground() {
        let grid = floor_grid();
        // Feet 3px into the floor at y=160
        let mut body = player_at(100.0, 160.0 - 7.0 + 3.0);
        body.vel.y = 200.0;
        resolve_axis(&grid, &mut body, Axis::Y);
        assert!(body.on_ground);
        assert_eq!(body.vel.y, 0.0);
        assert!(body.max().y <= 160.0);
        assert!(!overlaps_solid(&grid, body.pos, body.size));
    }

    #[test]
    fn test_ceiling_bump_stops_rise() {
        let mut grid = TileGrid::new(16, 16);
        for x in 0..16 {
            grid.set(x, 2, TileType::Stone);
        }
        // Head 2px into the ceiling tile bottom at y=48
        let mut body = player_at(100.0, 48.0 + 7.0 - 2.0);
        body.vel.y = -150.0;
        resolve_axis(&grid, &mut body, Axis::Y);
        assert_eq!(body.vel.y, 0.0);
        assert!(!body.on_ground);
        assert!(body.min().y >= 48.0);
    }

    #[test]
    fn test_wall_pushes_back_horizontally() {
        let mut grid = TileGrid::new(16, 16);
        for y in 0..16 {
            grid.set(8, y, TileType::Brick);
        }
        // Right edge 4px into the wall at x=128
        let mut body = player_at(128.0 - 6.0 + 4.0, 40.0);
        resolve_axis(&grid, &mut body, Axis::X);
        assert!(body.max().x <= 128.0);
    }

    #[test]
    fn test_deeply_embedded_body_escapes() {
        let grid = floor_grid();
        // Center 3 tiles deep in the floor
        let mut body = player_at(100.0, 13.0 * TILE_SIZE);
        body.vel.y = 50.0;
        resolve_axis(&grid, &mut body, Axis::X);
        resolve_axis(&grid, &mut body, Axis::Y);
        assert!(!overlaps_solid(&grid, body.pos, body.size));
        assert!(body.max().y <= 160.0);
        assert!(body.on_ground);
    }

    #[test]
    fn test_falling_body_comes_to_rest() {
        let grid = floor_grid();
        let gravity = Gravity {
            accel: 760.0,
            water_accel: 320.0,
            water_max_rise: 160.0,
            water_max_sink: 200.0,
        };
        let mut body = player_at(100.0, 40.0);
        for _ in 0..240 {
            apply_gravity(&grid, &mut body, &gravity, 1.0 / 60.0);
            move_and_collide(&grid, &mut body, 1.0 / 60.0);
            clamp_to_world(&grid, &mut body);
        }
        assert!(body.on_ground);
        assert!((body.max().y - 160.0).abs() < 0.1);
    }

    #[test]
    fn test_water_slows_fall() {
        let mut grid = floor_grid();
        for y in 0..10 {
            grid.set(5, y, TileType::Water);
        }
        let gravity = Gravity {
            accel: 760.0,
            water_accel: 320.0,
            water_max_rise: 160.0,
            water_max_sink: 200.0,
        };
        let mut body = player_at(5.5 * TILE_SIZE, 40.0);
        body.vel.y = 500.0;
        assert!(apply_gravity(&grid, &mut body, &gravity, 0.016));
        assert_eq!(body.vel.y, 200.0);
    }

    #[test]
    fn test_clamp_reports_horizontal_correction() {
        let grid = floor_grid();
        let mut body = player_at(2.0, 40.0);
        assert!(clamp_to_world(&grid, &mut body));
        assert_eq!(body.pos.x, TILE_SIZE);
        let mut body = player_at(100.0, 1.0);
        assert!(!clamp_to_world(&grid, &mut body));
        assert_eq!(body.pos.y, TILE_SIZE);
    }

    fn arb_grid() -> impl Strategy<Value = TileGrid> {
        // Top two rows stay open so there is always somewhere to escape to
        prop::collection::vec(prop::bool::weighted(0.35), 12 * 10).prop_map(|solid| {
            let mut grid = TileGrid::new(12, 12);
            for (i, s) in solid.into_iter().enumerate() {
                if s {
                    grid.set((i % 12) as i32, (i / 12) as i32 + 2, TileType::Stone);
                }
            }
            grid
        })
    }

    proptest! {
        #[test]
        fn prop_resolved_body_is_clear(
            grid in arb_grid(),
            x in 6.0f64..186.0,
            y in 7.0f64..185.0,
            vx in -300.0f64..300.0,
            vy in -300.0f64..300.0,
        ) {
            let mut body = player_at(x, y);
            body.vel = DVec2::new(vx, vy);
            resolve_axis(&grid, &mut body, Axis::X);
            resolve_axis(&grid, &mut body, Axis::Y);
            prop_assert!(!overlaps_solid(&grid, body.pos, body.size));
        }
    }
}
