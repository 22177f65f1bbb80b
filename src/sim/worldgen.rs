//! Procedural world generation
//!
//! A world is a pure function of its seed string: the same seed always
//! yields byte-identical terrain. Generation draws from a single
//! `SeededRandom` stream in a fixed order, so the order of the passes
//! below (and of the draws within each pass) is part of the format.

use glam::DVec2;

use super::grid::TileGrid;
use super::monster::{Monster, MonsterKind};
use super::random::{SeededRandom, hash_seed};
use super::tile::TileType;
use crate::consts::TILE_SIZE;
use crate::tile_center;
use crate::tuning::{MonsterTuning, WorldGenTuning};

/// Mixed into the seed hash so monster placement uses its own stream
const MONSTER_STREAM_SALT: u32 = 0x9e37_79b9;

/// Generate terrain for `seed`
pub fn generate(seed: &str, tuning: &WorldGenTuning) -> TileGrid {
    let mut rng = SeededRandom::from_seed_str(seed);
    let mut grid = TileGrid::new(tuning.width, tuning.height);

    let heights = heightmap(&mut rng, tuning);
    fill_strata(&mut grid, &heights, &mut rng, tuning);
    carve_caves(&mut grid, &mut rng, tuning);
    fill_pools(
        &mut grid,
        &mut rng,
        tuning.water_pools,
        tuning.water_band,
        tuning.water_radius_spread,
        tuning.pool_min_radius,
        TileType::Water,
    );
    fill_pools(
        &mut grid,
        &mut rng,
        tuning.lava_pools,
        tuning.lava_band,
        tuning.lava_radius_spread,
        tuning.pool_min_radius,
        TileType::Lava,
    );
    plant_trees(&mut grid, &heights, &mut rng, tuning);

    log::info!(
        "Generated {}x{} world for seed {:?} ({} air, {} water, {} lava)",
        grid.width(),
        grid.height(),
        seed,
        grid.count(TileType::Air),
        grid.count(TileType::Water),
        grid.count(TileType::Lava),
    );
    grid
}

/// Surface row per column: bounded random walk plus a gentle sine
fn heightmap(rng: &mut SeededRandom, t: &WorldGenTuning) -> Vec<i32> {
    let w = t.width as f64;
    let h = t.height as i32;
    let base = (t.height as f64 * t.base_height_frac).floor();
    // Keep the band valid even for tiny worlds
    let max_surface = (h - t.surface_floor_margin).max(t.min_surface);

    let mut v = rng.next_f64();
    (0..t.width)
        .map(|x| {
            v = (v + (rng.next_f64() - 0.5) * t.walk_step).clamp(0.0, 1.0);
            let wave = (x as f64 / w * std::f64::consts::TAU).sin() * t.wave_amplitude;
            let row = (base + (v - 0.5) * t.walk_amplitude + wave).floor() as i32;
            row.clamp(t.min_surface, max_surface)
        })
        .collect()
}

/// Air above the surface, then grass, dirt, a stone band speckled with
/// sand, and solid stone below
fn fill_strata(grid: &mut TileGrid, heights: &[i32], rng: &mut SeededRandom, t: &WorldGenTuning) {
    for (x, &surface) in heights.iter().enumerate() {
        let x = x as i32;
        for y in 0..grid.height() as i32 {
            let depth = y - surface;
            let tile = if depth < 0 {
                TileType::Air
            } else if depth == 0 {
                TileType::GrassBlock
            } else if depth <= t.dirt_depth {
                TileType::Dirt
            } else if depth < t.sand_depth {
                if rng.chance(t.sand_chance) {
                    TileType::Sand
                } else {
                    TileType::Stone
                }
            } else {
                TileType::Stone
            };
            grid.set(x, y, tile);
        }
    }
}

/// Cells of a disk centered on (cx, cy), row-major from the top-left
fn disk(cx: i32, cy: i32, r: i32) -> impl Iterator<Item = (i32, i32)> {
    (cy - r..=cy + r).flat_map(move |y| {
        (cx - r..=cx + r)
            .filter(move |&x| {
                let (dx, dy) = (x - cx, y - cy);
                dx * dx + dy * dy <= r * r
            })
            .map(move |x| (x, y))
    })
}

/// Random disk center: column anywhere, row inside `band` (start, spread)
/// as fractions of world height
fn disk_center(rng: &mut SeededRandom, width: usize, height: usize, band: (f64, f64)) -> (i32, i32) {
    let cx = rng.below(width as i32);
    let cy = ((band.0 + rng.next_f64() * band.1) * height as f64).floor() as i32;
    (cx, cy)
}

fn carve_caves(grid: &mut TileGrid, rng: &mut SeededRandom, t: &WorldGenTuning) {
    let top = t.cave_top_row;
    let bottom = grid.height() as i32 - t.cave_bottom_margin;
    for _ in 0..t.cave_count {
        let (cx, cy) = disk_center(rng, grid.width(), grid.height(), t.cave_band);
        let r = t.cave_min_radius + rng.below(t.cave_radius_spread);
        for (x, y) in disk(cx, cy, r) {
            // Roll for every cell so the stream doesn't depend on the row filter
            if rng.chance(t.cave_fill_chance) && y > top && y < bottom {
                grid.set(x, y, TileType::Air);
            }
        }
    }
}

/// Flood disks of `liquid` into air pockets inside a height band
fn fill_pools(
    grid: &mut TileGrid,
    rng: &mut SeededRandom,
    count: u32,
    band: (f64, f64),
    radius_spread: i32,
    min_radius: i32,
    liquid: TileType,
) {
    for _ in 0..count {
        let (cx, cy) = disk_center(rng, grid.width(), grid.height(), band);
        let r = min_radius + rng.below(radius_spread);
        for (x, y) in disk(cx, cy, r) {
            if grid.get(x, y) == TileType::Air {
                grid.set(x, y, liquid);
            }
        }
    }
}

/// Short wooden trunks standing on the grass
fn plant_trees(grid: &mut TileGrid, heights: &[i32], rng: &mut SeededRandom, t: &WorldGenTuning) {
    let h = grid.height() as i32;
    for _ in 0..t.tree_tries {
        let x = rng.below(grid.width() as i32);
        let surface = heights[x as usize];
        if surface < 8 || surface >= h - 10 {
            continue;
        }
        let trunk = t.tree_min_trunk + rng.below(t.tree_trunk_spread);
        for k in 0..trunk {
            grid.set(x, surface - 1 - k, TileType::Wood);
        }
    }
}

/// Row to drop the player into at column `x`: a few tiles above the first
/// non-air, non-water tile
pub fn find_spawn_y(grid: &TileGrid, x: i32) -> i32 {
    first_ground_row(grid, x, |t| !matches!(t, TileType::Air | TileType::Water))
        .map(|y| (y - 3).max(0))
        .unwrap_or(10)
}

/// Row just above the ground at column `x`, skipping liquids
pub fn find_surface_y(grid: &TileGrid, x: i32) -> i32 {
    first_ground_row(grid, x, |t| !matches!(t, TileType::Air | TileType::Water | TileType::Lava))
        .map(|y| (y - 2).max(0))
        .unwrap_or(10)
}

fn first_ground_row(grid: &TileGrid, x: i32, is_ground: impl Fn(TileType) -> bool) -> Option<i32> {
    (0..grid.height() as i32 - 2).find(|&y| is_ground(grid.get(x, y)))
}

/// Player spawn point for a fresh world: middle column, dropped from just
/// above the ground
pub fn spawn_point(grid: &TileGrid) -> DVec2 {
    let x = (grid.width() / 2) as i32;
    DVec2::new(tile_center(x), find_spawn_y(grid, x) as f64 * TILE_SIZE)
}

/// Place the monster population on open surface cells, away from the player.
///
/// Uses its own stream derived from the world seed, so placement is
/// reproducible and independent of how much of the world stream was used.
pub fn spawn_monsters(
    grid: &TileGrid,
    seed: &str,
    player_x: f64,
    first_id: u32,
    tuning: &MonsterTuning,
) -> Vec<Monster> {
    let mut rng = SeededRandom::new(hash_seed(seed) ^ MONSTER_STREAM_SALT);
    let mut out = Vec::with_capacity(tuning.population);
    let min_dist = TILE_SIZE * tuning.min_player_distance_tiles;

    let mut tries = 0;
    while out.len() < tuning.population && tries < tuning.max_spawn_tries {
        tries += 1;
        let x = rng.below(grid.width() as i32);
        // Stand on the ground: the cell right above it
        let y = find_surface_y(grid, x) + 1;
        if grid.get(x, y) != TileType::Air || !grid.is_solid(x, y + 1) {
            continue;
        }
        let wx = tile_center(x);
        if (wx - player_x).abs() < min_dist {
            continue;
        }

        let dir = if rng.next_f64() < 0.5 { -1 } else { 1 };
        let think_ms = rng.spread(tuning.initial_think_ms).floor();
        out.push(Monster::new(
            first_id + out.len() as u32,
            MonsterKind::Slime,
            DVec2::new(wx, tile_center(y)),
            dir,
            think_ms,
        ));
    }

    log::info!("Spawned {} monsters in {} tries", out.len(), tries);
    out
}
