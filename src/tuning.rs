//! Data-driven game balance
//!
//! Every gameplay constant lives here so hosts can rebalance without
//! touching simulation code. Defaults reproduce the original game feel.
//! Missing fields in a JSON override fall back to these defaults.

use serde::{Deserialize, Serialize};

use crate::consts::{WORLD_H, WORLD_W};

/// World generation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldGenTuning {
    pub width: usize,
    pub height: usize,
    /// Surface baseline as a fraction of world height
    pub base_height_frac: f64,
    /// Per-column random walk step
    pub walk_step: f64,
    /// Random walk contribution to surface row, in tiles
    pub walk_amplitude: f64,
    /// Low frequency sine contribution, in tiles
    pub wave_amplitude: f64,
    /// Surface row is clamped into [min_surface, height - surface_floor_margin]
    pub min_surface: i32,
    pub surface_floor_margin: i32,
    /// Rows of dirt below the grass row
    pub dirt_depth: i32,
    /// Rows (from the surface) where sand may appear inside stone
    pub sand_depth: i32,
    pub sand_chance: f64,
    pub cave_count: u32,
    pub cave_min_radius: i32,
    /// Radius = min + floor(rand * spread)
    pub cave_radius_spread: i32,
    pub cave_band: (f64, f64),
    pub cave_fill_chance: f64,
    /// Caves only carve rows strictly inside (top_row, height - bottom_margin)
    pub cave_top_row: i32,
    pub cave_bottom_margin: i32,
    pub water_pools: u32,
    pub water_band: (f64, f64),
    pub water_radius_spread: i32,
    pub lava_pools: u32,
    pub lava_band: (f64, f64),
    pub lava_radius_spread: i32,
    pub pool_min_radius: i32,
    pub tree_tries: u32,
    pub tree_min_trunk: i32,
    pub tree_trunk_spread: i32,
}

impl Default for WorldGenTuning {
    fn default() -> Self {
        Self {
            width: WORLD_W,
            height: WORLD_H,
            base_height_frac: 0.52,
            walk_step: 0.22,
            walk_amplitude: 14.0,
            wave_amplitude: 3.0,
            min_surface: 16,
            surface_floor_margin: 18,
            dirt_depth: 4,
            sand_depth: 14,
            sand_chance: 0.08,
            cave_count: 140,
            cave_min_radius: 2,
            cave_radius_spread: 5,
            cave_band: (0.55, 0.35),
            cave_fill_chance: 0.85,
            cave_top_row: 8,
            cave_bottom_margin: 2,
            water_pools: 22,
            water_band: (0.50, 0.12),
            water_radius_spread: 4,
            lava_pools: 14,
            lava_band: (0.78, 0.18),
            lava_radius_spread: 3,
            pool_min_radius: 2,
            tree_tries: 18,
            tree_min_trunk: 2,
            tree_trunk_spread: 3,
        }
    }
}

/// Gravity and water handling shared by every body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsTuning {
    /// px/s²
    pub gravity: f64,
    pub water_gravity: f64,
    /// Upward nudge while standing in lava (px/s²)
    pub lava_lift: f64,
}

impl Default for PhysicsTuning {
    fn default() -> Self {
        Self {
            gravity: 760.0,
            water_gravity: 320.0,
            lava_lift: 120.0,
        }
    }
}

/// Player body, movement and health
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub width: f64,
    pub height: f64,
    pub move_speed: f64,
    pub water_move_speed: f64,
    pub jump_velocity: f64,
    pub water_jump_velocity: f64,
    /// vy clamp while in water: [-max_rise, max_sink]
    pub water_max_rise: f64,
    pub water_max_sink: f64,
    pub max_hp: u32,
    pub invuln_ms: f64,
    pub flash_ms: f64,
    pub respawn_invuln_ms: f64,
    pub respawn_flash_ms: f64,
    pub knockback_x: f64,
    pub knockback_y: f64,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            width: 12.0,
            height: 14.0,
            move_speed: 110.0,
            water_move_speed: 70.0,
            jump_velocity: 285.0,
            water_jump_velocity: 165.0,
            water_max_rise: 160.0,
            water_max_sink: 200.0,
            max_hp: 5,
            invuln_ms: 850.0,
            flash_ms: 160.0,
            respawn_invuln_ms: 1000.0,
            respawn_flash_ms: 260.0,
            knockback_x: 150.0,
            knockback_y: 220.0,
        }
    }
}

/// Mining and placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiningTuning {
    /// Reach distance in tiles (player center to tile center)
    pub reach_tiles: f64,
    /// Feedback pulse cadence while digging
    pub pulse_ms: f64,
}

impl Default for MiningTuning {
    fn default() -> Self {
        Self {
            reach_tiles: 4.0,
            pulse_ms: 140.0,
        }
    }
}

/// Monster population and AI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonsterTuning {
    pub population: usize,
    pub max_spawn_tries: u32,
    /// Monsters never spawn within this many tiles (horizontally) of the player
    pub min_player_distance_tiles: f64,
    pub chase_radius_tiles: f64,
    /// Think interval = min + rand * spread
    pub chase_think_ms: (f64, f64),
    pub idle_think_ms: (f64, f64),
    pub initial_think_ms: (f64, f64),
    pub idle_flip_chance: f64,
    pub jump_velocity: f64,
    /// Chase-jump triggers when |dx| < this many tiles...
    pub chase_jump_dx_tiles: f64,
    /// ...and the player is at least this many tiles above
    pub chase_jump_dy_tiles: f64,
    /// Horizontal acceleration, px/s per ms of tick
    pub accel_per_ms: f64,
    pub water_max_rise: f64,
    pub water_max_sink: f64,
}

impl Default for MonsterTuning {
    fn default() -> Self {
        Self {
            population: 14,
            max_spawn_tries: 420,
            min_player_distance_tiles: 10.0,
            chase_radius_tiles: 14.0,
            chase_think_ms: (80.0, 120.0),
            idle_think_ms: (220.0, 520.0),
            initial_think_ms: (150.0, 450.0),
            idle_flip_chance: 0.45,
            jump_velocity: 250.0,
            chase_jump_dx_tiles: 2.5,
            chase_jump_dy_tiles: 0.8,
            accel_per_ms: 0.8,
            water_max_rise: 140.0,
            water_max_sink: 200.0,
        }
    }
}

/// Autosave behavior
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveTuning {
    /// Minimum host-clock gap between writes
    pub autosave_interval_ms: f64,
}

impl Default for SaveTuning {
    fn default() -> Self {
        Self {
            autosave_interval_ms: 1200.0,
        }
    }
}

/// Complete balance table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub world: WorldGenTuning,
    pub physics: PhysicsTuning,
    pub player: PlayerTuning,
    pub mining: MiningTuning,
    pub monsters: MonsterTuning,
    pub save: SaveTuning,
}

impl Tuning {
    /// Parse a (possibly partial) tuning override
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the full table (handy for dumping defaults)
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}
