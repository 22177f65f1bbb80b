//! Pixel Miner - simulation core for a 2D tile-based mining sandbox
//!
//! Core modules:
//! - `sim`: Deterministic simulation (world generation, tile physics, mining, monsters)
//! - `persistence`: Save record codec and key-value storage
//! - `driver`: Host-facing loop wrapper (delta clamping, autosave throttling)
//! - `platform`: Browser bindings (wasm32 only)
//! - `tuning`: Data-driven game balance

pub mod driver;
pub mod persistence;
pub mod platform;
pub mod sim;
pub mod tuning;

pub use driver::GameDriver;
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Tile edge length in world pixels
    pub const TILE_SIZE: f64 = 16.0;

    /// Default world dimensions in tiles
    pub const WORLD_W: usize = 256;
    pub const WORLD_H: usize = 128;

    /// Largest delta a single tick may advance (ms). Longer frames are clamped
    /// so a stalled host doesn't launch bodies through the floor.
    pub const MAX_TICK_MS: f64 = 33.0;

    /// Storage key for the single save slot
    pub const SAVE_KEY: &str = "ngames.pixel_miner.save.v1";
}

/// Move `current` toward `target` by at most `max_delta`
#[inline]
pub fn approach(current: f64, target: f64, max_delta: f64) -> f64 {
    let d = target - current;
    if d.abs() <= max_delta {
        target
    } else {
        current + d.signum() * max_delta
    }
}

/// Convert a world pixel coordinate to the tile index containing it
#[inline]
pub fn world_to_tile(px: f64) -> i32 {
    (px / consts::TILE_SIZE).floor() as i32
}

/// World pixel coordinate of a tile's center
#[inline]
pub fn tile_center(t: i32) -> f64 {
    (t as f64 + 0.5) * consts::TILE_SIZE
}
