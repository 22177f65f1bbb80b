//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Host-supplied delta time only, no clock access
//! - Seeded RNG only
//! - Stable iteration order (monsters by id)
//! - No rendering or platform dependencies

pub mod collision;
pub mod grid;
pub mod inventory;
pub mod mining;
pub mod monster;
pub mod random;
pub mod state;
pub mod tick;
pub mod tile;
pub mod worldgen;

pub use collision::{Axis, Body, resolve_axis};
pub use grid::TileGrid;
pub use inventory::Inventory;
pub use mining::{MiningOutcome, MiningSession, can_reach, try_place};
pub use monster::{AiState, Monster, MonsterKind};
pub use random::{SeededRandom, hash_seed};
pub use state::{GameEvent, GameSession, PlayerHealth, ToolMode};
pub use tick::{TickInput, tick};
pub use tile::{HOTBAR, TileType};
pub use worldgen::{find_spawn_y, find_surface_y, generate, spawn_monsters};
