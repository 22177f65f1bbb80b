//! Game session state and core simulation types
//!
//! A `GameSession` owns everything one running world needs: the tile grid,
//! the player, monsters, inventory and the AI random stream. It is created
//! by the host (fresh world or restored save) and advanced by `tick`.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::collision::{self, Body};
use super::grid::TileGrid;
use super::inventory::Inventory;
use super::mining::MiningSession;
use super::monster::Monster;
use super::random::{SeededRandom, hash_seed};
use super::tile::{HOTBAR, TileType, hotbar_tile};
use super::worldgen;
use crate::tuning::Tuning;

/// Mixed into the seed hash for the AI stream so it never mirrors terrain
const AI_STREAM_SALT: u32 = 0x85eb_ca6b;

/// What a pointer press does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToolMode {
    #[default]
    Mine,
    Place,
}

/// Feedback for the host (sounds, particles, HUD refresh).
/// Drained with `GameSession::drain_events`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// Digging feedback pulse on the target tile
    MineTick { tx: i32, ty: i32 },
    TileBroken { tile: TileType, tx: i32, ty: i32 },
    TilePlaced { tile: TileType, tx: i32, ty: i32 },
    PlayerHurt { damage: u32, hp: u32 },
    /// hp hit zero; player is back at spawn with full health
    PlayerRespawned,
    Jumped { in_water: bool },
}

/// Player hit points and damage timers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerHealth {
    pub hp: u32,
    pub max_hp: u32,
    /// Damage is ignored while positive
    pub invuln_ms: f64,
    /// Hurt flash remaining (render only)
    pub damage_flash_ms: f64,
}

impl PlayerHealth {
    pub fn full(max_hp: u32) -> Self {
        let max_hp = max_hp.max(1);
        Self {
            hp: max_hp,
            max_hp,
            invuln_ms: 0.0,
            damage_flash_ms: 0.0,
        }
    }

    #[inline]
    pub fn is_invulnerable(&self) -> bool {
        self.invuln_ms > 0.0
    }

    /// Count both timers down, flooring at zero
    pub fn tick_timers(&mut self, dt_ms: f64) {
        self.invuln_ms = (self.invuln_ms - dt_ms).max(0.0);
        self.damage_flash_ms = (self.damage_flash_ms - dt_ms).max(0.0);
    }
}

/// One running world
#[derive(Debug, Clone)]
pub struct GameSession {
    /// World seed string (terrain and monster placement derive from it)
    pub seed: String,
    pub grid: TileGrid,
    pub inventory: Inventory,
    /// Index into the hotbar
    pub selected_slot: usize,
    pub tool_mode: ToolMode,
    pub player: Body,
    /// Where the player reappears after dying
    pub spawn: DVec2,
    pub health: PlayerHealth,
    pub mining: MiningSession,
    /// Sorted by id
    pub monsters: Vec<Monster>,
    pub tuning: Tuning,
    /// Simulation ticks since the session started
    pub time_ticks: u64,
    /// AI decisions draw from here, never from an ambient RNG
    pub(crate) ai_rng: SeededRandom,
    /// Jump key held last tick (edge detection)
    pub(crate) jump_latch: bool,
    /// Pointer held last tick
    pub(crate) pointer_was_down: bool,
    events: Vec<GameEvent>,
    next_monster_id: u32,
}

impl GameSession {
    /// Generate a fresh world for `seed` and drop the player at its spawn point
    pub fn new_world(seed: &str, tuning: Tuning) -> Self {
        let grid = worldgen::generate(seed, &tuning.world);
        let spawn = worldgen::spawn_point(&grid);
        Self::with_world(seed, grid, spawn, tuning)
    }

    /// Session over an existing grid with the player at `spawn`, holding the
    /// starter inventory at full health. Monsters are placed immediately.
    pub fn with_world(seed: &str, grid: TileGrid, spawn: DVec2, tuning: Tuning) -> Self {
        let player = Body::new(spawn, DVec2::new(tuning.player.width, tuning.player.height));
        let mut session = Self {
            seed: seed.to_owned(),
            grid,
            inventory: Inventory::starter(),
            selected_slot: 0,
            tool_mode: ToolMode::Mine,
            player,
            spawn,
            health: PlayerHealth::full(tuning.player.max_hp),
            mining: MiningSession::default(),
            monsters: Vec::new(),
            ai_rng: SeededRandom::new(hash_seed(seed) ^ AI_STREAM_SALT),
            tuning,
            time_ticks: 0,
            jump_latch: false,
            pointer_was_down: false,
            events: Vec::new(),
            next_monster_id: 1,
        };
        session.respawn_monsters();
        session
    }

    /// Replace the monster population with a fresh placement for this seed
    pub fn respawn_monsters(&mut self) {
        self.monsters = worldgen::spawn_monsters(
            &self.grid,
            &self.seed,
            self.player.pos.x,
            self.next_monster_id,
            &self.tuning.monsters,
        );
        self.next_monster_id += self.monsters.len() as u32;
    }

    /// Tile the selected hotbar slot places
    pub fn selected_tile(&self) -> TileType {
        hotbar_tile(self.selected_slot)
    }

    /// Select a hotbar slot; out-of-range slots are ignored
    pub fn select_slot(&mut self, slot: usize) {
        if slot < HOTBAR.len() {
            self.selected_slot = slot;
        }
    }

    /// Tile just below the player's feet
    pub fn feet_tile(&self) -> TileType {
        collision::feet_tile(&self.grid, &self.player)
    }

    /// Hurt the player, knocking them away from `source_x`.
    ///
    /// Ignored while invulnerable or for zero damage. Reaching zero hp
    /// respawns the player at full health and re-places the monsters.
    pub fn apply_damage(&mut self, amount: u32, source_x: f64) {
        if self.health.is_invulnerable() || amount == 0 {
            return;
        }
        let t = &self.tuning.player;
        self.health.hp = self.health.hp.saturating_sub(amount);
        self.health.invuln_ms = t.invuln_ms;
        self.health.damage_flash_ms = t.flash_ms;

        let away = if self.player.pos.x < source_x { -1.0 } else { 1.0 };
        self.player.vel.x = away * t.knockback_x;
        self.player.vel.y = self.player.vel.y.min(-t.knockback_y);
        self.emit(GameEvent::PlayerHurt {
            damage: amount,
            hp: self.health.hp,
        });

        if self.health.hp == 0 {
            self.respawn();
        }
    }

    fn respawn(&mut self) {
        log::info!("Player died, respawning at ({:.1}, {:.1})", self.spawn.x, self.spawn.y);
        self.health.hp = self.health.max_hp;
        self.player.pos = self.spawn;
        self.player.vel = DVec2::ZERO;
        self.mining.cancel();
        self.respawn_monsters();
        self.health.invuln_ms = self.tuning.player.respawn_invuln_ms;
        self.health.damage_flash_ms = self.tuning.player.respawn_flash_ms;
        self.emit(GameEvent::PlayerRespawned);
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Take all events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
