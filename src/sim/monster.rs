//! Monster entities and their reactive AI
//!
//! Each monster runs a two-state loop: `Idle` (wander, occasionally turning
//! around) and `Chasing` (head for the player, jump toward them). The state
//! is re-evaluated every tick from the distance to the player; direction is
//! only re-decided when the monster's think timer runs out.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::collision::{self, Body, Gravity};
use super::grid::TileGrid;
use super::random::SeededRandom;
use crate::approach;
use crate::consts::TILE_SIZE;
use crate::tuning::{MonsterTuning, PhysicsTuning};

/// Static per-kind properties
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonsterDef {
    pub name: &'static str,
    /// Walk speed, px/s
    pub speed: f64,
    pub contact_damage: u32,
    pub width: f64,
    pub height: f64,
}

/// Monster kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MonsterKind {
    #[default]
    Slime,
}

impl MonsterKind {
    pub const fn def(self) -> MonsterDef {
        match self {
            MonsterKind::Slime => MonsterDef {
                name: "Slime",
                speed: 56.0,
                contact_damage: 1,
                width: 14.0,
                height: 12.0,
            },
        }
    }
}

/// AI mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AiState {
    #[default]
    Idle,
    Chasing,
}

impl AiState {
    /// Chasing when the player is strictly inside the chase radius
    pub fn classify(monster: DVec2, player: DVec2, chase_radius_tiles: f64) -> Self {
        let r = chase_radius_tiles * TILE_SIZE;
        if monster.distance_squared(player) < r * r {
            AiState::Chasing
        } else {
            AiState::Idle
        }
    }
}

/// A monster instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    pub id: u32,
    pub kind: MonsterKind,
    pub body: Body,
    /// Facing / walking direction: -1 or 1
    pub dir: i8,
    /// Time until the next direction decision
    pub think_ms: f64,
    pub ai: AiState,
}

/// A monster touched the player this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub monster_id: u32,
    pub damage: u32,
    pub source_x: f64,
}

impl Monster {
    pub fn new(id: u32, kind: MonsterKind, pos: DVec2, dir: i8, think_ms: f64) -> Self {
        let def = kind.def();
        Self {
            id,
            kind,
            body: Body::new(pos, DVec2::new(def.width, def.height)),
            dir,
            think_ms,
            ai: AiState::Idle,
        }
    }

    #[inline]
    fn dir_f(&self) -> f64 {
        f64::from(self.dir)
    }

    /// Count down the think timer and, when it expires, pick a new
    /// direction and the next think interval.
    pub fn think(&mut self, player: DVec2, dt_ms: f64, rng: &mut SeededRandom, tuning: &MonsterTuning) {
        self.ai = AiState::classify(self.body.pos, player, tuning.chase_radius_tiles);

        self.think_ms -= dt_ms;
        if self.think_ms > 0.0 {
            return;
        }

        self.think_ms = rng.spread(match self.ai {
            AiState::Chasing => tuning.chase_think_ms,
            AiState::Idle => tuning.idle_think_ms,
        });

        match self.ai {
            AiState::Chasing => {
                self.dir = if player.x < self.body.pos.x { -1 } else { 1 };
            }
            AiState::Idle => {
                if rng.chance(tuning.idle_flip_chance) {
                    self.dir = -self.dir;
                }
            }
        }
    }

    /// Jump over obstacles (or toward a player above) and ease toward
    /// walking speed. Uses `on_ground` from the previous physics step.
    pub fn steer(&mut self, grid: &TileGrid, player: DVec2, dt_ms: f64, tuning: &MonsterTuning) {
        let half = self.body.half();
        let look_x = self.body.pos.x + self.dir_f() * (half.x + 2.0);
        let foot = DVec2::new(look_x, self.body.pos.y + half.y - 2.0);
        let head = DVec2::new(look_x, self.body.pos.y - half.y + 2.0);
        let blocked = collision::tile_at_px(grid, foot).is_solid() || collision::tile_at_px(grid, head).is_solid();

        let d = player - self.body.pos;
        let player_above = self.ai == AiState::Chasing
            && d.x.abs() < TILE_SIZE * tuning.chase_jump_dx_tiles
            && d.y < -TILE_SIZE * tuning.chase_jump_dy_tiles;

        if self.body.on_ground && (blocked || player_above) {
            self.body.vel.y = -tuning.jump_velocity;
        }

        let desired = self.dir_f() * self.kind.def().speed;
        self.body.vel.x = approach(self.body.vel.x, desired, dt_ms * tuning.accel_per_ms);
    }

    /// Gravity, collision and world-edge handling. Walking into the world
    /// edge turns the monster around.
    pub fn step_physics(&mut self, grid: &TileGrid, dt_s: f64, physics: &PhysicsTuning, tuning: &MonsterTuning) {
        let gravity = Gravity {
            accel: physics.gravity,
            water_accel: physics.water_gravity,
            water_max_rise: tuning.water_max_rise,
            water_max_sink: tuning.water_max_sink,
        };
        collision::apply_gravity(grid, &mut self.body, &gravity, dt_s);
        collision::move_and_collide(grid, &mut self.body, dt_s);
        if collision::clamp_to_world(grid, &mut self.body) {
            self.dir = -self.dir;
        }
    }
}

/// Run AI and physics for every monster. Returns the contacts with the
/// player; the caller routes them through the damage path.
pub fn update_monsters(
    monsters: &mut [Monster],
    grid: &TileGrid,
    player: &Body,
    dt_ms: f64,
    rng: &mut SeededRandom,
    physics: &PhysicsTuning,
    tuning: &MonsterTuning,
) -> Vec<Contact> {
    let dt_s = dt_ms / 1000.0;
    let mut contacts = Vec::new();

    for m in monsters.iter_mut() {
        m.think(player.pos, dt_ms, rng, tuning);
        m.steer(grid, player.pos, dt_ms, tuning);
        m.step_physics(grid, dt_s, physics, tuning);

        if m.body.overlaps(player) {
            contacts.push(Contact {
                monster_id: m.id,
                damage: m.kind.def().contact_damage,
                source_x: m.body.pos.x,
            });
        }
    }

    contacts
}
