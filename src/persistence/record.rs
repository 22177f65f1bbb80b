//! Save record codec
//!
//! The record is a flat JSON object:
//! `{seed, worldB64, inventory: {"<tile id>": n}, selectedSlot,
//!   player: {x, y, vx, vy}, hp, maxHp}`.
//! Decoding is lenient about missing scalar fields (they take defaults and
//! are clamped into range) but strict about the world grid: a grid that
//! doesn't decode to exactly `width * height` bytes rejects the record.

use std::collections::BTreeMap;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::StoreError;
use crate::sim::grid::TileGrid;
use crate::sim::inventory::Inventory;
use crate::sim::state::GameSession;
use crate::sim::tile::{HOTBAR, TileType};
use crate::sim::worldgen;
use crate::tuning::Tuning;

/// Errors while reading or writing a save
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("save record is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("world data is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("world data has {found} bytes, expected {expected}")]
    GridSize { expected: usize, found: usize },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Player kinematics as saved
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SavedPlayer {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
}

fn default_seed() -> String {
    "seed".to_owned()
}

fn default_max_hp() -> i64 {
    5
}

/// On-disk form of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRecord {
    #[serde(default = "default_seed")]
    pub seed: String,
    #[serde(rename = "worldB64")]
    pub world_b64: String,
    /// Tile id (as a string key) -> count
    #[serde(default)]
    pub inventory: BTreeMap<String, i64>,
    #[serde(default)]
    pub selected_slot: i64,
    #[serde(default)]
    pub player: SavedPlayer,
    #[serde(default)]
    pub hp: i64,
    #[serde(default = "default_max_hp")]
    pub max_hp: i64,
}

impl SaveRecord {
    /// Snapshot the persistent parts of a session
    pub fn from_session(session: &GameSession) -> Self {
        let p = &session.player;
        Self {
            seed: session.seed.clone(),
            world_b64: STANDARD.encode(session.grid.as_bytes()),
            inventory: session
                .inventory
                .iter()
                .map(|(tile, n)| (tile.id().to_string(), i64::from(n)))
                .collect(),
            selected_slot: session.selected_slot as i64,
            player: SavedPlayer {
                x: p.pos.x,
                y: p.pos.y,
                vx: p.vel.x,
                vy: p.vel.y,
            },
            hp: i64::from(session.health.hp),
            max_hp: i64::from(session.health.max_hp),
        }
    }

    pub fn to_json(&self) -> Result<String, SaveError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SaveError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Rebuild a session. The saved position becomes the spawn point and
    /// monsters are re-placed from the seed.
    pub fn into_session(self, tuning: Tuning) -> Result<GameSession, SaveError> {
        let (w, h) = (tuning.world.width, tuning.world.height);
        let bytes = STANDARD.decode(self.world_b64.as_bytes())?;
        let found = bytes.len();
        let grid = TileGrid::from_bytes(w, h, bytes).ok_or(SaveError::GridSize {
            expected: w * h,
            found,
        })?;

        // Missing or zero coordinates fall back to the world's spawn point
        let fallback = worldgen::spawn_point(&grid);
        let coord = |v: f64, fallback: f64| if v.is_finite() && v != 0.0 { v } else { fallback };
        let finite = |v: f64| if v.is_finite() { v } else { 0.0 };
        let pos = DVec2::new(coord(self.player.x, fallback.x), coord(self.player.y, fallback.y));

        let mut session = GameSession::with_world(&self.seed, grid, pos, tuning);
        session.inventory = sanitize_inventory(&self.inventory);
        session.selected_slot = self.selected_slot.clamp(0, HOTBAR.len() as i64 - 1) as usize;
        session.player.vel = DVec2::new(finite(self.player.vx), finite(self.player.vy));

        let max_hp = self.max_hp.clamp(1, i64::from(u32::MAX)) as u32;
        let hp = self.hp.clamp(0, i64::from(max_hp)) as u32;
        session.health.max_hp = max_hp;
        session.health.hp = if hp > 0 { hp } else { max_hp };

        Ok(session)
    }
}

/// Keep known tile ids with positive counts
fn sanitize_inventory(raw: &BTreeMap<String, i64>) -> Inventory {
    let mut inv = Inventory::new();
    for (key, &count) in raw {
        let tile = key.trim().parse::<u8>().ok().and_then(TileType::from_id);
        match tile {
            Some(tile) if tile != TileType::Air && count > 0 => {
                inv.set(tile, u32::try_from(count).unwrap_or(u32::MAX));
            }
            _ => log::debug!("Dropping inventory entry {key:?} = {count}"),
        }
    }
    inv
}

/// Serialize a session to its JSON save record
pub fn encode(session: &GameSession) -> Result<String, SaveError> {
    SaveRecord::from_session(session).to_json()
}

/// Parse a JSON save record back into a session
pub fn decode(json: &str, tuning: Tuning) -> Result<GameSession, SaveError> {
    SaveRecord::from_json(json)?.into_session(tuning)
}
