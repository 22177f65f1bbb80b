//! Browser bindings
//!
//! `LocalStorageStore` backs saves with `window.localStorage`; `WebGame` is
//! the handle the page script drives from its animation frame loop and
//! input listeners. Rendering and UI stay on the JS side.

use wasm_bindgen::prelude::*;

use crate::driver::GameDriver;
use crate::persistence::{KeyValueStore, StoreError};
use crate::sim::{TickInput, TileType, ToolMode};
use crate::tuning::Tuning;

/// Save store over `window.localStorage`
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorageStore;

impl LocalStorageStore {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok()).flatten()
    }

    fn require() -> Result<web_sys::Storage, StoreError> {
        Self::storage().ok_or_else(|| StoreError::Unavailable("localStorage is not available".into()))
    }
}

impl KeyValueStore for LocalStorageStore {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        Self::require()?
            .set_item(key, value)
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        Self::require()?
            .remove_item(key)
            .map_err(|e| StoreError::Unavailable(format!("{e:?}")))
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"pixel-miner: logger already initialized".into());
    }
    log::info!("Pixel Miner core loaded");
}

/// Game handle exposed to the page
#[wasm_bindgen]
pub struct WebGame {
    driver: GameDriver<LocalStorageStore>,
    input: TickInput,
}

#[wasm_bindgen]
impl WebGame {
    /// Load the saved world or create one. `date` is `YYYY-MM-DD`;
    /// `tuning_json` optionally overrides balance values.
    #[wasm_bindgen(constructor)]
    pub fn new(player_name: Option<String>, date: String, tuning_json: Option<String>) -> WebGame {
        let tuning = match tuning_json.as_deref().map(Tuning::from_json) {
            Some(Ok(t)) => t,
            Some(Err(e)) => {
                log::warn!("Ignoring invalid tuning: {e}");
                Tuning::default()
            }
            None => Tuning::default(),
        };
        let driver = GameDriver::load_or_create(LocalStorageStore, tuning, player_name.as_deref(), &date);
        WebGame {
            driver,
            input: TickInput::default(),
        }
    }

    pub fn set_move(&mut self, left: bool, right: bool) {
        self.input.left = left;
        self.input.right = right;
    }

    pub fn set_jump(&mut self, held: bool) {
        self.input.jump = held;
    }

    /// Pointer over tile (tx, ty) with the primary button up or down
    pub fn set_pointer(&mut self, tx: i32, ty: i32, down: bool) {
        self.input.pointer = Some((tx, ty));
        self.input.pointer_down = down;
    }

    /// Pointer left the canvas
    pub fn clear_pointer(&mut self) {
        self.input.pointer = None;
        self.input.pointer_down = false;
    }

    /// Secondary click: place at the pointer
    pub fn request_place(&mut self) {
        self.input.place = true;
    }

    pub fn set_place_mode(&mut self, place: bool) {
        self.input.tool_mode = Some(if place { ToolMode::Place } else { ToolMode::Mine });
    }

    pub fn select_slot(&mut self, slot: usize) {
        self.input.selected_slot = Some(slot);
    }

    /// Run one animation frame
    pub fn frame(&mut self, dt_ms: f64, now_ms: f64) {
        self.driver.frame(&self.input, dt_ms, now_ms);
        // One-shot requests are consumed by the tick
        self.input.place = false;
        self.input.tool_mode = None;
        self.input.selected_slot = None;
    }

    pub fn reset(&mut self, player_name: Option<String>, date: String) {
        self.driver.reset(player_name.as_deref(), &date);
        self.input = TickInput::default();
    }

    pub fn save(&mut self) -> bool {
        self.driver.save_now()
    }

    pub fn world_width(&self) -> usize {
        self.driver.session().grid.width()
    }

    pub fn world_height(&self) -> usize {
        self.driver.session().grid.height()
    }

    /// Row-major tile ids
    pub fn world_bytes(&self) -> Vec<u8> {
        self.driver.session().grid.as_bytes().to_vec()
    }

    pub fn player_x(&self) -> f64 {
        self.driver.session().player.pos.x
    }

    pub fn player_y(&self) -> f64 {
        self.driver.session().player.pos.y
    }

    pub fn hp(&self) -> u32 {
        self.driver.session().health.hp
    }

    pub fn max_hp(&self) -> u32 {
        self.driver.session().health.max_hp
    }

    pub fn damage_flash_ms(&self) -> f64 {
        self.driver.session().health.damage_flash_ms
    }

    pub fn selected_slot(&self) -> usize {
        self.driver.session().selected_slot
    }

    pub fn place_mode(&self) -> bool {
        self.driver.session().tool_mode == ToolMode::Place
    }

    /// Held count for a tile id (0 for unknown ids)
    pub fn inventory_count(&self, tile_id: u8) -> u32 {
        TileType::from_id(tile_id).map_or(0, |t| self.driver.session().inventory.count(t))
    }

    /// Sprite id for a tile id, if the id is known
    pub fn tile_display_id(tile_id: u8) -> Option<String> {
        TileType::from_id(tile_id).map(|t| t.def().display_id.to_owned())
    }

    /// Digging progress in [0, 1]
    pub fn mining_progress(&self) -> f64 {
        self.driver.session().mining.progress()
    }

    /// Monsters as a flat `[x, y, dir, ...]` array
    pub fn monsters_flat(&self) -> Vec<f64> {
        self.driver
            .session()
            .monsters
            .iter()
            .flat_map(|m| [m.body.pos.x, m.body.pos.y, f64::from(m.dir)])
            .collect()
    }

    /// Events since the last call, as a JSON array
    pub fn drain_events_json(&mut self) -> String {
        let events = self.driver.drain_events();
        serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_owned())
    }
}
