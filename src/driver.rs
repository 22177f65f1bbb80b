//! Host-facing game loop wrapper
//!
//! Owns the session and its save store. Each host frame goes through
//! `frame`, which clamps the delta, runs one simulation tick and autosaves
//! at most once per `SaveTuning::autosave_interval_ms` of host time.

use crate::consts::{MAX_TICK_MS, SAVE_KEY};
use crate::persistence::{self, KeyValueStore};
use crate::sim::{GameEvent, GameSession, TickInput, tick};
use crate::tuning::Tuning;

/// Seed for a new world: `pm_<player name or "seed">_<date>`.
/// `date` is the host's current date as `YYYY-MM-DD`.
pub fn new_world_seed(player_name: Option<&str>, date: &str) -> String {
    let name = player_name.filter(|n| !n.is_empty()).unwrap_or("seed");
    format!("pm_{name}_{date}")
}

/// Clamp a raw host delta into the range a single tick may advance
pub fn clamp_dt(raw_dt_ms: f64) -> f64 {
    if raw_dt_ms.is_finite() {
        raw_dt_ms.clamp(0.0, MAX_TICK_MS)
    } else {
        0.0
    }
}

pub struct GameDriver<S: KeyValueStore> {
    session: GameSession,
    store: S,
    tuning: Tuning,
    /// Host time of the last autosave; unset until the first frame
    last_save_ms: Option<f64>,
}

impl<S: KeyValueStore> GameDriver<S> {
    /// Restore the saved session, or start (and immediately save) a new
    /// world when there is no usable save
    pub fn load_or_create(store: S, tuning: Tuning, player_name: Option<&str>, date: &str) -> Self {
        let loaded = store.get(SAVE_KEY).and_then(|json| {
            match persistence::decode(&json, tuning.clone()) {
                Ok(session) => Some(session),
                Err(e) => {
                    log::warn!("Discarding unreadable save: {e}");
                    None
                }
            }
        });

        match loaded {
            Some(session) => {
                log::info!("Loaded saved world {:?}", session.seed);
                Self {
                    session,
                    store,
                    tuning,
                    last_save_ms: None,
                }
            }
            None => {
                let seed = new_world_seed(player_name, date);
                log::info!("Starting new world {seed:?}");
                let mut driver = Self {
                    session: GameSession::new_world(&seed, tuning.clone()),
                    store,
                    tuning,
                    last_save_ms: None,
                };
                driver.save_now();
                driver
            }
        }
    }

    /// Advance one host frame. `now_ms` is the host clock used for the
    /// autosave throttle only.
    pub fn frame(&mut self, input: &TickInput, raw_dt_ms: f64, now_ms: f64) {
        tick(&mut self.session, input, clamp_dt(raw_dt_ms));

        match self.last_save_ms {
            None => self.last_save_ms = Some(now_ms),
            Some(last) if now_ms - last > self.tuning.save.autosave_interval_ms => {
                self.last_save_ms = Some(now_ms);
                self.save_now();
            }
            Some(_) => {}
        }
    }

    /// Write the save record. Failures are logged, never fatal.
    pub fn save_now(&mut self) -> bool {
        let result = persistence::encode(&self.session)
            .and_then(|json| self.store.set(SAVE_KEY, &json).map_err(Into::into));
        match result {
            Ok(()) => {
                log::debug!("Saved world {:?}", self.session.seed);
                true
            }
            Err(e) => {
                log::warn!("Autosave failed: {e}");
                false
            }
        }
    }

    /// Wipe the save and start over in a new world
    pub fn reset(&mut self, player_name: Option<&str>, date: &str) {
        if let Err(e) = self.store.remove(SAVE_KEY) {
            log::warn!("Failed to clear save: {e}");
        }
        let seed = new_world_seed(player_name, date);
        log::info!("Resetting to new world {seed:?}");
        self.session = GameSession::new_world(&seed, self.tuning.clone());
        self.save_now();
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut GameSession {
        &mut self.session
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.session.drain_events()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
