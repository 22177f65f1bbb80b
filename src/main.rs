//! Pixel Miner entry point
//!
//! The browser build is driven from JS through `platform::web::WebGame`.
//! The native binary runs the simulation headless: it loads (or creates)
//! the save in a directory, plays a scripted walk-and-dig session and
//! writes the save back.

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    use clap::Parser;
    use pixel_miner::persistence::FileStore;
    use pixel_miner::sim::{GameEvent, TickInput};
    use pixel_miner::{GameDriver, Tuning, platform, world_to_tile};

    /// Simulated frame length
    const FRAME_MS: f64 = 16.0;

    /// Run a headless Pixel Miner session against a save directory.
    #[derive(Debug, Parser)]
    #[command(version, about, long_about = None)]
    struct CliArgs {
        /// JSON file overriding game balance values.
        #[arg(long, value_name = "FILE")]
        tuning: Option<PathBuf>,
        /// Directory holding the save file.
        #[arg(long, value_name = "DIR", default_value = "saves")]
        save_dir: PathBuf,
        /// Number of simulation ticks to run.
        #[arg(
            long,
            value_name = "COUNT",
            default_value_t = 600,
            value_parser = clap::value_parser!(u32)
        )]
        ticks: u32,
        /// Player name used in the seed of a new world.
        #[arg(long, value_name = "NAME")]
        name: Option<String>,
        /// Discard the existing save and start a new world.
        #[arg(long)]
        reset: bool,
        /// Print the effective tuning as JSON and exit.
        #[arg(long)]
        dump_tuning: bool,
    }

    fn load_tuning(path: Option<&PathBuf>) -> Result<Tuning, String> {
        let Some(path) = path else {
            return Ok(Tuning::default());
        };
        let json = std::fs::read_to_string(path).map_err(|e| format!("{}: {e}", path.display()))?;
        Tuning::from_json(&json).map_err(|e| format!("{}: {e}", path.display()))
    }

    /// Walk back and forth, hop every so often and dig at the tile ahead
    fn scripted_input(tick: u32, player_x: f64, player_y: f64) -> TickInput {
        let right = (tick / 240) % 2 == 0;
        let ahead = if right { 1 } else { -1 };
        TickInput {
            left: !right,
            right,
            jump: tick % 90 < 3,
            pointer: Some((world_to_tile(player_x) + ahead, world_to_tile(player_y))),
            pointer_down: tick % 60 < 45,
            ..Default::default()
        }
    }

    pub fn run() -> Result<(), String> {
        let args = CliArgs::parse();
        let tuning = load_tuning(args.tuning.as_ref())?;
        if args.dump_tuning {
            println!("{}", tuning.to_json_pretty());
            return Ok(());
        }

        let date = platform::today();
        let store = FileStore::new(&args.save_dir);
        log::info!("Saves in {}", store.dir().display());
        let mut driver = GameDriver::load_or_create(store, tuning, args.name.as_deref(), &date);
        if args.reset {
            driver.reset(args.name.as_deref(), &date);
        }

        let mut tally: BTreeMap<&'static str, u32> = BTreeMap::new();
        let mut now = 0.0;
        for i in 0..args.ticks {
            let p = driver.session().player.pos;
            driver.frame(&scripted_input(i, p.x, p.y), FRAME_MS, now);
            now += FRAME_MS;
            for event in driver.drain_events() {
                let name = match event {
                    GameEvent::MineTick { .. } => "mine_tick",
                    GameEvent::TileBroken { .. } => "tile_broken",
                    GameEvent::TilePlaced { .. } => "tile_placed",
                    GameEvent::PlayerHurt { .. } => "player_hurt",
                    GameEvent::PlayerRespawned => "player_respawned",
                    GameEvent::Jumped { .. } => "jumped",
                };
                *tally.entry(name).or_default() += 1;
            }
        }
        driver.save_now();

        let s = driver.session();
        log::info!(
            "Ran {} ticks in world {:?}: player at ({:.1}, {:.1}), hp {}/{}",
            args.ticks,
            s.seed,
            s.player.pos.x,
            s.player.pos.y,
            s.health.hp,
            s.health.max_hp,
        );
        let mut population: BTreeMap<&'static str, u32> = BTreeMap::new();
        for m in &s.monsters {
            *population.entry(m.kind.def().name).or_default() += 1;
        }
        for (name, count) in &population {
            log::info!("  {name} x{count} roaming");
        }
        for (name, count) in &tally {
            log::info!("  {name}: {count}");
        }
        for (tile, count) in s.inventory.iter() {
            log::info!("  holding {} x{}", tile.def().name, count);
        }
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Pixel Miner (native, headless) starting...");
    if let Err(e) = native::run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The page drives the game through the library's `WebGame` export
}
