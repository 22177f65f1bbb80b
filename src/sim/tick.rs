//! Per-tick simulation step
//!
//! Advances a `GameSession` by one host frame. The host is responsible for
//! clamping `dt_ms`; the core integrates whatever it is given.

use glam::DVec2;

use super::collision::{self, Gravity};
use super::mining::{self, MiningOutcome};
use super::monster;
use super::state::{GameEvent, GameSession, ToolMode};
use super::tile::TileType;
use crate::world_to_tile;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    /// Jump key held. Jumps trigger on the press edge only.
    pub jump: bool,
    /// Tile under the pointer, if it is over the world
    pub pointer: Option<(i32, i32)>,
    /// Primary pointer button / touch held
    pub pointer_down: bool,
    /// Secondary press: switch to Place mode and place at the pointer
    pub place: bool,
    /// Tool mode change
    pub tool_mode: Option<ToolMode>,
    /// Hotbar selection change
    pub selected_slot: Option<usize>,
}

/// Advance the session by `dt_ms` milliseconds
pub fn tick(session: &mut GameSession, input: &TickInput, dt_ms: f64) {
    let dt_s = dt_ms / 1000.0;

    apply_selection(session, input);
    apply_pointer(session, input);

    update_player(session, input, dt_s);
    update_mining(session, input.pointer, dt_ms);

    let contacts = monster::update_monsters(
        &mut session.monsters,
        &session.grid,
        &session.player,
        dt_ms,
        &mut session.ai_rng,
        &session.tuning.physics,
        &session.tuning.monsters,
    );
    for contact in contacts {
        log::debug!("Monster {} touched the player", contact.monster_id);
        session.apply_damage(contact.damage, contact.source_x);
    }

    session.health.tick_timers(dt_ms);
    session.time_ticks += 1;
}

fn apply_selection(session: &mut GameSession, input: &TickInput) {
    if let Some(slot) = input.selected_slot {
        session.select_slot(slot);
    }
    if let Some(mode) = input.tool_mode {
        session.tool_mode = mode;
    }
}

/// Press starts mining or places; dragging retargets mining; release cancels
fn apply_pointer(session: &mut GameSession, input: &TickInput) {
    let pressed = input.pointer_down && !session.pointer_was_down;
    let released = !input.pointer_down && session.pointer_was_down;
    session.pointer_was_down = input.pointer_down;

    if released {
        session.mining.cancel();
    }

    if input.place {
        session.tool_mode = ToolMode::Place;
        if let Some((tx, ty)) = input.pointer {
            place_selected(session, tx, ty);
        }
        return;
    }

    let Some((tx, ty)) = input.pointer else {
        return;
    };

    match session.tool_mode {
        ToolMode::Place => {
            if pressed {
                place_selected(session, tx, ty);
            }
        }
        ToolMode::Mine => {
            if pressed || (input.pointer_down && !session.mining.targets(tx, ty)) {
                session.mining.cancel();
                let reach = session.tuning.mining.reach_tiles;
                session.mining.start(&session.grid, tx, ty, session.player.pos, reach);
            }
        }
    }
}

fn place_selected(session: &mut GameSession, tx: i32, ty: i32) {
    let tile = session.selected_tile();
    let placed = mining::try_place(
        &mut session.grid,
        &mut session.inventory,
        &session.player,
        tx,
        ty,
        tile,
        session.tuning.mining.reach_tiles,
    );
    if placed {
        session.emit(GameEvent::TilePlaced { tile, tx, ty });
    }
}

/// Jump, walk, gravity, collision, world clamp, lava lift
fn update_player(session: &mut GameSession, input: &TickInput, dt_s: f64) {
    let pressed = input.jump && !session.jump_latch;
    session.jump_latch = input.jump;

    let feet = session.feet_tile();
    let in_water = feet == TileType::Water;
    let in_lava = feet == TileType::Lava;
    let t = &session.tuning.player;

    if pressed {
        // on_ground is only known after collision, so probe the tile below
        let p = &session.player;
        let below = session.grid.get(
            world_to_tile(p.pos.x),
            world_to_tile(p.pos.y + p.half().y + 1.0),
        );
        if in_water || below.is_solid() {
            let jump = if in_water { t.water_jump_velocity } else { t.jump_velocity };
            session.player.vel.y = -jump;
            session.emit(GameEvent::Jumped { in_water });
        }
    }

    let t = &session.tuning.player;
    let axis = f64::from(i8::from(input.right) - i8::from(input.left));
    let speed = if in_water { t.water_move_speed } else { t.move_speed };
    session.player.vel.x = axis * speed;

    let gravity = Gravity {
        accel: session.tuning.physics.gravity,
        water_accel: session.tuning.physics.water_gravity,
        water_max_rise: t.water_max_rise,
        water_max_sink: t.water_max_sink,
    };
    collision::apply_gravity(&session.grid, &mut session.player, &gravity, dt_s);
    collision::move_and_collide(&session.grid, &mut session.player, dt_s);
    collision::clamp_to_world(&session.grid, &mut session.player);

    if in_lava {
        session.player.vel.y -= session.tuning.physics.lava_lift * dt_s;
    }
}

fn update_mining(session: &mut GameSession, pointer: Option<(i32, i32)>, dt_ms: f64) {
    if !session.mining.active {
        return;
    }
    let Some(pointer) = pointer else {
        session.mining.cancel();
        return;
    };

    let player: DVec2 = session.player.pos;
    let outcome = session.mining.tick(
        dt_ms,
        pointer,
        &mut session.grid,
        &mut session.inventory,
        player,
        session.tuning.mining.reach_tiles,
        session.tuning.mining.pulse_ms,
    );
    match outcome {
        MiningOutcome::Digging { pulses } if pulses > 0 => {
            let (tx, ty) = (session.mining.tx, session.mining.ty);
            for _ in 0..pulses {
                session.emit(GameEvent::MineTick { tx, ty });
            }
        }
        MiningOutcome::Broken { tile, tx, ty } => {
            session.emit(GameEvent::TileBroken { tile, tx, ty });
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::TileGrid;
    use crate::tile_center;
    use crate::tuning::Tuning;

    /// 64x32 world with a stone floor from row 20, player standing at
    /// column 32 and no monsters
    fn flat_session() -> GameSession {
        let mut grid = TileGrid::new(64, 32);
        for y in 20..32 {
            for x in 0..64 {
                grid.set(x, y, TileType::Stone);
            }
        }
        let spawn = DVec2::new(tile_center(32), 20.0 * 16.0 - 7.01);
        let mut s = GameSession::with_world("flat", grid, spawn, Tuning::default());
        s.monsters.clear();
        s.player.on_ground = true;
        s
    }

    fn run(s: &mut GameSession, input: &TickInput, ticks: usize) {
        for _ in 0..ticks {
            tick(s, input, 20.0);
        }
    }

    #[test]
    fn test_standing_player_stays_put() {
        let mut s = flat_session();
        let start = s.player.pos;
        run(&mut s, &TickInput::default(), 30);
        assert!((s.player.pos - start).length() < 0.5);
        assert!(s.player.on_ground);
    }

    #[test]
    fn test_walk_right() {
        let mut s = flat_session();
        let x0 = s.player.pos.x;
        let input = TickInput {
            right: true,
            ..Default::default()
        };
        run(&mut s, &input, 10);
        // 110 px/s for 200ms
        assert!((s.player.pos.x - x0 - 22.0).abs() < 1e-6);
    }

    #[test]
    fn test_jump_is_edge_triggered() {
        let mut s = flat_session();
        let held = TickInput {
            jump: true,
            ..Default::default()
        };
        tick(&mut s, &held, 20.0);
        assert!(s.player.vel.y < 0.0);
        assert_eq!(s.drain_events(), vec![GameEvent::Jumped { in_water: false }]);

        // Holding the key through landing doesn't jump again
        run(&mut s, &held, 60);
        assert!(s.drain_events().is_empty());
        assert!(s.player.on_ground);

        tick(&mut s, &TickInput::default(), 20.0);
        tick(&mut s, &held, 20.0);
        assert_eq!(s.drain_events(), vec![GameEvent::Jumped { in_water: false }]);
    }

    #[test]
    fn test_lava_lifts_player() {
        let mut s = flat_session();
        s.grid.set(32, 20, TileType::Lava);
        assert_eq!(s.feet_tile(), TileType::Lava);
        tick(&mut s, &TickInput::default(), 20.0);
        // 760 px/s² gravity less the 120 px/s² lift, over 20ms
        assert!((s.player.vel.y - (15.2 - 2.4)).abs() < 1e-9);
        assert_eq!(s.health.hp, 5);
    }

    #[test]
    fn test_water_slows_walking_and_jumping() {
        let mut s = flat_session();
        s.grid.set(32, 20, TileType::Water);
        assert_eq!(s.feet_tile(), TileType::Water);
        let x0 = s.player.pos.x;
        let input = TickInput {
            right: true,
            jump: true,
            ..Default::default()
        };
        tick(&mut s, &input, 20.0);
        // 70 px/s for 20ms
        assert!((s.player.pos.x - x0 - 1.4).abs() < 1e-9);
        // -165 jump plus 320 px/s² water gravity for 20ms
        assert!((s.player.vel.y - (-165.0 + 6.4)).abs() < 1e-9);
        assert_eq!(s.drain_events(), vec![GameEvent::Jumped { in_water: true }]);
    }

    #[test]
    fn test_mine_stone_through_ticks() {
        let mut s = flat_session();
        let (tx, ty) = (33, 20);
        let hold = TickInput {
            pointer: Some((tx, ty)),
            pointer_down: true,
            ..Default::default()
        };
        // 620ms of digging: the press tick starts the session and digs too
        run(&mut s, &hold, 31);
        assert_eq!(s.grid.get(tx, ty), TileType::Air);
        assert_eq!(s.inventory.count(TileType::Stone), 1);
        let events = s.drain_events();
        assert!(events.contains(&GameEvent::TileBroken {
            tile: TileType::Stone,
            tx,
            ty
        }));
        assert_eq!(
            events.iter().filter(|e| matches!(e, GameEvent::MineTick { .. })).count(),
            4
        );

        // Keeps holding over the hole: nothing more to collect
        run(&mut s, &hold, 40);
        assert_eq!(s.inventory.count(TileType::Stone), 1);
    }

    #[test]
    fn test_release_cancels_mining() {
        let mut s = flat_session();
        let hold = TickInput {
            pointer: Some((33, 20)),
            pointer_down: true,
            ..Default::default()
        };
        run(&mut s, &hold, 10);
        assert!(s.mining.active);
        let release = TickInput {
            pointer: Some((33, 20)),
            ..Default::default()
        };
        tick(&mut s, &release, 20.0);
        assert!(!s.mining.active);
        assert_eq!(s.grid.get(33, 20), TileType::Stone);
    }

    #[test]
    fn test_release_with_place_request_cancels_mining() {
        let mut s = flat_session();
        let hold = TickInput {
            pointer: Some((33, 20)),
            pointer_down: true,
            ..Default::default()
        };
        run(&mut s, &hold, 10);
        assert!(s.mining.active);
        // Same tile: only the release can stop the dig here
        let release_and_place = TickInput {
            pointer: Some((33, 20)),
            place: true,
            ..Default::default()
        };
        tick(&mut s, &release_and_place, 20.0);
        assert!(!s.mining.active);
        assert_eq!(s.tool_mode, ToolMode::Place);
        assert_eq!(s.mining.elapsed_ms, 0.0);
        assert_eq!(s.grid.get(33, 20), TileType::Stone);
        assert_eq!(s.inventory.count(TileType::Dirt), 18);
    }

    #[test]
    fn test_drag_retargets_mining() {
        let mut s = flat_session();
        let mut input = TickInput {
            pointer: Some((33, 20)),
            pointer_down: true,
            ..Default::default()
        };
        run(&mut s, &input, 10);
        input.pointer = Some((31, 20));
        tick(&mut s, &input, 20.0);
        assert!(s.mining.targets(31, 20));
        assert_eq!(s.mining.elapsed_ms, 20.0);
    }

    #[test]
    fn test_place_over_player_rejected() {
        let mut s = flat_session();
        let (tx, ty) = (world_to_tile(s.player.pos.x), world_to_tile(s.player.pos.y));
        let before = s.inventory.count(TileType::Dirt);
        let input = TickInput {
            pointer: Some((tx, ty)),
            place: true,
            ..Default::default()
        };
        tick(&mut s, &input, 20.0);
        assert_eq!(s.tool_mode, ToolMode::Place);
        assert_eq!(s.grid.get(tx, ty), TileType::Air);
        assert_eq!(s.inventory.count(TileType::Dirt), before);
    }

    #[test]
    fn test_place_mode_press_places_selected() {
        let mut s = flat_session();
        let input = TickInput {
            pointer: Some((34, 19)),
            pointer_down: true,
            tool_mode: Some(ToolMode::Place),
            selected_slot: Some(4),
            ..Default::default()
        };
        tick(&mut s, &input, 20.0);
        assert_eq!(s.grid.get(34, 19), TileType::Brick);
        assert_eq!(s.inventory.count(TileType::Brick), 9);
        // Holding doesn't place again
        tick(&mut s, &input, 20.0);
        assert_eq!(s.inventory.count(TileType::Brick), 9);
    }

    #[test]
    fn test_monster_contact_hurts_once_while_invulnerable() {
        let mut s = flat_session();
        let mut m = monster::Monster::new(
            99,
            monster::MonsterKind::Slime,
            s.player.pos + DVec2::new(4.0, 1.0),
            -1,
            500.0,
        );
        m.body.on_ground = true;
        s.monsters.push(m);
        for _ in 0..10 {
            tick(&mut s, &TickInput::default(), 20.0);
            s.monsters[0].body.pos = s.player.pos + DVec2::new(4.0, 1.0);
        }
        assert_eq!(s.health.hp, 4);
    }

    #[test]
    fn test_same_inputs_same_outcome() {
        let mut a = GameSession::new_world("det", Tuning::default());
        let mut b = GameSession::new_world("det", Tuning::default());
        let inputs = [
            TickInput {
                right: true,
                ..Default::default()
            },
            TickInput {
                jump: true,
                right: true,
                ..Default::default()
            },
            TickInput::default(),
        ];
        for i in 0..300 {
            let input = &inputs[i % inputs.len()];
            tick(&mut a, input, 16.0);
            tick(&mut b, input, 16.0);
        }
        assert_eq!(a.player, b.player);
        assert_eq!(a.monsters, b.monsters);
        assert_eq!(a.grid, b.grid);
        assert_eq!(a.health, b.health);
    }
}
