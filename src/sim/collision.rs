//! Collision detection and interaction
//!
//! Platform contact for the free-run integrator, plus the per-tick resolver
//! for pickups, the balloon item magnet, vehicle proximity and the world
//! edge.

use glam::Vec2;

use super::Scenario;
use super::effects;
use super::mode::{ModeEvent, ModeKind};
use super::state::{GameEvent, GameState, Player, RunPhase, VehicleKind};
use super::world::{CollectibleKind, Platform};
use crate::consts::*;
use crate::tuning::RunTuning;

/// Item boxes are expanded by this much on every side
const PICKUP_TOLERANCE: f32 = 60.0;

/// Step onto a ledge the player is walking into.
///
/// `nx` is the x the player is about to move to; the approach test uses the
/// position before the move. Returns whether a step happened.
pub fn auto_step(p: &mut Player, platforms: &[Platform], nx: f32, step_height: f32) -> bool {
    let mut stepped = false;
    for pl in platforms {
        if !pl.overlaps_x(nx, PLAYER_W) {
            continue;
        }
        let foot = p.foot();
        let reachable = foot > pl.y && foot <= pl.y + step_height && p.pos.y > pl.y - PLAYER_H;
        let approaching = (p.vel.x > 0.0 && p.pos.x + PLAYER_W <= pl.x + 4.0)
            || (p.vel.x < 0.0 && p.pos.x >= pl.right() - 4.0);
        if reachable && approaching {
            p.pos.y = pl.y - PLAYER_H;
            p.vel.y = 0.0;
            p.grounded = true;
            stepped = true;
        }
    }
    stepped
}

/// Platform tops then the floor, after the vertical step
pub fn land(p: &mut Player, platforms: &[Platform], run: &RunTuning) {
    p.grounded = false;
    for pl in platforms {
        if !pl.overlaps_x(p.pos.x, PLAYER_W) {
            continue;
        }
        let foot = p.foot();
        if foot >= pl.y && foot <= pl.y + pl.h + run.landing_band && p.vel.y >= 0.0 {
            touch_down(p, pl.y, run);
        }
    }
    if p.foot() >= GROUND_Y {
        touch_down(p, GROUND_Y, run);
    }
}

fn touch_down(p: &mut Player, top: f32, run: &RunTuning) {
    if !p.grounded && p.vel.y > run.squash_impact_speed {
        p.stretch = Vec2::new(run.squash_x, run.squash_y);
    }
    p.pos.y = top - PLAYER_H;
    p.vel.y = 0.0;
    p.grounded = true;
}

/// Resolve this tick's interactions. Returns a vehicle boarding event, if any.
pub fn resolve(state: &mut GameState, scenario: &Scenario) -> Option<ModeEvent> {
    let kind = state.mode.kind();
    if kind.is_balloon() {
        magnetise(state, scenario);
    }
    collect(state, scenario);
    release_latches(state, scenario);

    let event = if kind == ModeKind::FreeRun {
        proximity(state, scenario)
    } else {
        None
    };

    if state.player.pos.x > scenario.story.end_x {
        state.run = RunPhase::Ended;
        state.events.push(GameEvent::RunEnded);
        log::info!(
            "Run ended at x={:.0} after {} ticks ({} items)",
            state.player.pos.x,
            state.ticks,
            state.collected.len()
        );
    }
    event
}

/// Pull nearby items toward the balloon basket
fn magnetise(state: &mut GameState, scenario: &Scenario) {
    let tuning = &scenario.tuning.balloon;
    let basket = state.player.center() + Vec2::new(0.0, tuning.basket_drop);
    for (item, pos) in scenario.world.collectibles.iter().zip(state.items.iter_mut()) {
        if state.collected.contains(&item.id) {
            continue;
        }
        let to_basket = basket - (*pos + Vec2::splat(ITEM_CENTER));
        if to_basket.length().max(MIN_DISTANCE) < tuning.magnet_radius {
            *pos += to_basket * tuning.magnet_pull;
        }
    }
}

fn collect(state: &mut GameState, scenario: &Scenario) {
    let p = &state.player;
    let size = p.size();
    let min = Vec2::new(p.pos.x, p.pos.y + PLAYER_H * (1.0 - p.scale)) - Vec2::splat(PICKUP_TOLERANCE);
    let max = min + size + Vec2::splat(PICKUP_TOLERANCE * 2.0);

    let hits: Vec<usize> = scenario
        .world
        .collectibles
        .iter()
        .zip(&state.items)
        .enumerate()
        .filter(|&(_, (item, pos))| {
            !state.collected.contains(&item.id)
                && max.x > pos.x
                && min.x < pos.x + ITEM_SIZE
                && max.y > pos.y
                && min.y < pos.y + ITEM_SIZE
        })
        .map(|(index, _)| index)
        .collect();

    let run = &scenario.tuning.run;
    for index in hits {
        let item = &scenario.world.collectibles[index];
        // Two overlapping items sharing an id count once
        if !state.collected.insert(item.id) {
            continue;
        }
        let pos = state.items[index] + Vec2::splat(ITEM_CENTER);
        state.player.coins += 1;
        if let Some(skill) = &item.skill {
            state.player.skills.push(skill.clone());
            if item.x < scenario.story.growth_before_x && state.player.growth < run.max_growth {
                state.player.growth += 1;
            }
        }
        log::debug!("Collected {} ({:?}) at x={:.0}", item.label, item.kind, item.x);

        effects::burst(state, pos, item.color(), 8);
        let color = match item.kind {
            CollectibleKind::Gem => item.color(),
            _ => 0xffffff,
        };
        effects::label(state, Vec2::new(pos.x, pos.y - ITEM_CENTER), item.pickup_text(), color);
        state.events.push(GameEvent::ItemCollected {
            id: item.id,
            kind: item.kind,
            skill: item.skill.clone(),
        });
        state.events.push(GameEvent::Popup {
            icon: item.icon().to_owned(),
            title: item.label.clone(),
            desc: item.desc.clone(),
        });
    }
}

/// Clear each idle vehicle's proximity latch once the player is far enough away
fn release_latches(state: &mut GameState, scenario: &Scenario) {
    let px = state.player.pos.x;
    let release = scenario.tuning.vehicle.release_distance;
    for v in state.vehicles.iter_mut().filter(|v| v.near && !v.active) {
        if (v.pos.x - px).abs() > release {
            log::debug!("Vehicle {} re-armed", v.id);
            v.near = false;
        }
    }
}

fn proximity(state: &GameState, scenario: &Scenario) -> Option<ModeEvent> {
    if state.time <= scenario.tuning.narrative.proximity_grace_secs {
        return None;
    }
    let balloon = &scenario.tuning.balloon;
    let vehicle = &scenario.tuning.vehicle;
    let p = state.player.pos;

    state
        .vehicles
        .iter()
        .filter(|v| v.visible && !v.active && !v.near)
        .find(|v| {
            let dx = (v.pos.x - p.x).abs();
            let dy = (v.pos.y - p.y).abs();
            match v.kind {
                VehicleKind::Balloon => {
                    let gate = (dx < 120.0 && dy < vehicle.trigger_height)
                        || (p.x - (v.pos.x + 50.0)).abs() < 120.0;
                    gate && dx < balloon.trigger_distance && state.proximity_cooldown == 0
                }
                VehicleKind::Car => dx < vehicle.car_trigger_distance && dy < vehicle.trigger_height,
            }
        })
        .map(|v| ModeEvent::VehicleReached {
            vehicle: v.id,
            kind: v.kind,
            x: v.pos.x,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::mode::{self, Mode};
    use crate::sim::{StoryTimeline, World};
    use crate::tuning::Tuning;

    fn playing() -> (Scenario, GameState) {
        let scenario = Scenario::nepal();
        let mut state = GameState::new(&scenario, 5);
        state.run = RunPhase::Playing;
        state.time = 2.0;
        (scenario, state)
    }

    #[test]
    fn test_land_on_floor_squashes() {
        let run = RunTuning::default();
        let mut p = Player::new(0.8);
        p.grounded = false;
        p.pos.y = 795.0;
        p.vel.y = 5.0;
        land(&mut p, &[], &run);
        assert_eq!(p.pos.y, 790.0);
        assert!(p.grounded);
        assert_eq!(p.stretch, Vec2::new(1.3, 0.7));
    }

    #[test]
    fn test_soft_landing_keeps_shape() {
        let run = RunTuning::default();
        let mut p = Player::new(0.8);
        p.pos.y = 790.9;
        p.vel.y = 0.9;
        land(&mut p, &[], &run);
        assert_eq!(p.stretch, Vec2::ONE);
    }

    #[test]
    fn test_squash_relaxes() {
        let (scenario, mut state) = playing();
        state.player.pos.x = 1500.0;
        state.player.pos.y = 700.0;
        state.player.vel.y = 10.0;
        state.player.grounded = false;
        let input = crate::sim::TickInput::default();
        let mut squashed = false;
        for _ in 0..20 {
            crate::sim::movement::step(&mut state, &scenario, &input, SIM_DT);
            squashed |= state.player.stretch != Vec2::ONE;
        }
        assert!(squashed);
        for _ in 0..120 {
            crate::sim::movement::step(&mut state, &scenario, &input, SIM_DT);
        }
        assert!((state.player.stretch - Vec2::ONE).length() < 1e-3);
    }

    #[test]
    fn test_platform_top_landing() {
        let run = RunTuning::default();
        let platforms = [Platform::new(500.0, 780.0, 300.0, 100.0)];
        let mut p = Player::new(0.8);
        p.pos = Vec2::new(550.0, 692.0);
        p.vel.y = 3.0;
        land(&mut p, &platforms, &run);
        assert_eq!(p.foot(), 780.0);
        assert!(p.grounded);
    }

    #[test]
    fn test_auto_step_needs_approach() {
        let platforms = [Platform::new(500.0, 780.0, 300.0, 100.0)];
        let mut p = Player::new(0.8);
        p.pos.x = 398.0;
        p.vel.x = 5.0;
        assert!(auto_step(&mut p, &platforms, 403.0, 240.0));
        assert_eq!(p.foot(), 780.0);

        // Too tall
        let mut p = Player::new(0.8);
        p.pos.x = 398.0;
        p.vel.x = 5.0;
        let wall = [Platform::new(500.0, 600.0, 300.0, 280.0)];
        assert!(!auto_step(&mut p, &wall, 403.0, 240.0));

        // Moving away
        let mut p = Player::new(0.8);
        p.pos.x = 398.0;
        p.vel.x = -5.0;
        assert!(!auto_step(&mut p, &platforms, 403.0, 240.0));
    }

    #[test]
    fn test_pickup_counts_once() {
        let (scenario, mut state) = playing();
        // Photoshop coin at (1120, 640)
        state.player.pos = Vec2::new(1100.0, 640.0);
        resolve(&mut state, &scenario);
        assert!(state.collected.contains(&1));
        assert_eq!(state.player.coins, 1);
        assert_eq!(state.player.skills, vec!["ps".to_owned()]);
        assert_eq!(state.player.growth, 1);
        assert_eq!(state.particles.len(), 8);
        assert_eq!(state.labels[0].text, "+Photoshop");
        assert!(state.events.iter().any(|e| matches!(
            e,
            GameEvent::Popup { icon, .. } if icon == "🎨"
        )));

        resolve(&mut state, &scenario);
        assert_eq!(state.player.coins, 1);
    }

    #[test]
    fn test_pickup_keyed_on_item_id() {
        let mut world = World::nepal();
        world.collectibles.swap(0, 1);
        let scenario = Scenario::new(world, StoryTimeline::nepal(), Tuning::default())
            .expect("ids are still unique");
        let mut state = GameState::new(&scenario, 5);
        state.run = RunPhase::Playing;
        state.time = 2.0;
        state.player.pos = Vec2::new(1100.0, 640.0);
        for _ in 0..5 {
            resolve(&mut state, &scenario);
        }
        assert_eq!(state.player.coins, 1);
        assert_eq!(state.collected.iter().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_growth_only_from_first_chapter() {
        let (scenario, mut state) = playing();
        // Photoshop coin deep in Makura
        state.player.pos = Vec2::new(4780.0, 780.0);
        resolve(&mut state, &scenario);
        assert!(state.collected.contains(&5));
        assert_eq!(state.player.growth, 0);
    }

    #[test]
    fn test_magnet_pulls_items_toward_basket() {
        let (scenario, mut state) = playing();
        state.mode = Mode::VehicleCruise {
            ride: crate::sim::Ascent::new(0),
        };
        let id = 15; // (8200, -1120)
        state.player.pos = Vec2::new(8200.0, -1000.0);
        let before = state.items[id];
        magnetise(&mut state, &scenario);
        let basket = state.player.center() + Vec2::new(0.0, 80.0);
        assert!(
            basket.distance(state.items[id] + Vec2::splat(ITEM_CENTER))
                < basket.distance(before + Vec2::splat(ITEM_CENTER))
        );
        // Far items stay put
        let first = &scenario.world.collectibles[0];
        assert_eq!(state.items[0], Vec2::new(first.x, first.y));
    }

    #[test]
    fn test_balloon_boards_within_trigger_distance() {
        let (scenario, mut state) = playing();
        state.player.pos.x = 8200.0;
        let event = resolve(&mut state, &scenario);
        assert_eq!(
            event,
            Some(ModeEvent::VehicleReached {
                vehicle: 0,
                kind: VehicleKind::Balloon,
                x: 8250.0,
            })
        );
        assert!(mode::apply(&mut state, &scenario, event.unwrap()));
        let Mode::VehicleRising { ride } = state.mode else {
            panic!("expected rising");
        };
        assert_eq!(ride.offset, 0.0);
        assert_eq!(ride.velocity, 0.0);
    }

    #[test]
    fn test_no_boarding_during_grace() {
        let (scenario, mut state) = playing();
        state.time = 0.5;
        state.player.pos.x = 8200.0;
        assert_eq!(resolve(&mut state, &scenario), None);
    }

    #[test]
    fn test_car_latch_blocks_reboarding() {
        let (scenario, mut state) = playing();
        state.player.pos.x = 14_100.0;
        let event = resolve(&mut state, &scenario).expect("car in reach");
        assert!(mode::apply(&mut state, &scenario, event));
        assert_eq!(state.mode.kind(), ModeKind::CarDrive);

        assert!(mode::apply(&mut state, &scenario, ModeEvent::Dismounted));
        assert_eq!(state.mode, Mode::FreeRun);
        assert!(state.vehicles[1].near);
        assert_eq!(resolve(&mut state, &scenario), None);

        // Walk away past the release distance and come back
        state.player.pos.x = 13_700.0;
        resolve(&mut state, &scenario);
        assert!(!state.vehicles[1].near);
        state.player.pos.x = 14_150.0;
        assert!(resolve(&mut state, &scenario).is_some());
    }

    #[test]
    fn test_world_edge_ends_run() {
        let (scenario, mut state) = playing();
        state.player.pos = Vec2::new(62_001.0, 650.0);
        resolve(&mut state, &scenario);
        assert_eq!(state.run, RunPhase::Ended);
        assert_eq!(state.events.last(), Some(&GameEvent::RunEnded));
    }
}
