//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically. Components
//! run in a fixed order: zones, movement, collision, narrative, camera,
//! effects.

use super::Scenario;
use super::camera;
use super::collision;
use super::effects;
use super::mode::{self, Mode, ModeEvent};
use super::movement;
use super::narrative;
use super::state::{GameState, RunPhase};
use super::world::ZoneStyle;

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Left arrow / A held
    pub left: bool,
    /// Right arrow / D held
    pub right: bool,
}

/// Advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, scenario: &Scenario, input: &TickInput, dt: f32) {
    if state.run != RunPhase::Playing {
        return;
    }
    state.transition = None;
    state.ticks += 1;
    state.time += dt;

    if let Some(event) = zone_event(state, scenario) {
        mode::apply(state, scenario, event);
    }
    raise_ratchet(state, scenario);

    if let Some(event) = movement::step(state, scenario, input, dt) {
        mode::apply(state, scenario, event);
    }
    if let Some(event) = collision::resolve(state, scenario) {
        if mode::apply(state, scenario, event) {
            movement::resolve_attachment(state);
        }
    }

    narrative::update(state, scenario);
    camera::update(state, scenario);
    effects::update(state, scenario);
    raise_ratchet(state, scenario);

    state.proximity_cooldown = state.proximity_cooldown.saturating_sub(1);
}

/// Route a wheel/touch delta according to the active mode.
///
/// Free-run modes take the impulse immediately; rides buffer it for the
/// next tick. Scripted modes ignore it.
pub fn route_scroll(state: &mut GameState, scenario: &Scenario, delta: f32) {
    if state.run != RunPhase::Playing {
        return;
    }
    let kind = state.mode.kind();
    match &mut state.mode {
        Mode::FreeRun | Mode::VerticalCorridor { .. } => {
            let max_speed = movement::max_speed_at(scenario, state.player.pos.x);
            movement::scroll_impulse(
                &mut state.player,
                delta,
                scenario.tuning.run.scroll_accel,
                max_speed,
            );
        }
        Mode::VehicleRising { ride } | Mode::VehicleCruise { ride } => ride.scroll += delta,
        Mode::CarDrive { scroll, .. } => *scroll += delta,
        _ => log::trace!("Scroll {} ignored in {:?}", delta, kind),
    }
}

fn zone_event(state: &GameState, scenario: &Scenario) -> Option<ModeEvent> {
    let style = scenario.world.style_at(state.player.pos.x);
    match (state.mode, style) {
        (Mode::FreeRun, ZoneStyle::VerticalCorridor { corridor_x }) => {
            Some(ModeEvent::CorridorEntered { corridor_x })
        }
        (Mode::VerticalCorridor { .. }, ZoneStyle::VerticalCorridor { .. }) => None,
        (Mode::VerticalCorridor { .. }, _) => Some(ModeEvent::CorridorLeft),
        _ => None,
    }
}

fn raise_ratchet(state: &mut GameState, scenario: &Scenario) {
    if let Some(ratchet) = scenario.world.ratchet_for(state.player.pos.x) {
        state.raise_min_x(ratchet);
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use proptest::prelude::*;

    use super::*;
    use crate::consts::*;
    use crate::sim::mode::{Ascent, EncounterPhase, ModeKind};
    use crate::sim::state::{Attachment, GameEvent, VehicleKind};
    use crate::sim::world::{World, Zone};

    fn playing(scenario: &Scenario) -> GameState {
        let mut state = GameState::new(scenario, 2024);
        state.run = RunPhase::Playing;
        state
    }

    #[test]
    fn test_tick_waits_for_start() {
        let scenario = Scenario::nepal();
        let mut state = GameState::new(&scenario, 1);
        tick(&mut state, &scenario, &TickInput::default(), SIM_DT);
        assert_eq!(state.ticks, 0);
        route_scroll(&mut state, &scenario, 100.0);
        assert_eq!(state.player.vel.x, 0.0);
    }

    #[test]
    fn test_scroll_at_start_of_run() {
        let scenario = Scenario::nepal();
        let mut state = playing(&scenario);
        assert_eq!(state.player.pos.x, 200.0);
        route_scroll(&mut state, &scenario, 10.0);
        assert_eq!(state.player.vel.x, 2.0);
        for _ in 0..20 {
            route_scroll(&mut state, &scenario, 10.0);
        }
        assert_eq!(state.player.vel.x, 14.0);
    }

    #[test]
    fn test_balloon_boarding_through_tick() {
        let scenario = Scenario::nepal();
        let mut state = playing(&scenario);
        state.time = 2.0;
        state.player.pos.x = 8200.0;
        state.player.pos.y = 790.0;
        state.min_x = 4400.0;
        tick(&mut state, &scenario, &TickInput::default(), SIM_DT);
        let Mode::VehicleRising { ride } = state.mode else {
            panic!("expected rising, got {:?}", state.mode);
        };
        assert_eq!(ride.offset, 0.0);
        assert_eq!(ride.velocity, 0.0);
        assert!(state.vehicles[0].active);
        // Attached player sits in the basket
        let offset = state.player.attachment.map(|a| a.offset).unwrap_or_default();
        assert_eq!(state.player.pos, state.vehicles[0].pos + offset);
    }

    #[test]
    fn test_ascent_top_starts_encounter() {
        let scenario = Scenario::nepal();
        let mut state = playing(&scenario);
        let mut ride = Ascent::new(0);
        ride.offset = -5090.0;
        ride.velocity = -20.0;
        state.mode = Mode::VehicleCruise { ride };
        tick(&mut state, &scenario, &TickInput::default(), SIM_DT);
        assert_eq!(
            state.mode,
            Mode::ScriptedEncounter {
                vehicle: 0,
                phase: EncounterPhase::Swoop,
                timer: 0,
            }
        );
    }

    #[test]
    fn test_encounter_runs_to_fall() {
        let scenario = Scenario::nepal();
        let mut state = playing(&scenario);
        state.player.pos = Vec2::new(8200.0, -5000.0);
        state.mode = Mode::ScriptedEncounter {
            vehicle: 0,
            phase: EncounterPhase::Swoop,
            timer: 0,
        };
        for _ in 0..300 {
            tick(&mut state, &scenario, &TickInput::default(), SIM_DT);
            if state.mode.kind() == ModeKind::BallisticFall {
                break;
            }
        }
        assert_eq!(state.mode.kind(), ModeKind::BallisticFall);
        assert!(state.vehicles[0].burning);
        assert!(state.player.attachment.is_none());
        assert_eq!(
            state.dialogue.as_ref().map(|d| d.text.as_str()),
            Some("HUH????????")
        );
    }

    #[test]
    fn test_fall_landing_returns_to_free_run() {
        let scenario = Scenario::nepal();
        let mut state = playing(&scenario);
        state.mode = Mode::BallisticFall {
            timer: 5.0,
            balloon: 0,
        };
        state.vehicles[0].burning = true;
        state.player.pos = Vec2::new(10_400.0, 700.0);
        state.player.vel = Vec2::ZERO;
        let mut ticks = 0;
        while state.mode.kind() == ModeKind::BallisticFall && ticks < 100 {
            tick(&mut state, &scenario, &TickInput::default(), SIM_DT);
            ticks += 1;
        }
        assert_eq!(state.mode, Mode::FreeRun);
        assert_eq!(state.player.pos.y, 790.0);
        assert_eq!(state.player.vel, Vec2::ZERO);
        assert!(state.particles.len() >= 25);
        assert!(!state.vehicles[0].burning);
        assert!(state.boards.iter().any(|b| b.chapter == 3));
    }

    #[test]
    fn test_portal_round_trip() {
        let scenario = Scenario::nepal();
        let mut state = playing(&scenario);
        let car = state
            .vehicles
            .iter()
            .position(|v| v.kind == VehicleKind::Car)
            .expect("car");
        state.vehicles[car].active = true;
        state.vehicles[car].pos = Vec2::new(35_000.0, scenario.story.track.track_y(35_000.0));
        state.player.attach(Attachment {
            vehicle: car,
            offset: Vec2::new(0.0, -135.0),
        });
        state.mode = Mode::PortalTransit {
            vehicle: car,
            timer: 0,
        };
        let mut ticks = 0;
        while state.mode != Mode::FreeRun && ticks < 200 {
            tick(&mut state, &scenario, &TickInput::default(), SIM_DT);
            ticks += 1;
        }
        assert_eq!(ticks, 151);
        assert_eq!(state.player.pos, Vec2::new(52_500.0, 520.0));
        assert_eq!(state.player.scale, 3.2);
        assert_eq!(state.player.vel, Vec2::ZERO);
        assert!(state.player.attachment.is_none());
        assert!(!state.vehicles[car].visible);
        assert_eq!(state.min_x, 52_500.0);
    }

    #[test]
    fn test_corridor_zone_enter_and_leave() {
        let mut world = World::nepal();
        world.zones[0] = Zone {
            name: "Shaft".to_owned(),
            start: 0.0,
            end: 4000.0,
            style: ZoneStyle::VerticalCorridor { corridor_x: 300.0 },
            ratchet: None,
        };
        let scenario = Scenario::nepal();
        let scenario = Scenario { world, ..scenario };
        let mut state = playing(&scenario);
        tick(&mut state, &scenario, &TickInput::default(), SIM_DT);
        assert_eq!(state.mode, Mode::VerticalCorridor { corridor_x: 300.0 });

        route_scroll(&mut state, &scenario, 10.0);
        let y = state.player.pos.y;
        tick(&mut state, &scenario, &TickInput::default(), SIM_DT);
        assert!(state.player.pos.y < y);

        state.player.pos.x = 4500.0;
        tick(&mut state, &scenario, &TickInput::default(), SIM_DT);
        assert_eq!(state.mode, Mode::FreeRun);
    }

    #[test]
    fn test_world_end() {
        let scenario = Scenario::nepal();
        let mut state = playing(&scenario);
        state.player.pos = Vec2::new(61_995.0, 650.0);
        state.min_x = 52_500.0;
        state.player.vel.x = 9.0;
        for _ in 0..10 {
            tick(&mut state, &scenario, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.run, RunPhase::Ended);
        assert_eq!(
            state.events.iter().filter(|e| **e == GameEvent::RunEnded).count(),
            1
        );
    }

    #[test]
    fn test_determinism() {
        let scenario = Scenario::nepal();
        let run = || {
            let mut state = playing(&scenario);
            for i in 0..600 {
                if i % 5 == 0 {
                    route_scroll(&mut state, &scenario, 100.0);
                }
                let input = TickInput {
                    right: i % 7 == 0,
                    ..Default::default()
                };
                tick(&mut state, &scenario, &input, SIM_DT);
            }
            state
        };
        let a = run();
        let b = run();
        assert_eq!(a.player.pos, b.player.pos);
        assert_eq!(a.mode, b.mode);
        assert_eq!(a.collected, b.collected);
        assert_eq!(a.particles.len(), b.particles.len());
        assert_eq!(a.events, b.events);
    }

    proptest! {
        #[test]
        fn prop_ratchet_never_decreases(
            steps in prop::collection::vec((-300.0f32..300.0, any::<bool>(), any::<bool>()), 1..400),
            start in 0.0f32..30_000.0,
        ) {
            let scenario = Scenario::nepal();
            let mut state = playing(&scenario);
            state.time = 2.0;
            state.player.pos.x = start;
            let mut last = state.min_x;
            for (delta, left, right) in steps {
                route_scroll(&mut state, &scenario, delta);
                tick(&mut state, &scenario, &TickInput { left, right }, SIM_DT);
                prop_assert!(state.min_x >= last);
                last = state.min_x;
                if state.mode.kind().is_free() && state.run == RunPhase::Playing {
                    prop_assert!(state.player.pos.x >= state.min_x - 1e-3);
                }
            }
        }
    }
}
