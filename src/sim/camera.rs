//! Camera controller
//!
//! Eases toward a per-mode target each tick. Shake is published on top of
//! the eased position and never feeds back into it.

use glam::Vec2;

use super::Scenario;
use super::mode::{EncounterPhase, Mode, ModeKind};
use super::state::GameState;
use crate::consts::*;
use crate::ease_toward;

/// World x the camera centres on
fn anchor_x(state: &GameState) -> f32 {
    state
        .player
        .attachment
        .and_then(|a| state.vehicle(a.vehicle))
        .map(|v| v.pos.x)
        .unwrap_or(state.player.pos.x)
}

/// Where the camera wants to be this tick, and how fast it gets there
pub fn target(state: &GameState, scenario: &Scenario) -> (Vec2, f32) {
    let tuning = &scenario.tuning.camera;
    let kind = state.mode.kind();
    let player = &state.player;
    let x = anchor_x(state) - VIEW_W / 2.0;

    if kind.is_cinematic() {
        if kind == ModeKind::BallisticFall {
            let y = scenario.story.landing_y - VIEW_H * tuning.fall_frame;
            return (Vec2::new(x, y), tuning.fall_lerp);
        }
        let offset = match kind {
            ModeKind::PortalTransit => tuning.cinematic_low_offset,
            _ => tuning.cinematic_offset,
        };
        let lift = if kind.is_balloon() || kind == ModeKind::ScriptedEncounter {
            tuning.balloon_lift
        } else {
            0.0
        };
        let y = player.pos.y - VIEW_H * offset + lift;
        return (Vec2::new(x, y), tuning.cinematic_lerp);
    }

    let mut x = x.clamp(0.0, WORLD_W - VIEW_W);
    let hold = scenario.story.camera_hold;
    if player.pos.x < hold.until_x {
        x = x.min(hold.max_center_x - VIEW_W / 2.0);
    }

    let climbing = kind == ModeKind::VerticalCorridor
        || scenario.world.style_at(player.pos.x).is_climbing();
    let y = if player.pos.x >= scenario.story.giant_from_x || !climbing {
        0.0
    } else {
        (player.pos.y - VIEW_H * tuning.climb_offset).clamp(tuning.min_y, tuning.max_y)
    };
    (Vec2::new(x, y), tuning.lerp)
}

/// Ease toward the target and refresh the shake offset
pub fn update(state: &mut GameState, scenario: &Scenario) {
    let (target, lerp) = target(state, scenario);
    let camera = &mut state.camera;
    camera.target = target;
    camera.pos.x = ease_toward(camera.pos.x, target.x, lerp);
    camera.pos.y = ease_toward(camera.pos.y, target.y, lerp);

    camera.shake = match state.mode {
        Mode::ScriptedEncounter {
            phase: EncounterPhase::Hazard,
            ..
        } => {
            let cinematic = &scenario.tuning.cinematic;
            let t = state.time * cinematic.shake_frequency;
            Vec2::new(t.sin(), t.cos()) * cinematic.shake_amplitude
        }
        _ => Vec2::ZERO,
    };
}
