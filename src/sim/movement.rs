//! Movement controller
//!
//! Per-mode integration. Vehicles are advanced first; a player with an
//! attachment then takes its position from the vehicle in
//! [`resolve_attachment`]. Each step may report one `ModeEvent` for the
//! state machine.

use glam::Vec2;

use super::Scenario;
use super::collision;
use super::effects;
use super::mode::{EncounterPhase, Mode, ModeEvent};
use super::state::{GameState, Player};
use super::tick::TickInput;
use super::world::ZoneStyle;
use crate::consts::*;
use crate::tuning::RunTuning;
use crate::{ease_toward, snap_to_zero};

/// Free-run speed cap at `x`
pub fn max_speed_at(scenario: &Scenario, x: f32) -> f32 {
    if x >= scenario.story.heavy_from_x {
        scenario.tuning.run.heavy_max_speed
    } else {
        scenario.tuning.run.max_speed
    }
}

/// Immediate scroll impulse for the free-run modes
pub fn scroll_impulse(player: &mut Player, delta: f32, accel: f32, max_speed: f32) {
    if delta == 0.0 {
        return;
    }
    player.vel.x = (player.vel.x + delta.signum() * accel).clamp(-max_speed, max_speed);
    if delta.abs() > 2.0 {
        player.facing = delta.signum();
    }
}

/// Advance the active mode by one tick
pub fn step(state: &mut GameState, scenario: &Scenario, input: &TickInput, dt: f32) -> Option<ModeEvent> {
    let mut mode = state.mode;
    let event = match &mut mode {
        Mode::FreeRun => {
            match scenario.world.style_at(state.player.pos.x) {
                ZoneStyle::Void => void_step(state, scenario, input),
                _ => run_step(state, scenario, input),
            }
            None
        }
        Mode::VerticalCorridor { corridor_x } => {
            corridor_step(state, scenario, input, *corridor_x);
            None
        }
        Mode::VehicleRising { ride } | Mode::VehicleCruise { ride } => {
            let balloon = &scenario.tuning.balloon;
            if ride.scroll.abs() > 0.1 {
                // Positive scroll lifts the balloon
                ride.velocity -= ride.scroll * balloon.sensitivity;
                ride.scroll = 0.0;
            }
            ride.offset += ride.velocity;
            ride.velocity *= balloon.drag;
            if ride.offset < balloon.ceiling {
                ride.offset = balloon.ceiling;
                ride.velocity = 0.0;
            }
            if ride.offset > balloon.floor {
                ride.offset = balloon.floor;
                ride.velocity = 0.0;
            }
            if let Some(v) = state.vehicles.get_mut(ride.vehicle) {
                v.pos.y = v.home.y + ride.offset;
            }

            if ride.offset <= balloon.encounter_altitude {
                Some(ModeEvent::AscentComplete)
            } else if matches!(state.mode, Mode::VehicleRising { .. })
                && ride.offset <= balloon.cruise_altitude
            {
                Some(ModeEvent::CruiseAltitude)
            } else {
                None
            }
        }
        Mode::ScriptedEncounter { phase, timer, .. } => {
            let cinematic = &scenario.tuning.cinematic;
            *timer += 1;
            let limit = match phase {
                EncounterPhase::Swoop => cinematic.swoop_ticks,
                EncounterPhase::Hazard => cinematic.hazard_ticks,
                EncounterPhase::Collapse => 0,
            };
            (*timer > limit).then_some(ModeEvent::PhaseElapsed)
        }
        Mode::BallisticFall { timer, .. } => {
            *timer += dt;
            fall_step(state, scenario, *timer)
        }
        Mode::ScriptedTrack { vehicle } => track_step(state, scenario, *vehicle),
        Mode::PortalTransit { vehicle, timer } => {
            *timer += 1;
            portal_step(state, scenario, *vehicle, *timer)
        }
        Mode::CarDrive {
            vehicle,
            scroll,
            boarded_x,
        } => car_step(state, scenario, *vehicle, scroll, *boarded_x),
    };
    state.mode = mode;
    resolve_attachment(state);
    event
}

/// Derive an attached player's position from its vehicle
pub fn resolve_attachment(state: &mut GameState) {
    let Some(attachment) = state.player.attachment else {
        return;
    };
    if let Some(vehicle) = state.vehicles.get(attachment.vehicle) {
        state.player.pos = vehicle.pos + attachment.offset;
        state.player.vel = Vec2::ZERO;
    }
}

fn apply_keys(player: &mut Player, input: &TickInput, run: &RunTuning) {
    let accel = run.scroll_accel * run.key_accel_factor;
    if input.left {
        player.vel.x -= accel;
        player.facing = -1.0;
    }
    if input.right {
        player.vel.x += accel;
        player.facing = 1.0;
    }
}

fn run_step(state: &mut GameState, scenario: &Scenario, input: &TickInput) {
    let run = &scenario.tuning.run;
    let world = &scenario.world;
    let max_speed = max_speed_at(scenario, state.player.pos.x);
    let min_x = state.min_x;
    let p = &mut state.player;

    apply_keys(p, input, run);
    p.vel.x = snap_to_zero(p.vel.x * run.friction, run.velocity_snap).clamp(-max_speed, max_speed);
    p.vel.y += run.gravity;

    let mut nx = p.pos.x + p.vel.x;
    let right_edge = world.x_end - run.right_edge_margin;
    if nx > right_edge {
        nx = right_edge;
        p.vel.x = 0.0;
    }
    collision::auto_step(p, &world.platforms, nx, run.auto_step_height);
    p.pos.x = nx.min(WORLD_W - PLAYER_W).max(min_x);

    p.pos.y += p.vel.y;
    collision::land(p, &world.platforms, run);

    animate(p, run);
    let base = if p.pos.x >= scenario.story.giant_from_x {
        run.giant_scale
    } else {
        run.base_scale
    };
    let target = base + p.growth as f32 * run.growth_per_skill;
    p.scale = ease_toward(p.scale, target, run.scale_ease);
    relax_stretch(p, run);
}

fn corridor_step(state: &mut GameState, scenario: &Scenario, input: &TickInput, corridor_x: f32) {
    let run = &scenario.tuning.run;
    let p = &mut state.player;

    apply_keys(p, input, run);
    p.vel.x = snap_to_zero(p.vel.x * run.friction, run.velocity_snap);
    if p.vel.x != 0.0 {
        p.pos.y -= p.vel.x * run.corridor_lift;
        p.vel.x = 0.0;
    }
    p.vel.y = 0.0;
    p.pos.x = corridor_x - PLAYER_W * p.scale / 2.0;
    p.pos.y = p.pos.y.clamp(run.corridor_min_y, GROUND_Y);
    p.grounded = false;
    relax_stretch(p, run);
}

fn void_step(state: &mut GameState, scenario: &Scenario, input: &TickInput) {
    let run = &scenario.tuning.run;
    let void_float = &scenario.tuning.void_float;
    let max_speed = max_speed_at(scenario, state.player.pos.x);
    let time = state.time;
    let min_x = state.min_x;
    let p = &mut state.player;

    apply_keys(p, input, run);
    p.vel.x = (p.vel.x * void_float.friction).clamp(-max_speed, max_speed);
    p.vel.y = 0.0;
    p.pos.x = (p.pos.x + p.vel.x)
        .min(WORLD_W - void_float.right_margin)
        .max(min_x);
    p.pos.y = void_float.float_y + (time * void_float.bob_frequency).sin() * void_float.bob_amplitude;
    p.grounded = false;
}

fn fall_step(state: &mut GameState, scenario: &Scenario, timer: f32) -> Option<ModeEvent> {
    let cinematic = &scenario.tuning.cinematic;
    let story = &scenario.story;
    let p = &mut state.player;

    if timer < cinematic.fall_hold_secs {
        // Pinned to the screen centre by the renderer
        p.pos.x = story.landing_x;
        p.vel = Vec2::ZERO;
        return None;
    }
    if timer < cinematic.fall_drop_secs {
        p.pos.y = cinematic.fall_start_y;
        p.vel = Vec2::ZERO;
        return None;
    }

    p.vel.y += scenario.tuning.run.gravity * cinematic.fall_gravity_factor;
    p.pos.y += p.vel.y;
    if p.pos.y < story.landing_y {
        return None;
    }
    p.pos.y = story.landing_y;
    p.vel = Vec2::ZERO;
    p.grounded = true;
    let impact = Vec2::new(
        p.pos.x + PLAYER_W * p.scale / 2.0,
        p.pos.y + PLAYER_H * p.scale,
    );
    effects::burst(state, impact, 0x888888, cinematic.particle_burst);
    Some(ModeEvent::Landed)
}

fn car_step(
    state: &mut GameState,
    scenario: &Scenario,
    vehicle: usize,
    scroll: &mut f32,
    boarded_x: f32,
) -> Option<ModeEvent> {
    let tuning = &scenario.tuning.vehicle;
    let min_x = state.min_x;
    let car = state.vehicles.get_mut(vehicle)?;

    if scroll.abs() > 0.1 {
        car.vel.x += scroll.signum() * scenario.tuning.run.scroll_accel * tuning.car_accel_factor;
        *scroll *= tuning.car_scroll_decay;
        if scroll.abs() < 1.0 {
            *scroll = 0.0;
        }
    }
    car.vel.x = (car.vel.x * tuning.car_friction).clamp(-tuning.car_max_speed, tuning.car_max_speed);
    car.pos.x = (car.pos.x + car.vel.x).max(min_x);
    car.pos.y = car.home.y;

    let (x, vx) = (car.pos.x, car.vel.x);
    if vx != 0.0 {
        state.player.facing = vx.signum();
    }
    if x > scenario.story.track.start_x {
        Some(ModeEvent::TrackReached)
    } else if x < boarded_x - tuning.dismount_distance {
        Some(ModeEvent::Dismounted)
    } else {
        None
    }
}

fn track_step(state: &mut GameState, scenario: &Scenario, vehicle: usize) -> Option<ModeEvent> {
    let tuning = &scenario.tuning.vehicle;
    let track = &scenario.story.track;
    let car = state.vehicles.get_mut(vehicle)?;

    car.vel.x = car.vel.x.max(tuning.track_min_speed) + tuning.track_accel;
    if car.pos.x > track.brake_x {
        car.vel.x *= tuning.track_brake;
    }
    car.pos.x = (car.pos.x + car.vel.x).max(track.start_x);
    car.pos.y = track.track_y(car.pos.x);

    // Downhill (positive slope) speeds the ride up
    let slope = track.slope(car.pos.x);
    car.rotation = slope;
    car.vel.x -= slope.sin() * tuning.track_slope_gain;
    car.vel.x = car.vel.x.clamp(-tuning.track_max_speed, tuning.track_max_speed);

    (car.pos.x >= track.end_x).then_some(ModeEvent::TrackEnd)
}

fn portal_step(
    state: &mut GameState,
    scenario: &Scenario,
    vehicle: usize,
    timer: u32,
) -> Option<ModeEvent> {
    let tuning = &scenario.tuning.vehicle;
    let track = &scenario.story.track;
    let portal = Vec2::new(track.end_x, track.track_y(track.end_x) - tuning.portal_rise);

    if let Some(car) = state.vehicles.get_mut(vehicle) {
        car.pos += (portal - car.pos) * tuning.portal_pull;
        car.rotation += tuning.portal_spin;
    }
    let shrink = (1.0 - timer as f32 / tuning.portal_shrink_ticks).max(0.0);
    state.player.scale = scenario.tuning.run.base_scale * shrink;
    if let Some(attachment) = state.player.attachment.as_mut() {
        attachment.offset = Vec2::new(0.0, -tuning.track_seat_height * shrink);
    }

    (timer > tuning.portal_ticks).then_some(ModeEvent::PortalElapsed)
}

fn animate(p: &mut Player, run: &RunTuning) {
    if p.vel.x.abs() > run.anim_speed_threshold {
        p.frame_timer = p.frame_timer.saturating_add(1);
        if p.frame_timer > run.anim_ticks_per_frame {
            p.frame = (p.frame + 1) % 4;
            p.frame_timer = 0;
        }
    } else {
        p.frame = 0;
    }
}

fn relax_stretch(p: &mut Player, run: &RunTuning) {
    p.stretch = p.stretch + (Vec2::ONE - p.stretch) * run.stretch_relax;
}
