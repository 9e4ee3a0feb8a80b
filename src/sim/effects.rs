//! Cosmetic effects: particles, floating labels and the void knowledge stream
//!
//! All randomness comes from the run's seeded RNG so replays match.

use glam::Vec2;
use rand::Rng;

use super::Scenario;
use super::state::{FloatingLabel, GameState, KnowledgeBit, MAX_PARTICLES, Particle};
use crate::consts::*;

/// Spawn `count` particles at `pos`, dropping any past the cap
pub fn burst(state: &mut GameState, pos: Vec2, color: u32, count: u32) {
    for _ in 0..count {
        if state.particles.len() >= MAX_PARTICLES {
            break;
        }
        let rng = &mut state.rng;
        let vel = Vec2::new(
            (rng.random::<f32>() - 0.5) * 8.0,
            (rng.random::<f32>() - 1.0) * 6.0,
        );
        let life = 30.0 + rng.random::<f32>() * 20.0;
        let size = 4.0 + rng.random::<f32>() * 6.0;
        state.particles.push(Particle {
            pos,
            vel,
            life,
            size,
            color,
        });
    }
}

/// Float a label above `pos`
pub fn label(state: &mut GameState, pos: Vec2, text: impl Into<String>, color: u32) {
    state.labels.push(FloatingLabel {
        pos,
        text: text.into(),
        color,
        life: 1.0,
    });
}

/// Advance every effect by one tick
pub fn update(state: &mut GameState, scenario: &Scenario) {
    for p in state.particles.iter_mut() {
        p.pos += p.vel;
        p.vel.y += 0.1;
        p.life -= 1.0;
    }
    state.particles.retain(|p| p.life > 0.0);

    for l in state.labels.iter_mut() {
        l.pos.y -= 0.8;
        l.life -= 0.02;
    }
    state.labels.retain(|l| l.life > 0.0);

    update_knowledge(state, scenario);
}

fn update_knowledge(state: &mut GameState, scenario: &Scenario) {
    let tuning = &scenario.tuning.narrative;
    let p = &state.player;
    let Some(band) = scenario.story.knowledge_band(p.pos.x) else {
        state.knowledge.clear();
        return;
    };
    let origin = Vec2::new(p.pos.x, p.pos.y + PLAYER_H * p.scale * 0.3);
    let target = Vec2::new(p.pos.x + PLAYER_W * p.scale * 0.5, origin.y);

    let rng = &mut state.rng;
    if !band.words.is_empty() && rng.random::<f32>() < tuning.knowledge_spawn_chance {
        let word = band.words[rng.random_range(0..band.words.len())].clone();
        let angle = rng.random::<f32>() * std::f32::consts::TAU;
        let distance = VIEW_W * 0.6 + rng.random::<f32>() * 200.0;
        state.knowledge.push(KnowledgeBit {
            pos: origin + Vec2::from_angle(angle) * distance,
            word,
            color: band.color,
            life: 1.5,
        });
    }

    state.knowledge.retain_mut(|bit| {
        let to_player = target - bit.pos;
        let distance = to_player.length();
        if distance < tuning.knowledge_absorb_radius {
            return false;
        }
        bit.pos += to_player / distance.max(MIN_DISTANCE) * tuning.knowledge_speed;
        bit.life -= tuning.knowledge_decay;
        bit.life > 0.0
    });
}
