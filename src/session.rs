//! Run session
//!
//! Owns one `GameState`, turns raw input into tick inputs and scroll
//! impulses, drives the fixed-step accumulator and publishes a `Snapshot`
//! per frame for the rendering collaborator.

use glam::Vec2;
use serde::Serialize;

use crate::consts::*;
use crate::sim::narrative;
use crate::sim::{
    Dialogue, FloatingLabel, GameEvent, GameState, KnowledgeBit, Mode, ModeKind, Particle, RunPhase,
    Scenario, SummaryBoard, TickInput, Vehicle, route_scroll, tick,
};

/// Keyboard keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Space,
    Enter,
    Other,
}

impl Key {
    /// Map a DOM `KeyboardEvent.code`
    pub fn from_code(code: &str) -> Self {
        match code {
            "ArrowLeft" | "KeyA" => Key::Left,
            "ArrowRight" | "KeyD" => Key::Right,
            "ArrowUp" | "KeyW" => Key::Up,
            "ArrowDown" | "KeyS" => Key::Down,
            "Space" => Key::Space,
            "Enter" | "NumpadEnter" => Key::Enter,
            _ => Key::Other,
        }
    }
}

/// Held direction keys
#[derive(Debug, Clone, Copy, Default)]
struct Held {
    left: bool,
    right: bool,
}

/// Player pose as the renderer needs it
#[derive(Debug, Clone, Serialize)]
pub struct PlayerPose {
    pub pos: Vec2,
    pub scale: f32,
    pub stretch: Vec2,
    pub frame: u8,
    pub facing: f32,
    pub visible: bool,
    /// Draw at this screen position instead of the world position
    pub screen_anchor: Option<Vec2>,
    pub coins: u32,
    pub skills: Vec<String>,
}

/// Everything the renderer and HUD need for one frame
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub run: RunPhase,
    pub mode: ModeKind,
    pub time: f32,
    pub player: PlayerPose,
    pub vehicles: Vec<Vehicle>,
    /// Camera offset including shake
    pub camera: Vec2,
    pub dialogue: Option<Dialogue>,
    pub boards: Vec<SummaryBoard>,
    pub particles: Vec<Particle>,
    pub labels: Vec<FloatingLabel>,
    pub knowledge: Vec<KnowledgeBit>,
    pub title: String,
    pub collected: Vec<u32>,
    /// Item positions (the balloon magnet moves them)
    pub items: Vec<Vec2>,
    pub events: Vec<GameEvent>,
}

/// One playable run against a fixed scenario
pub struct Session {
    scenario: Scenario,
    state: GameState,
    seed: u64,
    accumulator: f32,
    held: Held,
    last_touch_y: Option<f32>,
}

impl Session {
    pub fn new(scenario: Scenario, seed: u64) -> Self {
        let state = GameState::new(&scenario, seed);
        Self {
            scenario,
            state,
            seed,
            accumulator: 0.0,
            held: Held::default(),
            last_touch_y: None,
        }
    }

    pub fn scenario(&self) -> &Scenario {
        &self.scenario
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Leave the start screen. Does nothing once a run is underway.
    pub fn start(&mut self) {
        if self.state.run != RunPhase::Start {
            return;
        }
        log::info!("Run started (seed {})", self.seed);
        self.state.run = RunPhase::Playing;
        self.state.events.push(GameEvent::RunStarted);
    }

    /// Fresh state against the same scenario and seed, back on the start screen
    pub fn restart(&mut self) {
        log::info!("Run restarted");
        self.state = GameState::new(&self.scenario, self.seed);
        self.accumulator = 0.0;
        self.held = Held::default();
        self.last_touch_y = None;
    }

    pub fn key_down(&mut self, key: Key) {
        match key {
            Key::Left => self.held.left = true,
            Key::Right => self.held.right = true,
            Key::Space | Key::Enter => self.start(),
            // Vertical keys have no free-run meaning
            Key::Up | Key::Down | Key::Other => {}
        }
    }

    pub fn key_up(&mut self, key: Key) {
        match key {
            Key::Left => self.held.left = false,
            Key::Right => self.held.right = false,
            _ => {}
        }
    }

    /// Mouse wheel; positive is scrolling forward
    pub fn wheel(&mut self, delta_y: f32) {
        if self.state.run == RunPhase::Start {
            if delta_y > 0.0 {
                self.start();
            }
            return;
        }
        route_scroll(&mut self.state, &self.scenario, delta_y);
    }

    pub fn touch_start(&mut self, y: f32) {
        self.last_touch_y = Some(y);
        self.start();
    }

    /// Dragging down scrolls forward at twice the finger distance
    pub fn touch_move(&mut self, y: f32) {
        let Some(last) = self.last_touch_y.replace(y) else {
            return;
        };
        let delta = (y - last) * 2.0;
        if delta != 0.0 {
            route_scroll(&mut self.state, &self.scenario, delta);
        }
    }

    pub fn touch_end(&mut self) {
        self.last_touch_y = None;
    }

    /// Advance by a wall-clock frame delta and publish the frame
    pub fn frame(&mut self, dt: f32) -> Snapshot {
        self.accumulator += dt.clamp(0.0, MAX_FRAME_DT);
        let input = TickInput {
            left: self.held.left,
            right: self.held.right,
        };

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(&mut self.state, &self.scenario, &input, SIM_DT);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        self.snapshot()
    }

    fn snapshot(&mut self) -> Snapshot {
        let state = &self.state;
        let cinematic = &self.scenario.tuning.cinematic;
        let (visible, screen_anchor) = match state.mode {
            Mode::BallisticFall { timer, .. } if timer < cinematic.fall_hold_secs => {
                (true, Some(Vec2::new(VIEW_W / 2.0, VIEW_H / 2.0)))
            }
            Mode::BallisticFall { timer, .. } if timer < cinematic.fall_drop_secs => (false, None),
            _ => (true, None),
        };
        let player = &state.player;

        let snapshot = Snapshot {
            run: state.run,
            mode: state.mode.kind(),
            time: state.time,
            player: PlayerPose {
                pos: player.pos,
                scale: player.scale,
                stretch: player.stretch,
                frame: player.frame,
                facing: player.facing,
                visible,
                screen_anchor,
                coins: player.coins,
                skills: player.skills.clone(),
            },
            vehicles: state.vehicles.iter().filter(|v| v.visible).cloned().collect(),
            camera: state.camera.offset(),
            dialogue: state.dialogue.clone(),
            boards: state.boards.iter().filter(|b| !b.hidden).cloned().collect(),
            particles: state.particles.clone(),
            labels: state.labels.clone(),
            knowledge: state.knowledge.clone(),
            title: narrative::chapter_title(state, &self.scenario).to_owned(),
            collected: state.collected.iter().copied().collect(),
            items: state.items.clone(),
            events: Vec::new(),
        };
        Snapshot {
            events: self.state.drain_events(),
            ..snapshot
        }
    }
}
