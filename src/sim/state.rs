//! Game state and core simulation types
//!
//! Everything a run mutates lives in `GameState`; the world, story and
//! tuning it is played against stay read-only in `Scenario`.

use std::collections::BTreeSet;

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::Scenario;
use super::mode::{Mode, ModeKind, VehicleId};
use super::story::{BeatEffect, BoardEntry};
use super::trigger::TriggerRegistry;
use super::world::{CollectibleKind, Decoration, DecorationKind};
use crate::consts::*;

/// Current phase of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunPhase {
    /// Waiting for the first input
    Start,
    Playing,
    /// World edge reached
    Ended,
}

/// Player position derived from a vehicle each tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Attachment {
    pub vehicle: VehicleId,
    pub offset: Vec2,
}

/// The player character
#[derive(Debug, Clone, Serialize)]
pub struct Player {
    /// Top-left of the collision box (y grows downward)
    pub pos: Vec2,
    pub vel: Vec2,
    /// +1 right, -1 left
    pub facing: f32,
    pub scale: f32,
    /// Squash/stretch factors, neutral at (1, 1)
    pub stretch: Vec2,
    pub grounded: bool,
    /// Walk cycle frame (0..4)
    pub frame: u8,
    pub frame_timer: u8,
    pub coins: u32,
    pub skills: Vec<String>,
    pub growth: u32,
    pub attachment: Option<Attachment>,
}

impl Player {
    pub fn new(base_scale: f32) -> Self {
        Self {
            pos: Vec2::new(200.0, GROUND_Y - PLAYER_H),
            vel: Vec2::ZERO,
            facing: 1.0,
            scale: base_scale,
            stretch: Vec2::ONE,
            grounded: true,
            frame: 0,
            frame_timer: 0,
            coins: 0,
            skills: Vec::new(),
            growth: 0,
            attachment: None,
        }
    }

    /// Scaled box size
    pub fn size(&self) -> Vec2 {
        Vec2::new(PLAYER_W, PLAYER_H) * self.scale
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size() / 2.0
    }

    /// Bottom edge of the unscaled physics box
    pub fn foot(&self) -> f32 {
        self.pos.y + PLAYER_H
    }

    pub fn attach(&mut self, attachment: Attachment) {
        self.vel = Vec2::ZERO;
        self.attachment = Some(attachment);
    }

    pub fn detach(&mut self) {
        self.attachment = None;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleKind {
    Balloon,
    Car,
}

/// A rideable vehicle spawned from a world decoration
#[derive(Debug, Clone, Serialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub kind: VehicleKind,
    pub pos: Vec2,
    /// Authored decoration position
    pub home: Vec2,
    pub vel: Vec2,
    pub rotation: f32,
    pub scale: f32,
    pub bobbing: bool,
    /// Being ridden
    pub active: bool,
    /// Proximity latch; cleared beyond the release distance
    pub near: bool,
    pub burning: bool,
    pub visible: bool,
}

impl Vehicle {
    pub fn from_decoration(id: VehicleId, decoration: &Decoration) -> Option<Self> {
        let kind = match decoration.kind {
            DecorationKind::Balloon => VehicleKind::Balloon,
            DecorationKind::Car => VehicleKind::Car,
            _ => return None,
        };
        let pos = Vec2::new(decoration.x, decoration.y);
        Some(Self {
            id,
            kind,
            pos,
            home: pos,
            vel: Vec2::ZERO,
            rotation: decoration.rotation,
            scale: decoration.scale,
            bobbing: decoration.bobbing,
            active: false,
            near: false,
            burning: false,
            visible: true,
        })
    }

    /// Vertical offset from the mooring (negative is up)
    pub fn altitude(&self) -> f32 {
        self.pos.y - self.home.y
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Camera {
    pub pos: Vec2,
    pub target: Vec2,
    /// Transient offset, not part of the eased position
    pub shake: Vec2,
}

impl Camera {
    /// Published viewport offset
    pub fn offset(&self) -> Vec2 {
        self.pos + self.shake
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dialogue {
    pub text: String,
    pub remaining: u32,
}

/// In-world chapter recap
#[derive(Debug, Clone, Serialize)]
pub struct SummaryBoard {
    pub chapter: usize,
    pub name: String,
    pub world_x: f32,
    pub world_y: f32,
    pub items: Vec<BoardEntry>,
    pub total_items: usize,
    pub skills: Vec<BoardEntry>,
    pub certificates: Vec<BoardEntry>,
    /// Seconds of play when the board opened
    pub spawn_time: f32,
    pub hidden: bool,
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Remaining ticks
    pub life: f32,
    pub size: f32,
    pub color: u32, // 0xRRGGBB
}

/// Maximum particles
pub const MAX_PARTICLES: usize = 256;

#[derive(Debug, Clone, Serialize)]
pub struct FloatingLabel {
    pub pos: Vec2,
    pub text: String,
    pub color: u32,
    pub life: f32,
}

/// A word homing in on the player in the void
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgeBit {
    pub pos: Vec2,
    pub word: String,
    pub color: u32,
    pub life: f32,
}

/// Things the UI collaborator reacts to; drained every frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    RunStarted,
    ModeChanged {
        from: ModeKind,
        to: ModeKind,
    },
    ItemCollected {
        id: u32,
        kind: CollectibleKind,
        skill: Option<String>,
    },
    Popup {
        icon: String,
        title: String,
        desc: String,
    },
    SummaryOpened {
        chapter: usize,
    },
    RunEnded,
}

/// Complete mutable state of one run
#[derive(Debug, Clone, Serialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    #[serde(skip)]
    pub rng: Pcg32,
    pub run: RunPhase,
    /// Seconds of play
    pub time: f32,
    pub ticks: u64,
    pub player: Player,
    /// Indexed by `VehicleId`
    pub vehicles: Vec<Vehicle>,
    pub camera: Camera,
    pub mode: Mode,
    /// Left scroll bound; never decreases
    pub min_x: f32,
    /// Ticks before a proximity trigger may board again
    pub proximity_cooldown: u32,
    /// Runtime item positions (the magnet displaces them)
    pub items: Vec<Vec2>,
    pub collected: BTreeSet<u32>,
    pub beats: TriggerRegistry<BeatEffect>,
    pub dialogue: Option<Dialogue>,
    pub boards: Vec<SummaryBoard>,
    pub particles: Vec<Particle>,
    pub labels: Vec<FloatingLabel>,
    pub knowledge: Vec<KnowledgeBit>,
    pub events: Vec<GameEvent>,
    /// Mode transition applied during the current tick
    #[serde(skip)]
    pub transition: Option<(ModeKind, ModeKind)>,
}

impl GameState {
    /// Fresh run against `scenario`
    pub fn new(scenario: &Scenario, seed: u64) -> Self {
        let world = &scenario.world;
        let vehicles = world
            .decorations
            .iter()
            .filter(|d| d.kind.is_vehicle())
            .enumerate()
            .filter_map(|(id, d)| Vehicle::from_decoration(id, d))
            .collect();

        let mut beats = TriggerRegistry::new();
        for beat in &scenario.story.beats {
            if !beats.register(beat.to_trigger()) {
                log::warn!("Skipping duplicate beat {}", beat.id);
            }
        }

        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            run: RunPhase::Start,
            time: 0.0,
            ticks: 0,
            player: Player::new(scenario.tuning.run.base_scale),
            vehicles,
            camera: Camera::default(),
            mode: Mode::FreeRun,
            min_x: world.x_start,
            proximity_cooldown: 0,
            items: world
                .collectibles
                .iter()
                .map(|c| Vec2::new(c.x, c.y))
                .collect(),
            collected: BTreeSet::new(),
            beats,
            dialogue: None,
            boards: Vec::new(),
            particles: Vec::new(),
            labels: Vec::new(),
            knowledge: Vec::new(),
            events: Vec::new(),
            transition: None,
        }
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(id)
    }

    /// Balloon offset while the story still follows the balloon
    pub fn altitude(&self) -> Option<f32> {
        if !self.mode.kind().tracks_altitude() {
            return None;
        }
        let id = self.mode.vehicle()?;
        self.vehicle(id).map(Vehicle::altitude)
    }

    /// Raise the ratchet; lower values are ignored
    pub fn raise_min_x(&mut self, x: f32) {
        if x > self.min_x {
            log::debug!("Ratchet raised to {}", x);
            self.min_x = x;
        }
    }

    pub fn show_dialogue(&mut self, text: &str, ticks: u32) {
        self.dialogue = Some(Dialogue {
            text: text.to_owned(),
            remaining: ticks,
        });
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
