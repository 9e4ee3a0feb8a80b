//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (authored order for world data, id order for vehicles)
//! - No rendering or platform dependencies

pub mod camera;
pub mod collision;
pub mod effects;
pub mod mode;
pub mod movement;
pub mod narrative;
pub mod state;
pub mod story;
pub mod tick;
pub mod trigger;
pub mod world;

pub use mode::{Ascent, EncounterPhase, Mode, ModeEvent, ModeKind, VehicleId};
pub use state::{
    Attachment, Camera, Dialogue, FloatingLabel, GameEvent, GameState, KnowledgeBit, Particle,
    Player, RunPhase, SummaryBoard, Vehicle, VehicleKind,
};
pub use story::{BeatEffect, StoryTimeline, Track};
pub use tick::{TickInput, route_scroll, tick};
pub use trigger::{Activation, Probe, Rearm, Trigger, TriggerRegistry};
pub use world::{Collectible, CollectibleKind, Decoration, Platform, World, Zone, ZoneStyle};

use crate::error::ConfigError;
use crate::tuning::Tuning;

/// The read-only inputs a run is played against
#[derive(Debug, Clone)]
pub struct Scenario {
    pub world: World,
    pub story: StoryTimeline,
    pub tuning: Tuning,
}

impl Scenario {
    /// Validate and bundle a world, story and tuning
    pub fn new(world: World, story: StoryTimeline, tuning: Tuning) -> Result<Self, ConfigError> {
        world.validate()?;
        story.validate()?;
        tuning.validate()?;
        Ok(Self {
            world,
            story,
            tuning,
        })
    }

    /// The built-in journey with default tuning
    pub fn nepal() -> Self {
        Self {
            world: World::nepal(),
            story: StoryTimeline::nepal(),
            tuning: Tuning::default(),
        }
    }

    pub fn with_tuning(mut self, tuning: Tuning) -> Self {
        self.tuning = tuning;
        self
    }
}
