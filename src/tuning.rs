//! Data-driven physics feel
//!
//! Every per-tick rate below assumes the fixed 60 Hz step in
//! [`crate::consts::SIM_DT`]. Values are grouped by the locomotion mode that
//! reads them; any group (or field) missing from a JSON override falls back to
//! its default.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Free-run physics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunTuning {
    /// Downward acceleration per tick
    pub gravity: f32,
    /// Horizontal velocity multiplier per tick
    pub friction: f32,
    /// |vx| below this snaps to zero
    pub velocity_snap: f32,
    /// Impulse per wheel/touch event
    pub scroll_accel: f32,
    /// Key acceleration as a fraction of `scroll_accel`
    pub key_accel_factor: f32,
    /// Speed cap before the heavy section
    pub max_speed: f32,
    /// Speed cap once past the story's heavy threshold
    pub heavy_max_speed: f32,
    /// Highest ledge the player climbs without a jump
    pub auto_step_height: f32,
    /// Extra depth below a platform's bottom that still counts as landing
    pub landing_band: f32,
    /// Impact speed above which a landing squashes the sprite
    pub squash_impact_speed: f32,
    /// Stretch applied on a hard landing
    pub squash_x: f32,
    pub squash_y: f32,
    /// Fraction of the remaining stretch recovered per tick
    pub stretch_relax: f32,
    /// Fraction of the remaining scale gap closed per tick
    pub scale_ease: f32,
    pub base_scale: f32,
    pub giant_scale: f32,
    pub growth_per_skill: f32,
    pub max_growth: u32,
    /// Walk cycle only advances above this speed
    pub anim_speed_threshold: f32,
    pub anim_ticks_per_frame: u8,
    /// Distance kept from the world's right edge
    pub right_edge_margin: f32,
    /// Vertical travel per unit of horizontal input in a corridor
    pub corridor_lift: f32,
    pub corridor_min_y: f32,
}

impl Default for RunTuning {
    fn default() -> Self {
        Self {
            gravity: 0.9,
            friction: 0.93,
            velocity_snap: 0.1,
            scroll_accel: 2.0,
            key_accel_factor: 0.5,
            max_speed: 14.0,
            heavy_max_speed: 9.5,
            auto_step_height: 240.0,
            landing_band: 8.0,
            squash_impact_speed: 2.0,
            squash_x: 1.3,
            squash_y: 0.7,
            stretch_relax: 0.1,
            scale_ease: 0.1,
            base_scale: 0.8,
            giant_scale: 3.2,
            growth_per_skill: 0.1,
            max_growth: 6,
            anim_speed_threshold: 0.5,
            anim_ticks_per_frame: 8,
            right_edge_margin: 120.0,
            corridor_lift: 0.8,
            corridor_min_y: -3000.0,
        }
    }
}

/// Balloon ride and item magnet
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BalloonTuning {
    /// Velocity change per unit of buffered scroll
    pub sensitivity: f32,
    /// Velocity multiplier per tick
    pub drag: f32,
    /// Highest the balloon may rise (offset from its mooring, negative is up)
    pub ceiling: f32,
    /// Lowest the balloon may sink below its mooring
    pub floor: f32,
    /// Offset past which the ride counts as cruising
    pub cruise_altitude: f32,
    /// Offset that starts the encounter
    pub encounter_altitude: f32,
    /// Horizontal distance that boards the balloon
    pub trigger_distance: f32,
    /// Ticks before a balloon can be boarded again
    pub cooldown_ticks: u32,
    /// Basket anchor below the rider for the item magnet
    pub basket_drop: f32,
    pub magnet_radius: f32,
    /// Fraction of the gap an item closes per tick
    pub magnet_pull: f32,
    /// Rider foot height inside the basket, per unit of balloon scale
    pub basket_floor: f32,
}

impl Default for BalloonTuning {
    fn default() -> Self {
        Self {
            sensitivity: 0.15,
            drag: 0.93,
            ceiling: -6000.0,
            floor: 40.0,
            cruise_altitude: -600.0,
            encounter_altitude: -5100.0,
            trigger_distance: 80.0,
            cooldown_ticks: 120,
            basket_drop: 80.0,
            magnet_radius: 450.0,
            magnet_pull: 0.18,
            basket_floor: 11.5,
        }
    }
}

/// Encounter and the fall that follows it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CinematicTuning {
    pub swoop_ticks: u32,
    pub hazard_ticks: u32,
    pub shake_amplitude: f32,
    pub shake_frequency: f32,
    /// Seconds the player hangs at screen centre
    pub fall_hold_secs: f32,
    /// Seconds after the collapse at which the blackout ends and the drop starts
    pub fall_drop_secs: f32,
    /// Height the drop starts from
    pub fall_start_y: f32,
    pub fall_gravity_factor: f32,
    /// Upward kick when the basket gives way
    pub fall_launch_vy: f32,
    /// Ticks the drift toward the landing x takes
    pub fall_drift_ticks: f32,
    pub particle_burst: u32,
}

impl Default for CinematicTuning {
    fn default() -> Self {
        Self {
            swoop_ticks: 100,
            hazard_ticks: 120,
            shake_amplitude: 10.0,
            shake_frequency: 50.0,
            fall_hold_secs: 3.0,
            fall_drop_secs: 5.0,
            fall_start_y: -200.0,
            fall_gravity_factor: 1.5,
            fall_launch_vy: -10.0,
            fall_drift_ticks: 180.0,
            particle_burst: 25,
        }
    }
}

/// Car driving, the coaster ride and the portal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleTuning {
    pub car_trigger_distance: f32,
    /// Vertical reach of any vehicle trigger
    pub trigger_height: f32,
    /// Distance that clears a vehicle's near latch
    pub release_distance: f32,
    /// Backing up this far from the boarding point leaves the car
    pub dismount_distance: f32,
    /// Car acceleration as a multiple of the free-run scroll impulse
    pub car_accel_factor: f32,
    /// Buffered car scroll multiplier per tick
    pub car_scroll_decay: f32,
    pub car_friction: f32,
    pub car_max_speed: f32,
    /// Car body height above the road
    pub car_seat_height: f32,
    pub track_min_speed: f32,
    pub track_accel: f32,
    pub track_brake: f32,
    pub track_slope_gain: f32,
    pub track_max_speed: f32,
    pub track_seat_height: f32,
    pub portal_pull: f32,
    pub portal_rise: f32,
    pub portal_spin: f32,
    pub portal_shrink_ticks: f32,
    pub portal_ticks: u32,
}

impl Default for VehicleTuning {
    fn default() -> Self {
        Self {
            car_trigger_distance: 180.0,
            trigger_height: 300.0,
            release_distance: 400.0,
            dismount_distance: 300.0,
            car_accel_factor: 1.15,
            car_scroll_decay: 0.8,
            car_friction: 0.93,
            car_max_speed: 8.0,
            car_seat_height: 105.0,
            track_min_speed: 8.0,
            track_accel: 0.15,
            track_brake: 0.965,
            track_slope_gain: 0.65,
            track_max_speed: 30.0,
            track_seat_height: 135.0,
            portal_pull: 0.05,
            portal_rise: 200.0,
            portal_spin: 0.2,
            portal_shrink_ticks: 120.0,
            portal_ticks: 150,
        }
    }
}

/// Zero-gravity drift in the void
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VoidTuning {
    pub friction: f32,
    pub float_y: f32,
    pub bob_amplitude: f32,
    pub bob_frequency: f32,
    pub right_margin: f32,
}

impl Default for VoidTuning {
    fn default() -> Self {
        Self {
            friction: 0.95,
            float_y: 650.0,
            bob_amplitude: 40.0,
            bob_frequency: 2.0,
            right_margin: 100.0,
        }
    }
}

/// Camera smoothing and framing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    pub lerp: f32,
    pub cinematic_lerp: f32,
    pub fall_lerp: f32,
    /// Fraction of the viewport height above a climbing player
    pub climb_offset: f32,
    pub min_y: f32,
    pub max_y: f32,
    /// Fraction of the viewport height above the player in cinematic modes
    pub cinematic_offset: f32,
    pub cinematic_low_offset: f32,
    /// Extra lift while riding the balloon
    pub balloon_lift: f32,
    /// Fraction of the viewport height above the landing line during the fall
    pub fall_frame: f32,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            lerp: 0.08,
            cinematic_lerp: 0.15,
            fall_lerp: 0.1,
            climb_offset: 0.7,
            min_y: -6000.0,
            max_y: 0.0,
            cinematic_offset: 0.5,
            cinematic_low_offset: 0.2,
            balloon_lift: -200.0,
            fall_frame: 0.75,
        }
    }
}

/// Narrative pacing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NarrativeTuning {
    /// Seconds after start before vehicles may be boarded
    pub proximity_grace_secs: f32,
    /// Chance per tick of a knowledge word spawning
    pub knowledge_spawn_chance: f32,
    pub knowledge_speed: f32,
    pub knowledge_absorb_radius: f32,
    pub knowledge_decay: f32,
}

impl Default for NarrativeTuning {
    fn default() -> Self {
        Self {
            proximity_grace_secs: 1.0,
            knowledge_spawn_chance: 0.3,
            knowledge_speed: 25.0,
            knowledge_absorb_radius: 60.0,
            knowledge_decay: 0.005,
        }
    }
}

/// All tuning groups
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub run: RunTuning,
    pub balloon: BalloonTuning,
    pub cinematic: CinematicTuning,
    pub vehicle: VehicleTuning,
    #[serde(rename = "void")]
    pub void_float: VoidTuning,
    pub camera: CameraTuning,
    pub narrative: NarrativeTuning,
}

impl Tuning {
    /// Parse a (possibly partial) JSON override and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values that would make the simulation diverge or stall
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fractions = [
            ("run.friction", self.run.friction),
            ("run.stretch_relax", self.run.stretch_relax),
            ("run.scale_ease", self.run.scale_ease),
            ("balloon.drag", self.balloon.drag),
            ("balloon.magnet_pull", self.balloon.magnet_pull),
            ("vehicle.car_friction", self.vehicle.car_friction),
            ("vehicle.car_scroll_decay", self.vehicle.car_scroll_decay),
            ("vehicle.track_brake", self.vehicle.track_brake),
            ("vehicle.portal_pull", self.vehicle.portal_pull),
            ("void.friction", self.void_float.friction),
            ("camera.lerp", self.camera.lerp),
            ("camera.cinematic_lerp", self.camera.cinematic_lerp),
            ("camera.fall_lerp", self.camera.fall_lerp),
            (
                "narrative.knowledge_spawn_chance",
                self.narrative.knowledge_spawn_chance,
            ),
        ];
        for (name, value) in fractions {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::TuningOutOfRange {
                    name,
                    value,
                    expected: "0.0..=1.0",
                });
            }
        }

        let positives = [
            ("run.max_speed", self.run.max_speed),
            ("run.heavy_max_speed", self.run.heavy_max_speed),
            ("run.base_scale", self.run.base_scale),
            ("vehicle.car_max_speed", self.vehicle.car_max_speed),
            ("vehicle.track_max_speed", self.vehicle.track_max_speed),
            ("vehicle.portal_shrink_ticks", self.vehicle.portal_shrink_ticks),
            ("cinematic.fall_drift_ticks", self.cinematic.fall_drift_ticks),
        ];
        for (name, value) in positives {
            if value <= 0.0 {
                return Err(ConfigError::TuningOutOfRange {
                    name,
                    value,
                    expected: "> 0.0",
                });
            }
        }

        if self.balloon.ceiling >= self.balloon.floor {
            return Err(ConfigError::TuningOutOfRange {
                name: "balloon.ceiling",
                value: self.balloon.ceiling,
                expected: "< balloon.floor",
            });
        }
        if self.vehicle.release_distance <= self.vehicle.car_trigger_distance {
            return Err(ConfigError::TuningOutOfRange {
                name: "vehicle.release_distance",
                value: self.vehicle.release_distance,
                expected: "> vehicle.car_trigger_distance",
            });
        }
        Ok(())
    }

    /// Load tuning overrides from a JSON file, falling back to defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(tuning) => {
                    log::info!("Loaded tuning from {}", path.display());
                    tuning
                }
                Err(e) => {
                    log::warn!("Ignoring tuning file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Cannot read tuning file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}
