//! Scroll Quest - a scroll-driven story world
//!
//! Core modules:
//! - `sim`: Deterministic simulation (locomotion modes, collisions, camera, narrative)
//! - `session`: Owns a run, buffers input and publishes per-frame snapshots
//! - `tuning`: Data-driven physics feel
//! - `error`: Configuration errors
//! - `web`: Browser bindings (wasm32 only)

pub mod error;
pub mod session;
pub mod sim;
pub mod tuning;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use error::ConfigError;
pub use session::{Key, Session, Snapshot};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, all per-tick tuning assumes this rate)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Upper bound on a single frame delta (a stalled tab must not tunnel the player)
    pub const MAX_FRAME_DT: f32 = 0.05;
    /// Ticks per simulated second
    pub const TICKS_PER_SECOND: f32 = 60.0;

    /// Viewport dimensions (the render surface is letterboxed to this)
    pub const VIEW_W: f32 = 1920.0;
    pub const VIEW_H: f32 = 1080.0;

    /// World extent along the scroll axis
    pub const WORLD_W: f32 = 100_000.0;
    /// Floor height (y grows downward)
    pub const GROUND_Y: f32 = 880.0;
    /// Visual crust drawn on top of land tiles
    pub const SURFACE_LIP: f32 = 46.0;

    /// Player collision box (unscaled)
    pub const PLAYER_W: f32 = 100.0;
    pub const PLAYER_H: f32 = 90.0;

    /// Collectible pickup box edge
    pub const ITEM_SIZE: f32 = 80.0;
    /// Collectible visual centre offset from its anchor
    pub const ITEM_CENTER: f32 = 12.0;

    /// Distance floor for any division by a distance
    pub const MIN_DISTANCE: f32 = 1e-3;
}

/// Move `current` toward `target` by `fraction` of the remaining gap
#[inline]
pub fn ease_toward(current: f32, target: f32, fraction: f32) -> f32 {
    current + (target - current) * fraction
}

/// Zero out values whose magnitude is below `threshold`
#[inline]
pub fn snap_to_zero(value: f32, threshold: f32) -> f32 {
    if value.abs() < threshold { 0.0 } else { value }
}
