//! Configuration errors
//!
//! The simulation itself has no failure surface; only loading and validating
//! world layouts, story timelines and tuning can fail.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("zone {index} has an empty or inverted range [{start}, {end})")]
    EmptyZone { index: usize, start: f32, end: f32 },
    #[error("zone {index} starts at {start} but the previous zone ends at {previous_end}")]
    OverlappingZones {
        index: usize,
        start: f32,
        previous_end: f32,
    },
    #[error("zone {index} ratchet {ratchet} lies outside its range [{start}, {end})")]
    RatchetOutsideZone {
        index: usize,
        ratchet: f32,
        start: f32,
        end: f32,
    },
    #[error("platform {index} has non-positive size {w}x{h}")]
    DegeneratePlatform { index: usize, w: f32, h: f32 },
    #[error("world end {x_end} must be greater than world start {x_start}")]
    EmptyWorld { x_start: f32, x_end: f32 },
    #[error("tuning value `{name}` = {value} is out of range ({expected})")]
    TuningOutOfRange {
        name: &'static str,
        value: f32,
        expected: &'static str,
    },
    #[error("collectible id {0} is used twice")]
    DuplicateCollectible(u32),
    #[error("story beat id `{0}` is registered twice")]
    DuplicateBeat(String),
}
