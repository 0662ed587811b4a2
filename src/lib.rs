//! Car Racer - A 2D car racing environment for driving policies
//!
//! Core modules:
//! - `sim`: Deterministic simulation (track generation, kinematics, radar, episode loop)
//! - `renderer`: Pixel surface the scene is drawn on and probed against
//! - `settings`: Environment configuration
//! - `error`: Error taxonomy

pub mod error;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{ActionError, ConfigError, GenerationError, SensingFailure, SimError};
pub use settings::{RenderMode, Settings};
pub use sim::{Action, AgentState, Car, Environment, StepResult, Track};

use glam::Vec2;

/// Environment configuration constants
pub mod consts {
    /// Default canvas dimensions (pixels)
    pub const CANVAS_WIDTH: u32 = 800;
    pub const CANVAS_HEIGHT: u32 = 700;
    /// Smallest canvas side: control points are drawn 100 px in from the far
    /// edges and the fitted road keeps a margin on both sides
    pub const MIN_CANVAS_SIDE: u32 = 200;

    /// Track generation
    pub const TRACK_COMPLEXITY: usize = 10;
    /// Fewest control points a periodic cubic can be fitted through
    pub const MIN_TRACK_POINTS: usize = 4;
    pub const ANCHOR_SAMPLES: usize = 100;
    pub const BOUNDARY_SAMPLES: usize = 1000;
    /// Coordinates below this get shifted away from the canvas edge
    pub const EDGE_CLIP_LIMIT: f64 = 5.0;
    pub const EDGE_SHIFT: f64 = 20.0;

    /// Road drawing (circle stamps along the boundary path)
    pub const ROAD_RADIUS: f32 = 25.0;
    pub const ROAD_EDGE_RADIUS: f32 = 26.0;

    /// Car defaults
    pub const MOVE_FACTOR: f32 = 12.0;
    pub const INITIAL_SPEED: f32 = 0.8;
    pub const INITIAL_ROTATION_RATE: f32 = 15.0;
    pub const CAR_LENGTH: f32 = 20.0;
    pub const CAR_WIDTH: f32 = 10.0;

    /// Radar defaults
    pub const RADAR_COUNT: usize = 5;
    pub const RADAR_SPREAD: f32 = 180.0;
    pub const RADAR_MAX_RANGE: u32 = 200;

    /// Collision defaults
    pub const LATERAL_THRESHOLD: f32 = 20.0;
    pub const PROBE_ANGLE: f32 = 18.0;
    pub const PROBE_LENGTH: f32 = 20.0;

    /// Pacing for displayed runs (ticks per second)
    pub const DEFAULT_TICK_RATE: u32 = 15;

    /// Upper bound on simultaneously simulated agents
    pub const MAX_AGENTS: usize = 64;
}

/// Unit direction for a heading in degrees.
///
/// Screen convention: x grows right, the sine term is negated so positive
/// headings point up the screen.
#[inline]
pub fn heading_vector(heading_deg: f32) -> Vec2 {
    let rad = heading_deg.to_radians();
    Vec2::new(rad.cos(), -rad.sin())
}

/// Heading in degrees of a screen-space direction (inverse of `heading_vector`)
#[inline]
pub fn heading_of(dir: Vec2) -> f32 {
    (-dir.y).atan2(dir.x).to_degrees()
}

/// Normalized angle to [0, 360)
#[inline]
pub fn normalize_degrees(angle: f32) -> f32 {
    angle.rem_euclid(360.0)
}
