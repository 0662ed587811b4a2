//! Error taxonomy
//!
//! Generation and configuration errors abort setup. Action errors reject a
//! single tick. Sensing failures never leave the step path: the loop absorbs
//! them by marking the agent dead.

use glam::Vec2;
use thiserror::Error;

use crate::settings::TrackMode;

/// Track spline fitting could not produce a closed path
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GenerationError {
    #[error("track needs at least {min} control points, got {got}")]
    TooFewPoints { got: usize, min: usize },
    #[error("control point {index} coincides with its successor")]
    CoincidentPoints { index: usize },
    #[error("control points are collinear")]
    CollinearPoints,
    #[error("periodic spline system is singular")]
    SingularSystem,
}

/// Invalid environment configuration, raised before any tick runs
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("at least one agent is required")]
    NoAgents,
    #[error("{count} agents requested, at most {max} supported")]
    TooManyAgents { count: usize, max: usize },
    #[error("human mode drives exactly one agent, {count} configured")]
    HumanModeRequiresSingleAgent { count: usize },
    #[error("no track {index} in {mode:?} mode")]
    InvalidTrackIndex { mode: TrackMode, index: u32 },
    #[error("canvas {width}x{height} is too small")]
    CanvasTooSmall { width: u32, height: u32 },
    #[error("invalid {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Action vector that cannot be decoded
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ActionError {
    #[error("action vector has {got} entries, expected {expected}")]
    WrongLength { expected: usize, got: usize },
    #[error("action entry {index} is {value}, expected 0 or 1")]
    UnrecognizedValue { index: usize, value: f32 },
}

/// A radar sample left the addressable surface
#[derive(Debug, Clone, Error, PartialEq)]
#[error("radar {ray} sampled outside the surface at ({}, {})", point.x, point.y)]
pub struct SensingFailure {
    pub ray: usize,
    pub point: Vec2,
}

/// Top-level error for environment operations
#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Action(#[from] ActionError),
    #[error("agent index {index} out of range ({count} agents)")]
    AgentIndex { index: usize, count: usize },
    #[error("got {got} actions for {expected} agents")]
    AgentCount { expected: usize, got: usize },
    #[error("environment is closed")]
    Closed,
}
