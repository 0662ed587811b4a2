//! Environment settings
//!
//! Validated once, before the environment runs its first tick.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// How frames are presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RenderMode {
    /// Off-screen surface only (training)
    #[default]
    Headless,
    /// Surface is presented to a window by the caller every render
    Window,
}

impl RenderMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderMode::Headless => "headless",
            RenderMode::Window => "window",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "headless" | "rgb_array" => Some(RenderMode::Headless),
            "window" | "human" => Some(RenderMode::Window),
            _ => None,
        }
    }
}

/// Which track catalogue a numbered track comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackMode {
    Training,
    Evaluation,
}

impl TrackMode {
    /// Fixed seeds of the numbered tracks (track N is entry N-1)
    fn catalogue(&self) -> &'static [u64] {
        match self {
            TrackMode::Training => &[12_023, 74_211, 31_337],
            TrackMode::Evaluation => &[90_210],
        }
    }

    /// Seed of a numbered track (1-based)
    pub fn track_seed(&self, index: u32) -> Option<u64> {
        let slot = (index as usize).checked_sub(1)?;
        self.catalogue().get(slot).copied()
    }
}

/// Where the episode track comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackSource {
    /// Procedural track from an explicit seed
    Generated { seed: u64, complexity: usize },
    /// Numbered track from the training/evaluation catalogue
    Catalogue { mode: TrackMode, index: u32 },
}

impl Default for TrackSource {
    fn default() -> Self {
        TrackSource::Catalogue {
            mode: TrackMode::Training,
            index: 1,
        }
    }
}

impl TrackSource {
    /// Resolve to (seed, complexity)
    pub fn resolve(&self) -> Result<(u64, usize), ConfigError> {
        match *self {
            TrackSource::Generated { seed, complexity } => Ok((seed, complexity)),
            TrackSource::Catalogue { mode, index } => mode
                .track_seed(index)
                .map(|seed| (seed, TRACK_COMPLEXITY))
                .ok_or(ConfigError::InvalidTrackIndex { mode, index }),
        }
    }
}

/// Per-agent setup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Stable identity used to tell agents apart
    pub id: String,
    /// Body color; seeded-random when absent
    #[serde(default)]
    pub color: Option<[u8; 3]>,
}

impl AgentSpec {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            color: None,
        }
    }
}

/// Radar layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarSettings {
    /// Number of rays, evenly spaced across the spread
    pub count: usize,
    /// Total forward arc in degrees (180 = -90..=+90)
    pub spread: f32,
    /// Unit steps a ray marches before giving up
    pub max_range: u32,
}

impl Default for RadarSettings {
    fn default() -> Self {
        Self {
            count: RADAR_COUNT,
            spread: RADAR_SPREAD,
            max_range: RADAR_MAX_RANGE,
        }
    }
}

/// Car kinematics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarSettings {
    /// Position delta per tick is velocity * move_factor
    pub move_factor: f32,
    /// Velocity magnitude at the start of an episode
    pub initial_speed: f32,
    /// Degrees per tick at the start of an episode
    pub initial_rotation_rate: f32,
}

impl Default for CarSettings {
    fn default() -> Self {
        Self {
            move_factor: MOVE_FACTOR,
            initial_speed: INITIAL_SPEED,
            initial_rotation_rate: INITIAL_ROTATION_RATE,
        }
    }
}

/// Off-track detection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionSettings {
    /// Both flank radars below this means boxed in
    pub lateral_threshold: f32,
    /// Probe two points ahead of the car for the boundary color
    pub near_field_probe: bool,
    pub probe_angle: f32,
    pub probe_length: f32,
}

impl Default for CollisionSettings {
    fn default() -> Self {
        Self {
            lateral_threshold: LATERAL_THRESHOLD,
            near_field_probe: false,
            probe_angle: PROBE_ANGLE,
            probe_length: PROBE_LENGTH,
        }
    }
}

/// Complete environment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Canvas size in pixels (width, height)
    pub canvas: (u32, u32),
    pub track: TrackSource,
    pub agents: Vec<AgentSpec>,

    #[serde(default)]
    pub radar: RadarSettings,
    #[serde(default)]
    pub car: CarSettings,
    #[serde(default)]
    pub collision: CollisionSettings,

    // === Loop ===
    /// Target ticks per second; unpaced when absent
    #[serde(default)]
    pub tick_rate: Option<u32>,
    #[serde(default)]
    pub render_mode: RenderMode,

    // === Outputs ===
    /// Attach RGB bytes of the surface to every step result
    #[serde(default)]
    pub require_pixel: bool,
    /// Draw radar rays on render
    #[serde(default)]
    pub show_radar: bool,
    /// Keyboard-driven single agent
    #[serde(default)]
    pub human: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            canvas: (CANVAS_WIDTH, CANVAS_HEIGHT),
            track: TrackSource::default(),
            agents: vec![AgentSpec::new("car-0")],

            radar: RadarSettings::default(),
            car: CarSettings::default(),
            collision: CollisionSettings::default(),

            tick_rate: None,
            render_mode: RenderMode::Headless,

            require_pixel: false,
            show_radar: false,
            human: false,
        }
    }
}

impl Settings {
    /// Settings for a displayed, paced run
    pub fn windowed() -> Self {
        Self {
            tick_rate: Some(DEFAULT_TICK_RATE),
            render_mode: RenderMode::Window,
            show_radar: true,
            ..Self::default()
        }
    }

    /// Replace the agent list with `count` agents named `car-<i>`
    pub fn with_agent_count(mut self, count: usize) -> Self {
        self.agents = (0..count).map(|i| AgentSpec::new(format!("car-{i}"))).collect();
        self
    }

    /// Check every parameter before the environment is built
    pub fn validate(&self) -> Result<(), ConfigError> {
        let (width, height) = self.canvas;
        if width < MIN_CANVAS_SIDE || height < MIN_CANVAS_SIDE {
            return Err(ConfigError::CanvasTooSmall { width, height });
        }

        let count = self.agents.len();
        if count == 0 {
            return Err(ConfigError::NoAgents);
        }
        if count > MAX_AGENTS {
            return Err(ConfigError::TooManyAgents {
                count,
                max: MAX_AGENTS,
            });
        }
        if self.human && count != 1 {
            return Err(ConfigError::HumanModeRequiresSingleAgent { count });
        }

        self.track.resolve()?;

        if self.radar.count == 0 {
            return Err(invalid("radar.count", "must be at least 1"));
        }
        if !(0.0..=360.0).contains(&self.radar.spread) {
            return Err(invalid("radar.spread", "must lie in 0..=360 degrees"));
        }
        if self.radar.max_range == 0 {
            return Err(invalid("radar.max_range", "must be positive"));
        }
        if !(self.car.move_factor > 0.0) {
            return Err(invalid("car.move_factor", "must be positive"));
        }
        if !(self.car.initial_speed > 0.0) {
            return Err(invalid("car.initial_speed", "must be positive"));
        }
        if !(self.car.initial_rotation_rate >= 0.0) {
            return Err(invalid("car.initial_rotation_rate", "must not be negative"));
        }
        if !(self.collision.lateral_threshold >= 0.0) {
            return Err(invalid("collision.lateral_threshold", "must not be negative"));
        }
        if !self.collision.probe_angle.is_finite() {
            return Err(invalid("collision.probe_angle", "must be finite"));
        }
        if !(self.collision.probe_length > 0.0 && self.collision.probe_length.is_finite()) {
            return Err(invalid("collision.probe_length", "must be positive"));
        }
        if self.tick_rate == Some(0) {
            return Err(invalid("tick_rate", "must be positive when set"));
        }

        Ok(())
    }

    /// Parse settings from JSON (missing sections take defaults)
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json_str(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }
}

fn invalid(name: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidParameter {
        name,
        reason: reason.to_string(),
    }
}
