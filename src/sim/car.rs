//! Car agent state and kinematics

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::action::{Action, SpeedTier};
use super::radar::RadarScan;
use crate::consts::{CAR_LENGTH, CAR_WIDTH};
use crate::heading_vector;
use crate::renderer::Rgba;

/// Steering intent for the current tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Direction {
    /// Heading decreases by the rotation rate
    Left,
    #[default]
    Straight,
    /// Heading increases by the rotation rate
    Right,
}

impl Direction {
    /// -1 / 0 / +1
    pub fn sign(self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Straight => 0.0,
            Direction::Right => 1.0,
        }
    }
}

/// Why an agent stopped being alive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Both flank radars read below the lateral threshold
    BoxedIn,
    /// Position left the canvas
    OutOfBounds,
    /// A radar ray sampled off the surface
    SensorEscape,
    /// A near-field probe touched the boundary
    NearFieldContact,
}

/// Pose and kinematic parameters an episode starts from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialPose {
    pub position: Vec2,
    /// Degrees
    pub heading: f32,
    pub speed: f32,
    pub rotation_rate: f32,
}

/// One driving agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Car {
    pub id: String,
    pub color: Rgba,

    pub position: Vec2,
    /// Degrees, unbounded
    pub heading: f32,
    pub velocity: Vec2,
    /// Degrees per tick
    pub rotation_rate: f32,
    pub direction: Direction,
    /// Position delta per tick is velocity * move_factor
    pub move_factor: f32,

    pub radar_angles: Vec<f32>,
    pub radar_distances: Vec<f32>,
    pub radar_hits: Vec<Vec2>,

    pub alive: bool,
    pub death_cause: Option<DeathCause>,
    /// Reward accumulated this episode
    pub reward: f32,
    /// Skipped by stepping and rendering, state kept
    pub disabled: bool,

    initial: InitialPose,
}

impl Car {
    pub fn new(
        id: impl Into<String>,
        color: Rgba,
        initial: InitialPose,
        move_factor: f32,
        radar_angles: Vec<f32>,
    ) -> Self {
        let count = radar_angles.len();
        let mut car = Self {
            id: id.into(),
            color,
            position: initial.position,
            heading: initial.heading,
            velocity: Vec2::ZERO,
            rotation_rate: initial.rotation_rate,
            direction: Direction::Straight,
            move_factor,
            radar_angles,
            radar_distances: vec![0.0; count],
            radar_hits: vec![initial.position; count],
            alive: true,
            death_cause: None,
            reward: 0.0,
            disabled: false,
            initial,
        };
        car.reset();
        car
    }

    pub fn initial_pose(&self) -> InitialPose {
        self.initial
    }

    /// Replace the pose `reset` restores (takes effect on the next reset)
    pub fn set_initial_pose(&mut self, pose: InitialPose) {
        self.initial = pose;
    }

    /// Restore the initial pose and zero the episode state
    pub fn reset(&mut self) {
        let init = self.initial;
        self.position = init.position;
        self.heading = init.heading;
        self.velocity = heading_vector(init.heading) * init.speed;
        self.rotation_rate = init.rotation_rate;
        self.direction = Direction::Straight;

        self.radar_distances.fill(0.0);
        self.radar_hits.fill(init.position);

        self.alive = true;
        self.death_cause = None;
        self.reward = 0.0;
        self.disabled = false;
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// One kinematic tick: translate, interpret the action, then turn
    pub fn apply_action(&mut self, action: Action) {
        self.drive();

        self.direction = match action {
            Action::SteerLeft => Direction::Left,
            Action::SteerRight => Direction::Right,
            Action::Straight => {
                self.drive();
                Direction::Straight
            }
            Action::LowSpeed | Action::MediumSpeed | Action::HighSpeed => {
                if let Some(tier) = action.speed_tier() {
                    self.set_speed_tier(tier);
                }
                Direction::Straight
            }
            Action::Idle => Direction::Straight,
        };

        self.rotate();
    }

    pub fn set_speed_tier(&mut self, tier: SpeedTier) {
        self.velocity = self.velocity.normalize_or(heading_vector(self.heading)) * tier.speed();
        self.rotation_rate = tier.rotation_rate();
    }

    fn drive(&mut self) {
        self.position += self.velocity * self.move_factor;
    }

    /// Turn heading and velocity by the same signed amount
    fn rotate(&mut self) {
        let delta = self.direction.sign() * self.rotation_rate;
        if delta == 0.0 {
            return;
        }
        self.heading += delta;
        // Screen y points down, so a heading change of +d is a -d turn in math coordinates
        self.velocity = Vec2::from_angle(-delta.to_radians()).rotate(self.velocity);
    }

    /// Store a radar scan
    pub fn record_scan(&mut self, scan: RadarScan) {
        self.radar_distances = scan.distances;
        self.radar_hits = scan.hit_points;
    }

    /// Mark dead; the first cause sticks until reset
    pub fn kill(&mut self, cause: DeathCause) {
        if self.alive {
            log::debug!("Agent {} died: {:?}", self.id, cause);
            self.alive = false;
            self.death_cause = Some(cause);
        }
    }

    /// Body rectangle corners, derived from the current pose
    pub fn body_corners(&self) -> [Vec2; 4] {
        let forward = heading_vector(self.heading) * (CAR_LENGTH / 2.0);
        let side = forward.perp().normalize_or_zero() * (CAR_WIDTH / 2.0);
        let c = self.position;
        [
            c + forward + side,
            c + forward - side,
            c - forward - side,
            c - forward + side,
        ]
    }

    /// Read-only snapshot handed to reward functions
    pub fn state(&self) -> AgentState<'_> {
        AgentState {
            id: &self.id,
            alive: self.alive,
            radar_distances: &self.radar_distances,
            radar_angles: &self.radar_angles,
            direction: self.direction,
            position: self.position,
            heading: self.heading,
            rotation_rate: self.rotation_rate,
            speed: self.speed(),
        }
    }
}

/// Observable agent state passed to the reward function
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentState<'a> {
    pub id: &'a str,
    pub alive: bool,
    pub radar_distances: &'a [f32],
    pub radar_angles: &'a [f32],
    pub direction: Direction,
    pub position: Vec2,
    pub heading: f32,
    pub rotation_rate: f32,
    pub speed: f32,
}
