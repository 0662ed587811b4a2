//! Deterministic simulation module
//!
//! Track generation, car kinematics, radar sensing, collision policy and the
//! episode loop. Given the same seed, settings and action sequence every run
//! produces the same states.

pub mod action;
pub mod car;
pub mod collision;
pub mod env;
pub mod radar;
pub mod spline;
pub mod track;

pub use action::{ACTION_COUNT, Action, SpeedTier};
pub use car::{AgentState, Car, DeathCause, Direction, InitialPose};
pub use collision::{CollisionPolicy, NearFieldProbe};
pub use env::{
    EnvPhase, Environment, Observation, QuitHandle, RewardFn, StepInfo, StepResult,
    default_reward,
};
pub use radar::{RadarScan, RaySensorArray, radar_angles};
pub use spline::PeriodicSpline;
pub use track::Track;
