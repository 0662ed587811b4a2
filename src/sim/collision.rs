//! Off-track detection
//!
//! Two independent checks, either one kills the agent:
//! - boxed in: the two extreme flank radars both read below a threshold
//! - out of bounds: the position left the canvas rectangle
//!
//! Optional near-field probes look for the boundary color just ahead of the car.

use glam::Vec2;

use super::car::DeathCause;
use crate::heading_vector;
use crate::renderer::{Rgba, Surface};
use crate::settings::CollisionSettings;

#[derive(Debug, Clone, PartialEq)]
pub struct CollisionPolicy {
    pub lateral_threshold: f32,
    /// Canvas size (width, height)
    pub bounds: Vec2,
    pub near_field: Option<NearFieldProbe>,
}

impl CollisionPolicy {
    pub fn new(settings: &CollisionSettings, canvas: (u32, u32)) -> Self {
        Self {
            lateral_threshold: settings.lateral_threshold,
            bounds: Vec2::new(canvas.0 as f32, canvas.1 as f32),
            near_field: settings.near_field_probe.then(|| NearFieldProbe {
                angle: settings.probe_angle,
                length: settings.probe_length,
                marker: Rgba::BOUNDARY,
            }),
        }
    }

    /// `None` while alive, otherwise the first failing check
    pub fn evaluate(&self, radar_distances: &[f32], position: Vec2) -> Option<DeathCause> {
        if self.is_boxed_in(radar_distances) {
            return Some(DeathCause::BoxedIn);
        }
        if !self.in_bounds(position) {
            return Some(DeathCause::OutOfBounds);
        }
        None
    }

    fn is_boxed_in(&self, radar_distances: &[f32]) -> bool {
        match (radar_distances.first(), radar_distances.last()) {
            (Some(&first), Some(&last)) => {
                first < self.lateral_threshold && last < self.lateral_threshold
            }
            _ => false,
        }
    }

    fn in_bounds(&self, position: Vec2) -> bool {
        position.x >= 0.0
            && position.y >= 0.0
            && position.x <= self.bounds.x
            && position.y <= self.bounds.y
    }
}

/// Two probe points at heading ± angle, `length` units out
#[derive(Debug, Clone, PartialEq)]
pub struct NearFieldProbe {
    pub angle: f32,
    pub length: f32,
    pub marker: Rgba,
}

impl NearFieldProbe {
    pub fn points(&self, position: Vec2, heading: f32) -> [Vec2; 2] {
        [
            position + heading_vector(heading + self.angle) * self.length,
            position + heading_vector(heading - self.angle) * self.length,
        ]
    }

    /// True when a probe lands on the boundary or off the surface
    pub fn touches<S: Surface + ?Sized>(&self, surface: &S, position: Vec2, heading: f32) -> bool {
        self.points(position, heading)
            .iter()
            .any(|&p| surface.sample(p).is_none_or(|c| c == self.marker))
    }
}
