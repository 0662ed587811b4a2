//! Procedural closed-loop track
//!
//! A handful of seeded random control points are ordered by angle around
//! their centroid (a simple polygon, no bow-ties), a periodic spline is fitted
//! through them and sampled twice: a dense boundary path for drawing and a
//! coarse anchor path for placement and progress.

use glam::{DVec2, Vec2};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::spline::PeriodicSpline;
use crate::consts::*;
use crate::error::GenerationError;
use crate::heading_of;

/// Immutable track produced by `Track::generate`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub seed: u64,
    pub complexity: usize,
    /// Canvas the paths were fitted to (width, height)
    pub canvas: (u32, u32),
    /// Dense closed loop, drawn and collided against
    pub boundary_path: Vec<Vec2>,
    /// Coarse closed loop, used for start pose and progress
    pub anchor_path: Vec<Vec2>,
}

impl Track {
    /// Generate a track. Same arguments, same bits.
    pub fn generate(seed: u64, complexity: usize, canvas: (u32, u32)) -> Result<Self, GenerationError> {
        if complexity < MIN_TRACK_POINTS {
            return Err(GenerationError::TooFewPoints {
                got: complexity,
                min: MIN_TRACK_POINTS,
            });
        }

        let points = sort_by_angle(random_points(seed, complexity, canvas));
        let spline = PeriodicSpline::fit(&points, MIN_TRACK_POINTS)?;

        let boundary = spline.sample(BOUNDARY_SAMPLES);
        let anchors = spline.sample(ANCHOR_SAMPLES);
        // The dense path decides the shift; anchors move with it
        let shift = edge_shift(&boundary);
        let boundary: Vec<DVec2> = boundary.into_iter().map(|p| p + shift).collect();
        let anchors: Vec<DVec2> = anchors.into_iter().map(|p| p + shift).collect();

        // One transform for both paths so anchors sit on the drawn road
        let fit = CanvasFit::new(&boundary, canvas);
        let boundary_path = boundary.iter().map(|&p| fit.apply(p)).collect();
        let anchor_path = anchors.iter().map(|&p| fit.apply(p)).collect();

        log::info!(
            "Generated track seed={} complexity={} ({} boundary / {} anchor samples)",
            seed,
            complexity,
            BOUNDARY_SAMPLES,
            ANCHOR_SAMPLES
        );

        Ok(Self {
            seed,
            complexity,
            canvas,
            boundary_path,
            anchor_path,
        })
    }

    /// Start position and heading (degrees): first anchor, facing the second
    pub fn start_pose(&self) -> (Vec2, f32) {
        match self.anchor_path.as_slice() {
            [a, b, ..] => (*a, heading_of(*b - *a)),
            [a] => (*a, 0.0),
            [] => (Vec2::ZERO, 0.0),
        }
    }

    /// Index of the anchor closest to `position`
    pub fn nearest_anchor(&self, position: Vec2) -> Option<usize> {
        self.anchor_path
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                a.distance_squared(position)
                    .partial_cmp(&b.distance_squared(position))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i)
    }

    /// Fraction of the loop covered at `position`, in [0, 1)
    pub fn progress(&self, position: Vec2) -> f32 {
        // Last anchor duplicates the first (closed sampling)
        let laps = self.anchor_path.len().saturating_sub(1).max(1);
        self.nearest_anchor(position)
            .map(|i| (i % laps) as f32 / laps as f32)
            .unwrap_or(0.0)
    }
}

/// Uniform integer-valued points inside the working rectangle
fn random_points(seed: u64, count: usize, canvas: (u32, u32)) -> Vec<DVec2> {
    let mut rng = Pcg32::seed_from_u64(seed);
    // Working rectangle leaves room for the road width around the curve
    let x_max = (canvas.0 as f64 - 100.0).max(2.0);
    let y_max = (canvas.1 as f64 - 100.0).max(2.0);

    (0..count)
        .map(|_| {
            let x = rng.random_range(1.0..x_max).trunc();
            let y = rng.random_range(1.0..y_max).trunc();
            DVec2::new(x, y)
        })
        .collect()
}

fn centroid(points: &[DVec2]) -> DVec2 {
    points.iter().copied().sum::<DVec2>() / points.len() as f64
}

/// Order points by their angle around the centroid (ascending)
fn sort_by_angle(mut points: Vec<DVec2>) -> Vec<DVec2> {
    let c = centroid(&points);
    points.sort_by(|a, b| {
        let ta = (a.y - c.y).atan2(a.x - c.x);
        let tb = (b.y - c.y).atan2(b.x - c.x);
        ta.total_cmp(&tb)
    });
    points
}

/// Offset that pushes each axis clear of the canvas edge when the curve dips below it
fn edge_shift(samples: &[DVec2]) -> DVec2 {
    let min = samples
        .iter()
        .fold(DVec2::splat(f64::MAX), |acc, &p| acc.min(p));
    DVec2::new(
        if min.x < EDGE_CLIP_LIMIT { min.x.abs() + EDGE_SHIFT } else { 0.0 },
        if min.y < EDGE_CLIP_LIMIT { min.y.abs() + EDGE_SHIFT } else { 0.0 },
    )
}

/// Centers a path's bounding box in the canvas, shrinking it if it overflows
struct CanvasFit {
    min: DVec2,
    scale: f64,
    offset: DVec2,
}

impl CanvasFit {
    fn new(path: &[DVec2], canvas: (u32, u32)) -> Self {
        let (min, max) = path.iter().fold(
            (DVec2::splat(f64::MAX), DVec2::splat(f64::MIN)),
            |(lo, hi), &p| (lo.min(p), hi.max(p)),
        );
        let extent = max - min;
        let canvas = DVec2::new(canvas.0 as f64, canvas.1 as f64);
        let margin = 2.0 * ROAD_EDGE_RADIUS as f64;
        let room = (canvas - DVec2::splat(2.0 * margin)).max(DVec2::ONE);

        let scale = (room.x / extent.x.max(1e-9))
            .min(room.y / extent.y.max(1e-9))
            .min(1.0);
        let fitted = extent * scale;
        let offset = (canvas / 2.0).floor() - (fitted / 2.0).floor();

        Self { min, scale, offset }
    }

    fn apply(&self, p: DVec2) -> Vec2 {
        ((p - self.min) * self.scale + self.offset).as_vec2()
    }
}
