//! Pixel-probing radar
//!
//! Each ray marches in unit steps from the car until it lands on the boundary
//! color or reaches its maximum range. No randomness: identical surface,
//! origin and heading give identical readings.

use glam::Vec2;

use crate::error::SensingFailure;
use crate::heading_vector;
use crate::renderer::{Rgba, Surface};

/// `count` angles evenly spaced over `[-spread/2, +spread/2]` degrees
pub fn radar_angles(count: usize, spread: f32) -> Vec<f32> {
    match count {
        0 => Vec::new(),
        1 => vec![0.0],
        _ => {
            let start = -spread / 2.0;
            let step = spread / (count - 1) as f32;
            (0..count).map(|i| start + step * i as f32).collect()
        }
    }
}

/// Readings of one sensing pass
#[derive(Debug, Clone, PartialEq)]
pub struct RadarScan {
    /// Distance per ray, same order as the angles
    pub distances: Vec<f32>,
    /// Where each ray stopped
    pub hit_points: Vec<Vec2>,
}

/// Fixed set of rays cast against a surface
#[derive(Debug, Clone, PartialEq)]
pub struct RaySensorArray {
    pub angles: Vec<f32>,
    pub max_range: u32,
    pub marker: Rgba,
}

impl RaySensorArray {
    pub fn new(count: usize, spread: f32, max_range: u32) -> Self {
        Self {
            angles: radar_angles(count, spread),
            max_range,
            marker: Rgba::BOUNDARY,
        }
    }

    /// Cast every ray. Fails on the first ray that samples off the surface.
    pub fn sense<S: Surface + ?Sized>(
        &self,
        origin: Vec2,
        heading: f32,
        surface: &S,
    ) -> Result<RadarScan, SensingFailure> {
        let mut distances = Vec::with_capacity(self.angles.len());
        let mut hit_points = Vec::with_capacity(self.angles.len());

        for (ray, &offset) in self.angles.iter().enumerate() {
            let (distance, point) = self.cast(ray, origin, heading + offset, surface)?;
            distances.push(distance);
            hit_points.push(point);
        }

        Ok(RadarScan {
            distances,
            hit_points,
        })
    }

    /// March one ray. The reported distance is the march length at the stop point.
    fn cast<S: Surface + ?Sized>(
        &self,
        ray: usize,
        origin: Vec2,
        direction_deg: f32,
        surface: &S,
    ) -> Result<(f32, Vec2), SensingFailure> {
        let dir = heading_vector(direction_deg);
        let mut length = 0;
        loop {
            let point = origin + dir * length as f32;
            let color = surface
                .sample(point)
                .ok_or(SensingFailure { ray, point })?;
            if color == self.marker || length >= self.max_range {
                return Ok((length as f32, point));
            }
            length += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::{PixelBuffer, shapes::fill_circle};

    /// Boundary-colored canvas with a road disc of `radius` at the center
    fn ring_surface(size: u32, radius: f32) -> PixelBuffer {
        let mut buf = PixelBuffer::new(size, size);
        buf.fill(Rgba::BOUNDARY);
        fill_circle(&mut buf, Vec2::splat(size as f32 / 2.0), radius, Rgba::ROAD);
        buf
    }

    #[test]
    fn test_radar_angles_even_spread() {
        assert_eq!(radar_angles(5, 180.0), vec![-90.0, -45.0, 0.0, 45.0, 90.0]);
        assert_eq!(radar_angles(1, 180.0), vec![0.0]);
        assert!(radar_angles(0, 180.0).is_empty());
    }

    #[test]
    fn test_open_interior_reaches_max_range() {
        let surface = ring_surface(600, 280.0);
        let radar = RaySensorArray::new(5, 180.0, 200);
        let scan = radar.sense(Vec2::splat(300.0), 0.0, &surface).unwrap();
        assert_eq!(scan.distances, vec![200.0; 5]);
        // Forward ray stops 200 units ahead
        assert_eq!(scan.hit_points[2], Vec2::new(500.0, 300.0));
    }

    #[test]
    fn test_distances_symmetric_about_forward_axis() {
        let surface = ring_surface(400, 60.0);
        let radar = RaySensorArray::new(5, 180.0, 200);
        let scan = radar.sense(Vec2::splat(200.0), 0.0, &surface).unwrap();
        let d = &scan.distances;
        assert_eq!(d[0], d[4]);
        assert_eq!(d[1], d[3]);
        assert!(d.iter().all(|&x| (x - 60.0).abs() <= 2.0), "{d:?}");
    }

    #[test]
    fn test_stops_on_marker() {
        let mut surface = PixelBuffer::new(100, 100);
        surface.fill(Rgba::ROAD);
        for y in 0..100 {
            surface.set_pixel(70, y, Rgba::BOUNDARY);
        }
        let radar = RaySensorArray::new(1, 0.0, 200);
        let scan = radar.sense(Vec2::new(50.0, 50.0), 0.0, &surface).unwrap();
        assert_eq!(scan.distances, vec![20.0]);
        assert_eq!(scan.hit_points, vec![Vec2::new(70.0, 50.0)]);
    }

    #[test]
    fn test_leaving_surface_is_a_sensing_failure() {
        let mut surface = PixelBuffer::new(100, 100);
        surface.fill(Rgba::ROAD);
        let radar = RaySensorArray::new(3, 180.0, 200);
        let err = radar.sense(Vec2::new(50.0, 50.0), 0.0, &surface).unwrap_err();
        // First ray (-90 deg) points down the screen
        assert_eq!(err.ray, 0);
        assert_eq!(err.point.y.round() as i32, 100);
    }

    #[test]
    fn test_sensing_is_deterministic() {
        let surface = ring_surface(400, 90.0);
        let radar = RaySensorArray::new(7, 150.0, 200);
        let a = radar.sense(Vec2::new(210.0, 185.0), 33.0, &surface).unwrap();
        let b = radar.sense(Vec2::new(210.0, 185.0), 33.0, &surface).unwrap();
        assert_eq!(a, b);
    }
}
