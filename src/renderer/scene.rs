//! Scene drawing: track layer, car bodies, radar overlays

use super::shapes::{draw_line, fill_circle, fill_convex_polygon};
use super::surface::{Rgba, Surface};
use crate::consts::{ROAD_EDGE_RADIUS, ROAD_RADIUS};
use crate::sim::{Car, Track};

/// Grass everywhere, then the road stamped along the boundary path
pub fn draw_track<S: Surface + ?Sized>(surface: &mut S, track: &Track) {
    surface.fill(Rgba::BOUNDARY);

    for &p in &track.boundary_path {
        fill_circle(surface, p, ROAD_EDGE_RADIUS, Rgba::ROAD_EDGE);
    }
    for &p in &track.boundary_path {
        fill_circle(surface, p, ROAD_RADIUS, Rgba::ROAD);
    }
    for &p in &track.anchor_path {
        fill_circle(surface, p, 2.0, Rgba::ANCHOR);
    }

    // Start line: first two anchors
    if let [a, b, ..] = track.anchor_path.as_slice() {
        fill_circle(surface, *a, 5.0, Rgba::START_MARKER);
        fill_circle(surface, *b, 5.0, Rgba::START_MARKER);
    }
}

/// Car body as a rotated rectangle
pub fn draw_car<S: Surface + ?Sized>(surface: &mut S, car: &Car) {
    fill_convex_polygon(surface, &car.body_corners(), car.color);
}

/// Rays from the car to where each one stopped
pub fn draw_radar<S: Surface + ?Sized>(surface: &mut S, car: &Car) {
    for &hit in &car.radar_hits {
        draw_line(surface, car.position, hit, Rgba::RADAR_RAY);
        fill_circle(surface, hit, 3.0, Rgba::RADAR_HIT);
    }
}
