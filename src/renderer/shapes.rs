//! Rasterization of 2D primitives onto a surface

use glam::Vec2;

use super::surface::{Rgba, Surface};

/// Filled disc centered at `center`
pub fn fill_circle<S: Surface + ?Sized>(surface: &mut S, center: Vec2, radius: f32, color: Rgba) {
    if radius <= 0.0 {
        return;
    }
    let r2 = radius * radius;
    let x0 = (center.x - radius).floor() as i32;
    let x1 = (center.x + radius).ceil() as i32;
    let y0 = (center.y - radius).floor() as i32;
    let y1 = (center.y + radius).ceil() as i32;

    for y in y0.max(0)..=y1.min(surface.height() as i32 - 1) {
        let dy = y as f32 - center.y;
        for x in x0.max(0)..=x1.min(surface.width() as i32 - 1) {
            let dx = x as f32 - center.x;
            if dx * dx + dy * dy <= r2 {
                surface.set_pixel(x, y, color);
            }
        }
    }
}

/// One-pixel line between two points (Bresenham)
pub fn draw_line<S: Surface + ?Sized>(surface: &mut S, from: Vec2, to: Vec2, color: Rgba) {
    let (mut x, mut y) = (from.x.round() as i32, from.y.round() as i32);
    let (x_end, y_end) = (to.x.round() as i32, to.y.round() as i32);

    let dx = (x_end - x).abs();
    let dy = -(y_end - y).abs();
    let sx = if x < x_end { 1 } else { -1 };
    let sy = if y < y_end { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        surface.set_pixel(x, y, color);
        if x == x_end && y == y_end {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

/// Filled convex polygon (vertices in either winding order)
pub fn fill_convex_polygon<S: Surface + ?Sized>(surface: &mut S, vertices: &[Vec2], color: Rgba) {
    if vertices.len() < 3 {
        return;
    }
    let (min, max) = vertices
        .iter()
        .fold((Vec2::splat(f32::MAX), Vec2::splat(f32::MIN)), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    let x0 = (min.x.floor() as i32).max(0);
    let x1 = (max.x.ceil() as i32).min(surface.width() as i32 - 1);
    let y0 = (min.y.floor() as i32).max(0);
    let y1 = (max.y.ceil() as i32).min(surface.height() as i32 - 1);

    for y in y0..=y1 {
        for x in x0..=x1 {
            if convex_contains(vertices, Vec2::new(x as f32, y as f32)) {
                surface.set_pixel(x, y, color);
            }
        }
    }
}

/// Point-in-convex-polygon: the point sits on the same side of every edge
fn convex_contains(vertices: &[Vec2], p: Vec2) -> bool {
    let mut sign = 0.0_f32;
    for (i, &a) in vertices.iter().enumerate() {
        let b = vertices[(i + 1) % vertices.len()];
        let cross = (b - a).perp_dot(p - a);
        if cross.abs() <= f32::EPSILON {
            continue;
        }
        if sign == 0.0 {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    true
}
