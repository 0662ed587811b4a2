//! Pixel surface the scene is drawn on and probed against
//!
//! The simulation depends on two contracts only: writing pixels (drawing) and
//! reading a pixel color back (radar and collision probes).

use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An RGBA color, laid out as four bytes
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);

    /// Off-track grass; rays stop on this color
    pub const BOUNDARY: Rgba = Rgba::rgb(173, 255, 133);
    /// Drivable road surface
    pub const ROAD: Rgba = Rgba::rgb(150, 150, 150);
    /// Thin dark rim drawn around the road
    pub const ROAD_EDGE: Rgba = Rgba::BLACK;
    pub const ANCHOR: Rgba = Rgba::BLACK;
    pub const START_MARKER: Rgba = Rgba::rgb(150, 255, 50);
    pub const RADAR_RAY: Rgba = Rgba::WHITE;
    pub const RADAR_HIT: Rgba = Rgba::rgb(0, 255, 0);
}

/// Read/write pixel access
pub trait Surface {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Color at (x, y), `None` outside the addressable area
    fn get_pixel(&self, x: i32, y: i32) -> Option<Rgba>;

    /// Write a pixel; writes outside the surface are clipped
    fn set_pixel(&mut self, x: i32, y: i32, color: Rgba);

    fn fill(&mut self, color: Rgba) {
        for y in 0..self.height() as i32 {
            for x in 0..self.width() as i32 {
                self.set_pixel(x, y, color);
            }
        }
    }

    /// Color at the pixel nearest to a continuous point
    fn sample(&self, p: Vec2) -> Option<Rgba> {
        self.get_pixel(p.x.round() as i32, p.y.round() as i32)
    }

    fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as u32) < self.width() && (y as u32) < self.height()
    }
}

/// Row-major in-memory RGBA buffer
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Rgba::BLACK; width as usize * height as usize],
        }
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Raw RGBA bytes, row-major
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Packed RGB bytes, row-major (alpha dropped)
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.as_bytes()
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect()
    }

    /// Copy another buffer of the same size over this one
    pub fn copy_from(&mut self, other: &PixelBuffer) {
        if self.width == other.width && self.height == other.height {
            self.pixels.copy_from_slice(&other.pixels);
        } else {
            *self = other.clone();
        }
    }

    #[inline]
    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if self.contains(x, y) {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }
}

impl Surface for PixelBuffer {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn get_pixel(&self, x: i32, y: i32) -> Option<Rgba> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    fn set_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    fn fill(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }
}
