//! Software rendering
//!
//! Everything is drawn into an in-memory RGBA buffer that radar and collision
//! probes read back from.

pub mod scene;
pub mod shapes;
pub mod surface;

pub use surface::{PixelBuffer, Rgba, Surface};
