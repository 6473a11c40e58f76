//! Animated image planes: flipbook quads placed in the world.
//!
//! These are definitions only. Advancing frames and drawing is the
//! renderer's business; the document records what to play and where.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::scene::Point;

/// A textured quad cycling through an ordered list of image frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimatedPlane {
    pub position: Point,
    pub width: f32,
    pub height: f32,
    /// Seconds per frame.
    pub frame_time: f32,
    pub playing: bool,
    /// Faces the camera when set; otherwise a fixed world-space quad.
    pub billboard: bool,
    /// Frame image paths, in playback order.
    pub frames: Vec<PathBuf>,
}

impl AnimatedPlane {
    pub fn new(position: Point, width: f32, height: f32) -> Self {
        AnimatedPlane {
            position,
            width,
            height,
            frame_time: 0.1,
            playing: true,
            billboard: false,
            frames: Vec::new(),
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Length of one full cycle in seconds.
    pub fn cycle_duration(&self) -> f32 {
        self.frame_time * self.frames.len() as f32
    }
}
