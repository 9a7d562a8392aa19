//! GPU-compatible type definitions for rendering
//!
//! This module contains the uniform block passed to the WGSL shader every
//! frame. The Rust struct must match the WGSL `FractalUniform` declaration
//! field for field, including the trailing scalar pair that pads the block
//! to a 16 byte multiple.

use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::camera::Camera;

/// Raymarching quality tier
///
/// Selects the step and iteration budgets in the shader. The numeric value
/// is what lands in the uniform buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Quality {
    Low = 0,
    Medium = 1,
    High = 2,
}

impl Quality {
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Human readable label used in log lines
    pub fn label(self) -> &'static str {
        match self {
            Quality::Low => "low",
            Quality::Medium => "medium",
            Quality::High => "high",
        }
    }
}

/// Uniform buffer consumed by the fractal shader
///
/// Carries the inverse projection and view matrices used to unproject each
/// pixel into a world-space ray, the eye position, and the interactive
/// settings. Packing rules:
///
/// - `eye_time` holds the camera position in xyz and seconds since start
///   in w.
/// - `colour_a` holds the first palette colour in rgb and the fractal
///   power exponent in w.
/// - colour channels are normalized to 0..1 before upload.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct FractalUniform {
    /// Inverse projection matrix
    pub proj_inv: [[f32; 4]; 4],
    /// Inverse view matrix
    pub view_inv: [[f32; 4]; 4],
    /// Eye position (xyz) and elapsed time in seconds (w)
    pub eye_time: [f32; 4],
    /// First palette colour (rgb) and fractal power (w)
    pub colour_a: [f32; 4],
    /// Second palette colour (rgb), w unused
    pub colour_b: [f32; 4],
    /// Surface size in pixels
    pub resolution: [f32; 2],
    /// Non-zero when the fractal power oscillates with time
    pub animated: u32,
    /// Quality tier, see [`Quality`]
    pub quality: u32,
}

impl FractalUniform {
    pub fn new() -> Self {
        Self {
            proj_inv: Mat4::IDENTITY.to_cols_array_2d(),
            view_inv: Mat4::IDENTITY.to_cols_array_2d(),
            eye_time: [0.0; 4],
            colour_a: [1.0, 1.0, 1.0, 8.0],
            colour_b: [1.0, 1.0, 1.0, 0.0],
            resolution: [1.0, 1.0],
            animated: 0,
            quality: 0,
        }
    }

    /// Refresh the camera-derived fields from the current camera state
    pub fn update_view(&mut self, camera: &mut Camera, time: f32) {
        self.proj_inv = camera.projection_matrix().inverse().to_cols_array_2d();
        self.view_inv = camera.view_matrix().inverse().to_cols_array_2d();
        self.eye_time = [
            camera.position.x,
            camera.position.y,
            camera.position.z,
            time,
        ];
    }

    pub fn set_resolution(&mut self, width: u32, height: u32) {
        self.resolution = [width as f32, height as f32];
    }

    pub fn set_colours(&mut self, colour_a: [f32; 3], colour_b: [f32; 3]) {
        self.colour_a[..3].copy_from_slice(&colour_a);
        self.colour_b[..3].copy_from_slice(&colour_b);
    }

    pub fn set_power(&mut self, power: f32) {
        self.colour_a[3] = power;
    }
}

impl Default for FractalUniform {
    fn default() -> Self {
        Self::new()
    }
}
