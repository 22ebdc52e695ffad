use std::time::Duration;

use glam::UVec2;
use rendgl::types::VsyncMode;

/// Properties of the window's default framebuffer and OpenGL context.
#[derive(Debug, Clone, PartialEq)]
pub struct GlSettings {
    pub double_buffering: bool,
    pub depth_bits: u8,
    pub stencil_bits: u8,
    pub vsync: VsyncMode,
    /// Creates a debug context.
    pub debug: bool,
}

impl Default for GlSettings {
    fn default() -> Self {
        Self {
            double_buffering: true,
            depth_bits: 24,
            stencil_bits: 8,
            vsync: VsyncMode::Adaptive,
            debug: cfg!(debug_assertions),
        }
    }
}

/// Timing and window limits of the frame loop.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameworkSettings {
    /// The window is never allowed to get smaller than this.
    pub min_window_size: UVec2,
    /// Length of every physics step.
    pub physics_time_step: Duration,
    /// More steps than this in one frame and physics starts running in slow motion.
    pub max_physics_steps_per_frame: u32,
    /// Frames faster than this wait for the remaining time. `None` means no cap.
    pub min_frame_time: Option<Duration>,
}

impl Default for FrameworkSettings {
    fn default() -> Self {
        Self {
            min_window_size: UVec2::new(250, 250),
            physics_time_step: Duration::from_millis(20),
            max_physics_steps_per_frame: 10,
            min_frame_time: None,
        }
    }
}
