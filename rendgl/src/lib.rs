//! Tracked OpenGL 4.5 render state and bindless texture residency.
//!
//! rendgl mirrors the mutable global state of an OpenGL context so redundant
//! driver calls are skipped, and manages the residency of bindless texture and
//! image handles so a handle is resident exactly while something uses it.
//!
//! # Overview
//!
//! - [`Context`] owns the driver for one thread and exposes a typed setter and
//!   getter for every piece of tracked state in [`RenderState`].
//! - [`Texture`] owns a GPU texture and hands out [`TextureView`]s and
//!   [`ImageView`]s, cached per sampler or image parameters.
//! - [`Driver`] is the seam to the actual API. [`GlowDriver`] talks to OpenGL
//!   through glow and glutin.
//!
//! Everything is single threaded: contexts, textures and views are neither
//! `Send` nor `Sync`.
//!
//! ```ignore
//! let driver = GlowDriver::new(window, &gl_config, false)?;
//! let mut context = Context::new(driver, VsyncMode::Adaptive)?;
//!
//! context.set_depth_test(Some(CompareFunction::Less));
//! context.set_blending(BlendStateRgba::TRANSPARENT);
//!
//! let texture = Texture::new(&context, TextureDescriptor::new_2d(TextureFormat::Rgba8Unorm, 256, 256))?;
//! let view = texture.texture_view(None)?;
//! upload_handle(view.handle());
//! ```

mod backend;
mod context;
mod driver;
mod error;
mod registry;
mod render_state;
mod setup;
mod texture;

pub mod util;

pub use backend::GlowDriver;
pub use context::Context;
pub use driver::{BlendFactors, Capability, Driver, DriverError, DriverInfo, StencilFunc};
pub use error::*;
pub use registry::ContextId;
pub use render_state::RenderState;
pub use setup::{check_extensions, check_version, GLSL_VERSION, OPTIONAL_EXTENSIONS, REQUIRED_EXTENSIONS, REQUIRED_VERSION};
pub use texture::{ImageView, Texture, TextureView};

pub use rendgl_types as types;

/// Reexport of the glutin version rendgl is using.
pub use glutin;
/// Reexport of the winit version rendgl is using.
pub use winit;
pub use glam;
