//! The seam between the tracked state and the actual graphics driver.
//!
//! Everything above this module talks to the driver exclusively through the
//! [`Driver`] trait. [`GlowDriver`](crate::GlowDriver) implements it on top of a
//! real OpenGL context, the test crate implements it with a recording mock.

use glam::{BVec4, Vec4};
use rendgl_types::{
    BlendFactor, BlendOperation, CompareFunction, Face, Sampler, SamplerHandle, StencilResult,
    TextureDescriptor, TextureFormat, TextureHandle, TextureType, ViewHandle, ViewUsage, VsyncMode,
};
use thiserror::Error;

use crate::util::typedefs::FastHashSet;

/// Version and capabilities reported by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverInfo {
    /// API version as (major, minor).
    pub version: (u32, u32),
    pub vendor: String,
    pub renderer: String,
    pub extensions: FastHashSet<String>,
}

impl DriverInfo {
    pub fn supports_extension(&self, name: &str) -> bool {
        self.extensions.contains(name)
    }
}

/// Fixed-function capabilities toggled with enable/disable.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Capability {
    CullFace,
    DepthTest,
    ScissorTest,
    Blend,
    StencilTest,
}

/// Source and destination factors for color and alpha.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct BlendFactors {
    pub src_rgb: BlendFactor,
    pub dest_rgb: BlendFactor,
    pub src_alpha: BlendFactor,
    pub dest_alpha: BlendFactor,
}

/// Stencil function as the driver stores it for one face.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct StencilFunc {
    pub func: CompareFunction,
    pub reference: i32,
    pub read_mask: u32,
}

/// Failure reported by the driver itself.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Driver does not support vsync mode {0:?}")]
    UnsupportedVsync(VsyncMode),
    #[error("Failed to set the swap interval")]
    SwapInterval(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("Failed to present the frame")]
    SwapBuffers(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("Driver failed to create {kind}: {message}")]
    ObjectCreation { kind: &'static str, message: String },
    #[error("Required function {0} could not be loaded")]
    MissingFunction(&'static str),
}

/// Raw access to the global state and objects of one graphics context.
///
/// Every call goes straight to the driver; no caching happens at this level.
/// The face argument of the stencil functions may be [`Face::FrontAndBack`] for
/// setters, getters only accept a single face.
pub trait Driver {
    fn info(&self) -> DriverInfo;

    fn set_swap_interval(&self, mode: VsyncMode) -> Result<(), DriverError>;

    fn set_capability(&self, capability: Capability, enabled: bool);
    fn capability(&self, capability: Capability) -> bool;

    fn set_color_mask(&self, mask: BVec4);
    fn color_mask(&self) -> BVec4;

    fn set_depth_mask(&self, write: bool);
    fn depth_mask(&self) -> bool;

    /// Only [`Face::Front`] and [`Face::Back`] are meaningful here.
    fn set_cull_face(&self, face: Face);
    fn cull_face(&self) -> Face;

    fn set_depth_func(&self, func: CompareFunction);
    fn depth_func(&self) -> CompareFunction;

    /// `[x, y, width, height]`
    fn set_viewport(&self, rect: [i32; 4]);
    fn viewport(&self) -> [i32; 4];

    /// `[x, y, width, height]`
    fn set_scissor(&self, rect: [i32; 4]);
    fn scissor(&self) -> [i32; 4];

    fn set_blend_func(&self, factors: BlendFactors);
    fn blend_func(&self) -> BlendFactors;

    fn set_blend_equation(&self, rgb: BlendOperation, alpha: BlendOperation);
    fn blend_equation(&self) -> (BlendOperation, BlendOperation);

    fn set_blend_color(&self, color: Vec4);
    fn blend_color(&self) -> Vec4;

    fn set_stencil_func(&self, face: Face, func: StencilFunc);
    fn stencil_func(&self, face: Face) -> StencilFunc;

    fn set_stencil_op(&self, face: Face, result: StencilResult);
    fn stencil_op(&self, face: Face) -> StencilResult;

    fn set_stencil_write_mask(&self, face: Face, mask: u32);
    fn stencil_write_mask(&self, face: Face) -> u32;

    /// Clears the bound framebuffer. `None` leaves that buffer alone.
    fn clear(&self, color: Option<Vec4>, depth: Option<f32>);

    /// Allocates immutable storage for a texture with `mip_levels` levels.
    fn create_texture(&self, desc: &TextureDescriptor, mip_levels: u32) -> Result<TextureHandle, DriverError>;
    fn delete_texture(&self, texture: TextureHandle);
    /// Stores sampling parameters on the texture object itself.
    fn apply_texture_sampler(&self, texture: TextureHandle, ty: TextureType, sampler: &Sampler);
    fn generate_mipmaps(&self, texture: TextureHandle, ty: TextureType);

    fn create_sampler(&self, sampler: &Sampler) -> Result<SamplerHandle, DriverError>;
    fn delete_sampler(&self, sampler: SamplerHandle);

    /// Bindless handle for sampling the texture, optionally through a separate sampler object.
    fn texture_view_handle(&self, texture: TextureHandle, sampler: Option<SamplerHandle>) -> ViewHandle;
    /// Bindless handle for image load/store. `layer` of `None` binds every layer.
    fn image_view_handle(
        &self,
        texture: TextureHandle,
        level: u32,
        layer: Option<u32>,
        format: TextureFormat,
    ) -> ViewHandle;

    fn make_resident(&self, view: ViewHandle, usage: ViewUsage);
    fn make_non_resident(&self, view: ViewHandle, usage: ViewUsage);
    fn is_resident(&self, view: ViewHandle, usage: ViewUsage) -> bool;
}

