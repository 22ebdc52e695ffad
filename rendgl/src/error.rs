use rendgl_types::{ImageAccess, SamplerFormatError, TextureFormat, TextureType, ViewUsage, VsyncMode};
use thiserror::Error;

use crate::{ContextId, DriverError};

/// Reason why a context failed to be created.
#[derive(Error, Debug)]
pub enum ContextCreationError {
    #[error("This thread already owns context {existing:?}")]
    AlreadyExists { existing: ContextId },
    #[error("Driver supports OpenGL {}.{} but at least {}.{} is required", found.0, found.1, required.0, required.1)]
    UnsupportedVersion { found: (u32, u32), required: (u32, u32) },
    #[error("Driver is missing required extensions: {extensions:?}")]
    MissingExtensions { extensions: Vec<&'static str> },
    #[error("Could not set vsync mode {mode:?}")]
    Vsync {
        mode: VsyncMode,
        #[source]
        source: DriverError,
    },
    #[error("Window system failed to create the OpenGL context")]
    Platform(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Reason why a texture could not be created.
#[derive(Error, Debug)]
pub enum TextureCreationError {
    #[error("Texture size {size:?} has a zero sized dimension")]
    ZeroSize { size: glam::UVec3 },
    #[error("Requested {requested} mip levels but a texture of this size has at most {max}")]
    TooManyMips { requested: u32, max: u32 },
    #[error("Format {format:?} can't be used for {ty:?} textures")]
    IncompatibleFormat { ty: TextureType, format: TextureFormat },
    #[error("Cube textures must be square, got {width}x{height}")]
    NonSquareCube { width: u32, height: u32 },
    #[error("Default sampler is not valid for this texture")]
    Sampler(#[from] SamplerFormatError),
    #[error("Driver failed to create the texture")]
    Driver(#[from] DriverError),
}

/// Reason why a view of a texture could not be created.
#[derive(Error, Debug)]
pub enum ViewError {
    #[error("Mip level {level} is out of range, texture has {count} levels")]
    MipOutOfRange { level: u32, count: u32 },
    #[error("Layer {layer} is out of range, texture has {count} layers")]
    LayerOutOfRange { layer: u32, count: u32 },
    #[error("Format {format:?} can't be used for {access:?} image access")]
    UnsupportedImageFormat { format: TextureFormat, access: ImageAccess },
    #[error("Image handle is held with {resident:?}, can't hand out a view with {requested:?} access")]
    AccessConflict { requested: ImageAccess, resident: ViewUsage },
    #[error("Sampler is not valid for this texture")]
    Sampler(#[from] SamplerFormatError),
    #[error("Driver failed to create the view")]
    Driver(#[from] DriverError),
}

/// Reason why an operation on an existing texture failed.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Mipmaps of compressed format {format:?} can't be generated")]
    CompressedMipmaps { format: TextureFormat },
}
