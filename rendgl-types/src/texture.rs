use std::num::NonZeroU32;

use glam::UVec3;
use thiserror::Error;

use crate::CompareFunction;

/// Dimensionality and layout of a texture.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TextureType {
    D1,
    D2,
    D3,
    Cube,
    D1Array,
    D2Array,
    CubeArray,
}

impl TextureType {
    /// Whether the texture has array layers (cube faces count as layers).
    pub const fn is_layered(self) -> bool {
        !matches!(self, Self::D1 | Self::D2)
    }

    /// Number of layers a texture of this type and size has.
    pub fn layer_count(self, size: UVec3) -> u32 {
        match self {
            Self::D1 | Self::D2 => 1,
            Self::D3 => size.z,
            Self::Cube => 6,
            Self::D1Array => size.y,
            Self::D2Array => size.z,
            Self::CubeArray => size.z * 6,
        }
    }

    /// The dimensions which are actually pixels, as opposed to layers.
    pub fn pixel_size(self, size: UVec3) -> UVec3 {
        match self {
            Self::D1 | Self::D1Array => UVec3::new(size.x, 1, 1),
            Self::D2 | Self::Cube | Self::D2Array | Self::CubeArray => UVec3::new(size.x, size.y, 1),
            Self::D3 => size,
        }
    }
}

/// Sized internal format of a texture.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    R8Unorm,
    Rg8Unorm,
    Rgba8Unorm,
    Rgba8UnormSrgb,
    R16Float,
    Rg16Float,
    Rgba16Float,
    R32Float,
    Rg32Float,
    Rgba32Float,
    R32Uint,
    R32Sint,
    Rgba32Uint,
    Rgba32Sint,
    Rgb10A2Unorm,
    Rg11B10Float,
    Depth16Unorm,
    Depth24Plus,
    Depth32Float,
    Depth24PlusStencil8,
    Depth32FloatStencil8,
    Stencil8,
    Bc1RgbaUnorm,
    Bc3RgbaUnorm,
    Bc7RgbaUnorm,
}

impl TextureFormat {
    pub const fn is_compressed(self) -> bool {
        matches!(self, Self::Bc1RgbaUnorm | Self::Bc3RgbaUnorm | Self::Bc7RgbaUnorm)
    }

    pub const fn has_depth(self) -> bool {
        matches!(
            self,
            Self::Depth16Unorm
                | Self::Depth24Plus
                | Self::Depth32Float
                | Self::Depth24PlusStencil8
                | Self::Depth32FloatStencil8
        )
    }

    pub const fn has_stencil(self) -> bool {
        matches!(self, Self::Depth24PlusStencil8 | Self::Depth32FloatStencil8 | Self::Stencil8)
    }

    pub const fn is_depth_stencil(self) -> bool {
        self.has_depth() || self.has_stencil()
    }

    pub const fn is_integer(self) -> bool {
        matches!(self, Self::R32Uint | Self::R32Sint | Self::Rgba32Uint | Self::Rgba32Sint)
    }

    /// Whether shaders can load/store this format through an image view.
    pub const fn supports_image_access(self) -> bool {
        !(self.is_compressed() || self.is_depth_stencil() || matches!(self, Self::Rgba8UnormSrgb))
    }
}

/// The count of mipmap levels a texture should have.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MipmapCount {
    /// Specifies a texture with the given mipmap count. Must not be greater
    /// than the maximum.
    Specific(NonZeroU32),
    /// Specifies a texture with the maximum mipmap count.
    Maximum,
}

impl MipmapCount {
    pub const ONE: Self = Self::Specific(match NonZeroU32::new(1) {
        Some(one) => one,
        None => unreachable!(),
    });

    /// Largest mip count for a texture with the given pixel size.
    pub fn max_for(pixel_size: UVec3) -> u32 {
        32 - pixel_size.max_element().max(1).leading_zeros()
    }
}

/// How a sampler treats coordinates outside of `[0, 1]`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum WrapMode {
    #[default]
    Repeat,
    MirroredRepeat,
    ClampToEdge,
    MirrorClampToEdge,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum PixelFilter {
    Nearest,
    #[default]
    Linear,
}

/// Sampling configuration for a texture.
///
/// Hashable so that it can key the texture's view cache.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Sampler {
    /// Wrap mode per axis (S, T, R).
    pub wrapping: [WrapMode; 3],
    pub pixel_filter: PixelFilter,
    /// `None` disables mipmapping.
    pub mip_filter: Option<PixelFilter>,
    /// Turns the sampler into a shadow sampler comparing against the reference value.
    pub depth_comparison: Option<CompareFunction>,
    /// Maximum anisotropic filtering level; 1 disables it.
    pub max_anisotropy: u8,
}

impl Sampler {
    pub const fn new(wrap: WrapMode, filter: PixelFilter) -> Self {
        Self {
            wrapping: [wrap; 3],
            pixel_filter: filter,
            mip_filter: Some(filter),
            depth_comparison: None,
            max_anisotropy: 1,
        }
    }

    /// Nearest filtering with no mipmapping, the usual choice for integer and data textures.
    pub const NEAREST_CLAMPED: Self = Self {
        wrapping: [WrapMode::ClampToEdge; 3],
        pixel_filter: PixelFilter::Nearest,
        mip_filter: None,
        depth_comparison: None,
        max_anisotropy: 1,
    };

    /// Checks that a texture of the given format can be sampled this way.
    pub fn validate_for(&self, format: TextureFormat) -> Result<(), SamplerFormatError> {
        if self.depth_comparison.is_some() && !format.has_depth() {
            return Err(SamplerFormatError::ComparisonOnColor { format });
        }
        let linear = self.pixel_filter == PixelFilter::Linear || self.mip_filter == Some(PixelFilter::Linear);
        if linear && (format.is_integer() || format == TextureFormat::Stencil8) {
            return Err(SamplerFormatError::LinearOnInteger { format });
        }
        if self.max_anisotropy == 0 {
            return Err(SamplerFormatError::ZeroAnisotropy);
        }
        Ok(())
    }
}

impl Default for Sampler {
    fn default() -> Self {
        Self::new(WrapMode::Repeat, PixelFilter::Linear)
    }
}

/// Reason a sampler can't be used with a texture format.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SamplerFormatError {
    #[error("Depth comparison sampling requires a depth format, {format:?} has none")]
    ComparisonOnColor { format: TextureFormat },
    #[error("Format {format:?} can't be sampled with linear filtering")]
    LinearOnInteger { format: TextureFormat },
    #[error("Anisotropy level must be at least 1")]
    ZeroAnisotropy,
}

/// Everything needed to allocate a texture's storage.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureDescriptor {
    pub label: Option<String>,
    pub ty: TextureType,
    pub format: TextureFormat,
    /// Width, height, depth (or layer count for array textures). Unused axes should be 1.
    pub size: UVec3,
    pub mip_count: MipmapCount,
    /// Default sampling configuration, used by views that don't ask for a custom one.
    pub sampler: Sampler,
}

impl TextureDescriptor {
    /// Shorthand for a plain 2D texture.
    pub fn new_2d(format: TextureFormat, width: u32, height: u32) -> Self {
        Self {
            label: None,
            ty: TextureType::D2,
            format,
            size: UVec3::new(width, height, 1),
            mip_count: MipmapCount::ONE,
            sampler: Sampler::default(),
        }
    }

    pub fn with_mips(mut self, mip_count: MipmapCount) -> Self {
        self.mip_count = mip_count;
        self
    }

    pub fn with_sampler(mut self, sampler: Sampler) -> Self {
        self.sampler = sampler;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn max_mip_levels(&self) -> u32 {
        MipmapCount::max_for(self.ty.pixel_size(self.size))
    }

    /// Resolved mip level count.
    pub fn mip_levels(&self) -> u32 {
        match self.mip_count {
            MipmapCount::Specific(count) => count.get(),
            MipmapCount::Maximum => self.max_mip_levels(),
        }
    }

    pub fn layer_count(&self) -> u32 {
        self.ty.layer_count(self.size)
    }
}

/// How a shader may touch an image view.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ImageAccess {
    Read,
    Write,
    ReadWrite,
}

/// Parameters identifying one image (load/store) view of a texture.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ImageViewKey {
    /// Zero-based mip level.
    pub mip_level: u32,
    /// `None` exposes every layer, `Some(i)` only layer `i`.
    pub single_layer: Option<u32>,
    pub access: ImageAccess,
    /// Format the shader sees the texels as.
    pub format: TextureFormat,
}

impl ImageViewKey {
    pub fn handle_key(&self) -> ImageHandleKey {
        ImageHandleKey {
            mip_level: self.mip_level,
            single_layer: self.single_layer,
            format: self.format,
        }
    }
}

/// Parameters the driver hands out one image handle for. The access mode is only
/// given when the handle is made resident, so it is not part of the key.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ImageHandleKey {
    pub mip_level: u32,
    pub single_layer: Option<u32>,
    pub format: TextureFormat,
}

/// How a bindless handle is made resident.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ViewUsage {
    Sampled,
    Image(ImageAccess),
}

/// Key of a texture's view cache, one entry per driver handle.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ViewKey {
    Sampled(Sampler),
    Image(ImageHandleKey),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maximum_mips() {
        assert_eq!(MipmapCount::max_for(UVec3::new(1, 1, 1)), 1);
        assert_eq!(MipmapCount::max_for(UVec3::new(256, 16, 1)), 9);
        assert_eq!(MipmapCount::max_for(UVec3::new(300, 1, 1)), 9);

        let desc = TextureDescriptor::new_2d(TextureFormat::Rgba8Unorm, 64, 32).with_mips(MipmapCount::Maximum);
        assert_eq!(desc.mip_levels(), 7);
    }

    #[test]
    fn layers_do_not_count_towards_mips() {
        let desc = TextureDescriptor {
            ty: TextureType::D2Array,
            size: UVec3::new(4, 4, 512),
            mip_count: MipmapCount::Maximum,
            ..TextureDescriptor::new_2d(TextureFormat::R8Unorm, 4, 4)
        };
        assert_eq!(desc.mip_levels(), 3);
        assert_eq!(desc.layer_count(), 512);
    }

    #[test]
    fn sampler_validation() {
        let shadow = Sampler {
            depth_comparison: Some(CompareFunction::LessOrEqual),
            ..Sampler::default()
        };
        assert_eq!(shadow.validate_for(TextureFormat::Depth32Float), Ok(()));
        assert_eq!(
            shadow.validate_for(TextureFormat::Rgba8Unorm),
            Err(SamplerFormatError::ComparisonOnColor {
                format: TextureFormat::Rgba8Unorm
            })
        );
        assert!(Sampler::default().validate_for(TextureFormat::R32Uint).is_err());
        assert_eq!(Sampler::NEAREST_CLAMPED.validate_for(TextureFormat::R32Uint), Ok(()));
    }

    #[test]
    fn image_access_formats() {
        assert!(TextureFormat::Rgba16Float.supports_image_access());
        assert!(!TextureFormat::Depth32Float.supports_image_access());
        assert!(!TextureFormat::Bc7RgbaUnorm.supports_image_access());
    }
}
