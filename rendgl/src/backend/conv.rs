//! Mapping between rendgl's types and OpenGL enums.

use rendgl_types::{
    BlendFactor, BlendOperation, CompareFunction, Face, ImageAccess, PixelFilter, StencilOp, TextureFormat,
    TextureType, WrapMode,
};

use crate::Capability;

// Not every glow version carries the extension enums.
const COMPRESSED_RGBA_S3TC_DXT1_EXT: u32 = 0x83F1;
const COMPRESSED_RGBA_S3TC_DXT5_EXT: u32 = 0x83F3;
const COMPRESSED_RGBA_BPTC_UNORM: u32 = 0x8E8C;
const MIRROR_CLAMP_TO_EDGE: u32 = 0x8743;
pub(crate) const TEXTURE_MAX_ANISOTROPY: u32 = 0x84FE;

pub(crate) fn capability(capability: Capability) -> u32 {
    match capability {
        Capability::CullFace => glow::CULL_FACE,
        Capability::DepthTest => glow::DEPTH_TEST,
        Capability::ScissorTest => glow::SCISSOR_TEST,
        Capability::Blend => glow::BLEND,
        Capability::StencilTest => glow::STENCIL_TEST,
    }
}

pub(crate) fn face(face: Face) -> u32 {
    match face {
        Face::Front => glow::FRONT,
        Face::Back => glow::BACK,
        Face::FrontAndBack => glow::FRONT_AND_BACK,
    }
}

pub(crate) fn face_from_gl(value: u32) -> Face {
    match value {
        glow::FRONT => Face::Front,
        glow::FRONT_AND_BACK => Face::FrontAndBack,
        _ => Face::Back,
    }
}

pub(crate) fn compare_function(func: CompareFunction) -> u32 {
    match func {
        CompareFunction::Never => glow::NEVER,
        CompareFunction::Always => glow::ALWAYS,
        CompareFunction::Less => glow::LESS,
        CompareFunction::LessOrEqual => glow::LEQUAL,
        CompareFunction::Equal => glow::EQUAL,
        CompareFunction::NotEqual => glow::NOTEQUAL,
        CompareFunction::GreaterOrEqual => glow::GEQUAL,
        CompareFunction::Greater => glow::GREATER,
    }
}

pub(crate) fn compare_function_from_gl(value: u32) -> CompareFunction {
    CompareFunction::ARRAY
        .into_iter()
        .find(|&func| compare_function(func) == value)
        .unwrap_or(CompareFunction::Always)
}

const BLEND_FACTORS: [BlendFactor; 15] = [
    BlendFactor::Zero,
    BlendFactor::One,
    BlendFactor::SrcColor,
    BlendFactor::OneMinusSrcColor,
    BlendFactor::DstColor,
    BlendFactor::OneMinusDstColor,
    BlendFactor::SrcAlpha,
    BlendFactor::OneMinusSrcAlpha,
    BlendFactor::DstAlpha,
    BlendFactor::OneMinusDstAlpha,
    BlendFactor::ConstantColor,
    BlendFactor::OneMinusConstantColor,
    BlendFactor::ConstantAlpha,
    BlendFactor::OneMinusConstantAlpha,
    BlendFactor::SrcAlphaSaturate,
];

pub(crate) fn blend_factor(factor: BlendFactor) -> u32 {
    match factor {
        BlendFactor::Zero => glow::ZERO,
        BlendFactor::One => glow::ONE,
        BlendFactor::SrcColor => glow::SRC_COLOR,
        BlendFactor::OneMinusSrcColor => glow::ONE_MINUS_SRC_COLOR,
        BlendFactor::DstColor => glow::DST_COLOR,
        BlendFactor::OneMinusDstColor => glow::ONE_MINUS_DST_COLOR,
        BlendFactor::SrcAlpha => glow::SRC_ALPHA,
        BlendFactor::OneMinusSrcAlpha => glow::ONE_MINUS_SRC_ALPHA,
        BlendFactor::DstAlpha => glow::DST_ALPHA,
        BlendFactor::OneMinusDstAlpha => glow::ONE_MINUS_DST_ALPHA,
        BlendFactor::ConstantColor => glow::CONSTANT_COLOR,
        BlendFactor::OneMinusConstantColor => glow::ONE_MINUS_CONSTANT_COLOR,
        BlendFactor::ConstantAlpha => glow::CONSTANT_ALPHA,
        BlendFactor::OneMinusConstantAlpha => glow::ONE_MINUS_CONSTANT_ALPHA,
        BlendFactor::SrcAlphaSaturate => glow::SRC_ALPHA_SATURATE,
    }
}

pub(crate) fn blend_factor_from_gl(value: u32) -> BlendFactor {
    BLEND_FACTORS
        .into_iter()
        .find(|&factor| blend_factor(factor) == value)
        .unwrap_or(BlendFactor::One)
}

pub(crate) fn blend_operation(op: BlendOperation) -> u32 {
    match op {
        BlendOperation::Add => glow::FUNC_ADD,
        BlendOperation::Subtract => glow::FUNC_SUBTRACT,
        BlendOperation::ReverseSubtract => glow::FUNC_REVERSE_SUBTRACT,
        BlendOperation::Min => glow::MIN,
        BlendOperation::Max => glow::MAX,
    }
}

pub(crate) fn blend_operation_from_gl(value: u32) -> BlendOperation {
    match value {
        glow::FUNC_SUBTRACT => BlendOperation::Subtract,
        glow::FUNC_REVERSE_SUBTRACT => BlendOperation::ReverseSubtract,
        glow::MIN => BlendOperation::Min,
        glow::MAX => BlendOperation::Max,
        _ => BlendOperation::Add,
    }
}

pub(crate) fn stencil_op(op: StencilOp) -> u32 {
    match op {
        StencilOp::Zero => glow::ZERO,
        StencilOp::Keep => glow::KEEP,
        StencilOp::Replace => glow::REPLACE,
        StencilOp::Invert => glow::INVERT,
        StencilOp::IncrementClamp => glow::INCR,
        StencilOp::DecrementClamp => glow::DECR,
        StencilOp::IncrementWrap => glow::INCR_WRAP,
        StencilOp::DecrementWrap => glow::DECR_WRAP,
    }
}

pub(crate) fn stencil_op_from_gl(value: u32) -> StencilOp {
    match value {
        glow::ZERO => StencilOp::Zero,
        glow::REPLACE => StencilOp::Replace,
        glow::INVERT => StencilOp::Invert,
        glow::INCR => StencilOp::IncrementClamp,
        glow::DECR => StencilOp::DecrementClamp,
        glow::INCR_WRAP => StencilOp::IncrementWrap,
        glow::DECR_WRAP => StencilOp::DecrementWrap,
        _ => StencilOp::Keep,
    }
}

pub(crate) fn texture_target(ty: TextureType) -> u32 {
    match ty {
        TextureType::D1 => glow::TEXTURE_1D,
        TextureType::D2 => glow::TEXTURE_2D,
        TextureType::D3 => glow::TEXTURE_3D,
        TextureType::Cube => glow::TEXTURE_CUBE_MAP,
        TextureType::D1Array => glow::TEXTURE_1D_ARRAY,
        TextureType::D2Array => glow::TEXTURE_2D_ARRAY,
        TextureType::CubeArray => glow::TEXTURE_CUBE_MAP_ARRAY,
    }
}

pub(crate) fn internal_format(format: TextureFormat) -> u32 {
    match format {
        TextureFormat::R8Unorm => glow::R8,
        TextureFormat::Rg8Unorm => glow::RG8,
        TextureFormat::Rgba8Unorm => glow::RGBA8,
        TextureFormat::Rgba8UnormSrgb => glow::SRGB8_ALPHA8,
        TextureFormat::R16Float => glow::R16F,
        TextureFormat::Rg16Float => glow::RG16F,
        TextureFormat::Rgba16Float => glow::RGBA16F,
        TextureFormat::R32Float => glow::R32F,
        TextureFormat::Rg32Float => glow::RG32F,
        TextureFormat::Rgba32Float => glow::RGBA32F,
        TextureFormat::R32Uint => glow::R32UI,
        TextureFormat::R32Sint => glow::R32I,
        TextureFormat::Rgba32Uint => glow::RGBA32UI,
        TextureFormat::Rgba32Sint => glow::RGBA32I,
        TextureFormat::Rgb10A2Unorm => glow::RGB10_A2,
        TextureFormat::Rg11B10Float => glow::R11F_G11F_B10F,
        TextureFormat::Depth16Unorm => glow::DEPTH_COMPONENT16,
        TextureFormat::Depth24Plus => glow::DEPTH_COMPONENT24,
        TextureFormat::Depth32Float => glow::DEPTH_COMPONENT32F,
        TextureFormat::Depth24PlusStencil8 => glow::DEPTH24_STENCIL8,
        TextureFormat::Depth32FloatStencil8 => glow::DEPTH32F_STENCIL8,
        TextureFormat::Stencil8 => glow::STENCIL_INDEX8,
        TextureFormat::Bc1RgbaUnorm => COMPRESSED_RGBA_S3TC_DXT1_EXT,
        TextureFormat::Bc3RgbaUnorm => COMPRESSED_RGBA_S3TC_DXT5_EXT,
        TextureFormat::Bc7RgbaUnorm => COMPRESSED_RGBA_BPTC_UNORM,
    }
}

pub(crate) fn image_access(access: ImageAccess) -> u32 {
    match access {
        ImageAccess::Read => glow::READ_ONLY,
        ImageAccess::Write => glow::WRITE_ONLY,
        ImageAccess::ReadWrite => glow::READ_WRITE,
    }
}

pub(crate) fn wrap_mode(mode: WrapMode) -> i32 {
    let mode = match mode {
        WrapMode::Repeat => glow::REPEAT,
        WrapMode::MirroredRepeat => glow::MIRRORED_REPEAT,
        WrapMode::ClampToEdge => glow::CLAMP_TO_EDGE,
        WrapMode::MirrorClampToEdge => MIRROR_CLAMP_TO_EDGE,
    };
    mode as i32
}

pub(crate) fn mag_filter(filter: PixelFilter) -> i32 {
    let filter = match filter {
        PixelFilter::Nearest => glow::NEAREST,
        PixelFilter::Linear => glow::LINEAR,
    };
    filter as i32
}

pub(crate) fn min_filter(filter: PixelFilter, mip_filter: Option<PixelFilter>) -> i32 {
    let filter = match (filter, mip_filter) {
        (PixelFilter::Nearest, None) => glow::NEAREST,
        (PixelFilter::Linear, None) => glow::LINEAR,
        (PixelFilter::Nearest, Some(PixelFilter::Nearest)) => glow::NEAREST_MIPMAP_NEAREST,
        (PixelFilter::Linear, Some(PixelFilter::Nearest)) => glow::LINEAR_MIPMAP_NEAREST,
        (PixelFilter::Nearest, Some(PixelFilter::Linear)) => glow::NEAREST_MIPMAP_LINEAR,
        (PixelFilter::Linear, Some(PixelFilter::Linear)) => glow::LINEAR_MIPMAP_LINEAR,
    };
    filter as i32
}
