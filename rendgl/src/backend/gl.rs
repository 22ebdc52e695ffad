use std::{ffi::CStr, num::NonZeroU32};

use glam::{BVec4, Vec4};
use glow::HasContext;
use glutin::{
    config::Config,
    display::GetGlDisplay,
    context::{ContextApi, ContextAttributesBuilder, PossiblyCurrentContext, Version},
    prelude::*,
    surface::{Surface, SurfaceAttributesBuilder, SwapInterval, WindowSurface},
};
use raw_window_handle::HasRawWindowHandle;
use rendgl_types::{
    BlendOperation, CompareFunction, Face, Sampler, SamplerHandle, StencilResult, TextureDescriptor, TextureFormat, TextureHandle,
    TextureType, ViewHandle, ViewUsage, VsyncMode,
};
use winit::window::Window;

use crate::{
    backend::{bindless::BindlessFns, conv},
    registry,
    setup::REQUIRED_VERSION,
    BlendFactors, Capability, ContextCreationError, Driver, DriverError, DriverInfo, StencilFunc,
};

const BINDLESS_EXTENSION: &str = "GL_ARB_bindless_texture";

/// [`Driver`] backed by a real OpenGL context rendering into a window.
///
/// Owns the window, its surface and the context; the context is current on the
/// thread that created the driver for as long as it lives.
pub struct GlowDriver {
    gl: glow::Context,
    bindless: Option<BindlessFns>,
    context: PossiblyCurrentContext,
    surface: Surface<WindowSurface>,
    window: Window,
}

impl GlowDriver {
    /// Creates an OpenGL context for `window` and makes it current.
    ///
    /// Fails without touching the window system if this thread already owns a
    /// [`Context`](crate::Context), so an existing context stays current.
    pub fn new(window: Window, config: &Config, debug: bool) -> Result<Self, ContextCreationError> {
        profiling::scope!("GlowDriver::new");

        if let Some(existing) = registry::current() {
            return Err(ContextCreationError::AlreadyExists { existing });
        }

        let platform = |e: glutin::error::Error| ContextCreationError::Platform(Box::new(e));

        let raw_window_handle = window.raw_window_handle();
        let display = config.display();

        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(
                REQUIRED_VERSION.0 as u8,
                REQUIRED_VERSION.1 as u8,
            ))))
            .with_debug(debug)
            .build(Some(raw_window_handle));
        let not_current = unsafe { display.create_context(config, &context_attributes) }.map_err(platform)?;

        let size = window.inner_size();
        let surface_attributes = SurfaceAttributesBuilder::<WindowSurface>::new().build(
            raw_window_handle,
            non_zero(size.width),
            non_zero(size.height),
        );
        let surface = unsafe { display.create_window_surface(config, &surface_attributes) }.map_err(platform)?;
        let context = not_current.make_current(&surface).map_err(platform)?;

        let gl = unsafe { glow::Context::from_loader_function_cstr(|s: &CStr| display.get_proc_address(s)) };
        let bindless = match unsafe { BindlessFns::load(|s| display.get_proc_address(s)) } {
            Ok(fns) => Some(fns),
            Err(e) => {
                log::warn!("Bindless textures are unavailable: {e}");
                None
            }
        };

        Ok(Self {
            gl,
            bindless,
            context,
            surface,
            window,
        })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn gl(&self) -> &glow::Context {
        &self.gl
    }

    pub fn swap_buffers(&self) -> Result<(), DriverError> {
        profiling::scope!("swap_buffers");
        self.surface
            .swap_buffers(&self.context)
            .map_err(|e| DriverError::SwapBuffers(Box::new(e)))
    }

    /// Resizes the window surface. Zero sizes are clamped to one pixel.
    pub fn resize(&self, width: u32, height: u32) {
        self.surface.resize(&self.context, non_zero(width), non_zero(height));
    }

    fn bindless(&self) -> Option<&BindlessFns> {
        if self.bindless.is_none() {
            log::error!("Bindless call without {BINDLESS_EXTENSION}");
        }
        self.bindless.as_ref()
    }

    fn get_i32(&self, parameter: u32) -> i32 {
        unsafe { self.gl.get_parameter_i32(parameter) }
    }

    fn get_enum(&self, parameter: u32) -> u32 {
        self.get_i32(parameter) as u32
    }

    fn get_i32x4(&self, parameter: u32) -> [i32; 4] {
        let mut values = [0; 4];
        unsafe { self.gl.get_parameter_i32_slice(parameter, &mut values) };
        values
    }
}

fn non_zero(value: u32) -> NonZeroU32 {
    NonZeroU32::new(value).unwrap_or(NonZeroU32::MIN)
}

fn raw_texture(texture: TextureHandle) -> Option<glow::Texture> {
    NonZeroU32::new(texture.raw()).map(glow::NativeTexture)
}

fn raw_sampler(sampler: SamplerHandle) -> Option<glow::Sampler> {
    NonZeroU32::new(sampler.raw()).map(glow::NativeSampler)
}

impl Driver for GlowDriver {
    fn info(&self) -> DriverInfo {
        let version = self.gl.version();
        let mut extensions: crate::util::typedefs::FastHashSet<String> =
            self.gl.supported_extensions().iter().cloned().collect();
        // An advertised extension is useless if its entry points didn't load.
        if self.bindless.is_none() {
            extensions.remove(BINDLESS_EXTENSION);
        }
        unsafe {
            DriverInfo {
                version: (version.major, version.minor),
                vendor: self.gl.get_parameter_string(glow::VENDOR),
                renderer: self.gl.get_parameter_string(glow::RENDERER),
                extensions,
            }
        }
    }

    fn set_swap_interval(&self, mode: VsyncMode) -> Result<(), DriverError> {
        let interval = match mode {
            VsyncMode::Off => SwapInterval::DontWait,
            VsyncMode::On => SwapInterval::Wait(NonZeroU32::MIN),
            // glutin has no way to ask for a negative swap interval.
            VsyncMode::Adaptive => return Err(DriverError::UnsupportedVsync(mode)),
        };
        self.surface
            .set_swap_interval(&self.context, interval)
            .map_err(|e| DriverError::SwapInterval(Box::new(e)))
    }

    fn set_capability(&self, capability: Capability, enabled: bool) {
        let cap = conv::capability(capability);
        unsafe {
            if enabled {
                self.gl.enable(cap)
            } else {
                self.gl.disable(cap)
            }
        }
    }

    fn capability(&self, capability: Capability) -> bool {
        unsafe { self.gl.is_enabled(conv::capability(capability)) }
    }

    fn set_color_mask(&self, mask: BVec4) {
        unsafe { self.gl.color_mask(mask.x, mask.y, mask.z, mask.w) }
    }

    fn color_mask(&self) -> BVec4 {
        let [r, g, b, a] = self.get_i32x4(glow::COLOR_WRITEMASK);
        BVec4::new(r != 0, g != 0, b != 0, a != 0)
    }

    fn set_depth_mask(&self, write: bool) {
        unsafe { self.gl.depth_mask(write) }
    }

    fn depth_mask(&self) -> bool {
        self.get_i32(glow::DEPTH_WRITEMASK) != 0
    }

    fn set_cull_face(&self, face: Face) {
        unsafe { self.gl.cull_face(conv::face(face)) }
    }

    fn cull_face(&self) -> Face {
        conv::face_from_gl(self.get_enum(glow::CULL_FACE_MODE))
    }

    fn set_depth_func(&self, func: CompareFunction) {
        unsafe { self.gl.depth_func(conv::compare_function(func)) }
    }

    fn depth_func(&self) -> CompareFunction {
        conv::compare_function_from_gl(self.get_enum(glow::DEPTH_FUNC))
    }

    fn set_viewport(&self, [x, y, width, height]: [i32; 4]) {
        unsafe { self.gl.viewport(x, y, width, height) }
    }

    fn viewport(&self) -> [i32; 4] {
        self.get_i32x4(glow::VIEWPORT)
    }

    fn set_scissor(&self, [x, y, width, height]: [i32; 4]) {
        unsafe { self.gl.scissor(x, y, width, height) }
    }

    fn scissor(&self) -> [i32; 4] {
        self.get_i32x4(glow::SCISSOR_BOX)
    }

    fn set_blend_func(&self, factors: BlendFactors) {
        unsafe {
            self.gl.blend_func_separate(
                conv::blend_factor(factors.src_rgb),
                conv::blend_factor(factors.dest_rgb),
                conv::blend_factor(factors.src_alpha),
                conv::blend_factor(factors.dest_alpha),
            )
        }
    }

    fn blend_func(&self) -> BlendFactors {
        BlendFactors {
            src_rgb: conv::blend_factor_from_gl(self.get_enum(glow::BLEND_SRC_RGB)),
            dest_rgb: conv::blend_factor_from_gl(self.get_enum(glow::BLEND_DST_RGB)),
            src_alpha: conv::blend_factor_from_gl(self.get_enum(glow::BLEND_SRC_ALPHA)),
            dest_alpha: conv::blend_factor_from_gl(self.get_enum(glow::BLEND_DST_ALPHA)),
        }
    }

    fn set_blend_equation(&self, rgb: BlendOperation, alpha: BlendOperation) {
        unsafe {
            self.gl
                .blend_equation_separate(conv::blend_operation(rgb), conv::blend_operation(alpha))
        }
    }

    fn blend_equation(&self) -> (BlendOperation, BlendOperation) {
        (
            conv::blend_operation_from_gl(self.get_enum(glow::BLEND_EQUATION_RGB)),
            conv::blend_operation_from_gl(self.get_enum(glow::BLEND_EQUATION_ALPHA)),
        )
    }

    fn set_blend_color(&self, color: Vec4) {
        unsafe { self.gl.blend_color(color.x, color.y, color.z, color.w) }
    }

    fn blend_color(&self) -> Vec4 {
        let mut color = [0.0; 4];
        unsafe { self.gl.get_parameter_f32_slice(glow::BLEND_COLOR, &mut color) };
        Vec4::from_array(color)
    }

    fn set_stencil_func(&self, face: Face, func: StencilFunc) {
        unsafe {
            self.gl.stencil_func_separate(
                conv::face(face),
                conv::compare_function(func.func),
                func.reference,
                func.read_mask,
            )
        }
    }

    fn stencil_func(&self, face: Face) -> StencilFunc {
        let (func, reference, mask) = match face {
            Face::Back => (glow::STENCIL_BACK_FUNC, glow::STENCIL_BACK_REF, glow::STENCIL_BACK_VALUE_MASK),
            _ => (glow::STENCIL_FUNC, glow::STENCIL_REF, glow::STENCIL_VALUE_MASK),
        };
        StencilFunc {
            func: conv::compare_function_from_gl(self.get_enum(func)),
            reference: self.get_i32(reference),
            read_mask: self.get_i32(mask) as u32,
        }
    }

    fn set_stencil_op(&self, face: Face, result: StencilResult) {
        unsafe {
            self.gl.stencil_op_separate(
                conv::face(face),
                conv::stencil_op(result.on_failed_stencil),
                conv::stencil_op(result.on_passed_stencil_failed_depth),
                conv::stencil_op(result.on_passed_both),
            )
        }
    }

    fn stencil_op(&self, face: Face) -> StencilResult {
        let (fail, depth_fail, pass) = match face {
            Face::Back => (
                glow::STENCIL_BACK_FAIL,
                glow::STENCIL_BACK_PASS_DEPTH_FAIL,
                glow::STENCIL_BACK_PASS_DEPTH_PASS,
            ),
            _ => (glow::STENCIL_FAIL, glow::STENCIL_PASS_DEPTH_FAIL, glow::STENCIL_PASS_DEPTH_PASS),
        };
        StencilResult {
            on_failed_stencil: conv::stencil_op_from_gl(self.get_enum(fail)),
            on_passed_stencil_failed_depth: conv::stencil_op_from_gl(self.get_enum(depth_fail)),
            on_passed_both: conv::stencil_op_from_gl(self.get_enum(pass)),
        }
    }

    fn set_stencil_write_mask(&self, face: Face, mask: u32) {
        unsafe { self.gl.stencil_mask_separate(conv::face(face), mask) }
    }

    fn stencil_write_mask(&self, face: Face) -> u32 {
        let parameter = match face {
            Face::Back => glow::STENCIL_BACK_WRITEMASK,
            _ => glow::STENCIL_WRITEMASK,
        };
        self.get_i32(parameter) as u32
    }

    fn clear(&self, color: Option<Vec4>, depth: Option<f32>) {
        let mut mask = 0;
        unsafe {
            if let Some(color) = color {
                self.gl.clear_color(color.x, color.y, color.z, color.w);
                mask |= glow::COLOR_BUFFER_BIT;
            }
            if let Some(depth) = depth {
                self.gl.clear_depth_f32(depth);
                mask |= glow::DEPTH_BUFFER_BIT;
            }
            if mask != 0 {
                self.gl.clear(mask);
            }
        }
    }

    fn create_texture(&self, desc: &TextureDescriptor, mip_levels: u32) -> Result<TextureHandle, DriverError> {
        let target = conv::texture_target(desc.ty);
        let format = conv::internal_format(desc.format);
        let levels = mip_levels as i32;
        let [width, height, depth] = desc.size.as_ivec3().to_array();

        unsafe {
            let texture = self.gl.create_texture().map_err(|message| DriverError::ObjectCreation {
                kind: "texture",
                message,
            })?;
            self.gl.bind_texture(target, Some(texture));
            match desc.ty {
                TextureType::D1 => self.gl.tex_storage_1d(target, levels, format, width),
                TextureType::D2 | TextureType::Cube | TextureType::D1Array => {
                    self.gl.tex_storage_2d(target, levels, format, width, height)
                }
                TextureType::D3 | TextureType::D2Array => {
                    self.gl.tex_storage_3d(target, levels, format, width, height, depth)
                }
                TextureType::CubeArray => self.gl.tex_storage_3d(target, levels, format, width, height, depth * 6),
            }
            if let Some(label) = &desc.label {
                self.gl.object_label(glow::TEXTURE, texture.0.get(), Some(label));
            }
            self.gl.bind_texture(target, None);

            Ok(TextureHandle::new(texture.0.get()))
        }
    }

    fn delete_texture(&self, texture: TextureHandle) {
        if let Some(texture) = raw_texture(texture) {
            unsafe { self.gl.delete_texture(texture) }
        }
    }

    fn apply_texture_sampler(&self, texture: TextureHandle, ty: TextureType, sampler: &Sampler) {
        let target = conv::texture_target(ty);
        unsafe {
            self.gl.bind_texture(target, raw_texture(texture));
            self.gl
                .tex_parameter_i32(target, glow::TEXTURE_WRAP_S, conv::wrap_mode(sampler.wrapping[0]));
            self.gl
                .tex_parameter_i32(target, glow::TEXTURE_WRAP_T, conv::wrap_mode(sampler.wrapping[1]));
            self.gl
                .tex_parameter_i32(target, glow::TEXTURE_WRAP_R, conv::wrap_mode(sampler.wrapping[2]));
            self.gl.tex_parameter_i32(
                target,
                glow::TEXTURE_MIN_FILTER,
                conv::min_filter(sampler.pixel_filter, sampler.mip_filter),
            );
            self.gl
                .tex_parameter_i32(target, glow::TEXTURE_MAG_FILTER, conv::mag_filter(sampler.pixel_filter));
            match sampler.depth_comparison {
                Some(func) => {
                    self.gl
                        .tex_parameter_i32(target, glow::TEXTURE_COMPARE_MODE, glow::COMPARE_REF_TO_TEXTURE as i32);
                    self.gl
                        .tex_parameter_i32(target, glow::TEXTURE_COMPARE_FUNC, conv::compare_function(func) as i32);
                }
                None => self
                    .gl
                    .tex_parameter_i32(target, glow::TEXTURE_COMPARE_MODE, glow::NONE as i32),
            }
            if sampler.max_anisotropy > 1 {
                self.gl
                    .tex_parameter_f32(target, conv::TEXTURE_MAX_ANISOTROPY, sampler.max_anisotropy as f32);
            }
            self.gl.bind_texture(target, None);
        }
    }

    fn generate_mipmaps(&self, texture: TextureHandle, ty: TextureType) {
        let target = conv::texture_target(ty);
        unsafe {
            self.gl.bind_texture(target, raw_texture(texture));
            self.gl.generate_mipmap(target);
            self.gl.bind_texture(target, None);
        }
    }

    fn create_sampler(&self, sampler: &Sampler) -> Result<SamplerHandle, DriverError> {
        unsafe {
            let object = self.gl.create_sampler().map_err(|message| DriverError::ObjectCreation {
                kind: "sampler",
                message,
            })?;
            self.gl
                .sampler_parameter_i32(object, glow::TEXTURE_WRAP_S, conv::wrap_mode(sampler.wrapping[0]));
            self.gl
                .sampler_parameter_i32(object, glow::TEXTURE_WRAP_T, conv::wrap_mode(sampler.wrapping[1]));
            self.gl
                .sampler_parameter_i32(object, glow::TEXTURE_WRAP_R, conv::wrap_mode(sampler.wrapping[2]));
            self.gl.sampler_parameter_i32(
                object,
                glow::TEXTURE_MIN_FILTER,
                conv::min_filter(sampler.pixel_filter, sampler.mip_filter),
            );
            self.gl
                .sampler_parameter_i32(object, glow::TEXTURE_MAG_FILTER, conv::mag_filter(sampler.pixel_filter));
            if let Some(func) = sampler.depth_comparison {
                self.gl
                    .sampler_parameter_i32(object, glow::TEXTURE_COMPARE_MODE, glow::COMPARE_REF_TO_TEXTURE as i32);
                self.gl
                    .sampler_parameter_i32(object, glow::TEXTURE_COMPARE_FUNC, conv::compare_function(func) as i32);
            }
            if sampler.max_anisotropy > 1 {
                self.gl
                    .sampler_parameter_f32(object, conv::TEXTURE_MAX_ANISOTROPY, sampler.max_anisotropy as f32);
            }
            Ok(SamplerHandle::new(object.0.get()))
        }
    }

    fn delete_sampler(&self, sampler: SamplerHandle) {
        if let Some(sampler) = raw_sampler(sampler) {
            unsafe { self.gl.delete_sampler(sampler) }
        }
    }

    fn texture_view_handle(&self, texture: TextureHandle, sampler: Option<SamplerHandle>) -> ViewHandle {
        let Some(fns) = self.bindless() else {
            return ViewHandle::NULL;
        };
        let raw = unsafe {
            match sampler {
                Some(sampler) => (fns.get_texture_sampler_handle)(texture.raw(), sampler.raw()),
                None => (fns.get_texture_handle)(texture.raw()),
            }
        };
        ViewHandle::new(raw)
    }

    fn image_view_handle(
        &self,
        texture: TextureHandle,
        level: u32,
        layer: Option<u32>,
        format: TextureFormat,
    ) -> ViewHandle {
        let Some(fns) = self.bindless() else {
            return ViewHandle::NULL;
        };
        let layered = layer.is_none();
        let raw = unsafe {
            (fns.get_image_handle)(
                texture.raw(),
                level as i32,
                layered as u8,
                layer.unwrap_or(0) as i32,
                conv::internal_format(format),
            )
        };
        ViewHandle::new(raw)
    }

    fn make_resident(&self, view: ViewHandle, usage: ViewUsage) {
        let Some(fns) = self.bindless() else {
            return;
        };
        unsafe {
            match usage {
                ViewUsage::Sampled => (fns.make_texture_handle_resident)(view.raw()),
                ViewUsage::Image(access) => (fns.make_image_handle_resident)(view.raw(), conv::image_access(access)),
            }
        }
    }

    fn make_non_resident(&self, view: ViewHandle, usage: ViewUsage) {
        let Some(fns) = self.bindless() else {
            return;
        };
        unsafe {
            match usage {
                ViewUsage::Sampled => (fns.make_texture_handle_non_resident)(view.raw()),
                ViewUsage::Image(_) => (fns.make_image_handle_non_resident)(view.raw()),
            }
        }
    }

    fn is_resident(&self, view: ViewHandle, usage: ViewUsage) -> bool {
        let Some(fns) = self.bindless() else {
            return false;
        };
        let resident = unsafe {
            match usage {
                ViewUsage::Sampled => (fns.is_texture_handle_resident)(view.raw()),
                ViewUsage::Image(_) => (fns.is_image_handle_resident)(view.raw()),
            }
        };
        resident != 0
    }
}
