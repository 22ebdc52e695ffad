use std::cell::{Cell, RefCell};

use glam::{BVec4, Vec4};
use rendgl::{
    types::{
        BlendFactor, BlendOperation, CompareFunction, Face, Faces, Sampler, SamplerHandle, StencilResult,
        TextureDescriptor, TextureFormat, TextureHandle, TextureType, ViewHandle, ViewUsage, VsyncMode,
    },
    util::typedefs::{FastHashMap, FastHashSet},
    BlendFactors, Capability, Driver, DriverError, DriverInfo, StencilFunc,
};

/// A state changing call received by a [`RecordingDriver`]. Queries are not recorded.
#[derive(Debug, Clone, PartialEq)]
pub enum DriverCall {
    SetSwapInterval(VsyncMode),
    SetCapability(Capability, bool),
    SetColorMask(BVec4),
    SetDepthMask(bool),
    SetCullFace(Face),
    SetDepthFunc(CompareFunction),
    SetViewport([i32; 4]),
    SetScissor([i32; 4]),
    SetBlendFunc(BlendFactors),
    SetBlendEquation(BlendOperation, BlendOperation),
    SetBlendColor(Vec4),
    SetStencilFunc(Face, StencilFunc),
    SetStencilOp(Face, StencilResult),
    SetStencilWriteMask(Face, u32),
    Clear(Option<Vec4>, Option<f32>),
    CreateTexture(TextureHandle),
    DeleteTexture(TextureHandle),
    ApplyTextureSampler(TextureHandle),
    GenerateMipmaps(TextureHandle),
    CreateSampler(SamplerHandle),
    DeleteSampler(SamplerHandle),
    CreateTextureView {
        texture: TextureHandle,
        sampler: Option<SamplerHandle>,
    },
    CreateImageView {
        texture: TextureHandle,
        level: u32,
        layer: Option<u32>,
        format: TextureFormat,
    },
    MakeResident(ViewHandle, ViewUsage),
    MakeNonResident(ViewHandle, ViewUsage),
}

impl DriverCall {
    /// Whether the call changes the tracked render state, as opposed to managing objects.
    pub fn is_state_change(&self) -> bool {
        matches!(
            self,
            Self::SetCapability(..)
                | Self::SetColorMask(_)
                | Self::SetDepthMask(_)
                | Self::SetCullFace(_)
                | Self::SetDepthFunc(_)
                | Self::SetViewport(_)
                | Self::SetScissor(_)
                | Self::SetBlendFunc(_)
                | Self::SetBlendEquation(..)
                | Self::SetBlendColor(_)
                | Self::SetStencilFunc(..)
                | Self::SetStencilOp(..)
                | Self::SetStencilWriteMask(..)
        )
    }
}

/// Global state as a freshly created OpenGL context has it.
#[derive(Debug, Clone, PartialEq)]
pub struct MockState {
    pub capabilities: FastHashSet<Capability>,
    pub color_mask: BVec4,
    pub depth_mask: bool,
    pub cull_face: Face,
    pub depth_func: CompareFunction,
    pub viewport: [i32; 4],
    pub scissor: [i32; 4],
    pub blend_func: BlendFactors,
    pub blend_equation: (BlendOperation, BlendOperation),
    pub blend_color: Vec4,
    pub stencil_func: Faces<StencilFunc>,
    pub stencil_op: Faces<StencilResult>,
    pub stencil_write_mask: Faces<u32>,
}

impl MockState {
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            capabilities: FastHashSet::default(),
            color_mask: BVec4::TRUE,
            depth_mask: true,
            cull_face: Face::Back,
            depth_func: CompareFunction::Less,
            viewport: [0, 0, width, height],
            scissor: [0, 0, width, height],
            blend_func: BlendFactors {
                src_rgb: BlendFactor::One,
                dest_rgb: BlendFactor::Zero,
                src_alpha: BlendFactor::One,
                dest_alpha: BlendFactor::Zero,
            },
            blend_equation: (BlendOperation::Add, BlendOperation::Add),
            blend_color: Vec4::ZERO,
            stencil_func: Faces::both(StencilFunc {
                func: CompareFunction::Always,
                reference: 0,
                read_mask: !0,
            }),
            stencil_op: Faces::both(StencilResult::KEEP),
            stencil_write_mask: Faces::both(!0),
        }
    }
}

fn update_faces<T: Copy>(faces: &mut Faces<T>, face: Face, value: T) {
    match face {
        Face::Front => faces.front = value,
        Face::Back => faces.back = value,
        Face::FrontAndBack => *faces = Faces { front: value, back: value },
    }
}

fn read_face<T: Copy>(faces: &Faces<T>, face: Face) -> T {
    match face {
        Face::Back => faces.back,
        Face::Front | Face::FrontAndBack => faces.front,
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
enum ViewRequest {
    Texture(TextureHandle, Option<SamplerHandle>),
    Image(TextureHandle, u32, Option<u32>, TextureFormat),
}

/// [`Driver`] that keeps OpenGL-like state in memory and records every call.
///
/// Misuse that a real driver would answer with `GL_INVALID_OPERATION` (making a
/// resident handle resident again, deleting a texture with resident handles, and
/// so on) is counted in [`RecordingDriver::invalid_operations`].
pub struct RecordingDriver {
    info: DriverInfo,
    adaptive_vsync: bool,
    state: RefCell<MockState>,
    calls: RefCell<Vec<DriverCall>>,
    next_name: Cell<u32>,
    next_view: Cell<u64>,
    textures: RefCell<FastHashSet<TextureHandle>>,
    samplers: RefCell<FastHashSet<SamplerHandle>>,
    views: RefCell<FastHashMap<ViewRequest, ViewHandle>>,
    resident: RefCell<FastHashSet<ViewHandle>>,
    reject_views: Cell<bool>,
    invalid_operations: Cell<u32>,
}

impl RecordingDriver {
    pub fn new(info: DriverInfo, adaptive_vsync: bool, state: MockState) -> Self {
        Self {
            info,
            adaptive_vsync,
            state: RefCell::new(state),
            calls: RefCell::new(Vec::new()),
            next_name: Cell::new(1),
            next_view: Cell::new(0x1000),
            textures: RefCell::default(),
            samplers: RefCell::default(),
            views: RefCell::default(),
            resident: RefCell::default(),
            reject_views: Cell::new(false),
            invalid_operations: Cell::new(0),
        }
    }

    /// Every recorded call since the last [`RecordingDriver::take_calls`].
    pub fn calls(&self) -> Vec<DriverCall> {
        self.calls.borrow().clone()
    }

    pub fn take_calls(&self) -> Vec<DriverCall> {
        std::mem::take(&mut *self.calls.borrow_mut())
    }

    /// Recorded calls which changed render state.
    pub fn state_calls(&self) -> Vec<DriverCall> {
        self.calls.borrow().iter().filter(|c| c.is_state_change()).cloned().collect()
    }

    pub fn state(&self) -> MockState {
        self.state.borrow().clone()
    }

    /// Changes state behind the back of whoever uses the driver, like a third party library would.
    pub fn modify_state(&self, modify: impl FnOnce(&mut MockState)) {
        modify(&mut self.state.borrow_mut());
    }

    pub fn live_textures(&self) -> usize {
        self.textures.borrow().len()
    }

    pub fn live_samplers(&self) -> usize {
        self.samplers.borrow().len()
    }

    pub fn resident_count(&self) -> usize {
        self.resident.borrow().len()
    }

    pub fn is_handle_resident(&self, view: ViewHandle) -> bool {
        self.resident.borrow().contains(&view)
    }

    pub fn invalid_operations(&self) -> u32 {
        self.invalid_operations.get()
    }

    /// While set, handle requests return [`ViewHandle::NULL`] like a driver rejecting
    /// an incomplete texture does.
    pub fn reject_views(&self, reject: bool) {
        self.reject_views.set(reject);
    }

    fn record(&self, call: DriverCall) {
        log::trace!("{call:?}");
        self.calls.borrow_mut().push(call);
    }

    fn invalid(&self, what: &str) {
        log::warn!("Invalid operation: {what}");
        self.invalid_operations.set(self.invalid_operations.get() + 1);
    }

    fn allocate_name(&self) -> u32 {
        let name = self.next_name.get();
        self.next_name.set(name + 1);
        name
    }

    fn view_handle(&self, request: ViewRequest, texture: TextureHandle) -> ViewHandle {
        if !self.textures.borrow().contains(&texture) {
            self.invalid("handle of a deleted texture");
            return ViewHandle::NULL;
        }
        if self.reject_views.get() {
            return ViewHandle::NULL;
        }
        *self.views.borrow_mut().entry(request).or_insert_with(|| {
            let raw = self.next_view.get();
            self.next_view.set(raw + 1);
            ViewHandle::new(raw)
        })
    }
}

impl Driver for RecordingDriver {
    fn info(&self) -> DriverInfo {
        self.info.clone()
    }

    fn set_swap_interval(&self, mode: VsyncMode) -> Result<(), DriverError> {
        if mode == VsyncMode::Adaptive && !self.adaptive_vsync {
            return Err(DriverError::UnsupportedVsync(mode));
        }
        self.record(DriverCall::SetSwapInterval(mode));
        Ok(())
    }

    fn set_capability(&self, capability: Capability, enabled: bool) {
        self.record(DriverCall::SetCapability(capability, enabled));
        let mut state = self.state.borrow_mut();
        if enabled {
            state.capabilities.insert(capability);
        } else {
            state.capabilities.remove(&capability);
        }
    }

    fn capability(&self, capability: Capability) -> bool {
        self.state.borrow().capabilities.contains(&capability)
    }

    fn set_color_mask(&self, mask: BVec4) {
        self.record(DriverCall::SetColorMask(mask));
        self.state.borrow_mut().color_mask = mask;
    }

    fn color_mask(&self) -> BVec4 {
        self.state.borrow().color_mask
    }

    fn set_depth_mask(&self, write: bool) {
        self.record(DriverCall::SetDepthMask(write));
        self.state.borrow_mut().depth_mask = write;
    }

    fn depth_mask(&self) -> bool {
        self.state.borrow().depth_mask
    }

    fn set_cull_face(&self, face: Face) {
        self.record(DriverCall::SetCullFace(face));
        self.state.borrow_mut().cull_face = face;
    }

    fn cull_face(&self) -> Face {
        self.state.borrow().cull_face
    }

    fn set_depth_func(&self, func: CompareFunction) {
        self.record(DriverCall::SetDepthFunc(func));
        self.state.borrow_mut().depth_func = func;
    }

    fn depth_func(&self) -> CompareFunction {
        self.state.borrow().depth_func
    }

    fn set_viewport(&self, rect: [i32; 4]) {
        self.record(DriverCall::SetViewport(rect));
        self.state.borrow_mut().viewport = rect;
    }

    fn viewport(&self) -> [i32; 4] {
        self.state.borrow().viewport
    }

    fn set_scissor(&self, rect: [i32; 4]) {
        self.record(DriverCall::SetScissor(rect));
        self.state.borrow_mut().scissor = rect;
    }

    fn scissor(&self) -> [i32; 4] {
        self.state.borrow().scissor
    }

    fn set_blend_func(&self, factors: BlendFactors) {
        self.record(DriverCall::SetBlendFunc(factors));
        self.state.borrow_mut().blend_func = factors;
    }

    fn blend_func(&self) -> BlendFactors {
        self.state.borrow().blend_func
    }

    fn set_blend_equation(&self, rgb: BlendOperation, alpha: BlendOperation) {
        self.record(DriverCall::SetBlendEquation(rgb, alpha));
        self.state.borrow_mut().blend_equation = (rgb, alpha);
    }

    fn blend_equation(&self) -> (BlendOperation, BlendOperation) {
        self.state.borrow().blend_equation
    }

    fn set_blend_color(&self, color: Vec4) {
        self.record(DriverCall::SetBlendColor(color));
        self.state.borrow_mut().blend_color = color;
    }

    fn blend_color(&self) -> Vec4 {
        self.state.borrow().blend_color
    }

    fn set_stencil_func(&self, face: Face, func: StencilFunc) {
        self.record(DriverCall::SetStencilFunc(face, func));
        update_faces(&mut self.state.borrow_mut().stencil_func, face, func);
    }

    fn stencil_func(&self, face: Face) -> StencilFunc {
        read_face(&self.state.borrow().stencil_func, face)
    }

    fn set_stencil_op(&self, face: Face, result: StencilResult) {
        self.record(DriverCall::SetStencilOp(face, result));
        update_faces(&mut self.state.borrow_mut().stencil_op, face, result);
    }

    fn stencil_op(&self, face: Face) -> StencilResult {
        read_face(&self.state.borrow().stencil_op, face)
    }

    fn set_stencil_write_mask(&self, face: Face, mask: u32) {
        self.record(DriverCall::SetStencilWriteMask(face, mask));
        update_faces(&mut self.state.borrow_mut().stencil_write_mask, face, mask);
    }

    fn stencil_write_mask(&self, face: Face) -> u32 {
        read_face(&self.state.borrow().stencil_write_mask, face)
    }

    fn clear(&self, color: Option<Vec4>, depth: Option<f32>) {
        self.record(DriverCall::Clear(color, depth));
    }

    fn create_texture(&self, _desc: &TextureDescriptor, mip_levels: u32) -> Result<TextureHandle, DriverError> {
        if mip_levels == 0 {
            return Err(DriverError::ObjectCreation {
                kind: "texture",
                message: String::from("zero mip levels"),
            });
        }
        let texture = TextureHandle::new(self.allocate_name());
        self.textures.borrow_mut().insert(texture);
        self.record(DriverCall::CreateTexture(texture));
        Ok(texture)
    }

    fn delete_texture(&self, texture: TextureHandle) {
        self.record(DriverCall::DeleteTexture(texture));
        if !self.textures.borrow_mut().remove(&texture) {
            self.invalid("deleting an unknown texture");
        }

        let mut views = self.views.borrow_mut();
        let owned: Vec<ViewHandle> = views
            .iter()
            .filter(|(request, _)| match request {
                ViewRequest::Texture(owner, _) | ViewRequest::Image(owner, ..) => *owner == texture,
            })
            .map(|(_, &handle)| handle)
            .collect();
        views.retain(|_, handle| !owned.contains(handle));
        drop(views);

        if owned.iter().any(|handle| self.resident.borrow().contains(handle)) {
            self.invalid("deleting a texture with resident handles");
        }
    }

    fn apply_texture_sampler(&self, texture: TextureHandle, _ty: TextureType, _sampler: &Sampler) {
        self.record(DriverCall::ApplyTextureSampler(texture));
    }

    fn generate_mipmaps(&self, texture: TextureHandle, _ty: TextureType) {
        self.record(DriverCall::GenerateMipmaps(texture));
    }

    fn create_sampler(&self, _sampler: &Sampler) -> Result<SamplerHandle, DriverError> {
        let sampler = SamplerHandle::new(self.allocate_name());
        self.samplers.borrow_mut().insert(sampler);
        self.record(DriverCall::CreateSampler(sampler));
        Ok(sampler)
    }

    fn delete_sampler(&self, sampler: SamplerHandle) {
        self.record(DriverCall::DeleteSampler(sampler));
        if !self.samplers.borrow_mut().remove(&sampler) {
            self.invalid("deleting an unknown sampler");
        }
    }

    fn texture_view_handle(&self, texture: TextureHandle, sampler: Option<SamplerHandle>) -> ViewHandle {
        self.record(DriverCall::CreateTextureView { texture, sampler });
        self.view_handle(ViewRequest::Texture(texture, sampler), texture)
    }

    fn image_view_handle(
        &self,
        texture: TextureHandle,
        level: u32,
        layer: Option<u32>,
        format: TextureFormat,
    ) -> ViewHandle {
        self.record(DriverCall::CreateImageView {
            texture,
            level,
            layer,
            format,
        });
        self.view_handle(ViewRequest::Image(texture, level, layer, format), texture)
    }

    fn make_resident(&self, view: ViewHandle, usage: ViewUsage) {
        self.record(DriverCall::MakeResident(view, usage));
        if !self.resident.borrow_mut().insert(view) {
            self.invalid("handle is already resident");
        }
    }

    fn make_non_resident(&self, view: ViewHandle, usage: ViewUsage) {
        self.record(DriverCall::MakeNonResident(view, usage));
        if !self.resident.borrow_mut().remove(&view) {
            self.invalid("handle is not resident");
        }
    }

    fn is_resident(&self, view: ViewHandle, _usage: ViewUsage) -> bool {
        self.resident.borrow().contains(&view)
    }
}
