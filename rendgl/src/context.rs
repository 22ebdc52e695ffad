use std::rc::Rc;

use glam::{BVec4, Vec4};
use rendgl_types::{
    BlendStateAlpha, BlendStateRgb, BlendStateRgba, CompareFunction, Face, FaceCullMode, Faces, Rect, StencilResult,
    StencilTest, VsyncMode,
};

use crate::{
    registry::{self, ContextId},
    setup, BlendFactors, Capability, ContextCreationError, Driver, DriverError, DriverInfo, GlowDriver, RenderState,
    StencilFunc,
};

/// Tracks the global render state of one graphics context.
///
/// Every setter compares against the cached [`RenderState`] and only talks to the
/// driver when something actually changes, issuing the smallest set of calls that
/// brings the driver in line. At most one context can exist per thread.
///
/// If anything else touches the driver's state behind the context's back (a GUI
/// library issuing its own draw calls, for example), call
/// [`Context::refresh_driver_state`] afterwards.
///
/// Every [`Texture`](crate::Texture) made from the context has to be dropped before
/// the context itself. A texture which outlives it is leaked, and debug builds panic.
pub struct Context<D: Driver = GlowDriver> {
    id: ContextId,
    driver: Rc<D>,
    info: DriverInfo,
    vsync: VsyncMode,
    state: RenderState,
}

impl<D: Driver> Context<D> {
    /// Validates the driver, claims this thread's context slot and reads back the
    /// driver's current state.
    pub fn new(driver: D, vsync: VsyncMode) -> Result<Self, ContextCreationError> {
        profiling::scope!("Context::new");

        let info = driver.info();
        setup::check_version(&info)?;
        let optional = setup::check_extensions(&info)?;

        let id = registry::allocate();
        registry::register(id).map_err(|existing| ContextCreationError::AlreadyExists { existing })?;

        log::info!(
            "Created context {}: OpenGL {}.{} on {} ({}), optional extensions {:?}",
            id.get(),
            info.version.0,
            info.version.1,
            info.renderer,
            info.vendor,
            optional
        );

        let state = RenderState::query(&driver);
        let mut context = Self {
            id,
            driver: Rc::new(driver),
            info,
            vsync,
            state,
        };

        // Dropping the context on failure frees the slot again.
        context.vsync = realize_vsync(&*context.driver, vsync)
            .map_err(|source| ContextCreationError::Vsync { mode: vsync, source })?;

        Ok(context)
    }

    /// Id of the context owned by the calling thread, if there is one.
    pub fn current_id() -> Option<ContextId> {
        registry::current()
    }

    pub fn id(&self) -> ContextId {
        self.id
    }

    pub fn info(&self) -> &DriverInfo {
        &self.info
    }

    /// Direct access to the driver. State changed through it is not tracked.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub(crate) fn shared_driver(&self) -> Rc<D> {
        Rc::clone(&self.driver)
    }

    /// The cached state, which mirrors the driver as long as nobody else changed it.
    pub fn render_state(&self) -> &RenderState {
        &self.state
    }

    /// Discards the cache and reads everything back from the driver.
    pub fn refresh_driver_state(&mut self) {
        profiling::scope!("Context::refresh_driver_state");
        self.state = RenderState::query(&*self.driver);
    }

    /// Brings the driver to the given state through the individual setters.
    pub fn apply_render_state(&mut self, state: &RenderState) {
        profiling::scope!("Context::apply_render_state");
        self.set_color_write_mask(state.color_write_mask);
        self.set_depth_write(state.depth_write);
        self.set_cull_mode(state.cull_mode);
        self.set_viewport(state.viewport);
        self.set_scissor(state.scissor);
        self.set_blending_separate(state.color_blending, state.alpha_blending);
        self.set_depth_test(state.depth_test);
        self.apply_stencil_test(state.stencil_test);
        self.apply_stencil_result(state.stencil_result);
        self.apply_stencil_write_mask(state.stencil_write_mask);
    }

    pub fn vsync_mode(&self) -> VsyncMode {
        self.vsync
    }

    /// Changes the swap interval. [`VsyncMode::Adaptive`] falls back to [`VsyncMode::On`]
    /// if the platform doesn't support it; [`Context::vsync_mode`] reports the mode in effect.
    pub fn set_vsync_mode(&mut self, mode: VsyncMode) -> Result<(), DriverError> {
        if mode != self.vsync {
            self.vsync = realize_vsync(&*self.driver, mode)?;
        }
        Ok(())
    }

    pub fn clear_color_and_depth(&self, color: Vec4, depth: f32) {
        self.driver.clear(Some(color), Some(depth));
    }

    pub fn clear_color(&self, color: Vec4) {
        self.driver.clear(Some(color), None);
    }

    pub fn clear_depth(&self, depth: f32) {
        self.driver.clear(None, Some(depth));
    }

    pub fn color_write_mask(&self) -> BVec4 {
        self.state.color_write_mask
    }

    pub fn set_color_write_mask(&mut self, mask: BVec4) {
        if self.state.color_write_mask != mask {
            self.driver.set_color_mask(mask);
            self.state.color_write_mask = mask;
        }
    }

    pub fn depth_write(&self) -> bool {
        self.state.depth_write
    }

    pub fn set_depth_write(&mut self, write: bool) {
        if self.state.depth_write != write {
            self.driver.set_depth_mask(write);
            self.state.depth_write = write;
        }
    }

    pub fn cull_mode(&self) -> FaceCullMode {
        self.state.cull_mode
    }

    pub fn set_cull_mode(&mut self, mode: FaceCullMode) {
        let old = self.state.cull_mode;
        if old == mode {
            return;
        }

        match mode {
            FaceCullMode::Off => self.driver.set_capability(Capability::CullFace, false),
            FaceCullMode::Front | FaceCullMode::Back => {
                if old == FaceCullMode::Off {
                    self.driver.set_capability(Capability::CullFace, true);
                }
                let face = if mode == FaceCullMode::Front { Face::Front } else { Face::Back };
                self.driver.set_cull_face(face);
            }
        }
        self.state.cull_mode = mode;
    }

    pub fn viewport(&self) -> Rect {
        self.state.viewport
    }

    pub fn set_viewport(&mut self, viewport: Rect) {
        debug_assert!(
            viewport.size().cmpge(glam::IVec2::ZERO).all(),
            "viewport {viewport:?} has a negative size"
        );
        if self.state.viewport != viewport {
            self.driver.set_viewport(viewport.to_origin_size());
            self.state.viewport = viewport;
        }
    }

    /// Viewport covering `width` x `height` pixels from the origin.
    pub fn set_viewport_size(&mut self, width: u32, height: u32) {
        self.set_viewport(Rect::from_size(width, height));
    }

    pub fn scissor(&self) -> Option<Rect> {
        self.state.scissor
    }

    /// `None` disables the scissor test.
    pub fn set_scissor(&mut self, scissor: Option<Rect>) {
        let old = self.state.scissor;
        if old == scissor {
            return;
        }

        match scissor {
            None => self.driver.set_capability(Capability::ScissorTest, false),
            Some(rect) => {
                debug_assert!(rect.size().cmpge(glam::IVec2::ZERO).all(), "scissor {rect:?} has a negative size");
                if old.is_none() {
                    self.driver.set_capability(Capability::ScissorTest, true);
                }
                self.driver.set_scissor(rect.to_origin_size());
            }
        }
        self.state.scissor = scissor;
    }

    pub fn disable_scissor(&mut self) {
        self.set_scissor(None);
    }

    pub fn color_blending(&self) -> BlendStateRgb {
        self.state.color_blending
    }

    pub fn alpha_blending(&self) -> BlendStateAlpha {
        self.state.alpha_blending
    }

    /// Color and alpha blending joined, if they use the same equation.
    pub fn blending(&self) -> Option<BlendStateRgba> {
        BlendStateRgba::join(self.state.color_blending, self.state.alpha_blending)
    }

    pub fn set_color_blending(&mut self, color: BlendStateRgb) {
        self.set_blending_separate(color, self.state.alpha_blending);
    }

    pub fn set_alpha_blending(&mut self, alpha: BlendStateAlpha) {
        self.set_blending_separate(self.state.color_blending, alpha);
    }

    /// Same equation for color and alpha.
    pub fn set_blending(&mut self, blending: BlendStateRgba) {
        self.set_blending_separate(blending.rgb(), blending.alpha());
    }

    /// Switches blending off while keeping the blend constant.
    pub fn disable_blending(&mut self) {
        self.set_blending_separate(
            BlendStateRgb {
                constant: self.state.color_blending.constant,
                ..BlendStateRgb::OPAQUE
            },
            BlendStateAlpha {
                constant: self.state.alpha_blending.constant,
                ..BlendStateAlpha::OPAQUE
            },
        );
    }

    /// Blending is enabled exactly when one of the two equations isn't opaque.
    pub fn set_blending_separate(&mut self, color: BlendStateRgb, alpha: BlendStateAlpha) {
        debug_assert!(
            color.constant.cmpge(glam::Vec3::ZERO).all() && color.constant.cmple(glam::Vec3::ONE).all(),
            "blend color constant {} outside of [0, 1]",
            color.constant
        );
        debug_assert!(
            (0.0..=1.0).contains(&alpha.constant),
            "blend alpha constant {} outside of [0, 1]",
            alpha.constant
        );

        let old_color = self.state.color_blending;
        let old_alpha = self.state.alpha_blending;
        if old_color == color && old_alpha == alpha {
            return;
        }

        let was_enabled = self.state.blending_enabled();
        let enabled = !(color.is_opaque() && alpha.is_opaque());

        let constant = color.constant.extend(alpha.constant);
        let constant_changed = constant != old_color.constant.extend(old_alpha.constant);
        let factors = BlendFactors {
            src_rgb: color.src,
            dest_rgb: color.dest,
            src_alpha: alpha.src,
            dest_alpha: alpha.dest,
        };

        match (was_enabled, enabled) {
            (false, true) => {
                self.driver.set_capability(Capability::Blend, true);
                self.driver.set_blend_func(factors);
                self.driver.set_blend_equation(color.op, alpha.op);
                self.driver.set_blend_color(constant);
            }
            (true, true) => {
                let factors_changed = old_color.src != color.src
                    || old_color.dest != color.dest
                    || old_alpha.src != alpha.src
                    || old_alpha.dest != alpha.dest;
                if factors_changed {
                    self.driver.set_blend_func(factors);
                }
                if old_color.op != color.op || old_alpha.op != alpha.op {
                    self.driver.set_blend_equation(color.op, alpha.op);
                }
                if constant_changed {
                    self.driver.set_blend_color(constant);
                }
            }
            (was_enabled, false) => {
                if was_enabled {
                    self.driver.set_capability(Capability::Blend, false);
                }
                if constant_changed {
                    self.driver.set_blend_color(constant);
                }
            }
        }

        self.state.color_blending = color;
        self.state.alpha_blending = alpha;
    }

    pub fn depth_test(&self) -> Option<CompareFunction> {
        self.state.depth_test
    }

    /// `None` disables the depth test.
    pub fn set_depth_test(&mut self, test: Option<CompareFunction>) {
        let old = self.state.depth_test;
        if old == test {
            return;
        }

        match test {
            None => self.driver.set_capability(Capability::DepthTest, false),
            Some(func) => {
                if old.is_none() {
                    self.driver.set_capability(Capability::DepthTest, true);
                }
                self.driver.set_depth_func(func);
            }
        }
        self.state.depth_test = test;
    }

    /// The stencil test shared by both faces.
    ///
    /// Both faces are expected to agree, use the per-face getters otherwise.
    pub fn stencil_test(&self) -> StencilTest {
        let faces = &self.state.stencil_test;
        debug_assert_eq!(faces.front, faces.back, "stencil test differs between faces");
        faces.front
    }

    pub fn front_stencil_test(&self) -> StencilTest {
        self.state.stencil_test.front
    }

    pub fn back_stencil_test(&self) -> StencilTest {
        self.state.stencil_test.back
    }

    /// Sets the same stencil test for both faces. A test of `None` switches the stencil test off.
    pub fn set_stencil_test(&mut self, test: StencilTest) {
        self.apply_stencil_test(Faces::both(test));
    }

    /// While the stencil test is on, a face without a test is stored as
    /// `Some(CompareFunction::Always)`; switching the test off takes the unified setter.
    pub fn set_front_stencil_test(&mut self, test: StencilTest) {
        self.apply_stencil_test(Faces {
            front: test,
            ..self.state.stencil_test
        });
    }

    /// See [`Context::set_front_stencil_test`].
    pub fn set_back_stencil_test(&mut self, test: StencilTest) {
        self.apply_stencil_test(Faces {
            back: test,
            ..self.state.stencil_test
        });
    }

    fn apply_stencil_test(&mut self, mut target: Faces<StencilTest>) {
        let old = self.state.stencil_test;
        let was_enabled = self.state.stencil_enabled();
        let enabled = target.front.test.is_some() || target.back.test.is_some();

        if enabled {
            for face in [&mut target.front, &mut target.back] {
                if face.test.is_none() {
                    face.test = Some(CompareFunction::Always);
                }
            }
        }
        if old == target {
            return;
        }

        if was_enabled != enabled {
            self.driver.set_capability(Capability::StencilTest, enabled);
        }

        // With the test off only the reference and mask are observable.
        let needs_call = |old: &StencilTest, new: &StencilTest| match (enabled, was_enabled) {
            (true, false) => true,
            (true, true) => old != new,
            (false, _) => old.reference != new.reference || old.read_mask != new.read_mask,
        };
        let func = |test: &StencilTest| StencilFunc {
            func: test.compare_function(),
            reference: test.reference,
            read_mask: test.read_mask,
        };

        let front = needs_call(&old.front, &target.front);
        let back = needs_call(&old.back, &target.back);
        let unified = if enabled {
            target.front == target.back
        } else {
            func(&target.front) == func(&target.back)
        };
        issue_per_face(front, back, unified, |face| {
            let test = if face == Face::Back { &target.back } else { &target.front };
            self.driver.set_stencil_func(face, func(test));
        });

        self.state.stencil_test = target;
    }

    /// The stencil operations shared by both faces.
    pub fn stencil_result(&self) -> StencilResult {
        let faces = &self.state.stencil_result;
        debug_assert_eq!(faces.front, faces.back, "stencil result differs between faces");
        faces.front
    }

    pub fn front_stencil_result(&self) -> StencilResult {
        self.state.stencil_result.front
    }

    pub fn back_stencil_result(&self) -> StencilResult {
        self.state.stencil_result.back
    }

    pub fn set_stencil_result(&mut self, result: StencilResult) {
        self.apply_stencil_result(Faces::both(result));
    }

    pub fn set_front_stencil_result(&mut self, result: StencilResult) {
        self.apply_stencil_result(Faces {
            front: result,
            ..self.state.stencil_result
        });
    }

    pub fn set_back_stencil_result(&mut self, result: StencilResult) {
        self.apply_stencil_result(Faces {
            back: result,
            ..self.state.stencil_result
        });
    }

    fn apply_stencil_result(&mut self, target: Faces<StencilResult>) {
        let old = self.state.stencil_result;
        issue_per_face(
            old.front != target.front,
            old.back != target.back,
            target.front == target.back,
            |face| {
                let result = if face == Face::Back { target.back } else { target.front };
                self.driver.set_stencil_op(face, result);
            },
        );
        self.state.stencil_result = target;
    }

    /// The stencil write mask shared by both faces.
    pub fn stencil_write_mask(&self) -> u32 {
        let faces = &self.state.stencil_write_mask;
        debug_assert_eq!(faces.front, faces.back, "stencil write mask differs between faces");
        faces.front
    }

    pub fn front_stencil_write_mask(&self) -> u32 {
        self.state.stencil_write_mask.front
    }

    pub fn back_stencil_write_mask(&self) -> u32 {
        self.state.stencil_write_mask.back
    }

    pub fn set_stencil_write_mask(&mut self, mask: u32) {
        self.apply_stencil_write_mask(Faces::both(mask));
    }

    pub fn set_front_stencil_write_mask(&mut self, mask: u32) {
        self.apply_stencil_write_mask(Faces {
            front: mask,
            ..self.state.stencil_write_mask
        });
    }

    pub fn set_back_stencil_write_mask(&mut self, mask: u32) {
        self.apply_stencil_write_mask(Faces {
            back: mask,
            ..self.state.stencil_write_mask
        });
    }

    fn apply_stencil_write_mask(&mut self, target: Faces<u32>) {
        let old = self.state.stencil_write_mask;
        issue_per_face(
            old.front != target.front,
            old.back != target.back,
            target.front == target.back,
            |face| {
                let mask = if face == Face::Back { target.back } else { target.front };
                self.driver.set_stencil_write_mask(face, mask);
            },
        );
        self.state.stencil_write_mask = target;
    }
}

impl<D: Driver> Drop for Context<D> {
    fn drop(&mut self) {
        if registry::unregister(self.id) {
            log::debug!("Destroyed context {}", self.id.get());
        }
    }
}

/// Issues one combined call if both faces need the same update, separate calls otherwise.
fn issue_per_face(front: bool, back: bool, unified: bool, mut issue: impl FnMut(Face)) {
    match (front, back) {
        (true, true) if unified => issue(Face::FrontAndBack),
        _ => {
            if front {
                issue(Face::Front);
            }
            if back {
                issue(Face::Back);
            }
        }
    }
}

fn realize_vsync<D: Driver + ?Sized>(driver: &D, mode: VsyncMode) -> Result<VsyncMode, DriverError> {
    match driver.set_swap_interval(mode) {
        Ok(()) => Ok(mode),
        Err(DriverError::UnsupportedVsync(VsyncMode::Adaptive)) => {
            log::warn!("Adaptive vsync is not supported, falling back to regular vsync");
            driver.set_swap_interval(VsyncMode::On)?;
            Ok(VsyncMode::On)
        }
        Err(e) => Err(e),
    }
}
