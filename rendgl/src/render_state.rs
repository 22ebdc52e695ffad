use glam::{BVec4, IVec2, Vec4Swizzles};
use rendgl_types::{
    BlendStateAlpha, BlendStateRgb, CompareFunction, Face, FaceCullMode, Faces, Rect,
    StencilResult, StencilTest,
};

use crate::{Capability, Driver};

/// Snapshot of every piece of global state the [`Context`](crate::Context) tracks.
///
/// A disabled feature is represented by its sentinel value (`Off`, `None`, or an
/// opaque blend equation) rather than a separate flag, so there is exactly one
/// `RenderState` for each observable driver state.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderState {
    pub color_write_mask: BVec4,
    pub depth_write: bool,
    pub cull_mode: FaceCullMode,
    pub viewport: Rect,
    /// `None` disables the scissor test.
    pub scissor: Option<Rect>,
    pub color_blending: BlendStateRgb,
    pub alpha_blending: BlendStateAlpha,
    /// `None` disables the depth test.
    pub depth_test: Option<CompareFunction>,
    pub stencil_test: Faces<StencilTest>,
    pub stencil_result: Faces<StencilResult>,
    pub stencil_write_mask: Faces<u32>,
}

impl RenderState {
    /// Reads the complete state back from the driver.
    pub fn query<D: Driver + ?Sized>(driver: &D) -> Self {
        profiling::scope!("RenderState::query");

        let cull_mode = if driver.capability(Capability::CullFace) {
            match driver.cull_face() {
                Face::Front => FaceCullMode::Front,
                // Culling both faces can't be expressed, treat it like back face culling.
                Face::Back | Face::FrontAndBack => FaceCullMode::Back,
            }
        } else {
            FaceCullMode::Off
        };

        let [x, y, width, height] = driver.viewport();
        let viewport = Rect::from_origin_size(IVec2::new(x, y), IVec2::new(width, height));

        let scissor = driver.capability(Capability::ScissorTest).then(|| {
            let [x, y, width, height] = driver.scissor();
            Rect::from_origin_size(IVec2::new(x, y), IVec2::new(width, height))
        });

        let constant = driver.blend_color();
        let (color_blending, alpha_blending) = if driver.capability(Capability::Blend) {
            let factors = driver.blend_func();
            let (rgb_op, alpha_op) = driver.blend_equation();
            (
                BlendStateRgb::new(factors.src_rgb, factors.dest_rgb, rgb_op, constant.xyz()),
                BlendStateAlpha::new(factors.src_alpha, factors.dest_alpha, alpha_op, constant.w),
            )
        } else {
            (
                BlendStateRgb {
                    constant: constant.xyz(),
                    ..BlendStateRgb::OPAQUE
                },
                BlendStateAlpha {
                    constant: constant.w,
                    ..BlendStateAlpha::OPAQUE
                },
            )
        };

        let depth_test = driver
            .capability(Capability::DepthTest)
            .then(|| driver.depth_func());

        let stencil_enabled = driver.capability(Capability::StencilTest);
        let stencil_face = |face| {
            let func = driver.stencil_func(face);
            StencilTest {
                test: stencil_enabled.then_some(func.func),
                reference: func.reference,
                read_mask: func.read_mask,
            }
        };
        let stencil_test = Faces {
            front: stencil_face(Face::Front),
            back: stencil_face(Face::Back),
        };

        Self {
            color_write_mask: driver.color_mask(),
            depth_write: driver.depth_mask(),
            cull_mode,
            viewport,
            scissor,
            color_blending,
            alpha_blending,
            depth_test,
            stencil_test,
            stencil_result: Faces {
                front: driver.stencil_op(Face::Front),
                back: driver.stencil_op(Face::Back),
            },
            stencil_write_mask: Faces {
                front: driver.stencil_write_mask(Face::Front),
                back: driver.stencil_write_mask(Face::Back),
            },
        }
    }

    /// Whether the driver has blending switched on in this state.
    pub fn blending_enabled(&self) -> bool {
        !(self.color_blending.is_opaque() && self.alpha_blending.is_opaque())
    }

    /// Whether the driver has the stencil test switched on in this state.
    pub fn stencil_enabled(&self) -> bool {
        self.stencil_test.front.test.is_some() || self.stencil_test.back.test.is_some()
    }
}
