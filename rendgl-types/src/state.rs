use glam::{IVec2, Vec3, Vec4};

/// Comparison used by the depth and stencil tests.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum CompareFunction {
    Never,
    Always,
    Less,
    LessOrEqual,
    Equal,
    NotEqual,
    GreaterOrEqual,
    Greater,
}

impl CompareFunction {
    pub const ARRAY: [Self; 8] = [
        Self::Never,
        Self::Always,
        Self::Less,
        Self::LessOrEqual,
        Self::Equal,
        Self::NotEqual,
        Self::GreaterOrEqual,
        Self::Greater,
    ];
}

/// Which triangle faces get culled.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum FaceCullMode {
    /// Face culling is disabled.
    #[default]
    Off,
    Front,
    Back,
}

/// Face selector used when talking to the driver.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Face {
    Front,
    Back,
    FrontAndBack,
}

/// Swap interval of the window surface.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub enum VsyncMode {
    Off,
    On,
    /// Sync when running fast enough, tear otherwise. Falls back to [`VsyncMode::On`]
    /// on platforms which do not support it.
    #[default]
    Adaptive,
}

/// Axis aligned integer rectangle described by its inclusive min and max corners.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub min: IVec2,
    pub max: IVec2,
}

impl Rect {
    pub const fn new(min: IVec2, max: IVec2) -> Self {
        Self { min, max }
    }

    /// Builds a rectangle from the driver's (origin, size) convention.
    pub fn from_origin_size(origin: IVec2, size: IVec2) -> Self {
        Self {
            min: origin,
            max: origin + size - IVec2::ONE,
        }
    }

    /// Rectangle starting at the origin covering `width` x `height` pixels.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::from_origin_size(IVec2::ZERO, IVec2::new(width as i32, height as i32))
    }

    pub fn size(&self) -> IVec2 {
        self.max - self.min + IVec2::ONE
    }

    /// `[x, y, width, height]` as the driver expects it.
    pub fn to_origin_size(&self) -> [i32; 4] {
        let size = self.size();
        [self.min.x, self.min.y, size.x, size.y]
    }

    pub fn contains(&self, point: IVec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

/// A value that is tracked separately for front and back faces.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Faces<T> {
    pub front: T,
    pub back: T,
}

impl<T: Clone> Faces<T> {
    /// Same value for both windings.
    pub fn both(value: T) -> Self {
        Self {
            front: value.clone(),
            back: value,
        }
    }
}

impl<T: PartialEq> Faces<T> {
    /// The shared value, if both faces agree.
    pub fn unified(&self) -> Option<&T> {
        (self.front == self.back).then_some(&self.front)
    }

    pub fn get(&self, face: Face) -> Option<&T> {
        match face {
            Face::Front => Some(&self.front),
            Face::Back => Some(&self.back),
            Face::FrontAndBack => self.unified(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    ConstantColor,
    OneMinusConstantColor,
    ConstantAlpha,
    OneMinusConstantAlpha,
    SrcAlphaSaturate,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BlendOperation {
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

/// Blend equation for one set of channels. `C` is the type of the blend constant:
/// [`Vec3`] for color, `f32` for alpha, [`Vec4`] for both at once.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct BlendState<C> {
    pub src: BlendFactor,
    pub dest: BlendFactor,
    pub op: BlendOperation,
    /// Every component must be in `[0, 1]`.
    pub constant: C,
}

pub type BlendStateRgb = BlendState<Vec3>;
pub type BlendStateAlpha = BlendState<f32>;
pub type BlendStateRgba = BlendState<Vec4>;

impl<C> BlendState<C> {
    pub const fn new(src: BlendFactor, dest: BlendFactor, op: BlendOperation, constant: C) -> Self {
        Self { src, dest, op, constant }
    }

    /// Whether this equation just writes the incoming value, which is what the
    /// driver does with blending disabled.
    pub fn is_opaque(&self) -> bool {
        self.src == BlendFactor::One && self.dest == BlendFactor::Zero && self.op == BlendOperation::Add
    }

    /// Same factors and operation, ignoring the constant.
    pub fn same_equation<O>(&self, other: &BlendState<O>) -> bool {
        self.src == other.src && self.dest == other.dest && self.op == other.op
    }

    pub fn with_constant<O>(&self, constant: O) -> BlendState<O> {
        BlendState {
            src: self.src,
            dest: self.dest,
            op: self.op,
            constant,
        }
    }
}

macro_rules! blend_presets {
    ($ty:ty, $zero:expr) => {
        impl BlendState<$ty> {
            /// No blending, the new value replaces the old one.
            pub const OPAQUE: Self = Self::new(BlendFactor::One, BlendFactor::Zero, BlendOperation::Add, $zero);
            /// Classic alpha blending.
            pub const TRANSPARENT: Self = Self::new(
                BlendFactor::SrcAlpha,
                BlendFactor::OneMinusSrcAlpha,
                BlendOperation::Add,
                $zero,
            );
            pub const ADDITIVE: Self = Self::new(BlendFactor::One, BlendFactor::One, BlendOperation::Add, $zero);
        }

        impl Default for BlendState<$ty> {
            fn default() -> Self {
                Self::OPAQUE
            }
        }
    };
}

blend_presets!(Vec3, Vec3::ZERO);
blend_presets!(f32, 0.0);
blend_presets!(Vec4, Vec4::ZERO);

impl BlendStateRgba {
    /// Joins a color and alpha equation. Returns `None` if the two use different
    /// factors or operations.
    pub fn join(rgb: BlendStateRgb, alpha: BlendStateAlpha) -> Option<Self> {
        rgb.same_equation(&alpha)
            .then(|| rgb.with_constant(rgb.constant.extend(alpha.constant)))
    }

    pub fn rgb(&self) -> BlendStateRgb {
        self.with_constant(self.constant.truncate())
    }

    pub fn alpha(&self) -> BlendStateAlpha {
        self.with_constant(self.constant.w)
    }
}

/// What happens to the stencil buffer value.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum StencilOp {
    Zero,
    Keep,
    Replace,
    Invert,
    IncrementClamp,
    DecrementClamp,
    IncrementWrap,
    DecrementWrap,
}

/// The stencil test for one face.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct StencilTest {
    /// `None` means the face is not stencil tested.
    pub test: Option<CompareFunction>,
    pub reference: i32,
    /// Bits of the stencil value and the reference which take part in the comparison.
    pub read_mask: u32,
}

impl StencilTest {
    pub const OFF: Self = Self {
        test: None,
        reference: 0,
        read_mask: !0,
    };

    pub const fn new(test: CompareFunction, reference: i32, read_mask: u32) -> Self {
        Self {
            test: Some(test),
            reference,
            read_mask,
        }
    }

    /// The comparison the driver performs; a face without a test always passes.
    pub fn compare_function(&self) -> CompareFunction {
        self.test.unwrap_or(CompareFunction::Always)
    }
}

impl Default for StencilTest {
    fn default() -> Self {
        Self::OFF
    }
}

/// Stencil buffer operations for each outcome of the stencil and depth tests.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct StencilResult {
    pub on_failed_stencil: StencilOp,
    pub on_passed_stencil_failed_depth: StencilOp,
    pub on_passed_both: StencilOp,
}

impl StencilResult {
    pub const KEEP: Self = Self::new(StencilOp::Keep, StencilOp::Keep, StencilOp::Keep);

    pub const fn new(on_failed_stencil: StencilOp, on_passed_stencil_failed_depth: StencilOp, on_passed_both: StencilOp) -> Self {
        Self {
            on_failed_stencil,
            on_passed_stencil_failed_depth,
            on_passed_both,
        }
    }
}

impl Default for StencilResult {
    fn default() -> Self {
        Self::KEEP
    }
}
