use std::{fmt, rc::Rc};

use rendgl_types::{ImageAccess, ImageViewKey, Sampler, TextureFormat, TextureHandle, ViewHandle};

use crate::{texture::residency::ViewResidency, Driver, GlowDriver};

/// One activation of a residency record, held for as long as the view lives.
struct ViewRef<D: Driver> {
    residency: Rc<ViewResidency<D>>,
}

impl<D: Driver> ViewRef<D> {
    fn new(residency: Rc<ViewResidency<D>>) -> Self {
        residency.activate();
        Self { residency }
    }
}

impl<D: Driver> Clone for ViewRef<D> {
    fn clone(&self) -> Self {
        Self::new(Rc::clone(&self.residency))
    }

    fn clone_from(&mut self, source: &Self) {
        if Rc::ptr_eq(&self.residency, &source.residency) {
            debug_assert_eq!(self.residency.handle(), source.residency.handle());
            return;
        }
        *self = source.clone();
    }
}

impl<D: Driver> Drop for ViewRef<D> {
    fn drop(&mut self) {
        self.residency.deactivate();
    }
}

/// Bindless handle for sampling a texture.
///
/// The handle stays resident while any clone of the view is alive. Views don't keep
/// their texture alive; once it is dropped [`TextureView::is_valid`] returns false
/// and the handle must not be used anymore.
pub struct TextureView<D: Driver = GlowDriver> {
    inner: ViewRef<D>,
    sampler: Sampler,
}

impl<D: Driver> TextureView<D> {
    pub(super) fn new(residency: Rc<ViewResidency<D>>, sampler: Sampler) -> Self {
        Self {
            inner: ViewRef::new(residency),
            sampler,
        }
    }

    /// The 64-bit handle to hand to shaders.
    pub fn handle(&self) -> ViewHandle {
        self.inner.residency.handle()
    }

    /// Texture the view was created from.
    pub fn owner(&self) -> TextureHandle {
        self.inner.residency.owner()
    }

    pub fn sampler(&self) -> &Sampler {
        &self.sampler
    }

    /// Number of live activations of the underlying handle, shared with every
    /// other view of the same texture and sampler.
    pub fn active_count(&self) -> u32 {
        self.inner.residency.active_count()
    }

    /// False once the owning texture has been destroyed.
    pub fn is_valid(&self) -> bool {
        !self.inner.residency.is_released()
    }
}

impl<D: Driver> Clone for TextureView<D> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            sampler: self.sampler,
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.inner.clone_from(&source.inner);
        self.sampler = source.sampler;
    }
}

impl<D: Driver> fmt::Debug for TextureView<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureView")
            .field("handle", &self.handle())
            .field("owner", &self.owner())
            .field("active_count", &self.active_count())
            .finish()
    }
}

/// Bindless handle for image load/store of one mip level of a texture.
///
/// Residency follows the same rules as [`TextureView`].
pub struct ImageView<D: Driver = GlowDriver> {
    inner: ViewRef<D>,
    key: ImageViewKey,
}

impl<D: Driver> ImageView<D> {
    pub(super) fn new(residency: Rc<ViewResidency<D>>, key: ImageViewKey) -> Self {
        Self {
            inner: ViewRef::new(residency),
            key,
        }
    }

    pub fn handle(&self) -> ViewHandle {
        self.inner.residency.handle()
    }

    pub fn owner(&self) -> TextureHandle {
        self.inner.residency.owner()
    }

    pub fn access(&self) -> ImageAccess {
        self.key.access
    }

    /// Zero-based.
    pub fn mip_level(&self) -> u32 {
        self.key.mip_level
    }

    pub fn single_layer(&self) -> Option<u32> {
        self.key.single_layer
    }

    pub fn format(&self) -> TextureFormat {
        self.key.format
    }

    pub fn active_count(&self) -> u32 {
        self.inner.residency.active_count()
    }

    pub fn is_valid(&self) -> bool {
        !self.inner.residency.is_released()
    }
}

impl<D: Driver> Clone for ImageView<D> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            key: self.key,
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.inner.clone_from(&source.inner);
        self.key = source.key;
    }
}

impl<D: Driver> fmt::Debug for ImageView<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageView")
            .field("handle", &self.handle())
            .field("owner", &self.owner())
            .field("key", &self.key)
            .field("active_count", &self.active_count())
            .finish()
    }
}
