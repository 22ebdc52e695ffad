//! GPU textures and the bindless views into them.
//!
//! A [`Texture`] lazily creates one bindless handle per distinct [`ViewKey`] and
//! caches it, so asking twice for the same sampler or image parameters hands out
//! views sharing one handle. Handles are made resident while at least one view
//! holding them is alive, and torn down together with the texture.
//!
//! Image handles don't depend on the access mode, which is only passed when the
//! handle is made resident. While an image handle is held, views with a different
//! access mode are refused with [`ViewError::AccessConflict`].

use std::{cell::RefCell, fmt, rc::Rc};

use glam::UVec3;
use rendgl_types::{
    ImageAccess, ImageViewKey, Sampler, SamplerHandle, TextureDescriptor, TextureFormat, TextureHandle, TextureType,
    ViewHandle, ViewKey, ViewUsage,
};
use smallvec::SmallVec;

use crate::{
    registry::{self, ContextId},
    util::typedefs::FastHashMap,
    Context, Driver, DriverError, GlowDriver, TextureCreationError, TextureError, ViewError,
};

mod residency;
mod view;

use residency::ViewResidency;
pub use view::{ImageView, TextureView};

/// A texture with immutable storage, owning every bindless handle made from it.
///
/// Dropping the texture makes all of its handles non-resident and invalidates every
/// view still pointing at it. It must be dropped before its [`Context`].
pub struct Texture<D: Driver = GlowDriver> {
    context: ContextId,
    driver: Rc<D>,
    raw: TextureHandle,
    desc: TextureDescriptor,
    mip_levels: u32,
    views: RefCell<FastHashMap<ViewKey, Rc<ViewResidency<D>>>>,
}

impl<D: Driver> Texture<D> {
    /// Validates the descriptor, then allocates storage for every mip level and
    /// stores the default sampler on the texture.
    pub fn new(context: &Context<D>, desc: TextureDescriptor) -> Result<Self, TextureCreationError> {
        profiling::scope!("Texture::new");

        let mip_levels = validate_descriptor(&desc)?;

        let driver = context.shared_driver();
        let raw = driver.create_texture(&desc, mip_levels)?;
        driver.apply_texture_sampler(raw, desc.ty, &desc.sampler);

        log::debug!(
            "Created texture {:?} {:?}: {:?} {:?} {}x{}x{} with {} mips",
            raw,
            desc.label.as_deref().unwrap_or("unlabeled"),
            desc.ty,
            desc.format,
            desc.size.x,
            desc.size.y,
            desc.size.z,
            mip_levels
        );

        Ok(Self {
            context: context.id(),
            driver,
            raw,
            desc,
            mip_levels,
            views: RefCell::new(FastHashMap::default()),
        })
    }

    pub fn raw(&self) -> TextureHandle {
        self.raw
    }

    pub fn descriptor(&self) -> &TextureDescriptor {
        &self.desc
    }

    pub fn label(&self) -> Option<&str> {
        self.desc.label.as_deref()
    }

    pub fn ty(&self) -> TextureType {
        self.desc.ty
    }

    pub fn format(&self) -> TextureFormat {
        self.desc.format
    }

    pub fn size(&self) -> UVec3 {
        self.desc.size
    }

    pub fn mip_levels(&self) -> u32 {
        self.mip_levels
    }

    pub fn layer_count(&self) -> u32 {
        self.desc.layer_count()
    }

    pub fn default_sampler(&self) -> &Sampler {
        &self.desc.sampler
    }

    /// Number of distinct handles created so far.
    pub fn cached_view_count(&self) -> usize {
        self.views.borrow().len()
    }

    /// Number of handles which are currently resident.
    pub fn resident_view_count(&self) -> usize {
        self.views.borrow().values().filter(|r| r.active_count() > 0).count()
    }

    /// Regenerates mip levels 1.. from the contents of level 0.
    pub fn recompute_mips(&self) -> Result<(), TextureError> {
        profiling::scope!("Texture::recompute_mips");
        if self.desc.format.is_compressed() {
            return Err(TextureError::CompressedMipmaps { format: self.desc.format });
        }
        if self.mip_levels > 1 {
            self.driver.generate_mipmaps(self.raw, self.desc.ty);
        }
        Ok(())
    }

    /// View for sampling the texture. `None` uses the texture's default sampler,
    /// anything else gets its own sampler object.
    pub fn texture_view(&self, sampler: Option<Sampler>) -> Result<TextureView<D>, ViewError> {
        let sampler = sampler.unwrap_or(self.desc.sampler);
        sampler.validate_for(self.desc.format)?;

        let residency = self.residency(ViewKey::Sampled(sampler), || {
            let sampler_object = if sampler != self.desc.sampler {
                Some(self.driver.create_sampler(&sampler)?)
            } else {
                None
            };
            let handle = self.driver.texture_view_handle(self.raw, sampler_object);
            if handle.is_null() {
                if let Some(sampler_object) = sampler_object {
                    self.driver.delete_sampler(sampler_object);
                }
                return Err(self.null_handle("texture view"));
            }
            Ok(ViewResidency::new(
                Rc::clone(&self.driver),
                self.raw,
                handle,
                ViewUsage::Sampled,
                sampler_object,
            ))
        })?;

        Ok(TextureView::new(residency, sampler))
    }

    /// View for image load/store of one mip level (zero-based), in the texture's own format.
    ///
    /// `single_layer` of `None` exposes every layer of a layered texture.
    pub fn image_view(
        &self,
        access: ImageAccess,
        single_layer: Option<u32>,
        mip_level: u32,
    ) -> Result<ImageView<D>, ViewError> {
        self.image_view_as(self.desc.format, access, single_layer, mip_level)
    }

    /// Like [`Texture::image_view`], but the shader sees the texels as `format`.
    /// The format has to be size compatible with the texture's.
    ///
    /// The driver hands out one handle per level, layer and format. Views which only
    /// differ in access mode share it, and can't be alive at the same time.
    pub fn image_view_as(
        &self,
        format: TextureFormat,
        access: ImageAccess,
        single_layer: Option<u32>,
        mip_level: u32,
    ) -> Result<ImageView<D>, ViewError> {
        if mip_level >= self.mip_levels {
            return Err(ViewError::MipOutOfRange {
                level: mip_level,
                count: self.mip_levels,
            });
        }
        if let Some(layer) = single_layer {
            let count = self.layer_count();
            if layer >= count {
                return Err(ViewError::LayerOutOfRange { layer, count });
            }
        }
        if !format.supports_image_access() {
            return Err(ViewError::UnsupportedImageFormat { format, access });
        }

        let key = ImageViewKey {
            mip_level,
            single_layer,
            access,
            format,
        };
        let residency = self.residency(ViewKey::Image(key.handle_key()), || {
            let handle = self.driver.image_view_handle(self.raw, mip_level, single_layer, format);
            if handle.is_null() {
                return Err(self.null_handle("image view"));
            }
            Ok(ViewResidency::new(
                Rc::clone(&self.driver),
                self.raw,
                handle,
                ViewUsage::Image(access),
                None,
            ))
        })?;
        residency
            .set_usage(ViewUsage::Image(access))
            .map_err(|resident| ViewError::AccessConflict { requested: access, resident })?;

        Ok(ImageView::new(residency, key))
    }

    fn null_handle(&self, kind: &'static str) -> ViewError {
        ViewError::Driver(DriverError::ObjectCreation {
            kind,
            message: format!("driver returned {:?} for texture {:?}", ViewHandle::NULL, self.raw),
        })
    }

    fn residency(
        &self,
        key: ViewKey,
        create: impl FnOnce() -> Result<ViewResidency<D>, ViewError>,
    ) -> Result<Rc<ViewResidency<D>>, ViewError> {
        if let Some(residency) = self.views.borrow().get(&key) {
            return Ok(Rc::clone(residency));
        }

        let residency = Rc::new(create()?);
        log::debug!("Created view {:?} of texture {:?} for {:?}", residency.handle(), self.raw, key);
        self.views.borrow_mut().insert(key, Rc::clone(&residency));
        Ok(residency)
    }
}

impl<D: Driver> Drop for Texture<D> {
    fn drop(&mut self) {
        let views = std::mem::take(self.views.get_mut());

        if registry::current() != Some(self.context) {
            debug_assert!(false, "texture {:?} outlived its context {:?}", self.raw, self.context);
            log::error!("Leaking texture {:?}, its context {:?} is gone", self.raw, self.context);
            for residency in views.values() {
                residency.abandon();
            }
            return;
        }

        let samplers: SmallVec<[SamplerHandle; 4]> = views.into_values().filter_map(|r| r.release()).collect();
        for sampler in samplers {
            self.driver.delete_sampler(sampler);
        }
        self.driver.delete_texture(self.raw);

        log::debug!("Destroyed texture {:?}", self.raw);
    }
}

impl<D: Driver> fmt::Debug for Texture<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Texture")
            .field("raw", &self.raw)
            .field("desc", &self.desc)
            .field("mip_levels", &self.mip_levels)
            .field("cached_views", &self.cached_view_count())
            .finish()
    }
}

/// Checks everything the driver would otherwise reject. Returns the mip level count.
fn validate_descriptor(desc: &TextureDescriptor) -> Result<u32, TextureCreationError> {
    if desc.size.min_element() == 0 {
        return Err(TextureCreationError::ZeroSize { size: desc.size });
    }

    if matches!(desc.ty, TextureType::Cube | TextureType::CubeArray) && desc.size.x != desc.size.y {
        return Err(TextureCreationError::NonSquareCube {
            width: desc.size.x,
            height: desc.size.y,
        });
    }

    let compatible = match desc.ty {
        TextureType::D1 | TextureType::D1Array => !desc.format.is_compressed() && !desc.format.is_depth_stencil(),
        TextureType::D3 => !desc.format.is_depth_stencil(),
        TextureType::D2 | TextureType::D2Array | TextureType::Cube | TextureType::CubeArray => true,
    };
    if !compatible {
        return Err(TextureCreationError::IncompatibleFormat {
            ty: desc.ty,
            format: desc.format,
        });
    }

    let max = desc.max_mip_levels();
    let requested = desc.mip_levels();
    if requested > max {
        return Err(TextureCreationError::TooManyMips { requested, max });
    }

    desc.sampler.validate_for(desc.format)?;

    Ok(requested)
}
