use anyhow::Context as _;
use rendgl::{
    types::{
        ImageAccess, MipmapCount, PixelFilter, Sampler, TextureDescriptor, TextureFormat, TextureType, ViewUsage,
        WrapMode,
    },
    DriverError, Texture, ViewError,
};
use rendgl_test::{DriverCall, RecordingDriver, TestRunner};

fn color_texture(runner: &TestRunner) -> anyhow::Result<Texture<RecordingDriver>> {
    let desc = TextureDescriptor::new_2d(TextureFormat::Rgba8Unorm, 64, 64).with_mips(MipmapCount::Maximum);
    let texture = Texture::new(&runner.context, desc)?;
    runner.take_calls();
    Ok(texture)
}

#[test]
pub fn texture_views_are_cached_per_sampler() -> anyhow::Result<()> {
    let runner = TestRunner::new()?;
    let texture = color_texture(&runner)?;
    let raw = texture.raw();

    let first = texture.texture_view(None)?;
    assert_eq!(
        runner.take_calls(),
        [
            DriverCall::CreateTextureView {
                texture: raw,
                sampler: None
            },
            DriverCall::MakeResident(first.handle(), ViewUsage::Sampled),
        ]
    );

    let second = texture.texture_view(None)?;
    let explicit_default = texture.texture_view(Some(*texture.default_sampler()))?;
    assert!(runner.take_calls().is_empty());
    assert_eq!(second.handle(), first.handle());
    assert_eq!(explicit_default.handle(), first.handle());
    assert_eq!(first.active_count(), 3);

    let nearest = texture.texture_view(Some(Sampler::NEAREST_CLAMPED))?;
    let calls = runner.take_calls();
    let sampler = match calls.first() {
        Some(&DriverCall::CreateSampler(sampler)) => sampler,
        other => anyhow::bail!("expected a sampler to be created, got {other:?}"),
    };
    assert_eq!(
        calls[1..],
        [
            DriverCall::CreateTextureView {
                texture: raw,
                sampler: Some(sampler)
            },
            DriverCall::MakeResident(nearest.handle(), ViewUsage::Sampled),
        ]
    );
    assert_ne!(nearest.handle(), first.handle());
    assert_eq!(nearest.active_count(), 1);
    assert_eq!(texture.cached_view_count(), 2);

    Ok(())
}

#[test]
pub fn residency_follows_live_views() -> anyhow::Result<()> {
    let runner = TestRunner::new()?;
    let texture = color_texture(&runner)?;

    let view = texture.texture_view(None)?;
    let handle = view.handle();
    let copy = view.clone();
    assert_eq!(view.active_count(), 2);
    runner.take_calls();

    drop(view);
    assert!(runner.take_calls().is_empty());
    assert!(runner.driver().is_handle_resident(handle));

    drop(copy);
    assert_eq!(runner.take_calls(), [DriverCall::MakeNonResident(handle, ViewUsage::Sampled)]);
    assert!(!runner.driver().is_handle_resident(handle));
    assert_eq!(texture.resident_view_count(), 0);
    assert_eq!(texture.cached_view_count(), 1);

    // The cached handle is made resident again without being recreated.
    let again = texture.texture_view(None)?;
    assert_eq!(again.handle(), handle);
    assert_eq!(runner.take_calls(), [DriverCall::MakeResident(handle, ViewUsage::Sampled)]);
    assert_eq!(runner.driver().invalid_operations(), 0);

    Ok(())
}

#[test]
pub fn clone_from_moves_the_activation() -> anyhow::Result<()> {
    let runner = TestRunner::new()?;
    let texture = color_texture(&runner)?;

    let linear = texture.texture_view(None)?;
    let nearest = texture.texture_view(Some(Sampler::NEAREST_CLAMPED))?;
    let mut target = linear.clone();
    runner.take_calls();

    target.clone_from(&linear);
    assert_eq!(linear.active_count(), 2);
    assert!(runner.take_calls().is_empty());

    target.clone_from(&nearest);
    assert_eq!(linear.active_count(), 1);
    assert_eq!(nearest.active_count(), 2);
    assert_eq!(target.handle(), nearest.handle());
    assert_eq!(target.sampler(), &Sampler::NEAREST_CLAMPED);
    assert!(runner.take_calls().is_empty());

    Ok(())
}

#[test]
pub fn sampler_must_fit_format() -> anyhow::Result<()> {
    let runner = TestRunner::new()?;
    let texture = Texture::new(
        &runner.context,
        TextureDescriptor::new_2d(TextureFormat::R32Uint, 8, 8).with_sampler(Sampler::NEAREST_CLAMPED),
    )?;
    runner.take_calls();

    let linear = Sampler::new(WrapMode::Repeat, PixelFilter::Linear);
    assert!(matches!(texture.texture_view(Some(linear)), Err(ViewError::Sampler(_))));
    assert!(runner.take_calls().is_empty());
    assert_eq!(texture.cached_view_count(), 0);

    Ok(())
}

/// Two requests for the same level and access share one handle; its counter reaches 2
/// while both are alive and 0 once both are gone.
#[test]
pub fn image_views_share_handles() -> anyhow::Result<()> {
    let runner = TestRunner::new()?;
    let texture = color_texture(&runner)?;

    let first = texture.image_view(ImageAccess::ReadWrite, None, 1)?;
    let second = texture.image_view(ImageAccess::ReadWrite, None, 1)?;
    assert_eq!(first.handle(), second.handle());
    assert_eq!(first.active_count(), 2);
    assert_eq!(first.mip_level(), 1);
    assert_eq!(first.format(), TextureFormat::Rgba8Unorm);
    assert_eq!(
        runner.take_calls(),
        [
            DriverCall::CreateImageView {
                texture: texture.raw(),
                level: 1,
                layer: None,
                format: TextureFormat::Rgba8Unorm,
            },
            DriverCall::MakeResident(first.handle(), ViewUsage::Image(ImageAccess::ReadWrite)),
        ]
    );

    let handle = first.handle();
    drop(first);
    assert_eq!(second.active_count(), 1);
    drop(second);
    assert_eq!(
        runner.take_calls(),
        [DriverCall::MakeNonResident(handle, ViewUsage::Image(ImageAccess::ReadWrite))]
    );
    assert_eq!(texture.resident_view_count(), 0);

    Ok(())
}

#[test]
pub fn image_view_validation() -> anyhow::Result<()> {
    let runner = TestRunner::new()?;
    let texture = Texture::new(
        &runner.context,
        TextureDescriptor {
            ty: TextureType::D2Array,
            size: glam::UVec3::new(16, 16, 4),
            ..TextureDescriptor::new_2d(TextureFormat::Rgba8Unorm, 16, 16)
        }
        .with_mips(MipmapCount::Maximum),
    )?;
    runner.take_calls();

    assert!(matches!(
        texture.image_view(ImageAccess::Write, None, 5),
        Err(ViewError::MipOutOfRange { level: 5, count: 5 })
    ));
    assert!(matches!(
        texture.image_view(ImageAccess::Write, Some(4), 0),
        Err(ViewError::LayerOutOfRange { layer: 4, count: 4 })
    ));
    assert!(matches!(
        texture.image_view_as(TextureFormat::Rgba8UnormSrgb, ImageAccess::Read, None, 0),
        Err(ViewError::UnsupportedImageFormat { .. })
    ));
    assert!(runner.take_calls().is_empty());

    let layer = texture.image_view_as(TextureFormat::R32Uint, ImageAccess::Read, Some(3), 4)?;
    assert_eq!(layer.single_layer(), Some(3));
    assert_eq!(
        runner.take_calls()[0],
        DriverCall::CreateImageView {
            texture: texture.raw(),
            level: 4,
            layer: Some(3),
            format: TextureFormat::R32Uint,
        }
    );

    Ok(())
}

/// Destroying a texture drains every handle before the texture object goes away, and
/// views outliving it become invalid.
#[test]
pub fn texture_drop_releases_views() -> anyhow::Result<()> {
    let runner = TestRunner::new()?;
    let texture = color_texture(&runner)?;
    let raw = texture.raw();

    let sampled = texture.texture_view(None)?;
    let _sampled_copy = sampled.clone();
    let nearest = texture.texture_view(Some(Sampler::NEAREST_CLAMPED))?;
    let image = texture.image_view(ImageAccess::Write, None, 0)?;
    drop(texture.texture_view(Some(Sampler::new(WrapMode::MirroredRepeat, PixelFilter::Nearest)))?);
    assert_eq!(runner.driver().resident_count(), 3);
    assert_eq!(runner.driver().live_samplers(), 2);
    runner.take_calls();

    drop(texture);
    let calls = runner.take_calls();
    let non_resident = calls
        .iter()
        .filter(|call| matches!(call, DriverCall::MakeNonResident(..)))
        .count();
    let deleted_samplers = calls
        .iter()
        .filter(|call| matches!(call, DriverCall::DeleteSampler(_)))
        .count();
    assert_eq!(non_resident, 3);
    assert_eq!(deleted_samplers, 2);
    assert_eq!(calls.last(), Some(&DriverCall::DeleteTexture(raw)));

    assert_eq!(runner.driver().resident_count(), 0);
    assert_eq!(runner.driver().live_samplers(), 0);
    assert_eq!(runner.driver().live_textures(), 0);
    assert_eq!(runner.driver().invalid_operations(), 0);

    assert!(!sampled.is_valid());
    assert!(!nearest.is_valid());
    assert!(!image.is_valid());
    assert_eq!(sampled.active_count(), 0);

    drop(sampled);
    drop(image);
    assert!(runner.take_calls().is_empty());
    assert_eq!(runner.driver().invalid_operations(), 0);

    Ok(())
}

/// Read and write views of one level share the driver's handle, so only one access
/// mode can hold it at a time.
#[test]
pub fn image_access_is_fixed_while_held() -> anyhow::Result<()> {
    let runner = TestRunner::new()?;
    let texture = color_texture(&runner)?;

    let read = texture.image_view(ImageAccess::Read, None, 0)?;
    let handle = read.handle();
    assert_eq!(
        runner.take_calls(),
        [
            DriverCall::CreateImageView {
                texture: texture.raw(),
                level: 0,
                layer: None,
                format: TextureFormat::Rgba8Unorm,
            },
            DriverCall::MakeResident(handle, ViewUsage::Image(ImageAccess::Read)),
        ]
    );

    let err = texture
        .image_view(ImageAccess::Write, None, 0)
        .err()
        .context("write view was created while a read view is alive")?;
    assert!(matches!(
        err,
        ViewError::AccessConflict {
            requested: ImageAccess::Write,
            resident: ViewUsage::Image(ImageAccess::Read),
        }
    ));
    assert!(runner.take_calls().is_empty());
    assert_eq!(texture.cached_view_count(), 1);
    assert_eq!(read.active_count(), 1);

    let read_again = texture.image_view(ImageAccess::Read, None, 0)?;
    assert_eq!(read_again.handle(), handle);
    assert_eq!(read.active_count(), 2);
    drop(read);
    drop(read_again);
    assert_eq!(
        runner.take_calls(),
        [DriverCall::MakeNonResident(handle, ViewUsage::Image(ImageAccess::Read))]
    );
    assert!(!runner.driver().is_handle_resident(handle));

    let write = texture.image_view(ImageAccess::Write, None, 0)?;
    assert_eq!(write.handle(), handle);
    assert_eq!(write.access(), ImageAccess::Write);
    assert_eq!(write.active_count(), 1);
    assert_eq!(
        runner.take_calls(),
        [DriverCall::MakeResident(handle, ViewUsage::Image(ImageAccess::Write))]
    );

    let other_level = texture.image_view(ImageAccess::Read, None, 1)?;
    assert_ne!(other_level.handle(), handle);
    assert_eq!(texture.resident_view_count(), 2);

    drop(write);
    drop(other_level);
    assert_eq!(texture.resident_view_count(), 0);
    assert_eq!(runner.driver().resident_count(), 0);

    drop(texture);
    assert_eq!(runner.driver().invalid_operations(), 0);

    Ok(())
}

#[test]
pub fn rejected_handles_are_reported() -> anyhow::Result<()> {
    let runner = TestRunner::new()?;
    let texture = color_texture(&runner)?;
    runner.driver().reject_views(true);

    let err = texture
        .texture_view(Some(Sampler::NEAREST_CLAMPED))
        .err()
        .context("view with a null handle was created")?;
    assert!(matches!(
        err,
        ViewError::Driver(DriverError::ObjectCreation { kind: "texture view", .. })
    ));
    assert!(matches!(
        texture.image_view(ImageAccess::Read, None, 0),
        Err(ViewError::Driver(DriverError::ObjectCreation { kind: "image view", .. }))
    ));

    assert_eq!(texture.cached_view_count(), 0);
    assert_eq!(runner.driver().live_samplers(), 0);
    assert_eq!(runner.driver().resident_count(), 0);
    assert!(!runner
        .take_calls()
        .iter()
        .any(|call| matches!(call, DriverCall::MakeResident(..))));

    runner.driver().reject_views(false);
    let view = texture.texture_view(Some(Sampler::NEAREST_CLAMPED))?;
    assert!(!view.handle().is_null());
    assert_eq!(view.active_count(), 1);
    assert_eq!(texture.cached_view_count(), 1);

    Ok(())
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "was destroyed")]
pub fn cloning_a_view_of_a_dropped_texture_panics() {
    let runner = TestRunner::new().unwrap();
    let texture = color_texture(&runner).unwrap();
    let view = texture.texture_view(None).unwrap();

    drop(texture);
    let _clone = view.clone();
}
