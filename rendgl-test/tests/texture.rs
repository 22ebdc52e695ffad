use rendgl::{
    types::{MipmapCount, TextureDescriptor, TextureFormat, TextureType},
    Texture, TextureCreationError, TextureError,
};
use rendgl_test::{DriverCall, TestRunner};

#[test]
pub fn creation_allocates_storage() -> anyhow::Result<()> {
    let runner = TestRunner::new()?;

    let desc = TextureDescriptor::new_2d(TextureFormat::Rgba8UnormSrgb, 64, 64)
        .with_mips(MipmapCount::Maximum)
        .with_label("albedo");
    let texture = Texture::new(&runner.context, desc)?;
    let raw = texture.raw();

    assert_eq!(texture.mip_levels(), 7);
    assert_eq!(texture.layer_count(), 1);
    assert_eq!(texture.label(), Some("albedo"));
    assert_eq!(
        runner.take_calls(),
        [DriverCall::CreateTexture(raw), DriverCall::ApplyTextureSampler(raw)]
    );
    assert_eq!(runner.driver().live_textures(), 1);

    drop(texture);
    assert_eq!(runner.take_calls(), [DriverCall::DeleteTexture(raw)]);
    assert_eq!(runner.driver().live_textures(), 0);
    assert_eq!(runner.driver().invalid_operations(), 0);

    Ok(())
}

#[test]
pub fn invalid_descriptors_create_nothing() -> anyhow::Result<()> {
    let runner = TestRunner::new()?;

    let empty = Texture::new(&runner.context, TextureDescriptor::new_2d(TextureFormat::R8Unorm, 0, 4));
    assert!(matches!(empty, Err(TextureCreationError::ZeroSize { .. })));

    let line = TextureDescriptor {
        ty: TextureType::D1,
        ..TextureDescriptor::new_2d(TextureFormat::Bc7RgbaUnorm, 16, 1)
    };
    assert!(matches!(
        Texture::new(&runner.context, line),
        Err(TextureCreationError::IncompatibleFormat { .. })
    ));

    assert!(runner.take_calls().is_empty());
    assert_eq!(runner.driver().live_textures(), 0);

    Ok(())
}

#[test]
pub fn layered_textures() -> anyhow::Result<()> {
    let runner = TestRunner::new()?;

    let array = TextureDescriptor {
        ty: TextureType::D2Array,
        size: glam::UVec3::new(32, 16, 6),
        ..TextureDescriptor::new_2d(TextureFormat::Rgba16Float, 32, 16)
    }
    .with_mips(MipmapCount::Maximum);
    let texture = Texture::new(&runner.context, array)?;

    assert_eq!(texture.mip_levels(), 6);
    assert_eq!(texture.layer_count(), 6);

    let cube = TextureDescriptor {
        ty: TextureType::Cube,
        size: glam::UVec3::new(8, 8, 1),
        ..TextureDescriptor::new_2d(TextureFormat::Rgba8Unorm, 8, 8)
    };
    let cube = Texture::new(&runner.context, cube)?;
    assert_eq!(cube.layer_count(), 6);

    Ok(())
}

#[test]
pub fn recompute_mips() -> anyhow::Result<()> {
    let runner = TestRunner::new()?;

    let mipped = Texture::new(
        &runner.context,
        TextureDescriptor::new_2d(TextureFormat::Rgba8Unorm, 16, 16).with_mips(MipmapCount::Maximum),
    )?;
    let single = Texture::new(&runner.context, TextureDescriptor::new_2d(TextureFormat::Rgba8Unorm, 16, 16))?;
    let compressed = Texture::new(
        &runner.context,
        TextureDescriptor::new_2d(TextureFormat::Bc1RgbaUnorm, 16, 16).with_mips(MipmapCount::Maximum),
    )?;
    runner.take_calls();

    mipped.recompute_mips()?;
    single.recompute_mips()?;
    assert_eq!(runner.take_calls(), [DriverCall::GenerateMipmaps(mipped.raw())]);

    assert!(matches!(
        compressed.recompute_mips(),
        Err(TextureError::CompressedMipmaps {
            format: TextureFormat::Bc1RgbaUnorm
        })
    ));
    assert!(runner.take_calls().is_empty());

    Ok(())
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "outlived its context")]
pub fn textures_must_not_outlive_their_context() {
    let runner = TestRunner::new().unwrap();
    let texture = Texture::new(
        &runner.context,
        TextureDescriptor::new_2d(TextureFormat::Rgba8Unorm, 4, 4),
    )
    .unwrap();

    drop(runner);
    drop(texture);
}
