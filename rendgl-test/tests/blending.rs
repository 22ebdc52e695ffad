use glam::{Vec3, Vec4};
use rendgl::{
    types::{BlendFactor, BlendOperation, BlendStateAlpha, BlendStateRgb, BlendStateRgba},
    BlendFactors, Capability,
};
use rendgl_test::{DriverCall, TestRunner};

fn factors(src: BlendFactor, dest: BlendFactor) -> BlendFactors {
    BlendFactors {
        src_rgb: src,
        dest_rgb: dest,
        src_alpha: src,
        dest_alpha: dest,
    }
}

/// Enabling blending sets every piece of blend state, later changes only touch what changed.
#[test]
pub fn enable_then_modify() -> anyhow::Result<()> {
    let mut runner = TestRunner::new()?;

    runner.set_blending(BlendStateRgba::TRANSPARENT);
    assert_eq!(
        runner.take_state_calls(),
        [
            DriverCall::SetCapability(Capability::Blend, true),
            DriverCall::SetBlendFunc(factors(BlendFactor::SrcAlpha, BlendFactor::OneMinusSrcAlpha)),
            DriverCall::SetBlendEquation(BlendOperation::Add, BlendOperation::Add),
            DriverCall::SetBlendColor(Vec4::ZERO),
        ]
    );

    runner.set_blending(BlendStateRgba::TRANSPARENT);
    assert!(runner.take_state_calls().is_empty());

    runner.set_blending(BlendStateRgba::ADDITIVE);
    assert_eq!(
        runner.take_state_calls(),
        [DriverCall::SetBlendFunc(factors(BlendFactor::One, BlendFactor::One))]
    );

    runner.set_alpha_blending(BlendStateAlpha {
        op: BlendOperation::Max,
        ..BlendStateAlpha::ADDITIVE
    });
    assert_eq!(
        runner.take_state_calls(),
        [DriverCall::SetBlendEquation(BlendOperation::Add, BlendOperation::Max)]
    );
    assert_eq!(runner.blending(), None);

    runner.set_color_blending(BlendStateRgb {
        constant: Vec3::splat(0.5),
        ..BlendStateRgb::ADDITIVE
    });
    assert_eq!(
        runner.take_state_calls(),
        [DriverCall::SetBlendColor(Vec4::new(0.5, 0.5, 0.5, 0.0))]
    );

    Ok(())
}

#[test]
pub fn disabled_blending_only_tracks_the_constant() -> anyhow::Result<()> {
    let mut runner = TestRunner::new()?;

    runner.set_blending(BlendStateRgba {
        constant: Vec4::new(0.0, 0.0, 0.0, 0.25),
        ..BlendStateRgba::ADDITIVE
    });
    runner.take_calls();

    runner.disable_blending();
    assert_eq!(
        runner.take_state_calls(),
        [DriverCall::SetCapability(Capability::Blend, false)]
    );
    assert_eq!(
        runner.blending(),
        Some(BlendStateRgba {
            constant: Vec4::new(0.0, 0.0, 0.0, 0.25),
            ..BlendStateRgba::OPAQUE
        })
    );

    runner.set_blending(BlendStateRgba {
        constant: Vec4::ONE,
        ..BlendStateRgba::OPAQUE
    });
    assert_eq!(runner.take_state_calls(), [DriverCall::SetBlendColor(Vec4::ONE)]);

    runner.disable_blending();
    assert!(runner.take_state_calls().is_empty());
    assert!(!runner.render_state().blending_enabled());

    Ok(())
}

/// A separate alpha equation alone is enough to turn blending on.
#[test]
pub fn non_opaque_alpha_enables_blending() -> anyhow::Result<()> {
    let mut runner = TestRunner::new()?;

    runner.set_alpha_blending(BlendStateAlpha::ADDITIVE);
    assert_eq!(
        runner.take_state_calls(),
        [
            DriverCall::SetCapability(Capability::Blend, true),
            DriverCall::SetBlendFunc(BlendFactors {
                src_rgb: BlendFactor::One,
                dest_rgb: BlendFactor::Zero,
                src_alpha: BlendFactor::One,
                dest_alpha: BlendFactor::One,
            }),
            DriverCall::SetBlendEquation(BlendOperation::Add, BlendOperation::Add),
            DriverCall::SetBlendColor(Vec4::ZERO),
        ]
    );
    assert!(runner.render_state().blending_enabled());

    runner.refresh_driver_state();
    assert_eq!(runner.color_blending(), BlendStateRgb::OPAQUE);
    assert_eq!(runner.alpha_blending(), BlendStateAlpha::ADDITIVE);

    Ok(())
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "outside of [0, 1]")]
pub fn blend_constant_must_be_normalized() {
    let mut runner = TestRunner::new().unwrap();

    let color = BlendStateRgb {
        constant: Vec3::splat(1.5),
        ..BlendStateRgba::TRANSPARENT.rgb()
    };
    runner.set_blending_separate(color, BlendStateRgba::TRANSPARENT.alpha());
}
