use rendgl::{
    types::{CompareFunction, Face, Faces, StencilOp, StencilResult, StencilTest},
    Capability, StencilFunc,
};
use rendgl_test::{DriverCall, TestRunner};

fn func(func: CompareFunction, reference: i32, read_mask: u32) -> StencilFunc {
    StencilFunc {
        func,
        reference,
        read_mask,
    }
}

#[test]
pub fn enabling_sets_both_faces_at_once() -> anyhow::Result<()> {
    let mut runner = TestRunner::new()?;

    runner.set_stencil_test(StencilTest::new(CompareFunction::Equal, 1, 0xFF));
    assert_eq!(
        runner.take_state_calls(),
        [
            DriverCall::SetCapability(Capability::StencilTest, true),
            DriverCall::SetStencilFunc(Face::FrontAndBack, func(CompareFunction::Equal, 1, 0xFF)),
        ]
    );

    runner.set_stencil_test(StencilTest::new(CompareFunction::Equal, 1, 0xFF));
    assert!(runner.take_state_calls().is_empty());

    runner.set_back_stencil_test(StencilTest::new(CompareFunction::NotEqual, 1, 0xFF));
    assert_eq!(
        runner.take_state_calls(),
        [DriverCall::SetStencilFunc(
            Face::Back,
            func(CompareFunction::NotEqual, 1, 0xFF)
        )]
    );
    assert_eq!(runner.front_stencil_test(), StencilTest::new(CompareFunction::Equal, 1, 0xFF));

    Ok(())
}

/// While the other face is still tested, switching one face off keeps the test enabled
/// and stores the face as always passing.
#[test]
pub fn one_face_off_stays_enabled() -> anyhow::Result<()> {
    let mut runner = TestRunner::new()?;

    runner.set_back_stencil_test(StencilTest::new(CompareFunction::Less, 2, 0x0F));
    assert_eq!(runner.front_stencil_test(), StencilTest::new(CompareFunction::Always, 0, !0));
    runner.take_calls();

    runner.set_front_stencil_test(StencilTest::OFF);
    assert!(runner.take_state_calls().is_empty());
    assert!(runner.render_state().stencil_enabled());

    runner.set_front_stencil_test(StencilTest {
        test: None,
        reference: 5,
        read_mask: !0,
    });
    assert_eq!(
        runner.take_state_calls(),
        [DriverCall::SetStencilFunc(
            Face::Front,
            func(CompareFunction::Always, 5, !0)
        )]
    );
    assert_eq!(runner.front_stencil_test().test, Some(CompareFunction::Always));

    Ok(())
}

#[test]
pub fn disabled_test_only_tracks_reference_and_mask() -> anyhow::Result<()> {
    let mut runner = TestRunner::new()?;

    runner.set_stencil_test(StencilTest::new(CompareFunction::Equal, 1, 0xFF));
    runner.set_back_stencil_test(StencilTest::new(CompareFunction::NotEqual, 1, 0xFF));
    runner.take_calls();

    // Reference and mask already match, the comparisons are not observable anymore.
    runner.set_stencil_test(StencilTest {
        test: None,
        reference: 1,
        read_mask: 0xFF,
    });
    assert_eq!(
        runner.take_state_calls(),
        [DriverCall::SetCapability(Capability::StencilTest, false)]
    );

    runner.set_stencil_test(StencilTest {
        test: None,
        reference: 3,
        read_mask: 0x0F,
    });
    assert_eq!(
        runner.take_state_calls(),
        [DriverCall::SetStencilFunc(
            Face::FrontAndBack,
            func(CompareFunction::Always, 3, 0x0F)
        )]
    );

    runner.refresh_driver_state();
    assert_eq!(
        runner.render_state().stencil_test,
        Faces::both(StencilTest {
            test: None,
            reference: 3,
            read_mask: 0x0F,
        })
    );

    Ok(())
}

#[test]
pub fn results_and_write_masks_per_face() -> anyhow::Result<()> {
    let mut runner = TestRunner::new()?;

    let replace = StencilResult::new(StencilOp::Keep, StencilOp::Keep, StencilOp::Replace);
    runner.set_stencil_result(replace);
    runner.set_front_stencil_result(StencilResult::KEEP);
    assert_eq!(
        runner.take_state_calls(),
        [
            DriverCall::SetStencilOp(Face::FrontAndBack, replace),
            DriverCall::SetStencilOp(Face::Front, StencilResult::KEEP),
        ]
    );
    assert_eq!(runner.back_stencil_result(), replace);

    runner.set_back_stencil_write_mask(0x0F);
    runner.set_stencil_write_mask(0x0F);
    runner.set_stencil_write_mask(0);
    assert_eq!(
        runner.take_state_calls(),
        [
            DriverCall::SetStencilWriteMask(Face::Back, 0x0F),
            DriverCall::SetStencilWriteMask(Face::Front, 0x0F),
            DriverCall::SetStencilWriteMask(Face::FrontAndBack, 0),
        ]
    );
    assert_eq!(runner.stencil_write_mask(), 0);

    runner.refresh_driver_state();
    assert_eq!(runner.render_state().stencil_write_mask, Faces::both(0));
    assert_eq!(runner.render_state().stencil_result, Faces { front: StencilResult::KEEP, back: replace });

    Ok(())
}
