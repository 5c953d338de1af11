//! Inverse blend and visibility sync semantics.

use rigkit_api_core::ConstraintKind;
use rigkit_assembly_core::{
    add_driver, enable_inverse_blend, make_control, sync_vis, BuildContext, ControlSpec,
    DriverOptions,
};
use rigkit_scene_core::{AttrValue, SceneBackend};
use rigkit_test_fixtures::arm_scene;

fn float(scene: &rigkit_scene_core::MemoryScene, node: rigkit_scene_core::NodeId, attr: &str) -> f64 {
    scene.attr(node, attr).unwrap().as_float().unwrap()
}

#[test]
fn blend_weights_always_sum_to_one() {
    let (mut scene, joints) = arm_scene();
    let mut ctx = BuildContext::new("hero");

    let grp = make_control(&mut scene, &mut ctx, &joints[3..4], &ControlSpec::kinded("mstr"))
        .unwrap()[0];
    let cntl = scene.children_of(scene.children_of(grp).unwrap()[0]).unwrap()[0];

    // two drivers on the wrist, one constraint
    let constraint = add_driver(
        &mut scene,
        &mut ctx,
        joints[1],
        joints[3],
        ConstraintKind::Parent,
        &DriverOptions::default(),
    )
    .unwrap();
    let again = add_driver(
        &mut scene,
        &mut ctx,
        joints[2],
        joints[3],
        ConstraintKind::Parent,
        &DriverOptions::default(),
    )
    .unwrap();
    assert_eq!(constraint, again);
    assert_eq!(scene.influences_of(constraint).unwrap().len(), 2);

    enable_inverse_blend(&mut scene, &mut ctx, cntl, constraint, "blend", 0, 1).unwrap();
    for value in [0.0, 0.25, 0.5, 0.75, 1.0] {
        scene.set_attr(cntl, "blend", AttrValue::Float(value)).unwrap();
        scene.evaluate();
        let w0 = float(&scene, constraint, "w0");
        let w1 = float(&scene, constraint, "w1");
        assert!((w0 + w1 - 1.0).abs() < 1e-9, "weights must sum to 1");
        assert!((w1 - value).abs() < 1e-9, "direct weight tracks the dial");
    }
}

#[test]
fn blend_rejects_other_than_two_influences() {
    let (mut scene, joints) = arm_scene();
    let mut ctx = BuildContext::new("hero");

    let grp = make_control(&mut scene, &mut ctx, &joints[3..4], &ControlSpec::kinded("mstr"))
        .unwrap()[0];
    let cntl = scene.children_of(scene.children_of(grp).unwrap()[0]).unwrap()[0];

    let constraint = add_driver(
        &mut scene,
        &mut ctx,
        joints[1],
        joints[3],
        ConstraintKind::Parent,
        &DriverOptions::default(),
    )
    .unwrap();
    assert!(
        enable_inverse_blend(&mut scene, &mut ctx, cntl, constraint, "blend", 0, 1).is_err(),
        "one influence is not blendable"
    );

    add_driver(
        &mut scene,
        &mut ctx,
        joints[2],
        joints[3],
        ConstraintKind::Parent,
        &DriverOptions::default(),
    )
    .unwrap();
    add_driver(
        &mut scene,
        &mut ctx,
        joints[0],
        joints[3],
        ConstraintKind::Parent,
        &DriverOptions::default(),
    )
    .unwrap();
    assert!(
        enable_inverse_blend(&mut scene, &mut ctx, cntl, constraint, "blend", 0, 1).is_err(),
        "three influences are not blendable"
    );
}

#[test]
fn vis_sync_hides_each_side_only_at_its_extreme() {
    let (mut scene, joints) = arm_scene();
    let mut ctx = BuildContext::new("hero");

    let grp = make_control(&mut scene, &mut ctx, &joints[3..4], &ControlSpec::kinded("mstr"))
        .unwrap()[0];
    let cntl = scene.children_of(scene.children_of(grp).unwrap()[0]).unwrap()[0];
    let max_node = scene.create_group("hero_ik_probe_l_a_grp").unwrap();
    let min_node = scene.create_group("hero_fk_probe_l_a_grp").unwrap();

    sync_vis(
        &mut scene,
        &mut ctx,
        cntl,
        "fkik",
        &[max_node],
        &[min_node],
        0.0,
        1.0,
    )
    .unwrap();

    scene.set_attr(cntl, "fkik", AttrValue::Float(0.0)).unwrap();
    scene.evaluate();
    assert_eq!(float(&scene, max_node, "visibility"), 0.0);
    assert_eq!(float(&scene, min_node, "visibility"), 1.0);

    scene.set_attr(cntl, "fkik", AttrValue::Float(1.0)).unwrap();
    scene.evaluate();
    assert_eq!(float(&scene, max_node, "visibility"), 1.0);
    assert_eq!(float(&scene, min_node, "visibility"), 0.0);

    // between the extremes both sides show
    scene.set_attr(cntl, "fkik", AttrValue::Float(0.4)).unwrap();
    scene.evaluate();
    assert_eq!(float(&scene, max_node, "visibility"), 1.0);
    assert_eq!(float(&scene, min_node, "visibility"), 1.0);
}
