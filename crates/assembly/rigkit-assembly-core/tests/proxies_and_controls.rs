//! Proxy duplication and control factory behavior.

use rigkit_api_core::{ControlShape, Vec3};
use rigkit_assembly_core::{
    add_offset_above, default_shape, duplicate_chain, make_control, make_master_control,
    BuildContext, ControlSpec, MasterControlSpec,
};
use rigkit_scene_core::{AttrValue, SceneBackend};
use rigkit_test_fixtures::{arm_scene, hand_scene};

#[test]
fn duplicates_rename_and_stay_linear() {
    let (mut scene, joints) = arm_scene();
    let mut ctx = BuildContext::new("hero");

    let proxies = duplicate_chain(&mut scene, &mut ctx, &joints[1..], "fk", None, None).unwrap();
    assert_eq!(proxies.len(), 3);
    assert_eq!(scene.name_of(proxies[0]).unwrap(), "hero_fk_shoulder_l_jnt");
    assert_eq!(scene.name_of(proxies[2]).unwrap(), "hero_fk_wrist_l_jnt");

    // strictly linear regardless of source topology
    assert_eq!(scene.parent_of(proxies[1]).unwrap(), Some(proxies[0]));
    assert_eq!(scene.parent_of(proxies[2]).unwrap(), Some(proxies[1]));

    // positions carried over
    assert_eq!(
        scene.world_position(proxies[1]).unwrap(),
        scene.world_position(joints[2]).unwrap()
    );
}

#[test]
fn branching_sources_still_produce_a_linear_chain() {
    let (mut scene, joints) = hand_scene();
    let mut ctx = BuildContext::new("hero");

    // wrist + first knuckle of each finger: the sources branch at the wrist
    let picks = [joints[0], joints[1], joints[4]];
    let proxies = duplicate_chain(&mut scene, &mut ctx, &picks, "bash", None, None).unwrap();
    assert_eq!(scene.parent_of(proxies[1]).unwrap(), Some(proxies[0]));
    assert_eq!(scene.parent_of(proxies[2]).unwrap(), Some(proxies[1]));
}

#[test]
fn numeric_conflict_ids_stick_for_the_whole_chain() {
    let (mut scene, joints) = arm_scene();
    let mut ctx = BuildContext::new("hero");

    duplicate_chain(&mut scene, &mut ctx, &joints[1..], "fk", None, None).unwrap();
    let second = duplicate_chain(&mut scene, &mut ctx, &joints[1..], "fk", None, None).unwrap();

    assert_eq!(
        scene.name_of(second[0]).unwrap(),
        "hero_fk_shoulder_l_1_jnt"
    );
    // later links take the same id even though their untagged names differ
    assert_eq!(scene.name_of(second[1]).unwrap(), "hero_fk_elbow_l_1_jnt");
    assert_eq!(scene.name_of(second[2]).unwrap(), "hero_fk_wrist_l_1_jnt");
}

#[test]
fn string_conflict_tags_resolve_before_numbers() {
    let (mut scene, joints) = arm_scene();
    let mut ctx = BuildContext::new("hero");

    duplicate_chain(&mut scene, &mut ctx, &joints[1..], "fk", None, None).unwrap();
    let tagged =
        duplicate_chain(&mut scene, &mut ctx, &joints[1..], "fk", None, Some("upper")).unwrap();
    assert_eq!(
        scene.name_of(tagged[0]).unwrap(),
        "hero_fk_shoulder_l_upper_jnt"
    );
    assert_eq!(
        scene.name_of(tagged[1]).unwrap(),
        "hero_fk_elbow_l_upper_jnt"
    );
}

#[test]
fn extra_id_lands_before_the_class() {
    let (mut scene, joints) = arm_scene();
    let mut ctx = BuildContext::new("hero");

    let proxies =
        duplicate_chain(&mut scene, &mut ctx, &joints[..1], "fk", Some("fkik"), None).unwrap();
    assert_eq!(
        scene.name_of(proxies[0]).unwrap(),
        "hero_fk_clavicle_l_fkik_jnt"
    );
}

#[test]
fn default_shapes_follow_kind_priority() {
    assert_eq!(default_shape("ik"), ControlShape::Nail);
    assert_eq!(default_shape("IK"), ControlShape::Nail); // case-insensitive
    assert_eq!(default_shape("fkik"), ControlShape::Nail); // ik wins over fk
    assert_eq!(default_shape("fk"), ControlShape::Circle);
    assert_eq!(default_shape("pv"), ControlShape::Rhombus);
    assert_eq!(default_shape("face"), ControlShape::Sphere);
    assert_eq!(default_shape("footprint"), ControlShape::Footprint);
    assert_eq!(default_shape("footRoll"), ControlShape::Jack); // not a footprint
    assert_eq!(default_shape("hand"), ControlShape::Cone);
    assert_eq!(default_shape("mstr"), ControlShape::Jack);
}

#[test]
fn control_sandwich_is_grp_offset_shape() {
    let (mut scene, joints) = arm_scene();
    let mut ctx = BuildContext::new("hero");

    let grps = make_control(
        &mut scene,
        &mut ctx,
        &joints[1..2],
        &ControlSpec::kinded("fk"),
    )
    .unwrap();
    let grp = grps[0];
    assert_eq!(
        scene.name_of(grp).unwrap(),
        "hero_fk_shoulder_l_fk_cntl_grp"
    );

    let offset = scene.children_of(grp).unwrap()[0];
    assert_eq!(
        scene.name_of(offset).unwrap(),
        "hero_fk_shoulder_l_fk_offset_grp"
    );

    let cntl = scene.children_of(offset).unwrap()[0];
    assert_eq!(scene.name_of(cntl).unwrap(), "hero_fk_shoulder_l_cntl");

    // pivot matches the target joint
    assert_eq!(
        scene.world_position(grp).unwrap(),
        scene.world_position(joints[1]).unwrap()
    );
}

#[test]
fn explicit_placement_overrides_the_target() {
    let (mut scene, joints) = arm_scene();
    let mut ctx = BuildContext::new("hero");

    let spot = Vec3::new(3.0, 20.0, -1.0);
    let grps = make_control(
        &mut scene,
        &mut ctx,
        &joints[3..4],
        &ControlSpec {
            kind: Some("ik".to_string()),
            position: Some(spot),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(scene.world_position(grps[0]).unwrap(), spot);
}

#[test]
fn offset_above_adopts_the_transform_and_splices_in() {
    let (mut scene, joints) = arm_scene();
    let mut ctx = BuildContext::new("hero");

    let grp = make_control(
        &mut scene,
        &mut ctx,
        &joints[1..2],
        &ControlSpec::kinded("fk"),
    )
    .unwrap()[0];
    let offset = scene.children_of(grp).unwrap()[0];
    let cntl = scene.children_of(offset).unwrap()[0];

    let inserted = add_offset_above(&mut scene, &mut ctx, cntl, 1, "spin").unwrap();
    assert_eq!(
        scene.name_of(inserted).unwrap(),
        "hero_fk_shoulder_l_offset_spin_grp"
    );
    assert_eq!(scene.parent_of(cntl).unwrap(), Some(inserted));
    assert_eq!(scene.parent_of(inserted).unwrap(), Some(offset));
    assert_eq!(
        scene.world_position(inserted).unwrap(),
        scene.world_position(cntl).unwrap()
    );
}

#[test]
fn master_control_aims_and_blends_follow() {
    let (mut scene, joints) = arm_scene();
    let mut ctx = BuildContext::new("hero");

    let master =
        make_master_control(&mut scene, &mut ctx, joints[3], &MasterControlSpec::default())
            .unwrap();
    assert!(scene.has_attr(master, "follow"));
    assert_eq!(
        scene.attr(master, "follow").unwrap(),
        AttrValue::Float(1.0)
    );

    // default follow keeps the master riding its target
    scene.evaluate();
    let offset = scene.parent_of(master).unwrap().unwrap();
    let follow = scene
        .constraint_on(offset, rigkit_api_core::ConstraintKind::Parent)
        .unwrap()
        .expect("follow constraint");
    assert_eq!(scene.attr(follow, "w0").unwrap(), AttrValue::Float(1.0));
    assert_eq!(scene.attr(follow, "w1").unwrap(), AttrValue::Float(0.0));

    // flipping the dial hands the offset to the rig space
    scene
        .set_attr(master, "follow", AttrValue::Float(0.0))
        .unwrap();
    scene.evaluate();
    assert_eq!(scene.attr(follow, "w0").unwrap(), AttrValue::Float(0.0));
    assert_eq!(scene.attr(follow, "w1").unwrap(), AttrValue::Float(1.0));
}
