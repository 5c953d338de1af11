//! End-to-end composite assemblies: limb, bash, hand, reverse foot, and
//! teardown.

use rigkit_api_core::{ConstraintKind, Vec3};
use rigkit_assembly_core::{
    assemble_bash_chain, assemble_basic_limb, assemble_foot_ik, assemble_hand,
    delete_character, BashOptions, BuildContext, FootOptions, HandOptions, LimbOptions,
};
use rigkit_scene_core::{AttrValue, SceneBackend};
use rigkit_test_fixtures::{arm_scene, foot_vertices, hand_scene, leg_scene, spine_scene};

fn float(scene: &rigkit_scene_core::MemoryScene, node: rigkit_scene_core::NodeId, attr: &str) -> f64 {
    scene.attr(node, attr).unwrap().as_float().unwrap()
}

#[test]
fn limb_blends_every_joint_between_fk_and_ik() {
    let (mut scene, joints) = arm_scene();
    let mut ctx = BuildContext::new("hero");
    let chain = &joints[1..];

    let limb =
        assemble_basic_limb(&mut scene, &mut ctx, chain, None, &LimbOptions::default()).unwrap();
    let master = limb.master.expect("master control");
    assert!(scene.has_attr(master, "fkik"));
    assert_eq!(scene.attr(master, "fkik").unwrap(), AttrValue::Float(0.0));

    let fk = limb.fk.expect("fk assembly");
    let ik = limb.ik.expect("ik assembly");
    assert_eq!(fk.controls.len(), chain.len());
    assert!(ik.control.is_some());

    // every bind joint carries exactly one parent constraint with both
    // proxies as influences, fk first
    for (i, joint) in chain.iter().enumerate() {
        let bind = scene
            .constraint_on(*joint, ConstraintKind::Parent)
            .unwrap()
            .expect("bind constraint");
        assert_eq!(
            scene.influences_of(bind).unwrap(),
            vec![fk.proxy_joints[i], ik.proxy_joints[i]]
        );
    }

    // the dial swaps weights, never loses influence
    for value in [0.0, 0.5, 1.0] {
        scene.set_attr(master, "fkik", AttrValue::Float(value)).unwrap();
        scene.evaluate();
        for joint in chain {
            let bind = scene
                .constraint_on(*joint, ConstraintKind::Parent)
                .unwrap()
                .unwrap();
            let w0 = float(&scene, bind, "w0");
            let w1 = float(&scene, bind, "w1");
            assert!((w0 + w1 - 1.0).abs() < 1e-9);
            assert!((w1 - value).abs() < 1e-9, "ik weight tracks the dial");
        }
    }

    // at the fk extreme the ik controls are hidden, and vice versa
    scene.set_attr(master, "fkik", AttrValue::Float(0.0)).unwrap();
    scene.evaluate();
    assert_eq!(float(&scene, ik.control.unwrap(), "visibility"), 0.0);
    assert_eq!(float(&scene, fk.controls[0], "visibility"), 1.0);
    scene.set_attr(master, "fkik", AttrValue::Float(1.0)).unwrap();
    scene.evaluate();
    assert_eq!(float(&scene, ik.control.unwrap(), "visibility"), 1.0);
    assert_eq!(float(&scene, fk.controls[0], "visibility"), 0.0);
}

#[test]
fn limb_without_ik_builds_no_master() {
    let (mut scene, joints) = arm_scene();
    let mut ctx = BuildContext::new("hero");
    let limb = assemble_basic_limb(
        &mut scene,
        &mut ctx,
        &joints[1..],
        None,
        &LimbOptions {
            ik: false,
            ..Default::default()
        },
    )
    .unwrap();
    assert!(limb.master.is_none());
    assert!(limb.fk.is_some());
    assert!(limb.ik.is_none());
}

#[test]
fn bash_chain_controls_follow_their_predecessors() {
    let (mut scene, joints) = spine_scene();
    let mut ctx = BuildContext::new("hero");

    let bash =
        assemble_bash_chain(&mut scene, &mut ctx, &joints, &BashOptions::default()).unwrap();
    assert_eq!(bash.controls.len(), joints.len());
    assert_eq!(bash.proxy_joints.len(), joints.len());

    // follow dials start at the third control
    assert!(!scene.has_attr(bash.controls[1], "follow"));
    for i in 2..bash.controls.len() {
        let cntl = bash.controls[i];
        assert!(scene.has_attr(cntl, "follow"), "control {i} has a follow dial");

        let offset = scene.parent_of(cntl).unwrap().unwrap();
        let follow = scene
            .constraint_on(offset, ConstraintKind::Parent)
            .unwrap()
            .expect("follow constraint");
        assert_eq!(scene.influences_of(follow).unwrap().len(), 2);

        scene.set_attr(cntl, "follow", AttrValue::Float(0.0)).unwrap();
        scene.evaluate();
        assert_eq!(float(&scene, follow, "w0"), 0.0, "predecessor releases");
        assert_eq!(float(&scene, follow, "w1"), 1.0, "rig space takes over");
    }
}

#[test]
fn hand_builds_curl_dials_per_finger() {
    let (mut scene, joints) = hand_scene();
    let mut ctx = BuildContext::new("hero");

    let hand =
        assemble_hand(&mut scene, &mut ctx, joints[0], None, &HandOptions::default()).unwrap();
    assert_eq!(hand.fingers.len(), 2);

    for finger in &hand.fingers {
        let fk = finger.fk.as_ref().expect("finger fk");
        assert_eq!(fk.controls.len(), 1, "base style has one control");
        let dial = fk.controls[0];
        // one curl attribute per knuckle
        for attr in ["jnt0", "jnt1", "jnt2"] {
            assert!(scene.has_attr(dial, attr));
        }
        assert!(!scene.has_attr(dial, "jnt3"));
    }

    // the shared fk hand proxy exists exactly once
    assert!(scene.exists("hero_fk_hand_l_fkik_jnt"));
}

#[test]
fn hand_with_ik_blends_each_finger() {
    let (mut scene, joints) = hand_scene();
    let mut ctx = BuildContext::new("hero");

    let hand = assemble_hand(
        &mut scene,
        &mut ctx,
        joints[0],
        None,
        &HandOptions {
            ik: true,
            ..Default::default()
        },
    )
    .unwrap();

    for finger in &hand.fingers {
        let dial = finger.fk.as_ref().unwrap().controls[0];
        assert!(scene.has_attr(dial, "fkik"));
        scene.set_attr(dial, "fkik", AttrValue::Float(1.0)).unwrap();
    }
    scene.evaluate();

    // fully ik: every finger joint follows its ik proxy
    for finger in &hand.fingers {
        let ik = finger.ik.as_ref().expect("finger ik");
        let tip = *ik.proxy_joints.last().unwrap();
        let tip_name = scene.name_of(tip).unwrap();
        assert!(tip_name.starts_with("hero_ik_"), "ik proxy chain: {tip_name}");

        let chain_root_bind = scene
            .constraint_on(finger.root_joint, ConstraintKind::Parent)
            .unwrap()
            .expect("finger bind constraint");
        assert_eq!(float(&scene, chain_root_bind, "w0"), 0.0);
        assert_eq!(float(&scene, chain_root_bind, "w1"), 1.0);
    }
}

#[test]
fn reverse_foot_wires_the_whole_roll_vocabulary() {
    let (mut scene, joints) = leg_scene();
    let mut ctx = BuildContext::new("hero");
    let ankle = joints[2];

    let foot = assemble_foot_ik(
        &mut scene,
        &mut ctx,
        ankle,
        &foot_vertices(),
        None,
        &FootOptions::default(),
    )
    .unwrap();

    assert_eq!(foot.pivots.len(), 8);
    let leg = foot.leg.as_ref().expect("leg solve");
    assert_eq!(leg.proxy_joints.len(), 3);
    assert!(leg.pole_vector.is_some());

    // stack order: center at the root, ankle inside it, toe pivots deepest
    let names: Vec<String> = foot
        .pivots
        .iter()
        .map(|p| scene.name_of(*p).unwrap())
        .collect();
    assert!(names[7].contains("center"));
    assert!(scene.parent_of(foot.pivots[7]).unwrap().is_some()); // filed by the organizer
    assert_eq!(scene.parent_of(foot.pivots[6]).unwrap(), Some(foot.pivots[7]));
    assert_eq!(scene.parent_of(foot.pivots[0]).unwrap(), Some(foot.pivots[2]));
    assert_eq!(scene.parent_of(foot.pivots[1]).unwrap(), Some(foot.pivots[2]));

    // every roll attribute reaches its pivot channel
    let checks: [(&str, usize, &str, f64); 4] = [
        ("toeWiggle", 0, "rotateX", 30.0),
        ("heelPivotUp", 3, "rotateX", -15.0),
        ("insideRoll", 4, "rotateZ", 10.0),
        ("ankleYaw", 6, "rotateY", 25.0),
    ];
    for (attr, pivot, channel, value) in checks {
        scene.set_attr(foot.control, attr, AttrValue::Float(value)).unwrap();
        scene.evaluate();
        assert_eq!(
            float(&scene, foot.pivots[pivot], channel),
            value,
            "{attr} drives pivot {pivot} {channel}"
        );
    }

    // the handles hang off the right pivots
    assert_eq!(
        scene
            .constraint_on(foot.toe_handle, ConstraintKind::Parent)
            .unwrap()
            .map(|c| scene.influences_of(c).unwrap()),
        Some(vec![foot.pivots[0]])
    );
    assert_eq!(
        scene
            .constraint_on(foot.ankle_handle, ConstraintKind::Parent)
            .unwrap()
            .map(|c| scene.influences_of(c).unwrap()),
        Some(vec![foot.pivots[1]])
    );
    assert_eq!(
        scene
            .constraint_on(foot.ball_handle, ConstraintKind::Parent)
            .unwrap()
            .map(|c| scene.influences_of(c).unwrap()),
        Some(vec![foot.pivots[2]])
    );
}

#[test]
fn deleting_the_character_takes_utilities_with_it() {
    let (mut scene, joints) = arm_scene();
    let mut ctx = BuildContext::new("hero");

    assemble_basic_limb(&mut scene, &mut ctx, &joints[1..], None, &LimbOptions::default())
        .unwrap();
    assert!(!ctx.utilities().is_empty(), "limb build tracks utilities");
    let utilities = ctx.utilities().to_vec();

    delete_character(&mut scene, &mut ctx).unwrap();

    assert!(scene.node_by_name("hero_character_rig").is_none());
    assert!(scene.node_by_name("hero_rig_grp").is_none());
    assert!(scene.node_by_name("hero_fk_shoulder_l_jnt").is_none());
    for util in utilities {
        assert!(scene.name_of(util).is_err(), "utility deleted");
    }
    // the bind skeleton survives
    for joint in &joints {
        assert!(scene.name_of(*joint).is_ok());
    }
}
