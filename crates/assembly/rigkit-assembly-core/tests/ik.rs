//! IK assembly: pole-vector placement, handle wiring, clavicle isolation.

use rigkit_api_core::{ConstraintKind, IkSolver, Vec3};
use rigkit_assembly_core::{assemble_ik, place_pole_vector, BuildContext, IkOptions};
use rigkit_scene_core::SceneBackend;
use rigkit_test_fixtures::arm_scene;

#[test]
fn pole_vector_sits_off_the_bend_at_the_asked_distance() {
    let start = Vec3::new(0.0, 10.0, 0.0);
    let mid = Vec3::new(0.0, 5.0, 2.0);
    let end = Vec3::new(0.0, 0.0, 0.0);
    let distance = 3.5;

    let pv = place_pole_vector(start, mid, end, distance).unwrap();
    let out = pv - mid;
    assert!((out.length() - distance).abs() < 1e-9);
    // in the bend plane, perpendicular to the start-to-end chord
    assert!(out.dot(end - start).abs() < 1e-9);
    // on the side the chain bends toward
    assert!(pv.z > mid.z);
}

#[test]
fn pole_vector_rejects_collinear_chains() {
    let start = Vec3::new(0.0, 10.0, 0.0);
    let mid = Vec3::new(0.0, 5.0, 0.0);
    let end = Vec3::new(0.0, 0.0, 0.0);
    assert!(place_pole_vector(start, mid, end, 1.0).is_err());
}

#[test]
fn rotate_plane_arm_builds_handle_pv_and_control() -> anyhow::Result<()> {
    let (mut scene, joints) = arm_scene();
    let mut ctx = BuildContext::new("hero");

    let ik = assemble_ik(&mut scene, &mut ctx, &joints[1..], &IkOptions::default())?;

    assert_eq!(scene.name_of(ik.handle)?, "hero_ik_wrist_l_hndl");
    assert_eq!(ik.proxy_joints.len(), 3);
    assert_eq!(scene.name_of(ik.proxy_joints[0])?, "hero_ik_shoulder_l_jnt");

    // each bind joint is driven by its proxy
    for (joint, proxy) in joints[1..].iter().zip(&ik.proxy_joints) {
        let bind = scene
            .constraint_on(*joint, ConstraintKind::Parent)?
            .expect("bind constraint");
        assert_eq!(scene.influences_of(bind)?, vec![*proxy]);
    }

    // the control points the handle and orients the chain end
    let cntl = ik.control.expect("end control");
    let point = scene
        .constraint_on(ik.handle, ConstraintKind::Point)?
        .expect("point constraint");
    assert_eq!(scene.influences_of(point)?, vec![cntl]);
    let orient = scene
        .constraint_on(*ik.proxy_joints.last().unwrap(), ConstraintKind::Orient)?
        .expect("orient constraint");
    assert_eq!(scene.influences_of(orient)?, vec![cntl]);

    // pole vector control drives the handle
    let pv_grp = ik.pole_vector.expect("pv control");
    let pv_cntl = scene.children_of(scene.children_of(pv_grp)?[0])?[0];
    let pv = scene
        .constraint_on(ik.handle, ConstraintKind::PoleVector)?
        .expect("pv constraint");
    assert_eq!(scene.influences_of(pv)?, vec![pv_cntl]);

    // the backend records what a host needs to replay the build: the
    // handle's solver and span, and each constraint's creation options
    let (solver, start, end) = scene.ik_handle_span(ik.handle)?;
    assert_eq!(solver, IkSolver::RotatePlane);
    assert_eq!(start, ik.proxy_joints[0]);
    assert_eq!(end, *ik.proxy_joints.last().unwrap());
    assert!(!scene.constraint_options(pv)?.maintain_offset);
    let bind = scene
        .constraint_on(joints[1], ConstraintKind::Parent)?
        .expect("bind constraint");
    assert!(scene.constraint_options(bind)?.maintain_offset);

    // proxy root attaches above, to the clavicle bind joint
    let attach = scene
        .constraint_on(ik.proxy_joints[0], ConstraintKind::Parent)?
        .expect("attach constraint");
    assert_eq!(scene.influences_of(attach)?, vec![joints[0]]);
    Ok(())
}

#[test]
fn single_chain_skips_the_pole_vector() -> anyhow::Result<()> {
    let (mut scene, joints) = arm_scene();
    let mut ctx = BuildContext::new("hero");

    let ik = assemble_ik(
        &mut scene,
        &mut ctx,
        &joints[1..3],
        &IkOptions {
            solver: IkSolver::SingleChain,
            ..Default::default()
        },
    )?;
    assert!(ik.pole_vector.is_none());
    let cntl = ik.control.expect("end control");
    let parent = scene
        .constraint_on(ik.handle, ConstraintKind::Parent)?
        .expect("handle constraint");
    assert_eq!(scene.influences_of(parent)?, vec![cntl]);
    Ok(())
}

#[test]
fn too_short_chains_are_rejected() {
    let (mut scene, joints) = arm_scene();
    let mut ctx = BuildContext::new("hero");
    assert!(assemble_ik(&mut scene, &mut ctx, &joints[1..3], &IkOptions::default()).is_err());
}

#[test]
fn clavicle_is_its_own_system_and_leaves_the_main_chain_alone() {
    // build the same arm twice, once with a clavicle feeder
    let (mut plain_scene, plain_joints) = arm_scene();
    let mut plain_ctx = BuildContext::new("hero");
    let plain = assemble_ik(
        &mut plain_scene,
        &mut plain_ctx,
        &plain_joints[1..],
        &IkOptions::default(),
    )
    .unwrap();

    let (mut clav_scene, clav_joints) = arm_scene();
    let mut clav_ctx = BuildContext::new("hero");
    let with_clav = assemble_ik(
        &mut clav_scene,
        &mut clav_ctx,
        &clav_joints[1..],
        &IkOptions {
            clavicle: true,
            ..Default::default()
        },
    )
    .unwrap();

    // main-chain proxies are identical either way
    let plain_names: Vec<String> = plain
        .proxy_joints
        .iter()
        .map(|p| plain_scene.name_of(*p).unwrap())
        .collect();
    let clav_names: Vec<String> = with_clav
        .proxy_joints
        .iter()
        .map(|p| clav_scene.name_of(*p).unwrap())
        .collect();
    assert_eq!(plain_names, clav_names);

    // the shoulder bind constraint has the same single influence in both
    for (scene, joints) in [(&plain_scene, &plain_joints), (&clav_scene, &clav_joints)] {
        let bind = scene
            .constraint_on(joints[1], ConstraintKind::Parent)
            .unwrap()
            .expect("shoulder bind constraint");
        assert_eq!(scene.influences_of(bind).unwrap().len(), 1);
    }

    // the clavicle system exists on its own proxies
    let clav = with_clav.clavicle.expect("clavicle assembly");
    assert_eq!(clav.proxy_joints.len(), 2);
    assert_eq!(
        clav_scene.name_of(clav.proxy_joints[0]).unwrap(),
        "hero_clav_clavicle_l_jnt"
    );
    let clav_bind = clav_scene
        .constraint_on(clav_joints[0], ConstraintKind::Parent)
        .unwrap()
        .expect("clavicle bind constraint");
    assert_eq!(
        clav_scene.influences_of(clav_bind).unwrap(),
        vec![clav.proxy_joints[0]]
    );
    let handle_parent = clav_scene
        .constraint_on(clav.handle, ConstraintKind::Parent)
        .unwrap()
        .expect("clavicle handle constraint");
    assert_eq!(
        clav_scene.influences_of(handle_parent).unwrap(),
        vec![clav.control]
    );
}
