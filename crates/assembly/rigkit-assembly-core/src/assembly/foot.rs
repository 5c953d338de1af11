//! Reverse-foot IK assembly.
//!
//! Builds the pivot stack from the foot geometry, solves the leg (or adopts
//! an existing leg solve), splits ankle-to-ball and ball-to-toe into their
//! own single-chain handles, hangs the handles off the pivots, and exposes
//! the whole roll vocabulary as attributes on one foot control.

use serde::{Deserialize, Serialize};

use rigkit_api_core::{ConstraintKind, ControlShape, Result, RigError, Vec3};
use rigkit_scene_core::{AttrSpec, NodeId, Plug, SceneBackend};

use crate::context::BuildContext;
use crate::control::{make_control, ControlSpec};
use crate::driver::{add_driver, DriverOptions};
use crate::duplicate::duplicate_chain;
use crate::hierarchy::descendant;
use crate::organize::organize;

use super::ik::{assemble_ik, IkAssembly, IkOptions};
use super::pivots::{foot_pivots, make_pivots, stack_pivots};

/// Foot attribute -> pivot rotation wiring, in declaration order.
/// Roll is around z, pitch around x, yaw around y.
const FOOT_ATTRS: [(&str, usize, &str); 12] = [
    ("toeWiggle", 0, "rotateX"),
    ("toePivotUp", 2, "rotateX"),
    ("toePivotTwist", 2, "rotateY"),
    ("ballPivotUp", 1, "rotateX"),
    ("ballPivotTwist", 1, "rotateY"),
    ("heelPivotUp", 3, "rotateX"),
    ("heelPivotTwist", 3, "rotateY"),
    ("insideRoll", 4, "rotateZ"),
    ("outsideRoll", 5, "rotateZ"),
    ("ankleRoll", 6, "rotateZ"),
    ("anklePitch", 6, "rotateX"),
    ("ankleYaw", 6, "rotateY"),
];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FootOptions {
    /// Name segment for the control and pivots.
    pub name: String,
    pub shape: ControlShape,
    pub size: f64,
    pub rotation: Vec3,
    pub pv_size: f64,
}

impl Default for FootOptions {
    fn default() -> Self {
        FootOptions {
            name: "foot".to_string(),
            shape: ControlShape::Footprint,
            size: 1.0,
            rotation: Vec3::ZERO,
            pv_size: 1.0,
        }
    }
}

/// An already-solved leg the foot should adopt: the leg's IK handle plus
/// the ankle joint of its proxy chain.
#[derive(Debug, Clone, Copy)]
pub struct LegHandoff {
    pub handle: NodeId,
    pub ankle_proxy: NodeId,
}

#[derive(Debug, Clone)]
pub struct FootAssembly {
    /// The foot control shape carrying the roll attributes.
    pub control: NodeId,
    /// Pivot groups in stack order, innermost first.
    pub pivots: Vec<NodeId>,
    /// Leg solve built here; `None` when a handoff was supplied.
    pub leg: Option<IkAssembly>,
    pub ankle_handle: NodeId,
    pub ball_handle: NodeId,
    pub toe_handle: NodeId,
}

/// Assemble a reverse foot under `ankle` from the foot mesh vertex cloud.
///
/// Without a `leg` handoff, a rotate-plane solve is built from the hip down
/// to the ankle first.
pub fn assemble_foot_ik<S: SceneBackend>(
    scene: &mut S,
    ctx: &mut BuildContext,
    ankle: NodeId,
    vertices: &[Vec3],
    leg: Option<LegHandoff>,
    options: &FootOptions,
) -> Result<FootAssembly> {
    let pivot_points = foot_pivots(scene, ankle, vertices)?;
    let pivots = make_pivots(scene, ctx, &pivot_points, ankle, &options.name)?;
    stack_pivots(scene, &pivots)?;
    let stack_root = *pivots.last().ok_or_else(|| {
        RigError::Precondition("pivot stack came back empty".to_string())
    })?;
    organize(scene, ctx, stack_root, None, None)?;

    let (leg_assembly, ankle_handle, ankle_proxy) = match leg {
        Some(handoff) => (None, handoff.handle, handoff.ankle_proxy),
        None => {
            let knee = scene.parent_of(ankle)?.ok_or_else(|| {
                RigError::Precondition("foot assembly needs a knee above the ankle".to_string())
            })?;
            let hip = scene.parent_of(knee)?.ok_or_else(|| {
                RigError::Precondition("foot assembly needs a hip above the knee".to_string())
            })?;
            let reach = scene
                .world_position(hip)?
                .distance(scene.world_position(ankle)?);
            let solve = assemble_ik(
                scene,
                ctx,
                &[hip, knee, ankle],
                &IkOptions {
                    skip_control: true,
                    pv_distance: reach,
                    pv_size: options.pv_size,
                    ..Default::default()
                },
            )?;
            let handle = solve.handle;
            let proxy = *solve.proxy_joints.last().ok_or_else(|| {
                RigError::Precondition("leg solve produced no proxy chain".to_string())
            })?;
            (Some(solve), handle, proxy)
        }
    };

    // Ball and toe ride the leg's proxy ankle, not the bind chain.
    let ball = descendant(scene, ankle, 1)?;
    let toe = descendant(scene, ankle, 2)?;
    let foot_proxies = duplicate_chain(scene, ctx, &[ball, toe], "ik", None, None)?;
    for (joint, proxy) in [ball, toe].iter().zip(&foot_proxies) {
        add_driver(
            scene,
            ctx,
            *proxy,
            *joint,
            ConstraintKind::Parent,
            &DriverOptions::default(),
        )?;
    }
    scene.set_parent(foot_proxies[0], Some(ankle_proxy))?;

    let toe_solve = assemble_ik(
        scene,
        ctx,
        &foot_proxies,
        &IkOptions {
            skip_duplicate: true,
            skip_control: true,
            attach_above: false,
            ..IkOptions::single_chain()
        },
    )?;
    let ball_solve = assemble_ik(
        scene,
        ctx,
        &[ankle_proxy, foot_proxies[0]],
        &IkOptions {
            skip_duplicate: true,
            skip_control: true,
            attach_above: false,
            ..IkOptions::single_chain()
        },
    )?;

    // toeUp carries the ball-to-toe handle, the ball pivot carries the leg
    // handle, the toe tip carries the ankle-to-ball handle.
    add_driver(
        scene,
        ctx,
        pivots[0],
        toe_solve.handle,
        ConstraintKind::Parent,
        &DriverOptions::default(),
    )?;
    add_driver(
        scene,
        ctx,
        pivots[1],
        ankle_handle,
        ConstraintKind::Parent,
        &DriverOptions::default(),
    )?;
    add_driver(
        scene,
        ctx,
        pivots[2],
        ball_solve.handle,
        ConstraintKind::Parent,
        &DriverOptions::default(),
    )?;

    let grp = make_control(
        scene,
        ctx,
        &[stack_root],
        &ControlSpec {
            kind: Some("ik".to_string()),
            name: Some(options.name.clone()),
            shape: Some(options.shape),
            size: options.size,
            rotation: options.rotation,
            ..Default::default()
        },
    )?[0];
    organize(scene, ctx, grp, None, None)?;
    let cntl = descendant(scene, grp, 2)?;
    add_driver(
        scene,
        ctx,
        cntl,
        stack_root,
        ConstraintKind::Parent,
        &DriverOptions::default(),
    )?;

    for (attr, pivot_index, channel) in FOOT_ATTRS {
        scene.add_attr(cntl, AttrSpec::float(attr, 0.0))?;
        scene.connect(
            Plug::new(cntl, attr),
            Plug::new(pivots[pivot_index], channel),
        )?;
    }

    Ok(FootAssembly {
        control: cntl,
        pivots,
        leg: leg_assembly,
        ankle_handle,
        ball_handle: ball_solve.handle,
        toe_handle: toe_solve.handle,
    })
}

