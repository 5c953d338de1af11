//! Bash (serial-IK) assembly, for spines and other trunk chains.
//!
//! A bash chain is a run of single-chain IK segments, one per adjacent
//! joint pair, each with its own control. From the third control onward a
//! `follow` dial blends the control's offset between the previous control
//! and the character's rig space, so the trunk can peel off its parent.

use serde::{Deserialize, Serialize};

use rigkit_api_core::{ConstraintKind, ControlShape, Result, RigError, Vec3};
use rigkit_scene_core::{NodeId, SceneBackend};

use crate::blend::enable_inverse_blend;
use crate::context::BuildContext;
use crate::control::{make_control, ControlSpec};
use crate::driver::{add_driver, DriverOptions};
use crate::duplicate::duplicate_chain;
use crate::hierarchy::{ancestor, descendant};
use crate::organize::organize;
use crate::spaces::rig_space;

use super::ik::{assemble_ik, IkOptions};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BashOptions {
    pub shape: ControlShape,
    pub size: f64,
    pub rotation: Vec3,
    /// Shape for the chain-end control.
    pub end_shape: ControlShape,
    pub end_size: f64,
    pub end_shape_offset: Vec3,
}

impl Default for BashOptions {
    fn default() -> Self {
        BashOptions {
            shape: ControlShape::Circle,
            size: 1.0,
            rotation: Vec3::ZERO,
            end_shape: ControlShape::Rhombus,
            end_size: 1.0,
            end_shape_offset: Vec3::ZERO,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BashAssembly {
    /// Control shapes, root first; index 0 is the hip/root control.
    pub controls: Vec<NodeId>,
    pub proxy_joints: Vec<NodeId>,
}

pub fn assemble_bash_chain<S: SceneBackend>(
    scene: &mut S,
    ctx: &mut BuildContext,
    joints: &[NodeId],
    options: &BashOptions,
) -> Result<BashAssembly> {
    if joints.len() < 2 {
        return Err(RigError::Precondition(
            "bash chain needs at least two joints".to_string(),
        ));
    }

    let proxies = duplicate_chain(scene, ctx, joints, "bash", None, None)?;
    for (joint, proxy) in joints.iter().zip(&proxies) {
        add_driver(
            scene,
            ctx,
            *proxy,
            *joint,
            ConstraintKind::Parent,
            &DriverOptions::default(),
        )?;
    }

    // Root control drives the chain root directly; no solve below it.
    let root_grp = make_control(
        scene,
        ctx,
        &proxies[..1],
        &ControlSpec {
            kind: Some("ik".to_string()),
            shape: Some(options.shape),
            size: options.size,
            rotation: options.rotation,
            ..Default::default()
        },
    )?[0];
    organize(scene, ctx, root_grp, None, None)?;
    let root_cntl = descendant(scene, root_grp, 2)?;
    add_driver(
        scene,
        ctx,
        root_cntl,
        proxies[0],
        ConstraintKind::Parent,
        &DriverOptions::default(),
    )?;

    let mut controls = vec![root_cntl];
    for i in 0..proxies.len() - 1 {
        let last = i == proxies.len() - 2;
        let segment = assemble_ik(
            scene,
            ctx,
            &proxies[i..=i + 1],
            &IkOptions {
                shape: Some(if last { options.end_shape } else { options.shape }),
                size: if last { options.end_size } else { options.size },
                rotation: options.rotation,
                shape_offset: if last {
                    options.end_shape_offset
                } else {
                    Vec3::ZERO
                },
                skip_duplicate: true,
                attach_above: false,
                ..IkOptions::single_chain()
            },
        )?;
        controls.push(segment.control.ok_or_else(|| {
            RigError::Precondition("bash segment produced no control".to_string())
        })?);
    }

    let world = rig_space(scene, ctx)?;
    for i in 2..controls.len() {
        let offset = ancestor(scene, controls[i], 1)?;
        let follow = add_driver(
            scene,
            ctx,
            controls[i - 1],
            offset,
            ConstraintKind::Parent,
            &DriverOptions::default(),
        )?;
        add_driver(
            scene,
            ctx,
            world,
            offset,
            ConstraintKind::Parent,
            &DriverOptions::weighted(0.0),
        )?;
        enable_inverse_blend(scene, ctx, controls[i], follow, "follow", 1, 0)?;
    }

    Ok(BashAssembly {
        controls,
        proxy_joints: proxies,
    })
}

/// One-segment bash: a single-chain solve over the whole run with one nail
/// control at the root. Used for simple appendages that only hinge.
pub fn assemble_single_bash<S: SceneBackend>(
    scene: &mut S,
    ctx: &mut BuildContext,
    joints: &[NodeId],
    options: &BashOptions,
) -> Result<BashAssembly> {
    if joints.len() < 2 {
        return Err(RigError::Precondition(
            "single bash needs at least two joints".to_string(),
        ));
    }
    let proxies = duplicate_chain(scene, ctx, joints, "bash", None, None)?;
    for (joint, proxy) in joints.iter().zip(&proxies) {
        add_driver(
            scene,
            ctx,
            *proxy,
            *joint,
            ConstraintKind::Parent,
            &DriverOptions::default(),
        )?;
    }

    let solve = assemble_ik(
        scene,
        ctx,
        &proxies,
        &IkOptions {
            kind: "bash".to_string(),
            skip_duplicate: true,
            skip_control: true,
            attach_above: false,
            ..IkOptions::single_chain()
        },
    )?;

    let grp = make_control(
        scene,
        ctx,
        &proxies[..1],
        &ControlSpec {
            kind: Some("bash".to_string()),
            shape: Some(ControlShape::Nail),
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
        solve.handle,
        ConstraintKind::Parent,
        &DriverOptions::default(),
    )?;

    if let Some(parent) = scene.parent_of(joints[0])? {
        add_driver(
            scene,
            ctx,
            parent,
            proxies[0],
            ConstraintKind::Parent,
            &DriverOptions::default(),
        )?;
    }

    Ok(BashAssembly {
        controls: vec![cntl],
        proxy_joints: proxies,
    })
}
