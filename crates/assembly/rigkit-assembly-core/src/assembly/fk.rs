//! FK assembly.
//!
//! Duplicates the source chain into FK proxies, binds each source joint to
//! its proxy, then builds controls in one of two styles: `Nested` hangs one
//! control sandwich per joint inside the previous control, `Base` drives
//! the whole chain from one control through per-joint curl attributes.

use serde::{Deserialize, Serialize};

use rigkit_api_core::{
    ChannelAxis, ConstraintKind, ControlShape, NodeClass, Result, RigError, RigName,
    UtilityKind, Vec3,
};
use rigkit_scene_core::{AttrSpec, NodeId, Plug, SceneBackend};

use crate::context::BuildContext;
use crate::control::{make_control, ControlSpec};
use crate::driver::{add_driver, DriverOptions};
use crate::duplicate::duplicate_chain;
use crate::hierarchy::descendant;
use crate::organize::organize;
use crate::spaces::create_utility;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FkStyle {
    /// One control per joint, each parented inside the previous control.
    Nested,
    /// One control at the chain root; later joints curl via attributes on
    /// that control, around the given axis.
    Base { rotation_axis: ChannelAxis },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FkOptions {
    pub style: FkStyle,
    pub shape: Option<ControlShape>,
    pub size: f64,
    pub rotation: Vec3,
    /// Constrain the root control group to the source chain's parent.
    pub attach_above: bool,
}

impl Default for FkOptions {
    fn default() -> Self {
        FkOptions {
            style: FkStyle::Nested,
            shape: None,
            size: 1.0,
            rotation: Vec3::new(0.0, 0.0, 90.0),
            attach_above: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FkAssembly {
    /// Outer group of the root control; drivers from above attach here.
    pub root: NodeId,
    /// Control shape nodes, chain order. `Base` style has exactly one.
    pub controls: Vec<NodeId>,
    pub proxy_joints: Vec<NodeId>,
}

pub fn assemble_fk<S: SceneBackend>(
    scene: &mut S,
    ctx: &mut BuildContext,
    joints: &[NodeId],
    options: &FkOptions,
) -> Result<FkAssembly> {
    if joints.is_empty() {
        return Err(RigError::Precondition(
            "fk assembly needs at least one joint".to_string(),
        ));
    }

    let proxies = duplicate_chain(scene, ctx, joints, "fk", None, None)?;
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

    match &options.style {
        FkStyle::Nested => assemble_nested(scene, ctx, joints, proxies, options),
        FkStyle::Base { rotation_axis } => {
            assemble_base(scene, ctx, joints, proxies, options, *rotation_axis)
        }
    }
}

fn assemble_nested<S: SceneBackend>(
    scene: &mut S,
    ctx: &mut BuildContext,
    joints: &[NodeId],
    proxies: Vec<NodeId>,
    options: &FkOptions,
) -> Result<FkAssembly> {
    let grps = make_control(
        scene,
        ctx,
        joints,
        &ControlSpec {
            kind: Some("fk".to_string()),
            shape: options.shape,
            size: options.size,
            rotation: options.rotation,
            ..Default::default()
        },
    )?;

    let mut controls = Vec::with_capacity(grps.len());
    for (i, grp) in grps.iter().enumerate() {
        if i > 0 {
            let above = controls[i - 1];
            scene.set_parent(*grp, Some(above))?;
        }
        let cntl = descendant(scene, *grp, 2)?;
        add_driver(
            scene,
            ctx,
            cntl,
            proxies[i],
            ConstraintKind::Parent,
            &DriverOptions::default(),
        )?;
        controls.push(cntl);
    }

    if options.attach_above {
        if let Some(parent) = scene.parent_of(joints[0])? {
            add_driver(
                scene,
                ctx,
                parent,
                grps[0],
                ConstraintKind::Parent,
                &DriverOptions::default(),
            )?;
        }
    }
    organize(scene, ctx, grps[0], None, None)?;

    Ok(FkAssembly {
        root: grps[0],
        controls,
        proxy_joints: proxies,
    })
}

fn assemble_base<S: SceneBackend>(
    scene: &mut S,
    ctx: &mut BuildContext,
    joints: &[NodeId],
    proxies: Vec<NodeId>,
    options: &FkOptions,
    axis: ChannelAxis,
) -> Result<FkAssembly> {
    let grp = make_control(
        scene,
        ctx,
        &joints[..1],
        &ControlSpec {
            kind: Some("fk".to_string()),
            shape: options.shape,
            size: options.size,
            rotation: options.rotation,
            ..Default::default()
        },
    )?[0];
    let offset = descendant(scene, grp, 1)?;
    let cntl = descendant(scene, grp, 2)?;
    add_driver(
        scene,
        ctx,
        cntl,
        proxies[0],
        ConstraintKind::Parent,
        &DriverOptions::default(),
    )?;

    // The root joint's own curl goes through a sum node into the offset
    // group so it composes with the control's direct rotation.
    let sum_name = RigName::parse(&scene.name_of(offset)?)?.with_class(NodeClass::Util);
    let sum = create_utility(scene, ctx, &sum_name, UtilityKind::Sum)?;
    scene.add_attr(cntl, AttrSpec::float("jnt0", 0.0))?;
    scene.connect(Plug::new(cntl, "jnt0"), Plug::new(sum, input_attr(axis)))?;
    scene.connect(Plug::new(sum, "outputX"), Plug::new(offset, "rotateX"))?;
    scene.connect(Plug::new(sum, "outputY"), Plug::new(offset, "rotateY"))?;
    scene.connect(Plug::new(sum, "outputZ"), Plug::new(offset, "rotateZ"))?;

    for (i, proxy) in proxies.iter().enumerate().skip(1) {
        let attr = format!("jnt{i}");
        scene.add_attr(cntl, AttrSpec::float(&attr, 0.0))?;
        scene.connect(Plug::new(cntl, &attr), Plug::new(*proxy, axis.rotate_attr()))?;
    }

    if options.attach_above {
        if let Some(parent) = scene.parent_of(joints[0])? {
            add_driver(
                scene,
                ctx,
                parent,
                grp,
                ConstraintKind::Parent,
                &DriverOptions::default(),
            )?;
        }
    }
    organize(scene, ctx, grp, None, None)?;

    Ok(FkAssembly {
        root: grp,
        controls: vec![cntl],
        proxy_joints: proxies,
    })
}

fn input_attr(axis: ChannelAxis) -> &'static str {
    match axis {
        ChannelAxis::X => "inputX",
        ChannelAxis::Y => "inputY",
        ChannelAxis::Z => "inputZ",
    }
}
