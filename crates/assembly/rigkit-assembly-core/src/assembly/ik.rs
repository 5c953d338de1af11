//! IK assembly.
//!
//! Builds an IK system over a proxy chain: handle, end control, pole vector
//! for rotate-plane solves, optional sticky tip, and an optional clavicle
//! feeder. The clavicle is its own two-joint single-chain system above the
//! main chain; the main chain is untouched by its presence.

use serde::{Deserialize, Serialize};

use rigkit_api_core::{
    ConstraintKind, ControlShape, IkSolver, NodeClass, Result, RigError, RigName, Vec3,
};
use rigkit_scene_core::{AttrSpec, NodeId, SceneBackend};

use crate::context::BuildContext;
use crate::control::{make_control, ControlSpec};
use crate::driver::{add_driver, DriverOptions};
use crate::duplicate::{duplicate_chain, resolve_unique};
use crate::hierarchy::descendant;
use crate::organize::organize;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IkOptions {
    pub solver: IkSolver,
    /// Kind segment for everything this assembly creates.
    pub kind: String,
    /// Name-segment override for the handle and control.
    pub name: Option<String>,
    pub shape: Option<ControlShape>,
    pub size: f64,
    pub rotation: Vec3,
    pub shape_offset: Vec3,
    pub pv_size: f64,
    pub pv_distance: f64,
    /// Skip chain duplication and solve over `joints` directly.
    pub skip_duplicate: bool,
    /// Build the handle but no end control.
    pub skip_control: bool,
    /// Constrain the proxy root to the source chain's parent.
    pub attach_above: bool,
    /// Build a single-chain clavicle system above the chain.
    pub clavicle: bool,
    pub sticky_tip: bool,
    pub sticky_shape: ControlShape,
}

impl Default for IkOptions {
    fn default() -> Self {
        IkOptions {
            solver: IkSolver::RotatePlane,
            kind: "ik".to_string(),
            name: None,
            shape: None,
            size: 1.0,
            rotation: Vec3::new(0.0, 0.0, 90.0),
            shape_offset: Vec3::ZERO,
            pv_size: 1.0,
            pv_distance: 1.0,
            skip_duplicate: false,
            skip_control: false,
            attach_above: true,
            clavicle: false,
            sticky_tip: false,
            sticky_shape: ControlShape::Sphere,
        }
    }
}

impl IkOptions {
    pub fn single_chain() -> Self {
        IkOptions {
            solver: IkSolver::SingleChain,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClavicleAssembly {
    pub handle: NodeId,
    pub control: NodeId,
    pub proxy_joints: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct IkAssembly {
    pub handle: NodeId,
    /// End control shape; `None` under `skip_control`.
    pub control: Option<NodeId>,
    /// Pole-vector control group, rotate-plane solves only.
    pub pole_vector: Option<NodeId>,
    pub proxy_joints: Vec<NodeId>,
    pub clavicle: Option<ClavicleAssembly>,
}

pub fn assemble_ik<S: SceneBackend>(
    scene: &mut S,
    ctx: &mut BuildContext,
    joints: &[NodeId],
    options: &IkOptions,
) -> Result<IkAssembly> {
    let minimum = match options.solver {
        IkSolver::RotatePlane => 3,
        IkSolver::SingleChain => 2,
    };
    if joints.len() < minimum {
        return Err(RigError::Precondition(format!(
            "{:?} ik needs at least {minimum} joints, got {}",
            options.solver,
            joints.len()
        )));
    }

    let clavicle = if options.clavicle {
        Some(assemble_clavicle(scene, ctx, joints[0], options)?)
    } else {
        None
    };

    let proxies = if options.skip_duplicate {
        joints.to_vec()
    } else {
        let proxies = duplicate_chain(scene, ctx, joints, &options.kind, None, None)?;
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
        proxies
    };

    let end = *proxies.last().ok_or_else(|| {
        RigError::Precondition("ik assembly needs a chain end".to_string())
    })?;
    let handle = create_handle(scene, ctx, options, proxies[0], end)?;

    let pole_vector = match options.solver {
        IkSolver::RotatePlane => Some(make_pv(
            scene,
            ctx,
            [
                scene.world_position(proxies[0])?,
                scene.world_position(proxies[1])?,
                scene.world_position(end)?,
            ],
            handle,
            options.pv_distance,
            options.pv_size,
        )?),
        IkSolver::SingleChain => None,
    };

    if options.attach_above && !options.skip_duplicate {
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
    }

    if options.skip_control {
        return Ok(IkAssembly {
            handle,
            control: None,
            pole_vector,
            proxy_joints: proxies,
            clavicle,
        });
    }

    let grp = make_control(
        scene,
        ctx,
        &[end],
        &ControlSpec {
            kind: Some(options.kind.clone()),
            shape: options.shape,
            name: options.name.clone(),
            size: options.size,
            rotation: options.rotation,
            shape_offset: options.shape_offset,
            ..Default::default()
        },
    )?[0];
    organize(scene, ctx, grp, None, None)?;
    let cntl = descendant(scene, grp, 2)?;

    match options.solver {
        IkSolver::RotatePlane => {
            add_driver(
                scene,
                ctx,
                cntl,
                handle,
                ConstraintKind::Point,
                &DriverOptions::default(),
            )?;
        }
        IkSolver::SingleChain => {
            add_driver(
                scene,
                ctx,
                cntl,
                handle,
                ConstraintKind::Parent,
                &DriverOptions::default(),
            )?;
        }
    }
    if options.sticky_tip {
        add_sticky_tip(scene, ctx, &proxies, cntl, options)?;
    } else {
        add_driver(
            scene,
            ctx,
            cntl,
            end,
            ConstraintKind::Orient,
            &DriverOptions::default(),
        )?;
    }

    Ok(IkAssembly {
        handle,
        control: Some(cntl),
        pole_vector,
        proxy_joints: proxies,
        clavicle,
    })
}

fn create_handle<S: SceneBackend>(
    scene: &mut S,
    ctx: &mut BuildContext,
    options: &IkOptions,
    start: NodeId,
    end: NodeId,
) -> Result<NodeId> {
    let mut base = RigName::parse(&scene.name_of(end)?)?
        .with_kind(options.kind.clone())
        .with_class(NodeClass::Hndl);
    if let Some(name) = &options.name {
        base = base.with_name(name.clone());
    }
    let name = resolve_unique(scene, &base, None)?;
    let handle = scene.create_ik_handle(&name.to_string(), options.solver, start, end)?;
    ctx.record(handle);
    organize(scene, ctx, handle, Some(&options.kind), Some(NodeClass::Hndl))?;
    Ok(handle)
}

/// Place a pole-vector target for the `[start, mid, end]` triangle.
///
/// The target sits `distance` out from the mid joint along the in-plane
/// direction perpendicular to the start-to-end chord, on the side the chain
/// bends toward. Collinear chains have no bend plane and are rejected.
pub fn place_pole_vector(start: Vec3, mid: Vec3, end: Vec3, distance: f64) -> Result<Vec3> {
    let chord = end - start;
    let bend = (mid - (start + end) * 0.5).reject(chord);
    let direction = bend.try_normalize().ok_or_else(|| {
        RigError::Precondition(
            "pole vector placement needs a non-collinear chain".to_string(),
        )
    })?;
    Ok(mid + direction * distance)
}

fn make_pv<S: SceneBackend>(
    scene: &mut S,
    ctx: &mut BuildContext,
    triangle: [Vec3; 3],
    handle: NodeId,
    distance: f64,
    size: f64,
) -> Result<NodeId> {
    let [start, mid, end] = triangle;
    let position = place_pole_vector(start, mid, end, distance)?;
    let grp = make_control(
        scene,
        ctx,
        &[handle],
        &ControlSpec {
            kind: Some("pv".to_string()),
            position: Some(position),
            size,
            ..Default::default()
        },
    )?[0];
    let cntl = descendant(scene, grp, 2)?;
    add_driver(
        scene,
        ctx,
        cntl,
        handle,
        ConstraintKind::PoleVector,
        &DriverOptions::without_offset(),
    )?;
    organize(scene, ctx, grp, None, None)?;
    Ok(grp)
}

/// A second, tip-spanning handle with its own small control, so the last
/// link can peel away from the main solve. The root control gains a
/// `stickyTip` dial for later use by space blends.
fn add_sticky_tip<S: SceneBackend>(
    scene: &mut S,
    ctx: &mut BuildContext,
    proxies: &[NodeId],
    root_cntl: NodeId,
    options: &IkOptions,
) -> Result<NodeId> {
    if proxies.len() < 2 {
        return Err(RigError::Precondition(
            "sticky tip needs at least two proxy joints".to_string(),
        ));
    }
    let start = proxies[proxies.len() - 2];
    let end = proxies[proxies.len() - 1];

    let base = RigName::parse(&scene.name_of(end)?)?
        .with_kind(options.kind.clone())
        .append_id("sticky")
        .with_class(NodeClass::Hndl);
    let name = resolve_unique(scene, &base, None)?;
    let handle = scene.create_ik_handle(&name.to_string(), IkSolver::SingleChain, start, end)?;
    ctx.record(handle);
    organize(scene, ctx, handle, Some(&options.kind), Some(NodeClass::Hndl))?;

    let grp = make_control(
        scene,
        ctx,
        &[end],
        &ControlSpec {
            kind: Some(options.kind.clone()),
            name: Some("sticky".to_string()),
            shape: Some(options.sticky_shape),
            size: options.size,
            ..Default::default()
        },
    )?[0];
    organize(scene, ctx, grp, None, None)?;
    let cntl = descendant(scene, grp, 2)?;
    add_driver(
        scene,
        ctx,
        cntl,
        handle,
        ConstraintKind::Parent,
        &DriverOptions::default(),
    )?;

    if !scene.has_attr(root_cntl, "stickyTip") {
        scene.add_attr(root_cntl, AttrSpec::bounded("stickyTip", 0.0, 0.0, 1.0))?;
    }
    Ok(cntl)
}

/// The clavicle system: duplicate `[parent, root]` into a `clav` chain,
/// solve it single-chain, and hang the handle off a nail control. Only the
/// clavicle joint itself is bound to the proxy; the main chain below keeps
/// its own proxies and blends.
fn assemble_clavicle<S: SceneBackend>(
    scene: &mut S,
    ctx: &mut BuildContext,
    chain_root: NodeId,
    options: &IkOptions,
) -> Result<ClavicleAssembly> {
    let clavicle = scene.parent_of(chain_root)?.ok_or_else(|| {
        RigError::Precondition(
            "clavicle assembly requested but the chain root has no parent joint".to_string(),
        )
    })?;
    let sources = [clavicle, chain_root];
    let proxies = duplicate_chain(scene, ctx, &sources, "clav", None, None)?;
    add_driver(
        scene,
        ctx,
        proxies[0],
        clavicle,
        ConstraintKind::Parent,
        &DriverOptions::default(),
    )?;

    let base = RigName::parse(&scene.name_of(proxies[1])?)?
        .with_kind("clav")
        .with_class(NodeClass::Hndl);
    let name = resolve_unique(scene, &base, None)?;
    let handle =
        scene.create_ik_handle(&name.to_string(), IkSolver::SingleChain, proxies[0], proxies[1])?;
    ctx.record(handle);
    organize(scene, ctx, handle, Some("clav"), Some(NodeClass::Hndl))?;

    let grp = make_control(
        scene,
        ctx,
        &[proxies[0]],
        &ControlSpec {
            kind: Some("clav".to_string()),
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
        handle,
        ConstraintKind::Parent,
        &DriverOptions::default(),
    )?;

    if options.attach_above {
        if let Some(above) = scene.parent_of(clavicle)? {
            add_driver(
                scene,
                ctx,
                above,
                proxies[0],
                ConstraintKind::Parent,
                &DriverOptions::default(),
            )?;
        }
    }

    Ok(ClavicleAssembly {
        handle,
        control: cntl,
        proxy_joints: proxies,
    })
}
