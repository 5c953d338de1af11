//! Control factory.
//!
//! Every control is a three-node sandwich: an outer `cntl_grp` (where
//! drivers attach), an `offset_grp` (where procedural offsets land), and the
//! drawable control shape itself. The animator only ever touches the shape;
//! the groups keep its channels clean.

use log::debug;
use serde::{Deserialize, Serialize};

use rigkit_api_core::{
    ConstraintKind, ControlShape, NodeClass, Result, RigError, RigName, Vec3,
};
use rigkit_scene_core::{NodeId, SceneBackend};

use crate::blend::enable_inverse_blend;
use crate::context::BuildContext;
use crate::driver::{add_driver, DriverOptions};
use crate::duplicate::resolve_unique;
use crate::hierarchy::{ancestor, descendant};
use crate::organize::organize;
use crate::spaces::rig_space;

/// Default drawable shape for a kind token, by case-insensitive substring
/// priority.
pub fn default_shape(kind: &str) -> ControlShape {
    let kind = kind.to_ascii_lowercase();
    if kind.contains("ik") {
        ControlShape::Nail
    } else if kind.contains("fk") {
        ControlShape::Circle
    } else if kind.contains("pv") {
        ControlShape::Rhombus
    } else if kind.contains("face") {
        ControlShape::Sphere
    } else if kind.contains("footprint") {
        ControlShape::Footprint
    } else if kind.contains("hand") {
        ControlShape::Cone
    } else {
        ControlShape::Jack
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSpec {
    /// Kind segment for the control name; defaults to the target's kind.
    pub kind: Option<String>,
    /// Explicit shape; defaults by kind via [`default_shape`].
    pub shape: Option<ControlShape>,
    /// Override for the name segment.
    pub name: Option<String>,
    pub size: f64,
    pub rotation: Vec3,
    /// Explicit world placement; defaults to the target's position.
    pub position: Option<Vec3>,
    /// Baked-in offset of the drawable shape from its pivot.
    pub shape_offset: Vec3,
}

impl Default for ControlSpec {
    fn default() -> Self {
        ControlSpec {
            kind: None,
            shape: None,
            name: None,
            size: 1.0,
            rotation: Vec3::ZERO,
            position: None,
            shape_offset: Vec3::ZERO,
        }
    }
}

impl ControlSpec {
    pub fn kinded(kind: impl Into<String>) -> Self {
        ControlSpec {
            kind: Some(kind.into()),
            ..Default::default()
        }
    }
}

/// Build one control sandwich per target. Returns the outer `cntl_grp` of
/// each; the shape is two levels down. Callers file the result with the
/// organizer.
pub fn make_control<S: SceneBackend>(
    scene: &mut S,
    ctx: &mut BuildContext,
    targets: &[NodeId],
    spec: &ControlSpec,
) -> Result<Vec<NodeId>> {
    let mut out = Vec::with_capacity(targets.len());
    for target in targets {
        let target_name = RigName::parse(&scene.name_of(*target)?)?;
        let kind = spec.kind.clone().unwrap_or_else(|| target_name.kind.clone());
        let shape_kind = spec.shape.unwrap_or_else(|| default_shape(&kind));

        let mut base = target_name.with_kind(kind.clone());
        if let Some(name) = &spec.name {
            base = base.with_name(name.clone());
        }

        let cntl_name = resolve_unique(scene, &base.with_class(NodeClass::Cntl), None)?;
        let cntl = scene.create_shape(&cntl_name.to_string(), shape_kind, spec.size, spec.rotation)?;
        ctx.record(cntl);

        let offset_name = resolve_unique(
            scene,
            &cntl_name
                .append_id(kind.clone())
                .append_id("offset")
                .with_class(NodeClass::Grp),
            None,
        )?;
        let offset = scene.create_group(&offset_name.to_string())?;
        ctx.record(offset);
        scene.set_parent(cntl, Some(offset))?;

        let grp_name = resolve_unique(
            scene,
            &cntl_name
                .append_id(kind.clone())
                .append_id("cntl")
                .with_class(NodeClass::Grp),
            None,
        )?;
        let grp = scene.create_group(&grp_name.to_string())?;
        ctx.record(grp);
        scene.set_parent(offset, Some(grp))?;

        let pivot = match spec.position {
            Some(position) => position,
            None => scene.world_position(*target)?,
        };
        scene.set_world_position(grp, pivot)?;
        scene.set_world_position(offset, pivot)?;
        scene.set_world_position(cntl, pivot + spec.shape_offset)?;
        scene.freeze(cntl)?;

        debug!("built control `{cntl_name}` for `{target_name}`");
        out.push(grp);
    }
    Ok(out)
}

/// Insert a fresh offset group above a point in a control sandwich.
///
/// `index > 0` counts up from the control shape (1 = directly above the
/// shape); `index < 0` counts down from the outer `cntl_grp`. The new group
/// adopts the target's world transform so nothing moves.
pub fn add_offset_above<S: SceneBackend>(
    scene: &mut S,
    ctx: &mut BuildContext,
    cntl: NodeId,
    index: i32,
    tag: &str,
) -> Result<NodeId> {
    let cntl_name = RigName::parse(&scene.name_of(cntl)?)?;
    if is_cntl_grp(&cntl_name) {
        return Err(RigError::UnsupportedConfiguration(
            "offsets are added relative to the control shape, not the outer group".to_string(),
        ));
    }

    let target = if index >= 0 {
        ancestor(scene, cntl, index.unsigned_abs().saturating_sub(1) as usize)?
    } else {
        let mut outer = cntl;
        loop {
            outer = scene.parent_of(outer)?.ok_or_else(|| {
                RigError::Precondition(format!(
                    "`{cntl_name}` is not inside a control sandwich"
                ))
            })?;
            let outer_name = RigName::parse(&scene.name_of(outer)?)?;
            if is_cntl_grp(&outer_name) {
                break;
            }
        }
        descendant(scene, outer, index.unsigned_abs() as usize)?
    };

    let mut base = cntl_name.with_class(NodeClass::Grp);
    match base.ids.last_mut() {
        Some(last) => *last = "offset".to_string(),
        None => base.ids.push("offset".to_string()),
    }
    let conflict_tag = if tag.is_empty() { None } else { Some(tag) };
    let name = match conflict_tag {
        Some(tag) => resolve_tagged(scene, &base, tag)?,
        None => resolve_unique(scene, &base, None)?,
    };

    let group = scene.create_group(&name.to_string())?;
    ctx.record(group);
    let parent = scene.parent_of(target)?;
    scene.set_parent(group, parent)?;
    scene.set_world_position(group, scene.world_position(target)?)?;
    scene.set_parent(target, Some(group))?;
    Ok(group)
}

/// Unlike plain conflict resolution, an offset tag is always appended even
/// when the untagged name is free.
fn resolve_tagged<S: SceneBackend>(scene: &S, base: &RigName, tag: &str) -> Result<RigName> {
    let tagged = base.append_id(tag);
    if !scene.exists(&tagged.to_string()) {
        return Ok(tagged);
    }
    resolve_unique(scene, &tagged, None)
}

fn is_cntl_grp(name: &RigName) -> bool {
    name.class == NodeClass::Grp && name.ids.last().map(String::as_str) == Some("cntl")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MasterControlSpec {
    pub name: String,
    pub shape: ControlShape,
    pub size: f64,
    pub rotation: Vec3,
    /// World offset of the control from its target.
    pub offset: Vec3,
}

impl Default for MasterControlSpec {
    fn default() -> Self {
        MasterControlSpec {
            name: "mstr".to_string(),
            shape: ControlShape::Cone,
            size: 1.0,
            rotation: Vec3::ZERO,
            offset: Vec3::new(1.2, 0.0, 0.0),
        }
    }
}

/// Build a master (settings) control beside `target`.
///
/// The control aims back at the target and carries a `follow` attribute
/// blending its offset group between the target and the character's rig
/// space. Translation and rotation channels are locked down so it reads as
/// a settings holder, not a deformer.
pub fn make_master_control<S: SceneBackend>(
    scene: &mut S,
    ctx: &mut BuildContext,
    target: NodeId,
    spec: &MasterControlSpec,
) -> Result<NodeId> {
    let position = scene.world_position(target)? + spec.offset;
    let grps = make_control(
        scene,
        ctx,
        &[target],
        &ControlSpec {
            kind: Some("mstr".to_string()),
            shape: Some(spec.shape),
            name: Some(spec.name.clone()),
            size: spec.size,
            rotation: spec.rotation,
            position: Some(position),
            shape_offset: Vec3::ZERO,
        },
    )?;
    let grp = grps[0];
    organize(scene, ctx, grp, None, None)?;
    let offset = descendant(scene, grp, 1)?;
    let cntl = descendant(scene, grp, 2)?;

    add_driver(
        scene,
        ctx,
        target,
        cntl,
        ConstraintKind::Aim,
        &DriverOptions::without_offset(),
    )?;

    let follow = add_driver(
        scene,
        ctx,
        target,
        offset,
        ConstraintKind::Parent,
        &DriverOptions::default(),
    )?;
    let world = rig_space(scene, ctx)?;
    add_driver(
        scene,
        ctx,
        world,
        offset,
        ConstraintKind::Parent,
        &DriverOptions::weighted(0.0),
    )?;
    enable_inverse_blend(scene, ctx, cntl, follow, "follow", 1, 0)?;

    hide_channels(scene, offset, true, true)?;
    hide_channels(scene, cntl, false, true)?;
    Ok(cntl)
}

/// Make translate and/or rotate channels non-keyable.
pub fn hide_channels<S: SceneBackend>(
    scene: &mut S,
    node: NodeId,
    translate: bool,
    rotate: bool,
) -> Result<()> {
    if translate {
        for attr in ["translateX", "translateY", "translateZ"] {
            scene.set_keyable(node, attr, false)?;
        }
    }
    if rotate {
        for attr in ["rotateX", "rotateY", "rotateZ"] {
            scene.set_keyable(node, attr, false)?;
        }
    }
    Ok(())
}
