//! Follow spaces and utility creation.
//!
//! A space is a group that rides along with some target node and acts as a
//! neutral parent for follow constraints. Spaces are cached per target on
//! the build context so repeated requests reuse one node.

use log::debug;

use rigkit_api_core::{ConstraintKind, NodeClass, Result, RigName, UtilityKind};
use rigkit_scene_core::{NodeId, SceneBackend};

use crate::context::BuildContext;
use crate::driver::{add_driver, DriverOptions};
use crate::organize::{ensure_character_root, organize};

/// Create (or reuse) a tracked utility node. Utilities live outside the
/// transform hierarchy; tracking is what lets teardown find them.
pub fn create_utility<S: SceneBackend>(
    scene: &mut S,
    ctx: &mut BuildContext,
    name: &RigName,
    kind: UtilityKind,
) -> Result<NodeId> {
    let raw = name.to_string();
    if let Some(existing) = scene.node_by_name(&raw) {
        return Ok(existing);
    }
    debug!("creating {} utility `{raw}`", kind.token());
    let node = scene.create_utility(&raw, kind)?;
    ctx.record_utility(node);
    Ok(node)
}

/// The follow space for `target`, creating it on first request. The space
/// sits in the space bucket, matches the target's world position, and is
/// parent-constrained to it without offset.
pub fn space_for<S: SceneBackend>(
    scene: &mut S,
    ctx: &mut BuildContext,
    target: NodeId,
) -> Result<NodeId> {
    let target_name = scene.name_of(target)?;
    if let Some(cached) = ctx.space(&target_name) {
        return Ok(cached);
    }

    let space_name = RigName::parse(&target_name)?.with_class(NodeClass::Space);
    let space = match scene.node_by_name(&space_name.to_string()) {
        Some(existing) => existing,
        None => {
            let space = scene.create_group(&space_name.to_string())?;
            ctx.record(space);
            organize(scene, ctx, space, None, None)?;
            scene.set_world_position(space, scene.world_position(target)?)?;
            add_driver(
                scene,
                ctx,
                target,
                space,
                ConstraintKind::Parent,
                &DriverOptions::without_offset(),
            )?;
            space
        }
    };
    ctx.register_space(target_name, space);
    Ok(space)
}

/// The character-wide rig space: a space that follows the character root
/// and stands in for "world" in follow blends.
pub fn rig_space<S: SceneBackend>(scene: &mut S, ctx: &mut BuildContext) -> Result<NodeId> {
    let name = RigName::new(
        ctx.character.clone(),
        "rig",
        "world",
        "c",
        NodeClass::Space,
    );
    if let Some(cached) = ctx.space(&name.to_string()) {
        return Ok(cached);
    }
    let space = match scene.node_by_name(&name.to_string()) {
        Some(existing) => existing,
        None => {
            let character_root = ensure_character_root(scene, ctx)?;
            let space = scene.create_group(&name.to_string())?;
            ctx.record(space);
            organize(scene, ctx, space, None, None)?;
            add_driver(
                scene,
                ctx,
                character_root,
                space,
                ConstraintKind::Parent,
                &DriverOptions::without_offset(),
            )?;
            space
        }
    };
    ctx.register_space(name.to_string(), space);
    Ok(space)
}
