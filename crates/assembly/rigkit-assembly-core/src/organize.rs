//! Scene-graph organizer.
//!
//! Filing layout for one character:
//!
//! ```text
//! <char>_<rig_kind>_rig            visible root; controls parent here
//! └── <char>_rig_grp               hidden machinery
//!     ├── <char>_<class>_grp       per-class buckets (jnt, hndl, space, ...)
//!     │   └── <char>_<kind>_<class>_grp
//!     └── <char>_constraint_grp
//!         └── <char>_<kind>_constraint_grp
//! ```
//!
//! Buckets are created on demand and resolved through the context's group
//! registry, so re-filing an already filed node is a no-op.

use log::debug;

use rigkit_api_core::{ConstraintKind, NodeClass, Result, RigName};
use rigkit_scene_core::{AttrValue, NodeId, SceneBackend};

use crate::context::{character_root_name, BuildContext, GroupKey};

/// File a node into the character's organizational hierarchy.
///
/// The destination bucket is derived from the node's name; `kind` and
/// `class` override the derived values. Controls go directly under the
/// visible character root, constraints into per-kind constraint buckets,
/// everything else into `<char>_<kind>_<class>_grp`.
pub fn organize<S: SceneBackend>(
    scene: &mut S,
    ctx: &mut BuildContext,
    node: NodeId,
    kind: Option<&str>,
    class: Option<NodeClass>,
) -> Result<()> {
    let rig_name = RigName::parse(&scene.name_of(node)?)?;
    let (derived_kind, derived_class) = derive_bucket(&rig_name);
    let kind = kind.map(str::to_string).unwrap_or(derived_kind);
    let class = class.unwrap_or(derived_class);

    let character_root = ensure_character_root(scene, ctx)?;
    if class == NodeClass::Cntl {
        scene.set_parent(node, Some(character_root))?;
        return Ok(());
    }

    let rig_root = ensure_rig_root(scene, ctx, character_root)?;
    let bucket = if class == NodeClass::Constraint {
        let ckind = ConstraintKind::parse(&kind)?;
        let constraints = ensure_group(
            scene,
            ctx,
            GroupKey::Constraints,
            format!("{}_constraint_grp", ctx.character),
            rig_root,
        )?;
        ensure_group(
            scene,
            ctx,
            GroupKey::ConstraintKind(ckind),
            format!("{}_{}_constraint_grp", ctx.character, ckind.token()),
            constraints,
        )?
    } else {
        let class_grp = ensure_group(
            scene,
            ctx,
            GroupKey::Class(class),
            format!("{}_{}_grp", ctx.character, class.token()),
            rig_root,
        )?;
        ensure_group(
            scene,
            ctx,
            GroupKey::Kind {
                kind: kind.clone(),
                class,
            },
            format!("{}_{}_{}_grp", ctx.character, kind, class.token()),
            class_grp,
        )?
    };
    scene.set_parent(node, Some(bucket))?;
    Ok(())
}

/// Bucket kind/class implied by a name. Groups file by their trailing id
/// (`.._fk_cntl_grp` files as fk controls), everything else by its own
/// kind and class.
fn derive_bucket(rig_name: &RigName) -> (String, NodeClass) {
    if rig_name.class == NodeClass::Grp {
        if let Some(class) = rig_name.ids.last().and_then(|id| NodeClass::parse(id)) {
            let kind = if rig_name.ids.len() >= 2 {
                rig_name.ids[rig_name.ids.len() - 2].clone()
            } else {
                rig_name.kind.clone()
            };
            return (kind, class);
        }
    }
    (rig_name.kind.clone(), rig_name.class)
}

pub(crate) fn ensure_character_root<S: SceneBackend>(
    scene: &mut S,
    ctx: &mut BuildContext,
) -> Result<NodeId> {
    let name = character_root_name(ctx);
    ensure_group_at(scene, ctx, GroupKey::CharacterRoot, name, None)
}

pub(crate) fn ensure_rig_root<S: SceneBackend>(
    scene: &mut S,
    ctx: &mut BuildContext,
    character_root: NodeId,
) -> Result<NodeId> {
    if let Some(existing) = ctx.group(&GroupKey::RigRoot) {
        return Ok(existing);
    }
    let name = format!("{}_rig_grp", ctx.character);
    let fresh = !scene.exists(&name);
    let root = ensure_group_at(scene, ctx, GroupKey::RigRoot, name, Some(character_root))?;
    if fresh {
        // Machinery stays out of the animator's way.
        scene.set_attr(root, "visibility", AttrValue::Float(0.0))?;
    }
    Ok(root)
}

fn ensure_group<S: SceneBackend>(
    scene: &mut S,
    ctx: &mut BuildContext,
    key: GroupKey,
    name: String,
    parent: NodeId,
) -> Result<NodeId> {
    ensure_group_at(scene, ctx, key, name, Some(parent))
}

fn ensure_group_at<S: SceneBackend>(
    scene: &mut S,
    ctx: &mut BuildContext,
    key: GroupKey,
    name: String,
    parent: Option<NodeId>,
) -> Result<NodeId> {
    if let Some(existing) = ctx.group(&key) {
        return Ok(existing);
    }
    let node = match scene.node_by_name(&name) {
        Some(found) => found,
        None => {
            debug!("creating organizational group `{name}`");
            let created = scene.create_group(&name)?;
            if let Some(parent) = parent {
                scene.set_parent(created, Some(parent))?;
            }
            ctx.record(created);
            created
        }
    };
    ctx.register_group(key, node);
    Ok(node)
}
