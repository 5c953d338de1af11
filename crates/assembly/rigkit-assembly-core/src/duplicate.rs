//! Proxy chain duplicator.
//!
//! Duplicates an ordered joint list into a fresh, linear proxy chain under a
//! new kind segment. Name collisions resolve by appending an id before the
//! class segment; once a collision tag resolves, it sticks for the rest of
//! the chain so links stay visibly related.

use log::debug;

use rigkit_api_core::{NodeClass, Result, RigError, RigName};
use rigkit_scene_core::{NodeId, SceneBackend};

use crate::context::BuildContext;
use crate::organize::organize;

const MAX_CONFLICT_ATTEMPTS: u32 = 64;

/// Find a non-colliding variant of `base` by appending an id.
///
/// With no `conflict_tag` the appended id counts up (`1`, `2`, ...). With a
/// tag, the tag itself is tried first and then grows a numeric suffix.
/// Gives up after a bounded number of attempts.
pub(crate) fn resolve_unique<S: SceneBackend>(
    scene: &S,
    base: &RigName,
    conflict_tag: Option<&str>,
) -> Result<RigName> {
    resolve_conflict(scene, base, conflict_tag).map(|(name, _)| name)
}

fn resolve_conflict<S: SceneBackend>(
    scene: &S,
    base: &RigName,
    conflict_tag: Option<&str>,
) -> Result<(RigName, Option<String>)> {
    if !scene.exists(&base.to_string()) {
        return Ok((base.clone(), None));
    }
    let mut counter: u32 = 0;
    let mut grown = conflict_tag.map(str::to_string);
    for attempt in 0..MAX_CONFLICT_ATTEMPTS {
        let tag = match &mut grown {
            Some(tag) => {
                if attempt > 0 {
                    counter += 1;
                    tag.push_str(&counter.to_string());
                }
                tag.clone()
            }
            None => {
                counter += 1;
                counter.to_string()
            }
        };
        let candidate = base.append_id(tag.clone());
        if !scene.exists(&candidate.to_string()) {
            return Ok((candidate, Some(tag)));
        }
    }
    Err(RigError::DuplicationConflict(format!(
        "could not find a free name for `{base}` after {MAX_CONFLICT_ATTEMPTS} attempts"
    )))
}

/// Duplicate `joints` into a proxy chain under `kind`.
///
/// The duplicates are linked into a strictly linear chain regardless of the
/// source topology: the first link parents to world, every later link to the
/// previous duplicate. The chain root is filed with the organizer.
pub fn duplicate_chain<S: SceneBackend>(
    scene: &mut S,
    ctx: &mut BuildContext,
    joints: &[NodeId],
    kind: &str,
    extra_id: Option<&str>,
    conflict_tag: Option<&str>,
) -> Result<Vec<NodeId>> {
    if joints.is_empty() {
        return Err(RigError::Precondition(
            "duplicate_chain needs at least one joint".to_string(),
        ));
    }

    let mut sticky: Option<String> = None;
    let mut out: Vec<NodeId> = Vec::with_capacity(joints.len());
    for (i, joint) in joints.iter().enumerate() {
        let mut base = RigName::parse(&scene.name_of(*joint)?)?.with_kind(kind);
        if let Some(extra) = extra_id {
            base = base.append_id(extra);
        }

        let target = match &sticky {
            Some(tag) => {
                let tagged = base.append_id(tag.clone());
                if scene.exists(&tagged.to_string()) {
                    let (resolved, tag) = resolve_conflict(scene, &base, Some(tag))?;
                    sticky = tag;
                    resolved
                } else {
                    tagged
                }
            }
            None => {
                let (resolved, tag) = resolve_conflict(scene, &base, conflict_tag)?;
                if tag.is_some() {
                    sticky = tag;
                }
                resolved
            }
        };

        let duplicate = scene.duplicate_shallow(*joint, &target.to_string())?;
        let parent = out.last().copied();
        scene.set_parent(duplicate, parent)?;
        ctx.record(duplicate);
        out.push(duplicate);
        if i == 0 {
            organize(scene, ctx, duplicate, Some(kind), Some(NodeClass::Jnt))?;
        }
    }
    debug!(
        "duplicated {} joints into `{kind}` chain rooted at `{}`",
        out.len(),
        scene.name_of(out[0])?
    );
    Ok(out)
}
