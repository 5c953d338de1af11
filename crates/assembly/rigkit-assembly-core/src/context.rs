//! Per-character build state.
//!
//! A [`BuildContext`] is created fresh for each assembly run. It records
//! every node the run creates (in creation order), the utility nodes that
//! live outside the transform hierarchy, the organizational group registry,
//! and the per-target space cache. Nothing in here is global; two contexts
//! never share state.

use hashbrown::HashMap;
use log::debug;

use rigkit_api_core::{ConstraintKind, NodeClass, Result, RigError};
use rigkit_scene_core::{NodeId, SceneBackend};

/// Registry key for the organizational groups of one character.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GroupKey {
    /// Visible top-level group of the character rig.
    CharacterRoot,
    /// Hidden machinery group under the character root.
    RigRoot,
    /// Per-class bucket under the rig root (joints, handles, spaces, ...).
    Class(NodeClass),
    /// Per-kind bucket under a class bucket (fk joints, ik handles, ...).
    Kind { kind: String, class: NodeClass },
    /// Parent bucket for all constraint buckets.
    Constraints,
    /// Per-kind constraint bucket (parent, orient, ...).
    ConstraintKind(ConstraintKind),
}

/// Scene-facing state for one character build.
#[derive(Debug, Default)]
pub struct BuildContext {
    pub character: String,
    /// Kind token of the character root group (`<char>_<rig_kind>_rig`).
    pub rig_kind: String,
    created: Vec<NodeId>,
    utilities: Vec<NodeId>,
    groups: HashMap<GroupKey, NodeId>,
    spaces: HashMap<String, NodeId>,
}

impl BuildContext {
    pub fn new(character: impl Into<String>) -> Self {
        BuildContext {
            character: character.into(),
            rig_kind: "character".to_string(),
            ..Default::default()
        }
    }

    pub fn with_rig_kind(mut self, rig_kind: impl Into<String>) -> Self {
        self.rig_kind = rig_kind.into();
        self
    }

    /// Record a node created by this run, for teardown.
    pub fn record(&mut self, node: NodeId) {
        self.created.push(node);
    }

    /// Record a utility node. Utilities sit outside the transform hierarchy
    /// and are tracked separately so teardown can reach them.
    pub fn record_utility(&mut self, node: NodeId) {
        self.utilities.push(node);
        self.created.push(node);
    }

    pub fn created(&self) -> &[NodeId] {
        &self.created
    }

    pub fn utilities(&self) -> &[NodeId] {
        &self.utilities
    }

    pub fn register_group(&mut self, key: GroupKey, node: NodeId) {
        self.groups.insert(key, node);
    }

    pub fn group(&self, key: &GroupKey) -> Option<NodeId> {
        self.groups.get(key).copied()
    }

    pub fn register_space(&mut self, target_name: impl Into<String>, node: NodeId) {
        self.spaces.insert(target_name.into(), node);
    }

    pub fn space(&self, target_name: &str) -> Option<NodeId> {
        self.spaces.get(target_name).copied()
    }

    /// Delete everything this run created, newest first. Nodes already gone
    /// (taken out by a cascading delete of an ancestor) are skipped.
    pub fn cleanup<S: SceneBackend>(&mut self, scene: &mut S) -> Result<()> {
        debug!(
            "tearing down build for `{}`: {} nodes",
            self.character,
            self.created.len()
        );
        while let Some(node) = self.created.pop() {
            match scene.delete(node) {
                Ok(()) | Err(RigError::MissingNode(_)) => {}
                Err(other) => return Err(other),
            }
        }
        self.utilities.clear();
        self.groups.clear();
        self.spaces.clear();
        Ok(())
    }
}

/// Remove a finished character rig: the character root (cascading through
/// the whole hierarchy) plus every utility node the build tracked.
pub fn delete_character<S: SceneBackend>(scene: &mut S, ctx: &mut BuildContext) -> Result<()> {
    let root = ctx
        .group(&GroupKey::CharacterRoot)
        .or_else(|| scene.node_by_name(&character_root_name(ctx)));
    if let Some(root) = root {
        scene.delete(root)?;
    }
    for util in std::mem::take(&mut ctx.utilities) {
        match scene.delete(util) {
            Ok(()) | Err(RigError::MissingNode(_)) => {}
            Err(other) => return Err(other),
        }
    }
    ctx.created.clear();
    ctx.groups.clear();
    ctx.spaces.clear();
    Ok(())
}

pub(crate) fn character_root_name(ctx: &BuildContext) -> String {
    format!("{}_{}_rig", ctx.character, ctx.rig_kind)
}
