//! Step-count hierarchy navigation.

use rigkit_api_core::{Result, RigError};
use rigkit_scene_core::{NodeId, SceneBackend};

/// Walk `steps` levels down, taking the first child at each level.
pub fn descendant<S: SceneBackend>(scene: &S, node: NodeId, steps: usize) -> Result<NodeId> {
    let mut current = node;
    for _ in 0..steps {
        let children = scene.children_of(current)?;
        current = *children.first().ok_or_else(|| {
            RigError::Precondition(format!(
                "node `{}` has no children to descend into",
                scene.name_of(current).unwrap_or_default()
            ))
        })?;
    }
    Ok(current)
}

/// Walk `steps` levels up through parents.
pub fn ancestor<S: SceneBackend>(scene: &S, node: NodeId, steps: usize) -> Result<NodeId> {
    let mut current = node;
    for _ in 0..steps {
        current = scene.parent_of(current)?.ok_or_else(|| {
            RigError::Precondition(format!(
                "node `{}` has no parent to ascend to",
                scene.name_of(current).unwrap_or_default()
            ))
        })?;
    }
    Ok(current)
}
