//! JSON skeleton loader.
//!
//! Skeletons are authored externally; this is the shape they arrive in for
//! tests and headless tooling. Joints are listed parent-first so the chain
//! can be linked as it is materialized.

use serde::{Deserialize, Serialize};

use rigkit_api_core::{Result, RigError, RigName, Vec3};

use crate::backend::{NodeId, SceneBackend};
use crate::memory::MemoryScene;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JointSpec {
    pub name: RigName,
    #[serde(default)]
    pub parent: Option<RigName>,
    pub position: [f64; 3],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkeletonSpec {
    pub joints: Vec<JointSpec>,
}

impl SkeletonSpec {
    pub fn from_json(raw: &str) -> Result<SkeletonSpec> {
        serde_json::from_str(raw).map_err(|e| {
            RigError::Precondition(format!("skeleton spec did not parse: {e}"))
        })
    }
}

/// Materialize a skeleton into the scene, returning joint ids in spec order.
pub fn load_skeleton(scene: &mut MemoryScene, spec: &SkeletonSpec) -> Result<Vec<NodeId>> {
    let mut out = Vec::with_capacity(spec.joints.len());
    for joint in &spec.joints {
        let id = scene.create_joint(&joint.name.to_string(), Vec3::from(joint.position))?;
        if let Some(parent) = &joint.parent {
            let parent_id = scene
                .node_by_name(&parent.to_string())
                .ok_or_else(|| {
                    RigError::Precondition(format!(
                        "joint `{}` lists parent `{parent}` which has not been created",
                        joint.name
                    ))
                })?;
            scene.set_parent(id, Some(parent_id))?;
        }
        out.push(id);
    }
    Ok(out)
}
