//! Basic limb: FK and IK systems over one chain, blended from a master
//! control.
//!
//! Each source joint ends up parent-constrained to its FK proxy and its IK
//! proxy; a `fkik` attribute on the master drives both weights through an
//! inverse blend, and control visibility follows the same dial.

use serde::{Deserialize, Serialize};

use rigkit_api_core::{ConstraintKind, Result, RigError};
use rigkit_scene_core::{AttrSpec, NodeId, SceneBackend};

use crate::blend::{enable_inverse_blend, sync_vis};
use crate::context::BuildContext;
use crate::control::{make_master_control, MasterControlSpec};
use crate::hierarchy::descendant;

use super::fk::{assemble_fk, FkAssembly, FkOptions};
use super::ik::{assemble_ik, IkAssembly, IkOptions};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimbOptions {
    pub fk: bool,
    pub fk_options: FkOptions,
    pub ik: bool,
    pub ik_options: IkOptions,
    pub master_spec: MasterControlSpec,
}

impl Default for LimbOptions {
    fn default() -> Self {
        LimbOptions {
            fk: true,
            fk_options: FkOptions::default(),
            ik: true,
            ik_options: IkOptions::default(),
            master_spec: MasterControlSpec::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LimbAssembly {
    /// Master control shape; present whenever both systems were built.
    pub master: Option<NodeId>,
    pub fk: Option<FkAssembly>,
    pub ik: Option<IkAssembly>,
}

/// Assemble a limb over `joints`. A caller-provided `master` is reused for
/// the blend dial instead of building a fresh one.
pub fn assemble_basic_limb<S: SceneBackend>(
    scene: &mut S,
    ctx: &mut BuildContext,
    joints: &[NodeId],
    master: Option<NodeId>,
    options: &LimbOptions,
) -> Result<LimbAssembly> {
    if joints.is_empty() {
        return Err(RigError::Precondition(
            "limb assembly needs at least one joint".to_string(),
        ));
    }

    // FK first: its influence lands at weight index 0 on every bind
    // constraint, IK at index 1.
    let fk = if options.fk {
        Some(assemble_fk(scene, ctx, joints, &options.fk_options)?)
    } else {
        None
    };
    let ik = if options.ik {
        Some(assemble_ik(scene, ctx, joints, &options.ik_options)?)
    } else {
        None
    };

    let (fk, ik) = match (fk, ik) {
        (Some(fk), Some(ik)) => (fk, ik),
        (fk, ik) => {
            return Ok(LimbAssembly {
                master: None,
                fk,
                ik,
            })
        }
    };

    let master = match master {
        Some(existing) => existing,
        None => {
            let target = *joints.last().ok_or_else(|| {
                RigError::Precondition("limb assembly needs a chain end".to_string())
            })?;
            make_master_control(scene, ctx, target, &options.master_spec)?
        }
    };
    if !scene.has_attr(master, "fkik") {
        scene.add_attr(master, AttrSpec::bounded("fkik", 0.0, 0.0, 1.0))?;
    }

    for joint in joints {
        let bind = scene
            .constraint_on(*joint, ConstraintKind::Parent)?
            .ok_or_else(|| {
                RigError::Precondition(format!(
                    "joint `{}` has no bind constraint to blend",
                    scene.name_of(*joint).unwrap_or_default()
                ))
            })?;
        enable_inverse_blend(scene, ctx, master, bind, "fkik", 0, 1)?;
    }

    let mut ik_controls = Vec::new();
    if let Some(cntl) = ik.control {
        ik_controls.push(cntl);
    }
    if let Some(pv_grp) = ik.pole_vector {
        ik_controls.push(descendant(scene, pv_grp, 2)?);
    }
    if let Some(clav) = &ik.clavicle {
        ik_controls.push(clav.control);
    }
    sync_vis(
        scene,
        ctx,
        master,
        "fkik",
        &ik_controls,
        &fk.controls,
        0.0,
        1.0,
    )?;

    Ok(LimbAssembly {
        master: Some(master),
        fk: Some(fk),
        ik: Some(ik),
    })
}
