//! Hand assembly.
//!
//! Each finger under the hand root becomes its own little limb: a base-style
//! FK control with per-knuckle curl attributes, an optional single-chain IK,
//! and a per-finger `fkik` dial when both exist. One master control beside
//! the hand holds the settings.

use serde::{Deserialize, Serialize};

use rigkit_api_core::{ChannelAxis, ConstraintKind, Result, RigError};
use rigkit_scene_core::{AttrSpec, NodeId, SceneBackend};

use crate::blend::{enable_inverse_blend, sync_vis};
use crate::context::BuildContext;
use crate::control::{make_master_control, MasterControlSpec};
use crate::driver::{add_driver, DriverOptions};
use crate::duplicate::duplicate_chain;
use crate::hierarchy::ancestor;

use super::fk::{assemble_fk, FkAssembly, FkOptions, FkStyle};
use super::ik::{assemble_ik, IkAssembly, IkOptions};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HandOptions {
    pub fk: bool,
    pub fk_options: FkOptions,
    pub ik: bool,
    pub ik_options: IkOptions,
    pub master_spec: MasterControlSpec,
}

impl Default for HandOptions {
    fn default() -> Self {
        let mut master_spec = MasterControlSpec::default();
        master_spec.offset = rigkit_api_core::Vec3::new(0.85, 0.85, 0.0);
        HandOptions {
            fk: true,
            fk_options: FkOptions {
                style: FkStyle::Base {
                    rotation_axis: ChannelAxis::Z,
                },
                attach_above: false,
                ..Default::default()
            },
            ik: false,
            ik_options: IkOptions::single_chain(),
            master_spec,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FingerAssembly {
    pub root_joint: NodeId,
    pub fk: Option<FkAssembly>,
    pub ik: Option<IkAssembly>,
}

#[derive(Debug, Clone)]
pub struct HandAssembly {
    pub master: NodeId,
    pub fingers: Vec<FingerAssembly>,
}

/// Assemble controls for every finger chain under `root`. A caller-provided
/// `master` is reused instead of building one beside the hand.
pub fn assemble_hand<S: SceneBackend>(
    scene: &mut S,
    ctx: &mut BuildContext,
    root: NodeId,
    master: Option<NodeId>,
    options: &HandOptions,
) -> Result<HandAssembly> {
    let fingers = scene.children_of(root)?;
    if fingers.is_empty() {
        return Err(RigError::Precondition(format!(
            "hand root `{}` has no finger joints",
            scene.name_of(root)?
        )));
    }
    let master = match master {
        Some(existing) => existing,
        None => make_master_control(scene, ctx, root, &options.master_spec)?,
    };

    // FK proxies of the fingers attach to a duplicate of the hand root, so
    // the whole FK layer rides the hand without touching the bind root.
    let mut fk_root: Option<NodeId> = None;

    let mut out = Vec::with_capacity(fingers.len());
    for finger in fingers {
        let chain = finger_chain(scene, finger)?;

        let fk = if options.fk {
            let hand_proxy = match fk_root {
                Some(existing) => existing,
                None => {
                    let proxy =
                        duplicate_chain(scene, ctx, &[root], "fk", Some("fkik"), None)?[0];
                    add_driver(
                        scene,
                        ctx,
                        root,
                        proxy,
                        ConstraintKind::Parent,
                        &DriverOptions::default(),
                    )?;
                    fk_root = Some(proxy);
                    proxy
                }
            };
            let assembly = assemble_fk(scene, ctx, &chain, &options.fk_options)?;
            add_driver(
                scene,
                ctx,
                hand_proxy,
                assembly.root,
                ConstraintKind::Parent,
                &DriverOptions::default(),
            )?;
            Some(assembly)
        } else {
            None
        };

        let ik = if options.ik {
            let assembly = assemble_ik(scene, ctx, &chain, &options.ik_options)?;
            if let Some(cntl) = assembly.control {
                let grp = ancestor(scene, cntl, 2)?;
                add_driver(
                    scene,
                    ctx,
                    root,
                    grp,
                    ConstraintKind::Parent,
                    &DriverOptions::default(),
                )?;
            }
            Some(assembly)
        } else {
            None
        };

        if let (Some(fk), Some(ik)) = (&fk, &ik) {
            let dial = fk.controls[0];
            if !scene.has_attr(dial, "fkik") {
                scene.add_attr(dial, AttrSpec::bounded("fkik", 0.0, 0.0, 1.0))?;
            }
            for joint in &chain {
                let bind = scene
                    .constraint_on(*joint, ConstraintKind::Parent)?
                    .ok_or_else(|| {
                        RigError::Precondition(format!(
                            "finger joint `{}` has no bind constraint to blend",
                            scene.name_of(*joint).unwrap_or_default()
                        ))
                    })?;
                enable_inverse_blend(scene, ctx, dial, bind, "fkik", 0, 1)?;
            }
            let ik_controls: Vec<NodeId> = ik.control.into_iter().collect();
            sync_vis(scene, ctx, dial, "fkik", &ik_controls, &[], 0.0, 1.0)?;
        }

        out.push(FingerAssembly {
            root_joint: finger,
            fk,
            ik,
        });
    }

    Ok(HandAssembly {
        master,
        fingers: out,
    })
}

/// First-child chain from a finger root to its tip.
fn finger_chain<S: SceneBackend>(scene: &S, root: NodeId) -> Result<Vec<NodeId>> {
    let mut chain = vec![root];
    let mut current = root;
    loop {
        let children = scene.children_of(current)?;
        match children.first() {
            Some(next) => {
                current = *next;
                chain.push(current);
            }
            None => break,
        }
    }
    Ok(chain)
}
