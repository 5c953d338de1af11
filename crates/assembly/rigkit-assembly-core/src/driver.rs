//! Constraint driver layer.
//!
//! `add_driver` is the single entry point for constraining one node to
//! another. If the driven node already carries a constraint of the requested
//! kind, the driver is appended as a new weighted influence instead of
//! stacking a second constraint.

use log::debug;
use serde::{Deserialize, Serialize};

use rigkit_api_core::{Axis, AxisSpec, ChannelAxis, ConstraintKind, NodeClass, Result, RigName};
use rigkit_scene_core::{ConstraintOptions, NodeId, SceneBackend};

use crate::context::BuildContext;
use crate::duplicate::resolve_unique;
use crate::organize::organize;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverOptions {
    pub maintain_offset: bool,
    pub weight: f64,
    pub skip_rotate: Vec<ChannelAxis>,
    pub skip_translate: Vec<ChannelAxis>,
    /// Aim constraints only.
    pub aim: AxisSpec,
    /// Aim constraints only.
    pub up: AxisSpec,
}

impl Default for DriverOptions {
    fn default() -> Self {
        DriverOptions {
            maintain_offset: true,
            weight: 1.0,
            skip_rotate: Vec::new(),
            skip_translate: Vec::new(),
            aim: AxisSpec::Axis(Axis::XPos),
            up: AxisSpec::Axis(Axis::YPos),
        }
    }
}

impl DriverOptions {
    pub fn without_offset() -> Self {
        DriverOptions {
            maintain_offset: false,
            ..Default::default()
        }
    }

    pub fn weighted(weight: f64) -> Self {
        DriverOptions {
            weight,
            ..Default::default()
        }
    }
}

/// Constrain `driven` to `driver`, or augment the existing constraint of
/// the same kind with a new influence. Returns the constraint node either
/// way.
pub fn add_driver<S: SceneBackend>(
    scene: &mut S,
    ctx: &mut BuildContext,
    driver: NodeId,
    driven: NodeId,
    kind: ConstraintKind,
    options: &DriverOptions,
) -> Result<NodeId> {
    if let Some(existing) = scene.constraint_on(driven, kind)? {
        let index = scene.add_influence(existing, driver, options.weight)?;
        debug!(
            "augmented {} constraint on `{}` with influence {index}",
            kind.token(),
            scene.name_of(driven)?
        );
        return Ok(existing);
    }

    // Keep the driven node's own kind as an id so constraints on a joint
    // and its proxies stay distinct.
    let driven_name = RigName::parse(&scene.name_of(driven)?)?;
    let base = driven_name
        .with_kind(kind.token())
        .with_class(NodeClass::Constraint)
        .append_id(driven_name.kind.clone());
    let name = resolve_unique(scene, &base, None)?;

    let constraint = scene.create_constraint(
        &name.to_string(),
        kind,
        driver,
        driven,
        &ConstraintOptions {
            maintain_offset: options.maintain_offset,
            weight: options.weight,
            skip_rotate: options.skip_rotate.clone(),
            skip_translate: options.skip_translate.clone(),
            aim: options.aim.resolve(),
            up: options.up.resolve(),
        },
    )?;
    ctx.record(constraint);
    organize(scene, ctx, constraint, None, None)?;
    Ok(constraint)
}
