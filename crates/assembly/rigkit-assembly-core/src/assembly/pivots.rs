//! Foot pivot extraction and stacking.
//!
//! Reverse-foot rigs roll the foot around points on the sole: toe tip,
//! heel, inside and outside edges, plus the ball and ankle joints. The
//! points come from scanning the foot geometry's vertex cloud; the pivots
//! are then stacked into a nested group chain so each rotation compounds
//! with the ones outside it.

use log::debug;

use rigkit_api_core::{NodeClass, Result, RigError, RigName, Vec3};
use rigkit_scene_core::{NodeId, SceneBackend};

use crate::context::BuildContext;
use crate::duplicate::resolve_unique;
use crate::hierarchy::descendant;

/// Pivot keys in stack order, innermost first.
pub const PIVOT_KEYS: [&str; 8] = [
    "toeUp", "ball", "toeTip", "heel", "inside", "outside", "ankle", "center",
];

/// Sole pivot points for one foot, all in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FootPivots {
    pub toe_up: Vec3,
    pub ball: Vec3,
    pub toe_tip: Vec3,
    pub heel: Vec3,
    pub inside: Vec3,
    pub outside: Vec3,
    pub ankle: Vec3,
    pub center: Vec3,
}

impl FootPivots {
    /// Positions in [`PIVOT_KEYS`] order.
    pub fn ordered(&self) -> [(&'static str, Vec3); 8] {
        [
            ("toeUp", self.toe_up),
            ("ball", self.ball),
            ("toeTip", self.toe_tip),
            ("heel", self.heel),
            ("inside", self.inside),
            ("outside", self.outside),
            ("ankle", self.ankle),
            ("center", self.center),
        ]
    }
}

/// Derive foot pivots from the ankle joint and the foot mesh vertex cloud.
///
/// The chain below the ankle must be ankle -> ball -> toe. Extremes are
/// picked favoring low points, with +z toward the toes: the toe tip is the
/// most-forward low vertex, the heel most-backward, inside/outside the
/// least/most lateral. The center sits between them at the lowest height.
pub fn foot_pivots<S: SceneBackend>(
    scene: &S,
    ankle: NodeId,
    vertices: &[Vec3],
) -> Result<FootPivots> {
    if vertices.is_empty() {
        return Err(RigError::Precondition(
            "foot pivot extraction needs a vertex cloud".to_string(),
        ));
    }
    let ball = descendant(scene, ankle, 1)?;
    let toe = descendant(scene, ankle, 2)?;

    let centroid = vertices
        .iter()
        .fold(Vec3::ZERO, |acc, v| acc + *v)
        * (1.0 / vertices.len() as f64);

    let mut toe_tip = scene.world_position(toe)?;
    let mut heel = centroid;
    let mut inside = centroid;
    let mut outside = centroid;
    let mut lowest = centroid.y;

    for v in vertices {
        if v.z > toe_tip.z && v.y < toe_tip.y {
            toe_tip = *v;
        }
        if v.z < heel.z && v.y < heel.y {
            heel = *v;
        }
        if v.x.abs() < inside.x.abs() && v.y < inside.y {
            inside = *v;
        }
        if v.x.abs() > outside.x.abs() && v.y < outside.y {
            outside = *v;
        }
        if v.y < lowest {
            lowest = v.y;
        }
    }

    let center = Vec3::new(
        (inside.x + outside.x) * 0.5,
        lowest,
        (toe_tip.z + heel.z) * 0.5,
    );
    inside.y = center.y;
    outside.y = center.y;

    let ball_pos = scene.world_position(ball)?;
    Ok(FootPivots {
        toe_up: ball_pos,
        ball: ball_pos,
        toe_tip,
        heel,
        inside,
        outside,
        ankle: scene.world_position(ankle)?,
        center,
    })
}

/// Materialize one group per pivot, named off the ankle joint, placed at
/// the pivot position. Returns ids in [`PIVOT_KEYS`] order.
pub fn make_pivots<S: SceneBackend>(
    scene: &mut S,
    ctx: &mut BuildContext,
    pivots: &FootPivots,
    ankle: NodeId,
    name: &str,
) -> Result<Vec<NodeId>> {
    let base = RigName::parse(&scene.name_of(ankle)?)?
        .with_kind("stacked")
        .with_name(name)
        .with_class(NodeClass::Pivot);
    let mut out = Vec::with_capacity(PIVOT_KEYS.len());
    for (key, position) in pivots.ordered() {
        let pivot_name = resolve_unique(scene, &base.append_id(key), None)?;
        let pivot = scene.create_group(&pivot_name.to_string())?;
        scene.set_world_position(pivot, position)?;
        ctx.record(pivot);
        out.push(pivot);
    }
    debug!("made {} foot pivots for `{name}`", out.len());
    Ok(out)
}

/// Nest pivots into the reverse-foot chain. Both toe pivots parent into the
/// toe tip, then each later pivot wraps the previous one; the last entry
/// (center) ends up as the stack root.
pub fn stack_pivots<S: SceneBackend>(scene: &mut S, pivots: &[NodeId]) -> Result<()> {
    if pivots.len() != PIVOT_KEYS.len() {
        return Err(RigError::Precondition(format!(
            "pivot stack expects {} pivots, got {}",
            PIVOT_KEYS.len(),
            pivots.len()
        )));
    }
    for i in 1..pivots.len() {
        if i == 1 {
            scene.set_parent(pivots[0], Some(pivots[2]))?;
        } else {
            scene.set_parent(pivots[i - 1], Some(pivots[i]))?;
        }
    }
    Ok(())
}
