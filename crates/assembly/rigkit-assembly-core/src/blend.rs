//! FK/IK and follow blending.
//!
//! One animator attribute drives both weights of a two-influence constraint:
//! the direct weight reads the attribute, the inverse weight reads it
//! through a reverse utility, so the pair always sums to one. Visibility
//! sync uses condition utilities keyed on the same attribute's extremes.

use rigkit_api_core::{NodeClass, Result, RigError, RigName, UtilityKind};
use rigkit_scene_core::{AttrSpec, AttrValue, NodeId, Plug, SceneBackend};

use crate::context::BuildContext;
use crate::spaces::create_utility;

/// Drive a two-influence constraint from one `[0, 1]` attribute on `cntl`.
///
/// `direct_idx` names the weight that reads the attribute as-is,
/// `inverse_idx` the weight that reads `1 - attribute`. The attribute is
/// created (keyable, clamped, default 1) when missing.
pub fn enable_inverse_blend<S: SceneBackend>(
    scene: &mut S,
    ctx: &mut BuildContext,
    cntl: NodeId,
    constraint: NodeId,
    attr: &str,
    inverse_idx: usize,
    direct_idx: usize,
) -> Result<()> {
    let weights = scene.weight_attrs(constraint)?;
    if weights.len() != 2 {
        return Err(RigError::UnsupportedConfiguration(format!(
            "inverse blend drives exactly two influences; `{}` has {}",
            scene.name_of(constraint)?,
            weights.len()
        )));
    }
    if inverse_idx >= 2 || direct_idx >= 2 || inverse_idx == direct_idx {
        return Err(RigError::UnsupportedConfiguration(format!(
            "invalid inverse/direct weight indices {inverse_idx}/{direct_idx}"
        )));
    }

    if !scene.has_attr(cntl, attr) {
        scene.add_attr(cntl, AttrSpec::bounded(attr, 1.0, 0.0, 1.0))?;
    }

    let reverse_name = RigName::parse(&scene.name_of(cntl)?)?
        .with_class(NodeClass::Util)
        .append_id(attr)
        .append_id("reverse");
    let reverse = create_utility(scene, ctx, &reverse_name, UtilityKind::Reverse)?;

    let source = Plug::new(cntl, attr);
    let reverse_in = Plug::new(reverse, "input");
    if !scene.is_connected(&source, &reverse_in) {
        scene.connect(source.clone(), reverse_in)?;
    }
    scene.connect(source, Plug::new(constraint, &weights[direct_idx]))?;
    scene.connect(
        Plug::new(reverse, "output"),
        Plug::new(constraint, &weights[inverse_idx]),
    )?;
    Ok(())
}

/// Tie node visibility to the extremes of a blend attribute on `cntl`.
///
/// `max_nodes` are visible except when the attribute sits at `min`;
/// `min_nodes` are visible except when it sits at `max`. Between the
/// extremes both sets show.
#[allow(clippy::too_many_arguments)]
pub fn sync_vis<S: SceneBackend>(
    scene: &mut S,
    ctx: &mut BuildContext,
    cntl: NodeId,
    attr: &str,
    max_nodes: &[NodeId],
    min_nodes: &[NodeId],
    min: f64,
    max: f64,
) -> Result<()> {
    if !scene.has_attr(cntl, attr) {
        scene.add_attr(cntl, AttrSpec::bounded(attr, max, min, max))?;
    }
    let base = RigName::parse(&scene.name_of(cntl)?)?
        .with_class(NodeClass::Util)
        .append_id(attr);

    sync_vis_side(scene, ctx, cntl, attr, &base, "visConditionMax", min, max_nodes)?;
    sync_vis_side(scene, ctx, cntl, attr, &base, "visConditionMin", max, min_nodes)?;
    Ok(())
}

/// One condition node: output 0 (hide) exactly when the attribute equals
/// `hide_at`, 1 otherwise.
#[allow(clippy::too_many_arguments)]
fn sync_vis_side<S: SceneBackend>(
    scene: &mut S,
    ctx: &mut BuildContext,
    cntl: NodeId,
    attr: &str,
    base: &RigName,
    tag: &str,
    hide_at: f64,
    nodes: &[NodeId],
) -> Result<()> {
    if nodes.is_empty() {
        return Ok(());
    }
    let condition = create_utility(scene, ctx, &base.append_id(tag), UtilityKind::Condition)?;
    scene.set_attr(condition, "secondTerm", AttrValue::Float(hide_at))?;
    scene.set_attr(condition, "colorIfTrue", AttrValue::Float(0.0))?;
    scene.set_attr(condition, "colorIfFalse", AttrValue::Float(1.0))?;
    scene.connect(Plug::new(cntl, attr), Plug::new(condition, "firstTerm"))?;
    for node in nodes {
        scene.connect(
            Plug::new(condition, "outColor"),
            Plug::new(*node, "visibility"),
        )?;
    }
    Ok(())
}
