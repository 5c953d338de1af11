//! In-memory reference backend.
//!
//! `MemoryScene` keeps nodes in an arena indexed by [`NodeId`], with a name
//! index for the string addressing contract. Constraint solving and shape
//! drawing are a host concern; what the reference backend does evaluate is
//! the attribute dataflow (connections plus utility nodes), which is enough
//! for tests to check blend invariants numerically.

use hashbrown::HashMap;
use log::trace;

use rigkit_api_core::{
    ConstraintKind, ControlShape, IkSolver, Result, RigError, UtilityKind, Vec3,
};

use crate::backend::{AttrSpec, AttrValue, ConstraintOptions, NodeId, Plug, SceneBackend};

#[derive(Debug, Clone)]
struct Attr {
    value: AttrValue,
    min: Option<f64>,
    max: Option<f64>,
    keyable: bool,
}

impl Attr {
    fn clamped(&self, value: AttrValue) -> AttrValue {
        match value {
            AttrValue::Float(mut f) => {
                if let Some(min) = self.min {
                    f = f.max(min);
                }
                if let Some(max) = self.max {
                    f = f.min(max);
                }
                AttrValue::Float(f)
            }
            text => text,
        }
    }
}

#[derive(Debug, Clone)]
enum Payload {
    Group,
    Joint,
    Shape {
        shape: ControlShape,
        size: f64,
        rotation: Vec3,
    },
    IkHandle {
        solver: IkSolver,
        start: NodeId,
        end: NodeId,
    },
    Utility(UtilityKind),
    Constraint {
        kind: ConstraintKind,
        driven: NodeId,
        influences: Vec<NodeId>,
        options: ConstraintOptions,
    },
}

#[derive(Debug, Clone)]
struct Node {
    name: String,
    payload: Payload,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    world: Vec3,
    attrs: HashMap<String, Attr>,
}

#[derive(Debug, Clone)]
struct Connection {
    src: Plug,
    dst: Plug,
}

/// Arena-backed scene graph with attribute dataflow.
#[derive(Debug, Default)]
pub struct MemoryScene {
    nodes: Vec<Option<Node>>,
    by_name: HashMap<String, NodeId>,
    connections: Vec<Connection>,
}

const CHANNELS: [&str; 6] = [
    "translateX",
    "translateY",
    "translateZ",
    "rotateX",
    "rotateY",
    "rotateZ",
];

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a joint. Skeletons pre-exist rig assembly, so joint authoring
    /// is an inherent method rather than part of the consumed contract.
    pub fn create_joint(&mut self, name: &str, position: Vec3) -> Result<NodeId> {
        let id = self.insert(name, Payload::Joint)?;
        self.node_mut(id)?.world = position;
        Ok(id)
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.nodes.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate live node ids in creation order.
    pub fn iter_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_some())
            .map(|(i, _)| NodeId(i as u32))
    }

    /// Solver and joint span an IK handle was created over.
    pub fn ik_handle_span(&self, handle: NodeId) -> Result<(IkSolver, NodeId, NodeId)> {
        match self.node(handle)?.payload {
            Payload::IkHandle { solver, start, end } => Ok((solver, start, end)),
            _ => Err(RigError::Precondition(format!(
                "node `{}` is not an ik handle",
                self.node(handle)?.name
            ))),
        }
    }

    /// Options a constraint was created with, for hosts that replay the
    /// build against a real scene.
    pub fn constraint_options(&self, constraint: NodeId) -> Result<&ConstraintOptions> {
        match &self.node(constraint)?.payload {
            Payload::Constraint { options, .. } => Ok(options),
            _ => Err(RigError::Precondition(format!(
                "node `{}` is not a constraint",
                self.node(constraint)?.name
            ))),
        }
    }

    /// Push attribute values through the connection graph until stable.
    ///
    /// A host backend evaluates its dependency graph continuously; here the
    /// fixed-point pass is explicit so tests control when values settle. The
    /// pass count bounds the longest utility chain.
    pub fn evaluate(&mut self) {
        let passes = self.connections.len() + 2;
        for _ in 0..passes {
            for i in 0..self.connections.len() {
                let Connection { src, dst } = self.connections[i].clone();
                let Ok(value) = self.attr(src.node, &src.attr) else {
                    continue;
                };
                let _ = self.write_attr(dst.node, &dst.attr, value);
            }
            self.compute_utilities();
        }
    }

    fn compute_utilities(&mut self) {
        for i in 0..self.nodes.len() {
            let id = NodeId(i as u32);
            let Some(node) = self.nodes[i].as_ref() else {
                continue;
            };
            let Payload::Utility(kind) = node.payload else {
                continue;
            };
            match kind {
                UtilityKind::Reverse => {
                    let input = self.float_attr(id, "input");
                    let _ = self.write_attr(id, "output", AttrValue::Float(1.0 - input));
                }
                UtilityKind::Condition => {
                    let first = self.float_attr(id, "firstTerm");
                    let second = self.float_attr(id, "secondTerm");
                    let out = if (first - second).abs() <= f64::EPSILON {
                        self.float_attr(id, "colorIfTrue")
                    } else {
                        self.float_attr(id, "colorIfFalse")
                    };
                    let _ = self.write_attr(id, "outColor", AttrValue::Float(out));
                }
                UtilityKind::Sum => {
                    for axis in ["X", "Y", "Z"] {
                        let input = self.float_attr(id, &format!("input{axis}"));
                        let _ =
                            self.write_attr(id, &format!("output{axis}"), AttrValue::Float(input));
                    }
                }
            }
        }
    }

    fn float_attr(&self, node: NodeId, attr: &str) -> f64 {
        self.node(node)
            .ok()
            .and_then(|n| n.attrs.get(attr))
            .and_then(|a| a.value.as_float())
            .unwrap_or(0.0)
    }

    fn insert(&mut self, name: &str, payload: Payload) -> Result<NodeId> {
        if self.by_name.contains_key(name) {
            return Err(RigError::Precondition(format!(
                "a node named `{name}` already exists"
            )));
        }
        let id = NodeId(self.nodes.len() as u32);
        let mut node = Node {
            name: name.to_string(),
            payload,
            parent: None,
            children: Vec::new(),
            world: Vec3::ZERO,
            attrs: HashMap::new(),
        };
        if matches!(
            node.payload,
            Payload::Group | Payload::Joint | Payload::Shape { .. } | Payload::IkHandle { .. }
        ) {
            for channel in CHANNELS {
                node.attrs.insert(
                    channel.to_string(),
                    Attr {
                        value: AttrValue::Float(0.0),
                        min: None,
                        max: None,
                        keyable: true,
                    },
                );
            }
            node.attrs.insert(
                "visibility".to_string(),
                Attr {
                    value: AttrValue::Float(1.0),
                    min: None,
                    max: None,
                    keyable: true,
                },
            );
        }
        self.nodes.push(Some(node));
        self.by_name.insert(name.to_string(), id);
        Ok(id)
    }

    fn node(&self, id: NodeId) -> Result<&Node> {
        self.nodes
            .get(id.0 as usize)
            .and_then(|n| n.as_ref())
            .ok_or_else(|| RigError::MissingNode(format!("#{}", id.0)))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node> {
        self.nodes
            .get_mut(id.0 as usize)
            .and_then(|n| n.as_mut())
            .ok_or_else(|| RigError::MissingNode(format!("#{}", id.0)))
    }

    fn write_attr(&mut self, id: NodeId, attr: &str, value: AttrValue) -> Result<()> {
        let node = self.node_mut(id)?;
        let slot = node.attrs.get_mut(attr).ok_or_else(|| {
            RigError::Precondition(format!("node `{}` has no attribute `{attr}`", node.name))
        })?;
        slot.value = slot.clamped(value);
        Ok(())
    }
}

impl SceneBackend for MemoryScene {
    fn create_group(&mut self, name: &str) -> Result<NodeId> {
        self.insert(name, Payload::Group)
    }

    fn create_shape(
        &mut self,
        name: &str,
        shape: ControlShape,
        size: f64,
        rotation: Vec3,
    ) -> Result<NodeId> {
        self.insert(
            name,
            Payload::Shape {
                shape,
                size,
                rotation,
            },
        )
    }

    fn duplicate_shallow(&mut self, source: NodeId, name: &str) -> Result<NodeId> {
        let (payload, world, attrs) = {
            let src = self.node(source)?;
            (src.payload.clone(), src.world, src.attrs.clone())
        };
        let id = self.insert(name, payload)?;
        let node = self.node_mut(id)?;
        node.world = world;
        node.attrs = attrs;
        Ok(id)
    }

    fn create_ik_handle(
        &mut self,
        name: &str,
        solver: IkSolver,
        start: NodeId,
        end: NodeId,
    ) -> Result<NodeId> {
        let end_world = self.node(end)?.world;
        self.node(start)?;
        let id = self.insert(name, Payload::IkHandle { solver, start, end })?;
        self.node_mut(id)?.world = end_world;
        Ok(id)
    }

    fn create_utility(&mut self, name: &str, kind: UtilityKind) -> Result<NodeId> {
        let id = self.insert(name, Payload::Utility(kind))?;
        let attrs: &[(&str, f64)] = match kind {
            UtilityKind::Reverse => &[("input", 0.0), ("output", 1.0)],
            UtilityKind::Condition => &[
                ("firstTerm", 0.0),
                ("secondTerm", 0.0),
                ("colorIfTrue", 1.0),
                ("colorIfFalse", 0.0),
                ("outColor", 0.0),
            ],
            UtilityKind::Sum => &[
                ("inputX", 0.0),
                ("inputY", 0.0),
                ("inputZ", 0.0),
                ("outputX", 0.0),
                ("outputY", 0.0),
                ("outputZ", 0.0),
            ],
        };
        let node = self.node_mut(id)?;
        for (attr, default) in attrs {
            node.attrs.insert(
                attr.to_string(),
                Attr {
                    value: AttrValue::Float(*default),
                    min: None,
                    max: None,
                    keyable: false,
                },
            );
        }
        Ok(id)
    }

    fn create_constraint(
        &mut self,
        name: &str,
        kind: ConstraintKind,
        driver: NodeId,
        driven: NodeId,
        options: &ConstraintOptions,
    ) -> Result<NodeId> {
        self.node(driver)?;
        self.node(driven)?;
        let id = self.insert(
            name,
            Payload::Constraint {
                kind,
                driven,
                influences: vec![driver],
                options: options.clone(),
            },
        )?;
        let weight = options.weight;
        self.node_mut(id)?.attrs.insert(
            "w0".to_string(),
            Attr {
                value: AttrValue::Float(weight),
                min: None,
                max: None,
                keyable: false,
            },
        );
        Ok(id)
    }

    fn constraint_on(&self, driven: NodeId, kind: ConstraintKind) -> Result<Option<NodeId>> {
        self.node(driven)?;
        for id in self.iter_nodes() {
            if let Payload::Constraint {
                kind: k,
                driven: d,
                ..
            } = self.node(id)?.payload
            {
                if d == driven && k == kind {
                    return Ok(Some(id));
                }
            }
        }
        Ok(None)
    }

    fn add_influence(&mut self, constraint: NodeId, driver: NodeId, weight: f64) -> Result<usize> {
        self.node(driver)?;
        let node = self.node_mut(constraint)?;
        let index = match &mut node.payload {
            Payload::Constraint { influences, .. } => {
                influences.push(driver);
                influences.len() - 1
            }
            _ => {
                return Err(RigError::Precondition(format!(
                    "node `{}` is not a constraint",
                    node.name
                )))
            }
        };
        node.attrs.insert(
            format!("w{index}"),
            Attr {
                value: AttrValue::Float(weight),
                min: None,
                max: None,
                keyable: false,
            },
        );
        Ok(index)
    }

    fn influences_of(&self, constraint: NodeId) -> Result<Vec<NodeId>> {
        match &self.node(constraint)?.payload {
            Payload::Constraint { influences, .. } => Ok(influences.clone()),
            _ => Err(RigError::Precondition(format!(
                "node `{}` is not a constraint",
                self.node(constraint)?.name
            ))),
        }
    }

    fn weight_attrs(&self, constraint: NodeId) -> Result<Vec<String>> {
        let count = self.influences_of(constraint)?.len();
        Ok((0..count).map(|i| format!("w{i}")).collect())
    }

    fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    fn name_of(&self, node: NodeId) -> Result<String> {
        Ok(self.node(node)?.name.clone())
    }

    fn parent_of(&self, node: NodeId) -> Result<Option<NodeId>> {
        Ok(self.node(node)?.parent)
    }

    fn children_of(&self, node: NodeId) -> Result<Vec<NodeId>> {
        Ok(self.node(node)?.children.clone())
    }

    fn set_parent(&mut self, node: NodeId, parent: Option<NodeId>) -> Result<()> {
        if parent == Some(node) {
            return Err(RigError::Precondition(format!(
                "cannot parent `{}` to itself",
                self.node(node)?.name
            )));
        }
        if let Some(p) = parent {
            self.node(p)?;
        }
        let old = self.node(node)?.parent;
        if let Some(old_parent) = old {
            if let Ok(n) = self.node_mut(old_parent) {
                n.children.retain(|c| *c != node);
            }
        }
        self.node_mut(node)?.parent = parent;
        if let Some(p) = parent {
            self.node_mut(p)?.children.push(node);
        }
        Ok(())
    }

    fn world_position(&self, node: NodeId) -> Result<Vec3> {
        Ok(self.node(node)?.world)
    }

    fn set_world_position(&mut self, node: NodeId, position: Vec3) -> Result<()> {
        self.node_mut(node)?.world = position;
        Ok(())
    }

    fn freeze(&mut self, node: NodeId) -> Result<()> {
        let n = self.node_mut(node)?;
        for channel in CHANNELS {
            if let Some(attr) = n.attrs.get_mut(channel) {
                attr.value = AttrValue::Float(0.0);
            }
        }
        Ok(())
    }

    fn delete(&mut self, node: NodeId) -> Result<()> {
        let children = self.children_of(node)?;
        for child in children {
            self.delete(child)?;
        }
        let removed = self
            .nodes
            .get_mut(node.0 as usize)
            .and_then(|n| n.take())
            .ok_or_else(|| RigError::MissingNode(format!("#{}", node.0)))?;
        trace!("delete node `{}`", removed.name);
        self.by_name.remove(&removed.name);
        if let Some(parent) = removed.parent {
            if let Ok(p) = self.node_mut(parent) {
                p.children.retain(|c| *c != node);
            }
        }
        self.connections
            .retain(|c| c.src.node != node && c.dst.node != node);
        Ok(())
    }

    fn add_attr(&mut self, node: NodeId, spec: AttrSpec) -> Result<()> {
        let n = self.node_mut(node)?;
        if n.attrs.contains_key(&spec.name) {
            return Err(RigError::Precondition(format!(
                "node `{}` already has attribute `{}`",
                n.name, spec.name
            )));
        }
        n.attrs.insert(
            spec.name.clone(),
            Attr {
                value: spec.default,
                min: spec.min,
                max: spec.max,
                keyable: spec.keyable,
            },
        );
        Ok(())
    }

    fn has_attr(&self, node: NodeId, attr: &str) -> bool {
        self.node(node)
            .map(|n| n.attrs.contains_key(attr))
            .unwrap_or(false)
    }

    fn attr(&self, node: NodeId, attr: &str) -> Result<AttrValue> {
        let n = self.node(node)?;
        n.attrs
            .get(attr)
            .map(|a| a.value.clone())
            .ok_or_else(|| {
                RigError::Precondition(format!("node `{}` has no attribute `{attr}`", n.name))
            })
    }

    fn set_attr(&mut self, node: NodeId, attr: &str, value: AttrValue) -> Result<()> {
        self.write_attr(node, attr, value)
    }

    fn set_keyable(&mut self, node: NodeId, attr: &str, keyable: bool) -> Result<()> {
        let n = self.node_mut(node)?;
        let name = n.name.clone();
        let slot = n
            .attrs
            .get_mut(attr)
            .ok_or_else(|| RigError::Precondition(format!("node `{name}` has no attribute `{attr}`")))?;
        slot.keyable = keyable;
        Ok(())
    }

    fn connect(&mut self, src: Plug, dst: Plug) -> Result<()> {
        self.node(src.node)?;
        self.node(dst.node)?;
        // one incoming connection per destination plug
        self.connections.retain(|c| c.dst != dst);
        self.connections.push(Connection { src, dst });
        Ok(())
    }

    fn is_connected(&self, src: &Plug, dst: &Plug) -> bool {
        self.connections
            .iter()
            .any(|c| c.src == *src && c.dst == *dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_utility_propagates() {
        let mut scene = MemoryScene::new();
        let ctl = scene.create_group("hero_fk_arm_l_cntl_tmp_grp").unwrap();
        scene
            .add_attr(ctl, AttrSpec::bounded("blend", 1.0, 0.0, 1.0))
            .unwrap();
        let rev = scene
            .create_utility("hero_fk_arm_l_blend_reverse_util", UtilityKind::Reverse)
            .unwrap();
        scene
            .connect(Plug::new(ctl, "blend"), Plug::new(rev, "input"))
            .unwrap();

        scene.set_attr(ctl, "blend", AttrValue::Float(0.25)).unwrap();
        scene.evaluate();
        assert_eq!(scene.attr(rev, "output").unwrap(), AttrValue::Float(0.75));
    }

    #[test]
    fn delete_cascades_and_clears_connections() {
        let mut scene = MemoryScene::new();
        let root = scene.create_group("hero_rig_grp").unwrap();
        let child = scene.create_group("hero_jnt_grp").unwrap();
        scene.set_parent(child, Some(root)).unwrap();
        let other = scene.create_group("hero_cntl_root").unwrap();
        scene
            .connect(
                Plug::new(child, "visibility"),
                Plug::new(other, "visibility"),
            )
            .unwrap();

        scene.delete(root).unwrap();
        assert!(scene.node_by_name("hero_jnt_grp").is_none());
        assert_eq!(scene.len(), 1);
        assert!(!scene.is_connected(
            &Plug::new(child, "visibility"),
            &Plug::new(other, "visibility")
        ));
    }

    #[test]
    fn reparent_keeps_world_position() {
        let mut scene = MemoryScene::new();
        let a = scene.create_joint("hero_bind_hip_l_jnt", Vec3::new(0.0, 9.0, 0.0)).unwrap();
        let b = scene.create_joint("hero_bind_knee_l_jnt", Vec3::new(0.0, 5.0, 0.2)).unwrap();
        scene.set_parent(b, Some(a)).unwrap();
        assert_eq!(scene.world_position(b).unwrap(), Vec3::new(0.0, 5.0, 0.2));
        scene.set_parent(b, None).unwrap();
        assert_eq!(scene.world_position(b).unwrap(), Vec3::new(0.0, 5.0, 0.2));
        assert!(scene.children_of(a).unwrap().is_empty());
    }
}
