//! The external scene backend contract.
//!
//! Nodes carry a stable [`NodeId`] besides their display name; the name is
//! the persisted addressing contract, the id is what the engine threads
//! through its own bookkeeping. Every operation is an immediate, blocking
//! mutation (single-threaded command-style execution, no transactions).

use serde::{Deserialize, Serialize};

use rigkit_api_core::{ChannelAxis, ConstraintKind, ControlShape, IkSolver, Result, UtilityKind, Vec3};

/// Stable node identity, separate from the display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// One attribute endpoint: a node plus an attribute name on it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Plug {
    pub node: NodeId,
    pub attr: String,
}

impl Plug {
    pub fn new(node: NodeId, attr: impl Into<String>) -> Self {
        Plug {
            node,
            attr: attr.into(),
        }
    }
}

/// Typed attribute value (float or string, per the backend contract).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Float(f64),
    Text(String),
}

impl AttrValue {
    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttrValue::Float(f) => Some(*f),
            AttrValue::Text(_) => None,
        }
    }
}

impl From<f64> for AttrValue {
    fn from(f: f64) -> Self {
        AttrValue::Float(f)
    }
}

/// Declaration for a new typed attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttrSpec {
    pub name: String,
    pub default: AttrValue,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub keyable: bool,
}

impl AttrSpec {
    pub fn float(name: impl Into<String>, default: f64) -> Self {
        AttrSpec {
            name: name.into(),
            default: AttrValue::Float(default),
            min: None,
            max: None,
            keyable: true,
        }
    }

    /// Keyable float clamped to `[min, max]`.
    pub fn bounded(name: impl Into<String>, default: f64, min: f64, max: f64) -> Self {
        AttrSpec {
            name: name.into(),
            default: AttrValue::Float(default),
            min: Some(min),
            max: Some(max),
            keyable: true,
        }
    }
}

/// Options passed through to constraint creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintOptions {
    pub maintain_offset: bool,
    pub weight: f64,
    pub skip_rotate: Vec<ChannelAxis>,
    pub skip_translate: Vec<ChannelAxis>,
    /// Aim constraints only: forward direction, already resolved.
    pub aim: Vec3,
    /// Aim constraints only: up direction, already resolved.
    pub up: Vec3,
}

impl Default for ConstraintOptions {
    fn default() -> Self {
        ConstraintOptions {
            maintain_offset: true,
            weight: 1.0,
            skip_rotate: Vec::new(),
            skip_translate: Vec::new(),
            aim: Vec3::new(1.0, 0.0, 0.0),
            up: Vec3::new(0.0, 1.0, 0.0),
        }
    }
}

/// The operations the rig-assembly core requires of a host scene.
pub trait SceneBackend {
    // -- node creation ----------------------------------------------------
    fn create_group(&mut self, name: &str) -> Result<NodeId>;
    fn create_shape(&mut self, name: &str, shape: ControlShape, size: f64, rotation: Vec3)
        -> Result<NodeId>;
    /// Duplicate a single node: pivot and shape only, no children carried
    /// over, parented to world.
    fn duplicate_shallow(&mut self, source: NodeId, name: &str) -> Result<NodeId>;
    fn create_ik_handle(
        &mut self,
        name: &str,
        solver: IkSolver,
        start: NodeId,
        end: NodeId,
    ) -> Result<NodeId>;
    fn create_utility(&mut self, name: &str, kind: UtilityKind) -> Result<NodeId>;

    // -- constraints ------------------------------------------------------
    fn create_constraint(
        &mut self,
        name: &str,
        kind: ConstraintKind,
        driver: NodeId,
        driven: NodeId,
        options: &ConstraintOptions,
    ) -> Result<NodeId>;
    /// The existing constraint of `kind` on `driven`, if any.
    fn constraint_on(&self, driven: NodeId, kind: ConstraintKind) -> Result<Option<NodeId>>;
    /// Append a weighted influence; influence lists are append-only.
    /// Returns the new influence index.
    fn add_influence(&mut self, constraint: NodeId, driver: NodeId, weight: f64) -> Result<usize>;
    fn influences_of(&self, constraint: NodeId) -> Result<Vec<NodeId>>;
    /// Ordered weight attribute names, one per influence.
    fn weight_attrs(&self, constraint: NodeId) -> Result<Vec<String>>;

    // -- hierarchy and transforms -----------------------------------------
    fn node_by_name(&self, name: &str) -> Option<NodeId>;
    fn name_of(&self, node: NodeId) -> Result<String>;
    fn exists(&self, name: &str) -> bool {
        self.node_by_name(name).is_some()
    }
    fn parent_of(&self, node: NodeId) -> Result<Option<NodeId>>;
    fn children_of(&self, node: NodeId) -> Result<Vec<NodeId>>;
    /// Re-parent, preserving the node's world transform. `None` parents to
    /// world.
    fn set_parent(&mut self, node: NodeId, parent: Option<NodeId>) -> Result<()>;
    fn world_position(&self, node: NodeId) -> Result<Vec3>;
    fn set_world_position(&mut self, node: NodeId, position: Vec3) -> Result<()>;
    /// Bake the node's current transform so its animator channels read zero.
    fn freeze(&mut self, node: NodeId) -> Result<()>;
    /// Delete the node and every descendant.
    fn delete(&mut self, node: NodeId) -> Result<()>;

    // -- attributes and connections ---------------------------------------
    fn add_attr(&mut self, node: NodeId, spec: AttrSpec) -> Result<()>;
    fn has_attr(&self, node: NodeId, attr: &str) -> bool;
    fn attr(&self, node: NodeId, attr: &str) -> Result<AttrValue>;
    fn set_attr(&mut self, node: NodeId, attr: &str, value: AttrValue) -> Result<()>;
    fn set_keyable(&mut self, node: NodeId, attr: &str, keyable: bool) -> Result<()>;
    /// Connect `src` to `dst`, replacing any existing incoming connection
    /// on `dst`.
    fn connect(&mut self, src: Plug, dst: Plug) -> Result<()>;
    fn is_connected(&self, src: &Plug, dst: &Plug) -> bool;
}
