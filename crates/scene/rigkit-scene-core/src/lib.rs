//! rigkit-scene-core: the scene backend contract the rig-assembly core
//! consumes, plus [`MemoryScene`], an in-memory reference backend used by
//! tests and host integrations that do not sit inside a DCC.
//!
//! The real scene database (joint storage, constraint solving, shape
//! drawing) is an external collaborator; everything the assembly layer needs
//! from it is expressed by the [`SceneBackend`] trait.

pub mod backend;
pub mod memory;
pub mod skeleton;

pub use backend::{AttrSpec, AttrValue, ConstraintOptions, NodeId, Plug, SceneBackend};
pub use memory::MemoryScene;
pub use skeleton::{load_skeleton, JointSpec, SkeletonSpec};
