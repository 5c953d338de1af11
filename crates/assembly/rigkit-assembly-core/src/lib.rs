//! rigkit-assembly-core: the procedural rig-assembly engine.
//!
//! The layers stack bottom-up: [`context`] holds per-character build state,
//! [`organize`] files nodes into the character hierarchy, [`duplicate`]
//! builds proxy chains, [`control`] manufactures control sandwiches,
//! [`driver`] and [`blend`] wire constraints and blend dials, and
//! [`assembly`] composes them into FK, IK, bash, limb, hand, and foot
//! systems. Everything operates through the
//! [`SceneBackend`](rigkit_scene_core::SceneBackend) trait.

pub mod assembly;
pub mod blend;
pub mod config;
pub mod context;
pub mod control;
pub mod driver;
pub mod duplicate;
pub mod hierarchy;
pub mod organize;
pub mod spaces;

pub use assembly::{
    assemble_bash_chain, assemble_basic_limb, assemble_fk, assemble_foot_ik, assemble_hand,
    assemble_ik, assemble_single_bash, place_pole_vector, BashAssembly, BashOptions,
    ClavicleAssembly, FingerAssembly, FkAssembly, FkOptions, FkStyle, FootAssembly, FootOptions,
    FootPivots, HandAssembly, HandOptions, IkAssembly, IkOptions, LegHandoff, LimbAssembly,
    LimbOptions, PIVOT_KEYS,
};
pub use blend::{enable_inverse_blend, sync_vis};
pub use config::RigConfig;
pub use context::{delete_character, BuildContext, GroupKey};
pub use control::{
    add_offset_above, default_shape, hide_channels, make_control, make_master_control,
    ControlSpec, MasterControlSpec,
};
pub use driver::{add_driver, DriverOptions};
pub use duplicate::duplicate_chain;
pub use hierarchy::{ancestor, descendant};
pub use organize::organize;
pub use spaces::{create_utility, rig_space, space_for};
