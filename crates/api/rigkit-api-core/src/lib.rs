//! rigkit-api-core: shared vocabulary for the Rigkit rig-assembly engine.
//!
//! Everything in this crate is pure data: the segmented-name codec that the
//! whole engine uses for addressing, small 3D vector math, the closed kind
//! enums shared between the scene backend and the assembly layer, and the
//! error taxonomy.

pub mod error;
pub mod kinds;
pub mod math;
pub mod name;

pub use error::{Result, RigError};
pub use kinds::{ConstraintKind, ControlShape, IkSolver, UtilityKind};
pub use math::{Axis, AxisSpec, ChannelAxis, Vec3};
pub use name::{NodeClass, RigName, Segment, SegmentSel, SegmentTag};
