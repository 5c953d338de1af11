//! Composite assemblies built from the lower layers: FK, IK, bash chains,
//! limbs, hands, and reverse feet.

pub mod bash;
pub mod fk;
pub mod foot;
pub mod hand;
pub mod ik;
pub mod limb;
pub mod pivots;

pub use bash::{assemble_bash_chain, assemble_single_bash, BashAssembly, BashOptions};
pub use fk::{assemble_fk, FkAssembly, FkOptions, FkStyle};
pub use foot::{assemble_foot_ik, FootAssembly, FootOptions, LegHandoff};
pub use hand::{assemble_hand, FingerAssembly, HandAssembly, HandOptions};
pub use ik::{
    assemble_ik, place_pole_vector, ClavicleAssembly, IkAssembly, IkOptions,
};
pub use limb::{assemble_basic_limb, LimbAssembly, LimbOptions};
pub use pivots::{foot_pivots, make_pivots, stack_pivots, FootPivots, PIVOT_KEYS};
