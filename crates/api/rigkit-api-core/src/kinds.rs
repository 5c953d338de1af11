//! Closed kind enums shared between the scene backend and the assembly
//! layer. The original tooling dispatched on string tags; the variant sets
//! here are fixed and checked exhaustively instead.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RigError};

/// Constraint primitives the scene backend is required to provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintKind {
    Parent,
    Orient,
    Point,
    Aim,
    #[serde(rename = "pv")]
    PoleVector,
}

impl ConstraintKind {
    /// The kind segment used in generated constraint names.
    pub fn token(self) -> &'static str {
        match self {
            ConstraintKind::Parent => "parent",
            ConstraintKind::Orient => "orient",
            ConstraintKind::Point => "point",
            ConstraintKind::Aim => "aim",
            ConstraintKind::PoleVector => "pv",
        }
    }

    pub fn parse(token: &str) -> Result<ConstraintKind> {
        match token.to_ascii_lowercase().as_str() {
            "parent" => Ok(ConstraintKind::Parent),
            "orient" => Ok(ConstraintKind::Orient),
            "point" => Ok(ConstraintKind::Point),
            "aim" => Ok(ConstraintKind::Aim),
            "pv" => Ok(ConstraintKind::PoleVector),
            other => Err(RigError::UnsupportedConfiguration(format!(
                "unknown constraint kind `{other}`"
            ))),
        }
    }
}

/// IK solver flavors. Single-chain solves two joints with no pole vector;
/// rotate-plane solves three joints and needs one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IkSolver {
    SingleChain,
    RotatePlane,
}

/// Handle shapes the control factory can ask the backend for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlShape {
    Circle,
    Nail,
    Rhombus,
    Sphere,
    Cone,
    Jack,
    Footprint,
}

/// Stateless computation nodes created on demand by the blend layer.
/// Parameters (condition terms, output values) are plain attributes set
/// after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UtilityKind {
    /// `output = 1 - input`
    Reverse,
    /// `output = if_true` when `input == second_term`, else `if_false`.
    Condition,
    /// Per-axis pass-through sum: `output_<axis> = input_<axis>`.
    Sum,
}

impl UtilityKind {
    pub fn token(self) -> &'static str {
        match self {
            UtilityKind::Reverse => "reverse",
            UtilityKind::Condition => "condition",
            UtilityKind::Sum => "sum",
        }
    }
}
