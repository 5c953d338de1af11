//! Whole-rig configuration.
//!
//! Aggregates every assembly option struct so a host can ship one JSON
//! document with its preferred defaults and hand pieces of it to the
//! individual assemblers. Every field falls back to the built-in defaults,
//! so an empty document is a valid config.

use serde::{Deserialize, Serialize};

use rigkit_api_core::{Result, RigError};

use crate::assembly::{BashOptions, FkOptions, FootOptions, HandOptions, IkOptions, LimbOptions};
use crate::control::MasterControlSpec;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RigConfig {
    pub fk: FkOptions,
    pub ik: IkOptions,
    pub bash: BashOptions,
    pub limb: LimbOptions,
    pub hand: HandOptions,
    pub foot: FootOptions,
    pub master: MasterControlSpec,
}

impl RigConfig {
    pub fn from_json(raw: &str) -> Result<RigConfig> {
        serde_json::from_str(raw)
            .map_err(|e| RigError::Precondition(format!("rig config did not parse: {e}")))
    }
}
