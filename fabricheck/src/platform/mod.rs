//! Platform definitions for vendor CLI dialects.
//!
//! A platform describes prompts, privilege escalation, session setup and
//! failure markers. The fabric checks only speak EOS today; adding a
//! dialect means adding a vendor module and a [`Platform`] variant.

mod definition;
mod privilege_level;
pub mod vendors;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use definition::PlatformDefinition;
pub use privilege_level::{Escalation, PrivilegeLevel};

use crate::error::PlatformError;

/// Supported device platforms.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Arista EOS (vEOS, cEOS, hardware).
    #[default]
    AristaEos,
}

impl Platform {
    /// Canonical platform tag.
    pub fn name(&self) -> &'static str {
        match self {
            Platform::AristaEos => "arista_eos",
        }
    }

    /// Build the platform definition.
    pub fn definition(&self) -> PlatformDefinition {
        match self {
            Platform::AristaEos => vendors::arista::platform(),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = PlatformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "arista_eos" | "eos" => Ok(Platform::AristaEos),
            _ => Err(PlatformError::UnknownPlatform {
                name: s.to_string(),
            }),
        }
    }
}
