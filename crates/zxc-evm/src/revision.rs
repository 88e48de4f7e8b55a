//! Protocol revisions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Unknown revision name
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown revision: {0}")]
pub struct UnknownRevision(pub String);

/// Protocol revision, ordered oldest first.
///
/// A later revision never removes an opcode and only ever adds gas schedule
/// changes on top of the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Revision {
    /// Initial release
    Frontier = 0,
    /// DELEGATECALL
    Homestead = 1,
    /// EIP-150 repricing and the 63/64 call gas rule
    TangerineWhistle = 2,
    /// EIP-158 empty-account rules, EXP repricing
    SpuriousDragon = 3,
    /// REVERT, STATICCALL, RETURNDATA
    Byzantium = 4,
    /// Shifts, CREATE2, EXTCODEHASH, net gas metering for SSTORE
    Constantinople = 5,
    /// Constantinople without net gas metering
    Petersburg = 6,
    /// CHAINID, SELFBALANCE, EIP-1884 repricing
    Istanbul = 7,
}

impl Revision {
    /// All revisions in order
    pub const ALL: [Revision; 8] = [
        Revision::Frontier,
        Revision::Homestead,
        Revision::TangerineWhistle,
        Revision::SpuriousDragon,
        Revision::Byzantium,
        Revision::Constantinople,
        Revision::Petersburg,
        Revision::Istanbul,
    ];

    /// Most recent supported revision
    pub const LATEST: Revision = Revision::Istanbul;

    /// Lowercase name, as used in configuration files
    pub fn name(self) -> &'static str {
        match self {
            Revision::Frontier => "frontier",
            Revision::Homestead => "homestead",
            Revision::TangerineWhistle => "tangerinewhistle",
            Revision::SpuriousDragon => "spuriousdragon",
            Revision::Byzantium => "byzantium",
            Revision::Constantinople => "constantinople",
            Revision::Petersburg => "petersburg",
            Revision::Istanbul => "istanbul",
        }
    }

    /// Position in [`Revision::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl Default for Revision {
    fn default() -> Self {
        Revision::LATEST
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Revision {
    type Err = UnknownRevision;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "frontier" => Ok(Revision::Frontier),
            "homestead" => Ok(Revision::Homestead),
            "tangerinewhistle" | "eip150" => Ok(Revision::TangerineWhistle),
            "spuriousdragon" | "eip158" => Ok(Revision::SpuriousDragon),
            "byzantium" => Ok(Revision::Byzantium),
            "constantinople" => Ok(Revision::Constantinople),
            "petersburg" | "constantinoplefix" => Ok(Revision::Petersburg),
            "istanbul" | "latest" => Ok(Revision::Istanbul),
            _ => Err(UnknownRevision(s.to_string())),
        }
    }
}
