//! Rule qualifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Rule-level flag attached to a definition.
///
/// `Skip` and `Support` are only legal on LPRs: `Skip` tokens are cut from
/// the lexer's public stream by default, and `Support` rules are only
/// reachable by explicit reference, never by the grammar-wide matcher.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Qualifier {
    #[default]
    None,
    Skip,
    Support,
}

impl Qualifier {
    pub fn to_u8(self) -> u8 {
        match self {
            Qualifier::None => 0,
            Qualifier::Skip => 1,
            Qualifier::Support => 2,
        }
    }

    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Qualifier::None),
            1 => Some(Qualifier::Skip),
            2 => Some(Qualifier::Support),
            _ => None,
        }
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Qualifier::None => f.write_str("none"),
            Qualifier::Skip => f.write_str("skip"),
            Qualifier::Support => f.write_str("support"),
        }
    }
}
