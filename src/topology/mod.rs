pub mod reference;

pub use reference::reference_topology;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Layer a switch occupies in the hierarchical fabric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchRole {
    Core,
    Distribution,
    Access,
}

/// Priority and expiry applied to every rule installed on a switch of a given role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LayerDefaults {
    pub priority: u16,
    /// Seconds; 0 keeps the rule until explicitly removed
    pub idle_timeout: u16,
}

// Indexed by `SwitchRole as usize`.
const LAYER_DEFAULTS: [LayerDefaults; 3] = [
    LayerDefaults { priority: 100, idle_timeout: 0 },
    LayerDefaults { priority: 50, idle_timeout: 300 },
    LayerDefaults { priority: 10, idle_timeout: 60 },
];

const ROLE_PRIORITY_WEIGHT: [u16; 3] = [200, 100, 50];

impl SwitchRole {
    pub const ALL: [SwitchRole; 3] = [SwitchRole::Core, SwitchRole::Distribution, SwitchRole::Access];

    /// Classify a switch by the first character of its identifier.
    ///
    /// Only the first character is inspected: `"core1"` is Core because it
    /// starts with `c`, and anything that is neither `c` nor `d` (including an
    /// empty id) falls through to Access.
    pub fn classify(switch_id: &str) -> Self {
        match switch_id.chars().next() {
            Some('c') => SwitchRole::Core,
            Some('d') => SwitchRole::Distribution,
            _ => SwitchRole::Access,
        }
    }

    pub fn defaults(self) -> LayerDefaults {
        LAYER_DEFAULTS[self as usize]
    }

    /// Amount added to the path base priority by the rule generator
    pub fn priority_weight(self) -> u16 {
        ROLE_PRIORITY_WEIGHT[self as usize]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SwitchRole::Core => "core",
            SwitchRole::Distribution => "distribution",
            SwitchRole::Access => "access",
        }
    }
}

impl fmt::Display for SwitchRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwitchRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SwitchRole::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown layer: {}", s))
    }
}

/// Shorthand for [`SwitchRole::classify`]
pub fn classify(switch_id: &str) -> SwitchRole {
    SwitchRole::classify(switch_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_first_character() {
        assert_eq!(classify("c1"), SwitchRole::Core);
        assert_eq!(classify("d4"), SwitchRole::Distribution);
        assert_eq!(classify("a5"), SwitchRole::Access);
        assert_eq!(classify("h1"), SwitchRole::Access);
        assert_eq!(classify("openflow:1"), SwitchRole::Access);
    }

    #[test]
    fn test_classify_is_literal_prefix() {
        // "core1" is Core only because it begins with 'c'
        assert_eq!(classify("core1"), SwitchRole::Core);
        assert_eq!(classify("dist1"), SwitchRole::Distribution);
        assert_eq!(classify("Core1"), SwitchRole::Access);
        assert_eq!(classify("access-c1"), SwitchRole::Access);
        assert_eq!(classify(""), SwitchRole::Access);
    }

    #[test]
    fn test_layer_defaults_table() {
        assert_eq!(SwitchRole::Core.defaults(), LayerDefaults { priority: 100, idle_timeout: 0 });
        assert_eq!(SwitchRole::Distribution.defaults(), LayerDefaults { priority: 50, idle_timeout: 300 });
        assert_eq!(SwitchRole::Access.defaults(), LayerDefaults { priority: 10, idle_timeout: 60 });
    }

    #[test]
    fn test_priority_weights() {
        assert_eq!(SwitchRole::Core.priority_weight(), 200);
        assert_eq!(SwitchRole::Distribution.priority_weight(), 100);
        assert_eq!(SwitchRole::Access.priority_weight(), 50);
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("core".parse::<SwitchRole>().unwrap(), SwitchRole::Core);
        assert_eq!("distribution".parse::<SwitchRole>().unwrap(), SwitchRole::Distribution);
        assert_eq!("access".parse::<SwitchRole>().unwrap(), SwitchRole::Access);
        assert!("spine".parse::<SwitchRole>().is_err());
    }
}
