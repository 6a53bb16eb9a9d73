//! Strongly-typed identifiers.
//!
//! Each kind carries a short prefix so IDs stay recognisable in logs and
//! resource URIs (`res_9f1c...`, `inv_04ab...`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::Error;

/// Macro to define a prefixed, UUID-backed ID newtype.
///
/// Generates: struct, `new()`, `as_str()`, `prefix()`, Default, Display,
/// FromStr (rejects empty input and foreign prefixes), AsRef<str>.
macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new() -> Self {
                Self(format!("{}_{}", $prefix, uuid::Uuid::new_v4().simple()))
            }

            pub const fn prefix() -> &'static str {
                $prefix
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let rest = s
                    .strip_prefix(concat!($prefix, "_"))
                    .filter(|rest| !rest.is_empty());
                match rest {
                    Some(_) => Ok(Self(s.to_string())),
                    None => Err(Error::validation(format!(
                        "'{}' is not a {} (expected {}_...)",
                        s,
                        stringify!($name),
                        $prefix
                    ))),
                }
            }
        }
    };
}

define_id!(InvocationId, "inv");
define_id!(ResourceId, "res");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ids_are_unique_and_prefixed() {
        let a = ResourceId::new();
        assert_ne!(a, ResourceId::new());
        assert!(a.as_str().starts_with("res_"));
        assert!(InvocationId::new().to_string().starts_with("inv_"));
    }

    #[test]
    fn test_parse_checks_prefix() {
        let id: ResourceId = "res_abc".parse().unwrap();
        assert_eq!(id.as_str(), "res_abc");
        assert!("inv_abc".parse::<ResourceId>().is_err());
        assert!("res_".parse::<ResourceId>().is_err());
        assert!("".parse::<InvocationId>().is_err());
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id: InvocationId = "inv_42".parse().unwrap();
        assert_eq!(serde_json::to_value(&id).unwrap(), serde_json::json!("inv_42"));
    }
}
