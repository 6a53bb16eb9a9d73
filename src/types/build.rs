//! Build identity, captured once at compile time.
//!
//! `GEO_MCP_GIT_SHA`, `GEO_MCP_GIT_TAG` and `GEO_MCP_GIT_BRANCH` are read
//! from the build environment when present (CI sets them).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name, version and source revision of the running binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BuildInfo {
    pub name: String,
    pub version: String,
    pub revision: String,
    /// Release tag; omitted for untagged builds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    pub branch: String,
}

impl BuildInfo {
    /// Identity of this build.
    pub fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            revision: option_env!("GEO_MCP_GIT_SHA").unwrap_or("unknown").to_string(),
            tag: option_env!("GEO_MCP_GIT_TAG")
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            branch: option_env!("GEO_MCP_GIT_BRANCH").unwrap_or("unknown").to_string(),
        }
    }

    /// Value for the `User-Agent` header of every outbound request.
    ///
    /// Format: `name/version (branch, revision[, tag])`
    pub fn user_agent(&self) -> String {
        match &self.tag {
            Some(tag) => format!(
                "{}/{} ({}, {}, {})",
                self.name, self.version, self.branch, self.revision, tag
            ),
            None => format!(
                "{}/{} ({}, {})",
                self.name, self.version, self.branch, self.revision
            ),
        }
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(tag: Option<&str>) -> BuildInfo {
        BuildInfo {
            name: "geo-mcp".to_string(),
            version: "1.2.3".to_string(),
            revision: "abc123".to_string(),
            tag: tag.map(str::to_string),
            branch: "main".to_string(),
        }
    }

    #[test]
    fn test_user_agent_without_tag() {
        assert_eq!(sample(None).user_agent(), "geo-mcp/1.2.3 (main, abc123)");
    }

    #[test]
    fn test_user_agent_with_tag() {
        assert_eq!(
            sample(Some("v1.2.3")).user_agent(),
            "geo-mcp/1.2.3 (main, abc123, v1.2.3)"
        );
    }

    #[test]
    fn test_current_uses_package_metadata() {
        let info = BuildInfo::current();
        assert_eq!(info.name, env!("CARGO_PKG_NAME"));
        assert_eq!(info.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_untagged_build_matches_own_schema() {
        let value = serde_json::to_value(sample(None)).unwrap();
        assert!(value.get("tag").is_none());
        let schema = crate::schema::Schema::for_type::<BuildInfo>().unwrap();
        assert_eq!(schema.parse(&value).unwrap(), value);
    }
}
