//! OpenAPI specification version handling.

use serde::{Deserialize, Serialize};

/// OpenAPI 3.0 document version string
pub const OPENAPI_30_VERSION: &str = "3.0.1";

/// OpenAPI 3.1 document version string
pub const OPENAPI_31_VERSION: &str = "3.1.0";

/// Target OpenAPI specification version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SpecVersion {
    /// OpenAPI 3.0.x
    #[default]
    #[serde(rename = "3.0.1")]
    V30,
    /// OpenAPI 3.1.x
    #[serde(rename = "3.1.0")]
    V31,
}

impl SpecVersion {
    /// Returns the version string written into the `openapi` field
    pub fn as_str(&self) -> &'static str {
        match self {
            SpecVersion::V30 => OPENAPI_30_VERSION,
            SpecVersion::V31 => OPENAPI_31_VERSION,
        }
    }

    /// Returns true for OpenAPI 3.1
    pub fn is_openapi_31(&self) -> bool {
        matches!(self, SpecVersion::V31)
    }

    /// `components.pathItems` and `webhooks` only exist from 3.1 onwards
    pub fn supports_path_items_and_webhooks(&self) -> bool {
        self.is_openapi_31()
    }

    /// Detects the version from an `openapi` field value.
    ///
    /// # Examples
    ///
    /// ```
    /// use oas_assembler::version::SpecVersion;
    ///
    /// assert_eq!(SpecVersion::parse("3.1.0"), Some(SpecVersion::V31));
    /// assert_eq!(SpecVersion::parse("3.0.3"), Some(SpecVersion::V30));
    /// assert_eq!(SpecVersion::parse("2.0"), None);
    /// ```
    pub fn parse(version: &str) -> Option<Self> {
        let mut parts = version.split('.');
        let major = parts.next()?.parse::<u32>().ok()?;
        let minor = parts.next()?.parse::<u32>().ok()?;
        match (major, minor) {
            (3, 0) => Some(SpecVersion::V30),
            (3, 1) => Some(SpecVersion::V31),
            _ => None,
        }
    }
}

impl std::fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_version() {
        assert_eq!(SpecVersion::default(), SpecVersion::V30);
        assert_eq!(SpecVersion::default().as_str(), "3.0.1");
    }

    #[test]
    fn test_path_items_support() {
        assert!(!SpecVersion::V30.supports_path_items_and_webhooks());
        assert!(SpecVersion::V31.supports_path_items_and_webhooks());
    }

    #[test]
    fn test_parse() {
        assert_eq!(SpecVersion::parse("3.1.1"), Some(SpecVersion::V31));
        assert_eq!(SpecVersion::parse("3"), None);
        assert_eq!(SpecVersion::parse("x.y"), None);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&SpecVersion::V31).unwrap();
        assert_eq!(json, "\"3.1.0\"");
    }
}
