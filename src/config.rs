//! Assembler configuration read from a flat property map.

use indexmap::IndexMap;

use crate::convert::is_true;
use crate::errors::{Error, Result};
use crate::url::normalize_context_path;
use crate::version::SpecVersion;

/// Flat string-keyed property map
pub type Properties = IndexMap<String, String>;

pub const MICRONAUT_OPENAPI_ENABLED: &str = "micronaut.openapi.enabled";
pub const MICRONAUT_OPENAPI_31_ENABLED: &str = "micronaut.openapi.openapi31.enabled";
pub const MICRONAUT_OPENAPI_CONTEXT_SERVER_PATH: &str = "micronaut.openapi.server.context.path";
pub const MICRONAUT_SERVER_CONTEXT_PATH: &str = "micronaut.server.context-path";
pub const MICRONAUT_OPENAPI_SCHEMA_EXTRA_ENABLED: &str = "micronaut.openapi.schema.extra.enabled";
pub const MICRONAUT_OPENAPI_GENERATOR_EXTENSIONS: &str =
    "micronaut.openapi.generator.extensions.enabled";
pub const MICRONAUT_OPENAPI_VERSIONING_ENABLED: &str = "micronaut.openapi.versioning.enabled";
pub const MICRONAUT_CONFIG_FILE_LOCATIONS: &str = "micronaut.openapi.config.file.locations";
pub const MICRONAUT_OPENAPI_JSON_FORMAT: &str = "micronaut.openapi.json.format";
pub const MICRONAUT_OPENAPI_PROPERTY_NAMING_STRATEGY: &str =
    "micronaut.openapi.property.naming.strategy";
/// Prefix of per-group settings, `micronaut.openapi.groups.<name>.<prop>`
pub const MICRONAUT_OPENAPI_GROUPS: &str = "micronaut.openapi.groups";

/// Where additional configuration files are loaded from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConfigLocation {
    /// `classpath:<path>`
    Classpath(String),
    /// `file:<path>`
    File(String),
    /// `project:<path>`, relative to the project directory
    Project(String),
}

impl ConfigLocation {
    /// Parses a location, rejecting unknown schemes.
    ///
    /// ```
    /// use oas_assembler::config::ConfigLocation;
    ///
    /// assert!(ConfigLocation::parse("classpath:/").is_ok());
    /// assert!(ConfigLocation::parse("http://example.com").is_err());
    /// ```
    pub fn parse(location: &str) -> Result<Self> {
        let location = location.trim();
        if let Some(path) = location.strip_prefix("classpath:") {
            Ok(ConfigLocation::Classpath(path.to_string()))
        } else if let Some(path) = location.strip_prefix("file:") {
            Ok(ConfigLocation::File(path.to_string()))
        } else if let Some(path) = location.strip_prefix("project:") {
            Ok(ConfigLocation::Project(path.to_string()))
        } else {
            Err(Error::unsupported_config_location(location))
        }
    }

    /// File system path for file and project locations
    pub fn resolve(&self, project_dir: &str) -> Option<String> {
        match self {
            ConfigLocation::Classpath(_) => None,
            ConfigLocation::File(path) => Some(path.clone()),
            ConfigLocation::Project(path) => {
                let dir = project_dir.trim_end_matches('/');
                let path = path.trim_start_matches('/');
                Some(format!("{dir}/{path}"))
            }
        }
    }
}

/// Assembler settings
#[derive(Debug, Clone, PartialEq)]
pub struct OpenApiConfig {
    /// Master switch
    pub enabled: bool,
    /// Target OpenAPI version
    pub spec_version: SpecVersion,
    /// Normalized server context path prefixed to every route
    pub context_path: String,
    /// Whether explicitly registered extra schemas are collected
    pub extra_schema_enabled: bool,
    /// Whether generator hint extensions are emitted
    pub generator_extensions_enabled: bool,
    /// Whether API versions split documents
    pub versioning_enabled: bool,
    /// Additional configuration sources
    pub config_file_locations: Vec<ConfigLocation>,
    /// Emit JSON instead of YAML
    pub json_format: bool,
    /// Property naming strategy name, if configured
    pub property_naming_strategy: Option<String>,
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            spec_version: SpecVersion::V30,
            context_path: String::new(),
            extra_schema_enabled: true,
            generator_extensions_enabled: true,
            versioning_enabled: true,
            config_file_locations: Vec::new(),
            json_format: false,
            property_naming_strategy: None,
        }
    }
}

impl OpenApiConfig {
    /// Builds the configuration from a flat property map.
    ///
    /// Fails only on an unsupported config location, which is a setup error.
    pub fn from_properties(props: &Properties) -> Result<Self> {
        let defaults = OpenApiConfig::default();

        let spec_version = if get_boolean_property(props, MICRONAUT_OPENAPI_31_ENABLED, false) {
            SpecVersion::V31
        } else {
            SpecVersion::V30
        };

        let context_path = props
            .get(MICRONAUT_OPENAPI_CONTEXT_SERVER_PATH)
            .or_else(|| props.get(MICRONAUT_SERVER_CONTEXT_PATH))
            .map(|p| normalize_context_path(p))
            .unwrap_or_default();

        let config_file_locations = match props.get(MICRONAUT_CONFIG_FILE_LOCATIONS) {
            Some(raw) => raw
                .split(',')
                .filter(|l| !l.trim().is_empty())
                .map(ConfigLocation::parse)
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        Ok(Self {
            enabled: get_boolean_property(props, MICRONAUT_OPENAPI_ENABLED, defaults.enabled),
            spec_version,
            context_path,
            extra_schema_enabled: get_boolean_property(
                props,
                MICRONAUT_OPENAPI_SCHEMA_EXTRA_ENABLED,
                defaults.extra_schema_enabled,
            ),
            generator_extensions_enabled: get_boolean_property(
                props,
                MICRONAUT_OPENAPI_GENERATOR_EXTENSIONS,
                defaults.generator_extensions_enabled,
            ),
            versioning_enabled: get_boolean_property(
                props,
                MICRONAUT_OPENAPI_VERSIONING_ENABLED,
                defaults.versioning_enabled,
            ),
            config_file_locations,
            json_format: get_boolean_property(props, MICRONAUT_OPENAPI_JSON_FORMAT, defaults.json_format),
            property_naming_strategy: props
                .get(MICRONAUT_OPENAPI_PROPERTY_NAMING_STRATEGY)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
        })
    }
}

/// Reads a boolean property; a present value is true unless it equals `false`
pub fn get_boolean_property(props: &Properties, key: &str, default: bool) -> bool {
    match props.get(key) {
        Some(value) if !value.trim().is_empty() => is_true(value),
        _ => default,
    }
}

/// Splits a comma separated property into trimmed, non-empty items
pub fn get_list_property(props: &Properties, key: &str) -> Vec<String> {
    props
        .get(key)
        .map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
