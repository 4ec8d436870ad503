//! Built-in management endpoints configured through `endpoints.*` properties.
//!
//! ```text
//! endpoints.enabled=true
//! endpoints.path=/internal
//! endpoints.tags=management
//! endpoints.health.class=io.micronaut.management.endpoint.health.HealthEndpoint
//! endpoints.health.tags=health
//! endpoints.health.security-requirements=[{"api_key": []}]
//! ```

use indexmap::IndexMap;
use serde::de::DeserializeOwned;

use crate::config::Properties;
use crate::context::Warnings;
use crate::merger::{merge_tags, union};
use crate::types::{Operation, SecurityRequirement, Server, Tag};

pub const ENDPOINTS_PREFIX: &str = "endpoints.";
pub const ENDPOINTS_ENABLED: &str = "endpoints.enabled";
pub const ENDPOINTS_PATH: &str = "endpoints.path";
pub const ENDPOINTS_TAGS: &str = "endpoints.tags";
pub const ENDPOINTS_SERVERS: &str = "endpoints.servers";
pub const ENDPOINTS_SECURITY_REQUIREMENTS: &str = "endpoints.security-requirements";

const RESERVED_KEYS: [&str; 5] = [
    ENDPOINTS_ENABLED,
    ENDPOINTS_PATH,
    ENDPOINTS_TAGS,
    ENDPOINTS_SERVERS,
    ENDPOINTS_SECURITY_REQUIREMENTS,
];

/// Settings of one named endpoint
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Endpoint {
    /// Class implementing the endpoint
    pub class_name: Option<String>,
    /// Route replacing the endpoint name
    pub path: Option<String>,
    pub tags: Vec<Tag>,
    pub servers: Vec<Server>,
    pub security_requirements: Vec<SecurityRequirement>,
}

/// All endpoint settings
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EndpointsConfiguration {
    pub enabled: bool,
    /// Base path of all endpoints
    pub path: String,
    /// Tags added to every endpoint operation
    pub tags: Vec<Tag>,
    pub servers: Vec<Server>,
    pub security_requirements: Vec<SecurityRequirement>,
    /// Per-endpoint settings in first-seen order
    pub endpoints: IndexMap<String, Endpoint>,
}

impl EndpointsConfiguration {
    /// Reads the configuration. Malformed JSON values are reported and skipped.
    pub fn from_properties(props: &Properties, warnings: &mut Warnings) -> Self {
        let enabled = props
            .get(ENDPOINTS_ENABLED)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));
        if !enabled {
            return Self::default();
        }

        let mut config = Self {
            enabled,
            path: props.get(ENDPOINTS_PATH).cloned().unwrap_or_default(),
            tags: props.get(ENDPOINTS_TAGS).map(|v| parse_tags(v)).unwrap_or_default(),
            servers: parse_json_list(props, ENDPOINTS_SERVERS, warnings),
            security_requirements: parse_json_list(props, ENDPOINTS_SECURITY_REQUIREMENTS, warnings),
            endpoints: IndexMap::new(),
        };

        for (key, value) in props {
            if RESERVED_KEYS.contains(&key.as_str()) {
                continue;
            }
            let Some(rest) = key.strip_prefix(ENDPOINTS_PREFIX) else {
                continue;
            };
            let Some((name, entry_type)) = rest.rsplit_once('.') else {
                continue;
            };
            if name.is_empty() || entry_type.is_empty() {
                continue;
            }

            match entry_type {
                "tags" => config.endpoint(name).tags = parse_tags(value),
                "class" => config.endpoint(name).class_name = Some(value.trim().to_string()),
                "path" => config.endpoint(name).path = Some(value.trim().to_string()),
                "servers" => {
                    if let Some(servers) = parse_json(key, value, warnings) {
                        config.endpoint(name).servers = servers;
                    }
                }
                "security-requirements" => {
                    if let Some(requirements) = parse_json(key, value, warnings) {
                        config.endpoint(name).security_requirements = requirements;
                    }
                }
                _ => {}
            }
        }

        config
    }

    fn endpoint(&mut self, name: &str) -> &mut Endpoint {
        self.endpoints.entry(name.to_string()).or_default()
    }

    /// Route of an endpoint below the base path, always starting with `/`
    pub fn route(&self, name: &str) -> String {
        let id = self
            .endpoints
            .get(name)
            .and_then(|e| e.path.as_deref())
            .unwrap_or(name);
        let base = self.path.trim_matches('/');
        let id = id.trim_start_matches('/');
        if base.is_empty() {
            format!("/{id}")
        } else {
            format!("/{base}/{id}")
        }
    }

    /// Finds the endpoint implemented by `class_name`
    pub fn find_by_class(&self, class_name: &str) -> Option<(&str, &Endpoint)> {
        self.endpoints
            .iter()
            .find(|(_, e)| e.class_name.as_deref() == Some(class_name))
            .map(|(name, e)| (name.as_str(), e))
    }

    /// Adds the global and per-endpoint tags, servers and security
    /// requirements to an endpoint operation
    pub fn apply(&self, name: &str, operation: &mut Operation) {
        let endpoint = self.endpoints.get(name);
        let tag_names = self
            .tags
            .iter()
            .chain(endpoint.iter().flat_map(|e| e.tags.iter()))
            .map(|t| t.name.clone())
            .collect();
        operation.tags = merge_tags(std::mem::take(&mut operation.tags), tag_names);

        let servers = self
            .servers
            .iter()
            .chain(endpoint.iter().flat_map(|e| e.servers.iter()))
            .cloned()
            .collect();
        operation.servers = union(std::mem::take(&mut operation.servers), servers);

        let security: Vec<SecurityRequirement> = self
            .security_requirements
            .iter()
            .chain(endpoint.iter().flat_map(|e| e.security_requirements.iter()))
            .cloned()
            .collect();
        if !security.is_empty() {
            let existing = operation.security.take().unwrap_or_default();
            operation.security = Some(union(existing, security));
        }
    }
}

fn parse_tags(value: &str) -> Vec<Tag> {
    value
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(Tag::new)
        .collect()
}

fn parse_json<T: DeserializeOwned>(key: &str, value: &str, warnings: &mut Warnings) -> Option<T> {
    match serde_json::from_str(value) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warnings.warn(format!("can't parse {key} value {value}: {e}"), None);
            None
        }
    }
}

fn parse_json_list<T: DeserializeOwned>(props: &Properties, key: &str, warnings: &mut Warnings) -> Vec<T> {
    props
        .get(key)
        .and_then(|value| parse_json(key, value, warnings))
        .unwrap_or_default()
}
