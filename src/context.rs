//! Run-scoped processing state.
//!
//! Everything that lives for one assembly run is owned by a
//! [`ProcessingContext`] and passed explicitly. Independent runs use separate
//! contexts or call [`ProcessingContext::reset`] between them.

use indexmap::{IndexMap, IndexSet};

use crate::config::OpenApiConfig;
use crate::extra_schema::ExtraSchemaRegistry;
use crate::group::{distribute_fragments, DocumentKey, EndpointFragment, GroupProperties, OpenApiInfo};
use crate::merger::{Merger, MergerConfig};
use crate::normalize::normalize_openapi;

/// A recovered problem, reported instead of failing the run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub message: String,
    /// Element the warning refers to, e.g. `com.example.PetController#list`
    pub location: Option<String>,
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.location {
            Some(location) => write!(f, "{} ({location})", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// Warning sink. Every warning is logged and kept.
#[derive(Debug, Clone, Default)]
pub struct Warnings {
    entries: Vec<Warning>,
}

impl Warnings {
    pub fn warn(&mut self, message: impl Into<String>, location: Option<&str>) {
        let warning = Warning {
            message: message.into(),
            location: location.map(str::to_string),
        };
        log::warn!("{warning}");
        self.entries.push(warning);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Warning> {
        self.entries.iter()
    }

    /// Moves all warnings out of `other`
    pub fn append(&mut self, other: &mut Warnings) {
        self.entries.append(&mut other.entries);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn into_vec(self) -> Vec<Warning> {
        self.entries
    }
}

/// State of one assembly run
#[derive(Debug, Default)]
pub struct ProcessingContext {
    pub config: OpenApiConfig,
    /// Groups declared in configuration or discovered on elements
    pub known_groups: IndexMap<String, GroupProperties>,
    /// API versions discovered on elements
    pub known_versions: IndexSet<String>,
    /// Documents per (group, version)
    pub documents: IndexMap<DocumentKey, OpenApiInfo>,
    pub extra_schemas: ExtraSchemaRegistry,
    pub warnings: Warnings,
}

impl ProcessingContext {
    pub fn new(config: OpenApiConfig) -> Self {
        let extra_schemas = ExtraSchemaRegistry::new(config.extra_schema_enabled);
        Self {
            config,
            extra_schemas,
            ..Default::default()
        }
    }

    /// Logs a warning and records it
    pub fn warn(&mut self, message: impl Into<String>, location: Option<&str>) {
        self.warnings.warn(message, location);
    }

    /// Registers a group, keeping the first definition of a name
    pub fn add_group(&mut self, group: GroupProperties) {
        self.known_groups.entry(group.name.clone()).or_insert(group);
    }

    pub fn add_version(&mut self, version: impl Into<String>) {
        self.known_versions.insert(version.into());
    }

    /// Builds one normalized document per (group, version) out of `fragments`.
    ///
    /// Extra schemas are added to every document after exclusions are
    /// applied. Without any fragment a single empty document is produced.
    pub fn assemble(&mut self, fragments: &[EndpointFragment]) {
        if self.config.versioning_enabled {
            for version in fragments.iter().filter_map(|f| f.version.clone()) {
                self.add_version(version);
            }
        }

        let merger = Merger::new(MergerConfig::from(&self.config));
        let mut documents = distribute_fragments(fragments, &self.known_groups, &self.config);
        if documents.is_empty() {
            documents.insert(
                DocumentKey::new(None, None),
                OpenApiInfo::new(merger.new_document()),
            );
        }

        self.extra_schemas.finish();
        let extra = self.extra_schemas.schemas();

        for info in documents.values_mut() {
            if !extra.is_empty() {
                let mut conflicts = Vec::new();
                merger.add_schemas(&mut info.open_api, extra.clone(), &mut conflicts);
                for conflict in conflicts {
                    self.warnings.warn(
                        format!("extra schema {} clashes with an existing definition", conflict.item),
                        None,
                    );
                }
            }
            normalize_openapi(&mut info.open_api, self.config.spec_version);
        }

        log::info!("assembled {} documents", documents.len());
        self.documents.extend(documents);
    }

    /// Clears all run-scoped state; the configuration is kept
    pub fn reset(&mut self) {
        self.known_groups.clear();
        self.known_versions.clear();
        self.documents.clear();
        self.extra_schemas.clean();
        self.warnings.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{HttpMethod, Operation, Schema};

    #[test]
    fn test_warnings_sink() {
        let mut warnings = Warnings::default();
        warnings.warn("bad default", Some("com.example.Pet#age"));
        warnings.warn("bad json", None);
        assert_eq!(warnings.len(), 2);
        let first = warnings.iter().next().unwrap();
        assert_eq!(first.to_string(), "bad default (com.example.Pet#age)");
    }

    #[test]
    fn test_reset_clears_run_state() {
        let mut ctx = ProcessingContext::new(OpenApiConfig::default());
        ctx.add_group(GroupProperties::new("admin"));
        ctx.add_version("v1");
        ctx.extra_schemas
            .add_schema("Pet", "com.example.Pet", Schema::object());
        ctx.warn("something", None);

        ctx.reset();

        assert!(ctx.known_groups.is_empty());
        assert!(ctx.known_versions.is_empty());
        assert!(ctx.documents.is_empty());
        assert!(ctx.extra_schemas.is_empty());
        assert!(ctx.warnings.is_empty());
        assert!(ctx.config.enabled);
    }

    #[test]
    fn test_first_group_definition_wins() {
        let mut ctx = ProcessingContext::default();
        let mut first = GroupProperties::new("admin");
        first.display_name = Some("Admin".to_string());
        ctx.add_group(first);
        ctx.add_group(GroupProperties::new("admin"));
        assert_eq!(
            ctx.known_groups["admin"].display_name.as_deref(),
            Some("Admin")
        );
    }

    #[test]
    fn test_assemble_versions_and_extra_schemas() {
        let mut ctx = ProcessingContext::new(OpenApiConfig::default());
        ctx.extra_schemas
            .add_schema("Audit", "com.example.Audit", Schema::object());

        let fragments = vec![
            EndpointFragment::new("/pets", HttpMethod::Get, Operation::default()).with_version("1"),
            EndpointFragment::new("/pets", HttpMethod::Post, Operation::default()).with_version("2"),
            EndpointFragment::new("/health", HttpMethod::Get, Operation::default()),
        ];
        ctx.assemble(&fragments);

        assert_eq!(ctx.known_versions.len(), 2);
        assert_eq!(ctx.documents.len(), 2);
        for info in ctx.documents.values() {
            let doc = &info.open_api;
            let paths = doc.paths.as_ref().unwrap();
            assert!(paths.get("/health").is_some());
            let schemas = doc.components.as_ref().unwrap().schemas.as_ref().unwrap();
            assert!(schemas.contains_key("Audit"));
        }
        let v1 = &ctx.documents[&DocumentKey::new(None, Some("1".to_string()))];
        let pets = v1.open_api.paths.as_ref().unwrap().get("/pets").unwrap();
        assert!(pets.get.is_some());
        assert!(pets.post.is_none());
    }

    #[test]
    fn test_assemble_without_fragments() {
        let mut ctx = ProcessingContext::new(OpenApiConfig::default());
        ctx.assemble(&[]);
        assert_eq!(ctx.documents.len(), 1);
        let info = &ctx.documents[&DocumentKey::new(None, None)];
        assert!(info.open_api.paths.is_none());
        assert!(info.open_api.components.is_none());
    }
}
