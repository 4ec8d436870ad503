//! Assembly of endpoint fragments into OpenAPI documents

pub mod operation;
pub mod schema;

pub use operation::*;
pub use schema::*;

use indexmap::IndexMap;

use crate::config::OpenApiConfig;
use crate::context::Warnings;
use crate::group::EndpointFragment;
use crate::normalize::normalize_openapi;
use crate::types::{HttpMethod, Info, OpenApi, Schema, Server};
use crate::url::expand_template;
use crate::version::SpecVersion;

/// Builds documents out of endpoint fragments
#[derive(Debug, Clone, Default)]
pub struct Merger {
    config: MergerConfig,
}

/// Merger configuration
#[derive(Debug, Clone)]
pub struct MergerConfig {
    /// Context path prefixed to every expanded route
    pub context_path: String,
    /// Target OpenAPI version
    pub spec_version: SpecVersion,
    /// Info object of new documents
    pub info: Info,
    /// Servers of new documents
    pub servers: Vec<Server>,
    /// Whether merged documents are normalized before they are returned
    pub normalize: bool,
}

impl Default for MergerConfig {
    fn default() -> Self {
        Self {
            context_path: String::new(),
            spec_version: SpecVersion::V30,
            info: Info::default(),
            servers: Vec::new(),
            normalize: true,
        }
    }
}

impl From<&OpenApiConfig> for MergerConfig {
    fn from(config: &OpenApiConfig) -> Self {
        Self {
            context_path: config.context_path.clone(),
            spec_version: config.spec_version,
            ..Default::default()
        }
    }
}

/// Result of merging fragments into one document
#[derive(Debug, Clone)]
pub struct MergeResult {
    /// The merged document
    pub document: OpenApi,
    /// Places where two fragments declared the same thing
    pub conflicts: Vec<Conflict>,
    /// Non-fatal issues
    pub warnings: Warnings,
}

/// Two fragments contributing to the same item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub conflict_type: ConflictType,
    /// `GET /pets` for operations, the schema name for components
    pub item: String,
    /// Source locations of the contributing fragments, where known
    pub locations: Vec<String>,
    /// How the conflict was resolved
    pub resolution: String,
}

/// Type of conflict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictType {
    /// Same path and verb
    Operation,
    /// Same component schema name with a different definition
    Component,
}

impl Merger {
    pub fn new(config: MergerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MergerConfig {
        &self.config
    }

    /// Creates an empty document carrying the configured version, info and servers
    pub fn new_document(&self) -> OpenApi {
        OpenApi {
            openapi: self.config.spec_version.as_str().to_string(),
            info: self.config.info.clone(),
            servers: self.config.servers.clone(),
            ..Default::default()
        }
    }

    /// Merges fragments into a new document
    pub fn merge<I>(&self, fragments: I) -> MergeResult
    where
        I: IntoIterator<Item = EndpointFragment>,
    {
        let mut result = MergeResult {
            document: self.new_document(),
            conflicts: Vec::new(),
            warnings: Warnings::default(),
        };

        // Track where each (path, verb) came from for conflict reports
        let mut sources: IndexMap<(String, HttpMethod), Vec<String>> = IndexMap::new();

        for fragment in fragments {
            let paths = expand_template(&fragment.path, &self.config.context_path);
            self.check_operation_ids(&result.document, &fragment, &paths, &mut result.warnings);

            let merged = self.add_fragment(&mut result.document, &fragment);

            for path in paths {
                let entry = sources.entry((path.clone(), fragment.method)).or_default();
                if merged.contains(&path) {
                    let mut locations = entry.clone();
                    locations.extend(fragment.location.clone());
                    result.conflicts.push(Conflict {
                        conflict_type: ConflictType::Operation,
                        item: format!("{} {path}", fragment.method),
                        locations,
                        resolution: "Merged operations".to_string(),
                    });
                }
                entry.extend(fragment.location.clone());
            }
        }

        if self.config.normalize {
            normalize_openapi(&mut result.document, self.config.spec_version);
        }

        log::debug!(
            "merged {} paths with {} conflicts",
            result.document.paths.as_ref().map_or(0, |p| p.len()),
            result.conflicts.len()
        );

        result
    }

    /// Places a fragment's operation at every route its template expands to.
    ///
    /// Returns the routes where an operation for the same verb already existed
    /// and was merged.
    pub fn add_fragment(&self, document: &mut OpenApi, fragment: &EndpointFragment) -> Vec<String> {
        let mut merged = Vec::new();
        for path in expand_template(&fragment.path, &self.config.context_path) {
            let path_item = document.paths_mut().items.entry(path.clone()).or_default();
            let slot = path_item.operation_mut(fragment.method);
            if slot.is_some() {
                merged.push(path);
            }
            *slot = merge_operation(slot.take(), Some(fragment.operation.clone()));
        }
        merged
    }

    fn check_operation_ids(
        &self,
        document: &OpenApi,
        fragment: &EndpointFragment,
        paths: &[String],
        warnings: &mut Warnings,
    ) {
        let Some(new_id) = fragment.operation.operation_id.as_deref() else {
            return;
        };
        let Some(doc_paths) = &document.paths else {
            return;
        };
        for path in paths {
            let existing = doc_paths
                .get(path)
                .and_then(|item| item.operation(fragment.method))
                .and_then(|op| op.operation_id.as_deref());
            if let Some(existing) = existing.filter(|id| *id != new_id) {
                warnings.warn(
                    format!(
                        "operationId {new_id} of {} {path} is ignored, {existing} was declared first",
                        fragment.method
                    ),
                    fragment.location.as_deref(),
                );
            }
        }
    }

    /// Adds component schemas, keeping the first definition of a name
    pub fn add_schemas(
        &self,
        document: &mut OpenApi,
        schemas: IndexMap<String, Schema>,
        conflicts: &mut Vec<Conflict>,
    ) {
        let target = document.components_mut().schemas_mut();
        for (name, schema) in schemas {
            match target.get(&name) {
                Some(existing) if *existing != schema => conflicts.push(Conflict {
                    conflict_type: ConflictType::Component,
                    item: name,
                    locations: Vec::new(),
                    resolution: "Kept first definition".to_string(),
                }),
                Some(_) => {}
                None => {
                    target.insert(name, schema);
                }
            }
        }
    }
}

/// Copies an additional, externally written document into `to`.
///
/// Tags, servers and security requirements are appended, paths, component
/// schemas and security schemes replace entries of the same name, and the
/// external docs and extensions of `from` win.
pub fn merge_additional_document(to: &mut OpenApi, from: OpenApi) {
    to.tags.extend(from.tags);
    to.servers.extend(from.servers);
    if let Some(security) = from.security {
        to.security.get_or_insert_with(Vec::new).extend(security);
    }
    if let Some(paths) = from.paths {
        let target = to.paths_mut();
        target.items.extend(paths.items);
        target.extensions.extend(paths.extensions);
    }
    if let Some(components) = from.components {
        if let Some(schemas) = components.schemas.filter(|s| !s.is_empty()) {
            to.components_mut().schemas_mut().extend(schemas);
        }
        if let Some(schemes) = components.security_schemes.filter(|s| !s.is_empty()) {
            to.components_mut()
                .security_schemes
                .get_or_insert_with(IndexMap::new)
                .extend(schemes);
        }
    }
    if from.external_docs.is_some() {
        to.external_docs = from.external_docs;
    }
    to.extensions.extend(from.extensions);
}
