//! OAS Assembler - OpenAPI document assembly core
//!
//! Turns per-endpoint OpenAPI fragments into complete, deterministic OpenAPI
//! documents.
//!
//! # Overview
//!
//! The assembler provides:
//! - URL template expansion (`/pets{/id}`, `{+path}`, `{?q}`) with context paths
//! - Annotation value conversion into OpenAPI model objects
//! - Merging of operations, parameters, responses and schemas
//! - Normalization: `allOf` collapsing, sorting and duplicate removal
//! - Per group and per API version document distribution
//! - Extra schema registration and protobuf-generated class filtering
//!
//! # Basic Usage
//!
//! Merging two fragments that share a route:
//!
//! ```
//! use oas_assembler::prelude::*;
//!
//! let list = Operation {
//!     operation_id: Some("listPets".to_string()),
//!     ..Default::default()
//! };
//! let find = Operation {
//!     operation_id: Some("findPet".to_string()),
//!     ..Default::default()
//! };
//!
//! let result = Merger::default().merge(vec![
//!     EndpointFragment::new("/pets", HttpMethod::Get, list),
//!     EndpointFragment::new("/pets/{id}", HttpMethod::Get, find),
//! ]);
//!
//! let paths = result.document.paths.unwrap();
//! assert_eq!(paths.len(), 2);
//! assert!(result.conflicts.is_empty());
//! ```
//!
//! # Feature Flags
//!
//! - `default`: YAML support
//! - `yaml`: YAML (de)serialization of documents

pub mod config;
pub mod context;
pub mod convert;
pub mod element;
pub mod endpoints;
pub mod errors;
pub mod extra_schema;
pub mod group;
pub mod merger;
pub mod normalize;
pub mod protobuf;
pub mod types;
pub mod url;
pub mod version;

// Re-exports for convenience
pub use errors::{Error, Result};
pub use version::{SpecVersion, OPENAPI_30_VERSION, OPENAPI_31_VERSION};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{OpenApiConfig, Properties};
    pub use crate::context::{ProcessingContext, Warning, Warnings};
    pub use crate::endpoints::EndpointsConfiguration;
    pub use crate::errors::{Error, Result};
    pub use crate::group::{DocumentKey, EndpointFragment, GroupProperties, OpenApiInfo};
    pub use crate::merger::{Conflict, ConflictType, MergeResult, Merger, MergerConfig};
    pub use crate::normalize::normalize_openapi;
    pub use crate::types::*;
    pub use crate::url::expand_template;
    pub use crate::version::*;
}
