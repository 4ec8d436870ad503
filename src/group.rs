//! Groups and API versions.
//!
//! One application can produce several documents: one per group (public,
//! admin, ...) and API version. Every endpoint fragment is routed to the
//! documents it belongs to and merged there.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::config::{OpenApiConfig, Properties, MICRONAUT_OPENAPI_GROUPS};
use crate::convert::is_true;
use crate::merger::{Merger, MergerConfig};
use crate::types::{HttpMethod, OpenApi, Operation, Pair};

/// Document key: (group name, API version); `None` means default group or unversioned
pub type DocumentKey = Pair<Option<String>, Option<String>>;

/// A package filter entry, `com.example` or `com.example.*`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageProperties {
    pub name: String,
    pub include_subpackages: bool,
}

impl PackageProperties {
    pub fn parse(package: &str) -> Self {
        let package = package.trim();
        let (name, include_subpackages) = match package.strip_suffix('*') {
            Some(base) => (base, true),
            None => (package, false),
        };
        Self {
            name: name.trim_end_matches('.').to_string(),
            include_subpackages,
        }
    }

    pub fn matches(&self, package: &str) -> bool {
        package == self.name
            || (self.include_subpackages
                && package.len() > self.name.len()
                && package.starts_with(&self.name)
                && package.as_bytes()[self.name.len()] == b'.')
    }
}

/// Settings of one group
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GroupProperties {
    pub name: String,
    pub display_name: Option<String>,
    pub file_name: Option<String>,
    pub packages: Option<Vec<PackageProperties>>,
    pub packages_exclude: Option<Vec<PackageProperties>>,
    pub primary: Option<bool>,
    pub common_exclude: Option<bool>,
}

impl GroupProperties {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Applies one `<prop>=<value>` setting. A setting already present is kept.
    pub fn set_property(&mut self, property: &str, value: &str) {
        fn packages(value: &str) -> Vec<PackageProperties> {
            value
                .split(',')
                .filter(|p| !p.trim().is_empty())
                .map(PackageProperties::parse)
                .collect()
        }

        match property.to_lowercase().as_str() {
            "display-name" | "displayname" => {
                self.display_name.get_or_insert_with(|| value.to_string());
            }
            "file-name" | "filename" => {
                self.file_name.get_or_insert_with(|| value.to_string());
            }
            "packages" => {
                self.packages.get_or_insert_with(|| packages(value));
            }
            "packages-exclude" | "packagesexclude" => {
                self.packages_exclude.get_or_insert_with(|| packages(value));
            }
            "primary" => {
                self.primary.get_or_insert(is_true(value));
            }
            "common-exclude" | "commonexclude" => {
                self.common_exclude.get_or_insert(is_true(value));
            }
            other => log::debug!("unknown property {other} of group {}", self.name),
        }
    }

    pub fn is_primary(&self) -> bool {
        self.primary.unwrap_or(false)
    }

    pub fn is_common_exclude(&self) -> bool {
        self.common_exclude.unwrap_or(false)
    }

    /// True when the group lists `package` and doesn't exclude it
    pub fn matches_package(&self, package: &str) -> bool {
        let included = self
            .packages
            .iter()
            .flatten()
            .any(|p| p.matches(package));
        let excluded = self
            .packages_exclude
            .iter()
            .flatten()
            .any(|p| p.matches(package));
        included && !excluded
    }
}

/// Reads all `micronaut.openapi.groups.<name>.<prop>` settings
pub fn groups_from_properties(props: &Properties) -> IndexMap<String, GroupProperties> {
    let prefix = format!("{MICRONAUT_OPENAPI_GROUPS}.");
    let mut groups: IndexMap<String, GroupProperties> = IndexMap::new();
    for (key, value) in props {
        let Some(rest) = key.strip_prefix(&prefix) else {
            continue;
        };
        let Some((group, property)) = rest.split_once('.') else {
            continue;
        };
        groups
            .entry(group.to_string())
            .or_insert_with(|| GroupProperties::new(group))
            .set_property(property, value);
    }
    groups
}

/// An operation contributed by one endpoint method
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointFragment {
    /// URI template, e.g. `/pets{/petId}`
    pub path: String,
    pub method: HttpMethod,
    pub operation: Operation,
    /// API version the endpoint is declared for
    pub version: Option<String>,
    /// Groups the endpoint is explicitly assigned to
    pub groups: Vec<String>,
    /// Groups the endpoint must not appear in
    pub excluded_groups: Vec<String>,
    /// Package of the owning class
    pub package: String,
    /// Source element, used in warnings and conflict reports
    pub location: Option<String>,
}

impl EndpointFragment {
    pub fn new(path: impl Into<String>, method: HttpMethod, operation: Operation) -> Self {
        Self {
            path: path.into(),
            method,
            operation,
            version: None,
            groups: Vec::new(),
            excluded_groups: Vec::new(),
            package: String::new(),
            location: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn in_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn excluding_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn in_package(mut self, package: impl Into<String>) -> Self {
        self.package = package.into();
        self
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

/// A document together with the group and version it was built for
#[derive(Debug, Clone, PartialEq)]
pub struct OpenApiInfo {
    pub version: Option<String>,
    pub group_name: Option<String>,
    pub group_title: Option<String>,
    pub file_name: Option<String>,
    pub open_api: OpenApi,
}

impl OpenApiInfo {
    pub fn new(open_api: OpenApi) -> Self {
        Self {
            version: None,
            group_name: None,
            group_title: None,
            file_name: None,
            open_api,
        }
    }
}

/// Groups a fragment is placed in; `None` is the default document.
///
/// Explicit groups (minus excluded ones) win. Otherwise groups whose packages
/// match the fragment's package are used. Otherwise the fragment is common and
/// goes to the default document and every group not marked common-exclude.
pub fn target_groups(
    fragment: &EndpointFragment,
    groups: &IndexMap<String, GroupProperties>,
) -> Vec<Option<String>> {
    let allowed = |name: &String| !fragment.excluded_groups.contains(name);

    let explicit: Vec<_> = fragment
        .groups
        .iter()
        .filter(|g| allowed(*g))
        .map(|g| Some(g.clone()))
        .collect();
    if !explicit.is_empty() {
        return explicit;
    }

    let by_package: Vec<_> = groups
        .values()
        .filter(|g| allowed(&g.name) && g.matches_package(&fragment.package))
        .map(|g| Some(g.name.clone()))
        .collect();
    if !by_package.is_empty() {
        return by_package;
    }

    let mut targets = vec![None];
    targets.extend(
        groups
            .values()
            .filter(|g| allowed(&g.name) && !g.is_common_exclude())
            .map(|g| Some(g.name.clone())),
    );
    targets
}

/// Distributes fragments over the (group, version) documents and merges them.
///
/// With versioning enabled, a fragment without a version lands in every
/// version declared by some fragment; with no versions at all it lands in the
/// unversioned document.
pub fn distribute_fragments(
    fragments: &[EndpointFragment],
    groups: &IndexMap<String, GroupProperties>,
    config: &OpenApiConfig,
) -> IndexMap<DocumentKey, OpenApiInfo> {
    let merger = Merger::new(MergerConfig::from(config));

    let known_versions: IndexSet<&str> = if config.versioning_enabled {
        fragments.iter().filter_map(|f| f.version.as_deref()).collect()
    } else {
        IndexSet::new()
    };

    let mut documents: IndexMap<DocumentKey, OpenApiInfo> = IndexMap::new();
    for fragment in fragments {
        let versions: Vec<Option<String>> = match fragment.version.as_deref() {
            Some(version) if config.versioning_enabled => vec![Some(version.to_string())],
            _ if known_versions.is_empty() => vec![None],
            _ => known_versions.iter().map(|v| Some(v.to_string())).collect(),
        };

        for group in target_groups(fragment, groups) {
            for version in &versions {
                let key = DocumentKey::new(group.clone(), version.clone());
                let info = documents.entry(key).or_insert_with(|| {
                    let properties = group.as_ref().and_then(|g| groups.get(g));
                    OpenApiInfo {
                        version: version.clone(),
                        group_name: group.clone(),
                        group_title: properties.and_then(|p| p.display_name.clone()),
                        file_name: properties.and_then(|p| p.file_name.clone()),
                        open_api: merger.new_document(),
                    }
                });
                merger.add_fragment(&mut info.open_api, fragment);
            }
        }
    }

    log::debug!("distributed {} fragments into {} documents", fragments.len(), documents.len());
    documents
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(pairs: &[(&str, &str)]) -> Properties {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn fragment(path: &str) -> EndpointFragment {
        EndpointFragment::new(path, HttpMethod::Get, Operation::default())
    }

    fn keys(documents: &IndexMap<DocumentKey, OpenApiInfo>) -> Vec<(Option<&str>, Option<&str>)> {
        documents
            .keys()
            .map(|k| (k.first.as_deref(), k.second.as_deref()))
            .collect()
    }

    #[test]
    fn test_package_properties() {
        let exact = PackageProperties::parse(" com.example ");
        assert!(!exact.include_subpackages);
        assert!(exact.matches("com.example"));
        assert!(!exact.matches("com.example.admin"));

        let wildcard = PackageProperties::parse("com.example.*");
        assert_eq!(wildcard.name, "com.example");
        assert!(wildcard.matches("com.example.admin"));
        assert!(!wildcard.matches("com.examples"));
    }

    #[test]
    fn test_groups_from_properties() {
        let groups = groups_from_properties(&props(&[
            ("micronaut.openapi.groups.admin.display-name", "Admin API"),
            ("micronaut.openapi.groups.admin.displayName", "ignored"),
            ("micronaut.openapi.groups.admin.packages", "com.example.admin.*, com.example.ops"),
            ("micronaut.openapi.groups.admin.common-exclude", "true"),
            ("micronaut.openapi.groups.public.primary", "true"),
            ("micronaut.openapi.groups", "nothing"),
            ("micronaut.openapi.enabled", "true"),
        ]));

        assert_eq!(groups.len(), 2);
        let admin = &groups["admin"];
        assert_eq!(admin.display_name.as_deref(), Some("Admin API"));
        assert_eq!(admin.packages.as_ref().unwrap().len(), 2);
        assert!(admin.is_common_exclude());
        assert!(admin.matches_package("com.example.admin.users"));
        assert!(groups["public"].is_primary());
    }

    #[test]
    fn test_target_groups() {
        let mut admin = GroupProperties::new("admin");
        admin.packages = Some(vec![PackageProperties::parse("com.example.admin")]);
        admin.common_exclude = Some(true);
        let public = GroupProperties::new("public");
        let groups: IndexMap<_, _> = [("admin".to_string(), admin), ("public".to_string(), public)]
            .into_iter()
            .collect();

        let explicit = fragment("/a").in_groups(["public", "internal"]).excluding_groups(["internal"]);
        assert_eq!(target_groups(&explicit, &groups), vec![Some("public".to_string())]);

        let by_package = fragment("/b").in_package("com.example.admin");
        assert_eq!(target_groups(&by_package, &groups), vec![Some("admin".to_string())]);

        let common = fragment("/c").in_package("com.example.pets");
        assert_eq!(target_groups(&common, &groups), vec![None, Some("public".to_string())]);
    }

    #[test]
    fn test_distribute_by_version() {
        let fragments = vec![
            fragment("/v1/pets").with_version("1"),
            fragment("/v2/pets").with_version("2"),
            fragment("/health"),
        ];
        let documents = distribute_fragments(&fragments, &IndexMap::new(), &OpenApiConfig::default());

        assert_eq!(keys(&documents), vec![(None, Some("1")), (None, Some("2"))]);
        let v1 = &documents[&DocumentKey::new(None, Some("1".to_string()))].open_api;
        let paths = v1.paths.as_ref().unwrap();
        assert!(paths.get("/v1/pets").is_some());
        assert!(paths.get("/health").is_some());
        assert!(paths.get("/v2/pets").is_none());
    }

    #[test]
    fn test_distribute_without_versioning() {
        let config = OpenApiConfig {
            versioning_enabled: false,
            ..Default::default()
        };
        let fragments = vec![fragment("/pets").with_version("1"), fragment("/health")];
        let documents = distribute_fragments(&fragments, &IndexMap::new(), &config);
        assert_eq!(keys(&documents), vec![(None, None)]);
        assert_eq!(documents[0].open_api.paths.as_ref().unwrap().len(), 2);
    }

    #[test]
    fn test_distribute_group_metadata() {
        let mut admin = GroupProperties::new("admin");
        admin.display_name = Some("Admin".to_string());
        admin.file_name = Some("admin-api".to_string());
        let groups: IndexMap<_, _> = [("admin".to_string(), admin)].into_iter().collect();

        let fragments = vec![fragment("/users").in_groups(["admin"])];
        let documents = distribute_fragments(&fragments, &groups, &OpenApiConfig::default());
        let info = &documents[0];
        assert_eq!(info.group_name.as_deref(), Some("admin"));
        assert_eq!(info.group_title.as_deref(), Some("Admin"));
        assert_eq!(info.file_name.as_deref(), Some("admin-api"));
        assert_eq!(info.open_api.openapi, "3.0.1");
    }
}
