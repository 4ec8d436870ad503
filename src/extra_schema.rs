//! Registry of explicitly requested "extra" schemas.
//!
//! Extra schemas are emitted into the document even when no endpoint
//! references them. Classes and whole packages can be excluded; exclusions are
//! applied once all classes were visited, in [`ExtraSchemaRegistry::finish`].

use indexmap::{IndexMap, IndexSet};

use crate::convert::Annotation;
use crate::element::{package_of, ClassInfo, ClassLookup};
use crate::types::Schema;

/// Collected extra schemas and their exclusions
#[derive(Debug, Clone, Default)]
pub struct ExtraSchemaRegistry {
    enabled: bool,
    schemas: IndexMap<String, Schema>,
    class_names_to_names: IndexMap<String, String>,
    excluded_class_names: IndexSet<String>,
    excluded_packages: IndexSet<String>,
    excluded_schemas: IndexSet<String>,
}

impl ExtraSchemaRegistry {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            ..Default::default()
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Registers a schema produced for `class_name` under `name`
    pub fn add_schema(&mut self, name: impl Into<String>, class_name: impl Into<String>, schema: Schema) {
        if !self.enabled {
            return;
        }
        let name = name.into();
        self.schemas.insert(name.clone(), schema);
        self.class_names_to_names.insert(class_name.into(), name);
    }

    pub fn exclude_class(&mut self, class_name: impl Into<String>) {
        self.excluded_class_names.insert(class_name.into());
    }

    /// Excludes a package; a trailing `.*` also excludes its subpackages
    pub fn exclude_package(&mut self, package: impl Into<String>) {
        self.excluded_packages.insert(package.into());
    }

    /// Applies an extra-schema annotation found on `owner`.
    ///
    /// An annotation without members registers the owner itself. Otherwise the
    /// listed classes and packages are registered and the exclusions recorded.
    /// `resolve` builds the schema name and definition for a class; returning
    /// `None` skips the class.
    pub fn process_annotation<F>(
        &mut self,
        annotation: &Annotation,
        owner: &ClassInfo,
        lookup: &dyn ClassLookup,
        mut resolve: F,
    ) where
        F: FnMut(&ClassInfo) -> Option<(String, Schema)>,
    {
        if !self.enabled {
            return;
        }

        let classes = annotation.strings("value");
        let exclude_classes = annotation.strings("excludeClasses");
        let exclude_class_names = annotation.strings("excludeClassNames");
        let packages = annotation.strings("packages");
        let exclude_packages = annotation.strings("excludePackages");

        if classes.is_empty()
            && exclude_classes.is_empty()
            && exclude_class_names.is_empty()
            && packages.is_empty()
            && exclude_packages.is_empty()
        {
            self.register_class(owner, &mut resolve);
            return;
        }

        for class_name in exclude_classes.into_iter().chain(exclude_class_names) {
            self.exclude_class(class_name);
        }
        for package in exclude_packages {
            self.exclude_package(package);
        }
        for package in packages {
            let (package, with_subpackages) = match package.strip_suffix(".*") {
                Some(base) => (base, true),
                None => (package, false),
            };
            for class in lookup.classes_in_package(package, with_subpackages) {
                self.register_class(class, &mut resolve);
            }
        }
        for class_name in classes {
            match lookup.find_class(class_name) {
                Some(class) => self.register_class(class, &mut resolve),
                None => log::debug!("extra schema class {class_name} not found"),
            }
        }
    }

    fn register_class<F>(&mut self, class: &ClassInfo, resolve: &mut F)
    where
        F: FnMut(&ClassInfo) -> Option<(String, Schema)>,
    {
        if let Some((name, schema)) = resolve(class) {
            self.add_schema(name, class.name.clone(), schema);
        }
    }

    /// Applies class and package exclusions. Safe to call more than once.
    pub fn finish(&mut self) {
        if !self.enabled {
            return;
        }

        for package in &self.excluded_packages {
            for class_name in self.class_names_to_names.keys() {
                if package_matches(package, package_of(class_name)) {
                    self.excluded_class_names.insert(class_name.clone());
                }
            }
        }

        for class_name in &self.excluded_class_names {
            if let Some(name) = self.class_names_to_names.get(class_name) {
                if self.schemas.shift_remove(name).is_some() {
                    log::debug!("excluded extra schema {name} ({class_name})");
                }
                self.excluded_schemas.insert(name.clone());
            }
        }
    }

    /// Remaining extra schemas sorted by name
    pub fn schemas(&self) -> IndexMap<String, Schema> {
        let mut schemas = self.schemas.clone();
        schemas.sort_keys();
        schemas
    }

    /// Names removed by exclusions
    pub fn excluded_schemas(&self) -> impl Iterator<Item = &String> {
        self.excluded_schemas.iter()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Forgets all registrations and exclusions
    pub fn clean(&mut self) {
        self.schemas.clear();
        self.class_names_to_names.clear();
        self.excluded_class_names.clear();
        self.excluded_packages.clear();
        self.excluded_schemas.clear();
    }
}

/// `com.a` matches only `com.a`; `com.a.*` matches `com.a` and its subpackages
pub fn package_matches(pattern: &str, package: &str) -> bool {
    match pattern.strip_suffix(".*") {
        Some(base) => package == base || package.starts_with(&format!("{base}.")),
        None => package == pattern,
    }
}
