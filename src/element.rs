//! Host-neutral description of visited program elements.
//!
//! The assembler never inspects source code itself. A front end describes the
//! classes it visits with these types and hands them over through
//! [`ClassLookup`].

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Annotation marking the accessor that serializes an enum
pub const JSON_VALUE_ANNOTATION: &str = "com.fasterxml.jackson.annotation.JsonValue";

/// Reference to a type as it appears in a signature
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TypeRef {
    /// Fully qualified name, or the primitive keyword (`int`, `byte`, ...)
    pub name: String,
    #[serde(default)]
    pub is_array: bool,
    #[serde(default)]
    pub is_enum: bool,
}

impl TypeRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn array_of(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_array: true,
            ..Default::default()
        }
    }

    pub fn enum_type(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_enum: true,
            ..Default::default()
        }
    }
}

/// Member kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MemberKind {
    Method,
    Field,
}

/// A method or field of a class
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInfo {
    pub name: String,
    pub kind: MemberKind,
    /// Return type for methods, declared type for fields
    pub return_type: TypeRef,
    #[serde(default)]
    pub annotations: Vec<String>,
    #[serde(default)]
    pub is_static: bool,
}

impl MemberInfo {
    pub fn method(name: impl Into<String>, return_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Method,
            return_type,
            annotations: Vec::new(),
            is_static: false,
        }
    }

    pub fn field(name: impl Into<String>, field_type: TypeRef) -> Self {
        Self {
            kind: MemberKind::Field,
            ..Self::method(name, field_type)
        }
    }

    /// Adds an annotation by fully qualified name
    pub fn annotated(mut self, annotation: impl Into<String>) -> Self {
        self.annotations.push(annotation.into());
        self
    }

    /// Matches either the fully qualified or the simple annotation name
    pub fn has_annotation(&self, annotation: &str) -> bool {
        let simple = simple_name(annotation);
        self.annotations
            .iter()
            .any(|a| a == annotation || a == simple || simple_name(a) == annotation)
    }
}

/// A bean property and its accessor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub name: String,
    pub property_type: TypeRef,
    /// Whether the property type is a collection or other iterable
    #[serde(default)]
    pub is_iterable: bool,
    #[serde(default)]
    pub read_method: Option<MemberInfo>,
}

impl PropertyInfo {
    /// Creates a property read through a getter returning `property_type`
    pub fn with_getter(name: impl Into<String>, getter: impl Into<String>, property_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            read_method: Some(MemberInfo::method(getter, property_type.clone())),
            property_type,
            is_iterable: false,
        }
    }

    pub fn iterable(mut self) -> Self {
        self.is_iterable = true;
        self
    }
}

/// A visited class, interface, record or enum
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClassInfo {
    /// Fully qualified name
    pub name: String,
    #[serde(default)]
    pub is_enum: bool,
    #[serde(default)]
    pub is_record: bool,
    /// `type` declared by a schema annotation on the class, if any
    #[serde(default)]
    pub schema_type: Option<String>,
    /// `format` declared by a schema annotation on the class, if any
    #[serde(default)]
    pub schema_format: Option<String>,
    #[serde(default)]
    pub members: Vec<MemberInfo>,
    /// Fully qualified names of all super classes and interfaces
    #[serde(default)]
    pub super_types: Vec<String>,
}

impl ClassInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Package part of the qualified name, empty for the default package
    pub fn package(&self) -> &str {
        package_of(&self.name)
    }

    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }

    pub fn methods(&self) -> impl Iterator<Item = &MemberInfo> {
        self.members
            .iter()
            .filter(|m| m.kind == MemberKind::Method)
    }

    pub fn find_method(&self, name: &str) -> Option<&MemberInfo> {
        self.methods().find(|m| m.name == name)
    }

    pub fn is_assignable_to(&self, type_name: &str) -> bool {
        self.name == type_name || self.super_types.iter().any(|s| s == type_name)
    }
}

/// Text after the last `.`
pub fn simple_name(qualified: &str) -> &str {
    qualified.rsplit('.').next().unwrap_or(qualified)
}

/// Text before the last `.`
pub fn package_of(qualified: &str) -> &str {
    qualified.rfind('.').map(|i| &qualified[..i]).unwrap_or("")
}

/// Resolves class names to their descriptions
pub trait ClassLookup {
    fn find_class(&self, name: &str) -> Option<&ClassInfo>;

    /// Classes declared in `package`, optionally including its subpackages
    fn classes_in_package(&self, package: &str, with_subpackages: bool) -> Vec<&ClassInfo>;
}

/// Map-backed [`ClassLookup`]
#[derive(Debug, Clone, Default)]
pub struct ClassIndex {
    classes: IndexMap<String, ClassInfo>,
}

impl ClassIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, class: ClassInfo) {
        self.classes.insert(class.name.clone(), class);
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl FromIterator<ClassInfo> for ClassIndex {
    fn from_iter<I: IntoIterator<Item = ClassInfo>>(iter: I) -> Self {
        let mut index = ClassIndex::new();
        for class in iter {
            index.insert(class);
        }
        index
    }
}

impl ClassLookup for ClassIndex {
    fn find_class(&self, name: &str) -> Option<&ClassInfo> {
        self.classes.get(name)
    }

    fn classes_in_package(&self, package: &str, with_subpackages: bool) -> Vec<&ClassInfo> {
        self.classes
            .values()
            .filter(|c| {
                let own = c.package();
                own == package
                    || (with_subpackages
                        && own.len() > package.len()
                        && own.starts_with(package)
                        && own.as_bytes()[package.len()] == b'.')
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        let class = ClassInfo::new("com.example.pets.Pet");
        assert_eq!(class.package(), "com.example.pets");
        assert_eq!(class.simple_name(), "Pet");
        assert_eq!(package_of("Pet"), "");
    }

    #[test]
    fn test_annotation_match() {
        let member = MemberInfo::method("getCode", TypeRef::new("int"))
            .annotated(JSON_VALUE_ANNOTATION);
        assert!(member.has_annotation(JSON_VALUE_ANNOTATION));
        assert!(member.has_annotation("JsonValue"));
        assert!(!member.has_annotation("JsonIgnore"));
    }

    #[test]
    fn test_class_index() {
        let index: ClassIndex = vec![ClassInfo::new("a.B"), ClassInfo::new("a.C")]
            .into_iter()
            .collect();
        assert_eq!(index.len(), 2);
        assert!(index.find_class("a.C").is_some());
        assert!(index.find_class("a.D").is_none());
    }

    #[test]
    fn test_classes_in_package() {
        let index: ClassIndex = vec![
            ClassInfo::new("com.a.One"),
            ClassInfo::new("com.a.b.Two"),
            ClassInfo::new("com.ab.Three"),
        ]
        .into_iter()
        .collect();
        assert_eq!(index.classes_in_package("com.a", false).len(), 1);
        let names: Vec<_> = index
            .classes_in_package("com.a", true)
            .into_iter()
            .map(|c| c.simple_name())
            .collect();
        assert_eq!(names, vec!["One", "Two"]);
    }
}
