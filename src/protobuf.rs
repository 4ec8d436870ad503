//! Adaptation of protobuf-generated classes.
//!
//! Generated messages expose many accessors that are not message fields
//! (builders, byte views, counts, enum ordinals). They are filtered out before
//! the class is described as an ordinary schema.

use crate::element::{package_of, ClassInfo, ClassLookup, PropertyInfo};
use crate::types::Schema;

const PROTOBUF_PACKAGE: &str = "com.google.protobuf";
const BYTE_STRING: &str = "com.google.protobuf.ByteString";
const OR_BUILDER: &str = "OrBuilder";

const MESSAGE_OR_BUILDER: &str = "com.google.protobuf.MessageOrBuilder";
const PROTOCOL_MESSAGE_ENUM: &str = "com.google.protobuf.ProtocolMessageEnum";

const MESSAGE_CLASSES: [&str; 3] = [
    "com.google.protobuf.GeneratedMessageV3",
    "com.google.protobuf.GeneratedMessage",
    "com.google.protobuf.GeneratedMessageLite",
];

const INTERNAL_PROPERTIES: [&str; 8] = [
    "initialized",
    "defaultInstanceForType",
    "initializationErrorString",
    "descriptorForType",
    "allFields",
    "unknownFields",
    "serializedSize",
    "parserForType",
];

/// Generated message or enum (implements `MessageOrBuilder` or `ProtocolMessageEnum`)
pub fn is_protobuf_generated(class: &ClassInfo) -> bool {
    class.is_assignable_to(MESSAGE_OR_BUILDER)
        || class.is_assignable_to(PROTOCOL_MESSAGE_ENUM)
        || is_protobuf_message_class(class)
}

/// Concrete generated message class
pub fn is_protobuf_message_class(class: &ClassInfo) -> bool {
    MESSAGE_CLASSES.iter().any(|c| class.is_assignable_to(c))
}

/// Type from the protobuf runtime itself
pub fn is_protobuf_type(type_name: &str) -> bool {
    package_of(type_name).starts_with(PROTOBUF_PACKAGE)
}

/// Drops accessors of generated classes that don't correspond to message fields
/// and renames repeated fields from `fooList` to `foo`.
///
/// Classes that are not protobuf-generated are returned unchanged.
pub fn filter_protobuf_properties(
    class: &ClassInfo,
    properties: Vec<PropertyInfo>,
    lookup: &dyn ClassLookup,
) -> Vec<PropertyInfo> {
    if !is_protobuf_generated(class) {
        return properties;
    }

    let keep: Vec<bool> = properties
        .iter()
        .map(|prop| !is_generated_accessor(class, prop, &properties, lookup))
        .collect();

    properties
        .into_iter()
        .zip(keep)
        .filter_map(|(prop, keep)| keep.then_some(prop))
        .map(|mut prop| {
            prop.name = normalize_property_name(&prop.name, class, prop.is_iterable);
            prop
        })
        .collect()
}

fn is_generated_accessor(
    class: &ClassInfo,
    prop: &PropertyInfo,
    all: &[PropertyInfo],
    lookup: &dyn ClassLookup,
) -> bool {
    if INTERNAL_PROPERTIES.contains(&prop.name.as_str()) {
        return true;
    }
    let Some(read) = &prop.read_method else {
        return false;
    };
    let method = read.name.as_str();
    let return_type = &read.return_type;

    if method.ends_with("OrBuilderList")
        || (method.ends_with("Bytes") && return_type.name == BYTE_STRING)
    {
        return true;
    }

    // map fields are also exposed as `getXxxMap`
    if return_type.name == "java.util.Map" && method.ends_with("Map") {
        return true;
    }

    // enum fields are also exposed as their ordinal, `getXxxValue`
    if let Some(base) = method.strip_suffix("Value") {
        if class.find_method(base).is_some_and(|m| m.return_type.is_enum) {
            return true;
        }
    }

    // repeated fields are also exposed as `getXxxCount`
    if let Some(base) = method.strip_suffix("Count") {
        if class.find_method(base).is_some() {
            return true;
        }
    }

    if let Some(base) = prop.name.strip_suffix(OR_BUILDER) {
        let returns_generated = lookup
            .find_class(&return_type.name)
            .is_some_and(is_protobuf_generated);
        if returns_generated && all.iter().any(|p| p.name == base) {
            return true;
        }
    }

    false
}

/// Schema for protobuf runtime types.
///
/// Wrapper types (`Int32Value` and friends) become nullable primitives.
/// Well-known types map onto their JSON representation. Anything else from
/// the runtime yields `None`.
pub fn protobuf_type_schema(type_name: &str) -> Option<Schema> {
    if !is_protobuf_type(type_name) {
        return None;
    }
    let nullable = |mut schema: Schema| {
        schema.nullable = Some(true);
        schema
    };
    let schema = match type_name {
        BYTE_STRING => Schema::typed("string", Some("byte")),
        "com.google.protobuf.BytesValueOrBuilder" => nullable(Schema::typed("string", Some("byte"))),
        "com.google.protobuf.DoubleValueOrBuilder" => nullable(Schema::number(Some("double"))),
        "com.google.protobuf.FloatValueOrBuilder" => nullable(Schema::number(Some("float"))),
        "com.google.protobuf.BoolValueOrBuilder" => nullable(Schema::boolean()),
        "com.google.protobuf.StringValueOrBuilder" => nullable(Schema::string()),
        "com.google.protobuf.Int32ValueOrBuilder" | "com.google.protobuf.UInt32ValueOrBuilder" => {
            nullable(Schema::integer(Some("int32")))
        }
        "com.google.protobuf.Int64ValueOrBuilder" | "com.google.protobuf.UInt64ValueOrBuilder" => {
            Schema::integer(Some("int64"))
        }
        "com.google.protobuf.Timestamp" | "com.google.protobuf.TimestampOrBuilder" => {
            Schema::typed("string", Some("date-time"))
        }
        "com.google.protobuf.Duration" | "com.google.protobuf.DurationOrBuilder" => Schema::string(),
        "com.google.protobuf.Struct"
        | "com.google.protobuf.StructOrBuilder"
        | "com.google.protobuf.Value"
        | "com.google.protobuf.ValueOrBuilder"
        | "com.google.protobuf.Any"
        | "com.google.protobuf.AnyOrBuilder"
        | "com.google.protobuf.Empty"
        | "com.google.protobuf.EmptyOrBuilder" => Schema::object(),
        _ => return None,
    };
    Some(schema)
}

/// Strips the `List` suffix that generated classes add to repeated fields
pub fn normalize_property_name(property_name: &str, class: &ClassInfo, is_iterable: bool) -> String {
    if !is_protobuf_generated(class) || !is_iterable {
        return property_name.to_string();
    }
    match property_name.rfind("List") {
        Some(index) if index > 0 => property_name[..index].to_string(),
        _ => property_name.to_string(),
    }
}

/// `FooOrBuilder` names the same schema as `Foo`
pub fn normalize_protobuf_class_name(class_name: &str) -> &str {
    match class_name.find(OR_BUILDER) {
        Some(index) => &class_name[..index],
        None => class_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ClassIndex, MemberInfo, TypeRef};

    fn message(name: &str) -> ClassInfo {
        let mut class = ClassInfo::new(name);
        class.super_types = vec![
            "com.google.protobuf.GeneratedMessageV3".to_string(),
            MESSAGE_OR_BUILDER.to_string(),
        ];
        class
    }

    #[test]
    fn test_detection() {
        let class = message("com.example.proto.Pet");
        assert!(is_protobuf_generated(&class));
        assert!(is_protobuf_message_class(&class));
        assert!(!is_protobuf_generated(&ClassInfo::new("com.example.Pet")));
        assert!(is_protobuf_type("com.google.protobuf.Int32Value"));
        assert!(!is_protobuf_type("com.example.Int32Value"));
    }

    #[test]
    fn test_filter_properties() {
        let mut pet = message("com.example.proto.Pet");
        pet.members = vec![
            MemberInfo::method("getStatus", TypeRef::enum_type("com.example.proto.Status")),
            MemberInfo::method("getStatusValue", TypeRef::new("int")),
            MemberInfo::method("getTagsList", TypeRef::new("java.util.List")),
            MemberInfo::method("getTags", TypeRef::new("java.lang.String")),
            MemberInfo::method("getTagsCount", TypeRef::new("int")),
        ];
        let owner = message("com.example.proto.Owner");
        let index: ClassIndex = vec![pet.clone(), owner].into_iter().collect();

        let props = vec![
            PropertyInfo::with_getter("name", "getName", TypeRef::new("java.lang.String")),
            PropertyInfo::with_getter("nameBytes", "getNameBytes", TypeRef::new(BYTE_STRING)),
            PropertyInfo::with_getter("status", "getStatus", TypeRef::enum_type("com.example.proto.Status")),
            PropertyInfo::with_getter("statusValue", "getStatusValue", TypeRef::new("int")),
            PropertyInfo::with_getter("tagsList", "getTagsList", TypeRef::new("java.util.List")).iterable(),
            PropertyInfo::with_getter("tagsCount", "getTagsCount", TypeRef::new("int")),
            PropertyInfo::with_getter("labelsMap", "getLabelsMap", TypeRef::new("java.util.Map")),
            PropertyInfo::with_getter("owner", "getOwner", TypeRef::new("com.example.proto.Owner")),
            PropertyInfo::with_getter("ownerOrBuilder", "getOwnerOrBuilder", TypeRef::new("com.example.proto.Owner")),
            PropertyInfo::with_getter("itemsOrBuilderList", "getItemsOrBuilderList", TypeRef::new("java.util.List")),
            PropertyInfo::with_getter("unknownFields", "getUnknownFields", TypeRef::new("com.google.protobuf.UnknownFieldSet")),
        ];

        let kept: Vec<String> = filter_protobuf_properties(&pet, props, &index)
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(kept, vec!["name", "status", "tags", "owner"]);
    }

    #[test]
    fn test_plain_class_untouched() {
        let class = ClassInfo::new("com.example.Pet");
        let props = vec![PropertyInfo::with_getter("unknownFields", "getUnknownFields", TypeRef::new("int"))];
        let kept = filter_protobuf_properties(&class, props.clone(), &ClassIndex::new());
        assert_eq!(kept, props);
    }

    #[test]
    fn test_type_schemas() {
        let schema = protobuf_type_schema("com.google.protobuf.Int32ValueOrBuilder").unwrap();
        assert_eq!(schema.schema_type.as_deref(), Some("integer"));
        assert_eq!(schema.format.as_deref(), Some("int32"));
        assert_eq!(schema.nullable, Some(true));

        let schema = protobuf_type_schema(BYTE_STRING).unwrap();
        assert_eq!(schema.format.as_deref(), Some("byte"));
        assert_eq!(schema.nullable, None);

        let schema = protobuf_type_schema("com.google.protobuf.Timestamp").unwrap();
        assert_eq!(schema.format.as_deref(), Some("date-time"));
        let schema = protobuf_type_schema("com.google.protobuf.Any").unwrap();
        assert_eq!(schema.schema_type.as_deref(), Some("object"));

        assert!(protobuf_type_schema("com.google.protobuf.Api").is_none());
        assert!(protobuf_type_schema("java.lang.String").is_none());
    }

    #[test]
    fn test_name_normalization() {
        let class = message("com.example.proto.Pet");
        assert_eq!(normalize_property_name("tagsList", &class, true), "tags");
        assert_eq!(normalize_property_name("tagsList", &class, false), "tagsList");
        assert_eq!(normalize_property_name("List", &class, true), "List");
        assert_eq!(
            normalize_property_name("tagsList", &ClassInfo::new("a.B"), true),
            "tagsList"
        );
        assert_eq!(
            normalize_protobuf_class_name("com.example.proto.PetOrBuilder"),
            "com.example.proto.Pet"
        );
        assert_eq!(normalize_protobuf_class_name("com.example.Pet"), "com.example.Pet");
    }
}
