//! Normalization and deduplication of assembled documents.
//!
//! [`normalize_openapi`] imposes a deterministic order on paths and
//! components, collapses redundant `allOf` wrappers, removes empty containers
//! and duplicate list entries. Running it on its own output changes nothing.

use indexmap::IndexMap;

use crate::types::{
    AdditionalProperties, ApiResponse, Components, Content, OpenApi, Operation, Parameter,
    PathItem, RequestBody, Schema, SchemaKind,
};
use crate::version::SpecVersion;

const MAX_PASSES: usize = 8;

/// Normalizes a document in place.
///
/// Schema collapsing and duplicate removal can enable each other, so the
/// passes repeat until the document is stable.
pub fn normalize_openapi(doc: &mut OpenApi, version: SpecVersion) {
    for pass in 0..MAX_PASSES {
        let before = doc.clone();
        find_and_remove_duplicates(doc);
        normalize_pass(doc, version);
        if *doc == before {
            log::debug!("document stable after {} normalization passes", pass + 1);
            return;
        }
    }
    log::debug!("normalization stopped after {MAX_PASSES} passes");
}

fn normalize_pass(doc: &mut OpenApi, version: SpecVersion) {
    if let Some(paths) = doc.paths.as_mut() {
        paths.items.sort_keys();
        paths.extensions.sort_keys();
        for item in paths.items.values_mut() {
            normalize_path_item(item);
        }
    }

    if let Some(webhooks) = doc.webhooks.as_mut() {
        for item in webhooks.values_mut() {
            normalize_path_item(item);
        }
        if version.supports_path_items_and_webhooks() {
            webhooks.sort_keys();
        }
    }

    if let Some(components) = doc.components.as_mut() {
        if let Some(schemas) = components.schemas.as_mut() {
            normalize_schemas(schemas);
        }
        sort_component(components, version);
    }

    remove_empty_components(doc);
}

fn normalize_path_item(item: &mut PathItem) {
    for param in &mut item.parameters {
        normalize_parameter(param);
    }
    for method in crate::types::HttpMethod::ALL {
        if let Some(operation) = item.operation_mut(method).as_mut() {
            normalize_operation(operation);
        }
    }
}

/// Normalizes parameter schemas, request body content and response content
pub fn normalize_operation(operation: &mut Operation) {
    for param in &mut operation.parameters {
        normalize_parameter(param);
    }
    if let Some(RequestBody {
        content: Some(content),
        ..
    }) = operation.request_body.as_mut()
    {
        normalize_content(content);
    }
    for response in operation.responses.iter_mut().flat_map(|r| r.values_mut()) {
        normalize_response(response);
    }
}

fn normalize_parameter(param: &mut Parameter) {
    if let Some(schema) = param.schema.as_mut() {
        normalize_root_schema(schema);
    }
    if let Some(content) = param.content.as_mut() {
        normalize_content(content);
    }
}

fn normalize_response(response: &mut ApiResponse) {
    if let Some(content) = response.content.as_mut() {
        normalize_content(content);
    }
}

/// Normalizes media type schemas and drops examples without a value
pub fn normalize_content(content: &mut Content) {
    for media_type in content.values_mut() {
        if let Some(schema) = media_type.schema.as_mut() {
            normalize_root_schema(schema);
        }
        media_type.examples.retain(|_, example| example.is_some());
    }
}

/// Normalizes every schema of a component map and its properties.
///
/// Bare `{}` schemas at the top level and among the direct properties of a
/// component become `type: object`.
pub fn normalize_schemas(schemas: &mut IndexMap<String, Schema>) {
    for schema in schemas.values_mut() {
        normalize_root_schema(schema);
        for property in schema.properties.values_mut() {
            default_to_object(property);
        }
    }
}

fn normalize_root_schema(schema: &mut Schema) {
    normalize_nested(schema);
    default_to_object(schema);
}

fn default_to_object(schema: &mut Schema) {
    if schema.is_empty_simple() {
        schema.schema_type = Some("object".to_string());
        schema.kind = SchemaKind::Object;
    }
}

fn normalize_nested(schema: &mut Schema) {
    while let Some(replacement) = normalize_schema(schema) {
        *schema = replacement;
    }
    for property in schema.properties.values_mut() {
        normalize_nested(property);
    }
}

/// Simplifies the `allOf` composition of a schema.
///
/// Returns the schema that should replace `schema` entirely, or `None` when
/// `schema` stays (possibly modified in place).
///
/// A single `allOf` member replaces its wrapper, unchanged, when the wrapper
/// carries nothing else but a `type` the member agrees with and a `default`
/// equal to the member's. With several members, `$ref` members are moved ahead
/// of inline ones, inline members drop their `description` when the wrapper
/// has one, and a `default` repeated by an inline member is dropped from the
/// wrapper.
pub fn normalize_schema(schema: &mut Schema) -> Option<Schema> {
    match schema.all_of.len() {
        0 => None,
        1 => {
            normalize_nested(&mut schema.all_of[0]);
            let member = &schema.all_of[0];

            let mut rest = schema.clone();
            rest.all_of.clear();
            rest.schema_type = None;
            rest.default = None;
            let wrapper_empty = rest.is_empty();
            let default_matches = schema.default.is_none() || schema.default == member.default;
            let type_matches = schema.schema_type.is_none()
                || member.schema_type.is_none()
                || schema.schema_type == member.schema_type;

            if !(wrapper_empty && default_matches && type_matches) {
                return None;
            }

            log::debug!("collapsed single allOf wrapper");
            Some(schema.all_of.remove(0))
        }
        _ => {
            for member in &mut schema.all_of {
                normalize_nested(member);
            }
            let (refs, mut inline): (Vec<Schema>, Vec<Schema>) =
                schema.all_of.drain(..).partition(Schema::has_ref);
            for member in &mut inline {
                if has_text(&schema.description) && has_text(&member.description) {
                    member.description = None;
                }
                if schema.default.is_some() && member.default == schema.default {
                    schema.default = None;
                }
            }
            schema.all_of = refs;
            schema.all_of.extend(inline);
            None
        }
    }
}

fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.is_empty())
}

/// Sorts the component maps by key. Path items only exist from 3.1 on and are
/// left as they are for 3.0.
pub fn sort_component(components: &mut Components, version: SpecVersion) {
    fn sort<V>(map: &mut Option<IndexMap<String, V>>) {
        if let Some(map) = map.as_mut() {
            map.sort_keys();
        }
    }

    sort(&mut components.schemas);
    sort(&mut components.responses);
    sort(&mut components.parameters);
    sort(&mut components.examples);
    sort(&mut components.request_bodies);
    sort(&mut components.headers);
    sort(&mut components.security_schemes);
    sort(&mut components.links);
    sort(&mut components.callbacks);
    if version.supports_path_items_and_webhooks() {
        sort(&mut components.path_items);
    }
}

/// Drops empty component maps and webhooks, and the whole components object
/// once nothing is left in it.
pub fn remove_empty_components(doc: &mut OpenApi) {
    fn clear_empty<V>(map: &mut Option<IndexMap<String, V>>) {
        if map.as_ref().is_some_and(IndexMap::is_empty) {
            *map = None;
        }
    }

    clear_empty(&mut doc.webhooks);

    let Some(components) = doc.components.as_mut() else {
        return;
    };
    clear_empty(&mut components.schemas);
    clear_empty(&mut components.responses);
    clear_empty(&mut components.parameters);
    clear_empty(&mut components.examples);
    clear_empty(&mut components.request_bodies);
    clear_empty(&mut components.headers);
    clear_empty(&mut components.security_schemes);
    clear_empty(&mut components.links);
    clear_empty(&mut components.callbacks);
    clear_empty(&mut components.path_items);

    if *components == Components::default() {
        doc.components = None;
    }
}

/// Removes entries for which `same` holds against an earlier entry.
///
/// ```
/// use oas_assembler::normalize::remove_duplicates;
///
/// let mut tags = vec!["a", "a", "b", "a"];
/// remove_duplicates(&mut tags, |x, y| x == y);
/// assert_eq!(tags, vec!["a", "b"]);
/// ```
pub fn remove_duplicates<T>(items: &mut Vec<T>, same: impl Fn(&T, &T) -> bool) {
    let mut kept: Vec<T> = Vec::with_capacity(items.len());
    for item in items.drain(..) {
        if !kept.iter().any(|k| same(k, &item)) {
            kept.push(item);
        }
    }
    *items = kept;
}

fn same_parameter(a: &Parameter, b: &Parameter) -> bool {
    a.same_identity(b) || a == b
}

/// Removes duplicate list entries throughout the document
pub fn find_and_remove_duplicates(doc: &mut OpenApi) {
    remove_duplicates(&mut doc.tags, |a, b| a.name == b.name);
    remove_duplicates(&mut doc.servers, |a, b| a.url == b.url);
    if let Some(security) = doc.security.as_mut() {
        remove_duplicates(security, |a, b| a == b);
    }

    if let Some(paths) = doc.paths.as_mut() {
        for item in paths.items.values_mut() {
            dedup_path_item(item);
        }
    }
    if let Some(webhooks) = doc.webhooks.as_mut() {
        for item in webhooks.values_mut() {
            dedup_path_item(item);
        }
    }

    if let Some(schemas) = doc.components.as_mut().and_then(|c| c.schemas.as_mut()) {
        for schema in schemas.values_mut() {
            dedup_schema(schema);
        }
    }
}

fn dedup_path_item(item: &mut PathItem) {
    remove_duplicates(&mut item.parameters, same_parameter);
    remove_duplicates(&mut item.servers, |a, b| a.url == b.url);
    for param in &mut item.parameters {
        dedup_parameter(param);
    }
    for method in crate::types::HttpMethod::ALL {
        if let Some(operation) = item.operation_mut(method).as_mut() {
            dedup_operation(operation);
        }
    }
}

/// Removes duplicate tags, parameters, servers and security requirements of
/// an operation and duplicate entries in the schemas it contains
pub fn dedup_operation(operation: &mut Operation) {
    remove_duplicates(&mut operation.tags, |a, b| a == b);
    remove_duplicates(&mut operation.parameters, same_parameter);
    remove_duplicates(&mut operation.servers, |a, b| a.url == b.url);
    if let Some(security) = operation.security.as_mut() {
        remove_duplicates(security, |a, b| a == b);
    }

    for param in &mut operation.parameters {
        dedup_parameter(param);
    }
    if let Some(content) = operation
        .request_body
        .as_mut()
        .and_then(|b| b.content.as_mut())
    {
        dedup_content(content);
    }
    for response in operation.responses.iter_mut().flat_map(|r| r.values_mut()) {
        if let Some(content) = response.content.as_mut() {
            dedup_content(content);
        }
    }
}

fn dedup_parameter(param: &mut Parameter) {
    if let Some(schema) = param.schema.as_mut() {
        dedup_schema(schema);
    }
    if let Some(content) = param.content.as_mut() {
        dedup_content(content);
    }
}

fn dedup_content(content: &mut Content) {
    for media_type in content.values_mut() {
        if let Some(schema) = media_type.schema.as_mut() {
            dedup_schema(schema);
        }
    }
}

/// Removes duplicates from `required` and the composition lists of a schema
/// and everything nested in it
pub fn dedup_schema(schema: &mut Schema) {
    remove_duplicates(&mut schema.required, |a, b| a == b);
    remove_duplicates(&mut schema.prefix_items, |a, b| a == b);
    remove_duplicates(&mut schema.all_of, |a, b| a == b);
    remove_duplicates(&mut schema.any_of, |a, b| a == b);
    remove_duplicates(&mut schema.one_of, |a, b| a == b);

    let nested = schema
        .prefix_items
        .iter_mut()
        .chain(schema.all_of.iter_mut())
        .chain(schema.any_of.iter_mut())
        .chain(schema.one_of.iter_mut())
        .chain(schema.properties.values_mut())
        .chain(schema.items.as_deref_mut())
        .chain(schema.not.as_deref_mut());
    for child in nested {
        dedup_schema(child);
    }
    if let Some(AdditionalProperties::Schema(child)) = schema.additional_properties.as_mut() {
        dedup_schema(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MediaType, Paths, Tag};
    use serde_json::json;

    fn with_all_of(members: Vec<Schema>) -> Schema {
        let mut schema = Schema::composed();
        schema.all_of = members;
        schema
    }

    #[test]
    fn test_single_all_of_collapses() {
        let mut schema = with_all_of(vec![Schema::string()]);
        assert_eq!(normalize_schema(&mut schema), Some(Schema::string()));
    }

    #[test]
    fn test_type_mismatch_does_not_collapse() {
        let mut schema = with_all_of(vec![Schema::string()]);
        schema.schema_type = Some("integer".to_string());
        assert_eq!(normalize_schema(&mut schema), None);
        assert_eq!(schema.all_of, vec![Schema::string()]);
    }

    #[test]
    fn test_wrapper_with_description_does_not_collapse() {
        let mut schema = with_all_of(vec![Schema::reference("Pet")]);
        schema.description = Some("The pet".to_string());
        assert_eq!(normalize_schema(&mut schema), None);
    }

    #[test]
    fn test_default_not_repeated_by_member_blocks_collapse() {
        let mut schema: Schema = serde_json::from_value(json!({
            "default": "LOW",
            "allOf": [{"$ref": "#/components/schemas/Level"}]
        }))
        .unwrap();
        assert_eq!(normalize_schema(&mut schema), None);
        assert_eq!(schema.default, Some(json!("LOW")));
        assert_eq!(schema.all_of, vec![Schema::reference("Level")]);
    }

    #[test]
    fn test_collapse_returns_member_unchanged() {
        let mut level = Schema::reference("Level");
        level.default = Some(json!("LOW"));
        let mut schema = with_all_of(vec![level.clone()]);
        schema.schema_type = Some("string".to_string());
        schema.default = Some(json!("LOW"));
        assert_eq!(normalize_schema(&mut schema), Some(level));

        let mut typed = with_all_of(vec![Schema::reference("Level")]);
        typed.schema_type = Some("string".to_string());
        let collapsed = normalize_schema(&mut typed).unwrap();
        assert_eq!(collapsed, Schema::reference("Level"));
        assert_eq!(collapsed.schema_type, None);
    }

    #[test]
    fn test_multiple_members_prune_description_and_parent_default() {
        let mut schema: Schema = serde_json::from_value(json!({
            "default": 5,
            "description": "parent",
            "allOf": [
                {"type": "integer", "default": 5, "description": "child"},
                {"$ref": "#/components/schemas/A"}
            ]
        }))
        .unwrap();

        assert_eq!(normalize_schema(&mut schema), None);
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({
                "description": "parent",
                "allOf": [
                    {"$ref": "#/components/schemas/A"},
                    {"type": "integer", "default": 5}
                ]
            })
        );
    }

    #[test]
    fn test_multiple_members_refs_first() {
        let mut inline = Schema::object();
        inline.description = Some("Pet".to_string());
        let mut schema = with_all_of(vec![
            inline,
            Schema::reference("B"),
            Schema::string(),
            Schema::reference("A"),
        ]);
        schema.description = Some("Pet".to_string());

        assert_eq!(normalize_schema(&mut schema), None);
        assert_eq!(
            schema.all_of,
            vec![
                Schema::reference("B"),
                Schema::reference("A"),
                Schema::object(),
                Schema::string(),
            ]
        );
    }

    #[test]
    fn test_nested_property_collapse() {
        let mut pet = Schema::object();
        pet.properties
            .insert("owner".to_string(), with_all_of(vec![Schema::reference("Owner")]));
        let mut schemas = IndexMap::new();
        schemas.insert("Pet".to_string(), pet);

        normalize_schemas(&mut schemas);
        assert_eq!(schemas["Pet"].properties["owner"], Schema::reference("Owner"));
    }

    #[test]
    fn test_empty_component_properties_get_object_type() {
        let mut schemas: IndexMap<String, Schema> = serde_json::from_value(json!({
            "Pet": {
                "type": "object",
                "properties": {
                    "meta": {},
                    "tags": {"type": "object", "properties": {"extra": {}}}
                }
            }
        }))
        .unwrap();

        normalize_schemas(&mut schemas);
        let pet = serde_json::to_value(&schemas["Pet"]).unwrap();
        assert_eq!(pet["properties"]["meta"], json!({"type": "object"}));
        assert_eq!(pet["properties"]["tags"]["properties"]["extra"], json!({}));
    }

    #[test]
    fn test_empty_schema_gets_object_type() {
        let mut content = Content::new();
        content.insert("application/json".to_string(), MediaType::with_schema(Schema::default()));
        content["application/json"]
            .examples
            .insert("empty".to_string(), None);

        normalize_content(&mut content);
        let media = &content["application/json"];
        assert_eq!(media.schema.as_ref().unwrap().schema_type.as_deref(), Some("object"));
        assert!(media.examples.is_empty());
    }

    #[test]
    fn test_sort_component() {
        let mut components = Components::default();
        let schemas = components.schemas_mut();
        schemas.insert("Zebra".to_string(), Schema::object());
        schemas.insert("Apple".to_string(), Schema::object());
        let mut items = IndexMap::new();
        items.insert("z".to_string(), PathItem::default());
        items.insert("a".to_string(), PathItem::default());
        components.path_items = Some(items);

        sort_component(&mut components, SpecVersion::V30);
        let names: Vec<_> = components.schemas.as_ref().unwrap().keys().cloned().collect();
        assert_eq!(names, vec!["Apple", "Zebra"]);
        let items: Vec<_> = components.path_items.as_ref().unwrap().keys().cloned().collect();
        assert_eq!(items, vec!["z", "a"]);

        sort_component(&mut components, SpecVersion::V31);
        let items: Vec<_> = components.path_items.as_ref().unwrap().keys().cloned().collect();
        assert_eq!(items, vec!["a", "z"]);
    }

    #[test]
    fn test_remove_empty_components() {
        let mut doc = OpenApi::default();
        doc.components_mut().schemas = Some(IndexMap::new());
        doc.webhooks = Some(IndexMap::new());
        remove_empty_components(&mut doc);
        assert!(doc.components.is_none());
        assert!(doc.webhooks.is_none());

        let mut doc = OpenApi::default();
        doc.components_mut().schemas = Some(IndexMap::new());
        doc.components_mut()
            .extensions
            .insert("x-keep".to_string(), json!(true));
        remove_empty_components(&mut doc);
        let components = doc.components.unwrap();
        assert!(components.schemas.is_none());
        assert_eq!(components.extensions.len(), 1);
    }

    #[test]
    fn test_duplicate_tags_keep_first() {
        let mut doc = OpenApi::default();
        let mut first = Tag::new("a");
        first.description = Some("first".to_string());
        doc.tags = vec![first.clone(), Tag::new("a"), Tag::new("b")];
        find_and_remove_duplicates(&mut doc);
        assert_eq!(doc.tags, vec![first, Tag::new("b")]);
    }

    #[test]
    fn test_operation_dedup() {
        let mut operation = Operation {
            tags: vec!["b".to_string(), "a".to_string(), "b".to_string()],
            parameters: vec![
                Parameter::new("id", "path"),
                Parameter::new("id", "query"),
                Parameter::new("id", "path"),
            ],
            ..Default::default()
        };
        dedup_operation(&mut operation);
        assert_eq!(operation.tags, vec!["b", "a"]);
        assert_eq!(operation.parameters.len(), 2);
    }

    #[test]
    fn test_schema_dedup_recurses() {
        let mut inner = Schema::object();
        inner.required = vec!["id".to_string(), "id".to_string()];
        let mut schema = Schema::object();
        schema.one_of = vec![Schema::reference("A"), Schema::reference("A"), Schema::reference("B")];
        schema.properties.insert("inner".to_string(), inner);

        dedup_schema(&mut schema);
        assert_eq!(schema.one_of, vec![Schema::reference("A"), Schema::reference("B")]);
        assert_eq!(schema.properties["inner"].required, vec!["id"]);
    }

    #[test]
    fn test_dedup_treats_parsed_and_built_schemas_alike() {
        let parsed: Schema = serde_json::from_value(json!({"type": "string"})).unwrap();
        let mut schema = Schema::composed();
        schema.one_of = vec![Schema::string(), parsed, Schema::integer(None)];

        dedup_schema(&mut schema);
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({"oneOf": [{"type": "string"}, {"type": "integer"}]})
        );
    }

    #[test]
    fn test_normalize_openapi_sorts_paths_and_is_stable() {
        let mut paths = Paths::default();
        paths.items.insert("/zoo".to_string(), PathItem::default());
        paths.items.insert("/apple".to_string(), PathItem::default());
        let mut doc = OpenApi {
            paths: Some(paths),
            ..Default::default()
        };
        doc.components_mut()
            .schemas_mut()
            .insert("Dup".to_string(), with_all_of(vec![Schema::string(), Schema::string()]));

        normalize_openapi(&mut doc, SpecVersion::V30);
        let keys: Vec<_> = doc.paths.as_ref().unwrap().items.keys().cloned().collect();
        assert_eq!(keys, vec!["/apple", "/zoo"]);
        // duplicates removed first, then the single member collapsed
        assert_eq!(doc.components.as_ref().unwrap().schemas.as_ref().unwrap()["Dup"], Schema::string());

        let once = doc.clone();
        normalize_openapi(&mut doc, SpecVersion::V30);
        assert_eq!(doc, once);
    }
}
