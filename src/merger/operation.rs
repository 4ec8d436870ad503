//! Merging of operations and the objects they contain.
//!
//! All merges are left-biased: on a scalar tie the first argument wins. Keyed
//! maps are merged per key, then the remaining keys of the right side are
//! appended. List fields that behave like sets are unioned.

use indexmap::IndexMap;

use super::schema::merge_schema_opt;
use crate::types::{
    ApiResponse, Callback, Content, Example, Extensions, Header, HttpMethod, Link, MediaType,
    Operation, Parameter, PathItem, RequestBody,
};

/// Combines two optional values, merging only when both are present
pub(crate) fn merge_opt<T>(a: Option<T>, b: Option<T>, merge: impl FnOnce(T, T) -> T) -> Option<T> {
    match (a, b) {
        (Some(a), Some(b)) => Some(merge(a, b)),
        (a, b) => a.or(b),
    }
}

fn first_non_empty(a: Option<String>, b: Option<String>) -> Option<String> {
    a.filter(|s| !s.is_empty()).or(b)
}

/// Merges `b` into `a` key by key
pub(crate) fn merge_map<V>(
    mut a: IndexMap<String, V>,
    b: IndexMap<String, V>,
    merge: impl Fn(V, V) -> V,
) -> IndexMap<String, V> {
    for (key, value) in b {
        match a.shift_remove_full(&key) {
            Some((index, _, existing)) => {
                a.shift_insert(index, key, merge(existing, value));
            }
            None => {
                a.insert(key, value);
            }
        }
    }
    a
}

fn keep_first<V>(a: V, _b: V) -> V {
    a
}

/// Appends the items of `b` that `a` does not already contain
pub(crate) fn union<T: PartialEq>(mut a: Vec<T>, b: Vec<T>) -> Vec<T> {
    for item in b {
        if !a.contains(&item) {
            a.push(item);
        }
    }
    a
}

/// Union of two tag lists, sorted lexicographically
pub fn merge_tags(a: Vec<String>, b: Vec<String>) -> Vec<String> {
    let mut tags = a;
    tags.extend(b);
    tags.sort();
    tags.dedup();
    tags
}

/// Merges extension maps. Values of `a` win over values of `b`.
pub fn merge_extensions(a: Extensions, b: Extensions) -> Extensions {
    let mut merged = b;
    for (key, value) in a {
        merged.insert(key, value);
    }
    merged
}

/// Merges two optional operations
pub fn merge_operation(a: Option<Operation>, b: Option<Operation>) -> Option<Operation> {
    let (a, b) = match (a, b) {
        (Some(a), Some(b)) => (a, b),
        (a, b) => return a.or(b),
    };
    if a == b {
        return Some(a);
    }

    Some(Operation {
        tags: merge_tags(a.tags, b.tags),
        summary: first_non_empty(a.summary, b.summary),
        description: first_non_empty(a.description, b.description),
        external_docs: a.external_docs.or(b.external_docs),
        operation_id: first_non_empty(a.operation_id, b.operation_id),
        parameters: merge_parameters(a.parameters, b.parameters),
        request_body: merge_request_body(a.request_body, b.request_body),
        responses: merge_opt(a.responses, b.responses, merge_responses),
        callbacks: merge_map(a.callbacks, b.callbacks, merge_callback),
        deprecated: a.deprecated.or(b.deprecated),
        security: merge_opt(a.security, b.security, union),
        servers: union(a.servers, b.servers),
        extensions: merge_extensions(a.extensions, b.extensions),
    })
}

/// Merges two parameter lists, matching entries by `(name, in)`
pub fn merge_parameters(a: Vec<Parameter>, b: Vec<Parameter>) -> Vec<Parameter> {
    let mut merged = a;
    for param in b {
        match merged.iter().position(|p| p.same_identity(&param)) {
            Some(index) => {
                let existing = std::mem::take(&mut merged[index]);
                merged[index] = merge_parameter(existing, param);
            }
            None if merged.contains(&param) => {}
            None => merged.push(param),
        }
    }
    merged
}

pub fn merge_parameter(a: Parameter, b: Parameter) -> Parameter {
    if a == b {
        return a;
    }
    Parameter {
        name: first_non_empty(a.name, b.name),
        location: first_non_empty(a.location, b.location),
        description: first_non_empty(a.description, b.description),
        required: a.required.or(b.required),
        deprecated: a.deprecated.or(b.deprecated),
        allow_empty_value: a.allow_empty_value.or(b.allow_empty_value),
        style: first_non_empty(a.style, b.style),
        explode: a.explode.or(b.explode),
        allow_reserved: a.allow_reserved.or(b.allow_reserved),
        schema: merge_schema_opt(a.schema, b.schema),
        example: a.example.or(b.example),
        examples: merge_map(a.examples, b.examples, keep_first::<Example>),
        content: merge_content(a.content, b.content),
        reference: first_non_empty(a.reference, b.reference),
        extensions: merge_extensions(a.extensions, b.extensions),
    }
}

/// Merges two optional request bodies
pub fn merge_request_body(a: Option<RequestBody>, b: Option<RequestBody>) -> Option<RequestBody> {
    let (a, b) = match (a, b) {
        (Some(a), Some(b)) => (a, b),
        (a, b) => return a.or(b),
    };
    if a == b {
        return Some(a);
    }
    Some(RequestBody {
        description: first_non_empty(a.description, b.description),
        content: merge_content(a.content, b.content),
        required: a.required.or(b.required),
        reference: first_non_empty(a.reference, b.reference),
        extensions: merge_extensions(a.extensions, b.extensions),
    })
}

/// Merges two optional responses.
///
/// An absent `a` yields `b`. An absent `b` yields `None` even when `a` is
/// present: the right side explicitly declares that no response exists.
pub fn merge_api_response(a: Option<ApiResponse>, b: Option<ApiResponse>) -> Option<ApiResponse> {
    match (a, b) {
        (None, b) => b,
        (Some(_), None) => None,
        (Some(a), Some(b)) => Some(merge_responses_entry(a, b)),
    }
}

fn merge_responses_entry(a: ApiResponse, b: ApiResponse) -> ApiResponse {
    if a == b {
        return a;
    }
    ApiResponse {
        description: first_non_empty(a.description, b.description),
        headers: merge_map(a.headers, b.headers, merge_header),
        content: merge_content(a.content, b.content),
        links: merge_map(a.links, b.links, merge_link),
        reference: first_non_empty(a.reference, b.reference),
        extensions: merge_extensions(a.extensions, b.extensions),
    }
}

/// Merges response maps keyed by status code
pub fn merge_responses(
    a: IndexMap<String, ApiResponse>,
    b: IndexMap<String, ApiResponse>,
) -> IndexMap<String, ApiResponse> {
    merge_map(a, b, merge_responses_entry)
}

/// Merges two optional content maps, with the same absent-side rule as
/// [`merge_api_response`]. Responses, request bodies, parameters and headers
/// merge their `content` this way.
pub fn merge_content(a: Option<Content>, b: Option<Content>) -> Option<Content> {
    match (a, b) {
        (None, b) => b,
        (Some(_), None) => None,
        (Some(a), Some(b)) => Some(merge_content_maps(a, b)),
    }
}

fn merge_content_maps(a: Content, b: Content) -> Content {
    merge_map(a, b, merge_media_type)
}

pub fn merge_media_type(a: MediaType, b: MediaType) -> MediaType {
    if a == b {
        return a;
    }
    MediaType {
        schema: merge_schema_opt(a.schema, b.schema),
        example: a.example.or(b.example),
        examples: merge_map(a.examples, b.examples, |x, y| x.or(y)),
        encoding: merge_map(a.encoding, b.encoding, keep_first),
        extensions: merge_extensions(a.extensions, b.extensions),
    }
}

pub fn merge_header(a: Header, b: Header) -> Header {
    if a == b {
        return a;
    }
    Header {
        description: first_non_empty(a.description, b.description),
        required: a.required.or(b.required),
        deprecated: a.deprecated.or(b.deprecated),
        style: first_non_empty(a.style, b.style),
        explode: a.explode.or(b.explode),
        schema: merge_schema_opt(a.schema, b.schema),
        example: a.example.or(b.example),
        examples: merge_map(a.examples, b.examples, keep_first),
        content: merge_content(a.content, b.content),
        reference: first_non_empty(a.reference, b.reference),
        extensions: merge_extensions(a.extensions, b.extensions),
    }
}

pub fn merge_link(a: Link, b: Link) -> Link {
    if a == b {
        return a;
    }
    Link {
        operation_ref: first_non_empty(a.operation_ref, b.operation_ref),
        operation_id: first_non_empty(a.operation_id, b.operation_id),
        parameters: merge_map(a.parameters, b.parameters, keep_first),
        request_body: a.request_body.or(b.request_body),
        headers: merge_map(a.headers, b.headers, merge_header),
        description: first_non_empty(a.description, b.description),
        server: a.server.or(b.server),
        reference: first_non_empty(a.reference, b.reference),
        extensions: merge_extensions(a.extensions, b.extensions),
    }
}

fn merge_callback(a: Callback, b: Callback) -> Callback {
    merge_map(a, b, merge_path_item)
}

/// Merges every operation slot and the path-level fields of two path items
pub fn merge_path_item(a: PathItem, b: PathItem) -> PathItem {
    if a == b {
        return a;
    }
    let mut merged = PathItem {
        reference: first_non_empty(a.reference.clone(), b.reference.clone()),
        summary: first_non_empty(a.summary.clone(), b.summary.clone()),
        description: first_non_empty(a.description.clone(), b.description.clone()),
        servers: union(a.servers.clone(), b.servers.clone()),
        parameters: merge_parameters(a.parameters.clone(), b.parameters.clone()),
        extensions: merge_extensions(a.extensions.clone(), b.extensions.clone()),
        ..Default::default()
    };
    let (mut a, mut b) = (a, b);
    for method in HttpMethod::ALL {
        *merged.operation_mut(method) =
            merge_operation(a.operation_mut(method).take(), b.operation_mut(method).take());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Schema;
    use serde_json::json;

    fn op(summary: &str) -> Operation {
        Operation {
            summary: Some(summary.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_merge_operation_absent_sides() {
        assert_eq!(merge_operation(None, Some(op("b"))), Some(op("b")));
        assert_eq!(merge_operation(Some(op("a")), None), Some(op("a")));
        assert_eq!(merge_operation(None, None), None);
    }

    #[test]
    fn test_merge_operation_left_bias_and_tags() {
        let mut a = op("from a");
        a.tags = vec!["pets".to_string(), "zoo".to_string()];
        let mut b = op("from b");
        b.description = Some("only in b".to_string());
        b.tags = vec!["animals".to_string(), "pets".to_string()];

        let merged = merge_operation(Some(a), Some(b)).unwrap();
        assert_eq!(merged.summary.as_deref(), Some("from a"));
        assert_eq!(merged.description.as_deref(), Some("only in b"));
        assert_eq!(merged.tags, vec!["animals", "pets", "zoo"]);
    }

    #[test]
    fn test_empty_string_does_not_win() {
        let mut a = op("");
        a.operation_id = Some(String::new());
        let mut b = op("real");
        b.operation_id = Some("listPets".to_string());
        let merged = merge_operation(Some(a), Some(b)).unwrap();
        assert_eq!(merged.summary.as_deref(), Some("real"));
        assert_eq!(merged.operation_id.as_deref(), Some("listPets"));
    }

    #[test]
    fn test_parameters_match_by_name_and_location() {
        let mut id_path = Parameter::new("id", "path");
        id_path.description = Some("pet id".to_string());
        let mut id_path_b = Parameter::new("id", "path");
        id_path_b.required = Some(true);
        let id_query = Parameter::new("id", "query");

        let merged = merge_parameters(vec![id_path], vec![id_path_b, id_query.clone()]);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].description.as_deref(), Some("pet id"));
        assert_eq!(merged[0].required, Some(true));
        assert_eq!(merged[1], id_query);
    }

    #[test]
    fn test_parameter_schema_conflict_becomes_one_of() {
        let mut a = Parameter::new("limit", "query");
        a.schema = Some(Schema::integer(Some("int32")));
        let mut b = Parameter::new("limit", "query");
        b.schema = Some(Schema::string());
        let merged = merge_parameter(a, b);
        assert_eq!(merged.schema.unwrap().one_of.len(), 2);
    }

    #[test]
    fn test_responses_merge_per_code() {
        let mut a = IndexMap::new();
        a.insert("200".to_string(), ApiResponse::new("OK"));
        let mut b = IndexMap::new();
        let mut not_found = ApiResponse::new("missing");
        not_found.extensions.insert("x-retry".to_string(), json!(false));
        b.insert("404".to_string(), not_found);
        b.insert("200".to_string(), ApiResponse::new("ignored"));

        let merged = merge_responses(a, b);
        let codes: Vec<_> = merged.keys().cloned().collect();
        assert_eq!(codes, vec!["200", "404"]);
        assert_eq!(merged["200"].description.as_deref(), Some("OK"));
    }

    #[test]
    fn test_api_response_absent_sides_are_asymmetric() {
        let response = ApiResponse::new("OK");
        assert_eq!(merge_api_response(None, Some(response.clone())), Some(response.clone()));
        assert_eq!(merge_api_response(Some(response), None), None);
    }

    #[test]
    fn test_content_absent_sides_are_asymmetric() {
        let mut content = Content::new();
        content.insert("application/json".to_string(), MediaType::with_schema(Schema::string()));
        assert_eq!(merge_content(None, Some(content.clone())), Some(content.clone()));
        assert_eq!(merge_content(Some(content), None), None);
    }

    #[test]
    fn test_operation_content_follows_right_side() {
        let with_body = |content: Option<Content>| {
            let mut response = ApiResponse::new("OK");
            response.content = content.clone();
            Operation {
                request_body: Some(RequestBody {
                    content,
                    ..Default::default()
                }),
                responses: Some([("200".to_string(), response)].into_iter().collect()),
                ..Default::default()
            }
        };
        let mut content = Content::new();
        content.insert("application/json".to_string(), MediaType::with_schema(Schema::reference("Pet")));

        let dropped = merge_operation(Some(with_body(Some(content.clone()))), Some(with_body(None))).unwrap();
        assert_eq!(dropped.request_body.unwrap().content, None);
        assert_eq!(dropped.responses.unwrap()["200"].content, None);

        let kept = merge_operation(Some(with_body(None)), Some(with_body(Some(content.clone())))).unwrap();
        assert_eq!(kept.request_body.unwrap().content, Some(content.clone()));
        assert_eq!(kept.responses.unwrap()["200"].content, Some(content));
    }

    #[test]
    fn test_media_type_merge() {
        let mut a = MediaType::with_schema(Schema::reference("Pet"));
        a.example = Some(json!({"name": "Rex"}));
        let mut b = MediaType::with_schema(Schema::reference("Pet"));
        b.example = Some(json!({"name": "Tom"}));
        b.examples.insert("cat".to_string(), Some(Example::default()));

        let merged = merge_media_type(a, b);
        assert_eq!(merged.schema, Some(Schema::reference("Pet")));
        assert_eq!(merged.example, Some(json!({"name": "Rex"})));
        assert!(merged.examples.contains_key("cat"));
    }

    #[test]
    fn test_extensions_left_wins() {
        let mut a = Extensions::new();
        a.insert("x-a".to_string(), json!(1));
        a.insert("x-shared".to_string(), json!("left"));
        let mut b = Extensions::new();
        b.insert("x-shared".to_string(), json!("right"));
        b.insert("x-b".to_string(), json!(2));

        let merged = merge_extensions(a, b);
        assert_eq!(merged["x-shared"], json!("left"));
        let keys: Vec<_> = merged.keys().cloned().collect();
        assert_eq!(keys, vec!["x-shared", "x-b", "x-a"]);
    }

    #[test]
    fn test_security_and_servers_union() {
        let mut requirement = crate::types::SecurityRequirement::new();
        requirement.insert("api_key".to_string(), vec![]);
        let mut a = op("a");
        a.security = Some(vec![requirement.clone()]);
        a.servers = vec![crate::types::Server::new("https://a")];
        let mut b = op("b");
        b.security = Some(vec![requirement]);
        b.servers = vec![
            crate::types::Server::new("https://a"),
            crate::types::Server::new("https://b"),
        ];

        let merged = merge_operation(Some(a), Some(b)).unwrap();
        assert_eq!(merged.security.unwrap().len(), 1);
        assert_eq!(merged.servers.len(), 2);
    }

    #[test]
    fn test_merge_path_item_slots() {
        let a = PathItem {
            get: Some(op("list")),
            ..Default::default()
        };
        let b = PathItem {
            get: Some(op("other")),
            post: Some(op("create")),
            parameters: vec![Parameter::new("tenant", "header")],
            ..Default::default()
        };

        let merged = merge_path_item(a, b);
        assert_eq!(merged.get.unwrap().summary.as_deref(), Some("list"));
        assert_eq!(merged.post.unwrap().summary.as_deref(), Some("create"));
        assert_eq!(merged.parameters.len(), 1);
    }
}
