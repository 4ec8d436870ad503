//! Schema merging.

use crate::types::Schema;

/// Merges two schemas declared for the same slot.
///
/// Equal schemas merge to themselves. Otherwise the result is a composed
/// schema whose `oneOf` lists both sides; an `a` that already carries a `oneOf`
/// list gets `b` appended instead of being wrapped again.
///
/// ```
/// use oas_assembler::merger::merge_schema;
/// use oas_assembler::types::Schema;
///
/// let merged = merge_schema(Schema::string(), Schema::integer(Some("int32")));
/// assert_eq!(merged.one_of.len(), 2);
/// ```
pub fn merge_schema(a: Schema, b: Schema) -> Schema {
    if a == b {
        return a;
    }
    if !a.one_of.is_empty() {
        let mut a = a;
        if !a.one_of.contains(&b) {
            a.one_of.push(b);
        }
        return a;
    }
    let mut composed = Schema::composed();
    composed.one_of = vec![a, b];
    composed
}

/// [`merge_schema`] lifted over absent sides
pub fn merge_schema_opt(a: Option<Schema>, b: Option<Schema>) -> Option<Schema> {
    match (a, b) {
        (Some(a), Some(b)) => Some(merge_schema(a, b)),
        (a, b) => a.or(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SchemaKind;
    use serde_json::json;

    #[test]
    fn test_equal_schemas_merge_to_themselves() {
        let merged = merge_schema(Schema::string(), Schema::string());
        assert_eq!(merged, Schema::string());
    }

    #[test]
    fn test_conflicting_schemas_fold_into_one_of() {
        // Two incompatible declarations are kept side by side rather than
        // rejected, so a paginated and a plain response for the same status
        // code end up as alternatives.
        let merged = merge_schema(Schema::reference("Page"), Schema::reference("Pet"));
        assert_eq!(merged.kind, SchemaKind::Composed);
        assert_eq!(
            merged.one_of,
            vec![Schema::reference("Page"), Schema::reference("Pet")]
        );
    }

    #[test]
    fn test_existing_one_of_is_extended() {
        let first = merge_schema(Schema::string(), Schema::boolean());
        let merged = merge_schema(first, Schema::integer(None));
        assert_eq!(merged.one_of.len(), 3);

        let again = merge_schema(merged.clone(), Schema::integer(None));
        assert_eq!(again, merged);
    }

    #[test]
    fn test_parsed_and_constructed_schemas_are_equal() {
        let parsed: Schema = serde_json::from_value(json!({"type": "string"})).unwrap();
        assert_eq!(parsed.kind, SchemaKind::Simple);
        assert_eq!(merge_schema(Schema::string(), parsed.clone()), Schema::string());
        assert_eq!(merge_schema(parsed, Schema::string()), Schema::string());
    }

    #[test]
    fn test_parsed_one_of_is_extended() {
        let parsed: Schema =
            serde_json::from_value(json!({"oneOf": [{"type": "string"}, {"type": "boolean"}]}))
                .unwrap();
        let merged = merge_schema(parsed, Schema::integer(None));
        assert_eq!(
            serde_json::to_value(&merged).unwrap(),
            json!({"oneOf": [{"type": "string"}, {"type": "boolean"}, {"type": "integer"}]})
        );
    }

    #[test]
    fn test_absent_side() {
        assert_eq!(merge_schema_opt(None, Some(Schema::string())), Some(Schema::string()));
        assert_eq!(merge_schema_opt(Some(Schema::string()), None), Some(Schema::string()));
        assert_eq!(merge_schema_opt(None, None), None);
    }
}
