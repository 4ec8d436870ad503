//! Value conversion layer.
//!
//! Turns annotation-derived value trees into JSON values and typed model
//! objects, maps host-language class names to OpenAPI type/format pairs and
//! parses textual defaults according to their declared type.
//!
//! Nothing in this module fails the build. Malformed input is reported through
//! [`Warnings`] and degraded to the raw text.

use std::collections::HashMap;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde_json::{Map, Number, Value};

use crate::context::Warnings;
use crate::element::{simple_name, ClassInfo, ClassLookup, MemberInfo, JSON_VALUE_ANNOTATION};
use crate::errors::{Error, Result};
use crate::types::{Extensions, Pair, EXTENSION_PREFIX};

/// OpenAPI type used when nothing more specific is known
pub const TYPE_OBJECT: &str = "object";

/// OpenAPI string type
pub const TYPE_STRING: &str = "string";

/// Raw annotation member value
#[derive(Debug, Clone, PartialEq)]
pub enum AnnValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Class literal
    Class(crate::element::TypeRef),
    /// Enum constant name
    Enum(String),
    Array(Vec<AnnValue>),
    Nested(Annotation),
}

impl From<&str> for AnnValue {
    fn from(value: &str) -> Self {
        AnnValue::Str(value.to_string())
    }
}

impl From<String> for AnnValue {
    fn from(value: String) -> Self {
        AnnValue::Str(value)
    }
}

impl From<bool> for AnnValue {
    fn from(value: bool) -> Self {
        AnnValue::Bool(value)
    }
}

impl From<i64> for AnnValue {
    fn from(value: i64) -> Self {
        AnnValue::Int(value)
    }
}

impl From<Annotation> for AnnValue {
    fn from(value: Annotation) -> Self {
        AnnValue::Nested(value)
    }
}

/// An annotation instance: its type and its explicitly set members
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Annotation {
    /// Fully qualified or simple annotation type name
    pub type_name: String,
    pub members: IndexMap<String, AnnValue>,
}

impl Annotation {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            members: IndexMap::new(),
        }
    }

    /// Builder-style member setter
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AnnValue>) -> Self {
        self.members.insert(name.into(), value.into());
        self
    }

    /// Simple name of the annotation type
    pub fn kind(&self) -> &str {
        simple_name(&self.type_name)
    }

    pub fn string(&self, member: &str) -> Option<&str> {
        match self.members.get(member) {
            Some(AnnValue::Str(s)) | Some(AnnValue::Enum(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn boolean(&self, member: &str) -> Option<bool> {
        match self.members.get(member) {
            Some(AnnValue::Bool(b)) => Some(*b),
            Some(AnnValue::Str(s)) => Some(is_true(s)),
            _ => None,
        }
    }

    /// Nested annotations of an array (or single) member
    pub fn annotations(&self, member: &str) -> Vec<&Annotation> {
        match self.members.get(member) {
            Some(AnnValue::Nested(a)) => vec![a],
            Some(AnnValue::Array(items)) => items
                .iter()
                .filter_map(|v| match v {
                    AnnValue::Nested(a) => Some(a),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// String values of an array (or single) member
    pub fn strings(&self, member: &str) -> Vec<&str> {
        match self.members.get(member) {
            Some(AnnValue::Str(s)) => vec![s.as_str()],
            Some(AnnValue::Array(items)) => items
                .iter()
                .filter_map(|v| match v {
                    AnnValue::Str(s) => Some(s.as_str()),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// Boolean property semantics: anything but `false` (ignoring case) is true
pub fn is_true(value: &str) -> bool {
    !value.trim().eq_ignore_ascii_case("false")
}

/// Converts annotation members into a JSON object.
///
/// Arrays of nested annotations are reshaped by annotation kind:
/// security requirements become `name -> scopes` objects, extensions are
/// flattened into an `extensions` object, servers always stay a list, and
/// content, responses, examples, links, headers and server variables become
/// keyed maps. Any other singleton array collapses to its only element.
pub fn to_value_map(members: &IndexMap<String, AnnValue>, warnings: &mut Warnings) -> Map<String, Value> {
    let mut result = Map::new();
    for (key, value) in members {
        match value {
            AnnValue::Null => {}
            AnnValue::Nested(annotation) => {
                result.insert(
                    key.clone(),
                    Value::Object(to_value_map(&annotation.members, warnings)),
                );
            }
            AnnValue::Array(items) if items.is_empty() => {}
            AnnValue::Array(items) => convert_array(key, items, &mut result, warnings),
            AnnValue::Str(s) if key == "discriminatorProperty" => {
                let discriminator = result
                    .entry("discriminator")
                    .or_insert_with(|| Value::Object(Map::new()));
                if let Value::Object(d) = discriminator {
                    d.insert("propertyName".to_string(), parse_json_string(s));
                }
            }
            AnnValue::Str(s) => {
                result.insert(key.clone(), parse_json_string(s));
            }
            other => {
                result.insert(key.clone(), scalar_to_value(other, warnings));
            }
        }
    }
    result
}

fn convert_array(
    key: &str,
    items: &[AnnValue],
    result: &mut Map<String, Value>,
    warnings: &mut Warnings,
) {
    let nested: Vec<&Annotation> = items
        .iter()
        .filter_map(|v| match v {
            AnnValue::Nested(a) => Some(a),
            _ => None,
        })
        .collect();

    if nested.is_empty() {
        let values = items
            .iter()
            .map(|item| scalar_to_value(item, warnings))
            .collect();
        result.insert(key.to_string(), Value::Array(values));
        return;
    }

    let kind = nested[0].kind().to_string();
    match kind.as_str() {
        "SecurityRequirement" => {
            let requirements = nested
                .iter()
                .map(|a| {
                    let mut requirement = Map::new();
                    if let Some(name) = a.string("name") {
                        let scopes = a.strings("scopes").into_iter().map(Value::from).collect();
                        requirement.insert(name.to_string(), Value::Array(scopes));
                    }
                    Value::Object(requirement)
                })
                .collect();
            result.insert(key.to_string(), Value::Array(requirements));
        }
        "Extension" => {
            let mut extensions = Extensions::new();
            let owned: Vec<Annotation> = nested.iter().map(|a| (*a).clone()).collect();
            process_extensions(&mut extensions, &owned, warnings);
            result.insert(
                "extensions".to_string(),
                Value::Object(extensions.into_iter().collect()),
            );
        }
        "Server" => {
            let servers = nested
                .iter()
                .map(|a| Value::Object(to_value_map(&a.members, warnings)))
                .collect();
            result.insert(key.to_string(), Value::Array(servers));
        }
        "ServerVariable" => {
            let mut variables = Map::new();
            for a in &nested {
                let Some(name) = a.string("name") else { continue };
                let mut map = to_value_map(&a.members, warnings);
                map.shift_remove("name");
                if let Some(default) = map.shift_remove("defaultValue") {
                    map.insert("default".to_string(), default);
                }
                if let Some(allowed) = map.shift_remove("allowableValues") {
                    map.insert("enum".to_string(), allowed);
                }
                variables.insert(name.to_string(), Value::Object(map));
            }
            result.insert(key.to_string(), Value::Object(variables));
        }
        "Content" => {
            result.insert(key.to_string(), keyed_submap(&nested, "mediaType", None, warnings));
        }
        "Link" | "Header" => {
            result.insert(key.to_string(), keyed_submap(&nested, "name", None, warnings));
        }
        "ApiResponse" => {
            result.insert(
                key.to_string(),
                keyed_submap(&nested, "responseCode", Some("default"), warnings),
            );
        }
        "ExampleObject" => {
            result.insert(
                key.to_string(),
                keyed_submap(&nested, "name", Some("example"), warnings),
            );
        }
        _ if nested.len() == 1 => {
            result.insert(
                key.to_string(),
                Value::Object(to_value_map(&nested[0].members, warnings)),
            );
        }
        _ => {
            let list = items
                .iter()
                .map(|v| match v {
                    AnnValue::Nested(a) => Value::Object(to_value_map(&a.members, warnings)),
                    other => scalar_to_value(other, warnings),
                })
                .collect();
            result.insert(key.to_string(), Value::Array(list));
        }
    }
}

fn keyed_submap(
    annotations: &[&Annotation],
    key_member: &str,
    fallback: Option<&str>,
    warnings: &mut Warnings,
) -> Value {
    let mut map = Map::new();
    for a in annotations {
        let Some(name) = a.string(key_member).or(fallback) else {
            continue;
        };
        let mut values = to_value_map(&a.members, warnings);
        values.shift_remove(key_member);
        map.insert(name.to_string(), Value::Object(values));
    }
    Value::Object(map)
}

fn scalar_to_value(value: &AnnValue, warnings: &mut Warnings) -> Value {
    match value {
        AnnValue::Null => Value::Null,
        AnnValue::Bool(b) => Value::Bool(*b),
        AnnValue::Int(i) => Value::from(*i),
        AnnValue::Float(f) => match Number::from_f64(*f) {
            Some(n) => Value::Number(n),
            None => {
                warnings.warn(format!("can't represent {f} as a JSON number"), None);
                Value::String(f.to_string())
            }
        },
        AnnValue::Str(s) | AnnValue::Enum(s) => Value::String(s.clone()),
        AnnValue::Class(t) => {
            let type_format = get_type_and_format_by_class(Some(&t.name), t.is_array);
            let mut schema = Map::new();
            schema.insert("type".to_string(), Value::from(type_format.first));
            if let Some(format) = type_format.second {
                schema.insert("format".to_string(), Value::from(format));
            }
            Value::Object(schema)
        }
        AnnValue::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| scalar_to_value(item, warnings))
                .collect(),
        ),
        AnnValue::Nested(a) => Value::Object(to_value_map(&a.members, warnings)),
    }
}

/// Strings that look like a JSON object or array are parsed, others kept verbatim
fn parse_json_string(value: &str) -> Value {
    let trimmed = value.trim();
    let looks_like_json = (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'));
    if looks_like_json {
        if let Ok(parsed) = serde_json::from_str(trimmed) {
            return parsed;
        }
    }
    Value::String(value.to_string())
}

/// Prefixes `x-` unless already present
pub fn prepend_extension_prefix(name: &str) -> String {
    if name.starts_with(EXTENSION_PREFIX) {
        name.to_string()
    } else {
        format!("{EXTENSION_PREFIX}{name}")
    }
}

/// Applies `@Extension` annotations to an extension map.
///
/// An extension with an empty name contributes each property at top level as
/// `x-<property>`. A named extension contributes one `x-<name>` object holding
/// its properties. Properties flagged `parseValue` are parsed as JSON; text that
/// fails to parse is kept verbatim with a warning. Keys already present in
/// `target` are never overwritten.
pub fn process_extensions(target: &mut Extensions, extensions: &[Annotation], warnings: &mut Warnings) {
    for extension in extensions {
        let name = extension.string("name").unwrap_or_default();
        let key = if name.is_empty() {
            String::new()
        } else {
            prepend_extension_prefix(name)
        };

        for property in extension.annotations("properties") {
            let (Some(prop_name), Some(prop_value)) =
                (property.string("name"), property.string("value"))
            else {
                continue;
            };
            if prop_name.trim().is_empty() || prop_value.trim().is_empty() {
                continue;
            }
            let value = if property.boolean("parseValue").unwrap_or(false) {
                serde_json::from_str(prop_value).unwrap_or_else(|e| {
                    warnings.warn(
                        format!("Can't parse extension property {prop_name} value as json: {e}"),
                        None,
                    );
                    Value::String(prop_value.to_string())
                })
            } else {
                Value::String(prop_value.to_string())
            };

            if key.is_empty() {
                target
                    .entry(prepend_extension_prefix(prop_name))
                    .or_insert(value);
                continue;
            }
            let entry = target
                .entry(key.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                continue;
            }
            if let Value::Object(map) = entry {
                map.entry(prop_name.to_string()).or_insert(value);
            }
        }
    }
}

/// Deserializes a converted value map into a model object, warning on mismatch
pub fn convert_to<T: DeserializeOwned>(
    value: Map<String, Value>,
    location: Option<&str>,
    warnings: &mut Warnings,
) -> Option<T> {
    match serde_json::from_value(Value::Object(value)) {
        Ok(converted) => Some(converted),
        Err(e) => {
            warnings.warn(
                format!(
                    "Can't convert annotation values to {}: {e}",
                    std::any::type_name::<T>()
                ),
                location,
            );
            None
        }
    }
}

type TypeFormat = (&'static str, Option<&'static str>);

static TYPE_FORMAT_BY_CLASS: Lazy<HashMap<&'static str, TypeFormat>> = Lazy::new(|| {
    let mut table: HashMap<&'static str, TypeFormat> = HashMap::new();
    for name in ["java.lang.String", "char", "java.lang.Character"] {
        table.insert(name, ("string", None));
    }
    for name in ["java.lang.Boolean", "boolean"] {
        table.insert(name, ("boolean", None));
    }
    for name in ["java.lang.Integer", "int", "java.lang.Short", "short"] {
        table.insert(name, ("integer", Some("int32")));
    }
    table.insert("java.math.BigInteger", ("integer", None));
    for name in ["java.lang.Long", "long"] {
        table.insert(name, ("integer", Some("int64")));
    }
    for name in ["java.lang.Float", "float"] {
        table.insert(name, ("number", Some("float")));
    }
    for name in ["java.lang.Double", "double"] {
        table.insert(name, ("number", Some("double")));
    }
    // swagger has no byte type
    for name in ["java.lang.Byte", "byte"] {
        table.insert(name, ("integer", Some("int32")));
    }
    table.insert("java.math.BigDecimal", ("number", None));
    table.insert("java.net.URI", ("string", Some("uri")));
    table.insert("java.net.URL", ("string", Some("url")));
    table.insert("java.util.UUID", ("string", Some("uuid")));
    table.insert("java.lang.Number", ("number", None));
    table.insert("java.io.File", ("string", Some("binary")));
    table.insert("java.time.LocalDate", ("string", Some("date")));
    for name in [
        "java.util.Date",
        "java.util.Calendar",
        "java.time.Instant",
        "java.time.LocalDateTime",
        "java.time.OffsetDateTime",
        "javax.xml.datatype.XMLGregorianCalendar",
        "java.time.ZonedDateTime",
    ] {
        table.insert(name, ("string", Some("date-time")));
    }
    table.insert("java.time.LocalTime", ("string", Some("partial-time")));
    table
});

/// Maps a class name to its OpenAPI `(type, format)`.
///
/// `byte`/`Byte` arrays map to `("string", "byte")`; unknown or missing class
/// names map to `("object", None)`.
///
/// ```
/// use oas_assembler::convert::get_type_and_format_by_class;
///
/// let pair = get_type_and_format_by_class(Some("java.lang.Long"), false);
/// assert_eq!(pair.first, "integer");
/// assert_eq!(pair.second.as_deref(), Some("int64"));
/// ```
pub fn get_type_and_format_by_class(
    class_name: Option<&str>,
    is_array: bool,
) -> Pair<String, Option<String>> {
    let Some(class_name) = class_name else {
        return Pair::new(TYPE_OBJECT.to_string(), None);
    };
    let class_name = class_name.strip_suffix("[]").unwrap_or(class_name);
    if is_array && matches!(class_name, "byte" | "java.lang.Byte") {
        return Pair::new("string".to_string(), Some("byte".to_string()));
    }
    match TYPE_FORMAT_BY_CLASS.get(class_name) {
        Some((schema_type, format)) => {
            Pair::new(schema_type.to_string(), format.map(str::to_string))
        }
        None => Pair::new(TYPE_OBJECT.to_string(), None),
    }
}

/// Detects the OpenAPI type/format an enum serializes as.
///
/// A declared non-string schema type is trusted as is. Otherwise the first
/// member annotated with `@JsonValue` decides: an enum return type recurses,
/// any other return type goes through [`get_type_and_format_by_class`].
/// Without such a member the enum is a string.
pub fn check_enum_json_value_type(
    lookup: &dyn ClassLookup,
    enum_class: &ClassInfo,
    schema_type: Option<&str>,
    schema_format: Option<&str>,
    warnings: &mut Warnings,
) -> Pair<String, Option<String>> {
    if let Some(schema_type) = schema_type.filter(|t| *t != TYPE_STRING) {
        return Pair::new(schema_type.to_string(), schema_format.map(str::to_string));
    }

    let json_values: Vec<&MemberInfo> = enum_class
        .members
        .iter()
        .filter(|m| m.has_annotation(JSON_VALUE_ANNOTATION))
        .collect();

    if let Some(first) = json_values.first() {
        if json_values.len() > 1 {
            warnings.warn(
                format!(
                    "Found {} members with @JsonValue. Process member {}",
                    json_values.len(),
                    first.name
                ),
                Some(&enum_class.name),
            );
        }
        let return_type = &first.return_type;
        if return_type.is_enum {
            if let Some(nested) = lookup.find_class(&return_type.name) {
                if nested.name != enum_class.name {
                    return check_enum_json_value_type(lookup, nested, None, None, warnings);
                }
            }
            return Pair::new(TYPE_STRING.to_string(), None);
        }
        return get_type_and_format_by_class(Some(&return_type.name), return_type.is_array);
    }

    Pair::new(TYPE_STRING.to_string(), schema_format.map(str::to_string))
}

/// Parses a textual value according to its declared OpenAPI type and format.
///
/// Returns `None` for empty input (except micronaut-style arrays, which split
/// on commas). A value that doesn't fit its type is reported as a warning and
/// returned as the original string.
pub fn parse_by_type_and_format(
    value: &str,
    schema_type: Option<&str>,
    format: Option<&str>,
    micronaut_format: bool,
    warnings: &mut Warnings,
) -> Option<Value> {
    if schema_type == Some("array") && micronaut_format {
        let items = value
            .split(',')
            .map(|s| Value::String(s.trim().to_string()))
            .collect();
        return Some(Value::Array(items));
    }
    if value.is_empty() {
        return None;
    }

    match try_parse(value, schema_type, format) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            warnings.warn(e.to_string(), None);
            Some(Value::String(value.to_string()))
        }
    }
}

fn try_parse(value: &str, schema_type: Option<&str>, format: Option<&str>) -> Result<Value> {
    let invalid = || Error::invalid_value(value, schema_type.unwrap_or("null"), format);
    let text = || Ok(Value::String(value.to_string()));

    match schema_type {
        Some("string") => match format {
            Some("uri") | Some("url") => {
                if value.contains(':') && !value.contains(char::is_whitespace) {
                    text()
                } else {
                    Err(invalid())
                }
            }
            Some("uuid") => {
                if is_uuid(value) {
                    Ok(Value::String(value.to_ascii_lowercase()))
                } else {
                    Err(invalid())
                }
            }
            _ => text(),
        },
        Some("boolean") => Ok(Value::Bool(value.eq_ignore_ascii_case("true"))),
        Some("array") => match serde_json::from_str::<Value>(value) {
            Ok(parsed @ Value::Array(_)) => Ok(parsed),
            _ => Err(invalid()),
        },
        Some("integer") => {
            let trimmed = value.trim();
            match format {
                Some("int32") => trimmed
                    .parse::<i32>()
                    .map(Value::from)
                    .map_err(|_| invalid()),
                Some("int64") => trimmed
                    .parse::<i64>()
                    .map(Value::from)
                    .map_err(|_| invalid()),
                _ => unbounded_integer(trimmed).map(Value::Number).ok_or_else(invalid),
            }
        }
        Some("number") => {
            let trimmed = value.trim();
            let parsed = trimmed.parse::<f64>().map_err(|_| invalid())?;
            if format == Some("float") && parsed.is_finite() && parsed.abs() > f32::MAX as f64 {
                return Err(invalid());
            }
            if format.is_none() && parsed.is_finite() {
                if let Ok(exact) = serde_json::from_str::<Number>(trimmed.trim_start_matches('+')) {
                    return Ok(Value::Number(exact));
                }
            }
            Number::from_f64(parsed).map(Value::Number).ok_or_else(invalid)
        }
        _ => text(),
    }
}

/// Integer of any size, keeping every digit
fn unbounded_integer(value: &str) -> Option<Number> {
    let (negative, digits) = match value.as_bytes().first()? {
        b'-' => (true, &value[1..]),
        b'+' => (false, &value[1..]),
        _ => (false, value),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let digits = digits.trim_start_matches('0');
    let literal = match (negative, digits.is_empty()) {
        (_, true) => "0".to_string(),
        (true, false) => format!("-{digits}"),
        (false, false) => digits.to_string(),
    };
    serde_json::from_str(&literal).ok()
}

fn is_uuid(value: &str) -> bool {
    let groups: Vec<&str> = value.split('-').collect();
    let lengths = [8, 4, 4, 4, 12];
    groups.len() == lengths.len()
        && groups
            .iter()
            .zip(lengths)
            .all(|(g, len)| g.len() == len && g.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Default description of a response with the given status code.
///
/// Known codes use the HTTP reason phrase; `default` uses `OK response`.
pub fn response_description(code: &str) -> String {
    if code == "default" {
        return "OK response".to_string();
    }
    code.parse::<u16>()
        .ok()
        .and_then(reason_phrase)
        .map(str::to_string)
        .unwrap_or_else(|| format!("Response {code}"))
}

fn reason_phrase(code: u16) -> Option<&'static str> {
    let phrase = match code {
        100 => "Continue",
        101 => "Switching Protocols",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        203 => "Non-Authoritative Information",
        204 => "No Content",
        205 => "Reset Content",
        206 => "Partial Content",
        300 => "Multiple Choices",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        402 => "Payment Required",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        407 => "Proxy Authentication Required",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        412 => "Precondition Failed",
        413 => "Request Entity Too Large",
        414 => "Request-URI Too Long",
        415 => "Unsupported Media Type",
        416 => "Requested Range Not Satisfiable",
        417 => "Expectation Failed",
        422 => "Unprocessable Entity",
        423 => "Locked",
        428 => "Precondition Required",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",
        _ => return None,
    };
    Some(phrase)
}
