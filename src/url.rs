//! URI template parsing and route expansion.
//!
//! A template such as `/pets{/petId}` is split into typed [`Segment`]s and then
//! expanded into every concrete path it can match:
//!
//! ```
//! use oas_assembler::url::{build_urls, parse_path_segments};
//!
//! let segments = parse_path_segments("/pets{/petId}");
//! assert_eq!(build_urls(&segments, ""), vec!["/pets/{petId}", "/pets"]);
//! ```

const SLASH: &str = "/";

/// Kind of a template segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SegmentType {
    /// Literal path text
    Const,
    /// Required path variable, `{id}`
    ReqVar,
    /// Optional path variable, `{/id}`
    OptVar,
    /// Unresolved property placeholder, `${...}`
    Placeholder,
}

/// One parsed template segment
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    pub segment_type: SegmentType,
    pub value: String,
}

impl Segment {
    pub fn new(segment_type: SegmentType, value: impl Into<String>) -> Self {
        Self {
            segment_type,
            value: value.into(),
        }
    }
}

/// Parses a URI template into ordered segments.
///
/// Template modifiers that are not path variables (`{?q}`, `{.ext}`, `{+x}`,
/// `{0}`) are dropped. A single variable block may declare several names
/// separated by commas; a `:` starts a regex constraint that is ignored.
/// The result is never empty: a template with no segments yields `Const("/")`.
pub fn parse_path_segments(path: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut start = 0;

    loop {
        let Some(open) = path[start..].find('{').map(|i| i + start) else {
            add_const(&path[start..], &mut segments);
            break;
        };
        let Some(close) = path[open..].find('}').map(|i| i + open) else {
            // unterminated block is literal text
            add_const(&path[start..], &mut segments);
            break;
        };

        let prefix = &path[start..open];
        let body = &path[open + 1..close];

        match body.chars().next() {
            Some('?' | '.' | '+' | '0') => add_const(prefix, &mut segments),
            _ if prefix.ends_with('$') => {
                add_const(&prefix[..prefix.len() - 1], &mut segments);
                segments.push(Segment::new(
                    SegmentType::Placeholder,
                    &path[open - 1..=close],
                ));
            }
            Some('/') => {
                add_const(prefix, &mut segments);
                add_vars(&body[1..], SegmentType::OptVar, &mut segments);
            }
            _ => {
                add_const(prefix, &mut segments);
                add_vars(body, SegmentType::ReqVar, &mut segments);
            }
        }
        start = close + 1;
    }

    if segments.is_empty() {
        segments.push(Segment::new(SegmentType::Const, SLASH));
    }
    segments
}

fn add_const(value: &str, segments: &mut Vec<Segment>) {
    let value = value.strip_prefix(SLASH).unwrap_or(value);
    let value = value.strip_suffix(SLASH).unwrap_or(value);
    if !value.is_empty() {
        segments.push(Segment::new(SegmentType::Const, value));
    }
}

fn add_vars(body: &str, segment_type: SegmentType, segments: &mut Vec<Segment>) {
    for part in body.split(',') {
        let name = part.split(':').next().unwrap_or_default().trim();
        if !name.is_empty() {
            segments.push(Segment::new(segment_type, format!("{{{name}}}")));
        }
    }
}

/// Expands segments into every concrete path, prefixed with `context_path`.
///
/// An optional variable forks each in-progress path into a variant with the
/// variable and one without; the variant with the variable is listed first.
/// A later optional variable only extends paths that already took the
/// preceding optional one. Results are deduplicated preserving first-seen order.
pub fn build_urls(segments: &[Segment], context_path: &str) -> Vec<String> {
    let mut builders: Vec<String> = Vec::new();
    let mut prev: Option<&Segment> = None;

    for segment in segments {
        append_segment(segment, prev, &mut builders);
        prev = Some(segment);
    }

    let context_path = normalize_context_path(context_path);
    let mut urls: Vec<String> = Vec::with_capacity(builders.len());
    for builder in builders {
        let url = finish_url(&builder, &context_path);
        if !urls.contains(&url) {
            urls.push(url);
        }
    }
    urls
}

fn append_segment(segment: &Segment, prev: Option<&Segment>, builders: &mut Vec<String>) {
    let value = segment.value.as_str();

    if builders.is_empty() {
        let mut first = match segment.segment_type {
            SegmentType::Placeholder => String::new(),
            _ => SLASH.to_string(),
        };
        first.push_str(value);
        if !value.ends_with(SLASH) {
            first.push_str(SLASH);
        }
        builders.push(first);
        if segment.segment_type == SegmentType::OptVar {
            builders.push(SLASH.to_string());
        }
        return;
    }

    if segment.segment_type != SegmentType::OptVar {
        for builder in builders.iter_mut() {
            builder.push_str(value);
            builder.push_str(SLASH);
        }
        return;
    }

    let without = builders.clone();
    let required_prev = prev
        .filter(|p| p.segment_type == SegmentType::OptVar)
        .map(|p| format!("{}{SLASH}", p.value));
    for builder in builders.iter_mut() {
        if let Some(required) = &required_prev {
            if !builder.contains(required.as_str()) {
                continue;
            }
        }
        builder.push_str(value);
        builder.push_str(SLASH);
    }
    builders.extend(without);
}

fn finish_url(raw: &str, context_path: &str) -> String {
    let mut url = raw.to_string();
    if url.len() > 1 && url.ends_with(SLASH) {
        url.pop();
    }
    if !url.starts_with(SLASH) && !url.starts_with('$') {
        url.insert_str(0, SLASH);
    }
    if context_path.is_empty() {
        return url;
    }
    if url == SLASH {
        return context_path.to_string();
    }
    if url.starts_with('$') {
        return format!("{context_path}{SLASH}{url}");
    }
    format!("{context_path}{url}")
}

/// Normalizes a context path to `/segment` form; `""` and `"/"` become `""`
pub fn normalize_context_path(context_path: &str) -> String {
    let trimmed = context_path.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return String::new();
    }
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

/// Parses and expands a template in one step
pub fn expand_template(template: &str, context_path: &str) -> Vec<String> {
    build_urls(&parse_path_segments(template), context_path)
}
