//! Minimal JSON path lookup for `field://` hints
//!
//! Supports:
//! - a/b/0 (slash separated, as written after the field name in a hint)
//! - $.a.b[0] (dot notation with array index)
//! - a.b.0 (dots without the $ prefix)
//!
//! An empty path, `/` or `$` addresses the whole document.
//!
//! Does NOT support filters, wildcards or slices.

use serde_json::Value;

use crate::error::FormError;

/// A parsed path segment
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    /// Object member access
    Field(String),
    /// Array index access
    Index(usize),
}

/// Parse a path string into segments
///
/// Examples:
/// - "/users/0/name" → [Field("users"), Index(0), Field("name")]
/// - "$.items[0].name" → [Field("items"), Index(0), Field("name")]
pub fn parse(path: &str) -> Result<Vec<Segment>, FormError> {
    let unsupported = || FormError::JsonPathUnsupported {
        path: path.to_string(),
    };

    let (body, separator) = if let Some(rest) = path.strip_prefix("$.") {
        (rest, '.')
    } else if path == "$" {
        return Ok(vec![]);
    } else if let Some(rest) = path.strip_prefix('/') {
        (rest, '/')
    } else if path.contains('/') {
        (path, '/')
    } else {
        (path, '.')
    };

    if body.is_empty() {
        return Ok(vec![]);
    }

    let mut segments = Vec::new();

    for part in body.split(separator) {
        if part.is_empty() {
            return Err(unsupported());
        }

        // field[0] or [0]
        if let Some(bracket_pos) = part.find('[') {
            let field = &part[..bracket_pos];
            if !field.is_empty() {
                segments.push(Segment::Field(field.to_string()));
            }

            if !part.ends_with(']') {
                return Err(unsupported());
            }
            let index = part[bracket_pos + 1..part.len() - 1]
                .parse::<usize>()
                .map_err(|_| unsupported())?;
            segments.push(Segment::Index(index));
        } else if let Ok(index) = part.parse::<usize>() {
            segments.push(Segment::Index(index));
        } else {
            segments.push(Segment::Field(part.to_string()));
        }
    }

    Ok(segments)
}

/// Apply segments to a JSON value
pub fn apply<'v>(value: &'v Value, segments: &[Segment]) -> Option<&'v Value> {
    segments.iter().try_fold(value, |current, segment| match segment {
        Segment::Field(name) => current.get(name),
        // numeric member names of objects are looked up as keys
        Segment::Index(idx) => current
            .get(*idx)
            .or_else(|| current.as_object().and_then(|o| o.get(&idx.to_string()))),
    })
}

/// Parse and apply a path in one step
pub fn resolve<'v>(value: &'v Value, path: &str) -> Result<Option<&'v Value>, FormError> {
    let segments = parse(path)?;
    Ok(apply(value, &segments))
}
