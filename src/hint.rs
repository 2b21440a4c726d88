//! Autocompletion hints
//!
//! A hint is a URI naming where suggestions for a field's value come from:
//!
//! - `field://<field>/<path>`: the JSON value of another field, at `path`
//! - `http(s)://<host>/<path>`: not implemented
//! - `file:///<path>`: not implemented
//!
//! Hints are validated when registered and resolved on demand.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::trace;

use crate::error::{FormError, Result};
use crate::group::InputGroup;
use crate::jsonpath;

/// Scheme, host-like token (field name for `field://`) and optional path.
static HINT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?P<scheme>https?://|file:///?|field://)(?P<host>[a-z0-9_]+(?:[\-\.][a-z0-9_]+)*(?:\.[a-z]{2,5})*(?::[0-9]{1,5})?)(?P<path>/.*)?$",
    )
    .expect("hint pattern is valid")
});

/// A validated hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldHint {
    Http(String),
    File(String),
    Field { field: String, path: String },
}

impl FieldHint {
    pub fn parse(hint: &str) -> Result<Self> {
        let invalid = || FormError::InvalidHint {
            hint: hint.to_string(),
        };
        let caps = HINT_RE.captures(hint).ok_or_else(invalid)?;

        let host = caps.name("host").map_or("", |m| m.as_str());
        let path = caps.name("path").map_or("", |m| m.as_str());
        match caps.name("scheme").map(|m| m.as_str()) {
            Some("field://") => Ok(FieldHint::Field {
                field: host.to_string(),
                path: path.to_string(),
            }),
            Some("http://" | "https://") => Ok(FieldHint::Http(hint.to_string())),
            Some(_) => Ok(FieldHint::File(hint.to_string())),
            None => Err(invalid()),
        }
    }
}

impl std::fmt::Display for FieldHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldHint::Http(uri) | FieldHint::File(uri) => f.write_str(uri),
            FieldHint::Field { field, path } => write!(f, "field://{field}{path}"),
        }
    }
}

impl InputGroup {
    /// Register `hint` for the field `name`.
    pub fn add_field_hint(&mut self, name: &str, hint: &str) -> Result<()> {
        let parsed = FieldHint::parse(hint)?;
        if !self.has_field(name) {
            return Err(FormError::FieldNotFound {
                name: name.to_string(),
            });
        }
        self.hints.entry(name.to_string()).or_default().push(parsed);
        Ok(())
    }

    /// Hints registered for `name`, in registration order.
    pub fn hints(&self, name: &str) -> &[FieldHint] {
        self.hints.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Resolve every hint of the field `name` into suggestion values.
    ///
    /// A failing hint is recorded and the remaining hints are still
    /// resolved. A referenced field without a value contributes nothing.
    pub fn field_hints(&self, name: &str) -> Result<HintValues> {
        if !self.has_field(name) {
            return Err(FormError::FieldNotFound {
                name: name.to_string(),
            });
        }

        let mut resolved = HintValues::default();
        for hint in self.hints(name) {
            if let Err(e) = self.resolve_hint(name, hint, &mut resolved.values) {
                trace!(field = %name, hint = %hint, error = %e, "hint failed");
                resolved.errors.push(e);
            }
        }
        Ok(resolved)
    }

    fn resolve_hint(&self, name: &str, hint: &FieldHint, values: &mut Vec<String>) -> Result<()> {
        let (field, path) = match hint {
            FieldHint::Http(_) | FieldHint::File(_) => {
                return Err(FormError::HintNotImplemented {
                    hint: hint.to_string(),
                });
            }
            FieldHint::Field { field, path } => (field, path),
        };

        let Some(raw) = self.field_value(field)? else {
            trace!(field = %name, source = %field, "hint source has no value");
            return Ok(());
        };
        let document: Value = serde_json::from_str(&raw).map_err(|e| FormError::HintJson {
            field: field.clone(),
            details: e.to_string(),
        })?;
        let found = jsonpath::resolve(&document, path)?.ok_or_else(|| FormError::JsonPathNoMatch {
            path: path.clone(),
            field: field.clone(),
        })?;
        push_hint_values(found, values);
        Ok(())
    }
}

/// Suggestions gathered from a field's hints, with the hints that failed.
#[derive(Debug, Default)]
pub struct HintValues {
    pub values: Vec<String>,
    pub errors: Vec<FormError>,
}

impl HintValues {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

fn push_hint_values(found: &Value, values: &mut Vec<String>) {
    match found {
        Value::String(s) => values.push(s.clone()),
        Value::Array(items) => values.extend(items.iter().map(|item| match item {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })),
        other => values.push(other.to_string()),
    }
}
