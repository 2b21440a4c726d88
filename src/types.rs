//! Core value types shared by the graph model
//!
//! Small, copyable identifiers and the parsed form of builder
//! attributes that need validation before they touch the graph.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::FormError;

// ============================================================================
// NODE ID
// ============================================================================

/// Stable index of a node inside one group tree.
///
/// Ids are only meaningful for the `InputGroup` that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The root container of every group tree.
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// INPUT TYPE
// ============================================================================

/// Type tag of an input.
///
/// The tag is descriptive; it does not change the set pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputType {
    #[default]
    #[serde(alias = "string")]
    Text,
    Number,
    #[serde(alias = "file_path")]
    Path,
    #[serde(alias = "http_url")]
    Url,
    #[serde(alias = "email_address")]
    Email,
    Json,
    Container,
}

impl InputType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputType::Text => "text",
            InputType::Number => "number",
            InputType::Path => "path",
            InputType::Url => "url",
            InputType::Email => "email",
            InputType::Json => "json",
            InputType::Container => "container",
        }
    }
}

impl fmt::Display for InputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" | "string" => Ok(InputType::Text),
            "number" => Ok(InputType::Number),
            "path" | "file_path" => Ok(InputType::Path),
            "url" | "http_url" => Ok(InputType::Url),
            "email" | "email_address" => Ok(InputType::Email),
            "json" => Ok(InputType::Json),
            "container" => Ok(InputType::Container),
            other => Err(format!("unknown input type '{other}'")),
        }
    }
}

// ============================================================================
// DEPENDENCY EXPRESSION
// ============================================================================

/// Parsed `name` or `name=value1|value2` dependency expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Name of the prerequisite field
    pub name: String,
    /// Values of the prerequisite that enable the dependent field.
    /// Empty means any value.
    pub values: Vec<String>,
}

impl Dependency {
    /// Parse a dependency expression declared on `field`.
    pub fn parse(field: &str, expr: &str) -> Result<Self, FormError> {
        let malformed = || FormError::MalformedDependency {
            field: field.to_string(),
            expr: expr.to_string(),
        };

        let mut parts = expr.split('=');
        let name = parts.next().unwrap_or_default();
        let values = parts.next();
        if parts.next().is_some() || name.is_empty() {
            return Err(malformed());
        }

        let values = match values {
            Some(v) if !v.is_empty() => v.split('|').map(str::to_string).collect(),
            _ => Vec::new(),
        };

        Ok(Dependency {
            name: name.to_string(),
            values,
        })
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.values.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}={}", self.name, self.values.join("|"))
        }
    }
}
