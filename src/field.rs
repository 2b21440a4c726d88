//! Input fields: builder attributes, binding and the set pipeline
//!
//! A field reads and writes its value through a caller-supplied
//! `ValueSlot`. When nothing is bound it falls back to the first declared
//! environment variable that is set. Values written through `set` pass
//! file substitution, the accepted-value list and the inclusion/exclusion
//! patterns, in that order.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, trace};

use crate::binding::ValueSlot;
use crate::env::EnvProvider;
use crate::error::{FormError, Result};
use crate::node::Input;
use crate::types::{InputType, NodeId};

// ============================================================================
// FIELD ATTRIBUTES
// ============================================================================

/// Everything needed to add a field to a group.
///
/// Deserializes from form definition files; the chainable methods build
/// the same thing in code.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldAttributes {
    pub name: String,
    pub display_name: String,
    pub description: String,
    /// Fields sharing a group id > 0 are alternatives; only one is asked for.
    pub group_id: u32,
    #[serde(rename = "type")]
    pub input_type: InputType,
    /// The entered value is a path; the field's value is that file's content.
    pub value_from_file: bool,
    #[serde(alias = "default")]
    pub default_value: Option<String>,
    pub sensitive: bool,
    pub env_vars: Vec<String>,
    /// `name` or `name=value1|value2`
    pub depends_on: Vec<String>,
    pub inclusion_filter: Option<String>,
    pub inclusion_filter_error_message: String,
    pub exclusion_filter: Option<String>,
    pub exclusion_filter_error_message: String,
    pub accepted_values: Option<Vec<String>>,
    pub accepted_values_error_message: String,
    pub tags: Vec<String>,
}

impl FieldAttributes {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn group_id(mut self, group_id: u32) -> Self {
        self.group_id = group_id;
        self
    }

    pub fn input_type(mut self, input_type: InputType) -> Self {
        self.input_type = input_type;
        self
    }

    pub fn value_from_file(mut self) -> Self {
        self.value_from_file = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn env_var(mut self, name: impl Into<String>) -> Self {
        self.env_vars.push(name.into());
        self
    }

    pub fn depends_on(mut self, expr: impl Into<String>) -> Self {
        self.depends_on.push(expr.into());
        self
    }

    pub fn inclusion_filter(mut self, pattern: impl Into<String>, message: impl Into<String>) -> Self {
        self.inclusion_filter = Some(pattern.into());
        self.inclusion_filter_error_message = message.into();
        self
    }

    pub fn exclusion_filter(mut self, pattern: impl Into<String>, message: impl Into<String>) -> Self {
        self.exclusion_filter = Some(pattern.into());
        self.exclusion_filter_error_message = message.into();
        self
    }

    pub fn accepted_values<I, S>(mut self, values: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted_values = Some(values.into_iter().map(Into::into).collect());
        self.accepted_values_error_message = message.into();
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

// ============================================================================
// VALIDATION RULES
// ============================================================================

#[derive(Debug, Clone)]
struct Filter {
    regex: Regex,
    message: String,
}

impl Filter {
    fn compile(field: &str, pattern: &str, message: &str) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|e| FormError::InvalidPattern {
            field: field.to_string(),
            pattern: pattern.to_string(),
            details: e.to_string(),
        })?;
        Ok(Self {
            regex,
            message: message.to_string(),
        })
    }
}

#[derive(Debug, Clone)]
struct AcceptedValues {
    values: Vec<String>,
    set: HashSet<String>,
    message: String,
}

/// Dependency edge: the field is enabled only while `field` holds one of
/// `values` (any value when `values` is empty).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostCondition {
    pub field: NodeId,
    pub values: Vec<String>,
}

impl PostCondition {
    pub fn allows(&self, value: &str) -> bool {
        self.values.is_empty() || self.values.iter().any(|v| v == value)
    }
}

// ============================================================================
// INPUT FIELD
// ============================================================================

/// Leaf input of a group tree.
#[derive(Debug)]
pub struct InputField {
    name: String,
    display_name: String,
    description: String,
    group_id: u32,
    input_type: InputType,

    value_from_file: bool,
    env_vars: Vec<String>,
    default_value: Option<String>,
    sensitive: bool,
    tags: Vec<String>,

    slot: Option<Arc<dyn ValueSlot>>,
    input_set: bool,

    accepted_values: Option<AcceptedValues>,
    inclusion_filter: Option<Filter>,
    exclusion_filter: Option<Filter>,

    pub(crate) post_conditions: Vec<PostCondition>,
    /// Fields that depend on this one, in the order they were added.
    pub(crate) inputs: Vec<NodeId>,

    env: Arc<dyn EnvProvider>,
}

impl InputField {
    /// Build a field from its attributes. Patterns are compiled here so a
    /// bad pattern fails before the field touches the graph.
    pub(crate) fn from_attributes(attrs: &FieldAttributes, env: Arc<dyn EnvProvider>) -> Result<Self> {
        let mut field = Self {
            name: attrs.name.clone(),
            display_name: if attrs.display_name.is_empty() {
                attrs.name.clone()
            } else {
                attrs.display_name.clone()
            },
            description: attrs.description.clone(),
            group_id: attrs.group_id,
            input_type: attrs.input_type,
            value_from_file: attrs.value_from_file,
            env_vars: attrs.env_vars.clone(),
            default_value: attrs.default_value.clone(),
            sensitive: attrs.sensitive,
            tags: attrs.tags.clone(),
            slot: None,
            input_set: false,
            accepted_values: None,
            inclusion_filter: None,
            exclusion_filter: None,
            post_conditions: Vec::new(),
            inputs: Vec::new(),
            env,
        };

        if let Some(pattern) = attrs.inclusion_filter.as_deref().filter(|p| !p.is_empty()) {
            field.set_inclusion_filter(pattern, &attrs.inclusion_filter_error_message)?;
        }
        if let Some(pattern) = attrs.exclusion_filter.as_deref().filter(|p| !p.is_empty()) {
            field.set_exclusion_filter(pattern, &attrs.exclusion_filter_error_message)?;
        }
        if let Some(values) = &attrs.accepted_values {
            field.set_accepted_values(values.clone(), &attrs.accepted_values_error_message);
        }

        Ok(field)
    }

    // ─────────────────────────────────────────────────────────────
    // Validation rules
    // ─────────────────────────────────────────────────────────────

    /// Values must match `pattern`; `message` is the error shown otherwise.
    pub fn set_inclusion_filter(&mut self, pattern: &str, message: &str) -> Result<()> {
        self.inclusion_filter = Some(Filter::compile(&self.name, pattern, message)?);
        Ok(())
    }

    /// Values must not match `pattern`; `message` is the error shown otherwise.
    pub fn set_exclusion_filter(&mut self, pattern: &str, message: &str) -> Result<()> {
        self.exclusion_filter = Some(Filter::compile(&self.name, pattern, message)?);
        Ok(())
    }

    /// Restrict values to `values`. An empty list removes the restriction.
    pub fn set_accepted_values(&mut self, values: Vec<String>, message: &str) {
        self.accepted_values = (!values.is_empty()).then(|| AcceptedValues {
            set: values.iter().cloned().collect(),
            values,
            message: message.to_string(),
        });
    }

    pub fn accepted_values(&self) -> Option<&[String]> {
        self.accepted_values.as_ref().map(|a| a.values.as_slice())
    }

    // ─────────────────────────────────────────────────────────────
    // Metadata
    // ─────────────────────────────────────────────────────────────

    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    /// A field with a default never needs input.
    pub fn optional(&self) -> bool {
        self.default_value.is_some()
    }

    pub fn sensitive(&self) -> bool {
        self.sensitive
    }

    pub fn env_vars(&self) -> &[String] {
        &self.env_vars
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn post_conditions(&self) -> &[PostCondition] {
        &self.post_conditions
    }

    /// True if no tag filter is given or the field carries any of `tags`.
    pub fn has_any_tag(&self, tags: &[&str]) -> bool {
        tags.is_empty() || self.tags.iter().any(|t| tags.contains(&t.as_str()))
    }

    // ─────────────────────────────────────────────────────────────
    // Binding
    // ─────────────────────────────────────────────────────────────

    /// Bind the field to caller storage. An empty scalar slot or an absent
    /// optional slot receives the default value, if there is one.
    pub fn bind(&mut self, slot: Arc<dyn ValueSlot>) {
        if slot.read().is_none() {
            if let Some(default) = &self.default_value {
                slot.write(Some(default.clone()));
            }
        }
        trace!(field = %self.name, shape = ?slot.shape(), "binding input field");
        self.slot = Some(slot);
    }

    /// Validate `value` and write it to the bound slot.
    pub fn set(&mut self, value: &str) -> Result<()> {
        let Some(slot) = self.slot.clone() else {
            return Err(FormError::NotBound {
                field: self.name.clone(),
            });
        };

        let value = if self.value_from_file {
            let content = fs::read_to_string(value).map_err(|source| FormError::FileSource {
                field: self.name.clone(),
                path: value.to_string(),
                source,
            })?;
            debug!(field = %self.name, path = value, "value sourced from file");
            content
        } else {
            value.to_string()
        };

        self.validate(&value)?;

        slot.write(Some(value));
        trace!(field = %self.name, "input field updated");
        Ok(())
    }

    /// Reset the bound slot to "no value" without validation.
    pub fn clear(&mut self) -> Result<()> {
        let slot = self.slot.as_ref().ok_or_else(|| FormError::NotBound {
            field: self.name.clone(),
        })?;
        slot.write(None);
        Ok(())
    }

    fn validate(&self, value: &str) -> Result<()> {
        let invalid = |message: &str| FormError::Validation {
            field: self.name.clone(),
            message: message.to_string(),
        };

        if let Some(accepted) = &self.accepted_values {
            if !accepted.set.contains(value) {
                return Err(invalid(&accepted.message));
            }
        }
        if let Some(filter) = &self.inclusion_filter {
            if !filter.regex.is_match(value) {
                return Err(invalid(&filter.message));
            }
        }
        if let Some(filter) = &self.exclusion_filter {
            if filter.regex.is_match(value) {
                return Err(invalid(&filter.message));
            }
        }
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────
    // Values
    // ─────────────────────────────────────────────────────────────

    /// Value held by the bound slot, ignoring the environment.
    pub fn bound_value(&self) -> Option<String> {
        self.slot.as_ref().and_then(|s| s.read())
    }

    /// Bound value, else (unless file-sourced) the first declared
    /// environment variable that is set.
    pub fn value(&self) -> Option<String> {
        if let Some(value) = self.bound_value() {
            return Some(value);
        }
        if self.value_from_file {
            return None;
        }

        let (name, value) = self.env.first_set(&self.env_vars)?;
        debug!(field = %self.name, env = name, "value sourced from environment");
        Some(value)
    }

    /// Whether a value can be returned: the slot holds one or any declared
    /// environment variable is set.
    pub fn has_value(&self) -> bool {
        self.bound_value().is_some() || self.env_vars.iter().any(|e| self.env.var(e).is_some())
    }

    /// Whether the value is read from a file, and the candidate file paths
    /// named by the field's environment variables.
    pub fn value_from_file(&self) -> (bool, Vec<String>) {
        let paths = self
            .env_vars
            .iter()
            .filter_map(|e| self.env.var(e))
            .filter(|p| Path::new(p).is_file())
            .collect();
        (self.value_from_file, paths)
    }

    pub fn input_set(&self) -> bool {
        self.input_set
    }

    /// Flag the field as explicitly entered.
    pub fn mark_input_set(&mut self) {
        self.input_set = true;
    }
}

impl Input for InputField {
    fn name(&self) -> &str {
        &self.name
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn long_description(&self) -> String {
        let mut text = self.description.clone();
        if !self.env_vars.is_empty() {
            let plural = if self.env_vars.len() > 1 { "s" } else { "" };
            text.push_str(&format!(
                " It will be sourced from the environment variable{} {} if not provided.",
                plural,
                self.env_vars.join(", ")
            ));
        }
        text
    }

    fn input_type(&self) -> InputType {
        self.input_type
    }

    fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    fn group_id(&self) -> u32 {
        self.group_id
    }
}
