//! Error types with fix suggestions
//!
//! One error enum covers the whole model. Builder, binding and lookup
//! failures carry a stable `FORM-0xx` prefix; validation failures display
//! only the message configured on the field so a driver can show it as-is.

use thiserror::Error;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

#[derive(Error, Debug)]
pub enum FormError {
    // ─────────────────────────────────────────────────────────────
    // Construction errors (FORM-010 to FORM-017)
    // ─────────────────────────────────────────────────────────────
    #[error("FORM-010: a field with name '{name}' has already been added")]
    DuplicateField { name: String },

    #[error("FORM-011: a container for group '{group_id}' has already been added")]
    DuplicateContainer { group_id: u32 },

    #[error("FORM-012: container '{name}' must have a group id greater than 0")]
    InvalidGroupId { name: String },

    #[error("FORM-013: unable to add field '{field}' as its group '{group_id}' was not found")]
    UnknownGroupId { field: String, group_id: u32 },

    #[error("FORM-014: field '{field}' has a dependency '{expr}' that does not conform to format 'name[=value1|value2]'")]
    MalformedDependency { field: String, expr: String },

    #[error("FORM-015: unable to add field '{field}' as dependent field(s) {missing:?} not found")]
    DependenciesNotFound { field: String, missing: Vec<String> },

    #[error("FORM-016: invalid pattern '{pattern}' for field '{field}': {details}")]
    InvalidPattern {
        field: String,
        pattern: String,
        details: String,
    },

    #[error("FORM-017: hint '{hint}' must be a url with prefix http(s)://, file:// or field://")]
    InvalidHint { hint: String },

    // ─────────────────────────────────────────────────────────────
    // Binding errors (FORM-020 to FORM-022)
    // ─────────────────────────────────────────────────────────────
    #[error("FORM-020: the value bound to field '{field}' must be a string or null, found {shape}")]
    UnsupportedSlot { field: String, shape: String },

    #[error("FORM-021: field '{field}' has not been bound to a value slot")]
    NotBound { field: String },

    #[error("FORM-022: unable to read value of field '{field}' from file '{path}': {source}")]
    FileSource {
        field: String,
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // Validation errors
    // ─────────────────────────────────────────────────────────────
    /// Displays only the field's configured message.
    #[error("{message}")]
    Validation { field: String, message: String },

    // ─────────────────────────────────────────────────────────────
    // Lookup errors (FORM-030 to FORM-031)
    // ─────────────────────────────────────────────────────────────
    #[error("FORM-030: field '{name}' was not found in form")]
    FieldNotFound { name: String },

    #[error("FORM-031: group '{name}' was not found in collection")]
    GroupNotFound { name: String },

    // ─────────────────────────────────────────────────────────────
    // Cursor errors (FORM-040 to FORM-043)
    // ─────────────────────────────────────────────────────────────
    #[error("FORM-040: field '{name}' is not the input the cursor is positioned at")]
    NotCurrentInput { name: String },

    #[error("FORM-041: the input cursor has no more inputs")]
    CursorExhausted,

    #[error("FORM-042: field '{field}' has no saved value to accept")]
    NoSavedValue { field: String },

    #[error("FORM-043: input aborted before the form was complete")]
    PromptAborted,

    // ─────────────────────────────────────────────────────────────
    // Hint resolution errors (FORM-050 to FORM-053)
    // ─────────────────────────────────────────────────────────────
    #[error("FORM-050: hint '{hint}' uses a protocol that is not implemented")]
    HintNotImplemented { hint: String },

    #[error("FORM-051: error parsing json value of field '{field}': {details}")]
    HintJson { field: String, details: String },

    #[error("FORM-052: path '{path}' is not supported (use a/b/0, a.b[0] or $.a.b)")]
    JsonPathUnsupported { path: String },

    #[error("FORM-053: path '{path}' matched nothing in the value of field '{field}'")]
    JsonPathNoMatch { path: String, field: String },

    // ─────────────────────────────────────────────────────────────
    // Definition files
    // ─────────────────────────────────────────────────────────────
    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FormError {
    /// Validation failures are recoverable by asking for the value again.
    pub fn is_validation(&self) -> bool {
        matches!(self, FormError::Validation { .. })
    }
}

impl FixSuggestion for FormError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            FormError::DuplicateField { .. } => {
                Some("Field names are shared by the whole group tree; pick a unique name")
            }
            FormError::DuplicateContainer { .. } => {
                Some("Register each group id with a single container")
            }
            FormError::InvalidGroupId { .. } => Some("Use a group id of 1 or more for containers"),
            FormError::UnknownGroupId { .. } => {
                Some("Create the container for this group id before adding its fields")
            }
            FormError::MalformedDependency { .. } => {
                Some("Use 'name' or 'name=value1|value2' in depends_on")
            }
            FormError::DependenciesNotFound { .. } => {
                Some("Declare prerequisite fields before the fields that depend on them")
            }
            FormError::InvalidPattern { .. } => Some("Check the regular expression syntax"),
            FormError::InvalidHint { .. } => {
                Some("Use field://<field>/<path>, http(s)://<host>/<path> or file:///<path>")
            }
            FormError::UnsupportedSlot { .. } => {
                Some("Bind fields to string or null values only")
            }
            FormError::NotBound { .. } => Some("Bind the field to a value slot before setting it"),
            FormError::FileSource { .. } => Some("Check the file path and permissions"),
            FormError::Validation { .. } => None,
            FormError::FieldNotFound { .. } => Some("Check the field name for typos"),
            FormError::GroupNotFound { .. } => Some("Create the group in the collection first"),
            FormError::NotCurrentInput { .. } => {
                Some("Only the field the cursor points at (or one of its alternatives) can be set")
            }
            FormError::CursorExhausted => None,
            FormError::NoSavedValue { .. } => Some("Enter a new value instead of [saved]"),
            FormError::PromptAborted => None,
            FormError::HintNotImplemented { .. } => Some("Use a field:// hint instead"),
            FormError::HintJson { .. } => {
                Some("Ensure the referenced field holds a valid JSON document")
            }
            FormError::JsonPathUnsupported { .. } => {
                Some("Use simple paths like key/sub/0 or $.key.sub[0]")
            }
            FormError::JsonPathNoMatch { .. } => {
                Some("Check the path exists in the referenced field's JSON value")
            }
            FormError::YamlParse(_) => Some("Check YAML syntax: indentation and quoting"),
            FormError::Io(_) => Some("Check file path and permissions"),
        }
    }
}

pub type Result<T> = std::result::Result<T, FormError>;
