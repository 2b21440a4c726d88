//! Form definition files
//!
//! A YAML document describing one group:
//!
//! ```yaml
//! name: cloud
//! description: Cloud credentials
//! containers:
//!   - name: auth
//!     display_name: Authentication
//!     description: How to log in
//!     group_id: 1
//! fields:
//!   - name: password
//!     group_id: 1
//!     sensitive: true
//!   - name: token
//!     group_id: 1
//!     env_vars: [CLOUD_TOKEN]
//! hints:
//!   region: ["field://regions/available"]
//! ```
//!
//! Containers are registered first, then fields in document order, then
//! hints. The first construction error aborts the build.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::collection::{InputCollection, SharedGroup};
use crate::env::EnvProvider;
use crate::error::Result;
use crate::field::FieldAttributes;
use crate::group::InputGroup;

/// A container of alternatives.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContainerDefinition {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    pub group_id: u32,
}

/// A group tree as written in a definition file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub containers: Vec<ContainerDefinition>,
    #[serde(default)]
    pub fields: Vec<FieldAttributes>,
    /// field name → hint URIs
    #[serde(default)]
    pub hints: BTreeMap<String, Vec<String>>,
}

impl FormDefinition {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let yaml = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&yaml)
    }

    /// Build the group tree, reading environment fallbacks from `env`.
    pub fn build(&self, env: Arc<dyn EnvProvider>) -> Result<InputGroup> {
        let mut group = InputGroup::with_env(&self.name, &self.description, env);

        for container in &self.containers {
            let display_name = if container.display_name.is_empty() {
                &container.name
            } else {
                &container.display_name
            };
            group.new_container(
                &container.name,
                display_name,
                &container.description,
                container.group_id,
            )?;
        }
        for field in &self.fields {
            group.add_field(field.clone())?;
        }
        for (field, hints) in &self.hints {
            for hint in hints {
                group.add_field_hint(field, hint)?;
            }
        }

        debug!(
            group = %self.name,
            fields = self.fields.len(),
            containers = self.containers.len(),
            "form definition built"
        );
        Ok(group)
    }

    /// Build the group and register it in `collection` under its name.
    pub fn register(&self, collection: &InputCollection) -> Result<SharedGroup> {
        let group = self.build(Arc::clone(collection.env()))?;
        Ok(collection.insert(self.name.clone(), group))
    }
}
