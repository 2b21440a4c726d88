//! Dependency wiring
//!
//! Resolution runs against a snapshot of the fields reachable from the
//! root before anything is modified, so a field with several prerequisites
//! is either wired to all of them or to none.

use std::collections::HashMap;

use super::InputGroup;
use crate::error::{FormError, Result};
use crate::field::PostCondition;
use crate::node::Input;
use crate::types::{Dependency, NodeId};

impl InputGroup {
    /// Resolve every dependency of `field` to a post-condition.
    ///
    /// All names that match no reachable field are reported together. A
    /// name listed twice is wired once, with the values of its last entry.
    pub(super) fn resolve_dependencies(
        &self,
        field: &str,
        dependencies: &[Dependency],
    ) -> Result<Vec<PostCondition>> {
        let reachable: HashMap<&str, NodeId> = self
            .input_field_ids()
            .into_iter()
            .filter_map(|id| self.node(id).map(|node| (node.name(), id)))
            .collect();

        let mut conditions: Vec<PostCondition> = Vec::with_capacity(dependencies.len());
        let mut missing = Vec::new();

        for dep in dependencies {
            let Some(&id) = reachable.get(dep.name.as_str()) else {
                if !missing.contains(&dep.name) {
                    missing.push(dep.name.clone());
                }
                continue;
            };

            match conditions.iter_mut().find(|c| c.field == id) {
                Some(existing) => existing.values = dep.values.clone(),
                None => conditions.push(PostCondition {
                    field: id,
                    values: dep.values.clone(),
                }),
            }
        }

        if !missing.is_empty() {
            return Err(FormError::DependenciesNotFound {
                field: field.to_string(),
                missing,
            });
        }
        Ok(conditions)
    }

    /// Link `field` under `parent`, through the container of its group id
    /// when it has one. The container joins the parent's children once and
    /// holds each field once.
    pub(super) fn attach(&mut self, parent: NodeId, field: NodeId, group_id: u32) {
        let child = match self.container(group_id) {
            Some(container) if group_id > 0 => {
                push_unique(self.nodes[container.index()].inputs_mut(), field);
                container
            }
            _ => field,
        };
        push_unique(self.nodes[parent.index()].inputs_mut(), child);
    }
}

fn push_unique(inputs: &mut Vec<NodeId>, id: NodeId) {
    if !inputs.contains(&id) {
        inputs.push(id);
    }
}
