//! Input groups: one arena per group tree
//!
//! An `InputGroup` owns every node of its tree. Node 0 is the root
//! container; containers for alternatives and fields are appended as they
//! are registered and addressed by `NodeId` from then on. The tree is
//! append-only: nodes are never removed and children lists only grow.

mod wiring;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::binding::{JsonRecord, RecordEntry, ValueSlot};
use crate::env::{EnvProvider, ProcessEnv};
use crate::error::{FormError, Result};
use crate::field::{FieldAttributes, InputField};
use crate::hint::FieldHint;
use crate::node::{Input, InputContainer, Node};
use crate::types::{Dependency, InputType, NodeId};

/// Arena holding one group tree.
#[derive(Debug)]
pub struct InputGroup {
    nodes: Vec<Node>,
    /// Flat name index over the whole tree
    field_names: HashMap<String, NodeId>,
    /// group id → container
    containers: HashMap<u32, NodeId>,
    pub(crate) hints: HashMap<String, Vec<FieldHint>>,
    env: Arc<dyn EnvProvider>,
}

impl InputGroup {
    /// New empty group reading the process environment.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::with_env(name, description, Arc::new(ProcessEnv))
    }

    pub fn with_env(
        name: impl Into<String>,
        description: impl Into<String>,
        env: Arc<dyn EnvProvider>,
    ) -> Self {
        let name = name.into();
        let root = InputContainer::new(name.clone(), name, description, 0);
        Self {
            nodes: vec![Node::Container(root)],
            field_names: HashMap::new(),
            containers: HashMap::new(),
            hints: HashMap::new(),
            env,
        }
    }

    pub fn env(&self) -> &Arc<dyn EnvProvider> {
        &self.env
    }

    // ─────────────────────────────────────────────────────────────
    // Nodes
    // ─────────────────────────────────────────────────────────────

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn field_by_id(&self, id: NodeId) -> Option<&InputField> {
        self.node(id).and_then(Node::as_field)
    }

    pub fn field_by_id_mut(&mut self, id: NodeId) -> Option<&mut InputField> {
        match self.nodes.get_mut(id.index()) {
            Some(Node::Field(field)) => Some(field.as_mut()),
            _ => None,
        }
    }

    /// Children of `id`, empty for unknown ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.inputs()).unwrap_or_default()
    }

    /// Number of nodes including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.field_names.is_empty()
    }

    // ─────────────────────────────────────────────────────────────
    // Construction
    // ─────────────────────────────────────────────────────────────

    /// Register the container collecting all fields with `group_id`.
    ///
    /// Must be called before any field with that id is added.
    pub fn new_container(
        &mut self,
        name: impl Into<String>,
        display_name: impl Into<String>,
        description: impl Into<String>,
        group_id: u32,
    ) -> Result<NodeId> {
        let name = name.into();
        if group_id == 0 {
            return Err(FormError::InvalidGroupId { name });
        }
        if self.containers.contains_key(&group_id) {
            return Err(FormError::DuplicateContainer { group_id });
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::Container(InputContainer::new(
            name,
            display_name,
            description,
            group_id,
        )));
        self.containers.insert(group_id, id);
        Ok(id)
    }

    /// Container registered for `group_id`.
    pub fn container(&self, group_id: u32) -> Option<NodeId> {
        self.containers.get(&group_id).copied()
    }

    /// Add a field. Without dependencies it hangs off the root; otherwise
    /// it becomes a child of every prerequisite and is gated by their values.
    ///
    /// Nothing is modified unless every check passes.
    pub fn add_field(&mut self, attrs: FieldAttributes) -> Result<NodeId> {
        if self.field_names.contains_key(&attrs.name) {
            return Err(FormError::DuplicateField { name: attrs.name });
        }

        let dependencies = attrs
            .depends_on
            .iter()
            .map(|expr| Dependency::parse(&attrs.name, expr))
            .collect::<Result<Vec<_>>>()?;

        if attrs.group_id > 0 && !self.containers.contains_key(&attrs.group_id) {
            return Err(FormError::UnknownGroupId {
                field: attrs.name,
                group_id: attrs.group_id,
            });
        }

        let mut field = InputField::from_attributes(&attrs, Arc::clone(&self.env))?;
        let conditions = self.resolve_dependencies(&attrs.name, &dependencies)?;

        let parents: Vec<NodeId> = if conditions.is_empty() {
            vec![NodeId::ROOT]
        } else {
            conditions.iter().map(|c| c.field).collect()
        };
        field.post_conditions = conditions;

        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::Field(Box::new(field)));
        self.field_names.insert(attrs.name.clone(), id);
        for parent in parents {
            self.attach(parent, id, attrs.group_id);
        }

        debug!(field = %attrs.name, id = %id, "input field added");
        Ok(id)
    }

    // ─────────────────────────────────────────────────────────────
    // Lookup
    // ─────────────────────────────────────────────────────────────

    pub fn field_id(&self, name: &str) -> Result<NodeId> {
        self.field_names
            .get(name)
            .copied()
            .ok_or_else(|| FormError::FieldNotFound {
                name: name.to_string(),
            })
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.field_names.contains_key(name)
    }

    pub fn field(&self, name: &str) -> Result<&InputField> {
        let id = self.field_id(name)?;
        self.field_by_id(id).ok_or_else(|| FormError::FieldNotFound {
            name: name.to_string(),
        })
    }

    pub fn field_mut(&mut self, name: &str) -> Result<&mut InputField> {
        let id = self.field_id(name)?;
        self.field_by_id_mut(id).ok_or_else(|| FormError::FieldNotFound {
            name: name.to_string(),
        })
    }

    pub fn field_value(&self, name: &str) -> Result<Option<String>> {
        Ok(self.field(name)?.value())
    }

    pub fn set_field_value(&mut self, name: &str, value: &str) -> Result<()> {
        self.field_mut(name)?.set(value)
    }

    // ─────────────────────────────────────────────────────────────
    // Binding
    // ─────────────────────────────────────────────────────────────

    pub fn bind_field(&mut self, name: &str, slot: Arc<dyn ValueSlot>) -> Result<()> {
        self.field_mut(name)?.bind(slot);
        Ok(())
    }

    /// Bind every member of `record` named like a field. Members that match
    /// no field are ignored. Returns the number of fields bound.
    pub fn bind_fields(&mut self, record: &JsonRecord) -> Result<usize> {
        let mut bound = 0;
        for (name, entry) in record.entries() {
            if !self.has_field(&name) {
                continue;
            }
            match entry {
                RecordEntry::Slot(slot) => {
                    self.bind_field(&name, slot)?;
                    bound += 1;
                }
                RecordEntry::Unsupported(shape) => {
                    return Err(FormError::UnsupportedSlot {
                        field: name,
                        shape: shape.to_string(),
                    });
                }
            }
        }
        Ok(bound)
    }

    // ─────────────────────────────────────────────────────────────
    // Enablement
    // ─────────────────────────────────────────────────────────────

    /// Whether node `id` should be offered.
    ///
    /// Containers are always enabled. A field must carry one of `tags` (when
    /// any are given). With `evaluate`, a field with post-conditions is
    /// enabled only if the first prerequisite that has a value holds one of
    /// the allowed values; prerequisites without a value are skipped.
    pub fn node_enabled(&self, id: NodeId, evaluate: bool, tags: &[&str]) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        let Node::Field(field) = node else {
            return true;
        };

        if !field.has_any_tag(tags) {
            return false;
        }
        if !evaluate || field.post_conditions.is_empty() {
            return true;
        }

        field
            .post_conditions
            .iter()
            .find_map(|condition| {
                self.field_by_id(condition.field)
                    .and_then(InputField::value)
                    .map(|value| condition.allows(&value))
            })
            .unwrap_or(false)
    }

    pub fn enabled(&self, name: &str, evaluate: bool, tags: &[&str]) -> Result<bool> {
        Ok(self.node_enabled(self.field_id(name)?, evaluate, tags))
    }

    /// Children of `id` that are enabled.
    pub fn enabled_inputs(&self, id: NodeId, evaluate: bool, tags: &[&str]) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&child| self.node_enabled(child, evaluate, tags))
            .collect()
    }

    // ─────────────────────────────────────────────────────────────
    // Results
    // ─────────────────────────────────────────────────────────────

    /// Ids of all fields in the tree, depth-first in children order, each once.
    pub fn input_field_ids(&self) -> Vec<NodeId> {
        let mut ids = Vec::new();
        let mut seen = HashSet::new();
        self.collect_fields(NodeId::ROOT, &mut seen, &mut ids);
        ids
    }

    fn collect_fields(&self, id: NodeId, seen: &mut HashSet<NodeId>, ids: &mut Vec<NodeId>) {
        for &child in self.children(id) {
            match self.node(child) {
                Some(Node::Container(_)) => self.collect_fields(child, seen, ids),
                Some(Node::Field(_)) if seen.insert(child) => {
                    ids.push(child);
                    self.collect_fields(child, seen, ids);
                }
                _ => {}
            }
        }
    }

    pub fn input_fields(&self) -> Vec<&InputField> {
        self.input_field_ids()
            .into_iter()
            .filter_map(|id| self.field_by_id(id))
            .collect()
    }

    /// Values of all fields that were explicitly input.
    pub fn input_values(&self) -> BTreeMap<String, String> {
        self.input_fields()
            .into_iter()
            .filter(|f| f.input_set())
            .map(|f| (f.name().to_string(), f.value().unwrap_or_default()))
            .collect()
    }
}

impl Input for InputGroup {
    fn name(&self) -> &str {
        self.nodes[0].name()
    }

    fn display_name(&self) -> &str {
        self.nodes[0].display_name()
    }

    fn description(&self) -> &str {
        self.nodes[0].description()
    }

    fn input_type(&self) -> InputType {
        InputType::Container
    }

    fn inputs(&self) -> &[NodeId] {
        self.nodes[0].inputs()
    }

    fn group_id(&self) -> u32 {
        0
    }
}
