//! Traversal of a group tree
//!
//! `InputCursor` walks a group depth-first in declaration order and stops
//! at each input that should be asked for next. A field's dependents are
//! only queued once the field has been input, so the walk follows the
//! values entered so far.
//!
//! Containers collapse: with a single enabled alternative the cursor stops
//! at that field, with several it stops at the container so the caller can
//! offer a choice, with none it skips the container.

use std::collections::HashSet;

use tracing::trace;

use crate::error::{FormError, Result};
use crate::group::InputGroup;
use crate::node::{Input, Node};
use crate::types::NodeId;

/// Cursor over one group tree. Dropping it cancels the traversal; values
/// already set stay in their slots.
#[derive(Debug)]
pub struct InputCursor<'a> {
    group: &'a mut InputGroup,
    tags: Vec<String>,
    /// Nodes still to visit, next on top
    pending: Vec<NodeId>,
    current: Option<NodeId>,
    /// Fields already input in this traversal
    seen: HashSet<NodeId>,
    /// Containers one of whose alternatives was input
    chosen: HashSet<NodeId>,
}

impl<'a> InputCursor<'a> {
    /// Cursor positioned at the first input of `group`. Only fields
    /// carrying one of `tags` are visited, unless `tags` is empty.
    pub fn new<I, S>(group: &'a mut InputGroup, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let pending = group.inputs().iter().rev().copied().collect();
        let mut cursor = Self {
            group,
            tags: tags.into_iter().map(Into::into).collect(),
            pending,
            current: None,
            seen: HashSet::new(),
            chosen: HashSet::new(),
        };
        cursor.next_input();
        cursor
    }

    pub fn group(&self) -> &InputGroup {
        self.group
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// Node the cursor is positioned at.
    pub fn current(&self) -> Option<NodeId> {
        self.current
    }

    pub fn current_input(&self) -> Result<&Node> {
        self.current
            .and_then(|id| self.group.node(id))
            .ok_or(FormError::CursorExhausted)
    }

    pub fn is_exhausted(&self) -> bool {
        self.current.is_none()
    }

    /// Fields that may be input at the current position: the current field,
    /// or the enabled alternatives of the current container.
    pub fn alternatives(&self) -> Vec<NodeId> {
        match self.current {
            Some(id) if self.is_container(id) => self.open_alternatives(id),
            Some(id) => vec![id],
            None => Vec::new(),
        }
    }

    /// Move to the next input to ask for and return it.
    pub fn next_input(&mut self) -> Option<NodeId> {
        self.current = None;

        while let Some(id) = self.pending.pop() {
            if self.chosen.contains(&id) {
                continue;
            } else if self.is_container(id) {
                let alternatives = self.open_alternatives(id);
                match alternatives.as_slice() {
                    [] => continue,
                    [only] => self.current = Some(*only),
                    _ => self.current = Some(id),
                }
            } else if !self.seen.contains(&id) && self.enabled(id) {
                self.current = Some(id);
            } else {
                continue;
            }
            break;
        }

        trace!(current = ?self.current, "cursor advanced");
        self.current
    }

    /// Set the field `name` at the current position to `value` and advance.
    ///
    /// A failed set leaves the cursor where it is.
    pub fn set_input(&mut self, name: &str, value: &str) -> Result<Option<NodeId>> {
        let id = self.target(name)?;
        if let Some(field) = self.group.field_by_id_mut(id) {
            field.set(value)?;
        }
        Ok(self.complete(id))
    }

    /// Accept the value already bound to the field `name` and advance.
    ///
    /// This is the `[saved]` answer for file-sourced fields, but any field
    /// holding a bound value (a default, or a value written by the caller)
    /// is accepted. A field with nothing bound fails with `NoSavedValue`;
    /// environment fallbacks do not count.
    pub fn set_default_input(&mut self, name: &str) -> Result<Option<NodeId>> {
        let id = self.target(name)?;
        let saved = self
            .group
            .field_by_id(id)
            .is_some_and(|field| field.bound_value().is_some());
        if !saved {
            return Err(FormError::NoSavedValue {
                field: name.to_string(),
            });
        }
        Ok(self.complete(id))
    }

    fn target(&self, name: &str) -> Result<NodeId> {
        if self.current.is_none() {
            return Err(FormError::CursorExhausted);
        }
        let id = self.group.field_id(name)?;
        if self.alternatives().contains(&id) {
            Ok(id)
        } else {
            Err(FormError::NotCurrentInput {
                name: name.to_string(),
            })
        }
    }

    fn complete(&mut self, id: NodeId) -> Option<NodeId> {
        if let Some(field) = self.group.field_by_id_mut(id) {
            field.mark_input_set();
            let group_id = field.group_id();
            if let Some(container) = self.group.container(group_id) {
                self.chosen.insert(container);
            }
        }
        self.seen.insert(id);
        self.pending
            .extend(self.group.children(id).iter().rev().copied());
        self.next_input()
    }

    fn is_container(&self, id: NodeId) -> bool {
        self.group.node(id).is_some_and(Node::is_container)
    }

    fn enabled(&self, id: NodeId) -> bool {
        let tags: Vec<&str> = self.tags.iter().map(String::as_str).collect();
        self.group.node_enabled(id, true, &tags)
    }

    fn open_alternatives(&self, container: NodeId) -> Vec<NodeId> {
        self.group
            .children(container)
            .iter()
            .copied()
            .filter(|id| !self.seen.contains(id) && self.enabled(*id))
            .collect()
    }
}
