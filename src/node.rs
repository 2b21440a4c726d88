//! Graph nodes
//!
//! A group tree holds two kinds of node: containers (the root, and the
//! "pick one of" sets keyed by group id) and fields. Both answer the
//! `Input` interface; `Node` is the tagged variant stored in the arena.

use crate::field::InputField;
use crate::types::{InputType, NodeId};

/// Interface shared by every node of a group tree.
pub trait Input {
    fn name(&self) -> &str;
    fn display_name(&self) -> &str;
    fn description(&self) -> &str;

    /// Help text; fields append where their value may be sourced from.
    fn long_description(&self) -> String {
        self.description().to_string()
    }

    fn input_type(&self) -> InputType;

    /// Ordered children.
    fn inputs(&self) -> &[NodeId];

    /// 0 unless the node is the container of a group of alternatives.
    fn group_id(&self) -> u32;
}

/// Composite node: the root of a tree or a set of alternatives.
#[derive(Debug, Clone)]
pub struct InputContainer {
    pub(crate) name: String,
    pub(crate) display_name: String,
    pub(crate) description: String,
    pub(crate) group_id: u32,
    pub(crate) inputs: Vec<NodeId>,
}

impl InputContainer {
    pub(crate) fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        description: impl Into<String>,
        group_id: u32,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            description: description.into(),
            group_id,
            inputs: Vec::new(),
        }
    }
}

impl Input for InputContainer {
    fn name(&self) -> &str {
        &self.name
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_type(&self) -> InputType {
        InputType::Container
    }

    fn inputs(&self) -> &[NodeId] {
        &self.inputs
    }

    fn group_id(&self) -> u32 {
        self.group_id
    }
}

/// Arena entry.
#[derive(Debug)]
pub enum Node {
    Container(InputContainer),
    Field(Box<InputField>),
}

impl Node {
    pub fn as_field(&self) -> Option<&InputField> {
        match self {
            Node::Field(field) => Some(field.as_ref()),
            Node::Container(_) => None,
        }
    }

    pub fn as_container(&self) -> Option<&InputContainer> {
        match self {
            Node::Container(container) => Some(container),
            Node::Field(_) => None,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Node::Container(_))
    }

    fn as_input(&self) -> &dyn Input {
        match self {
            Node::Container(container) => container,
            Node::Field(field) => field.as_ref(),
        }
    }

    pub(crate) fn inputs_mut(&mut self) -> &mut Vec<NodeId> {
        match self {
            Node::Container(container) => &mut container.inputs,
            Node::Field(field) => &mut field.inputs,
        }
    }
}

impl Input for Node {
    fn name(&self) -> &str {
        self.as_input().name()
    }

    fn display_name(&self) -> &str {
        self.as_input().display_name()
    }

    fn description(&self) -> &str {
        self.as_input().description()
    }

    fn long_description(&self) -> String {
        self.as_input().long_description()
    }

    fn input_type(&self) -> InputType {
        self.as_input().input_type()
    }

    fn inputs(&self) -> &[NodeId] {
        self.as_input().inputs()
    }

    fn group_id(&self) -> u32 {
        self.as_input().group_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_reports_container_type() {
        let container = InputContainer::new("creds", "Credentials", "How to log in", 1);
        let node = Node::Container(container);

        assert_eq!(node.input_type(), InputType::Container);
        assert_eq!(node.group_id(), 1);
        assert_eq!(node.long_description(), "How to log in");
        assert!(node.as_container().is_some());
        assert!(node.as_field().is_none());
    }
}
