//! Text reference of a group tree
//!
//! Renders every input with its description, alternatives separated by
//! "OR", optionally with current or default values.

use std::fmt;

use crate::config::PromptConfig;
use crate::field::InputField;
use crate::group::InputGroup;
use crate::node::{Input, Node};
use crate::types::NodeId;

/// What to show next to each field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShowOption {
    #[default]
    DescOnly,
    /// Current values; dependency conditions are evaluated, so only the
    /// inputs reachable with those values are listed
    DescAndValues,
    DescAndDefaults,
}

/// Render `group` as an indented text reference.
pub fn render_reference(
    group: &InputGroup,
    title: &str,
    option: ShowOption,
    config: &PromptConfig,
) -> String {
    Reference {
        group,
        title,
        option,
        config,
        tags: config.tags.iter().map(String::as_str).collect(),
    }
    .to_string()
}

struct Reference<'a> {
    group: &'a InputGroup,
    title: &'a str,
    option: ShowOption,
    config: &'a PromptConfig,
    tags: Vec<&'a str>,
}

const INDENT: usize = 2;

impl fmt::Display for Reference<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", "=".repeat(self.title.chars().count()))?;
        writeln!(f)?;
        if !self.group.description().is_empty() {
            writeln!(f, "{}", wrap(self.group.description(), 0, self.config.width))?;
            writeln!(f)?;
        }
        self.write_inputs(f, self.group.inputs(), 0)
    }
}

impl Reference<'_> {
    fn visible(&self, ids: &[NodeId]) -> Vec<NodeId> {
        let evaluate = self.option == ShowOption::DescAndValues;
        ids.iter()
            .copied()
            .filter(|&id| self.group.node_enabled(id, evaluate, &self.tags))
            .collect()
    }

    fn write_inputs(&self, f: &mut fmt::Formatter<'_>, ids: &[NodeId], level: usize) -> fmt::Result {
        let visible = self.visible(ids);
        let name_width = visible
            .iter()
            .filter_map(|&id| self.group.field_by_id(id))
            .map(|field| field.display_name().chars().count())
            .max()
            .unwrap_or(0);

        for id in visible {
            match self.group.node(id) {
                Some(Node::Container(container)) => {
                    self.write_container(f, container.description(), container.inputs(), level)?
                }
                Some(Node::Field(field)) => {
                    self.write_field(f, field, level, name_width)?;
                    self.write_inputs(f, field.inputs(), level)?;
                }
                None => {}
            }
        }
        Ok(())
    }

    fn write_container(
        &self,
        f: &mut fmt::Formatter<'_>,
        description: &str,
        ids: &[NodeId],
        level: usize,
    ) -> fmt::Result {
        let pad = " ".repeat(level * INDENT);
        let inner = " ".repeat((level + 1) * INDENT);
        writeln!(f, "{pad}* Provide one of the following for:")?;
        writeln!(f)?;
        writeln!(
            f,
            "{inner}{}",
            wrap(description, (level + 1) * INDENT, self.config.width)
        )?;

        for (i, id) in self.visible(ids).into_iter().enumerate() {
            if i > 0 {
                writeln!(f, "{inner}OR")?;
            }
            self.write_inputs(f, &[id], level + 1)?;
        }
        writeln!(f)
    }

    fn write_field(
        &self,
        f: &mut fmt::Formatter<'_>,
        field: &InputField,
        level: usize,
        name_width: usize,
    ) -> fmt::Result {
        let mut line = format!(
            "{}* {:<width$}",
            " ".repeat(level * INDENT),
            field.display_name(),
            width = name_width
        );

        if self.option == ShowOption::DescAndValues {
            line.push_str(" = ");
            let column = line.chars().count();
            let value = match field.value() {
                Some(_) if field.sensitive() => self.config.mask.clone(),
                Some(value) => wrap(&value, column, self.config.width),
                None => "[no data]".to_string(),
            };
            writeln!(f)?;
            writeln!(f, "{line}{value}")?;
            return writeln!(
                f,
                "{}{}",
                " ".repeat(column),
                wrap(&field.long_description(), column, self.config.width)
            );
        }

        line.push_str(" - ");
        let column = line.chars().count();
        writeln!(f)?;
        writeln!(
            f,
            "{line}{}",
            wrap(&field.long_description(), column, self.config.width)
        )?;

        if self.option == ShowOption::DescAndDefaults && self.config.show_defaults {
            if let Some(default) = field.default_value() {
                let shown = if field.sensitive() {
                    self.config.mask.as_str()
                } else {
                    default
                };
                writeln!(
                    f,
                    "{}{}",
                    " ".repeat(column),
                    wrap(&format!("(Default value = '{shown}')"), column, self.config.width)
                )?;
            }
        }
        Ok(())
    }
}

/// Greedy word wrap. The first line is assumed to start at column `indent`;
/// continuation lines are indented to it.
pub fn wrap(text: &str, indent: usize, width: usize) -> String {
    let available = width.saturating_sub(indent).max(20);
    let mut lines: Vec<String> = Vec::new();

    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > available {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }

    lines.join(&format!("\n{}", " ".repeat(indent)))
}
