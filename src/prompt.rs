//! Line-based prompt driver
//!
//! Walks a group with an `InputCursor`, printing each input and reading
//! answers one line at a time. Works on any `BufRead`/`Write` pair so it
//! can drive a terminal or a test buffer.
//!
//! - Containers with several alternatives print a numbered list; the
//!   answer selects the field to ask for.
//! - An empty answer keeps the current value (bound, default or
//!   environment). File-sourced fields accept `[saved]` for the bound value.
//! - Invalid answers print the field's message and ask again.

use std::io::{BufRead, Write};

use tracing::debug;

use crate::config::PromptConfig;
use crate::cursor::InputCursor;
use crate::error::{FormError, Result};
use crate::group::InputGroup;
use crate::node::{Input, Node};
use crate::reference::wrap;
use crate::types::NodeId;

/// Answer selecting the value already bound to a file-sourced field.
pub const SAVED: &str = "[saved]";

pub struct TextPrompter<R, W> {
    input: R,
    output: W,
    config: PromptConfig,
}

/// What a field is asked with, copied out of the group so the cursor can
/// be advanced while it is in use.
struct FieldPrompt {
    name: String,
    display_name: String,
    sensitive: bool,
    from_file: bool,
    saved: bool,
    current: Option<String>,
    candidates: Vec<String>,
}

impl<R: BufRead, W: Write> TextPrompter<R, W> {
    pub fn new(input: R, output: W, config: PromptConfig) -> Self {
        Self {
            input,
            output,
            config,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Ask for every input of `group` until the traversal is complete.
    pub fn run(&mut self, group: &mut InputGroup, title: &str) -> Result<()> {
        let width = self.config.width;
        writeln!(self.output, "{title}")?;
        writeln!(self.output, "{}", "=".repeat(title.chars().count()))?;
        writeln!(self.output)?;
        if !group.description().is_empty() {
            writeln!(self.output, "{}", wrap(group.description(), 0, width))?;
        }
        writeln!(self.output, "{}", "=".repeat(width))?;
        writeln!(self.output)?;

        let mut cursor = InputCursor::new(group, self.config.tags.clone());
        while let Some(current) = cursor.current() {
            let field = match cursor.group().node(current) {
                Some(Node::Container(container)) => {
                    let description = container.description().to_string();
                    self.select(&cursor, &description)?
                }
                Some(Node::Field(field)) => {
                    self.describe(field.display_name(), &field.long_description(), "")?;
                    current
                }
                None => break,
            };
            self.ask(&mut cursor, field)?;
        }
        Ok(())
    }

    fn describe(&mut self, name: &str, description: &str, bullet: &str) -> Result<()> {
        let head = format!("{bullet}{name} - ");
        let column = head.chars().count();
        writeln!(
            self.output,
            "{head}{}",
            wrap(description, column, self.config.width)
        )?;
        writeln!(self.output, "{}", "-".repeat(self.config.width))?;
        Ok(())
    }

    /// Print the alternatives of the current container and read a choice.
    fn select(&mut self, cursor: &InputCursor<'_>, description: &str) -> Result<NodeId> {
        writeln!(self.output, "{description}")?;
        writeln!(self.output, "{}", "=".repeat(self.config.width))?;

        let alternatives = cursor.alternatives();
        for (i, &id) in alternatives.iter().enumerate() {
            if let Some(field) = cursor.group().field_by_id(id) {
                self.describe(
                    field.display_name(),
                    &field.long_description(),
                    &format!("{}. ", i + 1),
                )?;
            }
        }

        loop {
            let answer = self.read_line("Please select one of the above ? ")?;
            match answer.trim().parse::<usize>() {
                Ok(n) if (1..=alternatives.len()).contains(&n) => {
                    writeln!(self.output, "{}", "-".repeat(self.config.width))?;
                    return Ok(alternatives[n - 1]);
                }
                _ => continue,
            }
        }
    }

    fn ask(&mut self, cursor: &mut InputCursor<'_>, id: NodeId) -> Result<()> {
        let Some(prompt) = self.field_prompt(cursor, id) else {
            cursor.next_input();
            return Ok(());
        };

        if !prompt.candidates.is_empty() {
            let shown: Vec<&str> = prompt.candidates.iter().map(String::as_str).collect();
            writeln!(self.output, "Options: {}", shown.join(", "))?;
        }

        let label = match &prompt.current {
            Some(_) if prompt.sensitive => format!("{} [{}] : ", prompt.display_name, self.config.mask),
            Some(value) if !prompt.from_file => format!("{} [{value}] : ", prompt.display_name),
            _ if prompt.saved => format!("{} [{SAVED}] : ", prompt.display_name),
            _ => format!("{} : ", prompt.display_name),
        };

        loop {
            let answer = self.read_line(&label)?;
            let result = if answer.is_empty() || (prompt.from_file && answer == SAVED) {
                if prompt.from_file && prompt.saved {
                    cursor.set_default_input(&prompt.name)
                } else if let (false, Some(value)) = (prompt.from_file, &prompt.current) {
                    cursor.set_input(&prompt.name, value)
                } else {
                    writeln!(self.output, "A value is required.")?;
                    continue;
                }
            } else {
                cursor.set_input(&prompt.name, &answer)
            };

            match result {
                Ok(_) => break,
                Err(e @ (FormError::Validation { .. }
                | FormError::FileSource { .. }
                | FormError::NoSavedValue { .. })) => {
                    writeln!(self.output, "{e}")?;
                }
                Err(e) => return Err(e),
            }
        }

        if prompt.from_file && !prompt.sensitive {
            let group = cursor.group();
            if let Ok(Some(value)) = group.field_value(&prompt.name) {
                writeln!(self.output, "Value from file:\n{value}")?;
            }
        }
        writeln!(self.output)?;
        Ok(())
    }

    fn field_prompt(&self, cursor: &InputCursor<'_>, id: NodeId) -> Option<FieldPrompt> {
        let group = cursor.group();
        let field = group.field_by_id(id)?;
        let (from_file, paths) = field.value_from_file();
        let current = field.value();

        let candidates = if from_file {
            paths
        } else if let Some(accepted) = field.accepted_values() {
            accepted.to_vec()
        } else if field.sensitive() {
            Vec::new()
        } else {
            let mut values: Vec<String> = Vec::new();
            let mut push = |v: String| {
                if !v.is_empty() && Some(&v) != current.as_ref() && !values.contains(&v) {
                    values.push(v);
                }
            };
            for name in field.env_vars() {
                if let Some(v) = group.env().var(name) {
                    push(v);
                }
            }
            if let Ok(hints) = group.field_hints(field.name()) {
                for e in &hints.errors {
                    debug!(field = %field.name(), error = %e, "unable to resolve hint");
                }
                hints.values.into_iter().for_each(&mut push);
            }
            values
        };

        Some(FieldPrompt {
            name: field.name().to_string(),
            display_name: field.display_name().to_string(),
            sensitive: field.sensitive(),
            from_file,
            saved: field.bound_value().is_some(),
            current,
            candidates,
        })
    }

    /// Print `label` and read one line without its line ending.
    fn read_line(&mut self, label: &str) -> Result<String> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(FormError::PromptAborted);
        }
        writeln!(self.output)?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::sync::Arc;

    use crate::binding::ScalarSlot;
    use crate::env::MapEnv;
    use crate::field::FieldAttributes;

    fn group(env: MapEnv) -> InputGroup {
        let mut g = InputGroup::with_env("cloud", "Cloud credentials", Arc::new(env));
        g.new_container("auth", "Auth", "How to log in", 1).unwrap();
        g.add_field(FieldAttributes::new("password").display_name("Password").group_id(1).sensitive())
            .unwrap();
        g.add_field(FieldAttributes::new("token").display_name("Token").group_id(1))
            .unwrap();
        g.add_field(
            FieldAttributes::new("region")
                .display_name("Region")
                .env_var("REGION")
                .accepted_values(["us", "eu"], "region must be us or eu"),
        )
        .unwrap();
        for name in ["password", "token", "region"] {
            g.bind_field(name, Arc::new(ScalarSlot::default())).unwrap();
        }
        g
    }

    fn run(g: &mut InputGroup, answers: &str) -> (Result<()>, String) {
        let mut prompter = TextPrompter::new(Cursor::new(answers.as_bytes().to_vec()), Vec::new(), PromptConfig::default());
        let result = prompter.run(g, "Cloud");
        let output = String::from_utf8(prompter.into_output()).unwrap();
        (result, output)
    }

    #[test]
    fn select_alternative_and_retry_invalid_value() {
        let mut g = group(MapEnv::new());
        let (result, output) = run(&mut g, "9\n2\ntok\nasia\neu\n");
        result.unwrap();

        assert!(output.contains("1. Password - "));
        assert!(output.contains("2. Token - "));
        assert!(output.contains("region must be us or eu"));
        assert!(output.contains("Options: us, eu"));

        let values = g.input_values();
        assert_eq!(values.len(), 2);
        assert_eq!(values["token"], "tok");
        assert_eq!(values["region"], "eu");
    }

    #[test]
    fn empty_answer_keeps_environment_value() {
        let mut g = group(MapEnv::with_vars([("REGION", "us")]));
        let (result, output) = run(&mut g, "1\nhunter2\n\n");
        result.unwrap();

        assert!(output.contains("Region [us] : "));
        assert_eq!(g.input_values()["region"], "us");
        assert_eq!(g.input_values()["password"], "hunter2");
    }

    #[test]
    fn empty_answer_without_value_asks_again() {
        let mut g = group(MapEnv::new());
        let (result, output) = run(&mut g, "2\n\nt\nus\n");
        result.unwrap();
        assert!(output.contains("A value is required."));
    }

    #[test]
    fn end_of_input_aborts() {
        let mut g = group(MapEnv::new());
        let (result, _) = run(&mut g, "2\n");
        assert!(matches!(result, Err(FormError::PromptAborted)));
    }

    #[test]
    fn saved_file_value_is_kept() {
        let mut g = InputGroup::with_env("certs", "", Arc::new(MapEnv::new()));
        g.add_field(FieldAttributes::new("cert").display_name("Cert").value_from_file())
            .unwrap();
        g.bind_field("cert", Arc::new(ScalarSlot::new("-----BEGIN"))).unwrap();

        let (result, output) = run(&mut g, "[saved]\n");
        result.unwrap();
        assert!(output.contains("Cert [[saved]] : "));
        assert!(output.contains("Value from file:\n-----BEGIN"));
        assert_eq!(g.input_values()["cert"], "-----BEGIN");
    }

    #[test]
    fn hint_values_survive_a_failing_hint() {
        let mut g = InputGroup::with_env("deploy", "", Arc::new(MapEnv::new()));
        g.add_field(FieldAttributes::new("regions").display_name("Regions"))
            .unwrap();
        g.add_field(FieldAttributes::new("region").display_name("Region").depends_on("regions"))
            .unwrap();
        g.add_field_hint("region", "https://example.com/regions").unwrap();
        g.add_field_hint("region", "field://regions/available").unwrap();
        for name in ["regions", "region"] {
            g.bind_field(name, Arc::new(ScalarSlot::default())).unwrap();
        }

        let (result, output) = run(&mut g, "{\"available\":[\"us\",\"eu\"]}\neu\n");
        result.unwrap();
        assert!(output.contains("Options: us, eu"));
        assert_eq!(g.input_values()["region"], "eu");
    }
}
