//! inputgraph - hierarchical input graphs for configuration prompts
//!
//! A group tree declares fields, sets of alternatives and dependencies
//! between fields. An `InputCursor` walks the tree and yields the next
//! input to ask for given the values entered so far.

pub mod binding;
pub mod collection;
pub mod config;
pub mod cursor;
pub mod definition;
pub mod env;
pub mod error;
pub mod field;
pub mod group;
pub mod hint;
pub mod jsonpath;
pub mod node;
pub mod prompt;
pub mod reference;
pub mod types;

pub use binding::{JsonRecord, OptionalSlot, ScalarSlot, SlotShape, ValueSlot};
pub use collection::{lock_group, InputCollection, SharedGroup};
pub use config::PromptConfig;
pub use cursor::InputCursor;
pub use definition::FormDefinition;
pub use env::{EnvProvider, MapEnv, ProcessEnv};
pub use error::{FixSuggestion, FormError};
pub use field::{FieldAttributes, InputField, PostCondition};
pub use group::InputGroup;
pub use hint::{FieldHint, HintValues};
pub use node::{Input, InputContainer, Node};
pub use prompt::TextPrompter;
pub use reference::{render_reference, ShowOption};
pub use types::{Dependency, InputType, NodeId};
