//! Value slots fields read and write through
//!
//! A field never owns its value. The caller hands it a slot pointing at
//! storage the caller keeps, and the field reads and writes that storage
//! directly. Two shapes are accepted:
//!
//! - `SlotShape::Scalar`: always holds a string; the empty string means "no value"
//! - `SlotShape::Optional`: holds a string or nothing
//!
//! `JsonRecord` binds a whole JSON object at once: every string member is
//! a scalar slot, every null member an optional slot, nested objects are
//! walked recursively.

use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;

/// Storage shape behind a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotShape {
    Scalar,
    Optional,
}

/// Caller-owned storage a field is bound to.
pub trait ValueSlot: Send + Sync + fmt::Debug {
    fn shape(&self) -> SlotShape;

    /// Current value. `None` when a scalar slot is empty or an optional
    /// slot is absent.
    fn read(&self) -> Option<String>;

    /// Replace the stored value. A scalar slot stores `None` as "".
    fn write(&self, value: Option<String>);
}

fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ============================================================================
// SCALAR SLOT
// ============================================================================

/// A plain string cell. Clones share the cell.
#[derive(Debug, Clone, Default)]
pub struct ScalarSlot(Arc<RwLock<String>>);

impl ScalarSlot {
    pub fn new(initial: impl Into<String>) -> Self {
        Self(Arc::new(RwLock::new(initial.into())))
    }

    pub fn get(&self) -> String {
        read_lock(&self.0).clone()
    }

    pub fn set(&self, value: impl Into<String>) {
        *write_lock(&self.0) = value.into();
    }
}

impl ValueSlot for ScalarSlot {
    fn shape(&self) -> SlotShape {
        SlotShape::Scalar
    }

    fn read(&self) -> Option<String> {
        let value = read_lock(&self.0);
        (!value.is_empty()).then(|| value.clone())
    }

    fn write(&self, value: Option<String>) {
        *write_lock(&self.0) = value.unwrap_or_default();
    }
}

// ============================================================================
// OPTIONAL SLOT
// ============================================================================

/// A string cell that may be absent. Clones share the cell.
#[derive(Debug, Clone, Default)]
pub struct OptionalSlot(Arc<RwLock<Option<String>>>);

impl OptionalSlot {
    pub fn new(initial: Option<String>) -> Self {
        Self(Arc::new(RwLock::new(initial)))
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<String> {
        read_lock(&self.0).clone()
    }

    pub fn set(&self, value: Option<String>) {
        *write_lock(&self.0) = value;
    }
}

impl ValueSlot for OptionalSlot {
    fn shape(&self) -> SlotShape {
        SlotShape::Optional
    }

    fn read(&self) -> Option<String> {
        self.get()
    }

    fn write(&self, value: Option<String>) {
        self.set(value);
    }
}

// ============================================================================
// JSON RECORD
// ============================================================================

/// A JSON object whose members can be bound to fields by name.
///
/// Clones share the document, so values written by fields show up in
/// `snapshot()`.
#[derive(Debug, Clone)]
pub struct JsonRecord {
    root: Arc<RwLock<Value>>,
}

/// One member of a record as seen by the binder.
#[derive(Debug)]
pub enum RecordEntry {
    /// A member that can be bound
    Slot(Arc<dyn ValueSlot>),
    /// A member of a shape no slot can represent (number, bool, array, object)
    Unsupported(&'static str),
}

impl JsonRecord {
    pub fn new(value: Value) -> Self {
        Self {
            root: Arc::new(RwLock::new(value)),
        }
    }

    /// Copy of the current document.
    pub fn snapshot(&self) -> Value {
        read_lock(&self.root).clone()
    }

    /// All members, depth-first in document order, keyed by member name.
    ///
    /// Object members are reported as unsupported and then walked.
    pub fn entries(&self) -> Vec<(String, RecordEntry)> {
        let root = read_lock(&self.root);
        let mut entries = Vec::new();
        self.collect(&root, &mut Vec::new(), &mut entries);
        entries
    }

    fn collect(
        &self,
        value: &Value,
        path: &mut Vec<String>,
        entries: &mut Vec<(String, RecordEntry)>,
    ) {
        let Value::Object(members) = value else {
            return;
        };

        for (key, member) in members {
            path.push(key.clone());
            let entry = match member {
                Value::String(_) => RecordEntry::Slot(Arc::new(self.slot(path, SlotShape::Scalar))),
                Value::Null => RecordEntry::Slot(Arc::new(self.slot(path, SlotShape::Optional))),
                Value::Bool(_) => RecordEntry::Unsupported("bool"),
                Value::Number(_) => RecordEntry::Unsupported("number"),
                Value::Array(_) => RecordEntry::Unsupported("array"),
                Value::Object(_) => RecordEntry::Unsupported("object"),
            };
            entries.push((key.clone(), entry));

            if member.is_object() {
                self.collect(member, path, entries);
            }
            path.pop();
        }
    }

    fn slot(&self, path: &[String], shape: SlotShape) -> JsonSlot {
        let pointer = path
            .iter()
            .map(|p| format!("/{}", p.replace('~', "~0").replace('/', "~1")))
            .collect();

        JsonSlot {
            root: Arc::clone(&self.root),
            pointer,
            shape,
        }
    }
}

/// Slot addressing one member of a `JsonRecord` by JSON pointer.
#[derive(Debug, Clone)]
pub struct JsonSlot {
    root: Arc<RwLock<Value>>,
    pointer: String,
    shape: SlotShape,
}

impl ValueSlot for JsonSlot {
    fn shape(&self) -> SlotShape {
        self.shape
    }

    fn read(&self) -> Option<String> {
        let root = read_lock(&self.root);
        match root.pointer(&self.pointer)? {
            Value::Null => None,
            Value::String(s) if s.is_empty() && self.shape == SlotShape::Scalar => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    fn write(&self, value: Option<String>) {
        let mut root = write_lock(&self.root);
        let Some(member) = root.pointer_mut(&self.pointer) else {
            return;
        };

        *member = match (value, self.shape) {
            (Some(v), _) => Value::String(v),
            (None, SlotShape::Scalar) => Value::String(String::new()),
            (None, SlotShape::Optional) => Value::Null,
        };
    }
}
