//! Registry of group trees with DashMap
//!
//! Groups are created and looked up by name from any thread. Each group
//! tree sits behind its own mutex; the registry itself is lock-free.

use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::DashMap;

use crate::env::{EnvProvider, ProcessEnv};
use crate::error::{FormError, Result};
use crate::group::InputGroup;

/// A group tree shared between the registry and its users.
pub type SharedGroup = Arc<Mutex<InputGroup>>;

/// Lock a shared group, recovering the tree if a holder panicked.
pub fn lock_group(group: &SharedGroup) -> MutexGuard<'_, InputGroup> {
    group.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Named group trees. Clones share the registry.
#[derive(Debug, Clone)]
pub struct InputCollection {
    /// Groups: name → tree
    groups: Arc<DashMap<String, SharedGroup>>,
    /// Environment handed to every new group
    env: Arc<dyn EnvProvider>,
}

impl Default for InputCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl InputCollection {
    pub fn new() -> Self {
        Self::with_env(Arc::new(ProcessEnv))
    }

    pub fn with_env(env: Arc<dyn EnvProvider>) -> Self {
        Self {
            groups: Arc::new(DashMap::new()),
            env,
        }
    }

    pub fn env(&self) -> &Arc<dyn EnvProvider> {
        &self.env
    }

    /// Create an empty group. An existing group with the same name is replaced.
    pub fn new_group(&self, name: impl Into<String>, description: impl Into<String>) -> SharedGroup {
        let name = name.into();
        let group = InputGroup::with_env(name.clone(), description, Arc::clone(&self.env));
        self.insert(name, group)
    }

    /// Register a group built elsewhere under `name`.
    pub fn insert(&self, name: impl Into<String>, group: InputGroup) -> SharedGroup {
        let shared = Arc::new(Mutex::new(group));
        self.groups.insert(name.into(), Arc::clone(&shared));
        shared
    }

    pub fn has_group(&self, name: &str) -> bool {
        self.groups.contains_key(name)
    }

    pub fn group(&self, name: &str) -> Option<SharedGroup> {
        self.groups.get(name).map(|g| Arc::clone(g.value()))
    }

    pub fn try_group(&self, name: &str) -> Result<SharedGroup> {
        self.group(name).ok_or_else(|| FormError::GroupNotFound {
            name: name.to_string(),
        })
    }

    /// Group names, sorted.
    pub fn group_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.groups.iter().map(|g| g.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
