//! Environment providers
//!
//! Fields fall back to named environment variables when nothing is bound.
//! The lookup goes through `EnvProvider` so a group tree can be driven by
//! the real process environment or by a fixed map in tests.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;

/// Ordered environment lookup.
pub trait EnvProvider: Send + Sync + fmt::Debug {
    /// Value of `name`, if set. A variable set to an empty string is set.
    fn var(&self, name: &str) -> Option<String>;

    /// First variable of `names` (in declared order) that is set.
    fn first_set<'a>(&self, names: &'a [String]) -> Option<(&'a str, String)> {
        names
            .iter()
            .find_map(|name| self.var(name).map(|value| (name.as_str(), value)))
    }
}

/// Reads the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvProvider for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var_os(name).map(|v| v.to_string_lossy().into_owned())
    }
}

/// In-memory environment, shareable and mutable through `&self`.
///
/// Clones share the same variables.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: Arc<DashMap<String, String>>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let env = Self::new();
        for (k, v) in vars {
            env.set(k, v);
        }
        env
    }

    pub fn set(&self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn remove(&self, name: &str) {
        self.vars.remove(name);
    }
}

impl EnvProvider for MapEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).map(|v| v.value().clone())
    }
}
