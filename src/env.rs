use indexmap::IndexMap;
use itertools::Itertools;
use std::fmt::{Display, Formatter};

/// Separator of path lists in variables like `PATH` or `PYTHONPATH`.
#[cfg(unix)]
pub const LIST_SEPARATOR: char = ':';
#[cfg(windows)]
pub const LIST_SEPARATOR: char = ';';

/// Environment of a single wrapper invocation.
///
/// The table is captured once at startup, mutated by the rewriting steps and finally passed
/// as the complete environment of the launched process. Keys are unique, the last assignment
/// wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Env(IndexMap<String, String>);

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an environment from `VAR=VALUE` pairs. A pair without `=` defines an empty
    /// variable. Repeated keys keep the last value.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut env = Env::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            env.set(key, value);
        }
        env
    }

    /// Capture the environment of the current process.
    pub fn from_process() -> Self {
        let mut env = Env::new();
        for (key, value) in std::env::vars_os() {
            env.set(key.to_string_lossy(), value.to_string_lossy());
        }
        env
    }

    /// Render the table as `VAR=VALUE` pairs in insertion order.
    pub fn to_pairs(&self) -> Vec<String> {
        self.0.iter().map(|(k, v)| format!("{k}={v}")).collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Return the value of `key` if it is set to a non-empty string.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.shift_remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Put `path` in front of the path list stored in `key`.
    pub fn prepend_path(&mut self, key: &str, path: &str) {
        let value = match self.get_non_empty(key) {
            Some(existing) => format!("{path}{LIST_SEPARATOR}{existing}"),
            None => path.to_string(),
        };
        self.set(key, value);
    }

    /// Put `path` at the end of the path list stored in `key`, entries already present are
    /// resolved first.
    pub fn append_path(&mut self, key: &str, path: &str) {
        let value = match self.get_non_empty(key) {
            Some(existing) => format!("{existing}{LIST_SEPARATOR}{path}"),
            None => path.to_string(),
        };
        self.set(key, value);
    }
}

impl Display for Env {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let rendered = self
            .0
            .iter()
            .sorted_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(k, v)| format!("{k}={v:?}"))
            .join(" ");
        f.write_str(&rendered)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Env {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut env = Env::new();
        for (k, v) in iter {
            env.set(k, v);
        }
        env
    }
}
