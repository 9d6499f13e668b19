//! File-level option registry.
//!
//! Options are registered before compilation and applied identically to
//! every emitted file. Each option is a key plus a pure function producing
//! the value from the current namespace and file name.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::ConfigError;
use crate::ir::IrNamespace;

/// Produces the value string for one file option.
pub type OptionValueFn = Box<dyn Fn(&IrNamespace, &str) -> String + Send + Sync>;

/// Registry of file-level options.
///
/// Later registrations with the same key overwrite earlier ones. Keys are
/// rendered in sorted order so output is reproducible.
#[derive(Default)]
pub struct FileOptions {
    options: BTreeMap<String, OptionValueFn>,
}

impl FileOptions {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an option. An empty key is a configuration error, raised
    /// here rather than at emission time.
    pub fn register<F>(&mut self, key: impl Into<String>, value: F) -> Result<(), ConfigError>
    where
        F: Fn(&IrNamespace, &str) -> String + Send + Sync + 'static,
    {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfigError::EmptyOptionKey);
        }
        self.options.insert(key, Box::new(value));
        Ok(())
    }

    /// Render all options as `option <key> = "<value>";` lines, sorted by key.
    pub fn render(&self, namespace: &IrNamespace, file_name: &str) -> Vec<String> {
        self.options
            .iter()
            .map(|(key, value)| {
                let value = value(namespace, file_name);
                format!("option {} = \"{}\";", key, escape_value(&value))
            })
            .collect()
    }

    /// Number of registered options.
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Check whether no options are registered.
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

impl fmt::Debug for FileOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileOptions")
            .field("keys", &self.options.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Escape a value for use inside a double-quoted proto string literal.
fn escape_value(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
