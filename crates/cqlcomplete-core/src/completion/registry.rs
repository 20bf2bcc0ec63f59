//! Completers keyed by the binding sites they serve.

use std::collections::HashMap;
use std::fmt;

use crate::error::{GrammarError, SchemaError};
use crate::schema::SchemaAccessor;

use super::BindingContext;

/// A dynamic completer: produces literal candidates from the bindings matched so
/// far and the live schema.
pub type CompleterFn = Box<
    dyn Fn(&BindingContext, &dyn SchemaAccessor) -> Result<Vec<String>, SchemaError>
        + Send
        + Sync,
>;

/// Identifies a binding site: the rule that contains it and the binding name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompleterKey {
    pub production: String,
    pub binding: String,
}

impl CompleterKey {
    pub fn new(production: impl Into<String>, binding: impl Into<String>) -> Self {
        Self {
            production: production.into(),
            binding: binding.into(),
        }
    }
}

pub enum CompleterEntry {
    /// Called at resolution time; results are candidates.
    Dynamic(CompleterFn),
    /// Like `Dynamic`, but the results are keywords and follow the keyword casing.
    Keywords(CompleterFn),
    /// A fixed placeholder reported on the hint channel, e.g. `<value>`.
    Hint(String),
}

impl fmt::Debug for CompleterEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
            Self::Keywords(_) => f.write_str("Keywords(..)"),
            Self::Hint(text) => f.debug_tuple("Hint").field(text).finish(),
        }
    }
}

/// Maps binding sites to completers. Filled once at startup, then read-only.
#[derive(Debug, Default)]
pub struct CompleterRegistry {
    entries: HashMap<CompleterKey, CompleterEntry>,
}

impl CompleterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_completer<F>(
        &mut self,
        production: &str,
        binding: &str,
        completer: F,
    ) -> Result<&mut Self, GrammarError>
    where
        F: Fn(&BindingContext, &dyn SchemaAccessor) -> Result<Vec<String>, SchemaError>
            + Send
            + Sync
            + 'static,
    {
        self.insert(
            production,
            binding,
            CompleterEntry::Dynamic(Box::new(completer)),
        )
    }

    /// Register a completer whose candidates are keywords, such as the options
    /// still allowed after `USING`.
    pub fn register_keyword_completer<F>(
        &mut self,
        production: &str,
        binding: &str,
        completer: F,
    ) -> Result<&mut Self, GrammarError>
    where
        F: Fn(&BindingContext, &dyn SchemaAccessor) -> Result<Vec<String>, SchemaError>
            + Send
            + Sync
            + 'static,
    {
        self.insert(
            production,
            binding,
            CompleterEntry::Keywords(Box::new(completer)),
        )
    }

    pub fn register_hint(
        &mut self,
        production: &str,
        binding: &str,
        hint: &str,
    ) -> Result<&mut Self, GrammarError> {
        self.insert(production, binding, CompleterEntry::Hint(hint.to_string()))
    }

    fn insert(
        &mut self,
        production: &str,
        binding: &str,
        entry: CompleterEntry,
    ) -> Result<&mut Self, GrammarError> {
        let key = CompleterKey::new(production, binding);
        if self.entries.contains_key(&key) {
            return Err(GrammarError::DuplicateCompleter {
                production: key.production,
                binding: key.binding,
            });
        }
        self.entries.insert(key, entry);
        Ok(self)
    }

    pub fn lookup(&self, production: &str, binding: &str) -> Option<&CompleterEntry> {
        self.entries.get(&CompleterKey::new(production, binding))
    }

    pub fn keys(&self) -> impl Iterator<Item = &CompleterKey> {
        self.entries.keys()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::StubSchema;

    #[test]
    fn test_lookup_registered_completer() {
        let mut registry = CompleterRegistry::new();
        registry
            .register_completer("useStatement", "ksname", |_, schema| schema.keyspace_names())
            .unwrap()
            .register_hint("createKeyspaceStatement", "ksname", "<new_keyspace_name>")
            .unwrap();

        let schema = StubSchema::new().keyspace("app", &["users"]);
        let Some(CompleterEntry::Dynamic(completer)) = registry.lookup("useStatement", "ksname")
        else {
            panic!("expected a dynamic completer");
        };
        assert_eq!(
            completer(&BindingContext::new(), &schema).unwrap(),
            vec!["app".to_string()]
        );

        assert!(matches!(
            registry.lookup("createKeyspaceStatement", "ksname"),
            Some(CompleterEntry::Hint(hint)) if hint == "<new_keyspace_name>"
        ));
        assert!(registry.lookup("useStatement", "cfname").is_none());
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_keyword_completers_are_kept_apart() {
        let mut registry = CompleterRegistry::new();
        registry
            .register_keyword_completer("insertStatement", "insertopt", |_, _| {
                Ok(vec!["TTL".to_string()])
            })
            .unwrap();
        assert!(matches!(
            registry.lookup("insertStatement", "insertopt"),
            Some(CompleterEntry::Keywords(_))
        ));
    }

    #[test]
    fn test_duplicate_registration_is_rejected() {
        let mut registry = CompleterRegistry::new();
        registry.register_hint("insertStatement", "newval", "<value>").unwrap();
        let err = registry
            .register_completer("insertStatement", "newval", |_, _| Ok(Vec::new()))
            .unwrap_err();
        assert_eq!(
            err,
            GrammarError::DuplicateCompleter {
                production: "insertStatement".to_string(),
                binding: "newval".to_string(),
            }
        );
    }

    #[test]
    fn test_registry_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CompleterRegistry>();
    }
}
