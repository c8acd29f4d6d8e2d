use std::sync::{Arc, PoisonError, RwLock};

use super::types::TypeTag;

/// One name visible in the shell
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub name: String,
    pub tag: TypeTag,
    pub module: &'static str,
}

/// Names and types visible after the last executed input
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopeSnapshot {
    bindings: Vec<Binding>,
}

impl ScopeSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name`, replacing an existing binding in place
    pub fn insert(&mut self, name: impl Into<String>, tag: TypeTag, module: &'static str) {
        let name = name.into();
        match self.bindings.iter_mut().find(|b| b.name == name) {
            Some(existing) => {
                existing.tag = tag;
                existing.module = module;
            }
            None => self.bindings.push(Binding { name, tag, module }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.iter().find(|b| b.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Binding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Scope snapshot shared between the interpreter (writer) and the completer (reader).
#[derive(Debug, Clone, Default)]
pub struct SharedScope {
    inner: Arc<RwLock<ScopeSnapshot>>,
}

impl SharedScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the published snapshot
    pub fn publish(&self, snapshot: ScopeSnapshot) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = snapshot;
    }

    /// Copy of the current snapshot
    pub fn snapshot(&self) -> ScopeSnapshot {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
