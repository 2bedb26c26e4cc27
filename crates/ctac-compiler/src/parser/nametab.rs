//! Name table: typedef-name and enumeration-constant classification.
//!
//! Consulted while parsing to disambiguate `(T)x` from `(x)-y`. Fed by the
//! parser whenever it processes a `typedef` declaration or an enumerator;
//! purged when the enclosing scope closes.

use ctac_core::ScopedMap;

/// Token class of a defined name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameClass {
    TypedefName,
    EnumerationConstant,
}

/// Scope-stamped map from identifier to token class.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    map: ScopedMap<NameClass>,
}

impl NameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Define `name` with the given class at `level`.
    pub fn define(&mut self, name: &str, class: NameClass, level: u32) {
        self.map.insert(name, class, level);
    }

    /// Class of `name`, or `None` when it is an ordinary identifier.
    pub fn find(&self, name: &str) -> Option<NameClass> {
        self.map.get(name).copied()
    }

    /// Remove one name.
    pub fn remove(&mut self, name: &str) {
        self.map.remove(name);
    }

    /// Remove every name defined deeper than `level`.
    pub fn purge(&mut self, level: u32) {
        self.map.purge(level);
    }
}
