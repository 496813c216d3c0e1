//! Symbol table
//!
//! A has a single flat scope: variables are registered as declarations are
//! seen and never deregistered within a compilation unit. Re-registration
//! overwrites (last-writer-wins).

use std::collections::HashMap;

use super::SemType;

/// Hard ceiling on registered variables.
pub const MAX_VARIABLES: usize = 4096;

/// Variable information.
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub ty: SemType,
    pub is_const: bool,
}

/// Flat name -> variable map for one compilation unit.
#[derive(Debug, Default)]
pub struct SymbolTable {
    vars: HashMap<String, Variable>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a variable, overwriting any previous entry for the name.
    /// Returns false when the table is full and the name is new; the caller
    /// reports that as a recoverable error.
    pub fn register(&mut self, name: &str, ty: SemType, is_const: bool) -> bool {
        if !self.vars.contains_key(name) && self.vars.len() >= MAX_VARIABLES {
            return false;
        }
        self.vars.insert(
            name.to_string(),
            Variable {
                name: name.to_string(),
                ty,
                is_const,
            },
        );
        true
    }

    pub fn lookup(&self, name: &str) -> Option<&Variable> {
        self.vars.get(name)
    }

    /// Semantic type of a name, `Unknown` when not registered.
    pub fn type_of(&self, name: &str) -> SemType {
        self.lookup(name).map_or(SemType::Unknown, |v| v.ty)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}
