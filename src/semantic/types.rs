//! Semantic type definitions

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Source-level types tracked by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SemType {
    Int,
    Float,
    Bool,
    Str,
    List,
    Dict,
    Tuple,
    Unknown,
}

/// Declaration keywords recognized at the start of a line.
pub static TYPE_KEYWORDS: Lazy<HashMap<&'static str, SemType>> = Lazy::new(|| {
    HashMap::from([
        ("int", SemType::Int),
        ("float", SemType::Float),
        ("bool", SemType::Bool),
        ("string", SemType::Str),
        ("list", SemType::List),
        ("dict", SemType::Dict),
        ("tuple", SemType::Tuple),
    ])
});

impl SemType {
    pub fn from_keyword(name: &str) -> Option<Self> {
        TYPE_KEYWORDS.get(name).copied()
    }

    /// The C type a declaration of this type maps to.
    pub fn c_name(&self) -> &'static str {
        match self {
            SemType::Int => "int",
            SemType::Float => "float",
            SemType::Bool => "bool",
            SemType::Str => "char*",
            SemType::List => "List",
            SemType::Dict => "Dict",
            SemType::Tuple => "Tuple",
            SemType::Unknown => "int",
        }
    }

    /// Default initializer for a declaration without one. `bool` and `float`
    /// are emitted uninitialized.
    pub fn default_init(&self) -> Option<&'static str> {
        match self {
            SemType::Int => Some("0"),
            SemType::Str => Some("NULL"),
            SemType::List => Some("new_list()"),
            SemType::Dict => Some("new_dict()"),
            SemType::Tuple => Some("new_tuple()"),
            SemType::Bool | SemType::Float | SemType::Unknown => None,
        }
    }

    /// Keyword as written in A source; also the label used in log events.
    pub fn label(&self) -> &'static str {
        match self {
            SemType::Int => "int",
            SemType::Float => "float",
            SemType::Bool => "bool",
            SemType::Str => "string",
            SemType::List => "list",
            SemType::Dict => "dict",
            SemType::Tuple => "tuple",
            SemType::Unknown => "unknown",
        }
    }
}
