//! Expression type inference
//!
//! Classifies a single trimmed expression string so callers can pick a print
//! format or a `for .. in` emission form. The inference is deliberately local:
//! it looks at the leading token and the symbol table, and never descends into
//! subexpressions or operators.

use super::{SemType, SymbolTable};

/// Infer the semantic type of an expression.
pub fn infer(expr: &str, symbols: &SymbolTable) -> SemType {
    let e = expr.trim();
    if e.starts_with('"') {
        return SemType::Str;
    }
    if e == "true" || e == "false" {
        return SemType::Bool;
    }
    if e.starts_with('(') && e.contains(',') {
        return SemType::Tuple;
    }
    if e.starts_with('[') {
        return SemType::List;
    }
    if e.starts_with('{') {
        return SemType::Dict;
    }
    if let Some(ty) = numeric_kind(e) {
        return ty;
    }
    if let Some(name) = leading_identifier(e) {
        let rest = e[name.len()..].trim_start();
        if rest.is_empty() {
            if let Some(var) = symbols.lookup(name) {
                return var.ty;
            }
        } else if rest.starts_with('[')
            && matches!(symbols.type_of(name), SemType::List | SemType::Str)
        {
            // Indexing a list or string yields the int element.
            return SemType::Int;
        }
    }
    SemType::Int
}

/// `Int` or `Float` for a purely numeric token (optional sign, at most one
/// dot, at least one digit), `None` otherwise.
fn numeric_kind(e: &str) -> Option<SemType> {
    let body = e
        .strip_prefix('-')
        .or_else(|| e.strip_prefix('+'))
        .unwrap_or(e);
    if body.is_empty() {
        return None;
    }
    let mut saw_digit = false;
    let mut saw_dot = false;
    for c in body.chars() {
        match c {
            '0'..='9' => saw_digit = true,
            '.' if !saw_dot => saw_dot = true,
            _ => return None,
        }
    }
    if !saw_digit {
        return None;
    }
    Some(if saw_dot { SemType::Float } else { SemType::Int })
}

/// The identifier at the start of the expression, if any.
pub fn leading_identifier(s: &str) -> Option<&str> {
    let mut end = 0;
    for (i, c) in s.char_indices() {
        let ok = if i == 0 {
            c.is_ascii_alphabetic() || c == '_'
        } else {
            c.is_ascii_alphanumeric() || c == '_'
        };
        if !ok {
            break;
        }
        end = i + c.len_utf8();
    }
    if end == 0 {
        None
    } else {
        Some(&s[..end])
    }
}
