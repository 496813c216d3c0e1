//! Line-level lexical helpers
//!
//! Indent measurement, comment stripping, and the two textual rewrites the
//! emitter relies on. Every scan tracks string-literal state so a rewrite
//! never fires inside a quoted string.

use crate::semantic::{SemType, SymbolTable};

/// Substitutions applied to every line before classification.
const TIME_REWRITES: [(&str, &str); 3] = [
    ("time.now()", "(int)time(NULL)"),
    ("date.now()", "(int)time(NULL)"),
    ("clock.now()", "((double)clock() / CLOCKS_PER_SEC)"),
];

/// Indentation width of a line: spaces count 1, tabs count 4.
pub fn indent_width(line: &str) -> usize {
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width += 4,
            _ => break,
        }
    }
    width
}

/// Strip a `#` comment through end of line, ignoring `#` inside strings.
pub fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '#' => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Replace the `time.now()` family with their C equivalents, outside strings.
pub fn rewrite_time_builtins(line: &str) -> String {
    if !line.contains(".now()") {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len() + 16);
    let mut in_string = false;
    let mut escaped = false;
    let mut i = 0;
    'outer: while i < line.len() {
        let rest = &line[i..];
        let c = match rest.chars().next() {
            Some(c) => c,
            None => break,
        };
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            i += c.len_utf8();
            continue;
        }
        for (find, replace) in TIME_REWRITES {
            if rest.starts_with(find) {
                out.push_str(replace);
                i += find.len();
                continue 'outer;
            }
        }
        if c == '"' {
            in_string = true;
        }
        out.push(c);
        i += c.len_utf8();
    }
    out
}

/// Rewrite A-level list indexing `V[` to C-level struct access `V.data[` for
/// every identifier `V` registered as a list. Strings pass through untouched.
pub fn rewrite_list_indexing(expr: &str, symbols: &SymbolTable) -> String {
    if !expr.contains('[') {
        return expr.to_string();
    }
    let mut out = String::with_capacity(expr.len() + 8);
    let mut in_string = false;
    let mut escaped = false;
    for c in expr.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '[' => {
                let is_list = trailing_identifier(&out)
                    .map(|name| symbols.type_of(name) == SemType::List)
                    .unwrap_or(false);
                if is_list {
                    out.push_str(".data[");
                } else {
                    out.push('[');
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// The identifier immediately preceding the scan position, skipping spaces.
fn trailing_identifier(s: &str) -> Option<&str> {
    let t = s.trim_end();
    let start = t
        .rfind(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .map(|i| i + 1)
        .unwrap_or(0);
    let ident = &t[start..];
    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        None
    } else {
        Some(ident)
    }
}
