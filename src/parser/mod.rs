//! Parser module - line classifier
//!
//! A is line-oriented: each trimmed line maps to exactly one statement form,
//! selected by its first identifier. Block headers may end in `{` (brace
//! discipline) and/or `:`; both are consumed here so handlers see a clean
//! condition or header body.

mod ast;
mod utils;

pub use ast::*;

pub use crate::semantic::leading_identifier;
use crate::semantic::SemType;
use utils::{find_char_balanced, find_keyword_balanced, split_by_comma_balanced};

/// Classify one trimmed, comment-free source line.
pub fn classify(line: &str) -> Stmt {
    let line = line.trim();
    if line == "end" {
        return Stmt::End;
    }
    if line.starts_with('}') {
        return Stmt::CloseBrace;
    }

    let word = match leading_identifier(line) {
        Some(w) => w,
        None => return Stmt::Raw(line.to_string()),
    };
    let rest = &line[word.len()..];

    match word {
        "const" => classify_decl(rest.trim_start(), true),
        _ if SemType::from_keyword(word).is_some() => classify_decl(line, false),
        "print" if next_is_paren(rest) => classify_print(line),
        "if" => {
            let (cond, brace) = strip_block_suffix(rest);
            Stmt::If { cond, brace }
        }
        "elif" => {
            let (cond, brace) = strip_block_suffix(rest);
            Stmt::Elif { cond, brace }
        }
        "else" => {
            let (_, brace) = strip_block_suffix(rest);
            Stmt::Else { brace }
        }
        "while" => {
            let (cond, brace) = strip_block_suffix(rest);
            Stmt::While { cond, brace }
        }
        "for" => classify_for(rest),
        "func" => {
            let (name, brace) = strip_block_suffix(rest);
            Stmt::Func { name, brace }
        }
        "append" if next_is_paren(rest) => classify_runtime_call(line, RuntimeFn::Append),
        "dset" if next_is_paren(rest) => classify_runtime_call(line, RuntimeFn::DictSet),
        "dget" if next_is_paren(rest) => classify_runtime_call(line, RuntimeFn::DictGet),
        _ => Stmt::Raw(line.to_string()),
    }
}

fn next_is_paren(rest: &str) -> bool {
    rest.trim_start().starts_with('(')
}

/// Strip a trailing `{` (brace discipline) and/or a trailing `:` from a block
/// header, returning the remaining body.
fn strip_block_suffix(s: &str) -> (String, bool) {
    let mut body = s.trim();
    let mut brace = false;
    if let Some(stripped) = body.strip_suffix('{') {
        brace = true;
        body = stripped.trim_end();
    }
    if let Some(stripped) = body.strip_suffix(':') {
        body = stripped.trim_end();
    }
    (body.to_string(), brace)
}

/// `[const] <type> <name> [= <expr>]`. For const declarations `line` starts
/// at the type keyword.
fn classify_decl(line: &str, is_const: bool) -> Stmt {
    let (ty_word, after_ty) = match leading_identifier(line) {
        Some(w) => (w, line[w.len()..].trim_start()),
        None => ("", line),
    };
    let ty = SemType::from_keyword(ty_word);
    let (name, init) = match find_char_balanced(after_ty, '=') {
        Some(i) => (
            after_ty[..i].trim().to_string(),
            Some(after_ty[i + 1..].trim().to_string()),
        ),
        None => (after_ty.trim().to_string(), None),
    };
    Stmt::VarDecl {
        ty,
        name,
        init,
        is_const,
    }
}

/// Payload between the first `(` and the last `)`.
fn paren_payload(line: &str) -> Option<String> {
    let open = line.find('(')?;
    let close = line.rfind(')')?;
    if close <= open {
        return None;
    }
    Some(line[open + 1..close].trim().to_string())
}

fn classify_print(line: &str) -> Stmt {
    Stmt::Print {
        payload: paren_payload(line),
    }
}

fn classify_runtime_call(line: &str, call: RuntimeFn) -> Stmt {
    Stmt::RuntimeCall {
        call,
        args: paren_payload(line).map(|p| split_by_comma_balanced(&p)),
    }
}

/// `for v in expr` or `for v = a to b` / `for v = a to(s) b`.
fn classify_for(rest: &str) -> Stmt {
    let (body, brace) = strip_block_suffix(rest);

    if let Some(pos) = find_keyword_balanced(&body, "in") {
        return Stmt::ForIn {
            var: body[..pos].trim().to_string(),
            iter: body[pos + 2..].trim().to_string(),
            brace,
        };
    }

    let to_pos = find_keyword_balanced(&body, "to");
    let head = to_pos.map_or(body.as_str(), |p| &body[..p]);
    let tail = to_pos.map(|p| body[p + 2..].trim_start());

    let (var, start) = match find_char_balanced(head, '=') {
        Some(i) => (nonempty(&head[..i]), nonempty(&head[i + 1..])),
        None => (nonempty(head), None),
    };

    let (step, end) = match tail {
        None => (None, None),
        Some(t) if t.starts_with('(') => match t.find(')') {
            Some(close) => (
                Some(t[1..close].trim().to_string()),
                nonempty(&t[close + 1..]),
            ),
            None => (Some(t[1..].trim().to_string()), None),
        },
        Some(t) => (None, nonempty(t)),
    };

    Stmt::ForTo {
        var,
        start,
        end,
        step,
        brace,
    }
}

fn nonempty(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}
