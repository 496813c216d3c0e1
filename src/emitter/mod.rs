//! Emitter module - C code generation
//!
//! A single pass over the classified lines. Each handler consults the symbol
//! table, updates the block stack, reports a log event, and appends C text to
//! the active output buffer: the pending `main` body, or the body of the most
//! recently declared function. Handlers never abort - problems become
//! diagnostics and a syntactically safe substitution keeps the output useful.

use crate::diagnostics::Diagnostics;
use crate::lexer;
use crate::logger::{LogEvent, Logger};
use crate::mode::CompileMode;
use crate::parser::{self, leading_identifier, RuntimeFn, Stmt};
use crate::semantic::{
    infer, Block, BlockKind, BlockStack, Discipline, SemType, SymbolTable, MAX_BLOCKS,
    MAX_VARIABLES,
};

#[cfg(test)]
mod tests;

/// Runtime library prepended verbatim to every emitted translation unit.
pub const RUNTIME: &str = include_str!("runtime.c");

/// Hard ceiling on user function definitions.
pub const MAX_FUNCTIONS: usize = 512;

/// A user function and its accumulated C body.
#[derive(Debug, Clone)]
pub struct Function {
    pub name: String,
    pub body: String,
}

/// Result of a successful pass: the assembled C plus any warnings.
#[derive(Debug)]
pub struct CompileOutput {
    pub code: String,
    pub diagnostics: Diagnostics,
}

/// Single-pass translation state for one compilation unit.
pub struct Codegen {
    auto_close: bool,
    logger: Logger,
    symbols: SymbolTable,
    blocks: BlockStack,
    functions: Vec<Function>,
    in_function: bool,
    diagnostics: Diagnostics,
    main_body: String,
    last_line: usize,
}

impl Codegen {
    pub fn new(mode: CompileMode) -> Self {
        Self {
            auto_close: mode.auto_close(),
            logger: Logger::new(mode.log_mode()),
            symbols: SymbolTable::new(),
            blocks: BlockStack::new(),
            functions: Vec::new(),
            in_function: false,
            diagnostics: Diagnostics::new(),
            main_body: String::new(),
            last_line: 0,
        }
    }

    /// The buffer statements currently append to.
    fn out(&mut self) -> &mut String {
        if self.in_function && !self.functions.is_empty() {
            let last = self.functions.len() - 1;
            &mut self.functions[last].body
        } else {
            &mut self.main_body
        }
    }

    fn error(&mut self, line: usize, message: impl Into<String>) {
        let message = message.into();
        self.logger.log(&LogEvent::Error {
            line,
            message: &message,
        });
        self.diagnostics.error(line, message);
    }

    fn warn(&mut self, line: usize, message: impl Into<String>) {
        let message = message.into();
        self.logger.log(&LogEvent::Warning {
            line,
            message: &message,
        });
        self.diagnostics.warning(line, message);
    }

    /// Feed one raw source line through the translator.
    pub fn consume_line(&mut self, line_no: usize, raw: &str) {
        self.last_line = line_no;
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        let line = lexer::strip_comment(line);
        let indent = lexer::indent_width(line);
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }
        let rewritten = lexer::rewrite_time_builtins(trimmed);
        let stmt = parser::classify(&rewritten);
        self.logger.log(&LogEvent::Parse {
            line: line_no,
            code: &rewritten,
        });

        // Continuations mutate the open block instead of closing it, and the
        // manual closers must see the block they are meant to pop.
        let keeps_block = matches!(
            stmt,
            Stmt::Elif { .. } | Stmt::Else { .. } | Stmt::End | Stmt::CloseBrace
        );
        if self.auto_close && !keeps_block {
            self.drain_indented(line_no, indent);
        }

        match stmt {
            Stmt::VarDecl {
                ty,
                name,
                init,
                is_const,
            } => self.emit_var_decl(line_no, ty, name, init, is_const),
            Stmt::Print { payload } => self.emit_print(line_no, payload),
            Stmt::If { cond, brace } => self.emit_if(line_no, indent, cond, brace),
            Stmt::Elif { cond, brace } => self.emit_elif(line_no, indent, cond, brace),
            Stmt::Else { brace } => self.emit_else(line_no, indent, brace),
            Stmt::While { cond, brace } => self.emit_while(line_no, indent, cond, brace),
            Stmt::ForTo {
                var,
                start,
                end,
                step,
                brace,
            } => self.emit_for_to(line_no, indent, var, start, end, step, brace),
            Stmt::ForIn { var, iter, brace } => {
                self.emit_for_in(line_no, indent, var, iter, brace)
            }
            Stmt::Func { name, brace } => self.emit_func(line_no, indent, name, brace),
            Stmt::RuntimeCall { call, args } => self.emit_runtime_call(line_no, call, args),
            Stmt::End => self.emit_end(line_no),
            Stmt::CloseBrace => self.emit_close_brace(line_no),
            Stmt::Raw(code) => self.emit_raw(line_no, code),
        }
    }

    /// Pop every top-of-stack indent-discipline block whose opening indent is
    /// at or beyond the current line's indent.
    fn drain_indented(&mut self, line_no: usize, indent: usize) {
        loop {
            match self.blocks.top() {
                Some(b) if b.discipline == Discipline::Indent && b.indent >= indent => {}
                _ => break,
            }
            if let Some(block) = self.blocks.pop() {
                self.close_block(line_no, &block);
            }
        }
    }

    /// Emit the scopes a popped block owes and update function state. Function
    /// blocks own no brace here: assembly wraps their bodies.
    fn close_block(&mut self, line_no: usize, block: &Block) {
        if block.kind == BlockKind::Func {
            self.in_function = false;
        } else {
            for _ in 0..block.scopes {
                self.out().push_str("    }\n");
            }
        }
        self.logger.log(&LogEvent::BlockClose {
            line: line_no,
            opened_at: block.line,
            kind: block.kind.label(),
        });
    }

    /// Push a block record. Returns false (with a diagnostic) on overflow so
    /// the caller skips emitting the opening text.
    fn open_block(
        &mut self,
        line_no: usize,
        indent: usize,
        kind: BlockKind,
        brace: bool,
        scopes: usize,
    ) -> bool {
        let discipline = if brace {
            Discipline::Brace
        } else if self.auto_close {
            Discipline::Indent
        } else {
            Discipline::End
        };
        let block = Block {
            indent,
            line: line_no,
            kind,
            discipline,
            scopes,
        };
        if !self.blocks.push(block) {
            self.error(
                line_no,
                format!("too many nested blocks (limit {MAX_BLOCKS})"),
            );
            return false;
        }
        self.logger.log(&LogEvent::BlockOpen {
            line: line_no,
            kind: kind.label(),
            discipline: discipline.label(),
        });
        true
    }

    fn emit_var_decl(
        &mut self,
        line_no: usize,
        ty: Option<SemType>,
        name: String,
        init: Option<String>,
        is_const: bool,
    ) {
        let ty = match ty {
            Some(t) => t,
            None => {
                self.error(line_no, "unknown type in declaration");
                SemType::Int
            }
        };
        if name.is_empty() {
            self.error(line_no, "missing identifier in declaration");
            return;
        }
        let was_const = self.symbols.lookup(&name).is_some_and(|v| v.is_const);
        if was_const {
            self.error(line_no, format!("cannot reinitialize constant '{name}'"));
        }
        if !self.symbols.register(&name, ty, is_const) {
            self.error(
                line_no,
                format!("too many variables (limit {MAX_VARIABLES}); '{name}' discarded"),
            );
            return;
        }
        let prefix = if is_const { "const " } else { "" };
        let c_ty = ty.c_name();
        let text = match init {
            Some(expr) => format!("    {prefix}{c_ty} {name} = {expr};\n"),
            None => match ty.default_init() {
                Some(default) => format!("    {prefix}{c_ty} {name} = {default};\n"),
                None => format!("    {prefix}{c_ty} {name};\n"),
            },
        };
        self.out().push_str(&text);
        self.logger.log(&LogEvent::VarDecl {
            line: line_no,
            name: &name,
            ty: ty.label(),
            is_const,
        });
    }

    fn emit_print(&mut self, line_no: usize, payload: Option<String>) {
        let expr = match payload {
            Some(p) if !p.is_empty() => p,
            Some(_) => {
                self.error(line_no, "empty print statement");
                self.out().push_str("    printf(\"\\n\");\n");
                return;
            }
            None => {
                self.error(line_no, "malformed print statement (expected 'print(expr)')");
                return;
            }
        };
        let ty = infer(&expr, &self.symbols);
        let expr = lexer::rewrite_list_indexing(&expr, &self.symbols);
        let text = match ty {
            SemType::Str => format!("    printf(\"%s\\n\", {expr});\n"),
            SemType::Bool => {
                format!("    printf(\"%s\\n\", ({expr}) ? \"true\" : \"false\");\n")
            }
            SemType::Float => format!("    printf(\"%f\\n\", {expr});\n"),
            SemType::List => format!("    print_list(&{expr});\n"),
            SemType::Tuple => format!("    print_tuple(&{expr});\n"),
            _ => format!("    printf(\"%d\\n\", (int)({expr}));\n"),
        };
        self.out().push_str(&text);
        self.logger.log(&LogEvent::Print {
            line: line_no,
            ty: ty.label(),
            expr: &expr,
        });
    }

    /// Empty block conditions are recoverable: `if` falls back to always-true,
    /// `while` to never-loop.
    fn checked_cond(&mut self, line_no: usize, cond: String, kw: &str, fallback: &str) -> String {
        if cond.is_empty() {
            self.error(line_no, format!("'{kw}' with no condition"));
            fallback.to_string()
        } else {
            cond
        }
    }

    fn emit_if(&mut self, line_no: usize, indent: usize, cond: String, brace: bool) {
        let cond = self.checked_cond(line_no, cond, "if", "1");
        if !self.open_block(line_no, indent, BlockKind::If, brace, 1) {
            return;
        }
        let text = format!("    if ({cond}) {{\n");
        self.out().push_str(&text);
    }

    fn emit_while(&mut self, line_no: usize, indent: usize, cond: String, brace: bool) {
        let cond = self.checked_cond(line_no, cond, "while", "0");
        if !self.open_block(line_no, indent, BlockKind::While, brace, 1) {
            return;
        }
        let text = format!("    while ({cond}) {{\n");
        self.out().push_str(&text);
    }

    fn emit_elif(&mut self, line_no: usize, indent: usize, cond: String, brace: bool) {
        let cond = self.checked_cond(line_no, cond, "elif", "1");
        let chainable = self
            .blocks
            .top()
            .map(|b| b.kind.chainable())
            .unwrap_or(false);
        if chainable {
            let from = match self.blocks.top() {
                Some(b) => b.kind.label(),
                None => "if",
            };
            self.blocks.chain(BlockKind::Elif);
            self.logger.log(&LogEvent::BlockChain {
                line: line_no,
                from,
                to: "elif",
            });
            let text = format!("    }} else if ({cond}) {{\n");
            self.out().push_str(&text);
        } else {
            self.error(line_no, "'elif' without a matching 'if'");
            // Keep braces balanced: open a fresh conditional instead.
            if self.open_block(line_no, indent, BlockKind::Elif, brace, 1) {
                let text = format!("    if ({cond}) {{\n");
                self.out().push_str(&text);
            }
        }
    }

    fn emit_else(&mut self, line_no: usize, indent: usize, brace: bool) {
        let chainable = self
            .blocks
            .top()
            .map(|b| b.kind.chainable())
            .unwrap_or(false);
        if chainable {
            let from = match self.blocks.top() {
                Some(b) => b.kind.label(),
                None => "if",
            };
            self.blocks.chain(BlockKind::Else);
            self.logger.log(&LogEvent::BlockChain {
                line: line_no,
                from,
                to: "else",
            });
            self.out().push_str("    } else {\n");
        } else {
            self.error(line_no, "'else' without a matching 'if'");
            if self.open_block(line_no, indent, BlockKind::Else, brace, 1) {
                self.out().push_str("    {\n");
            }
        }
    }

    fn emit_for_to(
        &mut self,
        line_no: usize,
        indent: usize,
        var: Option<String>,
        start: Option<String>,
        end: Option<String>,
        step: Option<String>,
        brace: bool,
    ) {
        let var = match var {
            Some(v) => v,
            None => {
                self.error(line_no, "for loop missing loop variable");
                "i".to_string()
            }
        };
        let start = match start {
            Some(s) => s,
            None => {
                self.error(
                    line_no,
                    "for loop missing start value (expected 'for V = A to B')",
                );
                "0".to_string()
            }
        };
        let end = match end {
            Some(e) => e,
            None => {
                self.error(line_no, "for loop missing 'to' bound");
                "0".to_string()
            }
        };
        let step = match step {
            Some(s) if s.is_empty() => {
                self.error(line_no, "for loop step is empty");
                Some("1".to_string())
            }
            other => other,
        };
        if !self.symbols.register(&var, SemType::Int, false) {
            self.error(
                line_no,
                format!("too many variables (limit {MAX_VARIABLES}); '{var}' discarded"),
            );
        }
        if !self.open_block(line_no, indent, BlockKind::For, brace, 1) {
            return;
        }
        let advance = match &step {
            Some(s) => format!("{var} += {s}"),
            None => format!("{var}++"),
        };
        let text = format!("    for (int {var} = {start}; {var} <= {end}; {advance}) {{\n");
        self.out().push_str(&text);
    }

    fn emit_for_in(
        &mut self,
        line_no: usize,
        indent: usize,
        var: String,
        iter: String,
        brace: bool,
    ) {
        let var = if var.is_empty() {
            self.error(line_no, "for-in loop missing loop variable");
            "i".to_string()
        } else {
            var
        };
        let iter = if iter.is_empty() {
            self.error(line_no, "for-in loop missing iterable");
            "\"\"".to_string()
        } else {
            iter
        };
        let ty = infer(&iter, &self.symbols);
        let idx = format!("{var}_idx");
        let (text, elem_ty, scopes) = match ty {
            SemType::List | SemType::Tuple => (
                format!(
                    "    for (int {idx} = 0; {idx} < {iter}.size; {idx}++) {{ int {var} = {iter}.data[{idx}];\n"
                ),
                SemType::Int,
                1,
            ),
            SemType::Dict => (
                format!(
                    "    for (int {idx} = 0; {idx} < {iter}.size; {idx}++) {{ char* {var} = {iter}.keys[{idx}];\n"
                ),
                SemType::Str,
                1,
            ),
            SemType::Str => {
                // The alias scopes the string once, so the loop can index it
                // whether the iterable was a literal or a variable.
                let alias = format!("{var}_it");
                (
                    format!(
                        "    {{ char* {alias} = {iter}; for (int {idx} = 0; {alias}[{idx}]; {idx}++) {{ char {var} = {alias}[{idx}];\n"
                    ),
                    SemType::Int,
                    2,
                )
            }
            _ => {
                // Unknown iterables get the string pattern under a null guard.
                let alias = format!("{var}_it");
                (
                    format!(
                        "    {{ char* {alias} = {iter}; for (int {idx} = 0; {alias} && {alias}[{idx}]; {idx}++) {{ char {var} = {alias}[{idx}];\n"
                    ),
                    SemType::Int,
                    2,
                )
            }
        };
        if !self.symbols.register(&var, elem_ty, false) {
            self.error(
                line_no,
                format!("too many variables (limit {MAX_VARIABLES}); '{var}' discarded"),
            );
        }
        if !self.open_block(line_no, indent, BlockKind::ForIn, brace, scopes) {
            return;
        }
        self.logger.log(&LogEvent::ForIn {
            line: line_no,
            var: &var,
            ty: ty.label(),
            iter: &iter,
        });
        self.out().push_str(&text);
    }

    fn emit_func(&mut self, line_no: usize, indent: usize, name: String, brace: bool) {
        if name.is_empty() {
            self.error(line_no, "function declaration missing a name");
            return;
        }
        if name == "main" {
            self.warn(line_no, "'func main' ignored: the entry point is synthesized");
            return;
        }
        if self.in_function {
            self.error(line_no, "nested function definitions are not supported");
            return;
        }
        if !self.blocks.is_empty() {
            self.error(line_no, "function declared inside a block");
            return;
        }
        if self.functions.iter().any(|f| f.name == name) {
            self.error(line_no, format!("duplicate function '{name}'"));
        }
        if self.functions.len() >= MAX_FUNCTIONS {
            self.error(
                line_no,
                format!("too many functions (limit {MAX_FUNCTIONS}); '{name}' discarded"),
            );
            return;
        }
        if !self.open_block(line_no, indent, BlockKind::Func, brace, 0) {
            return;
        }
        self.logger.log(&LogEvent::FuncDecl {
            line: line_no,
            name: &name,
        });
        self.functions.push(Function {
            name,
            body: String::new(),
        });
        self.in_function = true;
    }

    fn emit_runtime_call(&mut self, line_no: usize, call: RuntimeFn, args: Option<Vec<String>>) {
        let args = match args {
            Some(a) => a,
            None => {
                self.error(line_no, format!("malformed '{}' call", call.label()));
                return;
            }
        };
        if args.len() < call.min_args() {
            self.error(
                line_no,
                format!(
                    "'{}' expects at least {} argument(s), got {}",
                    call.label(),
                    call.min_args(),
                    args.len()
                ),
            );
            return;
        }
        if call == RuntimeFn::Append {
            let target_ty = self.symbols.lookup(&args[0]).map(|v| v.ty);
            if let Some(ty) = target_ty {
                if ty != SemType::List {
                    self.error(
                        line_no,
                        format!("'append' target '{}' is {}, not list", args[0], ty.label()),
                    );
                }
            }
        }
        let text = format!(
            "    {}(&{}, {});\n",
            call.c_name(),
            args[0],
            args[1..].join(", ")
        );
        self.out().push_str(&text);
        let snippet = text.trim().to_string();
        self.logger.log(&LogEvent::Stmt {
            line: line_no,
            code: &snippet,
        });
    }

    fn emit_end(&mut self, line_no: usize) {
        match self.blocks.pop() {
            Some(block) => {
                if block.discipline == Discipline::Brace {
                    self.warn(
                        line_no,
                        format!("'end' closes a block opened with '{{' (line {})", block.line),
                    );
                }
                self.close_block(line_no, &block);
            }
            None => self.error(line_no, "'end' with no open block"),
        }
    }

    fn emit_close_brace(&mut self, line_no: usize) {
        match self.blocks.pop() {
            Some(block) => {
                if block.discipline != Discipline::Brace {
                    self.warn(
                        line_no,
                        format!("'}}' closes a block not opened with '{{' (line {})", block.line),
                    );
                }
                self.close_block(line_no, &block);
            }
            None => self.error(line_no, "stray '}' with no open block"),
        }
    }

    fn emit_raw(&mut self, line_no: usize, code: String) {
        let rewritten = lexer::rewrite_list_indexing(&code, &self.symbols);
        match bare_call_name(&rewritten) {
            Some(name) if self.functions.iter().any(|f| f.name == name) => {
                let name = name.to_string();
                self.logger.log(&LogEvent::FuncCall {
                    line: line_no,
                    name: &name,
                });
            }
            _ => {
                self.logger.log(&LogEvent::Stmt {
                    line: line_no,
                    code: &rewritten,
                });
            }
        }
        let mut text = format!("    {rewritten}");
        if !rewritten.ends_with(';') {
            text.push(';');
        }
        text.push('\n');
        self.out().push_str(&text);
    }

    /// Finish the pass: drain auto-closable blocks, report anything still
    /// open against its opening line, and assemble the output.
    pub fn finish(mut self) -> Result<CompileOutput, Diagnostics> {
        let line_no = self.last_line;
        if self.auto_close {
            self.drain_indented(line_no, 0);
        }
        while let Some(block) = self.blocks.pop() {
            if block.kind == BlockKind::Func {
                self.in_function = false;
            }
            let kind = block.kind.label();
            let closer = block.discipline.closer();
            self.error(
                block.line,
                format!("unclosed '{kind}' block ({closer} expected)"),
            );
        }
        if self.diagnostics.has_errors() {
            return Err(self.diagnostics);
        }
        let code = self.assemble();
        self.logger.log(&LogEvent::Emit {
            bytes: code.len(),
            functions: self.functions.len(),
        });
        Ok(CompileOutput {
            code,
            diagnostics: self.diagnostics,
        })
    }

    /// Fixed assembly order: runtime blob, prototypes, function bodies,
    /// wrapped `main`.
    fn assemble(&self) -> String {
        let mut out = String::with_capacity(RUNTIME.len() + self.main_body.len() + 1024);
        out.push_str(RUNTIME);
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out.push('\n');
        for func in &self.functions {
            out.push_str(&format!("void {}(void);\n", func.name));
        }
        if !self.functions.is_empty() {
            out.push('\n');
        }
        for func in &self.functions {
            out.push_str(&format!("void {}(void) {{\n{}}}\n\n", func.name, func.body));
        }
        out.push_str("int main(void) {\n");
        out.push_str(&self.main_body);
        out.push_str("    return 0;\n}\n");
        out
    }
}

/// `name` for a raw statement of the exact shape `name()` (trailing `;`
/// tolerated), used to spot calls to user functions.
fn bare_call_name(code: &str) -> Option<&str> {
    let code = code.trim().trim_end_matches(';').trim_end();
    let name = leading_identifier(code)?;
    let rest = code[name.len()..].trim_start();
    if rest == "()" {
        Some(name)
    } else {
        None
    }
}
