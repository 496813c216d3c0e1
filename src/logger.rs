//! Structured diagnostic event stream
//!
//! Every handler reports what it did before appending output. Human mode
//! renders an ANSI-colored category tag plus prose; machine mode renders
//! colon-delimited fields with `:` and newlines escaped inside code snippets.
//! Both streams go to stderr so they never mix with the produced program's
//! own output.

/// Logger verbosity, selected by the compile mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogMode {
    #[default]
    Off,
    Human,
    Machine,
}

/// One translation event. Borrowed fields keep the hot path allocation-free.
#[derive(Debug)]
pub enum LogEvent<'a> {
    VarDecl {
        line: usize,
        name: &'a str,
        ty: &'a str,
        is_const: bool,
    },
    BlockOpen {
        line: usize,
        kind: &'a str,
        discipline: &'a str,
    },
    BlockClose {
        line: usize,
        opened_at: usize,
        kind: &'a str,
    },
    BlockChain {
        line: usize,
        from: &'a str,
        to: &'a str,
    },
    FuncDecl {
        line: usize,
        name: &'a str,
    },
    FuncCall {
        line: usize,
        name: &'a str,
    },
    Print {
        line: usize,
        ty: &'a str,
        expr: &'a str,
    },
    ForIn {
        line: usize,
        var: &'a str,
        ty: &'a str,
        iter: &'a str,
    },
    Stmt {
        line: usize,
        code: &'a str,
    },
    Parse {
        line: usize,
        code: &'a str,
    },
    Emit {
        bytes: usize,
        functions: usize,
    },
    GccCmd {
        cmd: &'a str,
    },
    RunStart {
        cmd: &'a str,
    },
    RunEnd {
        status: i32,
    },
    Error {
        line: usize,
        message: &'a str,
    },
    Warning {
        line: usize,
        message: &'a str,
    },
}

impl LogEvent<'_> {
    pub fn category(&self) -> &'static str {
        match self {
            LogEvent::VarDecl { .. } => "VAR_DECL",
            LogEvent::BlockOpen { .. } => "BLOCK_OPEN",
            LogEvent::BlockClose { .. } => "BLOCK_CLOSE",
            LogEvent::BlockChain { .. } => "BLOCK_CHAIN",
            LogEvent::FuncDecl { .. } => "FUNC_DECL",
            LogEvent::FuncCall { .. } => "FUNC_CALL",
            LogEvent::Print { .. } => "PRINT",
            LogEvent::ForIn { .. } => "FOR_IN",
            LogEvent::Stmt { .. } => "STMT",
            LogEvent::Parse { .. } => "PARSE",
            LogEvent::Emit { .. } => "EMIT",
            LogEvent::GccCmd { .. } => "GCC_CMD",
            LogEvent::RunStart { .. } => "RUN_START",
            LogEvent::RunEnd { .. } => "RUN_END",
            LogEvent::Error { .. } => "ERROR",
            LogEvent::Warning { .. } => "WARNING",
        }
    }

    /// ANSI color code for the human-mode category tag.
    fn color(&self) -> &'static str {
        match self {
            LogEvent::Error { .. } => "31",
            LogEvent::Warning { .. } => "33",
            LogEvent::VarDecl { .. } | LogEvent::FuncDecl { .. } => "32",
            LogEvent::BlockOpen { .. }
            | LogEvent::BlockClose { .. }
            | LogEvent::BlockChain { .. } => "36",
            LogEvent::Print { .. } | LogEvent::ForIn { .. } | LogEvent::FuncCall { .. } => "35",
            LogEvent::Emit { .. }
            | LogEvent::GccCmd { .. }
            | LogEvent::RunStart { .. }
            | LogEvent::RunEnd { .. } => "34",
            LogEvent::Stmt { .. } | LogEvent::Parse { .. } => "90",
        }
    }
}

/// Escape a code snippet for the machine stream: field separators and
/// newlines must not split the record.
pub fn escape_snippet(s: &str) -> String {
    s.replace('\n', "\\n").replace(':', "\\:")
}

/// Render the human (colored prose) form of an event.
pub fn render_human(event: &LogEvent) -> String {
    let tag = format!("\x1b[{}m[{}]\x1b[0m", event.color(), event.category());
    let prose = match event {
        LogEvent::VarDecl {
            line,
            name,
            ty,
            is_const,
        } => {
            let prefix = if *is_const { "const " } else { "" };
            format!("line {line}: declared {prefix}{ty} '{name}'")
        }
        LogEvent::BlockOpen {
            line,
            kind,
            discipline,
        } => format!("line {line}: opened {kind} block ({discipline})"),
        LogEvent::BlockClose {
            line,
            opened_at,
            kind,
        } => format!("line {line}: closed {kind} block opened at line {opened_at}"),
        LogEvent::BlockChain { line, from, to } => {
            format!("line {line}: {from} block continues as {to}")
        }
        LogEvent::FuncDecl { line, name } => format!("line {line}: function '{name}'"),
        LogEvent::FuncCall { line, name } => format!("line {line}: call to '{name}'"),
        LogEvent::Print { line, ty, expr } => {
            format!("line {line}: print of {ty} expression `{expr}`")
        }
        LogEvent::ForIn {
            line,
            var,
            ty,
            iter,
        } => format!("line {line}: iterate '{var}' over {ty} `{iter}`"),
        LogEvent::Stmt { line, code } => format!("line {line}: `{code}`"),
        LogEvent::Parse { line, code } => format!("line {line}: `{code}`"),
        LogEvent::Emit { bytes, functions } => {
            format!("assembled {bytes} bytes ({functions} function(s))")
        }
        LogEvent::GccCmd { cmd } => cmd.to_string(),
        LogEvent::RunStart { cmd } => cmd.to_string(),
        LogEvent::RunEnd { status } => format!("exit status {status}"),
        LogEvent::Error { line, message } => format!("line {line}: {message}"),
        LogEvent::Warning { line, message } => format!("line {line}: {message}"),
    };
    format!("{tag} {prose}")
}

/// Render the machine (colon-delimited) form of an event.
pub fn render_machine(event: &LogEvent) -> String {
    let cat = event.category();
    match event {
        LogEvent::VarDecl {
            line,
            name,
            ty,
            is_const,
        } => format!("{cat}:{line}:{name}:{ty}:{}", u8::from(*is_const)),
        LogEvent::BlockOpen {
            line,
            kind,
            discipline,
        } => format!("{cat}:{line}:{kind}:{discipline}"),
        LogEvent::BlockClose {
            line,
            opened_at,
            kind,
        } => format!("{cat}:{line}:{opened_at}:{kind}"),
        LogEvent::BlockChain { line, from, to } => format!("{cat}:{line}:{from}:{to}"),
        LogEvent::FuncDecl { line, name } => format!("{cat}:{line}:{name}"),
        LogEvent::FuncCall { line, name } => format!("{cat}:{line}:{name}"),
        LogEvent::Print { line, ty, expr } => {
            format!("{cat}:{line}:{ty}:{}", escape_snippet(expr))
        }
        LogEvent::ForIn {
            line,
            var,
            ty,
            iter,
        } => format!("{cat}:{line}:{var}:{ty}:{}", escape_snippet(iter)),
        LogEvent::Stmt { line, code } => format!("{cat}:{line}:{}", escape_snippet(code)),
        LogEvent::Parse { line, code } => format!("{cat}:{line}:{}", escape_snippet(code)),
        LogEvent::Emit { bytes, functions } => format!("{cat}:{bytes}:{functions}"),
        LogEvent::GccCmd { cmd } => format!("{cat}:{}", escape_snippet(cmd)),
        LogEvent::RunStart { cmd } => format!("{cat}:{}", escape_snippet(cmd)),
        LogEvent::RunEnd { status } => format!("{cat}:{status}"),
        LogEvent::Error { line, message } => {
            format!("{cat}:{line}:{}", escape_snippet(message))
        }
        LogEvent::Warning { line, message } => {
            format!("{cat}:{line}:{}", escape_snippet(message))
        }
    }
}

/// Event sink. Stateless; copies are cheap and share nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Logger {
    mode: LogMode,
}

impl Logger {
    pub fn new(mode: LogMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> LogMode {
        self.mode
    }

    pub fn log(&self, event: &LogEvent) {
        match self.mode {
            LogMode::Off => {}
            LogMode::Human => eprintln!("{}", render_human(event)),
            LogMode::Machine => eprintln!("{}", render_machine(event)),
        }
    }
}
