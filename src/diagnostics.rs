//! Compile diagnostics - accumulated errors and warnings
//!
//! Handlers record a diagnostic and continue with a safe substitution, so one
//! pass over the input reports every problem it can find. Only after the whole
//! input is consumed does the driver decide whether output may be written.

use serde::Serialize;
use std::fmt::Write as _;

/// Hard ceiling on retained diagnostic records; further records are dropped.
pub const MAX_DIAGNOSTICS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single recorded problem, attributed to a source line.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub message: String,
    pub line: usize,
    pub severity: Severity,
}

/// Insertion-ordered diagnostic list for one compilation unit.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    pub records: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    pub fn error(&mut self, line: usize, message: impl Into<String>) {
        self.add(Diagnostic {
            message: message.into(),
            line,
            severity: Severity::Error,
        });
    }

    pub fn warning(&mut self, line: usize, message: impl Into<String>) {
        self.add(Diagnostic {
            message: message.into(),
            line,
            severity: Severity::Warning,
        });
    }

    fn add(&mut self, diag: Diagnostic) {
        if self.records.len() < MAX_DIAGNOSTICS {
            self.records.push(diag);
        }
    }

    /// Whether any error-severity record exists; warnings alone do not count.
    pub fn has_errors(&self) -> bool {
        self.records.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn error_count(&self) -> usize {
        self.records
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.records
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Render the grouped report: errors first, then warnings, each group
    /// numbered from 1, followed by a per-severity summary line.
    pub fn to_text(&self) -> String {
        if self.records.is_empty() {
            return String::new();
        }
        let mut out = format!("Found {} issue(s)\n", self.records.len());
        for (title, severity) in [("Errors", Severity::Error), ("Warnings", Severity::Warning)] {
            let group: Vec<&Diagnostic> = self
                .records
                .iter()
                .filter(|d| d.severity == severity)
                .collect();
            if group.is_empty() {
                continue;
            }
            let _ = write!(out, "\n{title}:\n");
            for (i, diag) in group.iter().enumerate() {
                let _ = writeln!(out, "  {}. line {}: {}", i + 1, diag.line, diag.message);
            }
        }
        let _ = write!(
            out,
            "\n{} error(s), {} warning(s)\n",
            self.error_count(),
            self.warning_count()
        );
        out
    }
}
