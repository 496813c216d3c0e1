//! Compile modes and the knobs they select
//!
//! The mode decides four things at once: whether indentation auto-closes
//! blocks, how chatty the logger is, which optimization flags the C toolchain
//! gets, and whether the produced binary is run immediately.

use clap::ValueEnum;
use std::fmt;
use std::str::FromStr;

use crate::error::AlangError;
use crate::logger::LogMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[value(rename_all = "snake_case")]
pub enum CompileMode {
    #[default]
    Optimized,
    Raw,
    Debug,
    DebugOpt,
    DebugRaw,
}

impl CompileMode {
    /// Whether indent-discipline blocks close implicitly. Raw modes require
    /// explicit `end` or `}`.
    pub fn auto_close(self) -> bool {
        !matches!(self, CompileMode::Raw | CompileMode::DebugRaw)
    }

    pub fn log_mode(self) -> LogMode {
        match self {
            CompileMode::Debug => LogMode::Machine,
            CompileMode::DebugOpt | CompileMode::DebugRaw => LogMode::Human,
            CompileMode::Optimized | CompileMode::Raw => LogMode::Off,
        }
    }

    /// Flags passed to the downstream C compiler.
    pub fn cc_flags(self) -> &'static [&'static str] {
        match self {
            CompileMode::Optimized => &["-Ofast", "-w"],
            CompileMode::Raw | CompileMode::DebugRaw => &["-O1", "-g"],
            CompileMode::Debug | CompileMode::DebugOpt => &["-Ofast", "-g"],
        }
    }

    /// Whether the produced binary is run right after compilation.
    pub fn auto_run(self) -> bool {
        matches!(
            self,
            CompileMode::Debug | CompileMode::DebugOpt | CompileMode::DebugRaw
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            CompileMode::Optimized => "optimized",
            CompileMode::Raw => "raw",
            CompileMode::Debug => "debug",
            CompileMode::DebugOpt => "debug_opt",
            CompileMode::DebugRaw => "debug_raw",
        }
    }
}

impl fmt::Display for CompileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CompileMode {
    type Err = AlangError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "optimized" => Ok(CompileMode::Optimized),
            "raw" => Ok(CompileMode::Raw),
            "debug" => Ok(CompileMode::Debug),
            "debug_opt" => Ok(CompileMode::DebugOpt),
            "debug_raw" => Ok(CompileMode::DebugRaw),
            other => Err(AlangError::UnknownMode(other.to_string())),
        }
    }
}
