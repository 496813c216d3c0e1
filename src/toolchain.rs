//! External C toolchain driver
//!
//! Invokes gcc on the emitted translation unit and, in debug modes, runs the
//! produced binary. The compiler's own diagnostics stay on stderr; the
//! produced program inherits stdout untouched.

use std::process::Command;

use crate::error::{AlangError, Result};
use crate::logger::{LogEvent, Logger};
use crate::mode::CompileMode;

/// Emitted C translation unit, written to the working directory.
pub const OUTPUT_FILE: &str = "output.c";

/// Name of the produced native binary.
pub const BINARY_NAME: &str = "program";

/// Compile `output.c` to `program` with the mode's flag set.
pub fn compile_c(mode: CompileMode, logger: &Logger) -> Result<()> {
    let flags = mode.cc_flags();
    let display = format!("gcc {} {OUTPUT_FILE} -o {BINARY_NAME} -lm", flags.join(" "));
    logger.log(&LogEvent::GccCmd { cmd: &display });

    let status = Command::new("gcc")
        .args(flags)
        .arg(OUTPUT_FILE)
        .arg("-o")
        .arg(BINARY_NAME)
        .arg("-lm")
        .status()?;
    if status.success() {
        Ok(())
    } else {
        Err(AlangError::ToolchainFailed {
            status: status.code().unwrap_or(-1),
        })
    }
}

/// Run the produced binary and report its exit code.
pub fn run_binary(logger: &Logger) -> Result<i32> {
    let cmd = format!("./{BINARY_NAME}");
    logger.log(&LogEvent::RunStart { cmd: &cmd });
    let status = Command::new(&cmd).status()?;
    let code = status.code().unwrap_or(-1);
    logger.log(&LogEvent::RunEnd { status: code });
    Ok(code)
}
