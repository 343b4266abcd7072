// External executables the renderer shells out to.
//
// An `ExternalTool` is resolved once against PATH (via `which`) when the
// renderer is built, then invoked synchronously per asset. Output is
// captured; a non-zero exit becomes `RenderError::ToolFailed` with the
// tool's stderr attached.

use crate::error::RenderError;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Clone)]
pub struct ExternalTool {
    name: String,
    program: PathBuf,
}

impl ExternalTool {
    /// Find `name` on PATH. Absolute and relative paths are accepted as-is
    /// when they point at an executable.
    pub fn resolve(name: &str) -> Result<Self, RenderError> {
        let program = which::which(name).map_err(|_| RenderError::ToolMissing {
            tool: name.to_string(),
        })?;
        Ok(ExternalTool {
            name: name.to_string(),
            program,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Run to completion. Fails if the process can't start or exits non-zero.
    pub fn run<I, S>(&self, args: I) -> Result<(), RenderError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(&self.program);
        command.args(args);
        tracing::trace!("running {:?}", command);

        let output = command.output()?;
        if output.status.success() {
            return Ok(());
        }
        Err(RenderError::ToolFailed {
            tool: self.name.clone(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        })
    }
}
