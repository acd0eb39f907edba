//! Animated GIF optimization through the external `gifsicle` executable.

use super::backend::BackendError;
use super::params::AnimationParams;
use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

pub const TOOL: &str = "gifsicle";

/// Build the argument list: flags, pass-through options, input, output.
pub fn arguments(params: &AnimationParams) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    if params.optimize {
        args.push("--optimize".into());
    }
    if let Some(colors) = params.colors {
        args.push("--colors".into());
        args.push(colors.to_string().into());
    }
    args.extend(params.options.iter().map(OsString::from));
    args.push(params.source.as_os_str().to_owned());
    args.push("--output".into());
    args.push(params.output.as_os_str().to_owned());
    args
}

/// Run `gifsicle` at `program` with `params`.
pub fn run(program: &Path, params: &AnimationParams) -> Result<(), BackendError> {
    if let Some(parent) = params.output.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let output = Command::new(program).args(arguments(params)).output()?;
    if !output.status.success() {
        return Err(BackendError::ToolFailed {
            tool: TOOL,
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let stderr = String::from_utf8_lossy(&output.stderr);
    for line in stderr.lines().filter(|l| !l.trim().is_empty()) {
        tracing::debug!(tool = TOOL, "{line}");
    }
    Ok(())
}
