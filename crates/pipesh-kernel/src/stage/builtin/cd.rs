//! cd — change the working directory.
//!
//! The target is resolved and checked when the pipeline is built; the
//! worker only swaps the shared directory.

use crate::context::ShellContext;
use crate::error::{ShellError, ShellResult};
use crate::stage::{CdTarget, StageKind};

use super::required_arg;

/// Validate `cd <dir|.|..>`.
pub fn build(command: &str, ctx: &ShellContext) -> ShellResult<StageKind> {
    let target = match required_arg(command)? {
        "." => CdTarget::Current,
        ".." => CdTarget::Parent,
        arg => {
            let path = ctx.cwd.resolve(arg);
            if !path.is_dir() {
                return Err(ShellError::DirectoryNotFound(command.to_string()));
            }
            CdTarget::Path(path)
        }
    };
    Ok(StageKind::Cd { target })
}

/// Apply the directory change.
pub fn run(target: &CdTarget, ctx: &ShellContext) {
    match target {
        CdTarget::Current => {}
        CdTarget::Parent => {
            // At the filesystem root there is no parent; stay put.
            if let Some(parent) = ctx.cwd.get().parent() {
                ctx.cwd.set(parent);
            }
        }
        CdTarget::Path(path) => ctx.cwd.set(path.clone()),
    }
}
