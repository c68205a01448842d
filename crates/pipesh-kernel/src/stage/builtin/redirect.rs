//! `>` — append every input line to a file.
//!
//! An existing destination is removed when the stage is built; the worker
//! recreates it and appends.

use std::path::Path;

use tokio::io::{AsyncWriteExt, BufWriter};

use crate::context::ShellContext;
use crate::error::ShellResult;
use crate::stage::{StageAbort, StageIo, StageKind};

use super::required_arg;

/// Validate `> <path>` and clear any existing destination file.
pub fn build(command: &str, ctx: &ShellContext) -> ShellResult<StageKind> {
    let arg = required_arg(command)?;
    let path = ctx.cwd.resolve(arg);
    if path.is_file() {
        if let Err(e) = std::fs::remove_file(&path) {
            tracing::warn!(path = %path.display(), "redirect: cannot clear destination: {}", e);
        }
    }
    Ok(StageKind::Redirect { path })
}

/// Append each line, newline-terminated.
///
/// If the file cannot be opened or written, input is still drained so the
/// stages before this one finish normally.
pub async fn run(path: &Path, io: &mut StageIo) -> Result<(), StageAbort> {
    let file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await;
    let mut writer = match file {
        Ok(file) => Some(BufWriter::new(file)),
        Err(e) => {
            tracing::warn!(path = %path.display(), "redirect: cannot open destination: {}", e);
            None
        }
    };

    while let Some(line) = io.next_line().await? {
        let Some(out) = writer.as_mut() else {
            continue;
        };
        let written = async {
            out.write_all(line.as_bytes()).await?;
            out.write_all(b"\n").await
        }
        .await;
        if let Err(e) = written {
            tracing::warn!(path = %path.display(), "redirect: write failed: {}", e);
            writer = None;
        }
    }

    if let Some(mut out) = writer {
        if let Err(e) = out.flush().await {
            tracing::warn!(path = %path.display(), "redirect: flush failed: {}", e);
        }
    }
    Ok(())
}
