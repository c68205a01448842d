//! ls — emit the entry names of the working directory.

use crate::context::ShellContext;
use crate::stage::{StageAbort, StageIo};

/// List the working directory, sorted by name.
pub async fn run(io: &mut StageIo, ctx: &ShellContext) -> Result<(), StageAbort> {
    let cwd = ctx.cwd.get();
    let mut entries = match tokio::fs::read_dir(&cwd).await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::warn!(cwd = %cwd.display(), "ls: cannot read directory: {}", e);
            return Ok(());
        }
    };

    let mut names = Vec::new();
    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => names.push(entry.file_name().to_string_lossy().into_owned()),
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(cwd = %cwd.display(), "ls: error while listing: {}", e);
                break;
            }
        }
    }
    names.sort();

    for name in names {
        io.emit(name)?;
    }
    Ok(())
}
