//! print — the implicit terminal stage that writes to the console.

use crate::context::ShellContext;
use crate::stage::{transform_lines, StageAbort, StageIo};

pub async fn run(io: &mut StageIo, ctx: &ShellContext) -> Result<(), StageAbort> {
    let mut failed = false;
    transform_lines(io, |line| {
        if let Err(e) = ctx.console.write_line(&line) {
            // Keep draining so upstream finishes; report once.
            if !failed {
                tracing::warn!("print: console write failed: {}", e);
                failed = true;
            }
        }
        None
    })
    .await
}
