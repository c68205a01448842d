//! tail — keep the last lines of the input.

use std::collections::VecDeque;

use crate::stage::{StageAbort, StageIo};

/// Number of lines kept.
pub const TAIL_LIMIT: usize = 10;

/// Drain the input into a ring of the most recent `TAIL_LIMIT` lines, then
/// emit them oldest first.
pub async fn run(io: &mut StageIo) -> Result<(), StageAbort> {
    let mut ring = VecDeque::with_capacity(TAIL_LIMIT);
    while let Some(line) = io.next_line().await? {
        if ring.len() == TAIL_LIMIT {
            ring.pop_front();
        }
        ring.push_back(line);
    }

    for line in ring {
        io.emit(line)?;
    }
    Ok(())
}
