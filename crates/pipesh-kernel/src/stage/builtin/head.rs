//! head — forward the first lines, then stop reading.

use crate::stage::{StageAbort, StageIo};

/// Number of lines kept.
pub const HEAD_LIMIT: usize = 10;

/// Forward up to `HEAD_LIMIT` lines.
///
/// Input after the limit is abandoned: the receiver is dropped so the
/// upstream stage sees a closed channel instead of filling a queue nobody
/// reads.
pub async fn run(io: &mut StageIo) -> Result<(), StageAbort> {
    let mut forwarded = 0;
    while forwarded < HEAD_LIMIT {
        match io.next_line().await? {
            Some(line) => {
                io.emit(line)?;
                forwarded += 1;
            }
            None => break,
        }
    }
    io.close_input();
    Ok(())
}
