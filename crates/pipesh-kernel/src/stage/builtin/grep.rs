//! grep — keep lines containing a fixed substring.

use crate::error::ShellResult;
use crate::stage::{transform_lines, StageAbort, StageIo, StageKind};

use super::required_arg;

/// Validate `grep <query>`. The query is the rest of the line, spaces and
/// all.
pub fn build(command: &str) -> ShellResult<StageKind> {
    let query = required_arg(command)?.to_string();
    Ok(StageKind::Grep { query })
}

pub async fn run(query: &str, io: &mut StageIo) -> Result<(), StageAbort> {
    transform_lines(io, |line| line.contains(query).then_some(line)).await
}
