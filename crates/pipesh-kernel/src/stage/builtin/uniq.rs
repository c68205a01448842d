//! uniq — drop every line that was already seen, anywhere in the input.

use std::collections::HashSet;

use crate::stage::{transform_lines, StageAbort, StageIo};

pub async fn run(io: &mut StageIo) -> Result<(), StageAbort> {
    let mut seen = HashSet::new();
    transform_lines(io, |line| seen.insert(line.clone()).then_some(line)).await
}
