//! pwd — emit the working directory.

use crate::context::ShellContext;
use crate::stage::{StageAbort, StageIo};

pub fn run(io: &mut StageIo, ctx: &ShellContext) -> Result<(), StageAbort> {
    io.emit(ctx.cwd.get().to_string_lossy())
}

#[cfg(test)]
mod tests {
    use crate::context::ShellContext;
    use crate::stage::builtin::testing::run_lines;
    use crate::stage::StageKind;

    #[tokio::test]
    async fn test_pwd() {
        let lines = run_lines(StageKind::Pwd, &[], ShellContext::new("/srv/data")).await;
        assert_eq!(lines, vec!["/srv/data"]);
    }
}
