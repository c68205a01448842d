//! cat — emit the lines of a file.

use std::path::Path;

use crate::context::ShellContext;
use crate::error::{ShellError, ShellResult};
use crate::stage::{StageAbort, StageIo, StageKind};

use super::required_arg;

/// Validate `cat <path>`: the path must name an existing regular file.
pub fn build(command: &str, ctx: &ShellContext) -> ShellResult<StageKind> {
    let arg = required_arg(command)?;
    let path = ctx.cwd.resolve(arg);
    if !path.is_file() {
        return Err(ShellError::FileNotFound(command.to_string()));
    }
    Ok(StageKind::Cat { path })
}

/// Read the whole file and push it line by line.
///
/// A file that disappeared after `build` is logged and produces no lines.
pub async fn run(path: &Path, io: &mut StageIo) -> Result<(), StageAbort> {
    let data = match tokio::fs::read(path).await {
        Ok(data) => data,
        Err(e) => {
            tracing::warn!(path = %path.display(), "cat: read failed: {}", e);
            return Ok(());
        }
    };

    for line in String::from_utf8_lossy(&data).lines() {
        io.emit(line)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::builtin::testing::{run_frames, run_lines};
    use crate::stage::Frame;

    fn ctx_in(dir: &tempfile::TempDir) -> ShellContext {
        ShellContext::new(dir.path())
    }

    #[test]
    fn test_build_resolves_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f.txt"), "x\n").unwrap();

        let kind = build("cat f.txt", &ctx_in(&dir)).unwrap();
        assert_eq!(kind, StageKind::Cat { path: dir.path().join("f.txt") });
    }

    #[test]
    fn test_build_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = build("cat nope.txt", &ctx_in(&dir)).unwrap_err();
        assert_eq!(err, ShellError::FileNotFound("cat nope.txt".into()));
    }

    #[test]
    fn test_build_directory_is_not_a_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        let err = build("cat sub", &ctx_in(&dir)).unwrap_err();
        assert!(matches!(err, ShellError::FileNotFound(_)));
    }

    #[test]
    fn test_build_requires_parameter() {
        let dir = tempfile::tempdir().unwrap();
        let err = build("cat", &ctx_in(&dir)).unwrap_err();
        assert_eq!(err, ShellError::RequiresParameter("cat".into()));
    }

    #[tokio::test]
    async fn test_emits_lines() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("f.txt"), "one\r\ntwo\n\nthree").unwrap();
        let kind = build("cat f.txt", &ctx_in(&dir)).unwrap();

        let lines = run_lines(kind, &[], ctx_in(&dir)).await;
        assert_eq!(lines, vec!["one", "two", "", "three"]);
    }

    #[tokio::test]
    async fn test_vanished_file_still_ends_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.txt");
        std::fs::write(&path, "x\n").unwrap();
        let kind = build("cat gone.txt", &ctx_in(&dir)).unwrap();
        std::fs::remove_file(&path).unwrap();

        let frames = run_frames(kind, &[], ctx_in(&dir)).await;
        assert_eq!(frames, vec![Frame::End]);
    }
}
