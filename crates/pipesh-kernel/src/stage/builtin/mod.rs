//! Built-in stage bodies, one module per verb.
//!
//! Verbs that take an argument expose a `build` function that validates the
//! sub-command and returns the typed `StageKind`. Every module has a `run`
//! function that is the worker body.

pub mod cat;
pub mod cd;
pub mod grep;
pub mod head;
pub mod ls;
pub mod print;
pub mod pwd;
pub mod redirect;
pub mod tail;
pub mod uniq;
pub mod wc;

use crate::error::{ShellError, ShellResult};

/// The argument of a one-parameter verb: everything after the first space,
/// trimmed.
pub(crate) fn required_arg(command: &str) -> ShellResult<&str> {
    match command.split_once(' ') {
        Some((_, rest)) if !rest.trim().is_empty() => Ok(rest.trim()),
        _ => Err(ShellError::RequiresParameter(command.to_string())),
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use tokio_util::sync::CancellationToken;

    use crate::context::ShellContext;
    use crate::stage::{line_channel, Frame, Stage, StageExit, StageKind};

    /// Run `kind` on `input` and return every frame it pushed downstream.
    pub async fn run_frames(kind: StageKind, input: &[&str], ctx: ShellContext) -> Vec<Frame> {
        let mut stage = Stage::new(kind.name(), kind);

        if stage.kind.accepts_input() {
            let (mut feed, rx) = line_channel();
            for line in input {
                feed.send(line.to_string()).expect("stage input open");
            }
            feed.end();
            stage.input = Some(rx);
        }

        let mut out = None;
        if stage.kind.produces_output() {
            let (tx, rx) = line_channel();
            stage.output = Some(tx);
            out = Some(rx);
        }

        let exit = stage.run(ctx, CancellationToken::new()).await;
        assert_eq!(exit, StageExit::Finished);

        let mut frames = Vec::new();
        if let Some(mut rx) = out {
            while let Some(frame) = rx.recv_frame().await {
                frames.push(frame);
            }
        }
        frames
    }

    /// Like `run_frames`, checking the single trailing marker and returning
    /// only the lines.
    pub async fn run_lines(kind: StageKind, input: &[&str], ctx: ShellContext) -> Vec<String> {
        let mut frames = run_frames(kind, input, ctx).await;
        assert_eq!(frames.pop(), Some(Frame::End), "missing end-of-stream");
        frames
            .into_iter()
            .map(|frame| match frame {
                Frame::Line(line) => line,
                Frame::End => panic!("end-of-stream pushed twice"),
            })
            .collect()
    }
}
