//! Pipeline stages.
//!
//! A `Stage` is one verb of a command line: a `StageKind` describing what
//! it does plus the channel ends that connect it to its neighbours.
//!
//! ```text
//!   ┌───────┐  LineSender   LineReceiver ┌───────┐          ┌───────┐
//!   │ cat f │─────────────────────────────▶│ grep x│─────────▶│ print │
//!   └───────┘   Frame::Line… Frame::End    └───────┘          └───────┘
//!   accepts_input = false                                    produces_output = false
//! ```
//!
//! Linking is checked uniformly through the capability flags on
//! `StageKind`, so the set of legal topologies is visible in one table.

pub mod builtin;
mod channel;

use std::path::PathBuf;

use tokio_util::sync::CancellationToken;

use crate::context::ShellContext;
use crate::error::{ShellError, ShellResult};

pub use channel::{line_channel, Frame, LineReceiver, LineSender, StageAbort, StageIo};

/// Where `cd` moves the working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CdTarget {
    /// `cd .`
    Current,
    /// `cd ..`
    Parent,
    /// Any other argument, resolved and checked when the stage was built.
    Path(PathBuf),
}

/// What a stage does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageKind {
    /// Emit the lines of a file.
    Cat { path: PathBuf },
    /// Emit the names in the working directory.
    Ls,
    /// Emit the working directory.
    Pwd,
    /// Change the working directory.
    Cd { target: CdTarget },
    /// Keep lines containing `query`.
    Grep { query: String },
    /// Drop lines seen before.
    Uniq,
    /// Emit `"<lines> <words> <chars>"`.
    Wc,
    /// Keep the first lines.
    Head,
    /// Keep the last lines.
    Tail,
    /// Append every line to a file.
    Redirect { path: PathBuf },
    /// Write every line to the console.
    Print,
    /// Ask the command loop to stop.
    Exit,
}

impl StageKind {
    /// Verb name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            StageKind::Cat { .. } => "cat",
            StageKind::Ls => "ls",
            StageKind::Pwd => "pwd",
            StageKind::Cd { .. } => "cd",
            StageKind::Grep { .. } => "grep",
            StageKind::Uniq => "uniq",
            StageKind::Wc => "wc",
            StageKind::Head => "head",
            StageKind::Tail => "tail",
            StageKind::Redirect { .. } => ">",
            StageKind::Print => "print",
            StageKind::Exit => "exit",
        }
    }

    /// Whether a predecessor may be attached.
    pub fn accepts_input(&self) -> bool {
        match self {
            StageKind::Cat { .. }
            | StageKind::Ls
            | StageKind::Pwd
            | StageKind::Cd { .. }
            | StageKind::Exit => false,
            StageKind::Grep { .. }
            | StageKind::Uniq
            | StageKind::Wc
            | StageKind::Head
            | StageKind::Tail
            | StageKind::Redirect { .. }
            | StageKind::Print => true,
        }
    }

    /// Whether a successor may be attached.
    pub fn produces_output(&self) -> bool {
        match self {
            StageKind::Cat { .. }
            | StageKind::Ls
            | StageKind::Pwd
            | StageKind::Grep { .. }
            | StageKind::Uniq
            | StageKind::Wc
            | StageKind::Head
            | StageKind::Tail => true,
            StageKind::Cd { .. }
            | StageKind::Exit
            | StageKind::Redirect { .. }
            | StageKind::Print => false,
        }
    }

    /// Stages that only make sense with something feeding them and so may
    /// not start a pipeline.
    pub fn requires_input(&self) -> bool {
        matches!(
            self,
            StageKind::Grep { .. }
                | StageKind::Wc
                | StageKind::Uniq
                | StageKind::Redirect { .. }
                | StageKind::Head
                | StageKind::Tail
        )
    }

    /// Side-effect-only stages that never get a console print appended.
    pub fn is_side_effect_only(&self) -> bool {
        matches!(self, StageKind::Cd { .. } | StageKind::Exit)
    }

    /// Run this stage's body to completion.
    ///
    /// Bodies do not push the end-of-stream marker themselves; the caller
    /// does that once the body returns.
    async fn execute(&self, io: &mut StageIo, ctx: &ShellContext) -> Result<(), StageAbort> {
        match self {
            StageKind::Cat { path } => builtin::cat::run(path, io).await,
            StageKind::Ls => builtin::ls::run(io, ctx).await,
            StageKind::Pwd => builtin::pwd::run(io, ctx),
            StageKind::Cd { target } => {
                builtin::cd::run(target, ctx);
                Ok(())
            }
            StageKind::Grep { query } => builtin::grep::run(query, io).await,
            StageKind::Uniq => builtin::uniq::run(io).await,
            StageKind::Wc => builtin::wc::run(io).await,
            StageKind::Head => builtin::head::run(io).await,
            StageKind::Tail => builtin::tail::run(io).await,
            StageKind::Redirect { path } => builtin::redirect::run(path, io).await,
            StageKind::Print => builtin::print::run(io, ctx).await,
            StageKind::Exit => Ok(()),
        }
    }
}

/// How a stage worker ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageExit {
    /// Body completed and end-of-stream was pushed.
    Finished,
    /// The pipeline was killed; no marker was pushed.
    Cancelled,
}

/// One element of a pipeline.
#[derive(Debug)]
pub struct Stage {
    command: String,
    kind: StageKind,
    input: Option<LineReceiver>,
    output: Option<LineSender>,
}

impl Stage {
    /// An unlinked stage built from `command`.
    pub fn new(command: impl Into<String>, kind: StageKind) -> Self {
        Self {
            command: command.into(),
            kind,
            input: None,
            output: None,
        }
    }

    /// The sub-command text this stage was built from.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// What this stage does.
    pub fn kind(&self) -> &StageKind {
        &self.kind
    }

    /// Whether a predecessor has been attached.
    pub fn has_input(&self) -> bool {
        self.input.is_some()
    }

    /// Whether a successor has been attached.
    pub fn has_output(&self) -> bool {
        self.output.is_some()
    }

    /// Make `prev` feed this stage.
    ///
    /// Refusal by this stage is reported before refusal by `prev`. Nothing
    /// is changed on failure.
    pub fn attach_prev(&mut self, prev: &mut Stage) -> ShellResult<()> {
        if !self.kind.accepts_input() {
            return Err(ShellError::CannotHaveInput(self.command.clone()));
        }
        if !prev.kind.produces_output() {
            return Err(ShellError::CannotHaveOutput(prev.command.clone()));
        }
        if self.input.is_some() {
            return Err(ShellError::AlreadyLinked(self.command.clone()));
        }
        if prev.output.is_some() {
            return Err(ShellError::AlreadyLinked(prev.command.clone()));
        }

        let (tx, rx) = line_channel();
        prev.output = Some(tx);
        self.input = Some(rx);
        Ok(())
    }

    /// Run the stage until its input ends or the token fires.
    ///
    /// Exactly one end-of-stream marker is pushed downstream unless the
    /// stage is cancelled, in which case the dropped sender closes the
    /// channel instead.
    pub async fn run(self, ctx: ShellContext, cancel: CancellationToken) -> StageExit {
        let Stage {
            command,
            kind,
            input,
            output,
        } = self;
        let mut io = StageIo::new(input, output, cancel);

        tracing::trace!(stage = kind.name(), command = %command, "stage started");
        match kind.execute(&mut io, &ctx).await {
            Ok(()) | Err(StageAbort::DownstreamClosed) => {
                io.finish();
                tracing::trace!(stage = kind.name(), "stage finished");
                StageExit::Finished
            }
            Err(StageAbort::Cancelled) => {
                tracing::debug!(stage = kind.name(), command = %command, "stage cancelled");
                StageExit::Cancelled
            }
        }
    }
}

/// Shared loop for line-at-a-time stages.
///
/// Reads until end-of-stream, pushing whatever `transform` returns.
pub(crate) async fn transform_lines<F>(io: &mut StageIo, mut transform: F) -> Result<(), StageAbort>
where
    F: FnMut(String) -> Option<String>,
{
    while let Some(line) = io.next_line().await? {
        if let Some(out) = transform(line) {
            io.emit(out)?;
        }
    }
    Ok(())
}
