//! Pipeline builder.
//!
//! Turns one command line into a linked [`Pipeline`]. The grammar is only
//! `|` and `>`; there is no quoting, so the split points are simply the
//! characters themselves.
//!
//! ```text
//!   "cat f | grep x > out"
//!        │
//!        ├─ terminal:     "> out"          (last '>' after last '|')
//!        ├─ sub-commands: "cat f", "grep x"
//!        └─ stages:       Cat → Grep → Redirect
//! ```
//!
//! Every check runs here, before any worker starts: a pipeline either
//! links completely or is rejected with a single `ShellError`.

use crate::context::ShellContext;
use crate::error::{ShellError, ShellResult};
use crate::stage::builtin::{cat, cd, grep, redirect};
use crate::stage::{Stage, StageKind};

/// Pipe separator.
pub const PIPE: char = '|';

/// Redirect marker.
pub const REDIRECT: char = '>';

/// A linked sequence of stages built from one command line.
#[derive(Debug)]
pub struct Pipeline {
    command: String,
    stages: Vec<Stage>,
}

impl Pipeline {
    /// The command line this pipeline was built from.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Stages in execution order.
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Number of stages.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Whether the pipeline has no stages.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Whether running this pipeline should end the command loop.
    pub fn requests_exit(&self) -> bool {
        self.stages.iter().any(|s| matches!(s.kind(), StageKind::Exit))
    }

    /// Take the stages out for execution.
    pub fn into_stages(self) -> Vec<Stage> {
        self.stages
    }
}

/// Build and link the pipeline for `command`.
///
/// `command` must not be blank; the caller filters empty lines.
pub fn build_pipeline(command: &str, ctx: &ShellContext) -> ShellResult<Pipeline> {
    let (terminal, remaining) = split_terminal(command, ctx)?;

    if remaining.trim().is_empty() {
        return Err(ShellError::RequiresInput(command.trim().to_string()));
    }

    let sub_commands = split_sub_commands(remaining);
    if sub_commands.is_empty() {
        return Err(ShellError::CommandNotFound(command.trim().to_string()));
    }
    let mut stages = sub_commands
        .iter()
        .map(|sc| build_stage(sc, ctx))
        .collect::<ShellResult<Vec<_>>>()?;

    let append_terminal = match (&terminal, stages.last()) {
        (Terminal::Print, Some(last)) => !last.kind().is_side_effect_only(),
        _ => true,
    };
    if append_terminal {
        stages.push(terminal.into_stage());
    }

    if let Some(first) = stages.first() {
        if first.kind().requires_input() {
            return Err(ShellError::RequiresInput(sub_commands[0].trim().to_string()));
        }
    }

    link_stages(&mut stages)?;

    tracing::debug!(
        command = command.trim(),
        stages = stages.len(),
        "pipeline built"
    );
    Ok(Pipeline {
        command: command.trim().to_string(),
        stages,
    })
}

/// The implicit or explicit last stage.
enum Terminal {
    Print,
    Redirect(Stage),
}

impl Terminal {
    fn into_stage(self) -> Stage {
        match self {
            Terminal::Print => Stage::new("print", StageKind::Print),
            Terminal::Redirect(stage) => stage,
        }
    }
}

/// Decide the terminal stage and return the text left for the user stages.
///
/// A redirect is terminal when the last `>` comes after the last `|`.
fn split_terminal<'a>(command: &'a str, ctx: &ShellContext) -> ShellResult<(Terminal, &'a str)> {
    let last_pipe = command.rfind(PIPE);
    let last_redirect = command.rfind(REDIRECT);

    match last_redirect {
        Some(at) if last_pipe.map_or(true, |pipe| at > pipe) => {
            let text = command[at..].trim();
            let kind = redirect::build(text, ctx)?;
            Ok((Terminal::Redirect(Stage::new(text, kind)), &command[..at]))
        }
        _ => Ok((Terminal::Print, command)),
    }
}

/// Split the user part of a line into raw sub-commands.
///
/// A segment that still contains `>` is a mid-pipeline redirect: the text
/// before it (if any) and the redirect itself become separate
/// sub-commands. Trailing empty segments are ignored, so `cat f |` runs as
/// `cat f`.
fn split_sub_commands(text: &str) -> Vec<&str> {
    let mut segments: Vec<&str> = text.split(PIPE).collect();
    while segments.last().is_some_and(|s| s.is_empty()) {
        segments.pop();
    }

    let mut sub_commands = Vec::with_capacity(segments.len());
    for segment in segments {
        match segment.find(REDIRECT) {
            None => sub_commands.push(segment),
            Some(at) => {
                let (before, redirect) = segment.split_at(at);
                if !before.trim().is_empty() {
                    sub_commands.push(before);
                }
                sub_commands.push(redirect);
            }
        }
    }
    sub_commands
}

/// `trimmed` is `verb` or starts with `verb` and a space.
pub(crate) fn takes_arg(trimmed: &str, verb: &str) -> bool {
    trimmed == verb
        || trimmed
            .strip_prefix(verb)
            .is_some_and(|rest| rest.starts_with(' '))
}

/// Construct one stage from a raw sub-command.
fn build_stage(sub_command: &str, ctx: &ShellContext) -> ShellResult<Stage> {
    let trimmed = sub_command.trim();
    let kind = match trimmed {
        "pwd" => StageKind::Pwd,
        "ls" => StageKind::Ls,
        "wc" => StageKind::Wc,
        "uniq" => StageKind::Uniq,
        "head" => StageKind::Head,
        "tail" => StageKind::Tail,
        "exit" => StageKind::Exit,
        t if takes_arg(t, "cd") => cd::build(t, ctx)?,
        t if takes_arg(t, "cat") => cat::build(t, ctx)?,
        t if takes_arg(t, "grep") => grep::build(t)?,
        t if takes_arg(t, ">") => redirect::build(t, ctx)?,
        t => return Err(ShellError::CommandNotFound(t.to_string())),
    };
    Ok(Stage::new(trimmed, kind))
}

/// Connect each stage to the one before it.
fn link_stages(stages: &mut [Stage]) -> ShellResult<()> {
    for i in 1..stages.len() {
        let (before, after) = stages.split_at_mut(i);
        after[0].attach_prev(&mut before[i - 1])?;
    }
    Ok(())
}
