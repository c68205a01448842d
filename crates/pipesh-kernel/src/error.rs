//! Errors raised while building a pipeline or coordinating jobs.
//!
//! Every variant carries the offending command text so the REPL can print
//! a single line and move on. Nothing here is raised while a pipeline is
//! running; execution-time I/O failures are logged by the stage instead.

use thiserror::Error;

/// Result alias for shell operations.
pub type ShellResult<T> = Result<T, ShellError>;

/// A command line that cannot be turned into a runnable pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShellError {
    /// A verb that needs an argument got none.
    #[error("The command [{0}] requires parameter.")]
    RequiresParameter(String),

    /// `cat` named a path that is not a regular file.
    #[error("At least one of the files in the command [{0}] was not found.")]
    FileNotFound(String),

    /// `cd` named a path that is not a directory.
    #[error("The directory specified by the command [{0}] was not found.")]
    DirectoryNotFound(String),

    /// A stage that consumes input was placed first.
    #[error("The command [{0}] requires input.")]
    RequiresInput(String),

    /// A stage that refuses input was given a predecessor.
    #[error("The command [{0}] cannot have an input.")]
    CannotHaveInput(String),

    /// A stage that refuses output was given a successor.
    #[error("The command [{0}] cannot have an output.")]
    CannotHaveOutput(String),

    /// Unrecognized verb.
    #[error("The command [{0}] was not found.")]
    CommandNotFound(String),

    /// A stage side was linked twice.
    #[error("The command [{0}] is already linked.")]
    AlreadyLinked(String),

    /// `kill` got something other than a job number.
    #[error("The job index [{0}] is not a number.")]
    InvalidJobIndex(String),

    /// `kill` named a position the job listing does not have.
    #[error("There is no background job number {0}.")]
    NoSuchJob(usize),
}

impl ShellError {
    /// The command text (or argument) the error is about.
    pub fn subject(&self) -> String {
        match self {
            ShellError::RequiresParameter(c)
            | ShellError::FileNotFound(c)
            | ShellError::DirectoryNotFound(c)
            | ShellError::RequiresInput(c)
            | ShellError::CannotHaveInput(c)
            | ShellError::CannotHaveOutput(c)
            | ShellError::CommandNotFound(c)
            | ShellError::AlreadyLinked(c)
            | ShellError::InvalidJobIndex(c) => c.clone(),
            ShellError::NoSuchJob(n) => n.to_string(),
        }
    }
}
