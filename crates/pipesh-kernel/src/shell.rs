//! The Shell — owns the working directory, the runner and the job registry.
//!
//! `Shell::execute` takes one raw command line and routes it:
//!
//! ```text
//!   line ──┬─ blank          → Outcome::Empty
//!          ├─ "exit"         → Outcome::Exit
//!          ├─ "repl_jobs"    → Outcome::Jobs(listing)
//!          ├─ "kill <n>"     → Outcome::Killed(job)
//!          ├─ "<pipeline> &" → JobRegistry::register → Outcome::Background
//!          └─ "<pipeline>"   → PipelineRunner::run   → Outcome::Completed
//! ```
//!
//! Pipelines are fully built and linked before any worker starts, so an
//! error from `execute` means nothing ran.

use std::path::PathBuf;
use std::sync::Arc;

use crate::context::{Console, ShellContext};
use crate::error::{ShellError, ShellResult};
use crate::parser::{build_pipeline, takes_arg};
use crate::scheduler::{JobId, JobInfo, JobRegistry, PipelineResult, PipelineRunner};

/// Lists the live background jobs.
pub const JOBS_KEYWORD: &str = "repl_jobs";

/// Cancels a background job by its listing number.
pub const KILL_KEYWORD: &str = "kill";

/// Stops the command loop.
pub const EXIT_KEYWORD: &str = "exit";

/// Trailing marker that runs a pipeline in the background.
pub const BACKGROUND: char = '&';

/// Configuration for a shell instance.
#[derive(Debug, Clone)]
pub struct KernelConfig {
    /// Name of this shell (for logs).
    pub name: String,
    /// Initial working directory.
    pub cwd: PathBuf,
}

impl Default for KernelConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/")),
        }
    }
}

impl KernelConfig {
    /// Create a config with the given name, rooted at the process cwd.
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// Set the initial working directory.
    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }
}

/// What a command line did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Blank line.
    Empty,
    /// A foreground pipeline ran to completion.
    Completed(PipelineResult),
    /// A pipeline was started in the background.
    Background { id: JobId, command: String },
    /// The live job listing.
    Jobs(Vec<JobInfo>),
    /// A background job was cancelled.
    Killed(JobInfo),
    /// The command loop should stop.
    Exit,
}

/// A shell instance.
#[derive(Debug)]
pub struct Shell {
    config: KernelConfig,
    ctx: ShellContext,
    runner: PipelineRunner,
    jobs: Arc<JobRegistry>,
}

impl Shell {
    /// Create a shell printing to stdout.
    pub fn new(config: KernelConfig) -> Self {
        Self::with_console(config, Console::Stdout)
    }

    /// Create a shell whose print stages write to `console`.
    pub fn with_console(config: KernelConfig, console: Console) -> Self {
        let ctx = ShellContext::new(config.cwd.clone()).with_console(console);
        tracing::debug!(name = %config.name, cwd = %config.cwd.display(), "shell created");
        Self {
            runner: PipelineRunner::new(ctx.clone()),
            jobs: Arc::new(JobRegistry::new()),
            ctx,
            config,
        }
    }

    /// The shell's name.
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Context shared with every stage.
    pub fn context(&self) -> &ShellContext {
        &self.ctx
    }

    /// Current working directory.
    pub fn cwd(&self) -> PathBuf {
        self.ctx.cwd.get()
    }

    /// Background job registry.
    pub fn jobs(&self) -> &Arc<JobRegistry> {
        &self.jobs
    }

    /// Run one command line.
    #[tracing::instrument(level = "debug", skip(self), fields(shell = %self.config.name))]
    pub async fn execute(&self, line: &str) -> ShellResult<Outcome> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Outcome::Empty);
        }
        if line == EXIT_KEYWORD {
            return Ok(Outcome::Exit);
        }

        let (command, background) = match line.strip_suffix(BACKGROUND) {
            Some(rest) => (rest.trim(), true),
            None => (line, false),
        };
        if command.is_empty() {
            return Err(ShellError::CommandNotFound(line.to_string()));
        }

        if command == JOBS_KEYWORD {
            return Ok(Outcome::Jobs(self.jobs.list().await));
        }
        if takes_arg(command, KILL_KEYWORD) {
            let position = parse_job_index(command)?;
            return Ok(Outcome::Killed(self.jobs.kill(position).await?));
        }

        let pipeline = build_pipeline(command, &self.ctx)?;
        if background {
            let command = pipeline.command().to_string();
            let id = self.jobs.register(self.runner.spawn(pipeline)).await;
            return Ok(Outcome::Background { id, command });
        }

        let result = self.runner.run(pipeline).await;
        if result.exit_requested {
            Ok(Outcome::Exit)
        } else {
            Ok(Outcome::Completed(result))
        }
    }

    /// Wait for every background job to finish on its own.
    pub async fn wait_background(&self) -> Vec<(JobId, PipelineResult)> {
        self.jobs.wait_all().await
    }
}

/// The 1-based job number of a `kill` command.
fn parse_job_index(command: &str) -> ShellResult<usize> {
    let arg = command[KILL_KEYWORD.len()..].trim();
    arg.parse::<usize>()
        .map_err(|_| ShellError::InvalidJobIndex(arg.to_string()))
}
