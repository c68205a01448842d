//! pipesh REPL — interactive front end for the pipesh kernel.
//!
//! This REPL handles:
//! - Reading lines with rustyline and keeping a history file
//! - Handing each line to the kernel's `Shell`
//! - Formatting job listings and errors for the terminal
//!
//! Pipeline output is written by the pipelines themselves; the REPL only
//! prints what the shell reports about a line.

pub mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use rustyline::error::ReadlineError;
use rustyline::history::DefaultHistory;
use rustyline::Editor;
use tokio::runtime::Runtime;

use pipesh_kernel::scheduler::JobInfo;
use pipesh_kernel::{Console, KernelConfig, Outcome, Shell};

pub use config::ReplConfig;

/// Printed when the REPL starts.
pub const WELCOME: &str = "Welcome to the Unix-ish command line.";

/// Printed when the REPL stops.
pub const GOODBYE: &str = "Thank you for using the Unix-ish command line. Goodbye!";

/// What the loop should do after a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    /// Keep reading, printing the text if there is any.
    Continue(Option<String>),
    /// The line was rejected; nothing ran.
    Failed(String),
    /// Stop reading.
    Exit,
}

/// REPL state: the shell and the runtime its workers run on.
pub struct Repl {
    shell: Shell,
    runtime: Runtime,
}

impl Repl {
    /// Create a REPL rooted at the process working directory.
    pub fn new() -> Result<Self> {
        Self::with_config(KernelConfig::named("repl"))
    }

    /// Create a REPL with a custom kernel configuration.
    pub fn with_config(config: KernelConfig) -> Result<Self> {
        Self::with_console(config, Console::Stdout)
    }

    /// Create a REPL whose pipelines print to `console`.
    pub fn with_console(config: KernelConfig, console: Console) -> Result<Self> {
        let runtime = Runtime::new().context("Failed to create tokio runtime")?;
        let shell = Shell::with_console(config, console);
        Ok(Self { shell, runtime })
    }

    /// The shell lines are sent to.
    pub fn shell(&self) -> &Shell {
        &self.shell
    }

    /// Process a single line of input.
    ///
    /// Foreground pipelines have finished, and printed their output, by the
    /// time this returns.
    pub fn process_line(&mut self, line: &str) -> Flow {
        match self.runtime.block_on(self.shell.execute(line)) {
            Ok(Outcome::Exit) => Flow::Exit,
            Ok(Outcome::Jobs(jobs)) => Flow::Continue(format_jobs(&jobs)),
            Ok(Outcome::Background { id, command }) => {
                tracing::debug!(job = %id, command = %command, "started in background");
                Flow::Continue(None)
            }
            Ok(Outcome::Killed(job)) => {
                tracing::debug!(job = %job.id, command = %job.command, "killed");
                Flow::Continue(None)
            }
            Ok(Outcome::Completed(result)) => {
                if !result.ok() {
                    tracing::debug!(?result, "pipeline did not finish cleanly");
                }
                Flow::Continue(None)
            }
            Ok(Outcome::Empty) => Flow::Continue(None),
            Err(e) => Flow::Failed(e.to_string()),
        }
    }

    /// Wait for every background job to finish on its own.
    pub fn shutdown(&mut self) {
        let results = self.runtime.block_on(self.shell.wait_background());
        if !results.is_empty() {
            tracing::debug!(jobs = results.len(), "background jobs drained");
        }
    }
}

/// Format the `repl_jobs` listing, one `\t<n>. <command> &` line per job.
fn format_jobs(jobs: &[JobInfo]) -> Option<String> {
    if jobs.is_empty() {
        return None;
    }
    let lines: Vec<String> = jobs
        .iter()
        .map(|job| format!("\t{}. {} &", job.position, job.command))
        .collect();
    Some(lines.join("\n"))
}

/// Save REPL history to disk.
fn save_history(rl: &mut Editor<(), DefaultHistory>, history_path: &Option<PathBuf>) {
    if let Some(path) = history_path {
        if let Some(parent) = path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                tracing::warn!("Failed to create history directory: {}", e);
            }
        }
        if let Err(e) = rl.save_history(path) {
            tracing::warn!("Failed to save history: {}", e);
        }
    }
}

/// Run the interactive REPL until `exit` or end of input.
pub fn run(config: &ReplConfig) -> Result<()> {
    if config.banner {
        println!("{WELCOME}");
    }

    let mut rl: Editor<(), DefaultHistory> =
        Editor::new().context("Failed to create editor")?;

    let history_path = config.history_path();
    if let Some(ref path) = history_path {
        if let Err(e) = rl.load_history(path) {
            // Missing history is expected on first run.
            let is_not_found = matches!(&e, ReadlineError::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound);
            if !is_not_found {
                tracing::warn!("Failed to load history: {}", e);
            }
        }
    }

    let mut repl = Repl::new()?;

    loop {
        match rl.readline(&config.prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(e) = rl.add_history_entry(line.as_str()) {
                        tracing::warn!("Failed to add history entry: {}", e);
                    }
                }
                match repl.process_line(&line) {
                    Flow::Continue(Some(output)) | Flow::Failed(output) => println!("{output}"),
                    Flow::Continue(None) => {}
                    Flow::Exit => break,
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {}", err);
                break;
            }
        }
    }

    save_history(&mut rl, &history_path);
    repl.shutdown();
    if config.banner {
        println!("{GOODBYE}");
    }
    Ok(())
}
