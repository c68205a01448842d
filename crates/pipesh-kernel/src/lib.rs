//! pipesh-kernel: the core of pipesh, a small concurrent shell.
//!
//! This crate provides:
//!
//! - **Parser**: splits a command line on `|` and `>` and links the stages
//! - **Stages**: one built-in per verb (`cat`, `grep`, `wc`, `uniq`, `head`,
//!   `tail`, `pwd`, `ls`, `cd`, `>`), connected by line channels
//! - **Scheduler**: one task per stage, background jobs and `kill`
//! - **Shell**: routes a raw line to the right part and reports the outcome

pub mod context;
pub mod error;
pub mod parser;
pub mod scheduler;
pub mod shell;
pub mod stage;

pub use context::{Console, ShellContext, WorkingDir};
pub use error::{ShellError, ShellResult};
pub use parser::{build_pipeline, Pipeline};
pub use scheduler::{JobId, JobInfo, JobRegistry, JobStatus, PipelineResult, PipelineRunner};
pub use shell::{KernelConfig, Outcome, Shell};
