//! Scheduler module for pipesh — pipeline workers and background jobs.
//!
//! This module provides:
//! - **Pipeline execution**: one tokio task per stage, connected by line
//!   channels, joined when the command runs in the foreground.
//! - **Background jobs**: pipelines started with `&`, listed and killed by
//!   their position in the job listing.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     PipelineRunner                          │
//! │  ┌─────────┐   channel   ┌─────────┐   channel   ┌────────┐ │
//! │  │ stage 0 │────────────▶│ stage 1 │────────────▶│ print  │ │
//! │  │ (spawn) │   lines     │ (spawn) │   lines     │ (spawn)│ │
//! │  └─────────┘             └─────────┘             └────────┘ │
//! │            one CancellationToken shared by all stages       │
//! └─────────────────────────────────────────────────────────────┘
//!
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      JobRegistry                            │
//! │  jobs: Vec<Job>                                             │
//! │  - register(running) → JobId                                │
//! │  - list() → live jobs, numbered from 1                      │
//! │  - kill(n) → cancel the n-th listed job                     │
//! │  - wait_all() → Vec<(JobId, PipelineResult)>                │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod job;
mod pipeline;

pub use job::{JobId, JobInfo, JobRegistry, JobStatus};
pub use pipeline::{PipelineResult, PipelineRunner, RunningPipeline};
