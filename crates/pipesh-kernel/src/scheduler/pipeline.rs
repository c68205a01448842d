//! Pipeline execution for pipesh.
//!
//! Spawns every stage of a built pipeline on its own task. The channels
//! were wired by the parser, so the runner only starts workers and keeps
//! their handles.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::context::ShellContext;
use crate::parser::Pipeline;
use crate::stage::StageExit;

/// Summary of a pipeline whose workers have all ended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineResult {
    /// Number of stage workers.
    pub stages: usize,
    /// Workers that ran their body to the end.
    pub finished: usize,
    /// Workers stopped by cancellation.
    pub cancelled: usize,
    /// Workers that panicked.
    pub panicked: usize,
    /// The pipeline contained `exit`.
    pub exit_requested: bool,
}

impl PipelineResult {
    /// Every worker finished normally.
    pub fn ok(&self) -> bool {
        self.finished == self.stages
    }
}

/// Starts pipelines with one task per stage.
#[derive(Debug, Clone)]
pub struct PipelineRunner {
    ctx: ShellContext,
}

impl PipelineRunner {
    /// Create a runner whose workers share `ctx`.
    pub fn new(ctx: ShellContext) -> Self {
        Self { ctx }
    }

    /// Start every stage of `pipeline` and return without waiting.
    pub fn spawn(&self, pipeline: Pipeline) -> RunningPipeline {
        let cancel = CancellationToken::new();
        let command = pipeline.command().to_string();
        let exit_requested = pipeline.requests_exit();

        let workers: Vec<_> = pipeline
            .into_stages()
            .into_iter()
            .map(|stage| tokio::spawn(stage.run(self.ctx.clone(), cancel.clone())))
            .collect();

        tracing::debug!(command = %command, workers = workers.len(), "pipeline started");
        RunningPipeline {
            command,
            workers,
            cancel,
            exit_requested,
        }
    }

    /// Start `pipeline` and wait for every worker.
    pub async fn run(&self, pipeline: Pipeline) -> PipelineResult {
        self.spawn(pipeline).wait().await
    }
}

/// A pipeline whose workers have been started.
#[derive(Debug)]
pub struct RunningPipeline {
    command: String,
    workers: Vec<JoinHandle<StageExit>>,
    cancel: CancellationToken,
    exit_requested: bool,
}

impl RunningPipeline {
    #[cfg(test)]
    pub(crate) fn from_parts(
        command: &str,
        workers: Vec<JoinHandle<StageExit>>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            command: command.to_string(),
            workers,
            cancel,
            exit_requested: false,
        }
    }

    /// The command line being run.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Whether the terminal worker has ended.
    ///
    /// The terminal stage is the last to see end-of-stream, so once it is
    /// done the pipeline has produced everything it will produce.
    pub fn is_finished(&self) -> bool {
        self.workers.last().map_or(true, JoinHandle::is_finished)
    }

    /// Ask every worker to stop at its next read or write.
    pub fn cancel(&self) {
        tracing::debug!(command = %self.command, "pipeline cancelled");
        self.cancel.cancel();
    }

    /// Whether `cancel` has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Wait for every worker, terminal stage first.
    pub async fn wait(self) -> PipelineResult {
        let mut result = PipelineResult {
            stages: self.workers.len(),
            exit_requested: self.exit_requested,
            ..PipelineResult::default()
        };

        for worker in self.workers.into_iter().rev() {
            match worker.await {
                Ok(StageExit::Finished) => result.finished += 1,
                Ok(StageExit::Cancelled) => result.cancelled += 1,
                Err(e) => {
                    tracing::warn!(command = %self.command, "stage worker failed: {}", e);
                    result.panicked += 1;
                }
            }
        }

        tracing::debug!(command = %self.command, ?result, "pipeline done");
        result
    }
}
