//! Line channel between adjacent stages.
//!
//! ```text
//!   LineSender ──▶ [Frame::Line .. Frame::Line, Frame::End] ──▶ LineReceiver
//!                  ├── writer never blocks (unbounded queue)
//!                  ├── reader suspends while the queue is empty
//!                  ├── Frame::End is sent at most once per sender
//!                  ├── drop sender → reader sees end-of-stream
//!                  └── drop receiver → further sends report DownstreamClosed
//! ```
//!
//! The end-of-stream marker is its own enum variant, so no line of text can
//! be mistaken for it. A reader stops only on the marker or a closed
//! channel, never because the queue happens to be empty for a moment.

use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// One unit on a stage channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A line of text, without its newline.
    Line(String),
    /// End-of-stream marker.
    End,
}

/// Why a stage stopped before finishing its body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StageAbort {
    /// The pipeline was killed.
    #[error("stage cancelled")]
    Cancelled,
    /// The next stage stopped reading.
    #[error("downstream stage closed its input")]
    DownstreamClosed,
}

/// Writing end of a stage channel.
#[derive(Debug)]
pub struct LineSender {
    tx: mpsc::UnboundedSender<Frame>,
    ended: bool,
}

/// Reading end of a stage channel.
#[derive(Debug)]
pub struct LineReceiver {
    rx: mpsc::UnboundedReceiver<Frame>,
    done: bool,
}

/// Create a linked sender/receiver pair.
pub fn line_channel() -> (LineSender, LineReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (
        LineSender { tx, ended: false },
        LineReceiver { rx, done: false },
    )
}

impl LineSender {
    /// Push one line downstream.
    pub fn send(&mut self, line: String) -> Result<(), StageAbort> {
        debug_assert!(!self.ended, "line sent after end-of-stream");
        self.tx
            .send(Frame::Line(line))
            .map_err(|_| StageAbort::DownstreamClosed)
    }

    /// Push the end-of-stream marker.
    ///
    /// Returns true only for the call that actually queued the marker;
    /// repeated calls are no-ops.
    pub fn end(&mut self) -> bool {
        if self.ended {
            return false;
        }
        self.ended = true;
        // A reader that already went away does not need the marker.
        let _ = self.tx.send(Frame::End);
        true
    }

    /// Whether the marker has been pushed.
    pub fn is_ended(&self) -> bool {
        self.ended
    }
}

impl LineReceiver {
    /// Next raw frame. `None` once every sender is gone.
    pub async fn recv_frame(&mut self) -> Option<Frame> {
        self.rx.recv().await
    }

    /// Next line, or `None` at end-of-stream.
    ///
    /// Both the marker and a dropped sender count as end-of-stream; after
    /// that every call returns `None` without waiting.
    pub async fn recv(&mut self) -> Option<String> {
        if self.done {
            return None;
        }
        match self.rx.recv().await {
            Some(Frame::Line(line)) => Some(line),
            Some(Frame::End) => {
                self.done = true;
                None
            }
            None => {
                tracing::trace!("upstream dropped without end-of-stream");
                self.done = true;
                None
            }
        }
    }

    /// Whether end-of-stream has been observed.
    pub fn is_done(&self) -> bool {
        self.done
    }
}

/// The channels and cancellation token one stage worker runs with.
#[derive(Debug)]
pub struct StageIo {
    input: Option<LineReceiver>,
    output: Option<LineSender>,
    cancel: CancellationToken,
}

impl StageIo {
    /// Bundle a worker's channels.
    pub fn new(
        input: Option<LineReceiver>,
        output: Option<LineSender>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            input,
            output,
            cancel,
        }
    }

    /// Read the next input line.
    ///
    /// Stages without an input see an immediately empty stream. Resolves to
    /// `Cancelled` as soon as the token fires, even while waiting.
    pub async fn next_line(&mut self) -> Result<Option<String>, StageAbort> {
        let Some(input) = self.input.as_mut() else {
            return Ok(None);
        };
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(StageAbort::Cancelled),
            line = input.recv() => Ok(line),
        }
    }

    /// Push one line to the next stage, if there is one.
    pub fn emit(&mut self, line: impl Into<String>) -> Result<(), StageAbort> {
        if self.cancel.is_cancelled() {
            return Err(StageAbort::Cancelled);
        }
        match self.output.as_mut() {
            Some(out) => out.send(line.into()),
            None => Ok(()),
        }
    }

    /// Stop reading. Upstream sends become no-ops from here on.
    pub fn close_input(&mut self) {
        self.input = None;
    }

    /// Push the end-of-stream marker downstream (once).
    pub fn finish(&mut self) -> bool {
        self.output.as_mut().is_some_and(LineSender::end)
    }

    /// Whether the pipeline was killed.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
