//! State shared by the parser and every stage worker.
//!
//! Nothing here is global: a `ShellContext` is created by the shell and
//! cloned into each worker. Clones share the same working directory and
//! console sink.

use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

/// The shell's current working directory.
///
/// Read by stages that resolve relative paths and written only by `cd`.
#[derive(Debug, Clone)]
pub struct WorkingDir {
    path: Arc<RwLock<PathBuf>>,
}

impl WorkingDir {
    /// Create a working directory rooted at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(RwLock::new(path.into())),
        }
    }

    /// Snapshot of the current directory.
    pub fn get(&self) -> PathBuf {
        self.path
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Replace the current directory.
    pub fn set(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        tracing::trace!(cwd = %path.display(), "working directory changed");
        *self.path.write().unwrap_or_else(|e| e.into_inner()) = path;
    }

    /// Resolve `arg` against the current directory.
    ///
    /// Absolute paths are taken as-is. `.` components are dropped and `..`
    /// removes the component before it, so the result never contains
    /// either and `parent()` of it is the real parent directory.
    pub fn resolve(&self, arg: &str) -> PathBuf {
        let arg = Path::new(arg);
        let joined = if arg.is_absolute() {
            arg.to_path_buf()
        } else {
            self.get().join(arg)
        };
        normalize(&joined)
    }
}

/// Lexically fold `.` and `..` out of `path`. `..` at the root stays at
/// the root.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

impl Default for WorkingDir {
    fn default() -> Self {
        Self::new(std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/")))
    }
}

/// Where print stages send their lines.
#[derive(Debug, Clone, Default)]
pub enum Console {
    /// Process stdout.
    #[default]
    Stdout,
    /// In-memory buffer, for tests and embedders.
    Capture(Arc<Mutex<Vec<String>>>),
}

impl Console {
    /// A console that records lines instead of printing them.
    pub fn capture() -> Self {
        Console::Capture(Arc::new(Mutex::new(Vec::new())))
    }

    /// Write one line.
    pub fn write_line(&self, line: &str) -> io::Result<()> {
        match self {
            Console::Stdout => {
                let mut out = io::stdout().lock();
                writeln!(out, "{line}")?;
                out.flush()
            }
            Console::Capture(lines) => {
                lines
                    .lock()
                    .unwrap_or_else(|e| e.into_inner())
                    .push(line.to_string());
                Ok(())
            }
        }
    }

    /// Lines recorded so far. Always empty for `Stdout`.
    pub fn captured(&self) -> Vec<String> {
        match self {
            Console::Stdout => Vec::new(),
            Console::Capture(lines) => lines.lock().unwrap_or_else(|e| e.into_inner()).clone(),
        }
    }

    /// Drain the recorded lines.
    pub fn take_captured(&self) -> Vec<String> {
        match self {
            Console::Stdout => Vec::new(),
            Console::Capture(lines) => {
                std::mem::take(&mut *lines.lock().unwrap_or_else(|e| e.into_inner()))
            }
        }
    }
}

/// Context handed to the pipeline builder and every stage worker.
#[derive(Debug, Clone, Default)]
pub struct ShellContext {
    /// Current working directory.
    pub cwd: WorkingDir,
    /// Sink for print stages.
    pub console: Console,
}

impl ShellContext {
    /// Context rooted at `cwd`, printing to stdout.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: WorkingDir::new(cwd),
            console: Console::Stdout,
        }
    }

    /// Replace the console sink.
    pub fn with_console(mut self, console: Console) -> Self {
        self.console = console;
        self
    }
}
