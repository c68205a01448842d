//! pipesh CLI entry point.
//!
//! Usage:
//!   pipesh                     # Interactive REPL
//!   pipesh -c <command>        # Execute command and exit

use std::env;
use std::process::ExitCode;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use pipesh_repl::{Flow, Repl, ReplConfig};

fn main() -> ExitCode {
    // Logs go to stderr so they never mix with pipeline output.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        None => {
            let config = ReplConfig::load()?;
            pipesh_repl::run(&config)?;
            Ok(ExitCode::SUCCESS)
        }

        Some("--help" | "-h") => {
            print_help();
            Ok(ExitCode::SUCCESS)
        }

        Some("--version" | "-V") => {
            println!("pipesh {}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }

        Some("-c") => {
            let cmd = args.get(2).context("-c requires a command argument")?;
            run_command(cmd)
        }

        Some(unknown) => {
            eprintln!("Unknown option: {unknown}");
            eprintln!("Run 'pipesh --help' for usage.");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn print_help() {
    println!(
        r#"pipesh v{}

Usage:
  pipesh                       Interactive REPL
  pipesh -c <command>          Execute command and exit

Options:
  -c <command>                 Execute command string and exit
  -h, --help                   Show this help
  -V, --version                Show version

Commands:
  cat <file>                   Emit the lines of a file
  cd <dir | . | ..>            Change directory
  grep <text>                  Keep lines containing text
  wc                           Count lines, words and characters
  uniq                         Drop repeated lines
  head, tail                   First or last 10 lines
  pwd, ls                      Working directory and its entries
  > <file>                     Write lines to a file
  repl_jobs                    List background jobs
  kill <n>                     Stop background job n
  exit                         Leave the shell

  a | b | c                    Pipeline
  cmd &                        Run in background

Configuration:
  ~/.config/pipesh/config.toml (prompt, banner, history, history_file)
  RUST_LOG controls log output on stderr.
"#,
        env!("CARGO_PKG_VERSION")
    );
}

/// Execute a command string and exit.
fn run_command(cmd: &str) -> Result<ExitCode> {
    let mut repl = Repl::new()?;
    let code = match repl.process_line(cmd) {
        Flow::Continue(output) => {
            if let Some(output) = output {
                println!("{output}");
            }
            ExitCode::SUCCESS
        }
        Flow::Failed(message) => {
            println!("{message}");
            ExitCode::FAILURE
        }
        Flow::Exit => ExitCode::SUCCESS,
    };
    repl.shutdown();
    Ok(code)
}
