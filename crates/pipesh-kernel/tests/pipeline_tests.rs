//! End-to-end tests: command lines through `Shell::execute`.

use std::path::Path;
use std::time::Duration;

use pipesh_kernel::{Console, JobStatus, KernelConfig, Outcome, Shell, ShellError};
use rstest::rstest;
use tempfile::TempDir;

/// A scratch directory with a few files and a capturing shell rooted in it.
fn fixture() -> (TempDir, Shell) {
    let dir = tempfile::tempdir().expect("tempdir");
    write(dir.path(), "letters.txt", &["ax", "b", "axx"]);
    write(dir.path(), "dupes.txt", &["a", "b", "a", "c", "b"]);
    std::fs::create_dir(dir.path().join("sub")).expect("mkdir");
    write(&dir.path().join("sub"), "inner.txt", &["deep"]);

    let shell = Shell::with_console(
        KernelConfig::named("test").with_cwd(dir.path()),
        Console::capture(),
    );
    (dir, shell)
}

fn write(dir: &Path, name: &str, lines: &[&str]) {
    let mut content = lines.join("\n");
    content.push('\n');
    std::fs::write(dir.join(name), content).expect("write fixture");
}

async fn output(shell: &Shell, line: &str) -> Vec<String> {
    let outcome = tokio::time::timeout(Duration::from_secs(5), shell.execute(line))
        .await
        .expect("command hung");
    assert!(
        matches!(outcome, Ok(Outcome::Completed(ref r)) if r.ok()),
        "{line}: {outcome:?}"
    );
    shell.context().console.take_captured()
}

#[rstest]
#[case("grep x", ShellError::RequiresInput("grep x".into()))]
#[case("wc", ShellError::RequiresInput("wc".into()))]
#[case("> out.txt", ShellError::RequiresInput("> out.txt".into()))]
#[case("cat letters.txt | pwd", ShellError::CannotHaveInput("pwd".into()))]
#[case("cat letters.txt | ls", ShellError::CannotHaveInput("ls".into()))]
#[case("cat letters.txt | cd sub", ShellError::CannotHaveInput("cd sub".into()))]
#[case("cd sub | wc", ShellError::CannotHaveOutput("cd sub".into()))]
#[case("cat letters.txt | bogus", ShellError::CommandNotFound("bogus".into()))]
#[case("catletters.txt", ShellError::CommandNotFound("catletters.txt".into()))]
#[case("cat", ShellError::RequiresParameter("cat".into()))]
#[case("cat missing.txt", ShellError::FileNotFound("cat missing.txt".into()))]
#[case("cat sub", ShellError::FileNotFound("cat sub".into()))]
#[case("cd nowhere", ShellError::DirectoryNotFound("cd nowhere".into()))]
#[case("cat letters.txt | grep", ShellError::RequiresParameter("grep".into()))]
#[case("kill two", ShellError::InvalidJobIndex("two".into()))]
#[case("kill 3", ShellError::NoSuchJob(3))]
#[tokio::test]
async fn test_rejected_lines(#[case] line: &str, #[case] expected: ShellError) {
    let (_dir, shell) = fixture();
    assert_eq!(shell.execute(line).await, Err(expected));
    assert!(shell.context().console.captured().is_empty());
}

#[rstest]
#[case("cat letters.txt", &["ax", "b", "axx"])]
#[case("cat letters.txt | grep x", &["ax", "axx"])]
#[case("cat letters.txt | grep x | wc", &["2 2 5"])]
#[case("cat dupes.txt | uniq", &["a", "b", "c"])]
#[case("cat dupes.txt | uniq | wc", &["3 3 3"])]
#[case("cat sub/inner.txt", &["deep"])]
#[case("cat letters.txt |", &["ax", "b", "axx"])]
#[case("ls", &["dupes.txt", "letters.txt", "sub"])]
#[case("ls | grep txt", &["dupes.txt", "letters.txt"])]
#[tokio::test]
async fn test_pipeline_output(#[case] line: &str, #[case] expected: &[&str]) {
    let (_dir, shell) = fixture();
    assert_eq!(output(&shell, line).await, expected);
}

#[tokio::test]
async fn test_head_and_tail_limits() {
    let (dir, shell) = fixture();
    let lines: Vec<String> = (1..=25).map(|i| format!("n{i}")).collect();
    let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
    write(dir.path(), "numbers.txt", &lines);

    let head = output(&shell, "cat numbers.txt | head").await;
    assert_eq!(head, lines[..10]);

    let tail = output(&shell, "cat numbers.txt | tail").await;
    assert_eq!(tail, lines[15..]);

    // Fewer lines than the limit come through unchanged.
    assert_eq!(output(&shell, "cat letters.txt | tail").await, ["ax", "b", "axx"]);
    assert_eq!(output(&shell, "cat letters.txt | head | wc").await, ["3 3 6"]);
}

#[tokio::test]
async fn test_head_on_large_input_terminates() {
    let (dir, shell) = fixture();
    let lines: Vec<String> = (0..50_000).map(|i| format!("row {i}")).collect();
    let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
    write(dir.path(), "big.txt", &lines);

    let head = output(&shell, "cat big.txt | head | wc").await;
    assert_eq!(head, ["10 20 50"]);
}

#[tokio::test]
async fn test_redirect_truncates_and_appends() {
    let (dir, shell) = fixture();
    let out = dir.path().join("out.txt");
    std::fs::write(&out, "stale contents\nfrom before\n").unwrap();

    assert!(output(&shell, "cat letters.txt > out.txt").await.is_empty());
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "ax\nb\naxx\n");

    assert!(output(&shell, "cat dupes.txt | uniq > out.txt").await.is_empty());
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "a\nb\nc\n");

    assert_eq!(output(&shell, "cat out.txt | wc").await, ["3 3 3"]);
}

#[tokio::test]
async fn test_cd_then_pwd_and_ls() {
    let (dir, shell) = fixture();

    assert!(output(&shell, "cd sub").await.is_empty());
    assert_eq!(
        output(&shell, "pwd").await,
        [dir.path().join("sub").display().to_string()]
    );
    assert_eq!(output(&shell, "ls").await, ["inner.txt"]);
    assert_eq!(output(&shell, "cat inner.txt").await, ["deep"]);

    assert!(output(&shell, "cd .").await.is_empty());
    assert_eq!(shell.cwd(), dir.path().join("sub"));

    assert!(output(&shell, "cd ..").await.is_empty());
    assert_eq!(shell.cwd(), dir.path());
}

#[tokio::test]
async fn test_cd_parent_after_dotdot_path() {
    let (dir, shell) = fixture();
    std::fs::create_dir_all(dir.path().join("a/b")).unwrap();
    std::fs::create_dir_all(dir.path().join("a/x")).unwrap();

    output(&shell, "cd a/b").await;
    output(&shell, "cd ../x").await;
    assert_eq!(shell.cwd(), dir.path().join("a/x"));
    assert_eq!(
        output(&shell, "pwd").await,
        [dir.path().join("a/x").display().to_string()]
    );

    output(&shell, "cd ..").await;
    assert_eq!(shell.cwd(), dir.path().join("a"));
    output(&shell, "cd ..").await;
    assert_eq!(shell.cwd(), dir.path());
}

#[tokio::test]
async fn test_exit_outcomes() {
    let (_dir, shell) = fixture();
    assert_eq!(shell.execute("exit").await, Ok(Outcome::Exit));
    assert_eq!(shell.execute("").await, Ok(Outcome::Empty));
}

#[tokio::test]
async fn test_background_job_runs_to_completion() {
    let (dir, shell) = fixture();

    match shell.execute("cat letters.txt > bg.txt &").await.unwrap() {
        Outcome::Background { command, .. } => assert_eq!(command, "cat letters.txt > bg.txt"),
        other => panic!("expected background outcome, got {other:?}"),
    }

    let results = shell.wait_background().await;
    assert_eq!(results.len(), 1);
    assert!(results[0].1.ok());
    assert_eq!(
        std::fs::read_to_string(dir.path().join("bg.txt")).unwrap(),
        "ax\nb\naxx\n"
    );
    assert_eq!(shell.execute("repl_jobs").await, Ok(Outcome::Jobs(Vec::new())));
}

#[tokio::test]
async fn test_concurrent_background_jobs() {
    let (dir, shell) = fixture();
    for i in 0..4 {
        shell
            .execute(&format!("cat dupes.txt | uniq > out{i}.txt &"))
            .await
            .unwrap();
    }
    let results = shell.wait_background().await;
    assert_eq!(results.len(), 4);
    for i in 0..4 {
        let text = std::fs::read_to_string(dir.path().join(format!("out{i}.txt"))).unwrap();
        assert_eq!(text, "a\nb\nc\n");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_list_and_kill_real_background_job() {
    let (dir, shell) = fixture();
    let lines: Vec<String> = (0..500_000).map(|i| format!("row {i}")).collect();
    let lines: Vec<&str> = lines.iter().map(String::as_str).collect();
    write(dir.path(), "big.txt", &lines);

    match shell.execute("cat big.txt | uniq > out.txt &").await.unwrap() {
        Outcome::Background { command, .. } => assert_eq!(command, "cat big.txt | uniq > out.txt"),
        other => panic!("expected background outcome, got {other:?}"),
    }

    match shell.execute("repl_jobs").await.unwrap() {
        Outcome::Jobs(jobs) => {
            assert_eq!(jobs.len(), 1);
            assert_eq!(jobs[0].position, 1);
            assert_eq!(jobs[0].command, "cat big.txt | uniq > out.txt");
            assert_eq!(jobs[0].status, JobStatus::Running);
        }
        other => panic!("expected listing, got {other:?}"),
    }

    match shell.execute("kill 1").await.unwrap() {
        Outcome::Killed(job) => {
            assert_eq!(job.command, "cat big.txt | uniq > out.txt");
            assert_eq!(job.status, JobStatus::Killed);
        }
        other => panic!("expected kill, got {other:?}"),
    }

    assert_eq!(shell.execute("repl_jobs").await, Ok(Outcome::Jobs(Vec::new())));
    assert_eq!(shell.execute("kill 1").await, Err(ShellError::NoSuchJob(1)));
}
