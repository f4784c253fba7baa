// tests/supervisor_process.rs
//
// Drives the supervisor with `sh` as the opaque interpreter: source goes in
// on stdin, merged output comes back, exit status decides the outcome.
#![cfg(unix)]

mod common;
use crate::common::{init_tracing, settings_for, with_timeout};

use std::error::Error;
use std::time::{Duration, Instant};

use taskbridge::errors::{BridgeError, BridgeErrorKind};
use taskbridge::exec::{cancel_pair, run_interpreter, CancelToken};
use tempfile::tempdir;

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn non_zero_exit_is_foreign_process_failure_with_output_tail() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let settings = settings_for("sh", &[], dir.path());

    let err = run_interpreter(
        &settings,
        "echo starting\necho boom 1>&2\nexit 1\n".to_string(),
        &mut CancelToken::never(),
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), BridgeErrorKind::Process);
    match err {
        BridgeError::ForeignProcessFailed { exit_code, output } => {
            assert_eq!(exit_code, 1);
            assert!(output.contains(&"starting".to_string()));
            assert!(output.contains(&"boom".to_string()));
        }
        other => panic!("expected ForeignProcessFailed, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn other_exit_codes_are_carried() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let settings = settings_for("sh", &[], dir.path());

    let err = run_interpreter(&settings, "exit 7\n".to_string(), &mut CancelToken::never())
        .await
        .unwrap_err();
    assert!(matches!(err, BridgeError::ForeignProcessFailed { exit_code: 7, .. }));
    Ok(())
}

#[tokio::test]
async fn success_captures_stdout_and_stderr() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let settings = settings_for("sh", &[], dir.path());

    let outcome = run_interpreter(
        &settings,
        "echo to-stdout\necho to-stderr 1>&2\n".to_string(),
        &mut CancelToken::never(),
    )
    .await?;

    assert_eq!(outcome.exit_code, 0);
    assert!(outcome.output_tail.contains(&"to-stdout".to_string()));
    assert!(outcome.output_tail.contains(&"to-stderr".to_string()));
    Ok(())
}

#[tokio::test]
async fn missing_program_is_launch_error() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let settings = settings_for("/definitely/not/an/interpreter", &[], dir.path());

    let err = run_interpreter(&settings, "exit 0\n".to_string(), &mut CancelToken::never())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), BridgeErrorKind::Launch);
    match err {
        BridgeError::ProcessLaunch { program, .. } => {
            assert_eq!(program, "/definitely/not/an/interpreter")
        }
        other => panic!("expected ProcessLaunch, got {other:?}"),
    }
    Ok(())
}

/// The child floods stdout and stderr (well past one pipe buffer each) while
/// we are still writing a megabyte of source into its stdin. Sequential
/// write-then-read would deadlock here.
#[tokio::test]
async fn large_output_during_large_input_does_not_deadlock() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let mut settings = (*settings_for("sh", &[], dir.path())).clone();
    settings.supervisor.output_tail_lines = 10_000;

    let line = "x".repeat(100);
    let mut source = format!(
        "i=0\nwhile [ $i -lt 3000 ]; do echo {line}; echo {line} 1>&2; i=$((i+1)); done\n"
    );
    let padding = format!("# {}\n", "p".repeat(1000));
    while source.len() < 1024 * 1024 {
        source.push_str(&padding);
    }
    source.push_str("echo finished\n");

    let outcome = with_timeout(run_interpreter(&settings, source, &mut CancelToken::never()))
        .await?;

    assert_eq!(outcome.exit_code, 0);
    // stdout and stderr are drained separately, so only membership is stable.
    assert!(outcome.output_tail.contains(&"finished".to_string()));
    Ok(())
}

#[tokio::test]
async fn cancellation_kills_the_child() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let settings = settings_for("sh", &[], dir.path());
    let (handle, mut token) = cancel_pair();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.cancel();
    });

    let started = Instant::now();
    let err = with_timeout(run_interpreter(&settings, "exec sleep 30\n".to_string(), &mut token))
        .await
        .unwrap_err();

    assert!(matches!(err, BridgeError::Cancelled));
    assert_eq!(err.kind(), BridgeErrorKind::Interrupted);
    assert!(started.elapsed() < Duration::from_secs(10));
    Ok(())
}

#[tokio::test]
async fn timeout_kills_the_child() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let settings = settings_for("sh", &[], dir.path());
    let settings = (*settings)
        .clone()
        .with_timeout(Some(Duration::from_millis(300)));

    let err = with_timeout(run_interpreter(
        &settings,
        "exec sleep 30\n".to_string(),
        &mut CancelToken::never(),
    ))
    .await
    .unwrap_err();

    match err {
        BridgeError::TimedOut { timeout_ms } => assert_eq!(timeout_ms, 300),
        other => panic!("expected TimedOut, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn interpreter_arguments_are_passed() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    // `sh -s a b` reads the script from stdin with positional args set.
    let settings = settings_for("sh", &["-s", "first", "second"], dir.path());

    let outcome = run_interpreter(&settings, "echo \"$2\"\n".to_string(), &mut CancelToken::never())
        .await?;
    assert_eq!(outcome.output_tail, vec!["second".to_string()]);
    Ok(())
}

/// The child exits 0 without reading its stdin, so most of the source never
/// arrives. That is a host-side stdin failure, not a success.
#[tokio::test]
async fn clean_exit_before_reading_source_is_stdin_error() -> TestResult {
    init_tracing();
    let dir = tempdir()?;
    let settings = settings_for("sh", &["-c", "exit 0"], dir.path());

    let source = "# padding\n".repeat(4 * 1024 * 1024 / 10);
    let err = with_timeout(run_interpreter(&settings, source, &mut CancelToken::never()))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), BridgeErrorKind::Process);
    match err {
        BridgeError::ProcessIo { stream, .. } => assert_eq!(stream, "stdin"),
        other => panic!("expected ProcessIo on stdin, got {other:?}"),
    }
    Ok(())
}
