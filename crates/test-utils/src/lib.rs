pub mod builders;
pub mod fake_executor;

use std::path::PathBuf;
use std::sync::{Arc, Once};

use taskbridge::config::{RawSettings, Settings};
use tracing_subscriber::{fmt, EnvFilter};

static INIT: Once = Once::new();

/// Initialise tracing for tests.
///
/// - Uses `with_test_writer()`, so logs are captured per-test.
/// - The Rust test harness only prints captured output for **failing** tests
///   (unless you run with `-- --nocapture`).
///
/// Enable levels with e.g.:
/// `RUST_LOG=debug cargo test`
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer() // print only for failing tests unless --nocapture
            .with_target(true)
            .init();
    });
}

/// Run a future with a 30-second timeout.
#[allow(dead_code)]
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(30), f)
        .await
        .expect("Test timed out after 30 seconds")
}

/// First Python 3 interpreter found on `PATH`, if any.
///
/// Tests that need a real interpreter return early when this is `None`.
pub fn find_python() -> Option<PathBuf> {
    ["python3", "python"]
        .into_iter()
        .filter_map(|name| which::which(name).ok())
        .find(|candidate| is_python3(candidate))
}

fn is_python3(candidate: &std::path::Path) -> bool {
    std::process::Command::new(candidate)
        .args(["-c", "import sys; sys.exit(0 if sys.version_info[0] == 3 else 1)"])
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

/// Settings that run `program` with `args`, keep exchange files in
/// `exchange_dir` and discard child output.
pub fn settings_for(
    program: impl Into<String>,
    args: &[&str],
    exchange_dir: &std::path::Path,
) -> Arc<Settings> {
    let mut raw = RawSettings::default();
    raw.interpreter.program = program.into();
    raw.interpreter.args = args.iter().map(|a| a.to_string()).collect();
    raw.exchange.dir = Some(exchange_dir.to_path_buf());
    raw.supervisor.forward_output = taskbridge::types::OutputForward::Discard;
    Arc::new(Settings::try_from(raw).expect("test settings are valid"))
}
