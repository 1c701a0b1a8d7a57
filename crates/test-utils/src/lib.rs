//! Shared helpers for the playbook-agent integration tests.

pub mod builders;
pub mod fake_launcher;

use std::future::Future;
use std::sync::{Arc, Once};
use std::time::Duration;

use playbook_agent::exec::RunRecord;
use playbook_agent::logging::LOG_ENV_VAR;
use tracing_subscriber::{fmt, EnvFilter};

/// Upper bound for any single wait on a run or the server.
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

static INIT: Once = Once::new();

/// Initialise tracing for tests, once per test binary.
///
/// Output is captured per test and only shown for failures (or with
/// `-- --nocapture`). The filter comes from `PLAYBOOK_AGENT_LOG`, the same
/// variable the agent reads, e.g. `PLAYBOOK_AGENT_LOG=playbook_agent=debug`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));

        fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .init();
    });
}

/// Run a future, failing the test after [`TEST_TIMEOUT`].
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: Future<Output = T>,
{
    tokio::time::timeout(TEST_TIMEOUT, f)
        .await
        .unwrap_or_else(|_| panic!("test timed out after {TEST_TIMEOUT:?}"))
}

/// Follow a run until its log stream ends and return every line.
///
/// The stream only ends after the record is terminal, so status, exit code
/// and summary are final once this returns.
pub async fn wait_for_run(run: &Arc<RunRecord>) -> Vec<String> {
    let mut sub = run.subscribe();
    with_timeout(async {
        let mut lines = Vec::new();
        while let Some(line) = sub.next_line().await {
            lines.push(line);
        }
        lines
    })
    .await
}
