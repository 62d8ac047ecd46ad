use std::fs;
use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE: &str = "keyguide.log";
pub const LOG_ENV: &str = "KEYGUIDE_LOG";

/// Send tracing output to `<log_dir>/keyguide.log`; the terminal belongs to
/// the UI. `KEYGUIDE_LOG` overrides `default_filter`.
///
/// Keep the returned guard alive for the life of the process, dropping it
/// flushes the writer. A second call leaves the first subscriber in place.
pub fn init_tracing(log_dir: &Path, default_filter: &str) -> io::Result<WorkerGuard> {
    fs::create_dir_all(log_dir)?;
    let file_appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let _ = tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_env_filter(env_filter(default_filter))
        .try_init();
    Ok(guard)
}

fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("keyguide=info"))
}
