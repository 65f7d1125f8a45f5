//! Logging init: stderr only. Diagnostics are emitted to the error stream
//! (spec.md §6); unlike the teacher, this never writes a log file — a
//! persisted log would violate spec.md §6's "no other files are persisted"
//! contract, so the teacher's XDG log-file behavior is deliberately not
//! carried here.

use tracing_subscriber::EnvFilter;

pub fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}
