use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initializes logging to stderr, keeping stdout for the script's own output.
/// `env_filter` uses the `EnvFilter` directive syntax, e.g. `warn,helpers=debug`.
pub fn initialize(env_filter: &str) {
    set_tracing_subscriber(env_filter);
    std::panic::set_hook(Box::new(tracing_panic_hook));
}

/// Like [`initialize`], but can be called multiple times in a row. Later calls
/// are ignored.
///
/// Useful for tests.
pub fn initialize_reentrant(env_filter: &str) {
    static ONCE: Once = Once::new();
    ONCE.call_once(|| set_tracing_subscriber(env_filter));
}

fn set_tracing_subscriber(env_filter: &str) {
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(EnvFilter::new(env_filter)),
        )
        .init();
}

/// Panic hook that reports the panic through `tracing:error` like any other failure.
fn tracing_panic_hook(panic: &std::panic::PanicHookInfo) {
    let thread = std::thread::current();
    let name = thread.name().unwrap_or("<unnamed>");
    let backtrace = std::backtrace::Backtrace::force_capture();
    tracing::error!("thread '{name}' {panic}\nstack backtrace:\n{backtrace}");
}
