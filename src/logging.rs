use std::backtrace::Backtrace;

use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_tracing(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let filter_desc = filter.to_string();
    if fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .is_err()
    {
        // already installed (tests, embedded use)
        return;
    }
    set_panic_hook();
    tracing::debug!(filter = %filter_desc, "tracing initialised");
}

fn set_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let message = if let Some(message) = info.payload().downcast_ref::<&str>() {
            *message
        } else if let Some(message) = info.payload().downcast_ref::<String>() {
            message.as_str()
        } else {
            "unknown panic"
        };

        let thread = std::thread::current();
        let thread_name = thread.name().unwrap_or("unnamed");
        let backtrace = Backtrace::capture();

        match info.location() {
            Some(location) => tracing::error!(
                panic = %message,
                thread = thread_name,
                location = %location,
                backtrace = %backtrace,
                "panic"
            ),
            None => tracing::error!(
                panic = %message,
                thread = thread_name,
                backtrace = %backtrace,
                "panic"
            ),
        }
    }));
}
