//! Tracing setup.
//!
//! `RUST_LOG` overrides the default filter, e.g.
//! `RUST_LOG=desktop_celebrator_lib=trace` to watch every stream frame.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init() {
    let default_level = if cfg!(debug_assertions) {
        "desktop_celebrator_lib=debug,info"
    } else {
        "desktop_celebrator_lib=info,warn"
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .compact(),
        )
        .try_init();
}

#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new("debug"))
        .with(fmt::layer().with_test_writer())
        .try_init();
}
