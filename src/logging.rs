use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber.
///
/// Logs go to stderr so `--json` output on stdout stays parseable. `RUST_LOG`
/// wins over the verbosity flag when set.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "classwork=debug,warn" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(verbose)
                .with_level(true)
                .compact(),
        )
        .try_init();
}
