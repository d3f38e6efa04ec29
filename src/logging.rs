use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter, e.g. `vagrant_wrapper=debug`.
pub const LOG_ENV: &str = "VAGRANT_WRAPPER_LOG";

/// Installs the global subscriber, writing to stderr.
///
/// `VAGRANT_WRAPPER_LOG` wins over `default_directive`. Stdout is left alone
/// so output passed through from the tool stays untouched. Calling this more
/// than once is harmless.
pub fn init(default_directive: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Maps a `-v` count to a default filter directive.
pub fn directive_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}
