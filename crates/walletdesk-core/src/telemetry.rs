//! Tracing subscriber setup for binaries embedding the client.

use tracing_subscriber::EnvFilter;

/// Default directive when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "warn";

/// Directive used when verbose output is requested.
pub const VERBOSE_DIRECTIVE: &str = "debug";

/// Builds the filter: `RUST_LOG` wins, otherwise `warn` (or `debug` when
/// `verbose`).
pub fn env_filter(verbose: bool) -> EnvFilter {
    let fallback = if verbose { VERBOSE_DIRECTIVE } else { DEFAULT_DIRECTIVE };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Installs a stderr `fmt` subscriber. Returns `false` when a global
/// subscriber was already set.
pub fn init_tracing(verbose: bool) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_initialization_is_reported() {
        let _ = init_tracing(false);
        assert!(!init_tracing(true));
    }
}
