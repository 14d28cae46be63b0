//! Tracing subscriber setup
//!
//! Library code only emits `tracing` events; binaries and tests call
//! [`init_tracing`] once to install a formatter. `RUST_LOG` overrides the
//! default directive.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Install a global subscriber filtered by `RUST_LOG` or `default_directive`.
///
/// Returns `false` when a global subscriber was already installed, which
/// happens when several tests in one process initialise logging.
///
/// # Errors
/// Returns an error if `default_directive` is not a valid filter.
pub fn init_tracing(
    default_directive: &str,
    format: LogFormat,
) -> Result<bool, tracing_subscriber::filter::ParseError> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_directive))?;

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = match format {
        LogFormat::Pretty => {
            registry.with(tracing_subscriber::fmt::layer().with_target(true)).try_init().is_ok()
        }
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init()
            .is_ok(),
    };

    Ok(installed)
}
