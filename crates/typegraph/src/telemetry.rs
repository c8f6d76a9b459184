//! Subscriber setup for reading scan spans and traversal trace lines.

use std::sync::OnceLock;

use thiserror::Error;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

/// Directives used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_DIRECTIVES: &str = "typegraph=info,typegraph::trace=trace";

static INSTALLED: OnceLock<()> = OnceLock::new();

#[derive(Debug, Error)]
pub enum TracingSetupError {
    #[error("`{directives}` is not a usable log filter")]
    Filter {
        directives: &'static str,
        #[source]
        source: ParseError,
    },
    #[error("a global tracing subscriber is already installed")]
    Install(#[from] SetGlobalDefaultError),
}

/// Installs a global `fmt` subscriber for scan diagnostics.
///
/// Only the first successful call installs anything. Trace lines appear
/// only for scanners built with tracing on, see [`TRACE_ENV`](crate::TRACE_ENV).
pub fn init_tracing() -> Result<(), TracingSetupError> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => default_filter()?,
    };
    tracing::subscriber::set_global_default(
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .without_time()
            .compact()
            .finish(),
    )?;
    let _ = INSTALLED.set(());
    Ok(())
}

fn default_filter() -> Result<EnvFilter, TracingSetupError> {
    EnvFilter::try_new(DEFAULT_DIRECTIVES).map_err(|source| TracingSetupError::Filter {
        directives: DEFAULT_DIRECTIVES,
        source,
    })
}
