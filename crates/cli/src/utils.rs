//! Utility functions used by the solcst CLI.

use solcst_interface::{config::ColorChoice, diagnostics::DiagCtxt};

fn early_dcx() -> DiagCtxt {
    DiagCtxt::with_stderr_emitter(ColorChoice::Auto)
}

/// Initialize the tracing logger. Logs go to stderr, filtered by `RUST_LOG`.
#[must_use]
pub fn init_logger() -> impl Sized {
    #[cfg(not(feature = "tracing"))]
    if std::env::var_os("RUST_LOG").is_some() {
        let msg = "`RUST_LOG` is set, but \"tracing\" support was not enabled at compile time";
        early_dcx().warn(msg).emit();
    }

    #[cfg(feature = "tracing")]
    if let Err(e) = try_init_logger() {
        early_dcx().err(e).emit();
    }
}

#[cfg(feature = "tracing")]
fn try_init_logger() -> Result<(), String> {
    use tracing_subscriber::{filter::LevelFilter, prelude::*};

    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(LevelFilter::OFF.into())
        .from_env_lossy();
    tracing_subscriber::Registry::default()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| e.to_string())
}
