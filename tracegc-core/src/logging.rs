use std::env;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a `tracing` subscriber for tools embedding the trace.
///
/// - Debug builds log this crate at `debug`; release builds at `info`.
/// - Filter rules from `RUST_LOG` are applied on top of the defaults, so
///   `RUST_LOG=tracegc_core=trace` raises this crate's level.
///
/// Call once, early. A second call returns an error instead of replacing the
/// installed subscriber.
pub fn init() -> anyhow::Result<()> {
    let crate_level = if cfg!(debug_assertions) {
        "tracegc_core=debug"
    } else {
        "tracegc_core=info"
    };

    // later directives for the same target replace earlier ones
    let directives = match env::var(EnvFilter::DEFAULT_ENV) {
        Ok(from_env) if !from_env.trim().is_empty() => format!("{crate_level},{from_env}"),
        _ => crate_level.to_string(),
    };

    tracing_subscriber::Registry::default()
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .parse(directives)?,
        )
        .try_init()?;
    Ok(())
}
