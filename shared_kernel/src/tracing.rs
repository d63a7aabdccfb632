use tracing_subscriber::prelude::*;
use tracing_subscriber::Registry;

/// Installs the JSON formatter on stderr so that command output on stdout stays
/// clean. The filter comes from `RUST_LOG` and falls back to `default_filter`.
pub fn config_telemetry(default_filter: &str) -> anyhow::Result<()> {
    // Needed to forward ordinary log statements to our tracing subscriber.
    tracing_log::LogTracer::init()?;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    let subscriber = Registry::default().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(std::io::stderr),
    );

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
