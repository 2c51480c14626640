use anyhow::anyhow;
use tracing::Level;
use tracing_error::ErrorLayer;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber and `color-eyre` reports.
///
/// `RUST_LOG` overrides `level` when set. Fails if a global subscriber is
/// already installed.
pub fn init_logging(level: Level, json: bool) -> anyhow::Result<()> {
    color_eyre::install().map_err(|e| anyhow!("failed to install color-eyre: {e}"))?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("asset_registry_client={level}")));

    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(ErrorLayer::default());

    if json {
        registry.with(fmt::layer().json()).try_init()?;
    } else {
        registry.with(fmt::layer()).try_init()?;
    }

    Ok(())
}
