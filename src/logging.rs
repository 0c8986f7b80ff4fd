//! Tracing setup: console output always, plus Loki shipping when `LOKI_URL`
//! is set and the `loki` feature is compiled in.

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use url::Url;

const DEFAULT_FILTER: &str = "info,sqlx=warn";

#[derive(Debug, Clone)]
pub struct LogSettings {
    pub filter: String,
    pub service: String,
    pub environment: String,
    /// Loki push endpoint. Console only when absent.
    pub loki_url: Option<Url>,
}

impl LogSettings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let loki_url = var("LOKI_URL")
            .filter(|raw| !raw.trim().is_empty())
            .map(|raw| Url::parse(raw.trim()).with_context(|| format!("Invalid LOKI_URL '{}'", raw)))
            .transpose()?;

        Ok(Self {
            filter: var("RUST_LOG").unwrap_or_else(|| DEFAULT_FILTER.to_string()),
            service: var("SERVICE_NAME").unwrap_or_else(|| "stockboard".to_string()),
            environment: var("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
            loki_url,
        })
    }
}

pub fn init_logging(settings: &LogSettings) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&settings.filter)
        .with_context(|| format!("Invalid log filter '{}'", settings.filter))?;
    let registry = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer());

    #[cfg(feature = "loki")]
    let registry = registry.with(loki_layer(settings)?);

    registry.try_init().context("Tracing subscriber already installed")?;

    tracing::info!(
        service = %settings.service,
        environment = %settings.environment,
        loki = settings.loki_url.is_some(),
        "Logging initialized"
    );
    #[cfg(not(feature = "loki"))]
    if settings.loki_url.is_some() {
        tracing::warn!("LOKI_URL is set but this build has no Loki support");
    }
    Ok(())
}

#[cfg(feature = "loki")]
fn loki_layer(settings: &LogSettings) -> anyhow::Result<Option<tracing_loki::Layer>> {
    let Some(url) = settings.loki_url.clone() else {
        return Ok(None);
    };
    let (layer, task) = tracing_loki::builder()
        .label("service", &settings.service)?
        .label("environment", &settings.environment)?
        .build_url(url)
        .context("Failed to build the Loki layer")?;
    tokio::spawn(task);
    Ok(Some(layer))
}
