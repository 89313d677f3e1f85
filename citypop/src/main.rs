#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! An HTTP façade over an Elasticsearch index of city populations.
//!
//! Citypop is split into several subcrates that work in collaboration.
//!
//! - [citypop-settings](../citypop_settings/index.html)
//! - [citypop-store](../citypop_store/index.html)
//! - [citypop-web](../citypop_web/index.html)
//! - [citypop-integration-tests](../citypop_integration_tests/index.html)

use anyhow::{Context, Result};
use citypop_settings::{LogFormat, Settings};
use citypop_store::CityStore;
use std::net::TcpListener;
use tracing_log::LogTracer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// Primary entry point
#[actix_rt::main]
async fn main() -> Result<()> {
    let settings = Settings::load().context("Loading settings")?;
    init_logging(&settings)?;
    let store =
        CityStore::new(&settings.elasticsearch).context("Creating Elasticsearch client")?;
    let listener = TcpListener::bind(settings.http.listen).context("Binding port")?;

    citypop_web::run(listener, store, settings)
        .context("Starting citypop-web server")?
        .await
        .context("Running citypop-web server")?;

    Ok(())
}

/// Set up logging for Citypop, based on settings and the `RUST_LOG`
/// environment variable.
fn init_logging(settings: &Settings) -> Result<()> {
    LogTracer::init()?;
    let env_filter: EnvFilter = (&settings.logging.levels).into();

    match settings.logging.format {
        LogFormat::Pretty => {
            let subscriber = tracing_subscriber::fmt::Subscriber::builder()
                .pretty()
                .finish()
                .with(env_filter);
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Compact => {
            let subscriber = tracing_subscriber::fmt::Subscriber::builder()
                .compact()
                .finish()
                .with(env_filter);
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Json => {
            let subscriber = tracing_subscriber::fmt::Subscriber::builder()
                .json()
                .finish()
                .with(env_filter);
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    Ok(())
}
