use actix_web::{middleware, web, App, HttpServer};
use amp_cache_purge::{CachePurger, CredentialProvider};
use anyhow::Context;
use purge_service::config::ServiceConfig;
use purge_service::handlers;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = ServiceConfig::from_env().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info".into());
    if config.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting purge-service");

    let purger = CachePurger::from_config(&config.purge).context("Failed to build purger")?;

    // Fail fast on a bad key when it is only going to be read once anyway
    if config.purge.private_key_cache {
        purger
            .credentials()
            .current_key()
            .context("Failed to load signing key")?;
    }

    let purger = web::Data::new(purger);
    let (host, port) = config.bind_addr();
    tracing::info!("purge-service listening on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(purger.clone())
            .wrap(middleware::Logger::default())
            .configure(handlers::configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;

    Ok(())
}
