#[macro_use]
extern crate tracing;

use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use folio_chat_core::ExchangeServiceBuilder;
use folio_chat_gemini_model::GeminiProvider;
use folio_chat_server::config::Settings;
use folio_chat_server::{AppState, create_router};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = Settings::parse();
    match run(settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(settings: Settings) -> Result<(), Box<dyn Error>> {
    settings.validate()?;
    debug!("settings: {settings:?}");

    let origins = settings.origin_headers()?;
    let persona = settings.load_persona().await?;
    let provider = GeminiProvider::new(settings.gemini_config());
    let exchange = ExchangeServiceBuilder::with_model_provider(provider)
        .with_persona(persona)
        .with_timeout(settings.timeout())
        .build();
    let app = create_router(AppState::new(exchange), &origins);

    let listener = TcpListener::bind(settings.socket_addr()).await?;
    info!(
        "listening on {} with model {}",
        listener.local_addr()?,
        settings.model
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for ctrl-c: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
