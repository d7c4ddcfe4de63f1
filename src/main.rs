mod bioc;
mod config;
mod harvest;
mod keywords;
mod pubmed;
mod server;

pub const USER_AGENT: &str = concat!("herbalist/", env!("CARGO_PKG_VERSION"));

use clap::Parser;
use reqwest::Client;
use tokio::net::TcpListener;
use tracing::info;

use bioc::BiocClient;
use config::Cli;
use harvest::Harvester;
use pubmed::PubMedClient;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("herbalist=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    cli.validate()?;

    let http = Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(cli.connect_timeout())
        .timeout(cli.http_timeout())
        .build()?;

    let pubmed = match &cli.eutils_base {
        Some(base) => PubMedClient::with_base_url(http.clone(), base),
        None => PubMedClient::new(http.clone()),
    };
    let bioc = match &cli.bioc_base {
        Some(base) => BiocClient::with_base_url(http, base),
        None => BiocClient::new(http),
    }
    .with_max_bytes(cli.max_document_bytes);
    let options = cli.harvest_options();
    let app = server::router(Harvester::new(pubmed, bioc, options));

    let listener = TcpListener::bind(cli.listen).await?;
    info!(addr = %cli.listen, ?options, "herbalist listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| tracing::error!("server error: {e}"))?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
