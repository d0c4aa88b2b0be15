use garnish::prelude::*;
use tracing_subscriber::EnvFilter;
use weather_server::{AppModule, GithubClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Starting weather server...");

    let repos = GithubClient::new().get_repos();
    tracing::info!(count = repos.len(), "fetched repos");

    start_app(AppModule::registry()).await?;
    Ok(())
}
