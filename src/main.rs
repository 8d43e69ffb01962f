use hkingdom::{run_app, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hkingdom=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::load()?;
    if let Err(error) = run_app(config).await {
        tracing::error!("Error: {:#}", error);
        return Err(error);
    }
    Ok(())
}
