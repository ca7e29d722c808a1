use sitelet::{ServerSettings, SiteError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), SiteError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = ServerSettings::from_env()?;
    sitelet::serve(settings).await
}
