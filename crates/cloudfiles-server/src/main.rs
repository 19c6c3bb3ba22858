use anyhow::Context;
use cloudfiles_server::{logging, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init()?;

    let config = ServerConfig::from_env().context("invalid configuration")?;
    cloudfiles_server::serve(config).await?;

    Ok(())
}
