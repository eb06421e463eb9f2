mod actions;
mod palette;
mod telemetry;

use ai_llm_service::LlmService;
use ai_llm_service::config::default_config::config_from_env;
use anyhow::{Context, Result};
use plugin_directory::{DirectoryClient, DirectoryConfig};
use tracing::info;

use crate::palette::Palette;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // A .env file is optional.
    dotenvy::dotenv().ok();
    telemetry::init()?;

    let dir_cfg = DirectoryConfig::from_env().context("invalid directory configuration")?;
    let client = DirectoryClient::new(&dir_cfg).context("failed to build directory client")?;

    let llm = config_from_env()
        .context("invalid LLM configuration")?
        .map(LlmService::from_config)
        .transpose()
        .context("failed to build LLM client")?;

    info!(
        api_url = %dir_cfg.api_url,
        per_page = dir_cfg.per_page,
        ai = ?llm.as_ref().map(LlmService::provider),
        "palette starting"
    );

    Palette::new(client, llm, dir_cfg.throttle).run().await
}
