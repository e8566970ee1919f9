use std::path::Path;

use anyhow::Context;
use lead_config::LeadsConfig;

/// Load `.env` from the project root (falling back to the usual dotenv
/// search), then the layered configuration.
pub fn load_config(project_root: &Path) -> anyhow::Result<LeadsConfig> {
    load_project_dotenv(project_root)?;
    LeadsConfig::load_in(project_root).context("failed to load leads configuration")
}

fn load_project_dotenv(project_root: &Path) -> anyhow::Result<()> {
    let env_path = project_root.join(".env");
    if env_path.exists() {
        dotenvy::from_path(&env_path)
            .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
        return Ok(());
    }

    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded dotenv"),
        Err(error) if error.not_found() => {}
        Err(error) => return Err(error).context("failed to load dotenv file"),
    }
    Ok(())
}
