use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings read from `osqt.toml`; command-line flags take precedence.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OsqtConfig {
    /// Root of the `.table` spec tree
    pub specs_dir: Option<PathBuf>,
    /// Previously exported schema document (json/yaml)
    pub schema: Option<PathBuf>,
    pub output_format: Option<String>,
    pub listen_addr: Option<String>,
    pub target_os: Option<String>,
    pub workers: Option<usize>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("osqt.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<OsqtConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: OsqtConfig = toml::from_str(&contents)
        .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;
    tracing::debug!(path = %path.display(), "Loaded config");
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &OsqtConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}

/// Starter config written by `osqt init`.
pub fn starter_config(specs_dir: Option<PathBuf>) -> OsqtConfig {
    OsqtConfig {
        specs_dir: Some(specs_dir.unwrap_or_else(|| PathBuf::from("specs"))),
        schema: None,
        output_format: Some("json".to_string()),
        listen_addr: Some("127.0.0.1:13306".to_string()),
        target_os: Some(crate::platform::host_os().to_string()),
        workers: None,
    }
}
