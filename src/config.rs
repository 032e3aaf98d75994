use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable selecting the storage base root
pub const BASE_DIR_ENV: &str = "DOCKER_COMPOSE_CONTEXT";

/// Legacy encodings tried after UTF-8, in order
pub const DEFAULT_ENCODINGS: &[&str] = &["euc-kr", "windows-949"];

fn default_encodings() -> Vec<String> {
    DEFAULT_ENCODINGS.iter().map(|s| s.to_string()).collect()
}

/// Resolved storage configuration, passed to the store at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    pub base_dir: PathBuf,
    #[serde(default = "default_encodings")]
    pub encodings: Vec<String>,
}

impl StoreConfig {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            encodings: default_encodings(),
        }
    }

    /// Resolve from the process environment
    pub fn from_env() -> Self {
        Self::resolve(None)
    }

    /// Resolve with precedence: environment, config file, working-directory default
    pub fn resolve(file: Option<SqlskelConfig>) -> Self {
        let file = file.unwrap_or_default();
        let env_dir = std::env::var_os(BASE_DIR_ENV).filter(|v| !v.is_empty()).map(PathBuf::from);
        let base_dir = env_dir
            .or_else(|| file.base_dir.map(PathBuf::from))
            .unwrap_or_else(|| default_base_dir_in(std::env::current_dir().ok().as_deref()));

        Self {
            base_dir,
            encodings: file.encodings.unwrap_or_else(default_encodings),
        }
    }
}

/// `data/` next to the working directory
pub fn default_base_dir_in(cwd: Option<&Path>) -> PathBuf {
    match cwd {
        Some(cwd) => cwd.parent().unwrap_or(cwd).join("data"),
        None => PathBuf::from("data"),
    }
}

/// On-disk `sqlskel.toml`
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SqlskelConfig {
    pub base_dir: Option<String>,
    pub encodings: Option<Vec<String>>,
}

pub fn default_config_path() -> PathBuf {
    PathBuf::from("sqlskel.toml")
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Option<SqlskelConfig>> {
    let path = path.map(Path::to_path_buf).unwrap_or_else(default_config_path);
    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path)?;
    let config: SqlskelConfig =
        toml::from_str(&contents).with_context(|| format!("invalid config {}", path.display()))?;

    for label in config.encodings.iter().flatten() {
        if encoding_rs::Encoding::for_label(label.as_bytes()).is_none() {
            anyhow::bail!("unknown encoding {:?} in {}", label, path.display());
        }
    }
    Ok(Some(config))
}

pub fn write_config(path: &Path, config: &SqlskelConfig, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!("config already exists at {} (use --force to overwrite)", path.display());
    }

    let contents = toml::to_string_pretty(config)?;
    std::fs::write(path, contents)?;
    Ok(())
}
