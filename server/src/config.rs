// Deployment settings that are not command-line flags

use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub models_file: PathBuf,
    pub model_cache_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "::".to_string(),
            port: 5002,
            cors_allowed_origins: None,
            models_file: default_models_file(),
            model_cache_dir: model_manager::ModelManager::default_output_prefix(),
        }
    }
}

const MODELS_FILE_NAME: &str = ".models.json";

/// `.models.json` next to the executable, in the working directory, or at the
/// root of the source tree the binary was built from.
fn default_models_file() -> PathBuf {
    let mut candidates = Vec::new();
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(dir.join(MODELS_FILE_NAME));
    }
    candidates.push(PathBuf::from(MODELS_FILE_NAME));
    candidates.push(PathBuf::from(concat!(env!("CARGO_MANIFEST_DIR"), "/../.models.json")));
    first_existing(candidates)
}

/// The first candidate that is a file, else the last one.
fn first_existing(candidates: Vec<PathBuf>) -> PathBuf {
    let fallback = candidates.last().cloned().unwrap_or_default();
    candidates
        .into_iter()
        .find(|path| path.is_file())
        .unwrap_or(fallback)
}

impl ServerConfig {
    /// Read overrides from the environment. `port` comes from the CLI and wins.
    pub fn from_env(port: u16) -> Self {
        let host = std::env::var("TTS_HOST")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| "::".to_string());

        let cors_allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
            .ok()
            .map(|origins| {
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            });

        let models_file = std::env::var("TTS_MODELS_FILE")
            .ok()
            .map(PathBuf::from)
            .unwrap_or_else(default_models_file);

        Self {
            host,
            port,
            cors_allowed_origins,
            models_file,
            model_cache_dir: model_manager::ModelManager::default_output_prefix(),
        }
    }

    pub fn bind_addr(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}
