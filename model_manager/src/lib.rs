//! Pretrained model catalog and download cache.
//!
//! Models are addressed by `<type>/<language>/<dataset>/<model>` names listed
//! in a `.models.json` catalog. A downloaded bundle is a checkpoint plus its
//! config, cached under `<output_prefix>/<type>--<language>--<dataset>--<model>/`.

pub mod catalog;
pub mod error;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::StreamExt;
use tokio::io::AsyncWriteExt;
use tracing::info;

pub use catalog::{Catalog, ModelItem, ModelName};
pub use error::{ManagerError, ManagerResult};

pub const MODEL_FILE: &str = "model.onnx";
pub const CONFIG_FILE: &str = "model.onnx.json";

/// A bundle available on local disk.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadedModel {
    pub model_path: PathBuf,
    pub config_path: PathBuf,
    pub item: ModelItem,
}

/// Anything that can turn a model name into local checkpoint/config files.
#[async_trait]
pub trait ModelSource: Send + Sync {
    async fn download_model(&self, name: &str) -> ManagerResult<DownloadedModel>;
}

#[derive(Debug, Clone)]
pub struct ModelManager {
    catalog: Catalog,
    output_prefix: PathBuf,
    client: reqwest::Client,
}

impl ModelManager {
    pub fn new<P: AsRef<Path>, Q: Into<PathBuf>>(catalog_path: P, output_prefix: Q) -> ManagerResult<Self> {
        let catalog = Catalog::load(catalog_path.as_ref())?;
        Ok(Self {
            catalog,
            output_prefix: output_prefix.into(),
            client: reqwest::Client::new(),
        })
    }

    /// `$TTS_HOME`, else `<user data dir>/tts`.
    pub fn default_output_prefix() -> PathBuf {
        if let Ok(home) = std::env::var("TTS_HOME") {
            if !home.trim().is_empty() {
                return PathBuf::from(home);
            }
        }
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tts")
    }

    pub fn list_models(&self) -> Vec<String> {
        self.catalog.names()
    }

    /// Print the catalog, one numbered model per line.
    pub fn print_models(&self) {
        println!(" Name format: type/language/dataset/model");
        for (i, name) in self.list_models().iter().enumerate() {
            println!(" {}: {}", i + 1, name);
        }
    }

    /// Where a bundle for `name` lives (or would live) on disk.
    pub fn bundle_dir(&self, name: &ModelName) -> PathBuf {
        self.output_prefix.join(name.cache_dir_name())
    }

    async fn fetch(&self, url: &str, dest: &Path) -> ManagerResult<()> {
        let http_err = |source| ManagerError::Http { url: url.to_string(), source };
        let io_err = |source| ManagerError::CacheIo { path: dest.to_path_buf(), source };

        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(http_err)?;

        // Only complete files get the final name
        let mut partial = dest.as_os_str().to_os_string();
        partial.push(".part");
        let partial = PathBuf::from(partial);

        let mut file = tokio::fs::File::create(&partial).await.map_err(io_err)?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(http_err)?;
            file.write_all(&chunk).await.map_err(io_err)?;
        }
        file.flush().await.map_err(io_err)?;
        drop(file);

        tokio::fs::rename(&partial, dest).await.map_err(io_err)?;
        Ok(())
    }
}

#[async_trait]
impl ModelSource for ModelManager {
    async fn download_model(&self, name: &str) -> ManagerResult<DownloadedModel> {
        let parsed: ModelName = name.parse()?;
        let item = self
            .catalog
            .get(&parsed)
            .cloned()
            .ok_or_else(|| ManagerError::UnknownModel(name.to_string()))?;

        let dir = self.bundle_dir(&parsed);
        let model_path = dir.join(MODEL_FILE);
        let config_path = dir.join(CONFIG_FILE);

        if model_path.is_file() && config_path.is_file() {
            info!(" > {name} is already downloaded.");
            return Ok(DownloadedModel { model_path, config_path, item });
        }

        let model_url = item.model_url.as_deref().ok_or_else(|| ManagerError::MissingUrl {
            name: name.to_string(),
            field: "model_url",
        })?;
        let config_url = item.config_url.as_deref().ok_or_else(|| ManagerError::MissingUrl {
            name: name.to_string(),
            field: "config_url",
        })?;

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|source| ManagerError::CacheIo { path: dir.clone(), source })?;

        info!(" > Downloading model to {}", dir.display());
        self.fetch(config_url, &config_path).await?;
        self.fetch(model_url, &model_path).await?;
        info!(" > Model's license - {}", item.license.as_deref().unwrap_or("unknown"));

        Ok(DownloadedModel { model_path, config_path, item })
    }
}
