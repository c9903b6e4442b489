//! Turn command-line flags into concrete checkpoint/config paths.

use std::path::{Path, PathBuf};

use anyhow::Context;
use model_manager::ModelSource;
use serde::Serialize;
use tracing::info;
use tts_core::EngineSpec;

use crate::cli::Args;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResolvedModel {
    pub model_name: Option<String>,
    pub vocoder_name: Option<String>,
    pub model_path: PathBuf,
    pub config_path: Option<PathBuf>,
    pub speakers_file_path: Option<PathBuf>,
    pub vocoder_path: Option<PathBuf>,
    pub vocoder_config_path: Option<PathBuf>,
}

impl ResolvedModel {
    /// Directory searched for a default reference `.wav`.
    pub fn model_dir(&self) -> &Path {
        self.model_path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }

    pub fn engine_spec(&self, use_cuda: bool) -> EngineSpec {
        EngineSpec {
            model_path: self.model_path.clone(),
            config_path: self.config_path.clone(),
            speakers_file: self.speakers_file_path.clone(),
            vocoder_path: self.vocoder_path.clone(),
            vocoder_config_path: self.vocoder_config_path.clone(),
            use_cuda,
        }
    }
}

/// Resolve model and vocoder files, downloading named models through `source`.
///
/// Explicit `--model_path` / `--vocoder_path` take precedence over names, and a
/// model name is not downloaded at all when its path is given.
pub async fn resolve_model<S>(args: &Args, source: &S) -> anyhow::Result<ResolvedModel>
where
    S: ModelSource + ?Sized,
{
    let mut model_path: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut speakers_file_path: Option<PathBuf> = None;
    let mut vocoder_path: Option<PathBuf> = None;
    let mut vocoder_config_path: Option<PathBuf> = None;
    let mut vocoder_name = args.vocoder_name.clone();

    if let (Some(name), None) = (&args.model_name, &args.model_path) {
        let downloaded = source
            .download_model(name)
            .await
            .with_context(|| format!("failed to fetch model {name}"))?;
        model_path = Some(downloaded.model_path);
        config_path = Some(downloaded.config_path);
        if vocoder_name.is_none() {
            vocoder_name = downloaded.item.default_vocoder;
        }
    }

    if let (Some(name), None) = (&vocoder_name, &args.vocoder_path) {
        let downloaded = source
            .download_model(name)
            .await
            .with_context(|| format!("failed to fetch vocoder {name}"))?;
        vocoder_path = Some(downloaded.model_path);
        vocoder_config_path = Some(downloaded.config_path);
    }

    if let Some(path) = &args.model_path {
        model_path = Some(path.clone());
        config_path = args.config_path.clone();
        speakers_file_path = args.speakers_file_path.clone();
    }

    if let Some(path) = &args.vocoder_path {
        vocoder_path = Some(path.clone());
        vocoder_config_path = args.vocoder_config_path.clone();
    }

    let model_path = model_path.ok_or_else(|| {
        anyhow::anyhow!("no model to load: pass --model_name or --model_path")
    })?;

    info!("Model checkpoint: {}", model_path.display());
    if let Some(v) = &vocoder_path {
        info!("Vocoder checkpoint: {}", v.display());
    }

    Ok(ResolvedModel {
        model_name: args.model_name.clone(),
        vocoder_name,
        model_path,
        config_path,
        speakers_file_path,
        vocoder_path,
        vocoder_config_path,
    })
}
