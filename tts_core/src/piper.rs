use std::{
    fs, io,
    path::{Path, PathBuf},
};

use anyhow::Context;
use piper_rs::synth::{PiperSpeechStreamParallel, PiperSpeechSynthesizer};
use tracing::{debug, info, warn};

use crate::{config, ModelCapabilities, SpeechEngine, SynthesisRequest, Waveform};

/// Checkpoint and config files an engine is built from.
#[derive(Debug, Clone, Default)]
pub struct EngineSpec {
    pub model_path: PathBuf,
    /// Model config; piper keeps it next to the checkpoint as `<model>.json`
    pub config_path: Option<PathBuf>,
    pub speakers_file: Option<PathBuf>,
    pub vocoder_path: Option<PathBuf>,
    pub vocoder_config_path: Option<PathBuf>,
    pub use_cuda: bool,
}

impl EngineSpec {
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            ..Default::default()
        }
    }

    /// The explicit config path, or the piper sidecar `<model_path>.json`.
    pub fn effective_config_path(&self) -> PathBuf {
        match &self.config_path {
            Some(p) => p.clone(),
            None => sidecar_config(&self.model_path),
        }
    }
}

fn sidecar_config(model_path: &Path) -> PathBuf {
    let mut s = model_path.as_os_str().to_os_string();
    s.push(".json");
    PathBuf::from(s)
}

/// The checkpoint piper opens for a config: `<dir>/<config file stem>`.
fn piper_checkpoint(config_path: &Path) -> PathBuf {
    match config_path.file_stem() {
        Some(stem) => config_path.with_file_name(stem),
        None => config_path.to_path_buf(),
    }
}

/// A config path piper can load the requested checkpoint from.
///
/// When the config is not the checkpoint's sidecar, both files are placed in a
/// scratch directory as `model.onnx` and `model.onnx.json`. The directory is
/// removed on drop.
#[derive(Debug)]
struct StagedModel {
    config_path: PathBuf,
    scratch_dir: Option<PathBuf>,
}

impl Drop for StagedModel {
    fn drop(&mut self) {
        if let Some(dir) = &self.scratch_dir {
            let _ = fs::remove_dir_all(dir);
        }
    }
}

#[cfg(unix)]
fn link_checkpoint(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

#[cfg(not(unix))]
fn link_checkpoint(src: &Path, dst: &Path) -> io::Result<()> {
    fs::copy(src, dst).map(|_| ())
}

fn stage_model(model_path: &Path, config_path: &Path) -> anyhow::Result<StagedModel> {
    if piper_checkpoint(config_path) == model_path {
        return Ok(StagedModel {
            config_path: config_path.to_path_buf(),
            scratch_dir: None,
        });
    }

    let model_path = fs::canonicalize(model_path)
        .with_context(|| format!("cannot resolve checkpoint {}", model_path.display()))?;
    let dir = std::env::temp_dir().join(format!("tts_core_piper_{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).with_context(|| format!("cannot create {}", dir.display()))?;

    let staged = StagedModel {
        config_path: dir.join("model.onnx.json"),
        scratch_dir: Some(dir.clone()),
    };
    link_checkpoint(&model_path, &dir.join("model.onnx"))
        .with_context(|| format!("cannot stage checkpoint {}", model_path.display()))?;
    fs::copy(config_path, &staged.config_path)
        .with_context(|| format!("cannot stage config {}", config_path.display()))?;
    Ok(staged)
}

/// Piper (VITS over ONNX Runtime) engine.
pub struct PiperEngine {
    synth: PiperSpeechSynthesizer,
    sample_rate: u32,
    // Kept alive for as long as the session may read the checkpoint
    staged: StagedModel,
}

// PiperSpeechSynthesizer doesn't implement Debug
impl std::fmt::Debug for PiperEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PiperEngine")
            .field("synth", &"<PiperSpeechSynthesizer>")
            .field("sample_rate", &self.sample_rate)
            .field("config", &self.staged.config_path)
            .finish()
    }
}

impl PiperEngine {
    /// Load the checkpoint described by `spec` and report what it supports.
    pub fn load(spec: &EngineSpec) -> anyhow::Result<(Self, ModelCapabilities)> {
        if !spec.model_path.is_file() {
            return Err(anyhow::anyhow!(
                "model checkpoint not found: {}",
                spec.model_path.display()
            ));
        }

        let cfg_path = spec.effective_config_path();
        let cfg = config::load_config(&cfg_path)?;
        let capabilities = ModelCapabilities::from_config(&cfg, spec.speakers_file.as_deref())?;

        if spec.use_cuda {
            warn!("CUDA requested; piper runs on the default ONNX Runtime provider");
        }
        if let Some(vocoder) = &spec.vocoder_path {
            info!(
                "piper models are end-to-end; vocoder {} is not loaded",
                vocoder.display()
            );
        }

        let staged = stage_model(&spec.model_path, &cfg_path)?;
        if staged.scratch_dir.is_some() {
            info!(
                "Staged {} with config {} at {}",
                spec.model_path.display(),
                cfg_path.display(),
                staged.config_path.display()
            );
        }

        info!("Loading piper model from {}", staged.config_path.display());
        let model = piper_rs::from_config_path(&staged.config_path)
            .map_err(|e| anyhow::anyhow!("piper load error: {e}"))?;
        let synth = PiperSpeechSynthesizer::new(model)?;

        info!(
            "Model loaded (sample rate: {}Hz, multi-speaker: {}, multi-language: {})",
            capabilities.sample_rate, capabilities.multi_speaker, capabilities.multi_language
        );

        Ok((
            Self {
                synth,
                sample_rate: capabilities.sample_rate,
                staged,
            },
            capabilities,
        ))
    }
}

impl SpeechEngine for PiperEngine {
    fn synthesize(&mut self, request: &SynthesisRequest) -> anyhow::Result<Waveform> {
        // piper-rs has no public speaker/language/reference-audio selection
        if request.speaker.is_some() || request.language.is_some() {
            debug!(
                "speaker {:?} / language {:?} not applied by piper",
                request.speaker, request.language
            );
        }
        if let Some(wav) = request.style_wav.as_ref().or(request.reference_wav.as_ref()) {
            debug!("reference audio {} not applied by piper", wav.display());
        }

        let iter: PiperSpeechStreamParallel = self
            .synth
            .synthesize_parallel(request.text.clone(), None)
            .map_err(|e| anyhow::anyhow!("piper synth error: {e}"))?;

        let mut samples: Vec<f32> = Vec::new();
        for part in iter {
            samples.extend(
                part.map_err(|e| anyhow::anyhow!("chunk error: {e}"))?
                    .into_vec(),
            );
        }

        Ok(Waveform {
            samples,
            sample_rate: self.sample_rate,
        })
    }
}
