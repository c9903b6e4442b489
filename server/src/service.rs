//! The one shared synthesizer and the lock that serializes access to it.

use std::{
    path::{Path, PathBuf},
    sync::Mutex,
    time::Instant,
};

use tracing::info;
use tts_core::{find_default_style_wav, ModelCapabilities, SpeechEngine, SynthesisRequest};

use crate::error::ApiError;
use crate::metrics::SynthesisMetrics;

/// Where the reference voice for a request comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceVoice {
    /// Use the first `.wav` found in the model directory, if any.
    ModelDir,
    /// Same, but log which file was picked (or that none was).
    ModelDirLogged,
}

pub struct TtsService {
    engine: Mutex<Box<dyn SpeechEngine>>,
    capabilities: ModelCapabilities,
    model_dir: PathBuf,
    metrics: SynthesisMetrics,
}

impl TtsService {
    pub fn new(
        engine: Box<dyn SpeechEngine>,
        capabilities: ModelCapabilities,
        model_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            engine: Mutex::new(engine),
            capabilities,
            model_dir: model_dir.into(),
            metrics: SynthesisMetrics::new(),
        }
    }

    pub fn capabilities(&self) -> &ModelCapabilities {
        &self.capabilities
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    pub fn metrics(&self) -> &SynthesisMetrics {
        &self.metrics
    }

    /// Synthesize `request` and return a WAV byte stream.
    pub fn synthesize_wav(
        &self,
        request: SynthesisRequest,
        reference: ReferenceVoice,
    ) -> Result<Vec<u8>, ApiError> {
        self.synthesize_wav_with(move || request, reference)
    }

    /// Build a request with `build` and synthesize it.
    ///
    /// Blocks until the engine lock is free. Building the request, reference-audio
    /// discovery, synthesis and serialization all happen while the lock is held.
    pub fn synthesize_wav_with<F>(
        &self,
        build: F,
        reference: ReferenceVoice,
    ) -> Result<Vec<u8>, ApiError>
    where
        F: FnOnce() -> SynthesisRequest,
    {
        let wait_start = Instant::now();
        let mut engine = self.engine.lock().map_err(|_| {
            ApiError::Internal(
                "synthesizer lock poisoned - a previous synthesis panicked".to_string(),
            )
        })?;
        let lock_wait_ms = wait_start.elapsed().as_millis() as u64;

        let mut request = build();

        let style = find_default_style_wav(&self.model_dir);
        if reference == ReferenceVoice::ModelDirLogged {
            match &style {
                Some(path) => info!("Using default style wav: {}", path.display()),
                None => info!("No default style wav found. Proceeding without it."),
            }
        }
        request.reference_wav = style;

        let start = Instant::now();
        let result = engine
            .synthesize(&request)
            .and_then(|waveform| engine.serialize(&waveform));
        drop(engine);
        let synth_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(bytes) => {
                self.metrics.record_synthesis(synth_ms, lock_wait_ms);
                info!("Synthesis finished in {}ms ({} bytes)", synth_ms, bytes.len());
                Ok(bytes)
            }
            Err(e) => {
                self.metrics.record_error();
                Err(ApiError::Synthesis(e))
            }
        }
    }
}
