mod wav;
mod style;
mod piper;
pub mod config;
pub mod capabilities;

use std::path::PathBuf;

pub use capabilities::ModelCapabilities;
pub use piper::{EngineSpec, PiperEngine};
pub use style::find_default_style_wav;
pub use wav::encode_wav;

/// One synthesis call against the shared engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SynthesisRequest {
    pub text: String,
    pub speaker: Option<String>,
    pub language: Option<String>,
    pub style_wav: Option<PathBuf>,
    /// Sample waveform used to condition the voice (speaker_wav).
    pub reference_wav: Option<PathBuf>,
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// Mono PCM samples in [-1.0, 1.0]
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// The synthesis engine behind the HTTP surface.
///
/// Implementations are not required to be `Sync`: the server owns exactly one
/// engine and serializes every call through a single lock.
pub trait SpeechEngine: Send {
    /// Synthesize `request.text` into a waveform.
    fn synthesize(&mut self, request: &SynthesisRequest) -> anyhow::Result<Waveform>;

    /// Serialize a waveform into a WAV container.
    fn serialize(&self, waveform: &Waveform) -> anyhow::Result<Vec<u8>> {
        encode_wav(&waveform.samples, waveform.sample_rate)
    }
}
