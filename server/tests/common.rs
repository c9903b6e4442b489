//! Common utilities for integration tests

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::Router;
use clap::Parser;
use tts_core::{ModelCapabilities, SpeechEngine, SynthesisRequest, Waveform};
use tts_server::cli::Args;
use tts_server::resolve::ResolvedModel;
use tts_server::{create_router, AppState, Settings, TtsService};

/// What the fake engine observed
#[derive(Clone, Default)]
pub struct Recorder {
    pub active: Arc<AtomicUsize>,
    pub max_active: Arc<AtomicUsize>,
    pub requests: Arc<Mutex<Vec<SynthesisRequest>>>,
}

impl Recorder {
    pub fn requests(&self) -> Vec<SynthesisRequest> {
        self.requests.lock().unwrap().clone()
    }
}

/// Produces a short tone and tracks how many calls overlap.
pub struct InstrumentedEngine {
    recorder: Recorder,
    delay: Duration,
    fail: bool,
}

impl SpeechEngine for InstrumentedEngine {
    fn synthesize(&mut self, request: &SynthesisRequest) -> anyhow::Result<Waveform> {
        let now = self.recorder.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.recorder.max_active.fetch_max(now, Ordering::SeqCst);
        self.recorder.requests.lock().unwrap().push(request.clone());

        std::thread::sleep(self.delay);
        self.recorder.active.fetch_sub(1, Ordering::SeqCst);

        if self.fail {
            anyhow::bail!("synthesis failed for {:?}", request.text);
        }
        let samples = (0..1600).map(|i| (i as f32 * 0.05).sin() * 0.5).collect();
        Ok(Waveform { samples, sample_rate: 16_000 })
    }
}

pub struct TestApp {
    pub router: Router,
    pub recorder: Recorder,
    pub model_dir: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.model_dir);
    }
}

pub struct Options {
    pub delay: Duration,
    pub fail: bool,
    pub reference_wav: bool,
    pub show_details: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            delay: Duration::from_millis(0),
            fail: false,
            reference_wav: false,
            show_details: false,
        }
    }
}

/// Create a test app instance over a scratch model directory
pub fn create_test_app(opts: Options) -> TestApp {
    let model_dir = std::env::temp_dir().join(format!("tts_server_it_{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&model_dir).unwrap();

    let model_path = model_dir.join("model.onnx");
    let config_path = model_dir.join("model.onnx.json");
    std::fs::write(&model_path, b"not really onnx").unwrap();
    std::fs::write(
        &config_path,
        r#"{"audio": {"sample_rate": 16000}, "dataset": "lessac", "num_speakers": 1}"#,
    )
    .unwrap();
    if opts.reference_wav {
        std::fs::write(model_dir.join("reference.wav"), b"RIFF").unwrap();
    }

    let show_details = if opts.show_details { "true" } else { "false" };
    let args = Args::try_parse_from([
        "tts-server",
        "--model_path",
        model_path.to_str().unwrap(),
        "--config_path",
        config_path.to_str().unwrap(),
        "--show_details",
        show_details,
    ])
    .unwrap();

    let resolved = ResolvedModel {
        model_name: args.model_name.clone(),
        model_path: model_path.clone(),
        config_path: Some(config_path),
        ..Default::default()
    };

    let recorder = Recorder::default();
    let engine = InstrumentedEngine {
        recorder: recorder.clone(),
        delay: opts.delay,
        fail: opts.fail,
    };
    let capabilities = ModelCapabilities { sample_rate: 16_000, ..Default::default() };
    let service = TtsService::new(Box::new(engine), capabilities, &model_dir);
    let state = AppState::new(service, Settings { args, resolved });

    TestApp {
        router: create_router(state),
        recorder,
        model_dir,
    }
}
