use std::{path::PathBuf, sync::Arc, time::Instant};

use crate::cli::Args;
use crate::resolve::ResolvedModel;
use crate::service::TtsService;

/// Startup configuration, immutable once the server is running.
#[derive(Debug, Clone)]
pub struct Settings {
    pub args: Args,
    pub resolved: ResolvedModel,
}

impl Settings {
    /// Model config shown on `/details`: an existing `--config_path` file, else
    /// the resolved config when the model came from a name.
    pub fn model_config_path(&self) -> Option<PathBuf> {
        if let Some(p) = &self.args.config_path {
            if p.is_file() {
                return Some(p.clone());
            }
        }
        self.args
            .model_name
            .as_ref()
            .map(|_| self.resolved.engine_spec(false).effective_config_path())
    }

    /// Vocoder config shown on `/details`, if there is one.
    pub fn vocoder_config_path(&self) -> Option<PathBuf> {
        if let Some(p) = &self.args.vocoder_config_path {
            if p.is_file() {
                return Some(p.clone());
            }
        }
        self.resolved
            .vocoder_name
            .as_ref()
            .and(self.resolved.vocoder_config_path.clone())
    }
}

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<TtsService>,
    pub settings: Arc<Settings>,
    pub started: Instant,
}

impl AppState {
    pub fn new(service: TtsService, settings: Settings) -> Self {
        Self {
            service: Arc::new(service),
            settings: Arc::new(settings),
            started: Instant::now(),
        }
    }
}
