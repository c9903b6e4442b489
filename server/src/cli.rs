//! Command-line flags.

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use serde::Serialize;

pub const DEFAULT_MODEL_NAME: &str = "tts_models/en_US/lessac/medium";

/// `true`, `1` and `yes` (any case) are true; everything else is false.
pub fn parse_bool(s: &str) -> Result<bool, String> {
    Ok(matches!(s.to_ascii_lowercase().as_str(), "true" | "1" | "yes"))
}

/// Serve a pretrained text-to-speech model over HTTP
#[derive(Parser, Debug, Clone, Serialize)]
#[command(name = "tts-server", version)]
pub struct Args {
    /// List available pre-trained tts and vocoder models.
    #[arg(
        long = "list_models",
        action = ArgAction::Set,
        value_parser = parse_bool,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true"
    )]
    pub list_models: bool,

    /// Name of one of the pre-trained tts models in format <type>/<language>/<dataset>/<model>
    #[arg(long = "model_name", default_value = DEFAULT_MODEL_NAME)]
    pub model_name: Option<String>,

    /// Name of one of the released vocoder models.
    #[arg(long = "vocoder_name")]
    pub vocoder_name: Option<String>,

    /// Path to model config file.
    #[arg(long = "config_path")]
    pub config_path: Option<PathBuf>,

    /// Path to model file.
    #[arg(long = "model_path")]
    pub model_path: Option<PathBuf>,

    /// Path to vocoder model file.
    #[arg(long = "vocoder_path")]
    pub vocoder_path: Option<PathBuf>,

    /// Path to vocoder model config file.
    #[arg(long = "vocoder_config_path")]
    pub vocoder_config_path: Option<PathBuf>,

    /// JSON file for multi-speaker model.
    #[arg(long = "speakers_file_path")]
    pub speakers_file_path: Option<PathBuf>,

    /// Port to listen on.
    #[arg(long, default_value_t = 5002)]
    pub port: u16,

    /// true to use CUDA.
    #[arg(long = "use_cuda", action = ArgAction::Set, value_parser = parse_bool, default_value = "false")]
    pub use_cuda: bool,

    /// true to enable debug logging.
    #[arg(long, action = ArgAction::Set, value_parser = parse_bool, default_value = "false")]
    pub debug: bool,

    /// Generate model detail page.
    #[arg(long = "show_details", action = ArgAction::Set, value_parser = parse_bool, default_value = "false")]
    pub show_details: bool,
}
