//! Model config files (piper `*.onnx.json` and friends).

use std::{fs, path::Path};

use anyhow::Context;
use serde_json::Value;

/// Load a JSON config file as an untyped tree.
pub fn load_config<P: AsRef<Path>>(path: P) -> anyhow::Result<Value> {
    let text = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
    let json: Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.as_ref().display()))?;
    if !json.is_object() {
        return Err(anyhow::anyhow!(
            "{} must contain a JSON object",
            path.as_ref().display()
        ));
    }
    Ok(json)
}

/// Read `audio.sample_rate` from a model config tree.
pub fn sample_rate(config: &Value) -> anyhow::Result<u32> {
    let sample_rate = config
        .get("audio")
        .and_then(|a| a.get("sample_rate"))
        .and_then(|sr| sr.as_u64())
        .ok_or_else(|| anyhow::anyhow!("Missing or invalid 'audio.sample_rate' in config"))?;
    Ok(sample_rate as u32)
}
