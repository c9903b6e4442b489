//! What a loaded model can do, read once when the engine is built.

use std::{collections::BTreeMap, fs, path::Path};

use anyhow::Context;
use serde::Serialize;
use serde_json::Value;

use crate::config;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelCapabilities {
    pub sample_rate: u32,
    /// Speaker name -> id, from a speakers file or the model config
    pub speaker_ids: Option<BTreeMap<String, i64>>,
    /// Language name -> id
    pub language_ids: Option<BTreeMap<String, i64>>,
    pub multi_speaker: bool,
    pub multi_language: bool,
    /// Global style tokens: the model accepts a style wav
    pub use_gst: bool,
    /// Language code declared by the model (`language.code`)
    pub language: Option<String>,
}

impl ModelCapabilities {
    /// Derive capabilities from a model config tree and an optional speakers file.
    pub fn from_config(cfg: &Value, speakers_file: Option<&Path>) -> anyhow::Result<Self> {
        let sample_rate = config::sample_rate(cfg)?;

        let speaker_ids = match speakers_file {
            Some(path) => Some(read_id_map_file(path)?),
            None => id_map(cfg.get("speaker_id_map")),
        };
        let language_ids = id_map(cfg.get("language_id_map"));

        let num_speakers = cfg.get("num_speakers").and_then(|v| v.as_i64());
        let num_languages = cfg.get("num_languages").and_then(|v| v.as_i64());

        let multi_speaker = num_speakers
            .is_some_and(|n| n > 1 || speakers_file.is_some())
            || speaker_ids.is_some();
        let multi_language = num_languages.is_some_and(|n| n > 1) || language_ids.is_some();

        let use_gst = cfg.get("use_gst").and_then(|v| v.as_bool()).unwrap_or(false);
        let language = cfg
            .get("language")
            .and_then(|l| l.get("code"))
            .and_then(|c| c.as_str())
            .map(|s| s.to_string());

        Ok(Self {
            sample_rate,
            speaker_ids,
            language_ids,
            multi_speaker,
            multi_language,
            use_gst,
            language,
        })
    }
}

fn id_map(value: Option<&Value>) -> Option<BTreeMap<String, i64>> {
    let obj = value?.as_object()?;
    let map: BTreeMap<String, i64> = obj
        .iter()
        .filter_map(|(name, id)| id.as_i64().map(|id| (name.clone(), id)))
        .collect();
    if map.is_empty() {
        None
    } else {
        Some(map)
    }
}

fn read_id_map_file(path: &Path) -> anyhow::Result<BTreeMap<String, i64>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read speakers file: {}", path.display()))?;
    let map: BTreeMap<String, i64> = serde_json::from_str(&text)
        .with_context(|| format!("{} must map speaker names to integer ids", path.display()))?;
    Ok(map)
}
