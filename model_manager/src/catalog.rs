//! The `.models.json` catalog: `{type: {language: {dataset: {model: item}}}}`.

use std::{collections::BTreeMap, fmt, fs, path::Path, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::{ManagerError, ManagerResult};

/// A catalog entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelItem {
    #[serde(default)]
    pub description: Option<String>,
    /// Full name of the vocoder to pair with this model, if any
    #[serde(default)]
    pub default_vocoder: Option<String>,
    #[serde(default)]
    pub model_url: Option<String>,
    #[serde(default)]
    pub config_url: Option<String>,
    #[serde(default)]
    pub license: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

/// `<type>/<language>/<dataset>/<model>`, e.g. `tts_models/en_US/lessac/medium`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelName {
    pub model_type: String,
    pub language: String,
    pub dataset: String,
    pub model: String,
}

impl ModelName {
    /// Directory name used in the download cache.
    pub fn cache_dir_name(&self) -> String {
        format!(
            "{}--{}--{}--{}",
            self.model_type, self.language, self.dataset, self.model
        )
    }
}

impl FromStr for ModelName {
    type Err = ManagerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        match parts.as_slice() {
            [t, l, d, m] if parts.iter().all(|p| !p.is_empty()) => Ok(Self {
                model_type: t.to_string(),
                language: l.to_string(),
                dataset: d.to_string(),
                model: m.to_string(),
            }),
            _ => Err(ManagerError::MalformedName(s.to_string())),
        }
    }
}

impl fmt::Display for ModelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}/{}",
            self.model_type, self.language, self.dataset, self.model
        )
    }
}

type Tree = BTreeMap<String, BTreeMap<String, BTreeMap<String, BTreeMap<String, ModelItem>>>>;

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tree: Tree,
}

impl Catalog {
    pub fn load<P: AsRef<Path>>(path: P) -> ManagerResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ManagerError::CatalogIo {
            path: path.to_path_buf(),
            source,
        })?;
        let tree: Tree = serde_json::from_str(&text).map_err(|source| ManagerError::CatalogParse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self { tree })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        Ok(Self {
            tree: serde_json::from_str(text)?,
        })
    }

    /// Every full model name, grouped by type then sorted.
    pub fn names(&self) -> Vec<String> {
        let mut out = Vec::new();
        for (model_type, langs) in &self.tree {
            for (lang, datasets) in langs {
                for (dataset, models) in datasets {
                    for model in models.keys() {
                        out.push(format!("{model_type}/{lang}/{dataset}/{model}"));
                    }
                }
            }
        }
        out
    }

    pub fn get(&self, name: &ModelName) -> Option<&ModelItem> {
        self.tree
            .get(&name.model_type)?
            .get(&name.language)?
            .get(&name.dataset)?
            .get(&name.model)
    }
}

#[cfg(test)]
pub(crate) const FIXTURE: &str = r#"{
    "tts_models": {
        "en_US": {
            "lessac": {
                "medium": {
                    "description": "US English, single speaker",
                    "model_url": "http://127.0.0.1:9/en_US-lessac-medium.onnx",
                    "config_url": "http://127.0.0.1:9/en_US-lessac-medium.onnx.json",
                    "default_vocoder": null,
                    "license": "MIT"
                }
            }
        },
        "de_DE": {
            "thorsten": {
                "medium": {
                    "model_url": "http://127.0.0.1:9/de_DE-thorsten-medium.onnx",
                    "config_url": "http://127.0.0.1:9/de_DE-thorsten-medium.onnx.json",
                    "default_vocoder": "vocoder_models/de_DE/thorsten/hifigan"
                }
            }
        }
    },
    "vocoder_models": {
        "de_DE": {
            "thorsten": {
                "hifigan": {
                    "model_url": "http://127.0.0.1:9/hifigan.onnx",
                    "config_url": "http://127.0.0.1:9/hifigan.onnx.json"
                }
            }
        }
    }
}"#;
