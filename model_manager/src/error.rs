use std::path::PathBuf;

/// Errors raised while consulting the catalog or fetching a bundle.
#[derive(Debug, thiserror::Error)]
pub enum ManagerError {
    #[error("model name '{0}' must look like <type>/<language>/<dataset>/<model>")]
    MalformedName(String),

    #[error("model '{0}' is not in the catalog. Use --list_models to see what is available.")]
    UnknownModel(String),

    #[error("model '{name}' has no {field} in the catalog")]
    MissingUrl { name: String, field: &'static str },

    #[error("failed to read catalog {path}: {source}")]
    CatalogIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog {path} is not valid: {source}")]
    CatalogParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("download of {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("cache I/O error at {path}: {source}")]
    CacheIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type ManagerResult<T> = Result<T, ManagerError>;
