use std::{fs, path::{Path, PathBuf}};

/// Find a `.wav` file directly inside `model_dir` to use as reference audio.
///
/// Entries are sorted by file name so the pick is stable across platforms.
/// A missing or unreadable directory yields `None`.
pub fn find_default_style_wav<P: AsRef<Path>>(model_dir: P) -> Option<PathBuf> {
    let entries = match fs::read_dir(model_dir.as_ref()) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!("cannot list {}: {e}", model_dir.as_ref().display());
            return None;
        }
    };

    let mut wavs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "wav"))
        .collect();
    wavs.sort();
    wavs.into_iter().next()
}
