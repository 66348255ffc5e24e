use crate::metadata::TrialMetadata;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Deterministic per-trial output location:
/// `<data_root>/person-<participant>/Experiment-<trial>/`.
///
/// The directory names are a persisted contract; analysis tooling walks
/// this exact layout.
pub fn output_path(data_root: &Path, meta: &TrialMetadata) -> PathBuf {
    data_root
        .join(format!("person-{}", meta.participant()))
        .join(format!("Experiment-{}", meta.trial()))
}

/// Realizes `output_path` on disk, creating each of the three levels if
/// absent. Idempotent: an existing directory is left exactly as it is,
/// content included.
pub fn ensure_output_dir(data_root: &Path, meta: &TrialMetadata) -> io::Result<PathBuf> {
    let dir = output_path(data_root, meta);
    fs::create_dir_all(&dir)?;
    Ok(dir)
}
