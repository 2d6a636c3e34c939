use super::types::{PersistedState, STATE_VERSION};
use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

/// Get the default state file path (~/.config/impact-rank/state.json)
pub fn get_state_path() -> Result<PathBuf> {
    Ok(crate::config::get_config_dir()?.join("state.json"))
}

/// Load the canonical weighting from a JSON file
///
/// Returns `None` if the file doesn't exist (nothing has been voted yet).
/// If the file exists but has an unsupported version or weights that do not
/// sum to 1.0, returns an error.
pub fn load_state(path: &Path) -> Result<Option<PersistedState>> {
    if !path.exists() {
        return Ok(None);
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open state file at {}", path.display()))?;

    let state: PersistedState = serde_json::from_reader(file)
        .with_context(|| format!("Failed to load weighting state from {}", path.display()))?;

    // Version check
    if state.version != STATE_VERSION {
        anyhow::bail!("Unsupported state file version: {}", state.version);
    }

    Ok(Some(state))
}

/// Save the canonical weighting to a JSON file atomically
///
/// The file is either the previous state or the new one, never a partial
/// write. Creates the parent directory if it doesn't exist.
pub fn save_state(path: &Path, state: &PersistedState) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create state directory at {}", parent.display()))?;
    }

    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, state).context("Failed to serialize state")?;

    file.commit().context("Failed to save weighting state")?;

    tracing::debug!(path = %path.display(), votes_folded = state.votes_folded, "saved state");
    Ok(())
}
