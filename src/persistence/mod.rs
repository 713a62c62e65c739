//! Level and playthrough files
//!
//! Features:
//! - Versioned JSON documents (`snakeshift` levels, `snakeshift-moves` playthroughs)
//! - Step-by-step upgrade of older level versions
//! - File load/save with path-annotated errors

pub mod level;
pub mod playthrough;

use std::path::Path;

pub use level::{LoadedLevel, deserialize_level, serialize_level, serialize_level_with_id};
pub use playthrough::{Playthrough, deserialize_playthrough, serialize_playthrough};

use crate::error::{FormatError, LoadError};

fn read(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn write(path: &Path, contents: &str) -> Result<(), LoadError> {
    std::fs::write(path, contents).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

fn format_error(path: &Path) -> impl FnOnce(FormatError) -> LoadError + '_ {
    move |source| LoadError::Format {
        path: path.display().to_string(),
        source,
    }
}

/// Load a level file; a level with no entities is refused
pub fn load_level(path: &Path) -> Result<LoadedLevel, LoadError> {
    let loaded = deserialize_level(&read(path)?).map_err(format_error(path))?;
    if loaded.level.entities.is_empty() {
        return Err(LoadError::Empty {
            path: path.display().to_string(),
        });
    }
    log::info!(
        "Loaded level {} ({}x{}, {} entities)",
        path.display(),
        loaded.level.width,
        loaded.level.height,
        loaded.level.entities.len()
    );
    Ok(loaded)
}

pub fn save_level(path: &Path, loaded: &LoadedLevel) -> Result<(), LoadError> {
    let json = serialize_level_with_id(&loaded.level, loaded.active_snake, loaded.level_id.as_deref())
        .map_err(format_error(path))?;
    write(path, &json)?;
    log::info!("Saved level to {}", path.display());
    Ok(())
}

pub fn load_playthrough(path: &Path) -> Result<Playthrough, LoadError> {
    let playthrough = deserialize_playthrough(&read(path)?).map_err(format_error(path))?;
    log::info!(
        "Loaded playthrough {} ({} moves)",
        path.display(),
        playthrough.moves.len()
    );
    Ok(playthrough)
}

pub fn save_playthrough(path: &Path, playthrough: &Playthrough) -> Result<(), LoadError> {
    let json = serialize_playthrough(playthrough).map_err(format_error(path))?;
    write(path, &json)?;
    log::info!("Saved playthrough to {}", path.display());
    Ok(())
}
