//! On-disk store for synthesized audio artifacts.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::SpeechError;

const AUDIO_EXTENSION: &str = ".mp3";

/// Directory of `<uuid>.mp3` files.
#[derive(Debug, Clone)]
pub struct AudioStore {
    dir: PathBuf,
}

impl AudioStore {
    /// Open the store, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, SpeechError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        tracing::debug!(dir = %dir.display(), "Audio store ready");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist `bytes` under a fresh identifier and return it.
    pub async fn save(&self, bytes: &[u8]) -> Result<String, SpeechError> {
        let id = format!("{}{}", Uuid::new_v4(), AUDIO_EXTENSION);
        tokio::fs::write(self.dir.join(&id), bytes).await?;
        Ok(id)
    }

    /// Read a stored artifact. Malformed identifiers never touch the disk.
    pub async fn load(&self, id: &str) -> Result<Vec<u8>, SpeechError> {
        let path = self.path_for(id)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(SpeechError::NotFound(id.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Resolve an identifier to its file path after validating it.
    pub fn path_for(&self, id: &str) -> Result<PathBuf, SpeechError> {
        validate_id(id)?;
        Ok(self.dir.join(id))
    }
}

/// Accept only `<lowercase hyphenated uuid>.mp3`.
pub fn validate_id(id: &str) -> Result<(), SpeechError> {
    let invalid = || SpeechError::InvalidAudioId(id.to_string());
    let stem = id.strip_suffix(AUDIO_EXTENSION).ok_or_else(invalid)?;
    let uuid = Uuid::parse_str(stem).map_err(|_| invalid())?;
    if uuid.hyphenated().to_string() != stem {
        return Err(invalid());
    }
    Ok(())
}
