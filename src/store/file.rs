use super::StorageBackend;
use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "careercraft";
const STATE_FILE: &str = "state.json";

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct StateFile {
    #[serde(default)]
    saved_at: Option<String>,
    #[serde(default)]
    entries: BTreeMap<String, String>,
}

/// JSON state file under the user's data directory.
pub struct FileBackend {
    path: PathBuf,
}

/// `<data dir>/careercraft`, or the override when one is given.
pub fn app_dir(override_dir: Option<&Path>) -> Result<PathBuf, StoreError> {
    match override_dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => dirs::data_dir()
            .map(|d| d.join(APP_DIR))
            .ok_or(StoreError::NoDataDir),
    }
}

impl FileBackend {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(STATE_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for FileBackend {
    fn load(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        let state: StateFile = serde_json::from_str(&raw)?;
        Ok(state.entries)
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let state = StateFile {
            saved_at: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .ok(),
            entries: entries.clone(),
        };
        let out = serde_json::to_string_pretty(&state)?;

        // Write-then-rename keeps the previous state intact if we die mid-write.
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, out)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
