//! Persisting floors and the session between runs.

use std::{fs, io, path::PathBuf};

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use util::{GameRng, HashMap};

use crate::Map;

const PREFIX: &str = "delve.";

fn floor_key(depth: i32) -> String {
    format!("{PREFIX}floor.{depth}")
}

fn session_key() -> String {
    format!("{PREFIX}session")
}

/// Saved state of one dungeon floor.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FloorState {
    pub map: Map,
}

/// Saved state that isn't tied to a floor.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SessionState {
    pub rng: GameRng,
    pub depth: i32,
    /// Thing id counter, so floors generated later don't reuse ids.
    #[serde(default)]
    pub next_id: u32,
}

/// Keyed blob storage for save games.
///
/// Implementors provide raw blob access, the typed load and save methods
/// build on it. A blob that fails to parse is reported and treated as if it
/// wasn't there.
pub trait SaveStore {
    fn read(&self, key: &str) -> Option<String>;

    fn write(&mut self, key: &str, blob: String) -> Result<()>;

    /// Remove every saved blob.
    fn clear_all(&mut self);

    fn load(&self, depth: i32) -> Option<FloorState> {
        parse(&floor_key(depth), self.read(&floor_key(depth))?)
    }

    fn save(&mut self, depth: i32, state: &FloorState) {
        store(self, &floor_key(depth), state);
    }

    fn load_session(&self) -> Option<SessionState> {
        parse(&session_key(), self.read(&session_key())?)
    }

    fn save_session(&mut self, state: &SessionState) {
        store(self, &session_key(), state);
    }
}

fn parse<T: DeserializeOwned>(key: &str, blob: String) -> Option<T> {
    match serde_json::from_str(&blob) {
        Ok(ret) => Some(ret),
        Err(e) => {
            log::warn!("Discarding corrupt save {key}: {e}");
            None
        }
    }
}

fn store<S: SaveStore + ?Sized>(
    store: &mut S,
    key: &str,
    value: &impl Serialize,
) {
    let blob = match serde_json::to_string(value) {
        Ok(blob) => blob,
        Err(e) => {
            log::error!("Failed to serialize {key}: {e}");
            return;
        }
    };
    if let Err(e) = store.write(key, blob) {
        log::error!("Failed to save {key}: {e:#}");
    }
}

/// Save store that keeps everything in memory.
#[derive(Clone, Default, Debug)]
pub struct MemoryStore {
    blobs: HashMap<String, String>,
}

impl MemoryStore {
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl SaveStore for MemoryStore {
    fn read(&self, key: &str) -> Option<String> {
        self.blobs.get(key).cloned()
    }

    fn write(&mut self, key: &str, blob: String) -> Result<()> {
        self.blobs.insert(key.to_owned(), blob);
        Ok(())
    }

    fn clear_all(&mut self) {
        self.blobs.clear();
    }
}

/// Save store writing one JSON file per key into a directory.
#[derive(Clone, Debug)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    /// Use the directory for saves, creating it if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).with_context(|| {
            format!("Can't create save directory {}", dir.display())
        })?;
        Ok(DirStore { dir })
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SaveStore for DirStore {
    fn read(&self, key: &str) -> Option<String> {
        match fs::read_to_string(self.path(key)) {
            Ok(blob) => Some(blob),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => {
                log::warn!("Can't read save {key}: {e}");
                None
            }
        }
    }

    fn write(&mut self, key: &str, blob: String) -> Result<()> {
        let path = self.path(key);
        fs::write(&path, blob)
            .with_context(|| format!("Can't write {}", path.display()))
    }

    fn clear_all(&mut self) {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return;
        };
        for entry in entries.flatten() {
            if entry.file_name().to_string_lossy().starts_with(PREFIX) {
                if let Err(e) = fs::remove_file(entry.path()) {
                    log::warn!(
                        "Can't remove {}: {e}",
                        entry.path().display()
                    );
                }
            }
        }
    }
}
