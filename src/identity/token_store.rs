use std::collections::HashMap;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use parking_lot::{Mutex, RwLock};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::domain::{BearerToken, Domain};
use crate::error::{AppError, AppResult};

/// Durable key/value persistence for bearer tokens, one slot per domain.
/// Each call is an atomic single-key operation; no expiry is enforced here.
pub trait TokenStore: Send + Sync {
    fn get(&self, domain: Domain) -> AppResult<Option<BearerToken>>;
    fn set(&self, domain: Domain, token: &BearerToken) -> AppResult<()>;
    fn clear(&self, domain: Domain) -> AppResult<()>;
}

/// Process-local store. Used by tests and throwaway runs.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slots: RwLock<HashMap<&'static str, BearerToken>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self { Self::default() }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self, domain: Domain) -> AppResult<Option<BearerToken>> {
        Ok(self.slots.read().get(domain.storage_key()).cloned())
    }

    fn set(&self, domain: Domain, token: &BearerToken) -> AppResult<()> {
        self.slots.write().insert(domain.storage_key(), token.clone());
        Ok(())
    }

    fn clear(&self, domain: Domain) -> AppResult<()> {
        self.slots.write().remove(domain.storage_key());
        Ok(())
    }
}

/// JSON file of the form `{"token": "...", "adminToken": "..."}`.
///
/// Writes go to a uniquely named, owner-only temp file in the same directory
/// which is then renamed over the original.
/// A missing file holds no tokens; an unreadable one is treated the same way.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    fn load(&self) -> AppResult<HashMap<String, String>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(t) => t,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(AppError::storage("token_read".to_string(), format!("{}: {}", self.path.display(), e))),
        };
        if text.trim().is_empty() {
            return Ok(HashMap::new());
        }
        match serde_json::from_str::<HashMap<String, String>>(&text) {
            Ok(m) => Ok(m),
            Err(e) => {
                warn!(target: "recipebox::store", "ignoring unreadable token file {}: {}", self.path.display(), e);
                Ok(HashMap::new())
            }
        }
    }

    fn save(&self, map: &HashMap<String, String>) -> AppResult<()> {
        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;
        let body = serde_json::to_vec_pretty(map)
            .map_err(|e| AppError::internal("token_encode".to_string(), e.to_string()))?;
        // Unique owner-only (0600 on unix) temp file in the same directory, renamed into place.
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&body)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| AppError::from(e.error))?;
        Ok(())
    }

    fn update<F: FnOnce(&mut HashMap<String, String>)>(&self, f: F) -> AppResult<()> {
        let _guard = self.lock.lock();
        let mut map = self.load()?;
        f(&mut map);
        self.save(&map)
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self, domain: Domain) -> AppResult<Option<BearerToken>> {
        let _guard = self.lock.lock();
        let map = self.load()?;
        Ok(map
            .get(domain.storage_key())
            .filter(|s| !s.trim().is_empty())
            .map(|s| BearerToken::new(s.clone())))
    }

    fn set(&self, domain: Domain, token: &BearerToken) -> AppResult<()> {
        self.update(|m| { m.insert(domain.storage_key().to_string(), token.as_str().to_string()); })?;
        debug!(target: "recipebox::store", "stored {} token in {}", domain, self.path.display());
        Ok(())
    }

    fn clear(&self, domain: Domain) -> AppResult<()> {
        let _guard = self.lock.lock();
        let mut map = self.load()?;
        if map.remove(domain.storage_key()).is_none() && !self.path.exists() {
            return Ok(());
        }
        self.save(&map)?;
        debug!(target: "recipebox::store", "cleared {} token", domain);
        Ok(())
    }
}
