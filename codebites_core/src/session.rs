use crate::Error;
use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};
use tracing::{debug, trace};

/// Every store keeps the credential under this name.
pub const TOKEN_KEY: &str = "token";

type Entries = BTreeMap<String, String>;

/// Client-side persistence for the session credential.
///
/// There is a single session subject per client, so writes are
/// last-writer-wins and `clear` forgets everything the store holds.
pub trait TokenStore: Send + Sync {
    fn get(&self) -> Result<Option<String>, Error>;

    fn set(&self, token: &str) -> Result<(), Error>;

    fn clear(&self) -> Result<(), Error>;
}

#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: Mutex<Entries>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: &str) -> Self {
        let store = Self::new();
        store.entries().insert(TOKEN_KEY.to_owned(), token.to_owned());
        store
    }

    fn entries(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Result<Option<String>, Error> {
        Ok(self.entries().get(TOKEN_KEY).cloned())
    }

    fn set(&self, token: &str) -> Result<(), Error> {
        self.entries().insert(TOKEN_KEY.to_owned(), token.to_owned());
        Ok(())
    }

    fn clear(&self) -> Result<(), Error> {
        self.entries().clear();
        Ok(())
    }
}

/// A JSON object on disk, e.g. `{"token": "..."}`.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Entries, Error> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Entries::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, entries: &Entries) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string(entries)?)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Result<Option<String>, Error> {
        trace!("Reading token from {}", self.path.display());
        Ok(self.read()?.remove(TOKEN_KEY))
    }

    fn set(&self, token: &str) -> Result<(), Error> {
        let mut entries = self.read()?;
        entries.insert(TOKEN_KEY.to_owned(), token.to_owned());
        self.write(&entries)?;
        debug!("stored token in {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<(), Error> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
