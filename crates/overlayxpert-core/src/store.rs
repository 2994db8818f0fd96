//! Persistence of the overlay list.
//!
//! The whole collection is rewritten on every mutation; there is no
//! incremental format.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::{Error, overlay::OverlayRecord};

pub const STORE_FILE_NAME: &str = "overlays.json";

pub trait OverlayStore {
    /// Read every record. Records come back normalized.
    fn load(&self) -> Result<Vec<OverlayRecord>, Error>;

    fn save(&self, records: &[OverlayRecord]) -> Result<(), Error>;
}

/// `overlays.json` on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store in the platform data directory (e.g. `%APPDATA%\overlayxpert`).
    pub fn with_default_path() -> Option<Self> {
        default_store_path().map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub fn default_store_path() -> Option<PathBuf> {
    dirs::data_dir().map(|d| d.join("overlayxpert").join(STORE_FILE_NAME))
}

impl OverlayStore for JsonFileStore {
    fn load(&self) -> Result<Vec<OverlayRecord>, Error> {
        let content = fs::read_to_string(&self.path)?;
        decode(&content)
    }

    fn save(&self, records: &[OverlayRecord]) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        atomic_write(&self.path, &encode(records)?)
    }
}

/// Serialize with four-space indentation.
pub fn encode(records: &[OverlayRecord]) -> Result<Vec<u8>, Error> {
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    records.serialize(&mut serializer)?;
    Ok(out)
}

pub fn decode(content: &str) -> Result<Vec<OverlayRecord>, Error> {
    let records: Vec<OverlayRecord> = serde_json::from_str(content)?;
    Ok(records.into_iter().map(OverlayRecord::normalized).collect())
}

/// Write to a temp file next to `path`, then rename over it so a crash never
/// leaves half a file behind.
fn atomic_write(path: &Path, data: &[u8]) -> Result<(), Error> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(data)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Store kept in memory. Clones share the same contents, so a caller can
/// hand one clone to a collection and inspect writes through another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryStoreInner>>,
}

#[derive(Debug, Default)]
struct MemoryStoreInner {
    records: Option<Vec<OverlayRecord>>,
    saves: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: Vec<OverlayRecord>) -> Self {
        let store = Self::new();
        if let Ok(mut inner) = store.inner.lock() {
            inner.records = Some(records);
        }
        store
    }

    /// Last saved contents, `None` if nothing was ever stored.
    pub fn records(&self) -> Option<Vec<OverlayRecord>> {
        self.inner.lock().ok().and_then(|i| i.records.clone())
    }

    pub fn save_count(&self) -> usize {
        self.inner.lock().map(|i| i.saves).unwrap_or(0)
    }
}

impl OverlayStore for MemoryStore {
    fn load(&self) -> Result<Vec<OverlayRecord>, Error> {
        let inner = self
            .inner
            .lock()
            .map_err(|e| Error::IoError(std::io::Error::other(e.to_string())))?;
        inner
            .records
            .clone()
            .map(|records| records.into_iter().map(OverlayRecord::normalized).collect())
            .ok_or_else(|| {
                Error::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "no overlays stored",
                ))
            })
    }

    fn save(&self, records: &[OverlayRecord]) -> Result<(), Error> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|e| Error::IoError(std::io::Error::other(e.to_string())))?;
        inner.records = Some(records.to_vec());
        inner.saves += 1;
        Ok(())
    }
}
