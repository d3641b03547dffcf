//! Disk Store Module
//!
//! File-per-entry disk store with a total payload size budget and
//! LRU eviction. Each entry is one JSON file; writes go through a
//! temp file and an atomic rename so a crash never leaves a
//! half-written entry behind.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::SystemTime;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::store::{Metadata, Store, StoreEntry, UsageLedger};

/// File name of the store format version marker.
const VERSION_FILE: &str = "store.version";

/// Suffix of entry files.
const ENTRY_SUFFIX: &str = ".entry";

// == Entry File ==
/// On-disk representation of a single entry.
#[derive(Debug, Serialize, Deserialize)]
struct EntryFile {
    key: String,
    payload: String,
    metadata: Metadata,
}

// == Disk Store ==
/// Size-bounded, LRU-evicting key-value store over a directory.
///
/// The budget covers cumulative payload bytes. Once it is exceeded,
/// least-recently-used entries are deleted until the store fits again.
/// Access order is tracked in memory and seeded from file modification
/// times when the store is reopened.
#[derive(Debug)]
pub struct DiskStore {
    /// Directory all entry files live in
    dir: PathBuf,
    /// Total payload byte budget
    size_budget: u64,
    /// Access-ordered byte accounting
    ledger: Mutex<UsageLedger>,
}

impl DiskStore {
    // == Open ==
    /// Opens or creates a store at `dir`.
    ///
    /// A version marker is kept next to the entries; opening with a
    /// different `version` discards everything and starts fresh.
    /// Surviving entries are enrolled in LRU order by file
    /// modification time.
    pub fn open(dir: &Path, version: u32, size_budget: u64) -> io::Result<Self> {
        fs::create_dir_all(dir)?;

        let version_path = dir.join(VERSION_FILE);
        let on_disk_version: Option<u32> = fs::read_to_string(&version_path)
            .ok()
            .and_then(|v| v.trim().parse().ok());

        if on_disk_version != Some(version) {
            if on_disk_version.is_some() {
                warn!(
                    expected = version,
                    found = ?on_disk_version,
                    "store version changed, discarding existing entries"
                );
            }
            remove_entry_files(dir)?;
            fs::write(&version_path, version.to_string())?;
        }

        let store = Self {
            dir: dir.to_path_buf(),
            size_budget,
            ledger: Mutex::new(UsageLedger::new()),
        };
        store.recover_ledger()?;
        Ok(store)
    }

    /// Scans the directory and rebuilds the ledger, oldest entries
    /// first so the most recently written end up at the MRU end.
    fn recover_ledger(&self) -> io::Result<()> {
        let mut found: Vec<(String, u64, SystemTime)> = Vec::new();

        for dir_entry in fs::read_dir(&self.dir)? {
            let path = dir_entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("entry") {
                continue;
            }
            match read_entry_file(&path) {
                Ok(entry) => {
                    let modified = fs::metadata(&path)?
                        .modified()
                        .unwrap_or(SystemTime::UNIX_EPOCH);
                    found.push((entry.key, entry.payload.len() as u64, modified));
                }
                Err(err) => {
                    // A torn or foreign file is unrecoverable, drop it
                    warn!(path = %path.display(), %err, "discarding unreadable entry file");
                    fs::remove_file(&path)?;
                }
            }
        }

        found.sort_by_key(|(_, _, modified)| *modified);

        let mut ledger = self.ledger.lock().expect("ledger lock poisoned");
        for (key, bytes, _) in found {
            ledger.record(&key, bytes);
        }
        Ok(())
    }

    /// Maps a key to its entry file path. Keys are arbitrary strings,
    /// so the file name is a url-safe base64 form of the key.
    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir
            .join(format!("{}{}", URL_SAFE_NO_PAD.encode(key), ENTRY_SUFFIX))
    }

    // == Introspection ==
    /// Current sum of stored payload bytes.
    pub fn total_payload_bytes(&self) -> u64 {
        self.ledger.lock().expect("ledger lock poisoned").total_bytes()
    }

    /// Current number of stored entries.
    pub fn entry_count(&self) -> usize {
        self.ledger.lock().expect("ledger lock poisoned").len()
    }

    /// Deletes LRU entries until the budget holds again. The entry
    /// just written is never evicted while it is the only one left.
    fn enforce_budget(&self, ledger: &mut UsageLedger) -> io::Result<()> {
        while ledger.total_bytes() > self.size_budget && ledger.len() > 1 {
            if let Some((victim, bytes)) = ledger.pop_lru() {
                remove_file_if_present(&self.entry_path(&victim))?;
                debug!(key = %victim, bytes, "evicted LRU entry over size budget");
            }
        }
        Ok(())
    }
}

impl Store for DiskStore {
    fn put(&self, key: &str, payload: String, metadata: Metadata) -> io::Result<()> {
        let entry = EntryFile {
            key: key.to_string(),
            payload,
            metadata,
        };
        let bytes = serde_json::to_vec(&entry)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?;

        let mut ledger = self.ledger.lock().expect("ledger lock poisoned");

        let path = self.entry_path(key);
        let temp = path.with_extension("tmp");
        fs::write(&temp, &bytes)?;
        fs::rename(&temp, &path)?;

        ledger.record(key, entry.payload.len() as u64);
        self.enforce_budget(&mut ledger)
    }

    fn get(&self, key: &str) -> io::Result<Option<StoreEntry>> {
        let mut ledger = self.ledger.lock().expect("ledger lock poisoned");

        let path = self.entry_path(key);
        let entry = match read_entry_file(&path) {
            Ok(entry) => entry,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                ledger.forget(key);
                return Ok(None);
            }
            Err(err) => return Err(err),
        };

        ledger.touch(key);
        Ok(Some(StoreEntry {
            payload: entry.payload,
            metadata: entry.metadata,
        }))
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        let mut ledger = self.ledger.lock().expect("ledger lock poisoned");
        remove_file_if_present(&self.entry_path(key))?;
        ledger.forget(key);
        Ok(())
    }

    fn contains(&self, key: &str) -> io::Result<bool> {
        let ledger = self.ledger.lock().expect("ledger lock poisoned");
        Ok(ledger.contains(key))
    }

    fn clear(&self) -> io::Result<()> {
        let mut ledger = self.ledger.lock().expect("ledger lock poisoned");
        remove_entry_files(&self.dir)?;
        ledger.clear();
        Ok(())
    }
}

/// Reads and parses one entry file.
fn read_entry_file(path: &Path) -> io::Result<EntryFile> {
    let bytes = fs::read(path)?;
    serde_json::from_slice(&bytes)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}

/// Removes a file, treating "already gone" as success.
fn remove_file_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

/// Removes every entry file under `dir`, leaving the version marker.
fn remove_entry_files(dir: &Path) -> io::Result<()> {
    for dir_entry in fs::read_dir(dir)? {
        let path = dir_entry?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("entry") {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}
