//! Key-value stores for save slots.
//!
//! A slot holds one JSON document. [`FileStore`] keeps each slot as a file in
//! a directory, optionally gzip-compressed; [`MemoryStore`] keeps them in a
//! map for tests and embedding.

use crate::error::{IoError, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

const PLAIN_SUFFIX: &str = ".json";
const GZIP_SUFFIX: &str = ".json.gz";

pub trait SaveStore {
    /// Stores `contents` under `slot`, replacing any previous document.
    fn write(&mut self, slot: &str, contents: &str) -> Result<()>;
    /// Returns the document stored under `slot`, if any.
    fn read(&self, slot: &str) -> Result<Option<String>>;
    /// Removes `slot`. Returns whether anything was removed.
    fn delete(&mut self, slot: &str) -> Result<bool>;
    /// Slot names in sorted order.
    fn list(&self) -> Result<Vec<String>>;
}

/// Slot names become file names, so only a conservative alphabet is allowed.
pub fn validate_slot(slot: &str) -> Result<()> {
    if slot.is_empty() || slot.len() > 64 {
        return Err(IoError::validation(format!(
            "slot name must be 1-64 characters, got {:?}",
            slot
        )));
    }
    if !slot
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(IoError::validation(format!(
            "slot name {:?} may only contain letters, digits, '-' and '_'",
            slot
        )));
    }
    Ok(())
}

/// Directory-backed store. Reads accept both plain and gzip files.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    compress: bool,
}

impl FileStore {
    /// Opens (and creates if needed) the save directory.
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|e| {
            IoError::FileSystem(e).with_context(format!("creating save directory {:?}", dir))
        })?;
        Ok(Self {
            dir,
            compress: false,
        })
    }

    /// Writes new saves gzip-compressed.
    #[must_use]
    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn plain_path(&self, slot: &str) -> PathBuf {
        self.dir.join(format!("{slot}{PLAIN_SUFFIX}"))
    }

    fn gzip_path(&self, slot: &str) -> PathBuf {
        self.dir.join(format!("{slot}{GZIP_SUFFIX}"))
    }

    fn encode_gzip(contents: &str) -> Result<Vec<u8>> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder
            .write_all(contents.as_bytes())
            .map_err(|e| IoError::compression(e.to_string()))?;
        encoder
            .finish()
            .map_err(|e| IoError::compression(e.to_string()))
    }

    fn decode_file(path: &Path) -> Result<String> {
        let file = File::open(path)?;
        let mut decoder = GzDecoder::new(file);
        let mut decoded = String::new();
        if decoder.read_to_string(&mut decoded).is_ok() {
            return Ok(decoded);
        }
        // Not actually compressed; fall back to plain text.
        Ok(std::fs::read_to_string(path)?)
    }

    /// Writes to a temporary file first so a failed write never clobbers
    /// the previous save.
    fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
        let tmp = path.with_extension("tmp");
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    fn remove_if_exists(path: &Path) -> Result<bool> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

impl SaveStore for FileStore {
    fn write(&mut self, slot: &str, contents: &str) -> Result<()> {
        validate_slot(slot)?;
        let (path, stale) = if self.compress {
            (self.gzip_path(slot), self.plain_path(slot))
        } else {
            (self.plain_path(slot), self.gzip_path(slot))
        };
        let bytes = if self.compress {
            Self::encode_gzip(contents)?
        } else {
            contents.as_bytes().to_vec()
        };
        Self::write_atomic(&path, &bytes)
            .map_err(|e| e.with_context(format!("writing slot {slot}")))?;
        Self::remove_if_exists(&stale)?;
        tracing::debug!(slot, path = %path.display(), bytes = bytes.len(), "save written");
        Ok(())
    }

    fn read(&self, slot: &str) -> Result<Option<String>> {
        validate_slot(slot)?;
        let gzip = self.gzip_path(slot);
        if gzip.exists() {
            return Self::decode_file(&gzip)
                .map(Some)
                .map_err(|e| e.with_context(format!("reading slot {slot}")));
        }
        let plain = self.plain_path(slot);
        if plain.exists() {
            return std::fs::read_to_string(&plain)
                .map(Some)
                .map_err(|e| IoError::FileSystem(e).with_context(format!("reading slot {slot}")));
        }
        Ok(None)
    }

    fn delete(&mut self, slot: &str) -> Result<bool> {
        validate_slot(slot)?;
        let plain = Self::remove_if_exists(&self.plain_path(slot))?;
        let gzip = Self::remove_if_exists(&self.gzip_path(slot))?;
        Ok(plain || gzip)
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut slots = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let name = entry?.file_name().to_string_lossy().into_owned();
            let slot = name
                .strip_suffix(GZIP_SUFFIX)
                .or_else(|| name.strip_suffix(PLAIN_SUFFIX));
            if let Some(slot) = slot {
                if validate_slot(slot).is_ok() {
                    slots.push(slot.to_string());
                }
            }
        }
        slots.sort();
        slots.dedup();
        Ok(slots)
    }
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: BTreeMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl SaveStore for MemoryStore {
    fn write(&mut self, slot: &str, contents: &str) -> Result<()> {
        validate_slot(slot)?;
        self.slots.insert(slot.to_string(), contents.to_string());
        Ok(())
    }

    fn read(&self, slot: &str) -> Result<Option<String>> {
        validate_slot(slot)?;
        Ok(self.slots.get(slot).cloned())
    }

    fn delete(&mut self, slot: &str) -> Result<bool> {
        validate_slot(slot)?;
        Ok(self.slots.remove(slot).is_some())
    }

    fn list(&self) -> Result<Vec<String>> {
        Ok(self.slots.keys().cloned().collect())
    }
}
