//! Archive capability and the zip-backed DXT archive.
//!
//! Signing and verification only need to list entries, read their bytes and
//! replace a single entry, so they are written against the [`Archive`] trait.
//! [`DxtArchive`] is the in-memory implementation used by the CLI: it loads a
//! whole zip file, keeps entries in their physical order and writes a new
//! zip on [`DxtArchive::save`].

use std::borrow::Cow;
use std::fs::File;
use std::io::BufReader;
use std::io::Cursor;
use std::io::Read;
use std::io::Seek;
use std::io::Write;
use std::path::Path;

use zip::CompressionMethod;
use zip::ZipArchive;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::error::SigningError;

/// Read/replace access to the named entries of an archive.
pub trait Archive {
    /// All entries as `(name, bytes)` in the archive's native order.
    fn entries(&self) -> impl Iterator<Item = (&str, &[u8])>;

    /// Raw bytes of the entry called `name`.
    fn entry(&self, name: &str) -> Option<&[u8]>;

    /// Entry content decoded as UTF-8, invalid sequences replaced.
    fn entry_text(&self, name: &str) -> Option<Cow<'_, str>> {
        self.entry(name).map(String::from_utf8_lossy)
    }

    /// Add `name`, or overwrite it in place if it already exists.
    fn put_entry(&mut self, name: &str, bytes: Vec<u8>);
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ArchiveEntry {
    name: String,
    data: Vec<u8>,
}

impl ArchiveEntry {
    fn is_dir(&self) -> bool {
        self.name.ends_with('/')
    }
}

/// A DXT archive held fully in memory.
///
/// Entry order is insertion order, which for an archive read from disk is
/// the order of the zip central directory. Directory entries are kept as
/// empty entries whose name ends with `/`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DxtArchive {
    entries: Vec<ArchiveEntry>,
}

impl DxtArchive {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Archive::put_entry`].
    pub fn with_entry(mut self, name: &str, bytes: impl Into<Vec<u8>>) -> Self {
        self.put_entry(name, bytes.into());
        self
    }

    /// Remove an entry, returning its bytes if it existed.
    pub fn remove_entry(&mut self, name: &str) -> Option<Vec<u8>> {
        let index = self.entries.iter().position(|e| e.name == name)?;
        Some(self.entries.remove(index).data)
    }

    /// Entry names in archive order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Open a zip file from disk.
    pub fn open(path: &Path) -> Result<Self, SigningError> {
        let file = File::open(path)?;
        let archive = Self::read_from(BufReader::new(file))?;
        tracing::debug!(path = %path.display(), entries = archive.len(), "opened archive");
        Ok(archive)
    }

    /// Parse a zip container from any seekable reader.
    pub fn read_from<R: Read + Seek>(reader: R) -> Result<Self, SigningError> {
        let mut zip = ZipArchive::new(reader)?;
        let mut entries = Vec::with_capacity(zip.len());
        for index in 0..zip.len() {
            let mut file = zip.by_index(index)?;
            // The declared size is untrusted; let the buffer grow with the bytes actually read.
            let mut data = Vec::new();
            if !file.is_dir() {
                file.read_to_end(&mut data)?;
            }
            entries.push(ArchiveEntry {
                name: file.name().to_string(),
                data,
            });
        }
        Ok(Self { entries })
    }

    /// Parse a zip container held in memory.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SigningError> {
        Self::read_from(Cursor::new(bytes))
    }

    /// Serialize as a zip container into any seekable writer.
    pub fn write_to<W: Write + Seek>(&self, writer: W) -> Result<(), SigningError> {
        let mut zip = ZipWriter::new(writer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for entry in &self.entries {
            if entry.is_dir() {
                zip.add_directory(entry.name.as_str(), options)?;
            } else {
                zip.start_file(entry.name.as_str(), options)?;
                zip.write_all(&entry.data)?;
            }
        }
        zip.finish()?;
        Ok(())
    }

    /// Serialize as a zip container into a byte vector.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SigningError> {
        let mut cursor = Cursor::new(Vec::new());
        self.write_to(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Write the archive to `path`.
    ///
    /// The zip is written to a temporary file next to `path` and renamed into
    /// place, so a failure never leaves a truncated archive behind.
    pub fn save(&self, path: &Path) -> Result<(), SigningError> {
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        self.write_to(tmp.as_file_mut())?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| e.error)?;
        tracing::debug!(path = %path.display(), entries = self.len(), "saved archive");
        Ok(())
    }
}

impl Archive for DxtArchive {
    fn entries(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries.iter().map(|e| (e.name.as_str(), e.data.as_slice()))
    }

    fn entry(&self, name: &str) -> Option<&[u8]> {
        self.entries.iter().find(|e| e.name == name).map(|e| e.data.as_slice())
    }

    fn put_entry(&mut self, name: &str, bytes: Vec<u8>) {
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(existing) => existing.data = bytes,
            None => self.entries.push(ArchiveEntry {
                name: name.to_string(),
                data: bytes,
            }),
        }
    }
}
