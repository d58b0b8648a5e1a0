//! Byte sources for table data.
//!
//! A table is read either from an embedded resource (a `'static` blob
//! registered by name, typically produced with `include_bytes!`) or from a
//! file on disk, which is memory mapped or read in full. Every "not found"
//! condition resolves to an empty buffer rather than an error; the reader
//! decides what an empty table means.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::hash::{Hash, Hasher};
use std::io::Read;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use memmap2::Mmap;
use parking_lot::RwLock;
use tracing::debug;

use crate::util::{Error, Result};

/// Environment variable that disables memory mapping when set to `1`.
pub const NO_MMAP_ENV: &str = "CALTABLE_NO_MMAP";

// ============================================================================
// Source identity
// ============================================================================

/// Where a table comes from.
///
/// Names compare case-insensitively, so `Culture.NLP` and `culture.nlp`
/// denote the same source as long as the origin matches.
#[derive(Debug, Clone)]
pub enum TableSource {
    /// Named blob in the embedded resource registry.
    Embedded(String),
    /// File on disk.
    File(PathBuf),
}

impl TableSource {
    /// Build a source from a logical name and an origin flag.
    pub fn new(name: impl Into<String>, embedded: bool) -> Self {
        let name = name.into();
        if embedded {
            Self::Embedded(name)
        } else {
            Self::File(PathBuf::from(name))
        }
    }

    pub fn embedded(name: impl Into<String>) -> Self {
        Self::Embedded(name.into())
    }

    pub fn file(path: impl AsRef<Path>) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }

    /// Logical name (resource name or path).
    pub fn name(&self) -> Cow<'_, str> {
        match self {
            Self::Embedded(name) => Cow::Borrowed(name),
            Self::File(path) => path.to_string_lossy(),
        }
    }

    #[inline]
    pub fn is_embedded(&self) -> bool {
        matches!(self, Self::Embedded(_))
    }
}

impl PartialEq for TableSource {
    fn eq(&self, other: &Self) -> bool {
        self.is_embedded() == other.is_embedded()
            && self.name().to_lowercase() == other.name().to_lowercase()
    }
}

impl Eq for TableSource {}

impl Hash for TableSource {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.is_embedded().hash(state);
        self.name().to_lowercase().hash(state);
    }
}

impl fmt::Display for TableSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Embedded(name) => write!(f, "resource:{}", name),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

// ============================================================================
// Load options
// ============================================================================

/// Options controlling how file sources are read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Memory-map files instead of reading them into memory.
    /// Ignored when the `mmap` feature is disabled.
    pub use_mmap: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self { use_mmap: cfg!(feature = "mmap") }
    }
}

impl LoadOptions {
    /// Defaults, adjusted by `CALTABLE_NO_MMAP`.
    pub fn from_env() -> Self {
        let mut opts = Self::default();
        if std::env::var(NO_MMAP_ENV).ok().as_deref() == Some("1") {
            opts.use_mmap = false;
        }
        opts
    }

    /// Read files fully into memory.
    pub fn buffered() -> Self {
        Self { use_mmap: false }
    }
}

// ============================================================================
// Embedded resources
// ============================================================================

fn registry() -> &'static RwLock<HashMap<String, &'static [u8]>> {
    static REGISTRY: OnceLock<RwLock<HashMap<String, &'static [u8]>>> = OnceLock::new();
    REGISTRY.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Register an embedded resource blob, returning any blob it replaces.
pub fn register_resource(name: &str, bytes: &'static [u8]) -> Option<&'static [u8]> {
    debug!(name, size = bytes.len(), "registering table resource");
    registry().write().insert(name.to_lowercase(), bytes)
}

/// Look up an embedded resource by name (case-insensitive).
pub fn resource_bytes(name: &str) -> Option<&'static [u8]> {
    registry().read().get(&name.to_lowercase()).copied()
}

/// Table compiled in at build time through `CALTABLE_EMBED_TABLE`, if any.
pub fn builtin_table() -> Option<&'static [u8]> {
    #[cfg(caltable_embedded)]
    {
        let bytes: &'static [u8] = include_bytes!(env!("CALTABLE_EMBED_PATH"));
        Some(bytes)
    }
    #[cfg(not(caltable_embedded))]
    {
        None
    }
}

// ============================================================================
// Loaded bytes
// ============================================================================

/// The bytes of a loaded table, owned for the reader's lifetime.
pub enum TableBytes {
    /// Nothing was found.
    Empty,
    /// Embedded resource blob.
    Static(&'static [u8]),
    /// File or in-memory buffer read into memory.
    Owned(Vec<u8>),
    /// Memory-mapped file, unmapped on drop.
    Mapped(Mmap),
}

impl TableBytes {
    /// Resolve a source to its bytes. Missing sources give [`TableBytes::Empty`].
    pub fn resolve(source: &TableSource, opts: &LoadOptions) -> Result<Self> {
        match source {
            TableSource::Embedded(name) => Ok(match resource_bytes(name) {
                Some(bytes) if !bytes.is_empty() => Self::Static(bytes),
                _ => {
                    debug!(name = %name, "embedded table resource not found");
                    Self::Empty
                }
            }),
            TableSource::File(path) => Self::read_file(path, opts),
        }
    }

    fn read_file(path: &Path, opts: &LoadOptions) -> Result<Self> {
        let mut file = match File::open(path) {
            Ok(file) => file,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "table file not readable");
                return Ok(Self::Empty);
            }
        };

        let size = match file.metadata() {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "table file metadata unavailable");
                return Ok(Self::Empty);
            }
        };
        if size == 0 {
            return Ok(Self::Empty);
        }

        if opts.use_mmap && cfg!(feature = "mmap") {
            // Safety: mapped read-only; the table data is never written through the map
            let mmap = unsafe { Mmap::map(&file) }.map_err(|e| Error::MmapFailed(e.to_string()))?;
            Ok(Self::Mapped(mmap))
        } else {
            let mut buf = Vec::with_capacity(size as usize);
            if let Err(e) = file.read_to_end(&mut buf) {
                debug!(path = %path.display(), error = %e, "table file read failed");
                return Ok(Self::Empty);
            }
            Ok(Self::Owned(buf))
        }
    }

    #[inline]
    pub fn is_mapped(&self) -> bool {
        matches!(self, Self::Mapped(_))
    }
}

impl Deref for TableBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Self::Empty => &[],
            Self::Static(bytes) => *bytes,
            Self::Owned(buf) => buf.as_slice(),
            Self::Mapped(mmap) => &mmap[..],
        }
    }
}

impl fmt::Debug for TableBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Empty => "Empty",
            Self::Static(_) => "Static",
            Self::Owned(_) => "Owned",
            Self::Mapped(_) => "Mapped",
        };
        write!(f, "TableBytes::{}({} bytes)", kind, self.len())
    }
}
