use std::{
    fs::{self, File},
    io::{self, Read, Seek, SeekFrom},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::module::codec::{FormatError, Reader, Writer};
use crate::module::module::Module;

pub const PACKAGE_MAGIC: &[u8; 4] = b"MSPK";
pub const PACKAGE_FORMAT_VERSION: u16 = 1;

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("cannot access package {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} is not a package", .path.display())]
    BadMagic { path: PathBuf },
    #[error("package {} has unsupported format version {found}", .path.display())]
    UnsupportedVersion { path: PathBuf, found: u16 },
    #[error("malformed package {}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: FormatError,
    },
    #[error("module {index} of package {}: {source}", .path.display())]
    Module {
        path: PathBuf,
        index: usize,
        #[source]
        source: FormatError,
    },
}

#[derive(Debug)]
struct PackageInner {
    name: String,
    path: PathBuf,
    // Held open for the package's lifetime; closed when the last clone drops.
    file: Mutex<File>,
    fingerprint: [u8; 32],
    modules: Vec<Arc<Module>>,
}

impl Drop for PackageInner {
    fn drop(&mut self) {
        tracing::debug!(package = %self.name, path = %self.path.display(), "package released");
    }
}

/// A named, file-backed set of modules.
///
/// Cloning shares the package; the backing file stays open until the last
/// clone is dropped.
#[derive(Debug, Clone)]
pub struct Package {
    inner: Arc<PackageInner>,
}

pub fn hash_bytes(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    let result = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&result);
    out
}

fn encode_package(name: &str, modules: &[Module], path: &Path) -> Result<Vec<u8>, PackageError> {
    let malformed = |source| PackageError::Malformed {
        path: path.to_path_buf(),
        source,
    };
    let mut w = Writer::new();
    w.raw(PACKAGE_MAGIC);
    w.u16(PACKAGE_FORMAT_VERSION);
    w.string(name, "package name").map_err(malformed)?;
    w.len(modules.len(), "package modules").map_err(malformed)?;
    for (index, module) in modules.iter().enumerate() {
        let image = module.to_bytes().map_err(|source| PackageError::Module {
            path: path.to_path_buf(),
            index,
            source,
        })?;
        w.bytes(&image, "module image").map_err(malformed)?;
    }
    Ok(w.into_bytes())
}

fn decode_package(bytes: &[u8], path: &Path) -> Result<(String, Vec<Arc<Module>>), PackageError> {
    let malformed = |source| PackageError::Malformed {
        path: path.to_path_buf(),
        source,
    };
    let mut r = Reader::new(bytes);

    if r.take(PACKAGE_MAGIC.len(), "package magic").ok() != Some(PACKAGE_MAGIC.as_slice()) {
        return Err(PackageError::BadMagic {
            path: path.to_path_buf(),
        });
    }
    let version = r.u16("package version").map_err(malformed)?;
    if version != PACKAGE_FORMAT_VERSION {
        return Err(PackageError::UnsupportedVersion {
            path: path.to_path_buf(),
            found: version,
        });
    }

    let name = r.string("package name").map_err(malformed)?;
    let count = r.count("package modules", 4).map_err(malformed)?;
    let mut modules = Vec::with_capacity(count);
    for index in 0..count {
        let image = r.bytes("module image").map_err(malformed)?;
        let module = Module::from_bytes(&image).map_err(|source| PackageError::Module {
            path: path.to_path_buf(),
            index,
            source,
        })?;
        modules.push(Arc::new(module));
    }
    if r.remaining() != 0 {
        return Err(malformed(FormatError::TrailingBytes {
            count: r.remaining(),
        }));
    }
    Ok((name, modules))
}

impl Package {
    /// Opens a package file and decodes every module in it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PackageError> {
        let path = path.as_ref();
        let io_error = |source| PackageError::Io {
            path: path.to_path_buf(),
            source,
        };
        let mut file = File::open(path).map_err(io_error)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(io_error)?;

        let (name, modules) = decode_package(&bytes, path)?;
        tracing::debug!(
            package = %name,
            path = %path.display(),
            modules = modules.len(),
            "package opened"
        );
        Ok(Self {
            inner: Arc::new(PackageInner {
                name,
                path: path.to_path_buf(),
                file: Mutex::new(file),
                fingerprint: hash_bytes(&bytes),
                modules,
            }),
        })
    }

    /// Writes `modules` to `path` as a package named `name`.
    pub fn write(
        path: impl AsRef<Path>,
        name: &str,
        modules: &[Module],
    ) -> Result<(), PackageError> {
        let path = path.as_ref();
        let bytes = encode_package(name, modules, path)?;
        fs::write(path, bytes).map_err(|source| PackageError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes a package file and opens it.
    pub fn from_modules(
        name: &str,
        path: impl AsRef<Path>,
        modules: &[Module],
    ) -> Result<Self, PackageError> {
        let path = path.as_ref();
        Self::write(path, name, modules)?;
        Self::open(path)
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    pub fn modules(&self) -> &[Arc<Module>] {
        &self.inner.modules
    }

    pub fn module(&self, name: &str) -> Option<&Arc<Module>> {
        self.inner.modules.iter().find(|module| module.name() == name)
    }

    /// SHA-256 of the file contents at open time.
    pub fn fingerprint(&self) -> [u8; 32] {
        self.inner.fingerprint
    }

    /// True if the backing file no longer has the contents it was opened
    /// with.
    pub fn is_stale(&self) -> Result<bool, PackageError> {
        let io_error = |source| PackageError::Io {
            path: self.inner.path.clone(),
            source,
        };
        let mut file = self
            .inner
            .file
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        file.seek(SeekFrom::Start(0)).map_err(io_error)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(io_error)?;
        Ok(hash_bytes(&bytes) != self.inner.fingerprint)
    }

    /// Number of live handles to this package.
    pub fn reference_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}
