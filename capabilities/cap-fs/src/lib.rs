//! # cap-fs
//!
//! Sandboxed filesystem capability. Guest paths are relative and confined to
//! a sandbox root chosen by the embedding application; the wrapper is the
//! only road from guest code to the native filesystem.
//!
//! ## Availability
//!
//! Hard-unavailable at construction: the factory fails if the sandbox root
//! does not exist or is not a directory, so a host without a usable root
//! never exposes a broken `fs` global.
//!
//! ## Suspension and cancellation
//!
//! Every operation is asynchronous and may suspend the guest while native
//! I/O completes. Cancellation is dropping the future. Reads leave no side
//! effect when cancelled; `write_file` and `append_file` are best-effort on
//! cancellation and may leave a partially written file.
//!
//! ## Ordering
//!
//! Operations against one instance complete in issue order only when the
//! guest awaits them in sequence; concurrently issued operations on the same
//! path have no ordering guarantee.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use glyphgate_runtime::{
    CapabilityContract, CapabilityFactory, CapabilityModule, ModuleSpecifier, OpError, OpResult,
};
use std::any::Any;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Export surface of the filesystem capability.
pub static CONTRACT: CapabilityContract = CapabilityContract {
    name: "fs",
    operations: &[
        "read_file",
        "read_text_file",
        "write_file",
        "append_file",
        "list_dir",
        "stat",
        "exists",
    ],
};

/// Reserved specifier this capability is registered under.
pub fn specifier() -> ModuleSpecifier {
    ModuleSpecifier::reserved("caps", "fs")
}

/// Factory confining guest filesystem access to `root`.
///
/// Construction re-checks the root on every attempt, so a root created after
/// a failed bootstrap is picked up by a later retry.
pub fn factory(root: impl Into<PathBuf>) -> CapabilityFactory {
    let root = root.into();
    Box::new(move || {
        let capability = FsCapability::rooted(&root)?;
        Ok(Arc::new(capability) as Arc<dyn CapabilityModule>)
    })
}

/// Construction failures for the filesystem sandbox.
#[derive(Error, Debug)]
pub enum SandboxError {
    #[error("sandbox root '{0}' does not exist")]
    MissingRoot(PathBuf),

    #[error("sandbox root '{0}' is not a directory")]
    NotADirectory(PathBuf),
}

/// Metadata snapshot for one filesystem entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStat {
    pub is_file: bool,
    pub is_dir: bool,
    pub len: u64,
    pub modified: Option<DateTime<Utc>>,
}

/// Native filesystem operations the capability is built over.
///
/// The concrete syscalls live behind this seam; tests can substitute a
/// counting or failing store without touching a real disk.
#[async_trait]
pub trait FsBackend: Send + Sync {
    async fn read(&self, path: &Path) -> std::io::Result<Vec<u8>>;
    async fn write(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()>;
    async fn append(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()>;
    async fn list_dir(&self, path: &Path) -> std::io::Result<Vec<String>>;
    async fn metadata(&self, path: &Path) -> std::io::Result<std::fs::Metadata>;
}

/// Backend over `tokio::fs`.
pub struct TokioFs;

#[async_trait]
impl FsBackend for TokioFs {
    async fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }

    async fn write(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        tokio::fs::write(path, bytes).await
    }

    async fn append(&self, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        use tokio::io::AsyncWriteExt;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(bytes).await?;
        file.flush().await
    }

    async fn list_dir(&self, path: &Path) -> std::io::Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(path).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    async fn metadata(&self, path: &Path) -> std::io::Result<std::fs::Metadata> {
        tokio::fs::metadata(path).await
    }
}

/// Sandboxed filesystem access for guest code.
pub struct FsCapability {
    root: PathBuf,
    backend: Arc<dyn FsBackend>,
}

impl std::fmt::Debug for FsCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsCapability")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}

impl FsCapability {
    /// Create a capability confined to `root`, backed by `tokio::fs`.
    pub fn rooted(root: impl Into<PathBuf>) -> Result<Self, SandboxError> {
        Self::with_backend(root, Arc::new(TokioFs))
    }

    /// Create a capability over a custom backend.
    pub fn with_backend(
        root: impl Into<PathBuf>,
        backend: Arc<dyn FsBackend>,
    ) -> Result<Self, SandboxError> {
        let root = root.into();
        let meta = std::fs::metadata(&root)
            .map_err(|_| SandboxError::MissingRoot(root.clone()))?;
        if !meta.is_dir() {
            return Err(SandboxError::NotADirectory(root));
        }
        debug!(root = %root.display(), "filesystem sandbox opened");
        Ok(Self {
            root,
            backend,
        })
    }

    /// The sandbox root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Read a file's raw bytes.
    ///
    /// Errors: `NotFound`, `PermissionDenied`, `IsADirectory`, residual `Io`.
    pub async fn read_file(&self, path: &str) -> OpResult<Vec<u8>> {
        let full = self.confine(path)?;
        self.backend
            .read(&full)
            .await
            .map_err(|err| map_io(path, err))
    }

    /// Read a file as UTF-8 text.
    ///
    /// Errors: as `read_file`, plus `InvalidInput` for non-UTF-8 content.
    pub async fn read_text_file(&self, path: &str) -> OpResult<String> {
        let bytes = self.read_file(path).await?;
        String::from_utf8(bytes)
            .map_err(|err| OpError::InvalidInput(format!("file '{path}' is not valid UTF-8: {err}")))
    }

    /// Write a file, replacing any existing content.
    ///
    /// Errors: `NotFound` (missing parent), `PermissionDenied`,
    /// `IsADirectory`, residual `Io`. Best-effort on cancellation: a dropped
    /// write may leave a partially written file.
    pub async fn write_file(&self, path: &str, bytes: &[u8]) -> OpResult<()> {
        let full = self.confine(path)?;
        self.backend
            .write(&full, bytes)
            .await
            .map_err(|err| map_io(path, err))
    }

    /// Append to a file, creating it if absent.
    ///
    /// Errors and cancellation behavior as `write_file`.
    pub async fn append_file(&self, path: &str, bytes: &[u8]) -> OpResult<()> {
        let full = self.confine(path)?;
        self.backend
            .append(&full, bytes)
            .await
            .map_err(|err| map_io(path, err))
    }

    /// List the entry names of a directory, sorted.
    ///
    /// Errors: `NotFound`, `PermissionDenied`, residual `Io`.
    pub async fn list_dir(&self, path: &str) -> OpResult<Vec<String>> {
        let full = self.confine(path)?;
        self.backend
            .list_dir(&full)
            .await
            .map_err(|err| map_io(path, err))
    }

    /// Metadata for one entry.
    ///
    /// Errors: `NotFound`, `PermissionDenied`, residual `Io`.
    pub async fn stat(&self, path: &str) -> OpResult<FileStat> {
        let full = self.confine(path)?;
        let meta = self
            .backend
            .metadata(&full)
            .await
            .map_err(|err| map_io(path, err))?;
        Ok(FileStat {
            is_file: meta.is_file(),
            is_dir: meta.is_dir(),
            len: meta.len(),
            modified: meta.modified().ok().map(DateTime::<Utc>::from),
        })
    }

    /// Whether an entry exists. A missing entry is `false`, not an error;
    /// other failures propagate as in `stat`.
    pub async fn exists(&self, path: &str) -> OpResult<bool> {
        match self.stat(path).await {
            Ok(_) => Ok(true),
            Err(OpError::NotFound(_)) => Ok(false),
            Err(err) => Err(err),
        }
    }

    // Resolve a guest path inside the sandbox. Absolute paths and any
    // parent-directory traversal are rejected before touching the backend.
    fn confine(&self, raw: &str) -> OpResult<PathBuf> {
        let path = Path::new(raw);
        if path.is_absolute() {
            return Err(OpError::PermissionDenied(raw.to_string()));
        }
        for component in path.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => return Err(OpError::PermissionDenied(raw.to_string())),
            }
        }
        Ok(self.root.join(path))
    }
}

impl CapabilityModule for FsCapability {
    fn contract(&self) -> &'static CapabilityContract {
        &CONTRACT
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn map_io(path: &str, err: std::io::Error) -> OpError {
    match err.kind() {
        ErrorKind::NotFound => OpError::NotFound(path.to_string()),
        ErrorKind::PermissionDenied => OpError::PermissionDenied(path.to_string()),
        ErrorKind::IsADirectory => OpError::IsADirectory(path.to_string()),
        _ => OpError::Io(err),
    }
}
