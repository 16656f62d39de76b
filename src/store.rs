//! Single-writer settings store
//!
//! The store owns the [`SettingsDocument`] behind a read/write lock. Lookups
//! share the read lock and never fail. Every mutation takes the write lock,
//! applies the matrix operation and saves the whole document before
//! releasing it, so no reader ever sees a half-propagated level and saves
//! happen in mutation order.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::config::GapMatrixConfig;
use crate::error::{Error, PersistError, Result};
use crate::gap::Gap;
use crate::matrix::Matrix;
use crate::settings::SettingsDocument;

/// Where the settings document is loaded from and saved to
pub trait SettingsBackend: Send + Sync {
    /// Load the stored document; `None` when nothing has been saved yet
    fn load(&self) -> std::result::Result<Option<SettingsDocument>, PersistError>;

    /// Persist the whole document
    fn save(&self, document: &SettingsDocument) -> std::result::Result<(), PersistError>;
}

/// Stores the document as pretty-printed JSON in a single file
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
    create_if_missing: bool,
}

impl JsonFileBackend {
    /// Back the store with the file at `path`, creating it on first save
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            create_if_missing: true,
        }
    }

    /// Build a backend from configuration
    pub fn from_config(config: &GapMatrixConfig) -> Self {
        Self {
            path: config.settings_path.clone(),
            create_if_missing: config.create_if_missing,
        }
    }

    /// Path of the settings file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SettingsBackend for JsonFileBackend {
    fn load(&self) -> std::result::Result<Option<SettingsDocument>, PersistError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                if self.create_if_missing {
                    return Ok(None);
                }
                return Err(PersistError::Missing(self.path.display().to_string()));
            }
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_slice(&data)?))
    }

    fn save(&self, document: &SettingsDocument) -> std::result::Result<(), PersistError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let data = serde_json::to_vec_pretty(document)?;
        let temp_path = self.temp_path();

        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let written = options.open(&temp_path).and_then(|mut file| {
            file.write_all(&data)?;
            file.sync_all()
        });
        if let Err(err) = written.and_then(|()| fs::rename(&temp_path, &self.path)) {
            if let Err(cleanup) = fs::remove_file(&temp_path) {
                debug!(path = %temp_path.display(), error = %cleanup, "temp file not removed");
            }
            return Err(err.into());
        }
        Ok(())
    }
}

/// Keeps the last saved document as JSON in memory
#[derive(Debug, Default)]
pub struct MemoryBackend {
    saved: Mutex<Option<String>>,
    fail_saves: AtomicBool,
}

impl MemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that already holds `document`
    pub fn with_document(document: &SettingsDocument) -> std::result::Result<Self, PersistError> {
        let backend = Self::new();
        *backend.saved.lock() = Some(serde_json::to_string(document)?);
        Ok(backend)
    }

    /// Make every following save fail (or succeed again)
    pub fn set_fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }
}

impl SettingsBackend for MemoryBackend {
    fn load(&self) -> std::result::Result<Option<SettingsDocument>, PersistError> {
        match self.saved.lock().as_deref() {
            Some(json) => Ok(Some(serde_json::from_str(json)?)),
            None => Ok(None),
        }
    }

    fn save(&self, document: &SettingsDocument) -> std::result::Result<(), PersistError> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(PersistError::Backend("save rejected".to_string()));
        }
        *self.saved.lock() = Some(serde_json::to_string(document)?);
        Ok(())
    }
}

/// Settings document with serialized, persisted mutations
pub struct SettingsStore<B: SettingsBackend> {
    document: RwLock<SettingsDocument>,
    backend: B,
}

impl SettingsStore<JsonFileBackend> {
    /// Open the JSON settings file named by `config`
    pub fn open_file(config: &GapMatrixConfig) -> Result<Self> {
        Self::open(JsonFileBackend::from_config(config), config.scopes.as_slice())
    }
}

impl<B: SettingsBackend> SettingsStore<B> {
    /// Load the document from `backend`, give every scope in `scopes` a
    /// default matrix if it has none, verify all matrices and save.
    pub fn open<S: AsRef<str>>(backend: B, scopes: &[S]) -> Result<Self> {
        let mut document = backend.load().map_err(Error::Load)?.unwrap_or_default();
        document.ensure_scopes(scopes);
        document.check()?;

        let store = Self {
            document: RwLock::new(document),
            backend,
        };
        store.save()?;
        info!(scopes = store.document.read().scopes.len(), "opened settings store");
        Ok(store)
    }

    /// The persistence backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Persist the current document. Use this to retry after a
    /// [`Error::Persistence`].
    pub fn save(&self) -> Result<()> {
        let mut document = self.document.write();
        self.persist(&mut document)
    }

    /// Names of all known scopes
    pub fn scopes(&self) -> Vec<String> {
        self.document.read().scopes.keys().cloned().collect()
    }

    /// Copy of the whole document
    pub fn document(&self) -> SettingsDocument {
        self.document.read().clone()
    }

    /// Copy of the reward matrix of `scope` (the default matrix if unknown)
    pub fn matrix(&self, scope: &str) -> Matrix {
        self.read_matrix(scope, Matrix::clone)
    }

    /// Reward for `count` at `level` in `scope`; see [`Matrix::reward`]
    pub fn reward(&self, scope: &str, level: usize, count: i64) -> i64 {
        self.read_matrix(scope, |matrix| matrix.reward(level, count))
    }

    /// Gap covering `count` at `level` in `scope`; see [`Matrix::lookup`]
    pub fn lookup(&self, scope: &str, level: usize, count: i64) -> Gap {
        self.read_matrix(scope, |matrix| *matrix.lookup(level, count))
    }

    /// Gap at `(level, index)` in `scope`; see [`Matrix::gap`]
    pub fn gap(&self, scope: &str, level: usize, index: usize) -> Gap {
        self.read_matrix(scope, |matrix| *matrix.gap(level, index))
    }

    /// Append a gap to `level`; see [`Matrix::add_gap`]
    pub fn add_gap(&self, scope: &str, level: usize) -> Result<Gap> {
        self.mutate(scope, "add_gap", |matrix| matrix.add_gap(level))
    }

    /// Overwrite a gap and propagate; see [`Matrix::update_gap`]
    pub fn update_gap(&self, scope: &str, gap: Gap) -> Result<Gap> {
        self.mutate(scope, "update_gap", |matrix| matrix.update_gap(gap))
    }

    /// Remove a gap; see [`Matrix::delete_gap`]
    pub fn delete_gap(&self, scope: &str, level: usize, index: usize) -> Result<Gap> {
        self.mutate(scope, "delete_gap", |matrix| matrix.delete_gap(level, index))
    }

    /// Shift a gap's amount; see [`Matrix::adjust_amount`]
    pub fn adjust_amount(&self, scope: &str, level: usize, index: usize, delta: i64) -> Result<Gap> {
        self.mutate(scope, "adjust_amount", |matrix| {
            matrix.adjust_amount(level, index, delta)
        })
    }

    /// Append a level; see [`Matrix::add_level`]
    pub fn add_level(&self, scope: &str) -> Result<Gap> {
        self.mutate(scope, "add_level", |matrix| Ok(matrix.add_level()))
    }

    /// Remove a level; see [`Matrix::delete_level`]
    pub fn delete_level(&self, scope: &str, level: usize) -> Result<Gap> {
        self.mutate(scope, "delete_level", |matrix| matrix.delete_level(level))
    }

    fn read_matrix<T>(&self, scope: &str, read: impl FnOnce(&Matrix) -> T) -> T {
        let document = self.document.read();
        match document.scope(scope) {
            Some(settings) => read(&settings.reward_matrix),
            None => {
                warn!(scope, "unknown scope, using the default matrix");
                read(&Matrix::default())
            }
        }
    }

    fn mutate<T>(
        &self,
        scope: &str,
        operation: &'static str,
        apply: impl FnOnce(&mut Matrix) -> Result<T>,
    ) -> Result<T> {
        let mut document = self.document.write();
        let value = match document.scopes.get_mut(scope) {
            Some(settings) => apply(&mut settings.reward_matrix)?,
            None => {
                let mut matrix = Matrix::default();
                let value = apply(&mut matrix)?;
                document.scope_mut(scope).reward_matrix = matrix;
                value
            }
        };
        debug!(scope, operation, "applied mutation");
        self.persist(&mut document)?;
        Ok(value)
    }

    fn persist(&self, document: &mut SettingsDocument) -> Result<()> {
        document.updated_at = Some(Utc::now());
        self.backend.save(document).map_err(|err| {
            warn!(error = %err, "failed to save settings");
            Error::Persistence(err)
        })?;
        debug!("saved settings");
        Ok(())
    }
}
