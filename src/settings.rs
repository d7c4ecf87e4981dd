//! Global settings persistence and invoice-number issuance.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::error::{InvoiceError, Result};

fn default_invoice_number() -> String {
    "000".to_string()
}

/// Application-wide settings persisted on disk: which config is the
/// default, where the per-client configs live, and the invoice counter.
#[derive(Serialize, Deserialize, Clone)]
#[serde(rename_all = "PascalCase", default)]
pub struct AppSettings {
    pub default_config: Option<String>,
    pub config_dir: Option<PathBuf>,
    #[serde(default = "default_invoice_number")]
    pub invoice_number: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_config: None,
            config_dir: None,
            invoice_number: default_invoice_number(),
        }
    }
}

/// Manages loading and saving of the settings file in the
/// platform-specific config directory.
pub struct SettingsManager {
    path: PathBuf,
}

impl SettingsManager {
    pub fn new() -> Self {
        let dirs = directories::ProjectDirs::from("dev", "invoicer", "clockify-invoicer")
            .expect("Could not determine config directory");
        let path = dirs.config_dir().join("settings.json");
        Self { path }
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Directory holding the per-client invoice configs: the configured
    /// one, or `configs/` next to the settings file.
    pub fn config_dir(&self, settings: &AppSettings) -> PathBuf {
        settings.config_dir.clone().unwrap_or_else(|| {
            self.path
                .parent()
                .map(|parent| parent.join("configs"))
                .unwrap_or_else(|| PathBuf::from("configs"))
        })
    }

    /// Loads settings from disk, falling back to defaults on read/parse
    /// errors.
    pub fn load(&self) -> AppSettings {
        if self.path.exists() {
            let content = fs::read_to_string(&self.path).unwrap_or_default();
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            AppSettings::default()
        }
    }

    /// Persists settings to disk, creating parent directories when needed.
    pub fn save(&self, settings: &AppSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content =
            serde_json::to_string_pretty(settings).map_err(|e| InvoiceError::Settings(e.to_string()))?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

/// Storage seam for the invoice counter so tests can substitute an
/// in-memory fake for the settings file.
pub trait CounterStore {
    fn read(&self) -> Result<Option<String>>;
    fn write(&self, value: &str) -> Result<()>;
}

impl CounterStore for SettingsManager {
    fn read(&self) -> Result<Option<String>> {
        if self.path.exists() {
            Ok(Some(self.load().invoice_number))
        } else {
            Ok(None)
        }
    }

    /// Read-modify-write of the whole settings file so sibling fields
    /// survive a counter bump.
    fn write(&self, value: &str) -> Result<()> {
        let mut settings = self.load();
        settings.invoice_number = value.to_string();
        self.save(&settings)
    }
}

/// Issues sequential zero-padded invoice numbers. The lock is
/// process-local only; batch runs are sequential so the settings file is
/// never written concurrently.
pub struct InvoiceNumbering<S: CounterStore> {
    store: S,
    lock: Mutex<()>,
}

impl<S: CounterStore> InvoiceNumbering<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    /// Increments and persists the counter, returning the new number.
    /// A missing or unparseable stored value counts as "000", so the first
    /// issued number is "001".
    pub fn next(&self) -> Result<String> {
        let _guard = self.lock.lock().expect("counter lock poisoned");
        let current = self.store.read()?.unwrap_or_default();
        let current: u32 = current.trim().parse().unwrap_or(0);
        let next = format!("{:03}", current + 1);
        self.store.write(&next)?;
        Ok(next)
    }
}
