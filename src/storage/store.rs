use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Ledger;

use super::FORMAT_VERSION;

/// On-disk envelope around the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerFile {
    pub version: u32,
    pub saved_at: DateTime<Utc>,
    pub ledger: Ledger,
}

/// Flat-file persistence: the whole ledger is read on load and the whole
/// file is rewritten on save.
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn exists(&self) -> Result<bool> {
        tokio::fs::try_exists(&self.path)
            .await
            .with_context(|| format!("Failed to access {}", self.path.display()))
    }

    /// Write a fresh ledger file. Refuses to overwrite an existing one.
    pub async fn create(&self, ledger: &Ledger) -> Result<()> {
        if self.exists().await? {
            anyhow::bail!("Ledger file already exists: {}", self.path.display());
        }
        self.save(ledger).await
    }

    /// Read and parse the whole ledger file.
    pub async fn load(&self) -> Result<Ledger> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read ledger file {}", self.path.display()))?;
        let file: LedgerFile = serde_json::from_str(&raw)
            .with_context(|| format!("Corrupt ledger file {}", self.path.display()))?;

        if file.version > FORMAT_VERSION {
            anyhow::bail!(
                "Ledger file {} uses format version {}, this build understands up to {}",
                self.path.display(),
                file.version,
                FORMAT_VERSION
            );
        }

        tracing::debug!(
            path = %self.path.display(),
            version = file.version,
            saved_at = %file.saved_at,
            "Loaded ledger"
        );
        Ok(file.ledger)
    }

    /// Overwrite the ledger file with the given state.
    pub async fn save(&self, ledger: &Ledger) -> Result<()> {
        let file = LedgerFile {
            version: FORMAT_VERSION,
            saved_at: Utc::now(),
            ledger: ledger.clone(),
        };
        let json = serde_json::to_string_pretty(&file).context("Failed to serialize ledger")?;

        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("Failed to write ledger file {}", self.path.display()))?;

        tracing::debug!(path = %self.path.display(), "Saved ledger");
        Ok(())
    }
}
