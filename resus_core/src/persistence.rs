//! Session persistence gateway.
//!
//! The engine emits best-effort saves of the full arrest document
//! after every mutating action; storage failures are logged and never
//! block the clinical workflow. The live document is written
//! atomically (temp file + rename) under an exclusive lock, and
//! archived episodes are appended to a JSONL file keyed independently
//! of the live document.

use crate::{
    AntiarrhythmicDrug, ArrestPhase, ChecklistItem, EventLog, PatientAgeCategory, Result, UiState,
};
use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Snapshot of a session as stored. Optional fields default on load so
/// partial or older documents hydrate into a fixed-shape session in
/// one place rather than at every read site.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ArrestDocument {
    pub start_time: Option<DateTime<Utc>>,
    pub total_duration: f64,
    pub final_outcome: String,
    #[serde(default)]
    pub events: EventLog,
    #[serde(default)]
    pub arrest_state: ArrestPhase,
    #[serde(default)]
    pub ui_state: UiState,
    #[serde(default)]
    pub elapsed_seconds: f64,
    #[serde(default)]
    pub time_offset: f64,
    #[serde(default)]
    pub cpr_countdown: Option<f64>,
    #[serde(default)]
    pub cpr_cycle_anchor: f64,
    #[serde(default)]
    pub shock_count: u32,
    #[serde(default)]
    pub adrenaline_count: u32,
    #[serde(default)]
    pub amiodarone_count: u32,
    #[serde(default)]
    pub lidocaine_count: u32,
    #[serde(default)]
    pub airway_placed: bool,
    #[serde(default)]
    pub antiarrhythmic_given: AntiarrhythmicDrug,
    #[serde(default)]
    pub last_adrenaline_time: Option<f64>,
    #[serde(default)]
    pub shock_count_at_first_amiodarone: Option<u32>,
    #[serde(default)]
    pub reversible_causes: Option<Vec<ChecklistItem>>,
    #[serde(default)]
    pub post_rosc_tasks: Option<Vec<ChecklistItem>>,
    #[serde(default)]
    pub post_mortem_tasks: Option<Vec<ChecklistItem>>,
    #[serde(default)]
    pub patient_age_category: Option<PatientAgeCategory>,
}

/// Storage backend consumed by the engine.
///
/// All methods are synchronous from the engine's point of view; any
/// slow transport belongs behind the implementation.
pub trait PersistenceGateway {
    /// Persist the current document, replacing the previous one.
    fn save(&self, doc: &ArrestDocument) -> Result<()>;

    /// Load the stored document, if any. The engine only applies it
    /// into a fresh (pending, never-started) session.
    fn load_once(&self) -> Result<Option<ArrestDocument>>;

    /// Append a finished episode to the archive. The archive key is
    /// independent of the live document.
    fn archive(&self, doc: &ArrestDocument) -> Result<()>;

    /// Remove the live document. Called on reset.
    fn clear(&self) -> Result<()>;
}

impl<G: PersistenceGateway + ?Sized> PersistenceGateway for &G {
    fn save(&self, doc: &ArrestDocument) -> Result<()> {
        (**self).save(doc)
    }

    fn load_once(&self) -> Result<Option<ArrestDocument>> {
        (**self).load_once()
    }

    fn archive(&self, doc: &ArrestDocument) -> Result<()> {
        (**self).archive(doc)
    }

    fn clear(&self) -> Result<()> {
        (**self).clear()
    }
}

/// File-backed gateway rooted at `<data_dir>/<device_id>/`.
pub struct FileGateway {
    live_path: PathBuf,
    archive_path: PathBuf,
}

impl FileGateway {
    pub fn new(data_dir: &Path, device_id: &str) -> Self {
        let dir = data_dir.join(device_id);
        Self {
            live_path: dir.join("arrest_log.json"),
            archive_path: dir.join("archive.jsonl"),
        }
    }

    pub fn live_path(&self) -> &Path {
        &self.live_path
    }

    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    fn ensure_parent_dir(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl PersistenceGateway for FileGateway {
    /// Atomically replace the live document:
    /// 1. Write to a temp file in the same directory
    /// 2. Sync to disk
    /// 3. Rename over the original
    fn save(&self, doc: &ArrestDocument) -> Result<()> {
        Self::ensure_parent_dir(&self.live_path)?;

        let parent = self.live_path.parent().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::Other, "document path missing parent")
        })?;
        let temp = NamedTempFile::new_in(parent)?;

        // Exclusive lock on the temp file serializes concurrent writers
        temp.as_file().lock_exclusive()?;

        {
            let mut writer = std::io::BufWriter::new(temp.as_file());
            let contents = serde_json::to_string(doc)?;
            writer.write_all(contents.as_bytes())?;
            writer.flush()?;
        }

        temp.as_file().sync_all()?;
        temp.as_file().unlock()?;

        temp.persist(&self.live_path)
            .map_err(|e| crate::Error::Io(e.error))?;

        tracing::debug!("Saved arrest document to {:?}", self.live_path);
        Ok(())
    }

    fn load_once(&self) -> Result<Option<ArrestDocument>> {
        if !self.live_path.exists() {
            tracing::debug!("No arrest document at {:?}", self.live_path);
            return Ok(None);
        }

        let file = File::open(&self.live_path)?;
        file.lock_shared()?;

        let mut contents = String::new();
        let mut reader = std::io::BufReader::new(&file);
        let read_result = reader.read_to_string(&mut contents);
        file.unlock()?;
        read_result?;

        match serde_json::from_str::<ArrestDocument>(&contents) {
            Ok(doc) => {
                tracing::debug!("Loaded arrest document from {:?}", self.live_path);
                Ok(Some(doc))
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to parse arrest document {:?}: {}. Ignoring it.",
                    self.live_path,
                    e
                );
                Ok(None)
            }
        }
    }

    fn archive(&self, doc: &ArrestDocument) -> Result<()> {
        Self::ensure_parent_dir(&self.archive_path)?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.archive_path)?;

        file.lock_exclusive()?;

        let mut writer = std::io::BufWriter::new(&file);
        let line = serde_json::to_string(doc)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        file.unlock()?;

        tracing::debug!("Archived episode to {:?}", self.archive_path);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if self.live_path.exists() {
            std::fs::remove_file(&self.live_path)?;
            tracing::debug!("Removed arrest document {:?}", self.live_path);
        }
        Ok(())
    }
}

/// In-memory gateway for tests and headless use.
#[derive(Default)]
pub struct MemoryGateway {
    doc: std::cell::RefCell<Option<ArrestDocument>>,
    archived: std::cell::RefCell<Vec<ArrestDocument>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn saved(&self) -> Option<ArrestDocument> {
        self.doc.borrow().clone()
    }

    pub fn archived(&self) -> Vec<ArrestDocument> {
        self.archived.borrow().clone()
    }
}

impl PersistenceGateway for MemoryGateway {
    fn save(&self, doc: &ArrestDocument) -> Result<()> {
        *self.doc.borrow_mut() = Some(doc.clone());
        Ok(())
    }

    fn load_once(&self) -> Result<Option<ArrestDocument>> {
        Ok(self.doc.borrow().clone())
    }

    fn archive(&self, doc: &ArrestDocument) -> Result<()> {
        self.archived.borrow_mut().push(doc.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.doc.borrow_mut() = None;
        Ok(())
    }
}

/// Stable per-installation identifier, generated on first use and kept
/// at `<data_dir>/device_id`. Injected into the gateway rather than
/// read as ambient state so test harnesses can isolate installations.
pub fn load_device_id(data_dir: &Path) -> Result<String> {
    let path = data_dir.join("device_id");
    if path.exists() {
        let id = std::fs::read_to_string(&path)?.trim().to_string();
        if !id.is_empty() {
            tracing::debug!("Using existing device id {}", id);
            return Ok(id);
        }
    }

    let id = uuid::Uuid::new_v4().to_string();
    std::fs::create_dir_all(data_dir)?;
    std::fs::write(&path, &id)?;
    tracing::info!("Generated new device id {}", id);
    Ok(id)
}
