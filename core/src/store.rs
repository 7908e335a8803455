//! SQLite store for analysis results
//!
//! Each `/analyze` request appends one row holding the image name, the
//! image outcome and the text analysis as JSON, plus a UTC timestamp.

use crate::error::{MedImageError, Result};
use chrono::{DateTime, Utc};
use log::{debug, info};
use rusqlite::{params, Connection};
use serde::Serialize;
use std::path::Path;
use std::sync::Mutex;

/// File name used when no store path is given
pub const DEFAULT_STORE_FILE: &str = "medical_data.db";

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS analysis_results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    image_path TEXT,
    predictions TEXT,
    text_analysis TEXT,
    timestamp TEXT NOT NULL
)";

/// One persisted analysis
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredAnalysis {
    pub id: i64,
    pub image_path: Option<String>,
    /// Image outcome as JSON
    pub predictions: Option<String>,
    /// Text analysis as JSON
    pub text_analysis: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Append-only results table behind a connection lock
#[derive(Debug)]
pub struct ResultStore {
    conn: Mutex<Connection>,
}

impl ResultStore {
    /// Opens (or creates) the database at `path`
    pub fn open(path: &Path) -> Result<Self> {
        info!("Opening results store at {}", path.display());
        Self::init(Connection::open(path)?)
    }

    /// In-memory database, gone when the store is dropped
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| MedImageError::Store("connection lock poisoned".to_string()))
    }

    /// Appends a result row and returns its id
    pub fn save<P, T>(
        &self,
        image_path: Option<&str>,
        predictions: Option<&P>,
        text_analysis: Option<&T>,
    ) -> Result<i64>
    where
        P: Serialize + ?Sized,
        T: Serialize + ?Sized,
    {
        let predictions = predictions.map(to_json).transpose()?;
        let text_analysis = text_analysis.map(to_json).transpose()?;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO analysis_results (image_path, predictions, text_analysis, timestamp)
             VALUES (?1, ?2, ?3, ?4)",
            params![image_path, predictions, text_analysis, Utc::now()],
        )?;
        let id = conn.last_insert_rowid();
        debug!("Stored analysis {}", id);
        Ok(id)
    }

    /// Newest rows first
    pub fn recent(&self, limit: usize) -> Result<Vec<StoredAnalysis>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, image_path, predictions, text_analysis, timestamp
             FROM analysis_results ORDER BY id DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok(StoredAnalysis {
                id: row.get(0)?,
                image_path: row.get(1)?,
                predictions: row.get(2)?,
                text_analysis: row.get(3)?,
                timestamp: row.get(4)?,
            })
        })?;
        Ok(rows.collect::<std::result::Result<Vec<_>, _>>()?)
    }

    pub fn count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM analysis_results", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

fn to_json<V: Serialize + ?Sized>(value: &V) -> Result<String> {
    serde_json::to_string(value).map_err(|e| MedImageError::Store(e.to_string()))
}
