//! Report sink
//!
//! Persists the unified row-set as `inventory_<YYYYMMDD>.csv` and
//! `inventory_<YYYYMMDD>.json` in the output directory. Both files are
//! written to temp files in the same directory first and only renamed into
//! place once both are complete.

use crate::models::InventoryRow;
use crate::schema::UnifiedSchema;
use chrono::{Local, NaiveDate};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WriteError {
    #[error("Failed to write report to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode CSV report: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to encode JSON report: {0}")]
    Json(#[from] serde_json::Error),

    /// `replaced` names a report file already moved into place by this write
    #[error(
        "Failed to move report into place at {path}: {source}{}",
        replaced_note(.replaced)
    )]
    Persist {
        path: PathBuf,
        replaced: Option<PathBuf>,
        #[source]
        source: std::io::Error,
    },
}

fn replaced_note(replaced: &Option<PathBuf>) -> String {
    match replaced {
        Some(path) => format!(" ({} was already replaced)", path.display()),
        None => String::new(),
    }
}

impl WriteError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        WriteError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Destination for a finished inventory
pub trait ReportSink {
    /// Write the rows and return the paths of the files produced
    fn write(&self, schema: &UnifiedSchema, rows: &[InventoryRow])
    -> Result<Vec<PathBuf>, WriteError>;
}

/// Writes the CSV and JSON reports into a directory
#[derive(Debug, Clone)]
pub struct FileReportSink {
    output_dir: PathBuf,
    date: NaiveDate,
}

impl FileReportSink {
    /// Sink stamped with today's local date
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self::with_date(output_dir, Local::now().date_naive())
    }

    pub fn with_date(output_dir: impl Into<PathBuf>, date: NaiveDate) -> Self {
        Self {
            output_dir: output_dir.into(),
            date,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn file_name(&self, extension: &str) -> String {
        format!("inventory_{}.{}", self.date.format("%Y%m%d"), extension)
    }

    pub fn csv_path(&self) -> PathBuf {
        self.output_dir.join(self.file_name("csv"))
    }

    pub fn json_path(&self) -> PathBuf {
        self.output_dir.join(self.file_name("json"))
    }

    fn temp_file(&self) -> Result<NamedTempFile, WriteError> {
        tempfile::Builder::new()
            .prefix(".inventory-")
            .suffix(".tmp")
            .tempfile_in(&self.output_dir)
            .map_err(|e| WriteError::io(&self.output_dir, e))
    }
}

impl ReportSink for FileReportSink {
    fn write(
        &self,
        schema: &UnifiedSchema,
        rows: &[InventoryRow],
    ) -> Result<Vec<PathBuf>, WriteError> {
        std::fs::create_dir_all(&self.output_dir)
            .map_err(|e| WriteError::io(&self.output_dir, e))?;

        // Temp files are removed on drop if anything below fails
        let mut csv_file = self.temp_file()?;
        write_csv(csv_file.as_file_mut(), schema, rows)?;

        let mut json_file = self.temp_file()?;
        write_json(json_file.as_file_mut(), rows)?;

        let csv_path = self.csv_path();
        let json_path = self.json_path();
        csv_file
            .persist(&csv_path)
            .map_err(|e| WriteError::Persist {
                path: csv_path.clone(),
                replaced: None,
                source: e.error,
            })?;
        json_file
            .persist(&json_path)
            .map_err(|e| WriteError::Persist {
                path: json_path.clone(),
                replaced: Some(csv_path.clone()),
                source: e.error,
            })?;

        tracing::info!(
            csv = %csv_path.display(),
            json = %json_path.display(),
            rows = rows.len(),
            columns = schema.len(),
            "Wrote inventory report"
        );
        Ok(vec![csv_path, json_path])
    }
}

/// CSV with the schema as header; every row is rendered in schema order
pub fn write_csv<W: Write>(
    writer: W,
    schema: &UnifiedSchema,
    rows: &[InventoryRow],
) -> Result<(), WriteError> {
    let mut csv = csv::Writer::from_writer(writer);
    if schema.is_empty() {
        csv.flush().map_err(csv::Error::from)?;
        return Ok(());
    }

    csv.write_record(schema.columns())?;
    for row in rows {
        let record = schema
            .columns()
            .iter()
            .map(|column| row.render(column).unwrap_or_default());
        csv.write_record(record)?;
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Pretty-printed JSON array of row objects
pub fn write_json<W: Write>(writer: W, rows: &[InventoryRow]) -> Result<(), WriteError> {
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, rows)?;
    writer
        .write_all(b"\n")
        .and_then(|_| writer.flush())
        .map_err(serde_json::Error::io)?;
    Ok(())
}
