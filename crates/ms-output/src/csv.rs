//! CSV output backends.
//!
//! - [`ResultsWriter`]: the study's append-only results table.
//! - [`VehicleCsvWriter`]: per-vehicle emission rows of one or more runs.
//! - [`write_class_means`]: the per (scenario, type) mean table.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use csv::{Writer, WriterBuilder};

use ms_emission::{ClassMean, EmissionTotals, VehicleEmissionRow};

use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult, ResultRow};

// ── Results table ─────────────────────────────────────────────────────────────

/// Appends [`ResultRow`]s to a CSV file, one flushed line per run.
///
/// The header is written only when the file is new or empty, so a study can
/// be resumed into an existing results file.
pub struct ResultsWriter {
    path:     PathBuf,
    writer:   Writer<File>,
    rows:     usize,
    finished: bool,
}

impl ResultsWriter {
    pub fn open(path: &Path) -> OutputResult<Self> {
        let file_err = |source| OutputError::File { path: path.to_path_buf(), source };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(file_err)?;
        }
        let needs_header = match std::fs::metadata(path) {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(file_err(e)),
        };
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(file_err)?;

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);
        if needs_header {
            writer.write_record(ResultRow::header())?;
            writer.flush()?;
        } else {
            log::info!("appending to existing results file {}", path.display());
        }

        Ok(Self {
            path: path.to_path_buf(),
            writer,
            rows: 0,
            finished: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rows appended through this writer (not counting earlier sessions).
    pub fn rows_written(&self) -> usize {
        self.rows
    }
}

impl OutputWriter for ResultsWriter {
    fn write_result(&mut self, row: &ResultRow) -> OutputResult<()> {
        self.writer.write_record(row.fields())?;
        self.writer.flush()?;
        self.rows += 1;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.writer.flush()?;
        Ok(())
    }
}

// ── Per-vehicle rows ──────────────────────────────────────────────────────────

/// Writes `time,vehicle,type,co2,co,hc,nox,pmx,fuel,speed`, overwriting the
/// target file.  `time` is left empty for rows outside a `<timestep>`.
pub struct VehicleCsvWriter {
    writer:   Writer<File>,
    finished: bool,
}

impl VehicleCsvWriter {
    pub fn create(path: &Path) -> OutputResult<Self> {
        let mut writer = Writer::from_path(path)?;
        let mut header = vec!["time", "vehicle", "type"];
        header.extend(EmissionTotals::COLUMNS);
        header.push("speed");
        writer.write_record(&header)?;
        Ok(Self { writer, finished: false })
    }

    pub fn write_rows(&mut self, rows: &[VehicleEmissionRow]) -> OutputResult<()> {
        for row in rows {
            let mut record = vec![
                row.time.map(|t| t.to_string()).unwrap_or_default(),
                row.vehicle.clone(),
                row.vehicle_type.clone(),
            ];
            record.extend(row.emissions.as_array().iter().map(f64::to_string));
            record.push(row.speed.to_string());
            self.writer.write_record(&record)?;
        }
        Ok(())
    }

    pub fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.writer.flush()?;
        Ok(())
    }
}

// ── Class means ───────────────────────────────────────────────────────────────

/// Write `scenario,type,samples,co2,co,hc,nox,pmx,fuel` to `path`.
pub fn write_class_means(path: &Path, means: &[ClassMean]) -> OutputResult<()> {
    let mut writer = Writer::from_path(path)?;
    let mut header = vec!["scenario", "type", "samples"];
    header.extend(EmissionTotals::COLUMNS);
    writer.write_record(&header)?;

    for m in means {
        let mut record = vec![m.scenario.clone(), m.vehicle_type.clone(), m.samples.to_string()];
        record.extend(m.mean.as_array().iter().map(f64::to_string));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
