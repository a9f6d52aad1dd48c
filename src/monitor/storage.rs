//! Scalar sinks: in-memory and JSON-lines file

use super::ScalarRecord;
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// File name of the scalar log inside a run directory
pub const SCALARS_FILE: &str = "scalars.jsonl";

/// Append-only recorder of scalars keyed by tag and step
pub trait ScalarSink {
    /// Record one value
    fn add_scalar(&mut self, tag: &str, value: f32, step: usize) -> Result<()>;

    /// Push buffered records to their destination
    fn flush(&mut self) -> Result<()>;
}

/// In-memory sink (no filesystem access)
#[derive(Debug, Default, Clone)]
pub struct InMemoryScalars {
    records: Vec<ScalarRecord>,
}

impl InMemoryScalars {
    pub fn new() -> Self {
        Self::default()
    }

    /// All records in insertion order
    pub fn records(&self) -> &[ScalarRecord] {
        &self.records
    }

    /// `(step, value)` pairs of one tag, in insertion order
    pub fn series(&self, tag: &str) -> Vec<(usize, f32)> {
        self.records
            .iter()
            .filter(|r| r.tag == tag)
            .map(|r| (r.step, r.value))
            .collect()
    }

    /// Number of records logged under `tag`
    pub fn count(&self, tag: &str) -> usize {
        self.records.iter().filter(|r| r.tag == tag).count()
    }
}

impl ScalarSink for InMemoryScalars {
    fn add_scalar(&mut self, tag: &str, value: f32, step: usize) -> Result<()> {
        self.records.push(ScalarRecord::new(tag, step, value));
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Sink writing one JSON object per line to `<dir>/scalars.jsonl`
pub struct JsonlScalarWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    written: usize,
}

impl JsonlScalarWriter {
    /// Create (or truncate) the scalar log inside `dir`
    pub fn create<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let path = dir.as_ref().join(SCALARS_FILE);
        let file = File::create(&path)?;
        tracing::debug!(path = %path.display(), "opened scalar log");

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            written: 0,
        })
    }

    /// Get the file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records written so far
    pub fn written(&self) -> usize {
        self.written
    }
}

impl ScalarSink for JsonlScalarWriter {
    fn add_scalar(&mut self, tag: &str, value: f32, step: usize) -> Result<()> {
        let record = ScalarRecord::new(tag, step, value);
        serde_json::to_writer(&mut self.writer, &record)
            .map_err(|e| Error::Serialization(e.to_string()))?;
        self.writer.write_all(b"\n")?;
        self.written += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

impl Drop for JsonlScalarWriter {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}

/// Read back a scalar log written by [`JsonlScalarWriter`]
pub fn read_scalars<P: AsRef<Path>>(path: P) -> Result<Vec<ScalarRecord>> {
    let reader = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record =
            serde_json::from_str(&line).map_err(|e| Error::Serialization(e.to_string()))?;
        records.push(record);
    }
    Ok(records)
}
