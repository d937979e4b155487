// Selected-output punch files - tab-delimited row mirror

use std::fs::File;
use std::path::{Path, PathBuf};

use aquion_engine::cell::CellValue;

/// Mirrors selected-output rows into a tab-delimited file.
///
/// Like the channel sinks, the file is created on the first row written, so
/// a run that punches nothing leaves no file. `retarget` switches the
/// destination mid-run; rows already written stay in the old file and the
/// header is not replayed into the new one.
///
/// Reals punch in fixed scientific form (`1.2000e-3`); text and integers
/// punch as-is. In-memory queries keep full precision regardless.
#[derive(Debug)]
pub struct SelectedOutputWriter {
    path: PathBuf,
    writer: Option<csv::Writer<File>>,
}

impl SelectedOutputWriter {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            writer: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    /// Switch subsequent rows to `path`, closing the current file first.
    pub fn retarget(&mut self, path: &Path) -> Result<(), String> {
        self.close()?;
        self.path = path.to_path_buf();
        Ok(())
    }

    pub fn write_row(&mut self, row: &[CellValue]) -> Result<(), String> {
        if self.writer.is_none() {
            let writer = csv::WriterBuilder::new()
                .delimiter(b'\t')
                .flexible(true)
                .from_path(&self.path)
                .map_err(|e| e.to_string())?;
            self.writer = Some(writer);
        }
        let record: Vec<String> = row.iter().map(punch_field).collect();
        if let Some(writer) = self.writer.as_mut() {
            writer.write_record(&record).map_err(|e| e.to_string())?;
        }
        Ok(())
    }

    pub fn close(&mut self) -> Result<(), String> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}

fn punch_field(cell: &CellValue) -> String {
    match cell {
        CellValue::Real(r) => format!("{:.4e}", r),
        other => other.display_string(),
    }
}
