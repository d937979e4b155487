// Channel file sinks - lazily created, retargetable

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Write target for one output channel file.
///
/// Construction only records the path; the file is created (truncating any
/// previous contents) on the first write. A run that never writes the
/// channel leaves no file behind.
#[derive(Debug)]
pub struct FileSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
}

impl FileSink {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            writer: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Point the sink at a different file. An open file is flushed and
    /// closed first; the next write creates the new one.
    pub fn set_path(&mut self, path: &Path) -> Result<(), String> {
        self.close()?;
        self.path = path.to_path_buf();
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    pub fn write_str(&mut self, text: &str) -> Result<(), String> {
        if self.writer.is_none() {
            let file = File::create(&self.path).map_err(|e| e.to_string())?;
            self.writer = Some(BufWriter::new(file));
        }
        if let Some(writer) = self.writer.as_mut() {
            writer.write_all(text.as_bytes()).map_err(|e| e.to_string())?;
        }
        Ok(())
    }

    /// Flush and close. Closing an already-closed sink is a no-op.
    pub fn close(&mut self) -> Result<(), String> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush().map_err(|e| e.to_string())?;
        }
        Ok(())
    }
}
