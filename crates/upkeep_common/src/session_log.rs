//! Session log for one maintenance run
//!
//! Every line of output from a run is teed to two sinks: the console and an
//! append-only log file. The file doubles as the mail report body and is a
//! process-scoped resource: it is deleted when the run ends, whatever the
//! outcome. A leftover file from a crashed run is rotated aside at open if
//! it has grown past 1 MiB.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Rotation threshold, checked once at open
const MAX_LOG_BYTES: u64 = 1024 * 1024; // 1 MiB

/// Append-only transcript of one run, deleted on drop
pub struct SessionLog {
    path: PathBuf,
    file: Arc<Mutex<File>>,
}

impl SessionLog {
    /// Open the session log, rotating an oversized leftover file first
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating log directory for {}", path.display()))?;
        }

        rotate_if_oversized(path)?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .mode(0o644)
            .open(path)
            .with_context(|| format!("opening session log {}", path.display()))?;

        Ok(Self {
            path: path.to_path_buf(),
            file: Arc::new(Mutex::new(file)),
        })
    }

    /// Writer that tees to console and log file, for the tracing subscriber
    pub fn tee_writer(&self) -> TeeWriter {
        TeeWriter {
            file: Arc::clone(&self.file),
        }
    }

    /// Re-read the full transcript, used as the mail body
    pub fn transcript(&self) -> Result<String> {
        fs::read_to_string(&self.path)
            .with_context(|| format!("reading transcript {}", self.path.display()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for SessionLog {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// Writes each buffer to stdout and the session log file
#[derive(Clone)]
pub struct TeeWriter {
    file: Arc<Mutex<File>>,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().write_all(buf)?;
        if let Ok(mut file) = self.file.lock() {
            file.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()?;
        if let Ok(mut file) = self.file.lock() {
            file.flush()?;
        }
        Ok(())
    }
}

/// Move an oversized log aside so the new run starts on a fresh file
fn rotate_if_oversized(path: &Path) -> Result<()> {
    let size = match fs::metadata(path) {
        Ok(meta) => meta.len(),
        Err(_) => return Ok(()),
    };

    if size > MAX_LOG_BYTES {
        // Append ".1" to the whole file name; with_extension would swallow
        // whatever extension the configured path happens to carry
        let mut rotated_name = match path.file_name() {
            Some(name) => name.to_os_string(),
            None => return Ok(()),
        };
        rotated_name.push(".1");
        let rotated = path.with_file_name(rotated_name);
        fs::rename(path, &rotated)
            .with_context(|| format!("rotating oversized log {}", path.display()))?;
    }

    Ok(())
}
