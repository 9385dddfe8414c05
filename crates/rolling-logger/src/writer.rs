//! Rolling File Writer
//!
//! Size-based file rotation (`app.log`, `app.log.1`, ... `app.log.N`) plus a
//! bounded buffer of the most recent lines.

use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Rotation and buffer limits
#[derive(Debug, Clone)]
pub struct RollingConfig {
    /// Rotate once the active file would grow past this size
    pub max_bytes: u64,
    /// Number of rotated files kept next to the active one
    pub max_files: usize,
    /// Capacity of the in-memory recent-lines buffer
    pub buffer_lines: usize,
}

impl Default for RollingConfig {
    fn default() -> Self {
        Self {
            max_bytes: 2 * 1024 * 1024,
            max_files: 3,
            buffer_lines: 500,
        }
    }
}

struct FileState {
    file: Option<File>,
    written: u64,
}

/// Writer shared by the tracing subscriber
pub struct RollingFileWriter {
    dir: PathBuf,
    base_name: String,
    config: RollingConfig,
    state: Mutex<FileState>,
    recent: Mutex<VecDeque<String>>,
}

impl RollingFileWriter {
    pub fn new(dir: impl AsRef<Path>, app_name: &str, config: RollingConfig) -> io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        let base_name = format!("{}.log", app_name);
        let path = dir.join(&base_name);
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let written = file.metadata().map(|m| m.len()).unwrap_or(0);

        Ok(Self {
            dir,
            base_name,
            config,
            state: Mutex::new(FileState {
                file: Some(file),
                written,
            }),
            recent: Mutex::new(VecDeque::new()),
        })
    }

    /// Path of the active log file
    pub fn active_path(&self) -> PathBuf {
        self.dir.join(&self.base_name)
    }

    /// Path of the n-th rotated file (1 = newest)
    pub fn rotated_path(&self, n: usize) -> PathBuf {
        self.dir.join(format!("{}.{}", self.base_name, n))
    }

    /// Snapshot of the buffered lines, oldest first
    pub fn recent_lines(&self) -> Vec<String> {
        match self.recent.lock() {
            Ok(recent) => recent.iter().cloned().collect(),
            Err(poisoned) => poisoned.into_inner().iter().cloned().collect(),
        }
    }

    fn remember(&self, buf: &[u8]) {
        if self.config.buffer_lines == 0 {
            return;
        }
        let text = String::from_utf8_lossy(buf);
        let mut recent = match self.recent.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            if recent.len() == self.config.buffer_lines {
                recent.pop_front();
            }
            recent.push_back(line.to_string());
        }
    }

    fn rotate(&self, state: &mut FileState) -> io::Result<()> {
        // Close the active handle before renaming (required on Windows)
        state.file = None;

        if self.config.max_files > 0 {
            for n in (1..self.config.max_files).rev() {
                let from = self.rotated_path(n);
                if from.exists() {
                    fs::rename(&from, self.rotated_path(n + 1))?;
                }
            }
            fs::rename(self.active_path(), self.rotated_path(1))?;
        } else {
            fs::remove_file(self.active_path())?;
        }

        state.file = Some(
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(self.active_path())?,
        );
        state.written = 0;
        Ok(())
    }

    fn write_bytes(&self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer poisoned"))?;

        if state.written > 0 && state.written + buf.len() as u64 > self.config.max_bytes {
            self.rotate(&mut state)?;
        }

        let file = match state.file.as_mut() {
            Some(file) => file,
            None => return Err(io::Error::new(io::ErrorKind::Other, "log file closed")),
        };
        file.write_all(buf)?;
        state.written += buf.len() as u64;
        drop(state);

        self.remember(buf);
        Ok(buf.len())
    }
}

impl Write for &RollingFileWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_bytes(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer poisoned"))?;
        match state.file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }
}
