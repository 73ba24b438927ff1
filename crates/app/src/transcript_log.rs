//! Append-only transcript log: an in-memory record of every finalized
//! source/target line pair, mirrored to a UTF-8 file in the §6 wire format.
//!
//! ```text
//! [ISO8601] SRC(lang=<code>): <source line>
//! [ISO8601] TGT(lang=<code>): <target line>
//! ```

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;

#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    pub utterance_id: u64,
    pub source_language: String,
    pub source_line: String,
    pub target_language: String,
    pub target_line: String,
}

struct Inner {
    file: Option<File>,
    entries: Vec<TranscriptEntry>,
}

/// Guarded by a single mutex: the log is a shared resource every stage may
/// append to as its half of an utterance finalizes.
pub struct TranscriptLog {
    inner: Mutex<Inner>,
}

impl TranscriptLog {
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let path: PathBuf = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            inner: Mutex::new(Inner {
                file: Some(file),
                entries: Vec::new(),
            }),
        })
    }

    /// In-memory only, for tests and `--dry-run`-style uses.
    pub fn in_memory() -> Self {
        Self {
            inner: Mutex::new(Inner {
                file: None,
                entries: Vec::new(),
            }),
        }
    }

    pub fn record(
        &self,
        utterance_id: u64,
        source_language: &str,
        source_line: &str,
        target_language: &str,
        target_line: &str,
    ) {
        let now = Utc::now().to_rfc3339();
        let mut inner = self.inner.lock().expect("transcript log mutex poisoned");
        if let Some(file) = &mut inner.file {
            let _ = writeln!(file, "[{now}] SRC(lang={source_language}): {source_line}");
            let _ = writeln!(file, "[{now}] TGT(lang={target_language}): {target_line}");
            let _ = file.flush();
        }
        inner.entries.push(TranscriptEntry {
            utterance_id,
            source_language: source_language.to_string(),
            source_line: source_line.to_string(),
            target_language: target_language.to_string(),
            target_line: target_line.to_string(),
        });
    }

    pub fn entries(&self) -> Vec<TranscriptEntry> {
        self.inner.lock().expect("transcript log mutex poisoned").entries.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_are_appended_in_order() {
        let log = TranscriptLog::in_memory();
        log.record(0, "en", "hello world", "es", "hola mundo");
        log.record(1, "en", "goodbye", "es", "adios");
        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].source_line, "hello world");
        assert_eq!(entries[1].target_line, "adios");
    }

    #[test]
    fn file_backed_log_writes_wire_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transcript.log");
        let log = TranscriptLog::open(&path).unwrap();
        log.record(0, "en", "hello world", "es", "hola mundo");
        drop(log);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("SRC(lang=en): hello world"));
        assert!(contents.contains("TGT(lang=es): hola mundo"));
    }
}
