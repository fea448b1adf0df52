use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;
use tracing::warn;

const FLUSH_THRESHOLD: usize = 4096;

/// Mirrors run output into a timestamped text file in the output
/// directory. Stays inert when no output directory is configured.
///
/// The file is created lazily on the first drain so that a run which
/// produces no output leaves no empty log behind. I/O failures are
/// logged and the sink goes quiet; the run itself continues.
pub struct RunLog {
    dir: Option<PathBuf>,
    file: Option<File>,
    buffer: String,
}

impl RunLog {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self {
            dir,
            file: None,
            buffer: String::new(),
        }
    }

    /// Append one line. Writes go out in chunks once enough text has
    /// accumulated.
    pub fn record(&mut self, line: &str) {
        if self.dir.is_none() {
            return;
        }
        self.buffer.push_str(line);
        self.buffer.push('\n');
        if self.buffer.len() >= FLUSH_THRESHOLD {
            self.drain();
        }
    }

    /// Write out whatever is pending and stop logging.
    pub fn close(&mut self) {
        self.drain();
        self.file = None;
        self.dir = None;
    }

    fn drain(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let Some(dir) = self.dir.as_ref() else {
            return;
        };
        if self.file.is_none() {
            let name = Local::now().format("%Y_%m_%d_%H_%M_%S_log.txt").to_string();
            let path = dir.join(name);
            match File::create(&path) {
                Ok(file) => self.file = Some(file),
                Err(e) => {
                    warn!("Failed to create run log {}: {e}", path.display());
                    self.dir = None;
                    self.buffer.clear();
                    return;
                }
            }
        }
        if let Some(file) = self.file.as_mut() {
            if let Err(e) = file.write_all(self.buffer.as_bytes()) {
                warn!("Failed to write run log: {e}");
                self.file = None;
                self.dir = None;
            }
        }
        self.buffer.clear();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    fn log_files(dir: &std::path::Path) -> Vec<PathBuf> {
        let mut files: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        files.sort();
        files
    }

    #[test]
    fn test_inert_without_directory() {
        let mut log = RunLog::new(None);
        log.record("command: echo hi");
        log.close();
        assert!(log.buffer.is_empty());
    }

    #[test]
    fn test_lazy_creation_and_close() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = RunLog::new(Some(dir.path().to_path_buf()));
        log.record("command: echo hi");
        log.record("hi");
        // small writes stay buffered, no file yet
        assert!(log_files(dir.path()).is_empty());

        log.close();
        let files = log_files(dir.path());
        assert_eq!(files.len(), 1);
        let name = files[0].file_name().unwrap().to_string_lossy().to_string();
        assert!(name.ends_with("_log.txt"));
        assert_eq!(
            fs::read_to_string(&files[0]).unwrap(),
            "command: echo hi\nhi\n"
        );
    }

    #[test]
    fn test_large_buffer_drains_early() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = RunLog::new(Some(dir.path().to_path_buf()));
        let line = "x".repeat(FLUSH_THRESHOLD);
        log.record(&line);
        let files = log_files(dir.path());
        assert_eq!(files.len(), 1);
        assert_eq!(fs::read_to_string(&files[0]).unwrap().len(), line.len() + 1);
    }

    #[test]
    fn test_unwritable_directory_goes_quiet() {
        let mut log = RunLog::new(Some(PathBuf::from("/no/such/dir")));
        log.record(&"x".repeat(FLUSH_THRESHOLD));
        log.record("still fine");
        log.close();
        assert!(log.dir.is_none());
    }
}
