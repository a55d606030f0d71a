use std::collections::VecDeque;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use tempedit::Verdict;

pub const LOG_DIR: &str = ".tempedit";
const LOG_FILE: &str = "session_log.jsonl";
pub const DEFAULT_CAPACITY: usize = 500;

/// One editing session: where the scratch file lived, who edited it and
/// what came back.
#[derive(Debug, Serialize)]
pub struct SessionRecord<'a> {
    pub timestamp: String,
    pub path: &'a Path,
    pub editor: &'a str,
    pub verdict: Verdict,
    pub bytes: usize,
    pub lines: usize,
}

impl<'a> SessionRecord<'a> {
    pub fn new(path: &'a Path, editor: &'a str, verdict: Verdict, content: &str) -> Self {
        let timestamp = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| "unknown".into());
        Self {
            timestamp,
            path,
            editor,
            verdict,
            bytes: content.len(),
            lines: content.lines().count(),
        }
    }
}

/// JSONL history of sessions holding at most `capacity` records, newest last.
#[derive(Debug, Clone)]
pub struct SessionLog {
    path: PathBuf,
    capacity: usize,
}

impl SessionLog {
    pub fn in_dir(dir: &Path, capacity: usize) -> Result<Self> {
        fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        Ok(Self {
            path: dir.join(LOG_FILE),
            capacity: capacity.max(1),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `record`, dropping the oldest sessions beyond the capacity.
    /// The log is read and rewritten through a single handle.
    pub fn append(&self, record: &SessionRecord<'_>) -> Result<()> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)
            .with_context(|| format!("opening session log {}", self.path.display()))?;

        let mut sessions = self.read_recent(&file)?;
        sessions.push_back(serde_json::to_string(record)?);

        file.seek(SeekFrom::Start(0))?;
        file.set_len(0)?;
        for line in &sessions {
            writeln!(file, "{line}")?;
        }
        file.flush()
            .with_context(|| format!("writing session log {}", self.path.display()))
    }

    // Keeps room for the record about to be appended.
    fn read_recent(&self, file: &File) -> Result<VecDeque<String>> {
        let mut recent = VecDeque::with_capacity(self.capacity);
        for line in BufReader::new(file).lines() {
            let line = line.with_context(|| format!("reading {}", self.path.display()))?;
            if line.trim().is_empty() {
                continue;
            }
            if recent.len() == self.capacity.saturating_sub(1) {
                recent.pop_front();
            }
            if self.capacity > 1 {
                recent.push_back(line);
            }
        }
        Ok(recent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn records(log: &SessionLog) -> Vec<serde_json::Value> {
        fs::read_to_string(log.path())
            .expect("read log")
            .lines()
            .map(|line| serde_json::from_str(line).expect("json line"))
            .collect()
    }

    #[test]
    fn appends_sessions_in_order() {
        let temp = tempdir().expect("temp dir");
        let log = SessionLog::in_dir(&temp.path().join("logs"), DEFAULT_CAPACITY).expect("log");

        log.append(&SessionRecord::new(
            Path::new("/tmp/a"),
            "vi",
            Verdict::Changed,
            "one\ntwo\n",
        ))
        .expect("first");
        log.append(&SessionRecord::new(Path::new("/tmp/b"), "nano", Verdict::Empty, ""))
            .expect("second");

        let lines = records(&log);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["verdict"], "changed");
        assert_eq!(lines[0]["lines"], 2);
        assert_eq!(lines[0]["bytes"], 8);
        assert_eq!(lines[1]["editor"], "nano");
        assert_eq!(lines[1]["verdict"], "empty");
        assert_eq!(lines[1]["bytes"], 0);
    }

    #[test]
    fn keeps_only_newest_sessions() {
        let temp = tempdir().expect("temp dir");
        let log = SessionLog::in_dir(temp.path(), 3).expect("log");
        let seeded: Vec<String> = (0..5).map(|idx| format!("{{\"n\":{idx}}}")).collect();
        fs::write(log.path(), seeded.join("\n") + "\n").expect("seed log");

        log.append(&SessionRecord::new(
            Path::new("/tmp/c"),
            "vi",
            Verdict::NotChanged,
            "body",
        ))
        .expect("append");

        let lines = records(&log);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["n"], 3);
        assert_eq!(lines[1]["n"], 4);
        assert_eq!(lines[2]["verdict"], "not_changed");
    }

    #[test]
    fn capacity_of_one_keeps_latest_session() {
        let temp = tempdir().expect("temp dir");
        let log = SessionLog::in_dir(temp.path(), 0).expect("log");

        for editor in ["vi", "nano"] {
            log.append(&SessionRecord::new(Path::new("/tmp/d"), editor, Verdict::Changed, "x"))
                .expect("append");
        }

        let lines = records(&log);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["editor"], "nano");
    }
}
