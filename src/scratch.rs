use std::borrow::Cow;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::Builder;
use tracing::{debug, trace};

use crate::editor::Editor;
use crate::error::{Error, Result};
use crate::template;

/// Outcome of comparing the last two generations of a scratch file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Changed,
    NotChanged,
    Empty,
    NotCreated,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Verdict::Changed => "changed",
            Verdict::NotChanged => "not changed",
            Verdict::Empty => "empty",
            Verdict::NotCreated => "not created",
        };
        f.write_str(label)
    }
}

/// Content of the file before and after the most recent mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct History {
    previous: Option<Vec<u8>>,
    latest: Option<Vec<u8>>,
}

impl History {
    fn empty() -> Self {
        Self {
            previous: Some(Vec::new()),
            latest: Some(Vec::new()),
        }
    }

    fn push(&mut self, content: Vec<u8>) {
        self.previous = self.latest.replace(content);
    }

    fn previous(&self) -> &[u8] {
        self.previous.as_deref().unwrap_or_default()
    }

    fn latest(&self) -> &[u8] {
        self.latest.as_deref().unwrap_or_default()
    }

    fn verdict(&self) -> Verdict {
        if self.previous.is_none() && self.latest.is_none() {
            return Verdict::NotCreated;
        }
        // Editors disagree about the final newline, so it never counts as an edit.
        if trim_trailing_newlines(self.previous()) == trim_trailing_newlines(self.latest()) {
            return Verdict::NotChanged;
        }
        if self.latest().is_empty() {
            return Verdict::Empty;
        }
        Verdict::Changed
    }
}

fn trim_trailing_newlines(bytes: &[u8]) -> &[u8] {
    let end = bytes
        .iter()
        .rposition(|byte| *byte != b'\n')
        .map_or(0, |idx| idx + 1);
    &bytes[..end]
}

/// A uniquely named file that stages text for the user to edit.
///
/// Every mutating call appends to or hands off the file and then re-reads
/// it, so [`previous`](Self::previous) and [`bytes`](Self::bytes) always
/// hold the content around the most recent successful mutation. The file is
/// not removed on drop; call [`clean`](Self::clean) when done.
#[derive(Debug)]
pub struct ScratchFile {
    file: File,
    path: PathBuf,
    history: History,
}

impl ScratchFile {
    /// Creates a scratch file in the system temp directory.
    pub fn new(prefix: &str) -> Result<Self> {
        Self::new_in(std::env::temp_dir(), prefix)
    }

    /// Creates a scratch file in `dir` whose name starts with `prefix`. An
    /// empty `dir` means the system temp directory.
    pub fn new_in(dir: impl AsRef<Path>, prefix: &str) -> Result<Self> {
        let dir = dir.as_ref();
        let dir = if dir.as_os_str().is_empty() {
            std::env::temp_dir()
        } else {
            dir.to_path_buf()
        };

        let (file, path) = Builder::new()
            .prefix(prefix)
            .tempfile_in(&dir)
            .and_then(|named| named.keep().map_err(|err| err.error))
            .map_err(|source| Error::Create { dir, source })?;

        debug!(path = %path.display(), "created scratch file");
        Ok(Self {
            file,
            path,
            history: History::empty(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `content` to the end of the file.
    pub fn write(&mut self, content: &str) -> Result<()> {
        self.write_bytes(content.as_bytes())
    }

    pub fn write_bytes(&mut self, content: &[u8]) -> Result<()> {
        self.file.seek(SeekFrom::End(0))?;
        self.file.write_all(content)?;
        self.file.flush()?;
        self.reload()
    }

    /// Renders the Jinja template `source` against `data` and appends the
    /// result. Nothing is written when parsing or rendering fails.
    pub fn render_template<S: Serialize>(&mut self, source: &str, data: S) -> Result<()> {
        let rendered = template::render(source, data)?;
        self.write_bytes(rendered.as_bytes())
    }

    /// Hands the file to `editor` and waits for it to exit.
    pub fn open_with(&mut self, editor: &Editor) -> Result<()> {
        editor.launch(&self.path)?;
        // Editors that save by renaming leave our handle on the old inode.
        self.file = OpenOptions::new().read(true).write(true).open(&self.path)?;
        self.reload()
    }

    pub fn verdict(&self) -> Verdict {
        self.history.verdict()
    }

    /// `Ok(true)` when the content changed, otherwise the reason it did not:
    /// [`Error::NotChanged`], [`Error::Empty`] or [`Error::NotCreated`].
    pub fn is_changed(&self) -> Result<bool> {
        match self.verdict() {
            Verdict::Changed => Ok(true),
            Verdict::NotChanged => Err(Error::NotChanged),
            Verdict::Empty => Err(Error::Empty),
            Verdict::NotCreated => Err(Error::NotCreated),
        }
    }

    /// Latest content, with invalid UTF-8 replaced.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(self.history.latest())
    }

    pub fn bytes(&self) -> &[u8] {
        self.history.latest()
    }

    /// Content as it was before the most recent mutation.
    pub fn previous(&self) -> &[u8] {
        self.history.previous()
    }

    /// Closes the handle and deletes the file.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be synced or removed.
    pub fn clean(self) {
        let Self { file, path, .. } = self;
        if let Err(err) = file.sync_all() {
            panic!("syncing scratch file {}: {err}", path.display());
        }
        drop(file);
        if let Err(err) = fs::remove_file(&path) {
            panic!("removing scratch file {}: {err}", path.display());
        }
        debug!(path = %path.display(), "removed scratch file");
    }

    fn reload(&mut self) -> Result<()> {
        self.file.seek(SeekFrom::Start(0))?;
        let mut content = Vec::new();
        self.file.read_to_end(&mut content)?;
        trace!(
            path = %self.path.display(),
            previous = self.history.latest().len(),
            latest = content.len(),
            "rotated scratch content"
        );
        self.history.push(content);
        Ok(())
    }
}

impl fmt::Display for ScratchFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Cleans every file in turn; see [`ScratchFile::clean`].
pub fn clean(files: impl IntoIterator<Item = ScratchFile>) {
    for file in files {
        file.clean();
    }
}
