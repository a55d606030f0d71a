use std::fmt;
use std::path::Path;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::error::{Error, Result};

/// Something that can be run against a file path with the caller's
/// interactive terminal attached.
pub trait Launcher: fmt::Debug + Send + Sync {
    fn program(&self) -> &str;

    /// Runs against `path` and blocks until the program has exited.
    fn launch(&self, path: &Path) -> Result<()>;
}

/// An external program spawned as a child process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    name: String,
}

impl Program {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Launcher for Program {
    fn program(&self) -> &str {
        &self.name
    }

    fn launch(&self, path: &Path) -> Result<()> {
        debug!(program = %self.name, path = %path.display(), "launching editor");
        let status = Command::new(&self.name)
            .arg(path)
            .stdin(interactive_stdin())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| Error::Spawn {
                program: self.name.clone(),
                source,
            })?;

        debug!(program = %self.name, %status, "editor exited");
        if status.success() {
            Ok(())
        } else {
            Err(Error::ExitStatus {
                program: self.name.clone(),
                status,
            })
        }
    }
}

// Standard input may be redirected when running under some hosts, so the
// console device is opened by name.
#[cfg(windows)]
fn interactive_stdin() -> Stdio {
    match open_console_input() {
        Ok(console) => Stdio::from(console),
        Err(err) => panic!("unable to open console input CONIN$: {err}"),
    }
}

// Read access is all the child's standard input needs.
#[cfg(windows)]
fn open_console_input() -> std::io::Result<std::fs::File> {
    std::fs::File::open("CONIN$")
}

#[cfg(not(windows))]
fn interactive_stdin() -> Stdio {
    Stdio::inherit()
}

/// Launcher that succeeds immediately without touching anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoopLauncher;

impl Launcher for NoopLauncher {
    fn program(&self) -> &str {
        "noop"
    }

    fn launch(&self, _path: &Path) -> Result<()> {
        Ok(())
    }
}
