use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unable to create scratch file in {}", .dir.display())]
    Create {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("scratch file I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("invalid template: {0}")]
    TemplateParse(#[source] minijinja::Error),

    #[error("template rendering failed: {0}")]
    TemplateRender(#[source] minijinja::Error),

    #[error("unable to launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{program}` exited with {status}")]
    ExitStatus { program: String, status: ExitStatus },

    #[error("scratch file was never created")]
    NotCreated,

    #[error("content was not changed")]
    NotChanged,

    #[error("content is empty")]
    Empty,
}

impl Error {
    /// True for the negative outcomes of [`ScratchFile::is_changed`](crate::ScratchFile::is_changed),
    /// as opposed to operational failures.
    pub fn is_verdict(&self) -> bool {
        matches!(self, Error::NotCreated | Error::NotChanged | Error::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_errors_are_flagged() {
        assert!(Error::NotChanged.is_verdict());
        assert!(Error::Empty.is_verdict());
        assert!(Error::NotCreated.is_verdict());
        assert!(!Error::Io(io::Error::other("disk")).is_verdict());
    }

    #[test]
    fn create_error_names_directory() {
        let err = Error::Create {
            dir: PathBuf::from("/missing"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(err.to_string().contains("/missing"));
    }
}
