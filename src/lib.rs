//! Collect user input through an external editor.
//!
//! A [`ScratchFile`] stages text on disk, an [`Editor`] hands it to the
//! user's editor, and [`ScratchFile::is_changed`] reports whether they
//! actually edited anything.
//!
//! ```no_run
//! use tempedit::{Editor, ScratchFile};
//!
//! # fn main() -> tempedit::Result<()> {
//! let mut file = ScratchFile::new(".tmp.")?;
//! file.write("hello 世界\n")?;
//!
//! let edited = file.open_with(&Editor::new("vi")).and_then(|()| file.is_changed());
//! let input = file.text().into_owned();
//!
//! // The caller removes the file when it is no longer needed.
//! file.clean();
//!
//! match edited {
//!     Ok(_) => println!("{input}"),
//!     Err(err) if err.is_verdict() => eprintln!("nothing to do: {err}"),
//!     Err(err) => return Err(err),
//! }
//! # Ok(())
//! # }
//! ```

mod editor;
mod error;
mod launcher;
mod scratch;
mod template;

pub use editor::{EDITOR_ENV, Editor, default_name};
pub use error::{Error, Result};
pub use launcher::{Launcher, NoopLauncher, Program};
pub use scratch::{ScratchFile, Verdict, clean};
