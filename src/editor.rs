use std::env;
use std::path::Path;

use crate::error::Result;
use crate::launcher::{Launcher, Program};

/// Environment variable naming the user's preferred editor.
pub const EDITOR_ENV: &str = "EDITOR";

const DEFAULT_EDITOR: &str = if cfg!(windows) { "notepad.exe" } else { "vi" };

/// The program a scratch file is handed to for interactive editing.
#[derive(Debug)]
pub struct Editor {
    launcher: Box<dyn Launcher>,
}

impl Editor {
    /// Creates an editor for `name`, falling back to [`default_name`] when
    /// `name` is empty.
    pub fn new(name: impl Into<String>) -> Self {
        let mut name = name.into();
        if name.is_empty() {
            name = default_name();
        }
        Self::with_launcher(Program::new(name))
    }

    pub fn with_launcher(launcher: impl Launcher + 'static) -> Self {
        Self {
            launcher: Box::new(launcher),
        }
    }

    pub fn program(&self) -> &str {
        self.launcher.program()
    }

    pub(crate) fn launch(&self, path: &Path) -> Result<()> {
        self.launcher.launch(path)
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new("")
    }
}

/// `$EDITOR` when it is set to a non-empty value, otherwise `notepad.exe` on
/// Windows and `vi` everywhere else.
pub fn default_name() -> String {
    resolve_name(env::var(EDITOR_ENV).ok().as_deref())
}

fn resolve_name(configured: Option<&str>) -> String {
    match configured {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => DEFAULT_EDITOR.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launcher::NoopLauncher;
    use serial_test::serial;

    #[test]
    fn unset_variable_uses_platform_default() {
        let expected = if cfg!(windows) { "notepad.exe" } else { "vi" };
        assert_eq!(resolve_name(None), expected);
        assert_eq!(resolve_name(Some("")), expected);
    }

    #[test]
    fn configured_value_is_used_verbatim() {
        assert_eq!(resolve_name(Some("test")), "test");
        assert_eq!(resolve_name(Some("code --wait")), "code --wait");
    }

    #[test]
    fn explicit_name_skips_resolution() {
        assert_eq!(Editor::new("test").program(), "test");
    }

    #[test]
    fn injected_launcher_is_used() {
        assert_eq!(Editor::with_launcher(NoopLauncher).program(), "noop");
    }

    #[test]
    #[serial]
    fn empty_name_reads_editor_variable() {
        unsafe {
            env::set_var(EDITOR_ENV, "test");
        }
        let configured = Editor::new("");
        unsafe {
            env::remove_var(EDITOR_ENV);
        }
        let fallback = Editor::default();

        assert_eq!(configured.program(), "test");
        assert_eq!(fallback.program(), DEFAULT_EDITOR);
    }

    #[cfg(not(windows))]
    #[test]
    #[serial]
    fn default_name_is_vi_without_variable() {
        unsafe {
            env::set_var(EDITOR_ENV, "");
        }
        let name = default_name();
        unsafe {
            env::remove_var(EDITOR_ENV);
        }
        assert_eq!(name, "vi");
    }
}
