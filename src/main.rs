use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, ValueHint};
use is_terminal::IsTerminal;
use serde::Serialize;
use serde_json::{Map as JsonMap, Value as JsonValue};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use tempedit::{Editor, ScratchFile, Verdict};

mod data;
mod diff;
mod logging;

const LOG_ENV: &str = "TEMPEDIT_LOG";

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();
    run(cli)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let editor = Editor::new(cli.editor.clone().unwrap_or_default());
    let template = load_template(&cli)?;
    let dir = cli.dir.clone().unwrap_or_default();
    let mut file = ScratchFile::new_in(&dir, &cli.prefix).context("creating scratch file")?;

    let outcome = edit_session(&mut file, &editor, &cli, template).map(|verdict| Outcome {
        path: file.path().to_path_buf(),
        verdict,
        original: String::from_utf8_lossy(file.previous()).into_owned(),
        content: file.text().into_owned(),
    });
    file.clean();

    report(&cli, editor.program(), &outcome?)
}

struct Outcome {
    path: PathBuf,
    verdict: Verdict,
    original: String,
    content: String,
}

#[derive(Serialize)]
struct SessionReport<'a> {
    path: &'a Path,
    editor: &'a str,
    verdict: Verdict,
    content: &'a str,
}

fn load_template(cli: &Cli) -> Result<Option<(String, JsonValue)>> {
    let Some(path) = &cli.template else {
        return Ok(None);
    };
    let source = fs::read_to_string(path)
        .with_context(|| format!("reading template {}", path.display()))?;
    let data = match &cli.data {
        Some(data_path) => data::load_data(data_path)?,
        None => JsonValue::Object(JsonMap::new()),
    };
    Ok(Some((source, data)))
}

fn edit_session(
    file: &mut ScratchFile,
    editor: &Editor,
    cli: &Cli,
    template: Option<(String, JsonValue)>,
) -> Result<Verdict> {
    for text in &cli.text {
        file.write(text).context("writing initial text")?;
    }
    if let Some((source, data)) = template {
        file.render_template(&source, data)
            .context("rendering template")?;
    }

    warn_if_not_interactive();
    debug!(editor = editor.program(), path = %file.path().display(), "opening scratch file");
    file.open_with(editor)
        .with_context(|| format!("editing with {}", editor.program()))?;
    Ok(file.verdict())
}

fn warn_if_not_interactive() {
    if !cfg!(windows) && !io::stdin().is_terminal() {
        warn!("stdin is not a terminal; the editor may not receive keyboard input");
    }
}

fn report(cli: &Cli, editor: &str, outcome: &Outcome) -> Result<()> {
    if cli.session_log {
        if let Err(err) = record_session(cli, editor, outcome) {
            warn!("unable to record session: {err:#}");
        }
    }

    if cli.diff {
        eprint!(
            "{}",
            diff::render_diff(&outcome.original, &outcome.content, cli.context)
        );
    }

    let accepted = outcome.verdict == Verdict::Changed || cli.allow_unchanged;
    if cli.json {
        let report = SessionReport {
            path: &outcome.path,
            editor,
            verdict: outcome.verdict,
            content: &outcome.content,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if accepted {
        let mut stdout = io::stdout().lock();
        stdout.write_all(outcome.content.as_bytes())?;
        stdout.flush()?;
    }

    if !accepted {
        bail!("scratch file {}; nothing to do", outcome.verdict);
    }
    Ok(())
}

fn record_session(cli: &Cli, editor: &str, outcome: &Outcome) -> Result<()> {
    let log = logging::SessionLog::in_dir(Path::new(logging::LOG_DIR), cli.session_log_limit)?;
    log.append(&logging::SessionRecord::new(
        &outcome.path,
        editor,
        outcome.verdict,
        &outcome.content,
    ))
}

#[derive(Debug, Parser)]
#[command(
    name = "tempedit",
    version,
    about = "Collect text from your editor through a scratch file"
)]
struct Cli {
    #[arg(long, value_name = "DIR", value_hint = ValueHint::DirPath)]
    dir: Option<PathBuf>,
    #[arg(long, value_name = "PREFIX", default_value = "tempedit-")]
    prefix: String,
    #[arg(long, value_name = "PROGRAM")]
    editor: Option<String>,
    #[arg(long = "text", value_name = "TEXT")]
    text: Vec<String>,
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    template: Option<PathBuf>,
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath, requires = "template")]
    data: Option<PathBuf>,
    #[arg(long, action = ArgAction::SetTrue)]
    diff: bool,
    #[arg(long, default_value_t = 3)]
    context: usize,
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
    #[arg(long = "allow-unchanged", action = ArgAction::SetTrue)]
    allow_unchanged: bool,
    #[arg(long = "session-log", action = ArgAction::SetTrue)]
    session_log: bool,
    #[arg(long = "session-log-limit", value_name = "N", default_value_t = logging::DEFAULT_CAPACITY)]
    session_log_limit: usize,
}
