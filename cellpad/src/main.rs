//! # cellpad
//!
//! Terminal entry point: parses flags, sets up file logging and runs an
//! editor session on the tty, or headless when given a key script.

mod cli;

use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use services_editor_tty::{
    CrosstermTerminal, Editor, EditorError, EditorResult, FsEditorIo, InputScript, IoError,
    ScriptedTerminal,
};

use crate::cli::Cli;

/// Terminal size assumed for headless runs
const SCRIPT_SIZE: (u16, u16) = (80, 24);

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = setup_logging(&cli.log_path(), cli.log_level()) {
        eprintln!("Error: failed to set up logging: {}", err);
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            eprintln!("Error: {}", err);
            ExitCode::FAILURE
        }
    }
}

/// Log to a file so output never lands on the editor screen
fn setup_logging(path: &Path, level: log::LevelFilter) -> Result<(), fern::InitError> {
    fern::Dispatch::new()
        .level(level)
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} {} [{}] {}",
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
                record.target(),
                record.level(),
                message
            ))
        })
        .chain(fern::log_file(path)?)
        .apply()?;
    Ok(())
}

fn run(cli: &Cli) -> EditorResult<()> {
    let config = cli.editor_config()?;
    let mut io = FsEditorIo;
    let mut editor = Editor::new(&config);

    if let Some(path) = &cli.file {
        editor.open_initial(&mut io, path)?;
    }

    match &cli.script {
        Some(script_path) => {
            let text = fs::read_to_string(script_path)
                .map_err(|err| IoError::from_io(script_path, err))?;
            let script = InputScript::from_text(&text)?;
            log::info!(
                "replaying {} inputs from {}",
                script.remaining(),
                script_path.display()
            );

            let mut term = ScriptedTerminal::new(script, SCRIPT_SIZE.0, SCRIPT_SIZE.1);
            let content = editor.run(&mut term, &mut io)?;

            let mut stdout = io::stdout().lock();
            stdout
                .write_all(&content)
                .and_then(|()| stdout.flush())
                .map_err(|err| EditorError::Io(IoError::from_io(Path::new("<stdout>"), err)))?;
        }
        None => {
            let mut term = CrosstermTerminal::new()?;
            editor.run(&mut term, &mut io)?;
        }
    }

    Ok(())
}
