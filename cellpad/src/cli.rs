use std::path::PathBuf;

use clap::{ArgAction, Parser};
use services_editor_tty::{ConfigError, EditorConfig};

#[derive(Debug, Parser)]
#[command(
    name = "cellpad",
    about = "Small modal terminal text editor",
    version
)]
pub(crate) struct Cli {
    #[arg(help = "File to edit; created on first save if it does not exist")]
    pub(crate) file: Option<PathBuf>,

    #[arg(long, value_name = "PATH", help = "JSON file with editor settings")]
    pub(crate) config: Option<PathBuf>,

    #[arg(
        long = "tab-width",
        value_name = "N",
        help = "Columns a tab expands to (overrides the config file)"
    )]
    pub(crate) tab_width: Option<usize>,

    #[arg(
        long,
        value_name = "PATH",
        help = "Replay a key script without a terminal and print the resulting buffer"
    )]
    pub(crate) script: Option<PathBuf>,

    #[arg(
        long = "log-file",
        value_name = "PATH",
        help = "Where to write the log (defaults to cellpad.log in the temp dir)"
    )]
    pub(crate) log_file: Option<PathBuf>,

    #[arg(
        short,
        long,
        action = ArgAction::Count,
        help = "Raise log verbosity (-v info, -vv debug, -vvv trace)"
    )]
    pub(crate) verbose: u8,
}

impl Cli {
    /// Defaults, then the config file, then command-line overrides
    pub(crate) fn editor_config(&self) -> Result<EditorConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => EditorConfig::load(path)?,
            None => EditorConfig::default(),
        };
        if let Some(width) = self.tab_width {
            config.tab_width = width;
        }
        config.validate()?;
        Ok(config)
    }

    pub(crate) fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("cellpad.log"))
    }

    pub(crate) fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_no_arguments() {
        let cli = Cli::try_parse_from(["cellpad"]).unwrap();
        assert_eq!(cli.file, None);
        assert_eq!(cli.verbose, 0);
        assert_eq!(cli.log_level(), log::LevelFilter::Warn);
        assert_eq!(cli.log_path(), std::env::temp_dir().join("cellpad.log"));
        assert_eq!(cli.editor_config().unwrap(), EditorConfig::default());
    }

    #[test]
    fn test_all_flags() {
        let cli = Cli::try_parse_from([
            "cellpad",
            "notes.txt",
            "--tab-width",
            "6",
            "--script",
            "keys.txt",
            "--log-file",
            "/tmp/x.log",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.file, Some(PathBuf::from("notes.txt")));
        assert_eq!(cli.script, Some(PathBuf::from("keys.txt")));
        assert_eq!(cli.log_path(), PathBuf::from("/tmp/x.log"));
        assert_eq!(cli.log_level(), log::LevelFilter::Debug);
        assert_eq!(cli.editor_config().unwrap().tab_width, 6);
    }

    #[test]
    fn test_verbosity_ladder_tops_out_at_trace() {
        let level = |args: &[&str]| Cli::try_parse_from(args).unwrap().log_level();
        assert_eq!(level(&["cellpad", "-v"]), log::LevelFilter::Info);
        assert_eq!(level(&["cellpad", "-vvv"]), log::LevelFilter::Trace);
        assert_eq!(level(&["cellpad", "-vvvvv"]), log::LevelFilter::Trace);
    }

    #[test]
    fn test_flag_overrides_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "tab_width": 8, "clipboard_capacity": 16 }}"#).unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = Cli::try_parse_from(["cellpad", "--config", &path, "--tab-width", "2"]).unwrap();
        let config = cli.editor_config().unwrap();
        assert_eq!(config.tab_width, 2);
        assert_eq!(config.clipboard_capacity, 16);
    }

    #[test]
    fn test_zero_tab_width_rejected() {
        let cli = Cli::try_parse_from(["cellpad", "--tab-width", "0"]).unwrap();
        assert!(matches!(cli.editor_config(), Err(ConfigError::Zero("tab_width"))));
    }

    #[test]
    fn test_bad_tab_width_is_parse_error() {
        assert!(Cli::try_parse_from(["cellpad", "--tab-width", "wide"]).is_err());
        assert!(Cli::try_parse_from(["cellpad", "a.txt", "b.txt"]).is_err());
    }
}
