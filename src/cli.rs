//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Command-line arguments for cityweather
#[derive(Parser, Debug)]
#[command(name = "cityweather")]
#[command(about = "Personal city weather dashboard")]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to the per-user config directory)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Mode>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Interactive terminal dashboard (default)
    Dashboard,
    /// Serve the catalog and weather HTTP API
    Serve {
        /// Port to listen on, overriding server.port
        #[arg(short, long)]
        port: Option<u16>,
    },
}

impl Cli {
    #[must_use]
    pub fn mode(&self) -> Mode {
        self.command.clone().unwrap_or(Mode::Dashboard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[rstest]
    #[case(&["cityweather"], Mode::Dashboard)]
    #[case(&["cityweather", "dashboard"], Mode::Dashboard)]
    #[case(&["cityweather", "serve"], Mode::Serve { port: None })]
    #[case(&["cityweather", "serve", "--port", "8080"], Mode::Serve { port: Some(8080) })]
    fn test_parse_modes(#[case] args: &[&str], #[case] expected: Mode) {
        let cli = Cli::try_parse_from(args).unwrap();
        assert_eq!(cli.mode(), expected);
        assert_eq!(cli.config, None);
    }

    #[test]
    fn test_config_flag_before_and_after_subcommand() {
        let cli = Cli::try_parse_from(["cityweather", "--config", "a.toml", "serve"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("a.toml")));

        let cli = Cli::try_parse_from(["cityweather", "dashboard", "-c", "b.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("b.toml")));
        assert_eq!(cli.mode(), Mode::Dashboard);
    }

    #[test]
    fn test_unknown_mode_is_rejected() {
        assert!(Cli::try_parse_from(["cityweather", "forecast"]).is_err());
    }

    #[test]
    fn test_help_is_available() {
        let err = Cli::try_parse_from(["cityweather", "--help"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }
}
