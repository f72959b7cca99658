//! Command-line arguments.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for colmap-neural.
#[derive(Parser, Debug, Clone)]
#[command(name = "colmap-neural")]
#[command(about = "COLMAP reconstruction with optional neural feature extraction, matching and densification")]
#[command(version)]
pub struct CliArgs {
    /// Configuration file (INI format)
    pub config: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_positional() {
        let args = CliArgs::try_parse_from(["colmap-neural", "scene.ini"]).unwrap();
        assert_eq!(args.config, PathBuf::from("scene.ini"));
    }

    #[test]
    fn test_missing_config_is_an_error() {
        let err = CliArgs::try_parse_from(["colmap-neural"]).unwrap_err();
        assert!(err.use_stderr());
    }

    #[test]
    fn test_extra_argument_is_an_error() {
        assert!(CliArgs::try_parse_from(["colmap-neural", "a.ini", "b.ini"]).is_err());
    }

    #[test]
    fn test_help_is_not_an_error_exit() {
        let err = CliArgs::try_parse_from(["colmap-neural", "--help"]).unwrap_err();
        assert!(!err.use_stderr());
    }
}
