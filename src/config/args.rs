// Command-line flags
//
// Every flag is optional; a flag that is present replaces the value from the
// config file and the environment.

use clap::Parser;
use std::path::PathBuf;

use super::Overrides;
use crate::position::Placement;

#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(
    name = "overlay-clock",
    version,
    about = "Paint the current time onto the X11 desktop background"
)]
pub struct CliArgs {
    /// strftime-style time format
    #[arg(short = 't', long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// Xft font descriptor, e.g. "sans-9"
    #[arg(short = 'f', long, value_name = "FONT")]
    pub font: Option<String>,

    /// X color name or "#rrggbb"
    #[arg(short = 'c', long, value_name = "COLOR")]
    pub color: Option<String>,

    /// Offset "X,Y"; a negative value measures from the right/bottom edge
    #[arg(short = 'p', long, value_name = "X,Y", allow_hyphen_values = true)]
    pub position: Option<Placement>,

    /// Update interval in seconds
    #[arg(short = 'u', long, value_name = "SECONDS")]
    pub update: Option<u64>,

    /// Read settings from FILE instead of the default location
    #[arg(short = 'C', long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

impl CliArgs {
    /// The flags that replace configured values
    pub fn overrides(&self) -> Overrides {
        Overrides {
            format: self.format.clone(),
            font: self.font.clone(),
            color: self.color.clone(),
            position: self.position,
            update: self.update,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<CliArgs, clap::Error> {
        CliArgs::try_parse_from(std::iter::once("overlay-clock").chain(args.iter().copied()))
    }

    #[test]
    fn test_no_flags() {
        let cli = parse(&[]).unwrap();
        assert_eq!(cli, CliArgs::default());
        assert!(cli.overrides().is_empty());
    }

    #[test]
    fn test_short_and_long_flags() {
        let cli = parse(&[
            "-t", "%R", "--font", "mono-12", "-c", "red", "--update=5", "-C", "/tmp/clock.toml",
        ])
        .unwrap();

        assert_eq!(cli.format.as_deref(), Some("%R"));
        assert_eq!(cli.font.as_deref(), Some("mono-12"));
        assert_eq!(cli.color.as_deref(), Some("red"));
        assert_eq!(cli.update, Some(5));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/clock.toml")));
    }

    #[test]
    fn test_negative_position_value() {
        let cli = parse(&["-p", "-20,-20"]).unwrap();
        assert_eq!(cli.position, Some(Placement::new(-20, -20)));

        let cli = parse(&["--position", "-5,10", "-u", "2"]).unwrap();
        assert_eq!(cli.position, Some(Placement::new(-5, 10)));
        assert_eq!(cli.update, Some(2));
    }

    #[test]
    fn test_overrides_carry_flags() {
        let overrides = parse(&["-f", "serif-20", "-p", "1,2"]).unwrap().overrides();
        assert_eq!(overrides.font.as_deref(), Some("serif-20"));
        assert_eq!(overrides.position, Some(Placement::new(1, 2)));
        assert_eq!(overrides.format, None);
        assert_eq!(overrides.update, None);
    }

    #[test]
    fn test_usage_errors() {
        assert_eq!(parse(&["-x"]).unwrap_err().kind(), ErrorKind::UnknownArgument);
        assert!(parse(&["-u"]).is_err());
        assert_eq!(parse(&["-u", "soon"]).unwrap_err().kind(), ErrorKind::ValueValidation);
        assert_eq!(parse(&["-p", "5"]).unwrap_err().kind(), ErrorKind::ValueValidation);
        assert!(parse(&["stray"]).is_err());
    }

    #[test]
    fn test_help_and_version() {
        assert_eq!(parse(&["--help"]).unwrap_err().kind(), ErrorKind::DisplayHelp);
        assert_eq!(parse(&["-V"]).unwrap_err().kind(), ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_command_definition() {
        use clap::CommandFactory;
        CliArgs::command().debug_assert();
    }
}
