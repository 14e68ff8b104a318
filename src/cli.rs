use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "mattaview", about = "Camera preview and nozzle calibration for the Matta printer add-on")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Add-on web server, overrides config and MATTAVIEW_BASE_URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Home all printer axes
    Home,
    /// Show the printer state text
    State,
    /// Show printer temperatures
    Temps,
    /// Check the stored auth token against the cloud
    TestToken,
    /// Show stored auth token and terminal commands
    Values,
    /// Store auth token and terminal commands
    SaveValues(SaveValuesArgs),
    /// Show camera flip/rotate settings
    Settings,
    /// Fetch a snapshot and print its preview layout
    Snapshot(SnapshotArgs),
    /// Fetch a snapshot and map a click on it to a nozzle coordinate
    Pick(PickArgs),
    /// Map a click to a nozzle coordinate without contacting the printer
    Map(MapArgs),
    /// Compute a preview layout without contacting the printer
    Layout(LayoutArgs),
    /// Write a default config.toml
    InitConfig(InitConfigArgs),
}

#[derive(Debug, Args)]
pub struct SaveValuesArgs {
    #[arg(long)]
    pub auth_token: String,
    /// Repeat for each command
    #[arg(long = "terminal-cmd")]
    pub terminal_cmds: Vec<String>,
}

#[derive(Debug, Args)]
pub struct SnapshotArgs {
    /// Write the JPEG here
    #[arg(short, long)]
    pub out: Option<PathBuf>,
    /// Preview container width in px
    #[arg(long)]
    pub container_width: Option<f64>,
}

#[derive(Debug, Args)]
pub struct PickArgs {
    /// Click x relative to the preview image, px
    #[arg(long, allow_negative_numbers = true)]
    pub x: f64,
    /// Click y relative to the preview image, px
    #[arg(long, allow_negative_numbers = true)]
    pub y: f64,
    #[arg(long)]
    pub container_width: Option<f64>,
    /// Displayed image width, defaults to the computed layout
    #[arg(long, requires = "displayed_height")]
    pub displayed_width: Option<f64>,
    #[arg(long, requires = "displayed_width")]
    pub displayed_height: Option<f64>,
    /// Store the result as the nozzle tip coordinate
    #[arg(long)]
    pub save: bool,
}

#[derive(Debug, Args)]
pub struct FlagArgs {
    #[arg(long)]
    pub flip_h: bool,
    #[arg(long)]
    pub flip_v: bool,
    #[arg(long)]
    pub rotate: bool,
}

#[derive(Debug, Args)]
pub struct MapArgs {
    #[arg(long, allow_negative_numbers = true)]
    pub x: f64,
    #[arg(long, allow_negative_numbers = true)]
    pub y: f64,
    #[arg(long)]
    pub displayed_width: f64,
    #[arg(long)]
    pub displayed_height: f64,
    #[arg(long)]
    pub natural_width: f64,
    #[arg(long)]
    pub natural_height: f64,
    #[command(flatten)]
    pub flags: FlagArgs,
}

#[derive(Debug, Args)]
pub struct LayoutArgs {
    #[arg(long)]
    pub natural_width: f64,
    #[arg(long)]
    pub natural_height: f64,
    #[arg(long)]
    pub container_width: f64,
    #[command(flatten)]
    pub flags: FlagArgs,
}

#[derive(Debug, Args)]
pub struct InitConfigArgs {
    /// Target file, defaults to ./config.toml
    #[arg(short, long)]
    pub path: Option<PathBuf>,
    /// Replace an existing file
    #[arg(long)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_pick() {
        let cli = Cli::parse_from([
            "mattaview", "--base-url", "http://p:5001", "pick", "--x", "250", "--y", "150",
            "--displayed-width", "400", "--displayed-height", "300", "--save",
        ]);
        assert_eq!(cli.base_url.as_deref(), Some("http://p:5001"));
        match cli.command {
            Command::Pick(args) => {
                assert_eq!((args.x, args.y), (250.0, 150.0));
                assert_eq!(args.displayed_width, Some(400.0));
                assert!(args.save);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn displayed_size_needs_both_axes() {
        let res = Cli::try_parse_from([
            "mattaview", "pick", "--x", "1", "--y", "1", "--displayed-width", "400",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn init_config_force_defaults_off() {
        let cli = Cli::parse_from(["mattaview", "init-config", "--path", "c.toml"]);
        match cli.command {
            Command::InitConfig(args) => assert!(!args.force),
            other => panic!("unexpected command: {other:?}"),
        }
        let cli = Cli::parse_from(["mattaview", "init-config", "--force"]);
        assert!(matches!(cli.command, Command::InitConfig(InitConfigArgs { force: true, .. })));
    }

    #[test]
    fn parses_repeated_terminal_cmds() {
        let cli = Cli::parse_from([
            "mattaview", "save-values", "--auth-token", "t", "--terminal-cmd", "G28",
            "--terminal-cmd", "M105",
        ]);
        match cli.command {
            Command::SaveValues(args) => assert_eq!(args.terminal_cmds, vec!["G28", "M105"]),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
