use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "watchlink",
    about = "Inspect and maintain a watchlink data directory",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Directory holding config.toml, signs.txt and targets.txt
    #[arg(long, global = true, default_value = ".")]
    pub data_dir: PathBuf,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Write the default config.toml
    Init(InitArgs),
    /// Show config flags and the number of links
    Status(StatusArgs),
    /// List every link
    List(ListArgs),
    /// Load the link tables with full integrity checks
    Verify(VerifyArgs),
    /// Remove the link of one observer
    Unlink(UnlinkArgs),
    /// Print the effective config
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct InitArgs {}

#[derive(Args)]
pub struct StatusArgs {}

#[derive(Args)]
pub struct ListArgs {
    /// Only links in this world
    #[arg(short, long)]
    pub world: Option<String>,
}

#[derive(Args)]
pub struct VerifyArgs {}

#[derive(Args)]
pub struct UnlinkArgs {
    /// Observer coordinate as world:x:y:z
    pub observer: String,
}

#[derive(Args)]
pub struct ConfigArgs {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_init() {
        let cli = Cli::try_parse_from(["watchlink", "init"]).unwrap();
        assert!(matches!(cli.command, Command::Init(_)));
        assert_eq!(cli.data_dir, PathBuf::from("."));
    }

    #[test]
    fn parse_data_dir_after_command() {
        let cli = Cli::try_parse_from(["watchlink", "status", "--data-dir", "/srv/mc/plugins/watchlink"])
            .unwrap();
        assert!(matches!(cli.command, Command::Status(_)));
        assert_eq!(cli.data_dir, PathBuf::from("/srv/mc/plugins/watchlink"));
    }

    #[test]
    fn parse_list_world() {
        let cli = Cli::try_parse_from(["watchlink", "list", "-w", "world_nether"]).unwrap();
        if let Command::List(args) = cli.command {
            assert_eq!(args.world, Some("world_nether".into()));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_unlink() {
        let cli = Cli::try_parse_from(["watchlink", "unlink", "world:0:64:-3"]).unwrap();
        if let Command::Unlink(args) = cli.command {
            assert_eq!(args.observer, "world:0:64:-3");
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn unlink_requires_observer() {
        assert!(Cli::try_parse_from(["watchlink", "unlink"]).is_err());
    }

    #[test]
    fn parse_verify() {
        let cli = Cli::try_parse_from(["watchlink", "verify"]).unwrap();
        assert!(matches!(cli.command, Command::Verify(_)));
    }

    #[test]
    fn parse_verbose() {
        let cli = Cli::try_parse_from(["watchlink", "--verbose", "config"]).unwrap();
        assert!(cli.verbose);
    }

    #[test]
    fn parse_json_format() {
        let cli = Cli::try_parse_from(["watchlink", "--format", "json", "list"]).unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
    }
}
