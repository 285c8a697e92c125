use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use serde::Serialize;
use tracing::debug;
use watchlink_controller::{WatchConfig, CONFIG_FILE_NAME};
use watchlink_store::{FileBackend, LinkStore};
use watchlink_types::{Coordinate, Link};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let dir = cli.data_dir.as_path();
    match cli.command {
        Command::Init(_) => cmd_init(dir),
        Command::Status(_) => cmd_status(dir, &cli.format),
        Command::List(args) => cmd_list(dir, args, &cli.format),
        Command::Verify(_) => cmd_verify(dir, &cli.format),
        Command::Unlink(args) => cmd_unlink(dir, args),
        Command::Config(_) => cmd_config(dir, &cli.format),
    }
}

/// The config in `dir`, or the defaults when no file has been written yet.
pub fn load_config(dir: &Path) -> anyhow::Result<WatchConfig> {
    let path = dir.join(CONFIG_FILE_NAME);
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(WatchConfig::default());
    }
    WatchConfig::load(&path).with_context(|| format!("reading {}", path.display()))
}

fn open_store(dir: &Path) -> anyhow::Result<LinkStore> {
    LinkStore::open(FileBackend::new(dir))
        .with_context(|| format!("loading link tables from {}", dir.display()))
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub data_dir: String,
    pub config_file: bool,
    pub enabled: bool,
    pub debug: bool,
    pub links: usize,
}

pub fn status_report(dir: &Path) -> anyhow::Result<StatusReport> {
    let config = load_config(dir)?;
    let store = open_store(dir)?;
    Ok(StatusReport {
        data_dir: dir.display().to_string(),
        config_file: dir.join(CONFIG_FILE_NAME).exists(),
        enabled: config.enabled,
        debug: config.debug,
        links: store.len(),
    })
}

/// Links sorted by observer, optionally restricted to one world.
pub fn list_links(dir: &Path, world: Option<&str>) -> anyhow::Result<Vec<Link>> {
    let links = open_store(dir)?.links();
    Ok(match world {
        Some(world) => links
            .into_iter()
            .filter(|link| link.observer.world() == world)
            .collect(),
        None => links,
    })
}

/// Remove the link keyed by the observer token and persist both tables.
pub fn unlink(dir: &Path, observer: &str) -> anyhow::Result<Link> {
    let observer: Coordinate = observer
        .parse()
        .with_context(|| format!("invalid observer {observer:?}"))?;
    let mut store = open_store(dir)?;
    // Checked first so an unknown observer leaves the tables untouched.
    if store.link(&observer).is_none() {
        bail!("no link for observer {observer}");
    }
    store
        .remove(&observer)?
        .with_context(|| format!("no link for observer {observer}"))
}

fn cmd_init(dir: &Path) -> anyhow::Result<()> {
    let path = dir.join(CONFIG_FILE_NAME);
    if WatchConfig::write_default(&path)? {
        println!("{} Wrote default config to {}", "✓".green().bold(), path.display().to_string().bold());
    } else {
        println!("Config already exists at {}", path.display().to_string().bold());
    }
    Ok(())
}

fn cmd_status(dir: &Path, format: &OutputFormat) -> anyhow::Result<()> {
    let report = status_report(dir)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            println!("Data directory: {}", report.data_dir.bold());
            if !report.config_file {
                println!("  {}", "no config.toml, defaults apply".dimmed());
            }
            let enabled = if report.enabled { "yes".green() } else { "no".red() };
            println!("  Enabled: {enabled}");
            println!("  Debug: {}", report.debug);
            println!("  Links: {}", report.links.to_string().bold());
        }
    }
    Ok(())
}

fn cmd_list(dir: &Path, args: ListArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let links = list_links(dir, args.world.as_deref())?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&links)?),
        OutputFormat::Text => {
            if links.is_empty() {
                println!("No links.");
            }
            for link in &links {
                println!(
                    "{} -> {} (sign {})",
                    link.observer.to_string().yellow(),
                    link.target.to_string().cyan(),
                    link.sign.to_string().dimmed()
                );
            }
        }
    }
    Ok(())
}

fn cmd_verify(dir: &Path, format: &OutputFormat) -> anyhow::Result<()> {
    let store = match open_store(dir) {
        Ok(store) => store,
        Err(e) => {
            if let OutputFormat::Text = format {
                println!("{} Link tables are inconsistent", "✗".red().bold());
            }
            return Err(e);
        }
    };
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({ "ok": true, "links": store.len() })
        ),
        OutputFormat::Text => {
            println!("{} Link tables verified", "✓".green().bold());
            println!("  Links: {}", store.len().to_string().bold());
            println!("  Signs and targets: {}", "same observers".green());
            println!("  Reverse lookups: {}", "unique".green());
        }
    }
    Ok(())
}

fn cmd_unlink(dir: &Path, args: UnlinkArgs) -> anyhow::Result<()> {
    let link = unlink(dir, &args.observer)?;
    println!("{} Removed {}", "✓".green().bold(), link.to_string().yellow());
    Ok(())
}

fn cmd_config(dir: &Path, format: &OutputFormat) -> anyhow::Result<()> {
    let config = load_config(dir)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
        OutputFormat::Text => print!("{}", config.to_toml()?),
    }
    Ok(())
}
