// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

use std::{error::Error, ffi::OsString, path::PathBuf};

use clap::{ArgMatches, Command, ValueHint, arg, builder::styling, crate_version, value_parser};
use colored::Colorize;
use futures::{FutureExt, future::BoxFuture};
use kcal_core::{APP_NAME, Kcal};
use tracing_subscriber::EnvFilter;

use crate::cmd_dashboard::CmdDashboard;
use crate::cmd_eat::CmdEat;
use crate::cmd_export::CmdExport;
use crate::cmd_generate_completion::CmdGenerateCompletion;
use crate::cmd_item::{CmdItemDelete, CmdItemEdit, CmdItemList, CmdItemNew, CmdItemShow};
use crate::cmd_settings::{CmdSettingsSet, CmdSettingsShow};
use crate::cmd_sync::CmdSync;
use crate::config::{Config, parse_config};

/// Run the kcal command-line interface.
pub async fn run() -> Result<(), Box<dyn Error>> {
    init_tracing();
    match Cli::parse() {
        Ok(cli) => {
            if let Err(e) = cli.run().await {
                println!("{} {}", "Error:".red(), e);
            }
        }
        Err(e) => println!("{} {}", "Error:".red(), e),
    };
    Ok(())
}

/// Logs go to stderr, filtered by `RUST_LOG`, warnings only by default.
fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Command-line interface
#[derive(Debug)]
pub struct Cli {
    /// Path to the configuration file
    pub config: Option<PathBuf>,

    /// The command to execute
    pub command: Commands,
}

impl Cli {
    /// Create the command-line interface
    pub fn command() -> Command {
        const STYLES: styling::Styles = styling::Styles::styled()
            .header(styling::AnsiColor::Green.on_default().bold())
            .usage(styling::AnsiColor::Green.on_default().bold())
            .literal(styling::AnsiColor::Blue.on_default().bold())
            .placeholder(styling::AnsiColor::Cyan.on_default());

        Command::new(APP_NAME)
            .about("Count calories, keep your food items in sync across devices.")
            .author("Zexin Yuan <aim@yzx9.xyz>")
            .version(crate_version!())
            .styles(STYLES)
            .subcommand_required(false) // allow default to dashboard
            .arg_required_else_help(false)
            .arg(
                arg!(-c --config [CONFIG] "Path to the configuration file")
                    .long_help(
                        "\
Path to the configuration file. Defaults to $XDG_CONFIG_HOME/kcal/config.toml on Linux and MacOS, \
%LOCALAPPDATA%/kcal/config.toml on Windows.",
                    )
                    .value_parser(value_parser!(PathBuf))
                    .value_hint(ValueHint::FilePath),
            )
            .subcommand(CmdDashboard::command())
            .subcommand(CmdSync::command())
            .subcommand(
                Command::new("item")
                    .alias("i")
                    .about("Manage your food items")
                    .arg_required_else_help(true)
                    .subcommand_required(true)
                    .subcommand(CmdItemList::command())
                    .subcommand(CmdItemShow::command())
                    .subcommand(CmdItemNew::command())
                    .subcommand(CmdItemEdit::command())
                    .subcommand(CmdItemDelete::command()),
            )
            .subcommand(CmdEat::command())
            .subcommand(
                Command::new("settings")
                    .about("Show or change your settings")
                    .subcommand_required(false) // allow default to show
                    .subcommand(CmdSettingsShow::command())
                    .subcommand(CmdSettingsSet::command()),
            )
            .subcommand(CmdExport::command())
            .subcommand(CmdGenerateCompletion::command())
    }

    /// Parse the command-line arguments
    pub fn parse() -> Result<Self, Box<dyn Error>> {
        let commands = Self::command();
        let matches = commands.get_matches();
        Self::from(matches)
    }

    /// Parse the specified arguments
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, Box<dyn Error>>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let commands = Self::command();
        let matches = commands.try_get_matches_from(args)?;
        Self::from(matches)
    }

    /// Create a CLI instance from the `ArgMatches`
    pub fn from(matches: ArgMatches) -> Result<Self, Box<dyn Error>> {
        use Commands::*;
        let command = match matches.subcommand() {
            Some((CmdDashboard::NAME, matches)) => Dashboard(CmdDashboard::from(matches)),
            Some((CmdSync::NAME, matches)) => Sync(CmdSync::from(matches)),
            Some(("item", matches)) => match matches.subcommand() {
                Some((CmdItemList::NAME, matches)) => ItemList(CmdItemList::from(matches)),
                Some((CmdItemShow::NAME, matches)) => ItemShow(CmdItemShow::from(matches)),
                Some((CmdItemNew::NAME, matches)) => ItemNew(CmdItemNew::from(matches)?),
                Some((CmdItemEdit::NAME, matches)) => ItemEdit(CmdItemEdit::from(matches)),
                Some((CmdItemDelete::NAME, matches)) => ItemDelete(CmdItemDelete::from(matches)),
                _ => unreachable!(),
            },
            Some((CmdEat::NAME, matches)) => Eat(CmdEat::from(matches)),
            Some(("settings", matches)) => match matches.subcommand() {
                Some((CmdSettingsSet::NAME, matches)) => SettingsSet(CmdSettingsSet::from(matches)),
                Some((CmdSettingsShow::NAME, matches)) => {
                    SettingsShow(CmdSettingsShow::from(matches))
                }
                None => SettingsShow(CmdSettingsShow::default()),
                _ => unreachable!(),
            },
            Some((CmdExport::NAME, matches)) => Export(CmdExport::from(matches)),
            Some((CmdGenerateCompletion::NAME, matches)) => {
                GenerateCompletion(CmdGenerateCompletion::from(matches))
            }
            None => Dashboard(CmdDashboard::default()),
            _ => unreachable!(),
        };

        let config = matches.get_one("config").cloned();
        Ok(Cli { config, command })
    }

    /// Run the command
    pub async fn run(self) -> Result<(), Box<dyn Error>> {
        self.command.run(self.config).await
    }
}

/// The commands available in the CLI
#[derive(Debug, Clone)]
pub enum Commands {
    /// Show today's summary
    Dashboard(CmdDashboard),

    /// Fetch remote item changes
    Sync(CmdSync),

    /// List cached items
    ItemList(CmdItemList),

    /// Read an item from the remote store
    ItemShow(CmdItemShow),

    /// Add a new item
    ItemNew(CmdItemNew),

    /// Edit an item
    ItemEdit(CmdItemEdit),

    /// Delete items
    ItemDelete(CmdItemDelete),

    /// Log a consumption
    Eat(CmdEat),

    /// Show the settings
    SettingsShow(CmdSettingsShow),

    /// Change the settings
    SettingsSet(CmdSettingsSet),

    /// Export data as JSON
    Export(CmdExport),

    /// Generate shell completion
    GenerateCompletion(CmdGenerateCompletion),
}

impl Commands {
    /// Run the command with the given configuration
    #[rustfmt::skip]
    pub async fn run(self, config: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
        use Commands::*;
        match self {
            Dashboard(a)    => Self::run_with(config, |x, _| a.run(x).boxed()).await,
            Sync(a)         => Self::run_with(config, |x, _| a.run(x).boxed()).await,
            ItemList(a)     => Self::run_with(config, |x, c| a.run(x, c).boxed()).await,
            ItemShow(a)     => Self::run_with(config, |x, _| a.run(x).boxed()).await,
            ItemNew(a)      => Self::run_with(config, |x, _| a.run(x).boxed()).await,
            ItemEdit(a)     => Self::run_with(config, |x, _| a.run(x).boxed()).await,
            ItemDelete(a)   => Self::run_with(config, |x, _| a.run(x).boxed()).await,
            Eat(a)          => Self::run_with(config, |x, _| a.run(x).boxed()).await,
            SettingsShow(a) => Self::run_with(config, |x, _| a.run(x).boxed()).await,
            SettingsSet(a)  => Self::run_with(config, |x, _| a.run(x).boxed()).await,
            Export(a)       => Self::run_with(config, |x, _| a.run(x).boxed()).await,
            GenerateCompletion(a) => a.run(),
        }
    }

    async fn run_with<F>(config: Option<PathBuf>, f: F) -> Result<(), Box<dyn Error>>
    where
        F: for<'a> FnOnce(&'a Kcal, &'a Config) -> BoxFuture<'a, Result<(), Box<dyn Error>>>,
    {
        tracing::debug!("parsing configuration...");
        let (core_config, config) = parse_config(config).await?;
        let kcal = Kcal::new(core_config).await?;

        let result = f(&kcal, &config).await;

        kcal.close().await?;
        result
    }
}
