use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::app::commands::{AppCommand, RunRequest};
use crate::drivers::light_state::LightId;

/// Light Notifier - turn status sources into Hue light signals
#[derive(Parser, Debug)]
#[command(name = "lightnotifier")]
#[command(about = "Polls status sources and drives Hue lights into state-specific patterns")]
#[command(version)]
pub struct Cli {
    /// Path to the JSON configuration document
    #[arg(short, long, global = true, default_value = "config.json")]
    pub config: PathBuf,

    /// Defaults to `run` when omitted
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the configured checkers and signal their state
    Run {
        /// Only run the checker with this key
        #[arg(long)]
        check: Option<String>,

        /// Print the checker result, do not touch any light
        #[arg(long)]
        module_only: bool,

        /// Skip the checker module and dispatch this state
        #[arg(long)]
        state: Option<String>,

        /// Repeat the run every SECS seconds
        #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
        interval: Option<u64>,
    },
    /// Flash one light so it can be located
    Ping {
        /// Light id on the bridge
        bulb: String,
    },
    /// Flash every light, one after another
    #[command(alias = "pingAll")]
    PingAll,
    /// Random colours on every light
    Party,
    /// Pair with a bridge and write a starter configuration
    Init {
        /// Bridge address; discovered on the local network when omitted
        #[arg(long)]
        bridge: Option<String>,
    },
}

impl Cli {
    pub fn app_command(&self) -> AppCommand {
        match &self.command {
            None => AppCommand::Run(RunRequest::default()),
            Some(Commands::Run {
                check,
                module_only,
                state,
                interval,
            }) => {
                let request = RunRequest {
                    check: check.clone(),
                    module_only: *module_only,
                    state: state.clone(),
                };
                match interval {
                    Some(secs) => AppCommand::Watch {
                        request,
                        interval_secs: *secs,
                    },
                    None => AppCommand::Run(request),
                }
            }
            Some(Commands::Ping { bulb }) => AppCommand::Ping(LightId::new(bulb.as_str())),
            Some(Commands::PingAll) => AppCommand::PingAll,
            Some(Commands::Party) => AppCommand::Party,
            Some(Commands::Init { bridge }) => AppCommand::Init { bridge: bridge.clone() },
        }
    }
}
