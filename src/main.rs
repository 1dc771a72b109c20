//! Light Notifier — Main Entry Point
//!
//! Hexagonal architecture: the binary builds the adapters, hands them to
//! the [`AppService`] and drives it on a single-threaded executor.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                    │
//! │                                                            │
//! │  HueBridge        SentryApi       JsonFileConfig           │
//! │  (DevicePort)     (IssueSource)   (ConfigPort)             │
//! │  HuePairing       LogEventSink    ReactorDelay             │
//! │  (PairingPort)    (EventSink)     (DelayPort)              │
//! │                                                            │
//! │  ──────────────── Port Trait Boundary ─────────────────    │
//! │                                                            │
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │  AppService: classify · resolve states · act         │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! └────────────────────────────────────────────────────────────┘
//! ```

use anyhow::{Context, Result, bail};
use clap::Parser;
use futures_lite::future::block_on;
use log::info;

use lightnotifier::adapters::config_file::JsonFileConfig;
use lightnotifier::adapters::hue::{HueBridge, HuePairing};
use lightnotifier::adapters::log_sink::LogEventSink;
use lightnotifier::adapters::sentry_api::SentryApi;
use lightnotifier::adapters::time::ReactorDelay;
use lightnotifier::app::commands::AppCommand;
use lightnotifier::app::ports::ConfigPort;
use lightnotifier::app::service::{AppService, EntryOutcome};
use lightnotifier::checkers::BuiltinCheckers;
use lightnotifier::cli::Cli;
use lightnotifier::provision::provision;

fn init_logger() {
    use env_logger::Builder;
    use std::io::Write;

    Builder::from_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {} {}] {}",
                buf.timestamp_millis(),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .filter_level(log::LevelFilter::Info)
        .parse_default_env() // RUST_LOG overrides
        .init();
}

type Service<'a> = AppService<'a, BuiltinCheckers<SentryApi>, HueBridge, ReactorDelay, LogEventSink>;

/// Load the config, build the bridge-facing adapters and hand the
/// assembled service to `f`.
fn with_service<R>(store: &JsonFileConfig, delay: &ReactorDelay, f: impl FnOnce(&Service<'_>) -> Result<R>) -> Result<R> {
    let config = store
        .load()
        .with_context(|| format!("loading {}", store.path().display()))?;
    let (host, username) = config.bridge_credentials()?;
    let bridge = HueBridge::new(host, username)?;
    let checkers = BuiltinCheckers::new(SentryApi::new()?);
    let sink = LogEventSink::new();

    let service = AppService::new(&config, &checkers, &bridge, delay, &sink);
    f(&service)
}

fn main() -> Result<()> {
    init_logger();
    let cli = Cli::parse();
    info!("Light Notifier v{}", env!("CARGO_PKG_VERSION"));

    let store = JsonFileConfig::new(&cli.config);
    let delay = ReactorDelay;

    match cli.app_command() {
        // Provisioning needs no config
        AppCommand::Init { bridge } => {
            let pairing = HuePairing::new()?;
            block_on(provision(&pairing, &delay, &store, bridge))
                .with_context(|| format!("init {}", store.path().display()))?;
            info!(
                "All done, please edit {} and enjoy your new light notifications",
                store.path().display()
            );
            Ok(())
        }
        AppCommand::Run(request) => with_service(&store, &delay, |service| {
            let report = block_on(service.run(&request))?;
            if request.module_only {
                for entry in &report.entries {
                    if let Ok(EntryOutcome::Classified(c)) = &entry.result {
                        println!("{}: {}", entry.key, serde_json::to_string_pretty(c)?);
                    }
                }
            }
            if report.failed() > 0 {
                bail!("{} of {} checker(s) failed", report.failed(), report.entries.len());
            }
            Ok(())
        }),
        AppCommand::Watch { request, interval_secs } => with_service(&store, &delay, |service| -> Result<()> {
            match block_on(service.run_every(&request, interval_secs))? {}
        }),
        AppCommand::Ping(light) => with_service(&store, &delay, |service| {
            block_on(service.ping(&light))?;
            Ok(())
        }),
        AppCommand::PingAll => with_service(&store, &delay, |service| {
            block_on(service.ping_all())?;
            Ok(())
        }),
        AppCommand::Party => with_service(&store, &delay, |service| {
            block_on(service.party(&mut rand::thread_rng()))?;
            Ok(())
        }),
    }
}
