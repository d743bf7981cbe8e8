//! Command-line driver that runs the scan engine against a simulated world.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use scan_abi::{ScannerId, Signal};
use scan_engine::{ScanEngine, ScanSettings, ScanStore, SettingChange, TickSummary};
use scan_sim::{load_world, SimWorld};
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

/// Text rendering helpers used by the CLI commands.
mod render {
    use scan_abi::{ScannerId, Signal};
    use scan_engine::{AbortReason, ScanSettings, SettingName};

    /// `item@quality=count`.
    pub fn signal(signal: &Signal) -> String {
        format!(
            "{}@{}{}{}",
            signal.item, signal.quality, signal.comparator, signal.count
        )
    }

    pub fn report(tick: u64, scanner: ScannerId, signals: &[Signal]) -> String {
        let body = if signals.is_empty() {
            "(empty)".to_owned()
        } else {
            signals.iter().map(signal).collect::<Vec<_>>().join(" ")
        };
        format!("tick {tick} scanner {scanner}: {body}")
    }

    pub fn abort(tick: u64, scanner: ScannerId, reason: AbortReason) -> String {
        let reason = match reason {
            AbortReason::Unscannable => "no coverage",
            AbortReason::Invalidated => "device gone",
            AbortReason::Disabled => "output disabled",
        };
        format!("tick {tick} scanner {scanner} aborted: {reason}")
    }

    pub fn setting(settings: &ScanSettings, name: SettingName) -> String {
        format!("{name} = {}", settings.get(name))
    }

    /// One `name = value` line per setting.
    pub fn settings(settings: &ScanSettings) -> String {
        SettingName::ALL
            .into_iter()
            .map(|name| setting(settings, name))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Run the construction-demand scanner against a simulated world.
#[derive(Parser, Debug)]
#[command(author, version, about = "Drive the scan engine over a scenario", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a scenario and print every published report.
    Run {
        /// Scenario JSON file.
        #[arg(value_name = "SCENARIO")]
        scenario: PathBuf,
        #[command(flatten)]
        config: SettingsArgs,
        /// Number of ticks to simulate.
        #[arg(short, long, default_value_t = 600)]
        ticks: u64,
        /// First tick number.
        #[arg(long, default_value_t = 0)]
        start_tick: u64,
        /// Resume from engine state saved by `--state-out`.
        #[arg(long, value_name = "FILE")]
        state_in: Option<PathBuf>,
        /// Save engine state after the last tick.
        #[arg(long, value_name = "FILE")]
        state_out: Option<PathBuf>,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Print the effective settings.
    Settings {
        #[command(flatten)]
        config: SettingsArgs,
    },
}

#[derive(Args, Debug)]
struct SettingsArgs {
    /// Settings JSON file; missing keys keep their defaults.
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,
    /// Override one setting, e.g. `--set max-results=10`. Repeatable.
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_change)]
    overrides: Vec<SettingChange>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    /// One line per report or abort.
    Text,
    /// One JSON object per event.
    Ndjson,
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "kebab-case")]
enum Event<'a> {
    Tick(&'a TickSummary),
    Report {
        tick: u64,
        scanner: ScannerId,
        signals: &'a [Signal],
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            scenario,
            config,
            ticks,
            start_tick,
            state_in,
            state_out,
            format,
        } => {
            let settings = load_settings(&config)?;
            let world = load_scenario(&scenario)?;
            let run = Run {
                world,
                format,
                start_tick,
                ticks,
            };
            run.execute(settings, state_in.as_deref(), state_out.as_deref())
        }
        Command::Settings { config } => {
            let settings = load_settings(&config)?;
            println!("{}", render::settings(&settings));
            Ok(())
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Ignore error if already set (e.g., during tests).
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .try_init();
}

struct Run {
    world: SimWorld,
    format: Format,
    start_tick: u64,
    ticks: u64,
}

impl Run {
    fn execute(
        mut self,
        settings: ScanSettings,
        state_in: Option<&Path>,
        state_out: Option<&Path>,
    ) -> Result<()> {
        let mut engine = match state_in {
            Some(path) => {
                let json = fs::read_to_string(path)
                    .with_context(|| format!("failed to read state {path:?}"))?;
                let store = ScanStore::from_json(&json)
                    .with_context(|| format!("failed to parse state {path:?}"))?;
                ScanEngine::restore(settings, store, &self.world)?
            }
            None => ScanEngine::new(settings)?,
        };
        let adopted = engine.adopt_existing(self.world.scanner_records());
        info!(
            adopted,
            scanners = engine.scanners().len(),
            "engine ready"
        );

        let stdout = io::stdout();
        let mut out = stdout.lock();
        let end = self.start_tick.saturating_add(self.ticks);
        for tick in self.start_tick..end {
            let summary = engine.tick(tick, &mut self.world);
            if summary.is_quiet() {
                continue;
            }
            debug!(tick, drained = summary.regions_drained, "tick");
            self.emit(&mut out, &engine, &summary)?;
        }

        if let Some(path) = state_out {
            let json = engine.store().to_json()?;
            fs::write(path, json).with_context(|| format!("failed to write state {path:?}"))?;
            info!(?path, "state saved");
        }
        Ok(())
    }

    fn emit(&self, out: &mut impl Write, engine: &ScanEngine, summary: &TickSummary) -> Result<()> {
        if self.format == Format::Ndjson {
            writeln!(out, "{}", serde_json::to_string(&Event::Tick(summary))?)?;
        }
        for &id in &summary.completed {
            let signals = engine
                .store()
                .scanner(id)
                .map(|record| self.world.signals(record.entity))
                .unwrap_or_default();
            match self.format {
                Format::Text => writeln!(out, "{}", render::report(summary.tick, id, &signals))?,
                Format::Ndjson => {
                    let event = Event::Report {
                        tick: summary.tick,
                        scanner: id,
                        signals: &signals,
                    };
                    writeln!(out, "{}", serde_json::to_string(&event)?)?;
                }
            }
        }
        if self.format == Format::Text {
            for &(id, reason) in &summary.aborted {
                writeln!(out, "{}", render::abort(summary.tick, id, reason))?;
            }
        }
        Ok(())
    }
}

fn load_settings(args: &SettingsArgs) -> Result<ScanSettings> {
    let mut settings = match &args.settings {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read settings {path:?}"))?;
            let settings: ScanSettings = serde_json::from_str(&text)
                .with_context(|| format!("failed to parse settings {path:?}"))?;
            settings
                .validate()
                .with_context(|| format!("invalid settings in {path:?}"))?;
            settings
        }
        None => ScanSettings::default(),
    };
    for change in &args.overrides {
        settings
            .apply(change)
            .with_context(|| format!("cannot apply {}={}", change.name, change.value))?;
    }
    Ok(settings)
}

fn load_scenario(path: &Path) -> Result<SimWorld> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read scenario {path:?}"))?;
    load_world(&text).with_context(|| format!("failed to load scenario {path:?}"))
}

fn parse_change(input: &str) -> Result<SettingChange, String> {
    SettingChange::parse(input).map_err(|err| err.to_string())
}
