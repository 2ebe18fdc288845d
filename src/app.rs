use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::core::{
    alerts::{self, Alert},
    breath,
    config::{default_config_dir, ConfigManager, Settings},
    coordinator::{Coordinator, RefreshOutcome, RefreshOutput},
    fetch::{ApiClient, LocationCache, SignalRequest},
    model::{BreathScore, Coordinates, SignalSnapshot},
};

#[derive(Parser)]
#[command(name = "sky-watcher", version, about = "Air quality, wildfire and weather alerts for a location")]
struct Cli {
    /// Directory holding settings.json
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Debug, Default)]
struct LocationArgs {
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,

    #[arg(long)]
    city: Option<String>,

    /// Backend base URL, overrides the configured one
    #[arg(long)]
    api: Option<String>,

    /// Print JSON instead of text
    #[arg(long)]
    json: bool,

    /// Most severe alert first
    #[arg(long)]
    by_severity: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch once and print the current alerts
    Check(LocationArgs),

    /// Refresh on an interval until interrupted; edits to settings.json apply on the next tick
    Watch {
        #[command(flatten)]
        location: LocationArgs,

        /// Seconds between refreshes
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Show the settings file, optionally writing defaults
    Config {
        #[arg(long)]
        init: bool,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Report<'a> {
    snapshot: &'a SignalSnapshot,
    breath_score: Option<BreathScore>,
    alerts: &'a [Alert],
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let config_dir = cli.config_dir.unwrap_or_else(default_config_dir);
    let config_manager = ConfigManager::new(config_dir);

    match cli.command {
        Commands::Config { init } => show_config(&config_manager, init),
        Commands::Check(args) => {
            let settings = config_manager.load();
            runtime()?.block_on(check(&settings, &args))
        }
        Commands::Watch { location, interval } => {
            let settings = config_manager.load();
            runtime()?.block_on(watch(&config_manager, settings, location, interval))
        }
    }
}

fn show_config(config_manager: &ConfigManager, init: bool) -> Result<()> {
    let settings = config_manager.load();
    if init {
        config_manager
            .save(&settings)
            .with_context(|| format!("Failed to write {}", config_manager.path().display()))?;
        println!("Wrote {}", config_manager.path().display());
    } else {
        println!("# {}", config_manager.path().display());
    }
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

/// Command-line location overrides the configured one.
fn build_request(settings: &Settings, args: &LocationArgs) -> Result<SignalRequest> {
    let mut request = match (args.lat, args.lon) {
        (Some(lat), Some(lon)) => SignalRequest::new(Coordinates::new(lat, lon)?)
            .with_radius(settings.wildfire_radius_km),
        (None, None) => settings.signal_request()?,
        _ => bail!("--lat and --lon must be given together"),
    };
    if args.city.is_some() {
        request = request.with_city(args.city.clone());
    }
    if !request.coordinates.within_tempo_coverage() {
        log::warn!(
            "{:.3}, {:.3} is outside TEMPO satellite coverage; forecasts may be unavailable",
            request.coordinates.latitude,
            request.coordinates.longitude
        );
    }
    Ok(request)
}

fn build_coordinator(settings: &Settings, args: &LocationArgs) -> Result<Coordinator<ApiClient>> {
    let base_url = args.api.as_deref().unwrap_or(&settings.api_base_url);
    let client = ApiClient::new(base_url, settings.fetch_timeout(), settings.endpoints.clone())
        .context("Failed to build HTTP client")?;
    let cache = LocationCache::new(settings.cache_ttl(), settings.cache_max_entries);
    Ok(Coordinator::new(client, settings.fetch_timeout(), cache))
}

async fn check(settings: &Settings, args: &LocationArgs) -> Result<()> {
    let request = build_request(settings, args)?;
    let coordinator = build_coordinator(settings, args)?;

    match coordinator.refresh(&request, Utc::now()).await {
        RefreshOutcome::Fresh(output) => print_output(output, args),
        RefreshOutcome::Stale { generation } => bail!("Refresh {} was superseded", generation),
    }
}

/// Everything `watch` derives from settings.json.
struct WatchState {
    settings: Settings,
    request: SignalRequest,
    coordinator: Coordinator<ApiClient>,
}

impl WatchState {
    fn new(settings: Settings, args: &LocationArgs) -> Result<Self> {
        let request = build_request(&settings, args)?;
        let coordinator = build_coordinator(&settings, args)?;
        Ok(Self {
            settings,
            request,
            coordinator,
        })
    }

    /// Rebuilds from `latest` when it differs. On error the current state is kept.
    fn reload(&mut self, latest: Settings, args: &LocationArgs) -> Result<bool> {
        if latest == self.settings {
            return Ok(false);
        }
        let next = Self::new(latest, args)?;
        self.coordinator.invalidate();
        *self = next;
        Ok(true)
    }

    fn period(&self, interval: Option<u64>) -> Duration {
        interval
            .map(|s| Duration::from_secs(s.max(1)))
            .unwrap_or_else(|| self.settings.refresh_interval())
    }
}

async fn watch(
    config_manager: &ConfigManager,
    settings: Settings,
    args: LocationArgs,
    interval: Option<u64>,
) -> Result<()> {
    let mut state = WatchState::new(settings, &args)?;
    let mut period = state.period(interval);

    log::info!(
        "Watching {:.3}, {:.3} every {}s (Ctrl+C to stop)",
        state.request.coordinates.latitude,
        state.request.coordinates.longitude,
        period.as_secs()
    );
    let mut ticker = tokio::time::interval(period);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                log::info!("Stopping watch");
                return Ok(());
            }
        }

        // Hot-reload: any settings change applies on this tick
        match state.reload(config_manager.load(), &args) {
            Ok(true) => {
                log::info!(
                    "Settings changed; watching {:.3}, {:.3} via {}",
                    state.request.coordinates.latitude,
                    state.request.coordinates.longitude,
                    state.coordinator.source().base_url()
                );
                let next_period = state.period(interval);
                if next_period != period {
                    period = next_period;
                    ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
                }
            }
            Ok(false) => {}
            Err(e) => log::warn!("Keeping previous settings: {:#}", e),
        }

        match state.coordinator.refresh(&state.request, Utc::now()).await {
            RefreshOutcome::Fresh(output) => {
                if let Err(e) = print_output(output, &args) {
                    log::error!("Failed to print alerts: {:#}", e);
                }
            }
            RefreshOutcome::Stale { generation } => {
                log::debug!("Dropped stale refresh {}", generation);
            }
        }
    }
}

fn print_output(mut output: RefreshOutput, args: &LocationArgs) -> Result<()> {
    for line in &output.logs {
        log::debug!("{}", line);
    }
    if args.by_severity {
        alerts::sort_by_severity(&mut output.alerts);
    }
    let breath_score = breath::for_snapshot(&output.snapshot);

    if args.json {
        let report = Report {
            snapshot: &output.snapshot,
            breath_score,
            alerts: &output.alerts,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", render_text(&output.snapshot, breath_score.as_ref(), &output.alerts));
    }
    Ok(())
}

fn render_text(snapshot: &SignalSnapshot, breath_score: Option<&BreathScore>, alerts: &[Alert]) -> String {
    let mut out = String::new();
    let place = snapshot
        .forecast
        .as_ref()
        .and_then(|f| f.location_name.as_deref())
        .unwrap_or("Current location");
    out.push_str(&format!(
        "{} at {}\n",
        place,
        snapshot.captured_at.format("%Y-%m-%d %H:%M UTC")
    ));

    if let Some(forecast) = &snapshot.forecast {
        if let (Some(aqi), Some(category)) = (forecast.aqi, forecast.category_or_derived()) {
            out.push_str(&format!("  AQI {:.0} ({})\n", aqi, category));
        }
    }
    if let Some(score) = breath_score {
        out.push_str(&format!("  Breath score {:.1} ({})\n", score.score, score.rating));
    }
    if let Some(intensity) = snapshot.wildfire.as_ref().and_then(|w| w.intensity()) {
        out.push_str(&format!("  Closest fire intensity: {}\n", intensity.label()));
    }

    if alerts.is_empty() {
        out.push_str("All clear: no conditions currently warrant an alert.\n");
        return out;
    }

    for alert in alerts {
        out.push_str(&format!(
            "\n[{}] {}\n  {}\n",
            alert.severity.label().to_uppercase(),
            alert.title,
            alert.message
        ));
        for action in &alert.actions {
            out.push_str(&format!("  - {}\n", action));
        }
        if let Some(groups) = &alert.affected_groups {
            out.push_str(&format!("  Affects: {}\n", groups.join(", ")));
        }
    }
    out
}
