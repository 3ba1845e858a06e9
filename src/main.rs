use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use rolling_stats::Stats;

use arview::config::{ArConfig, FieldOfView, ProjectionCurve, Viewport};
use arview::geo::{GeoCoordinate, PointOfInterest, load_places, rank_by_distance};
use arview::output::{FrameOutput, Formatter, OutputFormat, create_formatter};
use arview::overlay::{FrameObserver, OverlaySession, OverlayStatus};
use arview::projection::ProjectedMarker;
use arview::sensor::{Attitude, Recording, ReplaySource, SensorSource};

#[derive(Parser, Debug)]
#[command(name = "arview")]
#[command(about = "Project places of interest onto a camera view from a sensor track")]
struct Args {
    /// JSON place file: [{"id", "label", "latitude", "longitude", "altitude"?}]
    places: PathBuf,

    /// Recorded sensor track (JSON lines)
    #[arg(short, long)]
    track: Option<PathBuf>,

    /// Simulate a walk through the places instead of replaying a track
    #[cfg(feature = "simulation")]
    #[arg(long, conflicts_with = "track")]
    simulate: bool,

    /// Seed for the simulated walk
    #[cfg(feature = "simulation")]
    #[arg(long, requires = "simulate")]
    seed: Option<u64>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Horizontal field of view (e.g., "60", "60deg", "1.05rad")
    #[arg(long)]
    fov: Option<FieldOfView>,

    /// Angle-to-pixel mapping: linear, pinhole
    #[arg(long, value_enum)]
    curve: Option<ProjectionCurve>,

    /// Viewport size in pixels (e.g., "1280x720")
    #[arg(long)]
    viewport: Option<String>,

    /// Hide places farther than this many meters
    #[arg(long)]
    max_distance: Option<f64>,

    /// Replay speed relative to recorded time (0 = as fast as possible)
    #[arg(short, long, default_value_t = 0.0)]
    speed: f64,

    /// Output format: text, json, csv
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_viewport(s: &str) -> Result<Viewport> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .context("Invalid viewport format. Use 'WIDTHxHEIGHT'")?;
    let width: f64 = w.trim().parse().context("Invalid viewport width")?;
    let height: f64 = h.trim().parse().context("Invalid viewport height")?;
    Ok(Viewport::new(width, height))
}

fn build_config(args: &Args) -> Result<ArConfig> {
    let mut config = match &args.config {
        Some(path) => ArConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ArConfig::default(),
    };

    if let Some(fov) = args.fov {
        config.projection.field_of_view = fov;
    }
    if let Some(curve) = args.curve {
        config.projection.curve = curve;
    }
    if let Some(ref viewport) = args.viewport {
        config.projection.viewport = parse_viewport(viewport)?;
    }
    if let Some(max) = args.max_distance {
        config.distance.max_distance_m = Some(max);
    }

    config.validate().context("Invalid configuration")?;
    Ok(config)
}

#[cfg(feature = "simulation")]
fn simulated_recording(args: &Args, places: &[PointOfInterest]) -> Result<Option<Recording>> {
    use arview::simulation::{TrackConfig, simulate_track};

    if !args.simulate {
        return Ok(None);
    }
    let mut track = TrackConfig::default();
    if let Some(seed) = args.seed {
        track = track.with_seed(seed);
    }
    if !places.is_empty() {
        // Walk from the middle of the place set
        let n = places.len() as f64;
        let lat = places.iter().map(|p| p.coordinate().latitude).sum::<f64>() / n;
        let lon = places.iter().map(|p| p.coordinate().longitude).sum::<f64>() / n;
        track.start = GeoCoordinate::new(lat, lon);
    }
    let recording = simulate_track(&track).context("Failed to simulate track")?;
    Ok(Some(recording))
}

#[cfg(not(feature = "simulation"))]
fn simulated_recording(_args: &Args, _places: &[PointOfInterest]) -> Result<Option<Recording>> {
    Ok(None)
}

fn load_recording(args: &Args, places: &[PointOfInterest]) -> Result<Recording> {
    if let Some(ref path) = args.track {
        return Recording::load(path)
            .with_context(|| format!("Failed to load track {}", path.display()));
    }
    simulated_recording(args, places)?.context("No sensor input: pass --track <FILE>")
}

fn sources(recording: &Recording, speed: f64) -> (Box<dyn SensorSource>, Box<dyn SensorSource>) {
    if speed > 0.0 {
        (
            Box::new(recording.location_source(speed)),
            Box::new(recording.motion_source(speed)),
        )
    } else {
        (
            Box::new(recording.merged_source(0.0)),
            Box::new(ReplaySource::new("idle", Vec::new(), 0.0, 0.0)),
        )
    }
}

struct RunSummary {
    frames: u64,
    tick_interval: Stats<f64>,
    visible: Stats<f64>,
    last_tick: Option<f64>,
    last_location: Option<GeoCoordinate>,
    statuses: Vec<OverlayStatus>,
}

impl RunSummary {
    fn new() -> Self {
        Self {
            frames: 0,
            tick_interval: Stats::new(),
            visible: Stats::new(),
            last_tick: None,
            last_location: None,
            statuses: Vec::new(),
        }
    }
}

struct FramePrinter {
    formatter: Box<dyn Formatter>,
    summary: Arc<Mutex<RunSummary>>,
}

impl FramePrinter {
    fn emit(&mut self, attitude: Option<&Attitude>, markers: &[ProjectedMarker]) {
        let mut summary = self.summary.lock().unwrap_or_else(|e| e.into_inner());
        summary.frames += 1;

        let (timestamp_s, yaw_degrees) =
            attitude.map_or((0.0, 0.0), |a| (a.timestamp_s, a.yaw_degrees));
        if let Some(last) = summary.last_tick.replace(timestamp_s) {
            summary.tick_interval.update(timestamp_s - last);
        }

        let output = FrameOutput {
            frame_index: summary.frames,
            timestamp_s,
            yaw_degrees,
            markers,
        };
        summary.visible.update(output.visible_count() as f64);
        if let Some(text) = self.formatter.format(&output) {
            println!("{}", text);
        }
    }
}

impl FrameObserver for FramePrinter {
    fn on_frame(&mut self, markers: &[ProjectedMarker]) {
        self.emit(None, markers);
    }

    fn on_attitude_frame(&mut self, attitude: &Attitude, markers: &[ProjectedMarker]) {
        self.emit(Some(attitude), markers);
    }

    fn on_status(&mut self, status: OverlayStatus) {
        eprintln!("Status: {}", status);
        self.summary
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .statuses
            .push(status);
    }
}

fn print_summary(summary: &RunSummary, places: &[PointOfInterest]) {
    eprintln!();
    eprintln!("=== Run summary ===");
    eprintln!("Frames: {}", summary.frames);
    if summary.tick_interval.count > 0 {
        eprintln!(
            "Tick interval: {:.1} ms (std {:.1}, min {:.1}, max {:.1})",
            summary.tick_interval.mean * 1000.0,
            summary.tick_interval.std_dev * 1000.0,
            summary.tick_interval.min * 1000.0,
            summary.tick_interval.max * 1000.0
        );
    }
    if summary.visible.count > 0 {
        eprintln!(
            "Visible markers: {:.2} avg (min {}, max {})",
            summary.visible.mean, summary.visible.min, summary.visible.max
        );
    }
    if !summary.statuses.is_empty() {
        let statuses: Vec<String> = summary.statuses.iter().map(|s| s.to_string()).collect();
        eprintln!("Status changes: {}", statuses.join(" -> "));
    }

    if let Some(location) = summary.last_location {
        eprintln!();
        eprintln!(
            "Places from {:.5}, {:.5}:",
            location.latitude, location.longitude
        );
        for row in rank_by_distance(places, &location) {
            eprintln!("  {}", row.caption());
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = build_config(&args)?;

    let loaded = load_places(&args.places)
        .with_context(|| format!("Failed to load places {}", args.places.display()))?;
    for rejected in &loaded.rejected {
        eprintln!("Skipping place: {}", rejected);
    }
    if loaded.places.is_empty() {
        log::warn!("No valid places; frames will be empty");
    }

    let recording = load_recording(&args, &loaded.places)?;
    log::info!(
        "Replaying {} sensor events at speed {}",
        recording.len(),
        args.speed
    );

    let summary = Arc::new(Mutex::new(RunSummary::new()));
    let formatter = create_formatter(args.format, args.verbose > 0);
    if let Some(header) = formatter.header() {
        println!("{}", header);
    }
    let printer = FramePrinter {
        formatter,
        summary: Arc::clone(&summary),
    };

    let (location, motion) = sources(&recording, args.speed);
    let mut session = OverlaySession::new(config, location, motion, Box::new(printer))
        .context("Failed to create overlay session")?;
    session.set_points_of_interest(loaded.places.clone());
    session.start().context("Failed to start overlay session")?;
    session.wait();

    let mut summary = summary.lock().unwrap_or_else(|e| e.into_inner());
    summary.last_location = session.device_state().location.map(|fix| fix.coordinate);
    print_summary(&summary, &loaded.places);

    Ok(())
}
