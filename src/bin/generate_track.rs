use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

use arview::geo::GeoCoordinate;
use arview::sensor::{Recording, SensorEvent, SensorKind, SensorStatus};
use arview::simulation::{TrackConfig, simulate_track};

#[derive(Parser, Debug)]
#[command(name = "generate_track")]
#[command(about = "Generate synthetic sensor tracks (JSON lines) for AR overlay testing")]
struct Args {
    /// TOML track configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output file
    #[arg(short, long, default_value = "data/synthetic/track.jsonl")]
    output: PathBuf,

    /// Seed for reproducibility
    #[arg(short, long)]
    seed: Option<u64>,

    /// Start position as "LAT,LON" (CLI override)
    #[arg(long)]
    start: Option<String>,

    /// Track duration in seconds (CLI override)
    #[arg(short, long)]
    duration: Option<f64>,

    /// Walking course in degrees (CLI override)
    #[arg(long)]
    course: Option<f64>,

    /// Location noise standard deviation in meters (CLI override)
    #[arg(long)]
    location_noise: Option<f64>,

    /// Heading noise standard deviation in degrees (CLI override)
    #[arg(long)]
    heading_noise: Option<f64>,

    /// Report heading permission as denied partway through the track
    #[arg(long)]
    deny_heading_at: Option<f64>,

    /// Increase output verbosity
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_start(s: &str) -> Result<GeoCoordinate> {
    let (lat, lon) = s
        .split_once(',')
        .context("Invalid start format. Use 'LAT,LON'")?;
    let lat: f64 = lat.trim().parse().context("Invalid start latitude")?;
    let lon: f64 = lon.trim().parse().context("Invalid start longitude")?;
    Ok(GeoCoordinate::new(lat, lon))
}

fn load_toml_config(path: &PathBuf) -> Result<TrackConfig> {
    let content = fs::read_to_string(path).context("Failed to read config file")?;
    toml::from_str(&content).context("Failed to parse config file")
}

fn build_track_config(args: &Args) -> Result<TrackConfig> {
    let mut config = match &args.config {
        Some(path) => load_toml_config(path)?,
        None => TrackConfig::default(),
    };

    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }
    if let Some(ref start) = args.start {
        config.start = parse_start(start)?;
    }
    if let Some(duration) = args.duration {
        config.duration_s = duration;
    }
    if let Some(course) = args.course {
        config.course_degrees = course;
    }
    if let Some(noise) = args.location_noise {
        config.location_noise_m = noise;
    }
    if let Some(noise) = args.heading_noise {
        config.heading_noise_degrees = noise;
    }
    Ok(config)
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

    let config = build_track_config(&args)?;
    let mut recording = simulate_track(&config).context("Failed to simulate track")?;

    if let Some(at) = args.deny_heading_at {
        let mut events = recording.events().to_vec();
        let index = events
            .iter()
            .position(|e| e.timestamp_s().is_some_and(|t| t >= at))
            .unwrap_or(events.len());
        events.insert(
            index,
            SensorEvent::Status {
                sensor: SensorKind::Heading,
                status: SensorStatus::PermissionDenied,
            },
        );
        recording = Recording::new(events);
    }

    if let Some(parent) = args.output.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).context("Failed to create output directory")?;
    }
    recording
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!(
        "Wrote {} events ({:.1}s from {:.5}, {:.5}) to {}",
        recording.len(),
        config.duration_s,
        config.start.latitude,
        config.start.longitude,
        args.output.display()
    );
    Ok(())
}
