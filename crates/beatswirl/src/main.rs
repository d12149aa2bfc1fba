//! BeatSwirl host
//!
//! Usage: `beatswirl <track.toml> [--config app.toml] [--script events.txt]`

use anyhow::{bail, Context, Result};
use beatswirl_control::{
    CommandInterpreter, DirectPersistence, PresetPersistence, PresetWriter, Session,
};
use beatswirl_core::{AnimationClock, ClockState, PresetStore};
use std::path::PathBuf;
use tracing::{info, warn};

mod config;
mod host;
mod logging_setup;
mod track;

use config::AppConfig;
use host::Host;
use track::Track;

const DEFAULT_CONFIG_FILE: &str = "beatswirl.toml";
const USAGE: &str = "usage: beatswirl <track.toml> [--config app.toml] [--script events.txt]";

#[derive(Debug, PartialEq)]
struct Args {
    track: PathBuf,
    config: PathBuf,
    script: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args> {
    let mut track = None;
    let mut config = None;
    let mut script = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                config = Some(PathBuf::from(args.next().context("--config needs a path")?))
            }
            "--script" | "-s" => {
                script = Some(PathBuf::from(args.next().context("--script needs a path")?))
            }
            flag if flag.starts_with('-') => bail!("Unknown option: {}", flag),
            _ if track.is_none() => track = Some(PathBuf::from(&arg)),
            _ => bail!("Unexpected argument: {}", arg),
        }
    }

    Ok(Args {
        track: track.context(USAGE)?,
        config: config.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE)),
        script,
    })
}

fn main() -> Result<()> {
    let args = parse_args(std::env::args().skip(1))?;
    let config = AppConfig::load(&args.config)?;
    let _log_guard = logging_setup::init(&config.logging)?;

    info!("=== BeatSwirl Session Started ===");

    // A bad tempo is fatal before anything is shown
    let track = Track::load(&args.track)?;
    let timeline = track.info.timeline()?;

    let store = match config.presets.resolve_path() {
        Some(path) => PresetStore::load(path),
        None => {
            warn!("No data directory available, user presets will not be saved");
            PresetStore::in_memory()
        }
    };
    info!("{} user presets available", store.len());

    let session = Session::new(track.audio, &config.animation.initial_preset(), store)
        .context("Invalid initial parameters in [animation]")?;

    let persistence: Box<dyn PresetPersistence> = if config.presets.background_save {
        Box::new(PresetWriter::spawn()?)
    } else {
        Box::new(DirectPersistence)
    };
    let mut interpreter =
        CommandInterpreter::with_persistence(config.input.key_bindings()?, persistence);
    interpreter.set_palette_step(config.animation.palette_step);

    let script = match &args.script {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read script: {:?}", path))?;
            host::parse_script(&content)
                .with_context(|| format!("Failed to parse script: {:?}", path))?
        }
        None => Vec::new(),
    };

    let clock_state = ClockState::starting_now(config.animation.start_delay()?);
    let start = clock_state.start();
    let clock = AnimationClock::new(clock_state, timeline);
    let mut host = Host::new(
        clock,
        session,
        interpreter,
        config.animation.frame_duration()?,
    );

    let summary = host.run(&script, start);
    info!(
        "Rendered {} frames, {} color changes, rotation {:.1} degrees",
        summary.frames, summary.color_changes, summary.final_rotation
    );
    if summary.events_rejected > 0 {
        warn!("{} input events were rejected", summary.events_rejected);
    }

    let params = host.session().params();
    println!(
        "frames={} color_changes={} rotation={:.3} rotation_speed={} beat_multiplier={} num_colors={}",
        summary.frames,
        summary.color_changes,
        summary.final_rotation,
        params.rotation_speed(),
        params.beat_multiplier(),
        params.palette_size()
    );

    Ok(())
}
