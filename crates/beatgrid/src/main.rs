use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use beatgrid_core::{ConfigManager, GridDisplay, PresetTable, SequencerRegistry, Settings};
use clap::Parser;
use tokio::sync::mpsc;

mod input;
mod terminal;

use input::KeyCommand;
use terminal::TerminalScreen;

/// Drum machine visualizer: five 16-step rows highlighted in time.
#[derive(Parser, Debug)]
#[command(name = "beatgrid")]
#[command(about = "Beatgrid step-sequencer visualizer")]
struct Args {
    /// Tempo in BPM (overrides the config file)
    #[arg(short, long)]
    tempo: Option<f64>,

    /// Preset to select at startup, counting from 1
    #[arg(short, long, value_parser = parse_preset)]
    preset: Option<usize>,

    /// Path of the config file (default: per-user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON preset table to use instead of the built-in patterns
    #[arg(long)]
    presets: Option<PathBuf>,

    /// Redraw rate in frames per second
    #[arg(long)]
    fps: Option<u32>,
}

fn parse_preset(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!("Invalid preset number: {}", s)),
    }
}

fn apply_overrides(mut settings: Settings, args: &Args) -> Settings {
    if let Some(tempo) = args.tempo {
        settings.tempo_bpm = tempo;
    }
    if let Some(preset) = args.preset {
        settings.preset_index = preset;
    }
    if let Some(fps) = args.fps {
        settings.refresh_fps = fps;
    }
    if let Some(presets) = &args.presets {
        settings.presets_file = Some(presets.clone());
    }
    settings
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();

    let config_path = args.config.clone().or_else(ConfigManager::user_config_path);
    let mut config = ConfigManager::new(config_path);
    let settings = apply_overrides(config.load()?, &args);
    ConfigManager::validate_settings(&settings)
        .map_err(|errors| anyhow::anyhow!("Invalid settings: {}", errors.join(", ")))?;

    let presets: PresetTable = settings.load_presets()?;
    let grid = Arc::new(GridDisplay::new());
    let mut registry = SequencerRegistry::new(
        presets,
        settings.preset_index,
        settings.tempo_bpm,
        grid.clone(),
    )?;

    log::info!(
        "Starting Beatgrid with config {}",
        config.config_path().display()
    );

    let (tx, mut rx) = mpsc::unbounded_channel();
    input::spawn_input_thread(tx);

    let mut screen = TerminalScreen::enter()?;
    let mut redraw = tokio::time::interval(Duration::from_secs_f64(
        1.0 / settings.refresh_fps as f64,
    ));
    let mut message: Option<String> = None;

    loop {
        tokio::select! {
            command = rx.recv() => {
                match command {
                    Some(KeyCommand::Sequencer(command)) => {
                        message = match registry.handle_command(command) {
                            Ok(()) => None,
                            Err(e) => {
                                log::debug!("Command rejected: {}", e);
                                Some(e.to_string())
                            }
                        };
                    }
                    Some(KeyCommand::Quit) | None => break,
                }
            }

            _ = redraw.tick() => {
                screen.draw(&grid, &registry.status(), message.as_deref())?;
            }
        }
    }

    registry.stop_all();
    drop(screen);
    Ok(())
}
