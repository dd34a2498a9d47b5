mod cli;

use std::fs::File;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use cli::Cli;
use fftsounds::{
    AudioBridge,
    app::App,
    audio::{BandAnalyzer, SampleTap},
    config::Config,
    fs::expand_inputs,
    session::LocalPlaybackService,
    ui,
};

/// How long startup waits for the playback session before carrying on.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let config = match Config::locate(cli.config.as_deref()) {
        Some(path) => {
            let config = Config::load(&path)?;
            log::info!("Loaded config from {}", path.display());
            config
        }
        None => Config::default(),
    };

    let tap = SampleTap::new(config.analyzer.capture_capacity);
    let service = LocalPlaybackService::new(tap.clone());
    let analyzer = BandAnalyzer::new(tap, config.analyzer.clone());
    let mut bridge = AudioBridge::new(service, analyzer, config.bridge.clone());

    bridge.init();
    if !bridge.wait_connected(CONNECT_TIMEOUT) {
        log::warn!("Playback session not connected ({}); controls are inactive", bridge.state());
    }

    let paths = expand_inputs(&cli.paths);
    if !paths.is_empty() {
        bridge.play(paths.as_slice());
    }

    let tick = Duration::from_millis(cli.tick_ms.max(1));
    if cli.headless {
        for _ in 0..cli.ticks {
            thread::sleep(tick);
            bridge.dispatch();
            println!(
                "{} {}",
                bridge.frequency_data_json(),
                bridge.current_track_info_json()
            );
        }
        bridge.shutdown();
        return Ok(());
    }

    let mut app = App::new(bridge);
    let result = ui::run(&mut app, tick);
    app.bridge.shutdown();
    result
}

fn init_logging(cli: &Cli) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();

    match &cli.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("creating log file {}", path.display()))?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        // Stderr would scribble over the UI
        None if !cli.headless => {
            builder.filter_level(log::LevelFilter::Off);
        }
        None => {}
    }
    builder.init();
    Ok(())
}
