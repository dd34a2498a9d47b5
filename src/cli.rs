use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fftsounds", about = "Play audio files and watch their bass/mid/treble levels")]
pub struct Cli {
    /// Audio files or directories to play, in order
    pub paths: Vec<PathBuf>,

    /// Config file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Print the bridge's JSON reports instead of drawing the UI
    #[arg(long)]
    pub headless: bool,

    /// Number of polls in headless mode
    #[arg(long, default_value_t = 100)]
    pub ticks: u32,

    /// Milliseconds between polls
    #[arg(long, default_value_t = 50)]
    pub tick_ms: u64,

    /// Write logs to this file (the UI owns the terminal)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}
