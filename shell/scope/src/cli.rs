use clap::{Parser, Subcommand, ValueEnum};
use crtmon_monitor::VideoStandard;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Monitor settings to use instead of the ones in the config directory
    #[clap(short, long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub action: CliAction,
}

#[derive(Clone, Subcommand)]
pub enum CliAction {
    /// Feed a test pattern through the monitor
    Run {
        #[clap(short, long, value_enum, default_value_t = SignalStandard::Ntsc)]
        standard: SignalStandard,
        /// Frames the source generates before stopping
        #[clap(short, long, default_value_t = 300)]
        frames: u32,
        /// Override the configured refresh rate, negative for on demand
        #[clap(short, long, allow_negative_numbers = true)]
        refresh_rate: Option<f64>,
        /// Cut the signal for this many frames halfway through
        #[clap(long, default_value_t = 0)]
        dropout: u32,
        /// Store the last completed frame as a PNG
        #[clap(long)]
        dump: Option<PathBuf>,
    },
    /// Write the default settings to the config location
    WriteConfig,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SignalStandard {
    Ntsc,
    Pal,
}

impl From<SignalStandard> for VideoStandard {
    fn from(standard: SignalStandard) -> Self {
        match standard {
            SignalStandard::Ntsc => VideoStandard::Ntsc,
            SignalStandard::Pal => VideoStandard::Pal,
        }
    }
}
