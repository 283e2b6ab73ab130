//! Drives a virtual CRT monitor from a synthetic video signal

use crate::{display::LoggingDisplay, source::TestPattern};
use clap::Parser;
use cli::{Cli, CliAction};
use crtmon_config::MonitorSettings;
use crtmon_monitor::{Monitor, VideoStandard};
use std::{
    fs::{File, create_dir_all},
    ops::Deref,
    path::PathBuf,
    sync::{LazyLock, atomic::Ordering},
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, Layer, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
};

mod cli;
mod display;
mod dump;
mod source;

/// Config location
static CONFIG_LOCATION: LazyLock<PathBuf> = LazyLock::new(|| {
    dirs::config_dir()
        .unwrap_or_default()
        .join("crtmon")
        .join("monitor.ron")
});

fn main() {
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_filter(create_filter());

    tracing_subscriber::registry().with(stderr_layer).init();

    tracing::info!("crtmon scope v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let config_location = cli.config.unwrap_or_else(|| CONFIG_LOCATION.deref().clone());

    match cli.action {
        CliAction::WriteConfig => {
            if let Some(parent) = config_location.parent() {
                create_dir_all(parent).expect("Failed to create config directory");
            }

            let file = File::create(&config_location).expect("Failed to create config file");
            MonitorSettings::default()
                .save(file)
                .expect("Failed to write config");

            tracing::info!("Wrote default settings to {}", config_location.display());
        }
        CliAction::Run {
            standard,
            frames,
            refresh_rate,
            dropout,
            dump,
        } => {
            let mut settings = File::open(&config_location)
                .ok()
                .and_then(|file| {
                    MonitorSettings::load(file)
                        .inspect_err(|error| {
                            tracing::warn!(
                                "Ignoring unreadable config {}: {}",
                                config_location.display(),
                                error
                            )
                        })
                        .ok()
                })
                .unwrap_or_default();

            if let Some(refresh_rate) = refresh_rate {
                settings.refresh_rate = refresh_rate;
            }

            let standard = VideoStandard::from(standard);
            let (display, counts) = LoggingDisplay::new();
            let monitor = Monitor::new(settings, display).expect("Failed to create monitor");

            monitor
                .set_standard(standard)
                .expect("Failed to set up the signal geometry");
            monitor.power_on();
            monitor.show_osd(format!("{} test pattern", standard));

            let completed = TestPattern::new(standard).run(&monitor, frames, dropout);

            monitor.power_off();

            match monitor.detected_standard() {
                Some(detected) if detected == standard => {
                    tracing::info!("Detected {} as expected", detected)
                }
                Some(detected) => {
                    tracing::warn!("Detected {} while generating {}", detected, standard)
                }
                None => tracing::warn!("Signal standard was not detected"),
            }

            if let Some(path) = dump {
                dump::save_png(&monitor.current_frame(), &path).expect("Failed to save frame");
                tracing::info!("Saved the last frame to {}", path.display());
            }

            monitor.destroy();

            tracing::info!(
                "{} frames completed, {} presented, {} idle pictures",
                completed,
                counts.frames.load(Ordering::Relaxed),
                counts.idle.load(Ordering::Relaxed)
            );
        }
    }
}

fn create_filter() -> EnvFilter {
    EnvFilter::builder()
        .with_regex(true)
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy()
}
