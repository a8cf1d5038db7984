//! # ogv-demo
//!
//! Plays a few seconds of synthetic video and a test tone through the
//! playback core, driving it from a fixed-rate loop the way a game host
//! would. Pass a TOML file as the first argument to override the defaults.

mod pattern;

use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use ogv_audio::CpalBackend;
use ogv_core::PlayerConfig;
use ogv_player::{screen_rect, PlaybackController, ScreenAspect};
use pattern::TestPatternSource;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const TICK: Duration = Duration::from_millis(16);

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ogv_player=debug,ogv_audio=info,ogv_demo=info".into()),
        )
        .init();

    info!("Starting ogv-demo v{}", env!("CARGO_PKG_VERSION"));

    let config = match std::env::args().nth(1) {
        Some(path) => PlayerConfig::load(&path)
            .with_context(|| format!("Failed to load config file {path}"))?,
        None => PlayerConfig::default(),
    };

    let source = TestPatternSource {
        width: 320,
        height: 180,
        fps: 30.0,
        sample_rate: config.sample_rate,
        channels: config.channels,
        duration_ms: 3_000,
    };
    let backend = CpalBackend::new()?;
    info!("Audio device: {}", backend.device_name());

    let mut controller = PlaybackController::new(
        Box::new(source),
        Box::new(backend),
        "test-pattern.ogv",
        config,
    )?;
    controller.play()?;

    let target = screen_rect(
        controller.width(),
        controller.height(),
        1280.0,
        720.0,
        ScreenAspect::MaintainAspectRatio,
    );
    info!("Drawing into {target:?}");

    let mut last = Instant::now();
    while controller.state().is_playing() {
        thread::sleep(TICK);
        let now = Instant::now();
        controller.on_host_tick((now - last).as_secs_f64() * 1000.0);
        last = now;

        // Stand-in for the texture upload
        if let (Some(frame), Some(luma)) = (controller.current_frame(), controller.luma_plane()) {
            let mean = luma.iter().map(|&b| u64::from(b)).sum::<u64>() / luma.len().max(1) as u64;
            debug!(
                "Frame {} ms, mean luma {mean}, {} samples buffered",
                frame.pts_ms(),
                controller.buffered_audio()
            );
        }
    }

    info!("Playback complete after {:.0} ms", controller.elapsed_ms());
    Ok(())
}
