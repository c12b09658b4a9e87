//! TGM - tower-defense simulation, run headless with live or pumped audio.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use audio::{Mixer, SoundBank};
use engine_core::Time;
use glam::IVec2;
use game::level::cell_of;
use game::{Buildable, GameConfig, Level, Sfx, Simulation};

/// Main loop cadence.
const FRAME: Duration = Duration::from_micros(16_667);
/// Seconds between HUD log lines.
const HUD_INTERVAL: f32 = 5.0;

/// Open the sound card. The returned stream must outlive the game loop.
#[cfg(feature = "audio-device")]
fn open_audio(mixer: &Mixer, _config: &GameConfig) -> Result<audio::DeviceOutput> {
    let output = audio::DeviceOutput::open(mixer).context("opening audio device")?;
    log::info!("Audio device open at {} Hz", output.sample_rate());
    Ok(output)
}

/// Start the headless pump thread. It stops when the handle is dropped.
#[cfg(not(feature = "audio-device"))]
fn open_audio(mixer: &Mixer, config: &GameConfig) -> Result<audio::HeadlessOutput> {
    let output = audio::HeadlessOutput::start(mixer.clone(), config.buffer_frames)
        .context("starting headless audio thread")?;
    log::info!(
        "Headless audio at {} Hz, {} frames per buffer",
        mixer.output_rate(),
        config.buffer_frames
    );
    Ok(output)
}

/// Opening build: one drone deployer, placed beside the main core as soon
/// as it is ready.
struct OpeningBuild {
    placed: bool,
}

impl OpeningBuild {
    fn start(sim: &mut Simulation) -> Self {
        if let Err(e) = sim.start_build(Buildable::DroneDeployer) {
            log::warn!("Opening build skipped: {}", e);
        }
        Self { placed: false }
    }

    fn update(&mut self, sim: &mut Simulation) {
        if self.placed || sim.economy.item(Buildable::DroneDeployer).ready == 0 {
            return;
        }
        let Some(core) = sim.main_core().and_then(|e| sim.body(e)) else {
            return;
        };
        let cell = cell_of(core.pos) + IVec2::new(2, 0);
        if let Err(e) = sim.place(Buildable::DroneDeployer, cell) {
            log::warn!("Could not place drone deployer at {:?}: {}", cell, e);
        }
        self.placed = true;
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = GameConfig::load();
    log::info!("Starting TGM ({:.0}s run)", config.run_seconds);

    let mixer = Mixer::new(config.output_rate);
    mixer.set_master_volume(config.master_volume);
    let _output = match open_audio(&mixer, &config) {
        Ok(output) => output,
        Err(e) => {
            log::error!("{:#}", e);
            return Err(e);
        }
    };

    let mut sfx = Sfx::new(mixer.clone(), SoundBank::new(&config.media_dir));
    sfx.preload();

    let level = Level::load_or_default(config.level_width, config.level_height, &config.level_path);
    let mut sim = Simulation::new(level, &config, Some(sfx));
    let mut opening = OpeningBuild::start(&mut sim);

    let mut time = Time::with_max_delta(Duration::from_secs_f32(config.max_frame_delta.max(0.001)));
    let mut next_hud = 0.0;
    while sim.elapsed() < config.run_seconds {
        let frame_start = Instant::now();
        time.update();
        sim.tick(time.delta_seconds());
        opening.update(&mut sim);

        if sim.elapsed() >= next_hud {
            log::info!("[{:>5.1}s] {} | {} units", sim.elapsed(), sim.hud(), sim.units().len());
            next_hud += HUD_INTERVAL;
        }
        if sim.is_lost() {
            log::warn!("Main compute core destroyed after {:.1}s, game over", sim.elapsed());
            break;
        }

        std::thread::sleep(FRAME.saturating_sub(frame_start.elapsed()));
    }

    log::info!(
        "Finished after {:.1}s: wave {}, {:.0} silicon, {} voices in pool",
        sim.elapsed(),
        sim.waves.wave,
        sim.economy.silicon,
        mixer.pool_size()
    );
    Ok(())
}
