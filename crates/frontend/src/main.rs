//! Command-line entry point
//!
//! Loads a cartridge image, restores its save file when the shell declares
//! battery backing, then runs the emulator against the host window/audio
//! until the window closes. External RAM is flushed back to the save file on
//! clean quit. Exit status is 0 on clean quit, 1 on startup failure.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dmg_core::logging::{LogCategory, LogConfig, LogLevel};
use dmg_core::System;
use dmg_gb::GbSystem;
use log::{info, warn};

mod audio;
mod input;
mod video;

#[derive(Parser)]
#[command(name = "dotmatrix", about = "Game Boy (DMG) emulator")]
struct Args {
    /// Path to the cartridge image (binary ROM dump)
    rom: PathBuf,

    /// Integer window scale (1, 2, 4 or 8)
    #[arg(long, default_value_t = 4)]
    scale: u32,

    /// Run without a window or audio, then exit
    #[arg(long, default_value_t = false)]
    headless: bool,

    /// Number of frames to run in headless mode
    #[arg(long, default_value_t = 60)]
    frames: u32,

    /// Dump a JSON save state to this file at exit
    #[arg(long)]
    save_state: Option<PathBuf>,

    /// Global emulator log level (off, error, warn, info, debug, trace)
    #[arg(long)]
    log: Option<String>,

    /// Per-category log levels
    #[arg(long)]
    log_cpu: Option<String>,
    #[arg(long)]
    log_bus: Option<String>,
    #[arg(long)]
    log_ppu: Option<String>,
    #[arg(long)]
    log_apu: Option<String>,
    #[arg(long)]
    log_timer: Option<String>,
    #[arg(long)]
    log_interrupts: Option<String>,
}

fn parse_level(name: &str, value: &Option<String>) -> Result<Option<LogLevel>> {
    match value {
        None => Ok(None),
        Some(s) => {
            let level = LogLevel::parse(s)
                .with_context(|| format!("invalid {} level: {}", name, s))?;
            Ok(Some(level))
        }
    }
}

fn apply_log_config(args: &Args) -> Result<()> {
    let config = LogConfig::global();
    if let Some(level) = parse_level("--log", &args.log)? {
        config.set_global_level(level);
    }
    let categories = [
        ("--log-cpu", &args.log_cpu, LogCategory::Cpu),
        ("--log-bus", &args.log_bus, LogCategory::Bus),
        ("--log-ppu", &args.log_ppu, LogCategory::Ppu),
        ("--log-apu", &args.log_apu, LogCategory::Apu),
        ("--log-timer", &args.log_timer, LogCategory::Timer),
        ("--log-interrupts", &args.log_interrupts, LogCategory::Interrupts),
    ];
    for (name, value, category) in categories {
        if let Some(level) = parse_level(name, value)? {
            config.set_level(category, level);
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    apply_log_config(&args)?;

    let rom = fs::read(&args.rom)
        .with_context(|| format!("failed to read rom {}", args.rom.display()))?;

    let mut sys = GbSystem::new();
    sys.insert_cartridge(&rom)
        .with_context(|| format!("failed to load cartridge {}", args.rom.display()))?;

    // Battery-backed shells get their external RAM restored from <rom>.sav
    let save_path = args.rom.with_extension("sav");
    if sys.has_battery_backed_ram() {
        match fs::read(&save_path) {
            Ok(data) => {
                sys.load_external_ram(&data);
                info!("restored save file {}", save_path.display());
            }
            Err(_) => info!("no save file at {}", save_path.display()),
        }
    }

    if args.headless {
        for _ in 0..args.frames {
            sys.step_frame()?;
            let _ = sys.drain_audio();
        }
        info!("ran {} frames headless", args.frames);
    } else {
        let mut video = video::Video::new(args.scale)?;
        let audio = match audio::Audio::new() {
            Ok(audio) => Some(audio),
            Err(err) => {
                warn!("audio disabled: {:#}", err);
                None
            }
        };

        while video.is_open() {
            input::apply(&video.window, &mut sys);
            let frame = sys.step_frame()?;
            video.present(&frame)?;
            if let Some(audio) = &audio {
                audio.queue(sys.drain_audio());
            } else {
                let _ = sys.drain_audio();
            }
        }
    }

    if let Some(path) = &args.save_state {
        let state = serde_json::to_string_pretty(&sys.save_state())?;
        fs::write(path, state)
            .with_context(|| format!("failed to write save state {}", path.display()))?;
    }

    if sys.has_battery_backed_ram() {
        fs::write(&save_path, sys.external_ram())
            .with_context(|| format!("failed to write save file {}", save_path.display()))?;
        info!("wrote save file {}", save_path.display());
    }

    Ok(())
}
