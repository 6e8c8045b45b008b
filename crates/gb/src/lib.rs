//! Game Boy (DMG) system implementation
//!
//! Ties the Sharp LR35902 core to the memory bus and its subsystems and runs
//! them in lock-step: each scheduler iteration executes one instruction,
//! advances the PPU/timer/APU by the instruction's cycle cost (4 dots per
//! machine cycle), merges subsystem interrupt latches into IF, then lets the
//! CPU service pending interrupts. `step_frame` spins that loop until the
//! PPU enters VBlank and hands the finished framebuffer to the host.
//!
//! # Components
//!
//! - CPU: `dmg_core::cpu_lr35902` (decode/execute, flags, interrupt dispatch)
//! - Bus: memory map, boot ROM overlay, OAM DMA (`bus`)
//! - Cartridge: header parse + MBC1/MBC3 banking (`cartridge`, `mappers`)
//! - PPU: scanline state machine + composition (`ppu`, `ppu_renderer`)
//! - Timer, joypad, APU: `timer`, `joypad`, `apu`

use dmg_core::cpu_lr35902::CpuLr35902;
use dmg_core::types::{AudioSample, Frame};
use dmg_core::System;

mod apu;
mod bus;
mod cartridge;
mod joypad;
mod mappers;
pub(crate) mod ppu;
mod ppu_renderer;
mod timer;

pub use apu::SAMPLE_RATE;
pub use cartridge::{Cartridge, CartridgeError, MAX_ROM_SIZE};
pub use joypad::Button;
pub use ppu::{SCREEN_HEIGHT, SCREEN_WIDTH};

use bus::GbBus;

/// Dots per frame: 154 scanlines of 456 dots
const DOTS_PER_FRAME: u32 = 70224;

/// Monochrome shades for the four palette colors, brightest first
const SHADES: [u8; 4] = [220, 192, 96, 0];

#[derive(thiserror::Error, Debug)]
pub enum GbError {
    #[error("No cartridge loaded")]
    NoCartridge,
    #[error(transparent)]
    Cartridge(#[from] CartridgeError),
}

/// The emulated console
pub struct GbSystem {
    cpu: CpuLr35902<GbBus>,
    cart_loaded: bool,
}

impl Default for GbSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl GbSystem {
    pub fn new() -> Self {
        let bus = GbBus::new();
        let mut cpu = CpuLr35902::new(bus);
        cpu.reset();

        Self {
            cpu,
            cart_loaded: false,
        }
    }

    /// Parse and insert a cartridge image, then reset to power-on state
    pub fn insert_cartridge(&mut self, data: &[u8]) -> Result<(), GbError> {
        let cart = Cartridge::from_rom(data.to_vec())?;
        self.cpu.memory.insert_cart(cart);
        self.cart_loaded = true;
        self.reset();
        Ok(())
    }

    /// Forward a host key transition to the joypad
    pub fn button_event(&mut self, button: Button, down: bool) {
        self.cpu.memory.joypad.set_button(button, down);
    }

    /// True when the cartridge declares battery-backed external RAM
    pub fn has_battery_backed_ram(&self) -> bool {
        self.cpu
            .memory
            .cart
            .as_ref()
            .map_or(false, |c| c.has_battery() && !c.ram().is_empty())
    }

    /// The external-RAM image, for the save-file collaborator
    pub fn external_ram(&self) -> &[u8] {
        self.cpu.memory.cart.as_ref().map_or(&[], |c| c.ram())
    }

    /// Restore external RAM from a persisted save image
    pub fn load_external_ram(&mut self, data: &[u8]) {
        if let Some(cart) = &mut self.cpu.memory.cart {
            cart.load_ram(data);
        }
    }

    /// Samples accumulated since the last drain, for the host audio queue
    pub fn drain_audio(&mut self) -> Vec<AudioSample> {
        self.cpu.memory.apu.drain_samples()
    }

    /// One scheduler iteration: instruction, subsystem advance, interrupts.
    /// Returns the dots consumed.
    fn tick(&mut self) -> u32 {
        let cycles = self.cpu.step();
        let dots = cycles * 4;
        self.cpu.memory.ppu.step(dots);
        self.cpu.memory.timer.step(dots);
        self.cpu.memory.apu.step(dots);
        self.cpu.memory.sync_interrupts();
        self.cpu.service_interrupts();
        dots
    }

    fn render_frame(&self) -> Frame {
        let mut frame = Frame::new(SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32);
        for (dst, &shade) in frame
            .pixels
            .iter_mut()
            .zip(self.cpu.memory.ppu.framebuffer())
        {
            let level = SHADES[shade as usize] as u32;
            *dst = 0xFF00_0000 | (level << 16) | (level << 8) | level;
        }
        frame
    }
}

impl System for GbSystem {
    type Error = GbError;

    fn reset(&mut self) {
        self.cpu.reset();
        self.cpu.memory.reset();
        if !self.cpu.memory.boot_rom_enabled() {
            // No overlay to run: start at the cartridge entry point
            self.cpu.pc = 0x0100;
        }
    }

    /// Emulate until VBlank entry and return the finished frame. With the
    /// LCD disabled there is no VBlank, so a frame's worth of dots bounds
    /// the loop and the blank framebuffer is returned.
    fn step_frame(&mut self) -> Result<Frame, Self::Error> {
        if !self.cart_loaded {
            return Err(GbError::NoCartridge);
        }

        let mut budget = 0u32;
        loop {
            budget += self.tick();
            if self.cpu.memory.ppu.take_frame() || budget >= DOTS_PER_FRAME {
                break;
            }
        }

        Ok(self.render_frame())
    }

    fn save_state(&self) -> serde_json::Value {
        serde_json::json!({
            "system": "dmg",
            "version": 1,
            "cpu": {
                "a": self.cpu.a,
                "f": self.cpu.f,
                "b": self.cpu.b,
                "c": self.cpu.c,
                "d": self.cpu.d,
                "e": self.cpu.e,
                "h": self.cpu.h,
                "l": self.cpu.l,
                "sp": self.cpu.sp,
                "pc": self.cpu.pc,
                "ime": self.cpu.ime,
                "halted": self.cpu.halted,
                "stopped": self.cpu.stopped,
            }
        })
    }

    fn load_state(&mut self, v: &serde_json::Value) -> Result<(), serde_json::Error> {
        macro_rules! load_u8 {
            ($state:expr, $field:literal, $target:expr) => {
                if let Some(val) = $state.get($field).and_then(|v| v.as_u64()) {
                    $target = val as u8;
                }
            };
        }

        macro_rules! load_u16 {
            ($state:expr, $field:literal, $target:expr) => {
                if let Some(val) = $state.get($field).and_then(|v| v.as_u64()) {
                    $target = val as u16;
                }
            };
        }

        macro_rules! load_bool {
            ($state:expr, $field:literal, $target:expr) => {
                if let Some(val) = $state.get($field).and_then(|v| v.as_bool()) {
                    $target = val;
                }
            };
        }

        if let Some(cpu_state) = v.get("cpu") {
            load_u8!(cpu_state, "a", self.cpu.a);
            load_u8!(cpu_state, "f", self.cpu.f);
            load_u8!(cpu_state, "b", self.cpu.b);
            load_u8!(cpu_state, "c", self.cpu.c);
            load_u8!(cpu_state, "d", self.cpu.d);
            load_u8!(cpu_state, "e", self.cpu.e);
            load_u8!(cpu_state, "h", self.cpu.h);
            load_u8!(cpu_state, "l", self.cpu.l);
            load_u16!(cpu_state, "sp", self.cpu.sp);
            load_u16!(cpu_state, "pc", self.cpu.pc);
            load_bool!(cpu_state, "ime", self.cpu.ime);
            load_bool!(cpu_state, "halted", self.cpu.halted);
            load_bool!(cpu_state, "stopped", self.cpu.stopped);
        }
        Ok(())
    }
}
