//! Game Boy memory bus
//!
//! Single 16-bit address space routed to the cartridge, PPU, timer, joypad,
//! APU, work/high RAM and the interrupt registers. The 256-byte boot ROM
//! overlays 0x0000-0x00FF at reset until any non-zero write to 0xFF50
//! unmaps it; the `skip-bootrom` feature starts with the overlay unmapped.
//!
//! 16-bit accesses are two successive byte accesses, little-endian, performed
//! by the CPU core. The only multi-byte special case lives here: a write to
//! 0xFF46 copies 160 bytes from `value << 8` into OAM in one step.

use dmg_core::cpu_lr35902::MemoryLr35902;
use dmg_core::logging::{LogCategory, LogLevel};

use crate::apu::Apu;
use crate::cartridge::Cartridge;
use crate::joypad::Joypad;
use crate::ppu::Ppu;
use crate::timer::Timer;

/// The DMG boot ROM: scrolls the logo, checks the cartridge header, then
/// unmaps itself by writing 0x01 to 0xFF50
const BOOT_ROM: [u8; 0x100] = [
    0x31, 0xFE, 0xFF, 0xAF, 0x21, 0xFF, 0x9F, 0x32, 0xCB, 0x7C, 0x20, 0xFB, 0x21, 0x26, 0xFF, 0x0E,
    0x11, 0x3E, 0x80, 0x32, 0xE2, 0x0C, 0x3E, 0xF3, 0xE2, 0x32, 0x3E, 0x77, 0x77, 0x3E, 0xFC, 0xE0,
    0x47, 0x11, 0x04, 0x01, 0x21, 0x10, 0x80, 0x1A, 0xCD, 0x95, 0x00, 0xCD, 0x96, 0x00, 0x13, 0x7B,
    0xFE, 0x34, 0x20, 0xF3, 0x11, 0xD8, 0x00, 0x06, 0x08, 0x1A, 0x13, 0x22, 0x23, 0x05, 0x20, 0xF9,
    0x3E, 0x19, 0xEA, 0x10, 0x99, 0x21, 0x2F, 0x99, 0x0E, 0x0C, 0x3D, 0x28, 0x08, 0x32, 0x0D, 0x20,
    0xF9, 0x2E, 0x0F, 0x18, 0xF3, 0x67, 0x3E, 0x64, 0x57, 0xE0, 0x42, 0x3E, 0x91, 0xE0, 0x40, 0x04,
    0x1E, 0x02, 0x0E, 0x0C, 0xF0, 0x44, 0xFE, 0x90, 0x20, 0xFA, 0x0D, 0x20, 0xF7, 0x1D, 0x20, 0xF2,
    0x0E, 0x13, 0x24, 0x7C, 0x1E, 0x83, 0xFE, 0x62, 0x28, 0x06, 0x1E, 0xC1, 0xFE, 0x64, 0x20, 0x06,
    0x7B, 0xE2, 0x0C, 0x3E, 0x87, 0xE2, 0xF0, 0x42, 0x90, 0xE0, 0x42, 0x15, 0x20, 0xD2, 0x05, 0x20,
    0x4F, 0x16, 0x20, 0x18, 0xCB, 0x4F, 0x06, 0x04, 0xC5, 0xCB, 0x11, 0x17, 0xC1, 0xCB, 0x11, 0x17,
    0x05, 0x20, 0xF5, 0x22, 0x23, 0x22, 0x23, 0xC9, 0xCE, 0xED, 0x66, 0x66, 0xCC, 0x0D, 0x00, 0x0B,
    0x03, 0x73, 0x00, 0x83, 0x00, 0x0C, 0x00, 0x0D, 0x00, 0x08, 0x11, 0x1F, 0x88, 0x89, 0x00, 0x0E,
    0xDC, 0xCC, 0x6E, 0xE6, 0xDD, 0xDD, 0xD9, 0x99, 0xBB, 0xBB, 0x67, 0x63, 0x6E, 0x0E, 0xEC, 0xCC,
    0xDD, 0xDC, 0x99, 0x9F, 0xBB, 0xB9, 0x33, 0x3E, 0x3C, 0x42, 0xB9, 0xA5, 0xB9, 0xA5, 0x42, 0x3C,
    0x21, 0x04, 0x01, 0x11, 0xA8, 0x00, 0x1A, 0x13, 0xBE, 0x20, 0xFE, 0x23, 0x7D, 0xFE, 0x34, 0x20,
    0xF5, 0x06, 0x19, 0x78, 0x86, 0x23, 0x05, 0x20, 0xFB, 0x86, 0x20, 0xFE, 0x3E, 0x01, 0xE0, 0x50,
];

/// Game Boy memory bus, owning every memory-mapped subsystem
pub struct GbBus {
    /// Work RAM (8KB)
    wram: [u8; 0x2000],
    /// High RAM (127 bytes)
    hram: [u8; 0x7F],
    /// Serial data/control (0xFF01-0xFF02), raw storage only
    serial: [u8; 2],
    /// Interrupt Enable register
    ie: u8,
    /// Interrupt Flag register
    if_reg: u8,
    /// Boot ROM overlay mapped at 0x0000-0x00FF
    boot_rom_enabled: bool,

    pub ppu: Ppu,
    pub timer: Timer,
    pub joypad: Joypad,
    pub apu: Apu,
    pub cart: Option<Cartridge>,
}

impl GbBus {
    pub fn new() -> Self {
        Self {
            wram: [0; 0x2000],
            hram: [0; 0x7F],
            serial: [0; 2],
            ie: 0,
            if_reg: 0,
            boot_rom_enabled: !cfg!(feature = "skip-bootrom"),
            ppu: Ppu::new(),
            timer: Timer::new(),
            joypad: Joypad::new(),
            apu: Apu::new(),
            cart: None,
        }
    }

    pub fn insert_cart(&mut self, cart: Cartridge) {
        self.cart = Some(cart);
    }

    /// Back to power-on state; the cartridge keeps its RAM contents
    pub fn reset(&mut self) {
        self.wram = [0; 0x2000];
        self.hram = [0; 0x7F];
        self.serial = [0; 2];
        self.ie = 0;
        self.if_reg = 0;
        self.boot_rom_enabled = !cfg!(feature = "skip-bootrom");
        self.ppu.reset();
        self.timer.reset();
        self.joypad.reset();
        self.apu.reset();
        if let Some(cart) = &mut self.cart {
            cart.reset();
        }
    }

    pub fn boot_rom_enabled(&self) -> bool {
        self.boot_rom_enabled
    }

    /// Pull every subsystem's interrupt latch and merge into IF. The
    /// scheduler calls this once per iteration, before interrupt service,
    /// so requests are observed at the next instruction boundary.
    pub fn sync_interrupts(&mut self) {
        let mut requests = 0u8;
        if self.ppu.take_vblank_interrupt() {
            requests |= 0x01;
        }
        if self.ppu.take_stat_interrupt() {
            requests |= 0x02;
        }
        if self.timer.take_interrupt() {
            requests |= 0x04;
        }
        if self.joypad.take_interrupt() {
            requests |= 0x10;
        }
        if requests != 0 {
            dmg_core::log!(
                LogCategory::Interrupts,
                LogLevel::Trace,
                "interrupt requests merged into IF: {:02X}",
                requests
            );
            self.if_reg |= requests;
        }
    }

    /// OAM DMA: copy 160 bytes from `page << 8` into OAM atomically
    fn oam_dma(&mut self, page: u8) {
        let source = (page as u16) << 8;
        dmg_core::log!(
            LogCategory::Ppu,
            LogLevel::Debug,
            "oam dma from {:04X}",
            source
        );
        for i in 0..0xA0u16 {
            let byte = self.read(source + i);
            self.ppu.write_oam(0xFE00 + i, byte);
        }
    }
}

impl Default for GbBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLr35902 for GbBus {
    fn read(&self, addr: u16) -> u8 {
        match addr {
            // Cartridge ROM, with the boot ROM overlaying the first page
            0x0000..=0x7FFF => {
                if addr < 0x0100 && self.boot_rom_enabled {
                    BOOT_ROM[addr as usize]
                } else {
                    self.cart.as_ref().map_or(0xFF, |c| c.read_rom(addr))
                }
            }
            // VRAM
            0x8000..=0x9FFF => self.ppu.read_vram(addr),
            // Cartridge external RAM
            0xA000..=0xBFFF => self.cart.as_ref().map_or(0xFF, |c| c.read_ram(addr)),
            // Work RAM
            0xC000..=0xDFFF => self.wram[(addr - 0xC000) as usize],
            // Echo RAM (mirror of C000-DDFF)
            0xE000..=0xFDFF => self.wram[(addr - 0xE000) as usize],
            // OAM
            0xFE00..=0xFE9F => self.ppu.read_oam(addr),
            // Unusable region floats high
            0xFEA0..=0xFEFF => {
                dmg_core::log!(
                    LogCategory::Stubs,
                    LogLevel::Info,
                    "read from unusable region {:04X}",
                    addr
                );
                0xFF
            }
            0xFF00 => self.joypad.read(),
            0xFF01..=0xFF02 => self.serial[(addr - 0xFF01) as usize],
            0xFF04..=0xFF07 => self.timer.read_register(addr),
            0xFF0F => self.if_reg,
            0xFF10..=0xFF3F => self.apu.read_register(addr),
            0xFF40..=0xFF4B => self.ppu.read_register(addr),
            // High RAM
            0xFF80..=0xFFFE => self.hram[(addr - 0xFF80) as usize],
            0xFFFF => self.ie,
            // Unimplemented I/O ports
            _ => {
                dmg_core::log!(
                    LogCategory::Stubs,
                    LogLevel::Info,
                    "read from unimplemented io port {:04X}",
                    addr
                );
                0xFF
            }
        }
    }

    fn write(&mut self, addr: u16, val: u8) {
        match addr {
            // ROM window: mapper register traffic
            0x0000..=0x7FFF => {
                if let Some(cart) = &mut self.cart {
                    cart.write_rom(addr, val);
                }
            }
            0x8000..=0x9FFF => self.ppu.write_vram(addr, val),
            0xA000..=0xBFFF => {
                if let Some(cart) = &mut self.cart {
                    cart.write_ram(addr, val);
                }
            }
            0xC000..=0xDFFF => self.wram[(addr - 0xC000) as usize] = val,
            0xE000..=0xFDFF => self.wram[(addr - 0xE000) as usize] = val,
            0xFE00..=0xFE9F => self.ppu.write_oam(addr, val),
            0xFEA0..=0xFEFF => {
                dmg_core::log!(
                    LogCategory::Stubs,
                    LogLevel::Info,
                    "write to unusable region {:04X}",
                    addr
                );
            }
            0xFF00 => self.joypad.write_select(val),
            0xFF01..=0xFF02 => self.serial[(addr - 0xFF01) as usize] = val,
            0xFF04..=0xFF07 => self.timer.write_register(addr, val),
            0xFF0F => self.if_reg = val,
            0xFF10..=0xFF3F => self.apu.write_register(addr, val),
            0xFF46 => {
                self.ppu.write_register(addr, val);
                self.oam_dma(val);
            }
            0xFF40..=0xFF4B => self.ppu.write_register(addr, val),
            // Any non-zero write permanently unmaps the boot ROM
            0xFF50 => {
                if val != 0 {
                    dmg_core::log!(LogCategory::Bus, LogLevel::Debug, "boot rom unmapped");
                    self.boot_rom_enabled = false;
                }
            }
            0xFF80..=0xFFFE => self.hram[(addr - 0xFF80) as usize] = val,
            0xFFFF => self.ie = val,
            _ => {
                dmg_core::log!(
                    LogCategory::Stubs,
                    LogLevel::Info,
                    "write to unimplemented io port {:04X} val {:02X}",
                    addr,
                    val
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bus_with_cart() -> GbBus {
        let mut rom = vec![0; 0x8000];
        rom[0x147] = 0x00;
        rom[0x148] = 0x00;
        rom[0x149] = 0x00;
        rom[0x0000] = 0x11;
        rom[0x4000] = 0x22;
        let mut bus = GbBus::new();
        bus.insert_cart(Cartridge::from_rom(rom).unwrap());
        bus
    }

    #[test]
    fn test_wram_read_write() {
        let mut bus = GbBus::new();
        bus.write(0xC123, 0xAB);
        assert_eq!(bus.read(0xC123), 0xAB);
        bus.write(0xDFFF, 0xCD);
        assert_eq!(bus.read(0xDFFF), 0xCD);
    }

    #[test]
    fn test_echo_ram_mirrors_wram() {
        let mut bus = GbBus::new();
        bus.write(0xC000, 0x42);
        assert_eq!(bus.read(0xE000), 0x42);

        bus.write(0xFDFF, 0x24);
        assert_eq!(bus.read(0xDDFF), 0x24);

        // The echo property holds across the whole window
        for addr in [0xE000u16, 0xE800, 0xF421, 0xFDFF] {
            assert_eq!(bus.read(addr), bus.read(addr - 0x2000));
        }
    }

    #[test]
    fn test_hram_read_write() {
        let mut bus = GbBus::new();
        bus.write(0xFF80, 0x12);
        bus.write(0xFFFE, 0x34);
        assert_eq!(bus.read(0xFF80), 0x12);
        assert_eq!(bus.read(0xFFFE), 0x34);
    }

    #[test]
    fn test_unusable_region_floats_high() {
        let mut bus = GbBus::new();
        bus.write(0xFEA0, 0x00);
        assert_eq!(bus.read(0xFEA0), 0xFF);
        assert_eq!(bus.read(0xFEFF), 0xFF);
    }

    #[test]
    fn test_boot_rom_overlay_and_disable() {
        let mut bus = bus_with_cart();
        assert_eq!(bus.read(0x0000), BOOT_ROM[0]);
        assert_eq!(bus.read(0x00FF), BOOT_ROM[0xFF]);
        // Past the overlay the cartridge shows through
        assert_eq!(bus.read(0x4000), 0x22);

        // Zero writes do nothing
        bus.write(0xFF50, 0x00);
        assert!(bus.boot_rom_enabled());

        bus.write(0xFF50, 0x01);
        assert!(!bus.boot_rom_enabled());
        assert_eq!(bus.read(0x0000), 0x11);

        // The latch is write-once until reset
        bus.write(0xFF50, 0x00);
        assert!(!bus.boot_rom_enabled());

        bus.reset();
        assert_eq!(bus.boot_rom_enabled(), !cfg!(feature = "skip-bootrom"));
    }

    #[test]
    fn test_oam_dma_from_wram() {
        let mut bus = GbBus::new();
        for i in 0..0xA0u16 {
            bus.write(0xC000 + i, 0xAB);
        }
        bus.write(0xFF46, 0xC0);
        for i in 0..0xA0u16 {
            assert_eq!(bus.read(0xFE00 + i), 0xAB, "oam byte {}", i);
        }
        // The written page reads back
        assert_eq!(bus.read(0xFF46), 0xC0);
    }

    #[test]
    fn test_oam_dma_from_rom() {
        let mut bus = bus_with_cart();
        bus.write(0xFF46, 0x40); // ROM offset 0x4000
        assert_eq!(bus.read(0xFE00), 0x22);
    }

    #[test]
    fn test_interrupt_registers() {
        let mut bus = GbBus::new();
        bus.write(0xFFFF, 0x1F);
        bus.write(0xFF0F, 0x05);
        assert_eq!(bus.read(0xFFFF), 0x1F);
        assert_eq!(bus.read(0xFF0F), 0x05);
    }

    #[test]
    fn test_timer_latch_merges_into_if() {
        let mut bus = GbBus::new();
        bus.write(0xFF05, 0xFF);
        bus.write(0xFF06, 0x20);
        bus.write(0xFF07, 0x05);

        bus.timer.step(16);
        assert_eq!(bus.read(0xFF0F), 0x00);
        bus.sync_interrupts();
        assert_eq!(bus.read(0xFF0F) & 0x04, 0x04);

        // Latch was consumed; IF keeps the bit until software clears it
        bus.sync_interrupts();
        assert_eq!(bus.read(0xFF0F) & 0x04, 0x04);
        bus.write(0xFF0F, 0x00);
        bus.sync_interrupts();
        assert_eq!(bus.read(0xFF0F), 0x00);
    }

    #[test]
    fn test_div_write_resets_through_bus() {
        let mut bus = GbBus::new();
        bus.timer.step(512);
        assert_ne!(bus.read(0xFF04), 0);
        bus.write(0xFF04, 0x77);
        assert_eq!(bus.read(0xFF04), 0);
    }

    #[test]
    fn test_serial_raw_storage() {
        let mut bus = GbBus::new();
        bus.write(0xFF01, 0x69);
        bus.write(0xFF02, 0x81);
        assert_eq!(bus.read(0xFF01), 0x69);
        assert_eq!(bus.read(0xFF02), 0x81);
    }

    #[test]
    fn test_vram_and_oam_route_to_ppu() {
        let mut bus = GbBus::new();
        bus.write(0x8000, 0x3C);
        assert_eq!(bus.ppu.read_vram(0x8000), 0x3C);
        bus.write(0xFE00, 0x28);
        assert_eq!(bus.ppu.read_oam(0xFE00), 0x28);
    }

    #[test]
    fn test_missing_cartridge_floats_high() {
        let mut bus = GbBus::new();
        bus.write(0xFF50, 1); // unmap the boot ROM first
        assert_eq!(bus.read(0x0000), 0xFF);
        assert_eq!(bus.read(0xA000), 0xFF);
    }

    #[test]
    fn test_unimplemented_io_floats_high() {
        let mut bus = GbBus::new();
        bus.write(0xFF7F, 0x55);
        assert_eq!(bus.read(0xFF7F), 0xFF);
        assert_eq!(bus.read(0xFF03), 0xFF);
    }
}
