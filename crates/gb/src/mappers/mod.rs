//! Game Boy Memory Bank Controllers (MBCs)
//!
//! This module contains implementations of the cartridge mappers that handle
//! ROM/RAM banking and other cartridge hardware features.

mod mbc0;
mod mbc1;
mod mbc3;

pub use mbc0::Mbc0;
pub use mbc1::Mbc1;
pub use mbc3::Mbc3;

/// Unified mapper enum that dispatches to specific implementations
#[derive(Debug)]
pub enum Mapper {
    Mbc0(Mbc0),
    Mbc1(Mbc1),
    Mbc3(Mbc3),
}

impl Mapper {
    /// Read from ROM address space (0x0000-0x7FFF)
    pub fn read_rom(&self, addr: u16) -> u8 {
        match self {
            Mapper::Mbc0(m) => m.read_rom(addr),
            Mapper::Mbc1(m) => m.read_rom(addr),
            Mapper::Mbc3(m) => m.read_rom(addr),
        }
    }

    /// Write to ROM address space (for mapper registers)
    pub fn write_rom(&mut self, addr: u16, val: u8) {
        match self {
            Mapper::Mbc0(m) => m.write_rom(addr, val),
            Mapper::Mbc1(m) => m.write_rom(addr, val),
            Mapper::Mbc3(m) => m.write_rom(addr, val),
        }
    }

    /// Read from external RAM address space (0xA000-0xBFFF)
    pub fn read_ram(&self, addr: u16) -> u8 {
        match self {
            Mapper::Mbc0(m) => m.read_ram(addr),
            Mapper::Mbc1(m) => m.read_ram(addr),
            Mapper::Mbc3(m) => m.read_ram(addr),
        }
    }

    /// Write to external RAM address space
    pub fn write_ram(&mut self, addr: u16, val: u8) {
        match self {
            Mapper::Mbc0(m) => m.write_ram(addr, val),
            Mapper::Mbc1(m) => m.write_ram(addr, val),
            Mapper::Mbc3(m) => m.write_ram(addr, val),
        }
    }

    /// Reset banking registers to power-on defaults (RAM contents survive)
    pub fn reset(&mut self) {
        match self {
            Mapper::Mbc0(_) => {}
            Mapper::Mbc1(m) => m.reset(),
            Mapper::Mbc3(m) => m.reset(),
        }
    }

    /// Borrow the external RAM image
    pub fn ram(&self) -> &[u8] {
        match self {
            Mapper::Mbc0(m) => m.ram(),
            Mapper::Mbc1(m) => m.ram(),
            Mapper::Mbc3(m) => m.ram(),
        }
    }

    /// Overwrite the external RAM image (from a persisted save)
    pub fn load_ram(&mut self, data: &[u8]) {
        let ram = match self {
            Mapper::Mbc0(m) => m.ram_mut(),
            Mapper::Mbc1(m) => m.ram_mut(),
            Mapper::Mbc3(m) => m.ram_mut(),
        };
        let len = ram.len().min(data.len());
        ram[..len].copy_from_slice(&data[..len]);
    }

    /// Get the mapper name
    #[cfg(test)]
    pub fn name(&self) -> &str {
        match self {
            Mapper::Mbc0(_) => "MBC0",
            Mapper::Mbc1(_) => "MBC1",
            Mapper::Mbc3(_) => "MBC3",
        }
    }
}
