//! Cartridge loading and header parsing
//!
//! The cartridge header at 0x100-0x14F describes the hardware in the shell;
//! only three bytes matter here: 0x147 (mapper type), 0x148 (ROM size code)
//! and 0x149 (external RAM size code). Supported mapper types are ROM-only
//! (0x00), the MBC1 family (0x01-0x03) and the MBC3 family (0x11-0x13).

use crate::mappers::{Mapper, Mbc0, Mbc1, Mbc3};

/// Largest ROM image the supported mappers can address (2 MiB)
pub const MAX_ROM_SIZE: usize = 1 << 21;

/// External RAM sizes by header code 0x149
const RAM_SIZES: [usize; 4] = [0, 2048, 8192, 32768];

#[derive(thiserror::Error, Debug)]
pub enum CartridgeError {
    #[error("ROM image too small to carry a header ({0} bytes)")]
    TooSmall(usize),
    #[error("ROM image exceeds maximum size ({0} bytes)")]
    TooLarge(usize),
    #[error("unsupported cartridge type {0:#04x}")]
    UnsupportedType(u8),
    #[error("unsupported ROM size code {0:#04x}")]
    UnsupportedRomSize(u8),
    #[error("unsupported RAM size code {0:#04x}")]
    UnsupportedRamSize(u8),
}

/// A loaded cartridge: ROM image, external RAM and the mapper between them
#[derive(Debug)]
pub struct Cartridge {
    mapper: Mapper,
    cart_type: u8,
    rom_banks: usize,
    ram_size: usize,
}

impl Cartridge {
    /// Parse the header and build the matching mapper
    pub fn from_rom(rom: Vec<u8>) -> Result<Self, CartridgeError> {
        if rom.len() < 0x150 {
            return Err(CartridgeError::TooSmall(rom.len()));
        }
        if rom.len() > MAX_ROM_SIZE {
            return Err(CartridgeError::TooLarge(rom.len()));
        }

        let cart_type = rom[0x147];
        let rom_size_code = rom[0x148];
        let ram_size_code = rom[0x149];

        if rom_size_code > 8 {
            return Err(CartridgeError::UnsupportedRomSize(rom_size_code));
        }
        let rom_banks = 2usize << rom_size_code;

        let ram_size = *RAM_SIZES
            .get(ram_size_code as usize)
            .ok_or(CartridgeError::UnsupportedRamSize(ram_size_code))?;
        let ram = vec![0; ram_size];

        let mapper = match cart_type {
            0x00 => Mapper::Mbc0(Mbc0::new(rom, ram)),
            0x01..=0x03 => Mapper::Mbc1(Mbc1::new(rom, ram, rom_banks)),
            0x11..=0x13 => Mapper::Mbc3(Mbc3::new(rom, ram, rom_banks)),
            other => return Err(CartridgeError::UnsupportedType(other)),
        };

        Ok(Self {
            mapper,
            cart_type,
            rom_banks,
            ram_size,
        })
    }

    /// Read from the cartridge ROM window (0x0000-0x7FFF)
    pub fn read_rom(&self, addr: u16) -> u8 {
        self.mapper.read_rom(addr)
    }

    /// Write to the ROM window (mapper register traffic)
    pub fn write_rom(&mut self, addr: u16, val: u8) {
        self.mapper.write_rom(addr, val);
    }

    /// Read from the external RAM window (0xA000-0xBFFF)
    pub fn read_ram(&self, addr: u16) -> u8 {
        self.mapper.read_ram(addr)
    }

    /// Write to the external RAM window
    pub fn write_ram(&mut self, addr: u16, val: u8) {
        self.mapper.write_ram(addr, val);
    }

    /// Reset banking state; RAM contents survive, matching battery backing
    pub fn reset(&mut self) {
        self.mapper.reset();
    }

    /// True when the shell carries a battery behind the external RAM
    pub fn has_battery(&self) -> bool {
        matches!(self.cart_type, 0x03 | 0x13)
    }

    /// The raw external-RAM image, for save-file persistence
    pub fn ram(&self) -> &[u8] {
        self.mapper.ram()
    }

    /// Restore external RAM from a persisted save image
    pub fn load_ram(&mut self, data: &[u8]) {
        self.mapper.load_ram(data);
    }

    pub fn rom_banks(&self) -> usize {
        self.rom_banks
    }

    pub fn ram_size(&self) -> usize {
        self.ram_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn rom_with_header(cart_type: u8, rom_size_code: u8, ram_size_code: u8) -> Vec<u8> {
        let banks = 2usize << rom_size_code;
        let mut rom = vec![0; banks * 0x4000];
        rom[0x147] = cart_type;
        rom[0x148] = rom_size_code;
        rom[0x149] = ram_size_code;
        rom
    }

    #[test]
    fn test_header_parsing() {
        let cart = Cartridge::from_rom(rom_with_header(0x00, 0, 0)).unwrap();
        assert_eq!(cart.rom_banks(), 2);
        assert_eq!(cart.ram_size(), 0);
        assert!(!cart.has_battery());

        let cart = Cartridge::from_rom(rom_with_header(0x03, 2, 3)).unwrap();
        assert_eq!(cart.rom_banks(), 8);
        assert_eq!(cart.ram_size(), 32768);
        assert!(cart.has_battery());
    }

    #[test]
    fn test_mapper_selection() {
        let cart = Cartridge::from_rom(rom_with_header(0x00, 0, 0)).unwrap();
        assert_eq!(cart.mapper.name(), "MBC0");
        let cart = Cartridge::from_rom(rom_with_header(0x01, 1, 0)).unwrap();
        assert_eq!(cart.mapper.name(), "MBC1");
        let cart = Cartridge::from_rom(rom_with_header(0x02, 1, 2)).unwrap();
        assert_eq!(cart.mapper.name(), "MBC1");
        let cart = Cartridge::from_rom(rom_with_header(0x11, 1, 0)).unwrap();
        assert_eq!(cart.mapper.name(), "MBC3");
        let cart = Cartridge::from_rom(rom_with_header(0x13, 1, 3)).unwrap();
        assert_eq!(cart.mapper.name(), "MBC3");
    }

    #[test]
    fn test_unsupported_type_rejected() {
        // MBC5 is not in the supported set
        let err = Cartridge::from_rom(rom_with_header(0x19, 0, 0)).unwrap_err();
        assert!(matches!(err, CartridgeError::UnsupportedType(0x19)));
    }

    #[test]
    fn test_undersized_image_rejected() {
        let err = Cartridge::from_rom(vec![0; 0x100]).unwrap_err();
        assert!(matches!(err, CartridgeError::TooSmall(0x100)));
    }

    #[test]
    fn test_oversized_image_rejected() {
        let err = Cartridge::from_rom(vec![0; MAX_ROM_SIZE + 1]).unwrap_err();
        assert!(matches!(err, CartridgeError::TooLarge(_)));
    }

    #[test]
    fn test_bank_switch_through_cartridge() {
        let mut rom = rom_with_header(0x01, 2, 0); // 8 banks
        for bank in 0..8 {
            rom[bank * 0x4000] = 0xB0 | bank as u8;
        }

        let mut cart = Cartridge::from_rom(rom).unwrap();
        cart.write_rom(0x2100, 0x00);
        assert_eq!(cart.read_rom(0x4000), 0xB1);
        cart.write_rom(0x2100, 0x05);
        assert_eq!(cart.read_rom(0x4000), 0xB5);
    }

    #[test]
    fn test_save_ram_roundtrip() {
        let mut cart = Cartridge::from_rom(rom_with_header(0x03, 0, 2)).unwrap();
        cart.write_rom(0x0000, 0x0A);
        cart.write_ram(0xA000, 0x77);
        cart.write_ram(0xA001, 0x88);

        let image = cart.ram().to_vec();
        assert_eq!(image.len(), 8192);
        assert_eq!(&image[..2], &[0x77, 0x88]);

        let mut restored = Cartridge::from_rom(rom_with_header(0x03, 0, 2)).unwrap();
        restored.load_ram(&image);
        restored.write_rom(0x0000, 0x0A);
        assert_eq!(restored.read_ram(0xA000), 0x77);
        assert_eq!(restored.read_ram(0xA001), 0x88);
    }
}
