//! Centralized logging configuration for the emulator.
//!
//! Subsystem trace output is far too noisy for an unconditional logger, so
//! every category carries its own level and the hot paths check an atomic
//! before formatting anything.
//!
//! # Architecture
//!
//! - **LogConfig**: Thread-safe global configuration using atomic operations
//! - **LogLevel**: Hierarchical log levels (Off < Error < Warn < Info < Debug < Trace)
//! - **LogCategory**: Different logging categories (CPU, Bus, PPU, APU, Timer, Interrupts, Stubs)
//!
//! # Usage
//!
//! ```rust
//! use dmg_core::logging::{LogConfig, LogLevel, LogCategory};
//!
//! // Initialize logging from command-line args
//! LogConfig::global().set_level(LogCategory::Cpu, LogLevel::Debug);
//!
//! // Check if logging is enabled for a category
//! if LogConfig::global().should_log(LogCategory::Cpu, LogLevel::Info) {
//!     eprintln!("CPU: Something happened");
//! }
//! ```

use std::sync::atomic::{AtomicU8, Ordering};

/// Log level for controlling verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Off = 0,
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

impl LogLevel {
    /// Parse log level from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "off" | "0" => Some(LogLevel::Off),
            "error" | "err" | "1" => Some(LogLevel::Error),
            "warn" | "warning" | "2" => Some(LogLevel::Warn),
            "info" | "3" => Some(LogLevel::Info),
            "debug" | "4" => Some(LogLevel::Debug),
            "trace" | "5" => Some(LogLevel::Trace),
            _ => None,
        }
    }

    fn to_u8(self) -> u8 {
        self as u8
    }

    fn from_u8(val: u8) -> Self {
        match val {
            0 => LogLevel::Off,
            1 => LogLevel::Error,
            2 => LogLevel::Warn,
            3 => LogLevel::Info,
            4 => LogLevel::Debug,
            5 => LogLevel::Trace,
            _ => LogLevel::Off,
        }
    }
}

/// Log category for different emulator components
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogCategory {
    /// CPU execution (instruction execution, PC tracing)
    Cpu,
    /// Bus/memory access
    Bus,
    /// PPU (register writes, mode transitions)
    Ppu,
    /// APU/audio
    Apu,
    /// Timer registers and overflow
    Timer,
    /// Interrupt requests and dispatch
    Interrupts,
    /// Unimplemented features/stubs
    Stubs,
}

/// Global logging configuration
pub struct LogConfig {
    /// Global log level (applies to all categories unless overridden)
    global_level: AtomicU8,
    cpu_level: AtomicU8,
    bus_level: AtomicU8,
    ppu_level: AtomicU8,
    apu_level: AtomicU8,
    timer_level: AtomicU8,
    interrupt_level: AtomicU8,
    stub_level: AtomicU8,
}

impl LogConfig {
    /// Create a new LogConfig with all logging disabled
    const fn new() -> Self {
        Self {
            global_level: AtomicU8::new(LogLevel::Off as u8),
            cpu_level: AtomicU8::new(LogLevel::Off as u8),
            bus_level: AtomicU8::new(LogLevel::Off as u8),
            ppu_level: AtomicU8::new(LogLevel::Off as u8),
            apu_level: AtomicU8::new(LogLevel::Off as u8),
            timer_level: AtomicU8::new(LogLevel::Off as u8),
            interrupt_level: AtomicU8::new(LogLevel::Off as u8),
            stub_level: AtomicU8::new(LogLevel::Off as u8),
        }
    }

    /// Get the global singleton instance
    pub fn global() -> &'static Self {
        static INSTANCE: LogConfig = LogConfig::new();
        &INSTANCE
    }

    /// Set the global log level (applies to all categories unless overridden)
    pub fn set_global_level(&self, level: LogLevel) {
        self.global_level.store(level.to_u8(), Ordering::Relaxed);
    }

    /// Get the global log level
    pub fn get_global_level(&self) -> LogLevel {
        LogLevel::from_u8(self.global_level.load(Ordering::Relaxed))
    }

    fn slot(&self, category: LogCategory) -> &AtomicU8 {
        match category {
            LogCategory::Cpu => &self.cpu_level,
            LogCategory::Bus => &self.bus_level,
            LogCategory::Ppu => &self.ppu_level,
            LogCategory::Apu => &self.apu_level,
            LogCategory::Timer => &self.timer_level,
            LogCategory::Interrupts => &self.interrupt_level,
            LogCategory::Stubs => &self.stub_level,
        }
    }

    /// Set log level for a specific category
    pub fn set_level(&self, category: LogCategory, level: LogLevel) {
        self.slot(category).store(level.to_u8(), Ordering::Relaxed);
    }

    /// Get log level for a specific category
    pub fn get_level(&self, category: LogCategory) -> LogLevel {
        LogLevel::from_u8(self.slot(category).load(Ordering::Relaxed))
    }

    /// Check if a message should be logged for the given category and level
    ///
    /// Returns true if:
    /// 1. The category-specific level is set and >= the message level, OR
    /// 2. The category-specific level is Off AND the global level >= the message level
    pub fn should_log(&self, category: LogCategory, level: LogLevel) -> bool {
        let category_level = self.get_level(category);
        if category_level != LogLevel::Off {
            level <= category_level
        } else {
            level <= self.get_global_level()
        }
    }

    /// Reset all logging to Off
    pub fn reset(&self) {
        self.set_global_level(LogLevel::Off);
        self.set_level(LogCategory::Cpu, LogLevel::Off);
        self.set_level(LogCategory::Bus, LogLevel::Off);
        self.set_level(LogCategory::Ppu, LogLevel::Off);
        self.set_level(LogCategory::Apu, LogLevel::Off);
        self.set_level(LogCategory::Timer, LogLevel::Off);
        self.set_level(LogCategory::Interrupts, LogLevel::Off);
        self.set_level(LogCategory::Stubs, LogLevel::Off);
    }
}

/// Convenience macro for logging
#[macro_export]
macro_rules! log {
    ($category:expr, $level:expr, $($arg:tt)*) => {
        if $crate::logging::LogConfig::global().should_log($category, $level) {
            eprintln!($($arg)*);
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::parse("off"), Some(LogLevel::Off));
        assert_eq!(LogLevel::parse("OFF"), Some(LogLevel::Off));
        assert_eq!(LogLevel::parse("0"), Some(LogLevel::Off));

        assert_eq!(LogLevel::parse("error"), Some(LogLevel::Error));
        assert_eq!(LogLevel::parse("ERR"), Some(LogLevel::Error));

        assert_eq!(LogLevel::parse("warn"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("WARNING"), Some(LogLevel::Warn));

        assert_eq!(LogLevel::parse("info"), Some(LogLevel::Info));
        assert_eq!(LogLevel::parse("debug"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("trace"), Some(LogLevel::Trace));
        assert_eq!(LogLevel::parse("5"), Some(LogLevel::Trace));

        assert_eq!(LogLevel::parse("invalid"), None);
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Off < LogLevel::Error);
        assert!(LogLevel::Error < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Info);
        assert!(LogLevel::Info < LogLevel::Debug);
        assert!(LogLevel::Debug < LogLevel::Trace);
    }

    #[test]
    fn test_log_config_global_level() {
        let config = LogConfig::new();
        assert_eq!(config.get_global_level(), LogLevel::Off);

        config.set_global_level(LogLevel::Info);
        assert_eq!(config.get_global_level(), LogLevel::Info);
    }

    #[test]
    fn test_log_config_category_levels() {
        let config = LogConfig::new();

        assert_eq!(config.get_level(LogCategory::Cpu), LogLevel::Off);
        assert_eq!(config.get_level(LogCategory::Bus), LogLevel::Off);

        config.set_level(LogCategory::Cpu, LogLevel::Debug);
        assert_eq!(config.get_level(LogCategory::Cpu), LogLevel::Debug);
        assert_eq!(config.get_level(LogCategory::Bus), LogLevel::Off);
    }

    #[test]
    fn test_should_log_with_category_level() {
        let config = LogConfig::new();
        config.set_level(LogCategory::Timer, LogLevel::Info);

        assert!(config.should_log(LogCategory::Timer, LogLevel::Error));
        assert!(config.should_log(LogCategory::Timer, LogLevel::Warn));
        assert!(config.should_log(LogCategory::Timer, LogLevel::Info));

        assert!(!config.should_log(LogCategory::Timer, LogLevel::Debug));
        assert!(!config.should_log(LogCategory::Timer, LogLevel::Trace));
    }

    #[test]
    fn test_should_log_with_global_level() {
        let config = LogConfig::new();
        config.set_global_level(LogLevel::Warn);

        // CPU has no specific level, should use global
        assert!(config.should_log(LogCategory::Cpu, LogLevel::Error));
        assert!(config.should_log(LogCategory::Cpu, LogLevel::Warn));
        assert!(!config.should_log(LogCategory::Cpu, LogLevel::Info));
    }

    #[test]
    fn test_category_level_overrides_global() {
        let config = LogConfig::new();
        config.set_global_level(LogLevel::Error);
        config.set_level(LogCategory::Cpu, LogLevel::Debug);

        assert!(config.should_log(LogCategory::Cpu, LogLevel::Debug));

        assert!(!config.should_log(LogCategory::Bus, LogLevel::Warn));
        assert!(config.should_log(LogCategory::Bus, LogLevel::Error));
    }

    #[test]
    fn test_reset() {
        let config = LogConfig::new();
        config.set_global_level(LogLevel::Trace);
        config.set_level(LogCategory::Cpu, LogLevel::Debug);
        config.set_level(LogCategory::Bus, LogLevel::Info);

        config.reset();

        assert_eq!(config.get_global_level(), LogLevel::Off);
        assert_eq!(config.get_level(LogCategory::Cpu), LogLevel::Off);
        assert_eq!(config.get_level(LogCategory::Bus), LogLevel::Off);
    }
}
