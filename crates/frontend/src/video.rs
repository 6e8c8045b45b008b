//! Host window and framebuffer presentation

use anyhow::{bail, Context, Result};
use dmg_core::types::Frame;
use dmg_gb::{SCREEN_HEIGHT, SCREEN_WIDTH};
use minifb::{Scale, Window, WindowOptions};

/// The emulator window; one `present` per emulated VBlank
pub struct Video {
    pub window: Window,
}

impl Video {
    pub fn new(scale: u32) -> Result<Self> {
        let scale = match scale {
            1 => Scale::X1,
            2 => Scale::X2,
            4 => Scale::X4,
            8 => Scale::X8,
            other => bail!("unsupported scale {} (use 1, 2, 4 or 8)", other),
        };
        let mut window = Window::new(
            "dotmatrix",
            SCREEN_WIDTH,
            SCREEN_HEIGHT,
            WindowOptions {
                scale,
                ..WindowOptions::default()
            },
        )
        .context("failed to create window")?;
        // The emulated machine runs at ~59.73 Hz; the host paces to 60
        window.set_target_fps(60);
        Ok(Self { window })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn present(&mut self, frame: &Frame) -> Result<()> {
        self.window
            .update_with_buffer(&frame.pixels, frame.width as usize, frame.height as usize)
            .context("failed to present frame")
    }
}
