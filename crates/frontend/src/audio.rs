//! Host audio queue
//!
//! The APU hands over one buffer of unsigned 8-bit samples per frame; they
//! are centered, widened to i16 and duplicated into both stereo channels
//! before being appended to the rodio sink.

use anyhow::{Context, Result};
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamHandle, Sink};

pub struct Audio {
    // The stream must outlive the sink or playback stops
    _stream: OutputStream,
    _handle: OutputStreamHandle,
    sink: Sink,
}

impl Audio {
    pub fn new() -> Result<Self> {
        let (stream, handle) = OutputStream::try_default().context("no audio output device")?;
        let sink = Sink::try_new(&handle).context("failed to create audio sink")?;
        Ok(Self {
            _stream: stream,
            _handle: handle,
            sink,
        })
    }

    pub fn queue(&self, samples: Vec<u8>) {
        if samples.is_empty() {
            return;
        }
        let pcm: Vec<i16> = samples
            .iter()
            .flat_map(|&s| {
                let centered = (s as i16 - 50) * 200;
                [centered, centered]
            })
            .collect();
        self.sink
            .append(SamplesBuffer::new(2, dmg_gb::SAMPLE_RATE, pcm));
    }
}
