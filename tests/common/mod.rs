//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use aac_stream_decoder::audio::{
    DecodeEngine, DecodedFrame, EngineError, FrameSamples, PaddedPacket, SampleFormat,
};

/// First payload byte that makes `ScriptedEngine` reject a unit.
pub const BAD_UNIT_MARKER: u8 = 0xBA;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// What the engine saw for each submitted packet: (payload size, padded size, padding all zero).
pub type PacketLog = Arc<Mutex<Vec<(usize, usize, bool)>>>;

/// A decode engine driven by a script instead of a bitstream:
///
/// - every accepted unit yields one frame of `frame_samples` samples
/// - plane `c` is filled with `levels[c]`
/// - a unit whose first byte is `BAD_UNIT_MARKER` is rejected as invalid data
/// - the first `delay` accepted units produce nothing (decoder warm-up)
pub struct ScriptedEngine {
    pub sample_rate: u32,
    pub channels: u32,
    pub frame_samples: usize,
    pub levels: Vec<f32>,
    pub format: SampleFormat,
    pub max_pending: usize,
    pub delay: usize,
    pub packets: PacketLog,
    pending: VecDeque<DecodedFrame>,
    accepted: usize,
    eof: bool,
    bit_rate: u32,
}

impl ScriptedEngine {
    pub fn new(sample_rate: u32, channels: u32) -> Self {
        let levels = (0..channels)
            .map(|c| if c % 2 == 0 { 0.5 } else { -0.5 })
            .collect();
        Self {
            sample_rate,
            channels,
            frame_samples: 1024,
            levels,
            format: SampleFormat::PLANAR_F32,
            max_pending: 8,
            delay: 0,
            packets: Arc::new(Mutex::new(Vec::new())),
            pending: VecDeque::new(),
            accepted: 0,
            eof: false,
            bit_rate: 0,
        }
    }

    pub fn with_levels(mut self, levels: Vec<f32>) -> Self {
        self.levels = levels;
        self
    }

    pub fn with_format(mut self, format: SampleFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_max_pending(mut self, max_pending: usize) -> Self {
        self.max_pending = max_pending;
        self
    }

    pub fn with_delay(mut self, delay: usize) -> Self {
        self.delay = delay;
        self
    }

    fn make_frame(&self) -> DecodedFrame {
        if self.format != SampleFormat::PLANAR_F32 {
            return DecodedFrame {
                samples: self.frame_samples,
                channels: self.levels.len(),
                sample_rate: self.sample_rate,
                data: FrameSamples::Unsupported(self.format),
            };
        }
        let planes = self
            .levels
            .iter()
            .map(|&level| vec![level; self.frame_samples])
            .collect();
        DecodedFrame::planar_f32(self.sample_rate, planes)
    }
}

impl DecodeEngine for ScriptedEngine {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn send_packet(&mut self, packet: &PaddedPacket) -> Result<(), EngineError> {
        let padding_zero = packet.padded()[packet.size()..].iter().all(|&b| b == 0);
        self.packets
            .lock()
            .unwrap()
            .push((packet.size(), packet.padded().len(), padding_zero));

        if self.eof {
            return Err(EngineError::Other("input already ended".into()));
        }
        if self.pending.len() >= self.max_pending {
            return Err(EngineError::Again);
        }
        if packet.payload().first() == Some(&BAD_UNIT_MARKER) {
            return Err(EngineError::InvalidData("scripted corruption".into()));
        }

        self.accepted += 1;
        if self.accepted <= self.delay {
            return Ok(());
        }
        self.bit_rate = (packet.size() * 8 * self.sample_rate as usize / self.frame_samples) as u32;
        let frame = self.make_frame();
        self.pending.push_back(frame);
        Ok(())
    }

    fn send_eof(&mut self) -> Result<(), EngineError> {
        self.eof = true;
        Ok(())
    }

    fn receive_frame(&mut self) -> Result<DecodedFrame, EngineError> {
        match self.pending.pop_front() {
            Some(frame) => Ok(frame),
            None if self.eof => Err(EngineError::Eof),
            None => Err(EngineError::Again),
        }
    }

    fn reset(&mut self) {
        self.pending.clear();
        self.accepted = 0;
        self.eof = false;
    }

    fn channels(&self) -> u32 {
        self.channels
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn bit_rate(&self) -> u32 {
        self.bit_rate
    }
}

/// A well-formed unit for the scripted engine.
pub fn good_unit(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8 & 0x7F).collect()
}

/// A unit the scripted engine rejects.
pub fn bad_unit(len: usize) -> Vec<u8> {
    let mut unit = good_unit(len);
    unit[0] = BAD_UNIT_MARKER;
    unit
}

/// Reproducible noise for corrupt-input tests.
pub fn random_unit(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            (state >> 56) as u8
        })
        .collect()
}

// ======================== Real AAC-LC bitstreams ========================

/// Silent mono raw_data_block: SCE with max_sfb = 0, then END.
pub const SILENT_MONO_FRAME: [u8; 4] = [0x00, 0x00, 0x00, 0x07];

/// Silent stereo raw_data_block: CPE (no common window), two empty ICS, END.
pub const SILENT_STEREO_FRAME: [u8; 7] = [0x20, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0E];

/// Wrap a raw AAC-LC payload in a CRC-less ADTS header.
pub fn adts_wrap(sr_index: u8, channel_config: u8, payload: &[u8]) -> Vec<u8> {
    let frame_length = payload.len() + 7;
    let fullness = 0x7FFusize;
    let mut unit = vec![
        0xFF,
        0xF1,
        (1 << 6) | (sr_index << 2) | (channel_config >> 2),
        ((channel_config & 0x03) << 6) | ((frame_length >> 11) & 0x03) as u8,
        ((frame_length >> 3) & 0xFF) as u8,
        (((frame_length & 0x07) << 5) | (fullness >> 6)) as u8,
        ((fullness & 0x3F) << 2) as u8,
    ];
    unit.extend_from_slice(payload);
    unit
}
