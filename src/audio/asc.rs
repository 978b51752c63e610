//! MPEG-4 AudioSpecificConfig helpers.
//!
//! The engine is configured through an AudioSpecificConfig (codec extradata).
//! When the host only knows the sample rate and channel count, an AAC-LC
//! config is synthesized from them.

use super::engine::EngineError;

/// Sample rate index to frequency mapping per ISO/IEC 14496-3
pub const SAMPLE_RATE_TABLE: [u32; 13] = [
    96000, 88200, 64000, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000, 7350,
];

/// Escape index: an explicit 24-bit sample rate follows.
const SAMPLE_RATE_ESCAPE: u8 = 0x0F;

pub const OBJECT_TYPE_AAC_LC: u8 = 2;

/// Decoded samples per channel for the default (non-960) frame length.
pub const AAC_FRAME_SAMPLES: usize = 1024;

pub fn sample_rate_from_index(index: u8) -> Option<u32> {
    SAMPLE_RATE_TABLE.get(index as usize).copied()
}

pub fn sample_rate_index(sample_rate: u32) -> Option<u8> {
    SAMPLE_RATE_TABLE
        .iter()
        .position(|&rate| rate == sample_rate)
        .map(|i| i as u8)
}

/// Channel configuration for a plain channel count (0 = needs a PCE).
pub fn channel_config(channels: u32) -> u8 {
    match channels {
        1..=6 => channels as u8,
        8 => 7,
        _ => 0,
    }
}

pub fn channels_from_config(config: u8) -> Option<u32> {
    match config {
        1..=6 => Some(config as u32),
        7 => Some(8),
        _ => None,
    }
}

/// Parsed AudioSpecificConfig (the parts this crate needs).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioSpecificConfig {
    pub object_type: u8,
    pub sample_rate: u32,
    /// 0 when the layout comes from a program config element
    pub channel_config: u8,
    /// 960-sample frames instead of 1024
    pub short_frame: bool,
}

impl AudioSpecificConfig {
    /// AAC-LC config for a sample rate and channel count.
    ///
    /// Returns `None` when the channel count has no channel configuration.
    pub fn aac_lc(sample_rate: u32, channels: u32) -> Option<Self> {
        let channel_config = channel_config(channels);
        if channel_config == 0 {
            return None;
        }
        Some(Self {
            object_type: OBJECT_TYPE_AAC_LC,
            sample_rate,
            channel_config,
            short_frame: false,
        })
    }

    pub fn channels(&self) -> Option<u32> {
        channels_from_config(self.channel_config)
    }

    pub fn frame_samples(&self) -> usize {
        if self.short_frame { 960 } else { AAC_FRAME_SAMPLES }
    }

    /// Serialize, followed by a GASpecificConfig with every flag cleared
    /// except frameLengthFlag.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = BitWriter::default();
        w.put(self.object_type as u32, 5);
        match sample_rate_index(self.sample_rate) {
            Some(index) => w.put(index as u32, 4),
            None => {
                w.put(SAMPLE_RATE_ESCAPE as u32, 4);
                w.put(self.sample_rate & 0x00FF_FFFF, 24);
            }
        }
        w.put(self.channel_config as u32, 4);
        // frameLengthFlag, dependsOnCoreCoder, extensionFlag
        w.put(self.short_frame as u32, 1);
        w.put(0, 1);
        w.put(0, 1);
        w.finish()
    }

    pub fn parse(data: &[u8]) -> Result<Self, EngineError> {
        let mut r = BitReader::new(data);
        let mut object_type = r.get(5)? as u8;
        if object_type == 31 {
            object_type = 32 + r.get(6)? as u8;
        }

        let index = r.get(4)? as u8;
        let sample_rate = if index == SAMPLE_RATE_ESCAPE {
            r.get(24)?
        } else {
            sample_rate_from_index(index).ok_or_else(|| {
                EngineError::InvalidData(format!("asc: reserved sample rate index {}", index))
            })?
        };
        let channel_config = r.get(4)? as u8;

        // GASpecificConfig is only present for the AAC object types
        let short_frame = match object_type {
            1..=4 | 6 | 7 | 17 | 19..=23 => r.get(1).map(|b| b == 1).unwrap_or(false),
            _ => false,
        };

        Ok(Self {
            object_type,
            sample_rate,
            channel_config,
            short_frame,
        })
    }
}

#[derive(Default)]
struct BitWriter {
    bytes: Vec<u8>,
    acc: u64,
    bits: u32,
}

impl BitWriter {
    fn put(&mut self, value: u32, width: u32) {
        self.acc = (self.acc << width) | (value as u64 & ((1u64 << width) - 1));
        self.bits += width;
        while self.bits >= 8 {
            self.bits -= 8;
            self.bytes.push((self.acc >> self.bits) as u8);
        }
    }

    fn finish(mut self) -> Vec<u8> {
        if self.bits > 0 {
            self.bytes.push((self.acc << (8 - self.bits)) as u8);
        }
        self.bytes
    }
}

struct BitReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn get(&mut self, width: usize) -> Result<u32, EngineError> {
        if self.pos + width > self.data.len() * 8 {
            return Err(EngineError::InvalidData("asc: truncated".into()));
        }
        let mut value = 0u32;
        for _ in 0..width {
            let byte = self.data[self.pos / 8];
            let bit = (byte >> (7 - self.pos % 8)) & 1;
            value = (value << 1) | bit as u32;
            self.pos += 1;
        }
        Ok(value)
    }
}
