//! Contract between the decoder context and the native decode engine.
//!
//! The engine is the only component that understands the AAC bitstream. It
//! accepts padded packets, buffers decoded output internally and hands out one
//! `DecodedFrame` per `receive_frame` call:
//!
//! - `send_packet` ok → zero or more frames may now be available
//! - `receive_frame` → `Again` means "send more input first"
//! - after `send_eof`, `receive_frame` drains the queue and then reports `Eof`

use std::fmt;

use thiserror::Error;

use super::packet::PaddedPacket;

/// Trailing zero bytes required after every compressed unit handed to an
/// engine (same value as libavcodec's `AV_INPUT_BUFFER_PADDING_SIZE`).
pub const INPUT_BUFFER_PADDING_SIZE: usize = 64;

/// Engine-level errors.
///
/// `Again` and `Eof` are state-machine signals, not failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Like `EAGAIN`: input needed (receive) or output must be drained (send).
    #[error("again: drive the other side of the codec first")]
    Again,

    /// End of stream was signalled and every frame has been drained.
    #[error("end of stream")]
    Eof,

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("{0}")]
    Other(String),
}

impl EngineError {
    pub const fn is_again(&self) -> bool {
        matches!(self, EngineError::Again)
    }

    pub const fn is_eof(&self) -> bool {
        matches!(self, EngineError::Eof)
    }
}

/// Sample representation of a decoded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleFormat {
    U8 { planar: bool },
    U16 { planar: bool },
    U24 { planar: bool },
    U32 { planar: bool },
    S8 { planar: bool },
    S16 { planar: bool },
    S24 { planar: bool },
    S32 { planar: bool },
    F32 { planar: bool },
    F64 { planar: bool },
}

impl SampleFormat {
    /// The one representation the conversion path accepts.
    pub const PLANAR_F32: SampleFormat = SampleFormat::F32 { planar: true };

    pub fn is_planar(&self) -> bool {
        match *self {
            SampleFormat::U8 { planar }
            | SampleFormat::U16 { planar }
            | SampleFormat::U24 { planar }
            | SampleFormat::U32 { planar }
            | SampleFormat::S8 { planar }
            | SampleFormat::S16 { planar }
            | SampleFormat::S24 { planar }
            | SampleFormat::S32 { planar }
            | SampleFormat::F32 { planar }
            | SampleFormat::F64 { planar } => planar,
        }
    }

    fn short_name(&self) -> &'static str {
        match self {
            SampleFormat::U8 { .. } => "u8",
            SampleFormat::U16 { .. } => "u16",
            SampleFormat::U24 { .. } => "u24",
            SampleFormat::U32 { .. } => "u32",
            SampleFormat::S8 { .. } => "s8",
            SampleFormat::S16 { .. } => "s16",
            SampleFormat::S24 { .. } => "s24",
            SampleFormat::S32 { .. } => "s32",
            SampleFormat::F32 { .. } => "flt",
            SampleFormat::F64 { .. } => "dbl",
        }
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // ffmpeg style: "fltp" for planar float, "flt" for interleaved
        if self.is_planar() {
            write!(f, "{}p", self.short_name())
        } else {
            write!(f, "{}", self.short_name())
        }
    }
}

/// Decoded sample payload as produced by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameSamples {
    /// One `Vec<f32>` per channel, each `samples` long.
    PlanarF32(Vec<Vec<f32>>),
    /// Anything else. The payload is not carried because the core refuses to
    /// reinterpret it.
    Unsupported(SampleFormat),
}

/// One decoded frame, owned by the engine until `receive_frame` hands it out.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedFrame {
    /// Samples per channel
    pub samples: usize,
    /// Channel count reported for this frame (may differ from the configured count)
    pub channels: usize,
    pub sample_rate: u32,
    pub data: FrameSamples,
}

impl DecodedFrame {
    /// Build a planar f32 frame; `samples` is taken from the first plane.
    pub fn planar_f32(sample_rate: u32, planes: Vec<Vec<f32>>) -> Self {
        let samples = planes.first().map_or(0, Vec::len);
        Self {
            samples,
            channels: planes.len(),
            sample_rate,
            data: FrameSamples::PlanarF32(planes),
        }
    }

    pub fn format(&self) -> SampleFormat {
        match &self.data {
            FrameSamples::PlanarF32(_) => SampleFormat::PLANAR_F32,
            FrameSamples::Unsupported(format) => *format,
        }
    }

    /// Interleaved sample count (`channels * samples`).
    pub fn interleaved_len(&self) -> usize {
        self.channels * self.samples
    }
}

/// An opaque decode engine.
///
/// Implementations are single-threaded state machines; `Send` lets the owning
/// context move to a dedicated decode thread.
pub trait DecodeEngine: Send {
    /// Engine name (for logs).
    fn name(&self) -> &'static str;

    /// Zero bytes the engine's bitstream reader may read past the payload.
    fn input_padding(&self) -> usize {
        INPUT_BUFFER_PADDING_SIZE
    }

    /// Submit one compressed unit.
    fn send_packet(&mut self, packet: &PaddedPacket) -> Result<(), EngineError>;

    /// Signal that no more input will follow.
    fn send_eof(&mut self) -> Result<(), EngineError>;

    /// Take the next decoded frame.
    fn receive_frame(&mut self) -> Result<DecodedFrame, EngineError>;

    /// Drop buffered input/output and return to the initial state.
    fn reset(&mut self);

    fn channels(&self) -> u32;

    fn sample_rate(&self) -> u32;

    /// Bits per second of the most recent decoded unit, 0 before the first frame.
    fn bit_rate(&self) -> u32;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_format_display_matches_ffmpeg_names() {
        assert_eq!(SampleFormat::PLANAR_F32.to_string(), "fltp");
        assert_eq!(SampleFormat::F32 { planar: false }.to_string(), "flt");
        assert_eq!(SampleFormat::S16 { planar: true }.to_string(), "s16p");
    }

    #[test]
    fn planar_frame_reports_its_shape() {
        let frame = DecodedFrame::planar_f32(44100, vec![vec![0.0; 960], vec![0.0; 960]]);
        assert_eq!(frame.samples, 960);
        assert_eq!(frame.channels, 2);
        assert_eq!(frame.interleaved_len(), 1920);
        assert_eq!(frame.format(), SampleFormat::PLANAR_F32);
    }

    #[test]
    fn again_and_eof_are_signals() {
        assert!(EngineError::Again.is_again());
        assert!(EngineError::Eof.is_eof());
        assert!(!EngineError::InvalidData("x".into()).is_again());
    }
}
