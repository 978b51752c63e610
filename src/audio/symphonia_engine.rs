//! AAC decode engine backed by Symphonia's AAC-LC decoder.
//!
//! Symphonia decodes synchronously, so each accepted packet is decoded inside
//! `send_packet` and the result is parked in a bounded queue until the context
//! asks for it. A full queue rejects input with `Again`, the same contract
//! libavcodec's `avcodec_send_packet` has.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};

use symphonia::core::audio::{AudioBufferRef, Channels, Signal};
use symphonia::core::codecs::{CodecParameters, Decoder, DecoderOptions, CODEC_TYPE_AAC};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::Packet;

use super::adts;
use super::asc::{sample_rate_index, AudioSpecificConfig, AAC_FRAME_SAMPLES};
use super::engine::{DecodeEngine, DecodedFrame, EngineError, FrameSamples, SampleFormat};
use super::packet::PaddedPacket;

/// Symphonia AAC engine.
pub struct SymphoniaAacEngine {
    decoder: Box<dyn Decoder>,
    pending: VecDeque<DecodedFrame>,
    max_pending: usize,
    sample_rate: u32,
    channels: u32,
    bit_rate: u32,
    /// Running timestamp in samples, only used to label packets
    next_ts: u64,
    eof: bool,
}

impl SymphoniaAacEngine {
    /// Open an AAC-LC engine for a sample rate and channel count.
    ///
    /// * `sample_rate` - Stream sample rate (e.g. 44100, 48000)
    /// * `channels`    - Stream channel count
    /// * `max_pending` - Decoded frames held before `send_packet` returns `Again`
    pub fn open(sample_rate: u32, channels: u32, max_pending: usize) -> Result<Self, EngineError> {
        // Symphonia misreads the explicit 24-bit rate escape, so off-table
        // rates go through plain codec parameters
        let extradata = sample_rate_index(sample_rate)
            .and_then(|_| AudioSpecificConfig::aac_lc(sample_rate, channels))
            .map(|asc| asc.to_bytes());
        Self::open_inner(sample_rate, channels, extradata, max_pending)
    }

    /// Open with extradata supplied by a demuxer (mp4 `esds`, mkv CodecPrivate).
    pub fn open_with_asc(
        sample_rate: u32,
        channels: u32,
        asc: &[u8],
        max_pending: usize,
    ) -> Result<Self, EngineError> {
        let parsed = AudioSpecificConfig::parse(asc)?;
        log::debug!(
            "AAC extradata: object_type={}, rate={}, channel_config={}, frame={}",
            parsed.object_type,
            parsed.sample_rate,
            parsed.channel_config,
            parsed.frame_samples(),
        );
        // extradata wins over the caller's numbers
        let sample_rate = if parsed.sample_rate > 0 { parsed.sample_rate } else { sample_rate };
        let channels = parsed.channels().unwrap_or(channels);
        let extradata = sample_rate_index(sample_rate).map(|_| asc.to_vec());
        Self::open_inner(sample_rate, channels, extradata, max_pending)
    }

    fn open_inner(
        sample_rate: u32,
        channels: u32,
        extradata: Option<Vec<u8>>,
        max_pending: usize,
    ) -> Result<Self, EngineError> {
        let layout = channel_layout(channels).ok_or_else(|| {
            EngineError::Unsupported(format!("no channel layout for {} channels", channels))
        })?;

        let mut codec_params = CodecParameters::new();
        codec_params
            .for_codec(CODEC_TYPE_AAC)
            .with_sample_rate(sample_rate)
            .with_channels(layout);
        if let Some(extra) = extradata {
            codec_params.with_extra_data(extra.into_boxed_slice());
        }

        let decoder = symphonia::default::get_codecs()
            .make(&codec_params, &DecoderOptions::default())
            .map_err(|e| match e {
                SymphoniaError::Unsupported(msg) => EngineError::Unsupported(msg.to_string()),
                other => EngineError::Other(format!("failed to create AAC decoder: {}", other)),
            })?;

        Ok(Self {
            decoder,
            pending: VecDeque::new(),
            max_pending: max_pending.max(1),
            sample_rate,
            channels,
            bit_rate: 0,
            next_ts: 0,
            eof: false,
        })
    }

    /// Frames decoded but not yet received.
    pub fn pending_frames(&self) -> usize {
        self.pending.len()
    }
}

/// Map a channel count to a Symphonia layout.
///
/// Symphonia 0.5 only decodes mono and stereo AAC ("aac too complex" above
/// two channels), so every other count is refused up front.
fn channel_layout(channels: u32) -> Option<Channels> {
    match channels {
        1 => Some(Channels::FRONT_CENTRE),
        2 => Some(Channels::FRONT_LEFT | Channels::FRONT_RIGHT),
        _ => None,
    }
}

fn map_symphonia_err(e: SymphoniaError) -> EngineError {
    match e {
        SymphoniaError::DecodeError(msg) => EngineError::InvalidData(msg.to_string()),
        SymphoniaError::IoError(err) => EngineError::InvalidData(format!("bitstream: {}", err)),
        SymphoniaError::Unsupported(msg) => EngineError::Unsupported(msg.to_string()),
        other => EngineError::Other(other.to_string()),
    }
}

/// Copy a Symphonia buffer out of the decoder.
///
/// Only f32 output carries samples; every other representation is tagged so
/// the context can refuse it.
fn frame_from_buffer(buf: AudioBufferRef<'_>) -> DecodedFrame {
    let spec = *buf.spec();
    let samples = buf.frames();
    let channels = spec.channels.count();

    // Symphonia buffers are always planar
    let data = match buf {
        AudioBufferRef::F32(buf) => {
            FrameSamples::PlanarF32((0..channels).map(|ch| buf.chan(ch).to_vec()).collect())
        }
        AudioBufferRef::U8(_) => FrameSamples::Unsupported(SampleFormat::U8 { planar: true }),
        AudioBufferRef::U16(_) => FrameSamples::Unsupported(SampleFormat::U16 { planar: true }),
        AudioBufferRef::U24(_) => FrameSamples::Unsupported(SampleFormat::U24 { planar: true }),
        AudioBufferRef::U32(_) => FrameSamples::Unsupported(SampleFormat::U32 { planar: true }),
        AudioBufferRef::S8(_) => FrameSamples::Unsupported(SampleFormat::S8 { planar: true }),
        AudioBufferRef::S16(_) => FrameSamples::Unsupported(SampleFormat::S16 { planar: true }),
        AudioBufferRef::S24(_) => FrameSamples::Unsupported(SampleFormat::S24 { planar: true }),
        AudioBufferRef::S32(_) => FrameSamples::Unsupported(SampleFormat::S32 { planar: true }),
        AudioBufferRef::F64(_) => FrameSamples::Unsupported(SampleFormat::F64 { planar: true }),
    };

    DecodedFrame {
        samples,
        channels,
        sample_rate: spec.rate,
        data,
    }
}

impl DecodeEngine for SymphoniaAacEngine {
    fn name(&self) -> &'static str {
        "aac(symphonia)"
    }

    fn send_packet(&mut self, packet: &PaddedPacket) -> Result<(), EngineError> {
        if self.eof {
            return Err(EngineError::Other("input already ended, reset first".into()));
        }
        if self.pending.len() >= self.max_pending {
            return Err(EngineError::Again);
        }

        let (header, payload) = adts::strip_header(packet.payload())?;
        if let Some(header) = header {
            if header.sample_rate != self.sample_rate {
                log::debug!(
                    "ADTS header rate {} differs from engine rate {}",
                    header.sample_rate,
                    self.sample_rate
                );
            }
        }
        if payload.is_empty() {
            return Err(EngineError::InvalidData("empty raw data block".into()));
        }

        let sym_packet =
            Packet::new_from_slice(0, self.next_ts, AAC_FRAME_SAMPLES as u64, payload);
        // Symphonia can index out of bounds on corrupt section data
        let decoded = panic::catch_unwind(AssertUnwindSafe(|| {
            self.decoder.decode(&sym_packet).map(frame_from_buffer)
        }));
        let frame = match decoded {
            Ok(Ok(frame)) => frame,
            Ok(Err(SymphoniaError::ResetRequired)) => {
                self.decoder.reset();
                return Err(EngineError::InvalidData("stream parameters changed".into()));
            }
            Ok(Err(e)) => return Err(map_symphonia_err(e)),
            Err(_) => {
                log::error!("AAC decoder panicked on a {} byte unit, resetting", payload.len());
                self.decoder.reset();
                return Err(EngineError::InvalidData("decoder panicked on corrupt unit".into()));
            }
        };

        if frame.samples == 0 {
            log::trace!("AAC unit produced no samples");
            return Ok(());
        }

        // Follow the stream like a codec context does
        self.channels = frame.channels as u32;
        self.sample_rate = frame.sample_rate;
        self.bit_rate = (packet.size() as u64 * 8 * frame.sample_rate as u64
            / frame.samples as u64)
            .min(u32::MAX as u64) as u32;
        self.next_ts += frame.samples as u64;

        self.pending.push_back(frame);
        Ok(())
    }

    fn send_eof(&mut self) -> Result<(), EngineError> {
        self.eof = true;
        Ok(())
    }

    fn receive_frame(&mut self) -> Result<DecodedFrame, EngineError> {
        if let Some(frame) = self.pending.pop_front() {
            return Ok(frame);
        }
        if self.eof {
            return Err(EngineError::Eof);
        }
        Err(EngineError::Again)
    }

    fn reset(&mut self) {
        self.decoder.reset();
        self.pending.clear();
        self.next_ts = 0;
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_mono_and_stereo_have_layouts() {
        assert_eq!(channel_layout(1).unwrap().count(), 1);
        assert_eq!(channel_layout(2).unwrap().count(), 2);
        for n in [0u32, 3, 6, 8, 64] {
            assert!(channel_layout(n).is_none());
        }
    }

    #[test]
    fn multichannel_open_is_unsupported() {
        assert!(matches!(
            SymphoniaAacEngine::open(48000, 6, 8),
            Err(EngineError::Unsupported(_))
        ));
    }

    #[test]
    fn off_table_rates_open_without_extradata() {
        for rate in [8001, 12345, 192000] {
            let engine = SymphoniaAacEngine::open(rate, 2, 8).unwrap();
            assert_eq!(engine.sample_rate(), rate);
        }
    }

    #[test]
    fn opens_common_configurations() {
        for (rate, channels) in [(48000, 2), (44100, 2), (48000, 1), (22050, 1)] {
            let engine = SymphoniaAacEngine::open(rate, channels, 8).unwrap();
            assert_eq!(engine.sample_rate(), rate);
            assert_eq!(engine.channels(), channels);
            assert_eq!(engine.bit_rate(), 0);
            assert_eq!(engine.pending_frames(), 0);
        }
    }

    #[test]
    fn empty_engine_reports_again_then_eof() {
        let mut engine = SymphoniaAacEngine::open(48000, 2, 8).unwrap();
        assert_eq!(engine.receive_frame(), Err(EngineError::Again));
        engine.send_eof().unwrap();
        assert_eq!(engine.receive_frame(), Err(EngineError::Eof));
        engine.reset();
        assert_eq!(engine.receive_frame(), Err(EngineError::Again));
    }

    #[test]
    fn bad_adts_is_rejected_before_decode() {
        let mut engine = SymphoniaAacEngine::open(48000, 2, 8).unwrap();
        let packet = PaddedPacket::copy_from(&[0xFF; 32], engine.input_padding());
        assert!(matches!(
            engine.send_packet(&packet),
            Err(EngineError::InvalidData(_))
        ));
    }
}
