//! Streaming AAC decoder context.
//!
//! `AacDecoder` owns a decode engine and exposes the push/pull contract:
//!
//! - `send(unit)` → `true` accepted, `false` rejected (recoverable, logged)
//! - `receive(out, size)` → `Ok(true)` frame delivered, `Ok(false)` nothing
//!   ready yet, `Err(Fault)` engine broke the sample format contract
//!
//! There is no background thread; the caller alternates the two calls.

use anyhow::Result as AnyResult;

use super::convert;
use super::engine::{DecodeEngine, DecodedFrame, EngineError, FrameSamples, SampleFormat};
use super::packet::PaddedPacket;
use super::stream_decoder::StreamDecoder;
use super::symphonia_engine::SymphoniaAacEngine;
use crate::config::DecoderConfig;
use crate::error::{DecoderError, Result};

/// Properties readable through `AacDecoder::get`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderQuery {
    Channels,
    BitRate,
    SampleRate,
}

impl DecoderQuery {
    /// Numeric property ids used by hosts that pass queries as integers.
    pub fn from_raw(id: u32) -> Option<Self> {
        match id {
            0 => Some(DecoderQuery::Channels),
            1 => Some(DecoderQuery::BitRate),
            2 => Some(DecoderQuery::SampleRate),
            _ => None,
        }
    }
}

/// Size of the most recently received frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderSize {
    /// Samples per channel
    pub samples: u32,
}

/// A received frame that passed the format check.
struct PcmFrame {
    samples: usize,
    planes: Vec<Vec<f32>>,
}

impl PcmFrame {
    fn interleaved_len(&self) -> usize {
        self.planes.len() * self.samples
    }
}

/// Streaming AAC decoder context.
///
/// Exclusive owner of its engine. Dropping the context (or calling `close`)
/// releases every engine resource; ownership rules out any call afterwards.
pub struct AacDecoder {
    engine: Box<dyn DecodeEngine>,
    sample_rate: u32,
    channels: u32,
    scratch: Vec<i16>,
    /// Frame held back after `BufferTooSmall`, delivered by the next receive
    held: Option<PcmFrame>,
}

impl AacDecoder {
    /// Open a decoder for a fixed sample rate and channel count.
    ///
    /// Fails with `DecoderError::Configuration` if the parameters are invalid
    /// or the engine cannot be opened with them.
    pub fn open(sample_rate: u32, channels: u32) -> Result<Self> {
        Self::from_config(&DecoderConfig::with_stream(sample_rate, channels))
    }

    pub fn from_config(config: &DecoderConfig) -> Result<Self> {
        config.validate()?;
        let engine = SymphoniaAacEngine::open(
            config.sample_rate,
            config.channels,
            config.max_pending_frames,
        )
        .map_err(|e| DecoderError::Configuration(e.to_string()))?;
        Ok(Self::with_configured(Box::new(engine), config.sample_rate, config.channels))
    }

    /// Open with an AudioSpecificConfig taken from the container.
    ///
    /// The extradata overrides `sample_rate` and `channels`; the configured
    /// values are read back from the opened engine.
    pub fn open_with_asc(sample_rate: u32, channels: u32, asc: &[u8]) -> Result<Self> {
        let config = DecoderConfig::with_stream(sample_rate, channels);
        config.validate()?;
        let engine = SymphoniaAacEngine::open_with_asc(
            sample_rate,
            channels,
            asc,
            config.max_pending_frames,
        )
        .map_err(|e| DecoderError::Configuration(e.to_string()))?;
        Ok(Self::with_engine(Box::new(engine)))
    }

    /// Wrap an already opened engine; its current parameters become the
    /// configured ones.
    pub fn with_engine(engine: Box<dyn DecodeEngine>) -> Self {
        let sample_rate = engine.sample_rate();
        let channels = engine.channels();
        Self::with_configured(engine, sample_rate, channels)
    }

    fn with_configured(engine: Box<dyn DecodeEngine>, sample_rate: u32, channels: u32) -> Self {
        log::info!(
            "{} decoder opened: rate={}Hz, ch={}",
            engine.name(),
            sample_rate,
            channels
        );
        Self {
            engine,
            sample_rate,
            channels,
            scratch: Vec::new(),
            held: None,
        }
    }

    /// Sample rate the context was opened with.
    pub fn configured_sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Channel count the context was opened with.
    pub fn configured_channels(&self) -> u32 {
        self.channels
    }

    /// Submit one compressed access unit.
    ///
    /// The unit is copied into a zero-padded buffer before the engine sees it,
    /// so `unit` may be reused as soon as this returns. `false` means the
    /// engine rejected it; the context stays usable.
    pub fn send(&mut self, unit: &[u8]) -> bool {
        if unit.is_empty() {
            log::warn!("Error sending AAC packet: empty access unit");
            return false;
        }

        let packet = PaddedPacket::copy_from(unit, self.engine.input_padding());
        match self.engine.send_packet(&packet) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Error sending AAC packet ({} bytes): {}", unit.len(), e);
                false
            }
        }
    }

    /// Mark the end of input. Remaining frames can still be received.
    pub fn send_eof(&mut self) -> bool {
        match self.engine.send_eof() {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Error flushing AAC decoder: {}", e);
                false
            }
        }
    }

    /// Pull the next decoded frame.
    ///
    /// * `out`  - receives `channels * samples` interleaved s16 values
    /// * `size` - receives the frame's samples per channel, even without `out`
    ///
    /// `Ok(false)` means no frame is ready: send more input and retry.
    pub fn receive(
        &mut self,
        out: Option<&mut [i16]>,
        size: Option<&mut DecoderSize>,
    ) -> Result<bool> {
        let Some(frame) = self.next_frame()? else {
            return Ok(false);
        };

        if let Some(size) = size {
            size.samples = frame.samples as u32;
        }
        if let Some(out) = out {
            let need = frame.interleaved_len();
            if out.len() < need {
                let have = out.len();
                self.held = Some(frame);
                return Err(DecoderError::BufferTooSmall { need, have });
            }
            convert::f32_planar_to_s16(&frame.planes, frame.samples, out);
        }
        Ok(true)
    }

    /// Like `receive`, writing little-endian s16 bytes
    /// (`channels * samples * 2`).
    pub fn receive_bytes(&mut self, out: &mut [u8], size: Option<&mut DecoderSize>) -> Result<bool> {
        let Some(frame) = self.next_frame()? else {
            return Ok(false);
        };

        if let Some(size) = size {
            size.samples = frame.samples as u32;
        }
        let values = frame.interleaved_len();
        if out.len() < values * 2 {
            let have = out.len();
            self.held = Some(frame);
            return Err(DecoderError::BufferTooSmall {
                need: values * 2,
                have,
            });
        }

        self.scratch.resize(values, 0);
        convert::f32_planar_to_s16(&frame.planes, frame.samples, &mut self.scratch);
        convert::s16_to_le_bytes(&self.scratch, &mut out[..values * 2]);
        Ok(true)
    }

    /// Read a stream property. Values follow the stream once frames decode.
    pub fn get(&self, query: DecoderQuery) -> u32 {
        match query {
            DecoderQuery::Channels => self.engine.channels(),
            DecoderQuery::BitRate => self.engine.bit_rate(),
            DecoderQuery::SampleRate => self.engine.sample_rate(),
        }
    }

    /// `get` for numeric property ids; unknown ids read as 0.
    pub fn get_raw(&self, id: u32) -> u32 {
        DecoderQuery::from_raw(id).map_or(0, |query| self.get(query))
    }

    /// Drop buffered input and output (after a seek or discontinuity).
    pub fn reset(&mut self) {
        log::debug!("{} decoder reset", self.engine.name());
        self.held = None;
        self.engine.reset();
    }

    /// Release the engine. Same as dropping the decoder.
    pub fn close(self) {}

    /// Fetch and validate the next frame; `None` when nothing is ready.
    fn next_frame(&mut self) -> Result<Option<PcmFrame>> {
        if let Some(frame) = self.held.take() {
            return Ok(Some(frame));
        }

        let frame = match self.engine.receive_frame() {
            Ok(frame) => frame,
            Err(e) if e.is_again() || e.is_eof() => {
                log::trace!("No AAC frame ready: {}", e);
                return Ok(None);
            }
            Err(e) => {
                log::warn!("Error receiving AAC frame: {}", e);
                return Err(e.into());
            }
        };

        let DecodedFrame {
            samples,
            channels,
            data,
            ..
        } = frame;

        let planes = match data {
            FrameSamples::PlanarF32(planes) => planes,
            FrameSamples::Unsupported(actual) => {
                log::error!(
                    "{} produced {} samples, only {} is supported",
                    self.engine.name(),
                    actual,
                    SampleFormat::PLANAR_F32
                );
                return Err(DecoderError::Fault {
                    expected: SampleFormat::PLANAR_F32,
                    actual,
                });
            }
        };

        if planes.len() != channels || planes.iter().any(|p| p.len() < samples) {
            log::error!(
                "{} produced a malformed frame: {} planes for {} channels",
                self.engine.name(),
                planes.len(),
                channels
            );
            return Err(DecoderError::Engine(EngineError::InvalidData(
                "frame planes do not match reported shape".into(),
            )));
        }

        Ok(Some(PcmFrame { samples, planes }))
    }
}

impl Drop for AacDecoder {
    fn drop(&mut self) {
        log::info!("{} decoder closed", self.engine.name());
    }
}

// ======================== StreamDecoder impl ========================

impl StreamDecoder for AacDecoder {
    fn decode(&mut self, data: &[u8]) -> AnyResult<Vec<i16>> {
        if !self.send(data) {
            anyhow::bail!("AAC decoder rejected a {} byte unit", data.len());
        }

        let mut pcm = Vec::new();
        while let Some(frame) = self.next_frame()? {
            let start = pcm.len();
            pcm.resize(start + frame.interleaved_len(), 0);
            convert::f32_planar_to_s16(&frame.planes, frame.samples, &mut pcm[start..]);
        }
        Ok(pcm)
    }
}
